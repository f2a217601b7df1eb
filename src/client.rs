//! Reference SRP client, the counterpart the server engine is tested
//! against. It is transport-free: callers move the frames it builds and
//! consumes over whatever transport they own.

use crate::codec::{
    biguint_to_bytes, biguint_to_hex, bytes_to_hex, hex_to_biguint, hex_to_bytes, split_fields,
    FrameError,
};
use crate::group::GroupParameters;
use crate::session::session_proof;

use num_bigint::{BigUint, RandBigInt};
use num_traits::One;
use rand::{CryptoRng, Rng};
use sha2::{Digest, Sha256};

use std::sync::Arc;

pub struct SrpClient {
    identity: String,
    password: Vec<u8>,
    group: Arc<GroupParameters>,
    ephemeral_private: BigUint,
    ephemeral_public: BigUint,
}

impl SrpClient {
    pub fn new<R: Rng + CryptoRng>(
        identity: impl Into<String>,
        password: impl Into<Vec<u8>>,
        group: Arc<GroupParameters>,
        rng: &mut R,
    ) -> Self {
        let ephemeral_private = rng.gen_biguint_range(&BigUint::one(), group.modulus());
        let ephemeral_public = group
            .generator()
            .modpow(&ephemeral_private, group.modulus());
        Self {
            identity: identity.into(),
            password: password.into(),
            group,
            ephemeral_private,
            ephemeral_public,
        }
    }

    pub fn identity(&self) -> &str {
        &self.identity
    }

    /// The opening `identity,A_hex` frame.
    pub fn hello_frame(&self) -> Vec<u8> {
        format!(
            "{},{}",
            self.identity,
            biguint_to_hex(&self.ephemeral_public)
        )
        .into_bytes()
    }

    /// Consume the server's `salt_hex,B_hex` challenge and produce the
    /// hex-encoded `HMAC-SHA256(K, salt)` proof frame.
    pub fn proof_frame(&self, challenge: &[u8]) -> Result<Vec<u8>, FrameError> {
        let fields = split_fields(challenge, 2)?;
        let salt = hex_to_bytes(fields[0])?;
        let server_public = hex_to_biguint(fields[1])?;
        let session_key = self.derive_session_key(&salt, &server_public);
        let proof = session_proof(&session_key, &salt);
        Ok(bytes_to_hex(&proof).into_bytes())
    }

    /// `S = (B - k*g^x)^(a + u*x) mod N`, `K = SHA256(S)`.
    fn derive_session_key(&self, salt: &[u8], server_public: &BigUint) -> [u8; 32] {
        let n = self.group.modulus();
        let u_digest = Sha256::digest(
            [
                biguint_to_bytes(&self.ephemeral_public),
                biguint_to_bytes(server_public),
            ]
            .concat(),
        );
        let u = BigUint::from_bytes_be(&u_digest);
        let x_digest = Sha256::new()
            .chain_update(salt)
            .chain_update(&self.password)
            .finalize();
        let x = BigUint::from_bytes_be(&x_digest);

        let kgx = (self.group.multiplier() * self.group.generator().modpow(&x, n)) % n;
        let base = (server_public % n + n - kgx) % n;
        let exponent = &self.ephemeral_private + &u * &x;
        let shared_secret = base.modpow(&exponent, n);
        Sha256::digest(biguint_to_bytes(&shared_secret)).into()
    }
}
