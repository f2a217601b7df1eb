//! Server side of the SRP handshake.
//!
//! One session drives four fixed steps against a [`FrameTransport`]: derive
//! the password verifier, receive the client hello `identity,A_hex`, send
//! the challenge `salt_hex,B_hex`, then verify the client's keyed proof of
//! the session key and answer `OK` or `NO`.

use crate::codec::{
    biguint_to_bytes, biguint_to_hex, bytes_to_hex, hex_to_biguint, hex_to_bytes, split_fields,
    FrameError,
};
use crate::group::GroupParameters;
use crate::transport::FrameTransport;

use hmac::{Hmac, Mac};
use num_bigint::{BigUint, RandBigInt};
use num_traits::One;
use rand::{CryptoRng, Rng, RngCore};
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;
use thiserror::Error;
use zeroize::Zeroize;

use std::sync::Arc;

pub const SALT_LEN: usize = 32;
pub const SESSION_KEY_LEN: usize = 32;

const FIELD_DELIMITER: &str = ",";
const ACCEPT_RESPONSE: &[u8] = b"OK";
const REJECT_RESPONSE: &[u8] = b"NO";

type HmacSha256 = Hmac<Sha256>;

/// The identity and password the server expects. Supplied once at startup,
/// shared read-only by every session, never logged.
#[derive(Clone)]
pub struct Credential {
    identity: String,
    password: Vec<u8>,
}

impl Credential {
    pub fn new(identity: impl Into<String>, password: impl Into<Vec<u8>>) -> Self {
        Self {
            identity: identity.into(),
            password: password.into(),
        }
    }

    pub fn identity(&self) -> &str {
        &self.identity
    }

    pub(crate) fn password(&self) -> &[u8] {
        &self.password
    }
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credential")
            .field("identity", &self.identity)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Terminal state of a session, reported to the transport adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandshakeOutcome {
    /// The client's proof matched; `OK` was sent.
    Authenticated,
    /// The session ended without any response being sent.
    RejectedSilently(RejectReason),
    /// The client's proof did not match; `NO` was sent.
    RejectedWithResponse,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    /// The hello named an identity other than the configured one. The
    /// original server drops these without a response, leaving a conforming
    /// client waiting; that asymmetry is observable protocol behaviour and
    /// is kept.
    UnknownIdentity,
    /// Wrong field count, non-UTF-8 text, or a non-hex integer.
    MalformedFrame,
}

/// A session abort. Protocol violations are not errors; they terminate the
/// session with a [`HandshakeOutcome`]. The engine never retries a step.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("transport failure: {0}")]
    Transport(#[from] std::io::Error),
}

/// Per-connection SRP server engine. Construct one per accepted connection
/// and discard it when [`SrpServer::run_session`] returns.
///
/// The random source is injected so deterministic tests can substitute a
/// fixed-seed generator and reproduce exact `salt` and `b` values.
pub struct SrpServer<R> {
    group: Arc<GroupParameters>,
    credential: Arc<Credential>,
    rng: R,
}

impl<R: Rng + CryptoRng> SrpServer<R> {
    pub fn new(group: Arc<GroupParameters>, credential: Arc<Credential>, rng: R) -> Self {
        Self {
            group,
            credential,
            rng,
        }
    }

    /// Run the four-step handshake to completion. Returns the terminal
    /// outcome, or an error if the transport fails mid-handshake. Ephemeral
    /// secrets (`x`, `b`, `S`) never outlive the step that consumes them.
    pub async fn run_session<T: FrameTransport>(
        &mut self,
        transport: &mut T,
    ) -> Result<HandshakeOutcome, SessionError> {
        let n = self.group.modulus();

        // Step 1: verifier setup, before any network I/O.
        let mut salt = [0u8; SALT_LEN];
        self.rng.fill_bytes(&mut salt);
        let verifier = derive_verifier(&self.group, &salt, self.credential.password());

        // Step 2: client hello. The identity is checked before A is decoded,
        // so a hello for the wrong identity is dropped even when its A field
        // is garbage.
        let hello = transport.receive_frame().await?;
        let fields = match split_fields(&hello, 2) {
            Ok(fields) => fields,
            Err(violation) => {
                tracing::debug!(%violation, "malformed client hello");
                return Ok(HandshakeOutcome::RejectedSilently(
                    RejectReason::MalformedFrame,
                ));
            }
        };
        if fields[0] != self.credential.identity() {
            tracing::debug!("hello for unknown identity, dropping session");
            return Ok(HandshakeOutcome::RejectedSilently(
                RejectReason::UnknownIdentity,
            ));
        }
        let client_public = match hex_to_biguint(fields[1]) {
            Ok(client_public) => client_public,
            Err(violation) => {
                tracing::debug!(%violation, "client public key is not hex");
                return Ok(HandshakeOutcome::RejectedSilently(
                    RejectReason::MalformedFrame,
                ));
            }
        };

        // Step 3: challenge. B = (k*v + g^b) mod N with b fresh in [1, N-1].
        let ephemeral_private = self.rng.gen_biguint_range(&BigUint::one(), n);
        let server_public = (self.group.multiplier() * &verifier
            + self.group.generator().modpow(&ephemeral_private, n))
            % n;
        let challenge = [bytes_to_hex(&salt), biguint_to_hex(&server_public)]
            .join(FIELD_DELIMITER);
        transport.send_frame(challenge.as_bytes()).await?;

        // Step 4: derive the session key, then verify the client's proof.
        let session_key = derive_session_key(
            &self.group,
            &client_public,
            &server_public,
            &verifier,
            &ephemeral_private,
        );
        drop(ephemeral_private);

        let proof_frame = transport.receive_frame().await?;
        let client_proof = match parse_proof(&proof_frame) {
            Ok(proof) => proof,
            Err(violation) => {
                tracing::debug!(%violation, "malformed proof frame");
                return Ok(HandshakeOutcome::RejectedSilently(
                    RejectReason::MalformedFrame,
                ));
            }
        };
        let expected_proof = session_proof(&session_key, &salt);

        // Length-independent comparison, no early exit on mismatch.
        if bool::from(expected_proof.ct_eq(&client_proof[..])) {
            transport.send_frame(ACCEPT_RESPONSE).await?;
            Ok(HandshakeOutcome::Authenticated)
        } else {
            transport.send_frame(REJECT_RESPONSE).await?;
            Ok(HandshakeOutcome::RejectedWithResponse)
        }
    }
}

/// `v = g^x mod N` with `x = Int(SHA256(salt || password))`. The digest and
/// `x` are discarded here; only the verifier leaves this function.
fn derive_verifier(group: &GroupParameters, salt: &[u8], password: &[u8]) -> BigUint {
    let mut x_digest: [u8; 32] = Sha256::new()
        .chain_update(salt)
        .chain_update(password)
        .finalize()
        .into();
    let x = BigUint::from_bytes_be(&x_digest);
    x_digest.zeroize();
    group.generator().modpow(&x, group.modulus())
}

/// `K = SHA256(S)` with `u = Int(SHA256(A || B))` and
/// `S = (A * v^u mod N)^b mod N`. `S` is zeroized before returning.
fn derive_session_key(
    group: &GroupParameters,
    client_public: &BigUint,
    server_public: &BigUint,
    verifier: &BigUint,
    ephemeral_private: &BigUint,
) -> [u8; SESSION_KEY_LEN] {
    let n = group.modulus();
    let u_digest = Sha256::digest(
        [
            biguint_to_bytes(client_public),
            biguint_to_bytes(server_public),
        ]
        .concat(),
    );
    let u = BigUint::from_bytes_be(&u_digest);
    let shared_secret = (client_public * verifier.modpow(&u, n)).modpow(ephemeral_private, n);
    let mut secret_bytes = biguint_to_bytes(&shared_secret);
    let session_key: [u8; SESSION_KEY_LEN] = Sha256::digest(&secret_bytes).into();
    secret_bytes.zeroize();
    session_key
}

/// `HMAC-SHA256(K, salt)`, the keyed proof both sides compute.
pub(crate) fn session_proof(session_key: &[u8], salt: &[u8]) -> [u8; 32] {
    let mut mac =
        HmacSha256::new_from_slice(session_key).expect("HMAC-SHA256 key can be any length");
    mac.update(salt);
    mac.finalize().into_bytes().into()
}

fn parse_proof(frame: &[u8]) -> Result<Vec<u8>, FrameError> {
    let fields = split_fields(frame, 1)?;
    Ok(hex_to_bytes(fields[0])?)
}
