//! The fixed SRP group shared by both parties: a large safe prime modulus
//! `N`, a generator `g`, and the multiplier constant `k`.
//!
//! `k` is a fixed small constant here, not the hash-derived `k = H(N || g)`
//! of later SRP revisions. Upgrading it would change the wire behaviour
//! (including the zero-key property of the shared-secret derivation), so the
//! original derivation is kept.

use crate::prime::is_likely_prime;

use num_bigint::BigUint;
use num_traits::{Num, Zero};
use rand::Rng;
use thiserror::Error;

/// The 1536-bit MODP prime (RFC 3526 group 5), the group used by the
/// original server. Generator 2, multiplier 3.
const MODP_1536_HEX: &str = "ffffffffffffffffc90fdaa22168c234c4c6628b80dc1cd129024\
    e088a67cc74020bbea63b139b22514a08798e3404ddef9519b3cd\
    3a431b302b0a6df25f14374fe1356d6d51c245e485b576625e7ec\
    6f44c42e9a637ed6b0bff5cb6f406b7edee386bfb5a899fa5ae9f\
    24117c4b1fe649286651ece45b3dc2007cb8a163bf0598da48361\
    c55d39a69163fa8fd24cf5f83655d23dca3ad961c62f356208552\
    bb9ed529077096966d670c354e4abc9804f1746c08ca237327fff\
    fffffffffffff";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GroupError {
    #[error("modulus is not a valid hex integer")]
    MalformedModulus,
    #[error("modulus failed the primality check")]
    ModulusNotPrime,
    #[error("generator must lie in [2, N-2]")]
    InvalidGenerator,
    #[error("multiplier must be nonzero")]
    InvalidMultiplier,
}

/// Immutable, process-wide group parameters. Safe to share read-only across
/// any number of concurrent sessions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupParameters {
    modulus: BigUint,
    generator: BigUint,
    multiplier: BigUint,
}

impl GroupParameters {
    /// The built-in group: 1536-bit MODP prime, `g = 2`, `k = 3`.
    pub fn modp_1536() -> Self {
        let modulus =
            BigUint::from_str_radix(MODP_1536_HEX, 16).expect("built-in modulus is valid hex");
        Self {
            modulus,
            generator: BigUint::from(2u64),
            multiplier: BigUint::from(3u64),
        }
    }

    /// Build a group from configuration, validating the modulus and
    /// generator. Validation failure is a fatal configuration error; it can
    /// never occur mid-session.
    pub fn new<R: Rng>(
        modulus: BigUint,
        generator: BigUint,
        multiplier: BigUint,
        rng: &mut R,
    ) -> Result<Self, GroupError> {
        if !is_likely_prime(&modulus, rng) {
            return Err(GroupError::ModulusNotPrime);
        }
        let two = BigUint::from(2u64);
        if generator < two || generator > &modulus - &two {
            return Err(GroupError::InvalidGenerator);
        }
        if multiplier.is_zero() {
            return Err(GroupError::InvalidMultiplier);
        }
        Ok(Self {
            modulus,
            generator,
            multiplier,
        })
    }

    /// Build a group from a hex-encoded modulus and small generator and
    /// multiplier constants.
    pub fn from_hex<R: Rng>(
        modulus_hex: &str,
        generator: u64,
        multiplier: u64,
        rng: &mut R,
    ) -> Result<Self, GroupError> {
        let modulus = BigUint::from_str_radix(modulus_hex, 16)
            .map_err(|_| GroupError::MalformedModulus)?;
        Self::new(
            modulus,
            BigUint::from(generator),
            BigUint::from(multiplier),
            rng,
        )
    }

    pub fn modulus(&self) -> &BigUint {
        &self.modulus
    }

    pub fn generator(&self) -> &BigUint {
        &self.generator
    }

    pub fn multiplier(&self) -> &BigUint {
        &self.multiplier
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn built_in_group_has_expected_constants() {
        let group = GroupParameters::modp_1536();

        assert_eq!(group.generator(), &BigUint::from(2u64));
        assert_eq!(group.multiplier(), &BigUint::from(3u64));
        assert_eq!(group.modulus().bits(), 1536);
    }

    #[test]
    fn built_in_modulus_passes_validation() {
        let built_in = GroupParameters::modp_1536();
        let mut rng = StdRng::from_seed([101; 32]);

        let validated = GroupParameters::new(
            built_in.modulus().clone(),
            built_in.generator().clone(),
            built_in.multiplier().clone(),
            &mut rng,
        );

        assert_eq!(validated, Ok(built_in));
    }

    #[test]
    fn composite_modulus_is_rejected() {
        let mut rng = StdRng::from_seed([101; 32]);

        let group = GroupParameters::new(
            BigUint::from(1024u64),
            BigUint::from(2u64),
            BigUint::from(3u64),
            &mut rng,
        );

        assert_eq!(group, Err(GroupError::ModulusNotPrime));
    }

    #[test]
    fn out_of_range_generator_is_rejected() {
        let mut rng = StdRng::from_seed([101; 32]);
        let modulus = BigUint::from(23u64);

        for generator in [0u64, 1, 22, 23, 100] {
            let group = GroupParameters::new(
                modulus.clone(),
                BigUint::from(generator),
                BigUint::from(3u64),
                &mut rng,
            );
            assert_eq!(group, Err(GroupError::InvalidGenerator));
        }
    }

    #[test]
    fn zero_multiplier_is_rejected() {
        let mut rng = StdRng::from_seed([101; 32]);

        let group = GroupParameters::new(
            BigUint::from(23u64),
            BigUint::from(2u64),
            BigUint::from(0u64),
            &mut rng,
        );

        assert_eq!(group, Err(GroupError::InvalidMultiplier));
    }

    #[test]
    fn malformed_modulus_hex_is_rejected() {
        let mut rng = StdRng::from_seed([101; 32]);

        let group = GroupParameters::from_hex("not-hex", 2, 3, &mut rng);

        assert_eq!(group, Err(GroupError::MalformedModulus));
    }
}
