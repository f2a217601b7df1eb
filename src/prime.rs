// Probabilistic primality testing, used to validate a configured group
// modulus at startup.

use num_bigint::{BigUint, RandBigInt};
use num_traits::{One, Zero};
use rand::Rng;

const MILLER_RABIN_ROUNDS: u32 = 16;

const SMALL_PRIMES: [u64; 24] = [
    3, 5, 7, 11, 13, 17, 19, 23, 29, 31, 37, 41, 43, 47, 53, 59, 61, 67, 71, 73, 79, 83, 89, 97,
];

pub fn is_likely_prime<R: Rng>(candidate: &BigUint, rng: &mut R) -> bool {
    let two = BigUint::from(2u64);
    if candidate < &two {
        return false;
    }
    if candidate == &two {
        return true;
    }
    if (candidate % &two).is_zero() {
        return false;
    }

    for small_prime in SMALL_PRIMES {
        let p = BigUint::from(small_prime);
        if candidate == &p {
            return true;
        }
        if (candidate % &p).is_zero() {
            return false;
        }
    }

    miller_rabin(candidate, MILLER_RABIN_ROUNDS, rng)
}

fn miller_rabin<R: Rng>(candidate: &BigUint, n_rounds: u32, rng: &mut R) -> bool {
    let one = BigUint::one();
    let two = BigUint::from(2u64);

    // candidate - 1 = d * 2^r with d odd.
    let mut d: BigUint = candidate - &one;
    let mut r = 0u32;
    while (&d % &two).is_zero() {
        d /= &two;
        r += 1;
    }

    let minus_one = candidate - &one;
    for _ in 0..n_rounds {
        let a = rng.gen_biguint_range(&two, &minus_one);
        let mut x = a.modpow(&d, candidate);
        if x == one || x == minus_one {
            continue;
        }
        let mut witness = true;
        for _ in 0..r.saturating_sub(1) {
            x = x.modpow(&two, candidate);
            if x == minus_one {
                witness = false;
                break;
            }
        }
        if witness {
            return false;
        }
    }

    true
}

#[cfg(test)]
mod tests {
    use super::*;

    use num_traits::Num;
    use rand::{rngs::StdRng, SeedableRng};
    use rstest::rstest;

    #[rstest]
    #[case(BigUint::from(2u64))]
    #[case(BigUint::from(3u64))]
    #[case(BigUint::from(97u64))]
    #[case(BigUint::from(7919u64))]
    #[case(BigUint::from_str_radix(
        "ffffffffffffffffc90fdaa22168c234c4c6628b80dc1cd129024\
        e088a67cc74020bbea63b139b22514a08798e3404ddef9519b3cd\
        3a431b302b0a6df25f14374fe1356d6d51c245e485b576625e7ec\
        6f44c42e9a637ed6b0bff5cb6f406b7edee386bfb5a899fa5ae9f\
        24117c4b1fe649286651ece45b3dc2007cb8a163bf0598da48361\
        c55d39a69163fa8fd24cf5f83655d23dca3ad961c62f356208552\
        bb9ed529077096966d670c354e4abc9804f1746c08ca237327fff\
        fffffffffffff", 16).unwrap())]
    fn is_likely_prime_identifies_primes(#[case] prime: BigUint) {
        let mut rng = StdRng::from_seed([101; 32]);

        assert!(is_likely_prime(&prime, &mut rng));
    }

    #[rstest]
    #[case(BigUint::from(0u64))]
    #[case(BigUint::from(1u64))]
    #[case(BigUint::from(4u64))]
    #[case(BigUint::from(7917u64))]
    #[case(BigUint::from(1024u64))]
    fn is_likely_prime_identifies_non_primes(#[case] non_prime: BigUint) {
        let mut rng = StdRng::from_seed([101; 32]);

        assert!(!is_likely_prime(&non_prime, &mut rng));
    }
}
