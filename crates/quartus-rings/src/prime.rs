//! Prime fields with a runtime modulus.
//!
//! The Gröbner engine receives its coefficient field as a value, so the
//! modulus is a runtime quantity rather than a const parameter. Elements
//! are canonical residues `0 <= x < p` stored as bare `u64`; the field
//! object performs every operation.

use thiserror::Error;

/// Errors raised by field construction and inversion.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum FieldError {
    /// The requested modulus is not a prime number.
    #[error("modulus {0} is not prime")]
    NotPrime(u64),
    /// Zero has no multiplicative inverse.
    #[error("zero has no multiplicative inverse")]
    ZeroInverse,
}

/// The field Z_p for a prime p fitting in a machine word.
///
/// All operations take and return canonical residues. Multiplication
/// widens to `u128`, so any `u64` prime is supported.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PrimeField {
    modulus: u64,
}

impl PrimeField {
    /// Creates the field Z_p, verifying that `p` is prime.
    pub fn new(modulus: u64) -> Result<Self, FieldError> {
        if !is_prime(modulus) {
            return Err(FieldError::NotPrime(modulus));
        }
        Ok(Self { modulus })
    }

    /// Returns the characteristic.
    #[must_use]
    pub const fn modulus(&self) -> u64 {
        self.modulus
    }

    /// Reduces an arbitrary integer into the field.
    #[must_use]
    pub const fn element(&self, value: u64) -> u64 {
        value % self.modulus
    }

    /// Reduces a signed integer into the field.
    #[must_use]
    pub fn from_signed(&self, value: i64) -> u64 {
        if value >= 0 {
            self.element(value as u64)
        } else {
            let r = (value.unsigned_abs()) % self.modulus;
            if r == 0 {
                0
            } else {
                self.modulus - r
            }
        }
    }

    /// Addition in Z_p.
    #[must_use]
    pub const fn add(&self, a: u64, b: u64) -> u64 {
        let s = a + b;
        if s >= self.modulus {
            s - self.modulus
        } else {
            s
        }
    }

    /// Subtraction in Z_p.
    #[must_use]
    pub const fn sub(&self, a: u64, b: u64) -> u64 {
        if a >= b {
            a - b
        } else {
            self.modulus - b + a
        }
    }

    /// Additive inverse.
    #[must_use]
    pub const fn neg(&self, a: u64) -> u64 {
        if a == 0 {
            0
        } else {
            self.modulus - a
        }
    }

    /// Multiplication in Z_p via a widening product.
    #[must_use]
    pub const fn mul(&self, a: u64, b: u64) -> u64 {
        ((a as u128 * b as u128) % self.modulus as u128) as u64
    }

    /// The fused elimination primitive `x - y * f`.
    ///
    /// Written as `x + (p - f) * y` so the intermediate never goes
    /// negative; this is the inner loop of the dense solve and the Gauss
    /// phase.
    #[must_use]
    pub const fn mul_sub(&self, x: u64, y: u64, f: u64) -> u64 {
        let p = self.modulus as u128;
        ((x as u128 + (p - f as u128) * y as u128) % p) as u64
    }

    /// Multiplicative inverse by the extended Euclidean algorithm.
    pub fn inv(&self, a: u64) -> Result<u64, FieldError> {
        if a == 0 {
            return Err(FieldError::ZeroInverse);
        }
        let mut t = 0i128;
        let mut new_t = 1i128;
        let mut r = self.modulus as i128;
        let mut new_r = a as i128;
        while new_r != 0 {
            let quotient = r / new_r;
            (t, new_t) = (new_t, t - quotient * new_t);
            (r, new_r) = (new_r, r - quotient * new_r);
        }
        debug_assert_eq!(r, 1, "modulus is prime, nonzero elements are units");
        if t < 0 {
            t += self.modulus as i128;
        }
        Ok(t as u64)
    }

    /// Computes `a^exp` by binary exponentiation.
    #[must_use]
    pub fn pow(&self, a: u64, mut exp: u64) -> u64 {
        let mut base = a;
        let mut result = 1u64;
        while exp > 0 {
            if exp & 1 == 1 {
                result = self.mul(result, base);
            }
            base = self.mul(base, base);
            exp >>= 1;
        }
        result
    }
}

/// Deterministic Miller-Rabin for `u64`.
///
/// The witness set is exact for every 64-bit integer.
fn is_prime(n: u64) -> bool {
    if n < 2 {
        return false;
    }
    for p in [2u64, 3, 5, 7, 11, 13, 17, 19, 23, 29, 31, 37] {
        if n == p {
            return true;
        }
        if n % p == 0 {
            return false;
        }
    }
    let mut d = n - 1;
    let mut s = 0u32;
    while d % 2 == 0 {
        d /= 2;
        s += 1;
    }
    'witness: for a in [2u64, 3, 5, 7, 11, 13, 17, 19, 23, 29, 31, 37] {
        let mut x = pow_mod(a, d, n);
        if x == 1 || x == n - 1 {
            continue;
        }
        for _ in 1..s {
            x = ((x as u128 * x as u128) % n as u128) as u64;
            if x == n - 1 {
                continue 'witness;
            }
        }
        return false;
    }
    true
}

fn pow_mod(mut base: u64, mut exp: u64, modulus: u64) -> u64 {
    let mut result = 1u64;
    base %= modulus;
    while exp > 0 {
        if exp & 1 == 1 {
            result = ((result as u128 * base as u128) % modulus as u128) as u64;
        }
        base = ((base as u128 * base as u128) % modulus as u128) as u64;
        exp >>= 1;
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_composite_modulus() {
        assert_eq!(PrimeField::new(32004), Err(FieldError::NotPrime(32004)));
        assert_eq!(PrimeField::new(1), Err(FieldError::NotPrime(1)));
        assert_eq!(PrimeField::new(0), Err(FieldError::NotPrime(0)));
        assert!(PrimeField::new(32003).is_ok());
        assert!(PrimeField::new(2).is_ok());
    }

    #[test]
    fn test_basic_ops() {
        let f = PrimeField::new(7).unwrap();
        assert_eq!(f.add(5, 4), 2);
        assert_eq!(f.sub(5, 4), 1);
        assert_eq!(f.sub(4, 5), 6);
        assert_eq!(f.mul(5, 4), 6);
        assert_eq!(f.neg(3), 4);
        assert_eq!(f.neg(0), 0);
    }

    #[test]
    fn test_inverse() {
        let f = PrimeField::new(7).unwrap();
        assert_eq!(f.inv(3), Ok(5));
        assert_eq!(f.inv(0), Err(FieldError::ZeroInverse));

        let g = PrimeField::new(32003).unwrap();
        for a in [1u64, 2, 17, 32002] {
            let inv = g.inv(a).unwrap();
            assert_eq!(g.mul(a, inv), 1);
        }
    }

    #[test]
    fn test_mul_sub_matches_unfused() {
        let f = PrimeField::new(32003).unwrap();
        let cases = [(0, 0, 0), (5, 7, 11), (32002, 32002, 32002), (1, 32002, 2)];
        for (x, y, fac) in cases {
            assert_eq!(f.mul_sub(x, y, fac), f.sub(x, f.mul(y, fac)));
        }
    }

    #[test]
    fn test_from_signed() {
        let f = PrimeField::new(32003).unwrap();
        assert_eq!(f.from_signed(-1), 32002);
        assert_eq!(f.from_signed(-32003), 0);
        assert_eq!(f.from_signed(32004), 1);
    }

    #[test]
    fn test_pow() {
        let f = PrimeField::new(7).unwrap();
        assert_eq!(f.pow(3, 0), 1);
        assert_eq!(f.pow(3, 2), 2);
        assert_eq!(f.pow(3, 6), 1);
    }
}
