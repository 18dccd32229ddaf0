//! Packed exponent vectors.
//!
//! The raw data behind an interned term: a fixed-width exponent array with
//! a cached total degree. Comparison under the three supported orderings
//! lives here so the hot paths never chase a pointer.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

/// Maximum number of indeterminates in the packed representation.
pub const MAX_VARS: usize = 16;

/// A power product as a packed vector of exponents.
///
/// Each exponent is a `u16`; the total degree is cached so graded
/// comparisons cost one integer compare in the common case.
#[derive(Clone, Copy)]
pub struct PackedExponents {
    exponents: [u16; MAX_VARS],
    num_vars: u8,
    degree: u32,
}

impl PackedExponents {
    /// Creates a power product from the given exponents.
    #[must_use]
    pub fn new(exps: &[u16]) -> Self {
        let mut exponents = [0u16; MAX_VARS];
        let n = exps.len().min(MAX_VARS);
        exponents[..n].copy_from_slice(&exps[..n]);
        let degree: u32 = exponents.iter().map(|&e| u32::from(e)).sum();
        Self {
            exponents,
            num_vars: n as u8,
            degree,
        }
    }

    /// The identity power product (all exponents zero).
    #[must_use]
    pub fn one(num_vars: usize) -> Self {
        Self {
            exponents: [0u16; MAX_VARS],
            num_vars: num_vars.min(MAX_VARS) as u8,
            degree: 0,
        }
    }

    /// Returns the exponent of variable `i`.
    #[must_use]
    pub fn exponent(&self, i: usize) -> u16 {
        if i < MAX_VARS {
            self.exponents[i]
        } else {
            0
        }
    }

    /// Returns the exponents as a slice.
    #[must_use]
    pub fn exponents(&self) -> &[u16] {
        &self.exponents[..self.num_vars as usize]
    }

    /// Returns the total degree.
    #[must_use]
    pub fn degree(&self) -> u32 {
        self.degree
    }

    /// True for the identity power product.
    #[must_use]
    pub fn is_one(&self) -> bool {
        self.degree == 0
    }

    /// Index one past the last nonzero exponent.
    #[must_use]
    pub fn support_end(&self) -> usize {
        let mut end = 0;
        for i in 0..MAX_VARS {
            if self.exponents[i] != 0 {
                end = i + 1;
            }
        }
        end
    }

    /// Componentwise sum.
    #[must_use]
    pub fn mul(&self, other: &Self) -> Self {
        let mut exponents = [0u16; MAX_VARS];
        let n = self.num_vars.max(other.num_vars) as usize;
        for i in 0..n {
            exponents[i] = self.exponents[i] + other.exponents[i];
        }
        Self {
            exponents,
            num_vars: n as u8,
            degree: self.degree + other.degree,
        }
    }

    /// Exact componentwise difference. `other` must divide `self`.
    #[must_use]
    pub fn div(&self, other: &Self) -> Self {
        debug_assert!(self.is_divisible_by(other));
        let mut exponents = [0u16; MAX_VARS];
        let n = self.num_vars.max(other.num_vars) as usize;
        for i in 0..n {
            exponents[i] = self.exponents[i] - other.exponents[i];
        }
        Self {
            exponents,
            num_vars: n as u8,
            degree: self.degree - other.degree,
        }
    }

    /// Checks whether `other` divides `self`.
    #[must_use]
    pub fn is_divisible_by(&self, other: &Self) -> bool {
        if other.degree > self.degree {
            return false;
        }
        let n = self.num_vars.max(other.num_vars) as usize;
        for i in 0..n {
            if other.exponents[i] > self.exponents[i] {
                return false;
            }
        }
        true
    }

    /// Componentwise maximum.
    #[must_use]
    pub fn lcm(&self, other: &Self) -> Self {
        let mut exponents = [0u16; MAX_VARS];
        let n = self.num_vars.max(other.num_vars) as usize;
        let mut degree = 0u32;
        for i in 0..n {
            exponents[i] = self.exponents[i].max(other.exponents[i]);
            degree += u32::from(exponents[i]);
        }
        Self {
            exponents,
            num_vars: n as u8,
            degree,
        }
    }

    /// True when the two products share no variable.
    #[must_use]
    pub fn is_coprime(&self, other: &Self) -> bool {
        let n = self.num_vars.max(other.num_vars) as usize;
        for i in 0..n {
            if self.exponents[i] > 0 && other.exponents[i] > 0 {
                return false;
            }
        }
        true
    }

    /// Degree-reverse-lexicographic comparison.
    #[must_use]
    pub fn cmp_degrevlex(&self, other: &Self) -> Ordering {
        match self.degree.cmp(&other.degree) {
            Ordering::Equal => {}
            ord => return ord,
        }
        let n = self.num_vars.max(other.num_vars) as usize;
        for i in (0..n).rev() {
            match other.exponents[i].cmp(&self.exponents[i]) {
                Ordering::Equal => continue,
                ord => return ord,
            }
        }
        Ordering::Equal
    }

    /// Degree-lexicographic comparison.
    #[must_use]
    pub fn cmp_deglex(&self, other: &Self) -> Ordering {
        match self.degree.cmp(&other.degree) {
            Ordering::Equal => self.cmp_lex(other),
            ord => ord,
        }
    }

    /// Pure lexicographic comparison.
    #[must_use]
    pub fn cmp_lex(&self, other: &Self) -> Ordering {
        let n = self.num_vars.max(other.num_vars) as usize;
        for i in 0..n {
            match self.exponents[i].cmp(&other.exponents[i]) {
                Ordering::Equal => continue,
                ord => return ord,
            }
        }
        Ordering::Equal
    }
}

impl PartialEq for PackedExponents {
    fn eq(&self, other: &Self) -> bool {
        if self.degree != other.degree {
            return false;
        }
        let n = self.num_vars.max(other.num_vars) as usize;
        self.exponents[..n] == other.exponents[..n]
    }
}

impl Eq for PackedExponents {}

impl Hash for PackedExponents {
    fn hash<H: Hasher>(&self, state: &mut H) {
        // Equality ignores trailing zeros, so the hash must too.
        self.degree.hash(state);
        self.exponents[..self.support_end()].hash(state);
    }
}

impl fmt::Debug for PackedExponents {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (i, &e) in self.exponents().iter().enumerate() {
            if e > 0 {
                if !first {
                    write!(f, "*")?;
                }
                first = false;
                if e == 1 {
                    write!(f, "x{i}")?;
                } else {
                    write!(f, "x{i}^{e}")?;
                }
            }
        }
        if first {
            write!(f, "1")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mul_div_roundtrip() {
        let a = PackedExponents::new(&[3, 2, 1]);
        let b = PackedExponents::new(&[1, 1, 0]);
        let product = a.mul(&b);
        assert_eq!(product.exponents(), &[4, 3, 1]);
        assert_eq!(product.degree(), 8);
        assert_eq!(product.div(&b), a);
    }

    #[test]
    fn test_divisibility() {
        let a = PackedExponents::new(&[2, 1]);
        let b = PackedExponents::new(&[1, 1]);
        assert!(a.is_divisible_by(&b));
        assert!(!b.is_divisible_by(&a));
        assert!(a.is_divisible_by(&PackedExponents::one(2)));
    }

    #[test]
    fn test_lcm() {
        let a = PackedExponents::new(&[2, 1, 0]);
        let b = PackedExponents::new(&[1, 3, 0]);
        let l = a.lcm(&b);
        assert_eq!(l.exponents(), &[2, 3, 0]);
        assert!(l.is_divisible_by(&a));
        assert!(l.is_divisible_by(&b));
    }

    #[test]
    fn test_coprime() {
        let a = PackedExponents::new(&[2, 0, 0]);
        let b = PackedExponents::new(&[0, 1, 0]);
        let c = PackedExponents::new(&[1, 1, 0]);
        assert!(a.is_coprime(&b));
        assert!(!a.is_coprime(&c));
    }

    #[test]
    fn test_degrevlex() {
        // x^2 > xy > y^2 > x > y > 1
        let x2 = PackedExponents::new(&[2, 0]);
        let xy = PackedExponents::new(&[1, 1]);
        let y2 = PackedExponents::new(&[0, 2]);
        let x = PackedExponents::new(&[1, 0]);
        let one = PackedExponents::one(2);
        assert_eq!(x2.cmp_degrevlex(&xy), Ordering::Greater);
        assert_eq!(xy.cmp_degrevlex(&y2), Ordering::Greater);
        assert_eq!(y2.cmp_degrevlex(&x), Ordering::Greater);
        assert_eq!(x.cmp_degrevlex(&one), Ordering::Greater);
    }

    #[test]
    fn test_eq_ignores_trailing_zeros() {
        let a = PackedExponents::new(&[1, 2]);
        let b = PackedExponents::new(&[1, 2, 0, 0]);
        assert_eq!(a, b);

        use std::collections::hash_map::DefaultHasher;
        use std::hash::{Hash, Hasher};
        let mut ha = DefaultHasher::new();
        let mut hb = DefaultHasher::new();
        a.hash(&mut ha);
        b.hash(&mut hb);
        assert_eq!(ha.finish(), hb.finish());
    }
}
