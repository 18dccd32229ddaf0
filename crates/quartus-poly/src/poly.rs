//! The polynomial representation used throughout the engine.

use std::cmp::Ordering;

use quartus_rings::{FieldError, PrimeField};
use quartus_terms::{Term, TermError, TermMonoid, TermOrder};

/// A polynomial as a descending list of `(coefficient, term)` pairs.
///
/// Invariants: terms strictly descending under the active ordering, no
/// zero coefficients, no duplicate terms. The sugar degree is an upper
/// bound on the homogenized degree and is carried through arithmetic:
/// multiplying by a term of degree d adds d, adding two polynomials takes
/// the maximum.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Polynomial {
    terms: Vec<(u64, Term)>,
    sugar: u32,
}

impl Polynomial {
    /// Wraps an already sorted, duplicate-free term list.
    #[must_use]
    pub fn with_sugar(terms: Vec<(u64, Term)>, sugar: u32) -> Self {
        Self { terms, sugar }
    }

    /// The zero polynomial.
    #[must_use]
    pub fn zero() -> Self {
        Self {
            terms: Vec::new(),
            sugar: 0,
        }
    }

    /// Builds a polynomial from raw `(coefficient, exponents)` rows.
    ///
    /// Coefficients are reduced into the field, equal terms are merged,
    /// zero terms are dropped and the result is sorted descending under
    /// `order`. The sugar is the maximal total degree of a surviving
    /// term.
    pub fn build(
        field: &PrimeField,
        monoid: &TermMonoid,
        order: TermOrder,
        rows: &[(i64, &[u16])],
    ) -> Result<Self, TermError> {
        let mut terms: Vec<(u64, Term)> = Vec::with_capacity(rows.len());
        for &(c, exps) in rows {
            let t = monoid.make(exps)?;
            let c = field.from_signed(c);
            terms.push((c, t));
        }
        terms.sort_by(|a, b| monoid.compare(order, b.1, a.1));
        let mut merged: Vec<(u64, Term)> = Vec::with_capacity(terms.len());
        for (c, t) in terms {
            match merged.last_mut() {
                Some(last) if last.1 == t => last.0 = field.add(last.0, c),
                _ => merged.push((c, t)),
            }
        }
        merged.retain(|&(c, _)| c != 0);
        let sugar = merged
            .iter()
            .map(|&(_, t)| monoid.degree(t))
            .max()
            .unwrap_or(0);
        Ok(Self {
            terms: merged,
            sugar,
        })
    }

    /// The terms, descending under the active ordering.
    #[must_use]
    pub fn terms(&self) -> &[(u64, Term)] {
        &self.terms
    }

    /// Leading `(coefficient, term)` pair, if nonzero.
    #[must_use]
    pub fn leading(&self) -> Option<(u64, Term)> {
        self.terms.first().copied()
    }

    /// Leading term, if nonzero.
    #[must_use]
    pub fn leading_term(&self) -> Option<Term> {
        self.terms.first().map(|&(_, t)| t)
    }

    /// Leading coefficient, if nonzero.
    #[must_use]
    pub fn leading_coeff(&self) -> Option<u64> {
        self.terms.first().map(|&(c, _)| c)
    }

    /// True for the zero polynomial.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.terms.is_empty()
    }

    /// Number of terms.
    #[must_use]
    pub fn len(&self) -> usize {
        self.terms.len()
    }

    /// True when there are no terms.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// The sugar degree.
    #[must_use]
    pub fn sugar(&self) -> u32 {
        self.sugar
    }

    /// Total degree of the leading term.
    #[must_use]
    pub fn degree(&self, monoid: &TermMonoid) -> u32 {
        self.terms
            .first()
            .map(|&(_, t)| monoid.degree(t))
            .unwrap_or(0)
    }

    /// Scales the polynomial so the leading coefficient becomes one.
    pub fn normalize(&mut self, field: &PrimeField) -> Result<(), FieldError> {
        let Some(&(lc, _)) = self.terms.first() else {
            return Ok(());
        };
        if lc == 1 {
            return Ok(());
        }
        let inv = field.inv(lc)?;
        for (c, _) in &mut self.terms {
            *c = field.mul(*c, inv);
        }
        Ok(())
    }

    /// Multiplies by a term. Order is preserved, sugar grows by the
    /// term's degree.
    #[must_use]
    pub fn mul_term(&self, monoid: &TermMonoid, t: Term) -> Self {
        if t == monoid.one() {
            return self.clone();
        }
        let terms = self
            .terms
            .iter()
            .map(|&(c, m)| (c, monoid.mul(t, m)))
            .collect();
        Self {
            terms,
            sugar: self.sugar + monoid.degree(t),
        }
    }

    /// Compares two polynomials by leading term under `order`.
    #[must_use]
    pub fn cmp_leading(&self, other: &Self, monoid: &TermMonoid, order: TermOrder) -> Ordering {
        match (self.leading_term(), other.leading_term()) {
            (Some(a), Some(b)) => monoid.compare(order, a, b),
            (Some(_), None) => Ordering::Greater,
            (None, Some(_)) => Ordering::Less,
            (None, None) => Ordering::Equal,
        }
    }

    /// Renders the polynomial for diagnostics.
    #[must_use]
    pub fn format(&self, monoid: &TermMonoid) -> String {
        if self.terms.is_empty() {
            return "0".to_string();
        }
        let mut out = String::new();
        for (i, &(c, t)) in self.terms.iter().enumerate() {
            if i > 0 {
                out.push_str(" + ");
            }
            if t == monoid.one() {
                out.push_str(&c.to_string());
            } else if c == 1 {
                out.push_str(&monoid.format(t));
            } else {
                out.push_str(&format!("{}*{}", c, monoid.format(t)));
            }
        }
        out
    }
}
