//! The term monoid: hash-consed power products.
//!
//! One monoid lives for the whole computation and owns every term object;
//! the rest of the engine passes around [`Term`] handles. Interning uses
//! insert-or-get behind a read-write lock, so row materialization can run
//! on rayon workers while the driver thread does its bookkeeping.

use std::cmp::Ordering;

use hashbrown::HashMap;
use parking_lot::RwLock;
use thiserror::Error;

use crate::exponents::{PackedExponents, MAX_VARS};
use crate::ordering::TermOrder;

/// Errors raised when building terms.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum TermError {
    /// A monomial references a variable the monoid does not have.
    #[error("monomial references variable {index} but the monoid has {num_vars} indeterminates")]
    VariableOutOfRange {
        /// Index of the offending variable.
        index: usize,
        /// Number of indeterminates in the monoid.
        num_vars: usize,
    },
    /// The requested number of indeterminates exceeds the packed width.
    #[error("{requested} indeterminates requested but at most {max} are supported")]
    TooManyVariables {
        /// Requested number of indeterminates.
        requested: usize,
        /// Supported maximum.
        max: usize,
    },
}

/// A handle to an interned power product.
///
/// Equality and hashing are by handle; two equal power products interned
/// in the same monoid always yield the same handle.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Term(u32);

impl Term {
    /// The raw handle value, usable as a vector index.
    #[must_use]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl std::fmt::Debug for Term {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Term({})", self.0)
    }
}

struct MonoidInner {
    map: HashMap<PackedExponents, u32>,
    data: Vec<PackedExponents>,
}

/// The interning table for power products over a fixed set of variables.
pub struct TermMonoid {
    num_vars: usize,
    inner: RwLock<MonoidInner>,
}

impl TermMonoid {
    /// Creates a monoid over `num_vars` indeterminates. The identity is
    /// interned eagerly and always has handle 0.
    pub fn new(num_vars: usize) -> Result<Self, TermError> {
        if num_vars > MAX_VARS {
            return Err(TermError::TooManyVariables {
                requested: num_vars,
                max: MAX_VARS,
            });
        }
        let one = PackedExponents::one(num_vars);
        let mut map = HashMap::new();
        map.insert(one, 0);
        Ok(Self {
            num_vars,
            inner: RwLock::new(MonoidInner {
                map,
                data: vec![one],
            }),
        })
    }

    /// Number of indeterminates.
    #[must_use]
    pub fn num_vars(&self) -> usize {
        self.num_vars
    }

    /// The identity term.
    #[must_use]
    pub fn one(&self) -> Term {
        Term(0)
    }

    /// Number of distinct terms interned so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.read().data.len()
    }

    /// True when only the identity has been interned.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() <= 1
    }

    /// Interns the power product with the given exponents.
    pub fn make(&self, exps: &[u16]) -> Result<Term, TermError> {
        for (index, &e) in exps.iter().enumerate() {
            if e != 0 && index >= self.num_vars {
                return Err(TermError::VariableOutOfRange {
                    index,
                    num_vars: self.num_vars,
                });
            }
        }
        Ok(self.intern(PackedExponents::new(&exps[..exps.len().min(self.num_vars)])))
    }

    /// Copies the packed exponents of a term out of the table.
    #[must_use]
    pub fn packed(&self, t: Term) -> PackedExponents {
        self.inner.read().data[t.index()]
    }

    /// Total degree of a term.
    #[must_use]
    pub fn degree(&self, t: Term) -> u32 {
        self.inner.read().data[t.index()].degree()
    }

    /// Product of two terms.
    #[must_use]
    pub fn mul(&self, a: Term, b: Term) -> Term {
        let product = {
            let inner = self.inner.read();
            inner.data[a.index()].mul(&inner.data[b.index()])
        };
        self.intern(product)
    }

    /// Exact quotient `a / b`. `b` must divide `a`.
    #[must_use]
    pub fn div(&self, a: Term, b: Term) -> Term {
        if b == self.one() {
            return a;
        }
        let quotient = {
            let inner = self.inner.read();
            inner.data[a.index()].div(&inner.data[b.index()])
        };
        self.intern(quotient)
    }

    /// Checks whether `d` divides `t`.
    #[must_use]
    pub fn divides(&self, d: Term, t: Term) -> bool {
        if d == t || d == self.one() {
            return true;
        }
        let inner = self.inner.read();
        inner.data[t.index()].is_divisible_by(&inner.data[d.index()])
    }

    /// Least common multiple of two terms.
    #[must_use]
    pub fn lcm(&self, a: Term, b: Term) -> Term {
        let l = {
            let inner = self.inner.read();
            inner.data[a.index()].lcm(&inner.data[b.index()])
        };
        self.intern(l)
    }

    /// True when the two terms share no variable, i.e. their lcm is their
    /// product.
    #[must_use]
    pub fn coprime(&self, a: Term, b: Term) -> bool {
        let inner = self.inner.read();
        inner.data[a.index()].is_coprime(&inner.data[b.index()])
    }

    /// Compares two terms under the given ordering.
    #[must_use]
    pub fn compare(&self, order: TermOrder, a: Term, b: Term) -> Ordering {
        if a == b {
            return Ordering::Equal;
        }
        let inner = self.inner.read();
        order.compare(&inner.data[a.index()], &inner.data[b.index()])
    }

    /// Renders a term for diagnostics.
    #[must_use]
    pub fn format(&self, t: Term) -> String {
        format!("{:?}", self.packed(t))
    }

    fn intern(&self, packed: PackedExponents) -> Term {
        if let Some(&id) = self.inner.read().map.get(&packed) {
            return Term(id);
        }
        let mut inner = self.inner.write();
        // A racing worker may have interned it between the two locks.
        if let Some(&id) = inner.map.get(&packed) {
            return Term(id);
        }
        let id = inner.data.len() as u32;
        inner.map.insert(packed, id);
        inner.data.push(packed);
        Term(id)
    }
}
