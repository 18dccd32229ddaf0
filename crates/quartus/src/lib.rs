//! # Quartus
//!
//! A parallel F4 Gröbner basis engine over prime fields.
//!
//! The computation batches S-polynomial reductions into one sparse
//! linear-algebra pass per degree step: symbolic preprocessing builds a
//! reduction matrix, a dependency-respecting schedule eliminates the
//! pivot columns on a work-stealing pool, and a parallel Gaussian pass
//! extracts the new basis members.
//!
//! ## Quick start
//!
//! ```rust
//! use quartus::prelude::*;
//!
//! let field = PrimeField::new(32003).unwrap();
//! let monoid = TermMonoid::new(2).unwrap();
//! let order = TermOrder::DegRevLex;
//!
//! // x^2 - y and xy - 1
//! let gens = vec![
//!     Polynomial::build(&field, &monoid, order, &[(1, &[2, 0]), (-1, &[0, 1])]).unwrap(),
//!     Polynomial::build(&field, &monoid, order, &[(1, &[1, 1]), (-1, &[0, 0])]).unwrap(),
//! ];
//!
//! let f4 = F4::new(&field, &monoid, order, F4Config::default());
//! let basis = f4.compute(gens).unwrap();
//! assert_eq!(basis.len(), 3);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub use quartus_f4 as f4;
pub use quartus_poly as poly;
pub use quartus_rings as rings;
pub use quartus_terms as terms;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use quartus_f4::{F4Config, SimplifyMode, F4};
    pub use quartus_poly::Polynomial;
    pub use quartus_rings::PrimeField;
    pub use quartus_terms::{TermMonoid, TermOrder};
}
