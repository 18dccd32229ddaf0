//! Parallel F4 Gröbner basis engine.
//!
//! This crate implements the matrix variant of Buchberger's algorithm:
//! critical pairs are selected degree by degree, their S-polynomials and
//! all required reducer rows are assembled into one sparse matrix, and a
//! scheduled parallel elimination reduces everything at once.
//!
//! - [`PairSet`] maintains critical pairs under the Buchberger criteria.
//! - [`Simplifier`] memoizes reduced row representatives across steps.
//! - [`Reducer`] performs symbolic preprocessing and the parallel solve.
//! - [`F4`] is the degree-by-degree driver tying them together.
//!
//! ```ignore
//! let field = PrimeField::new(32003)?;
//! let monoid = TermMonoid::new(3)?;
//! let order = TermOrder::DegRevLex;
//! let f4 = F4::new(&field, &monoid, order, F4Config::default());
//! let basis = f4.compute(generators)?;
//! ```

pub mod config;
pub mod driver;
pub mod engine;
pub mod error;
pub mod pairs;
pub mod simplify;


pub use config::{F4Config, SimplifyMode};
pub use driver::{reduce_full, F4};
pub use engine::{Reducer, Reduction};
pub use error::F4Error;
pub use pairs::{BasisSlot, CriticalPair, PairSet};
pub use simplify::Simplifier;
