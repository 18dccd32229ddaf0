//! Sparse distributed polynomials over a prime field.
//!
//! A polynomial is a strictly descending list of `(coefficient, term)`
//! pairs under the active ordering, together with a cached sugar degree.
//! Terms are handles into a shared [`quartus_terms::TermMonoid`].

pub mod poly;

mod proptests;

pub use poly::Polynomial;
