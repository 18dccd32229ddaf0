//! Prime-field arithmetic for Gröbner basis computation.
//!
//! Coefficients are canonical residues stored as `u64`; all operations go
//! through a [`PrimeField`] carrying the runtime modulus. The fused
//! [`PrimeField::mul_sub`] is the primitive the elimination kernels are
//! built from.

pub mod prime;

mod proptests;

pub use prime::{FieldError, PrimeField};
