//! Interned terms (power products) and term orderings.
//!
//! Every power product that appears anywhere in a computation is interned
//! in a single [`TermMonoid`], which hands out small integer [`Term`]
//! handles. Term equality and hashing are handle equality; all structural
//! operations (multiplication, exact division, lcm, ...) go through the
//! monoid. The monoid is append-only and safe to use from rayon workers.

pub mod exponents;
pub mod monoid;
pub mod ordering;

pub use exponents::{PackedExponents, MAX_VARS};
pub use monoid::{Term, TermError, TermMonoid};
pub use ordering::TermOrder;
