//! Engine error type.
//!
//! Only genuinely fatal conditions surface as errors; an empty pivot
//! search, a row reducing to zero or a pruned pair are normal control
//! flow.

use thiserror::Error;

use quartus_rings::FieldError;
use quartus_terms::TermError;

/// Fatal conditions of an F4 computation.
#[derive(Debug, Error)]
pub enum F4Error {
    /// An input generator is the zero polynomial.
    #[error("generator {0} is the zero polynomial")]
    ZeroGenerator(usize),

    /// A monomial references an indeterminate outside the monoid.
    #[error(transparent)]
    Term(#[from] TermError),

    /// Field singularity: non-prime modulus or zero inverse.
    #[error(transparent)]
    Field(#[from] FieldError),

    /// The worker pool could not be constructed.
    #[error("failed to build worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}
