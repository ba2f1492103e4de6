//! # Errors
//!
//! Failures of the composed KMR formulas.
//!
//! Singularities inside a primitive are NOT errors: `kmr_direct` and
//! `kmr_inverse` return the NaN sentinel. The formulas built on top of them
//! (derived arithmetic, tunneling, extraction) check every intermediate and
//! turn an undefined step into one of these variants.

use thiserror::Error;

use crate::core::expr::ParseError;

/// Result type for KMR formulas
pub type KmrResult<T> = Result<T, KmrError>;

/// Errors from KMR formulas
#[derive(Error, Debug, Clone, PartialEq)]
pub enum KmrError {
    /// A precondition on the inputs is violated
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Extraction index outside `1..=len`
    #[error("element index {index} out of range 1..={len}")]
    IndexOutOfRange { index: usize, len: usize },

    /// An intermediate step hit a singularity or a zero reciprocal
    #[error("{operation} is undefined: {detail}")]
    Undefined {
        operation: &'static str,
        detail: String,
    },

    /// One of the two tunneling steps is undefined
    #[error("tunneling undefined: {0}")]
    TunnelingUndefined(String),

    /// Expression source could not be parsed
    #[error(transparent)]
    Parse(#[from] ParseError),
}

impl KmrError {
    pub(crate) fn undefined(operation: &'static str, detail: impl Into<String>) -> Self {
        KmrError::Undefined {
            operation,
            detail: detail.into(),
        }
    }
}
