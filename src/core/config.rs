//! # Configuration
//!
//! Numeric thresholds of the algebra and the configuration of a chain space.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Denominators (and reciprocal arguments) closer to zero than this are
/// treated as singular.
pub const SINGULARITY_THRESHOLD: f64 = 1e-15;

/// Default ε for the auxiliary parameter of derived arithmetic.
///
/// `|A| < ε` is replaced by `sign(A)·ε`, positive at exactly `A == 0`.
pub const DEFAULT_EPSILON: f64 = 1e-12;

/// Before-value of a node that has neither a parent nor an explicit value.
pub const DEFAULT_ROOT_VALUE: f64 = 1.0;

/// Relative tolerance used when verifying extractions.
pub const EXTRACTION_REL_TOLERANCE: f64 = 1e-12;

/// Absolute tolerance used when verifying extractions.
pub const EXTRACTION_ABS_TOLERANCE: f64 = 1e-15;

/// Configuration for a [`ChainSpace`](crate::ChainSpace)
///
/// The operator families decide which symbols the registry knows.
/// The scalar family (`⊙ ⊘ + - * /`) is always present.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ChainConfig {
    /// Before-value of root nodes created without an explicit value
    pub root_value: f64,

    /// Register the reference family (`⊙id`, `+id`, ...)
    pub id_operations: bool,

    /// Register the functional family (`⊙f`, `make_func`, `∘`, ...)
    pub functional_operations: bool,
}

impl ChainConfig {
    /// Scalar operators only
    pub fn new() -> Self {
        Self {
            root_value: DEFAULT_ROOT_VALUE,
            id_operations: false,
            functional_operations: false,
        }
    }

    /// Every operator family enabled
    pub fn full() -> Self {
        Self::new()
            .with_id_operations(true)
            .with_functional_operations(true)
    }

    pub fn with_root_value(mut self, root_value: f64) -> Self {
        self.root_value = root_value;
        self
    }

    pub fn with_id_operations(mut self, enabled: bool) -> Self {
        self.id_operations = enabled;
        self
    }

    pub fn with_functional_operations(mut self, enabled: bool) -> Self {
        self.functional_operations = enabled;
        self
    }
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self::new()
    }
}
