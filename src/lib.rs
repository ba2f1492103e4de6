//! # KMR Chains
//!
//! An operator algebra built on two reciprocal-shift operators, and chains
//! of values built with it.
//!
//! ```text
//! A ⊙ K = A / (1 + K·A)        1/(A ⊙ K) = 1/A + K
//! A ⊘ K = A / (1 - K·A)        1/(A ⊘ K) = 1/A - K
//! ```
//!
//! ## Philosophy
//!
//! - **Reciprocal space is where the algebra is linear** - every formula here
//!   is a shift in `1/A`
//! - **Singularities are values, not panics** - primitives return NaN, composed
//!   formulas turn it into an error
//! - **Pure core, swappable adapters** - Hexagonal architecture
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                       KMR CHAINS                             │
//! ├─────────────────────────────────────────────────────────────┤
//! │                                                              │
//! │  CORE (pure math, no I/O)                                   │
//! │    ⊙ ⊘, kmr_add/kmr_sub, tunneling, extraction, Expr        │
//! │                                                              │
//! │  PORTS (trait contracts)                                     │
//! │    ChainStore                                               │
//! │                                                              │
//! │  ADAPTERS (swappable implementations)                       │
//! │    Storage: Memory                                          │
//! │                                                              │
//! │  ENGINE (orchestration)                                      │
//! │    ChainSpace, OperatorRegistry                             │
//! │                                                              │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use kmr_chains::{compute_chain, extract_intermediate, kmr_add, ChainConfig, ChainSpace};
//!
//! // K + C through the operators
//! let sum = kmr_add(1.0, 3.0, 2.0).unwrap();
//! assert!((sum - 5.0).abs() < 1e-12);
//!
//! // Recover the middle operand of 2 ⊙ 3 ⊙ 4
//! let x = compute_chain(&[2.0, 3.0, 4.0]);
//! let a2 = extract_intermediate(x, &[2.0], &[4.0]).unwrap();
//! assert!((a2 - 3.0).abs() < 1e-12);
//!
//! // Build a chain node by node
//! let mut space = ChainSpace::new(ChainConfig::full());
//! let a = space.add_element("⊙", 2.0, None, None).unwrap();
//! let b = space.add_element("⊙", 3.0, Some(a), None).unwrap();
//! assert!(space.check_consistency(b));
//! ```

// ============================================================================
// MODULES
// ============================================================================

/// Core domain - pure math, no I/O
/// Contains: operators, derived arithmetic, tunneling, extraction, Expr
pub mod core;

/// Port definitions - trait contracts for adapters
/// Contains: ChainStore trait, ChainError
pub mod ports;

/// Adapter implementations - swappable components
/// Contains: storage submodule
pub mod adapters;

/// Engine - orchestration layer
/// Contains: ChainSpace, OperatorRegistry
pub mod engine;

// ============================================================================
// RE-EXPORTS (public API)
// ============================================================================

// Primitives and formulas
pub use crate::core::operator::{
    is_undefined, kmr_direct, kmr_direct_unit, kmr_inverse, kmr_inverse_unit, BinaryOp,
};
pub use crate::core::arithmetic::{kmr_add, kmr_add_with_epsilon, kmr_sub, kmr_sub_with_epsilon};
pub use crate::core::tunnel::kmr_tunnel;
pub use crate::core::extract::{
    compute_chain, extract_element, extract_first, extract_intermediate, extract_last,
    verify_extraction, ExtractionCheck,
};

// Chain values and expressions
pub use crate::core::chain::{ChainElement, ChainValue, NodeId, Operand, PrivateElement, PublicElement};
pub use crate::core::expr::{Builtin, Expr, ParseError, ParseErrorKind};
pub use crate::core::config::ChainConfig;
pub use crate::core::error::{KmrError, KmrResult};

// Port traits
pub use crate::ports::{ChainError, ChainResult, ChainStore};

// Adapters
pub use crate::adapters::storage::MemoryChainStore;

// Engine
pub use crate::engine::{ChainSpace, Operator, OperatorFamily, OperatorRegistry};
