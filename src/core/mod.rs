//! # Core
//!
//! Pure math, no I/O, no storage.
//!
//! - `operator`: the ⊙ and ⊘ primitives, `BinaryOp`, chain `Operator`
//! - `arithmetic`: `+` and `-` rebuilt from the primitives
//! - `tunnel`: `Y ⊙ X ⊘ Y⁻¹ = X⁻¹`
//! - `extract`: recovering one operand of a ⊙-chain from its result
//! - `expr`: the function values carried by functional chains
//! - `chain`: the records a chain store holds

pub mod arithmetic;
pub mod chain;
pub mod config;
pub mod error;
pub mod expr;
pub mod extract;
pub mod operator;
pub mod tunnel;

pub use arithmetic::{kmr_add, kmr_add_with_epsilon, kmr_sub, kmr_sub_with_epsilon};
pub use chain::{ChainElement, ChainValue, NodeId, Operand, PrivateElement, PublicElement};
pub use config::ChainConfig;
pub use error::{KmrError, KmrResult};
pub use expr::{Builtin, Expr, ParseError, ParseErrorKind};
pub use extract::{
    compute_chain, extract_element, extract_first, extract_intermediate, extract_last,
    verify_extraction, ExtractionCheck,
};
pub use operator::{
    is_undefined, kmr_direct, kmr_direct_unit, kmr_inverse, kmr_inverse_unit, BinaryOp, Operator,
    OperatorFamily,
};
pub use tunnel::kmr_tunnel;
