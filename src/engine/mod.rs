//! # Engine
//!
//! The orchestration layer that wires everything together.
//!
//! This is where:
//! - Configuration is applied
//! - The operator registry is built
//! - A store adapter is connected to the `ChainStore` port
//! - The unified chain interface is exposed

mod registry;
mod space;

pub use crate::core::operator::{Operator, OperatorFamily};
pub use registry::OperatorRegistry;
pub use space::ChainSpace;
