//! # Ports
//!
//! Trait contracts between the chain engine and its storage.
//!
//! - `ChainStore`: where chain elements live
//!
//! Adapters implement these; the engine only talks to the traits.

mod store;

pub use store::{ChainError, ChainResult, ChainStore};
