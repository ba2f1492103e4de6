//! # Storage Adapters
//!
//! Implementations of the `ChainStore` port.
//!
//! Available adapters:
//! - `MemoryChainStore` - In-memory HashMap (fast, volatile)

mod memory;

pub use memory::MemoryChainStore;
