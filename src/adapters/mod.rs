//! # Adapters
//!
//! Swappable implementations of port traits.
//!
//! - Storage adapters: Memory
//!
//! Each adapter implements one or more port traits.
//! Adapters can be swapped without changing the engine.

pub mod storage;
