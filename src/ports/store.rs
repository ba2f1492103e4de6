//! # Chain Store Port
//!
//! Keeps chain elements by id. The store does not evaluate anything; it
//! hands out ids and holds the records the engine computes.

use thiserror::Error;

use crate::core::chain::{ChainElement, NodeId};
use crate::core::error::KmrError;

/// Result type for chain operations
pub type ChainResult<T> = Result<T, ChainError>;

/// Errors from chain storage and chain operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ChainError {
    #[error("node {0} not found")]
    UnknownNode(NodeId),

    #[error("node {0} already exists")]
    DuplicateId(NodeId),

    /// Symbol not registered, or its family is disabled
    #[error("unknown operation: {0}")]
    UnknownOperator(String),

    /// Operand or before-value has the wrong kind for the operator
    #[error("operator {operator} expects {expected}, got {got}")]
    OperandType {
        operator: &'static str,
        expected: &'static str,
        got: &'static str,
    },

    #[error(transparent)]
    Kmr(#[from] KmrError),
}

/// Storage for chain elements
pub trait ChainStore {
    /// Reserve a fresh id
    ///
    /// Ids are never handed out twice, not even after `clear`.
    fn allocate_id(&mut self) -> NodeId;

    /// Store an element under its own id
    fn insert(&mut self, element: ChainElement) -> ChainResult<()>;

    fn get(&self, id: NodeId) -> Option<&ChainElement>;

    fn contains(&self, id: NodeId) -> bool {
        self.get(id).is_some()
    }

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// All elements, in no particular order
    fn iter(&self) -> Box<dyn Iterator<Item = &ChainElement> + '_>;

    fn clear(&mut self);
}
