//! # Memory Chain Store
//!
//! In-memory storage using HashMap.
//! Fast, but volatile (data lost when the space is dropped).

use std::collections::HashMap;

use crate::core::chain::{ChainElement, NodeId};
use crate::ports::{ChainError, ChainResult, ChainStore};

/// In-memory chain store
#[derive(Debug, Default)]
pub struct MemoryChainStore {
    /// The stored elements
    elements: HashMap<NodeId, ChainElement>,

    /// Next id to hand out
    next_id: u64,
}

impl MemoryChainStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ChainStore for MemoryChainStore {
    fn allocate_id(&mut self) -> NodeId {
        // Skip ids taken by elements inserted under an explicit id
        loop {
            let id = NodeId::from_raw(self.next_id);
            self.next_id = self.next_id.wrapping_add(1);
            if !self.elements.contains_key(&id) {
                return id;
            }
        }
    }

    fn insert(&mut self, element: ChainElement) -> ChainResult<()> {
        let id = element.id();
        if self.elements.contains_key(&id) {
            return Err(ChainError::DuplicateId(id));
        }
        self.elements.insert(id, element);
        Ok(())
    }

    fn get(&self, id: NodeId) -> Option<&ChainElement> {
        self.elements.get(&id)
    }

    fn len(&self) -> usize {
        self.elements.len()
    }

    fn iter(&self) -> Box<dyn Iterator<Item = &ChainElement> + '_> {
        Box::new(self.elements.values())
    }

    fn clear(&mut self) {
        self.elements.clear();
    }
}
