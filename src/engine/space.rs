//! # Chain Space
//!
//! The main chain orchestrator.
//!
//! This struct wires together:
//! - Storage (ChainStore port)
//! - The operator registry
//! - Configuration
//!
//! And exposes a unified API for building chains and reading them back.

use std::fmt;

use crate::adapters::storage::MemoryChainStore;
use crate::core::chain::{ChainElement, ChainValue, NodeId, Operand};
use crate::core::config::ChainConfig;
use crate::core::error::KmrError;
use crate::core::expr::Expr;
use crate::core::operator::{is_undefined, BinaryOp, Operator, OperatorFamily};
use crate::engine::registry::OperatorRegistry;
use crate::ports::{ChainError, ChainResult, ChainStore};

/// A space of chain elements
///
/// Every element stores the value it started from (`before`), the operator
/// and operand it applied, and the value it produced (`after`). Elements
/// point to their parent; chains branch freely.
pub struct ChainSpace {
    /// Configuration
    config: ChainConfig,

    /// Symbol lookup, fixed at construction
    registry: OperatorRegistry,

    /// Storage backend (ChainStore port)
    store: Box<dyn ChainStore>,
}

impl ChainSpace {
    /// Create a chain space backed by `MemoryChainStore`
    pub fn new(config: ChainConfig) -> Self {
        Self::with_store(config, Box::new(MemoryChainStore::new()))
    }

    /// Create with a custom store
    pub fn with_store(config: ChainConfig, store: Box<dyn ChainStore>) -> Self {
        let registry = OperatorRegistry::new(&config);
        Self {
            config,
            registry,
            store,
        }
    }

    /// Get the configuration
    pub fn config(&self) -> &ChainConfig {
        &self.config
    }

    pub fn registry(&self) -> &OperatorRegistry {
        &self.registry
    }

    // ========================================================================
    // BUILD
    // ========================================================================

    /// Add an element, naming the operator by symbol or alias
    ///
    /// The before-value is `explicit_before` if given, else the parent's
    /// result, else the configured root value.
    pub fn add_element(
        &mut self,
        symbol: &str,
        operand: impl Into<Operand>,
        parent: Option<NodeId>,
        explicit_before: Option<ChainValue>,
    ) -> ChainResult<NodeId> {
        let operator = self.registry.resolve(symbol)?;
        self.add(operator, operand, parent, explicit_before)
    }

    /// Add an element with a typed operator
    pub fn add(
        &mut self,
        operator: Operator,
        operand: impl Into<Operand>,
        parent: Option<NodeId>,
        explicit_before: Option<ChainValue>,
    ) -> ChainResult<NodeId> {
        let operand = operand.into();
        let (before, after) = self.compute(operator, &operand, parent, explicit_before)?;
        let id = self.store.allocate_id();
        self.store_element(ChainElement::new(id, parent, operator, operand, before, after))
    }

    /// Add an element under a caller-chosen id
    ///
    /// Fails with `DuplicateId` if the id is taken.
    pub fn add_with_id(
        &mut self,
        id: NodeId,
        operator: Operator,
        operand: impl Into<Operand>,
        parent: Option<NodeId>,
        explicit_before: Option<ChainValue>,
    ) -> ChainResult<NodeId> {
        if self.store.contains(id) {
            return Err(ChainError::DuplicateId(id));
        }
        let operand = operand.into();
        let (before, after) = self.compute(operator, &operand, parent, explicit_before)?;
        self.store_element(ChainElement::new(id, parent, operator, operand, before, after))
    }

    /// Build `Y ⊙ X ⊘ Y⁻¹` as a three-node chain and return the last node
    ///
    /// The nodes are a root `+ 0` starting from `Y`, then `⊙ X`, then
    /// `⊘ 1/Y`. The last node's result is bit-identical to
    /// [`kmr_tunnel`](crate::kmr_tunnel) whenever that succeeds.
    pub fn tunnel_chain(&mut self, y: f64, x: f64) -> ChainResult<NodeId> {
        if y == 0.0 {
            return Err(KmrError::InvalidArgument(
                "tunneling parameter Y cannot be zero".to_string(),
            )
            .into());
        }

        let start = self.add(Operator::Add, 0.0, None, Some(ChainValue::Number(y)))?;
        let through = self.add(Operator::Direct, x, Some(start), None)?;
        self.add(Operator::Inverse, 1.0 / y, Some(through), None)
    }

    fn store_element(&mut self, element: ChainElement) -> ChainResult<NodeId> {
        let id = element.id();
        if let ChainValue::Number(v) = element.value() {
            if is_undefined(*v) {
                log::warn!(
                    "node {id}: {} {} is undefined, storing NaN",
                    element.public.operator,
                    element.public.operand
                );
            }
        }
        log::debug!("node {id} created: {element}");
        self.store.insert(element)?;
        Ok(id)
    }

    // ========================================================================
    // EVALUATION
    // ========================================================================

    fn compute(
        &self,
        operator: Operator,
        operand: &Operand,
        parent: Option<NodeId>,
        explicit_before: Option<ChainValue>,
    ) -> ChainResult<(ChainValue, ChainValue)> {
        if !self.registry.is_enabled(operator) {
            return Err(ChainError::UnknownOperator(operator.symbol().to_string()));
        }
        let before = self.before_value(parent, explicit_before)?;
        let after = self.apply(operator, &before, operand)?;
        Ok((before, after))
    }

    fn before_value(
        &self,
        parent: Option<NodeId>,
        explicit_before: Option<ChainValue>,
    ) -> ChainResult<ChainValue> {
        let parent_value = match parent {
            Some(id) => Some(self.get_value(id)?),
            None => None,
        };
        Ok(match (explicit_before, parent_value) {
            (Some(value), _) => value,
            (None, Some(value)) => value.clone(),
            (None, None) => ChainValue::Number(self.config.root_value),
        })
    }

    fn apply(
        &self,
        operator: Operator,
        before: &ChainValue,
        operand: &Operand,
    ) -> ChainResult<ChainValue> {
        match operator.family() {
            OperatorFamily::Scalar => {
                let a = expect_number(operator, before)?;
                let b = match operand {
                    Operand::Number(v) => *v,
                    other => return Err(operand_type(operator, "number", other.kind())),
                };
                numeric(operator, a, b)
            }
            OperatorFamily::Reference => {
                let a = expect_number(operator, before)?;
                let b = match operand {
                    Operand::Number(v) => *v,
                    Operand::Node(id) => expect_number(operator, self.get_value(*id)?)?,
                    Operand::Function(_) => {
                        return Err(operand_type(operator, "number or node reference", "function"))
                    }
                };
                numeric(operator, a, b)
            }
            OperatorFamily::Functional => {
                let g = self.lift(operand)?;
                let f = before.to_function();
                let combined = match operator {
                    Operator::MakeFunc => g,
                    Operator::Compose => f.compose(&g),
                    _ => match operator.binary_op() {
                        Some(op) => Expr::binary(op, f, g),
                        None => return Err(ChainError::UnknownOperator(operator.to_string())),
                    },
                };
                Ok(ChainValue::Function(combined))
            }
        }
    }

    /// Operand as a function of `x`
    fn lift(&self, operand: &Operand) -> ChainResult<Expr> {
        Ok(match operand {
            Operand::Number(v) => Expr::Const(*v),
            Operand::Node(id) => self.get_value(*id)?.to_function(),
            Operand::Function(expr) => expr.clone(),
        })
    }

    // ========================================================================
    // QUERY
    // ========================================================================

    /// Numeric result of a node
    pub fn get_result(&self, id: NodeId) -> ChainResult<f64> {
        let value = self.get_value(id)?;
        value.as_number().ok_or(ChainError::OperandType {
            operator: "get_result",
            expected: "number",
            got: value.kind(),
        })
    }

    /// Result of a node, number or function
    pub fn get_value(&self, id: NodeId) -> ChainResult<&ChainValue> {
        self.get_element(id).map(ChainElement::value)
    }

    pub fn get_element(&self, id: NodeId) -> ChainResult<&ChainElement> {
        self.store.get(id).ok_or(ChainError::UnknownNode(id))
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.store.contains(id)
    }

    /// True if the node's before-value equals its parent's result
    ///
    /// Roots and unknown nodes are never consistent.
    pub fn check_consistency(&self, id: NodeId) -> bool {
        let Some(element) = self.store.get(id) else {
            return false;
        };
        let Some(parent) = element.parent().and_then(|p| self.store.get(p)) else {
            return false;
        };
        element.private.before == parent.private.after
    }

    /// Value of a node at `x`
    ///
    /// Function nodes are evaluated; numeric nodes ignore `x`.
    pub fn evaluate(&self, id: NodeId, x: f64) -> ChainResult<f64> {
        Ok(match self.get_value(id)? {
            ChainValue::Number(v) => *v,
            ChainValue::Function(expr) => expr.eval(x),
        })
    }

    /// Elements from the root down to `id`
    pub fn path(&self, id: NodeId) -> ChainResult<Vec<&ChainElement>> {
        let mut path = vec![self.get_element(id)?];
        let mut current = path[0].parent();
        while let Some(parent) = current {
            let element = self.get_element(parent)?;
            current = element.parent();
            path.push(element);
        }
        path.reverse();
        Ok(path)
    }

    /// Direct children of `id`, ordered by id
    pub fn children(&self, id: NodeId) -> Vec<&ChainElement> {
        let mut children: Vec<_> = self
            .store
            .iter()
            .filter(|element| element.parent() == Some(id))
            .collect();
        children.sort_by_key(|element| element.id());
        children
    }

    /// Get the number of stored elements
    pub fn len(&self) -> usize {
        self.store.len()
    }

    /// Check if the space is empty
    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    /// Clear all elements
    pub fn clear(&mut self) {
        self.store.clear();
    }
}

impl Default for ChainSpace {
    fn default() -> Self {
        Self::new(ChainConfig::default())
    }
}

impl fmt::Display for ChainSpace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ChainSpace(elements={})", self.len())
    }
}

fn operand_type(operator: Operator, expected: &'static str, got: &'static str) -> ChainError {
    ChainError::OperandType {
        operator: operator.symbol(),
        expected,
        got,
    }
}

fn expect_number(operator: Operator, value: &ChainValue) -> ChainResult<f64> {
    value
        .as_number()
        .ok_or_else(|| operand_type(operator, "number", value.kind()))
}

/// Scalar step; division by zero fails, KMR singularities store NaN
fn numeric(operator: Operator, a: f64, b: f64) -> ChainResult<ChainValue> {
    let op = operator
        .binary_op()
        .ok_or_else(|| ChainError::UnknownOperator(operator.to_string()))?;
    if op == BinaryOp::Div && b == 0.0 {
        return Err(KmrError::undefined(operator.symbol(), "division by zero").into());
    }
    Ok(ChainValue::Number(op.apply(a, b)))
}
