//! # Chain Model
//!
//! Records of a chain node, split the way the space exposes them:
//!
//! ```text
//! ChainElement
//! ├── public:  id, operand, operator         (what was applied)
//! └── private: id, parent, before, after     (where it sits, what it holds)
//! ```
//!
//! Invariant at creation: `after == operator(before, operand)`. Without an
//! explicit before-value, `before` is the parent's `after`.

use std::fmt;

use crate::core::expr::Expr;
use crate::core::operator::Operator;

/// Identifier of a chain node
///
/// Assigned by the store, unique within it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NodeId(u64);

impl NodeId {
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

/// Value held by a node: a number or a function of one variable
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ChainValue {
    Number(f64),
    Function(Expr),
}

impl ChainValue {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            ChainValue::Number(v) => Some(*v),
            ChainValue::Function(_) => None,
        }
    }

    pub fn as_function(&self) -> Option<&Expr> {
        match self {
            ChainValue::Function(expr) => Some(expr),
            ChainValue::Number(_) => None,
        }
    }

    /// Lift to a function; numbers become constants
    pub fn to_function(&self) -> Expr {
        match self {
            ChainValue::Number(v) => Expr::Const(*v),
            ChainValue::Function(expr) => expr.clone(),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            ChainValue::Number(_) => "number",
            ChainValue::Function(_) => "function",
        }
    }
}

impl From<f64> for ChainValue {
    fn from(value: f64) -> Self {
        ChainValue::Number(value)
    }
}

impl From<Expr> for ChainValue {
    fn from(expr: Expr) -> Self {
        ChainValue::Function(expr)
    }
}

impl fmt::Display for ChainValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChainValue::Number(v) => write!(f, "{v}"),
            ChainValue::Function(expr) => write!(f, "f(x) = {expr}"),
        }
    }
}

/// What a node applies to its before-value
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Operand {
    Number(f64),
    /// The result of another node
    Node(NodeId),
    Function(Expr),
}

impl Operand {
    /// Predefined function name or expression source in `x`
    pub fn function(src: &str) -> Result<Self, crate::core::expr::ParseError> {
        Expr::resolve(src).map(Operand::Function)
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Operand::Number(_) => "number",
            Operand::Node(_) => "node reference",
            Operand::Function(_) => "function",
        }
    }
}

impl From<f64> for Operand {
    fn from(value: f64) -> Self {
        Operand::Number(value)
    }
}

impl From<NodeId> for Operand {
    fn from(id: NodeId) -> Self {
        Operand::Node(id)
    }
}

impl From<Expr> for Operand {
    fn from(expr: Expr) -> Self {
        Operand::Function(expr)
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Number(v) => write!(f, "{v}"),
            Operand::Node(id) => write!(f, "ref:{id}"),
            Operand::Function(expr) => write!(f, "{expr}"),
        }
    }
}

/// Public part of a node: what was applied
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PublicElement {
    pub id: NodeId,
    pub operand: Operand,
    pub operator: Operator,
}

/// Private part of a node: its place in the chain and its values
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PrivateElement {
    pub id: NodeId,
    /// `None` for roots
    pub parent: Option<NodeId>,
    pub before: ChainValue,
    pub after: ChainValue,
}

/// A stored chain node
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ChainElement {
    pub public: PublicElement,
    pub private: PrivateElement,
}

impl ChainElement {
    pub fn new(
        id: NodeId,
        parent: Option<NodeId>,
        operator: Operator,
        operand: Operand,
        before: ChainValue,
        after: ChainValue,
    ) -> Self {
        Self {
            public: PublicElement {
                id,
                operand,
                operator,
            },
            private: PrivateElement {
                id,
                parent,
                before,
                after,
            },
        }
    }

    pub fn id(&self) -> NodeId {
        self.public.id
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.private.parent
    }

    /// The node's result
    pub fn value(&self) -> &ChainValue {
        &self.private.after
    }
}

impl fmt::Display for ChainElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} [{} {}] {} -> {}",
            self.public.id,
            self.public.operator,
            self.public.operand,
            self.private.before,
            self.private.after
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_id_display() {
        assert_eq!(NodeId::from_raw(255).to_string(), "00000000000000ff");
        assert_eq!(NodeId::from_raw(7).as_u64(), 7);
    }

    #[test]
    fn test_chain_value_accessors() {
        let n = ChainValue::from(2.5);
        assert_eq!(n.as_number(), Some(2.5));
        assert!(n.as_function().is_none());
        assert_eq!(n.to_function(), Expr::Const(2.5));

        let f = ChainValue::from(Expr::Var);
        assert_eq!(f.as_number(), None);
        assert_eq!(f.as_function(), Some(&Expr::Var));
        assert_eq!(f.kind(), "function");
        assert_eq!(f.to_string(), "f(x) = x");
    }

    #[test]
    fn test_operand_function() {
        let op = Operand::function("square").unwrap();
        match op {
            Operand::Function(expr) => assert_eq!(expr.eval(3.0), 9.0),
            other => panic!("expected function operand, got {other:?}"),
        }
        assert!(Operand::function("x +").is_err());
    }

    #[test]
    fn test_element_display() {
        let element = ChainElement::new(
            NodeId::from_raw(1),
            None,
            Operator::Direct,
            Operand::Number(3.0),
            ChainValue::Number(2.0),
            ChainValue::Number(2.0 / 7.0),
        );
        let rendered = element.to_string();
        assert!(rendered.starts_with("0000000000000001 [⊙ 3] 2 -> 0.2857"));
        assert_eq!(element.value(), &ChainValue::Number(2.0 / 7.0));
        assert_eq!(element.parent(), None);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_element_serde_roundtrip() {
        let element = ChainElement::new(
            NodeId::from_raw(3),
            Some(NodeId::from_raw(2)),
            Operator::DirectFunc,
            Operand::Number(2.0),
            ChainValue::Function(Expr::Var),
            ChainValue::Function(Expr::binary(
                crate::core::operator::BinaryOp::Direct,
                Expr::Var,
                Expr::Const(2.0),
            )),
        );
        let json = serde_json::to_string(&element).unwrap();
        let back: ChainElement = serde_json::from_str(&json).unwrap();
        assert_eq!(back, element);
    }
}
