//! # Operator Registry
//!
//! Maps the symbols and aliases accepted by `ChainSpace::add_element` onto
//! [`Operator`]. Built once from a [`ChainConfig`]; which families are
//! registered is fixed for the life of the space.
//!
//! Canonical symbols match exactly (`⊙`, `+id`, `make_func`, ...). Aliases
//! match case-insensitively (`Direct`, `PLUS_ID`, `compose`, ...).

use std::collections::HashMap;

use crate::core::config::ChainConfig;
use crate::core::operator::{Operator, OperatorFamily};
use crate::ports::{ChainError, ChainResult};

const SCALAR_ALIASES: &[(&str, Operator)] = &[
    ("dircly", Operator::Direct),
    ("direct", Operator::Direct),
    ("dir", Operator::Direct),
    ("invly", Operator::Inverse),
    ("inverse", Operator::Inverse),
    ("inv", Operator::Inverse),
    ("add", Operator::Add),
    ("sub", Operator::Sub),
    ("mul", Operator::Mul),
    ("div", Operator::Div),
];

const REFERENCE_ALIASES: &[(&str, Operator)] = &[
    ("dircly_id", Operator::DirectId),
    ("direct_id", Operator::DirectId),
    ("dir_id", Operator::DirectId),
    ("kmr_direct_id", Operator::DirectId),
    ("invly_id", Operator::InverseId),
    ("inverse_id", Operator::InverseId),
    ("inv_id", Operator::InverseId),
    ("kmr_inverse_id", Operator::InverseId),
    ("add_id", Operator::AddId),
    ("addition_id", Operator::AddId),
    ("plus_id", Operator::AddId),
    ("sub_id", Operator::SubId),
    ("subtract_id", Operator::SubId),
    ("minus_id", Operator::SubId),
    ("mul_id", Operator::MulId),
    ("multiply_id", Operator::MulId),
    ("times_id", Operator::MulId),
    ("div_id", Operator::DivId),
    ("divide_id", Operator::DivId),
    ("division_id", Operator::DivId),
];

const FUNCTIONAL_ALIASES: &[(&str, Operator)] = &[
    ("identity", Operator::MakeFunc),
    ("create_func", Operator::MakeFunc),
    ("func", Operator::MakeFunc),
    ("dircly_f", Operator::DirectFunc),
    ("direct_f", Operator::DirectFunc),
    ("kmr_direct_f", Operator::DirectFunc),
    ("invly_f", Operator::InverseFunc),
    ("inverse_f", Operator::InverseFunc),
    ("kmr_inverse_f", Operator::InverseFunc),
    ("add_f", Operator::AddFunc),
    ("addition_f", Operator::AddFunc),
    ("plus_f", Operator::AddFunc),
    ("sub_f", Operator::SubFunc),
    ("subtract_f", Operator::SubFunc),
    ("minus_f", Operator::SubFunc),
    ("mul_f", Operator::MulFunc),
    ("multiply_f", Operator::MulFunc),
    ("times_f", Operator::MulFunc),
    ("div_f", Operator::DivFunc),
    ("divide_f", Operator::DivFunc),
    ("division_f", Operator::DivFunc),
    ("compose", Operator::Compose),
    ("composition", Operator::Compose),
];

/// Symbol and alias lookup for chain operators
#[derive(Debug, Clone)]
pub struct OperatorRegistry {
    /// Canonical symbols, matched exactly
    symbols: HashMap<&'static str, Operator>,

    /// Lower-cased aliases
    aliases: HashMap<&'static str, Operator>,
}

impl OperatorRegistry {
    /// Build the table for the families enabled in `config`
    pub fn new(config: &ChainConfig) -> Self {
        let mut registry = Self {
            symbols: HashMap::new(),
            aliases: HashMap::new(),
        };

        registry.register(OperatorFamily::Scalar, SCALAR_ALIASES);
        if config.id_operations {
            registry.register(OperatorFamily::Reference, REFERENCE_ALIASES);
        }
        if config.functional_operations {
            registry.register(OperatorFamily::Functional, FUNCTIONAL_ALIASES);
        }

        log::debug!(
            "operator registry: {} symbols, {} aliases",
            registry.symbols.len(),
            registry.aliases.len()
        );
        registry
    }

    fn register(&mut self, family: OperatorFamily, aliases: &[(&'static str, Operator)]) {
        for op in Operator::ALL.iter().filter(|op| op.family() == family) {
            self.symbols.insert(op.symbol(), *op);
        }
        for &(alias, op) in aliases {
            self.aliases.insert(alias, op);
        }
    }

    /// Look up a symbol or alias
    pub fn resolve(&self, symbol: &str) -> ChainResult<Operator> {
        if let Some(op) = self.symbols.get(symbol) {
            return Ok(*op);
        }
        self.aliases
            .get(symbol.to_lowercase().as_str())
            .copied()
            .ok_or_else(|| ChainError::UnknownOperator(symbol.to_string()))
    }

    /// True if `operator`'s family is registered
    pub fn is_enabled(&self, operator: Operator) -> bool {
        self.symbols.contains_key(operator.symbol())
    }

    pub fn contains(&self, symbol: &str) -> bool {
        self.resolve(symbol).is_ok()
    }

    /// Registered operators, in declaration order
    pub fn operators(&self) -> impl Iterator<Item = Operator> + '_ {
        Operator::ALL
            .iter()
            .copied()
            .filter(move |op| self.is_enabled(*op))
    }

    /// Number of registered operators
    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }
}

impl Default for OperatorRegistry {
    fn default() -> Self {
        Self::new(&ChainConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalar_registry() {
        let registry = OperatorRegistry::new(&ChainConfig::new());

        assert_eq!(registry.len(), 6);
        assert_eq!(registry.resolve("⊙").unwrap(), Operator::Direct);
        assert_eq!(registry.resolve("dircly").unwrap(), Operator::Direct);
        assert_eq!(registry.resolve("inv").unwrap(), Operator::Inverse);
        assert_eq!(registry.resolve("/").unwrap(), Operator::Div);
    }

    #[test]
    fn test_aliases_ignore_case() {
        let registry = OperatorRegistry::new(&ChainConfig::full());

        assert_eq!(registry.resolve("Direct").unwrap(), Operator::Direct);
        assert_eq!(registry.resolve("PLUS_ID").unwrap(), Operator::AddId);
        assert_eq!(registry.resolve("Compose").unwrap(), Operator::Compose);
    }

    #[test]
    fn test_disabled_families_are_unknown() {
        let registry = OperatorRegistry::new(&ChainConfig::new());

        for symbol in ["+id", "add_id", "⊙f", "make_func", "identity", "∘"] {
            match registry.resolve(symbol) {
                Err(ChainError::UnknownOperator(s)) => assert_eq!(s, symbol),
                other => panic!("{symbol}: expected UnknownOperator, got {other:?}"),
            }
        }
        assert!(!registry.is_enabled(Operator::MulId));
    }

    #[test]
    fn test_full_registry() {
        let registry = OperatorRegistry::new(&ChainConfig::full());

        assert_eq!(registry.len(), Operator::ALL.len());
        for op in Operator::ALL {
            assert_eq!(registry.resolve(op.symbol()).unwrap(), op);
        }
        assert_eq!(registry.resolve("times_id").unwrap(), Operator::MulId);
        assert_eq!(registry.resolve("identity").unwrap(), Operator::MakeFunc);
        assert_eq!(registry.resolve("division_f").unwrap(), Operator::DivFunc);
        assert_eq!(registry.operators().count(), 20);
    }

    #[test]
    fn test_partial_is_not_registered() {
        let registry = OperatorRegistry::new(&ChainConfig::full());
        assert!(!registry.contains("partial"));
        assert!(!registry.contains("partial_apply"));
    }

    #[test]
    fn test_single_family() {
        let registry = OperatorRegistry::new(&ChainConfig::new().with_id_operations(true));

        assert_eq!(registry.len(), 12);
        assert!(registry.contains("⊘id"));
        assert!(!registry.contains("⊘f"));
    }
}
