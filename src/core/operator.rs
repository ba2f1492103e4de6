//! # Operator Primitives
//!
//! The two elementary KMR transformations:
//!
//! ```text
//! A ⊙ K = A / (1 + K·A)     (direct)
//! A ⊘ K = A / (1 - K·A)     (inverse)
//! ```
//!
//! In reciprocal space they are plain shifts, `1/(A ⊙ K) = 1/A + K` and
//! `1/(A ⊘ K) = 1/A - K`, which is what every higher-level formula relies on.
//!
//! A vanishing denominator does not panic and is not an error here: the
//! result is the NaN sentinel, and composed formulas check for it.

use crate::core::config::SINGULARITY_THRESHOLD;

/// Direct operator `A ⊙ K = A / (1 + K·A)`
///
/// Returns `0` for `A == 0` and NaN when `|1 + K·A| < 1e-15`.
pub fn kmr_direct(a: f64, k: f64) -> f64 {
    guarded(a, 1.0 + k * a)
}

/// Inverse operator `A ⊘ K = A / (1 - K·A)`
///
/// Returns `0` for `A == 0` and NaN when `|1 - K·A| < 1e-15`.
pub fn kmr_inverse(a: f64, k: f64) -> f64 {
    guarded(a, 1.0 - k * a)
}

/// `A ⊙ 1`
pub fn kmr_direct_unit(a: f64) -> f64 {
    kmr_direct(a, 1.0)
}

/// `A ⊘ 1`
pub fn kmr_inverse_unit(a: f64) -> f64 {
    kmr_inverse(a, 1.0)
}

/// True if `value` is the undefined sentinel
#[inline]
pub fn is_undefined(value: f64) -> bool {
    value.is_nan()
}

#[inline]
fn guarded(a: f64, denominator: f64) -> f64 {
    if a == 0.0 {
        return 0.0;
    }
    if denominator.abs() < SINGULARITY_THRESHOLD {
        return f64::NAN;
    }
    a / denominator
}

/// Numeric binary operations understood by chains and expressions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BinaryOp {
    /// `⊙`
    Direct,
    /// `⊘`
    Inverse,
    Add,
    Sub,
    Mul,
    Div,
}

impl BinaryOp {
    pub const ALL: [BinaryOp; 6] = [
        BinaryOp::Direct,
        BinaryOp::Inverse,
        BinaryOp::Add,
        BinaryOp::Sub,
        BinaryOp::Mul,
        BinaryOp::Div,
    ];

    pub fn symbol(&self) -> &'static str {
        match self {
            BinaryOp::Direct => "⊙",
            BinaryOp::Inverse => "⊘",
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
        }
    }

    /// Apply to `(a, b)`
    ///
    /// KMR operators use the guarded primitives. Division by zero yields
    /// the NaN sentinel rather than an infinity.
    pub fn apply(&self, a: f64, b: f64) -> f64 {
        match self {
            BinaryOp::Direct => kmr_direct(a, b),
            BinaryOp::Inverse => kmr_inverse(a, b),
            BinaryOp::Add => a + b,
            BinaryOp::Sub => a - b,
            BinaryOp::Mul => a * b,
            BinaryOp::Div => {
                if b == 0.0 {
                    f64::NAN
                } else {
                    a / b
                }
            }
        }
    }

    /// True for `⊙` and `⊘`
    pub fn is_kmr(&self) -> bool {
        matches!(self, BinaryOp::Direct | BinaryOp::Inverse)
    }
}

impl std::fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Which operands a chain operator accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperatorFamily {
    /// Numbers only
    Scalar,
    /// Numbers or references to other nodes
    Reference,
    /// Numbers, references or functions, combined symbolically
    Functional,
}

/// Operators a chain node can apply to its before-value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Operator {
    Direct,
    Inverse,
    Add,
    Sub,
    Mul,
    Div,

    DirectId,
    InverseId,
    AddId,
    SubId,
    MulId,
    DivId,

    DirectFunc,
    InverseFunc,
    AddFunc,
    SubFunc,
    MulFunc,
    DivFunc,
    /// Replace the before-value with the operand as a function
    MakeFunc,
    /// `before(operand(x))`
    Compose,
}

impl Operator {
    pub const ALL: [Operator; 20] = [
        Operator::Direct,
        Operator::Inverse,
        Operator::Add,
        Operator::Sub,
        Operator::Mul,
        Operator::Div,
        Operator::DirectId,
        Operator::InverseId,
        Operator::AddId,
        Operator::SubId,
        Operator::MulId,
        Operator::DivId,
        Operator::DirectFunc,
        Operator::InverseFunc,
        Operator::AddFunc,
        Operator::SubFunc,
        Operator::MulFunc,
        Operator::DivFunc,
        Operator::MakeFunc,
        Operator::Compose,
    ];

    /// Canonical symbol
    pub fn symbol(&self) -> &'static str {
        match self {
            Operator::Direct => "⊙",
            Operator::Inverse => "⊘",
            Operator::Add => "+",
            Operator::Sub => "-",
            Operator::Mul => "*",
            Operator::Div => "/",
            Operator::DirectId => "⊙id",
            Operator::InverseId => "⊘id",
            Operator::AddId => "+id",
            Operator::SubId => "-id",
            Operator::MulId => "*id",
            Operator::DivId => "/id",
            Operator::DirectFunc => "⊙f",
            Operator::InverseFunc => "⊘f",
            Operator::AddFunc => "+f",
            Operator::SubFunc => "-f",
            Operator::MulFunc => "*f",
            Operator::DivFunc => "/f",
            Operator::MakeFunc => "make_func",
            Operator::Compose => "∘",
        }
    }

    pub fn family(&self) -> OperatorFamily {
        match self {
            Operator::Direct
            | Operator::Inverse
            | Operator::Add
            | Operator::Sub
            | Operator::Mul
            | Operator::Div => OperatorFamily::Scalar,
            Operator::DirectId
            | Operator::InverseId
            | Operator::AddId
            | Operator::SubId
            | Operator::MulId
            | Operator::DivId => OperatorFamily::Reference,
            _ => OperatorFamily::Functional,
        }
    }

    /// The numeric operation behind this operator, if any
    ///
    /// `None` for `MakeFunc` and `Compose`.
    pub fn binary_op(&self) -> Option<BinaryOp> {
        match self {
            Operator::Direct | Operator::DirectId | Operator::DirectFunc => Some(BinaryOp::Direct),
            Operator::Inverse | Operator::InverseId | Operator::InverseFunc => {
                Some(BinaryOp::Inverse)
            }
            Operator::Add | Operator::AddId | Operator::AddFunc => Some(BinaryOp::Add),
            Operator::Sub | Operator::SubId | Operator::SubFunc => Some(BinaryOp::Sub),
            Operator::Mul | Operator::MulId | Operator::MulFunc => Some(BinaryOp::Mul),
            Operator::Div | Operator::DivId | Operator::DivFunc => Some(BinaryOp::Div),
            Operator::MakeFunc | Operator::Compose => None,
        }
    }
}

impl std::fmt::Display for Operator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.symbol())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn close(a: f64, b: f64, tol: f64) -> bool {
        (a - b).abs() <= tol * b.abs().max(1.0)
    }

    /// Sample (A, K) pairs kept away from both poles
    fn samples(seed: u64, n: usize) -> Vec<(f64, f64)> {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut out = Vec::with_capacity(n);
        while out.len() < n {
            let a: f64 = rng.gen_range(-10.0..10.0);
            let k: f64 = rng.gen_range(-10.0..10.0);
            if (1.0 + k * a).abs() > 0.1 && (1.0 - k * a).abs() > 0.1 {
                out.push((a, k));
            }
        }
        out
    }

    #[test]
    fn test_basic_values() {
        assert!(close(kmr_direct(2.0, 3.0), 2.0 / 7.0, 1e-15));
        assert!(close(kmr_inverse(2.0, 3.0), -0.4, 1e-15));
        assert!(close(kmr_direct(10.0, 0.1), 5.0, 1e-15));
        assert!(close(kmr_inverse(0.5, 4.0), -0.5, 1e-15));
    }

    #[test]
    fn test_zero_operand_short_circuits() {
        assert_eq!(kmr_direct(0.0, 1e300), 0.0);
        assert_eq!(kmr_inverse(0.0, -7.0), 0.0);
        // Even where the denominator would be singular for any other A
        assert_eq!(kmr_direct(0.0, f64::INFINITY), 0.0);
    }

    #[test]
    fn test_singularity_is_nan() {
        // 1 + (-0.5)(2) = 0
        let r = kmr_direct(2.0, -0.5);
        assert!(is_undefined(r));
        assert!(!r.is_infinite());

        // 1 - (1)(1) = 0
        assert!(is_undefined(kmr_inverse(1.0, 1.0)));
        assert!(is_undefined(kmr_inverse_unit(1.0)));
        assert!(is_undefined(kmr_direct_unit(-1.0)));
    }

    #[test]
    fn test_near_pole_is_defined_but_large() {
        // Precision degrades close to the pole, but the value stays defined
        for delta in [1e-3, 1e-6, 1e-9, 1e-12] {
            let r = kmr_direct(2.0, -0.5 + delta);
            assert!(!is_undefined(r));
            assert!(r.abs() > 1.0 / delta * 0.5);
        }
    }

    #[test]
    fn test_unit_forms() {
        assert!(close(kmr_direct_unit(3.0), 0.75, 1e-15));
        assert!(close(kmr_inverse_unit(3.0), -1.5, 1e-15));
    }

    #[test]
    fn test_round_trip_inversion() {
        for (a, k) in samples(7, 500) {
            let back = kmr_inverse(kmr_direct(a, k), k);
            assert!(close(back, a, 1e-10), "A={a} K={k} back={back}");
        }
    }

    #[test]
    fn test_inverse_then_direct() {
        for (a, k) in samples(11, 500) {
            let back = kmr_direct(kmr_inverse(a, k), k);
            assert!(close(back, a, 1e-10), "A={a} K={k} back={back}");
        }
    }

    #[test]
    fn test_duality() {
        for (a, k) in samples(13, 500) {
            assert_eq!(kmr_direct(a, k), kmr_inverse(a, -k));
        }
    }

    #[test]
    fn test_group_composition() {
        let mut rng = StdRng::seed_from_u64(17);
        let mut checked = 0;
        while checked < 500 {
            let a: f64 = rng.gen_range(-5.0..5.0);
            let k: f64 = rng.gen_range(-5.0..5.0);
            let c: f64 = rng.gen_range(-5.0..5.0);
            if (1.0 + k * a).abs() < 0.1 || (1.0 + (k + c) * a).abs() < 0.1 {
                continue;
            }
            let left = kmr_direct(kmr_direct(a, k), c);
            let right = kmr_direct(a, k + c);
            assert!(close(left, right, 1e-9), "A={a} K={k} C={c}");
            checked += 1;
        }
    }

    #[test]
    fn test_scaling() {
        // λ·(A ⊙ K) = (λA) ⊙ (K/λ)
        let lambda = 3.0;
        for a in [1.0, 2.0, 3.0, 5.0, 10.0] {
            let left = lambda * kmr_direct(a, 2.0);
            let right = kmr_direct(lambda * a, 2.0 / lambda);
            assert!(close(left, right, 1e-12));
        }
    }

    #[test]
    fn test_binary_op_apply() {
        assert_eq!(BinaryOp::Add.apply(2.0, 3.0), 5.0);
        assert_eq!(BinaryOp::Sub.apply(2.0, 3.0), -1.0);
        assert_eq!(BinaryOp::Mul.apply(2.0, 3.0), 6.0);
        assert_eq!(BinaryOp::Div.apply(3.0, 2.0), 1.5);
        assert!(BinaryOp::Div.apply(3.0, 0.0).is_nan());
        assert_eq!(BinaryOp::Direct.apply(2.0, 3.0), kmr_direct(2.0, 3.0));
        assert!(BinaryOp::Inverse.apply(1.0, 1.0).is_nan());
    }

    #[test]
    fn test_binary_op_symbols() {
        let symbols: Vec<_> = BinaryOp::ALL.iter().map(|op| op.symbol()).collect();
        assert_eq!(symbols, vec!["⊙", "⊘", "+", "-", "*", "/"]);
        assert!(BinaryOp::Direct.is_kmr());
        assert!(!BinaryOp::Mul.is_kmr());
        assert_eq!(BinaryOp::Inverse.to_string(), "⊘");
    }

    #[test]
    fn test_operator_families() {
        let scalar = Operator::ALL
            .iter()
            .filter(|op| op.family() == OperatorFamily::Scalar)
            .count();
        let reference = Operator::ALL
            .iter()
            .filter(|op| op.family() == OperatorFamily::Reference)
            .count();
        assert_eq!(scalar, 6);
        assert_eq!(reference, 6);
        assert_eq!(Operator::Compose.family(), OperatorFamily::Functional);
        assert_eq!(Operator::MakeFunc.binary_op(), None);
        assert_eq!(Operator::DivId.binary_op(), Some(BinaryOp::Div));
        assert_eq!(Operator::InverseFunc.to_string(), "⊘f");
    }
}
