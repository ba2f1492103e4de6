//! # Chain Extraction
//!
//! Recover one unknown operand of a direct-operator chain
//!
//! ```text
//! A1 ⊙ A2 ⊙ ... ⊙ An = X
//! ```
//!
//! given `X` and every other operand. The chain is not associative, so order
//! matters: it is always folded left to right.
//!
//! ## Formulas
//!
//! ```text
//! A1 = X ⊘ An ⊘ ... ⊘ A2
//! An = 1/X - 1/(A1 ⊙ ... ⊙ A(n-1))
//! Ak = 1/D - 1/L      L = A1 ⊙ ... ⊙ A(k-1)
//!                     D = X ⊘ An ⊘ ... ⊘ A(k+1)
//! ```
//!
//! `D` cancels EVERY operand right of position `k`, last one first.
//! Cancelling only `A(k+1)` yields `Ak + A(k+2) + ... + An` instead of `Ak`,
//! which only coincides with the right answer for `k = n - 1`.

use crate::core::config::{
    EXTRACTION_ABS_TOLERANCE, EXTRACTION_REL_TOLERANCE, SINGULARITY_THRESHOLD,
};
use crate::core::error::{KmrError, KmrResult};
use crate::core::operator::{is_undefined, kmr_direct, kmr_inverse};

/// Fold `⊙` left to right: `A1 ⊙ A2 ⊙ ... ⊙ An`
///
/// Empty input yields `0`; a singular step makes the whole result NaN.
pub fn compute_chain(elements: &[f64]) -> f64 {
    let Some((&first, rest)) = elements.split_first() else {
        return 0.0;
    };

    let mut result = first;
    for &element in rest {
        result = kmr_direct(result, element);
        if is_undefined(result) {
            return f64::NAN;
        }
    }
    result
}

/// Cancel operands from the right: `X ⊘ An ⊘ ... ⊘ A1` for `elements = [A1..An]`
fn cancel_right(
    operation: &'static str,
    x: f64,
    elements: &[f64],
) -> KmrResult<f64> {
    let mut result = x;
    for &element in elements.iter().rev() {
        result = kmr_inverse(result, element);
        if is_undefined(result) {
            return Err(KmrError::undefined(
                operation,
                format!("inverse step ⊘ {element} is singular"),
            ));
        }
        log::trace!("{operation}: ⊘ {element} -> {result}");
    }
    Ok(result)
}

/// Extract `A1` from `X` and `[A2..An]`
pub fn extract_first(x: f64, rest: &[f64]) -> KmrResult<f64> {
    if rest.is_empty() {
        return Ok(x);
    }
    cancel_right("extract_first", x, rest)
}

/// Extract `An` from `X` and `[A1..A(n-1)]`
pub fn extract_last(x: f64, preceding: &[f64]) -> KmrResult<f64> {
    if preceding.is_empty() {
        return Ok(x);
    }

    let z = compute_chain(preceding);
    if is_undefined(z) {
        return Err(KmrError::undefined(
            "extract_last",
            "chain of preceding operands is singular",
        ));
    }
    if x == 0.0 {
        return Err(KmrError::undefined("extract_last", "cannot compute 1/X for X = 0"));
    }
    if z == 0.0 {
        return Err(KmrError::undefined("extract_last", "cannot compute 1/Z for Z = 0"));
    }

    Ok(1.0 / x - 1.0 / z)
}

/// Extract an interior `Ak` from `X`, `left = [A1..A(k-1)]` and
/// `right = [A(k+1)..An]`, both in chain order
pub fn extract_intermediate(x: f64, left: &[f64], right: &[f64]) -> KmrResult<f64> {
    let l = compute_chain(left);
    if is_undefined(l) {
        return Err(KmrError::undefined(
            "extract_intermediate",
            "cannot compute left part L",
        ));
    }

    let d = cancel_right("extract_intermediate", x, right)?;

    if d.abs() < SINGULARITY_THRESHOLD {
        return Err(KmrError::undefined(
            "extract_intermediate",
            format!("cannot compute 1/D: D={d} too close to zero"),
        ));
    }
    if l.abs() < SINGULARITY_THRESHOLD {
        return Err(KmrError::undefined(
            "extract_intermediate",
            format!("cannot compute 1/L: L={l} too close to zero"),
        ));
    }

    let result = 1.0 / d - 1.0 / l;
    log::trace!("extract_intermediate: L={l} D={d} -> {result}");

    if result.abs() < SINGULARITY_THRESHOLD {
        Ok(0.0)
    } else {
        Ok(result)
    }
}

/// Extract the `k`-th operand (1-based) of a chain with result `X`
///
/// `others` holds every operand except `Ak`, in chain order, so the chain
/// length is `others.len() + 1`.
pub fn extract_element(x: f64, k: usize, others: &[f64]) -> KmrResult<f64> {
    let n = others.len() + 1;
    if k < 1 || k > n {
        return Err(KmrError::IndexOutOfRange { index: k, len: n });
    }

    if k == 1 {
        extract_first(x, others)
    } else if k == n {
        extract_last(x, others)
    } else {
        let (left, right) = others.split_at(k - 1);
        extract_intermediate(x, left, right)
    }
}

/// Outcome of extracting one position of a known chain
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractionCheck {
    /// 1-based position
    pub index: usize,
    pub expected: f64,
    pub extracted: KmrResult<f64>,
}

impl ExtractionCheck {
    /// `|expected - extracted|`, if extraction succeeded
    pub fn difference(&self) -> Option<f64> {
        self.extracted
            .as_ref()
            .ok()
            .map(|v| (self.expected - v).abs())
    }

    /// Within `1e-12` relative or `1e-15` absolute
    pub fn success(&self) -> bool {
        match &self.extracted {
            Ok(v) => {
                let diff = (self.expected - v).abs();
                let scale = self.expected.abs().max(v.abs());
                diff <= (EXTRACTION_REL_TOLERANCE * scale).max(EXTRACTION_ABS_TOLERANCE)
            }
            Err(_) => false,
        }
    }
}

/// Compute `X` for `elements` and try to recover every position from it
pub fn verify_extraction(elements: &[f64]) -> KmrResult<Vec<ExtractionCheck>> {
    if elements.len() < 2 {
        return Err(KmrError::InvalidArgument(
            "chain must have at least 2 elements".to_string(),
        ));
    }

    let x = compute_chain(elements);
    if is_undefined(x) {
        return Err(KmrError::undefined("verify_extraction", "chain result is singular"));
    }

    let checks = (1..=elements.len())
        .map(|k| {
            let others: Vec<f64> = elements[..k - 1]
                .iter()
                .chain(&elements[k..])
                .copied()
                .collect();
            ExtractionCheck {
                index: k,
                expected: elements[k - 1],
                extracted: extract_element(x, k, &others),
            }
        })
        .collect();

    Ok(checks)
}
