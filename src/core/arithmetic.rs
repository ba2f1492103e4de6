//! # Derived Arithmetic
//!
//! Classical `+` and `-` re-expressed through the KMR primitives, threaded
//! through an auxiliary value `A`:
//!
//! ```text
//! K + C =  1 / (((A ⊙ K) ⊙ C) ⊘ A⁻¹)
//! K - C = -1 / (((A ⊘ K) ⊙ C) ⊘ A⁻¹)
//! ```
//!
//! The identities hold for any `A ≠ 0` in exact arithmetic, except where an
//! intermediate step sits on a pole: `1/A + K = 0` or `1/A + K + C = 0` for
//! addition, `1/A - K = 0` or `1/A - K + C = 0` for subtraction. Those inputs
//! are `Undefined`, at `A = 1` as anywhere else (`kmr_sub(1, 3, 2)` fails).
//!
//! In floating point the `1/A` shift is added and removed again, so the
//! absolute error grows roughly like `ulp / |A|`: away from the poles the
//! result matches the classical one to full precision around `A = 1` and only
//! approximately as `A → 0`.
//!
//! Large `|A·K|` has the opposite problem. Once `|A·K| ≳ 1e15` the
//! denominators `1 ± K·X` lose every significant digit and fall under the
//! singularity threshold, so `kmr_sub(1e12, 1e6, 1e6)` is `Undefined` instead
//! of `0`. Keep `|A·K|` and `|A·C|` well below `1e15`.
//!
//! `|A| < ε` is replaced by `sign(A)·ε` (positive at exactly `A == 0`) so the
//! construction stays inside the operator framework. This is a deliberate
//! approximation of the classical limit, not an exact match.
//!
//! Subtraction uses the outer-negation form above. An alternative form that
//! starts from `(-A) ⊘ K` without the outer negation is not provided.

use crate::core::config::DEFAULT_EPSILON;
use crate::core::error::{KmrError, KmrResult};
use crate::core::operator::{is_undefined, kmr_direct, kmr_inverse};

/// `K + C` through KMR operators with the default ε
pub fn kmr_add(a: f64, k: f64, c: f64) -> KmrResult<f64> {
    kmr_add_with_epsilon(a, k, c, DEFAULT_EPSILON)
}

/// `K - C` through KMR operators with the default ε
pub fn kmr_sub(a: f64, k: f64, c: f64) -> KmrResult<f64> {
    kmr_sub_with_epsilon(a, k, c, DEFAULT_EPSILON)
}

/// `K + C` through KMR operators
pub fn kmr_add_with_epsilon(a: f64, k: f64, c: f64, epsilon: f64) -> KmrResult<f64> {
    let a = adjust_auxiliary(a, epsilon)?;

    let x = checked("kmr_add", "A ⊙ K", kmr_direct(a, k))?;
    let y = checked("kmr_add", "(A ⊙ K) ⊙ C", kmr_direct(x, c))?;

    reciprocal_of_inverse("kmr_add", y, 1.0 / a)
}

/// `K - C` through KMR operators
pub fn kmr_sub_with_epsilon(a: f64, k: f64, c: f64, epsilon: f64) -> KmrResult<f64> {
    let a = adjust_auxiliary(a, epsilon)?;

    let x = checked("kmr_sub", "A ⊘ K", kmr_inverse(a, k))?;
    let y = checked("kmr_sub", "(A ⊘ K) ⊙ C", kmr_direct(x, c))?;

    Ok(-reciprocal_of_inverse("kmr_sub", y, 1.0 / a)?)
}

/// Replace `|A| < ε` with `sign(A)·ε`
fn adjust_auxiliary(a: f64, epsilon: f64) -> KmrResult<f64> {
    if !(epsilon.is_finite() && epsilon > 0.0) {
        return Err(KmrError::InvalidArgument(format!(
            "epsilon must be finite and positive, got {epsilon}"
        )));
    }

    if a.abs() < epsilon {
        let adjusted = if a < 0.0 { -epsilon } else { epsilon };
        log::debug!("auxiliary A={a} below epsilon, using {adjusted}");
        Ok(adjusted)
    } else {
        Ok(a)
    }
}

fn checked(operation: &'static str, step: &str, value: f64) -> KmrResult<f64> {
    if is_undefined(value) {
        Err(KmrError::undefined(operation, format!("{step} is singular")))
    } else {
        Ok(value)
    }
}

/// `1 / (Y ⊘ B)`, evaluated as `(1 - B·Y) / Y`
///
/// At the pole of the inverse step `Z` diverges and its reciprocal is
/// exactly zero, so the pole maps to a `0` result instead of NaN.
/// `Y == 0` makes `Z` zero and the reciprocal undefined.
fn reciprocal_of_inverse(operation: &'static str, y: f64, b: f64) -> KmrResult<f64> {
    if y == 0.0 {
        return Err(KmrError::undefined(operation, "Z is zero, 1/Z undefined"));
    }
    let reciprocal = (1.0 - b * y) / y;
    if is_undefined(reciprocal) {
        return Err(KmrError::undefined(operation, "1/Z is not a number"));
    }
    Ok(reciprocal)
}
