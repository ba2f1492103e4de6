//! # Tunneling
//!
//! `Y ⊙ X ⊘ Y⁻¹ = X⁻¹` for any `Y ≠ 0`: the auxiliary `Y` is shifted in by
//! the direct step and shifted back out by the inverse step, leaving only the
//! reciprocal of `X`.

use crate::core::error::{KmrError, KmrResult};
use crate::core::operator::{is_undefined, kmr_direct, kmr_inverse};

/// Apply `Y ⊙ X ⊘ Y⁻¹`, which equals `1/X`
///
/// Fails with [`KmrError::InvalidArgument`] for `Y == 0` and with
/// [`KmrError::TunnelingUndefined`] when either step is singular
/// (which includes `X == 0`).
pub fn kmr_tunnel(y: f64, x: f64) -> KmrResult<f64> {
    if y == 0.0 {
        return Err(KmrError::InvalidArgument(
            "tunneling parameter Y cannot be zero".to_string(),
        ));
    }

    let through = kmr_direct(y, x);
    if is_undefined(through) {
        return Err(KmrError::TunnelingUndefined(format!(
            "Y ⊙ X is singular for Y={y}, X={x}"
        )));
    }

    let result = kmr_inverse(through, 1.0 / y);
    if is_undefined(result) {
        return Err(KmrError::TunnelingUndefined(format!(
            "(Y ⊙ X) ⊘ Y⁻¹ is singular for Y={y}, X={x}"
        )));
    }

    log::trace!("tunnel Y={y} X={x} -> {result}");
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_case() {
        let r = kmr_tunnel(2.0, 3.0).unwrap();
        assert!((r - 1.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_identity_over_parameters() {
        let cases = [
            (2.0, 3.0),
            (0.5, 4.0),
            (3.0, 0.25),
            (10.0, 10.0),
            (1.0, 1.0),
            (-2.0, 3.0),
            (2.0, -3.0),
            (1e-3, 7.0),
            (1e3, 0.01),
        ];
        for (y, x) in cases {
            let r = kmr_tunnel(y, x).unwrap();
            assert!((r - 1.0 / x).abs() < 1e-12 * (1.0 / x).abs().max(1.0), "Y={y} X={x} r={r}");
        }
    }

    #[test]
    fn test_independent_of_y() {
        let x = 4.0;
        let results: Vec<f64> = [0.1, 0.5, 1.0, 2.0, 7.5]
            .iter()
            .map(|&y| kmr_tunnel(y, x).unwrap())
            .collect();
        for r in results {
            assert!((r - 0.25).abs() < 1e-12);
        }
    }

    #[test]
    fn test_zero_y_is_invalid() {
        assert!(matches!(
            kmr_tunnel(0.0, 3.0),
            Err(KmrError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_singular_direct_step() {
        // 1 + X·Y = 0
        assert!(matches!(
            kmr_tunnel(2.0, -0.5),
            Err(KmrError::TunnelingUndefined(_))
        ));
    }

    #[test]
    fn test_zero_x_is_undefined() {
        // Y ⊙ 0 = Y, then Y ⊘ Y⁻¹ sits on the pole
        assert!(matches!(
            kmr_tunnel(2.0, 0.0),
            Err(KmrError::TunnelingUndefined(_))
        ));
    }
}
