//! Pearson and Spearman correlation
//!
//! Degenerate inputs (too short, zero variance) report "no relationship"
//! rather than failing.

use serde::{Deserialize, Serialize};

use super::ranking::rank;
use super::significance::{p_value, MIN_SIGNIFICANCE_N};
use super::round_to;
use crate::error::{VigorError, VigorResult};
use crate::models::{CorrelationMethod, CorrelationResult, StrengthTier};

/// Smallest sample for a Pearson coefficient
pub const MIN_PEARSON_N: usize = 3;

/// Smallest sample for a Spearman coefficient
pub const MIN_SPEARMAN_N: usize = MIN_SIGNIFICANCE_N;

/// Pearson product-moment correlation of two equal-length series.
///
/// Returns 0.0 for mismatched lengths, fewer than [`MIN_PEARSON_N`] values,
/// or when either series has zero variance.
pub fn pearson(x: &[f64], y: &[f64]) -> f64 {
    let n = x.len();
    if n != y.len() || n < MIN_PEARSON_N {
        return 0.0;
    }

    let nf = n as f64;
    let mean_x = x.iter().sum::<f64>() / nf;
    let mean_y = y.iter().sum::<f64>() / nf;

    let mut covariance = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    for (xi, yi) in x.iter().zip(y) {
        let dx = xi - mean_x;
        let dy = yi - mean_y;
        covariance += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }

    let denominator = (var_x * var_y).sqrt();
    if denominator == 0.0 || !denominator.is_finite() {
        return 0.0;
    }
    (covariance / denominator).clamp(-1.0, 1.0)
}

/// Spearman coefficient and its two-tailed p-value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SpearmanResult {
    pub rho: Option<f64>,
    pub p_value: Option<f64>,
}

/// Spearman rank correlation.
///
/// Both fields are `None` below [`MIN_SPEARMAN_N`] pairs or for mismatched
/// lengths. A constant input (every rank tied) has no monotonic relationship
/// and reports `rho = 0`.
pub fn spearman(x: &[f64], y: &[f64]) -> SpearmanResult {
    let n = x.len();
    if n != y.len() || n < MIN_SPEARMAN_N {
        return SpearmanResult::default();
    }
    if is_constant(x) || is_constant(y) {
        return SpearmanResult {
            rho: Some(0.0),
            p_value: p_value(0.0, n),
        };
    }

    let rx = rank(x);
    let ry = rank(y);
    let d_squared: f64 = rx.iter().zip(&ry).map(|(a, b)| (a - b).powi(2)).sum();

    let nf = n as f64;
    let rho = (1.0 - 6.0 * d_squared / (nf * (nf * nf - 1.0))).clamp(-1.0, 1.0);

    SpearmanResult {
        rho: Some(rho),
        p_value: p_value(rho, n),
    }
}

fn is_constant(values: &[f64]) -> bool {
    values.windows(2).all(|w| w[0] == w[1])
}

/// Correlate two labeled value arrays into a reportable result.
///
/// `Ok(None)` when the pair is below the significance sample gate.
pub fn correlate(
    label_a: &str,
    label_b: &str,
    x: &[f64],
    y: &[f64],
    method: CorrelationMethod,
) -> VigorResult<Option<CorrelationResult>> {
    if x.len() != y.len() {
        return Err(VigorError::LengthMismatch {
            left: x.len(),
            right: y.len(),
        });
    }
    let n = x.len();
    if n < MIN_SIGNIFICANCE_N {
        return Ok(None);
    }

    let (coefficient, p) = match method {
        CorrelationMethod::Pearson => {
            let r = pearson(x, y);
            (r, p_value(r, n))
        }
        CorrelationMethod::Spearman => {
            let result = spearman(x, y);
            match result.rho {
                Some(rho) => (rho, result.p_value),
                None => return Ok(None),
            }
        }
    };

    Ok(Some(CorrelationResult {
        label_a: label_a.to_string(),
        label_b: label_b.to_string(),
        coefficient: round_to(coefficient, 3),
        p_value: p.map(|p| round_to(p, 4)),
        sample_size: n,
        strength_tier: StrengthTier::from_coefficient(coefficient),
        method,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-9,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn test_pearson_perfect_positive() {
        let x = [1.0, 2.0, 3.0, 4.0, 5.0];
        let y = [2.0, 4.0, 6.0, 8.0, 10.0];
        assert_close(pearson(&x, &y), 1.0);
    }

    #[test]
    fn test_pearson_perfect_negative() {
        let x = [1.0, 2.0, 3.0, 4.0, 5.0];
        let y = [10.0, 8.0, 6.0, 4.0, 2.0];
        assert_close(pearson(&x, &y), -1.0);
    }

    #[test]
    fn test_pearson_self_and_constant() {
        let x = [3.0, 7.0, 1.0, 9.0, 4.0];
        assert_close(pearson(&x, &x), 1.0);
        assert_eq!(pearson(&x, &[5.0; 5]), 0.0);
    }

    #[test]
    fn test_pearson_symmetric_and_bounded() {
        let x = [6.0, 7.5, 3.0, 8.0, 5.5, 9.0, 2.0];
        let y = [5.0, 6.0, 4.0, 9.0, 5.0, 7.0, 3.5];
        let r = pearson(&x, &y);
        assert_eq!(r, pearson(&y, &x));
        assert!((-1.0..=1.0).contains(&r));
    }

    #[test]
    fn test_pearson_short_or_mismatched() {
        assert_eq!(pearson(&[1.0, 2.0], &[2.0, 4.0]), 0.0);
        assert_eq!(pearson(&[1.0, 2.0, 3.0], &[2.0, 4.0]), 0.0);
        assert_eq!(pearson(&[], &[]), 0.0);
    }

    #[test]
    fn test_spearman_monotonic_transform_invariance() {
        let x = [3.0, 1.0, 4.0, 1.5, 5.0, 9.0, 2.0, 6.0, 5.5, 3.5];
        let y = [2.0, 7.0, 1.0, 8.0, 2.5, 8.5, 1.5, 3.0, 9.0, 4.0];
        let transformed: Vec<f64> = y.iter().map(|v| v * 2.0 + 1.0).collect();

        let base = spearman(&x, &y);
        assert!(base.rho.is_some());
        assert_eq!(base, spearman(&x, &transformed));
        let cubed: Vec<f64> = x.iter().map(|v: &f64| v.powi(3)).collect();
        assert_eq!(base, spearman(&cubed, &y));
    }

    #[test]
    fn test_spearman_sample_gate() {
        let x: Vec<f64> = (0..9).map(f64::from).collect();
        assert_eq!(spearman(&x, &x), SpearmanResult::default());
    }

    #[test]
    fn test_spearman_perfect_rank_agreement() {
        let x: Vec<f64> = (1..=12).map(f64::from).collect();
        let y: Vec<f64> = x.iter().map(|v| v.exp()).collect();
        let result = spearman(&x, &y);
        assert_eq!(result.rho, Some(1.0));
        assert_eq!(result.p_value, Some(0.0));
    }

    #[test]
    fn test_spearman_constant_input_is_no_relationship() {
        let x: Vec<f64> = (1..=12).map(f64::from).collect();
        let result = spearman(&x, &[0.0; 12]);
        assert_eq!(result.rho, Some(0.0));
        assert!((result.p_value.unwrap() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_correlate_rejects_length_mismatch() {
        let err = correlate("a", "b", &[1.0; 10], &[1.0; 11], CorrelationMethod::Pearson);
        assert_eq!(err, Err(VigorError::LengthMismatch { left: 10, right: 11 }));
    }

    #[test]
    fn test_correlate_below_gate_is_omitted() {
        let x = [1.0, 2.0, 3.0, 4.0, 5.0];
        let result = correlate("a", "b", &x, &x, CorrelationMethod::Spearman).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_correlate_reports_rounded_result() {
        let x: Vec<f64> = (1..=10).map(f64::from).collect();
        let y = [1.0, 3.0, 2.0, 4.0, 6.0, 5.0, 7.0, 9.0, 8.0, 10.0];
        let result = correlate("sleep", "mood", &x, &y, CorrelationMethod::Spearman)
            .unwrap()
            .unwrap();
        assert_eq!(result.sample_size, 10);
        assert_eq!(result.method, CorrelationMethod::Spearman);
        // Three adjacent swaps: d^2 sum = 6, rho = 1 - 36 / 990
        assert_eq!(result.coefficient, 0.964);
        assert_eq!(result.strength_tier, StrengthTier::VeryStrong);
        assert!(result.p_value.unwrap() < 0.001);
    }
}
