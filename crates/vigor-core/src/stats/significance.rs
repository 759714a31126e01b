//! Student-t significance for correlation coefficients
//!
//! The t statistic of a coefficient is turned into a two-tailed p-value via
//! the regularized incomplete beta function:
//!
//! ```text
//! t = r * sqrt((n - 2) / (1 - r^2))        df = n - 2
//! P(|T| > |t|) = I_x(df / 2, 1 / 2)        x = df / (df + t^2)
//! ```
//!
//! `I_x(a, b)` is evaluated with Lentz's continued fraction and `ln B(a, b)`
//! with a Lanczos log-gamma.

use std::f64::consts::PI;

/// Smallest sample for which a p-value is reported
pub const MIN_SIGNIFICANCE_N: usize = 10;

const MAX_ITERATIONS: usize = 200;
const TOLERANCE: f64 = 1e-10;
/// Floor for continued-fraction denominators
const TINY: f64 = 1e-30;

const LANCZOS_G: f64 = 7.0;
const LANCZOS_COEFFICIENTS: [f64; 9] = [
    0.999_999_999_999_809_9,
    676.520_368_121_885_1,
    -1_259.139_216_722_402_8,
    771.323_428_777_653_1,
    -176.615_029_162_140_6,
    12.507_343_278_686_905,
    -0.138_571_095_265_720_12,
    9.984_369_578_019_572e-6,
    1.505_632_735_149_311_6e-7,
];

/// Two-tailed p-value for a correlation coefficient `rho` over `n` pairs.
///
/// `None` below [`MIN_SIGNIFICANCE_N`] pairs or for a non-finite `rho`.
/// A perfect correlation (`|rho| >= 1`) is certain and returns `Some(0.0)`.
pub fn p_value(rho: f64, n: usize) -> Option<f64> {
    if n < MIN_SIGNIFICANCE_N || !rho.is_finite() {
        return None;
    }
    if rho.abs() >= 1.0 {
        return Some(0.0);
    }

    let df = (n - 2) as f64;
    let t = t_statistic(rho, n);
    let p = 2.0 * (1.0 - students_t_cdf(t.abs(), df));
    Some(p.clamp(0.0, 1.0))
}

/// `t = rho * sqrt((n - 2) / (1 - rho^2))`. Infinite for `|rho| = 1`.
pub fn t_statistic(rho: f64, n: usize) -> f64 {
    let df = n.saturating_sub(2) as f64;
    let denominator = 1.0 - rho * rho;
    if denominator <= 0.0 {
        return if rho >= 0.0 { f64::INFINITY } else { f64::NEG_INFINITY };
    }
    rho * (df / denominator).sqrt()
}

/// CDF of Student's t distribution with `df` degrees of freedom.
pub fn students_t_cdf(t: f64, df: f64) -> f64 {
    if df <= 0.0 || t.is_nan() {
        return 0.5;
    }
    let x = df / (df + t * t);
    let tail = 0.5 * regularized_incomplete_beta(x, df / 2.0, 0.5);
    if t >= 0.0 {
        1.0 - tail
    } else {
        tail
    }
}

/// Regularized incomplete beta function `I_x(a, b)` for `a, b > 0`.
///
/// Out-of-range `x` returns the limits 0 and 1. When the continued fraction
/// does not converge within the iteration cap the partial value is returned.
pub fn regularized_incomplete_beta(x: f64, a: f64, b: f64) -> f64 {
    if x <= 0.0 {
        return 0.0;
    }
    if x >= 1.0 {
        return 1.0;
    }

    // The fraction converges quickly only below (a + 1) / (a + b + 2);
    // above that evaluate the mirror I_{1-x}(b, a).
    if x > (a + 1.0) / (a + b + 2.0) {
        return 1.0 - front_factor(1.0 - x, b, a) * beta_continued_fraction(1.0 - x, b, a);
    }
    front_factor(x, a, b) * beta_continued_fraction(x, a, b)
}

/// `x^a (1-x)^b / (a B(a, b))`, computed in log space.
fn front_factor(x: f64, a: f64, b: f64) -> f64 {
    (a * x.ln() + b * (1.0 - x).ln() - ln_beta(a, b)).exp() / a
}

/// Lentz evaluation of the incomplete beta continued fraction.
fn beta_continued_fraction(x: f64, a: f64, b: f64) -> f64 {
    let qab = a + b;
    let qap = a + 1.0;
    let qam = a - 1.0;

    let mut c = 1.0;
    let mut d = 1.0 / floor_tiny(1.0 - qab * x / qap);
    let mut h = d;

    for m in 1..=MAX_ITERATIONS {
        let m = m as f64;
        let m2 = 2.0 * m;

        // Even step
        let numerator = m * (b - m) * x / ((qam + m2) * (a + m2));
        d = 1.0 / floor_tiny(1.0 + numerator * d);
        c = floor_tiny(1.0 + numerator / c);
        h *= d * c;

        // Odd step
        let numerator = -(a + m) * (qab + m) * x / ((a + m2) * (qap + m2));
        d = 1.0 / floor_tiny(1.0 + numerator * d);
        c = floor_tiny(1.0 + numerator / c);
        let delta = d * c;
        h *= delta;

        if (delta - 1.0).abs() < TOLERANCE {
            return h;
        }
    }

    tracing::debug!(x, a, b, "incomplete beta did not converge, using partial value");
    h
}

fn floor_tiny(value: f64) -> f64 {
    if value.abs() < TINY {
        TINY
    } else {
        value
    }
}

/// `ln B(a, b) = ln Γ(a) + ln Γ(b) - ln Γ(a + b)`
pub fn ln_beta(a: f64, b: f64) -> f64 {
    ln_gamma(a) + ln_gamma(b) - ln_gamma(a + b)
}

/// Natural log of the gamma function (Lanczos, g = 7).
///
/// Uses the reflection formula below 0.5.
pub fn ln_gamma(x: f64) -> f64 {
    if x < 0.5 {
        return (PI / (PI * x).sin().abs()).ln() - ln_gamma(1.0 - x);
    }

    let x = x - 1.0;
    let mut series = LANCZOS_COEFFICIENTS[0];
    for (i, &coefficient) in LANCZOS_COEFFICIENTS.iter().enumerate().skip(1) {
        series += coefficient / (x + i as f64);
    }
    let t = x + LANCZOS_G + 0.5;
    0.5 * (2.0 * PI).ln() + (x + 0.5) * t.ln() - t + series.ln()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(actual: f64, expected: f64, tolerance: f64) {
        assert!(
            (actual - expected).abs() < tolerance,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn test_ln_gamma_known_values() {
        assert_close(ln_gamma(1.0), 0.0, 1e-12);
        assert_close(ln_gamma(2.0), 0.0, 1e-12);
        assert_close(ln_gamma(5.0), 24f64.ln(), 1e-12);
        assert_close(ln_gamma(0.5), PI.sqrt().ln(), 1e-12);
        assert_close(ln_gamma(0.25), 1.288_022_524_698_077_5, 1e-10);
    }

    #[test]
    fn test_incomplete_beta_limits() {
        assert_eq!(regularized_incomplete_beta(0.0, 2.0, 3.0), 0.0);
        assert_eq!(regularized_incomplete_beta(-1.0, 2.0, 3.0), 0.0);
        assert_eq!(regularized_incomplete_beta(1.0, 2.0, 3.0), 1.0);
    }

    #[test]
    fn test_incomplete_beta_closed_forms() {
        // I_x(1, 1) = x
        assert_close(regularized_incomplete_beta(0.3, 1.0, 1.0), 0.3, 1e-9);
        // I_x(a, 1) = x^a
        assert_close(regularized_incomplete_beta(0.6, 3.0, 1.0), 0.216, 1e-9);
        // I_x(1, b) = 1 - (1 - x)^b, above the mirror point
        assert_close(regularized_incomplete_beta(0.9, 1.0, 2.0), 0.99, 1e-9);
        // Symmetry I_x(a, b) = 1 - I_{1-x}(b, a)
        let lhs = regularized_incomplete_beta(0.35, 4.0, 0.5);
        let rhs = 1.0 - regularized_incomplete_beta(0.65, 0.5, 4.0);
        assert_close(lhs, rhs, 1e-9);
    }

    #[test]
    fn test_students_t_cdf() {
        assert_close(students_t_cdf(0.0, 10.0), 0.5, 1e-12);
        // One degree of freedom is the Cauchy distribution: F(1) = 0.75
        assert_close(students_t_cdf(1.0, 1.0), 0.75, 1e-9);
        assert_close(students_t_cdf(-1.0, 1.0), 0.25, 1e-9);
        // Two degrees of freedom: F(t) = 0.5 + t / (2 sqrt(2 + t^2))
        assert_close(students_t_cdf(2.0, 2.0), 0.5 + 2.0 / (2.0 * 6f64.sqrt()), 1e-9);
    }

    #[test]
    fn test_p_value_sample_gate() {
        assert_eq!(p_value(0.8, 9), None);
        assert!(p_value(0.8, 10).is_some());
    }

    #[test]
    fn test_p_value_perfect_correlation() {
        assert_eq!(p_value(1.0, 20), Some(0.0));
        assert_eq!(p_value(-1.0, 20), Some(0.0));
    }

    #[test]
    fn test_p_value_zero_correlation() {
        assert_close(p_value(0.0, 30).unwrap(), 1.0, 1e-9);
    }

    #[test]
    fn test_p_value_decreases_with_effect_size() {
        let strong = p_value(0.9, 30).unwrap();
        let moderate = p_value(0.5, 30).unwrap();
        let weak = p_value(0.1, 30).unwrap();
        assert!(strong < moderate);
        assert!(moderate < weak);
        // r = 0.5 over 30 pairs: t = 3.055, df = 28
        assert_close(moderate, 0.004_9, 5e-4);
    }

    #[test]
    fn test_p_value_is_sign_symmetric() {
        assert_close(p_value(0.42, 15).unwrap(), p_value(-0.42, 15).unwrap(), 1e-12);
    }

    #[test]
    fn test_t_statistic() {
        assert_close(t_statistic(0.5, 30), 0.5 * (28.0f64 / 0.75).sqrt(), 1e-12);
        assert_eq!(t_statistic(1.0, 30), f64::INFINITY);
    }
}
