//! Ranking, correlation and significance testing.
//!
//! Everything numerical is implemented here directly, including the
//! log-gamma and incomplete beta functions behind the Student-t p-value.

pub mod correlation;
pub mod ranking;
pub mod significance;

pub use correlation::{correlate, pearson, spearman, SpearmanResult};
pub use ranking::rank;
pub use significance::{p_value, regularized_incomplete_beta, students_t_cdf, t_statistic};

/// Round half away from zero to `decimals` places.
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}
