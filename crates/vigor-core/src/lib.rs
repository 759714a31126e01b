//! # Vigor Core
//!
//! Correlation statistics and insight generation for the Vigor daily health
//! tracker.
//!
//! Callers fetch check-ins, habit completions, symptom scores and food logs
//! from storage and pass them in as date-keyed series. Everything here is
//! synchronous and pure: the same inputs always give the same correlations,
//! insights and digest.

pub mod align;
pub mod bucket;
pub mod daily;
pub mod digest;
pub mod error;
pub mod exposure;
pub mod insights;
pub mod matrix;
pub mod models;
pub mod policy;
pub mod stats;

pub use align::*;
pub use bucket::*;
pub use daily::*;
pub use digest::*;
pub use error::*;
pub use exposure::*;
pub use insights::*;
pub use matrix::*;
pub use models::*;
pub use policy::*;
pub use stats::{
    correlate, p_value, pearson, rank, regularized_incomplete_beta, round_to, spearman,
    students_t_cdf, t_statistic, SpearmanResult,
};
