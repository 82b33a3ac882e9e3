//! Correlation statistics for the lingcorr project.
//!
//! This crate provides the numerical core of the correlation engine:
//!
//! - **Correlation methods**: Pearson, Spearman and Kendall over series with missing values
//! - **Special functions**: log-gamma, regularized incomplete beta, error function
//! - **Significance levels**: conventional p-value bands and their star markers
//!
//! # Modules
//!
//! - [`correlation`]: Pairwise correlation with significance testing
//! - [`special`]: Special functions behind the p-values
//! - [`significance`]: Classification of p-values into significance bands
//!
//! # Examples
//!
//! ## Correlating two series with gaps
//!
//! ```
//! use lingcorr_stats::correlation::CorrelationMethod;
//!
//! // `None` marks a missing observation; only complete pairs are used.
//! let x = [Some(1.0), Some(0.0), None, Some(1.0), Some(0.0), Some(1.0)];
//! let y = [Some(3.5), Some(1.0), Some(2.0), None, Some(0.5), Some(4.0)];
//!
//! let result = CorrelationMethod::Pearson.compute(&x, &y);
//! assert_eq!(result.sample_size, 4);
//! assert!(result.coefficient > 0.9);
//! ```
//!
//! ## Classifying significance
//!
//! ```
//! use lingcorr_stats::significance::SignificanceLevel;
//!
//! assert_eq!(SignificanceLevel::from_p_value(0.004).stars(), "**");
//! ```

pub mod correlation;
pub mod significance;
pub mod special;
