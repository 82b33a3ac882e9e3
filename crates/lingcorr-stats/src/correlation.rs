//! Pairwise correlation with significance testing.
//!
//! All three methods share the same contract: two equal-length series of
//! optional observations go in, a [`Correlation`] comes out. Only indices where
//! both series hold a value take part ("pairwise-complete" filtering), and
//! fewer than two such pairs yield the degenerate result `(0, 1)`.
//!
//! | method   | coefficient                          | p-value                        |
//! |----------|--------------------------------------|--------------------------------|
//! | Pearson  | product-moment from raw sums         | Student t via incomplete beta  |
//! | Spearman | Pearson on first-occurrence ranks    | normal approximation           |
//! | Kendall  | `(C - D) / (N (N - 1) / 2)`          | normal approximation           |
//!
//! # Examples
//!
//! ```
//! use lingcorr_stats::correlation::{CorrelationMethod, pearson};
//!
//! let x = [Some(1.0), Some(2.0), Some(3.0), Some(4.0), Some(5.0)];
//! let y = [Some(2.0), Some(4.0), Some(6.0), Some(8.0), Some(10.0)];
//!
//! let result = pearson(&x, &y);
//! assert_eq!(result.coefficient, 1.0);
//! assert!(result.p_value < 1e-6);
//!
//! let kendall = CorrelationMethod::Kendall.compute(&x, &y);
//! assert_eq!(kendall.coefficient, 1.0);
//! ```

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{
    significance::SignificanceLevel,
    special::{normal_two_tailed_p, regularized_incomplete_beta},
};

/// Outcome of one pairwise correlation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Correlation {
    /// Correlation coefficient in `[-1, 1]`; `0.0` when undefined.
    pub coefficient: f64,
    /// Two-tailed p-value in `[0, 1]`.
    pub p_value: f64,
    /// Number of pairwise-complete observations the result is based on.
    pub sample_size: usize,
}

impl Correlation {
    /// The result reported when there is not enough data: `(0, 1)`.
    #[must_use]
    pub const fn degenerate(sample_size: usize) -> Self {
        Self {
            coefficient: 0.0,
            p_value: 1.0,
            sample_size,
        }
    }

    /// Self-correlation of a series: `(1, 0)`.
    #[must_use]
    pub const fn identity(sample_size: usize) -> Self {
        Self {
            coefficient: 1.0,
            p_value: 0.0,
            sample_size,
        }
    }

    #[must_use]
    pub fn significance(&self) -> SignificanceLevel {
        SignificanceLevel::from_p_value(self.p_value)
    }
}

/// Correlation algorithm selector.
#[derive(
    Default, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum CorrelationMethod {
    #[default]
    Pearson,
    Spearman,
    Kendall,
}

impl CorrelationMethod {
    pub const ALL: [Self; 3] = [Self::Pearson, Self::Spearman, Self::Kendall];

    /// Runs this method on two equal-length series.
    ///
    /// # Panics
    ///
    /// Panics if the series lengths differ.
    #[must_use]
    pub fn compute(self, x: &[Option<f64>], y: &[Option<f64>]) -> Correlation {
        match self {
            Self::Pearson => pearson(x, y),
            Self::Spearman => spearman(x, y),
            Self::Kendall => kendall(x, y),
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pearson => "pearson",
            Self::Spearman => "spearman",
            Self::Kendall => "kendall",
        }
    }
}

impl fmt::Display for CorrelationMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self.as_str(), f)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("unknown correlation method '{name}' (expected pearson, spearman or kendall)")]
pub struct ParseMethodError {
    pub name: String,
}

impl FromStr for CorrelationMethod {
    type Err = ParseMethodError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|method| method.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ParseMethodError { name: s.to_owned() })
    }
}

/// Keeps only the indices where both series hold a value.
fn complete_pairs(x: &[Option<f64>], y: &[Option<f64>]) -> (Vec<f64>, Vec<f64>) {
    assert_eq!(x.len(), y.len(), "series must have equal length");
    x.iter()
        .zip(y)
        .filter_map(|(a, b)| Some(((*a)?, (*b)?)))
        .unzip()
}

/// Pearson product-moment correlation.
///
/// The p-value is `min(1, 2 I_x(df/2, 1/2))` with `df = n - 2` and
/// `x = df / (df + t^2)`. `I_x` alone is already the two-tailed Student-t
/// probability, so the reported value is twice the textbook one.
///
/// # Panics
///
/// Panics if the series lengths differ.
#[must_use]
pub fn pearson(x: &[Option<f64>], y: &[Option<f64>]) -> Correlation {
    let (xs, ys) = complete_pairs(x, y);
    let n = xs.len();
    if n < 2 {
        return Correlation::degenerate(n);
    }
    let coefficient = pearson_coefficient(&xs, &ys);
    Correlation {
        coefficient,
        p_value: pearson_p_value(coefficient, n),
        sample_size: n,
    }
}

#[expect(clippy::cast_precision_loss)]
fn pearson_coefficient(xs: &[f64], ys: &[f64]) -> f64 {
    let n = xs.len() as f64;
    let (mut sum_x, mut sum_y, mut sum_xy, mut sum_x2, mut sum_y2) = (0.0, 0.0, 0.0, 0.0, 0.0);
    for (&x, &y) in xs.iter().zip(ys) {
        sum_x += x;
        sum_y += y;
        sum_xy += x * y;
        sum_x2 += x * x;
        sum_y2 += y * y;
    }

    let numerator = n * sum_xy - sum_x * sum_y;
    let denominator = ((n * sum_x2 - sum_x * sum_x) * (n * sum_y2 - sum_y * sum_y)).sqrt();
    // NaN covers a product that rounded below zero for near-constant input
    if denominator.is_nan() || denominator <= 0.0 {
        return 0.0;
    }
    (numerator / denominator).clamp(-1.0, 1.0)
}

/// Two-tailed p-value of a Pearson coefficient `r` over `n` pairs.
///
/// Returns `1.0` for `n < 3` and for `r == 0`.
#[expect(clippy::cast_precision_loss)]
#[must_use]
pub fn pearson_p_value(r: f64, n: usize) -> f64 {
    if n < 3 {
        return 1.0;
    }
    let df = (n - 2) as f64;
    let t = r.abs() * (df / (1.0 - r * r).max(0.0)).sqrt();
    let x = df / (df + t * t);
    if x >= 1.0 {
        return 1.0;
    }
    let p = regularized_incomplete_beta(x, df / 2.0, 0.5);
    (2.0 * p).min(1.0)
}

/// Spearman rank correlation.
///
/// Each value is ranked by the position of its first occurrence in the
/// ascending sort, so tied values share the lowest rank of their run instead
/// of the mid-rank. The p-value uses `z = r sqrt(n - 1)`.
///
/// # Panics
///
/// Panics if the series lengths differ.
#[expect(clippy::cast_precision_loss)]
#[must_use]
pub fn spearman(x: &[Option<f64>], y: &[Option<f64>]) -> Correlation {
    let (xs, ys) = complete_pairs(x, y);
    let n = xs.len();
    if n < 2 {
        return Correlation::degenerate(n);
    }
    let coefficient =
        pearson_coefficient(&first_occurrence_ranks(&xs), &first_occurrence_ranks(&ys));
    let z = coefficient * ((n - 1) as f64).sqrt();
    Correlation {
        coefficient,
        p_value: normal_two_tailed_p(z),
        sample_size: n,
    }
}

/// Ranks starting at 1; ties take the rank of their first occurrence.
#[expect(clippy::cast_precision_loss)]
fn first_occurrence_ranks(values: &[f64]) -> Vec<f64> {
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    values
        .iter()
        .map(|&value| (sorted.partition_point(|&s| s < value) + 1) as f64)
        .collect()
}

/// Kendall rank correlation.
///
/// Counts concordant and discordant pairs; tied pairs count for neither side
/// and the denominator is the total number of pairs `N (N - 1) / 2`, without
/// tie adjustment. The p-value uses `z = tau sqrt(9N(N-1) / (2(2N+5)))`.
///
/// # Panics
///
/// Panics if the series lengths differ.
#[expect(clippy::cast_precision_loss)]
#[must_use]
pub fn kendall(x: &[Option<f64>], y: &[Option<f64>]) -> Correlation {
    let (xs, ys) = complete_pairs(x, y);
    let n = xs.len();
    if n < 2 {
        return Correlation::degenerate(n);
    }

    let mut concordant = 0_usize;
    let mut discordant = 0_usize;
    for i in 0..n - 1 {
        for j in i + 1..n {
            let product = (xs[i] - xs[j]) * (ys[i] - ys[j]);
            if product > 0.0 {
                concordant += 1;
            } else if product < 0.0 {
                discordant += 1;
            }
        }
    }

    let nf = n as f64;
    let tau = (concordant as f64 - discordant as f64) / (0.5 * nf * (nf - 1.0));
    let z = tau * (9.0 * nf * (nf - 1.0) / (2.0 * (2.0 * nf + 5.0))).sqrt();
    Correlation {
        coefficient: tau,
        p_value: normal_two_tailed_p(z),
        sample_size: n,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn series(values: &[f64]) -> Vec<Option<f64>> {
        values.iter().copied().map(Some).collect()
    }

    fn assert_close(actual: f64, expected: f64, tolerance: f64) {
        assert!(
            (actual - expected).abs() <= tolerance,
            "expected {expected} +/- {tolerance}, got {actual}"
        );
    }

    #[test]
    fn test_pearson_perfect_linear() {
        let x = series(&[1.0, 2.0, 3.0, 4.0, 5.0]);
        let y = series(&[2.0, 4.0, 6.0, 8.0, 10.0]);
        let result = pearson(&x, &y);
        assert_eq!(result.coefficient, 1.0);
        assert!(result.p_value < 1e-6);
        assert_eq!(result.sample_size, 5);
    }

    #[test]
    fn test_pearson_perfect_negative() {
        let x = series(&[1.0, 2.0, 3.0, 4.0]);
        let y = series(&[8.0, 6.0, 4.0, 2.0]);
        let result = pearson(&x, &y);
        assert_eq!(result.coefficient, -1.0);
        assert!(result.p_value < 1e-6);
    }

    #[test]
    fn test_pearson_is_symmetric() {
        let x = series(&[0.3, 1.7, 2.2, 5.9, 4.1, 3.3]);
        let y = series(&[1.0, 0.4, 2.8, 3.9, 5.5, 2.0]);
        assert_eq!(pearson(&x, &y), pearson(&y, &x));
    }

    #[test]
    fn test_pearson_self_correlation() {
        let x = series(&[0.3, 1.7, 2.2, 5.9, 4.1, 3.3]);
        let result = pearson(&x, &x);
        assert_eq!(result.coefficient, 1.0);
        assert_eq!(result.p_value, 0.0);
    }

    #[test]
    fn test_pearson_orthogonal_binary_features() {
        let x = series(&[1.0, 0.0, 1.0, 0.0]);
        let y = series(&[1.0, 0.0, 0.0, 1.0]);
        let result = pearson(&x, &y);
        assert_eq!(result.coefficient, 0.0);
        assert_eq!(result.p_value, 1.0);
        assert_eq!(result.sample_size, 4);
    }

    #[test]
    fn test_pearson_zero_variance_is_zero() {
        let x = series(&[3.0, 3.0, 3.0, 3.0]);
        let y = series(&[1.0, 2.0, 3.0, 4.0]);
        let result = pearson(&x, &y);
        assert_eq!(result.coefficient, 0.0);
        assert_eq!(result.p_value, 1.0);
    }

    #[test]
    fn test_pearson_p_value_matches_t_distribution() {
        // r = 0.6 with n = 12 gives t = 2.372; I_x(df/2, 1/2) is already the
        // two-tailed probability (~0.039) and the reported value doubles it
        assert_close(pearson_p_value(0.6, 12), 0.0783, 1e-3);
        assert_eq!(pearson_p_value(0.9, 2), 1.0);
    }

    #[test]
    fn test_missing_values_are_skipped_pairwise() {
        let x = vec![Some(1.0), None, Some(2.0), Some(3.0), Some(4.0)];
        let y = vec![Some(2.0), Some(100.0), None, Some(6.0), Some(8.0)];
        let result = pearson(&x, &y);
        assert_eq!(result.sample_size, 3);
        assert_close(result.coefficient, 1.0, 1e-12);
    }

    #[test]
    fn test_no_overlap_is_degenerate() {
        let x = vec![Some(1.0), None, Some(3.0), None];
        let y = vec![None, Some(2.0), None, Some(4.0)];
        for method in CorrelationMethod::ALL {
            let result = method.compute(&x, &y);
            assert_eq!(result, Correlation::degenerate(0), "{method}");
        }
    }

    #[test]
    fn test_single_pair_is_degenerate() {
        let x = vec![Some(1.0), None];
        let y = vec![Some(2.0), Some(3.0)];
        for method in CorrelationMethod::ALL {
            assert_eq!(method.compute(&x, &y), Correlation::degenerate(1));
        }
    }

    #[test]
    fn test_coefficients_stay_in_range() {
        let x = series(&[0.1, 0.5, 0.5, 0.9, 0.2, 0.7, 0.3, 0.3]);
        let y = series(&[1.0, 0.0, 1.0, 1.0, 0.0, 0.0, 1.0, 0.0]);
        for method in CorrelationMethod::ALL {
            let result = method.compute(&x, &y);
            assert!((-1.0..=1.0).contains(&result.coefficient), "{method}");
            assert!((0.0..=1.0).contains(&result.p_value), "{method}");
        }
    }

    #[test]
    fn test_first_occurrence_ranks() {
        assert_eq!(
            first_occurrence_ranks(&[3.0, 1.0, 3.0, 2.0, 1.0]),
            vec![4.0, 1.0, 4.0, 3.0, 1.0]
        );
    }

    #[test]
    fn test_spearman_monotone_nonlinear() {
        let x = series(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        let y = series(&[1.0, 8.0, 27.0, 64.0, 125.0, 216.0]);
        let result = spearman(&x, &y);
        assert_eq!(result.coefficient, 1.0);
        // z = sqrt(5)
        assert_close(result.p_value, normal_two_tailed_p(5.0_f64.sqrt()), 1e-12);
    }

    #[test]
    fn test_spearman_ignores_scale_and_shift() {
        let x = [0.3, 1.7, 2.2, 5.9, 4.1, 3.3, 0.9];
        let y = series(&[1.0, 0.4, 2.8, 3.9, 5.5, 2.0, 2.0]);
        let base = spearman(&series(&x), &y);
        let scaled = x.iter().map(|v| Some(v * 12.5 - 40.0)).collect::<Vec<_>>();
        assert_eq!(spearman(&scaled, &y), base);
    }

    #[test]
    fn test_kendall_perfect_orderings() {
        let x = series(&[1.0, 2.0, 3.0, 4.0, 5.0]);
        let up = series(&[10.0, 20.0, 30.0, 40.0, 50.0]);
        let down = series(&[50.0, 40.0, 30.0, 20.0, 10.0]);
        assert_eq!(kendall(&x, &up).coefficient, 1.0);
        assert_eq!(kendall(&x, &down).coefficient, -1.0);
        // z = sqrt(6) for N = 5
        assert_close(kendall(&x, &up).p_value, 0.0143, 1e-3);
    }

    #[test]
    fn test_kendall_ties_count_for_neither() {
        let x = series(&[1.0, 1.0, 2.0, 3.0]);
        let y = series(&[1.0, 2.0, 3.0, 4.0]);
        // 5 concordant, 1 tied, 6 pairs in total
        assert_close(kendall(&x, &y).coefficient, 5.0 / 6.0, 1e-12);
    }

    #[test]
    fn test_kendall_monotone_transform_invariance() {
        let x = [0.3, 1.7, 2.2, 5.9, 4.1, 3.3, 0.9];
        let y = series(&[1.0, 0.4, 2.8, 3.9, 5.5, 2.0, 2.0]);
        let base = kendall(&series(&x), &y);
        let transformed = x.iter().map(|v| Some(v.exp())).collect::<Vec<_>>();
        assert_eq!(kendall(&transformed, &y), base);
    }

    #[test]
    fn test_method_parsing() {
        assert_eq!(
            "Spearman".parse::<CorrelationMethod>(),
            Ok(CorrelationMethod::Spearman)
        );
        assert_eq!(
            " kendall ".parse::<CorrelationMethod>(),
            Ok(CorrelationMethod::Kendall)
        );
        let err = "tau".parse::<CorrelationMethod>().unwrap_err();
        assert_eq!(err.name, "tau");
    }

    #[test]
    fn test_method_serializes_lowercase() {
        let json = serde_json::to_string(&CorrelationMethod::Kendall).unwrap();
        assert_eq!(json, "\"kendall\"");
        let method: CorrelationMethod = serde_json::from_str("\"pearson\"").unwrap();
        assert_eq!(method, CorrelationMethod::Pearson);
    }

    #[test]
    #[should_panic(expected = "equal length")]
    fn test_unequal_lengths_panic() {
        let _ = pearson(&[Some(1.0)], &[Some(1.0), Some(2.0)]);
    }
}
