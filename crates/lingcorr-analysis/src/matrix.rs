//! Correlation matrices over features and feature groups
//!
//! [`MatrixBuilder`] turns a list of feature ids (or [`FeatureGroup`]s) into a
//! square [`CorrelationMatrix`] holding coefficient, p-value and sample size
//! for every ordered pair of ids. The diagonal is always `(1, 0)`.
//!
//! # Sample policies
//!
//! - [`SamplePolicy::Complete`] (default): the entity set is first restricted
//!   to entities for which *every* requested id resolves. If fewer than
//!   `min_sample_size` entities remain, no matrix is produced. Each cell then
//!   still applies its own pairwise-complete filter, which is a no-op on the
//!   restricted set.
//! - [`SamplePolicy::Pairwise`]: no outer filter. Every cell uses the entities
//!   present for its own pair, so cells may rest on different samples.
//!
//! Requesting the same id twice yields one row; the first occurrence decides
//! the row order.
//!
//! # Examples
//!
//! ```
//! use lingcorr_analysis::{
//!     entity::Entity,
//!     matrix::MatrixBuilder,
//!     normalization::FeatureKind,
//! };
//! use lingcorr_stats::correlation::CorrelationMethod;
//!
//! let entities: Vec<_> = (0..12)
//!     .map(|i| {
//!         Entity::new(format!("e{i}"))
//!             .with_feature("a", f64::from(i))
//!             .with_feature("b", f64::from(i * 2))
//!     })
//!     .collect();
//!
//! let builder = MatrixBuilder::new(&FeatureKind::Continuous, CorrelationMethod::Pearson);
//! let matrix = builder.build(&entities, &["a", "b"]).unwrap();
//! assert_eq!(matrix.sample_size, 12);
//! assert_eq!(matrix.coefficient("a", "b"), Some(1.0));
//!
//! // Too few complete entities: no matrix at all.
//! assert!(builder.build(&entities[..9], &["a", "b"]).is_none());
//! ```

use std::{borrow::Borrow, collections::BTreeMap};

use lingcorr_stats::correlation::{Correlation, CorrelationMethod};
use serde::{Deserialize, Serialize};

use crate::{
    aggregation::{self, WeightMap},
    entity::Entity,
    group::FeatureGroup,
    normalization::{self, FeatureKindResolver},
};

/// Minimum number of complete entities for a full matrix.
pub const DEFAULT_MIN_SAMPLE_SIZE: usize = 10;

/// How the entity sample of a matrix is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "policy", rename_all = "snake_case")]
pub enum SamplePolicy {
    /// Outer filter to entities complete on every id, with a sample floor.
    Complete { min_sample_size: usize },
    /// Per-cell pairwise-complete samples, no floor.
    Pairwise,
}

impl Default for SamplePolicy {
    fn default() -> Self {
        Self::Complete {
            min_sample_size: DEFAULT_MIN_SAMPLE_SIZE,
        }
    }
}

type Table<T> = BTreeMap<String, BTreeMap<String, T>>;

/// Square correlation matrix keyed by id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelationMatrix {
    pub method: CorrelationMethod,
    /// Row/column ids in request order
    pub ids: Vec<String>,
    pub coefficients: Table<f64>,
    pub p_values: Table<f64>,
    /// Number of pairwise-complete entities behind each cell
    pub pair_sample_sizes: Table<usize>,
    /// Size of the entity sample the matrix was computed on
    pub sample_size: usize,
}

impl CorrelationMatrix {
    fn from_series(
        method: CorrelationMethod,
        ids: Vec<String>,
        series: &[Vec<Option<f64>>],
        sample_size: usize,
    ) -> Self {
        let mut coefficients = Table::new();
        let mut p_values = Table::new();
        let mut pair_sample_sizes = Table::new();
        let mut insert = |a: &str, b: &str, result: Correlation| {
            for (row, col) in [(a, b), (b, a)] {
                coefficients
                    .entry(row.to_owned())
                    .or_default()
                    .insert(col.to_owned(), result.coefficient);
                p_values
                    .entry(row.to_owned())
                    .or_default()
                    .insert(col.to_owned(), result.p_value);
                pair_sample_sizes
                    .entry(row.to_owned())
                    .or_default()
                    .insert(col.to_owned(), result.sample_size);
            }
        };

        for (i, a) in ids.iter().enumerate() {
            let present = series[i].iter().flatten().count();
            insert(a.as_str(), a.as_str(), Correlation::identity(present));
            for (j, b) in ids.iter().enumerate().skip(i + 1) {
                insert(a.as_str(), b.as_str(), method.compute(&series[i], &series[j]));
            }
        }

        Self {
            method,
            ids,
            coefficients,
            p_values,
            pair_sample_sizes,
            sample_size,
        }
    }

    /// Full result of one cell, `None` for ids not in the matrix.
    #[must_use]
    pub fn get(&self, a: &str, b: &str) -> Option<Correlation> {
        Some(Correlation {
            coefficient: *self.coefficients.get(a)?.get(b)?,
            p_value: *self.p_values.get(a)?.get(b)?,
            sample_size: *self.pair_sample_sizes.get(a)?.get(b)?,
        })
    }

    #[must_use]
    pub fn coefficient(&self, a: &str, b: &str) -> Option<f64> {
        self.coefficients.get(a)?.get(b).copied()
    }

    /// Off-diagonal cells of the upper triangle, in row order.
    pub fn pairs(&self) -> impl Iterator<Item = (&str, &str, Correlation)> + '_ {
        self.ids.iter().enumerate().flat_map(move |(i, a)| {
            self.ids[i + 1..]
                .iter()
                .filter_map(move |b| Some((a.as_str(), b.as_str(), self.get(a, b)?)))
        })
    }
}

/// Distribution of one group's composite scores.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupSummary {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    pub features: Vec<String>,
    /// Entities with a non-missing composite score
    pub valid_count: usize,
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl GroupSummary {
    fn new(group: &FeatureGroup, scores: &[Option<f64>]) -> Self {
        let values = scores.iter().flatten().copied();
        Self {
            name: group.name.clone(),
            label: group.label.clone(),
            features: group.features.clone(),
            valid_count: values.clone().count(),
            min: values.clone().reduce(f64::min),
            max: values.reduce(f64::max),
        }
    }
}

/// Group × group matrix together with the per-group score summaries.
///
/// Summaries describe the whole entity set, before any sample filtering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupCorrelationMatrix {
    pub matrix: CorrelationMatrix,
    pub groups: Vec<GroupSummary>,
}

/// Builds [`CorrelationMatrix`]es with one method and sample policy.
#[derive(Debug)]
pub struct MatrixBuilder<'a, R: ?Sized> {
    resolver: &'a R,
    method: CorrelationMethod,
    policy: SamplePolicy,
}

impl<R: ?Sized> Clone for MatrixBuilder<'_, R> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<R: ?Sized> Copy for MatrixBuilder<'_, R> {}

impl<'a, R> MatrixBuilder<'a, R>
where
    R: FeatureKindResolver + ?Sized,
{
    #[must_use]
    pub fn new(resolver: &'a R, method: CorrelationMethod) -> Self {
        Self {
            resolver,
            method,
            policy: SamplePolicy::default(),
        }
    }

    #[must_use]
    pub fn with_policy(mut self, policy: SamplePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Feature × feature matrix, or `None` if the complete sample is too small.
    pub fn build<E, S>(&self, entities: &[E], feature_ids: &[S]) -> Option<CorrelationMatrix>
    where
        E: Borrow<Entity>,
        S: AsRef<str>,
    {
        let ids = unique_ids(feature_ids);
        let series = ids
            .iter()
            .map(|id| normalization::feature_series(self.resolver, entities, id))
            .collect();
        self.assemble(ids, series, entities.len())
    }

    /// Group × group matrix over composite scores.
    ///
    /// Groups without features are skipped, as are repeated group names.
    pub fn build_groups<E>(
        &self,
        entities: &[E],
        groups: &[FeatureGroup],
        weights: &WeightMap,
    ) -> Option<GroupCorrelationMatrix>
    where
        E: Borrow<Entity>,
    {
        let mut ids: Vec<String> = vec![];
        let mut series = vec![];
        let mut summaries = vec![];
        for group in groups {
            if group.features.is_empty() {
                tracing::warn!(group = %group.name, "skipping feature group without features");
                continue;
            }
            if ids.contains(&group.name) {
                tracing::warn!(group = %group.name, "skipping repeated feature group");
                continue;
            }
            let scores =
                aggregation::group_series(self.resolver, entities, &group.features, weights);
            let summary = GroupSummary::new(group, &scores);
            tracing::debug!(
                group = %group.name,
                features = group.features.len(),
                valid = summary.valid_count,
                total = entities.len(),
                "computed composite scores"
            );
            ids.push(group.name.clone());
            series.push(scores);
            summaries.push(summary);
        }

        let matrix = self.assemble(ids, series, entities.len())?;
        Some(GroupCorrelationMatrix {
            matrix,
            groups: summaries,
        })
    }

    fn assemble(
        &self,
        ids: Vec<String>,
        mut series: Vec<Vec<Option<f64>>>,
        population: usize,
    ) -> Option<CorrelationMatrix> {
        let sample_size = match self.policy {
            SamplePolicy::Complete { min_sample_size } => {
                let complete: Vec<bool> = (0..population)
                    .map(|row| series.iter().all(|values| values[row].is_some()))
                    .collect();
                let sample_size = complete.iter().filter(|&&c| c).count();
                if sample_size < min_sample_size {
                    tracing::info!(
                        ids = ids.len(),
                        sample_size,
                        min_sample_size,
                        "complete sample below minimum, no matrix"
                    );
                    return None;
                }
                for values in &mut series {
                    let mut row = 0;
                    values.retain(|_| {
                        row += 1;
                        complete[row - 1]
                    });
                }
                sample_size
            }
            SamplePolicy::Pairwise => population,
        };

        tracing::info!(
            method = %self.method,
            ids = ids.len(),
            sample_size,
            "computed correlation matrix"
        );
        Some(CorrelationMatrix::from_series(
            self.method,
            ids,
            &series,
            sample_size,
        ))
    }
}

/// Ids in first-occurrence order without duplicates.
pub(crate) fn unique_ids<S: AsRef<str>>(ids: &[S]) -> Vec<String> {
    let mut unique: Vec<String> = Vec::with_capacity(ids.len());
    for id in ids {
        let id = id.as_ref();
        if !unique.iter().any(|u| u == id) {
            unique.push(id.to_owned());
        }
    }
    unique
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalization::FeatureKind;

    fn continuous_entities(rows: &[(Option<f64>, Option<f64>)]) -> Vec<Entity> {
        rows.iter()
            .enumerate()
            .map(|(i, &(a, b))| {
                Entity::new(format!("e{i}"))
                    .with_feature("a", a)
                    .with_feature("b", b)
            })
            .collect()
    }

    fn linear_rows(n: i32) -> Vec<(Option<f64>, Option<f64>)> {
        (0..n)
            .map(|i| (Some(f64::from(i)), Some(f64::from(i % 4))))
            .collect()
    }

    fn pearson_builder(resolver: &FeatureKind) -> MatrixBuilder<'_, FeatureKind> {
        MatrixBuilder::new(resolver, CorrelationMethod::Pearson)
    }

    #[test]
    fn test_orthogonal_binary_rows_below_minimum() {
        let entities: Vec<_> = [("1", "1"), ("1", "0"), ("0", "1"), ("0", "0")]
            .into_iter()
            .enumerate()
            .map(|(i, (x, y))| {
                Entity::new(format!("e{i}"))
                    .with_feature("GB030", x)
                    .with_feature("GB051", y)
            })
            .collect();
        let builder = pearson_builder(&FeatureKind::Binary);
        assert!(builder.build(&entities, &["GB030", "GB051"]).is_none());

        let pairwise = builder
            .with_policy(SamplePolicy::Pairwise)
            .build(&entities, &["GB030", "GB051"])
            .unwrap();
        assert_eq!(pairwise.coefficient("GB030", "GB051"), Some(0.0));
        assert_eq!(pairwise.sample_size, 4);
    }

    #[test]
    fn test_diagonal_is_identity_and_matrix_is_symmetric() {
        let entities = continuous_entities(&linear_rows(12));
        let matrix = pearson_builder(&FeatureKind::Continuous)
            .build(&entities, &["a", "b"])
            .unwrap();
        assert_eq!(matrix.get("a", "a"), Some(Correlation::identity(12)));
        assert_eq!(matrix.get("b", "b"), Some(Correlation::identity(12)));
        assert_eq!(matrix.get("a", "b"), matrix.get("b", "a"));
        assert_eq!(matrix.ids, ["a", "b"]);
    }

    #[test]
    fn test_outer_filter_drops_incomplete_entities() {
        let mut rows = linear_rows(12);
        rows[0].1 = None;
        rows[1].0 = None;
        let entities = continuous_entities(&rows);
        let matrix = pearson_builder(&FeatureKind::Continuous)
            .build(&entities, &["a", "b"])
            .unwrap();
        assert_eq!(matrix.sample_size, 10);
        assert_eq!(matrix.get("a", "b").unwrap().sample_size, 10);

        rows[2].0 = None;
        let entities = continuous_entities(&rows);
        assert!(
            pearson_builder(&FeatureKind::Continuous)
                .build(&entities, &["a", "b"])
                .is_none()
        );
    }

    #[test]
    fn test_custom_minimum() {
        let entities = continuous_entities(&linear_rows(6));
        let builder = pearson_builder(&FeatureKind::Continuous);
        assert!(builder.build(&entities, &["a", "b"]).is_none());
        let matrix = builder
            .with_policy(SamplePolicy::Complete { min_sample_size: 6 })
            .build(&entities, &["a", "b"])
            .unwrap();
        assert_eq!(matrix.sample_size, 6);
    }

    #[test]
    fn test_pairwise_policy_keeps_per_cell_sizes() {
        let mut rows = linear_rows(8);
        rows[0].1 = None;
        rows[1].1 = None;
        let mut entities = continuous_entities(&rows);
        for (i, entity) in entities.iter_mut().enumerate() {
            entity
                .features
                .insert("c".into(), f64::from(u8::try_from(i).unwrap()).into());
        }
        let matrix = pearson_builder(&FeatureKind::Continuous)
            .with_policy(SamplePolicy::Pairwise)
            .build(&entities, &["a", "b", "c"])
            .unwrap();
        assert_eq!(matrix.sample_size, 8);
        assert_eq!(matrix.get("a", "c").unwrap().sample_size, 8);
        assert_eq!(matrix.get("a", "b").unwrap().sample_size, 6);
        assert_eq!(matrix.get("b", "b").unwrap().sample_size, 6);
        assert_eq!(matrix.coefficient("a", "c"), Some(1.0));
    }

    #[test]
    fn test_duplicate_ids_are_collapsed() {
        let entities = continuous_entities(&linear_rows(10));
        let matrix = pearson_builder(&FeatureKind::Continuous)
            .build(&entities, &["b", "a", "b"])
            .unwrap();
        assert_eq!(matrix.ids, ["b", "a"]);
        assert_eq!(matrix.coefficients.len(), 2);
        assert_eq!(matrix.pairs().count(), 1);
    }

    #[test]
    fn test_unknown_cells_are_none() {
        let entities = continuous_entities(&linear_rows(10));
        let matrix = pearson_builder(&FeatureKind::Continuous)
            .build(&entities, &["a"])
            .unwrap();
        assert_eq!(matrix.get("a", "a"), Some(Correlation::identity(10)));
        assert_eq!(matrix.get("a", "z"), None);
        assert_eq!(matrix.pairs().count(), 0);
    }

    #[test]
    fn test_pairs_cover_upper_triangle() {
        let entities = continuous_entities(&linear_rows(10));
        let resolver = FeatureKind::Continuous;
        let matrix = MatrixBuilder::new(&resolver, CorrelationMethod::Spearman)
            .with_policy(SamplePolicy::Pairwise)
            .build(&entities, &["a", "b", "missing"])
            .unwrap();
        let pairs: Vec<_> = matrix.pairs().map(|(a, b, _)| (a, b)).collect();
        assert_eq!(pairs, [("a", "b"), ("a", "missing"), ("b", "missing")]);
        assert_eq!(
            matrix.get("a", "missing"),
            Some(Correlation::degenerate(0))
        );
    }

    #[test]
    fn test_group_matrix_with_summaries() {
        let entities: Vec<_> = (0..12)
            .map(|i| {
                let high = i % 2 == 0;
                Entity::new(format!("e{i}"))
                    .with_feature("GB030", if high { "1" } else { "0" })
                    .with_feature("GB051", if high { "1" } else { "NA" })
                    .with_feature("GB038", if high { "1" } else { "0" })
            })
            .collect();
        let groups = [
            FeatureGroup::new("gender", ["GB030", "GB051"]),
            FeatureGroup::new("empty", Vec::<String>::new()),
            FeatureGroup::new("classifier", ["GB038"]).with_label("Classifiers"),
        ];
        let resolver = FeatureKind::Binary;
        let result = pearson_builder(&resolver)
            .build_groups(&entities, &groups, &WeightMap::new())
            .unwrap();

        assert_eq!(result.matrix.ids, ["gender", "classifier"]);
        assert_eq!(result.matrix.coefficient("gender", "classifier"), Some(1.0));
        assert_eq!(result.groups.len(), 2);
        assert_eq!(result.groups[0].valid_count, 12);
        assert_eq!(result.groups[0].min, Some(0.0));
        assert_eq!(result.groups[0].max, Some(1.0));
        assert_eq!(result.groups[1].label.as_deref(), Some("Classifiers"));
    }

    #[test]
    fn test_group_summaries_need_a_matrix() {
        let entities = continuous_entities(&linear_rows(3));
        let groups = [FeatureGroup::new("a_only", ["a"])];
        let builder = pearson_builder(&FeatureKind::Continuous);
        assert!(
            builder
                .build_groups(&entities, &groups, &WeightMap::new())
                .is_none()
        );
        let summaries = builder
            .with_policy(SamplePolicy::Pairwise)
            .build_groups(&entities, &groups, &WeightMap::new())
            .unwrap()
            .groups;
        assert_eq!(summaries[0].valid_count, 3);
        assert_eq!(summaries[0].max, Some(2.0));
    }

    #[test]
    fn test_matrix_serializes_nested_maps() {
        let entities = continuous_entities(&linear_rows(10));
        let matrix = pearson_builder(&FeatureKind::Continuous)
            .build(&entities, &["a", "b"])
            .unwrap();
        let json = serde_json::to_value(&matrix).unwrap();
        assert_eq!(json["method"], "pearson");
        assert_eq!(json["coefficients"]["a"]["a"], 1.0);
        assert_eq!(json["pair_sample_sizes"]["a"]["b"], 10);
    }
}
