//! Partition analysis and cross-partition divergence
//!
//! The entity set is split by the value of one categorical attribute (family,
//! macroarea, ...). Each selected partition gets its own feature matrix,
//! computed with [`SamplePolicy::Pairwise`] so that sparse features do not
//! wipe out small partitions. Partitions with fewer than
//! [`DEFAULT_MIN_PARTITION_SIZE`] entities are reported with an
//! [`PartitionOutcome::InsufficientSample`] marker instead.
//!
//! [`compute_divergence`] then finds, for every feature pair, the two
//! partitions whose coefficients differ most.
//!
//! # Examples
//!
//! ```
//! use lingcorr_analysis::{
//!     entity::Entity,
//!     normalization::FeatureKind,
//!     partition::{self, PartitionAnalyzer},
//! };
//! use lingcorr_stats::correlation::CorrelationMethod;
//!
//! let mut entities = vec![];
//! for (family, sign) in [("north", 1.0), ("south", -1.0)] {
//!     for i in 0..5 {
//!         let x = f64::from(i);
//!         entities.push(
//!             Entity::new(format!("{family}{i}"))
//!                 .with_attribute("family", family)
//!                 .with_feature("a", x)
//!                 .with_feature("b", sign * x),
//!         );
//!     }
//! }
//!
//! let analyzer = PartitionAnalyzer::new(&FeatureKind::Continuous, CorrelationMethod::Pearson);
//! let result = analyzer.analyze(&entities, "family", &["north", "south"], &["a", "b"]);
//! let divergence = partition::compute_divergence(&result, &["a", "b"]);
//!
//! let record = &divergence[&("a".to_owned(), "b".to_owned())];
//! assert_eq!(record.max_difference, 2.0);
//! assert_eq!(record.first.partition, "north");
//! assert_eq!(record.second.partition, "south");
//! ```

use std::{borrow::Borrow, collections::BTreeMap};

use lingcorr_stats::correlation::CorrelationMethod;
use serde::{Deserialize, Serialize};

use crate::{
    entity::Entity,
    matrix::{self, CorrelationMatrix, MatrixBuilder, SamplePolicy},
    normalization::FeatureKindResolver,
};

/// Minimum partition size for a computed matrix.
pub const DEFAULT_MIN_PARTITION_SIZE: usize = 5;

/// Result for one partition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PartitionOutcome {
    Computed(CorrelationMatrix),
    InsufficientSample { sample_size: usize },
}

impl PartitionOutcome {
    #[must_use]
    pub fn matrix(&self) -> Option<&CorrelationMatrix> {
        match self {
            Self::Computed(matrix) => Some(matrix),
            Self::InsufficientSample { .. } => None,
        }
    }

    /// Number of entities in the partition.
    #[must_use]
    pub fn sample_size(&self) -> usize {
        match self {
            Self::Computed(matrix) => matrix.sample_size,
            Self::InsufficientSample { sample_size } => *sample_size,
        }
    }
}

/// Outcomes of all selected partitions, keyed by attribute value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartitionedAnalysis {
    pub attribute: String,
    pub method: CorrelationMethod,
    pub partitions: BTreeMap<String, PartitionOutcome>,
}

impl PartitionedAnalysis {
    /// Partitions that produced a matrix, in key order.
    pub fn computed(&self) -> impl Iterator<Item = (&str, &CorrelationMatrix)> + '_ {
        self.partitions
            .iter()
            .filter_map(|(value, outcome)| Some((value.as_str(), outcome.matrix()?)))
    }
}

/// Number of entities per value of a categorical attribute.
///
/// Entities without the attribute are not counted.
pub fn category_counts<E>(entities: &[E], attribute: &str) -> BTreeMap<String, usize>
where
    E: Borrow<Entity>,
{
    let mut counts = BTreeMap::new();
    for entity in entities {
        if let Some(value) = entity.borrow().attribute(attribute) {
            *counts.entry(value.to_owned()).or_insert(0) += 1;
        }
    }
    counts
}

/// Runs the matrix analysis once per partition.
#[derive(Debug)]
pub struct PartitionAnalyzer<'a, R: ?Sized> {
    resolver: &'a R,
    method: CorrelationMethod,
    min_partition_size: usize,
}

impl<'a, R> PartitionAnalyzer<'a, R>
where
    R: FeatureKindResolver + ?Sized,
{
    #[must_use]
    pub fn new(resolver: &'a R, method: CorrelationMethod) -> Self {
        Self {
            resolver,
            method,
            min_partition_size: DEFAULT_MIN_PARTITION_SIZE,
        }
    }

    #[must_use]
    pub fn with_min_partition_size(mut self, min_partition_size: usize) -> Self {
        self.min_partition_size = min_partition_size;
        self
    }

    pub fn analyze<E, V, S>(
        &self,
        entities: &[E],
        attribute: &str,
        selected_values: &[V],
        feature_ids: &[S],
    ) -> PartitionedAnalysis
    where
        E: Borrow<Entity>,
        V: AsRef<str>,
        S: AsRef<str>,
    {
        let builder =
            MatrixBuilder::new(self.resolver, self.method).with_policy(SamplePolicy::Pairwise);
        let mut partitions = BTreeMap::new();
        for value in matrix::unique_ids(selected_values) {
            let members: Vec<&Entity> = entities
                .iter()
                .map(Borrow::<Entity>::borrow)
                .filter(|entity| entity.attribute(attribute) == Some(value.as_str()))
                .collect();
            let sample_size = members.len();
            tracing::debug!(attribute, partition = %value, sample_size, "partition selected");

            let outcome = if sample_size < self.min_partition_size {
                PartitionOutcome::InsufficientSample { sample_size }
            } else {
                builder.build(&members, feature_ids).map_or(
                    PartitionOutcome::InsufficientSample { sample_size },
                    PartitionOutcome::Computed,
                )
            };
            partitions.insert(value, outcome);
        }

        PartitionedAnalysis {
            attribute: attribute.to_owned(),
            method: self.method,
            partitions,
        }
    }
}

/// Coefficient of a feature pair within one partition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartitionCoefficient {
    pub partition: String,
    pub coefficient: f64,
}

/// Largest coefficient difference of a feature pair across partitions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Divergence {
    pub feature_a: String,
    pub feature_b: String,
    /// `|first.coefficient - second.coefficient|`
    pub max_difference: f64,
    pub first: PartitionCoefficient,
    pub second: PartitionCoefficient,
}

/// Divergence of every unordered feature pair.
///
/// Only computed partitions holding a coefficient for the pair take part, and
/// a pair needs at least two of them to get a record. Among equally divergent
/// partition pairs the first one in key order wins.
pub fn compute_divergence<S>(
    result: &PartitionedAnalysis,
    feature_ids: &[S],
) -> BTreeMap<(String, String), Divergence>
where
    S: AsRef<str>,
{
    let ids = matrix::unique_ids(feature_ids);
    let mut divergences = BTreeMap::new();
    for (i, a) in ids.iter().enumerate() {
        for b in &ids[i + 1..] {
            let coefficients: Vec<(&str, f64)> = result
                .computed()
                .filter_map(|(partition, matrix)| Some((partition, matrix.coefficient(a, b)?)))
                .collect();
            if let Some(divergence) = widest_pair(a, b, &coefficients) {
                divergences.insert((a.clone(), b.clone()), divergence);
            }
        }
    }
    divergences
}

fn widest_pair(a: &str, b: &str, coefficients: &[(&str, f64)]) -> Option<Divergence> {
    let mut best: Option<(usize, usize, f64)> = None;
    for (i, &(_, ri)) in coefficients.iter().enumerate() {
        for (j, &(_, rj)) in coefficients.iter().enumerate().skip(i + 1) {
            let difference = (ri - rj).abs();
            if best.is_none_or(|(_, _, max)| difference > max) {
                best = Some((i, j, difference));
            }
        }
    }
    let (i, j, max_difference) = best?;
    let side = |k: usize| PartitionCoefficient {
        partition: coefficients[k].0.to_owned(),
        coefficient: coefficients[k].1,
    };
    Some(Divergence {
        feature_a: a.to_owned(),
        feature_b: b.to_owned(),
        max_difference,
        first: side(i),
        second: side(j),
    })
}

/// Divergence records ordered from most to least divergent.
#[must_use]
pub fn rank_divergences(divergences: BTreeMap<(String, String), Divergence>) -> Vec<Divergence> {
    let mut ranked: Vec<_> = divergences.into_values().collect();
    ranked.sort_by(|x, y| y.max_difference.total_cmp(&x.max_difference));
    ranked
}
