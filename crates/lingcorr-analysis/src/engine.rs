//! Single entry point bundling a feature-kind resolver with the analyses

use std::{borrow::Borrow, collections::BTreeMap};

use lingcorr_stats::correlation::{Correlation, CorrelationMethod};

use crate::{
    aggregation::WeightMap,
    entity::Entity,
    group::FeatureGroup,
    matrix::{
        CorrelationMatrix, DEFAULT_MIN_SAMPLE_SIZE, GroupCorrelationMatrix, MatrixBuilder,
        SamplePolicy,
    },
    normalization::{self, FeatureKindResolver},
    partition::{
        self, DEFAULT_MIN_PARTITION_SIZE, Divergence, PartitionAnalyzer, PartitionedAnalysis,
    },
};

/// Correlation engine over one feature-kind convention.
///
/// The engine holds no state besides its configuration, so every call is
/// independent and may be repeated freely.
///
/// # Examples
///
/// ```
/// use lingcorr_analysis::{
///     convention::KindConvention,
///     engine::CorrelationEngine,
///     entity::Entity,
/// };
/// use lingcorr_stats::correlation::CorrelationMethod;
///
/// let entities: Vec<_> = [("1", "1"), ("1", "0"), ("0", "1"), ("0", "0")]
///     .into_iter()
///     .enumerate()
///     .map(|(i, (x, y))| {
///         Entity::new(format!("l{i}"))
///             .with_feature("GB030", x)
///             .with_feature("GB051", y)
///     })
///     .collect();
///
/// let engine = CorrelationEngine::new(KindConvention::grambank());
/// let pair = engine.compute_pair(&entities, "GB030", "GB051", CorrelationMethod::Pearson);
/// assert_eq!(pair.coefficient, 0.0);
/// assert_eq!(pair.sample_size, 4);
///
/// // Four entities are below the default matrix floor of ten.
/// let matrix = engine.compute_matrix(&entities, &["GB030", "GB051"], CorrelationMethod::Pearson);
/// assert!(matrix.is_none());
/// ```
#[derive(Debug, Clone)]
pub struct CorrelationEngine<R> {
    resolver: R,
    min_sample_size: usize,
    min_partition_size: usize,
}

impl<R> CorrelationEngine<R>
where
    R: FeatureKindResolver,
{
    #[must_use]
    pub fn new(resolver: R) -> Self {
        Self {
            resolver,
            min_sample_size: DEFAULT_MIN_SAMPLE_SIZE,
            min_partition_size: DEFAULT_MIN_PARTITION_SIZE,
        }
    }

    #[must_use]
    pub fn with_min_sample_size(mut self, min_sample_size: usize) -> Self {
        self.min_sample_size = min_sample_size;
        self
    }

    #[must_use]
    pub fn with_min_partition_size(mut self, min_partition_size: usize) -> Self {
        self.min_partition_size = min_partition_size;
        self
    }

    /// Direct pairwise correlation over all entities, without a sample floor.
    pub fn compute_pair<E>(
        &self,
        entities: &[E],
        feature_a: &str,
        feature_b: &str,
        method: CorrelationMethod,
    ) -> Correlation
    where
        E: Borrow<Entity>,
    {
        let x = normalization::feature_series(&self.resolver, entities, feature_a);
        let y = normalization::feature_series(&self.resolver, entities, feature_b);
        method.compute(&x, &y)
    }

    pub fn compute_matrix<E, S>(
        &self,
        entities: &[E],
        feature_ids: &[S],
        method: CorrelationMethod,
    ) -> Option<CorrelationMatrix>
    where
        E: Borrow<Entity>,
        S: AsRef<str>,
    {
        self.matrix_builder(method).build(entities, feature_ids)
    }

    pub fn compute_group_matrix<E>(
        &self,
        entities: &[E],
        groups: &[FeatureGroup],
        weights: &WeightMap,
        method: CorrelationMethod,
    ) -> Option<GroupCorrelationMatrix>
    where
        E: Borrow<Entity>,
    {
        self.matrix_builder(method).build_groups(entities, groups, weights)
    }

    pub fn compute_partitioned<E, V, S>(
        &self,
        entities: &[E],
        attribute: &str,
        selected_values: &[V],
        feature_ids: &[S],
        method: CorrelationMethod,
    ) -> PartitionedAnalysis
    where
        E: Borrow<Entity>,
        V: AsRef<str>,
        S: AsRef<str>,
    {
        PartitionAnalyzer::new(&self.resolver, method)
            .with_min_partition_size(self.min_partition_size)
            .analyze(entities, attribute, selected_values, feature_ids)
    }

    pub fn compute_divergence<S>(
        &self,
        partitioned: &PartitionedAnalysis,
        feature_ids: &[S],
    ) -> BTreeMap<(String, String), Divergence>
    where
        S: AsRef<str>,
    {
        partition::compute_divergence(partitioned, feature_ids)
    }

    fn matrix_builder(&self, method: CorrelationMethod) -> MatrixBuilder<'_, R> {
        MatrixBuilder::new(&self.resolver, method).with_policy(SamplePolicy::Complete {
            min_sample_size: self.min_sample_size,
        })
    }
}
