use chrono::{DateTime, Utc};
use lingcorr_analysis::{
    group::FeatureGroup,
    matrix::{CorrelationMatrix, GroupCorrelationMatrix},
    partition::{Divergence, PartitionedAnalysis},
};
use lingcorr_stats::{
    correlation::{Correlation, CorrelationMethod},
    significance::SignificanceLevel,
};
use serde::{Deserialize, Serialize};

/// One feature pair of a `pairwise` run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PairRecord {
    pub feature_a: String,
    pub feature_b: String,
    pub coefficient: f64,
    pub p_value: f64,
    pub sample_size: usize,
    pub significance: SignificanceLevel,
}

impl PairRecord {
    pub fn new(feature_a: &str, feature_b: &str, result: Correlation) -> Self {
        Self {
            feature_a: feature_a.to_owned(),
            feature_b: feature_b.to_owned(),
            coefficient: result.coefficient,
            p_value: result.p_value,
            sample_size: result.sample_size,
            significance: result.significance(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PairwiseReport {
    /// Timestamp when the report was generated (ISO 8601 format)
    pub generated_at: DateTime<Utc>,
    pub method: CorrelationMethod,
    pub entity_count: usize,
    pub pairs: Vec<PairRecord>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatrixReport {
    pub generated_at: DateTime<Utc>,
    pub method: CorrelationMethod,
    pub features: Vec<String>,
    pub entity_count: usize,
    /// `None` when too few entities are complete on every feature
    pub matrix: Option<CorrelationMatrix>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupReport {
    pub generated_at: DateTime<Utc>,
    pub method: CorrelationMethod,
    pub entity_count: usize,
    /// Groups as resolved against the selected features
    pub groups: Vec<FeatureGroup>,
    pub result: Option<GroupCorrelationMatrix>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PartitionReport {
    pub generated_at: DateTime<Utc>,
    pub features: Vec<String>,
    pub analysis: PartitionedAnalysis,
    /// Most divergent feature pairs first
    pub divergences: Vec<Divergence>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryCount {
    pub value: String,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryReport {
    pub generated_at: DateTime<Utc>,
    pub attribute: String,
    /// Entities lacking the attribute
    pub unassigned: usize,
    /// Largest categories first
    pub categories: Vec<CategoryCount>,
}
