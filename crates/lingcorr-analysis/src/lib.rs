//! Correlation analysis over linguistic and environmental features
//!
//! This crate turns assembled entity records (languages with raw feature values
//! and categorical attributes) into correlation matrices, group-level composite
//! correlations and per-partition comparisons. The numerical methods live in
//! [`lingcorr_stats`].
//!
//! # Overview
//!
//! ## Feature Matrix Workflow
//!
//! 1. **Load Entities** ([`entity::Entity`]): Raw values as strings, numbers or nulls
//! 2. **Classify Features** ([`normalization::FeatureKindResolver`],
//!    [`convention::KindConvention`]): Decide binary vs continuous per feature id
//! 3. **Normalize** ([`normalization::FeatureKind::normalize`]): Raw value to number or MISSING
//! 4. **Build Matrix** ([`matrix::MatrixBuilder`]): Coefficients, p-values and sample sizes
//!
//! ## Group Workflow
//!
//! 1. **Declare Groups** ([`group::GroupTemplate`]): Pattern-based feature selection
//! 2. **Aggregate** ([`aggregation::aggregate`]): Weighted, missing-tolerant composite scores
//! 3. **Build Matrix** ([`matrix::MatrixBuilder::build_groups`]): Group × group correlations
//!
//! ## Partition Workflow
//!
//! 1. **Scan Categories** ([`partition::category_counts`]): Entities per attribute value
//! 2. **Analyze Partitions** ([`partition::PartitionAnalyzer`]): One matrix per value
//! 3. **Compare** ([`partition::compute_divergence`]): Largest coefficient gap per pair
//!
//! [`engine::CorrelationEngine`] bundles all three workflows behind one resolver.
//!
//! # Missing Data
//!
//! MISSING is `None` throughout. Nothing is imputed: correlations use
//! pairwise-complete observations, composite scores re-normalize by the
//! weights of the features actually present, and undersized samples are
//! reported as such instead of producing numbers.
//!
//! # Examples
//!
//! ```
//! use lingcorr_analysis::{
//!     aggregation::WeightMap, convention::KindConvention, engine::CorrelationEngine,
//!     entity::Entity, group::FeatureGroup,
//! };
//! use lingcorr_stats::correlation::CorrelationMethod;
//!
//! let entities: Vec<Entity> = serde_json::from_str(
//!     r#"[
//!         { "id": "a", "features": { "GB030": "1", "GB051": "1", "EA044": 4 } },
//!         { "id": "b", "features": { "GB030": "0", "GB051": null, "EA044": 1 } },
//!         { "id": "c", "features": { "GB030": "1", "GB051": "0", "EA044": "3" } },
//!         { "id": "d", "features": { "GB030": "0", "GB051": "0", "EA044": "NA" } }
//!     ]"#,
//! )
//! .unwrap();
//!
//! let engine = CorrelationEngine::new(KindConvention::grambank()).with_min_sample_size(3);
//!
//! let pair = engine.compute_pair(&entities, "GB030", "EA044", CorrelationMethod::Spearman);
//! assert_eq!(pair.sample_size, 3);
//!
//! let groups = [
//!     FeatureGroup::new("gender", ["GB030", "GB051"]),
//!     FeatureGroup::new("social", ["EA044"]),
//! ];
//! let result = engine
//!     .compute_group_matrix(&entities, &groups, &WeightMap::new(), CorrelationMethod::Pearson)
//!     .unwrap();
//! assert_eq!(result.matrix.sample_size, 3);
//! assert_eq!(result.groups[0].valid_count, 4);
//! ```

pub mod aggregation;
pub mod convention;
pub mod engine;
pub mod entity;
pub mod group;
pub mod matrix;
pub mod normalization;
pub mod partition;
