//! Weighted, missing-tolerant aggregation of features into composite scores
//!
//! For one entity and one feature group the composite score is
//!
//! ```text
//! score = Σ value_i · w_i / Σ w_i
//! ```
//!
//! where both sums run only over features that are present for the entity
//! and have a usable weight. Missing features therefore neither pull the score
//! towards zero nor shift the weight balance of the remaining features. If no
//! feature contributes, the score is MISSING.
//!
//! # Weights
//!
//! | weight entry             | effect                    |
//! |--------------------------|---------------------------|
//! | absent                   | weight `1.0`              |
//! | finite and `> 0`         | used as is                |
//! | `≤ 0`, NaN or infinite   | feature excluded          |
//!
//! # Examples
//!
//! ```
//! use lingcorr_analysis::{
//!     aggregation::{self, WeightMap},
//!     entity::Entity,
//!     normalization::FeatureKind,
//! };
//!
//! let entity = Entity::new("a")
//!     .with_feature("GB030", "1")
//!     .with_feature("GB051", "0")
//!     .with_feature("GB052", "NA");
//! let weights = WeightMap::from_iter([("GB030", 3.0)]);
//!
//! // (1·3 + 0·1) / (3 + 1); GB052 is missing and ignored.
//! let score = aggregation::aggregate(
//!     &FeatureKind::Binary,
//!     &entity,
//!     &["GB030", "GB051", "GB052"],
//!     &weights,
//! );
//! assert_eq!(score, Some(0.75));
//! ```

use std::{borrow::Borrow, collections::BTreeMap};

use serde::{Deserialize, Serialize};

use crate::{
    entity::Entity,
    normalization::{self, FeatureKindResolver},
};

/// User-assigned feature weights.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WeightMap(BTreeMap<String, f64>);

impl WeightMap {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Effective weight of a feature, `None` if the feature is excluded.
    #[must_use]
    pub fn weight_of(&self, feature_id: &str) -> Option<f64> {
        let weight = self.0.get(feature_id).copied().unwrap_or(1.0);
        (weight.is_finite() && weight > 0.0).then_some(weight)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K> FromIterator<(K, f64)> for WeightMap
where
    K: Into<String>,
{
    fn from_iter<T: IntoIterator<Item = (K, f64)>>(iter: T) -> Self {
        Self(iter.into_iter().map(|(k, w)| (k.into(), w)).collect())
    }
}

/// Composite score of one entity over a feature list.
pub fn aggregate<R, S>(
    resolver: &R,
    entity: &Entity,
    features: &[S],
    weights: &WeightMap,
) -> Option<f64>
where
    R: FeatureKindResolver + ?Sized,
    S: AsRef<str>,
{
    let mut weighted_sum = 0.0;
    let mut weight_sum = 0.0;
    for feature_id in features {
        let feature_id = feature_id.as_ref();
        let Some(weight) = weights.weight_of(feature_id) else {
            continue;
        };
        let Some(value) = normalization::resolve(resolver, entity, feature_id) else {
            continue;
        };
        weighted_sum += value * weight;
        weight_sum += weight;
    }
    (weight_sum > 0.0).then(|| weighted_sum / weight_sum)
}

/// Composite scores of every entity, in entity order.
pub fn group_series<R, E, S>(
    resolver: &R,
    entities: &[E],
    features: &[S],
    weights: &WeightMap,
) -> Vec<Option<f64>>
where
    R: FeatureKindResolver + ?Sized,
    E: Borrow<Entity>,
    S: AsRef<str>,
{
    entities
        .iter()
        .map(|entity| aggregate(resolver, entity.borrow(), features, weights))
        .collect()
}
