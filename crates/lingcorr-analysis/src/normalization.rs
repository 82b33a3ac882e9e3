//! Value normalization: raw feature values to numbers or MISSING
//!
//! Every raw value passes through [`FeatureKind::normalize`] before it takes
//! part in any computation. The function is total: input it cannot interpret
//! becomes `None` (MISSING), never an error and never a silent zero.
//!
//! | kind         | accepted                              | everything else |
//! |--------------|---------------------------------------|-----------------|
//! | `binary`     | `"0"`, `0` → 0.0 and `"1"`, `1` → 1.0 | MISSING         |
//! | `continuous` | finite numbers, numeric strings       | MISSING         |
//!
//! Which kind a feature has is decided by a [`FeatureKindResolver`], usually a
//! [`KindConvention`](crate::convention::KindConvention) loaded from
//! configuration. A feature id the resolver cannot classify is MISSING for
//! every entity.
//!
//! # Examples
//!
//! ```
//! use lingcorr_analysis::{
//!     entity::{Entity, RawValue},
//!     normalization::{self, FeatureKind},
//! };
//!
//! assert_eq!(FeatureKind::Binary.normalize(Some(&RawValue::from("1"))), Some(1.0));
//! assert_eq!(FeatureKind::Binary.normalize(Some(&RawValue::from("?"))), None);
//! assert_eq!(FeatureKind::Continuous.normalize(Some(&RawValue::from(" 2.5 "))), Some(2.5));
//!
//! // Resolve through a naming rule supplied by the caller.
//! let resolver = |id: &str| {
//!     Some(if id.starts_with("GB") { FeatureKind::Binary } else { FeatureKind::Continuous })
//! };
//! let entity = Entity::new("stan1293").with_feature("GB030", 2).with_feature("EA044", 2);
//! assert_eq!(normalization::resolve(&resolver, &entity, "GB030"), None);
//! assert_eq!(normalization::resolve(&resolver, &entity, "EA044"), Some(2.0));
//! ```

use std::{borrow::Borrow, collections::BTreeMap};

use serde::{Deserialize, Serialize};

use crate::entity::{Entity, RawValue};

/// How raw values of a feature are interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeatureKind {
    /// Ternary-coded: asserted true (1), asserted false (0), or unknown.
    Binary,
    /// Real-valued or unknown.
    Continuous,
}

impl FeatureKind {
    /// Converts a raw value into a number, or `None` for MISSING.
    #[must_use]
    pub fn normalize(self, raw: Option<&RawValue>) -> Option<f64> {
        match self {
            Self::Binary => normalize_binary(raw?),
            Self::Continuous => normalize_continuous(raw?),
        }
    }
}

fn normalize_binary(raw: &RawValue) -> Option<f64> {
    match raw {
        RawValue::Text(text) => match text.as_str() {
            "0" => Some(0.0),
            "1" => Some(1.0),
            _ => None,
        },
        RawValue::Number(value) => match *value {
            0.0 => Some(0.0),
            1.0 => Some(1.0),
            _ => None,
        },
        RawValue::Null | RawValue::Bool(_) => None,
    }
}

fn normalize_continuous(raw: &RawValue) -> Option<f64> {
    let value = match raw {
        RawValue::Number(value) => *value,
        RawValue::Text(text) => text.trim().parse::<f64>().ok()?,
        RawValue::Null | RawValue::Bool(_) => return None,
    };
    value.is_finite().then_some(value)
}

/// Caller-supplied rule deciding the [`FeatureKind`] of a feature id.
pub trait FeatureKindResolver {
    /// Kind of the feature, or `None` if the id cannot be classified.
    fn kind_of(&self, feature_id: &str) -> Option<FeatureKind>;
}

impl<F> FeatureKindResolver for F
where
    F: Fn(&str) -> Option<FeatureKind>,
{
    fn kind_of(&self, feature_id: &str) -> Option<FeatureKind> {
        self(feature_id)
    }
}

impl FeatureKindResolver for BTreeMap<String, FeatureKind> {
    fn kind_of(&self, feature_id: &str) -> Option<FeatureKind> {
        self.get(feature_id).copied()
    }
}

/// Every feature has the same kind.
impl FeatureKindResolver for FeatureKind {
    fn kind_of(&self, _feature_id: &str) -> Option<FeatureKind> {
        Some(*self)
    }
}

/// Normalized value of one feature for one entity.
pub fn resolve<R>(resolver: &R, entity: &Entity, feature_id: &str) -> Option<f64>
where
    R: FeatureKindResolver + ?Sized,
{
    resolver
        .kind_of(feature_id)?
        .normalize(entity.raw(feature_id))
}

/// Normalized values of one feature across entities, in entity order.
pub fn feature_series<R, E>(resolver: &R, entities: &[E], feature_id: &str) -> Vec<Option<f64>>
where
    R: FeatureKindResolver + ?Sized,
    E: Borrow<Entity>,
{
    let Some(kind) = resolver.kind_of(feature_id) else {
        tracing::warn!(feature_id, "unresolved feature kind, all values missing");
        return vec![None; entities.len()];
    };
    entities
        .iter()
        .map(|entity| kind.normalize(entity.borrow().raw(feature_id)))
        .collect()
}
