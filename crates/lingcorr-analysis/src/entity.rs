//! Entity records consumed by the correlation engine
//!
//! An [`Entity`] is one analysis subject (a language). It carries raw feature
//! values keyed by feature id and categorical attributes (family, region,
//! macroarea, ...) that are only used for partitioning.
//!
//! Records arrive already assembled; the engine never looks at how they were
//! joined.
//!
//! # Serialization
//!
//! ```json
//! {
//!   "id": "stan1293",
//!   "features": { "GB030": "1", "GB051": null, "EA044": 3, "BirdRichness": "212.5" },
//!   "attributes": { "family": "indo1319", "macroarea": "Eurasia" }
//! }
//! ```
//!
//! Feature values may be strings, numbers, booleans or `null`; their meaning
//! is decided later by the [`normalization`](crate::normalization) module.
//!
//! Attribute values are categories. Numbers and booleans are read as their
//! text form, and a `null` attribute is dropped, so the entity counts as
//! lacking it.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};

/// A raw, not yet interpreted feature value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawValue {
    Null,
    Bool(bool),
    Number(f64),
    Text(String),
}

impl From<f64> for RawValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<i32> for RawValue {
    fn from(value: i32) -> Self {
        Self::Number(f64::from(value))
    }
}

impl From<bool> for RawValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<&str> for RawValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<String> for RawValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl<T> From<Option<T>> for RawValue
where
    T: Into<RawValue>,
{
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

/// One analysis subject with its feature values and categorical attributes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    /// Unique identifier (e.g. a Glottocode)
    pub id: String,
    /// Raw feature values keyed by feature id
    #[serde(default)]
    pub features: BTreeMap<String, RawValue>,
    /// Categorical attributes used for partitioning
    #[serde(default, deserialize_with = "deserialize_attributes")]
    pub attributes: BTreeMap<String, String>,
}

impl RawValue {
    /// Category label of an attribute value, `None` for `null`.
    fn into_category(self) -> Option<String> {
        match self {
            Self::Null => None,
            Self::Bool(value) => Some(value.to_string()),
            Self::Number(value) => Some(value.to_string()),
            Self::Text(value) => Some(value),
        }
    }
}

fn deserialize_attributes<'de, D>(deserializer: D) -> Result<BTreeMap<String, String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = BTreeMap::<String, RawValue>::deserialize(deserializer)?;
    Ok(raw
        .into_iter()
        .filter_map(|(name, value)| Some((name, value.into_category()?)))
        .collect())
}

impl Entity {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    /// Builder-style setter for a feature value.
    #[must_use]
    pub fn with_feature(
        mut self,
        feature_id: impl Into<String>,
        value: impl Into<RawValue>,
    ) -> Self {
        self.features.insert(feature_id.into(), value.into());
        self
    }

    /// Builder-style setter for a categorical attribute.
    #[must_use]
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    /// Raw value of a feature, `None` if the entity has no entry for it.
    #[must_use]
    pub fn raw(&self, feature_id: &str) -> Option<&RawValue> {
        self.features.get(feature_id)
    }

    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }
}
