//! Semantic feature groups
//!
//! A [`FeatureGroup`] is a named list of feature ids that is folded into one
//! composite score per entity by the [`aggregation`](crate::aggregation)
//! module. Groups are usually declared as [`GroupTemplate`]s in configuration
//! and resolved against the features the user selected.

use serde::{Deserialize, Serialize};

use crate::convention::IdPattern;

/// A named set of features aggregated into one composite series.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureGroup {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    pub features: Vec<String>,
}

impl FeatureGroup {
    #[must_use]
    pub fn new<I, S>(name: impl Into<String>, features: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            label: None,
            features: features.into_iter().map(Into::into).collect(),
        }
    }

    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Human-readable name, falling back to the group name.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.name)
    }
}

/// Pattern-based group declaration.
///
/// A feature belongs to the group if it matches any `include` pattern and no
/// `exclude` pattern.
///
/// # Examples
///
/// ```
/// use lingcorr_analysis::group::GroupTemplate;
///
/// let template: GroupTemplate = serde_json::from_str(
///     r#"{
///         "name": "ea_social",
///         "include": ["prefix:EA"],
///         "exclude": ["contains:Richness"]
///     }"#,
/// )
/// .unwrap();
///
/// let group = template.resolve(["EA044", "GB030", "EA112", "EARichness"]);
/// assert_eq!(group.features, ["EA044", "EA112"]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupTemplate {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    pub include: Vec<IdPattern>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub exclude: Vec<IdPattern>,
}

impl GroupTemplate {
    #[must_use]
    pub fn matches(&self, feature_id: &str) -> bool {
        self.include.iter().any(|p| p.matches(feature_id))
            && !self.exclude.iter().any(|p| p.matches(feature_id))
    }

    /// Builds the concrete group from the selected features, keeping their
    /// order and dropping duplicates.
    #[must_use]
    pub fn resolve<I, S>(&self, selected: I) -> FeatureGroup
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut features: Vec<String> = vec![];
        for id in selected {
            let id = id.as_ref();
            if self.matches(id) && !features.iter().any(|f| f == id) {
                features.push(id.to_owned());
            }
        }
        FeatureGroup {
            name: self.name.clone(),
            label: self.label.clone(),
            features,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn template(name: &str, include: &[&str], exclude: &[&str]) -> GroupTemplate {
        GroupTemplate {
            name: name.to_owned(),
            label: None,
            include: include.iter().map(|p| p.parse().unwrap()).collect(),
            exclude: exclude.iter().map(|p| p.parse().unwrap()).collect(),
        }
    }

    #[test]
    fn test_exclude_overrides_include() {
        let social = template("ea_social", &["prefix:EA"], &["contains:Richness"]);
        assert!(social.matches("EA044"));
        assert!(!social.matches("EARichness"));
        assert!(!social.matches("GB030"));
    }

    #[test]
    fn test_resolve_keeps_selection_order_without_duplicates() {
        let gender = template("gb_gender", &["GB051", "GB030", "GB052"], &[]);
        let group = gender.resolve(["GB052", "GB030", "GB999", "GB052"]);
        assert_eq!(group.name, "gb_gender");
        assert_eq!(group.features, ["GB052", "GB030"]);
    }

    #[test]
    fn test_resolve_may_yield_empty_group() {
        let ecological = template("ea_ecological", &["contains:Richness"], &[]);
        assert!(ecological.resolve(["GB030"]).features.is_empty());
    }

    #[test]
    fn test_display_name_prefers_label() {
        let group = FeatureGroup::new("gb_gender", ["GB030"]);
        assert_eq!(group.display_name(), "gb_gender");
        assert_eq!(
            group.with_label("Gender features").display_name(),
            "Gender features"
        );
    }
}
