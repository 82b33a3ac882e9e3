//! Feature-id patterns and naming conventions
//!
//! Feature ids follow naming conventions of their source dataset (Grambank ids
//! start with `GB`, ethnographic ids with `EA`, ...). [`IdPattern`] matches
//! such ids, and [`KindConvention`] maps them to a [`FeatureKind`] with an
//! ordered list of rules.
//!
//! Patterns are written as strings:
//!
//! - `prefix:GB` matches ids starting with `GB`
//! - `contains:Richness` matches ids containing `Richness`
//! - `exact:GB030` or just `GB030` matches that id only

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::normalization::{FeatureKind, FeatureKindResolver};

/// Matcher for feature ids.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum IdPattern {
    Prefix(String),
    Contains(String),
    Exact(String),
}

impl IdPattern {
    #[must_use]
    pub fn matches(&self, feature_id: &str) -> bool {
        match self {
            Self::Prefix(prefix) => feature_id.starts_with(prefix.as_str()),
            Self::Contains(needle) => feature_id.contains(needle.as_str()),
            Self::Exact(id) => feature_id == id,
        }
    }
}

#[derive(Debug, derive_more::Display, derive_more::Error)]
pub enum ParsePatternError {
    #[display("empty feature-id pattern")]
    Empty,
    #[display("unknown pattern kind `{kind}` (expected prefix, contains or exact)")]
    UnknownKind { kind: String },
    #[display("pattern `{pattern}` has an empty operand")]
    EmptyOperand { pattern: String },
}

impl FromStr for IdPattern {
    type Err = ParsePatternError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(ParsePatternError::Empty);
        }
        let Some((kind, operand)) = s.split_once(':') else {
            return Ok(Self::Exact(s.to_owned()));
        };
        if operand.is_empty() {
            return Err(ParsePatternError::EmptyOperand {
                pattern: s.to_owned(),
            });
        }
        let operand = operand.to_owned();
        match kind {
            "prefix" => Ok(Self::Prefix(operand)),
            "contains" => Ok(Self::Contains(operand)),
            "exact" => Ok(Self::Exact(operand)),
            _ => Err(ParsePatternError::UnknownKind {
                kind: kind.to_owned(),
            }),
        }
    }
}

impl TryFrom<String> for IdPattern {
    type Error = ParsePatternError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<IdPattern> for String {
    fn from(pattern: IdPattern) -> Self {
        pattern.to_string()
    }
}

impl fmt::Display for IdPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Prefix(prefix) => write!(f, "prefix:{prefix}"),
            Self::Contains(needle) => write!(f, "contains:{needle}"),
            Self::Exact(id) => write!(f, "exact:{id}"),
        }
    }
}

/// One rule of a [`KindConvention`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KindRule {
    pub pattern: IdPattern,
    pub kind: FeatureKind,
}

/// Ordered naming rules deciding feature kinds.
///
/// The first matching rule wins. Ids no rule matches get `default`, or stay
/// unclassified (MISSING everywhere) when there is no default.
///
/// # Examples
///
/// ```
/// use lingcorr_analysis::{
///     convention::KindConvention,
///     normalization::{FeatureKind, FeatureKindResolver},
/// };
///
/// let convention: KindConvention = serde_json::from_str(
///     r#"{ "rules": [{ "pattern": "prefix:GB", "kind": "binary" }], "default": "continuous" }"#,
/// )
/// .unwrap();
/// assert_eq!(convention.kind_of("GB030"), Some(FeatureKind::Binary));
/// assert_eq!(convention.kind_of("EA044"), Some(FeatureKind::Continuous));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KindConvention {
    #[serde(default)]
    pub rules: Vec<KindRule>,
    #[serde(default)]
    pub default: Option<FeatureKind>,
}

impl KindConvention {
    /// Grambank ids (`GB` prefix) are binary, everything else continuous.
    #[must_use]
    pub fn grambank() -> Self {
        Self {
            rules: vec![KindRule {
                pattern: IdPattern::Prefix("GB".to_owned()),
                kind: FeatureKind::Binary,
            }],
            default: Some(FeatureKind::Continuous),
        }
    }
}

impl FeatureKindResolver for KindConvention {
    fn kind_of(&self, feature_id: &str) -> Option<FeatureKind> {
        self.rules
            .iter()
            .find(|rule| rule.pattern.matches(feature_id))
            .map(|rule| rule.kind)
            .or(self.default)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_patterns() {
        assert_eq!(
            "prefix:GB".parse::<IdPattern>().unwrap(),
            IdPattern::Prefix("GB".into())
        );
        assert_eq!(
            "contains:Richness".parse::<IdPattern>().unwrap(),
            IdPattern::Contains("Richness".into())
        );
        assert_eq!(
            "exact:GB030".parse::<IdPattern>().unwrap(),
            IdPattern::Exact("GB030".into())
        );
        assert_eq!(
            " GB030 ".parse::<IdPattern>().unwrap(),
            IdPattern::Exact("GB030".into())
        );
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!("".parse::<IdPattern>(), Err(ParsePatternError::Empty)));
        assert!(matches!(
            "suffix:GB".parse::<IdPattern>(),
            Err(ParsePatternError::UnknownKind { kind }) if kind == "suffix"
        ));
        assert!(matches!(
            "prefix:".parse::<IdPattern>(),
            Err(ParsePatternError::EmptyOperand { .. })
        ));
    }

    #[test]
    fn test_pattern_matching() {
        let prefix = IdPattern::Prefix("EA".into());
        assert!(prefix.matches("EA044"));
        assert!(!prefix.matches("GB030"));

        let contains = IdPattern::Contains("Richness".into());
        assert!(contains.matches("BirdRichness"));
        assert!(!contains.matches("EA044"));

        let exact = IdPattern::Exact("GB030".into());
        assert!(exact.matches("GB030"));
        assert!(!exact.matches("GB0301"));
    }

    #[test]
    fn test_pattern_serde_uses_string_form() {
        let pattern: IdPattern = serde_json::from_str(r#""contains:Richness""#).unwrap();
        assert_eq!(pattern, IdPattern::Contains("Richness".into()));
        assert_eq!(
            serde_json::to_string(&pattern).unwrap(),
            r#""contains:Richness""#
        );
        assert!(serde_json::from_str::<IdPattern>(r#""bogus:x""#).is_err());
    }

    #[test]
    fn test_first_matching_rule_wins() {
        let convention = KindConvention {
            rules: vec![
                KindRule {
                    pattern: IdPattern::Exact("GB999".into()),
                    kind: FeatureKind::Continuous,
                },
                KindRule {
                    pattern: IdPattern::Prefix("GB".into()),
                    kind: FeatureKind::Binary,
                },
            ],
            default: None,
        };
        assert_eq!(convention.kind_of("GB999"), Some(FeatureKind::Continuous));
        assert_eq!(convention.kind_of("GB030"), Some(FeatureKind::Binary));
        assert_eq!(convention.kind_of("EA044"), None);
    }

    #[test]
    fn test_grambank_convention() {
        let convention = KindConvention::grambank();
        assert_eq!(convention.kind_of("GB051"), Some(FeatureKind::Binary));
        assert_eq!(convention.kind_of("EA112"), Some(FeatureKind::Continuous));
        assert_eq!(
            convention.kind_of("MammalRichness"),
            Some(FeatureKind::Continuous)
        );
    }
}
