use std::fmt;

use serde::{Deserialize, Serialize};

/// Conventional significance bands for a p-value.
///
/// Ordered from least to most significant, so `level >= SignificanceLevel::Significant`
/// reads as "p < 0.05".
#[derive(
    Default, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum SignificanceLevel {
    /// p >= 0.05
    #[default]
    NotSignificant,
    /// p < 0.05
    Significant,
    /// p < 0.01
    HighlySignificant,
    /// p < 0.001
    VeryHighlySignificant,
}

impl SignificanceLevel {
    /// Classifies a p-value. NaN is never significant.
    ///
    /// # Examples
    ///
    /// ```
    /// use lingcorr_stats::significance::SignificanceLevel;
    ///
    /// assert_eq!(SignificanceLevel::from_p_value(0.0004).stars(), "***");
    /// assert_eq!(SignificanceLevel::from_p_value(0.03).stars(), "*");
    /// assert_eq!(SignificanceLevel::from_p_value(0.2).stars(), "");
    /// ```
    #[must_use]
    pub fn from_p_value(p_value: f64) -> Self {
        if p_value < 0.001 {
            Self::VeryHighlySignificant
        } else if p_value < 0.01 {
            Self::HighlySignificant
        } else if p_value < 0.05 {
            Self::Significant
        } else {
            Self::NotSignificant
        }
    }

    /// Star marker used in correlation tables.
    #[must_use]
    pub fn stars(self) -> &'static str {
        match self {
            Self::NotSignificant => "",
            Self::Significant => "*",
            Self::HighlySignificant => "**",
            Self::VeryHighlySignificant => "***",
        }
    }
}

impl fmt::Display for SignificanceLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self.stars(), f)
    }
}
