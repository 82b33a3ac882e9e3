use lingcorr_analysis::{
    aggregation::WeightMap,
    convention::{IdPattern, KindConvention},
    group::{FeatureGroup, GroupTemplate},
};
use serde::{Deserialize, Serialize};

/// Grambank features describing nominal gender.
const GENDER_FEATURES: [&str; 14] = [
    "GB030", "GB051", "GB052", "GB053", "GB054", "GB170", "GB171", "GB172", "GB177", "GB192",
    "GB198", "GB314", "GB315", "GB321",
];

/// Grambank features describing numeral classifiers.
const CLASSIFIER_FEATURES: [&str; 3] = ["GB038", "GB057", "GB058"];

/// Analysis settings loaded from `--config`.
///
/// Every section is optional; missing sections fall back to the built-in
/// defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub kind_convention: KindConvention,
    pub groups: Vec<GroupTemplate>,
    pub weights: WeightMap,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            kind_convention: KindConvention::grambank(),
            groups: default_groups(),
            weights: WeightMap::new(),
        }
    }
}

impl AnalysisConfig {
    pub fn group_template(&self, name: &str) -> Option<&GroupTemplate> {
        self.groups.iter().find(|group| group.name == name)
    }

    /// Resolves group templates against the selected features.
    ///
    /// With no names given, every configured group is resolved.
    pub fn resolve_groups<S>(
        &self,
        names: &[String],
        selected: &[S],
    ) -> anyhow::Result<Vec<FeatureGroup>>
    where
        S: AsRef<str>,
    {
        let templates = if names.is_empty() {
            self.groups.iter().collect::<Vec<_>>()
        } else {
            names
                .iter()
                .map(|name| {
                    self.group_template(name)
                        .ok_or_else(|| anyhow::anyhow!("Feature group {name} not found"))
                })
                .collect::<anyhow::Result<Vec<_>>>()?
        };
        Ok(templates
            .into_iter()
            .map(|template| template.resolve(selected))
            .collect())
    }
}

fn template(
    name: &str,
    label: &str,
    include: Vec<IdPattern>,
    exclude: Vec<IdPattern>,
) -> GroupTemplate {
    GroupTemplate {
        name: name.to_owned(),
        label: Some(label.to_owned()),
        include,
        exclude,
    }
}

fn exact_ids(ids: &[&str]) -> Vec<IdPattern> {
    ids.iter().map(|id| IdPattern::Exact((*id).to_owned())).collect()
}

/// The four canonical groups: social and ecological ethnographic variables,
/// gender and classifier grammar features.
fn default_groups() -> Vec<GroupTemplate> {
    let richness = IdPattern::Contains("Richness".to_owned());
    vec![
        template(
            "ea_social",
            "Social organization",
            vec![IdPattern::Prefix("EA".to_owned())],
            vec![richness.clone()],
        ),
        template("ea_ecological", "Ecological richness", vec![richness], vec![]),
        template("gb_gender", "Gender system", exact_ids(&GENDER_FEATURES), vec![]),
        template(
            "gb_classifier",
            "Classifier system",
            exact_ids(&CLASSIFIER_FEATURES),
            vec![],
        ),
    ]
}
