use chrono::Utc;
use clap::Args;
use lingcorr_stats::correlation::CorrelationMethod;

use crate::{
    schema::report::{PairRecord, PairwiseReport},
    util::{self, InputArg},
};

#[derive(Debug, Clone, Args)]
pub(crate) struct PairwiseArg {
    #[clap(flatten)]
    pub input: InputArg,

    /// Feature IDs to correlate (comma-separated, at least two)
    #[arg(long, value_delimiter = ',', required = true)]
    pub features: Vec<String>,

    /// Correlation method
    #[arg(long, default_value_t)]
    pub method: CorrelationMethod,
}

pub(crate) fn run(arg: &PairwiseArg) -> anyhow::Result<()> {
    let mut features: Vec<&str> = vec![];
    for feature in &arg.features {
        if !features.contains(&feature.as_str()) {
            features.push(feature);
        }
    }
    if features.len() < 2 {
        anyhow::bail!("At least two distinct features are required, got {}", features.len());
    }

    let (entities, config) = arg.input.load()?;
    let engine = util::engine(&config);
    let method = arg.method;

    let mut pairs = vec![];
    for (i, feature_a) in features.iter().enumerate() {
        for feature_b in &features[i + 1..] {
            let result = engine.compute_pair(&entities, feature_a, feature_b, method);
            tracing::debug!(
                feature_a,
                feature_b,
                coefficient = result.coefficient,
                sample_size = result.sample_size,
                "computed pair"
            );
            pairs.push(PairRecord::new(feature_a, feature_b, result));
        }
    }

    let report = PairwiseReport {
        generated_at: Utc::now(),
        method,
        entity_count: entities.len(),
        pairs,
    };
    arg.input.save_json(&report)
}
