use chrono::Utc;
use clap::Args;
use lingcorr_analysis::matrix::DEFAULT_MIN_SAMPLE_SIZE;
use lingcorr_stats::correlation::CorrelationMethod;

use crate::{
    schema::report::MatrixReport,
    util::{self, InputArg},
};

#[derive(Debug, Clone, Args)]
pub(crate) struct MatrixArg {
    #[clap(flatten)]
    pub input: InputArg,

    /// Feature IDs to include (comma-separated, all features if omitted)
    #[arg(long, value_delimiter = ',')]
    pub features: Vec<String>,

    /// Correlation method
    #[arg(long, default_value_t)]
    pub method: CorrelationMethod,

    /// Minimum number of entities complete on every feature
    #[arg(long, default_value_t = DEFAULT_MIN_SAMPLE_SIZE)]
    pub min_sample_size: usize,
}

pub(crate) fn run(arg: &MatrixArg) -> anyhow::Result<()> {
    let (entities, config) = arg.input.load()?;
    let features = if arg.features.is_empty() {
        util::all_feature_ids(&entities)
    } else {
        arg.features.clone()
    };
    let method = arg.method;

    let matrix = util::engine(&config)
        .with_min_sample_size(arg.min_sample_size)
        .compute_matrix(&entities, &features, method);
    if matrix.is_none() {
        tracing::warn!(
            features = features.len(),
            min_sample_size = arg.min_sample_size,
            "not enough complete entities for a correlation matrix"
        );
    }

    let report = MatrixReport {
        generated_at: Utc::now(),
        method,
        features,
        entity_count: entities.len(),
        matrix,
    };
    arg.input.save_json(&report)
}
