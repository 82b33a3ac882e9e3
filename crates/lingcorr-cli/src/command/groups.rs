use chrono::Utc;
use clap::Args;
use lingcorr_analysis::matrix::DEFAULT_MIN_SAMPLE_SIZE;
use lingcorr_stats::correlation::CorrelationMethod;

use crate::{
    schema::report::GroupReport,
    util::{self, InputArg},
};

#[derive(Debug, Clone, Args)]
pub(crate) struct GroupsArg {
    #[clap(flatten)]
    pub input: InputArg,

    /// Selected feature IDs the groups are resolved against (comma-separated,
    /// all features if omitted)
    #[arg(long, value_delimiter = ',')]
    pub features: Vec<String>,

    /// Configured group names to correlate (comma-separated, all if omitted)
    #[arg(long, value_delimiter = ',')]
    pub groups: Vec<String>,

    /// Correlation method
    #[arg(long, default_value_t)]
    pub method: CorrelationMethod,

    /// Minimum number of entities with a score for every group
    #[arg(long, default_value_t = DEFAULT_MIN_SAMPLE_SIZE)]
    pub min_sample_size: usize,
}

pub(crate) fn run(arg: &GroupsArg) -> anyhow::Result<()> {
    let (entities, config) = arg.input.load()?;
    let selected = if arg.features.is_empty() {
        util::all_feature_ids(&entities)
    } else {
        arg.features.clone()
    };
    let groups = config.resolve_groups(&arg.groups, &selected)?;
    for group in &groups {
        tracing::info!(
            group = group.display_name(),
            features = %group.features.join(","),
            "resolved feature group"
        );
    }
    if config.weights.is_empty() {
        tracing::debug!("no feature weights configured, every feature weighs 1");
    }
    let method = arg.method;

    let result = util::engine(&config)
        .with_min_sample_size(arg.min_sample_size)
        .compute_group_matrix(&entities, &groups, &config.weights, method);
    if result.is_none() {
        tracing::warn!(
            min_sample_size = arg.min_sample_size,
            "not enough entities scored on every group for a correlation matrix"
        );
    }

    let report = GroupReport {
        generated_at: Utc::now(),
        method,
        entity_count: entities.len(),
        groups,
        result,
    };
    arg.input.save_json(&report)
}
