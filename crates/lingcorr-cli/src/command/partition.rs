use chrono::Utc;
use clap::Args;
use lingcorr_analysis::partition::{self, DEFAULT_MIN_PARTITION_SIZE};
use lingcorr_stats::correlation::CorrelationMethod;

use crate::{
    schema::report::PartitionReport,
    util::{self, InputArg},
};

#[derive(Debug, Clone, Args)]
pub(crate) struct PartitionArg {
    #[clap(flatten)]
    pub input: InputArg,

    /// Categorical attribute to partition by (e.g. family, macroarea)
    #[arg(long)]
    pub attribute: String,

    /// Attribute values to analyze (comma-separated, all values if omitted)
    #[arg(long, value_delimiter = ',')]
    pub values: Vec<String>,

    /// Feature IDs to include (comma-separated, all features if omitted)
    #[arg(long, value_delimiter = ',')]
    pub features: Vec<String>,

    /// Correlation method
    #[arg(long, default_value_t)]
    pub method: CorrelationMethod,

    /// Minimum number of entities in a partition
    #[arg(long, default_value_t = DEFAULT_MIN_PARTITION_SIZE)]
    pub min_partition_size: usize,

    /// Keep only the N most divergent feature pairs
    #[arg(long)]
    pub top: Option<usize>,
}

pub(crate) fn run(arg: &PartitionArg) -> anyhow::Result<()> {
    let (entities, config) = arg.input.load()?;
    let features = if arg.features.is_empty() {
        util::all_feature_ids(&entities)
    } else {
        arg.features.clone()
    };
    let values: Vec<String> = if arg.values.is_empty() {
        let counts = partition::category_counts(&entities, &arg.attribute);
        if counts.is_empty() {
            anyhow::bail!("No entity has the attribute {}", arg.attribute);
        }
        counts.into_keys().collect()
    } else {
        arg.values.clone()
    };
    let method = arg.method;

    let engine = util::engine(&config).with_min_partition_size(arg.min_partition_size);
    let analysis =
        engine.compute_partitioned(&entities, &arg.attribute, &values, &features, method);
    let computed = analysis.computed().count();
    tracing::info!(
        attribute = %arg.attribute,
        partitions = analysis.partitions.len(),
        computed,
        "partition analysis finished"
    );

    let mut divergences =
        partition::rank_divergences(engine.compute_divergence(&analysis, &features));
    if let Some(top) = arg.top {
        divergences.truncate(top);
    }

    let report = PartitionReport {
        generated_at: Utc::now(),
        features,
        analysis,
        divergences,
    };
    arg.input.save_json(&report)
}
