use std::path::PathBuf;

use chrono::Utc;
use clap::Args;
use lingcorr_analysis::partition;

use crate::{
    schema::report::{CategoryCount, CategoryReport},
    util,
};

#[derive(Debug, Clone, Args)]
pub(crate) struct CategoriesArg {
    /// Path to the entities JSON file
    pub entities: PathBuf,

    /// Categorical attribute to scan (e.g. family, macroarea)
    #[arg(long)]
    pub attribute: String,

    /// Write the JSON report to this path instead of stdout
    #[arg(long, short)]
    pub output: Option<PathBuf>,
}

pub(crate) fn run(arg: &CategoriesArg) -> anyhow::Result<()> {
    let entities = util::read_entities_file(&arg.entities)?;
    let counts = partition::category_counts(&entities, &arg.attribute);
    let assigned: usize = counts.values().sum();

    let mut categories: Vec<_> = counts
        .into_iter()
        .map(|(value, count)| CategoryCount { value, count })
        .collect();
    // largest first, ties by value
    categories.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.value.cmp(&b.value)));

    let report = CategoryReport {
        generated_at: Utc::now(),
        attribute: arg.attribute.clone(),
        unassigned: entities.len() - assigned,
        categories,
    };
    util::Output::save_json(&report, arg.output.as_deref())
}
