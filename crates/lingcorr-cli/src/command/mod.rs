use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use self::{
    categories::CategoriesArg, groups::GroupsArg, matrix::MatrixArg, pairwise::PairwiseArg,
    partition::PartitionArg,
};

mod categories;
mod groups;
mod matrix;
mod pairwise;
mod partition;

#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct CommandArgs {
    /// Log debug details (overridden by RUST_LOG)
    #[arg(long, short, global = true)]
    verbose: bool,

    /// Analysis to run
    #[command(subcommand)]
    mode: Mode,
}

#[derive(Debug, Clone, Subcommand)]
enum Mode {
    /// Correlate every pair of the selected features directly
    Pairwise(#[clap(flatten)] PairwiseArg),
    /// Build a feature correlation matrix over complete entities
    Matrix(#[clap(flatten)] MatrixArg),
    /// Correlate weighted feature groups
    Groups(#[clap(flatten)] GroupsArg),
    /// Compare correlations across categorical partitions
    Partition(#[clap(flatten)] PartitionArg),
    /// List the values of a categorical attribute with entity counts
    Categories(#[clap(flatten)] CategoriesArg),
}

pub fn run() -> anyhow::Result<()> {
    let args = CommandArgs::parse();
    init_tracing(args.verbose);

    match &args.mode {
        Mode::Pairwise(arg) => pairwise::run(arg)?,
        Mode::Matrix(arg) => matrix::run(arg)?,
        Mode::Groups(arg) => groups::run(arg)?,
        Mode::Partition(arg) => partition::run(arg)?,
        Mode::Categories(arg) => categories::run(arg)?,
    }
    Ok(())
}

/// Logs go to stderr so that JSON reports on stdout stay clean.
fn init_tracing(verbose: bool) {
    let default_directive = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .with_target(false)
        .init();
}
