pub mod commands;
pub mod output;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "agc",
    version,
    author = agc_core::AUTHORS,
    about = agc_core::DESCRIPTION,
    long_about = "agc dereplicates amplicon reads, then walks the distinct sequences from most \
                  to least abundant, merging each into the first most similar OTU at or above \
                  the identity threshold or founding a new OTU."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Verbosity level (can be repeated)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Number of threads to use (0 = all available)
    #[arg(short = 'j', long, default_value = "0", global = true)]
    pub threads: usize,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Dereplicate reads and cluster them into OTUs
    Cluster(commands::cluster::ClusterArgs),

    /// Dereplicate reads and write the abundance-sorted distinct sequences
    Dereplicate(commands::dereplicate::DereplicateArgs),
}
