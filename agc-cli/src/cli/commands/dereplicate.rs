use super::{load_records, ExtractionArgs};
use crate::cli::output::{format_number, section_header, success, tree};
use agc_bio::formats::fasta::write_fasta;
use agc_bio::sequence::Sequence;
use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct DereplicateArgs {
    #[command(flatten)]
    pub extraction: ExtractionArgs,

    /// Output file for distinct sequences (.gz to compress)
    #[arg(short = 'o', long, value_name = "FILE", default_value = "dereplicated.fasta")]
    pub output_file: PathBuf,
}

pub fn run(args: DereplicateArgs) -> Result<()> {
    let config = args.extraction.resolve_config()?;
    config.validate()?;

    let (records, stats) = load_records(&args.extraction.amplicon_file, &config)?;

    let sequences: Vec<Sequence> = records
        .iter()
        .enumerate()
        .map(|(i, record)| record.to_fasta(i))
        .collect();
    write_fasta(
        &args.output_file,
        &sequences,
        config.output.line_width,
        config.output.compress_output,
    )
    .with_context(|| format!("Failed to write {}", args.output_file.display()))?;

    section_header("Dereplication complete");
    tree(&[
        ("Reads", format_number(stats.reads)),
        ("Distinct sequences", format_number(stats.distinct as u64)),
        ("Kept (count >= min)", format_number(stats.retained as u64)),
        ("Reads in kept sequences", format_number(stats.retained_reads)),
    ]);
    success(&format!(
        "Wrote {} sequences to {}",
        sequences.len(),
        args.output_file.display()
    ));

    Ok(())
}
