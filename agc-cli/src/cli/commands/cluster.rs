use super::summary::{OtuSummary, RunSummary};
use super::{existing_file, load_records, ExtractionArgs};
use crate::cli::output::{format_number, section_header, success, tree, warning};
use agc_bio::alignment::{NeedlemanWunsch, NucleotideMatrix, ScoringMatrix, SubstitutionMatrix};
use agc_bio::clustering::{GreedyClusterer, PrefilterSettings};
use agc_bio::formats::fasta::write_otus;
use agc_core::Config;
use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;
use std::time::Instant;

#[derive(Args, Debug)]
pub struct ClusterArgs {
    #[command(flatten)]
    pub extraction: ExtractionArgs,

    /// Output file for OTU representatives (.gz to compress)
    #[arg(short = 'o', long, value_name = "FILE", default_value = "OTU.fasta")]
    pub output_file: PathBuf,

    /// Percent identity required to join an existing OTU [default: 97]
    #[arg(long, value_name = "PERCENT")]
    pub threshold: Option<f64>,

    /// Only align against OTUs sharing k-mers with the candidate
    #[arg(long)]
    pub kmer_prefilter: bool,

    /// Chunk length used by the k-mer prefilter [default: 100]
    #[arg(short = 'c', long, value_name = "N")]
    pub chunk_size: Option<usize>,

    /// K-mer length used by the k-mer prefilter [default: 8]
    #[arg(short = 'k', long, value_name = "N")]
    pub kmer_size: Option<usize>,

    /// OTUs nominated per chunk by the k-mer prefilter [default: 8]
    #[arg(long, value_name = "N")]
    pub max_mates: Option<usize>,

    /// NCBI-format substitution matrix replacing the match/mismatch scores
    #[arg(long, value_name = "FILE", value_parser = existing_file)]
    pub matrix: Option<PathBuf>,

    /// Write a JSON run summary
    #[arg(long, value_name = "FILE")]
    pub summary: Option<PathBuf>,
}

impl ClusterArgs {
    fn resolve_config(&self) -> Result<Config> {
        let mut config = self.extraction.resolve_config()?;
        if let Some(v) = self.threshold {
            config.clustering.identity_threshold = v;
        }
        if self.kmer_prefilter {
            config.clustering.kmer_prefilter = true;
        }
        if let Some(v) = self.chunk_size {
            config.clustering.chunk_size = v;
        }
        if let Some(v) = self.kmer_size {
            config.clustering.kmer_size = v;
        }
        if let Some(v) = self.max_mates {
            config.clustering.max_mates = v;
        }
        if let Some(path) = &self.matrix {
            config.alignment.matrix = Some(path.display().to_string());
        }
        config.validate()?;
        Ok(config)
    }
}

fn build_scoring(config: &Config) -> Result<Box<dyn ScoringMatrix + Send + Sync>> {
    let alignment = &config.alignment;
    match &alignment.matrix {
        Some(path) => {
            let matrix = SubstitutionMatrix::from_file(path)?
                .with_gap_penalties(alignment.gap_open, alignment.gap_extend);
            Ok(Box::new(matrix))
        }
        None => Ok(Box::new(
            NucleotideMatrix::new()
                .with_scores(alignment.match_score, alignment.mismatch_score)
                .with_gap_penalties(alignment.gap_open, alignment.gap_extend),
        )),
    }
}

pub fn run(args: ClusterArgs) -> Result<()> {
    let start = Instant::now();
    let config = args.resolve_config()?;
    let input = &args.extraction.amplicon_file;

    let (records, derep_stats) = load_records(input, &config)?;

    let aligner = NeedlemanWunsch::new(build_scoring(&config)?);
    let mut clusterer = GreedyClusterer::with_aligner(config.clustering.identity_threshold, aligner)
        .with_progress(true);
    if config.clustering.kmer_prefilter {
        tracing::info!(
            "k-mer prefilter enabled (k={}, chunk={}, mates={})",
            config.clustering.kmer_size,
            config.clustering.chunk_size,
            config.clustering.max_mates
        );
        clusterer = clusterer.with_prefilter(PrefilterSettings {
            kmer_size: config.clustering.kmer_size,
            chunk_size: config.clustering.chunk_size,
            max_mates: config.clustering.max_mates,
        });
    }

    let (otus, cluster_stats) = clusterer
        .cluster_with_stats(&records)
        .context("Clustering failed")?;

    write_otus(
        &args.output_file,
        &otus,
        config.output.line_width,
        config.output.compress_output,
    )
    .with_context(|| format!("Failed to write {}", args.output_file.display()))?;

    if let Some(path) = &args.summary {
        let summary = RunSummary {
            version: agc_core::VERSION,
            input: input.display().to_string(),
            output: args.output_file.display().to_string(),
            config: config.clone(),
            dereplication: derep_stats.clone(),
            clustering: cluster_stats.clone(),
            otus: OtuSummary::from_otus(&otus),
            elapsed_seconds: start.elapsed().as_secs_f64(),
        };
        summary
            .save(path)
            .with_context(|| format!("Failed to write summary {}", path.display()))?;
        tracing::info!("Run summary written to {}", path.display());
    }

    section_header("Clustering complete");
    tree(&[
        ("Reads", format_number(derep_stats.reads)),
        ("Distinct sequences", format_number(derep_stats.distinct as u64)),
        (
            "Kept (count >= min)",
            format_number(derep_stats.retained as u64),
        ),
        ("Alignments", format_number(cluster_stats.alignments)),
        ("OTUs", format_number(cluster_stats.otus as u64)),
    ]);
    if otus.is_empty() {
        warning("No sequence passed the length and abundance filters");
    }
    success(&format!(
        "Wrote {} OTUs to {}",
        otus.len(),
        args.output_file.display()
    ));

    Ok(())
}
