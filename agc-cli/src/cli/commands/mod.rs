pub mod cluster;
pub mod dereplicate;
pub mod summary;

use agc_bio::dereplication::{dereplicate_file, DereplicatedRecord, DereplicationStats};
use agc_core::{AgcError, Config};
use anyhow::{Context, Result};
use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};

/// Value parser for input paths: the file must exist and must not be a directory
pub fn existing_file(value: &str) -> std::result::Result<PathBuf, AgcError> {
    let path = PathBuf::from(value);
    if path.is_dir() {
        Err(AgcError::InputIsDirectory(path))
    } else if !path.exists() {
        Err(AgcError::InputNotFound(path))
    } else {
        Ok(path)
    }
}

/// Read extraction and abundance filtering shared by every command
#[derive(Args, Debug)]
pub struct ExtractionArgs {
    /// Amplicon file, FASTA, gzip-compressed when it ends in .gz
    #[arg(short = 'i', long, value_name = "FILE", value_parser = existing_file)]
    pub amplicon_file: PathBuf,

    /// Minimum read length [default: 400]
    #[arg(short = 's', long, value_name = "N")]
    pub minseqlen: Option<usize>,

    /// Minimum number of identical reads for a sequence to be kept [default: 10]
    #[arg(short = 'm', long, value_name = "N")]
    pub mincount: Option<u64>,

    /// TOML configuration file; command-line options take precedence
    #[arg(long, value_name = "FILE", value_parser = existing_file)]
    pub config: Option<PathBuf>,
}

impl ExtractionArgs {
    /// Defaults, overridden by the config file, overridden by the command line
    pub fn resolve_config(&self) -> Result<Config> {
        let mut config = match &self.config {
            Some(path) => agc_core::load_config(path)
                .with_context(|| format!("Failed to load config {}", path.display()))?,
            None => Config::default(),
        };
        if let Some(v) = self.minseqlen {
            config.dereplication.min_seq_len = v;
        }
        if let Some(v) = self.mincount {
            config.dereplication.min_count = v;
        }
        Ok(config)
    }
}

/// Extract and dereplicate the amplicon file, with a spinner on interactive runs
pub fn load_records(
    path: &Path,
    config: &Config,
) -> Result<(Vec<DereplicatedRecord>, DereplicationStats)> {
    let spinner = if std::env::var("AGC_SILENT").is_err() {
        let pb = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
            pb.set_style(style);
        }
        pb.set_message(format!("Dereplicating {}...", path.display()));
        pb.enable_steady_tick(std::time::Duration::from_millis(100));
        Some(pb)
    } else {
        None
    };

    let result = dereplicate_file(
        path,
        config.dereplication.min_seq_len,
        config.dereplication.min_count,
    );

    if let Some(pb) = spinner {
        pb.finish_and_clear();
    }

    let (records, stats) =
        result.with_context(|| format!("Failed to read amplicons from {}", path.display()))?;

    tracing::info!(
        "{} reads >= {} bp, {} distinct, {} with count >= {}",
        stats.reads,
        config.dereplication.min_seq_len,
        stats.distinct,
        stats.retained,
        config.dereplication.min_count
    );
    if stats.ambiguous_reads > 0 {
        tracing::warn!(
            "{} reads contain bases other than A/C/G/T",
            stats.ambiguous_reads
        );
    }

    Ok((records, stats))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_existing_file() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("reads.fasta");
        std::fs::write(&file, ">r\nACGT\n").unwrap();

        assert_eq!(existing_file(file.to_str().unwrap()).unwrap(), file);
        assert!(matches!(
            existing_file(dir.path().to_str().unwrap()),
            Err(AgcError::InputIsDirectory(_))
        ));
        let missing = dir.path().join("missing.fasta.gz");
        let err = existing_file(missing.to_str().unwrap()).unwrap_err();
        assert_eq!(err.to_string(), format!("{} does not exist.", missing.display()));
    }
}
