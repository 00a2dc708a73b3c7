//! Configuration types for agc

use crate::AgcError;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub dereplication: DereplicationConfig,
    #[serde(default)]
    pub alignment: AlignmentConfig,
    #[serde(default)]
    pub clustering: ClusteringConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DereplicationConfig {
    /// Reads shorter than this are dropped during extraction
    #[serde(default = "default_min_seq_len")]
    pub min_seq_len: usize,
    /// Distinct sequences seen fewer times than this are dropped
    #[serde(default = "default_min_count")]
    pub min_count: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlignmentConfig {
    #[serde(default = "default_match_score")]
    pub match_score: i32,
    #[serde(default = "default_mismatch_score")]
    pub mismatch_score: i32,
    /// Penalty for the first column of a gap (subtracted from the score)
    #[serde(default = "default_gap_open")]
    pub gap_open: i32,
    /// Penalty for every further column of the same gap
    #[serde(default = "default_gap_extend")]
    pub gap_extend: i32,
    /// Optional NCBI-style substitution matrix file; overrides match/mismatch scores
    #[serde(default)]
    pub matrix: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClusteringConfig {
    /// Percent identity (0-100) required to merge into an existing OTU
    #[serde(default = "default_identity_threshold")]
    pub identity_threshold: f64,
    #[serde(default)]
    pub kmer_prefilter: bool,
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
    #[serde(default = "default_kmer_size")]
    pub kmer_size: usize,
    /// OTUs kept per chunk by the k-mer prefilter
    #[serde(default = "default_max_mates")]
    pub max_mates: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_line_width")]
    pub line_width: usize,
    #[serde(default)]
    pub compress_output: bool,
}

// Default value functions
fn default_min_seq_len() -> usize { 400 }
fn default_min_count() -> u64 { 10 }
fn default_match_score() -> i32 { 1 }
fn default_mismatch_score() -> i32 { -1 }
fn default_gap_open() -> i32 { 1 }
fn default_gap_extend() -> i32 { 1 }
fn default_identity_threshold() -> f64 { 97.0 }
fn default_chunk_size() -> usize { 100 }
fn default_kmer_size() -> usize { 8 }
fn default_max_mates() -> usize { 8 }
fn default_line_width() -> usize { 80 }

impl Default for DereplicationConfig {
    fn default() -> Self {
        Self {
            min_seq_len: default_min_seq_len(),
            min_count: default_min_count(),
        }
    }
}

impl Default for AlignmentConfig {
    fn default() -> Self {
        Self {
            match_score: default_match_score(),
            mismatch_score: default_mismatch_score(),
            gap_open: default_gap_open(),
            gap_extend: default_gap_extend(),
            matrix: None,
        }
    }
}

impl Default for ClusteringConfig {
    fn default() -> Self {
        Self {
            identity_threshold: default_identity_threshold(),
            kmer_prefilter: false,
            chunk_size: default_chunk_size(),
            kmer_size: default_kmer_size(),
            max_mates: default_max_mates(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            line_width: default_line_width(),
            compress_output: false,
        }
    }
}

impl Config {
    /// Reject values the pipeline cannot run with.
    pub fn validate(&self) -> Result<(), AgcError> {
        let threshold = self.clustering.identity_threshold;
        if !(0.0..=100.0).contains(&threshold) {
            return Err(AgcError::Configuration(format!(
                "identity_threshold must be within 0-100, got {}",
                threshold
            )));
        }
        if self.alignment.gap_open < 0 || self.alignment.gap_extend < 0 {
            return Err(AgcError::Configuration(
                "gap_open and gap_extend are penalties and must not be negative".to_string(),
            ));
        }
        if self.clustering.kmer_size == 0 {
            return Err(AgcError::Configuration("kmer_size must be at least 1".to_string()));
        }
        if self.clustering.max_mates == 0 {
            return Err(AgcError::Configuration("max_mates must be at least 1".to_string()));
        }
        if self.output.line_width == 0 {
            return Err(AgcError::Configuration("line_width must be at least 1".to_string()));
        }
        Ok(())
    }
}

pub fn default_config() -> Config {
    Config::default()
}

pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, AgcError> {
    let path = path.as_ref();
    let contents = std::fs::read_to_string(path)?;
    let config: Config = toml::from_str(&contents)
        .map_err(|e| AgcError::Configuration(format!("Failed to parse config: {}", e)))?;
    config.validate()?;
    tracing::debug!("Loaded configuration from {}", path.display());
    Ok(config)
}

pub fn save_config<P: AsRef<Path>>(path: P, config: &Config) -> Result<(), AgcError> {
    let contents = toml::to_string_pretty(config)
        .map_err(|e| AgcError::Configuration(format!("Failed to serialize config: {}", e)))?;
    std::fs::write(path, contents)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert_eq!(config.dereplication.min_seq_len, 400);
        assert_eq!(config.dereplication.min_count, 10);

        assert_eq!(config.alignment.match_score, 1);
        assert_eq!(config.alignment.mismatch_score, -1);
        assert_eq!(config.alignment.gap_open, 1);
        assert_eq!(config.alignment.gap_extend, 1);
        assert_eq!(config.alignment.matrix, None);

        assert_eq!(config.clustering.identity_threshold, 97.0);
        assert!(!config.clustering.kmer_prefilter);
        assert_eq!(config.clustering.chunk_size, 100);
        assert_eq!(config.clustering.kmer_size, 8);
        assert_eq!(config.clustering.max_mates, 8);

        assert_eq!(config.output.line_width, 80);
        assert!(!config.output.compress_output);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_valid_config() {
        let toml_content = r#"
[dereplication]
min_seq_len = 200
min_count = 3

[alignment]
match_score = 2
mismatch_score = -3
gap_open = 5
gap_extend = 2
matrix = "MATCH"

[clustering]
identity_threshold = 99.0
kmer_prefilter = true
chunk_size = 50
kmer_size = 6
max_mates = 4

[output]
line_width = 60
compress_output = true
"#;

        let mut temp_file = NamedTempFile::new().unwrap();
        write!(temp_file, "{}", toml_content).unwrap();

        let config = load_config(temp_file.path()).unwrap();

        assert_eq!(config.dereplication.min_seq_len, 200);
        assert_eq!(config.dereplication.min_count, 3);
        assert_eq!(config.alignment.match_score, 2);
        assert_eq!(config.alignment.mismatch_score, -3);
        assert_eq!(config.alignment.gap_open, 5);
        assert_eq!(config.alignment.gap_extend, 2);
        assert_eq!(config.alignment.matrix, Some("MATCH".to_string()));
        assert_eq!(config.clustering.identity_threshold, 99.0);
        assert!(config.clustering.kmer_prefilter);
        assert_eq!(config.clustering.chunk_size, 50);
        assert_eq!(config.clustering.kmer_size, 6);
        assert_eq!(config.clustering.max_mates, 4);
        assert_eq!(config.output.line_width, 60);
        assert!(config.output.compress_output);
    }

    #[test]
    fn test_load_partial_config() {
        let toml_content = r#"
[clustering]
identity_threshold = 95.5
"#;

        let mut temp_file = NamedTempFile::new().unwrap();
        write!(temp_file, "{}", toml_content).unwrap();

        let config = load_config(temp_file.path()).unwrap();

        assert_eq!(config.clustering.identity_threshold, 95.5);
        assert_eq!(config.clustering.kmer_size, 8);
        assert_eq!(config.dereplication.min_seq_len, 400);
        assert_eq!(config.output.line_width, 80);
    }

    #[test]
    fn test_load_invalid_config() {
        let mut temp_file = NamedTempFile::new().unwrap();
        write!(temp_file, "this is not valid TOML {{").unwrap();

        match load_config(temp_file.path()).unwrap_err() {
            AgcError::Configuration(msg) => assert!(msg.contains("Failed to parse config")),
            _ => panic!("Expected Configuration error"),
        }
    }

    #[test]
    fn test_load_out_of_range_threshold() {
        let mut temp_file = NamedTempFile::new().unwrap();
        write!(temp_file, "[clustering]\nidentity_threshold = 120.0\n").unwrap();

        match load_config(temp_file.path()).unwrap_err() {
            AgcError::Configuration(msg) => assert!(msg.contains("identity_threshold")),
            _ => panic!("Expected Configuration error"),
        }
    }

    #[test]
    fn test_load_nonexistent_file() {
        match load_config("/nonexistent/path/to/config.toml").unwrap_err() {
            AgcError::Io(_) => {}
            _ => panic!("Expected Io error"),
        }
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = Config::default();
        config.alignment.gap_open = -1;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.clustering.kmer_size = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.output.line_width = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.clustering.max_mates = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_round_trip() {
        let mut config = Config::default();
        config.clustering.identity_threshold = 98.5;
        config.alignment.matrix = Some("/tmp/MATCH".to_string());
        config.output.compress_output = true;

        let temp_file = NamedTempFile::new().unwrap();
        save_config(temp_file.path(), &config).unwrap();
        let loaded = load_config(temp_file.path()).unwrap();

        assert_eq!(loaded.clustering.identity_threshold, 98.5);
        assert_eq!(loaded.alignment.matrix, Some("/tmp/MATCH".to_string()));
        assert!(loaded.output.compress_output);
    }
}
