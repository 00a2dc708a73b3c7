#![allow(dead_code)]

use anyhow::Result;
use assert_cmd::Command;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use std::fs;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// `agc` with progress output silenced
pub fn agc_cmd() -> Command {
    let mut cmd = Command::cargo_bin("agc").unwrap();
    cmd.env("AGC_SILENT", "1").env_remove("RUST_LOG").env_remove("AGC_LOG");
    cmd
}

/// FASTA text with `copies` reads of each sequence, interleaved
pub fn amplicon_fasta(reads: &[(&str, usize)]) -> String {
    let mut content = String::new();
    let max = reads.iter().map(|(_, n)| *n).max().unwrap_or(0);
    let mut id = 0;
    for round in 0..max {
        for (seq, copies) in reads {
            if round < *copies {
                id += 1;
                content.push_str(&format!(">read_{} sample=S1\n{}\n", id, seq));
            }
        }
    }
    content
}

/// The reference three-sequence data set
pub fn scenario_fasta() -> String {
    amplicon_fasta(&[("AAAACCCC", 50), ("AAAACCCG", 20), ("TTTTGGGG", 15)])
}

pub struct TestEnvironment {
    pub temp_dir: TempDir,
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
}

impl TestEnvironment {
    pub fn new() -> Result<Self> {
        let temp_dir = TempDir::new()?;
        let input_dir = temp_dir.path().join("input");
        let output_dir = temp_dir.path().join("output");

        fs::create_dir_all(&input_dir)?;
        fs::create_dir_all(&output_dir)?;

        Ok(Self {
            temp_dir,
            input_dir,
            output_dir,
        })
    }

    pub fn create_input_file(&self, name: &str, content: &str) -> Result<PathBuf> {
        let path = self.input_dir.join(name);
        fs::write(&path, content)?;
        Ok(path)
    }

    pub fn create_gz_input(&self, name: &str, content: &str) -> Result<PathBuf> {
        self.create_multi_member_gz_input(name, &[content])
    }

    /// One gzip member per part, concatenated into a single file
    pub fn create_multi_member_gz_input(&self, name: &str, parts: &[&str]) -> Result<PathBuf> {
        let path = self.input_dir.join(name);
        let mut bytes = Vec::new();
        for part in parts {
            let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
            encoder.write_all(part.as_bytes())?;
            bytes.extend(encoder.finish()?);
        }
        fs::write(&path, bytes)?;
        Ok(path)
    }

    pub fn output_path(&self, name: &str) -> PathBuf {
        self.output_dir.join(name)
    }
}

/// Read an output file, decompressing `.gz`
pub fn read_output(path: &Path) -> Result<String> {
    if path.extension().and_then(|e| e.to_str()) == Some("gz") {
        read_gz(path)
    } else {
        Ok(fs::read_to_string(path)?)
    }
}

pub fn read_gz(path: &Path) -> Result<String> {
    let mut text = String::new();
    GzDecoder::new(fs::File::open(path)?).read_to_string(&mut text)?;
    Ok(text)
}

/// Header lines of a FASTA file
pub fn headers(path: &Path) -> Result<Vec<String>> {
    Ok(read_output(path)?
        .lines()
        .filter(|l| l.starts_with('>'))
        .map(str::to_string)
        .collect())
}
