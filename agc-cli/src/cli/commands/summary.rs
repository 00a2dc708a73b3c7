//! JSON run summary written by `agc cluster --summary`.

use agc_bio::clustering::{ClusteringStats, Otu};
use agc_bio::dereplication::DereplicationStats;
use agc_core::{AgcError, Config};
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

#[derive(Debug, Serialize)]
pub struct RunSummary {
    pub version: &'static str,
    pub input: String,
    pub output: String,
    pub config: Config,
    pub dereplication: DereplicationStats,
    pub clustering: ClusteringStats,
    pub otus: Vec<OtuSummary>,
    pub elapsed_seconds: f64,
}

#[derive(Debug, Serialize)]
pub struct OtuSummary {
    pub id: String,
    pub occurrence: u64,
    pub members: usize,
    pub length: usize,
}

impl OtuSummary {
    pub fn from_otus(otus: &[Otu]) -> Vec<Self> {
        otus.iter()
            .enumerate()
            .map(|(i, otu)| Self {
                id: format!("OTU_{}", i + 1),
                occurrence: otu.total_count,
                members: otu.members,
                length: otu.representative.len(),
            })
            .collect()
    }
}

impl RunSummary {
    pub fn save(&self, path: &Path) -> Result<(), AgcError> {
        let mut writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(&mut writer, self)?;
        writer.write_all(b"\n")?;
        writer.flush()?;
        Ok(())
    }
}
