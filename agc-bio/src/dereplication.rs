//! Full-length dereplication: collapse identical reads into abundance records.
//!
//! Distinct sequences are counted in first-seen order, filtered by a minimum
//! abundance and sorted by count (descending). The sort is stable, so equally
//! abundant sequences keep their encounter order and downstream greedy
//! clustering stays deterministic.

use crate::formats::fasta::read_amplicons;
use crate::sequence::types::serialize_bases;
use crate::sequence::Sequence;
use agc_core::AgcResult;
use indexmap::IndexMap;
use serde::Serialize;
use std::cmp::Reverse;
use std::path::Path;

/// A distinct sequence and the number of reads identical to it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DereplicatedRecord {
    #[serde(serialize_with = "serialize_bases")]
    pub sequence: Vec<u8>,
    pub count: u64,
}

impl DereplicatedRecord {
    pub fn new(sequence: Vec<u8>, count: u64) -> Self {
        Self { sequence, count }
    }

    /// FASTA form used by `agc dereplicate`: `>seq_<n> count:<count>`
    pub fn to_fasta(&self, index: usize) -> Sequence {
        Sequence::new(format!("seq_{}", index + 1), self.sequence.clone())
            .with_description(format!("count:{}", self.count))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DereplicationStats {
    /// Reads that passed the length filter
    pub reads: u64,
    /// Reads containing bases other than A/C/G/T
    pub ambiguous_reads: u64,
    /// Distinct sequences among those reads
    pub distinct: usize,
    /// Distinct sequences that reached the minimum count
    pub retained: usize,
    /// Reads represented by the retained records
    pub retained_reads: u64,
}

/// Incremental exact-duplicate counter
#[derive(Debug, Default)]
pub struct Dereplicator {
    counts: IndexMap<Vec<u8>, u64>,
    reads: u64,
}

impl Dereplicator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one read. Empty reads are ignored so no empty record can reach the aligner.
    pub fn add(&mut self, sequence: Vec<u8>) {
        if sequence.is_empty() {
            tracing::debug!("Ignoring empty read during dereplication");
            return;
        }
        self.reads += 1;
        *self.counts.entry(sequence).or_insert(0) += 1;
    }

    pub fn reads(&self) -> u64 {
        self.reads
    }

    pub fn distinct(&self) -> usize {
        self.counts.len()
    }

    /// Drop sequences seen fewer than `min_count` times and sort the rest by abundance.
    pub fn finish(self, min_count: u64) -> (Vec<DereplicatedRecord>, DereplicationStats) {
        let distinct = self.counts.len();
        let reads = self.reads;

        let mut records: Vec<DereplicatedRecord> = self
            .counts
            .into_iter()
            .filter(|(_, count)| *count >= min_count)
            .map(|(sequence, count)| DereplicatedRecord::new(sequence, count))
            .collect();
        records.sort_by_key(|r| Reverse(r.count));

        let stats = DereplicationStats {
            reads,
            ambiguous_reads: 0,
            distinct,
            retained: records.len(),
            retained_reads: records.iter().map(|r| r.count).sum(),
        };
        (records, stats)
    }
}

/// Collapse identical sequences into abundance-sorted records with at least `min_count` reads.
///
/// ```
/// use agc_bio::dereplication::dereplicate;
///
/// let reads = vec![b"ACGT".to_vec(), b"TTTT".to_vec(), b"TTTT".to_vec(), b"ACGT".to_vec(), b"GG".to_vec()];
/// let records = dereplicate(reads, 2);
/// assert_eq!(records.len(), 2);
/// assert_eq!(records[0].sequence, b"ACGT");
/// assert_eq!(records[0].count, 2);
/// ```
pub fn dereplicate<I>(sequences: I, min_count: u64) -> Vec<DereplicatedRecord>
where
    I: IntoIterator<Item = Vec<u8>>,
{
    let mut dereplicator = Dereplicator::new();
    for sequence in sequences {
        dereplicator.add(sequence);
    }
    dereplicator.finish(min_count).0
}

/// Extract reads of at least `min_seq_len` bases from a FASTA(.gz) file and dereplicate them.
pub fn dereplicate_file<P: AsRef<Path>>(
    path: P,
    min_seq_len: usize,
    min_count: u64,
) -> AgcResult<(Vec<DereplicatedRecord>, DereplicationStats)> {
    let path = path.as_ref();
    let mut dereplicator = Dereplicator::new();
    let mut ambiguous_reads = 0u64;

    for record in read_amplicons(path, min_seq_len)? {
        let record = record?;
        if record.ambiguous_bases() > 0 {
            ambiguous_reads += 1;
        }
        dereplicator.add(record.sequence);
    }

    tracing::debug!(
        "Extracted {} reads ({} distinct) of length >= {} from {}",
        dereplicator.reads(),
        dereplicator.distinct(),
        min_seq_len,
        path.display()
    );

    let (records, mut stats) = dereplicator.finish(min_count);
    stats.ambiguous_reads = ambiguous_reads;
    Ok((records, stats))
}
