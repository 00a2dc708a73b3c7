//! Greedy abundance-ordered clustering.
//!
//! Records are visited in the order given (most abundant first after
//! dereplication). Each one is aligned against the representative of every
//! OTU created so far; it joins the best match when the identity reaches the
//! threshold and founds a new OTU otherwise. The earliest OTU wins ties.
//!
//! Alignments for one record run in parallel on the rayon pool. The OTU list
//! itself is only touched by the calling thread, between records.

use crate::alignment::{NeedlemanWunsch, NucleotideMatrix, ScoringMatrix};
use crate::clustering::{KmerIndex, Otu};
use crate::dereplication::DereplicatedRecord;
use agc_core::{AgcError, AgcResult};
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};

/// Identity threshold used when nothing else is configured
pub const DEFAULT_THRESHOLD: f64 = 97.0;

/// Optional k-mer candidate pruning
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrefilterSettings {
    pub kmer_size: usize,
    pub chunk_size: usize,
    pub max_mates: usize,
}

impl Default for PrefilterSettings {
    fn default() -> Self {
        Self {
            kmer_size: 8,
            chunk_size: 100,
            max_mates: 8,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ClusteringStats {
    pub records: usize,
    pub otus: usize,
    pub alignments: u64,
}

pub struct GreedyClusterer<S: ScoringMatrix + Sync> {
    threshold: f64,
    aligner: NeedlemanWunsch<S>,
    prefilter: Option<PrefilterSettings>,
    show_progress: bool,
}

impl GreedyClusterer<NucleotideMatrix> {
    pub fn new(threshold: f64) -> Self {
        Self::with_aligner(threshold, NeedlemanWunsch::default())
    }
}

impl Default for GreedyClusterer<NucleotideMatrix> {
    fn default() -> Self {
        Self::new(DEFAULT_THRESHOLD)
    }
}

impl<S: ScoringMatrix + Sync> GreedyClusterer<S> {
    pub fn with_aligner(threshold: f64, aligner: NeedlemanWunsch<S>) -> Self {
        Self {
            threshold,
            aligner,
            prefilter: None,
            show_progress: false,
        }
    }

    pub fn with_prefilter(mut self, settings: PrefilterSettings) -> Self {
        self.prefilter = Some(settings);
        self
    }

    pub fn with_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn cluster(&self, records: &[DereplicatedRecord]) -> AgcResult<Vec<Otu>> {
        self.cluster_with_stats(records).map(|(otus, _)| otus)
    }

    pub fn cluster_with_stats(
        &self,
        records: &[DereplicatedRecord],
    ) -> AgcResult<(Vec<Otu>, ClusteringStats)> {
        if !(0.0..=100.0).contains(&self.threshold) {
            return Err(AgcError::InvalidInput(format!(
                "identity threshold {} is outside [0, 100]",
                self.threshold
            )));
        }

        let mut otus: Vec<Otu> = Vec::new();
        let mut index = self.prefilter.map(|p| KmerIndex::new(p.kmer_size));
        if let Some(index) = &index {
            tracing::debug!("k-mer prefilter enabled (k = {})", index.kmer_size());
        }
        let alignments = AtomicU64::new(0);
        let pb = self.progress_bar(records.len());

        for record in records {
            if record.sequence.is_empty() {
                return Err(AgcError::EmptyAlignmentInput);
            }

            match self.best_match(record, &otus, index.as_ref(), &alignments)? {
                Some(id) => {
                    tracing::trace!("record (count {}) joins OTU_{}", record.count, id + 1);
                    otus[id].absorb(record.count);
                }
                None => {
                    if let Some(index) = index.as_mut() {
                        index.insert(otus.len(), &record.sequence);
                    }
                    otus.push(Otu::new(record.sequence.clone(), record.count));
                    tracing::trace!("record (count {}) founds OTU_{}", record.count, otus.len());
                }
            }

            if let Some(pb) = &pb {
                pb.inc(1);
            }
        }

        if let Some(pb) = pb {
            pb.finish_and_clear();
        }

        let stats = ClusteringStats {
            records: records.len(),
            otus: otus.len(),
            alignments: alignments.into_inner(),
        };
        tracing::info!(
            "Clustered {} records into {} OTUs ({} alignments, threshold {}%)",
            stats.records,
            stats.otus,
            stats.alignments,
            self.threshold
        );
        Ok((otus, stats))
    }

    /// Index of the OTU `record` should join, if any.
    fn best_match(
        &self,
        record: &DereplicatedRecord,
        otus: &[Otu],
        index: Option<&KmerIndex>,
        alignments: &AtomicU64,
    ) -> AgcResult<Option<usize>> {
        // Only an identical representative reaches 100%, so the first one is the answer.
        if self.self_alignment_is_exact(&record.sequence) {
            if let Some(id) = otus
                .iter()
                .position(|otu| otu.representative == record.sequence)
            {
                return Ok(Some(id));
            }
        }

        let score = |id: usize| -> AgcResult<(usize, f64)> {
            let alignment = self.aligner.align(&record.sequence, &otus[id].representative)?;
            alignments.fetch_add(1, Ordering::Relaxed);
            Ok((id, alignment.identity()?))
        };

        let scored: Vec<(usize, f64)> = match (index, self.prefilter) {
            (Some(index), Some(p)) => index
                .candidates(&record.sequence, p.chunk_size, p.max_mates)
                .into_par_iter()
                .map(score)
                .collect::<AgcResult<_>>()?,
            _ => (0..otus.len())
                .into_par_iter()
                .map(score)
                .collect::<AgcResult<_>>()?,
        };

        // `scored` is in ascending OTU order; strict comparison keeps the earliest maximum.
        let mut best: Option<(usize, f64)> = None;
        for (id, identity) in scored {
            if best.map_or(true, |(_, top)| identity > top) {
                best = Some((id, identity));
            }
        }

        Ok(best
            .filter(|&(_, identity)| identity >= self.threshold)
            .map(|(id, _)| id))
    }

    /// Whether aligning `sequence` with itself is guaranteed to give the gap-free
    /// diagonal: every base scores positively against itself and strictly better
    /// than against any other base present, and gaps are never rewarded.
    fn self_alignment_is_exact(&self, sequence: &[u8]) -> bool {
        let scoring = self.aligner.scoring();
        if scoring.gap_open() < 0 || scoring.gap_extend() < 0 {
            return false;
        }

        let mut present = [false; 256];
        for &base in sequence {
            present[base as usize] = true;
        }
        let bases: Vec<u8> = (0..=255u8).filter(|&b| present[b as usize]).collect();

        bases.iter().all(|&a| {
            let diagonal = scoring.score(a, a);
            diagonal > 0
                && bases.iter().all(|&b| {
                    a == b || (scoring.score(a, b) < diagonal && scoring.score(b, a) < diagonal)
                })
        })
    }

    fn progress_bar(&self, total: usize) -> Option<ProgressBar> {
        if !self.show_progress || total <= 1000 || std::env::var("AGC_SILENT").is_ok() {
            return None;
        }

        let pb = ProgressBar::new(total as u64);
        if let Ok(style) = ProgressStyle::default_bar()
            .template("{msg} [{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} records ({per_sec}, ETA: {eta})")
        {
            pb.set_style(style.progress_chars("##-"));
        }
        pb.set_message("Clustering...");
        Some(pb)
    }
}
