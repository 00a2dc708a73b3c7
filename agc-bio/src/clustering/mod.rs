//! Abundance-ordered greedy clustering of dereplicated reads into OTUs.

pub mod greedy;
pub mod kmer_index;

pub use greedy::{ClusteringStats, GreedyClusterer, PrefilterSettings};
pub use kmer_index::KmerIndex;

use crate::sequence::types::serialize_bases;
use serde::Serialize;

/// Operational taxonomic unit: the record that founded it plus everything merged into it.
///
/// The representative never changes once the OTU exists; merging only adds to
/// the counts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Otu {
    #[serde(serialize_with = "serialize_bases")]
    pub representative: Vec<u8>,
    pub total_count: u64,
    /// Dereplicated records merged here, founder included
    pub members: usize,
}

impl Otu {
    pub fn new(representative: Vec<u8>, count: u64) -> Self {
        Self {
            representative,
            total_count: count,
            members: 1,
        }
    }

    pub fn absorb(&mut self, count: u64) {
        self.total_count += count;
        self.members += 1;
    }
}
