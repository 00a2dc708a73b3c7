//! Amplicon read processing for agc: FASTA I/O, dereplication, global
//! alignment and greedy OTU clustering.

pub mod alignment;
pub mod clustering;
pub mod dereplication;
pub mod formats;
pub mod sequence;

// Re-export commonly used types
pub use alignment::{Alignment, NeedlemanWunsch, NucleotideMatrix, ScoringMatrix, SubstitutionMatrix};
pub use clustering::{ClusteringStats, GreedyClusterer, Otu, PrefilterSettings};
pub use dereplication::{dereplicate, dereplicate_file, DereplicatedRecord, DereplicationStats};
pub use sequence::Sequence;
