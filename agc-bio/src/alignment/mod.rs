pub mod identity;
pub mod nw_aligner;
pub mod scoring;

pub use identity::identity;
pub use nw_aligner::{align_global, Alignment, NeedlemanWunsch};
pub use scoring::{NucleotideMatrix, ScoringMatrix, SubstitutionMatrix};

/// Gap symbol in aligned strings
pub const GAP: u8 = b'-';
