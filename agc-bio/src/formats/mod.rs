pub mod fasta;

// Re-export commonly used functions
pub use fasta::{parse_fasta_from_bytes, read_amplicons, write_fasta, write_otus};
pub use fasta::{FastaFile, FastaReadable, FastaReader, DEFAULT_LINE_WIDTH};
