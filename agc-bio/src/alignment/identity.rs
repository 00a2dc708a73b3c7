//! Percent identity of a pairwise alignment.

use crate::alignment::GAP;
use agc_core::{AgcError, AgcResult};

/// `100 * identical non-gap columns / alignment length`.
///
/// Both strings must be the gapped rows of one alignment: equal length and
/// not empty.
///
/// ```
/// use agc_bio::alignment::identity;
///
/// assert_eq!(identity(b"ACGT", b"ACGA").unwrap(), 75.0);
/// assert_eq!(identity(b"AC-T", b"ACGT").unwrap(), 75.0);
/// ```
pub fn identity(first: &[u8], second: &[u8]) -> AgcResult<f64> {
    if first.len() != second.len() {
        return Err(AgcError::DegenerateAlignment(format!(
            "aligned strings differ in length ({} vs {})",
            first.len(),
            second.len()
        )));
    }
    if first.is_empty() {
        return Err(AgcError::DegenerateAlignment(
            "zero-length alignment".to_string(),
        ));
    }

    let identical = first
        .iter()
        .zip(second)
        .filter(|(&x, &y)| x == y && x != GAP)
        .count();

    Ok(100.0 * identical as f64 / first.len() as f64)
}
