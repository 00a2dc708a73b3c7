/// Scoring schemes for nucleotide global alignment
use agc_core::{AgcError, AgcResult};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Substitution scores plus affine gap penalties.
///
/// Penalties are positive and subtracted by the aligner: a gap of length `L`
/// costs `gap_open() + (L - 1) * gap_extend()`.
pub trait ScoringMatrix {
    fn score(&self, a: u8, b: u8) -> i32;
    fn gap_open(&self) -> i32;
    fn gap_extend(&self) -> i32;
}

impl<T: ScoringMatrix + ?Sized> ScoringMatrix for Box<T> {
    fn score(&self, a: u8, b: u8) -> i32 {
        (**self).score(a, b)
    }

    fn gap_open(&self) -> i32 {
        (**self).gap_open()
    }

    fn gap_extend(&self) -> i32 {
        (**self).gap_extend()
    }
}

impl<T: ScoringMatrix + ?Sized> ScoringMatrix for &T {
    fn score(&self, a: u8, b: u8) -> i32 {
        (**self).score(a, b)
    }

    fn gap_open(&self) -> i32 {
        (**self).gap_open()
    }

    fn gap_extend(&self) -> i32 {
        (**self).gap_extend()
    }
}

/// Flat match/mismatch scoring. Bases compare byte-for-byte, so case matters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NucleotideMatrix {
    match_score: i32,
    mismatch_score: i32,
    gap_open: i32,
    gap_extend: i32,
}

impl NucleotideMatrix {
    pub fn new() -> Self {
        Self {
            match_score: 1,
            mismatch_score: -1,
            gap_open: 1,
            gap_extend: 1,
        }
    }

    pub fn with_scores(mut self, match_score: i32, mismatch_score: i32) -> Self {
        self.match_score = match_score;
        self.mismatch_score = mismatch_score;
        self
    }

    pub fn with_gap_penalties(mut self, gap_open: i32, gap_extend: i32) -> Self {
        self.gap_open = gap_open;
        self.gap_extend = gap_extend;
        self
    }
}

impl Default for NucleotideMatrix {
    fn default() -> Self {
        Self::new()
    }
}

impl ScoringMatrix for NucleotideMatrix {
    fn score(&self, a: u8, b: u8) -> i32 {
        if a == b {
            self.match_score
        } else {
            self.mismatch_score
        }
    }

    fn gap_open(&self) -> i32 {
        self.gap_open
    }

    fn gap_extend(&self) -> i32 {
        self.gap_extend
    }
}

/// Substitution matrix read from an NCBI BLAST-style text file:
///
/// ```text
/// # comment
///    A  T  G  C  N
/// A  5 -4 -4 -4 -2
/// T -4  5 -4 -4 -2
/// ...
/// ```
///
/// Residues missing from the matrix score as the `*` (or else `N`) column
/// when the file has one, otherwise as the smallest value in the matrix.
#[derive(Debug, Clone)]
pub struct SubstitutionMatrix {
    residues: Vec<u8>,
    index: [Option<usize>; 256],
    scores: Vec<i32>,
    fallback: Option<usize>,
    min_score: i32,
    gap_open: i32,
    gap_extend: i32,
}

impl SubstitutionMatrix {
    pub fn from_file<P: AsRef<Path>>(path: P) -> AgcResult<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| {
            AgcError::Configuration(format!(
                "Cannot open scoring matrix {}: {}",
                path.display(),
                e
            ))
        })?;
        let matrix = Self::from_reader(BufReader::new(file))?;
        tracing::debug!(
            "Loaded scoring matrix over '{}' from {}",
            String::from_utf8_lossy(matrix.residues()),
            path.display()
        );
        Ok(matrix)
    }

    pub fn from_reader<R: BufRead>(reader: R) -> AgcResult<Self> {
        let mut residues: Vec<u8> = Vec::new();
        let mut rows: Vec<(u8, Vec<i32>)> = Vec::new();

        for (line_no, line) in reader.lines().enumerate() {
            let line = line?;
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            if residues.is_empty() {
                residues = parse_residue_row(line, line_no + 1)?;
                continue;
            }

            let mut fields = line.split_whitespace();
            let label = fields
                .next()
                .and_then(single_residue)
                .ok_or_else(|| matrix_error(line_no + 1, "row must start with a residue letter"))?;
            let values = fields
                .map(|f| {
                    f.parse::<i32>()
                        .map_err(|_| matrix_error(line_no + 1, &format!("'{}' is not an integer", f)))
                })
                .collect::<AgcResult<Vec<i32>>>()?;
            if values.len() != residues.len() {
                return Err(matrix_error(
                    line_no + 1,
                    &format!("expected {} scores, found {}", residues.len(), values.len()),
                ));
            }
            rows.push((label, values));
        }

        if residues.is_empty() {
            return Err(AgcError::Configuration(
                "Scoring matrix has no header row".to_string(),
            ));
        }

        Self::from_rows(residues, rows)
    }

    fn from_rows(residues: Vec<u8>, rows: Vec<(u8, Vec<i32>)>) -> AgcResult<Self> {
        let n = residues.len();
        let mut index = [None; 256];
        for (i, &r) in residues.iter().enumerate() {
            if index[r as usize].is_some() {
                return Err(AgcError::Configuration(format!(
                    "Scoring matrix lists residue '{}' twice",
                    r as char
                )));
            }
            index[r as usize] = Some(i);
        }

        let mut scores = vec![0i32; n * n];
        let mut seen = vec![false; n];
        for (label, values) in rows {
            let row = index[label as usize].ok_or_else(|| {
                AgcError::Configuration(format!(
                    "Scoring matrix row '{}' is not in the header",
                    label as char
                ))
            })?;
            seen[row] = true;
            scores[row * n..(row + 1) * n].copy_from_slice(&values);
        }
        if let Some(missing) = seen.iter().position(|s| !s) {
            return Err(AgcError::Configuration(format!(
                "Scoring matrix has no row for '{}'",
                residues[missing] as char
            )));
        }

        let fallback = index[b'*' as usize].or(index[b'N' as usize]);
        let min_score = scores.iter().copied().min().unwrap_or(0);

        Ok(Self {
            residues,
            index,
            scores,
            fallback,
            min_score,
            gap_open: 1,
            gap_extend: 1,
        })
    }

    pub fn with_gap_penalties(mut self, gap_open: i32, gap_extend: i32) -> Self {
        self.gap_open = gap_open;
        self.gap_extend = gap_extend;
        self
    }

    pub fn residues(&self) -> &[u8] {
        &self.residues
    }

    fn lookup(&self, residue: u8) -> Option<usize> {
        self.index[residue as usize]
            .or(self.index[residue.to_ascii_uppercase() as usize])
            .or(self.fallback)
    }
}

impl ScoringMatrix for SubstitutionMatrix {
    fn score(&self, a: u8, b: u8) -> i32 {
        match (self.lookup(a), self.lookup(b)) {
            (Some(i), Some(j)) => self.scores[i * self.residues.len() + j],
            _ => self.min_score,
        }
    }

    fn gap_open(&self) -> i32 {
        self.gap_open
    }

    fn gap_extend(&self) -> i32 {
        self.gap_extend
    }
}

fn single_residue(field: &str) -> Option<u8> {
    match field.as_bytes() {
        [b] if b.is_ascii_graphic() => Some(*b),
        _ => None,
    }
}

fn parse_residue_row(line: &str, line_no: usize) -> AgcResult<Vec<u8>> {
    line.split_whitespace()
        .map(|f| {
            single_residue(f)
                .ok_or_else(|| matrix_error(line_no, &format!("'{}' is not a residue letter", f)))
        })
        .collect()
}

fn matrix_error(line_no: usize, msg: &str) -> AgcError {
    AgcError::Configuration(format!("Scoring matrix line {}: {}", line_no, msg))
}
