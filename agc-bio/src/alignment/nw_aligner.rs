/// Needleman-Wunsch global alignment with affine gaps (Gotoh)
use crate::alignment::identity::identity;
use crate::alignment::scoring::{NucleotideMatrix, ScoringMatrix};
use crate::alignment::GAP;
use agc_core::{AgcError, AgcResult};

const NEG_INF: i32 = i32::MIN / 2;

// Traceback states. Each cell stores the predecessor state of M in bits 0-1,
// of X in bits 2-3 and of Y in bits 4-5.
const STATE_M: u8 = 0;
const STATE_X: u8 = 1;
const STATE_Y: u8 = 2;

const X_SHIFT: u8 = 2;
const Y_SHIFT: u8 = 4;

/// Two gapped strings of equal length plus the optimal score.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alignment {
    pub first: Vec<u8>,
    pub second: Vec<u8>,
    pub score: i32,
}

impl Alignment {
    pub fn len(&self) -> usize {
        self.first.len()
    }

    pub fn is_empty(&self) -> bool {
        self.first.is_empty()
    }

    /// Percentage of columns holding the same base on both sides.
    pub fn identity(&self) -> AgcResult<f64> {
        identity(&self.first, &self.second)
    }

    /// Midline in the usual `|` match, `X` mismatch, space for gap form.
    pub fn midline(&self) -> Vec<u8> {
        self.first
            .iter()
            .zip(&self.second)
            .map(|(&a, &b)| {
                if a == GAP || b == GAP {
                    b' '
                } else if a == b {
                    b'|'
                } else {
                    b'X'
                }
            })
            .collect()
    }
}

/// Global aligner generic over its scoring scheme.
///
/// Ties are resolved deterministically: a diagonal step beats a gap, extending
/// a gap beats opening one, and a gap in `b` (consuming `a`) beats a gap in `a`.
#[derive(Debug, Clone)]
pub struct NeedlemanWunsch<S: ScoringMatrix> {
    scoring: S,
}

impl Default for NeedlemanWunsch<NucleotideMatrix> {
    fn default() -> Self {
        Self::new(NucleotideMatrix::new())
    }
}

/// Align with the default +1/-1 scores and unit gap penalties.
pub fn align_global(a: &[u8], b: &[u8]) -> AgcResult<Alignment> {
    NeedlemanWunsch::default().align(a, b)
}

impl<S: ScoringMatrix> NeedlemanWunsch<S> {
    pub fn new(scoring: S) -> Self {
        Self { scoring }
    }

    pub fn scoring(&self) -> &S {
        &self.scoring
    }

    pub fn align(&self, a: &[u8], b: &[u8]) -> AgcResult<Alignment> {
        if a.is_empty() || b.is_empty() {
            return Err(AgcError::EmptyAlignmentInput);
        }

        let (traceback, scores) = self.fill(a, b);
        let (first, second) = Self::traceback(&traceback, a, b, scores);

        Ok(Alignment {
            first,
            second,
            score: scores.0,
        })
    }

    /// Fills the flat traceback buffer row by row, keeping only two rows of scores.
    /// Returns the buffer and (best final score, its state).
    fn fill(&self, a: &[u8], b: &[u8]) -> (Vec<u8>, (i32, u8)) {
        let n = a.len();
        let m = b.len();
        let width = m + 1;
        let open = self.scoring.gap_open();
        let extend = self.scoring.gap_extend();

        let mut traceback = vec![0u8; (n + 1) * width];

        let mut prev_m = vec![NEG_INF; width];
        let mut prev_x = vec![NEG_INF; width];
        let mut prev_y = vec![NEG_INF; width];
        let mut cur_m = vec![NEG_INF; width];
        let mut cur_x = vec![NEG_INF; width];
        let mut cur_y = vec![NEG_INF; width];

        prev_m[0] = 0;
        for j in 1..=m {
            prev_y[j] = gap_cost(open, extend, j);
            let from = if j == 1 { STATE_M } else { STATE_Y };
            traceback[j] = from << Y_SHIFT;
        }

        for i in 1..=n {
            let row = i * width;
            cur_m[0] = NEG_INF;
            cur_x[0] = gap_cost(open, extend, i);
            cur_y[0] = NEG_INF;
            let from = if i == 1 { STATE_M } else { STATE_X };
            traceback[row] = from << X_SHIFT;

            let ai = a[i - 1];
            for j in 1..=m {
                let (best_m, from_m) = pick([
                    (prev_m[j - 1], STATE_M),
                    (prev_x[j - 1], STATE_X),
                    (prev_y[j - 1], STATE_Y),
                ]);
                let (best_x, from_x) = pick([
                    (prev_x[j].saturating_sub(extend), STATE_X),
                    (prev_m[j].saturating_sub(open), STATE_M),
                    (prev_y[j].saturating_sub(open), STATE_Y),
                ]);
                let (best_y, from_y) = pick([
                    (cur_y[j - 1].saturating_sub(extend), STATE_Y),
                    (cur_m[j - 1].saturating_sub(open), STATE_M),
                    (cur_x[j - 1].saturating_sub(open), STATE_X),
                ]);

                cur_m[j] = best_m.saturating_add(self.scoring.score(ai, b[j - 1]));
                cur_x[j] = best_x;
                cur_y[j] = best_y;
                traceback[row + j] = from_m | (from_x << X_SHIFT) | (from_y << Y_SHIFT);
            }

            std::mem::swap(&mut prev_m, &mut cur_m);
            std::mem::swap(&mut prev_x, &mut cur_x);
            std::mem::swap(&mut prev_y, &mut cur_y);
        }

        let end = pick([
            (prev_m[m], STATE_M),
            (prev_x[m], STATE_X),
            (prev_y[m], STATE_Y),
        ]);
        (traceback, end)
    }

    fn traceback(traceback: &[u8], a: &[u8], b: &[u8], end: (i32, u8)) -> (Vec<u8>, Vec<u8>) {
        let width = b.len() + 1;
        let capacity = a.len() + b.len();
        let mut first = Vec::with_capacity(capacity);
        let mut second = Vec::with_capacity(capacity);

        let (mut i, mut j) = (a.len(), b.len());
        let mut state = end.1;

        while i > 0 || j > 0 {
            let cell = traceback[i * width + j];
            match state {
                STATE_M => {
                    first.push(a[i - 1]);
                    second.push(b[j - 1]);
                    state = cell & 0b11;
                    i -= 1;
                    j -= 1;
                }
                STATE_X => {
                    first.push(a[i - 1]);
                    second.push(GAP);
                    state = (cell >> X_SHIFT) & 0b11;
                    i -= 1;
                }
                _ => {
                    first.push(GAP);
                    second.push(b[j - 1]);
                    state = (cell >> Y_SHIFT) & 0b11;
                    j -= 1;
                }
            }
        }

        first.reverse();
        second.reverse();
        (first, second)
    }
}

fn gap_cost(open: i32, extend: i32, len: usize) -> i32 {
    let extra = extend.saturating_mul((len - 1).min(i32::MAX as usize) as i32);
    0i32.saturating_sub(open).saturating_sub(extra)
}

/// First option wins ties.
#[inline]
fn pick(options: [(i32, u8); 3]) -> (i32, u8) {
    let mut best = options[0];
    for &option in &options[1..] {
        if option.0 > best.0 {
            best = option;
        }
    }
    best
}
