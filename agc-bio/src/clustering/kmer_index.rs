/// K-mer index over OTU representatives, used to prune alignment candidates
use std::collections::{BTreeSet, HashMap, HashSet};

#[derive(Debug, Clone)]
pub struct KmerIndex {
    kmer_size: usize,
    postings: HashMap<Vec<u8>, Vec<usize>>,
    indexed: usize,
}

impl KmerIndex {
    pub fn new(kmer_size: usize) -> Self {
        Self {
            kmer_size: kmer_size.max(1),
            postings: HashMap::new(),
            indexed: 0,
        }
    }

    pub fn kmer_size(&self) -> usize {
        self.kmer_size
    }

    /// Number of representatives indexed
    pub fn len(&self) -> usize {
        self.indexed
    }

    pub fn is_empty(&self) -> bool {
        self.indexed == 0
    }

    /// Index each distinct k-mer of `representative` under `otu_id`.
    ///
    /// Ids must be inserted in increasing order; posting lists stay sorted.
    pub fn insert(&mut self, otu_id: usize, representative: &[u8]) {
        let distinct: HashSet<&[u8]> = representative.windows(self.kmer_size).collect();
        for kmer in distinct {
            self.postings.entry(kmer.to_vec()).or_default().push(otu_id);
        }
        self.indexed += 1;
    }

    /// OTU ids worth aligning `sequence` against, ascending.
    ///
    /// The sequence is cut into consecutive `chunk_size` chunks (0 keeps it whole).
    /// Each chunk nominates the `max_mates` OTUs sharing the most k-mers with it,
    /// lower ids first on ties.
    pub fn candidates(&self, sequence: &[u8], chunk_size: usize, max_mates: usize) -> Vec<usize> {
        let chunk_len = if chunk_size == 0 {
            sequence.len().max(1)
        } else {
            chunk_size
        };

        let mut selected = BTreeSet::new();
        for chunk in sequence.chunks(chunk_len) {
            let mut shared: HashMap<usize, usize> = HashMap::new();
            for kmer in chunk.windows(self.kmer_size) {
                if let Some(ids) = self.postings.get(kmer) {
                    for &id in ids {
                        *shared.entry(id).or_insert(0) += 1;
                    }
                }
            }

            let mut ranked: Vec<(usize, usize)> = shared.into_iter().collect();
            ranked.sort_unstable_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
            selected.extend(ranked.into_iter().take(max_mates).map(|(id, _)| id));
        }

        selected.into_iter().collect()
    }
}
