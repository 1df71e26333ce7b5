// model.rs
// Bigram transition model over the 27-symbol alphabet, learned from a reference corpus.

use std::path::Path;

use log::{debug, info};

use crate::alphabet::{self, SIZE};
use crate::error::{Error, Result};
use crate::normalize;

/// Pseudocount every cell starts from (Laplace smoothing).
pub const PSEUDOCOUNT: u64 = 1;

/// Dense bigram count table. Cells never observed keep the pseudocount, so no row
/// can sum to zero and no probability derived from it can be zero.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BigramCounts {
    counts: [[u64; SIZE]; SIZE],
}

impl BigramCounts {
    /// A table with every cell preset to [`PSEUDOCOUNT`].
    pub fn smoothed() -> Self {
        Self {
            counts: [[PSEUDOCOUNT; SIZE]; SIZE],
        }
    }

    /// Count every consecutive pair `(s[i-1], s[i])`. Symbols must be `< SIZE`.
    pub(crate) fn observe(&mut self, symbols: &[u8]) {
        for pair in symbols.windows(2) {
            self.counts[pair[0] as usize][pair[1] as usize] += 1;
        }
    }

    /// Count for a character pair; non-letters count as space.
    pub fn count(&self, from: char, to: char) -> u64 {
        self.counts[alphabet::index_of(from) as usize][alphabet::index_of(to) as usize]
    }

    /// Divide each row by its sum.
    pub fn into_model(self) -> TransitionModel {
        let mut probs = [[0.0f64; SIZE]; SIZE];
        let mut log_probs = [[0.0f64; SIZE]; SIZE];
        for (from, row) in self.counts.iter().enumerate() {
            let total: u64 = row.iter().sum();
            // Every cell is >= PSEUDOCOUNT, so total > 0.
            let total = total as f64;
            for (to, &count) in row.iter().enumerate() {
                let p = count as f64 / total;
                probs[from][to] = p;
                log_probs[from][to] = p.ln();
            }
        }
        TransitionModel { probs, log_probs }
    }
}

/// `P(next symbol | current symbol)` for every pair of alphabet symbols.
///
/// Built once and read-only afterwards; share it by reference between sampler runs.
#[derive(Debug, Clone, PartialEq)]
pub struct TransitionModel {
    probs: [[f64; SIZE]; SIZE],
    /// Natural logs of `probs`, precomputed for the scorer.
    log_probs: [[f64; SIZE]; SIZE],
}

impl TransitionModel {
    /// Build a model from a raw reference document (normalized internally).
    pub fn from_document(document: &str) -> Result<Self> {
        let symbols = normalize::to_symbols(document);
        if symbols.len() < 2 {
            return Err(Error::CorpusTooShort { len: symbols.len() });
        }
        let mut counts = BigramCounts::smoothed();
        counts.observe(&symbols);
        debug!("counted {} bigrams", symbols.len() - 1);
        Ok(counts.into_model())
    }

    /// Read a reference corpus from disk and build a model from it.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let document = normalize::read_document(path)?;
        info!("building transition model from {} ({} chars)", path.display(), document.len());
        Self::from_document(&document)
    }

    /// Probability of `to` following `from`, by character. Non-letters count as space.
    pub fn probability(&self, from: char, to: char) -> f64 {
        self.probs[alphabet::index_of(from) as usize][alphabet::index_of(to) as usize]
    }

    pub fn rows(&self) -> &[[f64; SIZE]; SIZE] {
        &self.probs
    }

    /// Log-probability by symbol index. Both indices must be `< SIZE`; callers get them
    /// from [`alphabet::index_of`] or a [`Key`](crate::Key) decryption, which never leave
    /// that range.
    #[inline]
    pub(crate) fn log_probability(&self, from: u8, to: u8) -> f64 {
        self.log_probs[from as usize][to as usize]
    }

    /// Largest single cell, used to scale visualizations.
    pub fn max_probability(&self) -> f64 {
        self.probs
            .iter()
            .flat_map(|row| row.iter())
            .fold(0.0, |acc: f64, &p| acc.max(p))
    }
}
