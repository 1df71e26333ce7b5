// error.rs
// Library error type: I/O, corpus, key parsing, configuration and image failures.

use std::path::PathBuf;

use thiserror::Error;

/// Errors surfaced by the library. Numeric edge cases are handled locally and never show up here.
#[derive(Debug, Error)]
pub enum Error {
    /// A corpus or ciphertext file could not be read.
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The reference document has fewer than two symbols, so it holds no bigrams.
    #[error("reference document too short after normalization: {len} symbols (need at least 2)")]
    CorpusTooShort { len: usize },

    /// A key string that is not a permutation of a..z.
    #[error("invalid key: {0}")]
    InvalidKey(String),

    /// A sampler setting outside its valid range, such as a zero accepted-move budget.
    #[error("invalid sampler configuration: {0}")]
    InvalidConfig(String),

    /// The heatmap image could not be encoded or written.
    #[error("failed to write heatmap: {0}")]
    Image(#[from] image::ImageError),
}

pub type Result<T> = std::result::Result<T, Error>;
