// normalize.rs
// Corpus normalizer: lowercase letters, every other character becomes one space.

use std::fs;
use std::path::Path;

use crate::alphabet;
use crate::error::{Error, Result};

/// Clean a document: ASCII letters are lowercased and kept, every other character
/// (digits, punctuation, any whitespace) is replaced by a single space.
///
/// The output has exactly one symbol per input `char`.
pub fn normalize(document: &str) -> String {
    document
        .chars()
        .map(|c| alphabet::symbol(alphabet::index_of(c)))
        .collect()
}

/// Same as [`normalize`] but yields symbol indices, which is what the model and
/// scorer work on.
pub fn to_symbols(document: &str) -> Vec<u8> {
    document.chars().map(alphabet::index_of).collect()
}

/// Read a document from disk. Invalid UTF-8 is replaced rather than rejected, since
/// it normalizes to spaces anyway.
pub fn read_document(path: impl AsRef<Path>) -> Result<String> {
    let path = path.as_ref();
    let bytes = fs::read(path).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Render symbol indices (all `< 27`) back into text.
pub(crate) fn from_symbols(symbols: &[u8]) -> String {
    symbols.iter().map(|&s| alphabet::symbol(s)).collect()
}
