// alphabet.rs
// The 27-symbol alphabet: a..z followed by space, addressed by dense index.

/// Number of letters a key permutes.
pub const LETTERS: usize = 26;

/// Letters plus the space symbol.
pub const SIZE: usize = LETTERS + 1;

/// Index of the space symbol.
pub const SPACE: u8 = LETTERS as u8;

/// Map a character to its symbol index. ASCII letters of either case map to `0..26`,
/// everything else collapses to [`SPACE`].
#[inline]
pub fn index_of(c: char) -> u8 {
    if c.is_ascii_alphabetic() {
        c.to_ascii_lowercase() as u8 - b'a'
    } else {
        SPACE
    }
}

/// Inverse of [`index_of`] for indices in `0..SIZE`.
#[inline]
pub(crate) fn symbol(index: u8) -> char {
    debug_assert!((index as usize) < SIZE);
    if index == SPACE {
        ' '
    } else {
        (b'a' + index) as char
    }
}

/// All symbols in table order.
pub fn symbols() -> impl Iterator<Item = char> {
    (0..SIZE as u8).map(symbol)
}
