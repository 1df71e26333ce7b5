// key.rs
// Substitution keys: permutations of a..z, random generation, transposition proposals.

use std::fmt;
use std::str::FromStr;

use rand::seq::SliceRandom;
use rand::Rng;

use crate::alphabet::{self, LETTERS, SPACE};
use crate::error::Error;

/// A substitution key. `forward[p]` is the ciphertext letter that replaces plaintext
/// letter `p`; `inverse` is kept in sync so decryption is a table lookup.
///
/// Always a bijection on the 26 letters. Proposals return new keys; a key is never
/// modified after construction.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Key {
    forward: [u8; LETTERS],
    inverse: [u8; LETTERS],
}

impl Key {
    /// The key that maps every letter to itself.
    pub fn identity() -> Self {
        let mut forward = [0u8; LETTERS];
        for (i, slot) in forward.iter_mut().enumerate() {
            *slot = i as u8;
        }
        Self::from_forward(forward)
    }

    /// A uniformly random permutation of the alphabet.
    pub fn random<R: Rng>(rng: &mut R) -> Self {
        let mut forward = Self::identity().forward;
        forward.shuffle(rng);
        Self::from_forward(forward)
    }

    /// Swap the images of two distinct, uniformly chosen letters.
    ///
    /// The second draw repeats until it differs from the first, so the result is always
    /// exactly one transposition away from `self`. The proposal is symmetric.
    pub fn propose<R: Rng>(&self, rng: &mut R) -> Self {
        let first = rng.gen_range(0..LETTERS);
        let mut second = rng.gen_range(0..LETTERS);
        while second == first {
            second = rng.gen_range(0..LETTERS);
        }
        self.transposed(first, second)
    }

    /// A new key with the images of plaintext letters `a` and `b` (both `< 26`) exchanged.
    fn transposed(&self, a: usize, b: usize) -> Self {
        let mut forward = self.forward;
        forward.swap(a, b);
        Self::from_forward(forward)
    }

    /// Decrypt: every ASCII letter (either case) goes through the inverse mapping,
    /// anything else becomes a space.
    pub fn decrypt(&self, ciphertext: &str) -> String {
        ciphertext
            .chars()
            .map(|c| alphabet::symbol(self.decrypt_symbol(alphabet::index_of(c))))
            .collect()
    }

    /// Encrypt with the forward mapping; non-letters become spaces.
    pub fn encrypt(&self, plaintext: &str) -> String {
        plaintext
            .chars()
            .map(|c| {
                let s = alphabet::index_of(c);
                if s == SPACE {
                    ' '
                } else {
                    alphabet::symbol(self.forward[s as usize])
                }
            })
            .collect()
    }

    /// Decrypt normalized symbols (all `< 27`) into `out`, reusing its allocation.
    pub(crate) fn decrypt_symbols_into(&self, ciphertext: &[u8], out: &mut Vec<u8>) {
        out.clear();
        out.extend(ciphertext.iter().map(|&s| self.decrypt_symbol(s)));
    }

    #[inline]
    fn decrypt_symbol(&self, s: u8) -> u8 {
        if s == SPACE {
            SPACE
        } else {
            self.inverse[s as usize]
        }
    }

    /// The key that undoes this one.
    pub fn inverse(&self) -> Self {
        Self {
            forward: self.inverse,
            inverse: self.forward,
        }
    }

    /// Ciphertext letter for a plaintext letter; `None` for non-letters.
    pub fn image(&self, plain: char) -> Option<char> {
        match alphabet::index_of(plain) {
            SPACE => None,
            s => Some(alphabet::symbol(self.forward[s as usize])),
        }
    }

    /// Plaintext letters whose images differ between two keys.
    pub fn differing_letters(&self, other: &Key) -> Vec<char> {
        (0..LETTERS)
            .filter(|&i| self.forward[i] != other.forward[i])
            .map(|i| alphabet::symbol(i as u8))
            .collect()
    }

    fn from_forward(forward: [u8; LETTERS]) -> Self {
        let mut inverse = [0u8; LETTERS];
        for (plain, &cipher) in forward.iter().enumerate() {
            inverse[cipher as usize] = plain as u8;
        }
        Self { forward, inverse }
    }
}

impl FromStr for Key {
    type Err = Error;

    /// Parse a 26-letter string where the i-th letter replaces the i-th letter of the alphabet.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let letters: Vec<char> = s.trim().chars().collect();
        if letters.len() != LETTERS {
            return Err(Error::InvalidKey(format!(
                "expected {LETTERS} letters, got {}",
                letters.len()
            )));
        }
        let mut forward = [0u8; LETTERS];
        let mut seen = [false; LETTERS];
        for (slot, &c) in forward.iter_mut().zip(&letters) {
            if !c.is_ascii_alphabetic() {
                return Err(Error::InvalidKey(format!("{c:?} is not a letter")));
            }
            let idx = alphabet::index_of(c);
            if seen[idx as usize] {
                return Err(Error::InvalidKey(format!("letter {c:?} appears twice")));
            }
            seen[idx as usize] = true;
            *slot = idx;
        }
        Ok(Self::from_forward(forward))
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for &c in &self.forward {
            write!(f, "{}", alphabet::symbol(c))?;
        }
        Ok(())
    }
}

impl fmt::Debug for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Key({self})")
    }
}
