// score.rs
// Log-likelihood of a candidate plaintext under a bigram transition model.

use crate::model::TransitionModel;
use crate::normalize;

/// Sum of `ln P(s[i] | s[i-1])` over every consecutive pair of `text`, normalizing
/// characters on the fly. Empty and single-character texts have no pairs and score 0.
pub fn log_likelihood(text: &str, model: &TransitionModel) -> f64 {
    log_likelihood_symbols(&normalize::to_symbols(text), model)
}

/// [`log_likelihood`] over already-normalized symbol indices.
pub(crate) fn log_likelihood_symbols(symbols: &[u8], model: &TransitionModel) -> f64 {
    if symbols.len() < 2 {
        return 0.0;
    }
    symbols
        .windows(2)
        .map(|pair| model.log_probability(pair[0], pair[1]))
        .sum()
}
