//! Break monoalphabetic substitution ciphers without the key.
//!
//! A bigram [`TransitionModel`] is learned from a reference corpus with add-one
//! smoothing, then a Metropolis-Hastings [`Sampler`] walks the space of keys by
//! single transpositions, scoring each decryption by its log-likelihood under the
//! model and keeping the best candidate it has seen.
//!
//! ```no_run
//! use rand::SeedableRng;
//! use rand_chacha::ChaCha20Rng;
//! use subst_mcmc::{Sampler, SamplerConfig, TransitionModel};
//!
//! let model = TransitionModel::from_path("war_and_peace.txt")?;
//! let sampler = Sampler::new(&model, SamplerConfig::default().with_max_accepted(2000))?;
//! let outcome = sampler.run("Uif rvjdl cspxo gpy", &mut ChaCha20Rng::seed_from_u64(7));
//! println!("{} ({:.2})", outcome.best.plaintext, outcome.best.log_likelihood);
//! # Ok::<(), subst_mcmc::Error>(())
//! ```

pub mod alphabet;
pub mod error;
pub mod heatmap;
pub mod key;
pub mod model;
pub mod normalize;
pub mod sampler;
pub mod score;

pub use error::{Error, Result};
pub use key::Key;
pub use model::{BigramCounts, TransitionModel};
pub use normalize::normalize;
pub use sampler::{
    acceptance_probability, run_metropolis_hastings, Candidate, RunOutcome, Sampler,
    SamplerConfig, Termination,
};
pub use score::log_likelihood;
