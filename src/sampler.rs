// sampler.rs
// Metropolis-Hastings search over substitution keys.
//
// Each iteration proposes a key one transposition away from the current one, scores the
// decryption under the bigram model and accepts with probability min(1, exp(ll' - ll)).
// The best candidate ever evaluated is kept regardless of acceptance. The chain stops
// once a target number of proposals has been accepted.

use log::{debug, info, trace, warn};
use rand::Rng;

use crate::error::{Error, Result};
use crate::key::Key;
use crate::model::TransitionModel;
use crate::normalize;
use crate::score;

/// Accepted-move budget used when the caller does not pick one.
pub const DEFAULT_MAX_ACCEPTED: u64 = 4000;

/// Below this log-ratio `exp` underflows to zero.
const MIN_LOG_RATIO: f64 = -708.0;

/// Knobs for a sampler run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SamplerConfig {
    /// Stop after this many accepted proposals. Shorter ciphertexts need more.
    pub max_accepted: u64,
    /// Optional cap on total iterations. Not part of the algorithm itself: a chain stuck
    /// with a very low acceptance rate would otherwise run for a long time.
    pub max_iterations: Option<u64>,
    /// Independent chains to run; the best outcome wins.
    pub restarts: u32,
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            max_accepted: DEFAULT_MAX_ACCEPTED,
            max_iterations: None,
            restarts: 1,
        }
    }
}

impl SamplerConfig {
    pub fn with_max_accepted(mut self, max_accepted: u64) -> Self {
        self.max_accepted = max_accepted;
        self
    }

    pub fn with_max_iterations(mut self, max_iterations: Option<u64>) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    pub fn with_restarts(mut self, restarts: u32) -> Self {
        self.restarts = restarts;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_accepted == 0 {
            return Err(Error::InvalidConfig(
                "accepted-move budget must be positive".into(),
            ));
        }
        if self.restarts == 0 {
            return Err(Error::InvalidConfig("at least one run is required".into()));
        }
        if self.max_iterations == Some(0) {
            return Err(Error::InvalidConfig(
                "iteration ceiling must be positive when set".into(),
            ));
        }
        Ok(())
    }
}

/// A decryption candidate and its log-likelihood.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub plaintext: String,
    pub log_likelihood: f64,
}

impl Candidate {
    /// Starting point of the running maximum: nothing seen yet.
    pub fn none() -> Self {
        Self {
            plaintext: String::new(),
            log_likelihood: f64::NEG_INFINITY,
        }
    }
}

/// Why a chain stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    /// The accepted-move budget was reached.
    AcceptedTarget,
    /// The iteration ceiling was hit first.
    IterationCeiling,
}

/// Result of a sampler run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunOutcome {
    pub best: Candidate,
    /// Key that produced `best`; `None` only when no proposal was evaluated.
    pub best_key: Option<Key>,
    pub accepted: u64,
    pub iterations: u64,
    pub termination: Termination,
}

/// `min(1, exp(ll_proposed - ll_current))`, clamped so that large log differences
/// never overflow or underflow.
pub fn acceptance_probability(ll_proposed: f64, ll_current: f64) -> f64 {
    let delta = ll_proposed - ll_current;
    if delta.is_nan() {
        return 0.0;
    }
    if delta >= 0.0 {
        1.0
    } else if delta < MIN_LOG_RATIO {
        0.0
    } else {
        delta.exp()
    }
}

/// State of one Markov chain over a fixed ciphertext.
struct Chain<'a> {
    model: &'a TransitionModel,
    ciphertext: &'a [u8],
    current_key: Key,
    ll_current: f64,
    buffer: Vec<u8>,
    best_symbols: Vec<u8>,
    best_ll: f64,
    best_key: Option<Key>,
    accepted: u64,
    iterations: u64,
}

impl<'a> Chain<'a> {
    fn new(model: &'a TransitionModel, ciphertext: &'a [u8], start: Key) -> Self {
        let mut buffer = Vec::with_capacity(ciphertext.len());
        start.decrypt_symbols_into(ciphertext, &mut buffer);
        let ll_current = score::log_likelihood_symbols(&buffer, model);
        Self {
            model,
            ciphertext,
            current_key: start,
            ll_current,
            buffer,
            best_symbols: Vec::new(),
            best_ll: f64::NEG_INFINITY,
            best_key: None,
            accepted: 0,
            iterations: 0,
        }
    }

    /// Score `proposed_key`, record it if it beats the best so far, then accept it when
    /// `u` (uniform in [0, 1)) falls below the acceptance probability.
    fn step(&mut self, proposed_key: Key, u: f64) -> bool {
        self.iterations += 1;
        proposed_key.decrypt_symbols_into(self.ciphertext, &mut self.buffer);
        let ll_proposed = score::log_likelihood_symbols(&self.buffer, self.model);

        if ll_proposed > self.best_ll {
            self.best_ll = ll_proposed;
            self.best_symbols.clone_from(&self.buffer);
            self.best_key = Some(proposed_key);
            debug!(
                "iteration {}: new best {:.4} with key {proposed_key}",
                self.iterations, self.best_ll
            );
        }

        let accepted = u < acceptance_probability(ll_proposed, self.ll_current);
        if accepted {
            self.current_key = proposed_key;
            self.ll_current = ll_proposed;
            self.accepted += 1;
        }
        trace!("accepted {} / iteration {}", self.accepted, self.iterations);
        accepted
    }

    fn finish(self, termination: Termination) -> RunOutcome {
        RunOutcome {
            best: Candidate {
                plaintext: normalize::from_symbols(&self.best_symbols),
                log_likelihood: self.best_ll,
            },
            best_key: self.best_key,
            accepted: self.accepted,
            iterations: self.iterations,
            termination,
        }
    }
}

/// Metropolis-Hastings sampler bound to a read-only transition model.
#[derive(Debug, Clone)]
pub struct Sampler<'m> {
    model: &'m TransitionModel,
    config: SamplerConfig,
}

impl<'m> Sampler<'m> {
    pub fn new(model: &'m TransitionModel, config: SamplerConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { model, config })
    }

    /// Run every configured chain on `ciphertext` and return the best outcome.
    ///
    /// The ciphertext is normalized first. Chains draw from `rng` one after another,
    /// so a seeded generator gives a reproducible result.
    pub fn run<R: Rng>(&self, ciphertext: &str, rng: &mut R) -> RunOutcome {
        let symbols = normalize::to_symbols(ciphertext);
        info!(
            "sampling {} symbols: budget {} accepted, {} run(s)",
            symbols.len(),
            self.config.max_accepted,
            self.config.restarts
        );

        let mut best: Option<RunOutcome> = None;
        for restart in 0..self.config.restarts {
            let outcome = self.run_chain(&symbols, rng);
            info!(
                "run {}: log-likelihood {:.4} after {} iterations ({} accepted)",
                restart + 1,
                outcome.best.log_likelihood,
                outcome.iterations,
                outcome.accepted
            );
            best = match best {
                Some(current) if current.best.log_likelihood >= outcome.best.log_likelihood => {
                    Some(current)
                }
                _ => Some(outcome),
            };
        }
        // validate() guarantees at least one chain ran.
        best.unwrap_or_else(|| self.run_chain(&symbols, rng))
    }

    /// One chain over normalized ciphertext symbols.
    fn run_chain<R: Rng>(&self, ciphertext: &[u8], rng: &mut R) -> RunOutcome {
        let mut chain = Chain::new(self.model, ciphertext, Key::random(rng));
        while chain.accepted < self.config.max_accepted {
            if self.config.max_iterations.is_some_and(|cap| chain.iterations >= cap) {
                warn!(
                    "iteration ceiling reached after {} iterations ({} accepted)",
                    chain.iterations, chain.accepted
                );
                return chain.finish(Termination::IterationCeiling);
            }
            let proposed_key = chain.current_key.propose(rng);
            let u: f64 = rng.gen();
            chain.step(proposed_key, u);
        }
        chain.finish(Termination::AcceptedTarget)
    }
}

/// Single-chain search with no iteration ceiling, returning only the best pair.
///
/// A zero budget evaluates nothing and returns [`Candidate::none`].
pub fn run_metropolis_hastings<R: Rng>(
    ciphertext: &str,
    model: &TransitionModel,
    max_accepted: u64,
    rng: &mut R,
) -> Candidate {
    let sampler = Sampler {
        model,
        config: SamplerConfig::default().with_max_accepted(max_accepted),
    };
    sampler.run(ciphertext, rng).best
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    fn model() -> TransitionModel {
        TransitionModel::from_document(
            "it was the best of times it was the worst of times it was the age of wisdom \
             it was the age of foolishness it was the epoch of belief",
        )
        .unwrap()
    }

    #[test]
    fn acceptance_is_certain_for_improvements() {
        assert_eq!(acceptance_probability(-10.0, -20.0), 1.0);
        assert_eq!(acceptance_probability(-10.0, -10.0), 1.0);
        assert_eq!(acceptance_probability(0.0, -1e308), 1.0);
    }

    #[test]
    fn acceptance_follows_the_likelihood_ratio() {
        let p = acceptance_probability(-12.0, -10.0);
        assert!((p - (-2.0f64).exp()).abs() < 1e-15);
    }

    #[test]
    fn acceptance_clamps_huge_drops_to_zero() {
        assert_eq!(acceptance_probability(-1e6, 0.0), 0.0);
        assert_eq!(acceptance_probability(-1e308, 1e308), 0.0);
        assert_eq!(acceptance_probability(f64::NAN, 0.0), 0.0);
    }

    #[test]
    fn config_validation() {
        assert!(SamplerConfig::default().validate().is_ok());
        assert!(SamplerConfig::default().with_max_accepted(0).validate().is_err());
        assert!(SamplerConfig::default().with_restarts(0).validate().is_err());
        assert!(SamplerConfig::default()
            .with_max_iterations(Some(0))
            .validate()
            .is_err());
        let model = model();
        assert!(matches!(
            Sampler::new(&model, SamplerConfig::default().with_max_accepted(0)),
            Err(Error::InvalidConfig(_))
        ));
    }

    #[test]
    fn run_stops_at_the_accepted_budget() {
        let model = model();
        let config = SamplerConfig::default().with_max_accepted(50);
        let sampler = Sampler::new(&model, config).unwrap();
        let outcome = sampler.run("Uif cftu pg ujnft", &mut ChaCha20Rng::seed_from_u64(9));
        assert_eq!(outcome.accepted, 50);
        assert!(outcome.iterations >= 50);
        assert_eq!(outcome.termination, Termination::AcceptedTarget);
        assert!(outcome.best.log_likelihood.is_finite());
        assert_eq!(outcome.best.plaintext.chars().count(), "Uif cftu pg ujnft".chars().count());
    }

    #[test]
    fn best_candidate_matches_its_key() {
        let model = model();
        let cipher = "Uif cftu pg ujnft, ju xbt";
        let config = SamplerConfig::default().with_max_accepted(200);
        let sampler = Sampler::new(&model, config).unwrap();
        let outcome = sampler.run(cipher, &mut ChaCha20Rng::seed_from_u64(4));
        let key = outcome.best_key.expect("at least one proposal");
        assert_eq!(key.decrypt(cipher), outcome.best.plaintext);
        let rescored = score::log_likelihood(&outcome.best.plaintext, &model);
        assert!((rescored - outcome.best.log_likelihood).abs() < 1e-9);
    }

    #[test]
    fn iteration_ceiling_ends_the_run() {
        let model = model();
        let config = SamplerConfig::default()
            .with_max_accepted(1_000_000)
            .with_max_iterations(Some(25));
        let outcome = Sampler::new(&model, config)
            .unwrap()
            .run("abc def", &mut ChaCha20Rng::seed_from_u64(1));
        assert_eq!(outcome.iterations, 25);
        assert!(outcome.accepted <= 25);
        assert_eq!(outcome.termination, Termination::IterationCeiling);
    }

    #[test]
    fn empty_ciphertext_accepts_everything() {
        let model = model();
        let outcome = Sampler::new(&model, SamplerConfig::default().with_max_accepted(10))
            .unwrap()
            .run("", &mut ChaCha20Rng::seed_from_u64(2));
        assert_eq!(outcome.iterations, 10);
        assert_eq!(outcome.best.plaintext, "");
        assert_eq!(outcome.best.log_likelihood, 0.0);
    }

    #[test]
    fn zero_budget_returns_nothing_seen() {
        let model = model();
        let best = run_metropolis_hastings("xyz", &model, 0, &mut ChaCha20Rng::seed_from_u64(0));
        assert_eq!(best, Candidate::none());
    }

    #[test]
    fn seeded_runs_are_reproducible() {
        let model = model();
        let config = SamplerConfig::default().with_max_accepted(300).with_restarts(2);
        let sampler = Sampler::new(&model, config).unwrap();
        let a = sampler.run("Ju xbt uif bhf pg xjtepn", &mut ChaCha20Rng::seed_from_u64(77));
        let b = sampler.run("Ju xbt uif bhf pg xjtepn", &mut ChaCha20Rng::seed_from_u64(77));
        assert_eq!(a, b);
    }

    #[test]
    fn more_restarts_never_do_worse_on_the_same_stream() {
        let model = model();
        let cipher = "Ju xbt uif fqpdi pg cfmjfg";
        let one = Sampler::new(&model, SamplerConfig::default().with_max_accepted(200))
            .unwrap()
            .run(cipher, &mut ChaCha20Rng::seed_from_u64(5));
        let three = Sampler::new(
            &model,
            SamplerConfig::default().with_max_accepted(200).with_restarts(3),
        )
        .unwrap()
        .run(cipher, &mut ChaCha20Rng::seed_from_u64(5));
        assert!(three.best.log_likelihood >= one.best.log_likelihood);
    }

    #[test]
    fn rejected_proposal_is_still_recorded_as_best() {
        let model = model();
        let truth = "it was the best of times";
        let true_key: Key = "qwertyuiopasdfghjklzxcvbnm".parse().unwrap();
        // Same key with the images of 'e' and 't' exchanged.
        let worse_key: Key = "qwerzyuiopasdfghjkltxcvbnm".parse().unwrap();
        let ciphertext = true_key.encrypt(truth);
        let symbols = normalize::to_symbols(&ciphertext);

        let mut chain = Chain::new(&model, &symbols, true_key);
        let ll_truth = chain.ll_current;
        let ll_worse = score::log_likelihood(&worse_key.decrypt(&ciphertext), &model);
        let p = acceptance_probability(ll_worse, ll_truth);
        assert!(p < 0.9, "swap should clearly lower the score, p = {p}");

        assert!(!chain.step(worse_key, 0.9));
        assert_eq!(chain.accepted, 0);
        assert_eq!(chain.iterations, 1);
        assert_eq!(chain.current_key, true_key);
        assert_eq!(chain.ll_current, ll_truth);
        assert_eq!(chain.best_key, Some(worse_key));
        assert!((chain.best_ll - ll_worse).abs() < 1e-9);

        let outcome = chain.finish(Termination::AcceptedTarget);
        assert_eq!(outcome.accepted, 0);
        assert_eq!(outcome.best.plaintext, worse_key.decrypt(&ciphertext));
    }

    #[test]
    fn step_accepts_below_the_acceptance_probability() {
        let model = model();
        let true_key: Key = "qwertyuiopasdfghjklzxcvbnm".parse().unwrap();
        let worse_key: Key = "qwerzyuiopasdfghjkltxcvbnm".parse().unwrap();
        let symbols = normalize::to_symbols(&true_key.encrypt("it was the worst of times"));

        let mut chain = Chain::new(&model, &symbols, worse_key);
        let ll_start = chain.ll_current;
        // An improvement is taken for any u in [0, 1).
        assert!(chain.step(true_key, 0.999));
        assert_eq!(chain.accepted, 1);
        assert!(chain.ll_current > ll_start);
        // A worse proposal is taken when u = 0, and best keeps the earlier key.
        assert!(chain.step(worse_key, 0.0));
        assert_eq!(chain.accepted, 2);
        assert_eq!(chain.current_key, worse_key);
        assert_eq!(chain.best_key, Some(true_key));
    }
}
