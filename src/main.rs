// main.rs
// Substitution breaker: bigram model from a reference corpus -> Metropolis-Hastings key search.
// Usage: subst-mcmc <CIPHERTEXT> <ACCEPTED> <REFERENCE> [--seed HEX] [--restarts N]
//        [--max-iterations N] [--heatmap out.png] [--show-model]
//
// Example: subst-mcmc decode_this.txt 2000 war_and_peace.txt
//
// If the plaintext is not readable, run again (or raise --restarts): the search is stochastic.

use std::path::PathBuf;

use clap::Parser;
use log::info;
use rand::rngs::OsRng;
use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha20Rng;

use subst_mcmc::normalize::read_document;
use subst_mcmc::{heatmap, Sampler, SamplerConfig, Termination, TransitionModel};

#[derive(Parser, Debug)]
#[command(author, version, about = "Break a monoalphabetic substitution cipher with MCMC")]
struct Args {
    /// File containing the ciphertext
    ciphertext: PathBuf,

    /// Number of accepted moves before the search stops
    #[arg(value_parser = clap::value_parser!(u64).range(1..))]
    accepted: u64,

    /// Reference document the bigram model is learned from
    reference: PathBuf,

    /// 32-byte ChaCha20 seed as 64 hex characters; drawn from the OS when omitted
    #[arg(long, value_parser = parse_seed)]
    seed: Option<[u8; 32]>,

    /// Independent runs sharing the model; the best result is reported
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
    restarts: u32,

    /// Stop a run after this many iterations even if the accepted budget is not reached
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    max_iterations: Option<u64>,

    /// Write the transition matrix as a PNG heatmap
    #[arg(long)]
    heatmap: Option<PathBuf>,

    /// Print the transition matrix as a text grid
    #[arg(long)]
    show_model: bool,
}

fn parse_seed(s: &str) -> Result<[u8; 32], String> {
    let bytes = hex::decode(s.trim()).map_err(|e| format!("seed is not hex: {e}"))?;
    bytes
        .try_into()
        .map_err(|b: Vec<u8>| format!("seed must be 32 bytes, got {}", b.len()))
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let ciphertext = read_document(&args.ciphertext)?;
    let model = TransitionModel::from_path(&args.reference)?;

    if let Some(path) = &args.heatmap {
        heatmap::save(&model, path)?;
    }
    if args.show_model {
        println!("{}", heatmap::render_text(&model));
    }

    let seed = args.seed.unwrap_or_else(|| {
        let mut seed = [0u8; 32];
        OsRng.fill_bytes(&mut seed);
        seed
    });
    info!("seed (hex): {}", hex::encode(seed));
    let mut rng = ChaCha20Rng::from_seed(seed);

    let config = SamplerConfig::default()
        .with_max_accepted(args.accepted)
        .with_max_iterations(args.max_iterations)
        .with_restarts(args.restarts);
    let sampler = Sampler::new(&model, config)?;
    let outcome = sampler.run(&ciphertext, &mut rng);

    if outcome.termination == Termination::IterationCeiling {
        println!("(stopped at the iteration ceiling before {} accepted moves)", args.accepted);
    }
    println!(
        "Iterations {} | accepted {} | log-likelihood {:.4}",
        outcome.iterations, outcome.accepted, outcome.best.log_likelihood
    );
    if let Some(key) = outcome.best_key {
        println!("Key (plain -> cipher): {key}");
    }
    println!("Plaintext:\n{}", outcome.best.plaintext);

    Ok(())
}
