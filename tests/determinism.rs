use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use subst_mcmc::{run_metropolis_hastings, Key, Sampler, SamplerConfig, TransitionModel};

const REFERENCE: &str = include_str!("fixtures/reference.txt");

fn ciphertext() -> String {
    let key: Key = "phqgiumeaylnofdxjkrcvstzwb".parse().unwrap();
    key.encrypt("Four score and seven years ago our fathers brought forth on this continent")
}

#[test]
fn same_seed_same_answer() {
    let model = TransitionModel::from_document(REFERENCE).unwrap();
    let cipher = ciphertext();

    let mut rng = ChaCha20Rng::from_seed([7; 32]);
    let first = run_metropolis_hastings(&cipher, &model, 500, &mut rng);
    let mut rng = ChaCha20Rng::from_seed([7; 32]);
    let second = run_metropolis_hastings(&cipher, &model, 500, &mut rng);
    assert_eq!(first, second);
    assert!(first.log_likelihood.is_finite());
}

#[test]
fn model_is_shared_between_independent_samplers() {
    let model = TransitionModel::from_document(REFERENCE).unwrap();
    let snapshot = model.clone();
    let cipher = ciphertext();
    let config = SamplerConfig::default().with_max_accepted(300).with_restarts(2);

    let a = Sampler::new(&model, config.clone()).unwrap();
    let b = Sampler::new(&model, config).unwrap();
    let out_a = a.run(&cipher, &mut ChaCha20Rng::seed_from_u64(99));
    let out_b = b.run(&cipher, &mut ChaCha20Rng::seed_from_u64(99));

    assert_eq!(out_a, out_b);
    assert_eq!(model, snapshot);
}
