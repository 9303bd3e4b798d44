#![cfg(test)]

use rand::{SeedableRng, rngs::StdRng};

use crate::{
    arch::{activations::ActFn, layers::BasicLayer},
    dataset::Dataset,
    network::Network,
    optimization::{GradientDescent, GradientDescentWithMomentum},
    training::{Backpropagation, TrainStrategy},
};

fn and2() -> Dataset {
    let and2 = [
        0.0, 0.0, 0.0, //
        0.0, 1.0, 0.0, //
        1.0, 0.0, 0.0, //
        1.0, 1.0, 1.0, //
    ];

    Dataset::new(and2.into(), 2, 1).unwrap()
}

fn network(seed: u64) -> Network {
    let sigmoid = ActFn::sigmoid(1.);
    let layers = vec![
        BasicLayer::new(sigmoid, true, 2),
        BasicLayer::new(sigmoid, true, 3),
        BasicLayer::new(sigmoid, true, 1),
    ];

    Network::with_rng(layers, &mut StdRng::seed_from_u64(seed)).unwrap()
}

#[test]
fn test_ml_and2_gate_error_decreases() {
    let mut network = network(42);
    let mut strategy = Backpropagation::full_batch(and2(), GradientDescent::new(0.5));

    strategy.iteration(&mut network).unwrap();
    let first = strategy.error();

    for _ in 0..2000 {
        strategy.iteration(&mut network).unwrap();
    }

    assert_eq!(strategy.iterations(), 2001);
    assert!(strategy.error() < first);
}

#[test]
fn test_ml_and2_gate_with_momentum_and_batches() {
    let mut network = network(3);
    let mut strategy = Backpropagation::new(
        and2(),
        GradientDescentWithMomentum::new(0.1, 0.5),
        std::num::NonZeroUsize::new(2).unwrap(),
    );

    strategy.iteration(&mut network).unwrap();
    let first = strategy.error();

    for _ in 0..2000 {
        strategy.iteration(&mut network).unwrap();
    }

    assert!(strategy.error() < first);
}

#[test]
fn test_strategy_rejects_mismatched_network() {
    let sigmoid = ActFn::sigmoid(1.);
    let mut network = Network::new(vec![
        BasicLayer::new(sigmoid, true, 3),
        BasicLayer::new(sigmoid, true, 1),
    ])
    .unwrap();

    let mut strategy = Backpropagation::full_batch(and2(), GradientDescent::new(0.5));
    assert!(strategy.iteration(&mut network).is_err());
    assert_eq!(strategy.iterations(), 0);
}
