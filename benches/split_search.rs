// Benchmarking training time
// for the decision tree and the boosting ensemble
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use cartboost::{BoostingTree, DecisionTree, Label};
use rand::prelude::*;
use std::time::Duration;


// data generating
// function: three classes decided by the first two features
fn create_data(n_samples: usize, n_features: usize)
    -> (Vec<Vec<f64>>, Vec<Label>)
{
    let mut rng = StdRng::seed_from_u64(0);
    let data = (0..n_samples)
        .map(|_| (0..n_features).map(|_| rng.gen::<f64>()).collect())
        .collect::<Vec<Vec<f64>>>();
    let target = data.iter()
        .map(|x: &Vec<f64>| ((x[0] + x[1]) * 1.5) as Label)
        .collect();
    (data, target)
}


pub fn decision_tree(c: &mut Criterion) {

    // sample size
    let n_samples = 500usize;
    let n_features = 10usize;

    let (data, y) = create_data(n_samples, n_features);

    let mut tree_train = c.benchmark_group("train_tree");
    tree_train.measurement_time(Duration::from_secs(20));

    println!("\nBenchmarking on a {} x {} matrix:\n", n_samples, n_features);
    for depth in [2usize, 5, 10] {
        tree_train.bench_function(
            format!("train_tree_depth_{depth}"), |b| {
                b.iter(|| {
                    let mut tree = DecisionTree::new(n_features, 3, depth, 1)
                        .unwrap();
                    tree.train(black_box(&data), black_box(&y)).unwrap();
                })
            }
        );
    }
    tree_train.finish();
}


pub fn boosting_tree(c: &mut Criterion) {

    // sample size
    let n_samples = 300usize;
    let n_features = 5usize;

    let (data, y) = create_data(n_samples, n_features);

    let mut booster_train = c.benchmark_group("train_booster");
    booster_train.sample_size(10);

    booster_train.bench_function(
        "train_booster_10_trees", |b| {
            b.iter(|| {
                let mut booster = BoostingTree::new(
                        n_features, 10, 3, 1, cartboost::Criterion::Gini,
                    )
                    .unwrap();
                booster.train(black_box(&data), black_box(&y)).unwrap();
            })
        }
    );
    booster_train.finish();
}


criterion_group!(benches, decision_tree, boosting_tree);
criterion_main!(benches);
