use cartboost::prelude::*;

use rand::prelude::*;

use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};


// Toy example  (0/1 are the labels)
//
//  1 | 0         1
//    |
//  0 | 0         1
//    +--------------
//      0         1
fn toy_sample() -> (Vec<Vec<f64>>, Vec<Label>) {
    let data = vec![
        vec![0.0, 0.0],
        vec![0.0, 1.0],
        vec![1.0, 0.0],
        vec![1.0, 1.0],
    ];
    let target = vec![0, 0, 1, 1];
    (data, target)
}


/// Three noisy classes on the plane.
/// The label is decided by the first feature,
/// and 10% of the labels are flipped at random.
fn noisy_sample(n_sample: usize, seed: u64) -> (Vec<Vec<f64>>, Vec<Label>) {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut data = Vec::with_capacity(n_sample);
    let mut target = Vec::with_capacity(n_sample);
    for _ in 0..n_sample {
        let x = rng.gen_range(0.0..3.0);
        let y = rng.gen_range(0.0..1.0);
        let mut label = x as Label;
        if rng.gen_bool(0.1) {
            label = rng.gen_range(0..3);
        }
        data.push(vec![x, y]);
        target.push(label);
    }
    (data, target)
}


/// Route `indices` down from `node` and check the tree invariants
/// on every node.
fn check_node(
    node: &Node,
    data: &[Vec<f64>],
    target: &[Label],
    indices: Vec<usize>,
    maximal_depth: usize,
    minimal_samples: usize,
) {
    assert!(!indices.is_empty(), "a node received no examples");
    assert!(node.depth() <= maximal_depth);

    if indices.len() <= minimal_samples {
        assert!(node.is_terminal());
    }

    if node.is_terminal() {
        let category = node.category().unwrap();
        assert!(indices.iter().any(|&i| target[i] == category));
        assert!(node.split_index().is_none());
        assert!(node.left().is_none() && node.right().is_none());
        return;
    }

    assert!(node.category().is_none());
    let feature = node.split_index().unwrap();
    let threshold = node.split_value().unwrap();
    let (lindices, rindices): (Vec<usize>, Vec<usize>) = indices.into_iter()
        .partition(|&i| data[i][feature] < threshold);

    assert!(lindices.iter().all(|&i| data[i][feature] < threshold));
    assert!(rindices.iter().all(|&i| data[i][feature] >= threshold));

    let left = node.left().unwrap();
    let right = node.right().unwrap();
    assert_eq!(left.depth(), node.depth() + 1);
    assert_eq!(right.depth(), node.depth() + 1);

    check_node(left, data, target, lindices, maximal_depth, minimal_samples);
    check_node(right, data, target, rindices, maximal_depth, minimal_samples);
}


#[test]
fn separable_toy_example() {
    let (data, target) = toy_sample();

    let mut tree = DecisionTree::new(2, 2, 1, 0).unwrap();
    tree.train(&data, &target).unwrap();

    let root = tree.root().unwrap();
    assert_eq!(root.split_index(), Some(0));
    assert_eq!(root.split_value(), Some(1.0));
    assert_eq!(root.left().unwrap().category(), Some(0));
    assert_eq!(root.right().unwrap().category(), Some(1));

    assert_eq!(tree.predict(&data).unwrap(), target);
    assert_eq!(tree.evaluate(&data, &target).unwrap(), 1.0);
}


#[test]
fn tree_invariants_hold_on_noisy_data() {
    let (data, target) = noisy_sample(120, 7);

    for (maximal_depth, minimal_samples) in [(0, 0), (1, 0), (3, 5), (6, 2), (20, 0)] {
        let mut tree = DecisionTree::new(2, 3, maximal_depth, minimal_samples)
            .unwrap();
        tree.train(&data, &target).unwrap();

        let root = tree.root().unwrap();
        let indices = (0..data.len()).collect::<Vec<_>>();
        check_node(root, &data, &target, indices, maximal_depth, minimal_samples);
        assert!(tree.height() <= maximal_depth);
    }
}


#[test]
fn deep_tree_fits_distinct_examples() {
    let (data, target) = noisy_sample(80, 11);

    let mut tree = DecisionTree::new(2, 3, 100, 0).unwrap();
    tree.train(&data, &target).unwrap();

    // All examples are distinct, so a fully grown tree is perfect.
    assert_eq!(tree.evaluate(&data, &target).unwrap(), 1.0);
}


#[test]
fn entropy_criterion_separates_toy_example() {
    let (data, target) = toy_sample();

    let mut tree = DecisionTree::new(2, 2, 1, 0)
        .unwrap()
        .criterion(Criterion::Entropy);
    tree.train(&data, &target).unwrap();

    assert_eq!(tree.root().unwrap().split_index(), Some(0));
    assert_eq!(tree.evaluate(&data, &target).unwrap(), 1.0);
}


#[test]
fn single_class_gives_a_leaf() {
    let data = vec![vec![0.0], vec![1.0], vec![2.0], vec![3.0]];
    let target = vec![5, 5, 5, 5];

    let mut tree = DecisionTree::new(1, 1, 10, 0).unwrap();
    tree.train(&data, &target).unwrap();

    let root = tree.root().unwrap();
    assert!(root.is_terminal());
    assert_eq!(root.category(), Some(5));
    assert_eq!(tree.n_leaves(), 1);
    assert_eq!(tree.evaluate(&data, &target).unwrap(), 1.0);
}


#[test]
fn identical_examples_give_a_leaf() {
    let data = vec![vec![1.0, 1.0]; 5];
    let target = vec![1, 0, 0, 1, 1];

    let mut tree = DecisionTree::new(2, 2, 10, 0).unwrap();
    tree.train(&data, &target).unwrap();

    let root = tree.root().unwrap();
    assert!(root.is_terminal());
    assert_eq!(root.category(), Some(1));
}


#[test]
fn majority_tie_goes_to_first_seen_label() {
    let data = vec![vec![0.0], vec![1.0], vec![2.0], vec![3.0]];
    let target = vec![9, 4, 4, 9];

    // `maximal_depth == 0` makes the root a leaf.
    let mut tree = DecisionTree::new(1, 2, 0, 0).unwrap();
    tree.train(&data, &target).unwrap();
    assert_eq!(tree.root().unwrap().category(), Some(9));
}


#[test]
fn minimal_samples_stops_splitting() {
    let (data, target) = toy_sample();

    let mut tree = DecisionTree::new(2, 2, 5, 4).unwrap();
    tree.train(&data, &target).unwrap();
    assert!(tree.root().unwrap().is_terminal());
}


#[test]
fn predict_is_idempotent() {
    let (data, target) = noisy_sample(60, 3);

    let mut tree = DecisionTree::new(2, 3, 4, 1).unwrap();
    tree.train(&data, &target).unwrap();

    let first = tree.predict(&data).unwrap();
    let second = tree.predict(&data).unwrap();
    assert_eq!(first, second);
}


#[test]
fn evaluate_partition_reports_indices() {
    let data = vec![vec![0.0], vec![1.0], vec![2.0]];
    let target = vec![0, 0, 1];

    let mut tree = DecisionTree::new(1, 2, 0, 0).unwrap();
    tree.train(&data, &target).unwrap();

    let evaluation = tree.evaluate_partition(&data, &target).unwrap();
    assert_eq!(evaluation.correct, vec![0, 1]);
    assert_eq!(evaluation.mistakes, vec![2]);
    assert!((evaluation.accuracy - 2.0 / 3.0).abs() < 1e-12);
}


#[test]
fn invalid_configuration() {
    assert!(matches!(
        DecisionTree::new(0, 2, 1, 0),
        Err(CartBoostError::InvalidConfiguration(_))
    ));
    assert!(matches!(
        DecisionTree::new(2, 0, 1, 0),
        Err(CartBoostError::InvalidConfiguration(_))
    ));
}


#[test]
fn invalid_input() {
    let (data, target) = toy_sample();
    let mut tree = DecisionTree::new(2, 2, 1, 0).unwrap();

    assert!(matches!(
        tree.train(&data, &target[..3]),
        Err(CartBoostError::InvalidInput(_))
    ));
    assert!(matches!(
        tree.train(&[], &[]),
        Err(CartBoostError::InvalidInput(_))
    ));

    let ragged = vec![vec![0.0, 0.0], vec![1.0]];
    assert!(matches!(
        tree.train(&ragged, &[0, 1]),
        Err(CartBoostError::InvalidInput(_))
    ));

    // More labels than `class_num`.
    let mut binary = DecisionTree::new(1, 2, 1, 0).unwrap();
    let data = vec![vec![0.0], vec![1.0], vec![2.0]];
    assert!(matches!(
        binary.train(&data, &[0, 1, 2]),
        Err(CartBoostError::InvalidInput(_))
    ));
    assert!(!binary.is_trained());

    tree.train(&toy_sample().0, &toy_sample().1).unwrap();
    assert!(matches!(
        tree.predict(&[vec![0.0]]),
        Err(CartBoostError::InvalidInput(_))
    ));
}


#[test]
fn failed_train_keeps_previous_tree() {
    let (data, target) = toy_sample();
    let mut tree = DecisionTree::new(2, 2, 1, 0).unwrap();
    tree.train(&data, &target).unwrap();
    let before = tree.clone();

    assert!(tree.train(&data, &target[..2]).is_err());
    assert_eq!(tree, before);
}


#[test]
fn untrained_tree() {
    let (data, target) = toy_sample();
    let tree = DecisionTree::new(2, 2, 1, 0).unwrap();

    assert!(!tree.is_trained());
    assert!(matches!(tree.predict(&data), Err(CartBoostError::NotTrained)));
    assert!(matches!(tree.predict(&[]), Err(CartBoostError::NotTrained)));
    assert!(matches!(
        tree.evaluate(&data, &target),
        Err(CartBoostError::NotTrained)
    ));
    assert!(matches!(tree.to_dot(), Err(CartBoostError::NotTrained)));
}


#[test]
fn cancelled_growth_keeps_previous_tree() {
    let (data, target) = toy_sample();

    let flag = Arc::new(AtomicBool::new(false));
    let mut tree = DecisionTree::new(2, 2, 1, 0)
        .unwrap()
        .cancel_flag(Arc::clone(&flag));
    tree.train(&data, &target).unwrap();
    let before = tree.clone();

    // `train` reads the flag only before a split search.
    flag.store(true, Ordering::Relaxed);
    assert!(matches!(
        tree.train(&data, &target),
        Err(CartBoostError::Cancelled { completed: 0 })
    ));
    assert_eq!(tree, before);

    let mut fresh = DecisionTree::new(2, 2, 1, 0)
        .unwrap()
        .cancel_flag(Arc::clone(&flag));
    assert!(matches!(
        fresh.train(&data, &target),
        Err(CartBoostError::Cancelled { completed: 0 })
    ));
    assert!(!fresh.is_trained());

    // A pure sample needs no split search.
    assert!(fresh.train(&data[..2], &target[..2]).is_ok());
    assert_eq!(fresh.root().unwrap().category(), Some(0));
}


#[test]
fn json_with_unknown_feature_is_rejected() {
    let (data, target) = toy_sample();
    let mut tree = DecisionTree::new(2, 2, 1, 0).unwrap();
    tree.train(&data, &target).unwrap();

    let json = tree.json_dump().unwrap();
    assert!(json.contains("\"feature\":0"));
    let broken = json.replace("\"feature\":0", "\"feature\":7");
    assert!(matches!(
        DecisionTree::from_json(&broken),
        Err(CartBoostError::UnableToRead(_))
    ));
}


#[test]
fn json_round_trip() {
    let (data, target) = noisy_sample(50, 5);
    let mut tree = DecisionTree::new(2, 3, 3, 2).unwrap();
    tree.train(&data, &target).unwrap();

    let json = tree.json_dump().unwrap();
    let loaded = DecisionTree::from_json(&json).unwrap();
    assert_eq!(loaded, tree);

    let mut path = std::env::temp_dir();
    path.push(format!("cartboost_dtree_{}.json", std::process::id()));
    tree.save_json(&path).unwrap();
    let loaded = DecisionTree::load_json(&path).unwrap();
    std::fs::remove_file(&path).unwrap();
    assert_eq!(loaded.predict(&data).unwrap(), tree.predict(&data).unwrap());

    assert!(matches!(
        DecisionTree::from_json("{"),
        Err(CartBoostError::UnableToRead(_))
    ));
}


#[test]
fn dot_output() {
    let (data, target) = toy_sample();
    let mut tree = DecisionTree::new(2, 2, 1, 0).unwrap();
    tree.train(&data, &target).unwrap();

    let dot = tree.to_dot().unwrap();
    assert!(dot.starts_with("graph DecisionTree {"));
    assert!(dot.contains("x[0] < 1.00 ?"));
    assert!(dot.ends_with('}'));
    println!("{tree}");
}
