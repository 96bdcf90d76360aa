//! Provides [`BoostingTree`],
//! an ensemble of decision trees trained on reweighted bootstrap samples.
use colored::Colorize;
use log::{debug, info, warn};
use rand::{rngs::StdRng, SeedableRng};
use rayon::prelude::*;
use serde::{Serialize, Deserialize};


use crate::{
    Classifier,
    Criterion,
    DecisionTree,
    Label,
    WeakLearner,
    WeightedMajority,

    common::{checker, utils},
    constants::*,
    error::{CartBoostError, Result},
};
use super::bootstrap;


use std::fmt;
use std::fs;
use std::path::Path;
use std::ops::ControlFlow;
use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};


/// Defines `BoostingTree`.
/// This struct is based on the book:
/// [Boosting: Foundations and Algorithms](https://direct.mit.edu/books/oa-monograph/5342/BoostingFoundations-and-Algorithms)
/// by Robert E. Schapire and Yoav Freund.
///
/// Each round draws a bootstrap sample of the training set
/// according to the current distribution over the examples,
/// grows a [`DecisionTree`] on it, and weighs the tree by
/// `alpha = ln((1 - error) / error) / 2`.
/// The distribution then moves towards the examples the tree got wrong.
/// A tree whose error is at least `0.5` is discarded and the round
/// is retried with a fresh bootstrap sample.
///
/// # Example
/// The following code shows a small example
/// for running [`BoostingTree`].
///
/// ```
/// use cartboost::prelude::*;
///
/// let data = vec![
///     vec![0.0, 0.0],
///     vec![0.0, 1.0],
///     vec![1.0, 0.0],
///     vec![1.0, 1.0],
/// ];
/// let target = vec![0, 0, 1, 1];
///
/// // 5 trees of depth at most 1.
/// let mut booster = BoostingTree::new(2, 5, 1, 0, Criterion::Gini)
///     .unwrap()
///     .seed(777);
/// booster.train(&data, &target).unwrap();
///
/// let predictions: Vec<i64> = booster.predict(&data).unwrap();
/// assert_eq!(predictions.len(), 4);
///
/// let accuracy = booster.evaluate(&data, &target).unwrap();
/// println!("Training accuracy is: {accuracy}");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoostingTree {
    input_dim:       usize,
    tree_num:        usize,
    maximal_depth:   usize,
    minimal_samples: usize,
    criterion:       Criterion,

    // Seed of the resampling generator.
    seed: u64,

    // Consecutive rejected rounds tolerated before giving up.
    max_retries: usize,

    #[serde(skip)]
    verbose: bool,

    #[serde(skip)]
    cancel: Option<Arc<AtomicBool>>,

    // Trees accepted so far, in the order they were trained.
    ensemble: WeightedMajority<DecisionTree>,
}


/// State that lives only during `BoostingTree::train`.
struct TrainState {
    // Distribution over the training examples.
    dist: Vec<f64>,

    rng: StdRng,

    // Number of consecutive rejected rounds.
    retries: usize,

    ensemble: WeightedMajority<DecisionTree>,
}


impl TrainState {
    fn new(n_sample: usize, seed: u64, capacity: usize) -> Self {
        let uni = 1f64 / n_sample as f64;
        Self {
            dist: vec![uni; n_sample],
            rng: StdRng::seed_from_u64(seed),
            retries: 0,
            ensemble: WeightedMajority::with_capacity(capacity),
        }
    }


    /// Multiply the weight of every correctly classified example
    /// by `exp(-alpha)` and the others by `exp(alpha)`,
    /// then normalize.
    #[inline]
    fn reweight(&mut self, correct: &[bool], alpha: f64) {
        // To prevent overflow, take the logarithm.
        self.dist.par_iter_mut()
            .zip(correct)
            .for_each(|(d, &ok)| {
                let margin = if ok { 1f64 } else { -1f64 };
                *d = d.ln() - alpha * margin;
            });

        utils::normalize_log_distribution(&mut self.dist);
    }
}


impl BoostingTree {
    /// Initialize the `BoostingTree`.
    ///
    /// Every tree of the ensemble is a [`DecisionTree`]
    /// with the given `input_dim`, `maximal_depth`, `minimal_samples`,
    /// and `criterion`.
    /// `input_dim` and `tree_num` must be positive.
    pub fn new(
        input_dim: usize,
        tree_num: usize,
        maximal_depth: usize,
        minimal_samples: usize,
        criterion: Criterion,
    ) -> Result<Self>
    {
        checker::positive("input_dim", input_dim)?;
        checker::positive("tree_num", tree_num)?;

        Ok(Self {
            input_dim,
            tree_num,
            maximal_depth,
            minimal_samples,
            criterion,

            seed: DEFAULT_SEED,
            max_retries: DEFAULT_MAX_RETRIES,
            verbose: false,
            cancel: None,

            ensemble: WeightedMajority::default(),
        })
    }


    /// Set the seed of the bootstrap resampling.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }


    /// Set the number of consecutive rejected rounds
    /// tolerated before training stops.
    /// Default is `100`.
    pub fn max_retries(mut self, max_retries: usize) -> Self {
        self.max_retries = max_retries;
        self
    }


    /// Print a line per boosting round to stdout.
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }


    /// Set a flag that stops `train` before the next round
    /// once it becomes `true`.
    pub fn cancel_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = Some(flag);
        self
    }


    /// Number of features of an example.
    pub fn input_dim(&self) -> usize { self.input_dim }
    /// Number of trees `train` aims for.
    pub fn tree_num(&self) -> usize { self.tree_num }
    /// Maximal depth of each tree.
    pub fn maximal_depth(&self) -> usize { self.maximal_depth }
    /// A tree node with at most this many examples becomes a leaf.
    pub fn minimal_samples(&self) -> usize { self.minimal_samples }
    /// The impurity measure used by every tree.
    pub fn splitting_criterion(&self) -> Criterion { self.criterion }


    /// Number of trees in the trained ensemble.
    #[inline]
    pub fn len(&self) -> usize {
        self.ensemble.len()
    }


    /// Returns `true` before a successful `train`.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.ensemble.is_empty()
    }


    /// Iterate over the `(alpha, tree)` pairs in ensemble order.
    pub fn weak_learners(&self)
        -> impl Iterator<Item = &WeakLearner<DecisionTree>>
    {
        self.ensemble.iter()
    }


    /// The combined hypothesis.
    pub fn ensemble(&self) -> &WeightedMajority<DecisionTree> {
        &self.ensemble
    }


    #[inline]
    fn is_cancelled(&self) -> bool {
        self.cancel.as_ref()
            .is_some_and(|flag| flag.load(Ordering::Relaxed))
    }


    /// Train the ensemble on `(data, target)`.
    ///
    /// On error the previously trained ensemble, if any, is kept.
    pub fn train(&mut self, data: &[Vec<f64>], target: &[Label])
        -> Result<()>
    {
        checker::sample(data, target, self.input_dim)?;

        let n_sample = data.len();
        let class_num = utils::distinct_labels(target);

        let weak_learner = DecisionTree::new(
                self.input_dim,
                class_num,
                self.maximal_depth,
                self.minimal_samples,
            )?
            .criterion(self.criterion);

        info!(
            "boosting {} trees on {n_sample} examples \
            ({} features, {class_num} classes)",
            self.tree_num, self.input_dim,
        );
        if self.verbose { self.print_log_header(); }


        let mut state = TrainState::new(n_sample, self.seed, self.tree_num);
        let flow = (1..).try_for_each(|round| {
            self.boost(data, target, &weak_learner, &mut state, round)
        });

        if let ControlFlow::Break(Err(e)) = flow {
            warn!("boosting failed: {e}");
            return Err(e);
        }


        info!("boosting finished with {} trees", state.ensemble.len());
        self.ensemble = state.ensemble;
        Ok(())
    }


    /// Boosting step per round.
    /// This method returns
    /// `ControlFlow::Continue(())` while more trees are needed,
    /// `ControlFlow::Break(result)` otherwise.
    fn boost(
        &self,
        data: &[Vec<f64>],
        target: &[Label],
        weak_learner: &DecisionTree,
        state: &mut TrainState,
        round: usize,
    ) -> ControlFlow<Result<()>>
    {
        if state.ensemble.len() >= self.tree_num {
            return ControlFlow::Break(Ok(()));
        }

        if self.is_cancelled() {
            let completed = state.ensemble.len();
            return ControlFlow::Break(Err(
                CartBoostError::Cancelled { completed }
            ));
        }

        if state.retries > self.max_retries {
            if state.ensemble.is_empty() {
                return ControlFlow::Break(Err(
                    CartBoostError::DegenerateWeakLearner {
                        retries: state.retries,
                    }
                ));
            }
            warn!(
                "stopped after {} consecutive rejected rounds \
                with {} of {} trees",
                state.retries, state.ensemble.len(), self.tree_num,
            );
            return ControlFlow::Break(Ok(()));
        }


        let n_sample = data.len();
        let indices = bootstrap::resample(&state.dist, n_sample, &mut state.rng);


        // Get a new hypothesis
        let mut tree = weak_learner.clone();
        let fitted = tree.fit_indices(
            data, target, &indices, self.cancel.as_deref()
        );
        if let Err(e) = fitted {
            let e = match e {
                CartBoostError::Cancelled { .. } => {
                    let completed = state.ensemble.len();
                    CartBoostError::Cancelled { completed }
                },
                e => e,
            };
            return ControlFlow::Break(Err(e));
        }


        // `correct[i]` is `true` if the tree classifies
        // the `i`-th training example correctly.
        let correct = data.par_iter()
            .zip(target)
            .map(|(x, y)| tree.classify(x).map(|p| p == *y))
            .collect::<Result<Vec<bool>>>();
        let correct = match correct {
            Ok(correct) => correct,
            Err(e) => { return ControlFlow::Break(Err(e)); },
        };


        // The bootstrap sample is drawn from `dist`,
        // so its error rate estimates the weighted error.
        let error = indices.iter()
            .filter(|&&i| !correct[i])
            .count() as f64
            / n_sample as f64;


        if error >= 0.5 {
            state.retries += 1;
            warn!(
                "round {round}: rejected a tree with error {error:.4} \
                ({} consecutive)",
                state.retries,
            );
            if self.verbose { self.print_round(round, error, None); }
            return ControlFlow::Continue(());
        }
        state.retries = 0;


        // Compute the weight on the new hypothesis
        let alpha = if error == 0f64 {
            MAX_ALPHA
        } else {
            (0.5 * ((1f64 - error) / error).ln()).min(MAX_ALPHA)
        };
        state.reweight(&correct, alpha);
        debug_assert!(checker::simplex(&state.dist));


        debug!(
            "round {round}: accepted tree #{} with error {error:.4}, alpha {alpha:.4}",
            state.ensemble.len() + 1,
        );
        if self.verbose { self.print_round(round, error, Some(alpha)); }


        state.ensemble.push(alpha, tree);
        ControlFlow::Continue(())
    }


    /// Predict the label of every example in `data`.
    pub fn predict(&self, data: &[Vec<f64>]) -> Result<Vec<Label>> {
        if self.ensemble.is_empty() {
            return Err(CartBoostError::NotTrained);
        }
        checker::features(data, self.input_dim)?;
        self.classify_all(data)
    }


    /// Returns the accuracy of the ensemble on `(data, target)`.
    pub fn evaluate(&self, data: &[Vec<f64>], target: &[Label])
        -> Result<f64>
    {
        checker::sample(data, target, self.input_dim)?;
        let predictions = self.predict(data)?;

        Ok(utils::accuracy(&predictions, target))
    }


    /// Dump the booster as a json object.
    pub fn json_dump(&self) -> Result<String> {
        serde_json::to_string(self)
            .map_err(|e| CartBoostError::UnableToWrite(e.to_string()))
    }


    /// Load a booster from a json string.
    /// Every tree must be trained and take `input_dim` features.
    pub fn from_json(json_str: &str) -> Result<Self> {
        let booster = serde_json::from_str::<Self>(json_str)
            .map_err(|e| CartBoostError::UnableToRead(e.to_string()))?;

        if booster.input_dim == 0 || booster.tree_num == 0 {
            return Err(CartBoostError::UnableToRead(
                "`input_dim` and `tree_num` must be positive".into()
            ));
        }

        for (k, learner) in booster.ensemble.iter().enumerate() {
            let tree = learner.hypothesis();
            if tree.input_dim() != booster.input_dim || !tree.is_trained() {
                return Err(CartBoostError::UnableToRead(format!(
                    "tree {k} is untrained or does not take {} features",
                    booster.input_dim,
                )));
            }
            tree.check_loaded()?;
        }
        Ok(booster)
    }


    /// Save the booster as json to `path`.
    pub fn save_json<P>(&self, path: P) -> Result<()>
        where P: AsRef<Path>
    {
        let model = self.json_dump()?;
        fs::write(path, model)
            .map_err(|e| CartBoostError::UnableToWrite(e.to_string()))
    }


    /// Load a booster from a json file.
    pub fn load_json<P>(path: P) -> Result<Self>
        where P: AsRef<Path>
    {
        let json_str = fs::read_to_string(path)
            .map_err(|e| CartBoostError::UnableToRead(e.to_string()))?;
        Self::from_json(&json_str)
    }


    #[inline(always)]
    fn print_log_header(&self) {
        println!(
            "{:>PRINT_WIDTH$}\t{:>PRINT_WIDTH$}\t{:>PRINT_WIDTH$}\t{:>PRINT_WIDTH$}",
            "ROUND".bold().red(),
            "ERROR".bold().green(),
            "ALPHA".bold().blue(),
            "STATUS".bold().cyan(),
        );
    }


    #[inline(always)]
    fn print_round(&self, round: usize, error: f64, alpha: Option<f64>) {
        let (alpha, status) = match alpha {
            Some(a) => (format!("{a:.5}"), "accepted".green()),
            None => ("-".to_string(), "rejected".yellow()),
        };
        println!(
            "{:>PRINT_WIDTH$}\t{:>PRINT_WIDTH$.5}\t{:>PRINT_WIDTH$}\t{:>PRINT_WIDTH$}",
            round, error, alpha, status,
        );
    }
}


impl Classifier for BoostingTree {
    #[inline]
    fn classify(&self, example: &[f64]) -> Result<Label> {
        self.ensemble.classify(example)
    }
}


impl fmt::Display for BoostingTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "\
            ----------\n\
            # Boosting Tree\n\n\
            - Input dim: {}\n\
            - Trees: {} / {}\n\
            - Max depth: {}\n\
            - Min samples: {}\n\
            - Criterion: {}\n\
            - Seed: {}\n\
            - Max retries: {}\n\
            ----------\
            ",
            self.input_dim,
            self.ensemble.len(),
            self.tree_num,
            self.maximal_depth,
            self.minimal_samples,
            self.criterion,
            self.seed,
            self.max_retries,
        )
    }
}
