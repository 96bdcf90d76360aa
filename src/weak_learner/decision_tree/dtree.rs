use log::debug;
use serde::{Serialize, Deserialize};

use crate::{
    Classifier,
    Label,
    common::{checker, utils},
    error::{CartBoostError, Result},
};

use super::{
    node::*,
    criterion::*,
    split_rule::*,
};

use std::fmt;
use std::fs::{self, File};
use std::io::prelude::*;
use std::path::Path;
use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};


/// The Decision Tree algorithm.
/// Given a feature matrix and a label vector,
/// [`DecisionTree`] grows a binary tree by recursive,
/// impurity-minimizing splits and classifies new examples
/// by root-to-leaf traversal.
///
/// The code is based on the book:
/// [Classification and Regression Trees](https://www.amazon.com/Classification-Regression-Wadsworth-Statistics-Probability/dp/0412048418)
/// by Leo Breiman, Jerome H. Friedman, Richard A. Olshen, and Charles J. Stone.
///
/// A node holding `n` examples at depth `d` is split
/// only if `n > minimal_samples` and `d < maximal_depth`
/// and its examples have more than one label.
///
/// # Example
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
/// let mut tree = DecisionTree::new(2, 2, 1, 0)
///     .unwrap()
///     .criterion(Criterion::Gini);
/// tree.train(&data, &target).unwrap();
///
/// assert_eq!(tree.predict(&data).unwrap(), target);
/// assert_eq!(tree.evaluate(&data, &target).unwrap(), 1.0);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionTree {
    input_dim:       usize,
    class_num:       usize,
    maximal_depth:   usize,
    minimal_samples: usize,
    criterion:       Criterion,

    // Read before every split search of `train`.
    #[serde(skip)]
    cancel: Option<Arc<AtomicBool>>,

    root: Option<Node>,
}


/// The result of [`DecisionTree::evaluate_partition`].
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    /// Fraction of correctly classified examples.
    pub accuracy: f64,
    /// Row indices of the correctly classified examples.
    pub correct: Vec<usize>,
    /// Row indices of the misclassified examples.
    pub mistakes: Vec<usize>,
}


impl DecisionTree {
    /// Construct an untrained tree.
    ///
    /// - `input_dim` is the number of features of an example,
    /// - `class_num` bounds the number of distinct labels,
    /// - `maximal_depth` bounds the depth of every node (the root is `0`),
    /// - a node with at most `minimal_samples` examples is a leaf.
    ///
    /// `input_dim` and `class_num` must be positive.
    pub fn new(
        input_dim: usize,
        class_num: usize,
        maximal_depth: usize,
        minimal_samples: usize,
    ) -> Result<Self>
    {
        checker::positive("input_dim", input_dim)?;
        checker::positive("class_num", class_num)?;

        Ok(Self {
            input_dim,
            class_num,
            maximal_depth,
            minimal_samples,
            criterion: Criterion::default(),
            cancel: None,
            root: None,
        })
    }


    /// Set the node splitting rule.
    /// Default value is `Criterion::Gini`.
    #[inline]
    pub fn criterion(mut self, criterion: Criterion) -> Self {
        self.criterion = criterion;
        self
    }


    /// Set the flag that stops `train`.
    /// The flag is read before every split search,
    /// and a raised flag makes `train` return
    /// `CartBoostError::Cancelled` with the previous tree kept.
    #[inline]
    pub fn cancel_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = Some(flag);
        self
    }


    /// Number of features of an example.
    pub fn input_dim(&self) -> usize { self.input_dim }
    /// Upper bound of distinct labels in a training set.
    pub fn class_num(&self) -> usize { self.class_num }
    /// Maximal depth of a node.
    pub fn maximal_depth(&self) -> usize { self.maximal_depth }
    /// A node with at most this many examples becomes a leaf.
    pub fn minimal_samples(&self) -> usize { self.minimal_samples }
    /// The impurity measure used for splitting.
    pub fn splitting_criterion(&self) -> Criterion { self.criterion }


    /// The root node, or `None` before training.
    #[inline]
    pub fn root(&self) -> Option<&Node> {
        self.root.as_ref()
    }


    /// Returns `true` once `train` has succeeded.
    #[inline]
    pub fn is_trained(&self) -> bool {
        self.root.is_some()
    }


    /// Number of leaves. `0` before training.
    pub fn n_leaves(&self) -> usize {
        self.root.as_ref().map_or(0, Node::leaves)
    }


    /// Depth of the deepest node. `0` before training.
    pub fn height(&self) -> usize {
        self.root.as_ref().map_or(0, Node::height)
    }


    /// Build the tree from `data` and `target`.
    /// The previous tree, if any, is replaced only on success.
    pub fn train(&mut self, data: &[Vec<f64>], target: &[Label])
        -> Result<()>
    {
        checker::sample(data, target, self.input_dim)?;

        let indices = (0..data.len()).collect::<Vec<_>>();
        let cancel = self.cancel.clone();
        self.fit_indices(data, target, &indices, cancel.as_deref())
    }


    /// Build the tree from the rows `data[i]` for `i` in `indices`.
    /// `indices` may contain duplicates (a bootstrap sample).
    /// The caller has already checked the shape of `data`.
    /// A raised `cancel` flag stops the growth
    /// with `CartBoostError::Cancelled { completed: 0 }`.
    pub(crate) fn fit_indices(
        &mut self,
        data: &[Vec<f64>],
        target: &[Label],
        indices: &[usize],
        cancel: Option<&AtomicBool>,
    ) -> Result<()>
    {
        let n_class = utils::distinct_labels(indices.iter().map(|&i| &target[i]));
        if n_class > self.class_num {
            return Err(CartBoostError::InvalidInput(format!(
                "{n_class} distinct labels are given, \
                but the tree is configured for {} classes",
                self.class_num,
            )));
        }

        let root = self.grow(data, target, indices.to_vec(), 0, cancel)?;
        debug!(
            "grew a tree on {} examples: {} leaves, height {}",
            indices.len(), root.leaves(), root.height(),
        );

        self.root = Some(root);
        Ok(())
    }


    /// Grow the sub-tree rooted at a node of depth `depth`
    /// that receives the examples in `indices`.
    fn grow(
        &self,
        data: &[Vec<f64>],
        target: &[Label],
        indices: Vec<usize>,
        depth: usize,
        cancel: Option<&AtomicBool>,
    ) -> Result<Node>
    {
        let category = utils::majority_label(target, &indices)
            .ok_or_else(|| CartBoostError::InvalidInput(
                "a tree node received no examples".into()
            ))?;


        let is_pure = indices.iter().all(|&i| target[i] == category);
        if is_pure
            || indices.len() <= self.minimal_samples
            || depth >= self.maximal_depth
        {
            return Ok(Node::leaf(category, depth));
        }


        if cancel.is_some_and(|flag| flag.load(Ordering::Relaxed)) {
            return Err(CartBoostError::Cancelled { completed: 0 });
        }


        // Find the best pair of feature index and threshold
        // based on the `criterion`.
        let best = self.criterion.best_split(
            data, target, &indices[..], self.input_dim
        );
        // If no split has two non-empty sides, construct a leaf node.
        let Some((rule, _)) = best else {
            return Ok(Node::leaf(category, depth));
        };


        // Split the train data for left/right childrens
        let mut lindices = Vec::new();
        let mut rindices = Vec::new();
        for i in indices {
            match rule.split(&data[i]) {
                LeftRight::Left  => { lindices.push(i); },
                LeftRight::Right => { rindices.push(i); },
            }
        }


        let (left, right) = rayon::join(
            || self.grow(data, target, lindices, depth + 1, cancel),
            || self.grow(data, target, rindices, depth + 1, cancel),
        );

        Ok(Node::branch(rule, left?, right?, depth))
    }


    /// Predict the label of every example in `data`.
    pub fn predict(&self, data: &[Vec<f64>]) -> Result<Vec<Label>> {
        if self.root.is_none() {
            return Err(CartBoostError::NotTrained);
        }
        checker::features(data, self.input_dim)?;
        self.classify_all(data)
    }


    /// Returns the accuracy of the tree on `(data, target)`.
    pub fn evaluate(&self, data: &[Vec<f64>], target: &[Label])
        -> Result<f64>
    {
        self.evaluate_partition(data, target)
            .map(|evaluation| evaluation.accuracy)
    }


    /// Returns the accuracy together with the row indices of
    /// the correctly and incorrectly classified examples.
    pub fn evaluate_partition(&self, data: &[Vec<f64>], target: &[Label])
        -> Result<Evaluation>
    {
        checker::sample(data, target, self.input_dim)?;

        let predictions = self.classify_all(data)?;

        let (correct, mistakes): (Vec<usize>, Vec<usize>) = (0..target.len())
            .partition(|&i| predictions[i] == target[i]);
        let accuracy = utils::accuracy(&predictions, target);

        Ok(Evaluation { accuracy, correct, mistakes })
    }


    /// Returns the tree as a Graphviz `dot` document.
    pub fn to_dot(&self) -> Result<String> {
        let root = self.root.as_ref().ok_or(CartBoostError::NotTrained)?;

        let mut dot = String::from("graph DecisionTree {\n");
        root.to_dot_info(0).0
            .into_iter()
            .for_each(|row| dot.push_str(&row));
        dot.push('}');

        Ok(dot)
    }


    /// Write the current decision tree to dot file.
    #[inline]
    pub fn to_dot_file<P>(&self, path: P) -> Result<()>
        where P: AsRef<Path>
    {
        let dot = self.to_dot()?;
        File::create(path)
            .and_then(|mut f| f.write_all(dot.as_bytes()))
            .map_err(|e| CartBoostError::UnableToWrite(e.to_string()))
    }


    /// Dump the tree as a json object.
    pub fn json_dump(&self) -> Result<String> {
        serde_json::to_string(self)
            .map_err(|e| CartBoostError::UnableToWrite(e.to_string()))
    }


    /// Load a tree from a json string.
    /// A tree that tests a feature outside `0..input_dim` is rejected.
    pub fn from_json(json_str: &str) -> Result<Self> {
        let tree = serde_json::from_str::<Self>(json_str)
            .map_err(|e| CartBoostError::UnableToRead(e.to_string()))?;
        tree.check_loaded()?;
        Ok(tree)
    }


    /// Check the parameters and the split rules of a deserialized tree.
    pub(crate) fn check_loaded(&self) -> Result<()> {
        if self.input_dim == 0 || self.class_num == 0 {
            return Err(CartBoostError::UnableToRead(
                "`input_dim` and `class_num` must be positive".into()
            ));
        }

        let max_feature = self.root.as_ref().and_then(Node::max_feature);
        if let Some(feature) = max_feature.filter(|&f| f >= self.input_dim) {
            return Err(CartBoostError::UnableToRead(format!(
                "a node splits on feature {feature}, \
                but the tree has {} features",
                self.input_dim,
            )));
        }
        Ok(())
    }


    /// Save the tree as json to `path`.
    pub fn save_json<P>(&self, path: P) -> Result<()>
        where P: AsRef<Path>
    {
        let model = self.json_dump()?;
        fs::write(path, model)
            .map_err(|e| CartBoostError::UnableToWrite(e.to_string()))
    }


    /// Load a tree from a json file.
    pub fn load_json<P>(path: P) -> Result<Self>
        where P: AsRef<Path>
    {
        let json_str = fs::read_to_string(path)
            .map_err(|e| CartBoostError::UnableToRead(e.to_string()))?;
        Self::from_json(&json_str)
    }
}


impl PartialEq for DecisionTree {
    fn eq(&self, other: &Self) -> bool {
        self.input_dim == other.input_dim
            && self.class_num == other.class_num
            && self.maximal_depth == other.maximal_depth
            && self.minimal_samples == other.minimal_samples
            && self.criterion == other.criterion
            && self.root == other.root
    }
}


impl Classifier for DecisionTree {
    #[inline]
    fn classify(&self, example: &[f64]) -> Result<Label> {
        let root = self.root.as_ref().ok_or(CartBoostError::NotTrained)?;
        checker::example(example, self.input_dim)?;
        Ok(root.classify(example))
    }
}


impl fmt::Display for DecisionTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "\
            ----------\n\
            # Decision Tree\n\n\
            - Input dim: {}\n\
            - Classes: {}\n\
            - Max depth: {}\n\
            - Min samples: {}\n\
            - Criterion: {}\
            ",
            self.input_dim,
            self.class_num,
            self.maximal_depth,
            self.minimal_samples,
            self.criterion,
        )?;

        match self.root {
            Some(ref root) => writeln!(
                f, "- Trained: {} leaves, height {}", root.leaves(), root.height(),
            )?,
            None => writeln!(f, "- Trained: no")?,
        }

        write!(f, "----------")
    }
}
