use serde::{Serialize, Deserialize};
use crate::{
    Classifier,
    Label,
    error::{CartBoostError, Result},
};


/// A hypothesis paired with its reliability weight `alpha`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct WeakLearner<H> {
    pub(crate) alpha: f64,
    pub(crate) hypothesis: H,
}


impl<H> WeakLearner<H> {
    /// The reliability weight of this weak learner.
    #[inline]
    pub fn alpha(&self) -> f64 {
        self.alpha
    }


    /// The underlying hypothesis.
    #[inline]
    pub fn hypothesis(&self) -> &H {
        &self.hypothesis
    }
}


/// A weighted vote over an ordered sequence of hypotheses.
/// You can read/write this struct by `Serde` trait.
///
/// An example gets the label with the largest sum of `alpha`
/// over the hypotheses that voted for it.
/// Ties go to the label that was voted first in ensemble order.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct WeightedMajority<H> {
    learners: Vec<WeakLearner<H>>,
}


impl<H> Default for WeightedMajority<H> {
    fn default() -> Self {
        Self { learners: Vec::new() }
    }
}


impl<H> WeightedMajority<H> {
    /// Construct an empty `WeightedMajority`
    /// with room for `capacity` hypotheses.
    #[inline]
    pub fn with_capacity(capacity: usize) -> Self {
        Self { learners: Vec::with_capacity(capacity) }
    }


    /// Append a pair `(alpha, hypothesis)` to the current combined hypothesis.
    #[inline]
    pub fn push(&mut self, alpha: f64, hypothesis: H) {
        self.learners.push(WeakLearner { alpha, hypothesis });
    }


    /// Number of hypotheses.
    #[inline]
    pub fn len(&self) -> usize {
        self.learners.len()
    }


    /// Returns `true` if no hypothesis is stored.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.learners.is_empty()
    }


    /// Iterate over the weak learners in ensemble order.
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &WeakLearner<H>> {
        self.learners.iter()
    }


    /// Decompose the combined hypothesis
    /// into the two vectors `Vec<f64>` and `Vec<H>`
    #[inline]
    pub fn decompose(self) -> (Vec<f64>, Vec<H>) {
        self.learners.into_iter()
            .map(|learner| (learner.alpha, learner.hypothesis))
            .unzip()
    }
}


impl<H> Classifier for WeightedMajority<H>
    where H: Classifier,
{
    fn classify(&self, example: &[f64]) -> Result<Label> {
        if self.learners.is_empty() {
            return Err(CartBoostError::NotTrained);
        }


        // `(label, accumulated alpha)` in the order of the first vote.
        let mut votes: Vec<(Label, f64)> = Vec::new();
        for learner in self.learners.iter() {
            let y = learner.hypothesis.classify(example)?;
            match votes.iter_mut().find(|(l, _)| *l == y) {
                Some((_, w)) => { *w += learner.alpha; },
                None => { votes.push((y, learner.alpha)); },
            }
        }


        let (label, _) = votes.into_iter()
            .fold(None, |best: Option<(Label, f64)>, (y, w)| {
                match best {
                    Some((_, b)) if b >= w => best,
                    _ => Some((y, w)),
                }
            })
            .ok_or(CartBoostError::NotTrained)?;

        Ok(label)
    }
}
