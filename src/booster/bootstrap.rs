//! Weighted bootstrap resampling.
use rand::Rng;


/// Draw `n_draw` indices of `dist` with replacement,
/// using `dist` as the categorical probabilities.
///
/// Each draw takes `u ~ Uniform[0, 1)` and returns the first index
/// whose cumulative weight exceeds `u`.
/// The cumulative sums are computed once, so a draw costs `O(log n)`.
/// If rounding leaves `u` above the total mass,
/// the last index with positive weight is returned.
pub(crate) fn resample<R>(dist: &[f64], n_draw: usize, rng: &mut R)
    -> Vec<usize>
    where R: Rng,
{
    let cumulative = dist.iter()
        .scan(0f64, |acc, &d| {
            *acc += d;
            Some(*acc)
        })
        .collect::<Vec<f64>>();

    let last = dist.iter()
        .rposition(|&d| d > 0f64)
        .unwrap_or(dist.len().saturating_sub(1));


    (0..n_draw).map(|_| {
            let u = rng.gen::<f64>();
            cumulative.partition_point(|&c| c <= u).min(last)
        })
        .collect()
}
