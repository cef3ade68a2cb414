//! Subset selection by discrepancy.
//!
//! The subset of size `m` is every observation whose discrepancy does not
//! exceed the `m`-th smallest one. Ties at the threshold are all admitted, so
//! the realized size can exceed `m`. The threshold is found with Quickselect
//! (`select_nth_unstable_by`) on a scratch copy, O(n) on average.

use crate::domain::Subset;

/// Rebuild `subset` from the `m` smallest `scores` and return its size.
///
/// `m` is clamped to `1..=scores.len()`. NaN scores are never selected.
pub fn select_subset(
    scores: &[f64],
    m: usize,
    scratch: &mut Vec<f64>,
    subset: &mut Subset,
) -> usize {
    let n = scores.len();
    if n == 0 {
        return 0;
    }
    let k = m.clamp(1, n) - 1;

    scratch.clear();
    scratch.extend_from_slice(scores);
    let (_, threshold, _) = scratch.select_nth_unstable_by(k, |a, b| a.total_cmp(b));
    let threshold = *threshold;

    subset.assign_with(|i| scores[i] <= threshold);
    subset.len()
}

/// Non-member with the smallest score, if any.
pub fn smallest_outside(scores: &[f64], subset: &Subset) -> Option<usize> {
    scores
        .iter()
        .enumerate()
        .filter(|&(i, d)| !subset.contains(i) && !d.is_nan())
        .min_by(|(_, a), (_, b)| a.total_cmp(b))
        .map(|(i, _)| i)
}
