//! Validation and normalization of caller-supplied weights.

use std::collections::HashMap;
use std::hash::Hash;

use crate::error::ProbError;

/// Split `(item, value)` pairs into parallel vectors, folding equal items
/// into a single slot.
///
/// The first occurrence of an item fixes its slot; the last occurrence
/// supplies its value, the same as repeated inserts into a map.
pub(crate) fn fold_pairs<T, W, I>(pairs: I) -> (Vec<T>, Vec<W>)
where
    T: Eq + Hash,
    W: Copy,
    I: IntoIterator<Item = (T, W)>,
{
    let (items, mut values): (Vec<T>, Vec<W>) = pairs.into_iter().unzip();
    let mut keep = vec![true; items.len()];
    let mut folded = false;

    {
        let mut first: HashMap<&T, usize> = HashMap::with_capacity(items.len());
        for (i, item) in items.iter().enumerate() {
            match first.get(item) {
                Some(&slot) => {
                    values[slot] = values[i];
                    keep[i] = false;
                    folded = true;
                }
                None => {
                    first.insert(item, i);
                }
            }
        }
    }

    if !folded {
        return (items, values);
    }
    items
        .into_iter()
        .zip(values)
        .zip(keep)
        .filter_map(|(pair, keep)| keep.then_some(pair))
        .unzip()
}

/// Items and probabilities given positionally must both be present and line up.
pub(crate) fn check_shape(items: usize, probabilities: usize) -> Result<(), ProbError> {
    if items == 0 || probabilities == 0 {
        return Err(ProbError::Empty);
    }
    if items != probabilities {
        return Err(ProbError::LengthMismatch {
            items,
            probabilities,
        });
    }
    Ok(())
}

/// Reject negative and non-finite values; returns the sum.
pub(crate) fn checked_sum(values: &[f64]) -> Result<f64, ProbError> {
    let mut sum = 0.0f64;
    for (index, &value) in values.iter().enumerate() {
        if !value.is_finite() {
            return Err(ProbError::NonFinite { index, value });
        }
        if value < 0.0 {
            return Err(ProbError::Negative { index, value });
        }
        sum += value;
    }
    Ok(sum)
}

/// Values that claim to already be probabilities: non-empty, non-negative,
/// and summing to at most 1. A sum below 1 is accepted as is.
pub(crate) fn check_probabilities(values: &[f64]) -> Result<f64, ProbError> {
    if values.is_empty() {
        return Err(ProbError::Empty);
    }
    let sum = checked_sum(values)?;
    if sum > 1.0 {
        return Err(ProbError::SumExceedsOne { sum });
    }
    Ok(sum)
}

/// Scale non-negative weights so they sum to 1.
pub(crate) fn normalize(weights: &[f64]) -> Result<Vec<f64>, ProbError> {
    if weights.is_empty() {
        return Err(ProbError::Empty);
    }
    let sum = checked_sum(weights)?;
    if !sum.is_finite() {
        return Err(ProbError::SumNotFinite { sum });
    }
    if sum == 0.0 {
        return Err(ProbError::ZeroSum);
    }
    Ok(weights.iter().map(|&w| w / sum).collect())
}

/// Integer weights are summed exactly, then promoted through the same division.
pub(crate) fn normalize_ints(weights: &[u64]) -> Result<Vec<f64>, ProbError> {
    if weights.is_empty() {
        return Err(ProbError::Empty);
    }
    let sum: u128 = weights.iter().map(|&w| u128::from(w)).sum();
    if sum == 0 {
        return Err(ProbError::ZeroSum);
    }
    let sum = sum as f64;
    Ok(weights.iter().map(|&w| w as f64 / sum).collect())
}
