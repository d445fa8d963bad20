//! Vose's Alias Method for O(1) sampling from a discrete distribution.

use rand::Rng;
use tracing::debug;

use crate::error::ProbError;
use crate::weights;

/// Compiled sampling structure: one slot per item, each slot holding an
/// acceptance probability for its own item and the index of a fallback item.
///
/// Tables are never patched in place. Changing the distribution means
/// building a new table.
#[derive(Debug, Clone, PartialEq)]
pub struct AliasTable<T> {
    prob: Vec<f64>,
    alias: Vec<usize>,
    items: Vec<T>,
}

impl<T> AliasTable<T> {
    /// Build from items paired positionally with probabilities. O(n).
    ///
    /// Probabilities must be non-negative and sum to at most 1. They are used
    /// as given; missing mass below 1 is absorbed by the drain step rather
    /// than rescaled.
    ///
    /// # Errors
    /// * [`ProbError::Empty`] if either side is empty.
    /// * [`ProbError::LengthMismatch`] if the counts differ.
    /// * [`ProbError::Negative`] / [`ProbError::NonFinite`] for a bad value.
    /// * [`ProbError::SumExceedsOne`] if the probabilities sum past 1.
    pub fn build(items: Vec<T>, probabilities: Vec<f64>) -> Result<Self, ProbError> {
        weights::check_shape(items.len(), probabilities.len())?;
        weights::check_probabilities(&probabilities)?;
        Ok(Self::from_parts(items, probabilities))
    }

    /// Bucket building over already validated, equally sized, non-empty input.
    ///
    /// Worklists are stacks: the most recently pushed index is paired first,
    /// so a given input order always yields the same table.
    pub(crate) fn from_parts(items: Vec<T>, mut probabilities: Vec<f64>) -> Self {
        debug_assert_eq!(items.len(), probabilities.len());
        debug_assert!(!items.is_empty());

        let n = probabilities.len();
        let average = 1.0 / n as f64;

        let mut prob = vec![0.0f64; n];
        let mut alias = (0..n).collect::<Vec<_>>();

        let mut small = Vec::with_capacity(n);
        let mut large = Vec::with_capacity(n);

        for (i, &p) in probabilities.iter().enumerate() {
            if p >= average {
                large.push(i);
            } else {
                small.push(i);
            }
        }

        while !small.is_empty() && !large.is_empty() {
            let (Some(l), Some(g)) = (small.pop(), large.pop()) else {
                break;
            };

            prob[l] = probabilities[l] * n as f64; // in [0,1)
            alias[l] = g;

            probabilities[g] = (probabilities[g] + probabilities[l]) - average;

            if probabilities[g] >= average {
                large.push(g);
            } else {
                small.push(g);
            }
        }

        // Leftovers keep their own item with certainty; alias stays the identity.
        let drained = small.len() + large.len();
        for i in small.into_iter().chain(large) {
            prob[i] = 1.0;
        }

        debug!(slots = n, drained, "built alias table");
        Self { prob, alias, items }
    }

    /// Draw a slot index in O(1): one uniform column, one uniform coin.
    #[inline]
    pub fn sample_index<R: Rng + ?Sized>(&self, rng: &mut R) -> usize {
        let column = rng.random_range(0..self.prob.len());
        let coin: f64 = rng.random();
        if coin < self.prob[column] {
            column
        } else {
            self.alias[column]
        }
    }

    /// Sample an item by reference.
    #[inline]
    pub fn sample<'a, R: Rng + ?Sized>(&'a self, rng: &mut R) -> &'a T {
        &self.items[self.sample_index(rng)]
    }

    /// Sample an item by value (clones the chosen element).
    #[inline]
    pub fn sample_owned<R: Rng + ?Sized>(&self, rng: &mut R) -> T
    where
        T: Clone,
    {
        self.items[self.sample_index(rng)].clone()
    }

    /// Probability that [`sample_index`](Self::sample_index) returns `index`,
    /// reconstructed from the table. O(n).
    pub fn probability(&self, index: usize) -> f64 {
        let n = self.prob.len();
        if index >= n {
            return 0.0;
        }
        let fallback: f64 = (0..n)
            .filter(|&j| j != index && self.alias[j] == index)
            .map(|j| 1.0 - self.prob[j])
            .sum();
        (self.prob[index] + fallback) / n as f64
    }

    /// Per-slot acceptance probabilities.
    pub fn probabilities(&self) -> &[f64] {
        &self.prob
    }

    /// Per-slot fallback indices.
    pub fn aliases(&self) -> &[usize] {
        &self.alias
    }

    /// Items in slot order.
    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        self.items.get(index)
    }

    pub fn len(&self) -> usize {
        self.prob.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prob.is_empty()
    }

    /// Draw k samples, returning counts per index (useful for checks).
    #[cfg(test)]
    pub(crate) fn sample_counts<R: Rng + ?Sized>(&self, rng: &mut R, draws: usize) -> Vec<usize> {
        let mut counts = vec![0usize; self.prob.len()];
        for _ in 0..draws {
            counts[self.sample_index(rng)] += 1;
        }
        counts
    }
}
