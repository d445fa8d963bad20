use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;

use rand::Rng;
use tracing::debug;

use crate::error::ProbError;
use crate::vose::AliasTable;
use crate::weights;

/// Authoritative item -> raw weight mapping, kept across rebuilds.
///
/// Raw weights are stored, not the last normalized probabilities, so every
/// rebuild renormalizes against the exact current total.
#[derive(Debug, Clone)]
struct WeightSet<T> {
    items: Vec<T>,
    weights: Vec<f64>,
    index: HashMap<T, usize>,
}

impl<T: Eq + Hash + Clone> WeightSet<T> {
    fn new(items: Vec<T>, weights: Vec<f64>) -> Self {
        let index = items
            .iter()
            .enumerate()
            .map(|(i, item)| (item.clone(), i))
            .collect();
        Self {
            items,
            weights,
            index,
        }
    }

    /// Validate `updates` merged over the current weights, then commit them.
    /// Returns the normalized probabilities of the merged set.
    ///
    /// Nothing is written unless the merged set is valid.
    fn merge(&mut self, updates: Vec<(T, f64)>) -> Result<Vec<f64>, ProbError> {
        let (items, values) = weights::fold_pairs(updates);
        weights::checked_sum(&values)?;

        let mut merged = self.weights.clone();
        let mut fresh = Vec::new();
        for (item, weight) in items.into_iter().zip(values) {
            match self.index.get(&item) {
                Some(&slot) => merged[slot] = weight,
                None => {
                    merged.push(weight);
                    fresh.push(item);
                }
            }
        }
        let probabilities = weights::normalize(&merged)?;

        for item in fresh {
            self.index.insert(item.clone(), self.items.len());
            self.items.push(item);
        }
        self.weights = merged;
        Ok(probabilities)
    }
}

/// A weighted collection whose weights can be changed after construction.
///
/// Each update rebuilds the whole [`AliasTable`] from the full weight set
/// (O(n)) and swaps it in. Updates take `&mut self`; readers that must keep
/// sampling while the owner mutates can hold a [`snapshot`](Self::snapshot).
#[derive(Debug, Clone)]
pub struct MutableWeightedCollection<T> {
    weights: WeightSet<T>,
    table: Arc<AliasTable<T>>,
}

impl<T: Eq + Hash + Clone> MutableWeightedCollection<T> {
    /// Build from `(item, weight)` pairs of non-negative reals.
    ///
    /// # Errors
    /// * [`ProbError::Empty`] if there are no pairs.
    /// * [`ProbError::Negative`] / [`ProbError::NonFinite`] for a bad weight.
    /// * [`ProbError::ZeroSum`] if the weights sum to zero.
    /// * [`ProbError::SumNotFinite`] if the weights overflow when summed.
    pub fn from_unnormalized_weights<I>(pairs: I) -> Result<Self, ProbError>
    where
        I: IntoIterator<Item = (T, f64)>,
    {
        let (items, weights) = weights::fold_pairs(pairs);
        let probabilities = weights::normalize(&weights)?;
        Ok(Self::assemble(items, weights, probabilities))
    }

    /// Integer-weight counterpart of
    /// [`from_unnormalized_weights`](Self::from_unnormalized_weights).
    pub fn from_unnormalized_int_weights<I>(pairs: I) -> Result<Self, ProbError>
    where
        I: IntoIterator<Item = (T, u64)>,
    {
        let (items, weights) = weights::fold_pairs(pairs);
        let probabilities = weights::normalize_ints(&weights)?;
        let weights = weights.into_iter().map(|w| w as f64).collect();
        Ok(Self::assemble(items, weights, probabilities))
    }

    /// Build from a set of items and positionally matching probabilities.
    ///
    /// # Errors
    /// * [`ProbError::Empty`] if either side is empty.
    /// * [`ProbError::LengthMismatch`] if the counts differ.
    /// * [`ProbError::SumExceedsOne`] if the probabilities sum past 1.
    pub fn new<I, P>(items: I, probabilities: P) -> Result<Self, ProbError>
    where
        I: IntoIterator<Item = T>,
        P: IntoIterator<Item = f64>,
    {
        let items: Vec<T> = items.into_iter().collect();
        let probabilities: Vec<f64> = probabilities.into_iter().collect();
        weights::check_shape(items.len(), probabilities.len())?;
        Self::from_probabilities(items.into_iter().zip(probabilities))
    }

    /// Build from `(item, probability)` pairs that are already normalized.
    ///
    /// The probabilities become the initial weights. A sum below 1 is
    /// rescaled to 1 like any other weight set. An all-zero set is built as
    /// given, which leaves every slot certain of its own item.
    pub fn from_probabilities<I>(pairs: I) -> Result<Self, ProbError>
    where
        I: IntoIterator<Item = (T, f64)>,
    {
        let (items, weights) = weights::fold_pairs(pairs);
        let sum = weights::check_probabilities(&weights)?;
        let probabilities = if sum == 0.0 {
            weights.clone()
        } else {
            weights::normalize(&weights)?
        };
        Ok(Self::assemble(items, weights, probabilities))
    }

    fn assemble(items: Vec<T>, weights: Vec<f64>, probabilities: Vec<f64>) -> Self {
        let table = Arc::new(AliasTable::from_parts(items.clone(), probabilities));
        Self {
            weights: WeightSet::new(items, weights),
            table,
        }
    }

    /// Assign `weight` to `item`, inserting it if absent, then rebuild.
    ///
    /// # Errors
    /// * [`ProbError::Negative`] / [`ProbError::NonFinite`] for a bad weight.
    /// * [`ProbError::ZeroSum`] if the update leaves every weight at zero.
    /// * [`ProbError::SumNotFinite`] if the merged weights overflow when summed.
    ///
    /// On error the collection is unchanged.
    pub fn set(&mut self, item: T, weight: f64) -> Result<(), ProbError> {
        self.set_all([(item, weight)])
    }

    /// Assign several weights at once with a single rebuild.
    ///
    /// Items given more than once take their last weight.
    pub fn set_all<I>(&mut self, pairs: I) -> Result<(), ProbError>
    where
        I: IntoIterator<Item = (T, f64)>,
    {
        let updates: Vec<(T, f64)> = pairs.into_iter().collect();
        let updated = updates.len();
        let probabilities = self.weights.merge(updates)?;
        self.table = Arc::new(AliasTable::from_parts(
            self.weights.items.clone(),
            probabilities,
        ));
        debug!(updated, slots = self.table.len(), "rebuilt weighted collection");
        Ok(())
    }

    /// Current raw weight of `item`.
    pub fn weight(&self, item: &T) -> Option<f64> {
        let &slot = self.weights.index.get(item)?;
        Some(self.weights.weights[slot])
    }

    /// Normalized probability of `item` under the current weights.
    ///
    /// An all-zero weight set (only reachable through the probability
    /// constructors) reports what the table actually draws.
    pub fn probability(&self, item: &T) -> Option<f64> {
        let &slot = self.weights.index.get(item)?;
        let total: f64 = self.weights.weights.iter().sum();
        if total == 0.0 {
            return Some(self.table.probability(slot));
        }
        Some(self.weights.weights[slot] / total)
    }
}

impl<T> MutableWeightedCollection<T> {
    /// Sample an item **by reference** from the current table in O(1).
    pub fn sample<'a, R: Rng + ?Sized>(&'a self, rng: &mut R) -> &'a T {
        self.table.sample(rng)
    }

    /// Sample an item **by value** (clones the chosen element).
    pub fn sample_owned<R: Rng + ?Sized>(&self, rng: &mut R) -> T
    where
        T: Clone,
    {
        self.table.sample_owned(rng)
    }

    /// `(item, raw weight)` pairs in slot order.
    pub fn weights(&self) -> impl Iterator<Item = (&T, f64)> + '_ {
        self.weights
            .items
            .iter()
            .zip(self.weights.weights.iter().copied())
    }

    /// Items in slot order.
    pub fn items(&self) -> &[T] {
        &self.weights.items
    }

    /// The current compiled table.
    pub fn table(&self) -> &AliasTable<T> {
        &self.table
    }

    /// Shared handle to the current table. It stays valid, and unchanged,
    /// across later updates to this collection.
    pub fn snapshot(&self) -> Arc<AliasTable<T>> {
        Arc::clone(&self.table)
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{SeedableRng, rngs::StdRng};

    fn abcd() -> MutableWeightedCollection<&'static str> {
        MutableWeightedCollection::new(["A", "B", "C", "D"], [0.5, 0.25, 0.125, 0.125]).unwrap()
    }

    #[test]
    fn constructor_errors_match_immutable() {
        let err = MutableWeightedCollection::new(["A", "B"], [0.7, 0.7]).unwrap_err();
        assert_eq!(err.to_string(), "Probabilities sum to greater than 1");

        let err = MutableWeightedCollection::new(["A", "B", "C"], [0.5, 0.5]).unwrap_err();
        assert_eq!(err.to_string(), "Items and probabilities must be the same size");

        let err =
            MutableWeightedCollection::<&str>::from_unnormalized_weights(Vec::new()).unwrap_err();
        assert_eq!(err.to_string(), "Items cannot be empty.");
    }

    #[test]
    fn all_zero_probabilities_accepted() {
        let mut wc = MutableWeightedCollection::new(["A", "B"], [0.0, 0.0]).unwrap();
        assert_eq!(wc.len(), 2);
        assert_eq!(wc.table().probabilities(), &[1.0, 1.0]);
        assert_eq!(wc.probability(&"A"), Some(0.5));

        let mut rng = StdRng::seed_from_u64(5);
        let mut seen = std::collections::HashSet::new();
        for _ in 0..1000 {
            seen.insert(*wc.sample(&mut rng));
        }
        assert_eq!(seen.len(), 2);

        // later updates renormalize against the stored zero weights
        wc.set("B", 2.0).unwrap();
        assert_eq!(wc.probability(&"B"), Some(1.0));
        assert_eq!(wc.probability(&"A"), Some(0.0));
    }

    #[test]
    fn set_overwrites_and_renormalizes_exactly() {
        let mut wc = abcd();
        wc.set("A", 0.125).unwrap();
        // raw weights now 0.125, 0.25, 0.125, 0.125
        assert_eq!(wc.weight(&"A"), Some(0.125));
        assert_eq!(wc.probability(&"A"), Some(0.2));
        assert_eq!(wc.probability(&"B"), Some(0.4));
        assert!((wc.table().probability(1) - 0.4).abs() < 1e-12);
    }

    #[test]
    fn repeated_updates_do_not_drift() {
        let mut wc = MutableWeightedCollection::from_unnormalized_weights([
            ("A", 1.0),
            ("B", 2.0),
            ("C", 3.0),
        ])
        .unwrap();
        for w in [10.0, 0.5, 7.0, 3.0, 1.0] {
            wc.set("A", w).unwrap();
        }
        let pb = wc.table().probability(1);
        let pc = wc.table().probability(2);
        assert!((pc / pb - 1.5).abs() < 1e-9, "pb={pb} pc={pc}");
        assert!((wc.table().probability(0) - 1.0 / 6.0).abs() < 1e-12);
    }

    #[test]
    fn set_inserts_new_items() {
        let mut wc = abcd();
        wc.set("E", 1.0).unwrap();
        assert_eq!(wc.len(), 5);
        assert_eq!(wc.items(), &["A", "B", "C", "D", "E"]);
        assert_eq!(wc.probability(&"E"), Some(0.5));
    }

    #[test]
    fn invalid_update_leaves_collection_unchanged() {
        let mut wc = MutableWeightedCollection::from_unnormalized_weights([("A", 1.0)]).unwrap();
        let before = wc.table().clone();

        assert!(matches!(
            wc.set("B", -1.0),
            Err(ProbError::Negative { index: 0, .. })
        ));
        assert_eq!(wc.set("A", 0.0), Err(ProbError::ZeroSum));
        assert!(matches!(
            wc.set_all([("A", 2.0), ("C", f64::NAN)]),
            Err(ProbError::NonFinite { index: 1, .. })
        ));

        assert_eq!(wc.len(), 1);
        assert_eq!(wc.weight(&"A"), Some(1.0));
        assert_eq!(wc.weight(&"B"), None);
        assert_eq!(wc.table(), &before);
    }

    #[test]
    fn overflowing_update_rejected() {
        let mut wc = MutableWeightedCollection::from_unnormalized_weights([("A", f64::MAX)]).unwrap();
        assert!(matches!(
            wc.set("B", f64::MAX),
            Err(ProbError::SumNotFinite { .. })
        ));
        assert_eq!(wc.len(), 1);
    }

    #[test]
    fn set_all_is_idempotent() {
        let mut wc = abcd();
        let update = [("B", 3.0), ("D", 0.5), ("F", 2.0)];
        wc.set_all(update).unwrap();
        let first = wc.table().clone();
        wc.set_all(update).unwrap();
        assert_eq!(wc.table().probabilities(), first.probabilities());
        assert_eq!(wc.table().aliases(), first.aliases());
    }

    #[test]
    fn snapshot_survives_updates() {
        let mut wc = MutableWeightedCollection::from_unnormalized_weights([("A", 1.0), ("B", 0.0)])
            .unwrap();
        let old = wc.snapshot();
        wc.set_all([("A", 0.0), ("B", 1.0)]).unwrap();

        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..1000 {
            assert_eq!(*old.sample(&mut rng), "A");
            assert_eq!(*wc.sample(&mut rng), "B");
        }
    }

    #[test]
    fn weights_iterates_in_slot_order() {
        let wc = MutableWeightedCollection::from_unnormalized_int_weights([("x", 3), ("y", 1)])
            .unwrap();
        let pairs: Vec<_> = wc.weights().collect();
        assert_eq!(pairs, [(&"x", 3.0), (&"y", 1.0)]);
    }
}
