use std::hash::Hash;

use rand::Rng;

use crate::error::ProbError;
use crate::vose::AliasTable;
use crate::weights;

/// A read-only weighted collection: one [`AliasTable`] built at construction
/// and never changed afterwards.
///
/// Sampling takes `&self` and an injected random source, so a single
/// collection can be shared across threads (`T: Sync`) with one RNG per thread.
#[derive(Debug, Clone)]
pub struct ImmutableWeightedCollection<T> {
    table: AliasTable<T>,
}

impl<T: Eq + Hash> ImmutableWeightedCollection<T> {
    /// Build from `(item, weight)` pairs where weights are any non-negative
    /// reals; they are divided by their sum before the table is built.
    ///
    /// Equal items share one slot and the last weight given wins.
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
        Ok(Self {
            table: AliasTable::from_parts(items, probabilities),
        })
    }

    /// Integer-weight counterpart of
    /// [`from_unnormalized_weights`](Self::from_unnormalized_weights).
    pub fn from_unnormalized_int_weights<I>(pairs: I) -> Result<Self, ProbError>
    where
        I: IntoIterator<Item = (T, u64)>,
    {
        let (items, weights) = weights::fold_pairs(pairs);
        let probabilities = weights::normalize_ints(&weights)?;
        Ok(Self {
            table: AliasTable::from_parts(items, probabilities),
        })
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
    pub fn from_probabilities<I>(pairs: I) -> Result<Self, ProbError>
    where
        I: IntoIterator<Item = (T, f64)>,
    {
        let (items, probabilities) = weights::fold_pairs(pairs);
        Ok(Self {
            table: AliasTable::build(items, probabilities)?,
        })
    }

    /// Probability that `item` is drawn, read back from the table. O(n).
    pub fn probability(&self, item: &T) -> Option<f64> {
        let index = self.table.items().iter().position(|x| x == item)?;
        Some(self.table.probability(index))
    }
}

impl<T> ImmutableWeightedCollection<T> {
    /// Sample an item **by reference** in O(1).
    ///
    /// # Examples
    /// ```rust,ignore
    /// # use weighted_collection::ImmutableWeightedCollection;
    /// # let wc = ImmutableWeightedCollection::from_unnormalized_weights([("a", 1.0), ("b", 3.0)]).unwrap();
    /// let mut rng = rand::rng();
    /// let s = wc.sample(&mut rng); // &&str
    /// ```
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

    /// Items in slot order.
    pub fn items(&self) -> &[T] {
        self.table.items()
    }

    /// The compiled table.
    pub fn table(&self) -> &AliasTable<T> {
        &self.table
    }

    pub fn into_table(self) -> AliasTable<T> {
        self.table
    }

    /// Number of distinct items.
    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// Always `false` for a constructed collection.
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{SeedableRng, rngs::StdRng};
    use std::collections::HashMap;

    #[test]
    fn rejects_shape_errors() {
        let err = ImmutableWeightedCollection::new(Vec::<&str>::new(), [0.5, 0.25, 0.125, 0.125])
            .unwrap_err();
        assert_eq!(err.to_string(), "Items cannot be empty.");

        let err = ImmutableWeightedCollection::new(["A", "B", "C", "D"], Vec::<f64>::new()).unwrap_err();
        assert_eq!(err.to_string(), "Items cannot be empty.");

        let err = ImmutableWeightedCollection::new(
            ["A", "B", "C", "D", "E"],
            [0.5, 0.33333, 0.083333, 0.083333],
        )
        .unwrap_err();
        assert_eq!(err.to_string(), "Items and probabilities must be the same size");
    }

    #[test]
    fn rejects_probabilities_over_one() {
        let err =
            ImmutableWeightedCollection::new(["A", "B", "C", "D"], [0.5, 0.33333, 0.083333, 0.183333])
                .unwrap_err();
        assert_eq!(err.to_string(), "Probabilities sum to greater than 1");
    }

    #[test]
    fn rejects_empty_and_zero_maps() {
        let empty: HashMap<&str, f64> = HashMap::new();
        let err = ImmutableWeightedCollection::from_unnormalized_weights(empty).unwrap_err();
        assert_eq!(err.to_string(), "Items cannot be empty.");

        let empty: HashMap<&str, u64> = HashMap::new();
        assert_eq!(
            ImmutableWeightedCollection::from_unnormalized_int_weights(empty).unwrap_err(),
            ProbError::Empty
        );

        assert_eq!(
            ImmutableWeightedCollection::from_unnormalized_weights([("a", 0.0)]).unwrap_err(),
            ProbError::ZeroSum
        );
    }

    #[test]
    fn unnormalized_weights_are_normalized() {
        let wc = ImmutableWeightedCollection::from_unnormalized_weights([
            ("A", 50.0),
            ("B", 25.0),
            ("C", 12.5),
            ("D", 12.5),
        ])
        .unwrap();
        assert_eq!(wc.probability(&"A"), Some(0.5));
        assert_eq!(wc.probability(&"C"), Some(0.125));
        assert_eq!(wc.probability(&"Z"), None);

        let ints = ImmutableWeightedCollection::from_unnormalized_int_weights([
            ("A", 100),
            ("B", 50),
            ("C", 25),
            ("D", 25),
        ])
        .unwrap();
        assert_eq!(ints.table(), wc.table());
    }

    #[test]
    fn duplicate_items_share_a_slot() {
        let wc =
            ImmutableWeightedCollection::from_unnormalized_weights([("a", 1.0), ("b", 1.0), ("a", 2.0)])
                .unwrap();
        assert_eq!(wc.len(), 2);
        assert_eq!(wc.items(), &["a", "b"]);
        let pa = wc.probability(&"a").unwrap();
        assert!((pa - 2.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn samples_come_from_input() {
        let wc = ImmutableWeightedCollection::new(["x", "y", "z"], [0.2, 0.3, 0.5]).unwrap();
        let mut rng = StdRng::seed_from_u64(3);
        let mut seen = HashMap::new();
        for _ in 0..10_000 {
            *seen.entry(wc.sample_owned(&mut rng)).or_insert(0usize) += 1;
        }
        let mut keys: Vec<_> = seen.keys().copied().collect();
        keys.sort_unstable();
        assert_eq!(keys, ["x", "y", "z"]);
    }

    #[test]
    fn shared_across_threads() {
        let wc = ImmutableWeightedCollection::from_unnormalized_int_weights([(1u32, 3), (2, 1)])
            .unwrap();
        std::thread::scope(|s| {
            for seed in 0..4u64 {
                let wc = &wc;
                s.spawn(move || {
                    let mut rng = StdRng::seed_from_u64(seed);
                    for _ in 0..1000 {
                        assert!(matches!(*wc.sample(&mut rng), 1 | 2));
                    }
                });
            }
        });
    }
}
