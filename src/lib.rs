//! # weighted_collection
//!
//! Weighted random sampling over a fixed set of items in O(1) per draw.
//!
//! This crate wraps a compact implementation of
//! [Vose's Alias Method](https://en.wikipedia.org/wiki/Alias_method):
//! an O(n) pass turns a discrete distribution into two parallel arrays,
//! after which every draw costs two random numbers and one branch.
//!
//! There are two collections over the same [`AliasTable`]:
//!
//! 1. [`ImmutableWeightedCollection`]: built once, sampled forever. `Sync`
//!    when the items are, so it can be shared between threads.
//! 2. [`MutableWeightedCollection`]: keeps the raw weight of every item and
//!    rebuilds the whole table on [`set`](MutableWeightedCollection::set) /
//!    [`set_all`](MutableWeightedCollection::set_all).
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use weighted_collection::ImmutableWeightedCollection;
//!
//! # fn main() -> Result<(), weighted_collection::ProbError> {
//! let loot = ImmutableWeightedCollection::from_unnormalized_int_weights([
//!     ("common", 60),
//!     ("uncommon", 30),
//!     ("rare", 9),
//!     ("legendary", 1),
//! ])?;
//!
//! let mut rng = rand::rng();
//! let tier = loot.sample(&mut rng); // &&str
//! println!("you got: {tier}");
//! # Ok(()) }
//! ```
//!
//! ## Changing weights
//!
//! ```rust,ignore
//! use weighted_collection::MutableWeightedCollection;
//!
//! # fn main() -> Result<(), weighted_collection::ProbError> {
//! let mut backends = MutableWeightedCollection::from_unnormalized_weights([
//!     ("10.0.0.1", 1.0),
//!     ("10.0.0.2", 1.0),
//! ])?;
//! backends.set("10.0.0.3", 2.0)?; // now 25% / 25% / 50%
//! let pinned = backends.snapshot(); // unaffected by later updates
//! # Ok(()) }
//! ```
//!
//! ## Enum + macro
//!
//! ```rust,ignore
//! use weighted_collection::WeightedEnum;
//!
//! #[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, WeightedEnum)]
//! enum Loot {
//!     #[weight(60)] Common,
//!     #[weight(30)] Uncommon,
//!     #[weight(9)]  Rare,
//!     #[weight(1)]  Legendary,
//! }
//!
//! # fn main() -> Result<(), weighted_collection::ProbError> {
//! let table = Loot::collection()?;
//! let item = table.sample_owned(&mut rand::rng());
//! # Ok(()) }
//! ```
//!
//! ## Performance
//! * **Build**: O(n) to construct an alias table from weights.
//! * **Sample**: O(1) per draw.
//! * **Update** (mutable only): O(n), a full rebuild.
//!
//! ## Randomness
//! Every sampling call takes the random source as `&mut R where R: rand::Rng`.
//! Pass a seeded generator for reproducible draws, or `rand::rng()` for a
//! thread-local one.

mod error;
mod immutable;
mod mutable;
mod vose;
mod weights;

pub use error::ProbError;
pub use immutable::ImmutableWeightedCollection;
pub use mutable::MutableWeightedCollection;
pub use vose::AliasTable;

/// Derive macro imported from `weighted_collection_macros`.
/// See the crate-level example for usage.
pub use weighted_collection_macros::WeightedEnum;

/// Trait implemented by the `WeightedEnum` derive macro.
///
/// Each variant and its unnormalized weight is exposed via
/// [`WeightedEnum::ENTRIES`], which enables building a ready-to-sample
/// [`ImmutableWeightedCollection`].
pub trait WeightedEnum: Sized + Eq + std::hash::Hash + 'static {
    /// All `(variant, weight)` pairs for the enum.
    const ENTRIES: &'static [(Self, f64)];

    /// Convenience constructor that builds a collection from the enum entries.
    ///
    /// # Errors
    /// See [`ImmutableWeightedCollection::from_unnormalized_weights`].
    fn collection() -> Result<ImmutableWeightedCollection<Self>, ProbError>
    where
        Self: Copy,
    {
        ImmutableWeightedCollection::from_unnormalized_weights(Self::ENTRIES.iter().copied())
    }
}
