//! Tag Collection

use std::fmt;

/// Trait for the tag sets attached to products.
pub trait TagCollection: Clone + fmt::Debug + PartialEq {
    /// Create an empty collection.
    fn empty() -> Self;

    /// Check if this collection contains a specific tag (exact match).
    fn contains(&self, tag: &str) -> bool;

    /// Check if this collection is empty.
    fn is_empty(&self) -> bool;

    /// Get the number of tags in this collection.
    fn len(&self) -> usize;

    /// Add a tag to this collection.
    fn add(&mut self, tag: &str);

    /// Remove a tag from this collection.
    fn remove(&mut self, tag: &str);

    /// Iterate over the tags.
    fn iter(&self) -> impl Iterator<Item = &str>;
}
