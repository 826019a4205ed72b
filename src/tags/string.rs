//! String-based Tag Collection
//!
//! A `SmallVec<[String; 5]>`-based implementation of [`TagCollection`].

use std::{fmt, string::ToString};

use smallvec::SmallVec;

use crate::tags::collection::TagCollection;

/// A sorted, de-duplicated set of string tags.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StringTagCollection {
    tags: SmallVec<[String; 5]>,
}

impl StringTagCollection {
    /// Create a new string tag collection from a vector of strings.
    #[must_use]
    pub fn new(tags: SmallVec<[String; 5]>) -> Self {
        let mut collection = Self { tags };

        collection.tags.sort();
        collection.tags.dedup();

        collection
    }

    /// Create a new string tag collection from string slices.
    pub fn from_strs(tags: &[&str]) -> Self {
        Self::new(
            tags.iter()
                .map(ToString::to_string)
                .collect::<SmallVec<[String; 5]>>(),
        )
    }

    /// Split a comma-delimited tag string such as `"sticker, decal"`.
    ///
    /// Tags are trimmed and blank entries dropped.
    pub fn parse_delimited(tags: &str) -> Self {
        Self::new(
            tags.split(',')
                .map(str::trim)
                .filter(|tag| !tag.is_empty())
                .map(ToString::to_string)
                .collect::<SmallVec<[String; 5]>>(),
        )
    }

    /// Convert the tag collection to a vector of strings.
    #[must_use]
    pub fn to_strs(&self) -> SmallVec<[String; 5]> {
        self.tags.clone()
    }
}

impl TagCollection for StringTagCollection {
    fn empty() -> Self {
        Self {
            tags: SmallVec::with_capacity(0),
        }
    }

    fn contains(&self, tag: &str) -> bool {
        self.tags
            .binary_search_by(|probe| probe.as_str().cmp(tag))
            .is_ok()
    }

    fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    fn len(&self) -> usize {
        self.tags.len()
    }

    fn add(&mut self, tag: &str) {
        if let Err(pos) = self.tags.binary_search_by(|probe| probe.as_str().cmp(tag)) {
            self.tags.insert(pos, tag.to_string());
        }
    }

    fn remove(&mut self, tag: &str) {
        if let Ok(pos) = self.tags.binary_search_by(|probe| probe.as_str().cmp(tag)) {
            self.tags.remove(pos);
        }
    }

    fn iter(&self) -> impl Iterator<Item = &str> {
        self.tags.iter().map(String::as_str)
    }
}

impl fmt::Display for StringTagCollection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.tags.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn string_collection_contains_and_len() {
        let tags = StringTagCollection::from_strs(&["a", "b"]);

        assert!(tags.contains("a"));
        assert!(tags.contains("b"));
        assert!(!tags.contains("c"));
        assert_eq!(tags.len(), 2);
        assert!(!tags.is_empty());
    }

    #[test]
    fn string_collection_maintains_sorted_order() {
        let tags = StringTagCollection::from_strs(&["zebra", "apple", "banana"]);

        // The internal vector should be sorted
        assert_eq!(tags.tags, ["apple", "banana", "zebra"].into());
    }

    #[test]
    fn string_collection_dedups() {
        let tags = StringTagCollection::from_strs(&["a", "a", "b"]);

        assert_eq!(tags.len(), 2);
    }

    #[test]
    fn parse_delimited_trims_and_drops_blanks() {
        let tags = StringTagCollection::parse_delimited(" sticker, decal ,, ");

        assert_eq!(tags.iter().collect::<Vec<_>>(), ["decal", "sticker"]);
    }

    #[test]
    fn parse_delimited_empty_string_is_empty() {
        let tags = StringTagCollection::parse_delimited("");

        assert!(tags.is_empty());
        assert_eq!(tags, StringTagCollection::empty());
    }

    #[test]
    fn add_keeps_sorted_and_ignores_duplicates() {
        let mut tags = StringTagCollection::from_strs(&["b", "d"]);

        tags.add("c");
        tags.add("b");

        assert_eq!(tags.tags, ["b", "c", "d"].into());
    }

    #[test]
    fn remove_drops_existing_tag_only() {
        let mut tags = StringTagCollection::from_strs(&["a", "b"]);

        tags.remove("a");
        tags.remove("missing");

        assert_eq!(tags.tags, ["b"].into());
    }

    #[test]
    fn display_joins_with_commas() {
        let tags = StringTagCollection::parse_delimited("sticker, decal");

        assert_eq!(tags.to_string(), "decal, sticker");
    }
}
