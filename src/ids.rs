//! Identifiers
//!
//! Typed numeric identifiers for shop records, and [`IdList`], the parsed form of the
//! comma-separated ID strings discounts use to name applicable products and eligible customers.

use std::{fmt, str::FromStr};

use serde::Deserialize;
use smallvec::SmallVec;
use thiserror::Error;

macro_rules! id_type {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize)]
        #[serde(transparent)]
        pub struct $name(u32);

        impl $name {
            /// Create an identifier from its raw value.
            #[must_use]
            pub const fn new(value: u32) -> Self {
                Self(value)
            }

            /// Raw numeric value.
            #[must_use]
            pub const fn get(self) -> u32 {
                self.0
            }
        }

        impl From<u32> for $name {
            fn from(value: u32) -> Self {
                Self(value)
            }
        }

        impl From<$name> for u32 {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

id_type! {
    /// Product identifier
    ProductId
}

id_type! {
    /// Product type identifier
    ProductTypeId
}

id_type! {
    /// Collection identifier
    CollectionId
}

id_type! {
    /// Customer identifier
    CustomerId
}

id_type! {
    /// Customer group identifier
    CustomerGroupId
}

id_type! {
    /// Discount identifier
    DiscountId
}

id_type! {
    /// Order identifier
    OrderId
}

id_type! {
    /// Payment identifier
    PaymentId
}

/// Errors raised while parsing an ID list.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum IdListError {
    /// A list entry was not a non-negative integer.
    #[error("invalid id {token:?} in list {input:?}")]
    InvalidId {
        /// The offending entry, trimmed
        token: String,

        /// The full input string
        input: String,
    },
}

/// A set of IDs parsed once from a comma-separated string such as `"1, 3"`.
///
/// Entries are trimmed, empty entries are ignored, and the set is kept sorted and free of
/// duplicates so membership tests are a binary search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdList<I> {
    ids: SmallVec<[I; 8]>,
}

impl<I> Default for IdList<I> {
    fn default() -> Self {
        Self {
            ids: SmallVec::new(),
        }
    }
}

impl<I> IdList<I>
where
    I: Copy + Ord + From<u32>,
{
    /// Create a list from already-parsed IDs.
    pub fn new(ids: impl IntoIterator<Item = I>) -> Self {
        let mut ids: SmallVec<[I; 8]> = ids.into_iter().collect();

        ids.sort_unstable();
        ids.dedup();

        Self { ids }
    }

    /// Parse a comma-separated list of IDs.
    ///
    /// # Errors
    ///
    /// Returns [`IdListError::InvalidId`] if an entry is not a non-negative integer.
    pub fn parse(input: &str) -> Result<Self, IdListError> {
        let ids = input
            .split(',')
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .map(|token| {
                token
                    .parse::<u32>()
                    .map(I::from)
                    .map_err(|_err| IdListError::InvalidId {
                        token: token.to_string(),
                        input: input.to_string(),
                    })
            })
            .collect::<Result<SmallVec<[I; 8]>, _>>()?;

        Ok(Self::new(ids))
    }

    /// Check whether the list contains an ID.
    pub fn contains(&self, id: I) -> bool {
        self.ids.binary_search(&id).is_ok()
    }

    /// Number of distinct IDs.
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Check whether the list is empty.
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Iterate over the IDs in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = I> + '_ {
        self.ids.iter().copied()
    }
}

impl<I> FromStr for IdList<I>
where
    I: Copy + Ord + From<u32>,
{
    type Err = IdListError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl<I: fmt::Display> fmt::Display for IdList<I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, id) in self.ids.iter().enumerate() {
            if idx > 0 {
                f.write_str(", ")?;
            }

            write!(f, "{id}")?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    #[test]
    fn parse_trims_whitespace() -> TestResult {
        let ids: IdList<ProductId> = IdList::parse("1, 3")?;

        assert_eq!(ids.len(), 2);
        assert!(ids.contains(ProductId::new(1)));
        assert!(ids.contains(ProductId::new(3)));
        assert!(!ids.contains(ProductId::new(2)));

        Ok(())
    }

    #[test]
    fn parse_tolerates_padding_and_empty_entries() -> TestResult {
        let ids: IdList<CustomerId> = IdList::parse("  2 ,, 7 ,")?;

        assert_eq!(ids.iter().collect::<Vec<_>>(), [CustomerId::new(2), CustomerId::new(7)]);

        Ok(())
    }

    #[test]
    fn parse_empty_string_is_empty_list() -> TestResult {
        let ids: IdList<CustomerId> = IdList::parse("")?;

        assert!(ids.is_empty());

        Ok(())
    }

    #[test]
    fn parse_sorts_and_dedups() -> TestResult {
        let ids: IdList<ProductId> = "5,1,5,3".parse()?;

        assert_eq!(ids.to_string(), "1, 3, 5");

        Ok(())
    }

    #[test]
    fn parse_rejects_non_numeric_entries() {
        let result: Result<IdList<ProductId>, _> = IdList::parse("1, x");

        assert_eq!(
            result,
            Err(IdListError::InvalidId {
                token: "x".to_string(),
                input: "1, x".to_string(),
            })
        );
    }

    #[test]
    fn parse_rejects_negative_ids() {
        let result: Result<IdList<ProductId>, _> = IdList::parse("-1");

        assert!(matches!(result, Err(IdListError::InvalidId { .. })));
    }

    #[test]
    fn reparsing_display_output_keeps_membership() -> TestResult {
        let ids: IdList<ProductId> = IdList::parse(" 3,1 ")?;
        let reparsed: IdList<ProductId> = IdList::parse(&ids.to_string())?;

        assert_eq!(ids, reparsed);

        Ok(())
    }
}
