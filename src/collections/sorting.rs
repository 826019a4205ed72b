//! Collection Sort Orders

use std::cmp::Ordering;

use serde::Deserialize;

use crate::{collections::collation::Collation, products::Product, tags::collection::TagCollection};

/// Presentational order of a collection's products.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    /// Title, ascending
    #[default]
    AToZ,

    /// Title, descending
    ZToA,

    /// Price, descending
    HighestPrice,

    /// Price, ascending
    LowestPrice,

    /// Match order
    Manual,
}

impl SortOrder {
    /// Sort matched products in place. The sort is stable, so ties keep match order.
    pub fn sort<T, C>(self, products: &mut [&Product<'_, T>], collation: &C)
    where
        T: TagCollection,
        C: Collation + ?Sized,
    {
        match self {
            Self::AToZ => products.sort_by(|a, b| collation.compare(&a.title, &b.title)),
            Self::ZToA => products.sort_by(|a, b| collation.compare(&b.title, &a.title)),
            Self::HighestPrice => products.sort_by(|a, b| by_price(b, a)),
            Self::LowestPrice => products.sort_by(|a, b| by_price(a, b)),
            Self::Manual => {}
        }
    }
}

fn by_price<T: TagCollection>(a: &Product<'_, T>, b: &Product<'_, T>) -> Ordering {
    a.price.amount().cmp(b.price.amount())
}
