//! Products

use rust_decimal::Decimal;
use rusty_money::{Money, iso::Currency};

use crate::{
    ids::{ProductId, ProductTypeId},
    tags::{collection::TagCollection, string::StringTagCollection},
};

/// Product type, referenced by products and matched by its handle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductType {
    /// Product type identifier
    pub id: ProductTypeId,

    /// Product type handle (e.g. `"stickers"`)
    pub handle: String,
}

impl ProductType {
    /// Create a new product type.
    pub fn new(id: ProductTypeId, handle: impl Into<String>) -> Self {
        Self {
            id,
            handle: handle.into(),
        }
    }
}

/// Product
#[derive(Debug, Clone)]
pub struct Product<'a, T: TagCollection = StringTagCollection> {
    /// Product identifier
    pub id: ProductId,

    /// URL handle
    pub handle: String,

    /// Product title
    pub title: String,

    /// Product vendor
    pub vendor: String,

    /// Product tags
    pub tags: T,

    /// Product type
    pub product_type: ProductType,

    /// Product price
    pub price: Money<'a, Currency>,

    /// Shipping weight
    pub weight: Decimal,

    /// Quantity on hand; negative values mean stock is not tracked
    pub quantity: i64,

    /// Whether the product is visible in the storefront
    pub published: bool,
}

impl<'a> Product<'a> {
    /// Create a published product with no tags, zero weight and zero stock.
    pub fn new(
        id: ProductId,
        title: impl Into<String>,
        product_type: ProductType,
        price: Money<'a, Currency>,
    ) -> Self {
        let title = title.into();

        Self {
            id,
            handle: handle_from_title(&title),
            title,
            vendor: String::new(),
            tags: StringTagCollection::empty(),
            product_type,
            price,
            weight: Decimal::ZERO,
            quantity: 0,
            published: true,
        }
    }

    /// Replace the tags with the ones in a comma-delimited string.
    #[must_use]
    pub fn with_tags(mut self, tags: &str) -> Self {
        self.tags = StringTagCollection::parse_delimited(tags);
        self
    }

    /// Set the vendor.
    #[must_use]
    pub fn with_vendor(mut self, vendor: impl Into<String>) -> Self {
        self.vendor = vendor.into();
        self
    }

    /// Set the weight.
    #[must_use]
    pub fn with_weight(mut self, weight: Decimal) -> Self {
        self.weight = weight;
        self
    }

    /// Set the quantity on hand.
    #[must_use]
    pub fn with_quantity(mut self, quantity: i64) -> Self {
        self.quantity = quantity;
        self
    }
}

impl<T: TagCollection> Product<'_, T> {
    /// Whether stock is tracked for this product.
    pub fn tracks_stock(&self) -> bool {
        self.quantity >= 0
    }
}

/// Derive a lowercase, underscore-separated handle from a title.
fn handle_from_title(title: &str) -> String {
    title
        .split(|ch: char| !ch.is_alphanumeric())
        .filter(|part| !part.is_empty())
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join("_")
}

#[cfg(test)]
mod tests {
    use rusty_money::iso::RUB;

    use super::*;

    fn stickers() -> ProductType {
        ProductType::new(ProductTypeId::new(1), "stickers")
    }

    #[test]
    fn new_product_defaults() {
        let product = Product::new(
            ProductId::new(1),
            "Star Sticker",
            stickers(),
            Money::from_minor(25_000, RUB),
        );

        assert_eq!(product.handle, "star_sticker");
        assert!(product.tags.is_empty());
        assert!(product.published);
        assert_eq!(product.weight, Decimal::ZERO);
    }

    #[test]
    fn builders_set_fields() {
        let product = Product::new(
            ProductId::new(1),
            "Star",
            stickers(),
            Money::from_minor(25_000, RUB),
        )
        .with_tags("sticker, decal")
        .with_vendor("Sticker-Shop")
        .with_weight(Decimal::new(15, 1))
        .with_quantity(-1);

        assert!(product.tags.contains("sticker"));
        assert!(product.tags.contains("decal"));
        assert_eq!(product.vendor, "Sticker-Shop");
        assert_eq!(product.weight, Decimal::new(15, 1));
        assert!(!product.tracks_stock());
    }

    #[test]
    fn handle_from_title_strips_punctuation() {
        assert_eq!(handle_from_title("Sticker \"Star\"!"), "sticker_star");
    }
}
