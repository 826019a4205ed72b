//! Catalog

use rustc_hash::FxHashMap;
use rusty_money::iso::Currency;
use thiserror::Error;

use crate::{
    ids::ProductId,
    products::Product,
    tags::{collection::TagCollection, string::StringTagCollection},
};

/// Errors related to catalog construction.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CatalogError {
    /// A product with the same id is already in the catalog.
    #[error("product {0} is already in the catalog")]
    DuplicateProduct(ProductId),

    /// A product's currency differs from the catalog currency (product, product currency, catalog currency).
    #[error("product {0} has currency {1}, but catalog has currency {2}")]
    CurrencyMismatch(ProductId, &'static str, &'static str),
}

/// Products in source order, indexed by id.
#[derive(Debug, Clone)]
pub struct Catalog<'a, T: TagCollection = StringTagCollection> {
    products: Vec<Product<'a, T>>,
    index: FxHashMap<ProductId, usize>,
    currency: &'static Currency,
}

impl<'a, T: TagCollection> Catalog<'a, T> {
    /// Create an empty catalog priced in the given currency.
    pub fn new(currency: &'static Currency) -> Self {
        Self {
            products: Vec::new(),
            index: FxHashMap::default(),
            currency,
        }
    }

    /// Create a catalog from a list of products, keeping their order.
    ///
    /// # Errors
    ///
    /// Returns a [`CatalogError`] on a duplicate id or a currency mismatch.
    pub fn with_products(
        products: impl IntoIterator<Item = Product<'a, T>>,
        currency: &'static Currency,
    ) -> Result<Self, CatalogError> {
        let mut catalog = Self::new(currency);

        products
            .into_iter()
            .try_for_each(|product| catalog.insert(product))?;

        Ok(catalog)
    }

    /// Append a product.
    ///
    /// # Errors
    ///
    /// Returns a [`CatalogError`] on a duplicate id or a currency mismatch.
    pub fn insert(&mut self, product: Product<'a, T>) -> Result<(), CatalogError> {
        let product_currency = product.price.currency();

        if product_currency != self.currency {
            return Err(CatalogError::CurrencyMismatch(
                product.id,
                product_currency.iso_alpha_code,
                self.currency.iso_alpha_code,
            ));
        }

        if self.index.contains_key(&product.id) {
            return Err(CatalogError::DuplicateProduct(product.id));
        }

        self.index.insert(product.id, self.products.len());
        self.products.push(product);

        Ok(())
    }

    /// Look up a product by id.
    pub fn get(&self, id: ProductId) -> Option<&Product<'a, T>> {
        self.index
            .get(&id)
            .and_then(|&position| self.products.get(position))
    }

    /// Iterate over products in source order.
    pub fn iter(&self) -> impl Iterator<Item = &Product<'a, T>> {
        self.products.iter()
    }

    /// Products in source order.
    pub fn products(&self) -> &[Product<'a, T>] {
        &self.products
    }

    /// Number of products.
    pub fn len(&self) -> usize {
        self.products.len()
    }

    /// Check if the catalog is empty.
    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    /// Catalog currency.
    pub fn currency(&self) -> &'static Currency {
        self.currency
    }
}

#[cfg(test)]
mod tests {
    use rusty_money::{
        Money,
        iso::{RUB, USD},
    };
    use testresult::TestResult;

    use super::*;
    use crate::{ids::ProductTypeId, products::ProductType};

    fn product(id: u32, price: Money<'static, Currency>) -> Product<'static> {
        Product::new(
            ProductId::new(id),
            format!("Product {id}"),
            ProductType::new(ProductTypeId::new(1), "misc"),
            price,
        )
    }

    #[test]
    fn keeps_source_order() -> TestResult {
        let catalog = Catalog::with_products(
            [
                product(3, Money::from_minor(100, RUB)),
                product(1, Money::from_minor(200, RUB)),
            ],
            RUB,
        )?;

        let ids: Vec<_> = catalog.iter().map(|p| p.id.get()).collect();

        assert_eq!(ids, [3, 1]);
        assert_eq!(catalog.len(), 2);

        Ok(())
    }

    #[test]
    fn get_by_id() -> TestResult {
        let catalog = Catalog::with_products([product(7, Money::from_minor(100, RUB))], RUB)?;

        assert!(catalog.get(ProductId::new(7)).is_some());
        assert!(catalog.get(ProductId::new(8)).is_none());

        Ok(())
    }

    #[test]
    fn rejects_duplicate_ids() {
        let result = Catalog::with_products(
            [
                product(1, Money::from_minor(100, RUB)),
                product(1, Money::from_minor(200, RUB)),
            ],
            RUB,
        );

        assert!(matches!(
            result,
            Err(CatalogError::DuplicateProduct(id)) if id == ProductId::new(1)
        ));
    }

    #[test]
    fn rejects_currency_mismatch() {
        let result = Catalog::with_products([product(1, Money::from_minor(100, USD))], RUB);

        match result {
            Err(CatalogError::CurrencyMismatch(id, product_currency, catalog_currency)) => {
                assert_eq!(id, ProductId::new(1));
                assert_eq!(product_currency, USD.iso_alpha_code);
                assert_eq!(catalog_currency, RUB.iso_alpha_code);
            }
            other => panic!("expected CurrencyMismatch error, got {other:?}"),
        }
    }

    #[test]
    fn new_catalog_is_empty() {
        let catalog: Catalog<'_> = Catalog::new(RUB);

        assert!(catalog.is_empty());
        assert_eq!(catalog.currency(), RUB);
    }
}
