//! Fixtures

use std::{fs, path::PathBuf};

use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::debug;

use crate::{
    catalog::{Catalog, CatalogError},
    collections::{Collection, CollectionError},
    customers::Customer,
    discounts::Discount,
    fixtures::{
        collections::CollectionsFixture, customers::CustomersFixture,
        discounts::DiscountsFixture, orders::OrdersFixture, products::ProductsFixture,
    },
    ids::{CustomerId, DiscountId, IdListError, OrderId},
    orders::{Order, OrderError},
    products::Product,
};

pub mod collections;
pub mod customers;
pub mod discounts;
pub mod orders;
pub mod products;

/// Fixture Parsing Errors
#[derive(Debug, Error)]
pub enum FixtureError {
    /// IO error reading fixture files
    #[error("Failed to read fixture file: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error
    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_norway::Error),

    /// Invalid price format
    #[error("Invalid price format: {0}")]
    InvalidPrice(String),

    /// Invalid amount
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    /// Invalid percentage format
    #[error("Invalid percentage format: {0}")]
    InvalidPercentage(String),

    /// Unknown currency code
    #[error("Unknown currency code: {0}")]
    UnknownCurrency(String),

    /// Required value missing
    #[error("Missing value: {0}")]
    MissingValue(String),

    /// Currency mismatch between products
    #[error("Currency mismatch: expected {0}, found {1}")]
    CurrencyMismatch(String, String),

    /// No products loaded yet
    #[error("No products loaded yet; currency unknown")]
    NoCurrency,

    /// Catalog construction error
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    /// Collection rule error
    #[error(transparent)]
    Collection(#[from] CollectionError),

    /// Malformed id list
    #[error(transparent)]
    IdList(#[from] IdListError),

    /// Order construction error
    #[error(transparent)]
    Order(#[from] OrderError),

    /// Collection not found
    #[error("Collection not found: {0}")]
    CollectionNotFound(String),

    /// Discount not found
    #[error("Discount not found: {0}")]
    DiscountNotFound(String),

    /// Customer not found
    #[error("Customer not found: {0}")]
    CustomerNotFound(String),

    /// Order not found
    #[error("Order not found: {0}")]
    OrderNotFound(String),
}

/// A named set of products, collections, discounts, customers and orders read from YAML.
#[derive(Debug)]
pub struct Fixture {
    /// Base path for fixture files
    base_path: PathBuf,

    /// Products, once any are loaded
    catalog: Option<Catalog<'static>>,

    collections: Vec<Collection>,
    discounts: Vec<Discount<'static>>,
    customers: Vec<Customer>,
    orders: Vec<Order<'static>>,
}

impl Fixture {
    /// Create a new empty fixture with default base path
    pub fn new() -> Self {
        Self::with_base_path("./fixtures")
    }

    /// Create a new empty fixture with custom base path
    pub fn with_base_path(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
            catalog: None,
            collections: Vec::new(),
            discounts: Vec::new(),
            customers: Vec::new(),
            orders: Vec::new(),
        }
    }

    fn read<F: DeserializeOwned>(&self, kind: &str, name: &str) -> Result<F, FixtureError> {
        let file_path = self.base_path.join(kind).join(format!("{name}.yml"));

        debug!(path = %file_path.display(), "reading fixture");

        let contents = fs::read_to_string(&file_path)?;

        Ok(serde_norway::from_str(&contents)?)
    }

    /// Load products from a YAML fixture file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed, or if there are currency mismatches.
    pub fn load_products(&mut self, name: &str) -> Result<&mut Self, FixtureError> {
        let fixture: ProductsFixture = self.read("products", name)?;

        for product_fixture in fixture.products {
            let (_minor_units, currency) = products::parse_price(&product_fixture.price)?;

            let catalog = self.catalog.get_or_insert_with(|| Catalog::new(currency));

            if catalog.currency() != currency {
                return Err(FixtureError::CurrencyMismatch(
                    catalog.currency().iso_alpha_code.to_string(),
                    currency.iso_alpha_code.to_string(),
                ));
            }

            let product: Product<'static> = product_fixture.try_into()?;

            catalog.insert(product)?;
        }

        Ok(self)
    }

    /// Load collections from a YAML fixture file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or a rule has an unknown code.
    pub fn load_collections(&mut self, name: &str) -> Result<&mut Self, FixtureError> {
        let fixture: CollectionsFixture = self.read("collections", name)?;

        for collection_fixture in fixture.collections {
            self.collections.push(collection_fixture.try_into()?);
        }

        Ok(self)
    }

    /// Load discounts from a YAML fixture file. Amounts are in the catalog currency, so products
    /// must be loaded first.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, a value is malformed, or no
    /// products are loaded.
    pub fn load_discounts(&mut self, name: &str) -> Result<&mut Self, FixtureError> {
        let currency = self.currency()?;
        let fixture: DiscountsFixture = self.read("discounts", name)?;

        for discount_fixture in fixture.discounts {
            self.discounts
                .push(discount_fixture.try_into_discount(currency)?);
        }

        Ok(self)
    }

    /// Load customers from a YAML fixture file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_customers(&mut self, name: &str) -> Result<&mut Self, FixtureError> {
        let fixture: CustomersFixture = self.read("customers", name)?;

        self.customers
            .extend(fixture.customers.into_iter().map(Customer::from));

        Ok(self)
    }

    /// Load orders from a YAML fixture file. Discounts referenced by id must be loaded first.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, an amount is malformed, a discount
    /// is unknown, or no products are loaded.
    pub fn load_orders(&mut self, name: &str) -> Result<&mut Self, FixtureError> {
        let currency = self.currency()?;
        let fixture: OrdersFixture = self.read("orders", name)?;

        for order_fixture in fixture.orders {
            let order = order_fixture.try_into_order(currency, &self.discounts)?;

            self.orders.push(order);
        }

        Ok(self)
    }

    /// Load every kind of fixture with the same name
    ///
    /// # Errors
    ///
    /// Returns an error if any of the fixture files cannot be loaded.
    pub fn load_set(&mut self, name: &str) -> Result<&mut Self, FixtureError> {
        self.load_products(name)?
            .load_collections(name)?
            .load_discounts(name)?
            .load_customers(name)?
            .load_orders(name)
    }

    /// Load a complete fixture set from the default base path
    ///
    /// # Errors
    ///
    /// Returns an error if any of the fixture files cannot be loaded.
    pub fn from_set(name: &str) -> Result<Self, FixtureError> {
        let mut fixture = Self::new();

        fixture.load_set(name)?;

        Ok(fixture)
    }

    /// Get the catalog
    ///
    /// # Errors
    ///
    /// Returns an error if no products have been loaded yet.
    pub fn catalog(&self) -> Result<&Catalog<'static>, FixtureError> {
        self.catalog.as_ref().ok_or(FixtureError::NoCurrency)
    }

    /// Get the catalog currency
    ///
    /// # Errors
    ///
    /// Returns an error if no products have been loaded yet.
    pub fn currency(&self) -> Result<&'static rusty_money::iso::Currency, FixtureError> {
        Ok(self.catalog()?.currency())
    }

    /// Get a collection by its handle
    ///
    /// # Errors
    ///
    /// Returns an error if the collection is not found.
    pub fn collection(&self, handle: &str) -> Result<&Collection, FixtureError> {
        self.collections
            .iter()
            .find(|collection| collection.handle == handle)
            .ok_or_else(|| FixtureError::CollectionNotFound(handle.to_string()))
    }

    /// Get a discount by id
    ///
    /// # Errors
    ///
    /// Returns an error if the discount is not found.
    pub fn discount(&self, id: DiscountId) -> Result<&Discount<'static>, FixtureError> {
        self.discounts
            .iter()
            .find(|discount| discount.id == id)
            .ok_or_else(|| FixtureError::DiscountNotFound(id.to_string()))
    }

    /// Get a customer by id
    ///
    /// # Errors
    ///
    /// Returns an error if the customer is not found.
    pub fn customer(&self, id: CustomerId) -> Result<&Customer, FixtureError> {
        self.customers
            .iter()
            .find(|customer| customer.id == id)
            .ok_or_else(|| FixtureError::CustomerNotFound(id.to_string()))
    }

    /// Get an order by id
    ///
    /// # Errors
    ///
    /// Returns an error if the order is not found.
    pub fn order(&self, id: OrderId) -> Result<&Order<'static>, FixtureError> {
        self.orders
            .iter()
            .find(|order| order.id == id)
            .ok_or_else(|| FixtureError::OrderNotFound(id.to_string()))
    }

    /// Get all collections
    pub fn collections(&self) -> &[Collection] {
        &self.collections
    }

    /// Get all discounts
    pub fn discounts(&self) -> &[Discount<'static>] {
        &self.discounts
    }

    /// Get all customers
    pub fn customers(&self) -> &[Customer] {
        &self.customers
    }

    /// Get all orders
    pub fn orders(&self) -> &[Order<'static>] {
        &self.orders
    }
}

impl Default for Fixture {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::{fs, path::Path};

    use rusty_money::iso::RUB;
    use testresult::TestResult;

    use super::*;
    use crate::ids::ProductId;

    fn write_fixture(base: &Path, category: &str, name: &str, contents: &str) -> TestResult {
        let dir = base.join(category);

        fs::create_dir_all(&dir)?;
        fs::write(dir.join(format!("{name}.yml")), contents)?;

        Ok(())
    }

    #[test]
    fn fixture_from_set_loads_all_fixtures() -> TestResult {
        let fixture = Fixture::from_set("default")?;

        assert_eq!(fixture.currency()?, RUB);
        assert!(!fixture.catalog()?.is_empty());
        assert!(!fixture.collections().is_empty());
        assert!(!fixture.discounts().is_empty());
        assert!(!fixture.customers().is_empty());
        assert!(!fixture.orders().is_empty());

        Ok(())
    }

    #[test]
    fn fixture_lookups_find_loaded_data() -> TestResult {
        let fixture = Fixture::from_set("default")?;

        assert_eq!(fixture.collection("stickers")?.handle, "stickers");
        assert_eq!(fixture.customer(CustomerId::new(1))?.id, CustomerId::new(1));
        assert_eq!(fixture.order(OrderId::new(1))?.id, OrderId::new(1));
        assert_eq!(fixture.discount(DiscountId::new(1))?.id, DiscountId::new(1));
        assert!(fixture.catalog()?.get(ProductId::new(1)).is_some());

        Ok(())
    }

    #[test]
    fn fixture_lookup_misses_return_errors() {
        let fixture = Fixture::new();

        assert!(matches!(
            fixture.collection("missing"),
            Err(FixtureError::CollectionNotFound(_))
        ));
        assert!(matches!(
            fixture.order(OrderId::new(404)),
            Err(FixtureError::OrderNotFound(_))
        ));
        assert!(matches!(fixture.currency(), Err(FixtureError::NoCurrency)));
    }

    #[test]
    fn discounts_need_products_first() -> TestResult {
        let dir = tempfile::tempdir()?;

        write_fixture(dir.path(), "discounts", "lonely", "discounts: []\n")?;

        let result = Fixture::with_base_path(dir.path()).load_discounts("lonely").map(|_| ());

        assert!(matches!(result, Err(FixtureError::NoCurrency)));

        Ok(())
    }

    #[test]
    fn fixture_load_products_rejects_currency_mismatch() -> TestResult {
        let dir = tempfile::tempdir()?;

        write_fixture(
            dir.path(),
            "products",
            "rub_set",
            "products:\n  - { id: 1, title: A, type: { id: 1, handle: t }, price: 1.00 RUB }\n",
        )?;

        write_fixture(
            dir.path(),
            "products",
            "eur_set",
            "products:\n  - { id: 2, title: B, type: { id: 1, handle: t }, price: 1.00 EUR }\n",
        )?;

        let mut fixture = Fixture::with_base_path(dir.path());

        fixture.load_products("rub_set")?;

        let result = fixture.load_products("eur_set").map(|_| ());

        assert!(matches!(result, Err(FixtureError::CurrencyMismatch(_, _))));

        Ok(())
    }

    #[test]
    fn fixture_default_matches_new() {
        let fixture = Fixture::default();

        assert_eq!(fixture.base_path, PathBuf::from("./fixtures"));
        assert!(fixture.catalog.is_none());
        assert!(fixture.orders.is_empty());
    }
}
