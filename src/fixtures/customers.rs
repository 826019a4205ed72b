//! Customer Fixtures

use jiff::Timestamp;
use serde::Deserialize;

use crate::{customers::Customer, ids::CustomerId, tags::string::StringTagCollection};

/// Wrapper for customers in YAML
#[derive(Debug, Deserialize)]
pub struct CustomersFixture {
    /// Customers
    pub customers: Vec<CustomerFixture>,
}

/// Customer Fixture
#[derive(Debug, Deserialize)]
#[expect(missing_docs, reason = "fields mirror `Customer`")]
pub struct CustomerFixture {
    pub id: CustomerId,
    pub email: String,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub middle_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub country: String,
    #[serde(default)]
    pub province: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub district: Option<String>,
    #[serde(default)]
    pub street: Option<String>,
    #[serde(default)]
    pub building: Option<String>,
    #[serde(default)]
    pub apartment: Option<String>,
    #[serde(default)]
    pub zip_code: Option<String>,
    #[serde(default)]
    pub note: String,
    #[serde(default)]
    pub accepts_marketing: bool,
    #[serde(default)]
    pub registered_at: Option<Timestamp>,
    #[serde(default)]
    pub tags: String,
}

impl From<CustomerFixture> for Customer {
    fn from(fixture: CustomerFixture) -> Self {
        Self {
            id: fixture.id,
            first_name: fixture.first_name,
            middle_name: fixture.middle_name,
            last_name: fixture.last_name,
            email: fixture.email,
            phone: fixture.phone,
            country: fixture.country,
            province: fixture.province,
            city: fixture.city,
            district: fixture.district,
            street: fixture.street,
            building: fixture.building,
            apartment: fixture.apartment,
            zip_code: fixture.zip_code,
            note: fixture.note,
            accepts_marketing: fixture.accepts_marketing,
            registered_at: fixture.registered_at,
            tags: StringTagCollection::parse_delimited(&fixture.tags),
        }
    }
}
