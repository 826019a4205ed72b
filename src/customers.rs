//! Customers

use jiff::Timestamp;
use rusty_money::{Money, iso::Currency};

use crate::{
    ids::CustomerId,
    orders::Payment,
    pricing::{PricingError, total_price},
    tags::string::StringTagCollection,
};

/// A shop customer.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Customer {
    /// Customer identifier
    pub id: CustomerId,

    /// Given name
    pub first_name: Option<String>,

    /// Middle name
    pub middle_name: Option<String>,

    /// Family name
    pub last_name: Option<String>,

    /// E-mail address
    pub email: String,

    /// Phone number
    pub phone: Option<String>,

    /// Country
    pub country: String,

    /// Province or region
    pub province: String,

    /// City
    pub city: String,

    /// District
    pub district: Option<String>,

    /// Street
    pub street: Option<String>,

    /// Building
    pub building: Option<String>,

    /// Apartment
    pub apartment: Option<String>,

    /// Postal code
    pub zip_code: Option<String>,

    /// Free-form note
    pub note: String,

    /// Whether the customer accepts marketing e-mail
    pub accepts_marketing: bool,

    /// Registration time
    pub registered_at: Option<Timestamp>,

    /// Customer tags
    pub tags: StringTagCollection,
}

impl Customer {
    /// Create a customer known only by e-mail.
    pub fn new(id: CustomerId, email: impl Into<String>) -> Self {
        Self {
            id,
            email: email.into(),
            ..Self::default()
        }
    }

    /// Set the given and family names.
    #[must_use]
    pub fn with_name(mut self, first: impl Into<String>, last: impl Into<String>) -> Self {
        self.first_name = Some(first.into());
        self.last_name = Some(last.into());
        self
    }

    /// Set the city, province and country.
    #[must_use]
    pub fn with_address(
        mut self,
        city: impl Into<String>,
        province: impl Into<String>,
        country: impl Into<String>,
    ) -> Self {
        self.city = city.into();
        self.province = province.into();
        self.country = country.into();
        self
    }

    /// "Last First", or the e-mail address when either name is missing.
    pub fn screen_name(&self) -> String {
        match (&self.last_name, &self.first_name) {
            (Some(last), Some(first)) => format!("{last} {first}"),
            _ => self.email.clone(),
        }
    }

    /// "City, Province, Country".
    pub fn short_address(&self) -> String {
        format!("{}, {}, {}", self.city, self.province, self.country)
    }

    /// Sum of this customer's payments among `payments`.
    ///
    /// # Errors
    ///
    /// Returns [`PricingError::Money`] if a payment is in a different currency.
    pub fn total_spent<'a>(
        &self,
        payments: &[Payment<'a>],
        currency: &'a Currency,
    ) -> Result<Money<'a, Currency>, PricingError> {
        total_price(
            payments
                .iter()
                .filter(|payment| payment.customer == self.id)
                .map(|payment| payment.amount),
            currency,
        )
    }
}

#[cfg(test)]
mod tests {
    use rusty_money::iso::RUB;
    use testresult::TestResult;

    use super::*;
    use crate::ids::{OrderId, PaymentId};

    #[test]
    fn screen_name_prefers_names() {
        let named = Customer::new(CustomerId::new(1), "ivan@example.com").with_name("Ivan", "Petrov");
        let anonymous = Customer::new(CustomerId::new(2), "anon@example.com");

        assert_eq!(named.screen_name(), "Petrov Ivan");
        assert_eq!(anonymous.screen_name(), "anon@example.com");
    }

    #[test]
    fn screen_name_needs_both_names() {
        let customer = Customer {
            first_name: Some("Ivan".to_string()),
            ..Customer::new(CustomerId::new(1), "ivan@example.com")
        };

        assert_eq!(customer.screen_name(), "ivan@example.com");
    }

    #[test]
    fn short_address_joins_parts() {
        let customer = Customer::new(CustomerId::new(1), "a@example.com").with_address(
            "Kazan",
            "Tatarstan",
            "Russia",
        );

        assert_eq!(customer.short_address(), "Kazan, Tatarstan, Russia");
    }

    #[test]
    fn total_spent_counts_only_own_payments() -> TestResult {
        let payment = |id, customer, minor| Payment {
            id: PaymentId::new(id),
            customer: CustomerId::new(customer),
            order: OrderId::new(1),
            paid_at: Timestamp::UNIX_EPOCH,
            amount: Money::from_minor(minor, RUB),
            note: String::new(),
        };

        let payments = [payment(1, 1, 10_000), payment(2, 2, 5_000), payment(3, 1, 2_500)];
        let customer = Customer::new(CustomerId::new(1), "a@example.com");

        assert_eq!(
            customer.total_spent(&payments, RUB)?,
            Money::from_minor(12_500, RUB)
        );

        Ok(())
    }
}
