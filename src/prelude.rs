//! Storefront prelude.
//!
//! Convenience exports for common library consumers.

pub use crate::{
    catalog::{Catalog, CatalogError},
    collections::{
        Collection, CollectionError, CollectionRule, MatchMode,
        collation::{CaseInsensitive, Collation, CollationKind, Ordinal},
        conditions::{CompareOperator, CompareSubject, Condition, ConditionSlot},
        matcher::{
            AnyMatch, CollectionMatcher, ConditionErrorPolicy, MatcherOptions,
            UnsupportedOperatorPolicy,
        },
        sorting::SortOrder,
    },
    config::{ConfigError, EngineConfig},
    customers::Customer,
    discounts::{
        AppliesTo, Availability, CustomerEligibility, Discount, DiscountError, DiscountKind,
        MinimumRequirement,
        calculator::{
            DiscountBreakdown, DiscountCalculator, DiscountOutcome, OrderTotals, SkipReason,
            UnsupportedPolicy,
        },
    },
    fixtures::{Fixture, FixtureError},
    ids::{
        CollectionId, CustomerGroupId, CustomerId, DiscountId, IdList, IdListError, OrderId,
        PaymentId, ProductId, ProductTypeId,
    },
    orders::{Order, OrderError, OrderLine, OrderStatus, Payment},
    pricing::PricingError,
    products::{Product, ProductType},
    receipt::{OrderReceipt, ReceiptError},
    tags::{collection::TagCollection, string::StringTagCollection},
};
