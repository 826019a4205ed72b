//! Smart Collections
//!
//! A collection is a rule-defined grouping of catalog products. The rule holds up to three
//! conditions combined with match-all (AND) or match-any (OR) semantics; the second and third
//! conditions only narrow or extend what the first one selects.

use std::fmt;

use serde::Deserialize;
use thiserror::Error;
use tracing::debug_span;

use crate::{
    catalog::Catalog,
    collections::{
        collation::Collation,
        conditions::{CompareOperator, CompareSubject, Condition, ConditionSlot, UnknownCode},
        matcher::CollectionMatcher,
        sorting::SortOrder,
        strategy::OperandError,
    },
    ids::CollectionId,
    products::Product,
    tags::collection::TagCollection,
};

pub mod collation;
pub mod conditions;
pub mod matcher;
pub mod sorting;
pub mod strategy;

/// Errors raised while evaluating a collection rule.
#[derive(Debug, Error, PartialEq)]
pub enum CollectionError {
    /// A stored subject or operator code is unknown.
    #[error("{slot}: {source}")]
    UnknownCode {
        /// Offending slot
        slot: ConditionSlot,

        /// Decoding failure
        #[source]
        source: UnknownCode,
    },

    /// The operator is not defined for the subject.
    #[error("{slot}: {operator} is not supported for {subject}")]
    UnsupportedOperator {
        /// Offending slot
        slot: ConditionSlot,

        /// Compared attribute
        subject: CompareSubject,

        /// Requested comparison
        operator: CompareOperator,
    },

    /// The operand could not be parsed for the subject.
    #[error("{slot}: {source}")]
    InvalidOperand {
        /// Offending slot
        slot: ConditionSlot,

        /// Parse failure
        #[source]
        source: OperandError,
    },
}

/// How a rule's conditions combine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchMode {
    /// Every active condition must match
    #[default]
    All,

    /// Any active condition may match
    Any,
}

impl fmt::Display for MatchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::All => "all",
            Self::Any => "any",
        })
    }
}

/// Three condition slots plus a match mode.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CollectionRule {
    conditions: [Option<Condition>; 3],

    /// Combination mode
    pub mode: MatchMode,
}

impl CollectionRule {
    /// Create a rule with every slot empty.
    pub fn new(mode: MatchMode) -> Self {
        Self {
            conditions: [None, None, None],
            mode,
        }
    }

    /// Decode a rule from stored (subject code, operator code, operand) triples, one per slot.
    /// Triples past the third are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`CollectionError::UnknownCode`] naming the slot of an unknown code.
    pub fn from_codes<S: Into<String>>(
        mode: MatchMode,
        codes: impl IntoIterator<Item = (u8, u8, S)>,
    ) -> Result<Self, CollectionError> {
        let mut rule = Self::new(mode);

        for (slot, (subject, operator, operand)) in ConditionSlot::ALL.into_iter().zip(codes) {
            let condition = Condition::from_codes(subject, operator, operand)
                .map_err(|source| CollectionError::UnknownCode { slot, source })?;

            rule.set_condition(slot, condition);
        }

        Ok(rule)
    }

    /// Set a slot's condition.
    #[must_use]
    pub fn with_condition(mut self, slot: ConditionSlot, condition: Condition) -> Self {
        self.set_condition(slot, Some(condition));
        self
    }

    /// Set or clear a slot's condition.
    pub fn set_condition(&mut self, slot: ConditionSlot, condition: Option<Condition>) {
        if let Some(entry) = self.conditions.get_mut(slot.index()) {
            *entry = condition;
        }
    }

    /// The condition in a slot, if any.
    pub fn condition(&self, slot: ConditionSlot) -> Option<&Condition> {
        self.conditions.get(slot.index()).and_then(Option::as_ref)
    }

    /// Conditions that take part in evaluation: present and with a non-empty operand.
    pub fn active_conditions(&self) -> impl Iterator<Item = (ConditionSlot, &Condition)> {
        ConditionSlot::ALL.into_iter().filter_map(|slot| {
            self.condition(slot)
                .filter(|condition| !condition.is_blank())
                .map(|condition| (slot, condition))
        })
    }

    /// Readable text for each active condition.
    pub fn describe(&self) -> Vec<String> {
        self.active_conditions()
            .map(|(_, condition)| condition.to_string())
            .collect()
    }
}

/// A rule-defined grouping of products.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Collection {
    /// Collection identifier
    pub id: CollectionId,

    /// URL handle
    pub handle: String,

    /// Collection title
    pub title: String,

    /// Description
    pub body: String,

    /// Whether the collection is visible in the storefront
    pub published: bool,

    /// Membership rule
    pub rule: CollectionRule,

    /// Presentational order
    pub sort_order: SortOrder,
}

impl Collection {
    /// Create an unpublished collection sorted by title.
    pub fn new(
        id: CollectionId,
        handle: impl Into<String>,
        title: impl Into<String>,
        rule: CollectionRule,
    ) -> Self {
        Self {
            id,
            handle: handle.into(),
            title: title.into(),
            body: String::new(),
            published: false,
            rule,
            sort_order: SortOrder::default(),
        }
    }

    /// Set whether the collection is visible in the storefront.
    #[must_use]
    pub fn with_published(mut self, published: bool) -> Self {
        self.published = published;
        self
    }

    /// Set the sort order.
    #[must_use]
    pub fn with_sort_order(mut self, sort_order: SortOrder) -> Self {
        self.sort_order = sort_order;
        self
    }

    /// Products matching the rule, ordered by the collection's sort order.
    ///
    /// # Errors
    ///
    /// Returns a [`CollectionError`] if the rule cannot be evaluated.
    pub fn sorted_products<'c, 'a, T, C>(
        &self,
        matcher: &CollectionMatcher<C>,
        catalog: &'c Catalog<'a, T>,
    ) -> Result<Vec<&'c Product<'a, T>>, CollectionError>
    where
        T: TagCollection,
        C: Collation,
    {
        let _span = debug_span!("collection", handle = %self.handle).entered();

        let mut products = matcher.match_products(catalog, &self.rule)?;
        self.sort_order.sort(&mut products, matcher.collation());

        Ok(products)
    }
}

#[cfg(test)]
mod tests {
    use rusty_money::{Money, iso::RUB};
    use testresult::TestResult;

    use super::*;
    use crate::{
        collections::collation::CollationKind,
        ids::{ProductId, ProductTypeId},
        products::ProductType,
    };

    #[test]
    fn from_codes_fills_slots_in_order() -> TestResult {
        let rule = CollectionRule::from_codes(
            MatchMode::All,
            [(2, 7, "sticker"), (5, 4, "260"), (0, 0, "")],
        )?;

        assert_eq!(
            rule.condition(ConditionSlot::First),
            Some(&Condition::new(
                CompareSubject::Tag,
                CompareOperator::Contains,
                "sticker"
            ))
        );
        assert_eq!(
            rule.condition(ConditionSlot::Second).map(|c| c.subject),
            Some(CompareSubject::Price)
        );
        assert_eq!(rule.condition(ConditionSlot::Third), None);

        Ok(())
    }

    #[test]
    fn from_codes_reports_slot_of_unknown_code() {
        let result = CollectionRule::from_codes(MatchMode::Any, [(1, 1, "a"), (1, 42, "b")]);

        assert_eq!(
            result,
            Err(CollectionError::UnknownCode {
                slot: ConditionSlot::Second,
                source: UnknownCode::Operator(42),
            })
        );
    }

    #[test]
    fn describe_skips_blank_conditions() {
        let rule = CollectionRule::new(MatchMode::All)
            .with_condition(
                ConditionSlot::First,
                Condition::new(CompareSubject::Vendor, CompareOperator::Equals, "Acme"),
            )
            .with_condition(
                ConditionSlot::Second,
                Condition::new(CompareSubject::Title, CompareOperator::Contains, ""),
            );

        assert_eq!(rule.describe(), ["Product vendor is equal to Acme"]);
    }

    #[test]
    fn sorted_products_applies_sort_order() -> TestResult {
        let product = |id, title: &str, price| {
            Product::new(
                ProductId::new(id),
                title,
                ProductType::new(ProductTypeId::new(1), "stickers"),
                Money::from_minor(price, RUB),
            )
            .with_tags("sticker")
        };

        let catalog = Catalog::with_products(
            [product(1, "Moon", 300), product(2, "Star", 250), product(3, "Comet", 100)],
            RUB,
        )?;

        let collection = Collection::new(
            CollectionId::new(1),
            "stickers",
            "Stickers",
            CollectionRule::new(MatchMode::All).with_condition(
                ConditionSlot::First,
                Condition::new(CompareSubject::Tag, CompareOperator::Equals, "sticker"),
            ),
        );

        assert!(!collection.published);
        assert_eq!(collection.sort_order, SortOrder::AToZ);

        let matcher: CollectionMatcher<CollationKind> = CollectionMatcher::default();
        let titles = |collection: &Collection| -> Result<Vec<String>, CollectionError> {
            Ok(collection
                .sorted_products(&matcher, &catalog)?
                .iter()
                .map(|p| p.title.clone())
                .collect())
        };

        assert_eq!(titles(&collection)?, ["Comet", "Moon", "Star"]);

        let manual = collection.with_sort_order(SortOrder::Manual).with_published(true);

        assert!(manual.published);
        assert_eq!(titles(&manual)?, ["Moon", "Star", "Comet"]);

        Ok(())
    }
}
