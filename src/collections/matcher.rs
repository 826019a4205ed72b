//! Collection Matcher

use rustc_hash::FxHashSet;
use serde::Deserialize;
use tracing::{debug, debug_span, warn};

use crate::{
    catalog::Catalog,
    collections::{
        CollectionError, CollectionRule, MatchMode,
        collation::{Collation, CollationKind},
        conditions::ConditionSlot,
        strategy::{CompileError, Predicate},
    },
    products::Product,
    tags::collection::TagCollection,
};

/// How match-any combines the results of its conditions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnyMatch {
    /// Concatenate each condition's results; a product matching twice appears twice
    #[default]
    Concatenate,

    /// Keep only the first occurrence of each product
    Distinct,
}

/// What to do with a condition whose operand does not parse.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConditionErrorPolicy {
    /// Return the error
    #[default]
    Abort,

    /// Log a warning and drop the condition
    Skip,
}

/// What to do with an operator the condition's subject does not define.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnsupportedOperatorPolicy {
    /// Log a warning and keep the condition as one no product satisfies
    #[default]
    NeverMatch,

    /// Return the error
    Abort,
}

/// Matcher options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MatcherOptions {
    /// Duplicate handling in match-any mode
    pub any_match: AnyMatch,

    /// Handling of malformed operands
    pub on_error: ConditionErrorPolicy,

    /// Handling of unsupported subject/operator pairs
    pub on_unsupported: UnsupportedOperatorPolicy,
}

/// Decides which catalog products satisfy a collection rule.
#[derive(Debug, Clone)]
pub struct CollectionMatcher<C: Collation = CollationKind> {
    collation: C,
    options: MatcherOptions,
}

impl Default for CollectionMatcher {
    fn default() -> Self {
        Self::new(CollationKind::default())
    }
}

impl<C: Collation> CollectionMatcher<C> {
    /// Create a matcher with default options.
    pub fn new(collation: C) -> Self {
        Self {
            collation,
            options: MatcherOptions::default(),
        }
    }

    /// Replace the options.
    #[must_use]
    pub fn with_options(mut self, options: MatcherOptions) -> Self {
        self.options = options;
        self
    }

    /// The collation used by the text operators and for sorting.
    pub fn collation(&self) -> &C {
        &self.collation
    }

    /// Current options.
    pub fn options(&self) -> MatcherOptions {
        self.options
    }

    /// Products from `catalog` that satisfy `rule`, in catalog order within each pass.
    ///
    /// # Errors
    ///
    /// Returns [`CollectionError::InvalidOperand`] under [`ConditionErrorPolicy::Abort`], or
    /// [`CollectionError::UnsupportedOperator`] under [`UnsupportedOperatorPolicy::Abort`].
    pub fn match_products<'c, 'a, T: TagCollection>(
        &self,
        catalog: &'c Catalog<'a, T>,
        rule: &CollectionRule,
    ) -> Result<Vec<&'c Product<'a, T>>, CollectionError> {
        let _span = debug_span!("match_products", mode = %rule.mode, products = catalog.len())
            .entered();

        let predicates = self.compile(rule)?;

        let matched = match rule.mode {
            MatchMode::All => self.match_all(catalog, &predicates),
            MatchMode::Any => self.match_any(catalog, &predicates),
        };

        debug!(matched = matched.len(), "collection rule evaluated");

        Ok(matched)
    }

    /// Compile the active conditions of a rule, applying the error policy.
    fn compile(
        &self,
        rule: &CollectionRule,
    ) -> Result<Vec<(ConditionSlot, Predicate)>, CollectionError> {
        let mut predicates = Vec::with_capacity(ConditionSlot::ALL.len());

        for slot in ConditionSlot::ALL {
            let Some(condition) = rule.condition(slot) else {
                debug!(%slot, "condition is empty, skipping");
                continue;
            };

            if condition.is_blank() {
                debug!(%slot, %condition, "operand is empty, skipping");
                continue;
            }

            match Predicate::compile(condition) {
                Ok(predicate) => predicates.push((slot, predicate)),
                Err(CompileError::Unsupported { subject, operator }) => {
                    if self.options.on_unsupported == UnsupportedOperatorPolicy::Abort {
                        return Err(CollectionError::UnsupportedOperator {
                            slot,
                            subject,
                            operator,
                        });
                    }

                    warn!(%slot, %subject, %operator, "unsupported operator, condition matches nothing");

                    predicates.push((slot, Predicate::never()));
                }
                Err(CompileError::InvalidOperand(source)) => {
                    let err = CollectionError::InvalidOperand { slot, source };

                    match self.options.on_error {
                        ConditionErrorPolicy::Abort => return Err(err),
                        ConditionErrorPolicy::Skip => {
                            warn!(%slot, error = %err, "dropping condition with malformed operand");
                        }
                    }
                }
            }
        }

        Ok(predicates)
    }

    fn match_all<'c, 'a, T: TagCollection>(
        &self,
        catalog: &'c Catalog<'a, T>,
        predicates: &[(ConditionSlot, Predicate)],
    ) -> Vec<&'c Product<'a, T>> {
        let Some(((ConditionSlot::First, first), rest)) = predicates.split_first() else {
            debug!("condition 1 is not active, match-all yields nothing");
            return Vec::new();
        };

        catalog
            .iter()
            .filter(|product| first.matches(product, &self.collation))
            .filter(|product| {
                rest.iter()
                    .all(|(_, predicate)| predicate.matches(product, &self.collation))
            })
            .collect()
    }

    fn match_any<'c, 'a, T: TagCollection>(
        &self,
        catalog: &'c Catalog<'a, T>,
        predicates: &[(ConditionSlot, Predicate)],
    ) -> Vec<&'c Product<'a, T>> {
        let mut matched: Vec<&'c Product<'a, T>> = Vec::new();

        for (slot, predicate) in predicates {
            let before = matched.len();

            matched.extend(
                catalog
                    .iter()
                    .filter(|product| predicate.matches(product, &self.collation)),
            );

            debug!(%slot, matched = matched.len() - before, "condition evaluated");
        }

        if self.options.any_match == AnyMatch::Distinct {
            let mut seen = FxHashSet::default();
            matched.retain(|product| seen.insert(product.id));
        }

        matched
    }
}
