//! Comparison Strategies
//!
//! Which comparison a condition performs is looked up once in [`STRATEGIES`], keyed by
//! (subject kind, operator). A condition is then compiled into a [`Predicate`] with its operand
//! already parsed, so testing a product never re-parses text.

use std::num::ParseIntError;

use rust_decimal::Decimal;
use thiserror::Error;

use crate::{
    collections::{
        collation::Collation,
        conditions::{CompareOperator, CompareSubject, Condition, SubjectKind},
    },
    products::Product,
    tags::collection::TagCollection,
};

/// A string test.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextTest {
    /// Exact equality
    Equals,

    /// Exact inequality
    NotEquals,

    /// Prefix, per collation
    StartsWith,

    /// Suffix, per collation
    EndsWith,

    /// Substring, per collation
    Contains,

    /// Negated substring, per collation
    DoesNotContain,
}

impl TextTest {
    /// Apply the test to `value`.
    pub fn eval<C: Collation + ?Sized>(self, value: &str, needle: &str, collation: &C) -> bool {
        match self {
            Self::Equals => value == needle,
            Self::NotEquals => value != needle,
            Self::StartsWith => collation.starts_with(value, needle),
            Self::EndsWith => collation.ends_with(value, needle),
            Self::Contains => collation.contains(value, needle),
            Self::DoesNotContain => !collation.contains(value, needle),
        }
    }
}

/// A numeric test.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumberTest {
    /// `value == operand`
    Equals,

    /// `value != operand`
    NotEquals,

    /// `value > operand`
    GreaterThan,

    /// `value < operand`
    LessThan,
}

impl NumberTest {
    /// Apply the test to `value`.
    pub fn eval<N: PartialOrd>(self, value: &N, operand: &N) -> bool {
        match self {
            Self::Equals => value == operand,
            Self::NotEquals => value != operand,
            Self::GreaterThan => value > operand,
            Self::LessThan => value < operand,
        }
    }
}

/// How a (subject kind, operator) pair is evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// Test a single string
    Text(TextTest),

    /// Match when at least one tag passes the test
    AnyTag(TextTest),

    /// Match when no tag passes the test
    NoTag(TextTest),

    /// Compare a number
    Number(NumberTest),
}

/// Supported (subject kind, operator) pairs. Anything missing is unsupported.
pub const STRATEGIES: &[(SubjectKind, CompareOperator, Strategy)] = &[
    (SubjectKind::Text, CompareOperator::Equals, Strategy::Text(TextTest::Equals)),
    (SubjectKind::Text, CompareOperator::NotEquals, Strategy::Text(TextTest::NotEquals)),
    (SubjectKind::Text, CompareOperator::StartsWith, Strategy::Text(TextTest::StartsWith)),
    (SubjectKind::Text, CompareOperator::EndsWith, Strategy::Text(TextTest::EndsWith)),
    (SubjectKind::Text, CompareOperator::Contains, Strategy::Text(TextTest::Contains)),
    (SubjectKind::Text, CompareOperator::DoesNotContain, Strategy::Text(TextTest::DoesNotContain)),
    (SubjectKind::Tags, CompareOperator::Equals, Strategy::AnyTag(TextTest::Equals)),
    (SubjectKind::Tags, CompareOperator::NotEquals, Strategy::NoTag(TextTest::Equals)),
    (SubjectKind::Tags, CompareOperator::StartsWith, Strategy::AnyTag(TextTest::StartsWith)),
    (SubjectKind::Tags, CompareOperator::EndsWith, Strategy::AnyTag(TextTest::EndsWith)),
    (SubjectKind::Tags, CompareOperator::Contains, Strategy::AnyTag(TextTest::Contains)),
    (SubjectKind::Tags, CompareOperator::DoesNotContain, Strategy::NoTag(TextTest::Contains)),
    (SubjectKind::Decimal, CompareOperator::Equals, Strategy::Number(NumberTest::Equals)),
    (SubjectKind::Decimal, CompareOperator::NotEquals, Strategy::Number(NumberTest::NotEquals)),
    (SubjectKind::Decimal, CompareOperator::GreaterThan, Strategy::Number(NumberTest::GreaterThan)),
    (SubjectKind::Decimal, CompareOperator::LessThan, Strategy::Number(NumberTest::LessThan)),
    (SubjectKind::Integer, CompareOperator::Equals, Strategy::Number(NumberTest::Equals)),
    (SubjectKind::Integer, CompareOperator::NotEquals, Strategy::Number(NumberTest::NotEquals)),
    (SubjectKind::Integer, CompareOperator::GreaterThan, Strategy::Number(NumberTest::GreaterThan)),
    (SubjectKind::Integer, CompareOperator::LessThan, Strategy::Number(NumberTest::LessThan)),
];

/// Look up the strategy for a subject kind and operator.
pub fn strategy(kind: SubjectKind, operator: CompareOperator) -> Option<Strategy> {
    STRATEGIES
        .iter()
        .find(|(k, op, _)| *k == kind && *op == operator)
        .map(|&(_, _, strategy)| strategy)
}

/// Errors parsing an operand for a numeric subject.
#[derive(Debug, Error, PartialEq)]
pub enum OperandError {
    /// Operand is not a decimal number.
    #[error("expected a decimal number, got {operand:?}")]
    Decimal {
        /// Raw operand
        operand: String,

        /// Parse failure
        #[source]
        source: rust_decimal::Error,
    },

    /// Operand is not an integer.
    #[error("expected an integer, got {operand:?}")]
    Integer {
        /// Raw operand
        operand: String,

        /// Parse failure
        #[source]
        source: ParseIntError,
    },
}

/// Why a condition could not be compiled.
#[derive(Debug, Error, PartialEq)]
pub enum CompileError {
    /// The operator is not defined for the subject.
    #[error("{operator} is not supported for {subject}")]
    Unsupported {
        /// Compared attribute
        subject: CompareSubject,

        /// Requested comparison
        operator: CompareOperator,
    },

    /// The operand could not be parsed for the subject.
    #[error(transparent)]
    InvalidOperand(#[from] OperandError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TextField {
    Title,
    ProductType,
    Vendor,
}

impl TextField {
    fn read<'p, T: TagCollection>(self, product: &'p Product<'_, T>) -> &'p str {
        match self {
            Self::Title => &product.title,
            Self::ProductType => &product.product_type.handle,
            Self::Vendor => &product.vendor,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DecimalField {
    Price,
    Weight,
}

impl DecimalField {
    fn read<T: TagCollection>(self, product: &Product<'_, T>) -> Decimal {
        match self {
            Self::Price => *product.price.amount(),
            Self::Weight => product.weight,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Compiled {
    Text {
        field: TextField,
        test: TextTest,
        needle: String,
    },
    Tags {
        test: TextTest,
        negated: bool,
        needle: String,
    },
    Decimal {
        field: DecimalField,
        test: NumberTest,
        value: Decimal,
    },
    Integer {
        test: NumberTest,
        value: i64,
    },
    Never,
}

/// A compiled condition: subject accessor, strategy and parsed operand.
#[derive(Debug, Clone, PartialEq)]
pub struct Predicate(Compiled);

impl Predicate {
    /// Compile a condition: look up its strategy and parse its operand.
    ///
    /// # Errors
    ///
    /// Returns [`CompileError`] if the pair is unsupported or the operand does not parse.
    pub fn compile(condition: &Condition) -> Result<Self, CompileError> {
        let subject = condition.subject;
        let strategy = strategy(subject.kind(), condition.operator).ok_or(
            CompileError::Unsupported {
                subject,
                operator: condition.operator,
            },
        )?;

        let operand = condition.operand.as_str();

        let predicate = match (strategy, subject) {
            (Strategy::Text(test), CompareSubject::Title) => Self::text(TextField::Title, test, operand),
            (Strategy::Text(test), CompareSubject::ProductType) => {
                Self::text(TextField::ProductType, test, operand)
            }
            (Strategy::Text(test), CompareSubject::Vendor) => Self::text(TextField::Vendor, test, operand),
            (Strategy::AnyTag(test), _) => Compiled::Tags {
                test,
                negated: false,
                needle: operand.to_string(),
            },
            (Strategy::NoTag(test), _) => Compiled::Tags {
                test,
                negated: true,
                needle: operand.to_string(),
            },
            (Strategy::Number(test), CompareSubject::Price) => Compiled::Decimal {
                field: DecimalField::Price,
                test,
                value: parse_decimal(operand)?,
            },
            (Strategy::Number(test), CompareSubject::Weight) => Compiled::Decimal {
                field: DecimalField::Weight,
                test,
                value: parse_decimal(operand)?,
            },
            (Strategy::Number(test), CompareSubject::AmountLeft) => Compiled::Integer {
                test,
                value: parse_integer(operand)?,
            },
            _ => {
                return Err(CompileError::Unsupported {
                    subject,
                    operator: condition.operator,
                });
            }
        };

        Ok(Self(predicate))
    }

    /// A predicate no product satisfies. Stands in for an unsupported subject/operator pair.
    pub fn never() -> Self {
        Self(Compiled::Never)
    }

    fn text(field: TextField, test: TextTest, operand: &str) -> Compiled {
        Compiled::Text {
            field,
            test,
            needle: operand.to_string(),
        }
    }

    /// Test a product.
    pub fn matches<T, C>(&self, product: &Product<'_, T>, collation: &C) -> bool
    where
        T: TagCollection,
        C: Collation + ?Sized,
    {
        match &self.0 {
            Compiled::Text {
                field,
                test,
                needle,
            } => test.eval(field.read(product), needle, collation),
            Compiled::Tags {
                test,
                negated,
                needle,
            } => {
                let any = product
                    .tags
                    .iter()
                    .any(|tag| test.eval(tag, needle, collation));

                any != *negated
            }
            Compiled::Decimal { field, test, value } => test.eval(&field.read(product), value),
            Compiled::Integer { test, value } => test.eval(&product.quantity, value),
            Compiled::Never => false,
        }
    }
}

fn parse_decimal(operand: &str) -> Result<Decimal, OperandError> {
    operand
        .trim()
        .parse::<Decimal>()
        .map_err(|source| OperandError::Decimal {
            operand: operand.to_string(),
            source,
        })
}

fn parse_integer(operand: &str) -> Result<i64, OperandError> {
    operand
        .trim()
        .parse::<i64>()
        .map_err(|source| OperandError::Integer {
            operand: operand.to_string(),
            source,
        })
}
