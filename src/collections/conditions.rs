//! Collection Conditions
//!
//! A condition is a (subject, operator, operand) triple tested against each product. Subjects and
//! operators keep the shop's 1-based numeric codes so stored rules can be decoded; code `0`
//! means "not set" and leaves the slot empty.

use std::fmt;

use serde::Deserialize;
use thiserror::Error;

/// Product attribute a condition compares.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompareSubject {
    /// Product title
    Title,

    /// Any of the product's tags
    Tag,

    /// Product type handle
    ProductType,

    /// Product vendor
    Vendor,

    /// Product price, in major units
    Price,

    /// Product weight
    Weight,

    /// Quantity on hand
    AmountLeft,
}

/// The kind of value a subject yields, which decides the operators it supports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SubjectKind {
    /// A single string
    Text,

    /// A set of strings, matched per tag
    Tags,

    /// A decimal number
    Decimal,

    /// An integer
    Integer,
}

impl CompareSubject {
    /// Decode a stored subject code; `0` means "not set".
    ///
    /// # Errors
    ///
    /// Returns [`UnknownCode::Subject`] for codes outside `0..=7`.
    pub fn from_code(code: u8) -> Result<Option<Self>, UnknownCode> {
        let subject = match code {
            0 => return Ok(None),
            1 => Self::Title,
            2 => Self::Tag,
            3 => Self::ProductType,
            4 => Self::Vendor,
            5 => Self::Price,
            6 => Self::Weight,
            7 => Self::AmountLeft,
            other => return Err(UnknownCode::Subject(other)),
        };

        Ok(Some(subject))
    }

    /// The stored code for this subject.
    pub fn code(self) -> u8 {
        match self {
            Self::Title => 1,
            Self::Tag => 2,
            Self::ProductType => 3,
            Self::Vendor => 4,
            Self::Price => 5,
            Self::Weight => 6,
            Self::AmountLeft => 7,
        }
    }

    /// The kind of value this subject yields.
    pub fn kind(self) -> SubjectKind {
        match self {
            Self::Title | Self::ProductType | Self::Vendor => SubjectKind::Text,
            Self::Tag => SubjectKind::Tags,
            Self::Price | Self::Weight => SubjectKind::Decimal,
            Self::AmountLeft => SubjectKind::Integer,
        }
    }
}

impl fmt::Display for CompareSubject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Title => "Product title",
            Self::Tag => "Product tag",
            Self::ProductType => "Product type",
            Self::Vendor => "Product vendor",
            Self::Price => "Product price",
            Self::Weight => "Product weight",
            Self::AmountLeft => "Product stock",
        })
    }
}

/// Comparison a condition applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompareOperator {
    /// Exact equality
    Equals,

    /// Exact inequality
    NotEquals,

    /// Numeric greater-than
    GreaterThan,

    /// Numeric less-than
    LessThan,

    /// Prefix match, per collation
    StartsWith,

    /// Suffix match, per collation
    EndsWith,

    /// Substring match, per collation
    Contains,

    /// Negated substring match, per collation
    DoesNotContain,
}

impl CompareOperator {
    /// Decode a stored operator code; `0` means "not set".
    ///
    /// # Errors
    ///
    /// Returns [`UnknownCode::Operator`] for codes outside `0..=8`.
    pub fn from_code(code: u8) -> Result<Option<Self>, UnknownCode> {
        let operator = match code {
            0 => return Ok(None),
            1 => Self::Equals,
            2 => Self::NotEquals,
            3 => Self::GreaterThan,
            4 => Self::LessThan,
            5 => Self::StartsWith,
            6 => Self::EndsWith,
            7 => Self::Contains,
            8 => Self::DoesNotContain,
            other => return Err(UnknownCode::Operator(other)),
        };

        Ok(Some(operator))
    }

    /// The stored code for this operator.
    pub fn code(self) -> u8 {
        match self {
            Self::Equals => 1,
            Self::NotEquals => 2,
            Self::GreaterThan => 3,
            Self::LessThan => 4,
            Self::StartsWith => 5,
            Self::EndsWith => 6,
            Self::Contains => 7,
            Self::DoesNotContain => 8,
        }
    }
}

impl fmt::Display for CompareOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Equals => "is equal to",
            Self::NotEquals => "is not equal to",
            Self::GreaterThan => "is greater than",
            Self::LessThan => "is less than",
            Self::StartsWith => "starts with",
            Self::EndsWith => "ends with",
            Self::Contains => "contains",
            Self::DoesNotContain => "does not contain",
        })
    }
}

/// A stored subject or operator code that does not name anything.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum UnknownCode {
    /// Unknown subject code
    #[error("unknown compare subject code {0}")]
    Subject(u8),

    /// Unknown operator code
    #[error("unknown compare operator code {0}")]
    Operator(u8),
}

/// One of the three condition positions of a collection rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConditionSlot {
    /// Condition 1; seeds the result in match-all mode
    First,

    /// Condition 2
    Second,

    /// Condition 3
    Third,
}

impl ConditionSlot {
    /// All slots in evaluation order.
    pub const ALL: [Self; 3] = [Self::First, Self::Second, Self::Third];

    /// Zero-based position.
    pub fn index(self) -> usize {
        match self {
            Self::First => 0,
            Self::Second => 1,
            Self::Third => 2,
        }
    }
}

impl fmt::Display for ConditionSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "condition {}", self.index() + 1)
    }
}

/// A (subject, operator, operand) triple.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Condition {
    /// Compared attribute
    pub subject: CompareSubject,

    /// Comparison
    pub operator: CompareOperator,

    /// Raw operand text; parsed per subject kind when the rule is evaluated
    pub operand: String,
}

impl Condition {
    /// Create a new condition.
    pub fn new(
        subject: CompareSubject,
        operator: CompareOperator,
        operand: impl Into<String>,
    ) -> Self {
        Self {
            subject,
            operator,
            operand: operand.into(),
        }
    }

    /// Decode a stored condition. Returns `None` when the subject or operator code is `0`.
    ///
    /// # Errors
    ///
    /// Returns [`UnknownCode`] for codes that do not name a subject or operator.
    pub fn from_codes(
        subject: u8,
        operator: u8,
        operand: impl Into<String>,
    ) -> Result<Option<Self>, UnknownCode> {
        let subject = CompareSubject::from_code(subject)?;
        let operator = CompareOperator::from_code(operator)?;

        Ok(subject
            .zip(operator)
            .map(|(subject, operator)| Self::new(subject, operator, operand)))
    }

    /// An empty operand disables the condition.
    pub fn is_blank(&self) -> bool {
        self.operand.is_empty()
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.subject, self.operator, self.operand)
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    #[test]
    fn subject_codes_round_trip() -> TestResult {
        for code in 1..=7 {
            let subject = CompareSubject::from_code(code)?;

            assert_eq!(subject.map(CompareSubject::code), Some(code));
        }

        Ok(())
    }

    #[test]
    fn operator_codes_round_trip() -> TestResult {
        for code in 1..=8 {
            let operator = CompareOperator::from_code(code)?;

            assert_eq!(operator.map(CompareOperator::code), Some(code));
        }

        Ok(())
    }

    #[test]
    fn zero_code_is_not_set() -> TestResult {
        assert_eq!(CompareSubject::from_code(0)?, None);
        assert_eq!(CompareOperator::from_code(0)?, None);

        Ok(())
    }

    #[test]
    fn unknown_codes_are_errors() {
        assert_eq!(CompareSubject::from_code(8), Err(UnknownCode::Subject(8)));
        assert_eq!(CompareOperator::from_code(9), Err(UnknownCode::Operator(9)));
    }

    #[test]
    fn from_codes_with_unset_operator_is_none() -> TestResult {
        assert_eq!(Condition::from_codes(2, 0, "sticker")?, None);

        Ok(())
    }

    #[test]
    fn from_codes_decodes_condition() -> TestResult {
        let condition = Condition::from_codes(5, 4, "260")?;

        assert_eq!(
            condition,
            Some(Condition::new(
                CompareSubject::Price,
                CompareOperator::LessThan,
                "260"
            ))
        );

        Ok(())
    }

    #[test]
    fn subject_kinds() {
        assert_eq!(CompareSubject::Title.kind(), SubjectKind::Text);
        assert_eq!(CompareSubject::Tag.kind(), SubjectKind::Tags);
        assert_eq!(CompareSubject::Weight.kind(), SubjectKind::Decimal);
        assert_eq!(CompareSubject::AmountLeft.kind(), SubjectKind::Integer);
    }

    #[test]
    fn condition_display_reads_as_text() {
        let condition = Condition::new(CompareSubject::Tag, CompareOperator::Contains, "sticker");

        assert_eq!(condition.to_string(), "Product tag contains sticker");
    }

    #[test]
    fn slot_display_is_one_based() {
        assert_eq!(ConditionSlot::Third.to_string(), "condition 3");
    }
}
