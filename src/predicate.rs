use crate::source::Record;

/// A boolean predicate tree evaluated against a single record.
///
/// Data sources receive these fully assembled; the leaves are string
/// tests against one attribute, and `And`/`Or`/`Not` compose them
/// arbitrarily.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate {
    /// Case-insensitive substring test against one attribute.
    Contains { attribute: String, value: String },
    /// Exact equality test against one attribute.
    Eq { attribute: String, value: String },
    And(Vec<Predicate>),
    Or(Vec<Predicate>),
    Not(Box<Predicate>),
}

impl Predicate {
    pub fn contains(
        attribute: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self::Contains {
            attribute: attribute.into(),
            value: value.into(),
        }
    }

    pub fn eq(
        attribute: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self::Eq {
            attribute: attribute.into(),
            value: value.into(),
        }
    }

    /// OR-combine a set of predicates. An empty input matches nothing.
    pub fn or_all(predicates: Vec<Predicate>) -> Self {
        Self::Or(predicates)
    }

    /// AND-combine a set of predicates. An empty input matches everything.
    pub fn and_all(predicates: Vec<Predicate>) -> Self {
        Self::And(predicates)
    }

    #[must_use]
    pub fn negate(self) -> Self {
        Self::Not(Box::new(self))
    }

    /// Evaluate this predicate against one record.
    ///
    /// A leaf test on an attribute the record does not carry is false.
    pub fn matches(&self, record: &Record) -> bool {
        match self {
            Self::Contains { attribute, value } => {
                record.get(attribute).is_some_and(|v| {
                    v.to_lowercase().contains(&value.to_lowercase())
                })
            }
            Self::Eq { attribute, value } => {
                record.get(attribute).is_some_and(|v| v == value)
            }
            Self::And(predicates) => {
                predicates.iter().all(|p| p.matches(record))
            }
            Self::Or(predicates) => {
                predicates.iter().any(|p| p.matches(record))
            }
            Self::Not(predicate) => !predicate.matches(record),
        }
    }
}
