use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use uuid::Uuid;

/// Session-stable identity of a student. Not persisted: the stored layout is
/// positional, so ids are minted again on every load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct StudentId(Uuid);

impl StudentId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for StudentId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for StudentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    pub id: StudentId,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subject {
    pub name: String,
    pub total: i64,
}

/// Recorded marks of one student, keyed by subject name. An absent key is unset.
pub type MarkRecord = BTreeMap<String, f64>;

/// Why a mutation left the model untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum Rejection {
    #[error("name must not be blank")]
    BlankName,
    #[error("total must be a positive integer")]
    InvalidTotal,
    #[error("mark is not a number")]
    NotANumber,
    #[error("mark is outside the subject's range")]
    OutOfRange,
    #[error("subject is not in the catalog")]
    UnknownSubject,
    #[error("no student at that index")]
    NoSuchStudent,
    #[error("no subject at that index")]
    NoSuchSubject,
    #[error("no marks have been entered")]
    NoMarks,
    #[error("results have not been computed")]
    NoResults,
}

impl Rejection {
    pub fn code(self) -> &'static str {
        match self {
            Rejection::BlankName => "blank_name",
            Rejection::InvalidTotal => "invalid_total",
            Rejection::NotANumber => "not_a_number",
            Rejection::OutOfRange => "out_of_range",
            Rejection::UnknownSubject => "unknown_subject",
            Rejection::NoSuchStudent => "no_such_student",
            Rejection::NoSuchSubject => "no_such_subject",
            Rejection::NoMarks => "no_marks",
            Rejection::NoResults => "no_results",
        }
    }
}

/// Result of a validated mutation. Rejection is a normal outcome, not an error.
#[must_use]
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<T = ()> {
    Applied(T),
    Rejected(Rejection),
}

impl<T> Outcome<T> {
    pub fn is_applied(&self) -> bool {
        matches!(self, Outcome::Applied(_))
    }

    pub fn rejection(&self) -> Option<Rejection> {
        match self {
            Outcome::Applied(_) => None,
            Outcome::Rejected(r) => Some(*r),
        }
    }

    pub fn applied(self) -> Option<T> {
        match self {
            Outcome::Applied(v) => Some(v),
            Outcome::Rejected(_) => None,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Outcome<U> {
        match self {
            Outcome::Applied(v) => Outcome::Applied(f(v)),
            Outcome::Rejected(r) => Outcome::Rejected(r),
        }
    }
}

impl<T> From<Result<T, Rejection>> for Outcome<T> {
    fn from(r: Result<T, Rejection>) -> Self {
        match r {
            Ok(v) => Outcome::Applied(v),
            Err(e) => Outcome::Rejected(e),
        }
    }
}
