use crate::model::{Outcome, Rejection, Subject};

/// Parses a subject total the lenient way form inputs are read: surrounding
/// whitespace is ignored and parsing stops at the first non-digit, so "40"
/// and "40 pts" both read as 40. Returns None when no digits lead the input.
pub fn parse_total(raw: &str) -> Option<i64> {
    let s = raw.trim();
    let (sign, digits) = match s.as_bytes().first() {
        Some(b'-') => (-1, &s[1..]),
        Some(b'+') => (1, &s[1..]),
        _ => (1, s),
    };
    let end = digits
        .bytes()
        .position(|b| !b.is_ascii_digit())
        .unwrap_or(digits.len());
    if end == 0 {
        return None;
    }
    digits[..end].parse::<i64>().ok().map(|v| sign * v)
}

/// Ordered list of subjects with their maximum achievable score.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    subjects: Vec<Subject>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_subjects(subjects: Vec<Subject>) -> Self {
        Self { subjects }
    }

    pub fn add(&mut self, name: &str, total: &str) -> Outcome {
        let name = name.trim();
        if name.is_empty() {
            return Outcome::Rejected(Rejection::BlankName);
        }
        let total = match parse_total(total) {
            Some(t) if t > 0 => t,
            _ => return Outcome::Rejected(Rejection::InvalidTotal),
        };
        self.subjects.push(Subject {
            name: name.to_string(),
            total,
        });
        Outcome::Applied(())
    }

    /// Replaces name and total in place, returning the previous entry.
    pub fn edit(&mut self, index: usize, name: &str, total: i64) -> Outcome<Subject> {
        let Some(subject) = self.subjects.get_mut(index) else {
            return Outcome::Rejected(Rejection::NoSuchSubject);
        };
        let name = name.trim();
        if name.is_empty() {
            return Outcome::Rejected(Rejection::BlankName);
        }
        if total <= 0 {
            return Outcome::Rejected(Rejection::InvalidTotal);
        }
        let previous = std::mem::replace(
            subject,
            Subject {
                name: name.to_string(),
                total,
            },
        );
        Outcome::Applied(previous)
    }

    pub fn remove(&mut self, index: usize) -> Outcome<Subject> {
        if index >= self.subjects.len() {
            return Outcome::Rejected(Rejection::NoSuchSubject);
        }
        Outcome::Applied(self.subjects.remove(index))
    }

    /// First subject with this name. Names are not enforced unique.
    pub fn find(&self, name: &str) -> Option<&Subject> {
        self.subjects.iter().find(|s| s.name == name)
    }

    pub fn get(&self, index: usize) -> Option<&Subject> {
        self.subjects.get(index)
    }

    pub fn subjects(&self) -> &[Subject] {
        &self.subjects
    }

    pub fn len(&self) -> usize {
        self.subjects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subjects.is_empty()
    }

    pub fn clear(&mut self) {
        self.subjects.clear();
    }
}
