use crate::model::{MarkRecord, Outcome, Rejection, StudentId};
use std::collections::HashMap;

/// Reads a mark entry. Blank input clears the entry (`Ok(None)`); anything
/// else must parse to a finite number within `0..=total`.
pub fn parse_mark(raw: &str, total: i64) -> Result<Option<f64>, Rejection> {
    let s = raw.trim();
    if s.is_empty() {
        return Ok(None);
    }
    let v: f64 = s.parse().map_err(|_| Rejection::NotANumber)?;
    if !v.is_finite() {
        return Err(Rejection::NotANumber);
    }
    if v < 0.0 || v > total as f64 {
        return Err(Rejection::OutOfRange);
    }
    Ok(Some(v))
}

/// Per-student mark records. Exactly one record exists for each student on
/// the roster; the owning gradebook keeps the two in step.
#[derive(Debug, Clone, Default)]
pub struct Ledger {
    records: HashMap<StudentId, MarkRecord>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_record(&mut self, student: StudentId, record: MarkRecord) {
        self.records.insert(student, record);
    }

    pub fn remove_record(&mut self, student: StudentId) -> Option<MarkRecord> {
        self.records.remove(&student)
    }

    pub fn record(&self, student: StudentId) -> Option<&MarkRecord> {
        self.records.get(&student)
    }

    /// Recorded mark, or None when unset.
    pub fn mark(&self, student: StudentId, subject: &str) -> Option<f64> {
        self.records.get(&student).and_then(|r| r.get(subject)).copied()
    }

    /// Writes one (student, subject) entry. A rejected write leaves every
    /// entry, including the targeted one, exactly as it was.
    pub fn set_mark(
        &mut self,
        student: StudentId,
        subject: &str,
        raw: &str,
        subject_total: i64,
    ) -> Outcome<Option<f64>> {
        let value = match parse_mark(raw, subject_total) {
            Ok(v) => v,
            Err(r) => return Outcome::Rejected(r),
        };
        let record = self.records.entry(student).or_default();
        match value {
            Some(v) => {
                record.insert(subject.to_string(), v);
            }
            None => {
                record.remove(subject);
            }
        }
        Outcome::Applied(value)
    }

    /// Drops the subject's entry from every record.
    pub fn remove_subject(&mut self, subject: &str) -> usize {
        self.records
            .values_mut()
            .filter_map(|r| r.remove(subject))
            .count()
    }

    /// Moves entries recorded under `from` to `to`. A record that already
    /// holds a mark under `to` keeps it, and its `from` entry stays in place.
    pub fn rename_subject(&mut self, from: &str, to: &str) -> usize {
        if from == to {
            return 0;
        }
        let mut moved = 0;
        for record in self.records.values_mut() {
            if record.contains_key(to) {
                continue;
            }
            if let Some(v) = record.remove(from) {
                record.insert(to.to_string(), v);
                moved += 1;
            }
        }
        moved
    }

    pub fn has_any_mark(&self) -> bool {
        self.records.values().any(|r| !r.is_empty())
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }
}
