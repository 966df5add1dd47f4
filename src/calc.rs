use crate::ledger::Ledger;
use crate::model::{Student, StudentId, Subject};
use serde::Serialize;
use std::cmp::Ordering;

/// Every subject is rescaled to this many points before averaging.
pub const SCALE: f64 = 20.0;
/// Minimum average (on the 20-point scale) that counts as a pass.
pub const PASSING_MARK: f64 = 10.0;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentResult {
    pub rank: usize,
    pub student_id: StudentId,
    pub student: String,
    pub total_marks: f64,
    pub average: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultSnapshot {
    /// Ordered by rank.
    pub results: Vec<StudentResult>,
    pub class_average: f64,
    pub pass_percentage: f64,
}

impl ResultSnapshot {
    pub fn empty() -> Self {
        Self {
            results: Vec::new(),
            class_average: 0.0,
            pass_percentage: 0.0,
        }
    }
}

/// `(mark / total) * 20`. A non-positive total contributes nothing.
pub fn normalized_score(mark: f64, total: i64) -> f64 {
    if total <= 0 {
        return 0.0;
    }
    (mark / total as f64) * SCALE
}

#[derive(Debug, Clone)]
struct Unranked {
    student_id: StudentId,
    student: String,
    total_marks: f64,
    average: f64,
}

fn student_totals(student: &Student, subjects: &[Subject], ledger: &Ledger) -> Unranked {
    let mut total_marks = 0.0;
    let mut total_score = 0.0;
    for subject in subjects {
        let raw = ledger.mark(student.id, &subject.name).unwrap_or(0.0);
        total_marks += raw;
        total_score += normalized_score(raw, subject.total);
    }
    let average = if subjects.is_empty() {
        0.0
    } else {
        total_score / subjects.len() as f64
    };
    Unranked {
        student_id: student.id,
        student: student.name.clone(),
        total_marks,
        average,
    }
}

pub fn class_average(averages: &[f64]) -> f64 {
    if averages.is_empty() {
        return 0.0;
    }
    averages.iter().sum::<f64>() / averages.len() as f64
}

pub fn pass_percentage(averages: &[f64]) -> f64 {
    if averages.is_empty() {
        return 0.0;
    }
    let passed = averages.iter().filter(|a| **a >= PASSING_MARK).count();
    (passed as f64 / averages.len() as f64) * 100.0
}

/// Ranks students by descending average. The sort is stable, so equal
/// averages keep roster order.
fn assign_ranks(mut rows: Vec<Unranked>) -> Vec<StudentResult> {
    rows.sort_by(|a, b| b.average.partial_cmp(&a.average).unwrap_or(Ordering::Equal));
    rows.into_iter()
        .enumerate()
        .map(|(i, r)| StudentResult {
            rank: i + 1,
            student_id: r.student_id,
            student: r.student,
            total_marks: r.total_marks,
            average: r.average,
        })
        .collect()
}

/// Computes ranked results and class aggregates. Reads only; unset marks
/// count as 0.
pub fn compute_results(
    students: &[Student],
    subjects: &[Subject],
    ledger: &Ledger,
) -> ResultSnapshot {
    let rows: Vec<Unranked> = students
        .iter()
        .map(|s| student_totals(s, subjects, ledger))
        .collect();
    let averages: Vec<f64> = rows.iter().map(|r| r.average).collect();

    ResultSnapshot {
        class_average: class_average(&averages),
        pass_percentage: pass_percentage(&averages),
        results: assign_ranks(rows),
    }
}
