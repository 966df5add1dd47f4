use crate::calc::{self, ResultSnapshot};
use crate::catalog::Catalog;
use crate::ledger::Ledger;
use crate::model::{MarkRecord, Outcome, Rejection, Student, StudentId, Subject};
use crate::roster::Roster;
use crate::store::{KvStore, ALL_KEYS, MARKS_KEY, STUDENTS_KEY, SUBJECTS_KEY};
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Serialized bytes of the three persisted collections, in store layout.
#[derive(Debug, Clone, PartialEq)]
pub struct PersistedState {
    pub students: Vec<u8>,
    pub subjects: Vec<u8>,
    pub marks: Vec<u8>,
}

impl PersistedState {
    pub fn entries(&self) -> [(&'static str, &[u8]); 3] {
        [
            (STUDENTS_KEY, self.students.as_slice()),
            (SUBJECTS_KEY, self.subjects.as_slice()),
            (MARKS_KEY, self.marks.as_slice()),
        ]
    }
}

/// Roster, catalog and ledger bound to an injected store. Every mutation
/// updates memory first and then mirrors the touched collections to the store.
pub struct Gradebook<S: KvStore> {
    store: S,
    roster: Roster,
    catalog: Catalog,
    ledger: Ledger,
    last_results: Option<ResultSnapshot>,
}

fn load_json<T: DeserializeOwned>(store: &impl KvStore, key: &str) -> Option<T> {
    let bytes = match store.load(key) {
        Ok(Some(b)) => b,
        Ok(None) => return None,
        Err(e) => {
            tracing::warn!(key, error = %e, "failed to load collection");
            return None;
        }
    };
    match serde_json::from_slice(&bytes) {
        Ok(v) => Some(v),
        Err(e) => {
            tracing::warn!(key, error = %e, "ignoring undecodable collection");
            None
        }
    }
}

/// Keeps the finite numeric entries of one stored record. Anything else, such
/// as the empty string left by a cleared field, reads as unset.
fn decode_record(index: usize, value: &serde_json::Value) -> MarkRecord {
    let Some(entries) = value.as_object() else {
        if !value.is_null() {
            tracing::warn!(student = index, "ignoring non-object mark record");
        }
        return MarkRecord::new();
    };
    entries
        .iter()
        .filter_map(|(subject, v)| match v.as_f64().filter(|m| m.is_finite()) {
            Some(m) => Some((subject.clone(), m)),
            None => {
                if !matches!(v, serde_json::Value::String(s) if s.is_empty()) {
                    tracing::warn!(
                        student = index,
                        subject = %subject,
                        "ignoring non-numeric mark"
                    );
                }
                None
            }
        })
        .collect()
}

fn load_model(store: &impl KvStore) -> (Roster, Catalog, Ledger) {
    let names: Option<Vec<String>> = load_json(store, STUDENTS_KEY);
    let subjects: Option<Vec<Subject>> = load_json(store, SUBJECTS_KEY);
    let marks: Option<Vec<serde_json::Value>> = load_json(store, MARKS_KEY);

    let roster = Roster::from_names(names.unwrap_or_default());
    let catalog = Catalog::from_subjects(subjects.unwrap_or_default());

    let mut records: Vec<MarkRecord> = marks
        .unwrap_or_default()
        .iter()
        .enumerate()
        .map(|(i, v)| decode_record(i, v))
        .collect();
    if records.len() != roster.len() {
        if !records.is_empty() {
            tracing::warn!(
                students = roster.len(),
                records = records.len(),
                "mark records misaligned with roster; realigning"
            );
        }
        records.resize_with(roster.len(), MarkRecord::new);
    }

    let mut ledger = Ledger::new();
    for (student, record) in roster.students().iter().zip(records) {
        ledger.insert_record(student.id, record);
    }

    tracing::debug!(
        students = roster.len(),
        subjects = catalog.len(),
        "gradebook loaded"
    );
    (roster, catalog, ledger)
}

impl<S: KvStore> Gradebook<S> {
    /// Loads each collection independently. Missing marks alongside a stored
    /// roster become one empty record per student; a misaligned marks list is
    /// padded or truncated to the roster length.
    pub fn open(store: S) -> Self {
        let (roster, catalog, ledger) = load_model(&store);
        Self {
            store,
            roster,
            catalog,
            ledger,
            last_results: None,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn students(&self) -> &[Student] {
        self.roster.students()
    }

    pub fn subjects(&self) -> &[Subject] {
        self.catalog.subjects()
    }

    /// Mark records in roster order.
    pub fn mark_records(&self) -> Vec<MarkRecord> {
        self.roster
            .students()
            .iter()
            .map(|s| self.ledger.record(s.id).cloned().unwrap_or_default())
            .collect()
    }

    pub fn mark(&self, student_index: usize, subject: &str) -> Option<f64> {
        let student = self.roster.get(student_index)?;
        self.ledger.mark(student.id, subject)
    }

    pub fn last_results(&self) -> Option<&ResultSnapshot> {
        self.last_results.as_ref()
    }

    pub fn add_student(&mut self, name: &str) -> Outcome<StudentId> {
        let outcome = self.roster.add(name);
        if let Outcome::Applied(id) = &outcome {
            self.ledger.insert_record(*id, MarkRecord::new());
            tracing::debug!(student = %id, "student added");
            self.persist_students();
            self.persist_marks();
        }
        outcome
    }

    pub fn rename_student(&mut self, index: usize, name: &str) -> Outcome {
        let outcome = self.roster.rename(index, name);
        if outcome.is_applied() {
            tracing::debug!(index, "student renamed");
            self.persist_students();
        }
        outcome
    }

    pub fn remove_student(&mut self, index: usize) -> Outcome<Student> {
        let outcome = self.roster.remove(index);
        if let Outcome::Applied(student) = &outcome {
            self.ledger.remove_record(student.id);
            tracing::debug!(index, student = %student.id, "student removed");
            self.persist_students();
            self.persist_marks();
        }
        outcome
    }

    pub fn add_subject(&mut self, name: &str, total: &str) -> Outcome {
        let outcome = self.catalog.add(name, total);
        if outcome.is_applied() {
            tracing::debug!(subject = name.trim(), "subject added");
            self.persist_subjects();
        }
        outcome
    }

    /// Edits a subject in place. Existing marks are carried over to a new name
    /// but are not re-validated against a lowered total.
    pub fn edit_subject(&mut self, index: usize, name: &str, total: i64) -> Outcome<Subject> {
        let outcome = self.catalog.edit(index, name, total);
        if let Outcome::Applied(previous) = &outcome {
            let moved = self.ledger.rename_subject(&previous.name, name.trim());
            tracing::debug!(index, moved, "subject edited");
            self.persist_subjects();
            if moved > 0 {
                self.persist_marks();
            }
        }
        outcome
    }

    pub fn remove_subject(&mut self, index: usize) -> Outcome<Subject> {
        let outcome = self.catalog.remove(index);
        if let Outcome::Applied(removed) = &outcome {
            let dropped = self.ledger.remove_subject(&removed.name);
            tracing::debug!(index, dropped, "subject removed");
            self.persist_subjects();
            self.persist_marks();
        }
        outcome
    }

    /// Records a mark against the subject's current total.
    pub fn set_mark(
        &mut self,
        student_index: usize,
        subject: &str,
        raw: &str,
    ) -> Outcome<Option<f64>> {
        let Some(student) = self.roster.get(student_index) else {
            return Outcome::Rejected(Rejection::NoSuchStudent);
        };
        let Some(total) = self.catalog.find(subject).map(|s| s.total) else {
            return Outcome::Rejected(Rejection::UnknownSubject);
        };
        let outcome = self.ledger.set_mark(student.id, subject, raw, total);
        if outcome.is_applied() {
            self.persist_marks();
        }
        outcome
    }

    /// Recompute is offered only once at least one mark has been entered.
    pub fn can_compute(&self) -> bool {
        self.ledger.has_any_mark()
    }

    pub fn compute(&mut self) -> Outcome<&ResultSnapshot> {
        if !self.can_compute() {
            return Outcome::Rejected(Rejection::NoMarks);
        }
        let snapshot = calc::compute_results(
            self.roster.students(),
            self.catalog.subjects(),
            &self.ledger,
        );
        tracing::debug!(
            students = snapshot.results.len(),
            class_average = snapshot.class_average,
            pass_percentage = snapshot.pass_percentage,
            "results computed"
        );
        let stored: &ResultSnapshot = self.last_results.insert(snapshot);
        Outcome::Applied(stored)
    }

    /// Clears every persisted key and all in-memory state.
    pub fn reset(&mut self) -> anyhow::Result<()> {
        self.roster.clear();
        self.catalog.clear();
        self.ledger.clear();
        self.last_results = None;
        for key in ALL_KEYS {
            self.store.remove(key)?;
        }
        tracing::info!("gradebook reset");
        Ok(())
    }

    /// Replaces every persisted key with `state` and reloads through the
    /// normal load policy. Memory is reloaded from the store even when a write
    /// fails part way, so the two never disagree.
    pub fn replace_persisted(&mut self, state: &PersistedState) -> anyhow::Result<()> {
        let written: anyhow::Result<()> = state
            .entries()
            .into_iter()
            .try_for_each(|(key, bytes)| self.store.save(key, bytes));
        let (roster, catalog, ledger) = load_model(&self.store);
        self.roster = roster;
        self.catalog = catalog;
        self.ledger = ledger;
        self.last_results = None;
        written
    }

    /// The bytes each collection persists as, regardless of emptiness.
    pub fn persisted_state(&self) -> anyhow::Result<PersistedState> {
        Ok(PersistedState {
            students: serde_json::to_vec(&self.roster.names())?,
            subjects: serde_json::to_vec(self.catalog.subjects())?,
            marks: serde_json::to_vec(&self.mark_records())?,
        })
    }

    // A collection is written only while non-empty; emptying it leaves the
    // previous value in the store until reset.
    fn persist_students(&mut self) {
        if self.roster.is_empty() {
            return;
        }
        let names = self.roster.names();
        save_json(&mut self.store, STUDENTS_KEY, &names);
    }

    fn persist_subjects(&mut self) {
        if self.catalog.is_empty() {
            return;
        }
        save_json(&mut self.store, SUBJECTS_KEY, self.catalog.subjects());
    }

    fn persist_marks(&mut self) {
        if self.roster.is_empty() {
            return;
        }
        let records = self.mark_records();
        save_json(&mut self.store, MARKS_KEY, &records);
    }
}

fn save_json<T: Serialize + ?Sized>(store: &mut impl KvStore, key: &str, value: &T) {
    let bytes = match serde_json::to_vec(value) {
        Ok(b) => b,
        Err(e) => {
            tracing::warn!(key, error = %e, "failed to encode collection");
            return;
        }
    };
    if let Err(e) = store.save(key, &bytes) {
        tracing::warn!(key, error = %e, "failed to persist collection");
    }
}

