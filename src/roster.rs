use crate::model::{Outcome, Rejection, Student, StudentId};

/// Ordered list of students. Duplicate names are allowed; position is the
/// display order and the key callers address students by.
#[derive(Debug, Clone, Default)]
pub struct Roster {
    students: Vec<Student>,
}

impl Roster {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            students: names
                .into_iter()
                .map(|n| Student {
                    id: StudentId::new(),
                    name: n.into(),
                })
                .collect(),
        }
    }

    pub fn add(&mut self, name: &str) -> Outcome<StudentId> {
        let name = name.trim();
        if name.is_empty() {
            return Outcome::Rejected(Rejection::BlankName);
        }
        let id = StudentId::new();
        self.students.push(Student {
            id,
            name: name.to_string(),
        });
        Outcome::Applied(id)
    }

    pub fn rename(&mut self, index: usize, name: &str) -> Outcome {
        let Some(student) = self.students.get_mut(index) else {
            return Outcome::Rejected(Rejection::NoSuchStudent);
        };
        let name = name.trim();
        if name.is_empty() {
            return Outcome::Rejected(Rejection::BlankName);
        }
        student.name = name.to_string();
        Outcome::Applied(())
    }

    pub fn remove(&mut self, index: usize) -> Outcome<Student> {
        if index >= self.students.len() {
            return Outcome::Rejected(Rejection::NoSuchStudent);
        }
        Outcome::Applied(self.students.remove(index))
    }

    pub fn get(&self, index: usize) -> Option<&Student> {
        self.students.get(index)
    }

    pub fn students(&self) -> &[Student] {
        &self.students
    }

    pub fn names(&self) -> Vec<&str> {
        self.students.iter().map(|s| s.name.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.students.len()
    }

    pub fn is_empty(&self) -> bool {
        self.students.is_empty()
    }

    pub fn clear(&mut self) {
        self.students.clear();
    }
}
