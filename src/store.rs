use std::collections::HashMap;

pub const STUDENTS_KEY: &str = "students";
pub const SUBJECTS_KEY: &str = "subjects";
pub const MARKS_KEY: &str = "marks";

pub const ALL_KEYS: [&str; 3] = [STUDENTS_KEY, SUBJECTS_KEY, MARKS_KEY];

/// Opaque key-value persistence port. Values are the serialized bytes of one
/// named collection; the store never interprets them.
pub trait KvStore {
    fn load(&self, key: &str) -> anyhow::Result<Option<Vec<u8>>>;
    fn save(&mut self, key: &str, bytes: &[u8]) -> anyhow::Result<()>;
    fn remove(&mut self, key: &str) -> anyhow::Result<()>;
}

#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    entries: HashMap<String, Vec<u8>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }
}

impl KvStore for MemoryStore {
    fn load(&self, key: &str) -> anyhow::Result<Option<Vec<u8>>> {
        Ok(self.entries.get(key).cloned())
    }

    fn save(&mut self, key: &str, bytes: &[u8]) -> anyhow::Result<()> {
        self.entries.insert(key.to_string(), bytes.to_vec());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> anyhow::Result<()> {
        self.entries.remove(key);
        Ok(())
    }
}
