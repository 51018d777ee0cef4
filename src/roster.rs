use serde::{Deserialize, Serialize};

use crate::grades::Grades;

/// One student's profile and grades. The pair (name, className) is the
/// record's natural key; equality is exact string comparison post-trim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentRecord {
    pub name: String,
    pub class_name: String,
    pub grades: Grades,
}

impl StudentRecord {
    fn same_student(&self, other: &StudentRecord) -> bool {
        self.name == other.name && self.class_name == other.class_name
    }
}

/// The authoritative in-memory record sequence for the session.
#[derive(Debug, Default)]
pub struct Roster {
    records: Vec<StudentRecord>,
}

impl Roster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add-or-edit: the first record with the same (name, className) is
    /// replaced in place, keeping its position; otherwise the record is
    /// appended.
    pub fn upsert(&mut self, record: StudentRecord) {
        match self.records.iter_mut().find(|r| r.same_student(&record)) {
            Some(slot) => *slot = record,
            None => self.records.push(record),
        }
    }

    /// Remove the record at `index`. A stale index is a caller bug: loud in
    /// debug builds, a no-op in release.
    pub fn delete_at(&mut self, index: usize) -> Option<StudentRecord> {
        debug_assert!(
            index < self.records.len(),
            "delete_at out of bounds: {index}"
        );
        if index < self.records.len() {
            Some(self.records.remove(index))
        } else {
            None
        }
    }

    pub fn get(&self, index: usize) -> Option<&StudentRecord> {
        self.records.get(index)
    }

    /// Install a whole new sequence (bulk import, restore from disk).
    pub fn bulk_replace(&mut self, records: Vec<StudentRecord>) {
        self.records = records;
    }

    /// Read-only view for grouping, statistics and export.
    pub fn snapshot(&self) -> &[StudentRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
