use crate::model::{AttendanceRecord, AttendanceStatus, Student};
use crate::repo::Repository;
use crate::store::Store;
use serde::Serialize;

/// Composite key for one (date, student) attendance entry. Lookups depend
/// on this exact construction.
pub fn attendance_key(date: &str, student_id: &str) -> String {
    format!("{}-{}", date, student_id)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceEntry {
    pub student_id: String,
    pub student_name: String,
    pub status: AttendanceStatus,
}

pub struct AttendanceBook {
    records: Repository<AttendanceRecord>,
}

impl AttendanceBook {
    pub fn load(store: Store) -> Self {
        Self {
            records: Repository::load(store),
        }
    }

    #[cfg(test)]
    pub fn records(&self) -> &[AttendanceRecord] {
        self.records.list()
    }

    /// Missing entries read as absent.
    pub fn status_for(&self, date: &str, student_id: &str) -> AttendanceStatus {
        self.records
            .find_by_id(&attendance_key(date, student_id))
            .map(|r| r.status)
            .unwrap_or_default()
    }

    pub fn mark(
        &mut self,
        student_id: &str,
        date: &str,
        status: AttendanceStatus,
    ) -> anyhow::Result<()> {
        let key = attendance_key(date, student_id);
        let record = match self.records.find_by_id(&key) {
            Some(existing) => AttendanceRecord {
                status,
                ..existing.clone()
            },
            None => AttendanceRecord {
                key,
                student_id: student_id.to_string(),
                date: date.to_string(),
                status,
            },
        };
        self.records.upsert(record)
    }

    /// Students enrolled in `course`, in roster order, with their status on
    /// `date`.
    pub fn records_for_course_and_date(
        &self,
        students: &[Student],
        course: &str,
        date: &str,
    ) -> Vec<AttendanceEntry> {
        students
            .iter()
            .filter(|s| s.course == course)
            .map(|s| AttendanceEntry {
                student_id: s.id.clone(),
                student_name: s.full_name(),
                status: self.status_for(date, &s.id),
            })
            .collect()
    }
}
