use crate::model::{GradeRecord, Student};
use crate::repo::Repository;
use crate::store::Store;
use rand::Rng;
use std::ops::RangeInclusive;

/// Seeded and placeholder marks are drawn from here, not from 0..=100.
pub const SEED_MARKS: RangeInclusive<u32> = 60..=99;
pub const PASS_MARK: u32 = 40;
pub const MAX_MARKS: u32 = 100;

pub fn letter_grade(marks: u32) -> &'static str {
    match marks {
        90.. => "A+",
        80..=89 => "A",
        70..=79 => "B+",
        60..=69 => "B",
        50..=59 => "C",
        40..=49 => "D",
        _ => "F",
    }
}

pub fn is_pass(marks: u32) -> bool {
    marks >= PASS_MARK
}

pub struct GradeBook {
    records: Repository<GradeRecord>,
}

impl GradeBook {
    pub fn load(store: Store) -> Self {
        Self {
            records: Repository::load(store),
        }
    }

    #[cfg(test)]
    pub fn records(&self) -> &[GradeRecord] {
        self.records.list()
    }

    /// One random record per student when nothing is stored yet, written
    /// as a single batch. Returns whether seeding happened.
    pub fn ensure_seeded<R: Rng>(
        &mut self,
        students: &[Student],
        rng: &mut R,
    ) -> anyhow::Result<bool> {
        if !self.records.is_empty() {
            return Ok(false);
        }
        let batch: Vec<GradeRecord> = students
            .iter()
            .map(|s| GradeRecord {
                student_id: s.id.clone(),
                course: s.course.clone(),
                marks: rng.gen_range(SEED_MARKS),
            })
            .collect();
        let seeded = !batch.is_empty();
        self.records.extend(batch)?;
        Ok(seeded)
    }

    pub fn stored_marks(&self, student_id: &str, course: &str) -> Option<u32> {
        self.records
            .find(|g| g.student_id == student_id && g.course == course)
            .map(|g| g.marks)
    }

    /// Stored marks, or a fresh random placeholder that is not persisted.
    /// Placeholders change on every call.
    pub fn grade_for<R: Rng>(&self, student_id: &str, course: &str, rng: &mut R) -> u32 {
        self.stored_marks(student_id, course)
            .unwrap_or_else(|| rng.gen_range(SEED_MARKS))
    }

    pub fn set_marks(&mut self, student_id: &str, course: &str, marks: u32) -> anyhow::Result<()> {
        self.records.upsert(GradeRecord {
            student_id: student_id.to_string(),
            course: course.to_string(),
            marks,
        })
    }
}
