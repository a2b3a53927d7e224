//! Table rendering.
//!
//! Everything here is a pure function of the current collections: the IPC
//! layer calls these after each mutation and ships the result to the front
//! end, which only has to paint rows.

use crate::attendance::AttendanceEntry;
use crate::grades::{self, GradeBook};
use crate::model::{Student, Teacher, User, COURSES};
use rand::Rng;
use serde::Serialize;

pub const NO_STUDENTS: &str = "No students found. Add a new student to get started.";
pub const NO_TEACHERS: &str = "No teachers found. Add a new teacher to get started.";
pub const NO_COURSE_STUDENTS: &str = "No students found for this course.";
pub const NO_GRADES: &str = "No grades found.";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TableRow {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub cells: Vec<String>,
}

impl TableRow {
    fn matches(&self, needle_lower: &str) -> bool {
        self.cells.join(" ").to_lowercase().contains(needle_lower)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TableView {
    pub columns: Vec<&'static str>,
    pub rows: Vec<TableRow>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub empty_message: Option<&'static str>,
}

impl TableView {
    fn new(columns: &[&'static str]) -> Self {
        Self {
            columns: columns.to_vec(),
            rows: Vec::new(),
            empty_message: None,
        }
    }

    /// Keep rows whose text contains `search`, ignoring case. The empty
    /// message is only for an empty collection, so a search that hides
    /// everything shows no message.
    fn filtered(mut self, search: Option<&str>) -> Self {
        let needle = search.map(str::trim).unwrap_or("").to_lowercase();
        if !needle.is_empty() {
            self.rows.retain(|r| r.matches(&needle));
        }
        self
    }
}

pub fn student_table(students: &[Student], search: Option<&str>) -> TableView {
    let mut view = TableView::new(&[
        "ID",
        "Name",
        "Email",
        "Phone",
        "Course",
        "Enrollment Date",
    ]);
    if students.is_empty() {
        view.empty_message = Some(NO_STUDENTS);
        return view;
    }
    view.rows = students
        .iter()
        .map(|s| TableRow {
            id: Some(s.id.clone()),
            cells: vec![
                s.id.clone(),
                s.full_name(),
                s.email.clone(),
                s.phone.clone(),
                s.course.clone(),
                s.enrollment_date.clone(),
            ],
        })
        .collect();
    view.filtered(search)
}

pub fn teacher_table(teachers: &[Teacher], search: Option<&str>) -> TableView {
    let mut view = TableView::new(&[
        "ID",
        "Name",
        "Email",
        "Subject",
        "Department",
        "Qualification",
    ]);
    if teachers.is_empty() {
        view.empty_message = Some(NO_TEACHERS);
        return view;
    }
    view.rows = teachers
        .iter()
        .map(|t| TableRow {
            id: Some(t.id.clone()),
            cells: vec![
                t.id.clone(),
                t.full_name(),
                t.email.clone(),
                t.subject.clone(),
                t.department.clone(),
                t.qualification.clone(),
            ],
        })
        .collect();
    view.filtered(search)
}

/// `entries` is `None` when the date or course picker is still blank.
pub fn attendance_table(entries: Option<&[AttendanceEntry]>) -> TableView {
    let mut view = TableView::new(&["Student Name", "Student ID", "Status"]);
    let Some(entries) = entries else {
        return view;
    };
    if entries.is_empty() {
        view.empty_message = Some(NO_COURSE_STUDENTS);
        return view;
    }
    view.rows = entries
        .iter()
        .map(|e| TableRow {
            id: Some(e.student_id.clone()),
            cells: vec![
                e.student_name.clone(),
                e.student_id.clone(),
                e.status.as_str().to_string(),
            ],
        })
        .collect();
    view
}

/// One row per student for the student's own course. Students without a
/// stored grade get a random placeholder on every render.
pub fn grade_table<R: Rng>(students: &[Student], book: &GradeBook, rng: &mut R) -> TableView {
    let mut view = TableView::new(&["Student Name", "Course", "Marks", "Grade", "Status"]);
    view.rows = students
        .iter()
        .map(|s| {
            let marks = book.grade_for(&s.id, &s.course, rng);
            let status = if grades::is_pass(marks) { "Pass" } else { "Fail" };
            TableRow {
                id: Some(s.id.clone()),
                cells: vec![
                    s.full_name(),
                    s.course.clone(),
                    marks.to_string(),
                    grades::letter_grade(marks).to_string(),
                    status.to_string(),
                ],
            }
        })
        .collect();
    if view.rows.is_empty() {
        view.empty_message = Some(NO_GRADES);
    }
    view
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseCount {
    pub course: &'static str,
    pub students: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub student_count: usize,
    pub teacher_count: usize,
    pub user_count: usize,
    pub courses: Vec<CourseCount>,
}

pub fn dashboard_summary(students: &[Student], teachers: &[Teacher], users: &[User]) -> DashboardSummary {
    DashboardSummary {
        student_count: students.len(),
        teacher_count: teachers.len(),
        user_count: users.len(),
        courses: COURSES
            .iter()
            .map(|&c| CourseCount {
                course: c,
                students: students.iter().filter(|s| s.course == c).count(),
            })
            .collect(),
    }
}
