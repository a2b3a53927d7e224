//! Application state for one open workspace.
//!
//! `App` owns every repository plus the session controller and is handed to
//! the IPC handlers by `&mut`. Controllers mutate a repository, the
//! repository writes through to the store, and the handler re-renders the
//! affected table from the repository.

use crate::attendance::AttendanceBook;
use crate::clock::Clock;
use crate::forms::{self, StudentDraft, SubmitError, TeacherDraft};
use crate::grades::GradeBook;
use crate::model::{AttendanceStatus, Role, Student, Teacher, User};
use crate::repo::Repository;
use crate::session::{Page, SessionController};
use crate::store::{Store, DARK_MODE_KEY};
use crate::views::{self, DashboardSummary, TableView};
use rand::rngs::StdRng;

pub struct App {
    store: Store,
    pub users: Repository<User>,
    pub students: Repository<Student>,
    pub teachers: Repository<Teacher>,
    pub attendance: AttendanceBook,
    pub grades: GradeBook,
    pub session: SessionController,
    clock: Box<dyn Clock>,
    rng: StdRng,
}

impl App {
    pub fn open(store: Store, clock: Box<dyn Clock>, rng: StdRng) -> Self {
        Self {
            users: Repository::load(store.clone()),
            students: Repository::load(store.clone()),
            teachers: Repository::load(store.clone()),
            attendance: AttendanceBook::load(store.clone()),
            grades: GradeBook::load(store.clone()),
            session: SessionController::load(store.clone()),
            store,
            clock,
            rng,
        }
    }

    /// Page to show on start-up. Without a saved session the demo data is
    /// seeded into any empty collection first.
    pub fn init(&mut self) -> anyhow::Result<Page> {
        if self.session.current_user().is_none() {
            self.seed_demo_data()?;
        }
        Ok(self.session.initial_page())
    }

    pub fn seed_demo_data(&mut self) -> anyhow::Result<()> {
        if self.users.is_empty() {
            self.users.extend(demo_users())?;
        }
        if self.students.is_empty() {
            self.students.extend(demo_students())?;
        }
        if self.teachers.is_empty() {
            self.teachers.extend(demo_teachers())?;
        }
        log::info!("demo data initialized");
        Ok(())
    }

    pub fn save_student(&mut self, draft: StudentDraft) -> Result<Student, SubmitError> {
        forms::submit_student(&mut self.students, draft, &*self.clock)
    }

    /// Nothing happens unless the caller confirmed. Returns whether a
    /// student was removed.
    pub fn delete_student(&mut self, id: &str, confirmed: bool) -> anyhow::Result<bool> {
        if !confirmed {
            return Ok(false);
        }
        let removed = self.students.remove(id)?;
        if removed {
            log::info!("student deleted: {id}");
        }
        Ok(removed)
    }

    pub fn save_teacher(&mut self, draft: TeacherDraft) -> Result<Teacher, SubmitError> {
        forms::submit_teacher(&mut self.teachers, draft, &*self.clock)
    }

    pub fn delete_teacher(&mut self, id: &str, confirmed: bool) -> anyhow::Result<bool> {
        if !confirmed {
            return Ok(false);
        }
        let removed = self.teachers.remove(id)?;
        if removed {
            log::info!("teacher deleted: {id}");
        }
        Ok(removed)
    }

    /// Unknown students are ignored. Returns whether a record was written.
    pub fn mark_attendance(
        &mut self,
        student_id: &str,
        date: &str,
        status: AttendanceStatus,
    ) -> anyhow::Result<bool> {
        if self.students.find_by_id(student_id).is_none() {
            return Ok(false);
        }
        self.attendance.mark(student_id, date, status)?;
        log::info!(
            "attendance marked: {student_id} {date} {}",
            status.as_str()
        );
        Ok(true)
    }

    pub fn set_marks(&mut self, student_id: &str, course: &str, marks: u32) -> anyhow::Result<()> {
        self.grades.set_marks(student_id, course, marks)?;
        log::info!("marks set: {student_id} {course} {marks}");
        Ok(())
    }

    pub fn student_view(&self, search: Option<&str>) -> TableView {
        views::student_table(self.students.list(), search)
    }

    pub fn teacher_view(&self, search: Option<&str>) -> TableView {
        views::teacher_table(self.teachers.list(), search)
    }

    pub fn attendance_view(&self, course: &str, date: &str) -> TableView {
        if course.trim().is_empty() || date.trim().is_empty() {
            return views::attendance_table(None);
        }
        let entries =
            self.attendance
                .records_for_course_and_date(self.students.list(), course, date);
        views::attendance_table(Some(entries.as_slice()))
    }

    /// Seeds grades on first render, then renders. Unseeded students still
    /// get a fresh random mark each time.
    pub fn grade_view(&mut self) -> anyhow::Result<TableView> {
        if self.grades.ensure_seeded(self.students.list(), &mut self.rng)? {
            log::info!("sample grades generated");
        }
        Ok(views::grade_table(
            self.students.list(),
            &self.grades,
            &mut self.rng,
        ))
    }

    pub fn dashboard(&self) -> DashboardSummary {
        views::dashboard_summary(self.students.list(), self.teachers.list(), self.users.list())
    }

    /// The table that goes with `page`, if it has one. Attendance needs a
    /// course and date, so it opens blank.
    pub fn page_view(&mut self, page: Page) -> anyhow::Result<Option<TableView>> {
        Ok(match page {
            Page::Students => Some(self.student_view(None)),
            Page::Teachers => Some(self.teacher_view(None)),
            Page::Grades => Some(self.grade_view()?),
            Page::Attendance => Some(views::attendance_table(None)),
            Page::Login | Page::Signup | Page::Dashboard | Page::Courses => None,
        })
    }

    pub fn dark_mode(&self) -> bool {
        self.store.load_raw(DARK_MODE_KEY).as_deref() == Some("true")
    }

    pub fn set_dark_mode(&self, on: bool) -> anyhow::Result<()> {
        self.store
            .save_raw(DARK_MODE_KEY, if on { "true" } else { "false" })
    }
}

fn demo_users() -> Vec<User> {
    [
        ("Admin User", "admin@college.com", Role::Admin),
        ("John Doe", "student@college.com", Role::Student),
        ("Jane Smith", "teacher@college.com", Role::Teacher),
    ]
    .into_iter()
    .map(|(name, email, role)| User {
        name: name.to_string(),
        email: email.to_string(),
        password: "password123".to_string(),
        role,
    })
    .collect()
}

fn demo_students() -> Vec<Student> {
    [
        ("STU001", "Raj", "Kumar", "raj@college.com", "9876543210", "CS101", "2024-01-15"),
        ("STU002", "Priya", "Singh", "priya@college.com", "9876543211", "BUS201", "2024-02-10"),
        ("STU003", "Amit", "Patel", "amit@college.com", "9876543212", "ENG301", "2024-01-20"),
        ("STU004", "Neha", "Gupta", "neha@college.com", "9876543213", "CS101", "2024-03-05"),
        ("STU005", "Vikram", "Sharma", "vikram@college.com", "9876543214", "BUS201", "2024-02-18"),
    ]
    .into_iter()
    .map(|(id, first, last, email, phone, course, enrolled)| Student {
        id: id.to_string(),
        first_name: first.to_string(),
        last_name: last.to_string(),
        email: email.to_string(),
        phone: phone.to_string(),
        course: course.to_string(),
        enrollment_date: enrolled.to_string(),
    })
    .collect()
}

fn demo_teachers() -> Vec<Teacher> {
    [
        ("TEACH001", "Dr.", "Sharma", "sharma@college.com", "Mathematics", "CS", "PhD"),
        ("TEACH002", "Prof.", "Gupta", "gupta@college.com", "Physics", "ENGG", "M.Tech"),
        ("TEACH003", "Mrs.", "Verma", "verma@college.com", "Economics", "BUS", "MBA"),
        ("TEACH004", "Mr.", "Singh", "singh@college.com", "Programming", "CS", "B.Tech"),
    ]
    .into_iter()
    .map(|(id, first, last, email, subject, dept, qual)| Teacher {
        id: id.to_string(),
        first_name: first.to_string(),
        last_name: last.to_string(),
        email: email.to_string(),
        subject: subject.to_string(),
        department: dept.to_string(),
        qualification: qual.to_string(),
    })
    .collect()
}
