use crate::clock::Clock;
use crate::model::{Role, SessionIdentity, Student, Teacher, User};
use crate::repo::{generate_id, Repository};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const STUDENT_ID_PREFIX: &str = "STU";
pub const TEACHER_ID_PREFIX: &str = "TEACH";
pub const MIN_PASSWORD_LEN: usize = 6;

/// User-facing validation failures. The message text is what the front end
/// shows verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormError {
    #[error("Please fill in all fields")]
    MissingFields,
    #[error("Passwords do not match")]
    PasswordMismatch,
    #[error("Password must be at least 6 characters")]
    PasswordTooShort,
    #[error("Email already registered")]
    EmailTaken,
    #[error("Invalid credentials. Try: admin@college.com / password123")]
    InvalidCredentials,
    #[error("unknown role: {0}")]
    UnknownRole(String),
}

#[derive(Debug, Error)]
pub enum SubmitError {
    #[error(transparent)]
    Invalid(#[from] FormError),
    #[error("store write failed: {0:#}")]
    Store(#[from] anyhow::Error),
}

fn blank(s: &str) -> bool {
    s.trim().is_empty()
}

fn parse_role(raw: &str) -> Result<Role, FormError> {
    Role::parse(raw).ok_or_else(|| FormError::UnknownRole(raw.to_string()))
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StudentDraft {
    #[serde(alias = "studentId", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub course: String,
}

impl StudentDraft {
    pub fn from_student(s: &Student) -> Self {
        Self {
            id: Some(s.id.clone()),
            first_name: s.first_name.clone(),
            last_name: s.last_name.clone(),
            email: s.email.clone(),
            phone: s.phone.clone(),
            course: s.course.clone(),
        }
    }

    fn validate(&self) -> Result<(), FormError> {
        if [&self.first_name, &self.last_name, &self.email, &self.course]
            .iter()
            .any(|f| blank(f))
        {
            return Err(FormError::MissingFields);
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TeacherDraft {
    #[serde(alias = "teacherId", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub subject: String,
    pub department: String,
    pub qualification: String,
}

impl TeacherDraft {
    pub fn from_teacher(t: &Teacher) -> Self {
        Self {
            id: Some(t.id.clone()),
            first_name: t.first_name.clone(),
            last_name: t.last_name.clone(),
            email: t.email.clone(),
            subject: t.subject.clone(),
            department: t.department.clone(),
            qualification: t.qualification.clone(),
        }
    }

    fn validate(&self) -> Result<(), FormError> {
        if [&self.first_name, &self.last_name, &self.email]
            .iter()
            .any(|f| blank(f))
        {
            return Err(FormError::MissingFields);
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LoginDraft {
    pub email: String,
    pub password: String,
    pub role: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SignupDraft {
    pub name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    pub role: String,
}

/// Edit form contents for `id`, or a blank form when there is no such
/// student.
pub fn student_form(students: &Repository<Student>, id: Option<&str>) -> StudentDraft {
    id.and_then(|id| students.find_by_id(id))
        .map(StudentDraft::from_student)
        .unwrap_or_default()
}

pub fn teacher_form(teachers: &Repository<Teacher>, id: Option<&str>) -> TeacherDraft {
    id.and_then(|id| teachers.find_by_id(id))
        .map(TeacherDraft::from_teacher)
        .unwrap_or_default()
}

/// Create (no id) or update (id given) a student. New students get a
/// timestamp id and today's enrollment date; edits keep the stored
/// enrollment date.
pub fn submit_student(
    students: &mut Repository<Student>,
    draft: StudentDraft,
    clock: &dyn Clock,
) -> Result<Student, SubmitError> {
    draft.validate()?;
    let editing = draft.id.as_deref().filter(|id| !blank(id));
    let existing_date = editing
        .and_then(|id| students.find_by_id(id))
        .map(|s| s.enrollment_date.clone());
    let student = Student {
        id: editing
            .map(str::to_string)
            .unwrap_or_else(|| generate_id(STUDENT_ID_PREFIX, clock)),
        first_name: draft.first_name,
        last_name: draft.last_name,
        email: draft.email,
        phone: draft.phone,
        course: draft.course,
        enrollment_date: existing_date.unwrap_or_else(|| clock.today()),
    };
    students.upsert(student.clone())?;
    log::info!("student saved: {}", student.id);
    Ok(student)
}

pub fn submit_teacher(
    teachers: &mut Repository<Teacher>,
    draft: TeacherDraft,
    clock: &dyn Clock,
) -> Result<Teacher, SubmitError> {
    draft.validate()?;
    let id = draft
        .id
        .filter(|id| !blank(id))
        .unwrap_or_else(|| generate_id(TEACHER_ID_PREFIX, clock));
    let teacher = Teacher {
        id,
        first_name: draft.first_name,
        last_name: draft.last_name,
        email: draft.email,
        subject: draft.subject,
        department: draft.department,
        qualification: draft.qualification,
    };
    teachers.upsert(teacher.clone())?;
    log::info!("teacher saved: {}", teacher.id);
    Ok(teacher)
}

/// Exact match on email, password and role.
pub fn check_login(users: &Repository<User>, draft: &LoginDraft) -> Result<SessionIdentity, FormError> {
    if draft.email.is_empty() || draft.password.is_empty() {
        return Err(FormError::MissingFields);
    }
    let role = parse_role(&draft.role)?;
    users
        .find(|u| u.email == draft.email && u.password == draft.password && u.role == role)
        .map(SessionIdentity::from)
        .ok_or(FormError::InvalidCredentials)
}

/// Validate a signup and append the new user. Nothing is written when any
/// check fails.
pub fn register_user(users: &mut Repository<User>, draft: SignupDraft) -> Result<User, SubmitError> {
    if draft.name.is_empty()
        || draft.email.is_empty()
        || draft.password.is_empty()
        || draft.confirm_password.is_empty()
    {
        return Err(FormError::MissingFields.into());
    }
    if draft.password != draft.confirm_password {
        return Err(FormError::PasswordMismatch.into());
    }
    // Length in UTF-16 units, as the browser form measured it.
    if draft.password.encode_utf16().count() < MIN_PASSWORD_LEN {
        return Err(FormError::PasswordTooShort.into());
    }
    if users.find(|u| u.email == draft.email).is_some() {
        return Err(FormError::EmailTaken.into());
    }
    let role = parse_role(&draft.role)?;

    let user = User {
        name: draft.name,
        email: draft.email,
        password: draft.password,
        role,
    };
    users.upsert(user.clone())?;
    log::info!("user registered: {} ({})", user.email, user.role.as_str());
    Ok(user)
}
