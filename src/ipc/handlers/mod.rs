pub mod attendance;
pub mod backup_exchange;
pub mod core;
pub mod grades;
pub mod session;
pub mod setup;
pub mod students;
pub mod teachers;
