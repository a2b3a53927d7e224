//! Durable store adapter.
//!
//! Every persisted value is a JSON string under a fixed key. Reads never
//! fail: a missing key, a backend read error, or a value that no longer
//! parses all fall back to the caller's default. Writes overwrite the key
//! in full.

use crate::db;
use rusqlite::Connection;
use serde::de::DeserializeOwned;
use serde::Serialize;
#[cfg(test)]
use std::cell::{Cell, RefCell};
#[cfg(test)]
use std::collections::BTreeMap;
use std::rc::Rc;

pub const USERS_KEY: &str = "users";
pub const STUDENTS_KEY: &str = "students";
pub const TEACHERS_KEY: &str = "teachers";
pub const ATTENDANCE_KEY: &str = "attendance";
pub const GRADES_KEY: &str = "grades";
pub const CURRENT_USER_KEY: &str = "currentUser";
pub const DARK_MODE_KEY: &str = "darkMode";

pub trait KvBackend {
    fn get(&self, key: &str) -> anyhow::Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> anyhow::Result<()>;
    fn remove(&self, key: &str) -> anyhow::Result<()>;
}

pub struct SqliteBackend {
    conn: Connection,
}

impl SqliteBackend {
    pub fn new(conn: Connection) -> Self {
        Self { conn }
    }
}

impl KvBackend for SqliteBackend {
    fn get(&self, key: &str) -> anyhow::Result<Option<String>> {
        db::kv_get(&self.conn, key)
    }

    fn set(&self, key: &str, value: &str) -> anyhow::Result<()> {
        db::kv_set(&self.conn, key, value)
    }

    fn remove(&self, key: &str) -> anyhow::Result<()> {
        db::kv_delete(&self.conn, key)
    }
}

/// Process-local backend. Counts writes so callers can assert that a
/// no-op mutation did not touch the store.
#[cfg(test)]
#[derive(Default)]
pub struct MemoryBackend {
    values: RefCell<BTreeMap<String, String>>,
    writes: Cell<usize>,
}

#[cfg(test)]
impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn write_count(&self) -> usize {
        self.writes.get()
    }
}

#[cfg(test)]
impl KvBackend for MemoryBackend {
    fn get(&self, key: &str) -> anyhow::Result<Option<String>> {
        Ok(self.values.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> anyhow::Result<()> {
        self.values
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        self.writes.set(self.writes.get() + 1);
        Ok(())
    }

    fn remove(&self, key: &str) -> anyhow::Result<()> {
        self.values.borrow_mut().remove(key);
        self.writes.set(self.writes.get() + 1);
        Ok(())
    }
}

/// Backend whose every call errors, as a closed or unreadable database
/// would.
#[cfg(test)]
pub struct FailingBackend;

#[cfg(test)]
impl KvBackend for FailingBackend {
    fn get(&self, key: &str) -> anyhow::Result<Option<String>> {
        anyhow::bail!("read of {key} failed: disk I/O error")
    }

    fn set(&self, key: &str, _value: &str) -> anyhow::Result<()> {
        anyhow::bail!("write of {key} failed: disk I/O error")
    }

    fn remove(&self, key: &str) -> anyhow::Result<()> {
        anyhow::bail!("delete of {key} failed: disk I/O error")
    }
}

/// Cheap-to-clone handle shared by every repository of one workspace.
#[derive(Clone)]
pub struct Store {
    backend: Rc<dyn KvBackend>,
}

impl Store {
    pub fn new(backend: Rc<dyn KvBackend>) -> Self {
        Self { backend }
    }

    pub fn sqlite(conn: Connection) -> Self {
        Self::new(Rc::new(SqliteBackend::new(conn)))
    }

    #[cfg(test)]
    pub fn in_memory() -> Self {
        Self::new(Rc::new(MemoryBackend::new()))
    }

    pub fn load_raw(&self, key: &str) -> Option<String> {
        match self.backend.get(key) {
            Ok(v) => v,
            Err(e) => {
                log::warn!("store read failed for {key}: {e:#}; treating as absent");
                None
            }
        }
    }

    pub fn load_or<T: DeserializeOwned>(&self, key: &str, default: T) -> T {
        let Some(raw) = self.load_raw(key) else {
            return default;
        };
        match serde_json::from_str::<T>(&raw) {
            Ok(v) => v,
            Err(e) => {
                log::warn!("stored value for {key} does not parse ({e}); using default");
                default
            }
        }
    }

    pub fn load_or_default<T: DeserializeOwned + Default>(&self, key: &str) -> T {
        self.load_or(key, T::default())
    }

    pub fn save<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> anyhow::Result<()> {
        let raw = serde_json::to_string(value)?;
        self.save_raw(key, &raw)
    }

    pub fn save_raw(&self, key: &str, raw: &str) -> anyhow::Result<()> {
        self.backend.set(key, raw)
    }

    pub fn remove(&self, key: &str) -> anyhow::Result<()> {
        self.backend.remove(key)
    }
}
