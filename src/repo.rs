use crate::clock::Clock;
use crate::model::{AttendanceRecord, GradeRecord, Student, Teacher, User};
use crate::store::{self, Store};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::borrow::Cow;

/// A record kind kept in one store key as a JSON array.
pub trait Entity: Clone + Serialize + DeserializeOwned {
    const STORE_KEY: &'static str;

    fn id(&self) -> Cow<'_, str>;

    /// Whether `other` is the same record for `upsert`.
    fn same_identity(&self, other: &Self) -> bool {
        self.id() == other.id()
    }
}

impl Entity for User {
    const STORE_KEY: &'static str = store::USERS_KEY;

    fn id(&self) -> Cow<'_, str> {
        Cow::Borrowed(&self.email)
    }
}

impl Entity for Student {
    const STORE_KEY: &'static str = store::STUDENTS_KEY;

    fn id(&self) -> Cow<'_, str> {
        Cow::Borrowed(&self.id)
    }
}

impl Entity for Teacher {
    const STORE_KEY: &'static str = store::TEACHERS_KEY;

    fn id(&self) -> Cow<'_, str> {
        Cow::Borrowed(&self.id)
    }
}

impl Entity for AttendanceRecord {
    const STORE_KEY: &'static str = store::ATTENDANCE_KEY;

    fn id(&self) -> Cow<'_, str> {
        Cow::Borrowed(&self.key)
    }
}

impl Entity for GradeRecord {
    const STORE_KEY: &'static str = store::GRADES_KEY;

    fn id(&self) -> Cow<'_, str> {
        Cow::Owned(format!("{}/{}", self.student_id, self.course))
    }

    // The joined id is ambiguous when either half contains '/'.
    fn same_identity(&self, other: &Self) -> bool {
        self.student_id == other.student_id && self.course == other.course
    }
}

/// In-memory ordered collection with write-through to the store.
///
/// Every mutation rewrites the whole key; there is no incremental diff.
pub struct Repository<E: Entity> {
    items: Vec<E>,
    store: Store,
}

impl<E: Entity> Repository<E> {
    pub fn load(store: Store) -> Self {
        let items: Vec<E> = store.load_or_default(E::STORE_KEY);
        Self { items, store }
    }

    pub fn list(&self) -> &[E] {
        &self.items
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn find_by_id(&self, id: &str) -> Option<&E> {
        self.items.iter().find(|e| e.id() == id)
    }

    pub fn find<P>(&self, pred: P) -> Option<&E>
    where
        P: Fn(&E) -> bool,
    {
        self.items.iter().find(|e| pred(e))
    }

    /// Replace in place when the id is already present, otherwise append.
    pub fn upsert(&mut self, entity: E) -> anyhow::Result<()> {
        let pos = self.items.iter().position(|e| e.same_identity(&entity));
        match pos {
            Some(i) => self.items[i] = entity,
            None => self.items.push(entity),
        }
        self.persist()
    }

    /// Returns whether anything was removed. An unknown id neither
    /// changes the collection nor writes to the store.
    pub fn remove(&mut self, id: &str) -> anyhow::Result<bool> {
        let before = self.items.len();
        self.items.retain(|e| e.id() != id);
        if self.items.len() == before {
            return Ok(false);
        }
        self.persist()?;
        Ok(true)
    }

    /// Append a batch with a single store write.
    pub fn extend(&mut self, batch: Vec<E>) -> anyhow::Result<()> {
        if batch.is_empty() {
            return Ok(());
        }
        self.items.extend(batch);
        self.persist()
    }

    fn persist(&self) -> anyhow::Result<()> {
        self.store.save(E::STORE_KEY, &self.items)
    }
}

/// `prefix` followed by the current epoch millis. Two calls within the same
/// millisecond return the same id.
pub fn generate_id(prefix: &str, clock: &dyn Clock) -> String {
    format!("{}{}", prefix, clock.now_millis())
}
