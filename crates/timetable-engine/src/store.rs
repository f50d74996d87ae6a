//! Occurrence store -- the persistence seam of the generator.
//!
//! The generator only needs to save occurrences and to look existing ones up.
//! [`InMemoryStore`] keeps everything in memory and serves tests, the CLI and
//! local development; database-backed stores implement the same trait.

use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::NaiveDate;
use tracing::debug;

use crate::error::{StoreError, StoreResult};
use crate::model::{
    ClassKindId, CourseId, GroupId, NewOccurrence, OccurrenceId, RoomId, ScheduledOccurrence,
    TeacherId, TimeSlotId,
};

/// Save and lookup operations over persisted occurrences.
///
/// Methods take `&self`; implementations handle their own synchronisation.
pub trait OccurrenceStore {
    /// Persist one occurrence and return its assigned identity.
    fn save(&self, occurrence: NewOccurrence) -> StoreResult<OccurrenceId>;

    /// Occurrences matching `query`, ordered by date, slot order number, id.
    fn find(&self, query: &OccurrenceQuery) -> StoreResult<Vec<ScheduledOccurrence>>;

    /// Whether `teacher` already has a class on `date` in `time_slot`.
    fn exists_for_teacher(
        &self,
        date: NaiveDate,
        time_slot: TimeSlotId,
        teacher: TeacherId,
    ) -> StoreResult<bool> {
        let query = OccurrenceQuery::on(date)
            .time_slot(time_slot)
            .teacher(teacher);
        Ok(!self.find(&query)?.is_empty())
    }
}

/// Lookup by inclusive date range plus optional resource filters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OccurrenceQuery {
    pub from: NaiveDate,
    pub to: NaiveDate,
    pub teacher: Option<TeacherId>,
    pub room: Option<RoomId>,
    pub group: Option<GroupId>,
    pub course: Option<CourseId>,
    pub class_kind: Option<ClassKindId>,
    pub time_slot: Option<TimeSlotId>,
}

impl OccurrenceQuery {
    /// All occurrences dated `from..=to`.
    pub fn between(from: NaiveDate, to: NaiveDate) -> Self {
        Self {
            from,
            to,
            teacher: None,
            room: None,
            group: None,
            course: None,
            class_kind: None,
            time_slot: None,
        }
    }

    pub fn on(date: NaiveDate) -> Self {
        Self::between(date, date)
    }

    pub fn teacher(mut self, teacher: TeacherId) -> Self {
        self.teacher = Some(teacher);
        self
    }

    pub fn room(mut self, room: RoomId) -> Self {
        self.room = Some(room);
        self
    }

    pub fn group(mut self, group: GroupId) -> Self {
        self.group = Some(group);
        self
    }

    pub fn course(mut self, course: CourseId) -> Self {
        self.course = Some(course);
        self
    }

    pub fn class_kind(mut self, class_kind: ClassKindId) -> Self {
        self.class_kind = Some(class_kind);
        self
    }

    pub fn time_slot(mut self, time_slot: TimeSlotId) -> Self {
        self.time_slot = Some(time_slot);
        self
    }

    pub fn matches(&self, occurrence: &ScheduledOccurrence) -> bool {
        occurrence.date >= self.from
            && occurrence.date <= self.to
            && self.teacher.is_none_or(|id| occurrence.teacher.id == id)
            && self.room.is_none_or(|id| occurrence.room.id == id)
            && self.group.is_none_or(|id| occurrence.has_group(id))
            && self.course.is_none_or(|id| occurrence.course.id == id)
            && self.class_kind.is_none_or(|id| occurrence.class_kind.id == id)
            && self.time_slot.is_none_or(|id| occurrence.time_slot.id == id)
    }
}

/// In-memory occurrence store.
///
/// Cloning shares the underlying data, so a clone handed to a generator stays
/// observable from the original handle.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    data: Arc<RwLock<StoreData>>,
}

#[derive(Debug, Default)]
struct StoreData {
    occurrences: Vec<ScheduledOccurrence>,
    last_id: u64,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> StoreResult<RwLockReadGuard<'_, StoreData>> {
        self.data
            .read()
            .map_err(|_| StoreError::Unavailable("in-memory store lock poisoned".to_string()))
    }

    fn write(&self) -> StoreResult<RwLockWriteGuard<'_, StoreData>> {
        self.data
            .write()
            .map_err(|_| StoreError::Unavailable("in-memory store lock poisoned".to_string()))
    }

    /// Number of stored occurrences.
    pub fn len(&self) -> StoreResult<usize> {
        Ok(self.read()?.occurrences.len())
    }

    pub fn is_empty(&self) -> StoreResult<bool> {
        Ok(self.len()? == 0)
    }

    /// Every stored occurrence in insertion order.
    pub fn all(&self) -> StoreResult<Vec<ScheduledOccurrence>> {
        Ok(self.read()?.occurrences.clone())
    }

    /// Drop all occurrences. Ids keep counting from where they were.
    pub fn clear(&self) -> StoreResult<()> {
        self.write()?.occurrences.clear();
        Ok(())
    }
}

impl OccurrenceStore for InMemoryStore {
    fn save(&self, occurrence: NewOccurrence) -> StoreResult<OccurrenceId> {
        let mut data = self.write()?;
        data.last_id += 1;
        let id = OccurrenceId(data.last_id);
        debug!(
            occurrence = %id,
            date = %occurrence.date,
            time_slot = %occurrence.time_slot.id,
            "stored occurrence"
        );
        data.occurrences
            .push(ScheduledOccurrence::new(id, occurrence));
        Ok(id)
    }

    fn find(&self, query: &OccurrenceQuery) -> StoreResult<Vec<ScheduledOccurrence>> {
        let data = self.read()?;
        let mut found: Vec<ScheduledOccurrence> = data
            .occurrences
            .iter()
            .filter(|o| query.matches(o))
            .cloned()
            .collect();
        found.sort_by_key(|o| (o.date, o.time_slot.order_number, o.id));
        Ok(found)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn poisoned_lock_reports_unavailable() {
        let store = InMemoryStore::new();
        let handle = store.clone();
        let _ = std::thread::spawn(move || {
            let _guard = handle.data.write().unwrap();
            panic!("writer panicked while holding the lock");
        })
        .join();

        assert!(matches!(store.len(), Err(StoreError::Unavailable(_))));
        assert!(matches!(store.is_empty(), Err(StoreError::Unavailable(_))));
        assert!(matches!(store.all(), Err(StoreError::Unavailable(_))));
    }
}
