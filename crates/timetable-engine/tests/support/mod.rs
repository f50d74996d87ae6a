//! Shared builders for timetable-engine integration tests.

#![allow(dead_code)]

use std::cell::{Cell, RefCell};

use chrono::{NaiveDate, NaiveTime, Weekday};
use timetable_engine::model::{
    ClassKindId, CourseId, GroupId, OccurrenceId, RoomId, TeacherId, TimeSlotId,
};
use timetable_engine::store::{OccurrenceQuery, OccurrenceStore};
use timetable_engine::{
    ClassKind, Course, DayScheduleTemplate, Group, NewOccurrence, Room, ScheduledOccurrence,
    StoreError, Teacher, TimeSlot,
};

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn course(id: u64) -> Course {
    Course {
        id: CourseId(id),
        name: format!("Course {}", id),
    }
}

pub fn teacher(id: u64) -> Teacher {
    Teacher {
        id: TeacherId(id),
        first_name: "Teacher".to_string(),
        last_name: id.to_string(),
    }
}

pub fn room(id: u64) -> Room {
    Room {
        id: RoomId(id),
        name: format!("R-{}", id),
        capacity: 30,
    }
}

pub fn group(id: u64) -> Group {
    Group {
        id: GroupId(id),
        name: format!("G-{}", id),
    }
}

pub fn lecture() -> ClassKind {
    ClassKind {
        id: ClassKindId(1),
        name: "Lecture".to_string(),
    }
}

/// Slot `n` starts at 08:00 + (n - 1) * 2h and lasts 90 minutes.
pub fn slot(n: u32) -> TimeSlot {
    TimeSlot {
        id: TimeSlotId(n as u64),
        order_number: n,
        start_time: NaiveTime::from_hms_opt(8 + (n - 1) * 2, 0, 0).unwrap(),
        duration_minutes: 90,
    }
}

/// Template with distinct resources derived from `id`: course/teacher/room/group `id`.
pub fn template(id: u64, weekday: Weekday, slot_n: u32) -> DayScheduleTemplate {
    DayScheduleTemplate::new(
        course(id),
        teacher(id),
        room(id),
        slot(slot_n),
        weekday,
        lecture(),
        [group(id)],
    )
    .unwrap()
}

/// Store double that records save calls and fails the `fail_on`-th one (1-based).
#[derive(Default)]
pub struct FlakyStore {
    pub fail_on: Option<usize>,
    pub save_calls: Cell<usize>,
    pub find_calls: Cell<usize>,
    pub saved: RefCell<Vec<NewOccurrence>>,
}

impl FlakyStore {
    pub fn failing_on(call: usize) -> Self {
        Self {
            fail_on: Some(call),
            ..Default::default()
        }
    }
}

impl OccurrenceStore for FlakyStore {
    fn save(&self, occurrence: NewOccurrence) -> Result<OccurrenceId, StoreError> {
        let call = self.save_calls.get() + 1;
        self.save_calls.set(call);
        if self.fail_on == Some(call) {
            return Err(StoreError::ConstraintViolation(format!(
                "duplicate key on call {}",
                call
            )));
        }
        self.saved.borrow_mut().push(occurrence);
        Ok(OccurrenceId(call as u64))
    }

    fn find(&self, _query: &OccurrenceQuery) -> Result<Vec<ScheduledOccurrence>, StoreError> {
        self.find_calls.set(self.find_calls.get() + 1);
        Ok(Vec::new())
    }
}
