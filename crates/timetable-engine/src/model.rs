//! Domain model -- reference entities, day-schedule templates and occurrences.
//!
//! Reference entities (course, teacher, room, group, class kind, time slot)
//! compare and hash by their persisted id only. Two copies of the same row
//! loaded or built independently are therefore equal even when their
//! descriptive fields differ.

use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::fmt;
use std::hash::{Hash, Hasher};

use chrono::{Duration, NaiveDate, NaiveTime, Weekday};
use serde::{Deserialize, Serialize};

use crate::error::{Result, ScheduleError};

macro_rules! entity_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub u64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

macro_rules! identity_eq {
    ($name:ident) => {
        impl PartialEq for $name {
            fn eq(&self, other: &Self) -> bool {
                self.id == other.id
            }
        }

        impl Eq for $name {}

        impl Hash for $name {
            fn hash<H: Hasher>(&self, state: &mut H) {
                self.id.hash(state);
            }
        }

        impl PartialOrd for $name {
            fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
                Some(self.cmp(other))
            }
        }

        impl Ord for $name {
            fn cmp(&self, other: &Self) -> Ordering {
                self.id.cmp(&other.id)
            }
        }
    };
}

entity_id!(CourseId);
entity_id!(TeacherId);
entity_id!(RoomId);
entity_id!(GroupId);
entity_id!(ClassKindId);
entity_id!(TimeSlotId);
entity_id!(
    /// Identity assigned by the store when an occurrence is saved.
    OccurrenceId
);

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Course {
    pub id: CourseId,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Teacher {
    pub id: TeacherId,
    pub first_name: String,
    pub last_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Room {
    pub id: RoomId,
    pub name: String,
    #[serde(default)]
    pub capacity: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Group {
    pub id: GroupId,
    pub name: String,
}

/// Kind of class session, e.g. lecture or laboratory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassKind {
    pub id: ClassKindId,
    pub name: String,
}

/// A numbered period of the academic day ("period N").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeSlot {
    pub id: TimeSlotId,
    /// Position of the slot within the day, starting at 1.
    pub order_number: u32,
    pub start_time: NaiveTime,
    pub duration_minutes: u32,
}

identity_eq!(Course);
identity_eq!(Teacher);
identity_eq!(Room);
identity_eq!(Group);
identity_eq!(ClassKind);
identity_eq!(TimeSlot);

impl TimeSlot {
    pub fn duration(&self) -> Duration {
        Duration::minutes(self.duration_minutes as i64)
    }

    /// Wall-clock end of the slot. Wraps past midnight.
    pub fn end_time(&self) -> NaiveTime {
        self.start_time + self.duration()
    }
}

/// A recurring class: one course taught by one teacher to a set of groups, in
/// one room, on one weekday and time slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayScheduleTemplate {
    pub course: Course,
    pub teacher: Teacher,
    pub room: Room,
    pub time_slot: TimeSlot,
    pub weekday: Weekday,
    pub class_kind: ClassKind,
    pub groups: BTreeSet<Group>,
}

impl DayScheduleTemplate {
    /// Build a template. An empty group set is rejected as
    /// `EmptyGroupSet { index: 0 }`.
    pub fn new(
        course: Course,
        teacher: Teacher,
        room: Room,
        time_slot: TimeSlot,
        weekday: Weekday,
        class_kind: ClassKind,
        groups: impl IntoIterator<Item = Group>,
    ) -> Result<Self> {
        let groups: BTreeSet<Group> = groups.into_iter().collect();
        if groups.is_empty() {
            return Err(ScheduleError::EmptyGroupSet { index: 0 });
        }
        Ok(Self {
            course,
            teacher,
            room,
            time_slot,
            weekday,
            class_kind,
            groups,
        })
    }

    /// Groups attending both this template and `other`, ordered by id.
    pub fn shared_groups(&self, other: &DayScheduleTemplate) -> Vec<GroupId> {
        self.groups
            .intersection(&other.groups)
            .map(|g| g.id)
            .collect()
    }

    pub fn shares_group_with(&self, other: &DayScheduleTemplate) -> bool {
        !self.groups.is_disjoint(&other.groups)
    }

    /// Materialise the template onto a concrete date.
    pub fn occurrence_on(&self, date: NaiveDate) -> NewOccurrence {
        NewOccurrence {
            date,
            course: self.course.clone(),
            teacher: self.teacher.clone(),
            room: self.room.clone(),
            time_slot: self.time_slot.clone(),
            class_kind: self.class_kind.clone(),
            groups: self.groups.clone(),
        }
    }
}

/// An occurrence that has not been persisted yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewOccurrence {
    pub date: NaiveDate,
    pub course: Course,
    pub teacher: Teacher,
    pub room: Room,
    pub time_slot: TimeSlot,
    pub class_kind: ClassKind,
    pub groups: BTreeSet<Group>,
}

/// One dated class session as stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduledOccurrence {
    pub id: OccurrenceId,
    pub date: NaiveDate,
    pub course: Course,
    pub teacher: Teacher,
    pub room: Room,
    pub time_slot: TimeSlot,
    pub class_kind: ClassKind,
    pub groups: BTreeSet<Group>,
}

impl ScheduledOccurrence {
    pub fn new(id: OccurrenceId, occurrence: NewOccurrence) -> Self {
        let NewOccurrence {
            date,
            course,
            teacher,
            room,
            time_slot,
            class_kind,
            groups,
        } = occurrence;
        Self {
            id,
            date,
            course,
            teacher,
            room,
            time_slot,
            class_kind,
            groups,
        }
    }

    pub fn has_group(&self, group: GroupId) -> bool {
        self.groups.iter().any(|g| g.id == group)
    }

    /// True when this occurrence books the same teacher, room or any group as
    /// `planned`. Date and time slot are not compared.
    pub fn shares_resource_with(&self, planned: &NewOccurrence) -> bool {
        self.teacher == planned.teacher
            || self.room == planned.room
            || !self.groups.is_disjoint(&planned.groups)
    }
}

/// A generation request as read from a plan document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulePlan {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(default)]
    pub templates: Vec<DayScheduleTemplate>,
}

impl SchedulePlan {
    /// Parse a plan from its JSON representation.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Distinct time slots used by the plan, ordered by order number.
    pub fn time_slots(&self) -> Vec<&TimeSlot> {
        let mut slots: Vec<&TimeSlot> = Vec::new();
        for template in &self.templates {
            if !slots.contains(&&template.time_slot) {
                slots.push(&template.time_slot);
            }
        }
        slots.sort_by_key(|s| (s.order_number, s.id));
        slots
    }
}
