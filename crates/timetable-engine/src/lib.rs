//! # timetable-engine
//!
//! Recurring class-schedule generation with conflict avoidance for university
//! timetables.
//!
//! A set of day-schedule templates (course, teacher, room, time slot, weekday,
//! class kind and groups) is checked for double bookings and then expanded
//! week by week over a date range into dated occurrences, which are persisted
//! through an [`OccurrenceStore`].
//!
//! ## Modules
//!
//! - [`model`] — Reference entities, templates, occurrences, plans
//! - [`validator`] — Pairwise teacher/room/group conflict detection
//! - [`generator`] — Template expansion and persistence orchestration
//! - [`store`] — Occurrence store trait and in-memory implementation
//! - [`occupancy`] — Wall-clock class intervals and free periods
//! - [`config`] — Generator configuration (TOML)
//! - [`error`] — Error types

pub mod config;
pub mod error;
pub mod generator;
pub mod model;
pub mod occupancy;
pub mod store;
pub mod validator;

pub use config::{ConflictPolicy, GeneratorConfig};
pub use error::{ScheduleError, StoreError};
pub use generator::{expand, GenerationReport, ScheduleGenerator};
pub use model::{
    ClassKind, Course, DayScheduleTemplate, Group, NewOccurrence, Room, ScheduledOccurrence,
    SchedulePlan, Teacher, TimeSlot,
};
pub use occupancy::{find_free_periods, occurrence_interval, ClassInterval, FreePeriod};
pub use store::{InMemoryStore, OccurrenceQuery, OccurrenceStore};
pub use validator::{find_conflicts, is_valid, validate, Conflict, ConflictReason};
