//! Error types for timetable-engine operations.

use chrono::{NaiveDate, NaiveTime};
use thiserror::Error;

use crate::model::{OccurrenceId, TimeSlotId};
use crate::validator::Conflict;

/// Errors raised while validating, expanding or persisting a schedule.
#[derive(Error, Debug)]
pub enum ScheduleError {
    /// The end date does not come strictly after the start date.
    #[error("Invalid date range: start {start} is not before end {end}")]
    InvalidRange { start: NaiveDate, end: NaiveDate },

    /// A template names no groups.
    #[error("Template #{index} has an empty group set")]
    EmptyGroupSet { index: usize },

    /// Two templates double-book a teacher, room or group.
    #[error("Scheduling conflict: {0}")]
    Conflict(Conflict),

    /// A planned occurrence collides with one already in the store.
    #[error("Occurrence {existing} already occupies time slot {time_slot} on {date}")]
    StoreConflict {
        date: NaiveDate,
        time_slot: TimeSlotId,
        existing: OccurrenceId,
    },

    /// The occurrence store rejected a call. `saved` occurrences were written
    /// before the failure and stay written.
    #[error("Persistence failed after {saved} saved occurrence(s): {source}")]
    Persistence {
        saved: usize,
        #[source]
        source: StoreError,
    },

    #[error("Invalid timezone: {0}")]
    InvalidTimezone(String),

    /// The slot start does not exist on that date in the timezone (DST gap).
    #[error("Local time {time} on {date} does not exist in {timezone}")]
    InvalidLocalTime {
        date: NaiveDate,
        time: NaiveTime,
        timezone: String,
    },

    #[error("Configuration error: {0}")]
    Config(String),

    /// The plan document was not valid JSON for a [`SchedulePlan`](crate::SchedulePlan).
    #[error("Plan parse error: {0}")]
    PlanParse(#[from] serde_json::Error),
}

impl ScheduleError {
    /// True for failures caused by the request itself (bad range, empty group
    /// set, template or store conflict) rather than by storage or setup.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            ScheduleError::InvalidRange { .. }
                | ScheduleError::EmptyGroupSet { .. }
                | ScheduleError::Conflict(_)
                | ScheduleError::StoreConflict { .. }
        )
    }
}

/// Errors reported by an [`OccurrenceStore`](crate::OccurrenceStore).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The backend could not be reached or its state is unusable.
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    /// A write broke a uniqueness or integrity rule of the backend.
    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    #[error("Query error: {0}")]
    Query(String),
}

pub type Result<T> = std::result::Result<T, ScheduleError>;

pub type StoreResult<T> = std::result::Result<T, StoreError>;
