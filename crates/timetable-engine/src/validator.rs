//! Detect double bookings between day-schedule templates.
//!
//! Two templates collide when they fall on the same weekday and time slot and
//! book the same teacher, the same room, or at least one common group.
//! Templates on different weekdays or different slots never collide.

use std::fmt;

use chrono::{NaiveDate, Weekday};

use crate::error::{Result, ScheduleError};
use crate::model::{DayScheduleTemplate, GroupId, RoomId, TeacherId, TimeSlotId};

/// The resource two colliding templates both book.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConflictReason {
    Teacher(TeacherId),
    Room(RoomId),
    Groups(Vec<GroupId>),
}

/// A colliding pair of templates, identified by their positions in the input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conflict {
    pub first: usize,
    pub second: usize,
    pub weekday: Weekday,
    pub time_slot: TimeSlotId,
    pub reasons: Vec<ConflictReason>,
}

impl fmt::Display for ConflictReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConflictReason::Teacher(id) => write!(f, "teacher {}", id),
            ConflictReason::Room(id) => write!(f, "room {}", id),
            ConflictReason::Groups(ids) => {
                let ids: Vec<String> = ids.iter().map(ToString::to_string).collect();
                write!(f, "groups [{}]", ids.join(", "))
            }
        }
    }
}

impl fmt::Display for Conflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reasons: Vec<String> = self.reasons.iter().map(ToString::to_string).collect();
        write!(
            f,
            "templates #{} and #{} both book {} on {} in time slot {}",
            self.first,
            self.second,
            reasons.join(", "),
            self.weekday,
            self.time_slot
        )
    }
}

fn collision(a: &DayScheduleTemplate, b: &DayScheduleTemplate) -> Vec<ConflictReason> {
    if a.weekday != b.weekday || a.time_slot != b.time_slot {
        return Vec::new();
    }

    let mut reasons = Vec::new();
    if a.teacher == b.teacher {
        reasons.push(ConflictReason::Teacher(a.teacher.id));
    }
    if a.room == b.room {
        reasons.push(ConflictReason::Room(a.room.id));
    }
    if a.shares_group_with(b) {
        reasons.push(ConflictReason::Groups(a.shared_groups(b)));
    }
    reasons
}

/// Find every colliding pair among `templates`, ordered by `(first, second)`.
pub fn find_conflicts(templates: &[DayScheduleTemplate]) -> Vec<Conflict> {
    let mut conflicts = Vec::new();
    if templates.len() < 2 {
        return conflicts;
    }

    for (i, a) in templates.iter().enumerate() {
        for (j, b) in templates.iter().enumerate().skip(i + 1) {
            let reasons = collision(a, b);
            if !reasons.is_empty() {
                conflicts.push(Conflict {
                    first: i,
                    second: j,
                    weekday: a.weekday,
                    time_slot: a.time_slot.id,
                    reasons,
                });
            }
        }
    }

    conflicts
}

/// Check a generation request before anything is written.
///
/// # Errors
/// - [`ScheduleError::InvalidRange`] if `start` is not strictly before `end`.
/// - [`ScheduleError::EmptyGroupSet`] if a template has no groups.
/// - [`ScheduleError::Conflict`] with the first colliding pair.
pub fn validate(start: NaiveDate, end: NaiveDate, templates: &[DayScheduleTemplate]) -> Result<()> {
    if start >= end {
        return Err(ScheduleError::InvalidRange { start, end });
    }

    if let Some(index) = templates.iter().position(|t| t.groups.is_empty()) {
        return Err(ScheduleError::EmptyGroupSet { index });
    }

    match find_conflicts(templates).into_iter().next() {
        Some(conflict) => Err(ScheduleError::Conflict(conflict)),
        None => Ok(()),
    }
}

/// Boolean form of [`validate`].
pub fn is_valid(start: NaiveDate, end: NaiveDate, templates: &[DayScheduleTemplate]) -> bool {
    validate(start, end, templates).is_ok()
}
