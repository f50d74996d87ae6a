//! Wall-clock occupancy of scheduled classes and the free periods between them.
//!
//! A class occupies its time slot on its date, resolved in the timezone the
//! timetable is kept in. Busy intervals that overlap or touch are merged
//! before gaps are computed.

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;

use crate::error::{Result, ScheduleError};
use crate::model::{OccurrenceId, ScheduledOccurrence};

/// The instant range a class occupies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassInterval {
    pub occurrence: OccurrenceId,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

/// A gap with no classes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FreePeriod {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub duration_minutes: i64,
}

/// Resolve an occurrence's date and slot start in `tz`.
///
/// Ambiguous local times (clocks turned back) take the earlier instant.
///
/// # Errors
/// Returns `ScheduleError::InvalidLocalTime` if the slot start falls in a DST gap.
pub fn occurrence_interval(occurrence: &ScheduledOccurrence, tz: Tz) -> Result<ClassInterval> {
    let local = NaiveDateTime::new(occurrence.date, occurrence.time_slot.start_time);
    let start = tz
        .from_local_datetime(&local)
        .earliest()
        .ok_or_else(|| ScheduleError::InvalidLocalTime {
            date: occurrence.date,
            time: occurrence.time_slot.start_time,
            timezone: tz.name().to_string(),
        })?
        .with_timezone(&Utc);

    Ok(ClassInterval {
        occurrence: occurrence.id,
        start,
        end: start + occurrence.time_slot.duration(),
    })
}

fn merge_busy(
    intervals: &[ClassInterval],
    window_start: DateTime<Utc>,
    window_end: DateTime<Utc>,
) -> Vec<(DateTime<Utc>, DateTime<Utc>)> {
    let mut clipped: Vec<(DateTime<Utc>, DateTime<Utc>)> = intervals
        .iter()
        .filter(|i| i.start < window_end && i.end > window_start)
        .map(|i| (i.start.max(window_start), i.end.min(window_end)))
        .collect();
    clipped.sort();

    let mut merged: Vec<(DateTime<Utc>, DateTime<Utc>)> = Vec::new();
    for (start, end) in clipped {
        if let Some(last) = merged.last_mut() {
            if start <= last.1 {
                last.1 = last.1.max(end);
                continue;
            }
        }
        merged.push((start, end));
    }
    merged
}

/// Free periods within `window_start..window_end` given the classes in
/// `occurrences`, sorted by start.
///
/// # Errors
/// Propagates [`occurrence_interval`] failures.
pub fn find_free_periods(
    occurrences: &[ScheduledOccurrence],
    tz: Tz,
    window_start: DateTime<Utc>,
    window_end: DateTime<Utc>,
) -> Result<Vec<FreePeriod>> {
    if window_start >= window_end {
        return Ok(Vec::new());
    }

    let intervals = occurrences
        .iter()
        .map(|o| occurrence_interval(o, tz))
        .collect::<Result<Vec<_>>>()?;

    let mut free = Vec::new();
    let mut cursor = window_start;
    for (busy_start, busy_end) in merge_busy(&intervals, window_start, window_end) {
        if cursor < busy_start {
            free.push(FreePeriod {
                start: cursor,
                end: busy_start,
                duration_minutes: (busy_start - cursor).num_minutes(),
            });
        }
        cursor = cursor.max(busy_end);
    }

    if cursor < window_end {
        free.push(FreePeriod {
            start: cursor,
            end: window_end,
            duration_minutes: (window_end - cursor).num_minutes(),
        });
    }

    Ok(free)
}
