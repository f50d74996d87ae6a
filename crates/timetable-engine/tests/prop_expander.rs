//! Property-based tests for template expansion using proptest.
//!
//! The weekly-stepping expansion is checked against a plain day-by-day walk
//! over the range, for arbitrary ranges and weekdays.

mod support;

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use proptest::prelude::*;
use support::template;
use timetable_engine::expand;

// ---------------------------------------------------------------------------
// Strategies
// ---------------------------------------------------------------------------

fn arb_weekday() -> impl Strategy<Value = Weekday> {
    prop_oneof![
        Just(Weekday::Mon),
        Just(Weekday::Tue),
        Just(Weekday::Wed),
        Just(Weekday::Thu),
        Just(Weekday::Fri),
        Just(Weekday::Sat),
        Just(Weekday::Sun),
    ]
}

/// A start date in 2023-2026 and a range length of up to ~one semester.
fn arb_range() -> impl Strategy<Value = (NaiveDate, NaiveDate)> {
    (2023i32..=2026, 1u32..=12, 1u32..=28, 0i64..=140).prop_map(|(y, m, d, len)| {
        let start = NaiveDate::from_ymd_opt(y, m, d).unwrap();
        (start, start + Duration::days(len))
    })
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn day_by_day(start: NaiveDate, end: NaiveDate, weekday: Weekday) -> Vec<NaiveDate> {
    let mut dates = Vec::new();
    let mut day = start;
    while day < end {
        if day.weekday() == weekday {
            dates.push(day);
        }
        day += Duration::days(1);
    }
    dates
}

// ---------------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn matches_day_by_day_walk((start, end) in arb_range(), weekday in arb_weekday()) {
        let dates: Vec<NaiveDate> = expand(start, end, &[template(1, weekday, 1)], &[])
            .into_iter()
            .map(|o| o.date)
            .collect();
        prop_assert_eq!(dates, day_by_day(start, end, weekday));
    }

    #[test]
    fn dates_stay_in_range_on_weekday((start, end) in arb_range(), weekday in arb_weekday()) {
        let occurrences = expand(start, end, &[template(1, weekday, 1)], &[]);
        for o in &occurrences {
            prop_assert!(o.date >= start);
            prop_assert!(o.date < end);
            prop_assert_eq!(o.date.weekday(), weekday);
        }
        for pair in occurrences.windows(2) {
            prop_assert_eq!(pair[1].date - pair[0].date, Duration::days(7));
        }
    }

    #[test]
    fn count_is_sum_over_templates(
        (start, end) in arb_range(),
        days in prop::collection::vec(arb_weekday(), 0..6),
    ) {
        let templates: Vec<_> = days
            .iter()
            .enumerate()
            .map(|(i, wd)| template(i as u64 + 1, *wd, 1))
            .collect();
        let expected: usize = days.iter().map(|wd| day_by_day(start, end, *wd).len()).sum();
        prop_assert_eq!(expand(start, end, &templates, &[]).len(), expected);
    }

    #[test]
    fn excluded_dates_never_emitted(
        (start, end) in arb_range(),
        weekday in arb_weekday(),
        skip in 0i64..140,
    ) {
        let excluded = [start + Duration::days(skip)];
        let occurrences = expand(start, end, &[template(1, weekday, 1)], &excluded);
        prop_assert!(occurrences.iter().all(|o| o.date != excluded[0]));
    }
}
