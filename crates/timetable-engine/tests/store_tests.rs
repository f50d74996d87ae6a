//! Tests for the in-memory occurrence store and its query filters.

mod support;

use chrono::Weekday;
use support::{date, group, slot, template};
use timetable_engine::model::{
    ClassKindId, CourseId, GroupId, OccurrenceId, RoomId, TeacherId, TimeSlotId,
};
use timetable_engine::{InMemoryStore, OccurrenceQuery, OccurrenceStore, ScheduleGenerator};

/// Two weeks of a Monday class in slot 2 (template 1) and a Monday class in
/// slot 1 (template 2, shared with group 1).
fn populated() -> InMemoryStore {
    let mut second = template(2, Weekday::Mon, 1);
    second.groups.insert(group(1));

    let generator = ScheduleGenerator::new(InMemoryStore::new());
    generator
        .generate(
            date(2023, 9, 4),
            date(2023, 9, 18),
            &[template(1, Weekday::Mon, 2), second],
        )
        .unwrap();
    generator.into_store()
}

#[test]
fn ids_are_sequential_from_one() {
    let store = InMemoryStore::new();
    let occurrence = template(1, Weekday::Mon, 1).occurrence_on(date(2023, 9, 4));

    assert_eq!(store.save(occurrence.clone()).unwrap(), OccurrenceId(1));
    assert_eq!(store.save(occurrence).unwrap(), OccurrenceId(2));
    assert_eq!(store.len().unwrap(), 2);
}

#[test]
fn clones_share_data() {
    let store = InMemoryStore::new();
    let handle = store.clone();
    store
        .save(template(1, Weekday::Mon, 1).occurrence_on(date(2023, 9, 4)))
        .unwrap();
    assert_eq!(handle.len().unwrap(), 1);
}

#[test]
fn range_is_inclusive_on_both_ends() {
    let store = populated();
    let found = store
        .find(&OccurrenceQuery::between(date(2023, 9, 4), date(2023, 9, 11)))
        .unwrap();
    assert_eq!(found.len(), 4);

    let found = store
        .find(&OccurrenceQuery::between(date(2023, 9, 5), date(2023, 9, 10)))
        .unwrap();
    assert!(found.is_empty());
}

#[test]
fn results_ordered_by_date_then_slot() {
    let store = populated();
    let found = store
        .find(&OccurrenceQuery::between(date(2023, 9, 1), date(2023, 9, 30)))
        .unwrap();

    let order: Vec<_> = found
        .iter()
        .map(|o| (o.date, o.time_slot.order_number))
        .collect();
    assert_eq!(
        order,
        vec![
            (date(2023, 9, 4), 1),
            (date(2023, 9, 4), 2),
            (date(2023, 9, 11), 1),
            (date(2023, 9, 11), 2),
        ]
    );
}

#[test]
fn filters_combine() {
    let store = populated();
    let month = OccurrenceQuery::between(date(2023, 9, 1), date(2023, 9, 30));

    assert_eq!(store.find(&month.clone().teacher(TeacherId(1))).unwrap().len(), 2);
    assert_eq!(store.find(&month.clone().room(RoomId(2))).unwrap().len(), 2);
    assert_eq!(store.find(&month.clone().group(GroupId(1))).unwrap().len(), 4);
    assert_eq!(store.find(&month.clone().group(GroupId(2))).unwrap().len(), 2);
    assert_eq!(store.find(&month.clone().course(CourseId(2))).unwrap().len(), 2);
    assert_eq!(store.find(&month.clone().class_kind(ClassKindId(1))).unwrap().len(), 4);
    assert_eq!(store.find(&month.clone().class_kind(ClassKindId(9))).unwrap().len(), 0);
    assert_eq!(
        store
            .find(&month.clone().group(GroupId(1)).time_slot(TimeSlotId(2)))
            .unwrap()
            .len(),
        2
    );
    assert!(store
        .find(&month.teacher(TeacherId(1)).room(RoomId(2)))
        .unwrap()
        .is_empty());
}

#[test]
fn exists_for_teacher_matches_exact_date_slot_teacher() {
    let store = populated();
    let monday = date(2023, 9, 4);

    assert!(store
        .exists_for_teacher(monday, slot(2).id, TeacherId(1))
        .unwrap());
    assert!(!store
        .exists_for_teacher(monday, slot(1).id, TeacherId(1))
        .unwrap());
    assert!(!store
        .exists_for_teacher(date(2023, 9, 5), slot(2).id, TeacherId(1))
        .unwrap());
}

#[test]
fn clear_keeps_id_sequence() {
    let store = populated();
    assert_eq!(store.len().unwrap(), 4);
    store.clear().unwrap();
    assert!(store.is_empty().unwrap());

    let id = store
        .save(template(1, Weekday::Mon, 1).occurrence_on(date(2023, 9, 4)))
        .unwrap();
    assert_eq!(id, OccurrenceId(5));
}
