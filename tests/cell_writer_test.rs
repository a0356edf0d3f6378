// ==========================================
// Cell writer integration tests
// ==========================================
// Manual cell and summary edits against a real SQLite store,
// including the record-deletion path when a day empties out.
// ==========================================


use slot_scheduler::repository::SlotStore;
use slot_scheduler::{Granularity, SummaryType};
use test_helpers::{create_test_api, date};

const ORDER: &str = "ORD-200";
const LINE: &str = "LINE-A";

#[test]
fn test_hour_edit_writes_four_quarters() {
    let (_tmp, store, _orders, api) = create_test_api();
    let day = date(2026, 9, 1);

    let result = api
        .write_cell(ORDER, LINE, day, 10, 0, 3, Granularity::Hour)
        .unwrap();
    assert_eq!(
        result.slots.keys().collect::<Vec<_>>(),
        vec![1000, 1015, 1030, 1045]
    );
    assert!(result.slots.iter().all(|(_, w)| w == 3));
    assert!(result.record.is_some());

    let stored = store
        .find_planning_record(ORDER, LINE, day)
        .unwrap()
        .expect("record persisted");
    assert_eq!(stored.slots, result.slots);
}

#[test]
fn test_quarter_edit_touches_a_single_key() {
    let (_tmp, store, _orders, api) = create_test_api();
    let day = date(2026, 9, 1);

    api.write_cell(ORDER, LINE, day, 6, 30, 2, Granularity::Quarter)
        .unwrap();
    api.write_cell(ORDER, LINE, day, 6, 45, 4, Granularity::Quarter)
        .unwrap();

    let stored = store.find_planning_record(ORDER, LINE, day).unwrap().unwrap();
    assert_eq!(stored.slots.get(630), Some(2));
    assert_eq!(stored.slots.get(645), Some(4));
    assert_eq!(stored.slots.len(), 2);
}

#[test]
fn test_scenario_c_clearing_the_only_hour_deletes_the_record() {
    let (_tmp, store, _orders, api) = create_test_api();
    let day = date(2026, 9, 1);

    api.write_cell(ORDER, LINE, day, 10, 0, 2, Granularity::Hour)
        .unwrap();
    assert!(store.find_planning_record(ORDER, LINE, day).unwrap().is_some());

    let result = api
        .write_cell(ORDER, LINE, day, 10, 0, 0, Granularity::Hour)
        .unwrap();
    assert!(result.slots.is_empty());
    assert!(result.record.is_none());
    assert!(store.find_planning_record(ORDER, LINE, day).unwrap().is_none());
}

#[test]
fn test_clearing_one_quarter_keeps_the_rest() {
    let (_tmp, store, _orders, api) = create_test_api();
    let day = date(2026, 9, 1);

    api.write_cell(ORDER, LINE, day, 10, 0, 2, Granularity::Hour)
        .unwrap();
    let result = api
        .write_cell(ORDER, LINE, day, 10, 15, 0, Granularity::Quarter)
        .unwrap();
    assert_eq!(result.slots.keys().collect::<Vec<_>>(), vec![1000, 1030, 1045]);
    assert!(result.record.is_some());

    let stored = store.find_planning_record(ORDER, LINE, day).unwrap().unwrap();
    assert_eq!(stored.slots.len(), 3);
}

#[test]
fn test_concurrent_cell_edits_on_one_record_both_survive() {
    use std::sync::{Arc, Barrier};
    use std::thread;

    let (_tmp, store, _orders, api) = create_test_api();
    let api = Arc::new(api);
    let day = date(2026, 9, 1);
    // seed the record so both writers read-modify-write the same row
    api.write_cell(ORDER, LINE, day, 6, 0, 1, Granularity::Quarter)
        .unwrap();

    for round in 0..50 {
        let barrier = Arc::new(Barrier::new(2));
        let handles: Vec<_> = [(10u32, 15u32, 2u32), (10, 30, 3)]
            .into_iter()
            .map(|(hour, minute, workers)| {
                let api = api.clone();
                let barrier = barrier.clone();
                thread::spawn(move || {
                    barrier.wait();
                    api.write_cell(ORDER, LINE, day, hour, minute, workers, Granularity::Quarter)
                        .expect("concurrent edit failed");
                })
            })
            .collect();
        for handle in handles {
            handle.join().expect("writer panicked");
        }

        let stored = store.find_planning_record(ORDER, LINE, day).unwrap().unwrap();
        assert_eq!(stored.slots.get(1015), Some(2), "round {round}: 10:15 edit lost");
        assert_eq!(stored.slots.get(1030), Some(3), "round {round}: 10:30 edit lost");

        api.write_cell(ORDER, LINE, day, 10, 15, 0, Granularity::Quarter)
            .unwrap();
        api.write_cell(ORDER, LINE, day, 10, 30, 0, Granularity::Quarter)
            .unwrap();
    }
}

#[test]
fn test_invalid_coordinates_are_rejected() {
    let (_tmp, _store, _orders, api) = create_test_api();
    let day = date(2026, 9, 1);

    assert!(api
        .write_cell(ORDER, LINE, day, 24, 0, 1, Granularity::Hour)
        .is_err());
    assert!(api
        .write_cell(ORDER, LINE, day, 10, 20, 1, Granularity::Quarter)
        .is_err());
}

// ==========================================
// Summary cells
// ==========================================

#[test]
fn test_summary_cell_write_and_reset() {
    let (_tmp, store, _orders, api) = create_test_api();
    let day = date(2026, 9, 1);

    let result = api
        .write_summary_cell(SummaryType::Workers, day, 8, 0, 12, false, Granularity::Hour)
        .unwrap();
    assert_eq!(result.slots.len(), 4);
    assert_eq!(result.slots.get(800), Some(12));

    let stored = store
        .find_summary_record(day, SummaryType::Workers)
        .unwrap()
        .expect("summary persisted");
    assert_eq!(stored.slots, result.slots);

    // reset clears regardless of the passed value
    let result = api
        .write_summary_cell(SummaryType::Workers, day, 8, 0, 99, true, Granularity::Hour)
        .unwrap();
    assert!(result.slots.is_empty());
    assert!(result.record.is_none());
    assert!(store
        .find_summary_record(day, SummaryType::Workers)
        .unwrap()
        .is_none());
}

#[test]
fn test_summary_types_are_independent() {
    let (_tmp, store, _orders, api) = create_test_api();
    let day = date(2026, 9, 1);

    api.write_summary_cell(SummaryType::Workers, day, 8, 0, 10, false, Granularity::Quarter)
        .unwrap();
    api.write_summary_cell(SummaryType::Capacity, day, 8, 0, 40, false, Granularity::Quarter)
        .unwrap();

    let workers = store.find_summary_record(day, SummaryType::Workers).unwrap().unwrap();
    let capacity = store.find_summary_record(day, SummaryType::Capacity).unwrap().unwrap();
    assert_eq!(workers.slots.get(800), Some(10));
    assert_eq!(capacity.slots.get(800), Some(40));
}
