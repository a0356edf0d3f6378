// ==========================================
// Scheduler flow integration tests
// ==========================================
// Full scheduling walk, manual-edit reconciliation and
// progress reconciliation against a real SQLite store.
//
// Calendar used throughout: 2026-08-24, 08-31 and 09-07 are
// Mondays; delivery 2026-09-10 (Thursday) puts the reference
// start at Monday 2026-08-31.
// ==========================================


use slot_scheduler::repository::SlotStore;
use slot_scheduler::{ScheduleOutcome, ShiftWindow};
use test_helpers::{create_test_api, date, morning_shift_order, total_slots};

const ORDER: &str = "ORD-100";

fn delivery() -> chrono::NaiveDate {
    date(2026, 9, 10)
}

fn now_early() -> chrono::NaiveDateTime {
    // well before the reference start
    date(2026, 8, 25).and_hms_opt(9, 0, 0).unwrap()
}

// ==========================================
// auto_schedule
// ==========================================

#[test]
fn test_scenario_a_full_schedule_walk() {
    let (_tmp, store, orders, api) = create_test_api();
    let (order, article, offer) = morning_shift_order(ORDER, delivery());
    orders.put(order, article, offer);

    let report = api.auto_schedule(ORDER, true, now_early()).expect("schedule");
    match &report.outcome {
        ScheduleOutcome::Scheduled(summary) => {
            assert_eq!(summary.quarters_created, 200);
            assert_eq!(summary.window, ShiftWindow::new(6, 14));
            assert_eq!(summary.workers_per_slot, 2);
            assert_eq!(
                summary.start,
                date(2026, 8, 31).and_hms_opt(6, 0, 0).unwrap()
            );
        }
        other => panic!("expected Scheduled, got {other:?}"),
    }

    let records = store.find_planning_records(ORDER).expect("load records");
    // Mon-Fri (32 quarters each), weekend skipped, Mon again, then
    // 8 quarters on Tuesday: 7 calendar days spanned.
    let expected_days = [
        (date(2026, 8, 31), 32),
        (date(2026, 9, 1), 32),
        (date(2026, 9, 2), 32),
        (date(2026, 9, 3), 32),
        (date(2026, 9, 4), 32),
        (date(2026, 9, 7), 32),
        (date(2026, 9, 8), 8),
    ];
    assert_eq!(records.len(), expected_days.len());
    for (record, (day, quarters)) in records.iter().zip(expected_days) {
        assert_eq!(record.plan_date, day);
        assert_eq!(record.slots.len(), quarters);
        assert!(record.slots.iter().all(|(_, w)| w == 2));
    }

    // the partial last day covers 06:00-07:45
    let last = &records[6];
    assert_eq!(
        last.slots.keys().collect::<Vec<_>>(),
        vec![600, 615, 630, 645, 700, 715, 730, 745]
    );
}

#[test]
fn test_auto_schedule_requires_delivery_date() {
    let (_tmp, store, orders, api) = create_test_api();
    let (mut order, article, offer) = morning_shift_order(ORDER, delivery());
    order.delivery_requested_date = None;
    orders.put(order, article, offer);

    let report = api.auto_schedule(ORDER, true, now_early()).unwrap();
    assert_eq!(report.outcome, ScheduleOutcome::MissingDeliveryDate);
    assert_eq!(total_slots(&store, ORDER), 0);
}

#[test]
fn test_auto_schedule_rejects_past_delivery() {
    let (_tmp, store, orders, api) = create_test_api();
    let (order, article, offer) = morning_shift_order(ORDER, date(2026, 8, 20));
    orders.put(order, article, offer);

    let report = api.auto_schedule(ORDER, true, now_early()).unwrap();
    assert_eq!(
        report.outcome,
        ScheduleOutcome::PastDelivery {
            requested: date(2026, 8, 20)
        }
    );
    assert_eq!(total_slots(&store, ORDER), 0);
}

#[test]
fn test_auto_schedule_insufficient_data_is_a_noop() {
    let (_tmp, store, orders, api) = create_test_api();
    let (order, mut article, offer) = morning_shift_order(ORDER, delivery());
    article.base_rate = None;
    orders.put(order, article, offer);

    let report = api.auto_schedule(ORDER, true, now_early()).unwrap();
    assert_eq!(report.outcome, ScheduleOutcome::InsufficientData);
    assert_eq!(total_slots(&store, ORDER), 0);
}

#[test]
fn test_auto_schedule_unknown_order() {
    let (_tmp, _store, _orders, api) = create_test_api();
    let report = api.auto_schedule("MISSING", true, now_early()).unwrap();
    assert_eq!(
        report.outcome,
        ScheduleOutcome::NotFound {
            order_id: "MISSING".to_string()
        }
    );
}

#[test]
fn test_reschedule_from_now_preserves_past_planning() {
    let (_tmp, store, orders, api) = create_test_api();
    let (order, article, offer) = morning_shift_order(ORDER, delivery());
    orders.put(order, article, offer);
    api.auto_schedule(ORDER, true, now_early()).unwrap();

    // mid-schedule, the reference start is already in the past:
    // rescheduling restarts from now rounded up to 10:15
    let mid = date(2026, 9, 2).and_hms_opt(10, 7, 0).unwrap();
    let report = api.auto_schedule(ORDER, false, mid).unwrap();
    match &report.outcome {
        ScheduleOutcome::Scheduled(summary) => {
            assert_eq!(summary.quarters_created, 200);
            assert_eq!(summary.start, date(2026, 9, 2).and_hms_opt(10, 15, 0).unwrap());
        }
        other => panic!("expected Scheduled, got {other:?}"),
    }

    let records = store.find_planning_records(ORDER).unwrap();
    // Aug 31 and Sep 1 are untouched history
    assert_eq!(records[0].plan_date, date(2026, 8, 31));
    assert_eq!(records[0].slots.len(), 32);
    assert_eq!(records[1].plan_date, date(2026, 9, 1));
    assert_eq!(records[1].slots.len(), 32);
    // the rebuilt Sep 2 day starts at the clamped slot
    let sep2 = records.iter().find(|r| r.plan_date == date(2026, 9, 2)).unwrap();
    assert!(sep2.slots.keys().all(|k| k >= 1015));
    // 64 preserved quarters + 200 rebuilt
    assert_eq!(total_slots(&store, ORDER), 264);
}

// ==========================================
// reconcile_after_manual_edit
// ==========================================

#[test]
fn test_reconcile_is_idempotent_when_aligned() {
    let (_tmp, _store, orders, api) = create_test_api();
    let (order, article, offer) = morning_shift_order(ORDER, delivery());
    orders.put(order, article, offer);
    api.auto_schedule(ORDER, true, now_early()).unwrap();

    let first = api.reconcile_after_manual_edit(ORDER, now_early()).unwrap();
    assert_eq!(first.outcome, ScheduleOutcome::Aligned);
    let second = api.reconcile_after_manual_edit(ORDER, now_early()).unwrap();
    assert_eq!(second.outcome, ScheduleOutcome::Aligned);
}

#[test]
fn test_scenario_d_trims_exactly_the_latest_future_slots() {
    let (_tmp, store, orders, api) = create_test_api();
    let (order, article, offer) = morning_shift_order(ORDER, delivery());
    orders.put(order, article, offer);
    api.auto_schedule(ORDER, true, now_early()).unwrap();

    // quantity drop: 98.5 pieces -> 49.25h -> 197 quarters, 3 fewer
    orders.update_order(ORDER, |o| o.quantity = 98.5);
    let report = api.reconcile_after_manual_edit(ORDER, now_early()).unwrap();
    assert_eq!(report.outcome, ScheduleOutcome::Trimmed { quarters: 3 });

    let records = store.find_planning_records(ORDER).unwrap();
    let last = records.last().unwrap();
    assert_eq!(last.plan_date, date(2026, 9, 8));
    assert_eq!(last.slots.keys().collect::<Vec<_>>(), vec![600, 615, 630, 645, 700]);
    // earlier days untouched
    assert_eq!(records[0].slots.len(), 32);
    assert_eq!(total_slots(&store, ORDER), 197);
}

#[test]
fn test_extend_then_trim_round_trip() {
    let (_tmp, store, orders, api) = create_test_api();
    let (order, article, offer) = morning_shift_order(ORDER, delivery());
    orders.put(order, article, offer);
    api.auto_schedule(ORDER, true, now_early()).unwrap();

    // 102 pieces -> 51h -> 204 quarters: append 4 after the last slot
    orders.update_order(ORDER, |o| o.quantity = 102.0);
    let report = api.reconcile_after_manual_edit(ORDER, now_early()).unwrap();
    assert_eq!(report.outcome, ScheduleOutcome::Extended { quarters: 4 });
    let records = store.find_planning_records(ORDER).unwrap();
    let last = records.last().unwrap();
    assert_eq!(last.slots.len(), 12);
    assert!(last.slots.contains(845));

    // reverting the quantity removes exactly the 4 just added
    orders.update_order(ORDER, |o| o.quantity = 100.0);
    let report = api.reconcile_after_manual_edit(ORDER, now_early()).unwrap();
    assert_eq!(report.outcome, ScheduleOutcome::Trimmed { quarters: 4 });
    let records = store.find_planning_records(ORDER).unwrap();
    let last = records.last().unwrap();
    assert_eq!(last.slots.keys().collect::<Vec<_>>(), vec![600, 615, 630, 645, 700, 715, 730, 745]);
    assert_eq!(total_slots(&store, ORDER), 200);
}

#[test]
fn test_manual_edit_completion_keeps_past_slots() {
    let (_tmp, store, orders, api) = create_test_api();
    let (order, article, offer) = morning_shift_order(ORDER, delivery());
    orders.put(order, article, offer);
    api.auto_schedule(ORDER, true, now_early()).unwrap();

    orders.set_processed_quantity(ORDER, 100.0);
    // 10:07 sits in the 10:00 quarter: today-and-future starts at 1000
    let mid = date(2026, 9, 2).and_hms_opt(10, 7, 0).unwrap();
    let report = api.reconcile_after_manual_edit(ORDER, mid).unwrap();
    assert_eq!(
        report.outcome,
        ScheduleOutcome::Completed {
            quarters_removed: 120
        }
    );

    // history before the cut survives: two full days + Sep 2 morning
    let records = store.find_planning_records(ORDER).unwrap();
    assert_eq!(records.len(), 3);
    let sep2 = records.last().unwrap();
    assert_eq!(sep2.plan_date, date(2026, 9, 2));
    assert_eq!(sep2.slots.len(), 16);
    assert!(sep2.slots.keys().all(|k| k < 1000));
}

#[test]
fn test_manual_edit_with_no_planning_falls_back_to_full_schedule() {
    let (_tmp, store, orders, api) = create_test_api();
    let (order, article, offer) = morning_shift_order(ORDER, delivery());
    orders.put(order, article, offer);

    let report = api.reconcile_after_manual_edit(ORDER, now_early()).unwrap();
    assert!(matches!(report.outcome, ScheduleOutcome::Scheduled(_)));
    assert_eq!(total_slots(&store, ORDER), 200);
}

// ==========================================
// reconcile_after_progress
// ==========================================

#[test]
fn test_scenario_b_fully_worked_order_clears_all_planning() {
    let (_tmp, store, orders, api) = create_test_api();
    let (order, article, offer) = morning_shift_order(ORDER, delivery());
    orders.put(order, article, offer);
    api.auto_schedule(ORDER, true, now_early()).unwrap();
    assert_eq!(total_slots(&store, ORDER), 200);

    orders.update_order(ORDER, |o| o.worked_quantity = 100.0);
    let report = api.reconcile_after_progress(ORDER, now_early()).unwrap();
    assert_eq!(
        report.outcome,
        ScheduleOutcome::Completed {
            quarters_removed: 200
        }
    );
    assert!(store.find_planning_records(ORDER).unwrap().is_empty());
}

#[test]
fn test_progress_trims_across_all_time() {
    let (_tmp, store, orders, api) = create_test_api();
    let (order, article, offer) = morning_shift_order(ORDER, delivery());
    orders.put(order, article, offer);
    api.auto_schedule(ORDER, true, now_early()).unwrap();

    // half worked: 100 quarters needed against 200 planned
    orders.update_order(ORDER, |o| o.worked_quantity = 50.0);
    let report = api.reconcile_after_progress(ORDER, now_early()).unwrap();
    assert_eq!(report.outcome, ScheduleOutcome::Trimmed { quarters: 100 });
    assert_eq!(total_slots(&store, ORDER), 100);

    // tail removal: the earliest days survive intact
    let records = store.find_planning_records(ORDER).unwrap();
    assert_eq!(records.len(), 4);
    assert_eq!(records[3].plan_date, date(2026, 9, 3));
    assert_eq!(records[3].slots.len(), 4);
}

#[test]
fn test_progress_extends_after_rework() {
    let (_tmp, store, orders, api) = create_test_api();
    let (order, article, offer) = morning_shift_order(ORDER, delivery());
    orders.put(order, article, offer);
    api.auto_schedule(ORDER, true, now_early()).unwrap();
    orders.update_order(ORDER, |o| o.worked_quantity = 50.0);
    api.reconcile_after_progress(ORDER, now_early()).unwrap();

    // rework: the worked counter drops back, planning must grow again
    orders.update_order(ORDER, |o| o.worked_quantity = 25.0);
    let report = api.reconcile_after_progress(ORDER, now_early()).unwrap();
    assert_eq!(report.outcome, ScheduleOutcome::Extended { quarters: 50 });
    assert_eq!(total_slots(&store, ORDER), 150);
}

#[test]
fn test_progress_with_no_planning_runs_full_schedule() {
    let (_tmp, store, orders, api) = create_test_api();
    let (order, article, offer) = morning_shift_order(ORDER, delivery());
    orders.put(order, article, offer);

    let report = api.reconcile_after_progress(ORDER, now_early()).unwrap();
    assert!(matches!(report.outcome, ScheduleOutcome::Scheduled(_)));
    assert_eq!(total_slots(&store, ORDER), 200);
}

// ==========================================
// replace-vs-merge asymmetry
// ==========================================
// A full reschedule rewrites each planned day wholesale, so a
// manual extension inside a rebuilt day is dropped. The
// incremental operations merge instead. This documents the
// observed behavior; the full rebuild is authoritative.

#[test]
fn test_full_reschedule_replaces_manually_extended_day() {
    use slot_scheduler::Granularity;

    let (_tmp, store, orders, api) = create_test_api();
    let (order, article, offer) = morning_shift_order(ORDER, delivery());
    orders.put(order, article, offer);
    api.auto_schedule(ORDER, true, now_early()).unwrap();

    // manual extra hour outside the walk's window on a planned day
    api.write_cell(ORDER, "LINE-A", date(2026, 8, 31), 14, 0, 5, Granularity::Hour)
        .unwrap();
    let record = store
        .find_planning_record(ORDER, "LINE-A", date(2026, 8, 31))
        .unwrap()
        .unwrap();
    assert_eq!(record.slots.len(), 36);

    // rebuild: the day map is replaced, the manual hour is gone
    api.auto_schedule(ORDER, false, now_early()).unwrap();
    let record = store
        .find_planning_record(ORDER, "LINE-A", date(2026, 8, 31))
        .unwrap()
        .unwrap();
    assert_eq!(record.slots.len(), 32);
    assert!(!record.slots.contains(1400));
}
