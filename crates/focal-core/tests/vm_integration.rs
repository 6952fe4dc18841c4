//! Reactive runtime behavior: one complete snapshot per upstream emission,
//! tick-driven recomputes, and deterministic subscription teardown.

use std::sync::Arc;
use std::time::Duration;

use focal_core::storage::Config;
use focal_core::vm::{StartOutcome, TasksListVm, TimerVm};
use focal_core::{ActivityKind, Database, IntervalMachine, ManualClock, FOLDER_TODAY};

const EMISSION_TIMEOUT: Duration = Duration::from_secs(2);

#[tokio::test]
async fn each_change_publishes_one_complete_snapshot() {
    let db = Arc::new(Database::open_memory().unwrap());
    let vm = TasksListVm::new(db.clone(), FOLDER_TODAY);
    vm.on_appear();
    let mut rx = vm.state();
    assert!(rx.borrow_and_update().ui_tasks.is_empty());

    for i in 0..3usize {
        db.insert_task(FOLDER_TODAY, &format!("task {i} #t:{}", 60 * (i + 1)))
            .unwrap();
        tokio::time::timeout(EMISSION_TIMEOUT, rx.changed())
            .await
            .expect("snapshot published")
            .unwrap();
        let state = rx.borrow_and_update().clone();
        // Internally consistent full snapshot: every row decoded, newest
        // first, count matching the store.
        assert_eq!(state.ui_tasks.len(), i + 1);
        assert_eq!(state.ui_tasks[0].list_text, format!("task {i}"));
        assert!(state
            .ui_tasks
            .iter()
            .all(|ui| !ui.list_text.contains("#t:")));
    }
}

#[tokio::test]
async fn irrelevant_changes_do_not_republish() {
    let db = Arc::new(Database::open_memory().unwrap());
    let vm = TasksListVm::new(db.clone(), FOLDER_TODAY);
    vm.on_appear();
    let mut rx = vm.state();
    rx.borrow_and_update();

    db.insert_repeating("water plants", "Every day", 20_000)
        .unwrap();
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(!rx.has_changed().unwrap());
}

#[tokio::test]
async fn on_disappear_releases_subscriptions() {
    let db = Arc::new(Database::open_memory().unwrap());
    let vm = TasksListVm::new(db.clone(), FOLDER_TODAY);
    vm.on_appear();
    // Idempotent while visible.
    vm.on_appear();
    vm.on_disappear();

    let mut rx = vm.state();
    rx.borrow_and_update();
    db.insert_task(FOLDER_TODAY, "invisible").unwrap();
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(!rx.has_changed().unwrap());

    // Reappearing resubscribes and catches up on the next change.
    vm.on_appear();
    db.insert_task(FOLDER_TODAY, "visible again").unwrap();
    tokio::time::timeout(EMISSION_TIMEOUT, rx.changed())
        .await
        .expect("resubscribed")
        .unwrap();
    assert_eq!(rx.borrow_and_update().ui_tasks.len(), 2);
}

#[tokio::test]
async fn start_without_annotations_requests_a_sheet() {
    let db = Arc::new(Database::open_memory().unwrap());
    let activity_id = db
        .insert_activity("Write", "", ActivityKind::Normal)
        .unwrap();
    let vm = TasksListVm::new(db.clone(), FOLDER_TODAY);

    let plain = db.insert_task(FOLDER_TODAY, "no annotations here").unwrap();
    assert_eq!(vm.start(plain).unwrap(), StartOutcome::NeedsSheet);

    let annotated = db
        .insert_task(FOLDER_TODAY, &format!("draft #a:{activity_id} #t:900"))
        .unwrap();
    assert_eq!(vm.start(annotated).unwrap(), StartOutcome::Started);

    // The fire-and-forget write lands: task consumed, interval current.
    let mut rx = vm.state();
    tokio::time::timeout(EMISSION_TIMEOUT, async {
        while db.task(annotated).unwrap().is_some() {
            let _ = tokio::time::timeout(Duration::from_millis(50), rx.changed()).await;
        }
    })
    .await
    .expect("start write applied");
    let interval = db.last_interval().unwrap().expect("interval created");
    assert_eq!(interval.activity_id, activity_id);
    assert_eq!(interval.timer_seconds, 900);
}

#[tokio::test]
async fn timer_vm_ticks_recompute_time_derived_fields() {
    let db = Arc::new(Database::open_memory().unwrap());
    let activity_id = db
        .insert_activity("Focus", "", ActivityKind::Normal)
        .unwrap();
    let activity = db.activity(activity_id).unwrap().unwrap();
    let clock = Arc::new(ManualClock::new(10_000));
    let machine = Arc::new(IntervalMachine::with_clock(db.clone(), clock.clone()));
    machine.start(&activity, 300, None).unwrap();

    let vm = TimerVm::with_machine(db.clone(), machine, &Config::default());
    let mut rx = vm.state();
    let initial = rx.borrow_and_update().clone();
    assert_eq!(
        initial.data.as_ref().map(|d| d.timer_text.as_str()),
        Some("05:00")
    );

    vm.on_appear();
    clock.advance(60);
    // No record changed; only the tick can observe the new clock reading.
    let updated = tokio::time::timeout(EMISSION_TIMEOUT, async move {
        loop {
            rx.changed().await.unwrap();
            let state = rx.borrow_and_update().clone();
            let text = state.data.as_ref().map(|d| d.timer_text.clone());
            if text.as_deref() == Some("04:00") {
                return state;
            }
        }
    })
    .await
    .expect("tick recompute observed");
    assert_eq!(
        updated.data.as_ref().map(|d| d.timer_text.as_str()),
        Some("04:00")
    );
    vm.on_disappear();
}
