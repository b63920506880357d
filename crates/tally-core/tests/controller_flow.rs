use std::time::{Duration, Instant};

use tally_core::controller::Controller;
use tally_core::debounce::ADD_QUIET_WINDOW;
use tally_core::filter::FilterMode;
use tally_core::notice::{Notice, NoticeKind};
use tally_core::storage::MemoryStorage;
use tally_core::store::TaskStore;
use uuid::Uuid;

fn seeded(tasks: &[(&str, bool)]) -> (Controller, Vec<Uuid>) {
    let mut store = TaskStore::open(Box::new(MemoryStorage::new()));
    let mut ids = Vec::new();
    for (title, completed) in tasks {
        let id = store.create(title).expect("create").expect("accepted");
        if *completed {
            store.toggle_completed(id).expect("toggle");
        }
        ids.push(id);
    }
    (Controller::new(store), ids)
}

fn just_after(armed_at: Instant) -> Instant {
    armed_at + ADD_QUIET_WINDOW + Duration::from_millis(1)
}

#[test]
fn debounced_add_collapses_repeated_presses() {
    let (mut controller, _) = seeded(&[]);
    let t0 = Instant::now();

    controller.input_changed("Buy milk");
    controller.primary_action(t0);
    controller.primary_action(t0 + Duration::from_millis(100));
    let last = t0 + Duration::from_millis(200);
    controller.primary_action(last);

    controller.tick(last + Duration::from_millis(400));
    assert_eq!(controller.store().total_count(), 0);

    controller.tick(just_after(last));
    assert_eq!(controller.store().total_count(), 1);
    assert_eq!(controller.store().tasks()[0].title, "Buy milk");
    assert!(!controller.store().tasks()[0].completed);
    assert_eq!(controller.draft(), "");
    assert_eq!(
        controller.take_notices(),
        vec![Notice::success("Task added successfully")]
    );

    controller.tick(just_after(just_after(last)));
    assert_eq!(controller.store().total_count(), 1);
}

#[test]
fn created_task_updates_counts() {
    let (mut controller, _) = seeded(&[]);
    let t0 = Instant::now();

    controller.input_changed("Buy milk");
    controller.primary_action(t0);
    controller.tick(just_after(t0));

    let view = controller.view();
    assert_eq!(view.total_count, 1);
    assert_eq!(view.completed_count, 0);
}

#[test]
fn typing_drops_a_pending_add() {
    let (mut controller, _) = seeded(&[]);
    let t0 = Instant::now();

    controller.input_changed("Buy");
    controller.primary_action(t0);
    controller.input_changed("Buy milk");

    controller.tick(just_after(t0));
    assert_eq!(controller.store().total_count(), 0);

    let t1 = just_after(t0);
    controller.primary_action(t1);
    controller.tick(just_after(t1));
    assert_eq!(controller.store().total_count(), 1);
    assert_eq!(controller.store().tasks()[0].title, "Buy milk");
}

#[test]
fn collection_mutations_drop_a_pending_add() {
    let (mut controller, ids) = seeded(&[("existing", false)]);
    let t0 = Instant::now();

    controller.input_changed("pending");
    controller.primary_action(t0);
    controller.toggle(ids[0]);

    controller.tick(just_after(t0));
    assert_eq!(controller.store().total_count(), 1);
}

#[test]
fn filter_changes_keep_a_pending_add() {
    let (mut controller, _) = seeded(&[]);
    let t0 = Instant::now();

    controller.input_changed("survives filters");
    controller.primary_action(t0);
    controller.set_filter(FilterMode::Completed);

    controller.tick(just_after(t0));
    assert_eq!(controller.store().total_count(), 1);
}

#[test]
fn blank_draft_add_is_a_silent_noop() {
    let (mut controller, _) = seeded(&[]);
    let t0 = Instant::now();

    controller.input_changed("   ");
    controller.primary_action(t0);
    controller.tick(just_after(t0));

    assert_eq!(controller.store().total_count(), 0);
    assert!(controller.take_notices().is_empty());
}

#[test]
fn primary_enablement_mirrors_draft_and_edit_state() {
    let (mut controller, ids) = seeded(&[("existing", false)]);

    assert!(!controller.primary_enabled());
    controller.input_changed("   ");
    assert!(!controller.primary_enabled());
    controller.input_changed("fresh task");
    assert!(controller.primary_enabled());

    controller.begin_edit(ids[0]);
    controller.input_changed("");
    assert!(controller.primary_enabled());
}

#[test]
fn begin_edit_loads_the_title_and_primary_commits_update() {
    let (mut controller, ids) = seeded(&[("Old title", false)]);

    controller.input_changed("half-typed draft");
    controller.begin_edit(ids[0]);
    assert!(controller.is_editing());
    assert_eq!(controller.draft(), "Old title");

    controller.input_changed("New title");
    controller.primary_action(Instant::now());

    assert_eq!(controller.store().tasks()[0].title, "New title");
    assert_eq!(controller.store().tasks()[0].id, ids[0]);
    assert!(!controller.is_editing());
    assert_eq!(controller.draft(), "");
    assert_eq!(
        controller.take_notices(),
        vec![Notice::success("Task updated successfully")]
    );
}

#[test]
fn begin_edit_of_unknown_id_is_a_noop() {
    let (mut controller, _) = seeded(&[("only", false)]);

    controller.input_changed("typed");
    controller.begin_edit(Uuid::new_v4());

    assert!(!controller.is_editing());
    assert_eq!(controller.draft(), "typed");
}

#[test]
fn update_of_a_vanished_task_reports_no_success() {
    let (mut controller, ids) = seeded(&[("doomed", false)]);

    controller.begin_edit(ids[0]);
    controller.delete(ids[0]);
    controller.take_notices();

    let before = controller.store().tasks().to_vec();
    controller.input_changed("new title");
    controller.primary_action(Instant::now());

    assert_eq!(controller.store().tasks(), before.as_slice());
    assert!(controller.take_notices().is_empty());
    assert!(!controller.is_editing());
}

#[test]
fn delete_emits_a_success_notice() {
    let (mut controller, ids) = seeded(&[("goner", false)]);

    controller.delete(ids[0]);
    assert_eq!(controller.store().total_count(), 0);
    assert_eq!(
        controller.take_notices(),
        vec![Notice::success("Task deleted successfully")]
    );

    controller.delete(ids[0]);
    assert!(controller.take_notices().is_empty());
}

#[test]
fn toggle_and_bulk_operations_emit_no_notices() {
    let (mut controller, ids) = seeded(&[("a", false), ("b", true)]);

    controller.toggle(ids[0]);
    controller.complete_all();
    controller.clear_completed();

    assert!(controller.take_notices().is_empty());
    assert_eq!(controller.store().total_count(), 0);
}

#[test]
fn view_filters_and_reverses_insertion_order() {
    let (mut controller, _) = seeded(&[("A", false), ("B", true), ("C", false)]);

    let view = controller.view();
    let titles: Vec<&str> = view.tasks.iter().map(|t| t.title.as_str()).collect();
    assert_eq!(titles, vec!["C", "B", "A"]);
    assert_eq!(view.total_count, 3);
    assert_eq!(view.completed_count, 1);

    controller.set_filter(FilterMode::Completed);
    let view = controller.view();
    let titles: Vec<&str> = view.tasks.iter().map(|t| t.title.as_str()).collect();
    assert_eq!(titles, vec!["B"]);
    assert_eq!(view.filter, FilterMode::Completed);

    controller.set_filter(FilterMode::Uncompleted);
    let view = controller.view();
    let titles: Vec<&str> = view.tasks.iter().map(|t| t.title.as_str()).collect();
    assert_eq!(titles, vec!["C", "A"]);
}

#[test]
fn view_reports_loading_until_the_store_loads() {
    let store = TaskStore::new(Box::new(MemoryStorage::new()));
    let controller = Controller::new(store);
    assert!(controller.view().is_loading);

    let (controller, _) = seeded(&[]);
    assert!(!controller.view().is_loading);
}

#[test]
fn storage_failure_surfaces_an_error_notice() {
    let mut storage = MemoryStorage::new();
    storage.fail_writes = true;
    let store = TaskStore::open(Box::new(storage));
    let mut controller = Controller::new(store);
    let t0 = Instant::now();

    controller.input_changed("unlucky");
    controller.primary_action(t0);
    controller.tick(just_after(t0));

    assert_eq!(controller.store().total_count(), 0);
    assert_eq!(controller.draft(), "unlucky");
    let notices = controller.take_notices();
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].kind, NoticeKind::Error);
    assert_eq!(notices[0].message, "Error adding task");
}

#[test]
fn teardown_cancels_a_pending_add() {
    let (mut controller, _) = seeded(&[]);
    let t0 = Instant::now();

    controller.input_changed("never lands");
    controller.primary_action(t0);
    controller.cancel_pending_add();

    controller.tick(just_after(t0));
    assert_eq!(controller.store().total_count(), 0);
}

#[test]
fn flush_commits_without_waiting_out_the_window() {
    let (mut controller, _) = seeded(&[]);

    controller.input_changed("right away");
    controller.primary_action(Instant::now());
    controller.flush();

    assert_eq!(controller.store().total_count(), 1);
    assert_eq!(controller.store().tasks()[0].title, "right away");
}
