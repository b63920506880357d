use std::time::Instant;

use tracing::{debug, instrument, warn};
use uuid::Uuid;

use crate::debounce::DebouncedAdd;
use crate::filter::{FilterMode, visible_tasks};
use crate::notice::Notice;
use crate::store::TaskStore;
use crate::view::TaskListView;

// Sits between the presentation layer and the store; owns the transient
// session state that is never persisted: draft text, filter mode, edit
// pointer, the pending debounced add and the notice queue.
#[derive(Debug)]
pub struct Controller {
    store: TaskStore,
    draft: String,
    filter: FilterMode,
    edit_id: Option<Uuid>,
    pending_add: DebouncedAdd,
    notices: Vec<Notice>,
}

impl Controller {
    pub fn new(store: TaskStore) -> Self {
        Self {
            store,
            draft: String::new(),
            filter: FilterMode::default(),
            edit_id: None,
            pending_add: DebouncedAdd::new(),
            notices: Vec::new(),
        }
    }

    pub fn store(&self) -> &TaskStore {
        &self.store
    }

    pub fn draft(&self) -> &str {
        &self.draft
    }

    pub fn filter(&self) -> FilterMode {
        self.filter
    }

    pub fn is_editing(&self) -> bool {
        self.edit_id.is_some()
    }

    // A pending add captured an older draft; it is dropped rather than
    // committed stale.
    pub fn input_changed(&mut self, text: &str) {
        if self.pending_add.cancel() {
            debug!("draft changed; dropped pending add");
        }
        self.draft = text.to_string();
    }

    pub fn primary_enabled(&self) -> bool {
        !self.draft.trim().is_empty() || self.edit_id.is_some()
    }

    #[instrument(skip(self, now))]
    pub fn primary_action(&mut self, now: Instant) {
        match self.edit_id {
            Some(id) => self.commit_update(id),
            None => self.pending_add.trigger(self.draft.clone(), now),
        }
    }

    pub fn begin_edit(&mut self, id: Uuid) {
        let Some(task) = self.store.find(id) else {
            debug!(%id, "edit target not found");
            return;
        };
        let title = task.title.clone();

        self.pending_add.cancel();
        self.edit_id = Some(id);
        self.draft = title;
    }

    pub fn set_filter(&mut self, mode: FilterMode) {
        self.filter = mode;
    }

    pub fn toggle(&mut self, id: Uuid) {
        self.pending_add.cancel();
        if let Err(err) = self.store.toggle_completed(id) {
            warn!(error = %err, "toggle failed");
            self.notices.push(Notice::error("Error saving tasks"));
        }
    }

    pub fn delete(&mut self, id: Uuid) {
        self.pending_add.cancel();
        match self.store.delete(id) {
            Ok(true) => {
                self.notices
                    .push(Notice::success("Task deleted successfully"));
            }
            Ok(false) => {}
            Err(err) => {
                warn!(error = %err, "delete failed");
                self.notices.push(Notice::error("Error deleting task"));
            }
        }
    }

    pub fn complete_all(&mut self) {
        self.pending_add.cancel();
        if let Err(err) = self.store.complete_all() {
            warn!(error = %err, "complete-all failed");
            self.notices.push(Notice::error("Error saving tasks"));
        }
    }

    pub fn clear_completed(&mut self) {
        self.pending_add.cancel();
        if let Err(err) = self.store.clear_completed() {
            warn!(error = %err, "clear-completed failed");
            self.notices.push(Notice::error("Error saving tasks"));
        }
    }

    pub fn tick(&mut self, now: Instant) {
        let Some(text) = self.pending_add.take_if_due(now) else {
            return;
        };
        self.commit_add(&text);
    }

    pub fn flush(&mut self) {
        if let Some(text) = self.pending_add.take() {
            self.commit_add(&text);
        }
    }

    // Teardown: a pending add must not fire into a discarded session.
    pub fn cancel_pending_add(&mut self) {
        if self.pending_add.cancel() {
            debug!("canceled pending add at teardown");
        }
    }

    pub fn pending_add_deadline(&self) -> Option<Instant> {
        self.pending_add.deadline()
    }

    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    pub fn view(&self) -> TaskListView {
        TaskListView {
            tasks: visible_tasks(self.store.tasks(), self.filter),
            filter: self.filter,
            draft: self.draft.clone(),
            is_editing: self.edit_id.is_some(),
            completed_count: self.store.completed_count(),
            total_count: self.store.total_count(),
            is_loading: !self.store.is_ready(),
        }
    }

    fn commit_add(&mut self, text: &str) {
        match self.store.create(text) {
            Ok(Some(id)) => {
                debug!(%id, "debounced add committed");
                self.draft.clear();
                self.notices
                    .push(Notice::success("Task added successfully"));
            }
            Ok(None) => {}
            Err(err) => {
                warn!(error = %err, "create failed");
                self.notices.push(Notice::error("Error adding task"));
            }
        }
    }

    fn commit_update(&mut self, id: Uuid) {
        if self.draft.trim().is_empty() {
            return;
        }

        match self.store.update(id, &self.draft) {
            Ok(true) => {
                self.draft.clear();
                self.edit_id = None;
                self.notices
                    .push(Notice::success("Task updated successfully"));
            }
            Ok(false) => {
                // Edit target vanished; the edit session is over.
                self.draft.clear();
                self.edit_id = None;
            }
            Err(err) => {
                warn!(error = %err, "update failed");
                self.notices.push(Notice::error("Error updating task"));
            }
        }
    }
}
