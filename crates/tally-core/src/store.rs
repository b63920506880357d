use anyhow::Context;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::storage::{KeyValueStorage, TODOS_KEY};
use crate::task::Task;

#[derive(Debug)]
pub struct TaskStore {
    storage: Box<dyn KeyValueStorage>,
    tasks: Vec<Task>,
    ready: bool,
}

impl TaskStore {
    pub fn new(storage: Box<dyn KeyValueStorage>) -> Self {
        Self {
            storage,
            tasks: Vec::new(),
            ready: false,
        }
    }

    pub fn open(storage: Box<dyn KeyValueStorage>) -> Self {
        let mut store = Self::new(storage);
        store.load();
        store
    }

    #[instrument(skip(self))]
    pub fn load(&mut self) {
        match self.storage.get(TODOS_KEY) {
            Ok(Some(raw)) => match serde_json::from_str::<Vec<Task>>(&raw) {
                Ok(tasks) => {
                    info!(count = tasks.len(), "loaded persisted tasks");
                    self.tasks = tasks;
                }
                Err(err) => {
                    warn!(error = %err, "persisted record is malformed; starting empty");
                    self.tasks = Vec::new();
                }
            },
            Ok(None) => {
                debug!("no persisted record; starting empty");
                self.tasks = Vec::new();
            }
            Err(err) => {
                warn!(error = %err, "failed reading persisted record; starting empty");
                self.tasks = Vec::new();
            }
        }
        self.ready = true;
    }

    pub fn is_ready(&self) -> bool {
        self.ready
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn find(&self, id: Uuid) -> Option<&Task> {
        self.tasks.iter().find(|task| task.id == id)
    }

    pub fn completed_count(&self) -> usize {
        self.tasks.iter().filter(|task| task.completed).count()
    }

    pub fn total_count(&self) -> usize {
        self.tasks.len()
    }

    #[instrument(skip(self, title))]
    pub fn create(&mut self, title: &str) -> anyhow::Result<Option<Uuid>> {
        let trimmed = title.trim();
        if trimmed.is_empty() {
            debug!("rejected empty title");
            return Ok(None);
        }

        let task = Task::new(trimmed.to_string());
        let id = task.id;
        let before = self.tasks.clone();
        self.tasks.push(task);
        self.commit(before)?;

        info!(%id, "created task");
        Ok(Some(id))
    }

    #[instrument(skip(self, title), fields(id = %id))]
    pub fn update(&mut self, id: Uuid, title: &str) -> anyhow::Result<bool> {
        let trimmed = title.trim();
        if trimmed.is_empty() {
            debug!("rejected empty title");
            return Ok(false);
        }
        let Some(idx) = self.tasks.iter().position(|task| task.id == id) else {
            debug!("task not found");
            return Ok(false);
        };

        let before = self.tasks.clone();
        self.tasks[idx].title = trimmed.to_string();
        self.commit(before)?;

        info!("updated task title");
        Ok(true)
    }

    #[instrument(skip(self), fields(id = %id))]
    pub fn toggle_completed(&mut self, id: Uuid) -> anyhow::Result<bool> {
        let Some(idx) = self.tasks.iter().position(|task| task.id == id) else {
            debug!("task not found");
            return Ok(false);
        };

        let before = self.tasks.clone();
        self.tasks[idx].completed = !self.tasks[idx].completed;
        self.commit(before)?;

        debug!(completed = self.tasks[idx].completed, "toggled task");
        Ok(true)
    }

    #[instrument(skip(self), fields(id = %id))]
    pub fn delete(&mut self, id: Uuid) -> anyhow::Result<bool> {
        let Some(idx) = self.tasks.iter().position(|task| task.id == id) else {
            debug!("task not found");
            return Ok(false);
        };

        let before = self.tasks.clone();
        self.tasks.remove(idx);
        self.commit(before)?;

        info!("deleted task");
        Ok(true)
    }

    #[instrument(skip(self))]
    pub fn complete_all(&mut self) -> anyhow::Result<()> {
        let before = self.tasks.clone();
        for task in &mut self.tasks {
            task.completed = true;
        }
        self.commit(before)?;

        info!(count = self.tasks.len(), "completed all tasks");
        Ok(())
    }

    #[instrument(skip(self))]
    pub fn clear_completed(&mut self) -> anyhow::Result<()> {
        let before = self.tasks.clone();
        self.tasks.retain(|task| !task.completed);
        let removed = before.len() - self.tasks.len();
        self.commit(before)?;

        info!(removed, "cleared completed tasks");
        Ok(())
    }

    // Full-snapshot overwrite; the previous collection is restored on a
    // failed write so memory and record never diverge.
    fn commit(&mut self, before: Vec<Task>) -> anyhow::Result<()> {
        let serialized =
            serde_json::to_string(&self.tasks).context("failed to serialize tasks")?;
        if let Err(err) = self.storage.set(TODOS_KEY, &serialized) {
            self.tasks = before;
            return Err(err.context("failed to persist tasks"));
        }
        Ok(())
    }
}
