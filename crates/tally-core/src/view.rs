use serde::{Deserialize, Serialize};

use crate::filter::FilterMode;
use crate::task::Task;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskListView {
    pub tasks: Vec<Task>,
    pub filter: FilterMode,
    pub draft: String,
    pub is_editing: bool,
    pub completed_count: usize,
    pub total_count: usize,
    pub is_loading: bool,
}
