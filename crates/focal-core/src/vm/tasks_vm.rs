//! Task list screen runtime, one instance per folder.

use std::sync::{Arc, Mutex, MutexGuard};

use serde::Serialize;
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::watch;
use tracing::warn;

use super::scope::VmScope;
use crate::error::Result;
use crate::events::Change;
use crate::records::Task;
use crate::storage::Database;
use crate::text::{TextFeatures, Trigger};
use crate::timer::IntervalMachine;

/// One row of the list: the task plus its decoded display features.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UiTask {
    pub task: Task,
    pub list_text: String,
    pub triggers: Vec<Trigger>,
    pub is_important: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Default)]
pub struct TasksListVmState {
    pub ui_tasks: Vec<UiTask>,
}

/// Whether a start request could proceed from the text alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartOutcome {
    /// The write was issued.
    Started,
    /// The text lacks an activity or timer annotation (or the activity is
    /// gone); the UI must collect them before starting.
    NeedsSheet,
}

pub struct TasksListVm {
    db: Arc<Database>,
    machine: Arc<IntervalMachine>,
    folder_id: i64,
    state: watch::Sender<TasksListVmState>,
    scope: Mutex<Option<VmScope>>,
}

impl TasksListVm {
    pub fn new(db: Arc<Database>, folder_id: i64) -> Arc<Self> {
        let machine = Arc::new(IntervalMachine::new(db.clone()));
        let (state, _) = watch::channel(TasksListVmState::default());
        let vm = Arc::new(Self {
            db,
            machine,
            folder_id,
            state,
            scope: Mutex::new(None),
        });
        vm.recompute();
        vm
    }

    pub fn state(&self) -> watch::Receiver<TasksListVmState> {
        self.state.subscribe()
    }

    /// Begin the task change subscription. Safe to call again while
    /// visible; the second call is a no-op.
    pub fn on_appear(self: &Arc<Self>) {
        let mut slot = self.lock_scope();
        if slot.is_some() {
            return;
        }
        let mut scope = VmScope::new();

        let weak = Arc::downgrade(self);
        let mut changes = self.db.subscribe();
        scope.spawn(async move {
            loop {
                let relevant = match changes.recv().await {
                    Ok(Change::Tasks) => true,
                    Ok(_) => false,
                    Err(RecvError::Lagged(missed)) => {
                        warn!(missed, "task change stream lagged");
                        true
                    }
                    Err(RecvError::Closed) => break,
                };
                if relevant {
                    let Some(vm) = weak.upgrade() else { break };
                    vm.recompute();
                }
            }
        });

        *slot = Some(scope);
    }

    pub fn on_disappear(&self) {
        self.lock_scope().take();
    }

    // ── Operations ───────────────────────────────────────────────────

    /// Start the task if its text carries activity and timer annotations.
    /// The decision is synchronous; the write itself is fire-and-forget.
    pub fn start(self: &Arc<Self>, task_id: i64) -> Result<StartOutcome> {
        let Some(task) = self.db.task(task_id)? else {
            return Ok(StartOutcome::NeedsSheet);
        };
        let features = TextFeatures::parse(&task.text);
        let (Some(activity_id), Some(timer_seconds)) =
            (features.activity_id, features.timer_seconds)
        else {
            return Ok(StartOutcome::NeedsSheet);
        };
        let Some(activity) = self.db.activity(activity_id)? else {
            return Ok(StartOutcome::NeedsSheet);
        };
        let vm = Arc::clone(self);
        tokio::spawn(async move {
            if let Err(err) = vm.machine.start(&activity, timer_seconds, Some(&task)) {
                warn!(error = %err, task_id, "task start failed");
            }
        });
        Ok(StartOutcome::Started)
    }

    pub fn delete(self: &Arc<Self>, task_id: i64) {
        let vm = Arc::clone(self);
        tokio::spawn(async move {
            if let Err(err) = vm.db.delete_task(task_id) {
                warn!(error = %err, task_id, "task delete failed");
            }
        });
    }

    pub fn move_to_folder(self: &Arc<Self>, task_id: i64, folder_id: i64) {
        let vm = Arc::clone(self);
        tokio::spawn(async move {
            if let Err(err) = vm.db.update_task_folder(task_id, folder_id) {
                warn!(error = %err, task_id, "task move failed");
            }
        });
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn lock_scope(&self) -> MutexGuard<'_, Option<VmScope>> {
        self.scope.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn recompute(&self) {
        match self.snapshot() {
            Ok(next) => {
                self.state.send_replace(next);
            }
            Err(err) => warn!(error = %err, "task list recompute failed"),
        }
    }

    /// Newest first, decoded for display.
    fn snapshot(&self) -> Result<TasksListVmState> {
        let ui_tasks = self
            .db
            .tasks_in_folder(self.folder_id)?
            .into_iter()
            .rev()
            .map(|task| {
                let features = TextFeatures::parse(&task.text);
                UiTask {
                    list_text: features.bare_text,
                    triggers: features.triggers,
                    is_important: features.is_important,
                    task,
                }
            })
            .collect();
        Ok(TasksListVmState { ui_tasks })
    }
}
