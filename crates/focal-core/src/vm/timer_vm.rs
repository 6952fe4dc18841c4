//! Timer screen runtime.
//!
//! Subscribes to record changes and a one-second tick; both feed the same
//! full-snapshot recompute.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use serde::Serialize;
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::watch;
use tracing::warn;

use super::scope::VmScope;
use super::timer_data::TimerData;
use crate::error::Result;
use crate::events::Change;
use crate::records::{Interval, FOLDER_TODAY};
use crate::storage::{Config, Database};
use crate::timer::{IntervalMachine, Phase};

/// One prolong shortcut.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProlongHint {
    pub seconds: i64,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Default)]
pub struct TimerVmState {
    pub interval: Option<Interval>,
    pub data: Option<TimerData>,
    pub prolong_hints: Vec<ProlongHint>,
}

pub struct TimerVm {
    db: Arc<Database>,
    machine: Arc<IntervalMachine>,
    hints: Vec<ProlongHint>,
    state: watch::Sender<TimerVmState>,
    scope: Mutex<Option<VmScope>>,
}

impl TimerVm {
    pub fn new(db: Arc<Database>, config: &Config) -> Arc<Self> {
        let machine = Arc::new(IntervalMachine::new(db.clone()));
        Self::with_machine(db, machine, config)
    }

    /// Construction seam for an injected clock/machine.
    pub fn with_machine(
        db: Arc<Database>,
        machine: Arc<IntervalMachine>,
        config: &Config,
    ) -> Arc<Self> {
        let hints = config
            .prolong_hint_minutes
            .iter()
            .map(|&minutes| ProlongHint {
                seconds: minutes * 60,
                label: if minutes >= 60 {
                    format!("{}h", minutes / 60)
                } else {
                    minutes.to_string()
                },
            })
            .collect();
        let (state, _) = watch::channel(TimerVmState::default());
        let vm = Arc::new(Self {
            db,
            machine,
            hints,
            state,
            scope: Mutex::new(None),
        });
        vm.recompute();
        vm
    }

    pub fn state(&self) -> watch::Receiver<TimerVmState> {
        self.state.subscribe()
    }

    /// Begin subscriptions. Safe to call again while visible; the second
    /// call is a no-op.
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
                    Ok(Change::Intervals | Change::Tasks | Change::Activities) => true,
                    Ok(Change::Repeatings) => false,
                    Err(RecvError::Lagged(missed)) => {
                        warn!(missed, "timer change stream lagged");
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

        let weak = Arc::downgrade(self);
        scope.spawn(async move {
            let mut tick = tokio::time::interval(Duration::from_secs(1));
            loop {
                tick.tick().await;
                let Some(vm) = weak.upgrade() else { break };
                vm.recompute();
            }
        });

        *slot = Some(scope);
    }

    /// Release every subscription.
    pub fn on_disappear(&self) {
        self.lock_scope().take();
    }

    // ── Operations ───────────────────────────────────────────────────

    /// Pause when running, resume the referenced task when paused.
    /// Fire-and-forget: the change stream reflects the outcome.
    pub fn toggle_pause(self: &Arc<Self>) {
        let vm = Arc::clone(self);
        tokio::spawn(async move {
            let result = match vm.machine.phase() {
                Ok(Phase::Paused { task_id, .. }) => vm.machine.resume(task_id).map(drop),
                Ok(Phase::Idle) => Ok(()),
                Ok(_) => vm.machine.pause().map(drop),
                Err(err) => Err(err),
            };
            if let Err(err) = result {
                warn!(error = %err, "toggle_pause failed");
            }
        });
    }

    pub fn prolong(self: &Arc<Self>, extra_seconds: i64) {
        let vm = Arc::clone(self);
        tokio::spawn(async move {
            if let Err(err) = vm.machine.prolong(extra_seconds) {
                warn!(error = %err, "prolong failed");
            }
        });
    }

    pub fn restart(self: &Arc<Self>) {
        let vm = Arc::clone(self);
        tokio::spawn(async move {
            if let Err(err) = vm.machine.restart() {
                warn!(error = %err, "restart failed");
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
            Err(err) => warn!(error = %err, "timer snapshot recompute failed"),
        }
    }

    /// Full snapshot from fresh reads; no incremental patching.
    fn snapshot(&self) -> Result<TimerVmState> {
        let interval = self.db.last_interval()?;
        let data = match &interval {
            Some(interval) => {
                let activity = self.db.activity(interval.activity_id)?;
                let today = self.db.tasks_in_folder(FOLDER_TODAY)?;
                Some(TimerData::build(
                    interval,
                    activity.as_ref(),
                    &today,
                    self.machine.now(),
                ))
            }
            None => None,
        };
        Ok(TimerVmState {
            interval,
            data,
            prolong_hints: self.hints.clone(),
        })
    }
}
