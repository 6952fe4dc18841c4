//! Repeating-task list screen runtime.
//!
//! The right-hand label ("12 Aug, 6d") is date-derived, so besides record
//! changes this runtime recomputes on minute ticks to survive midnight.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use chrono::{Days, Local, NaiveDate};
use serde::Serialize;
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::watch;
use tracing::warn;

use super::scope::VmScope;
use crate::error::Result;
use crate::events::Change;
use crate::records::Repeating;
use crate::storage::Database;
use crate::text::{TextFeatures, Trigger};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UiRepeating {
    pub repeating: Repeating,
    pub list_text: String,
    pub triggers: Vec<Trigger>,
    pub period_title: String,
    /// "12 Aug, 6d"
    pub next_day_text: String,
    pub days_left: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Default)]
pub struct RepeatingsListVmState {
    pub ui_repeatings: Vec<UiRepeating>,
}

pub struct RepeatingsListVm {
    db: Arc<Database>,
    state: watch::Sender<RepeatingsListVmState>,
    scope: Mutex<Option<VmScope>>,
}

impl RepeatingsListVm {
    pub fn new(db: Arc<Database>) -> Arc<Self> {
        let (state, _) = watch::channel(RepeatingsListVmState::default());
        let vm = Arc::new(Self {
            db,
            state,
            scope: Mutex::new(None),
        });
        vm.recompute();
        vm
    }

    pub fn state(&self) -> watch::Receiver<RepeatingsListVmState> {
        self.state.subscribe()
    }

    /// Begin subscriptions: repeating changes plus a minute tick. Safe to
    /// call again while visible; the second call is a no-op.
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
                    Ok(Change::Repeatings) => true,
                    Ok(_) => false,
                    Err(RecvError::Lagged(missed)) => {
                        warn!(missed, "repeating change stream lagged");
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
            let mut tick = tokio::time::interval(Duration::from_secs(60));
            loop {
                tick.tick().await;
                let Some(vm) = weak.upgrade() else { break };
                vm.recompute();
            }
        });

        *slot = Some(scope);
    }

    pub fn on_disappear(&self) {
        self.lock_scope().take();
    }

    // ── Operations ───────────────────────────────────────────────────

    pub fn delete(self: &Arc<Self>, repeating_id: i64) {
        let vm = Arc::clone(self);
        tokio::spawn(async move {
            if let Err(err) = vm.db.delete_repeating(repeating_id) {
                warn!(error = %err, repeating_id, "repeating delete failed");
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
            Err(err) => warn!(error = %err, "repeating list recompute failed"),
        }
    }

    fn snapshot(&self) -> Result<RepeatingsListVmState> {
        let today = local_epoch_day();
        let mut repeatings = self.db.repeatings()?;
        repeatings.sort_by(|a, b| {
            a.next_day
                .cmp(&b.next_day)
                .then_with(|| b.text.to_lowercase().cmp(&a.text.to_lowercase()))
        });
        let ui_repeatings = repeatings
            .into_iter()
            .map(|repeating| {
                let features = TextFeatures::parse(&repeating.text);
                let days_left = repeating.days_left(today);
                UiRepeating {
                    list_text: features.bare_text,
                    triggers: features.triggers,
                    period_title: repeating.period_title.clone(),
                    next_day_text: format!(
                        "{}, {}d",
                        epoch_day_date(repeating.next_day).format("%-d %b"),
                        days_left
                    ),
                    days_left,
                    repeating,
                }
            })
            .collect();
        Ok(RepeatingsListVmState { ui_repeatings })
    }
}

/// Today in local time, as days since the epoch.
fn local_epoch_day() -> i64 {
    Local::now()
        .date_naive()
        .signed_duration_since(epoch_date())
        .num_days()
}

fn epoch_day_date(days: i64) -> NaiveDate {
    let date = epoch_date();
    if days >= 0 {
        date.checked_add_days(Days::new(days as u64)).unwrap_or(date)
    } else {
        date.checked_sub_days(Days::new(days.unsigned_abs())).unwrap_or(date)
    }
}

fn epoch_date() -> NaiveDate {
    // chrono's default NaiveDate is 1970-01-01.
    NaiveDate::default()
}
