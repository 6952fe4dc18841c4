//! Interval state machine.
//!
//! The current interval is always the row with the greatest start time, and
//! phase is derived from that row plus its decoded note -- neither is ever
//! stored as a flag. Every transition is a single atomic row write, and each
//! one re-reads the current interval immediately before computing the
//! successor (read-then-write; interval mutation is user-triggered and
//! effectively single-writer per device). A transition that does not apply
//! in the current phase returns `Ok(None)`.
//!
//! ## Transitions
//!
//! ```text
//! Idle ──start──▶ Running ──▶ Overdue
//!                  │  ▲           │
//!                pause │resume  pause
//!                  ▼  │           ▼
//!                   Paused ◀──────┘
//! ```

use std::sync::Arc;

use serde::Serialize;
use tracing::debug;

use super::clock::{Clock, SystemClock};
use crate::error::Result;
use crate::records::{Activity, Interval, Task, FOLDER_TODAY};
use crate::storage::Database;
use crate::text::{Paused, Prolonged, TextFeatures};

/// Derived phase of the current timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "phase", rename_all = "lowercase")]
pub enum Phase {
    /// No interval recorded yet.
    Idle,
    Running { seconds_to_end: i64 },
    Overdue { seconds_over: i64 },
    Paused { task_id: i64, timer_seconds: i64 },
}

impl Phase {
    /// Phase of `interval` at `now`. Paused state lives in the note; a
    /// missing or unannotated note means the timer is simply running down.
    pub fn of(interval: &Interval, now: i64) -> Phase {
        let features = TextFeatures::parse(interval.note.as_deref().unwrap_or(""));
        if let Some(paused) = features.paused {
            return Phase::Paused {
                task_id: paused.task_id,
                timer_seconds: paused.timer_seconds,
            };
        }
        let left = interval.seconds_to_end(now);
        if left > 0 {
            Phase::Running {
                seconds_to_end: left,
            }
        } else {
            Phase::Overdue {
                seconds_over: -left,
            }
        }
    }
}

pub struct IntervalMachine {
    db: Arc<Database>,
    clock: Arc<dyn Clock>,
}

impl IntervalMachine {
    pub fn new(db: Arc<Database>) -> Self {
        Self::with_clock(db, Arc::new(SystemClock))
    }

    pub fn with_clock(db: Arc<Database>, clock: Arc<dyn Clock>) -> Self {
        Self { db, clock }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn now(&self) -> i64 {
        self.clock.now()
    }

    pub fn phase(&self) -> Result<Phase> {
        match self.db.last_interval()? {
            Some(interval) => Ok(Phase::of(&interval, self.clock.now())),
            None => Ok(Phase::Idle),
        }
    }

    // ── Transitions ──────────────────────────────────────────────────

    /// Start a genuinely new interval. Consumes `task` when given: its text
    /// becomes the interval note and the task row is deleted.
    pub fn start(
        &self,
        activity: &Activity,
        timer_seconds: i64,
        task: Option<&Task>,
    ) -> Result<Interval> {
        let interval = Interval {
            start_time: self.fresh_start_time()?,
            timer_seconds,
            note: task.map(|task| task.text.clone()),
            activity_id: activity.id,
        };
        self.db.put_interval(&interval)?;
        if let Some(task) = task {
            self.db.delete_task(task.id)?;
        }
        debug!(
            start_time = interval.start_time,
            activity_id = activity.id,
            timer_seconds,
            "interval started"
        );
        Ok(interval)
    }

    /// Pause the running (or overdue) interval.
    ///
    /// The paused work is materialized as a Today task carrying the activity
    /// and timer annotations, so it can be resumed from the task list too.
    /// The interval row keeps its start time but moves to the neutral Other
    /// activity, and its note records which task to resume with what timer.
    pub fn pause(&self) -> Result<Option<Interval>> {
        let Some(current) = self.db.last_interval()? else {
            return Ok(None);
        };
        let features = TextFeatures::parse(current.note.as_deref().unwrap_or(""));
        if features.paused.is_some() {
            return Ok(None);
        }

        let bare_text = if features.bare_text.is_empty() {
            match self.db.activity(current.activity_id)? {
                Some(activity) => activity.name,
                None => String::new(),
            }
        } else {
            features.bare_text.clone()
        };
        let task_text = TextFeatures {
            bare_text: bare_text.clone(),
            activity_id: Some(current.activity_id),
            timer_seconds: Some(current.timer_seconds),
            triggers: features.triggers.clone(),
            is_important: features.is_important,
            from_repeating_id: features.from_repeating_id,
            ..Default::default()
        }
        .encode();
        let task_id = self.db.insert_task(FOLDER_TODAY, &task_text)?;

        let other = self.db.other_activity()?;
        let note = TextFeatures {
            bare_text,
            paused: Some(Paused {
                task_id,
                timer_seconds: current.timer_seconds,
            }),
            ..Default::default()
        }
        .encode();
        let paused = Interval {
            start_time: current.start_time,
            timer_seconds: current.timer_seconds,
            note: Some(note),
            activity_id: other.id,
        };
        self.db.put_interval(&paused)?;
        debug!(start_time = paused.start_time, task_id, "interval paused");
        Ok(Some(paused))
    }

    /// Resume the task a pause materialized: a fresh interval for the
    /// activity and timer found in the task's annotations. Missing
    /// references resolve to `Ok(None)`, never an error.
    pub fn resume(&self, paused_task_id: i64) -> Result<Option<Interval>> {
        let Some(task) = self.db.task(paused_task_id)? else {
            return Ok(None);
        };
        let features = TextFeatures::parse(&task.text);
        let Some(activity_id) = features.activity_id else {
            return Ok(None);
        };
        let Some(activity) = self.db.activity(activity_id)? else {
            return Ok(None);
        };
        let timer_seconds = match features.timer_seconds {
            Some(seconds) => seconds,
            // Degraded task text: fall back to the pause annotation itself.
            None => match self.phase()? {
                Phase::Paused {
                    task_id,
                    timer_seconds,
                } if task_id == paused_task_id => timer_seconds,
                _ => return Ok(None),
            },
        };
        Ok(Some(self.start(&activity, timer_seconds, Some(&task))?))
    }

    /// Extend the running interval, or restart its remaining window from now
    /// when it is already overdue. Keeps the start time and remembers the
    /// pre-prolong duration once.
    pub fn prolong(&self, extra_seconds: i64) -> Result<Option<Interval>> {
        let Some(current) = self.db.last_interval()? else {
            return Ok(None);
        };
        let mut features = TextFeatures::parse(current.note.as_deref().unwrap_or(""));
        if features.paused.is_some() {
            return Ok(None);
        }
        let now = self.clock.now();
        let new_timer = if current.seconds_to_end(now) > 0 {
            current.timer_seconds + extra_seconds
        } else {
            (now - current.start_time) + extra_seconds
        };
        features.prolonged.get_or_insert(Prolonged {
            original_timer_seconds: current.timer_seconds,
        });
        let updated = Interval {
            start_time: current.start_time,
            timer_seconds: new_timer,
            note: Some(features.encode()),
            activity_id: current.activity_id,
        };
        self.db.put_interval(&updated)?;
        debug!(
            start_time = updated.start_time,
            timer_seconds = new_timer,
            "interval prolonged"
        );
        Ok(Some(updated))
    }

    /// Discard elapsed progress: a fresh interval for the same activity with
    /// the original (pre-prolong) target and a note stripped of transition
    /// markers.
    pub fn restart(&self) -> Result<Option<Interval>> {
        let Some(current) = self.db.last_interval()? else {
            return Ok(None);
        };
        let mut features = TextFeatures::parse(current.note.as_deref().unwrap_or(""));
        if features.paused.is_some() {
            return Ok(None);
        }
        let timer_seconds = features
            .prolonged
            .take()
            .map(|prolonged| prolonged.original_timer_seconds)
            .unwrap_or(current.timer_seconds);
        let text = features.encode();
        let interval = Interval {
            start_time: self.fresh_start_time()?,
            timer_seconds,
            note: (!text.is_empty()).then_some(text),
            activity_id: current.activity_id,
        };
        self.db.put_interval(&interval)?;
        debug!(start_time = interval.start_time, "interval restarted");
        Ok(Some(interval))
    }

    // ── Internal ─────────────────────────────────────────────────────

    /// Wall clock nudged past the newest recorded interval, so two
    /// creations within the same second still get distinct identities.
    fn fresh_start_time(&self) -> Result<i64> {
        let now = self.clock.now();
        Ok(match self.db.last_interval()? {
            Some(last) if last.start_time >= now => last.start_time + 1,
            _ => now,
        })
    }
}
