use serde::{Deserialize, Serialize};

/// One timer session, running or finished.
///
/// `start_time` (epoch seconds) doubles as the identity: no two intervals
/// share one, and the interval with the greatest start time is the current
/// one. Pause and prolong replace the row while keeping `start_time`, so
/// elapsed-time displays stay continuous.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interval {
    pub start_time: i64,
    /// Target duration in seconds.
    pub timer_seconds: i64,
    /// Annotated text carrying pause/prolong state across transitions.
    pub note: Option<String>,
    pub activity_id: i64,
}

impl Interval {
    /// Signed seconds until the target duration elapses; negative when the
    /// interval is overdue.
    pub fn seconds_to_end(&self, now: i64) -> i64 {
        self.start_time + self.timer_seconds - now
    }
}
