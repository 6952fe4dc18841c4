use serde::{Deserialize, Serialize};

/// A template that re-creates a task on a schedule. The schedule math is
/// owned by the persistence layer; the core only reads the precomputed next
/// occurrence to derive display state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Repeating {
    pub id: i64,
    pub text: String,
    /// Human description of the period, e.g. "Every day".
    pub period_title: String,
    /// Next occurrence as days since the epoch, in local time.
    pub next_day: i64,
}

impl Repeating {
    pub fn days_left(&self, today: i64) -> i64 {
        self.next_day - today
    }
}
