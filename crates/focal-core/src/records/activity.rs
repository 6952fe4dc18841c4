use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityKind {
    Normal,
    /// The neutral activity paused intervals park on. Exactly one exists,
    /// seeded by the store.
    Other,
}

/// A kind of work a timer can run against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Activity {
    pub id: i64,
    pub name: String,
    pub emoji: String,
    pub kind: ActivityKind,
}

impl Activity {
    pub fn is_other(&self) -> bool {
        self.kind == ActivityKind::Other
    }
}
