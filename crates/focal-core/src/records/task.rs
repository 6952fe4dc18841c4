use serde::{Deserialize, Serialize};

/// Folder that holds today's actionable tasks, including the ones pause
/// materializes for resuming.
pub const FOLDER_TODAY: i64 = 1;

/// A free-text todo. All structure beyond the folder lives inside `text`
/// as annotations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: i64,
    pub folder_id: i64,
    pub text: String,
}
