//! Record change notifications.
//!
//! Every committed mutation in [`crate::storage::Database`] publishes which
//! table changed. Subscribers re-read the full result set for their query;
//! the notification carries no diff.

use serde::{Deserialize, Serialize};

/// One changed record table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Change {
    Activities,
    Tasks,
    Intervals,
    Repeatings,
}
