//! Text annotation codec.
//!
//! Task and note strings embed a micro-language of `#`-marked annotations:
//! an activity link, a timer target, one-tap triggers, pause/prolong state,
//! an importance flag and repeating-task provenance. [`TextFeatures::parse`]
//! extracts them without ever failing; [`TextFeatures::encode`] writes them
//! back in one canonical form. The wire format is stable: a decoder must
//! keep tolerating annotations produced by older encoders, and anything it
//! does not recognize stays in the text untouched.

mod features;
mod token;
mod trigger;

pub use features::{Paused, Prolonged, TextFeatures};
pub use trigger::Trigger;
