//! # Focal Core Library
//!
//! Core business logic for Focal, a personal time tracker whose structure
//! lives inside ordinary task text. All operations are available through the
//! standalone CLI binary; any GUI is a thin layer over this same library.
//!
//! ## Architecture
//!
//! - **Text Annotation Codec**: a resilient decode/encode pair for the
//!   `#`-marked micro-language embedded in task and note strings
//! - **Interval State Machine**: the single current-timer concept --
//!   start, pause, resume, prolong, restart -- driven by decoded annotations
//! - **Reactive View State**: per-screen runtimes that recompute a full
//!   immutable snapshot on every record change or clock tick
//! - **Storage**: SQLite record store with broadcast change streams and
//!   TOML-based configuration
//!
//! ## Key Components
//!
//! - [`TextFeatures`]: decoded annotation value
//! - [`IntervalMachine`]: interval transitions over the store
//! - [`Database`]: record persistence and change notification
//! - [`vm::TimerVm`], [`vm::TasksListVm`], [`vm::RepeatingsListVm`]: the
//!   per-screen reactive units

pub mod color;
pub mod error;
pub mod events;
pub mod records;
pub mod storage;
pub mod text;
pub mod timer;
pub mod vm;

pub use color::ColorRgba;
pub use error::{ConfigError, CoreError, DatabaseError, Result, ValidationError};
pub use events::Change;
pub use records::{Activity, ActivityKind, Interval, Repeating, Task, FOLDER_TODAY};
pub use storage::{Config, Database};
pub use text::{Paused, Prolonged, TextFeatures, Trigger};
pub use timer::{Clock, IntervalMachine, ManualClock, Phase, SystemClock};
