//! Reactive view-state runtimes.
//!
//! One instance per screen, each bound to a watch channel of an immutable
//! state snapshot. Every upstream emission -- a record change from the store
//! or a clock tick -- recomputes the full snapshot from fresh reads and
//! replaces it atomically, so consumers see either the old or the new
//! complete state, never a mix. Mutating operations are fire-and-forget
//! writes against the store; the change subscription is what reflects their
//! result, there is no optimistic local update and no automatic retry.

mod repeatings_vm;
mod scope;
mod tasks_vm;
mod timer_data;
mod timer_vm;

pub use repeatings_vm::{RepeatingsListVm, RepeatingsListVmState, UiRepeating};
pub use scope::VmScope;
pub use tasks_vm::{StartOutcome, TasksListVm, TasksListVmState, UiTask};
pub use timer_data::{ControlIcon, PausedTask, TimerData};
pub use timer_vm::{ProlongHint, TimerVm, TimerVmState};

/// `h:mm:ss` (or `mm:ss`) display for a second count. Sign-insensitive, so
/// overdue time renders as how far over.
fn seconds_to_text(seconds: i64) -> String {
    let total = seconds.abs();
    let h = total / 3600;
    let m = (total % 3600) / 60;
    let s = total % 60;
    if h > 0 {
        format!("{h}:{m:02}:{s:02}")
    } else {
        format!("{m:02}:{s:02}")
    }
}

#[cfg(test)]
mod tests {
    use super::seconds_to_text;

    #[test]
    fn formats_with_and_without_hours() {
        assert_eq!(seconds_to_text(0), "00:00");
        assert_eq!(seconds_to_text(59), "00:59");
        assert_eq!(seconds_to_text(1500), "25:00");
        assert_eq!(seconds_to_text(3725), "1:02:05");
    }

    #[test]
    fn negative_seconds_render_absolute() {
        assert_eq!(seconds_to_text(-90), "01:30");
    }
}
