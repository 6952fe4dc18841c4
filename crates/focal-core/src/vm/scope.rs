//! Scoped subscription lifetime.

use std::future::Future;

use tokio::task::JoinHandle;

/// The upstream subscriptions of one visible screen.
///
/// Acquired when the screen becomes visible, dropped when it stops being
/// visible; dropping aborts every task, so subscriptions and timer loops are
/// released deterministically however visibility ends. In-flight writes are
/// not affected -- they run on their own spawned tasks.
#[derive(Debug, Default)]
pub struct VmScope {
    handles: Vec<JoinHandle<()>>,
}

impl VmScope {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn spawn<F>(&mut self, future: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.handles.push(tokio::spawn(future));
    }
}

impl Drop for VmScope {
    fn drop(&mut self) {
        for handle in &self.handles {
            handle.abort();
        }
    }
}
