use std::sync::Arc;

use focal_core::storage::Config;
use focal_core::vm::TimerVm;
use focal_core::Database;

use super::CmdResult;

/// Run a real timer view model and print every published snapshot as one
/// JSON line. This is the operational window onto the reactive runtime:
/// record changes and clock ticks both land here as full snapshots.
pub async fn run() -> CmdResult {
    let db = Arc::new(Database::open()?);
    let config = Config::load()?;
    let vm = TimerVm::new(db, &config);
    vm.on_appear();

    let mut rx = vm.state();
    loop {
        println!("{}", serde_json::to_string(&*rx.borrow_and_update())?);
        if rx.changed().await.is_err() {
            break;
        }
    }
    vm.on_disappear();
    Ok(())
}
