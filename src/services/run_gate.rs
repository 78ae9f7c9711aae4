use std::sync::Arc;

use tokio::sync::{Mutex, OwnedMutexGuard};

/// Admits one extraction run at a time. Later callers are turned away, not
/// queued.
#[derive(Default)]
pub struct RunGate {
    lock: Arc<Mutex<()>>,
}

/// Held for as long as a run is active. Moves into the task doing the work,
/// so dropping the caller does not reopen the gate.
pub struct RunPermit {
    _guard: OwnedMutexGuard<()>,
}

impl RunGate {
    pub fn new() -> Self {
        RunGate::default()
    }

    pub fn try_enter(&self) -> Option<RunPermit> {
        self.lock
            .clone()
            .try_lock_owned()
            .ok()
            .map(|guard| RunPermit { _guard: guard })
    }
}
