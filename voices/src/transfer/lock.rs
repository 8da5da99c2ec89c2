use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Single-flight guard shared between the manager and its worker.
#[derive(Clone, Default, Debug)]
pub struct TransferLock {
    busy: Arc<AtomicBool>,
}

impl TransferLock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `None` while another holder exists.
    pub fn try_acquire(&self) -> Option<TransferGuard> {
        self.busy
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .ok()
            .map(|_| TransferGuard {
                busy: Arc::clone(&self.busy),
            })
    }

    pub fn is_held(&self) -> bool {
        self.busy.load(Ordering::SeqCst)
    }
}

/// Releases the lock on drop.
#[derive(Debug)]
pub struct TransferGuard {
    busy: Arc<AtomicBool>,
}

impl Drop for TransferGuard {
    fn drop(&mut self) {
        self.busy.store(false, Ordering::SeqCst);
    }
}
