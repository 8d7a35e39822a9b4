use std::time::Instant;

use lock_api::{MutexGuard, RawMutex};
use parking_lot::{Condvar, Mutex};

/// A condition variable that works with any [`RawMutex`].
///
/// Waiters take the internal gate before releasing the pool lock and notifiers
/// take it before signalling, so a notification can not slip in between a
/// waiter checking its predicate and going to sleep.
#[derive(Debug, Default)]
pub(crate) struct Signal {
    gate: Mutex<()>,
    condvar: Condvar,
}

impl Signal {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Release `guard`, sleep until notified, then lock `guard` again.
    pub(crate) fn wait<R: RawMutex, S>(&self, guard: &mut MutexGuard<'_, R, S>) {
        let mut gate = self.gate.lock();
        MutexGuard::unlocked(guard, move || {
            self.condvar.wait(&mut gate);
            // The gate must be released before the pool lock is taken again.
            drop(gate);
        });
    }

    /// Like [`wait`](Self::wait) but gives up at `deadline`.
    ///
    /// Returns `true` if the wait timed out.
    pub(crate) fn wait_until<R: RawMutex, S>(
        &self,
        guard: &mut MutexGuard<'_, R, S>,
        deadline: Instant,
    ) -> bool {
        let mut gate = self.gate.lock();
        MutexGuard::unlocked(guard, move || {
            let timed_out = self.condvar.wait_until(&mut gate, deadline).timed_out();
            drop(gate);
            timed_out
        })
    }

    pub(crate) fn notify_one(&self) {
        let _gate = self.gate.lock();
        self.condvar.notify_one();
    }

    pub(crate) fn notify_all(&self) {
        let _gate = self.gate.lock();
        self.condvar.notify_all();
    }
}
