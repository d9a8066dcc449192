/// FrameSemaphore - counting semaphore bounding the slots in flight
///
/// A mutex-guarded counter plus a condition variable. The counter starts at
/// `capacity` and never exceeds it: a release that would push it past the
/// capacity is rejected with `Error::PermitOverflow`. Closing wakes every
/// waiter; waiters then fail with `Error::Closed`.

use std::sync::{Condvar, Mutex, MutexGuard};
use std::time::{Duration, Instant};

use crate::error::{Error, Result};

#[derive(Debug)]
struct SemaphoreState {
    available: usize,
    closed: bool,
}

/// Counting semaphore with close support
#[derive(Debug)]
pub struct FrameSemaphore {
    state: Mutex<SemaphoreState>,
    condvar: Condvar,
    capacity: usize,
}

impl FrameSemaphore {
    /// Create a semaphore with `capacity` permits, all available
    pub fn new(capacity: usize) -> Self {
        Self {
            state: Mutex::new(SemaphoreState {
                available: capacity,
                closed: false,
            }),
            condvar: Condvar::new(),
            capacity,
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, SemaphoreState>> {
        self.state
            .lock()
            .map_err(|_| Error::BackendError("Frame semaphore lock poisoned".to_string()))
    }

    /// Take one permit, blocking while none is available
    ///
    /// # Errors
    ///
    /// `Error::Closed` if the semaphore is closed before a permit is granted.
    pub fn acquire(&self) -> Result<()> {
        let mut state = self.lock()?;
        while state.available == 0 && !state.closed {
            state = self
                .condvar
                .wait(state)
                .map_err(|_| Error::BackendError("Frame semaphore lock poisoned".to_string()))?;
        }
        if state.closed {
            return Err(Error::Closed);
        }
        state.available -= 1;
        Ok(())
    }

    /// Take one permit if one is available right now
    pub fn try_acquire(&self) -> Result<bool> {
        let mut state = self.lock()?;
        if state.closed {
            return Err(Error::Closed);
        }
        if state.available == 0 {
            return Ok(false);
        }
        state.available -= 1;
        Ok(true)
    }

    /// Take one permit, waiting at most `timeout`
    ///
    /// Returns `Ok(false)` when the timeout elapses first. A timeout too
    /// large to express as an `Instant` waits like `acquire`.
    pub fn acquire_timeout(&self, timeout: Duration) -> Result<bool> {
        let Some(deadline) = Instant::now().checked_add(timeout) else {
            return self.acquire().map(|()| true);
        };
        let mut state = self.lock()?;
        while state.available == 0 && !state.closed {
            let now = Instant::now();
            if now >= deadline {
                return Ok(false);
            }
            let (guard, _) = self
                .condvar
                .wait_timeout(state, deadline - now)
                .map_err(|_| Error::BackendError("Frame semaphore lock poisoned".to_string()))?;
            state = guard;
        }
        if state.closed {
            return Err(Error::Closed);
        }
        state.available -= 1;
        Ok(true)
    }

    /// Return one permit and wake one waiter
    ///
    /// Permits may still be returned after close; outstanding holders give
    /// theirs back exactly once.
    ///
    /// # Errors
    ///
    /// `Error::PermitOverflow` if every permit is already available.
    pub fn release(&self) -> Result<()> {
        let mut state = self.lock()?;
        if state.available >= self.capacity {
            return Err(Error::PermitOverflow { capacity: self.capacity });
        }
        state.available += 1;
        drop(state);
        self.condvar.notify_one();
        Ok(())
    }

    /// Close the semaphore and wake every waiter
    ///
    /// Returns the number of permits outstanding at the time of closing.
    pub fn close(&self) -> Result<usize> {
        let mut state = self.lock()?;
        state.closed = true;
        let outstanding = self.capacity - state.available;
        drop(state);
        self.condvar.notify_all();
        Ok(outstanding)
    }

    /// Whether close() has been called
    pub fn is_closed(&self) -> bool {
        self.lock().map(|state| state.closed).unwrap_or(true)
    }

    /// Permits currently available
    pub fn available(&self) -> usize {
        self.lock().map(|state| state.available).unwrap_or(0)
    }

    /// Total number of permits
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

#[cfg(test)]
#[path = "frame_semaphore_tests.rs"]
mod tests;
