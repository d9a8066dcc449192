//! Unit tests for frame_semaphore.rs

use crate::frame_semaphore::FrameSemaphore;
use crate::error::Error;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};

// ============================================================================
// Counting
// ============================================================================

#[test]
fn test_new_has_all_permits() {
    let sem = FrameSemaphore::new(3);
    assert_eq!(sem.available(), 3);
    assert_eq!(sem.capacity(), 3);
    assert!(!sem.is_closed());
}

#[test]
fn test_acquire_and_release_count() {
    let sem = FrameSemaphore::new(2);
    sem.acquire().unwrap();
    sem.acquire().unwrap();
    assert_eq!(sem.available(), 0);

    sem.release().unwrap();
    assert_eq!(sem.available(), 1);
}

#[test]
fn test_try_acquire_when_exhausted() {
    let sem = FrameSemaphore::new(1);
    assert_eq!(sem.try_acquire(), Ok(true));
    assert_eq!(sem.try_acquire(), Ok(false));
}

#[test]
fn test_release_past_capacity_is_rejected() {
    let sem = FrameSemaphore::new(2);
    assert_eq!(sem.release(), Err(Error::PermitOverflow { capacity: 2 }));
    assert_eq!(sem.available(), 2);
}

#[test]
fn test_acquire_timeout_elapses() {
    let sem = FrameSemaphore::new(1);
    sem.acquire().unwrap();
    assert_eq!(sem.acquire_timeout(Duration::from_millis(20)), Ok(false));
    assert_eq!(sem.available(), 0);
}

#[test]
fn test_acquire_timeout_succeeds_when_available() {
    let sem = FrameSemaphore::new(1);
    assert_eq!(sem.acquire_timeout(Duration::from_millis(20)), Ok(true));
}

#[test]
fn test_acquire_timeout_unbounded_duration() {
    let sem = FrameSemaphore::new(1);
    assert_eq!(sem.acquire_timeout(Duration::MAX), Ok(true));
    assert_eq!(sem.available(), 0);
}

#[test]
fn test_acquire_timeout_unbounded_duration_waits_for_release() {
    let sem = Arc::new(FrameSemaphore::new(1));
    sem.acquire().unwrap();

    let waiter = {
        let sem = Arc::clone(&sem);
        thread::spawn(move || sem.acquire_timeout(Duration::MAX))
    };

    thread::sleep(Duration::from_millis(50));
    sem.release().unwrap();
    assert_eq!(waiter.join().unwrap(), Ok(true));
    assert_eq!(sem.available(), 0);
}

#[test]
fn test_acquire_timeout_woken_by_release() {
    let sem = Arc::new(FrameSemaphore::new(1));
    sem.acquire().unwrap();

    let waiter = {
        let sem = Arc::clone(&sem);
        thread::spawn(move || {
            let start = Instant::now();
            let result = sem.acquire_timeout(Duration::from_secs(10));
            (result, start.elapsed())
        })
    };

    thread::sleep(Duration::from_millis(50));
    sem.release().unwrap();

    let (result, elapsed) = waiter.join().unwrap();
    assert_eq!(result, Ok(true));
    assert!(elapsed < Duration::from_secs(10));
    assert_eq!(sem.available(), 0);
}

#[test]
fn test_acquire_timeout_woken_by_close() {
    let sem = Arc::new(FrameSemaphore::new(1));
    sem.acquire().unwrap();

    let waiter = {
        let sem = Arc::clone(&sem);
        thread::spawn(move || sem.acquire_timeout(Duration::from_secs(10)))
    };

    thread::sleep(Duration::from_millis(50));
    assert_eq!(sem.close(), Ok(1));
    assert_eq!(waiter.join().unwrap(), Err(Error::Closed));
}

#[test]
fn test_acquire_timeout_waits_full_duration() {
    let sem = FrameSemaphore::new(1);
    sem.acquire().unwrap();

    let timeout = Duration::from_millis(60);
    let start = Instant::now();
    assert_eq!(sem.acquire_timeout(timeout), Ok(false));
    assert!(start.elapsed() >= timeout);
}

// ============================================================================
// Blocking
// ============================================================================

#[test]
fn test_acquire_blocks_until_release() {
    let sem = Arc::new(FrameSemaphore::new(1));
    sem.acquire().unwrap();

    let acquired = Arc::new(AtomicBool::new(false));
    let waiter = {
        let sem = Arc::clone(&sem);
        let acquired = Arc::clone(&acquired);
        thread::spawn(move || {
            sem.acquire().unwrap();
            acquired.store(true, Ordering::SeqCst);
        })
    };

    thread::sleep(Duration::from_millis(50));
    assert!(!acquired.load(Ordering::SeqCst));

    sem.release().unwrap();
    waiter.join().unwrap();
    assert!(acquired.load(Ordering::SeqCst));
    assert_eq!(sem.available(), 0);
}

// ============================================================================
// Close
// ============================================================================

#[test]
fn test_close_wakes_all_waiters() {
    let sem = Arc::new(FrameSemaphore::new(1));
    sem.acquire().unwrap();

    let waiters: Vec<_> = (0..3)
        .map(|_| {
            let sem = Arc::clone(&sem);
            thread::spawn(move || sem.acquire())
        })
        .collect();

    thread::sleep(Duration::from_millis(50));
    assert_eq!(sem.close(), Ok(1));

    for waiter in waiters {
        assert_eq!(waiter.join().unwrap(), Err(Error::Closed));
    }
}

#[test]
fn test_closed_rejects_new_acquires() {
    let sem = FrameSemaphore::new(2);
    sem.close().unwrap();

    assert!(sem.is_closed());
    assert_eq!(sem.acquire(), Err(Error::Closed));
    assert_eq!(sem.try_acquire(), Err(Error::Closed));
    assert_eq!(sem.acquire_timeout(Duration::from_millis(1)), Err(Error::Closed));
}

#[test]
fn test_release_after_close_returns_permit_once() {
    let sem = FrameSemaphore::new(2);
    sem.acquire().unwrap();
    assert_eq!(sem.close(), Ok(1));

    sem.release().unwrap();
    assert_eq!(sem.available(), 2);
    assert_eq!(sem.release(), Err(Error::PermitOverflow { capacity: 2 }));
}
