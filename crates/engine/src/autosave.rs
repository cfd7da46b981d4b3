//! Periodic auto-save
//!
//! An [`AutoSaveHandle`] owns one background thread that wakes every
//! interval and commits the working copy as an `Auto` version if it has
//! unsaved changes. Failures are logged and the timer keeps running. The
//! thread stops when the handle is stopped or dropped; the manager drops
//! its handle when it is dropped itself.

use parking_lot::{Condvar, Mutex, MutexGuard};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;
use tracing::{debug, error};

use vellum_core::{Result, Version};

use crate::manager::{Shared, VersionHistoryManager};

struct Signal {
    stopped: Mutex<bool>,
    wake: Condvar,
}

/// Handle to a running auto-save thread
pub struct AutoSaveHandle {
    signal: Arc<Signal>,
    thread: Option<JoinHandle<()>>,
    interval: Duration,
}

impl std::fmt::Debug for AutoSaveHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AutoSaveHandle")
            .field("interval", &self.interval)
            .field("running", &self.is_running())
            .finish()
    }
}

impl AutoSaveHandle {
    pub(crate) fn spawn(shared: Arc<Shared>, interval: Duration) -> Result<Self> {
        let signal = Arc::new(Signal {
            stopped: Mutex::new(false),
            wake: Condvar::new(),
        });
        let thread_signal = Arc::clone(&signal);
        let thread = std::thread::Builder::new()
            .name("vellum-autosave".to_string())
            .spawn(move || autosave_loop(&shared, &thread_signal, interval))?;
        debug!(interval_ms = interval.as_millis() as u64, "Started auto-save");
        Ok(AutoSaveHandle {
            signal,
            thread: Some(thread),
            interval,
        })
    }

    /// Time between saves
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Whether the thread is still alive
    pub fn is_running(&self) -> bool {
        self.thread.as_ref().map_or(false, |t| !t.is_finished())
    }

    /// Stop the thread and wait for it to exit
    pub fn stop(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        *self.signal.stopped.lock() = true;
        self.signal.wake.notify_all();
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                error!("Auto-save thread panicked");
            }
            debug!("Stopped auto-save");
        }
    }
}

impl Drop for AutoSaveHandle {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn autosave_loop(shared: &Shared, signal: &Signal, interval: Duration) {
    let mut stopped = signal.stopped.lock();
    while !*stopped {
        let wait = signal.wake.wait_for(&mut stopped, interval);
        if *stopped {
            break;
        }
        if !wait.timed_out() {
            continue;
        }
        MutexGuard::unlocked(&mut stopped, || match shared.auto_save() {
            Ok(Some(version)) => debug!(version = %version.id(), "Auto-saved"),
            Ok(None) => {}
            Err(e) => error!(error = %e, "Auto-save failed"),
        });
    }
}

impl VersionHistoryManager {
    /// Start the auto-save timer
    ///
    /// Returns `false` without starting anything when the configured
    /// interval is 0. Starting an already running timer is a no-op.
    pub fn start_auto_save(&self) -> Result<bool> {
        let Some(interval) = self.config().auto_save_interval() else {
            debug!("Auto-save disabled by configuration");
            return Ok(false);
        };
        let mut slot = self.auto_save.lock();
        if slot.is_none() {
            *slot = Some(AutoSaveHandle::spawn(Arc::clone(&self.shared), interval)?);
        }
        Ok(true)
    }

    /// Stop the auto-save timer; returns whether one was running
    pub fn stop_auto_save(&self) -> bool {
        // take first so the slot lock is not held while joining
        let handle = self.auto_save.lock().take();
        match handle {
            Some(handle) => {
                handle.stop();
                true
            }
            None => false,
        }
    }

    /// Whether the auto-save timer is running
    pub fn is_auto_saving(&self) -> bool {
        self.auto_save
            .lock()
            .as_ref()
            .map_or(false, AutoSaveHandle::is_running)
    }

    /// Run one auto-save now
    ///
    /// Returns the new version, `None` if there was nothing to save.
    pub fn auto_save_now(&self) -> Result<Option<Version>> {
        self.shared.auto_save()
    }
}
