//! Ownership of the single background playback task.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use tracing::{Span, info, warn};

use super::COLLABORATORS_TARGET;
use super::collaborators::{CollaboratorError, Collaborators, PlaybackJob, PlaybackSlot};

const JOIN_POLL_INTERVAL: Duration = Duration::from_millis(25);

/// Longest wait for a stopped playback to wind down before the next starts.
const HANDOVER_TIMEOUT: Duration = Duration::from_secs(2);

struct PlaybackTask {
    slot: Arc<PlaybackSlot>,
    handle: JoinHandle<()>,
}

/// Starts, stops and reaps the background playback worker.
///
/// At most one playback runs at a time. The controller outlives sessions so a
/// later connection can stop playback started by an earlier one.
pub struct PlaybackController {
    collaborators: Arc<dyn Collaborators>,
    active: Mutex<Option<PlaybackTask>>,
}

impl PlaybackController {
    /// Creates a controller driving `collaborators`.
    #[must_use]
    pub fn new(collaborators: Arc<dyn Collaborators>) -> Self {
        Self {
            collaborators,
            active: Mutex::new(None),
        }
    }

    /// Starts `job` on a background worker and returns immediately.
    ///
    /// A playback that is still running is signalled to stop first, and its
    /// worker is given up to two seconds to exit so that two players never
    /// hold the device at once.
    ///
    /// # Errors
    ///
    /// Returns [`CollaboratorError`] when the previous playback cannot be
    /// stopped or the worker thread cannot be spawned.
    pub fn start(&self, job: PlaybackJob) -> Result<(), CollaboratorError> {
        let mut active = self.lock();
        if let Some(previous) = active.take() {
            if !previous.handle.is_finished() {
                info!(target: COLLABORATORS_TARGET, "stopping previous playback");
                self.collaborators.stop(&previous.slot)?;
            }
            reap(previous, HANDOVER_TIMEOUT);
        }

        let slot = Arc::new(PlaybackSlot::new());
        let worker_slot = Arc::clone(&slot);
        let collaborators = Arc::clone(&self.collaborators);
        let span = Span::current();
        let handle = thread::Builder::new()
            .name(String::from("tonewire-playback"))
            .spawn(move || {
                span.in_scope(|| run_playback(collaborators.as_ref(), &job, &worker_slot));
            })
            .map_err(|source| CollaboratorError::Worker { source })?;
        *active = Some(PlaybackTask { slot, handle });
        Ok(())
    }

    /// Signals the running playback, if any, to stop.
    ///
    /// The worker is not joined; it exits once the player does.
    ///
    /// # Errors
    ///
    /// Returns [`CollaboratorError`] when signalling fails.
    pub fn stop(&self) -> Result<(), CollaboratorError> {
        match self.lock().take() {
            Some(task) => self.collaborators.stop(&task.slot),
            None => self.collaborators.stop(&PlaybackSlot::new()),
        }
    }

    /// Stops playback and waits up to `timeout` for the worker to finish.
    pub fn shutdown(&self, timeout: Duration) {
        let Some(task) = self.lock().take() else {
            return;
        };
        if let Err(error) = self.collaborators.stop(&task.slot) {
            warn!(target: COLLABORATORS_TARGET, %error, "failed to stop playback");
        }
        reap(task, timeout);
    }

    /// Whether a playback worker is currently running.
    #[must_use]
    pub fn is_playing(&self) -> bool {
        self.lock()
            .as_ref()
            .is_some_and(|task| !task.handle.is_finished())
    }

    fn lock(&self) -> MutexGuard<'_, Option<PlaybackTask>> {
        self.active.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Joins `task` once its worker exits, detaching it after `timeout`.
fn reap(task: PlaybackTask, timeout: Duration) {
    let deadline = Instant::now() + timeout;
    while !task.handle.is_finished() {
        if Instant::now() >= deadline {
            warn!(
                target: COLLABORATORS_TARGET,
                timeout_ms = timeout.as_millis(),
                "playback worker still running; detaching"
            );
            return;
        }
        thread::sleep(JOIN_POLL_INTERVAL);
    }
    if task.handle.join().is_err() {
        warn!(target: COLLABORATORS_TARGET, "playback worker panicked");
    }
}

fn run_playback(collaborators: &dyn Collaborators, job: &PlaybackJob, slot: &PlaybackSlot) {
    match collaborators.play(job, slot) {
        Ok(()) => info!(
            target: COLLABORATORS_TARGET,
            stopped = slot.is_cancelled(),
            "playback finished"
        ),
        Err(error) => warn!(target: COLLABORATORS_TARGET, %error, "playback failed"),
    }
}
