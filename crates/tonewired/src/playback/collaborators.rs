//! Seam between the dispatcher and the external audio executables.

use std::io;
use std::process::ExitStatus;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use camino::Utf8PathBuf;
use nix::errno::Errno;
use thiserror::Error;

use tonewire_pcm::{CodecError, WaveformRequest};

use crate::dispatch::PlayMode;

/// Smallest acquisition, in 512-frame periods.
pub const CAPTURE_LOOP_GRANULE: u32 = 15;

const CAPTURE_PERIOD_FRAMES: f64 = 512.0;

/// One playback to hand to the player executable.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaybackJob {
    /// Waveform to synthesise, already converted to counts.
    pub request: WaveformRequest,
    /// Continuous or time-limited playback.
    pub mode: PlayMode,
}

/// One acquisition to hand to the capture executable.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CaptureJob {
    /// Requested acquisition time in seconds.
    pub duration_s: f64,
    /// Number of 512-frame periods to record.
    pub loops: u32,
    /// Sample width the capture executable records.
    pub bits: u32,
}

impl CaptureJob {
    /// Sizes an acquisition of `duration_s` seconds at `sample_rate_hz`.
    ///
    /// The loop count is rounded up to a multiple of
    /// [`CAPTURE_LOOP_GRANULE`], with at least one granule.
    #[must_use]
    pub fn for_duration(duration_s: f64, sample_rate_hz: u32, bits: u32) -> Self {
        let granule = f64::from(CAPTURE_LOOP_GRANULE);
        let periods = duration_s * f64::from(sample_rate_hz) / CAPTURE_PERIOD_FRAMES;
        let granules = (periods / granule).ceil().max(1.0);
        let loops = (granules * granule).min(f64::from(u32::MAX)) as u32;
        Self {
            duration_s,
            loops,
            bits,
        }
    }
}

/// Tracks the running player process so it can be signalled.
///
/// The pid is only present while the child is alive and unreaped; both the
/// reaper and [`PlaybackSlot::cancel`] take the same lock.
#[derive(Debug, Default)]
pub struct PlaybackSlot {
    pid: Mutex<Option<u32>>,
    cancelled: AtomicBool,
}

impl PlaybackSlot {
    /// Creates an empty slot.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a stop has been requested.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Marks the slot cancelled and runs `signal` on the tracked pid, if any.
    ///
    /// # Errors
    ///
    /// Propagates the error returned by `signal`.
    pub fn cancel<F>(&self, signal: F) -> Result<(), CollaboratorError>
    where
        F: FnOnce(u32) -> Result<(), CollaboratorError>,
    {
        self.cancelled.store(true, Ordering::SeqCst);
        let guard = self
            .pid
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        match *guard {
            Some(pid) => signal(pid),
            None => Ok(()),
        }
    }

    /// Runs `action` with exclusive access to the tracked pid.
    pub(crate) fn with_pid<T>(&self, action: impl FnOnce(&mut Option<u32>) -> T) -> T {
        let mut guard = self
            .pid
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        action(&mut guard)
    }
}

/// Errors reported by the external executables.
#[derive(Debug, Error)]
pub enum CollaboratorError {
    /// The executable could not be started.
    #[error("failed to start '{program}': {source}")]
    Spawn {
        /// Executable path.
        program: Utf8PathBuf,
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
    /// The executable exited unsuccessfully.
    #[error("'{program}' exited with {status}")]
    NonZeroExit {
        /// Executable path.
        program: Utf8PathBuf,
        /// Exit status reported by the OS.
        status: ExitStatus,
    },
    /// Reading or writing a pipe or file failed.
    #[error("I/O on '{path}' failed: {source}")]
    Io {
        /// File or executable involved.
        path: Utf8PathBuf,
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
    /// Signalling the player failed.
    #[error("failed to signal player process {pid}: {source}")]
    Signal {
        /// Target process.
        pid: u32,
        /// Underlying OS error.
        #[source]
        source: Errno,
    },
    /// The waveform could not be rendered.
    #[error("failed to render waveform: {source}")]
    Render {
        /// Codec rejection.
        #[source]
        source: CodecError,
    },
    /// The playback worker thread could not be started.
    #[error("failed to start playback worker: {source}")]
    Worker {
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
}

/// External executables driven by the dispatcher.
///
/// Implementations must be callable from the session thread and the
/// playback worker at the same time.
pub trait Collaborators: Send + Sync {
    /// Renders `job` and streams it to the player, blocking until it exits.
    ///
    /// Rendering is incremental so the buffer never has to fit in memory at
    /// once. The player's pid must be published through `slot` while it runs.
    fn play(&self, job: &PlaybackJob, slot: &PlaybackSlot) -> Result<(), CollaboratorError>;

    /// Signals the player tracked by `slot` to stop.
    ///
    /// An empty slot still runs any board-level stop action.
    fn stop(&self, slot: &PlaybackSlot) -> Result<(), CollaboratorError>;

    /// Records samples and returns the raw capture file contents.
    fn capture(&self, job: &CaptureJob) -> Result<Vec<u8>, CollaboratorError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::one_second(1.0, 375)]
    #[case::short(0.03, 15)]
    #[case::zero(0.0, 15)]
    #[case::rounds_up(0.1, 45)]
    fn sizes_capture_in_whole_granules(#[case] duration_s: f64, #[case] loops: u32) {
        let job = CaptureJob::for_duration(duration_s, 192_000, 24);
        assert_eq!(job.loops, loops);
        assert_eq!(job.loops % CAPTURE_LOOP_GRANULE, 0);
    }

    #[test]
    fn cancel_without_pid_only_marks_the_slot() {
        let slot = PlaybackSlot::new();
        slot.cancel(|_| panic!("no process to signal"))
            .expect("cancel succeeds");
        assert!(slot.is_cancelled());
    }

    #[test]
    fn cancel_signals_the_tracked_pid() {
        let slot = PlaybackSlot::new();
        slot.with_pid(|pid| *pid = Some(4242));
        let mut signalled = None;
        slot.cancel(|pid| {
            signalled = Some(pid);
            Ok(())
        })
        .expect("cancel succeeds");
        assert_eq!(signalled, Some(4242));
    }
}
