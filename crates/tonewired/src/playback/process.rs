//! Collaborators backed by the board's player and capture executables.
//!
//! The player receives synthesised PCM on stdin, rendered and written a
//! bounded number of frames at a time, and is invoked as
//! `<player> -r <rate> -c <channels> -o <format> -t <c|l> -d <seconds>
//! [-D <device>]`. The capture tool is invoked as
//! `<capture> -p <bits> -l <loops> -o <file>` and writes padded 24-bit
//! samples to `<file>`.

use std::fs;
use std::io::{self, Write};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread;
use std::time::Duration;

use camino::{Utf8Path, Utf8PathBuf};
use nix::errno::Errno;
use nix::sys::signal::{Signal, kill};
use nix::unistd::Pid;
use tracing::{debug, info, warn};

use tonewire_config::Config;
use tonewire_pcm::PcmChunks;

use super::COLLABORATORS_TARGET;
use super::collaborators::{
    CAPTURE_LOOP_GRANULE, CaptureJob, CollaboratorError, Collaborators, PlaybackJob, PlaybackSlot,
};

const EXIT_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Frames rendered per write to the player's stdin.
const PLAYER_CHUNK_FRAMES: usize = 8_192;

/// Runs the configured executables as child processes.
#[derive(Debug, Clone)]
pub struct ProcessCollaborators {
    player: Utf8PathBuf,
    capture: Utf8PathBuf,
    capture_file: Utf8PathBuf,
    stop_command: Option<Utf8PathBuf>,
    device: Option<String>,
}

impl ProcessCollaborators {
    /// Builds collaborators from the executable paths in `config`.
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self {
            player: config.player_executable.clone(),
            capture: config.capture_executable.clone(),
            capture_file: config.capture_file.clone(),
            stop_command: config.stop_command.clone(),
            device: config.device.clone(),
        }
    }

    fn player_command(&self, job: &PlaybackJob) -> Command {
        let request = &job.request;
        let mut command = Command::new(self.player.as_std_path());
        command
            .arg("-r")
            .arg(request.sample_rate_hz.to_string())
            .arg("-c")
            .arg(request.channel_count.to_string())
            .arg("-o")
            .arg(request.bit_depth.alsa_format())
            .arg("-t")
            .arg(job.mode.player_flag())
            .arg("-d")
            .arg(request.duration_s.to_string());
        if let Some(device) = &self.device {
            command.arg("-D").arg(device);
        }
        command
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::inherit());
        command
    }

    fn run_capture(&self, job: &CaptureJob, loops: u32) -> Result<(), CollaboratorError> {
        info!(
            target: COLLABORATORS_TARGET,
            loops,
            duration_s = job.duration_s,
            "starting acquisition"
        );
        let status = Command::new(self.capture.as_std_path())
            .arg("-p")
            .arg(job.bits.to_string())
            .arg("-l")
            .arg(loops.to_string())
            .arg("-o")
            .arg(self.capture_file.as_std_path())
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .status()
            .map_err(|source| CollaboratorError::Spawn {
                program: self.capture.clone(),
                source,
            })?;
        check_status(&self.capture, status)
    }
}

impl Collaborators for ProcessCollaborators {
    fn play(&self, job: &PlaybackJob, slot: &PlaybackSlot) -> Result<(), CollaboratorError> {
        let chunks = job
            .request
            .chunks(PLAYER_CHUNK_FRAMES)
            .map_err(|source| CollaboratorError::Render { source })?;
        let mut child = slot.with_pid(|pid| -> Result<Child, CollaboratorError> {
            let child = self
                .player_command(job)
                .spawn()
                .map_err(|source| CollaboratorError::Spawn {
                    program: self.player.clone(),
                    source,
                })?;
            *pid = Some(child.id());
            Ok(child)
        })?;
        debug!(
            target: COLLABORATORS_TARGET,
            pid = child.id(),
            frames = chunks.total_frames(),
            mode = ?job.mode,
            "player started"
        );

        if slot.is_cancelled() {
            slot.cancel(terminate)?;
        } else if let Some(mut stdin) = child.stdin.take()
            && let Err(source) = stream_pcm(&mut stdin, chunks, slot)
        {
            drop(stdin);
            slot.cancel(terminate)?;
            wait_for_exit(&mut child, slot, &self.player)?;
            return Err(CollaboratorError::Io {
                path: self.player.clone(),
                source,
            });
        }

        let status = wait_for_exit(&mut child, slot, &self.player)?;
        debug!(target: COLLABORATORS_TARGET, ?status, "player exited");
        if slot.is_cancelled() {
            return Ok(());
        }
        check_status(&self.player, status)
    }

    fn stop(&self, slot: &PlaybackSlot) -> Result<(), CollaboratorError> {
        slot.cancel(terminate)?;
        let Some(program) = &self.stop_command else {
            return Ok(());
        };
        info!(target: COLLABORATORS_TARGET, command = %program, "running stop command");
        let status = Command::new(program.as_std_path())
            .stdin(Stdio::null())
            .status()
            .map_err(|source| CollaboratorError::Spawn {
                program: program.clone(),
                source,
            })?;
        check_status(program, status)
    }

    fn capture(&self, job: &CaptureJob) -> Result<Vec<u8>, CollaboratorError> {
        if let Err(error) = self.run_capture(job, job.loops) {
            warn!(
                target: COLLABORATORS_TARGET,
                %error,
                retry_loops = CAPTURE_LOOP_GRANULE,
                "acquisition failed; retrying with the minimum length"
            );
            self.run_capture(job, CAPTURE_LOOP_GRANULE)?;
        }
        fs::read(self.capture_file.as_std_path()).map_err(|source| CollaboratorError::Io {
            path: self.capture_file.clone(),
            source,
        })
    }
}

/// Writes `chunks` to `sink` one at a time, then flushes it.
///
/// Stops early once `slot` is cancelled or the reader closes its end.
fn stream_pcm(
    sink: &mut impl Write,
    chunks: PcmChunks,
    slot: &PlaybackSlot,
) -> io::Result<()> {
    for chunk in chunks {
        if slot.is_cancelled() {
            return Ok(());
        }
        if let Err(error) = sink.write_all(&chunk) {
            return ignore_broken_pipe(error);
        }
    }
    sink.flush().or_else(ignore_broken_pipe)
}

// The player exits early when stopped; the rest of the stream is moot.
fn ignore_broken_pipe(error: io::Error) -> io::Result<()> {
    if error.kind() == io::ErrorKind::BrokenPipe {
        debug!(target: COLLABORATORS_TARGET, "player closed its input");
        return Ok(());
    }
    Err(error)
}

fn terminate(pid: u32) -> Result<(), CollaboratorError> {
    let raw = i32::try_from(pid).map_err(|_| CollaboratorError::Signal {
        pid,
        source: Errno::EINVAL,
    })?;
    match kill(Pid::from_raw(raw), Signal::SIGTERM) {
        Ok(()) | Err(Errno::ESRCH) => {
            info!(target: COLLABORATORS_TARGET, pid, "sent SIGTERM to player");
            Ok(())
        }
        Err(source) => Err(CollaboratorError::Signal { pid, source }),
    }
}

/// Polls the child until it exits, clearing the slot's pid under its lock.
fn wait_for_exit(
    child: &mut Child,
    slot: &PlaybackSlot,
    program: &Utf8Path,
) -> Result<ExitStatus, CollaboratorError> {
    loop {
        let polled = slot.with_pid(|pid| {
            let polled = child.try_wait();
            if !matches!(polled, Ok(None)) {
                *pid = None;
            }
            polled
        });
        match polled {
            Ok(Some(status)) => return Ok(status),
            Ok(None) => thread::sleep(EXIT_POLL_INTERVAL),
            Err(source) => {
                return Err(CollaboratorError::Io {
                    path: program.to_owned(),
                    source,
                });
            }
        }
    }
}

fn check_status(program: &Utf8Path, status: ExitStatus) -> Result<(), CollaboratorError> {
    if status.success() {
        return Ok(());
    }
    Err(CollaboratorError::NonZeroExit {
        program: program.to_owned(),
        status,
    })
}
