//! Playback and acquisition through the board's external executables.
//!
//! The dispatcher never touches audio devices directly. It hands
//! [`PlaybackJob`]s and [`CaptureJob`]s to a [`Collaborators`] implementation,
//! normally [`ProcessCollaborators`], and the [`PlaybackController`] keeps at
//! most one playback running in the background.

mod collaborators;
mod controller;
mod process;

pub use self::collaborators::{
    CAPTURE_LOOP_GRANULE, CaptureJob, CollaboratorError, Collaborators, PlaybackJob, PlaybackSlot,
};
pub use self::controller::PlaybackController;
pub use self::process::ProcessCollaborators;

pub(crate) const COLLABORATORS_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::collaborators");

#[cfg(test)]
mockall::mock! {
    pub Collaborators {}
    impl Collaborators for Collaborators {
        fn play(&self, job: &PlaybackJob, slot: &PlaybackSlot) -> Result<(), CollaboratorError>;
        fn stop(&self, slot: &PlaybackSlot) -> Result<(), CollaboratorError>;
        fn capture(&self, job: &CaptureJob) -> Result<Vec<u8>, CollaboratorError>;
    }
}
