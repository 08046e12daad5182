//! Supervises server launch sequencing and runtime orchestration.

use std::sync::Arc;

use tracing::info;

use crate::StructuredHealthReporter;
use crate::bootstrap::{ConfigLoader, StaticConfigLoader, SystemConfigLoader, bootstrap_with};
use crate::dispatch::Dispatcher;
use crate::health::HealthReporter;
use crate::playback::{Collaborators, PlaybackController, ProcessCollaborators};
use crate::transport::{SessionHandler, SocketListener};

use super::errors::LaunchError;
use super::shutdown::{ShutdownSignal, SystemShutdownSignal};
use super::{PROCESS_TARGET, SHUTDOWN_TIMEOUT};

/// Collaborators required to launch the server.
pub(crate) struct LaunchPlan<L, S> {
    pub(crate) loader: L,
    pub(crate) reporter: Arc<dyn HealthReporter>,
    pub(crate) shutdown: S,
    /// Replaces the executables named in the configuration when set.
    pub(crate) collaborators: Option<Arc<dyn Collaborators>>,
}

/// Runs the server with the production collaborators until a termination
/// signal arrives.
///
/// # Errors
///
/// Returns [`LaunchError`] when configuration, bootstrap, the listener or
/// signal handling fails.
pub fn run_daemon() -> Result<(), LaunchError> {
    let plan = LaunchPlan {
        loader: SystemConfigLoader,
        reporter: Arc::new(StructuredHealthReporter::new()),
        shutdown: SystemShutdownSignal,
        collaborators: None,
    };
    run_daemon_with(plan)
}

/// Runs the server with injected collaborators.
pub(crate) fn run_daemon_with<L, S>(plan: LaunchPlan<L, S>) -> Result<(), LaunchError>
where
    L: ConfigLoader,
    S: ShutdownSignal,
{
    let LaunchPlan {
        loader,
        reporter,
        shutdown,
        collaborators,
    } = plan;

    let config = loader.load()?;
    let listener = SocketListener::bind(&config.host, config.port)?;
    let daemon = bootstrap_with(&StaticConfigLoader::new(config), reporter)?;
    info!(
        target: PROCESS_TARGET,
        address = ?listener.local_addr(),
        "starting server runtime"
    );

    let collaborators: Arc<dyn Collaborators> = match collaborators {
        Some(collaborators) => collaborators,
        None => Arc::new(ProcessCollaborators::from_config(daemon.config())),
    };
    let playback = Arc::new(PlaybackController::new(Arc::clone(&collaborators)));
    let dispatcher = Arc::new(Dispatcher::new(
        daemon.config().identity(),
        daemon.format(),
        Arc::clone(&playback),
        collaborators,
    ));
    let handler = Arc::new(SessionHandler::new(dispatcher, daemon.reporter()));

    let listener_handle = listener.start(handler)?;
    let reason = shutdown.wait()?;
    info!(
        target: PROCESS_TARGET,
        ?reason,
        drain_timeout_ms = SHUTDOWN_TIMEOUT.as_millis(),
        "draining playback and sessions"
    );
    playback.shutdown(SHUTDOWN_TIMEOUT);
    listener_handle.shutdown();
    listener_handle.join()?;
    info!(target: PROCESS_TARGET, "server stopped");
    Ok(())
}
