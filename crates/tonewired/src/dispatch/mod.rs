//! Command routing for the text protocol.
//!
//! Each inbound chunk decodes to a [`tonewire_protocol::Command`]. The
//! [`CommandRegistry`] maps its root and sub keywords to a [`CommandKind`],
//! and the [`Dispatcher`] executes it against the session's
//! [`WaveformSettings`] and the shared playback state.
//!
//! Only queries (commands ending in `?`) are executed and answered. Commands
//! without the suffix are dropped, and every failure is logged without a
//! reply:
//!
//! ```text
//! SOUR:FREQ:500Hz?   -> {"SOUR":500}
//! SOUR:FREQ:500Hz    -> (no reply)
//! INIT:CONT?         -> {"INIT":"Playing the data"}
//! GARBAGE:1?         -> (no reply, logged)
//! ```

mod dispatcher;
mod errors;
mod registry;
mod settings;

pub use self::dispatcher::Dispatcher;
pub use self::errors::DispatchError;
pub use self::registry::{CommandKind, CommandRegistry, PlayMode, Route};
pub use self::settings::{
    AVERAGES_RANGE, DURATION_RANGE_S, FREQUENCY_RANGE_HZ, FULL_SCALE_VOLTS, ParameterHandler,
    StreamFormat, VOLTAGE_RANGE_V, WaveformSettings,
};

pub(crate) const DISPATCH_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::dispatch");
