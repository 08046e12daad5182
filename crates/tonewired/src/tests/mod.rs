//! Test suites for the tonewire server.

mod bootstrap_behaviour;
pub(crate) mod support;
