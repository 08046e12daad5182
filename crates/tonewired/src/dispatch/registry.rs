//! Static command table mapping keywords to command kinds.

use std::collections::HashMap;

use tonewire_protocol::Command;

use super::errors::DispatchError;
use super::settings::{
    ParameterHandler, set_amplitude, set_averages, set_duration, set_frequency, set_offset,
    set_shape,
};

/// How a playback started by `INIT` should run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayMode {
    /// Loop until stopped.
    Continuous,
    /// Stop after the configured duration.
    Limited,
}

impl PlayMode {
    /// Flag value passed to the player's `-t` option.
    #[must_use]
    pub const fn player_flag(self) -> &'static str {
        match self {
            Self::Continuous => "c",
            Self::Limited => "l",
        }
    }
}

/// Semantic intent of a registered command.
#[derive(Debug, Clone, Copy)]
pub enum CommandKind {
    /// Store a waveform parameter and echo it back.
    SetParameter(ParameterHandler),
    /// Start playback in the given mode.
    StartPlay(PlayMode),
    /// Acquire and decode captured samples.
    Fetch,
    /// Stop any running playback.
    Stop,
}

#[derive(Debug)]
enum RootEntry {
    Nested(HashMap<&'static str, CommandKind>),
    Flat(CommandKind),
}

/// A command resolved against the registry.
#[derive(Debug, Clone, Copy)]
pub struct Route<'a> {
    /// Root keyword, used as the reply key.
    pub root: &'a str,
    /// Resolved command kind.
    pub kind: CommandKind,
    /// Value for the handler, if any.
    pub value: Option<&'a str>,
}

/// Two-level dispatch table built once at startup.
///
/// Lookups are exact and case-sensitive.
#[derive(Debug)]
pub struct CommandRegistry {
    roots: HashMap<&'static str, RootEntry>,
}

impl CommandRegistry {
    /// Builds the table of supported commands.
    #[must_use]
    pub fn standard() -> Self {
        let source: HashMap<&'static str, CommandKind> = HashMap::from([
            ("FREQ", CommandKind::SetParameter(set_frequency)),
            ("LEN", CommandKind::SetParameter(set_duration)),
            ("VOLT", CommandKind::SetParameter(set_amplitude)),
            ("FUNC", CommandKind::SetParameter(set_shape)),
            ("OFFSET", CommandKind::SetParameter(set_offset)),
        ]);
        let sense = HashMap::from([("AVER", CommandKind::SetParameter(set_averages))]);
        let init = HashMap::from([
            ("CONT", CommandKind::StartPlay(PlayMode::Continuous)),
            ("LIM", CommandKind::StartPlay(PlayMode::Limited)),
        ]);

        let roots = HashMap::from([
            ("SOUR", RootEntry::Nested(source)),
            ("SENS", RootEntry::Nested(sense)),
            ("INIT", RootEntry::Nested(init)),
            ("FETC", RootEntry::Flat(CommandKind::Fetch)),
            ("OUTPUT", RootEntry::Flat(CommandKind::Stop)),
        ]);
        Self { roots }
    }

    /// Resolves a command to its kind and handler value.
    ///
    /// For nested roots without an explicit sub keyword, the value position
    /// names the sub keyword, as in `INIT:CONT?`.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::InvalidCommand`] when the root or sub keyword
    /// is not registered.
    pub fn resolve<'c>(&self, command: &'c Command) -> Result<Route<'c>, DispatchError> {
        let root = command.root.as_str();
        let entry = self
            .roots
            .get(root)
            .ok_or_else(|| DispatchError::invalid_command(root, command.sub.as_deref()))?;
        match entry {
            RootEntry::Flat(kind) => Ok(Route {
                root,
                kind: *kind,
                value: command.raw_value.as_deref(),
            }),
            RootEntry::Nested(table) => {
                let (sub, value) = command.keyword_and_value();
                let kind = sub
                    .and_then(|keyword| table.get(keyword))
                    .ok_or_else(|| DispatchError::invalid_command(root, sub))?;
                Ok(Route {
                    root,
                    kind: *kind,
                    value,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};
    use tonewire_protocol::decode;

    #[fixture]
    fn registry() -> CommandRegistry {
        CommandRegistry::standard()
    }

    fn resolve<'c>(registry: &CommandRegistry, command: &'c Command) -> Route<'c> {
        registry.resolve(command).expect("registered command")
    }

    #[rstest]
    #[case::frequency("SOUR:FREQ:500Hz?", Some("500"))]
    #[case::frequency_query("SOUR:FREQ?", None)]
    #[case::averages("SENS:AVER:4?", Some("4"))]
    fn resolves_parameter_setters(
        registry: CommandRegistry,
        #[case] text: &str,
        #[case] value: Option<&str>,
    ) {
        let command = decode(text.as_bytes()).expect("decode");
        let route = resolve(&registry, &command);
        assert!(matches!(route.kind, CommandKind::SetParameter(_)));
        assert_eq!(route.value, value);
    }

    #[rstest]
    #[case::continuous("INIT:CONT?", PlayMode::Continuous)]
    #[case::limited("INIT:LIM?", PlayMode::Limited)]
    fn resolves_play_modes(registry: CommandRegistry, #[case] text: &str, #[case] mode: PlayMode) {
        let command = decode(text.as_bytes()).expect("decode");
        let route = resolve(&registry, &command);
        assert!(matches!(route.kind, CommandKind::StartPlay(found) if found == mode));
        assert_eq!(route.root, "INIT");
    }

    #[rstest]
    fn resolves_flat_roots(registry: CommandRegistry) {
        let command = decode(b"FETC:0.03?").expect("decode");
        let route = resolve(&registry, &command);
        assert!(matches!(route.kind, CommandKind::Fetch));
        assert_eq!(route.value, Some("0.03"));

        let command = decode(b"OUTPUT:STATE OFF?").expect("decode");
        let route = resolve(&registry, &command);
        assert!(matches!(route.kind, CommandKind::Stop));
        assert_eq!(route.value, Some("STATE OFF"));
    }

    #[rstest]
    #[case::unknown_root("GARBAGE:1?")]
    #[case::unknown_sub("SOUR:PHASE:10?")]
    #[case::lowercase_root("sour:FREQ:10?")]
    #[case::unknown_play_mode("INIT:NOW?")]
    #[case::nested_without_sub("SOUR?")]
    fn rejects_unregistered_keywords(registry: CommandRegistry, #[case] text: &str) {
        let command = decode(text.as_bytes()).expect("decode");
        let error = registry.resolve(&command).expect_err("unregistered");
        assert!(matches!(error, DispatchError::InvalidCommand { .. }));
    }
}
