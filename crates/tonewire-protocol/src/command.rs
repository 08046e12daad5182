//! Command grammar and decoding.

use crate::ParseError;

/// The one literal command handled outside the dispatch table.
pub const IDENTITY_QUERY: &str = "*IDN?";

/// Unit suffixes removed from the value token by literal substring removal.
pub const UNIT_SUFFIXES: [&str; 3] = ["Hz", "V", "COUN"];

/// One parsed client request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    /// First keyword, e.g. `SOUR`.
    pub root: String,
    /// Second keyword when the command has three or more tokens.
    pub sub: Option<String>,
    /// Last token with `?` and unit suffixes removed.
    pub raw_value: Option<String>,
    /// Whether the text ended in `?`.
    pub is_query: bool,
    /// Whether this is the `*IDN?` literal.
    pub is_identity: bool,
}

impl Command {
    fn identity() -> Self {
        Self {
            root: IDENTITY_QUERY.to_owned(),
            sub: None,
            raw_value: None,
            is_query: true,
            is_identity: true,
        }
    }

    /// Interprets the command against a nested root.
    ///
    /// `INIT:CONT?` and `SOUR:FREQ?` carry the sub keyword in the value
    /// position. When no explicit sub is present, the value is promoted to
    /// the keyword and the returned value is `None`.
    #[must_use]
    pub fn keyword_and_value(&self) -> (Option<&str>, Option<&str>) {
        match &self.sub {
            Some(sub) => (Some(sub.as_str()), self.raw_value.as_deref()),
            None => (self.raw_value.as_deref(), None),
        }
    }
}

/// Decodes one inbound chunk into a [`Command`].
///
/// Trailing ASCII whitespace is ignored.
///
/// # Errors
///
/// Returns [`ParseError`] when the bytes are not UTF-8, hold no command, or
/// lack a root keyword.
pub fn decode(raw: &[u8]) -> Result<Command, ParseError> {
    let text = std::str::from_utf8(raw).map_err(ParseError::InvalidUtf8)?;
    let text = text.trim_end_matches(|c: char| c.is_ascii_whitespace());
    if text.is_empty() {
        return Err(ParseError::Empty);
    }

    let tokens: Vec<&str> = text.split(':').collect();
    let (first, rest) = tokens.split_first().ok_or(ParseError::Empty)?;
    if *first == IDENTITY_QUERY {
        return Ok(Command::identity());
    }

    let is_query = text.ends_with('?');
    let Some((last, middle)) = rest.split_last() else {
        let root = first.trim_end_matches('?');
        if root.is_empty() {
            return Err(ParseError::MissingRoot {
                text: text.to_owned(),
            });
        }
        return Ok(Command {
            root: root.to_owned(),
            sub: None,
            raw_value: None,
            is_query,
            is_identity: false,
        });
    };

    if first.is_empty() {
        return Err(ParseError::MissingRoot {
            text: text.to_owned(),
        });
    }
    let value = strip_units(last);
    Ok(Command {
        root: (*first).to_owned(),
        sub: middle.first().map(|sub| (*sub).to_owned()),
        raw_value: (!value.is_empty()).then_some(value),
        is_query,
        is_identity: false,
    })
}

fn strip_units(token: &str) -> String {
    let mut value = token.replace('?', "");
    for unit in UNIT_SUFFIXES {
        value = value.replace(unit, "");
    }
    value
}
