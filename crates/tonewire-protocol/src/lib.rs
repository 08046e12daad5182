//! Wire protocol for the tonewire signal board.
//!
//! Inbound traffic is unframed command text in a colon-delimited,
//! SCPI-inspired grammar:
//!
//! ```text
//! command := "*IDN?" | root ":" sub ":" value unit? "?" | root ":" value "?"
//! ```
//!
//! The server reads one opportunistic chunk of at most [`READ_CHUNK_BYTES`]
//! bytes per command and decodes it with [`decode`]. Replies travel the other
//! way as a 4-byte little-endian length followed by that many bytes of UTF-8
//! JSON; see [`write_reply`] and [`read_frame`]. Receivers must read the
//! prefix and payload fully, whereas commands are never length-prefixed.

mod command;
mod error;
mod frame;
mod validate;

pub use command::{Command, IDENTITY_QUERY, UNIT_SUFFIXES, decode};
pub use error::{FrameError, InvalidOption, ParseError};
pub use frame::{
    LENGTH_PREFIX_BYTES, READ_CHUNK_BYTES, decode_reply, encode_reply, frame_payload, read_frame,
    write_reply,
};
pub use validate::{clamp_range, validate_option};
