//! Length-prefixed JSON reply framing.

use std::io::{Read, Write};

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::FrameError;

/// Width of the little-endian length prefix.
pub const LENGTH_PREFIX_BYTES: usize = 4;

/// Largest single read the server performs for one inbound command.
pub const READ_CHUNK_BYTES: usize = 1024;

const MAX_PAYLOAD_BYTES: usize = u32::MAX as usize;

/// Prefixes `payload` with its length as a 4-byte little-endian integer.
///
/// # Errors
///
/// Returns [`FrameError::Oversize`] when the payload does not fit the prefix.
pub fn frame_payload(payload: &[u8]) -> Result<Vec<u8>, FrameError> {
    let len = u32::try_from(payload.len()).map_err(|_| FrameError::Oversize {
        len: payload.len(),
        max: MAX_PAYLOAD_BYTES,
    })?;
    let mut framed = Vec::with_capacity(LENGTH_PREFIX_BYTES + payload.len());
    framed.extend_from_slice(&len.to_le_bytes());
    framed.extend_from_slice(payload);
    Ok(framed)
}

/// Serialises `reply` as JSON and frames it.
///
/// # Errors
///
/// Returns [`FrameError`] when serialisation fails or the payload is too long.
pub fn encode_reply<T: Serialize + ?Sized>(reply: &T) -> Result<Vec<u8>, FrameError> {
    let payload = serde_json::to_vec(reply)?;
    frame_payload(&payload)
}

/// Encodes `reply` and writes the whole frame to `writer`.
///
/// # Errors
///
/// Returns [`FrameError`] on encoding or write failure.
pub fn write_reply<W, T>(writer: &mut W, reply: &T) -> Result<(), FrameError>
where
    W: Write + ?Sized,
    T: Serialize + ?Sized,
{
    let framed = encode_reply(reply)?;
    writer.write_all(&framed)?;
    writer.flush()?;
    Ok(())
}

/// Reads exactly one frame and returns its payload.
///
/// The prefix is read fully, then the payload is read until the announced
/// length has arrived.
///
/// # Errors
///
/// Returns [`FrameError::Io`] if the prefix cannot be read and
/// [`FrameError::Truncated`] if the stream ends inside the payload.
pub fn read_frame<R: Read + ?Sized>(reader: &mut R) -> Result<Vec<u8>, FrameError> {
    let mut prefix = [0_u8; LENGTH_PREFIX_BYTES];
    reader.read_exact(&mut prefix)?;
    let expected = u32::from_le_bytes(prefix) as usize;

    let mut payload = Vec::new();
    reader.take(expected as u64).read_to_end(&mut payload)?;
    if payload.len() != expected {
        return Err(FrameError::Truncated {
            expected,
            received: payload.len(),
        });
    }
    Ok(payload)
}

/// Parses a frame payload as JSON.
///
/// # Errors
///
/// Returns [`FrameError::Json`] when the payload is not valid JSON for `T`.
pub fn decode_reply<T: DeserializeOwned>(payload: &[u8]) -> Result<T, FrameError> {
    Ok(serde_json::from_slice(payload)?)
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use rstest::rstest;
    use serde_json::{Value, json};

    use super::*;

    #[test]
    fn prefix_counts_payload_bytes() {
        let framed = encode_reply(&json!({"SOUR": 500})).expect("encode");
        let payload = br#"{"SOUR":500}"#;
        assert_eq!(&framed[..4], &(payload.len() as u32).to_le_bytes());
        assert_eq!(&framed[4..], payload);
    }

    #[rstest]
    #[case::empty(0)]
    #[case::small(17)]
    #[case::chunk_sized(READ_CHUNK_BYTES)]
    #[case::megabyte(1_000_000)]
    fn frames_survive_a_full_read(#[case] len: usize) {
        let payload = vec![b'x'; len];
        let framed = frame_payload(&payload).expect("frame");
        let mut cursor = Cursor::new(framed);
        assert_eq!(read_frame(&mut cursor).expect("read"), payload);
    }

    #[test]
    fn reply_values_round_trip() {
        let reply = json!({"ch0": [1, -2, 3], "ch1": [4, 5, -6]});
        let mut wire = Vec::new();
        write_reply(&mut wire, &reply).expect("write");
        let payload = read_frame(&mut Cursor::new(wire)).expect("read");
        let decoded: Value = decode_reply(&payload).expect("decode");
        assert_eq!(decoded, reply);
    }

    #[test]
    fn reads_consecutive_frames() {
        let mut wire = encode_reply("first").expect("encode");
        wire.extend(encode_reply("second").expect("encode"));
        let mut cursor = Cursor::new(wire);
        let first: String = decode_reply(&read_frame(&mut cursor).expect("read")).expect("json");
        let second: String = decode_reply(&read_frame(&mut cursor).expect("read")).expect("json");
        assert_eq!((first.as_str(), second.as_str()), ("first", "second"));
    }

    #[test]
    fn reports_truncated_payload() {
        let mut framed = frame_payload(b"abcdef").expect("frame");
        framed.truncate(7);
        let error = read_frame(&mut Cursor::new(framed)).expect_err("truncated");
        assert!(matches!(
            error,
            FrameError::Truncated {
                expected: 6,
                received: 3
            }
        ));
    }

    #[test]
    fn reports_short_prefix() {
        let error = read_frame(&mut Cursor::new(vec![1, 0])).expect_err("short prefix");
        assert!(matches!(error, FrameError::Io(_)));
    }

    #[test]
    fn rejects_non_json_payload() {
        let error = decode_reply::<Value>(b"not json").expect_err("invalid");
        assert!(matches!(error, FrameError::Json(_)));
    }
}
