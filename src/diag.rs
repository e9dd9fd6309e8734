//! Small standalone helpers for inspecting a message without fully decoding
//! it: useful for logging, routing, and stream framing.

use crate::error::CodecError;
use crate::header::FrameHeader;
use crate::reader::Reader;

/// Validates a complete message buffer (header, declared length, CRC) and
/// returns its header. Equivalent to constructing a [`Reader`] and calling
/// [`Reader::validate`], for callers that only need the header.
pub fn validate_message(buf: &[u8]) -> Result<FrameHeader, CodecError> {
    let mut reader = Reader::new(buf)?;
    reader.validate()?;
    Ok(*reader.header().expect("validate succeeded without a header"))
}
