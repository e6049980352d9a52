use std::io::Write;

use crate::error::{Error, Result};
use crate::io::ipc::channel::WriteChannel;

/// Writes the prefix, metadata payload and padding of one framed message,
/// leaving the channel at the first body byte.
///
/// The stored metadata length is inflated by the padding so that
/// `(start + 4 + stored length)` is a multiple of 8. Returns the stored
/// metadata length plus the 4-byte prefix.
pub(crate) fn write_message_header<W: Write>(
    channel: &mut WriteChannel<W>,
    ipc_message: &[u8],
) -> Result<usize> {
    let start = channel.position();
    debug_assert_eq!(start % 8, 0, "messages must start 8-byte aligned");

    let mut metadata_length = ipc_message.len();
    let padding = (start as usize + metadata_length + 4) % 8;
    if padding != 0 {
        metadata_length += 8 - padding;
    }
    let prefix: i32 = metadata_length
        .try_into()
        .map_err(|_| Error::Oversized(format!("message metadata exceeds {} bytes", i32::MAX)))?;

    channel.write_i32_le(prefix)?;
    channel.write_all(ipc_message)?;
    // the padding encoded into the prefix above
    channel.align()?;

    Ok(metadata_length + 4)
}

/// Writes the end-of-stream marker: a zero-valued length prefix.
pub fn write_end_of_stream<W: Write>(channel: &mut WriteChannel<W>) -> Result<usize> {
    channel.write_i32_le(0)?;
    Ok(4)
}
