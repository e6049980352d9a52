use std::io::Read;

use super::common::{read_next, read_schema, ArrowMessage};
use crate::alloc::BodyAllocator;
use crate::datatypes::Schema;
use crate::error::Result;
use crate::io::ipc::channel::ReadChannel;
use crate::io::ipc::IpcSchema;

/// Metadata of an Arrow IPC stream, written at the start of the stream.
#[derive(Debug, Clone)]
pub struct StreamMetadata {
    /// The schema that is read from the stream's first message
    pub schema: Schema,
    /// The schema's wire-level properties
    pub ipc_schema: IpcSchema,
}

/// Reads the leading schema message of a stream.
pub fn read_stream_metadata<R: Read>(channel: &mut ReadChannel<R>) -> Result<StreamMetadata> {
    let mut scratch = Vec::new();
    let (schema, ipc_schema) = read_schema(channel, &mut scratch)?;
    Ok(StreamMetadata { schema, ipc_schema })
}

/// Arrow stream reader.
///
/// An iterator over the framed messages that follow a stream's schema. It
/// yields [`ArrowMessage`]s in stream order and ends without error on the
/// end-of-stream marker; a stream that is cut short surfaces
/// [`Error::UnexpectedEof`](crate::error::Error::UnexpectedEof).
///
/// Bodies are allocated through the reader's [`BodyAllocator`]; each yielded
/// batch owns its body region and releases it when dropped.
pub struct StreamReader<R: Read, A: BodyAllocator> {
    channel: ReadChannel<R>,
    metadata: StreamMetadata,
    allocator: A,
    finished: bool,
    scratch: Vec<u8>,
}

impl<R: Read, A: BodyAllocator> StreamReader<R, A> {
    /// Creates a new [`StreamReader`] by reading the stream's schema
    /// message.
    pub fn try_new(reader: R, allocator: A) -> Result<Self> {
        let mut channel = ReadChannel::new(reader);
        let metadata = read_stream_metadata(&mut channel)?;
        Ok(Self {
            channel,
            metadata,
            allocator,
            finished: false,
            scratch: Vec::new(),
        })
    }

    /// Returns the stream's metadata.
    pub fn metadata(&self) -> &StreamMetadata {
        &self.metadata
    }

    /// Returns whether the stream has reached its end-of-stream marker.
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    fn maybe_next(&mut self) -> Result<Option<ArrowMessage>> {
        if self.finished {
            return Ok(None);
        }
        let message = read_next(&mut self.channel, &self.allocator, &mut self.scratch)?;
        if message.is_none() {
            self.finished = true;
        }
        Ok(message)
    }

    /// Consumes this reader, returning the underlying reader.
    pub fn into_inner(self) -> R {
        self.channel.into_inner()
    }
}

impl<R: Read, A: BodyAllocator> Iterator for StreamReader<R, A> {
    type Item = Result<ArrowMessage>;

    fn next(&mut self) -> Option<Self::Item> {
        self.maybe_next().transpose()
    }
}
