use std::io::{Read, Seek, SeekFrom};

use arrow_format::ipc;
use arrow_format::ipc::planus::ReadAsRoot;
use bytes::Bytes;

use super::schema::fb_to_schema;
use super::OutOfSpecKind;
use crate::alloc::BodyAllocator;
use crate::datatypes::Schema;
use crate::error::{Error, Result};
use crate::io::ipc::channel::ReadChannel;
use crate::io::ipc::IpcSchema;
use crate::record_batch::{DictionaryBatch, RecordBatch};

/// A deserialized framed message: the result of dispatching on a message's
/// header.
#[derive(Debug)]
pub enum ArrowMessage {
    /// A schema message; carries no body
    Schema {
        /// The logical schema
        schema: Schema,
        /// The schema's wire-level properties
        ipc_schema: IpcSchema,
    },
    /// A record batch message
    Batch(RecordBatch),
    /// A dictionary batch message
    Dictionary(DictionaryBatch),
}

/// Reads the frame of one message off `channel`: the length prefix plus the
/// metadata payload, into `scratch`.
///
/// Returns `Ok(false)` on the end-of-stream marker (a zero prefix) and on a
/// stream that ends cleanly at a message boundary; a stream that ends inside
/// the prefix or the payload is an [`Error::UnexpectedEof`].
pub fn read_message<R: Read>(channel: &mut ReadChannel<R>, scratch: &mut Vec<u8>) -> Result<bool> {
    let mut prefix = [0u8; 4];
    let read = channel.read_fully(&mut prefix)?;
    if read == 0 {
        return Ok(false);
    }
    if read < 4 {
        return Err(Error::UnexpectedEof(format!(
            "stream ended after {read} bytes of a message's length prefix"
        )));
    }

    let metadata_length = i32::from_le_bytes(prefix);
    if metadata_length == 0 {
        // explicit end-of-stream marker
        return Ok(false);
    }
    let metadata_length: usize = metadata_length
        .try_into()
        .map_err(|_| Error::from(OutOfSpecKind::UnexpectedNegativeInteger))?;

    scratch.clear();
    scratch.resize(metadata_length, 0);
    let read = channel.read_fully(scratch)?;
    if read != metadata_length {
        return Err(Error::UnexpectedEof(format!(
            "stream ended inside a message's metadata: expected {metadata_length} bytes, got {read}"
        )));
    }
    Ok(true)
}

/// Parses the metadata payload of a message, validating its version.
///
/// # Errors
/// Errors iff the bytes are not a valid message root or the message's
/// version is not V4.
pub fn parse_message(metadata: &[u8]) -> Result<ipc::MessageRef<'_>> {
    let message = ipc::MessageRef::read_as_root(metadata)
        .map_err(|err| Error::from(OutOfSpecKind::InvalidFlatbufferMessage(err)))?;

    let version = message
        .version()
        .map_err(|err| Error::from(OutOfSpecKind::InvalidFlatbufferVersion(err)))?;
    if version != ipc::MetadataVersion::V4 {
        return Err(Error::IncompatibleVersion(format!("{version:?}")));
    }
    Ok(message)
}

fn message_header<'a>(message: &ipc::MessageRef<'a>) -> Result<ipc::MessageHeaderRef<'a>> {
    message
        .header()
        .map_err(|err| Error::from(OutOfSpecKind::InvalidFlatbufferHeader(err)))?
        .ok_or_else(|| Error::from(OutOfSpecKind::MissingMessageHeader))
}

/// Returns the message's body length, gating it to the addressable range.
fn message_body_length(message: &ipc::MessageRef) -> Result<usize> {
    let body_length = message
        .body_length()
        .map_err(|err| Error::from(OutOfSpecKind::InvalidFlatbufferBodyLength(err)))?;
    if body_length < 0 {
        return Err(OutOfSpecKind::UnexpectedNegativeInteger.into());
    }
    if body_length > i32::MAX as i64 {
        return Err(Error::Oversized(format!(
            "message body of {body_length} bytes exceeds {}",
            i32::MAX
        )));
    }
    Ok(body_length as usize)
}

/// Reads a message body of exactly `body_length` bytes into a region
/// obtained from `allocator`.
fn read_body<R: Read, A: BodyAllocator>(
    channel: &mut ReadChannel<R>,
    allocator: &A,
    body_length: usize,
) -> Result<Bytes> {
    let mut region = allocator.allocate(body_length);
    let read = channel.read_fully(&mut region[..])?;
    if read != body_length {
        return Err(Error::UnexpectedEof(format!(
            "stream ended inside a message's body: expected {body_length} bytes, got {read}"
        )));
    }
    Ok(region.freeze())
}

/// Builds a [`RecordBatch`] over `body`, slicing each declared buffer out of
/// the shared region without copying.
///
/// # Errors
/// Errors iff a counter exceeds `i32::MAX` ([`Error::Oversized`]) or a
/// declared buffer is unordered, overlapping or outside the body
/// ([`Error::BufferLayout`]).
pub fn deserialize_record_batch(batch: ipc::RecordBatchRef, body: Bytes) -> Result<RecordBatch> {
    let length = batch
        .length()
        .map_err(|err| Error::from(OutOfSpecKind::InvalidFlatbufferLength(err)))?;
    if length < 0 {
        return Err(OutOfSpecKind::UnexpectedNegativeInteger.into());
    }
    if length > i32::MAX as i64 {
        return Err(Error::Oversized(format!(
            "record batch of {length} rows exceeds {}",
            i32::MAX
        )));
    }

    if batch
        .compression()
        .map_err(|err| Error::from(OutOfSpecKind::InvalidFlatbufferCompression(err)))?
        .is_some()
    {
        return Err(Error::oos("compressed bodies are not supported"));
    }

    let nodes = batch
        .nodes()
        .map_err(|err| Error::from(OutOfSpecKind::InvalidFlatbufferNodes(err)))?
        .ok_or_else(|| Error::from(OutOfSpecKind::MissingMessageNodes))?;
    let nodes = nodes
        .iter()
        .map(|node| {
            let node = ipc::FieldNode {
                length: node.length(),
                null_count: node.null_count(),
            };
            if node.length < 0 || node.null_count < 0 {
                return Err(OutOfSpecKind::UnexpectedNegativeInteger.into());
            }
            if node.length > i32::MAX as i64 || node.null_count > i32::MAX as i64 {
                return Err(Error::Oversized(format!(
                    "field node counters must not exceed {}, got {node:?}",
                    i32::MAX
                )));
            }
            Ok(node)
        })
        .collect::<Result<Vec<_>>>()?;

    let declared = batch
        .buffers()
        .map_err(|err| Error::from(OutOfSpecKind::InvalidFlatbufferBuffers(err)))?
        .ok_or_else(|| Error::from(OutOfSpecKind::MissingMessageBuffers))?;

    let mut buffers = Vec::with_capacity(declared.len());
    let mut layout = Vec::with_capacity(declared.len());
    let mut previous_end: i64 = 0;
    for (index, buffer) in declared.iter().enumerate() {
        let (offset, buffer_length) = (buffer.offset(), buffer.length());
        if offset < 0 || buffer_length < 0 {
            return Err(OutOfSpecKind::UnexpectedNegativeInteger.into());
        }
        if offset < previous_end {
            return Err(Error::BufferLayout(format!(
                "buffer {index} at offset {offset} overlaps the previous buffer ending at {previous_end}"
            )));
        }
        let end = offset
            .checked_add(buffer_length)
            .filter(|end| *end as usize <= body.len())
            .ok_or_else(|| {
                Error::BufferLayout(format!(
                    "buffer {index} (offset {offset}, length {buffer_length}) falls outside the body of {} bytes",
                    body.len()
                ))
            })?;
        buffers.push(body.slice(offset as usize..end as usize));
        layout.push(ipc::Buffer {
            offset,
            length: buffer_length,
        });
        previous_end = end;
    }

    Ok(RecordBatch::from_parts(
        length,
        nodes,
        buffers,
        layout,
        body.len() as i64,
    ))
}

/// Builds a [`DictionaryBatch`] over `body`.
pub fn deserialize_dictionary_batch(
    batch: ipc::DictionaryBatchRef,
    body: Bytes,
) -> Result<DictionaryBatch> {
    if batch
        .is_delta()
        .map_err(|err| Error::from(OutOfSpecKind::InvalidFlatbufferIsDelta(err)))?
    {
        return Err(Error::oos("delta dictionary batches are not supported"));
    }

    let id = batch
        .id()
        .map_err(|err| Error::from(OutOfSpecKind::InvalidFlatbufferId(err)))?;
    let data = batch
        .data()
        .map_err(|err| Error::from(OutOfSpecKind::InvalidFlatbufferData(err)))?
        .ok_or_else(|| Error::from(OutOfSpecKind::MissingData))?;

    Ok(DictionaryBatch::new(
        id,
        deserialize_record_batch(data, body)?,
    ))
}

/// Reads one framed message off `channel` and dispatches on its header.
///
/// Returns `Ok(None)` at end of stream. Message kinds outside schema, record
/// batch and dictionary batch are an [`Error::UnexpectedHeader`].
pub fn read_next<R: Read, A: BodyAllocator>(
    channel: &mut ReadChannel<R>,
    allocator: &A,
    scratch: &mut Vec<u8>,
) -> Result<Option<ArrowMessage>> {
    if !read_message(channel, scratch)? {
        return Ok(None);
    }
    let message = parse_message(scratch)?;
    let body_length = message_body_length(&message)?;

    match message_header(&message)? {
        ipc::MessageHeaderRef::Schema(schema) => {
            let (schema, ipc_schema) = fb_to_schema(schema)?;
            Ok(Some(ArrowMessage::Schema { schema, ipc_schema }))
        },
        ipc::MessageHeaderRef::RecordBatch(batch) => {
            let body = read_body(channel, allocator, body_length)?;
            Ok(Some(ArrowMessage::Batch(deserialize_record_batch(
                batch, body,
            )?)))
        },
        ipc::MessageHeaderRef::DictionaryBatch(batch) => {
            let body = read_body(channel, allocator, body_length)?;
            Ok(Some(ArrowMessage::Dictionary(
                deserialize_dictionary_batch(batch, body)?,
            )))
        },
        ipc::MessageHeaderRef::Tensor(_) => {
            Err(Error::UnexpectedHeader("tensor".to_string()))
        },
        ipc::MessageHeaderRef::SparseTensor(_) => {
            Err(Error::UnexpectedHeader("sparse tensor".to_string()))
        },
    }
}

/// Reads a schema message off `channel`.
///
/// # Errors
/// Errors iff the stream ends before a message or the message is not a
/// schema.
pub fn read_schema<R: Read>(
    channel: &mut ReadChannel<R>,
    scratch: &mut Vec<u8>,
) -> Result<(Schema, IpcSchema)> {
    if !read_message(channel, scratch)? {
        return Err(Error::UnexpectedEof(
            "the stream ended before a schema message".to_string(),
        ));
    }
    let message = parse_message(scratch)?;

    match message_header(&message)? {
        ipc::MessageHeaderRef::Schema(schema) => fb_to_schema(schema),
        other => Err(Error::UnexpectedHeader(format!(
            "expected a schema message, got {}",
            header_name(&other)
        ))),
    }
}

/// Reads a record batch message and its body off `channel`.
pub fn read_record_batch<R: Read, A: BodyAllocator>(
    channel: &mut ReadChannel<R>,
    allocator: &A,
    scratch: &mut Vec<u8>,
) -> Result<RecordBatch> {
    if !read_message(channel, scratch)? {
        return Err(Error::UnexpectedEof(
            "the stream ended before a record batch message".to_string(),
        ));
    }
    let message = parse_message(scratch)?;
    let body_length = message_body_length(&message)?;

    match message_header(&message)? {
        ipc::MessageHeaderRef::RecordBatch(batch) => {
            let body = read_body(channel, allocator, body_length)?;
            deserialize_record_batch(batch, body)
        },
        other => Err(Error::UnexpectedHeader(format!(
            "expected a record batch message, got {}",
            header_name(&other)
        ))),
    }
}

/// Reads a dictionary batch message and its body off `channel`.
pub fn read_dictionary_batch<R: Read, A: BodyAllocator>(
    channel: &mut ReadChannel<R>,
    allocator: &A,
    scratch: &mut Vec<u8>,
) -> Result<DictionaryBatch> {
    if !read_message(channel, scratch)? {
        return Err(Error::UnexpectedEof(
            "the stream ended before a dictionary batch message".to_string(),
        ));
    }
    let message = parse_message(scratch)?;
    let body_length = message_body_length(&message)?;

    match message_header(&message)? {
        ipc::MessageHeaderRef::DictionaryBatch(batch) => {
            let body = read_body(channel, allocator, body_length)?;
            deserialize_dictionary_batch(batch, body)
        },
        other => Err(Error::UnexpectedHeader(format!(
            "expected a dictionary batch message, got {}",
            header_name(&other)
        ))),
    }
}

fn header_name(header: &ipc::MessageHeaderRef) -> &'static str {
    match header {
        ipc::MessageHeaderRef::Schema(_) => "schema",
        ipc::MessageHeaderRef::RecordBatch(_) => "record batch",
        ipc::MessageHeaderRef::DictionaryBatch(_) => "dictionary batch",
        ipc::MessageHeaderRef::Tensor(_) => "tensor",
        ipc::MessageHeaderRef::SparseTensor(_) => "sparse tensor",
    }
}

/// Carves a whole frame read in one I/O into its metadata payload and body.
fn read_frame_at<R: Read + Seek, A: BodyAllocator>(
    reader: &mut R,
    allocator: &A,
    block: &ipc::Block,
) -> Result<(Bytes, Bytes)> {
    let offset: u64 = block
        .offset
        .try_into()
        .map_err(|_| Error::from(OutOfSpecKind::UnexpectedNegativeInteger))?;
    let meta_data_length: usize = block
        .meta_data_length
        .try_into()
        .map_err(|_| Error::from(OutOfSpecKind::UnexpectedNegativeInteger))?;
    let body_length: usize = block
        .body_length
        .try_into()
        .map_err(|_| Error::from(OutOfSpecKind::UnexpectedNegativeInteger))?;
    if meta_data_length < 4 {
        return Err(Error::oos(format!(
            "a block's metadata length includes the 4-byte prefix, got {meta_data_length}"
        )));
    }
    let total_length = meta_data_length
        .checked_add(body_length)
        .filter(|total| *total <= i32::MAX as usize)
        .ok_or_else(|| {
            Error::Oversized(format!("framed message exceeds {} bytes", i32::MAX))
        })?;

    reader.seek(SeekFrom::Start(offset))?;

    let mut region = allocator.allocate(total_length);
    let mut filled = 0;
    while filled < total_length {
        let read = reader.read(&mut region[filled..])?;
        if read == 0 {
            return Err(Error::UnexpectedEof(format!(
                "stream ended inside a framed message: expected {total_length} bytes, got {filled}"
            )));
        }
        filled += read;
    }
    let frame = region.freeze();

    // [0, 4) is the prefix, [4, meta) the metadata payload, the rest the body
    Ok((
        frame.slice(4..meta_data_length),
        frame.slice(meta_data_length..total_length),
    ))
}

/// Reads the record batch at `block` with a single I/O, knowing the size of
/// the entire message up front.
///
/// This minimizes the number of reads to the underlying stream and is useful
/// for random access when the message's coordinates are indexed somewhere
/// else.
pub fn read_record_batch_at<R: Read + Seek, A: BodyAllocator>(
    reader: &mut R,
    allocator: &A,
    block: &ipc::Block,
) -> Result<RecordBatch> {
    let (metadata, body) = read_frame_at(reader, allocator, block)?;
    let message = parse_message(&metadata)?;

    match message_header(&message)? {
        ipc::MessageHeaderRef::RecordBatch(batch) => deserialize_record_batch(batch, body),
        other => Err(Error::UnexpectedHeader(format!(
            "expected a record batch message, got {}",
            header_name(&other)
        ))),
    }
}

/// Reads the dictionary batch at `block` with a single I/O, knowing the size
/// of the entire message up front.
pub fn read_dictionary_batch_at<R: Read + Seek, A: BodyAllocator>(
    reader: &mut R,
    allocator: &A,
    block: &ipc::Block,
) -> Result<DictionaryBatch> {
    let (metadata, body) = read_frame_at(reader, allocator, block)?;
    let message = parse_message(&metadata)?;

    match message_header(&message)? {
        ipc::MessageHeaderRef::DictionaryBatch(batch) => {
            deserialize_dictionary_batch(batch, body)
        },
        other => Err(Error::UnexpectedHeader(format!(
            "expected a dictionary batch message, got {}",
            header_name(&other)
        ))),
    }
}
