use std::io::Write;

use arrow_format::ipc;
use arrow_format::ipc::planus::Builder;

use super::common::write_message_header;
use super::schema_to_bytes;
use crate::datatypes::Schema;
use crate::error::{Error, Result};
use crate::io::ipc::channel::WriteChannel;
use crate::io::ipc::IpcField;
use crate::record_batch::{DictionaryBatch, RecordBatch};

fn serialize_message(header: ipc::MessageHeader, body_length: i64) -> Vec<u8> {
    let message = ipc::Message {
        version: ipc::MetadataVersion::V4,
        header: Some(header),
        body_length,
        custom_metadata: None,
    };
    let mut builder = Builder::new();
    let data = builder.finish(&message, None);
    data.to_vec()
}

fn batch_header(batch: &RecordBatch) -> ipc::RecordBatch {
    ipc::RecordBatch {
        length: batch.length(),
        nodes: Some(batch.nodes().to_vec()),
        buffers: Some(batch.buffers_layout().to_vec()),
        compression: None,
    }
}

/// Writes the body of `batch`: every buffer at its declared offset, holes
/// between buffers zero-filled, the tail padded to an 8-byte boundary.
/// Returns the number of body bytes written.
fn write_batch_buffers<W: Write>(
    channel: &mut WriteChannel<W>,
    batch: &RecordBatch,
) -> Result<u64> {
    let body_start = channel.position();
    for (index, (buffer, layout)) in batch
        .buffers()
        .iter()
        .zip(batch.buffers_layout().iter())
        .enumerate()
    {
        let declared_start = body_start + layout.offset as u64;
        if channel.position() > declared_start {
            return Err(Error::BufferLayout(format!(
                "buffer {index} declares offset {} but the body already extends past it",
                layout.offset
            )));
        }
        if channel.position() < declared_start {
            channel.write_zeros((declared_start - channel.position()) as usize)?;
        }
        channel.write_all(buffer)?;
        if channel.position() != declared_start + layout.length as u64 {
            return Err(Error::BufferLayout(format!(
                "buffer {index} wrote {} bytes but declares {}",
                channel.position() - declared_start,
                layout.length
            )));
        }
    }
    channel.align()?;
    Ok(channel.position() - body_start)
}

/// Serializes a [`Schema`] message to `channel`. The message carries no
/// body.
///
/// Returns the block coordinates of the written message; its reported
/// metadata length includes the 4-byte prefix.
pub fn serialize_schema_message<W: Write>(
    channel: &mut WriteChannel<W>,
    schema: &Schema,
    ipc_fields: &[IpcField],
) -> Result<ipc::Block> {
    let start = channel.position();

    let ipc_message = schema_to_bytes(schema, ipc_fields);
    let meta_data_length = write_message_header(channel, &ipc_message)?;

    Ok(ipc::Block {
        offset: start as i64,
        meta_data_length: meta_data_length as i32,
        body_length: 0,
    })
}

/// Serializes a [`RecordBatch`] message to `channel`: header first, then the
/// body buffers in their declared layout.
///
/// Returns the block coordinates of the written message; its reported
/// metadata length includes the 4-byte prefix.
pub fn serialize_record_batch<W: Write>(
    channel: &mut WriteChannel<W>,
    batch: &RecordBatch,
) -> Result<ipc::Block> {
    let start = channel.position();

    let header = ipc::MessageHeader::RecordBatch(Box::new(batch_header(batch)));
    let ipc_message = serialize_message(header, batch.body_length());
    let meta_data_length = write_message_header(channel, &ipc_message)?;

    let body_length = write_batch_buffers(channel, batch)?;
    debug_assert_eq!(body_length as i64, batch.body_length());

    Ok(ipc::Block {
        offset: start as i64,
        meta_data_length: meta_data_length as i32,
        body_length: body_length as i64,
    })
}

/// Serializes a [`DictionaryBatch`] message to `channel`. The body is the
/// body of the embedded batch.
///
/// Returns the block coordinates of the written message; its reported
/// metadata length includes the 4-byte prefix.
pub fn serialize_dictionary_batch<W: Write>(
    channel: &mut WriteChannel<W>,
    batch: &DictionaryBatch,
) -> Result<ipc::Block> {
    let start = channel.position();

    let header = ipc::MessageHeader::DictionaryBatch(Box::new(ipc::DictionaryBatch {
        id: batch.id(),
        data: Some(Box::new(batch_header(batch.data()))),
        is_delta: false,
    }));
    let ipc_message = serialize_message(header, batch.data().body_length());
    let meta_data_length = write_message_header(channel, &ipc_message)?;

    let body_length = write_batch_buffers(channel, batch.data())?;

    Ok(ipc::Block {
        offset: start as i64,
        meta_data_length: meta_data_length as i32,
        body_length: body_length as i64,
    })
}
