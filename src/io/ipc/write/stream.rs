//! Arrow IPC stream writer
//!
//! The [`StreamWriter`] frames messages back to back onto a byte sink; the
//! data it writes must be read in order. To signal that no more data is
//! arriving through the stream call [`self.finish()`](StreamWriter::finish).
use std::io::Write;

use arrow_format::ipc;

use super::common::write_end_of_stream;
use super::{
    default_ipc_fields, serialize_dictionary_batch, serialize_record_batch,
    serialize_schema_message,
};
use crate::datatypes::Schema;
use crate::error::{Error, Result};
use crate::io::ipc::channel::WriteChannel;
use crate::io::ipc::IpcField;
use crate::record_batch::{DictionaryBatch, RecordBatch};

/// Arrow stream writer.
///
/// Writes the schema message on [`start`](StreamWriter::start), one framed
/// message per batch on [`write`](StreamWriter::write) and
/// [`write_dictionary`](StreamWriter::write_dictionary), and the
/// end-of-stream marker on [`finish`](StreamWriter::finish). The block
/// coordinates of every written batch are reported back and accumulated for
/// container layers that index the stream.
pub struct StreamWriter<W: Write> {
    /// The channel to write to
    channel: WriteChannel<W>,
    /// Whether the stream has been finished
    finished: bool,
    /// Declared dictionary ids of the schema's fields, set by `start`
    ipc_fields: Option<Vec<IpcField>>,
    /// Blocks of the record batches written so far
    record_blocks: Vec<ipc::Block>,
    /// Blocks of the dictionary batches written so far
    dictionary_blocks: Vec<ipc::Block>,
}

impl<W: Write> StreamWriter<W> {
    /// Creates a new [`StreamWriter`].
    pub fn new(writer: W) -> Self {
        Self {
            channel: WriteChannel::new(writer),
            finished: false,
            ipc_fields: None,
            record_blocks: vec![],
            dictionary_blocks: vec![],
        }
    }

    /// Starts the stream by writing a schema message to it.
    /// Use `ipc_fields` to declare dictionary ids; when `None`, ids are
    /// assigned in depth-first pre-order of the schema.
    pub fn start(&mut self, schema: &Schema, ipc_fields: Option<Vec<IpcField>>) -> Result<()> {
        if self.ipc_fields.is_some() {
            return Err(Error::oos("the stream can only be started once"));
        }
        let ipc_fields = if let Some(ipc_fields) = ipc_fields {
            ipc_fields
        } else {
            default_ipc_fields(&schema.fields)
        };

        serialize_schema_message(&mut self.channel, schema, &ipc_fields)?;
        self.ipc_fields = Some(ipc_fields);
        Ok(())
    }

    /// Writes a [`RecordBatch`] to the stream, returning its block
    /// coordinates.
    pub fn write(&mut self, batch: &RecordBatch) -> Result<ipc::Block> {
        self.check_writable()?;

        let block = serialize_record_batch(&mut self.channel, batch)?;
        self.record_blocks.push(block);
        Ok(block)
    }

    /// Writes a [`DictionaryBatch`] to the stream, returning its block
    /// coordinates. Dictionaries must be written before the batches whose
    /// fields reference them.
    pub fn write_dictionary(&mut self, batch: &DictionaryBatch) -> Result<ipc::Block> {
        self.check_writable()?;

        let block = serialize_dictionary_batch(&mut self.channel, batch)?;
        self.dictionary_blocks.push(block);
        Ok(block)
    }

    fn check_writable(&self) -> Result<()> {
        if self.finished {
            return Err(Error::oos("cannot write to a finished stream"));
        }
        if self.ipc_fields.is_none() {
            return Err(Error::oos(
                "the stream must be started before it can be written to",
            ));
        }
        Ok(())
    }

    /// Writes the end-of-stream marker and marks the stream as done.
    pub fn finish(&mut self) -> Result<()> {
        write_end_of_stream(&mut self.channel)?;
        self.channel.flush()?;
        self.finished = true;
        Ok(())
    }

    /// Returns the current absolute position of the channel.
    pub fn position(&self) -> u64 {
        self.channel.position()
    }

    /// Returns the block coordinates of the record batches written so far.
    pub fn record_blocks(&self) -> &[ipc::Block] {
        &self.record_blocks
    }

    /// Returns the block coordinates of the dictionary batches written so
    /// far.
    pub fn dictionary_blocks(&self) -> &[ipc::Block] {
        &self.dictionary_blocks
    }

    /// Consumes itself, returning the inner writer.
    pub fn into_inner(self) -> W {
        self.channel.into_inner()
    }
}
