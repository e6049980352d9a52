//! Contains [`RecordBatch`] and [`DictionaryBatch`], the raw columnar
//! payloads transported by the IPC format.
use arrow_format::ipc;
use bytes::Bytes;

use crate::error::{Error, Result};

/// Returns the number of zero bytes required after `len` bytes to reach the
/// next multiple of 8.
#[inline]
pub(crate) fn pad_to_8(len: usize) -> usize {
    ((len + 7) & !7) - len
}

fn check_node(node: &ipc::FieldNode) -> Result<()> {
    if node.length < 0 || node.null_count < 0 {
        return Err(Error::oos(format!(
            "field nodes must have non-negative length and null count, got {node:?}"
        )));
    }
    if node.length > i32::MAX as i64 || node.null_count > i32::MAX as i64 {
        return Err(Error::Oversized(format!(
            "field node counters must not exceed {}, got {node:?}",
            i32::MAX
        )));
    }
    Ok(())
}

/// A set of column buffers plus per-column statistics representing `length`
/// rows of a fixed schema.
///
/// Nodes are ordered by the depth-first pre-order traversal of the schema;
/// buffers are ordered by the emission order of the schema's types (validity,
/// offsets, values, ...). The batch owns its buffer layout: each buffer's
/// offset inside the body and the total body length are computed at
/// construction, with every buffer padded to an 8-byte boundary, so that the
/// body length is known before any header is serialized.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordBatch {
    length: i64,
    nodes: Vec<ipc::FieldNode>,
    buffers: Vec<Bytes>,
    layout: Vec<ipc::Buffer>,
    body_length: i64,
}

impl RecordBatch {
    /// Creates a new [`RecordBatch`] of `length` rows, computing the buffer
    /// layout of its body.
    ///
    /// # Errors
    /// This function errors iff `length` or any field-node counter is
    /// negative or exceeds `i32::MAX`, or the resulting body would exceed
    /// `i32::MAX` bytes.
    pub fn try_new(length: i64, nodes: Vec<ipc::FieldNode>, buffers: Vec<Bytes>) -> Result<Self> {
        if length < 0 {
            return Err(Error::oos(format!(
                "a record batch must have a non-negative length, got {length}"
            )));
        }
        if length > i32::MAX as i64 {
            return Err(Error::Oversized(format!(
                "a record batch must not exceed {} rows, got {length}",
                i32::MAX
            )));
        }
        nodes.iter().try_for_each(check_node)?;

        let mut layout = Vec::with_capacity(buffers.len());
        let mut offset = 0usize;
        for buffer in &buffers {
            layout.push(ipc::Buffer {
                offset: offset as i64,
                length: buffer.len() as i64,
            });
            offset += buffer.len() + pad_to_8(buffer.len());
            if offset > i32::MAX as usize {
                return Err(Error::Oversized(format!(
                    "a record batch body must not exceed {} bytes",
                    i32::MAX
                )));
            }
        }

        Ok(Self {
            length,
            nodes,
            buffers,
            layout,
            body_length: offset as i64,
        })
    }

    /// Builds a deserialized batch directly from its parts. The caller has
    /// already validated counters and buffer placement against `body_length`.
    pub(crate) fn from_parts(
        length: i64,
        nodes: Vec<ipc::FieldNode>,
        buffers: Vec<Bytes>,
        layout: Vec<ipc::Buffer>,
        body_length: i64,
    ) -> Self {
        Self {
            length,
            nodes,
            buffers,
            layout,
            body_length,
        }
    }

    /// Returns the number of rows in the batch.
    #[inline]
    pub fn length(&self) -> i64 {
        self.length
    }

    /// Returns the per-column statistics, in depth-first pre-order of the
    /// schema.
    #[inline]
    pub fn nodes(&self) -> &[ipc::FieldNode] {
        &self.nodes
    }

    /// Returns the column buffers, in emission order.
    #[inline]
    pub fn buffers(&self) -> &[Bytes] {
        &self.buffers
    }

    /// Returns the placement of every buffer inside the body.
    #[inline]
    pub fn buffers_layout(&self) -> &[ipc::Buffer] {
        &self.layout
    }

    /// Returns the exact length of the body backing this batch, a multiple
    /// of 8.
    #[inline]
    pub fn body_length(&self) -> i64 {
        self.body_length
    }
}

/// A [`RecordBatch`] supplying the values of a dictionary-encoded field,
/// identified by a dictionary id.
///
/// The embedded batch has a single column whose type is the dictionary's
/// value type.
#[derive(Debug, Clone, PartialEq)]
pub struct DictionaryBatch {
    id: i64,
    data: RecordBatch,
}

impl DictionaryBatch {
    /// Creates a new [`DictionaryBatch`] out of the batch holding the
    /// dictionary's values.
    pub fn new(id: i64, data: RecordBatch) -> Self {
        Self { id, data }
    }

    /// Returns the dictionary id this batch provides values for.
    #[inline]
    pub fn id(&self) -> i64 {
        self.id
    }

    /// Returns the batch holding the dictionary's values.
    #[inline]
    pub fn data(&self) -> &RecordBatch {
        &self.data
    }

    /// Consumes this batch, returning the batch holding the dictionary's
    /// values.
    pub fn into_data(self) -> RecordBatch {
        self.data
    }
}
