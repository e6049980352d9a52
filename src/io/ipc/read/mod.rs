//! APIs to read from the Arrow IPC wire format.
//!
//! Reading is layered: [`read_message`] pulls one frame off a channel,
//! [`parse_message`] validates its metadata root, and the `read_*` functions
//! and [`StreamReader`] dispatch on the header to materialize schemas,
//! [`RecordBatch`](crate::record_batch::RecordBatch)es and
//! [`DictionaryBatch`](crate::record_batch::DictionaryBatch)es, slicing
//! bodies into per-buffer views without copying.
mod common;
mod schema;
mod stream;

use arrow_format::ipc::planus;

pub use common::{
    deserialize_dictionary_batch, deserialize_record_batch, parse_message, read_dictionary_batch,
    read_dictionary_batch_at, read_message, read_next, read_record_batch, read_record_batch_at,
    read_schema, ArrowMessage,
};
pub use schema::fb_to_schema;
pub use stream::{read_stream_metadata, StreamMetadata, StreamReader};

/// The different detail kinds of out-of-spec bytes a reader can encounter.
/// They all surface as [`Error::OutOfSpec`](crate::error::Error::OutOfSpec).
#[derive(Debug)]
#[non_exhaustive]
pub enum OutOfSpecKind {
    /// The message's root cannot be decoded
    InvalidFlatbufferMessage(planus::Error),
    /// The message's version cannot be decoded
    InvalidFlatbufferVersion(planus::Error),
    /// The message's header cannot be decoded
    InvalidFlatbufferHeader(planus::Error),
    /// The message does not carry a header
    MissingMessageHeader,
    /// The message's body length cannot be decoded
    InvalidFlatbufferBodyLength(planus::Error),
    /// A length or offset on the wire is negative
    UnexpectedNegativeInteger,
    /// A record batch's length cannot be decoded
    InvalidFlatbufferLength(planus::Error),
    /// A record batch's nodes cannot be decoded
    InvalidFlatbufferNodes(planus::Error),
    /// The record batch does not declare its nodes
    MissingMessageNodes,
    /// A record batch's buffers cannot be decoded
    InvalidFlatbufferBuffers(planus::Error),
    /// A record batch's compression cannot be decoded
    InvalidFlatbufferCompression(planus::Error),
    /// The record batch does not declare its buffers
    MissingMessageBuffers,
    /// A dictionary batch's id cannot be decoded
    InvalidFlatbufferId(planus::Error),
    /// A dictionary batch's delta flag cannot be decoded
    InvalidFlatbufferIsDelta(planus::Error),
    /// The dictionary batch does not carry an embedded record batch
    MissingData,
    /// The embedded record batch of a dictionary cannot be decoded
    InvalidFlatbufferData(planus::Error),
    /// The schema's endianness cannot be decoded
    InvalidFlatbufferEndianness(planus::Error),
    /// A field cannot be decoded
    InvalidFlatbufferField(planus::Error),
    /// The schema does not declare its fields
    MissingFields,
    /// A field does not declare its type
    MissingType,
    /// A field's custom metadata cannot be decoded
    InvalidFlatbufferKeyValue(planus::Error),
    /// A field's dictionary encoding cannot be decoded
    InvalidFlatbufferDictionary(planus::Error),
}

impl From<OutOfSpecKind> for crate::error::Error {
    fn from(kind: OutOfSpecKind) -> Self {
        crate::error::Error::OutOfSpec(format!("{kind:?}"))
    }
}
