//! Defines [`Error`], representing all errors returned by this crate.
use std::io;

/// Enum with all errors in this crate.
///
/// Each variant corresponds to one failure kind of the wire protocol. A
/// channel that surfaced one of these mid-operation is poisoned and must be
/// discarded by the caller.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// The stream ended in the middle of a length prefix, a metadata payload
    /// or a message body.
    #[error("unexpected end of stream: {0}")]
    UnexpectedEof(String),
    /// The message declares a metadata version other than V4.
    #[error("incompatible metadata version: {0}")]
    IncompatibleVersion(String),
    /// The message header is not in the set supported by the call site.
    #[error("unexpected message header: {0}")]
    UnexpectedHeader(String),
    /// A body length, row count or field-node counter exceeds `i32::MAX`.
    #[error("oversized batch: {0}")]
    Oversized(String),
    /// A buffer's placement disagrees with its declaration: on write its
    /// on-channel size differs from its declared size, on read it falls
    /// outside the body or overlaps a neighbour.
    #[error("buffer layout violation: {0}")]
    BufferLayout(String),
    /// A type-union tag that this crate does not understand.
    #[error("unsupported type: {0}")]
    UnsupportedType(String),
    /// The bytes on the wire do not follow the format's specification.
    #[error("out-of-spec: {0}")]
    OutOfSpec(String),
    /// The underlying channel failed.
    #[error("transport error: {0}")]
    Io(#[from] io::Error),
}

impl Error {
    /// Wraps `msg` in [`Error::OutOfSpec`].
    pub(crate) fn oos<A: Into<String>>(msg: A) -> Self {
        Self::OutOfSpec(msg.into())
    }
}

impl From<arrow_format::ipc::planus::Error> for Error {
    fn from(error: arrow_format::ipc::planus::Error) -> Self {
        Self::OutOfSpec(error.to_string())
    }
}

/// Typedef for a [`std::result::Result`] of an [`Error`].
pub type Result<T> = std::result::Result<T, Error>;
