//! Codec for the Arrow IPC wire format.
//!
//! This crate frames self-describing metadata and raw columnar buffers onto a
//! byte stream so that producers and consumers running in different processes
//! or languages can exchange schemas, record batches and dictionary batches
//! without re-encoding the column data itself.
//!
//! It implements the V4 metadata version of the format:
//! * messages are prefixed by a little-endian `i32` metadata length,
//! * metadata is encoded as an [`arrow_format`] flatbuffer,
//! * message bodies are 8-byte aligned concatenations of column buffers that
//!   readers slice into without copying.
//!
//! The crate does not build typed arrays: batches are transported as
//! [`record_batch::RecordBatch`], a row count plus field nodes and raw
//! buffers. Assembling logical columns out of those buffers is the concern of
//! a columnar engine, not of the wire codec.
pub mod alloc;
pub mod datatypes;
pub mod error;
pub mod io;
pub mod record_batch;
