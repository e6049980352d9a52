//! Position-tracking adapters over byte streams.
//!
//! The codec performs all its I/O through [`WriteChannel`] and
//! [`ReadChannel`]: synchronous, sequential wrappers that track the absolute
//! stream position so that framing and 8-byte alignment can be computed
//! without seeking. A channel carries a cursor and is therefore not safe to
//! share across concurrent callers.
use std::io::{ErrorKind, Read, Write};

use crate::error::Result;

const ZEROS: [u8; 64] = [0u8; 64];

/// A [`Write`] with an absolute position, little-endian integer writes and
/// zero-padding helpers.
#[derive(Debug)]
pub struct WriteChannel<W: Write> {
    writer: W,
    position: u64,
}

impl<W: Write> WriteChannel<W> {
    /// Creates a new [`WriteChannel`] starting at position 0.
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            position: 0,
        }
    }

    /// Returns the number of bytes written through this channel.
    #[inline]
    pub fn position(&self) -> u64 {
        self.position
    }

    /// Writes all of `buf` to the underlying writer.
    pub fn write_all(&mut self, buf: &[u8]) -> Result<()> {
        self.writer.write_all(buf)?;
        self.position += buf.len() as u64;
        Ok(())
    }

    /// Writes `value` in little-endian byte order.
    pub fn write_i32_le(&mut self, value: i32) -> Result<()> {
        self.write_all(&value.to_le_bytes())
    }

    /// Writes `count` zero bytes.
    pub fn write_zeros(&mut self, mut count: usize) -> Result<()> {
        while count > 0 {
            let step = count.min(ZEROS.len());
            self.write_all(&ZEROS[..step])?;
            count -= step;
        }
        Ok(())
    }

    /// Pads the channel with zero bytes up to the next multiple of 8 of its
    /// absolute position.
    pub fn align(&mut self) -> Result<()> {
        let trailing = (self.position % 8) as usize;
        if trailing != 0 {
            self.write_zeros(8 - trailing)?;
        }
        Ok(())
    }

    /// Flushes the underlying writer.
    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }

    /// Consumes this channel, returning the underlying writer.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

/// A [`Read`] with an absolute position that reads in full.
#[derive(Debug)]
pub struct ReadChannel<R: Read> {
    reader: R,
    position: u64,
}

impl<R: Read> ReadChannel<R> {
    /// Creates a new [`ReadChannel`] starting at position 0.
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            position: 0,
        }
    }

    /// Returns the number of bytes read through this channel.
    #[inline]
    pub fn position(&self) -> u64 {
        self.position
    }

    /// Reads exactly `buf.len()` bytes, returning the number read. The
    /// returned count is smaller than requested only at end of stream.
    pub fn read_fully(&mut self, buf: &mut [u8]) -> Result<usize> {
        let mut total = 0;
        while total < buf.len() {
            match self.reader.read(&mut buf[total..]) {
                Ok(0) => break,
                Ok(read) => total += read,
                Err(error) if error.kind() == ErrorKind::Interrupted => {},
                Err(error) => return Err(error.into()),
            }
        }
        self.position += total as u64;
        Ok(total)
    }

    /// Consumes this channel, returning the underlying reader.
    pub fn into_inner(self) -> R {
        self.reader
    }
}
