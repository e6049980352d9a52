//! Allocation of the regions that back message bodies.
use bytes::BytesMut;

/// Source of the byte regions that back deserialized message bodies.
///
/// The readers of this crate allocate bodies exclusively through this trait.
/// A region is filled once, frozen into a shared [`bytes::Bytes`] and then
/// sliced into per-buffer views; it is released when the last view over it is
/// dropped.
pub trait BodyAllocator {
    /// Returns a zero-initialized, writable region of exactly `capacity`
    /// bytes.
    fn allocate(&self, capacity: usize) -> BytesMut;
}

/// [`BodyAllocator`] backed by the global allocator.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeapAllocator;

impl BodyAllocator for HeapAllocator {
    fn allocate(&self, capacity: usize) -> BytesMut {
        BytesMut::zeroed(capacity)
    }
}
