//! Growable receive buffer
//!
//! `DynamicBuffer` tracks its filled length separately from its allocated
//! capacity so socket reads can land directly in the unfilled tail. The
//! capacity doubles whenever free space drops below a threshold, and the
//! whole allocation can be swapped for a fresh one at the initial size once
//! it has grown past a reset threshold.
//!
//! Invariant: `capacity > length` after every public operation.

use crate::crawler::verify::find_subslice;
use std::collections::TryReserveError;
use thiserror::Error;

/// Buffer growth failures
#[derive(Debug, Error)]
pub enum BufferError {
    #[error("failed with buffer overflow: cannot double {capacity} bytes")]
    Overflow { capacity: usize },

    #[error("allocation failed: {0}")]
    Allocation(#[from] TryReserveError),

    #[error("grow threshold {grow_threshold} must be non-zero and below initial size {initial_size}")]
    InvalidThreshold {
        initial_size: usize,
        grow_threshold: usize,
    },

    #[error("buffer full at {capacity} bytes")]
    Full { capacity: usize },
}

/// An owned byte region with explicit length and capacity
#[derive(Debug)]
pub struct DynamicBuffer {
    /// Backing storage; its `len()` is the buffer capacity
    data: Vec<u8>,
    /// Number of filled bytes at the front of `data`
    length: usize,
    initial_size: usize,
    grow_threshold: usize,
}

impl DynamicBuffer {
    /// Allocates a buffer of `initial_size` bytes
    ///
    /// `grow_threshold` must be non-zero and smaller than `initial_size`,
    /// otherwise the buffer could fill up without ever growing.
    pub fn new(initial_size: usize, grow_threshold: usize) -> Result<Self, BufferError> {
        if grow_threshold == 0 || grow_threshold >= initial_size {
            return Err(BufferError::InvalidThreshold {
                initial_size,
                grow_threshold,
            });
        }

        Ok(Self {
            data: allocate(initial_size)?,
            length: 0,
            initial_size,
            grow_threshold,
        })
    }

    /// Number of filled bytes
    pub fn len(&self) -> usize {
        self.length
    }

    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    /// Number of allocated bytes
    pub fn capacity(&self) -> usize {
        self.data.len()
    }

    /// Unfilled bytes between `len()` and `capacity()`
    pub fn free_space(&self) -> usize {
        self.data.len() - self.length
    }

    /// The filled region
    pub fn as_bytes(&self) -> &[u8] {
        &self.data[..self.length]
    }

    /// The unfilled tail, where the next read should land
    pub fn spare_mut(&mut self) -> &mut [u8] {
        &mut self.data[self.length..]
    }

    /// Marks the buffer empty without releasing capacity
    pub fn clear(&mut self) {
        self.length = 0;
    }

    /// Records `count` bytes written into [`spare_mut`](Self::spare_mut)
    ///
    /// Doubles the capacity when free space drops below the growth
    /// threshold. Already filled bytes are preserved across the grow.
    pub fn commit(&mut self, count: usize) -> Result<(), BufferError> {
        debug_assert!(count <= self.free_space());
        self.length += count;

        if self.free_space() < self.grow_threshold {
            self.grow()?;
        }
        Ok(())
    }

    /// Appends `bytes`, growing as needed
    pub fn append(&mut self, mut bytes: &[u8]) -> Result<(), BufferError> {
        while !bytes.is_empty() {
            let count = bytes.len().min(self.free_space());
            self.spare_mut()[..count].copy_from_slice(&bytes[..count]);
            self.commit(count)?;
            bytes = &bytes[count..];
        }
        Ok(())
    }

    /// Writes a zero byte just past the filled region
    ///
    /// The terminator is not counted in `len()` and is never part of
    /// [`as_bytes`](Self::as_bytes).
    pub fn terminate(&mut self) {
        if let Some(slot) = self.data.get_mut(self.length) {
            *slot = 0;
        }
    }

    /// Returns true if the filled region contains `needle`
    pub fn contains(&self, needle: &[u8]) -> bool {
        find_subslice(self.as_bytes(), needle).is_some()
    }

    /// Discards the allocation if it has grown past `reset_threshold`
    ///
    /// The old storage is released before the replacement is allocated at
    /// the initial size. Returns true if a reset happened.
    pub fn reset_if_oversized(&mut self, reset_threshold: usize) -> Result<bool, BufferError> {
        if self.capacity() <= reset_threshold {
            return Ok(false);
        }

        self.data = Vec::new();
        self.length = 0;
        self.data = allocate(self.initial_size)?;
        Ok(true)
    }

    fn grow(&mut self) -> Result<(), BufferError> {
        let new_capacity = next_capacity(self.capacity())?;
        self.data.try_reserve_exact(new_capacity - self.data.len())?;
        self.data.resize(new_capacity, 0);
        Ok(())
    }
}

/// Doubles `capacity`, failing instead of wrapping on overflow
pub(crate) fn next_capacity(capacity: usize) -> Result<usize, BufferError> {
    capacity
        .checked_mul(2)
        .ok_or(BufferError::Overflow { capacity })
}

fn allocate(size: usize) -> Result<Vec<u8>, BufferError> {
    let mut data = Vec::new();
    data.try_reserve_exact(size)?;
    data.resize(size, 0);
    Ok(data)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_buffer() {
        let buffer = DynamicBuffer::new(64, 16).unwrap();
        assert_eq!(buffer.len(), 0);
        assert!(buffer.is_empty());
        assert_eq!(buffer.capacity(), 64);
        assert_eq!(buffer.free_space(), 64);
    }

    #[test]
    fn test_invalid_threshold_is_rejected() {
        assert!(matches!(
            DynamicBuffer::new(64, 0),
            Err(BufferError::InvalidThreshold {
                initial_size: 64,
                grow_threshold: 0
            })
        ));
        assert!(matches!(
            DynamicBuffer::new(64, 64),
            Err(BufferError::InvalidThreshold { .. })
        ));
    }

    #[test]
    fn test_commit_without_growth() {
        let mut buffer = DynamicBuffer::new(64, 16).unwrap();
        buffer.spare_mut()[..5].copy_from_slice(b"HTTP/");
        buffer.commit(5).unwrap();

        assert_eq!(buffer.as_bytes(), b"HTTP/");
        assert_eq!(buffer.capacity(), 64);
    }

    #[test]
    fn test_grows_when_free_space_below_threshold() {
        let mut buffer = DynamicBuffer::new(64, 16).unwrap();
        buffer.append(&[b'a'; 48]).unwrap();
        // 16 free bytes is not below the threshold
        assert_eq!(buffer.capacity(), 64);

        buffer.append(b"b").unwrap();
        assert_eq!(buffer.capacity(), 128);
        assert_eq!(buffer.len(), 49);
        assert_eq!(&buffer.as_bytes()[47..], b"ab");
    }

    #[test]
    fn test_partial_reads_preserve_length_and_terminator() {
        let mut buffer = DynamicBuffer::new(16, 4).unwrap();
        let chunks: [&[u8]; 4] = [b"HTTP/1.1 ", b"200 OK\r\n", b"\r\n", b"<html>hello</html>"];
        let mut expected = Vec::new();

        for chunk in chunks {
            buffer.append(chunk).unwrap();
            expected.extend_from_slice(chunk);
            assert!(buffer.capacity() > buffer.len());
        }
        buffer.terminate();

        assert_eq!(buffer.len(), expected.len());
        assert_eq!(buffer.as_bytes(), expected.as_slice());
        assert_eq!(buffer.data[expected.len()], 0);
    }

    #[test]
    fn test_terminator_overwrites_stale_bytes() {
        let mut buffer = DynamicBuffer::new(32, 4).unwrap();
        buffer.append(b"HTTP/1.1 200 OK").unwrap();
        buffer.clear();
        buffer.append(b"HTTP").unwrap();
        buffer.terminate();

        assert_eq!(buffer.as_bytes(), b"HTTP");
        assert_eq!(buffer.data[4], 0);
    }

    #[test]
    fn test_reset_if_oversized() {
        let mut buffer = DynamicBuffer::new(32, 8).unwrap();
        buffer.append(&[b'x'; 100]).unwrap();
        assert!(buffer.capacity() > 64);

        assert!(!buffer.reset_if_oversized(1024).unwrap());
        assert_eq!(buffer.len(), 100);

        assert!(buffer.reset_if_oversized(64).unwrap());
        assert_eq!(buffer.capacity(), 32);
        assert_eq!(buffer.len(), 0);
    }

    #[test]
    fn test_reset_keeps_buffer_at_threshold() {
        let mut buffer = DynamicBuffer::new(32, 8).unwrap();
        assert!(!buffer.reset_if_oversized(32).unwrap());
        assert_eq!(buffer.capacity(), 32);
    }

    #[test]
    fn test_contains() {
        let mut buffer = DynamicBuffer::new(32, 8).unwrap();
        assert!(!buffer.contains(b"HTTP/"));
        buffer.append(b"xxHTTP/1.0").unwrap();
        assert!(buffer.contains(b"HTTP/"));
    }

    #[test]
    fn test_next_capacity_overflow() {
        assert_eq!(next_capacity(8).unwrap(), 16);
        assert!(matches!(
            next_capacity(usize::MAX / 2 + 1),
            Err(BufferError::Overflow { .. })
        ));
    }
}
