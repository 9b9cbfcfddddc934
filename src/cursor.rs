/*
MIT License

Copyright (c) 2021 Philipp Schuster

Permission is hereby granted, free of charge, to any person obtaining a copy
of this software and associated documentation files (the "Software"), to deal
in the Software without restriction, including without limitation the rights
to use, copy, modify, merge, publish, distribute, sublicense, and/or sell
copies of the Software, and to permit persons to whom the Software is
furnished to do so, subject to the following conditions:

The above copyright notice and this permission notice shall be included in all
copies or substantial portions of the Software.

THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE
SOFTWARE.
*/
//! Module for [`ByteCursor`].

use crate::error::TarError;
use alloc::string::String;
use alloc::vec::Vec;

/// Sequential reader over a fixed, in-memory byte buffer.
///
/// The cursor owns its read position exclusively. Reads never go past the end
/// of the buffer: a request that would do so fails with
/// [`TarError::OutOfBounds`] and leaves the position untouched. The position
/// itself may be set beyond the end (for example when the last entry of an
/// archive is not padded to a full block); [`ByteCursor::remaining`] then
/// reports zero.
#[derive(Debug, Clone)]
pub struct ByteCursor<'a> {
    data: &'a [u8],
    position: usize,
}

impl<'a> ByteCursor<'a> {
    /// Creates a cursor at position zero.
    #[must_use]
    pub const fn new(data: &'a [u8]) -> Self {
        Self { data, position: 0 }
    }

    /// Current read position in bytes, counted from the start of the buffer.
    #[must_use]
    pub const fn position(&self) -> usize {
        self.position
    }

    /// Moves the read position to `position`.
    pub fn set_position(&mut self, position: usize) {
        self.position = position;
    }

    /// Number of bytes between the read position and the end of the buffer.
    #[must_use]
    pub const fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.position)
    }

    /// Total length of the underlying buffer.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.data.len()
    }

    /// True if the underlying buffer has no bytes at all.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Returns the next `n` bytes without moving the position.
    fn peek_slice(&self, n: usize) -> Result<&'a [u8], TarError> {
        let out_of_bounds = || TarError::OutOfBounds {
            position: self.position,
            requested: n,
            len: self.data.len(),
        };
        let end = self.position.checked_add(n).ok_or_else(out_of_bounds)?;
        self.data.get(self.position..end).ok_or_else(out_of_bounds)
    }

    /// Reads a fixed-width text field of exactly `n` bytes.
    ///
    /// Every byte is taken as one character code (no UTF-8 decoding). The text
    /// ends at the first NULL byte, but the position always advances by `n`.
    ///
    /// # Errors
    /// Returns [`TarError::OutOfBounds`] if fewer than `n` bytes remain.
    pub fn read_fixed_text(&mut self, n: usize) -> Result<String, TarError> {
        let field = self.peek_slice(n)?;
        let end = memchr::memchr(0, field).unwrap_or(n);
        let text = field[..end].iter().copied().map(char::from).collect();
        self.position += n;
        Ok(text)
    }

    /// Copies the next `n` bytes into an owned buffer and advances by `n`.
    ///
    /// # Errors
    /// Returns [`TarError::OutOfBounds`] if fewer than `n` bytes remain.
    pub fn read_bytes(&mut self, n: usize) -> Result<Vec<u8>, TarError> {
        let bytes = self.peek_slice(n)?.to_vec();
        self.position += n;
        Ok(bytes)
    }

    /// Reads a little-endian `u32` at the current position without advancing.
    ///
    /// # Errors
    /// Returns [`TarError::OutOfBounds`] if fewer than four bytes remain.
    pub fn peek_u32_le(&self) -> Result<u32, TarError> {
        let bytes = self.peek_slice(4)?;
        Ok(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    /// True if the next `n` bytes exist and are all zero.
    pub(crate) fn is_zero_run(&self, n: usize) -> bool {
        self.peek_slice(n)
            .map(|bytes| bytes.iter().all(|&b| b == 0))
            .unwrap_or(false)
    }
}
