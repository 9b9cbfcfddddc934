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
//! Error types of the archive reader.

use crate::utf8::Utf8DecodeError;
use alloc::string::String;
use core::fmt::{Display, Formatter};

/// Errors while parsing the body of a PAX extended header. Offsets are byte
/// offsets into that body.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PaxError {
    /// No space terminates the decimal length prefix of the record.
    MissingLength { offset: usize },
    /// The length prefix is no decimal number, is zero or runs past the
    /// end of the header body.
    InvalidLength { offset: usize, text: String },
    /// The record does not have the shape `"<length> <key>=<value>\n"`.
    MalformedRecord { offset: usize },
    /// The record is no valid UTF-8.
    Utf8 {
        offset: usize,
        source: Utf8DecodeError,
    },
}

impl Display for PaxError {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::MissingLength { offset } => {
                write!(f, "PAX record at offset {offset} has no length prefix")
            }
            Self::InvalidLength { offset, text } => {
                write!(f, "PAX record at offset {offset} has invalid length '{text}'")
            }
            Self::MalformedRecord { offset } => {
                write!(f, "invalid PAX header data format at offset {offset}")
            }
            Self::Utf8 { offset, source } => {
                write!(f, "PAX record at offset {offset}: UTF-8 decode: {source}")
            }
        }
    }
}

impl core::error::Error for PaxError {
    fn source(&self) -> Option<&(dyn core::error::Error + 'static)> {
        match self {
            Self::Utf8 { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Fatal errors while reading an archive. Parsing does not continue after any
/// of them, since the offsets of the following entries can't be trusted.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TarError {
    /// A read of `requested` bytes at `position` would pass the end of the
    /// buffer of length `len`.
    OutOfBounds {
        position: usize,
        requested: usize,
        len: usize,
    },
    /// A numeric header field holds something else than digits of its radix.
    InvalidNumber { field: &'static str, text: String },
    /// A PAX extended header could not be parsed.
    Pax(PaxError),
}

impl Display for TarError {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::OutOfBounds {
                position,
                requested,
                len,
            } => write!(
                f,
                "reading {requested} bytes at position {position} exceeds buffer of {len} bytes"
            ),
            Self::InvalidNumber { field, text } => {
                write!(f, "header field '{field}' is not a valid number: '{text}'")
            }
            Self::Pax(e) => Display::fmt(e, f),
        }
    }
}

impl core::error::Error for TarError {
    fn source(&self) -> Option<&(dyn core::error::Error + 'static)> {
        match self {
            Self::Pax(e) => Some(e),
            _ => None,
        }
    }
}

impl From<PaxError> for TarError {
    fn from(e: PaxError) -> Self {
        Self::Pax(e)
    }
}
