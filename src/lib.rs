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
//! Library to read Tar archives from an in-memory buffer in `no_std` + `alloc`
//! contexts. If you need to write archives or stream them from disk, I recommend
//! <https://crates.io/crates/tar> instead.
//!
//! Besides the classic v7 header, the POSIX "ustar" extension (owner and group
//! names, device numbers, name prefix) and PAX extended headers are supported.
//! PAX headers come in two flavours: a global header (type `g`) applies to every
//! following entry, a per-entry header (type `x`) only to the entry right after
//! it. Per-entry values win over global values. A PAX record with an empty value
//! deletes the field from the entry, so every overridable field of an [`Entry`]
//! is optional.
//!
//! The typical use is to pull a single file out of an already decompressed
//! archive:
//!
//! ```
//! use pax_untar::TarArchive;
//!
//! fn dictionary(tar_bytes: &[u8]) -> Option<Vec<u8>> {
//!     let archive = TarArchive::new(tar_bytes);
//!     archive
//!         .find_file("system.dic")
//!         .ok()
//!         .flatten()
//!         .map(|entry| entry.into_buffer())
//! }
//! ```
//!
//! Header text fields are decoded byte by byte (one byte, one character), while
//! PAX records are UTF-8. Numeric fields `uid`, `gid` and the checksum are read
//! as decimal numbers, `size` and `mtime` as octal numbers.

#![cfg_attr(not(test), no_std)]
#![deny(rustdoc::all)]
#![allow(rustdoc::missing_doc_code_examples)]
#![deny(clippy::all)]
#![deny(missing_debug_implementations)]

#[cfg_attr(test, macro_use)]
#[cfg(test)]
extern crate std;

extern crate alloc;

/// Each Archive Entry (either Header or Data Block) is a block of 512 bytes.
pub const BLOCKSIZE: usize = 512;

/// Length of the `name` and `linkname` header fields.
pub const NAME_LEN: usize = 100;

/// Length of the ustar `prefix` header field.
pub const PREFIX_LEN: usize = 155;

mod archive;
mod cursor;
mod entry;
mod error;
mod header;
mod pax;
mod tar_format_types;
mod utf8;

#[cfg(test)]
mod test_utils;

pub use archive::*;
pub use cursor::*;
pub use entry::*;
pub use error::*;
pub use header::*;
pub use pax::*;
pub use utf8::*;
