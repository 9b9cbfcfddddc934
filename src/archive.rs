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
//! Module for [`TarArchive`] and [`ArchiveIterator`].

use crate::cursor::ByteCursor;
use crate::entry::Entry;
use crate::error::TarError;
use crate::header::{PosixHeader, TypeFlag};
use crate::pax::ExtendedHeaderSet;
use crate::BLOCKSIZE;
use alloc::vec::Vec;
use core::iter::FusedIterator;

/// Wrapper type around the bytes, which represents an archive.
#[derive(Debug, Clone, Copy)]
pub struct TarArchive<'a> {
    data: &'a [u8],
}

impl<'a> TarArchive<'a> {
    /// Interprets the provided bytes as (already decompressed) Tar archive.
    #[must_use]
    pub fn new(data: &'a [u8]) -> Self {
        if data.len() % BLOCKSIZE != 0 {
            log::debug!(
                "archive of {} bytes is not a multiple of BLOCKSIZE={}",
                data.len(),
                BLOCKSIZE
            );
        }
        Self { data }
    }

    /// Iterates over all entries of the TAR Archive, starting at the first
    /// byte. Returns items of type [`Entry`]; extended headers are folded into
    /// the entries they belong to.
    #[must_use]
    pub const fn entries(&self) -> ArchiveIterator<'a> {
        ArchiveIterator::new(self.data)
    }

    /// Returns the first entry whose name contains `needle`.
    ///
    /// # Errors
    /// Returns the parse error of the archive, if one occurs before a matching
    /// entry is found.
    pub fn find_file(&self, needle: &str) -> Result<Option<Entry>, TarError> {
        for entry in self.entries() {
            let entry = entry?;
            if entry.name().is_some_and(|name| name.contains(needle)) {
                log::debug!("found '{needle}' in entry {:?}", entry.name());
                return Ok(Some(entry));
            }
        }
        Ok(None)
    }
}

/// Iterator over the entries. Each iteration step starts at the next Tar
/// header block.
///
/// A global extended header stays active for the rest of the iteration, a
/// per-entry extended header applies to the next entry only. The iteration
/// ends at a block whose first four bytes are zero, at the end of the data or
/// after the first error.
#[derive(Debug, Clone)]
pub struct ArchiveIterator<'a> {
    cursor: ByteCursor<'a>,
    global_header: Option<ExtendedHeaderSet>,
    finished: bool,
}

impl<'a> ArchiveIterator<'a> {
    #[must_use]
    pub const fn new(data: &'a [u8]) -> Self {
        Self {
            cursor: ByteCursor::new(data),
            global_header: None,
            finished: false,
        }
    }

    /// The global extended header currently in effect.
    #[must_use]
    pub const fn global_header(&self) -> Option<&ExtendedHeaderSet> {
        self.global_header.as_ref()
    }

    /// Byte offset of the next header block.
    #[must_use]
    pub const fn position(&self) -> usize {
        self.cursor.position()
    }

    /// True if another header block follows. Only the first four bytes of the
    /// block are checked for the end-of-archive marker.
    fn has_next(&self) -> bool {
        if self.cursor.remaining() < 4 {
            log::warn!("Reached end of Tar archive data without finding zero/end blocks!");
            return false;
        }
        match self.cursor.peek_u32_le() {
            Ok(0) => {
                if self.cursor.is_zero_run(2 * BLOCKSIZE) {
                    // gracefully terminated Archive
                    log::debug!("End of Tar archive with two zero blocks!");
                } else {
                    log::debug!(
                        "End of Tar archive at zero bytes at position {}",
                        self.cursor.position()
                    );
                }
                false
            }
            Ok(_) => true,
            Err(_) => false,
        }
    }

    /// Reads header blocks until one describes a real entry. Extended headers
    /// on the way are collected and applied to that entry: global ones first,
    /// then the per-entry ones. Returns `None` if the archive ends after an
    /// extended header.
    fn read_next_entry(&mut self) -> Result<Option<Entry>, TarError> {
        let mut local_header: Option<ExtendedHeaderSet> = None;

        loop {
            let header_begin = self.cursor.position();
            let data_begin = header_begin + BLOCKSIZE;
            let header = PosixHeader::read(&mut self.cursor)?;
            log::trace!("header at position {header_begin}: {header:?}");
            self.cursor.set_position(data_begin);

            let size = usize::try_from(header.size).map_err(|_| TarError::OutOfBounds {
                position: data_begin,
                requested: usize::MAX,
                len: self.cursor.len(),
            })?;

            let mut buffer = Vec::new();
            let flag = header.typeflag.try_to_type_flag();
            let is_extended_header = flag.is_ok_and(TypeFlag::is_extended_header);
            match flag {
                Ok(flag) if flag.is_regular_file() => {
                    buffer = self.cursor.read_bytes(size)?;
                }
                Ok(TypeFlag::XGLTYPE) => {
                    let set = ExtendedHeaderSet::parse(&self.cursor.read_bytes(size)?)?;
                    if self.global_header.is_some() {
                        log::debug!("global extended header at {header_begin} replaces the previous one");
                    }
                    self.global_header = Some(set);
                }
                Ok(TypeFlag::XHDTYPE) => {
                    let set = ExtendedHeaderSet::parse(&self.cursor.read_bytes(size)?)?;
                    local_header.get_or_insert_with(Default::default).extend(set);
                }
                Ok(flag) => {
                    log::trace!("entry of type={flag:?} carries no data");
                }
                Err(e) => {
                    log::warn!("{e}, treating the entry as one without data");
                }
            }

            // the payload is padded to a multiple of BLOCKSIZE
            let padded_size = usize::try_from(header.payload_block_count())
                .ok()
                .and_then(|blocks| blocks.checked_mul(BLOCKSIZE))
                .unwrap_or(usize::MAX);
            self.cursor.set_position(data_begin.saturating_add(padded_size));

            if is_extended_header {
                if !self.has_next() {
                    log::warn!("extended header at {header_begin} is not followed by an entry");
                    return Ok(None);
                }
                continue;
            }

            let mut entry = Entry::new(header, buffer);
            if let Some(global_header) = &self.global_header {
                global_header.apply(&mut entry);
            }
            if let Some(local_header) = local_header {
                local_header.apply(&mut entry);
            }
            if entry.name().is_none_or(str::is_empty) {
                log::warn!("Found empty file name");
            }
            return Ok(Some(entry));
        }
    }
}

impl Iterator for ArchiveIterator<'_> {
    type Item = Result<Entry, TarError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished || !self.has_next() {
            self.finished = true;
            return None;
        }

        match self.read_next_entry() {
            Ok(Some(entry)) => Some(Ok(entry)),
            Ok(None) => {
                self.finished = true;
                None
            }
            Err(e) => {
                self.finished = true;
                Some(Err(e))
            }
        }
    }
}

impl FusedIterator for ArchiveIterator<'_> {}
