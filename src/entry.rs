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
//! Module for [`Entry`].

use crate::header::{mode_to_flags, ModeError, ModeFlags, PosixHeader, TypeFlag, TypeFlagRaw};
use crate::pax::{PaxRecord, PaxValue};
use alloc::collections::BTreeMap;
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::fmt::{Debug, Formatter};
use core::str::Utf8Error;

/// Describes an entry in an archive: the metadata of one header block plus
/// the payload of regular files.
///
/// PAX extended headers can override and delete fields. Every field a PAX
/// record can target is therefore optional: `None` means the field was
/// deleted. Records for keys without a dedicated field (`atime`, `ctime`,
/// `SCHILY.xattr.*`, ...) are kept in an extension table, see
/// [`Entry::extension`].
#[derive(Clone, PartialEq, Eq)]
pub struct Entry {
    name: Option<String>,
    mode: Option<String>,
    uid: Option<u64>,
    gid: Option<u64>,
    size: Option<u64>,
    mtime: Option<u64>,
    checksum: Option<u64>,
    typeflag: Option<TypeFlagRaw>,
    linkname: Option<String>,
    ustar_format: Option<String>,
    version: Option<String>,
    uname: Option<String>,
    gname: Option<String>,
    devmajor: Option<u64>,
    devminor: Option<u64>,
    name_prefix: Option<String>,
    extensions: BTreeMap<String, PaxValue>,
    buffer: Vec<u8>,
}

impl Entry {
    /// Creates the entry for a decoded header and its payload. The name is
    /// joined with the ustar prefix.
    #[must_use]
    pub fn new(header: PosixHeader, buffer: Vec<u8>) -> Self {
        let name = header.full_name();
        let ustar = header.ustar;
        Self {
            name: Some(name),
            mode: Some(header.mode),
            uid: header.uid,
            gid: header.gid,
            size: Some(header.size),
            mtime: header.mtime,
            checksum: header.cksum,
            typeflag: Some(header.typeflag),
            linkname: Some(header.linkname),
            ustar_format: Some(header.magic),
            version: ustar.as_ref().map(|u| u.version.clone()),
            uname: ustar.as_ref().map(|u| u.uname.clone()),
            gname: ustar.as_ref().map(|u| u.gname.clone()),
            devmajor: ustar.as_ref().and_then(|u| u.dev_major),
            devminor: ustar.as_ref().and_then(|u| u.dev_minor),
            name_prefix: ustar.map(|u| u.prefix),
            extensions: BTreeMap::new(),
            buffer,
        }
    }

    /// Applies a single PAX record. Keys name the entry's fields the way
    /// they are spelled in the header model (`namePrefix`, `ustarFormat`).
    pub(crate) fn apply_record(&mut self, record: &PaxRecord) {
        let key = record.name();
        match key {
            "name" => set_text(&mut self.name, record),
            "linkname" => set_text(&mut self.linkname, record),
            "mode" => set_text(&mut self.mode, record),
            "uname" => set_text(&mut self.uname, record),
            "gname" => set_text(&mut self.gname, record),
            "version" => set_text(&mut self.version, record),
            "ustarFormat" => set_text(&mut self.ustar_format, record),
            "namePrefix" => set_text(&mut self.name_prefix, record),
            "checksum" => set_number(&mut self.checksum, &mut self.extensions, record),
            "type" => match (record.value(), record.raw_value().as_bytes()) {
                (PaxValue::Delete, _) => {
                    self.typeflag = None;
                    self.extensions.remove(key);
                }
                (_, &[byte]) => {
                    self.typeflag = Some(TypeFlagRaw::new(byte));
                    self.extensions.remove(key);
                }
                (value, _) => {
                    self.extensions.insert(key.to_string(), value.clone());
                }
            },
            "uid" => set_number(&mut self.uid, &mut self.extensions, record),
            "gid" => set_number(&mut self.gid, &mut self.extensions, record),
            "size" => set_number(&mut self.size, &mut self.extensions, record),
            "mtime" => set_number(&mut self.mtime, &mut self.extensions, record),
            "devmajor" => set_number(&mut self.devmajor, &mut self.extensions, record),
            "devminor" => set_number(&mut self.devminor, &mut self.extensions, record),
            _ => match record.value() {
                PaxValue::Delete => {
                    self.extensions.remove(key);
                }
                value => {
                    self.extensions.insert(key.to_string(), value.clone());
                }
            },
        }
    }

    /// Path of the entry. A PAX `path` record replaces the name and the ustar
    /// prefix.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Octal permission string as found in the header.
    #[must_use]
    pub fn mode(&self) -> Option<&str> {
        self.mode.as_deref()
    }

    /// Interprets [`Self::mode`] as permission bits.
    ///
    /// # Errors
    /// Fails if the mode was deleted, is no octal number or has bits outside
    /// of [`ModeFlags`].
    pub fn mode_flags(&self) -> Result<ModeFlags, ModeError> {
        self.mode.as_deref().map_or(Err(ModeError::Absent), mode_to_flags)
    }

    #[must_use]
    pub const fn uid(&self) -> Option<u64> {
        self.uid
    }

    #[must_use]
    pub const fn gid(&self) -> Option<u64> {
        self.gid
    }

    /// Size in bytes as announced by the header, or as overridden by PAX.
    #[must_use]
    pub const fn size(&self) -> Option<u64> {
        self.size
    }

    /// Modification time in seconds since the epoch.
    #[must_use]
    pub const fn mtime(&self) -> Option<u64> {
        self.mtime
    }

    /// Checksum field, read in base 10.
    #[must_use]
    pub const fn checksum(&self) -> Option<u64> {
        self.checksum
    }

    #[must_use]
    pub const fn typeflag(&self) -> Option<TypeFlagRaw> {
        self.typeflag
    }

    /// Whether the entry is a regular file, i.e., has a payload.
    #[must_use]
    pub fn is_regular_file(&self) -> bool {
        self.typeflag
            .and_then(|flag| flag.try_to_type_flag().ok())
            .is_some_and(TypeFlag::is_regular_file)
    }

    #[must_use]
    pub fn linkname(&self) -> Option<&str> {
        self.linkname.as_deref()
    }

    /// Content of the magic field, `"ustar"` for ustar archives.
    #[must_use]
    pub fn ustar_format(&self) -> Option<&str> {
        self.ustar_format.as_deref()
    }

    #[must_use]
    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    /// Username.
    #[must_use]
    pub fn uname(&self) -> Option<&str> {
        self.uname.as_deref()
    }

    /// Groupname.
    #[must_use]
    pub fn gname(&self) -> Option<&str> {
        self.gname.as_deref()
    }

    #[must_use]
    pub const fn devmajor(&self) -> Option<u64> {
        self.devmajor
    }

    #[must_use]
    pub const fn devminor(&self) -> Option<u64> {
        self.devminor
    }

    /// The ustar prefix as found in the header. It is already part of
    /// [`Self::name`].
    #[must_use]
    pub fn name_prefix(&self) -> Option<&str> {
        self.name_prefix.as_deref()
    }

    /// Value of a PAX record without a dedicated field, or the text of a
    /// record that didn't fit the type of its field (e.g. a fractional
    /// `mtime`).
    #[must_use]
    pub fn extension(&self, key: &str) -> Option<&PaxValue> {
        self.extensions.get(key)
    }

    /// All PAX values without a dedicated field, ordered by key.
    pub fn extensions(&self) -> impl Iterator<Item = (&str, &PaxValue)> {
        self.extensions.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Data of the file. Empty for everything but regular files.
    #[must_use]
    pub fn data(&self) -> &[u8] {
        &self.buffer
    }

    /// Returns the data of the file as `&str`, if it is valid UTF-8.
    ///
    /// # Errors
    /// Returns a [`Utf8Error`] for binary payloads.
    pub fn data_as_str(&self) -> Result<&str, Utf8Error> {
        core::str::from_utf8(&self.buffer)
    }

    /// Consumes the entry and returns the owned payload.
    #[must_use]
    pub fn into_buffer(self) -> Vec<u8> {
        self.buffer
    }
}

impl Debug for Entry {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Entry")
            .field("name", &self.name)
            .field("mode", &self.mode)
            .field("uid", &self.uid)
            .field("gid", &self.gid)
            .field("size", &self.size)
            .field("mtime", &self.mtime)
            .field("typeflag", &self.typeflag)
            .field("linkname", &self.linkname)
            .field("ustar_format", &self.ustar_format)
            .field("uname", &self.uname)
            .field("gname", &self.gname)
            .field("extensions", &self.extensions)
            .field("data", &"<bytes>")
            .finish()
    }
}

fn set_text(field: &mut Option<String>, record: &PaxRecord) {
    *field = match record.value() {
        PaxValue::Delete => None,
        _ => Some(record.raw_value().to_string()),
    };
}

/// Text that is no integer is kept as extension, the typed field stays.
fn set_number(
    field: &mut Option<u64>,
    extensions: &mut BTreeMap<String, PaxValue>,
    record: &PaxRecord,
) {
    match record.value() {
        PaxValue::Delete => {
            *field = None;
            extensions.remove(record.name());
        }
        PaxValue::Integer(n) => {
            *field = Some(*n);
            extensions.remove(record.name());
        }
        value @ PaxValue::Text(_) => {
            extensions.insert(record.name().to_string(), value.clone());
        }
    }
}
