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
//! TAR header definition taken from <https://www.gnu.org/software/tar/manual/html_node/Standard.html>.
//! A Tar-archive is a collection of 512-byte sized blocks. Unfortunately there are several
//! TAR-like archive specifications. An Overview can be found here:
//! <https://www.gnu.org/software/tar/manual/html_node/Formats.html#Formats>
//!
//! The header block is decoded field by field: the v7 part is always present,
//! the ustar part only if the magic field says so.

#![allow(non_upper_case_globals)]

use crate::cursor::ByteCursor;
use crate::error::TarError;
use crate::tar_format_types::{TarFormatDecimal, TarFormatOctal};
use crate::{BLOCKSIZE, NAME_LEN, PREFIX_LEN};
use alloc::format;
use alloc::string::String;
use core::fmt::{Debug, Display, Formatter};
use core::num::ParseIntError;

/// Errors that may happen when parsing the [`ModeFlags`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModeError {
    /// The mode was deleted by a PAX header.
    Absent,
    ParseInt(ParseIntError),
    IllegalMode,
}

impl Display for ModeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Absent => f.write_str("entry has no mode"),
            Self::ParseInt(e) => write!(f, "mode is not an octal number: {e}"),
            Self::IllegalMode => f.write_str("mode has bits outside of the permission bits"),
        }
    }
}

impl core::error::Error for ModeError {}

/// Parses the [`ModeFlags`] from an octal mode string.
pub(crate) fn mode_to_flags(mode: &str) -> Result<ModeFlags, ModeError> {
    let bits = TarFormatOctal::new(mode)
        .as_number::<u64>()
        .map_err(ModeError::ParseInt)?;
    ModeFlags::from_bits(bits).ok_or(ModeError::IllegalMode)
}

/// Fields of the ustar extension, present if the magic field contains
/// `"ustar"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UstarHeader {
    pub version: String,
    /// Username.
    pub uname: String,
    /// Groupname.
    pub gname: String,
    /// `None` if the field holds no digits.
    pub dev_major: Option<u64>,
    pub dev_minor: Option<u64>,
    /// Directory part of long names. Empty if unused.
    pub prefix: String,
}

/// Decoded header block of the TAR format as specified by POSIX
/// (POSIX 1003.1-1990), optionally with the ustar extension.
///
/// Each file is started by such a header, that describes the size and
/// the file name. After that, the file content stands in chunks of 512 bytes.
/// The number of bytes can be derived from the file size.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PosixHeader {
    pub name: String,
    /// Octal permission string, kept as text.
    pub mode: String,
    // decimal, although tar writes octal
    pub uid: Option<u64>,
    pub gid: Option<u64>,
    pub size: u64,
    pub mtime: Option<u64>,
    pub cksum: Option<u64>,
    pub typeflag: TypeFlagRaw,
    pub linkname: String,
    pub magic: String,
    pub ustar: Option<UstarHeader>,
}

impl PosixHeader {
    /// Decodes the header block starting at the cursor position. The cursor is
    /// left behind the last decoded field, not at the end of the block.
    ///
    /// Numeric fields other than `size` are read up to the first non-digit and
    /// are `None` if they don't start with a digit (e.g. GNU base-256 values).
    ///
    /// # Errors
    /// Fails if the block is cut off by the end of the buffer or if the size
    /// field holds no octal number.
    pub fn read(cursor: &mut ByteCursor<'_>) -> Result<Self, TarError> {
        let name = cursor.read_fixed_text(NAME_LEN)?;
        let mode = cursor.read_fixed_text(8)?;
        let uid = TarFormatDecimal::new(&cursor.read_fixed_text(8)?).leading_number::<u64>();
        let gid = TarFormatDecimal::new(&cursor.read_fixed_text(8)?).leading_number::<u64>();
        // the payload offsets depend on the size, so it has to be valid
        let size = TarFormatOctal::new(&cursor.read_fixed_text(12)?).parse_field::<u64>("size")?;
        let mtime = TarFormatOctal::new(&cursor.read_fixed_text(12)?).leading_number::<u64>();
        let cksum = TarFormatDecimal::new(&cursor.read_fixed_text(8)?).leading_number::<u64>();
        let typeflag = TypeFlagRaw(cursor.read_bytes(1)?[0]);
        let linkname = cursor.read_fixed_text(NAME_LEN)?;
        let magic = cursor.read_fixed_text(6)?;

        let ustar = if magic.contains("ustar") {
            Some(UstarHeader {
                version: cursor.read_fixed_text(2)?,
                uname: cursor.read_fixed_text(32)?,
                gname: cursor.read_fixed_text(32)?,
                dev_major: TarFormatDecimal::new(&cursor.read_fixed_text(8)?).leading_number::<u64>(),
                dev_minor: TarFormatDecimal::new(&cursor.read_fixed_text(8)?).leading_number::<u64>(),
                prefix: cursor.read_fixed_text(PREFIX_LEN)?,
            })
        } else {
            None
        };

        Ok(Self {
            name,
            mode,
            uid,
            gid,
            size,
            mtime,
            cksum,
            typeflag,
            linkname,
            magic,
            ustar,
        })
    }

    /// The name joined with the ustar prefix, if there is a non-empty one.
    #[must_use]
    pub fn full_name(&self) -> String {
        match &self.ustar {
            Some(ustar) if !ustar.prefix.is_empty() => format!("{}/{}", ustar.prefix, self.name),
            _ => self.name.clone(),
        }
    }

    /// Returns the number of blocks that are required to hold the payload
    /// announced by the size field.
    #[must_use]
    pub fn payload_block_count(&self) -> u64 {
        self.size.div_ceil(BLOCKSIZE as u64)
    }
}

#[derive(Copy, Clone, Debug, PartialOrd, PartialEq, Eq)]
pub struct InvalidTypeFlagError(u8);

impl Display for InvalidTypeFlagError {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        f.write_fmt(format_args!("{:x} is not a valid TypeFlag", self.0))
    }
}

impl core::error::Error for InvalidTypeFlagError {}

/// The raw type flag byte of a header, which may hold values this crate has
/// no [`TypeFlag`] for.
#[derive(Copy, Clone, PartialOrd, PartialEq, Eq)]
pub struct TypeFlagRaw(u8);

impl TypeFlagRaw {
    #[must_use]
    pub const fn new(byte: u8) -> Self {
        Self(byte)
    }

    #[must_use]
    pub const fn as_byte(self) -> u8 {
        self.0
    }

    /// Tries to parse the underlying value as [`TypeFlag`]. This fails for
    /// type flags this crate doesn't know.
    pub fn try_to_type_flag(self) -> Result<TypeFlag, InvalidTypeFlagError> {
        TypeFlag::try_from(self)
    }
}

impl Debug for TypeFlagRaw {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        Debug::fmt(&self.try_to_type_flag(), f)
    }
}

/// The type flag as single-character text. A NULL byte is the empty string.
impl Display for TypeFlagRaw {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        match self.0 {
            0 => Ok(()),
            byte => write!(f, "{}", char::from(byte)),
        }
    }
}

/// Describes the kind of payload, that follows after a
/// [`PosixHeader`]. The properties of this payload are
/// described inside the header.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[repr(u8)]
#[allow(unused)]
pub enum TypeFlag {
    /// Represents a regular file. In order to be compatible with older versions of tar, a typeflag
    /// value of AREGTYPE should be silently recognized as a regular file. New archives should be
    /// created using REGTYPE.
    REGTYPE = b'0',
    /// Legacy spelling of [`TypeFlag::REGTYPE`].
    AREGTYPE = b'\0',
    /// This flag represents a file linked to another file, of any type, previously archived. The
    /// linked-to name is specified in the linkname field.
    LINK = b'1',
    /// This represents a symbolic link to another file. The linked-to name is specified in the
    /// linkname field.
    SYMTYPE = b'2',
    /// Character special file. The devmajor and devminor fields contain the device numbers.
    CHRTYPE = b'3',
    /// Block special file. The devmajor and devminor fields contain the device numbers.
    BLKTYPE = b'4',
    /// This flag specifies a directory or sub-directory. The size field is ignored.
    DIRTYPE = b'5',
    /// This specifies a FIFO special file. Note that the archiving of a FIFO file archives the
    /// existence of this file and not its contents.
    FIFOTYPE = b'6',
    /// Reserved. Contiguous files in some implementations; no payload is read for it.
    CONTTYPE = b'7',
    /// Extended header referring to the next file in the archive
    XHDTYPE = b'x',
    /// Global extended header
    XGLTYPE = b'g',
}

impl TypeFlag {
    /// Whether we have a regular file.
    #[must_use]
    pub fn is_regular_file(self) -> bool {
        self == Self::AREGTYPE || self == Self::REGTYPE
    }

    /// Whether the block only carries PAX records for following entries.
    #[must_use]
    pub fn is_extended_header(self) -> bool {
        self == Self::XHDTYPE || self == Self::XGLTYPE
    }
}

impl TryFrom<TypeFlagRaw> for TypeFlag {
    type Error = InvalidTypeFlagError;

    fn try_from(value: TypeFlagRaw) -> Result<Self, Self::Error> {
        match value.0 {
            b'0' => Ok(Self::REGTYPE),
            b'\0' => Ok(Self::AREGTYPE),
            b'1' => Ok(Self::LINK),
            b'2' => Ok(Self::SYMTYPE),
            b'3' => Ok(Self::CHRTYPE),
            b'4' => Ok(Self::BLKTYPE),
            b'5' => Ok(Self::DIRTYPE),
            b'6' => Ok(Self::FIFOTYPE),
            b'7' => Ok(Self::CONTTYPE),
            b'x' => Ok(Self::XHDTYPE),
            b'g' => Ok(Self::XGLTYPE),
            e => Err(InvalidTypeFlagError(e)),
        }
    }
}

bitflags::bitflags! {
    /// UNIX file permissions in octal format.
    #[repr(transparent)]
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ModeFlags: u64 {
        /// Set UID on execution.
        const SetUID = 0o4000;
        /// Set GID on execution.
        const SetGID = 0o2000;
        /// Reserved.
        const TSVTX = 0o1000;
        /// Owner read.
        const OwnerRead = 0o400;
        /// Owner write.
        const OwnerWrite = 0o200;
        /// Owner execute.
        const OwnerExec = 0o100;
        /// Group read.
        const GroupRead = 0o040;
        /// Group write.
        const GroupWrite = 0o020;
        /// Group execute.
        const GroupExec = 0o010;
        /// Others read.
        const OthersRead = 0o004;
        /// Others read.
        const OthersWrite = 0o002;
        /// Others execute.
        const OthersExec = 0o001;
    }
}
