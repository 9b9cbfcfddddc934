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
//! UTF-8 decoding for PAX extended header records.
//!
//! Only the PAX records are UTF-8. The fixed-width header fields are decoded
//! byte by byte by [`crate::ByteCursor::read_fixed_text`].

use alloc::string::String;
use core::fmt::{Display, Formatter};

/// Errors of [`decode_utf8`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Utf8DecodeError {
    /// The input ended before all continuation bytes of a `len`-byte sequence
    /// starting at `index` were read.
    IncompleteSequence { len: usize, index: usize },
    /// `byte` at `index` does not start any UTF-8 sequence.
    UnknownLeadByte { byte: u8, index: usize },
    /// The decoded value lies above U+10FFFF.
    CodePointOutOfRange { code_point: u32 },
    /// The decoded value is a UTF-16 surrogate, which is no scalar value.
    Surrogate { code_point: u32 },
}

impl Display for Utf8DecodeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::IncompleteSequence { len, index } => {
                write!(f, "incomplete {len}-byte sequence at index {index}")
            }
            Self::UnknownLeadByte { byte, index } => {
                write!(f, "unknown multibyte start {byte:#x} at index {index}")
            }
            Self::CodePointOutOfRange { code_point } => {
                write!(f, "code point {code_point:#x} exceeds the unicode range")
            }
            Self::Surrogate { code_point } => {
                write!(f, "code point {code_point:#x} is a surrogate")
            }
        }
    }
}

impl core::error::Error for Utf8DecodeError {}

/// Decodes `bytes` as UTF-8.
///
/// The sequence length is taken from the class of the lead byte
/// (`0xC0..=0xDF` two bytes, `0xE0..=0xEF` three, `0xF0..=0xF7` four).
/// Continuation bytes contribute their low six bits.
///
/// # Errors
/// Fails if a sequence is cut off by the end of the input, if a byte cannot
/// start a sequence, or if the decoded value is not a unicode scalar value.
pub fn decode_utf8(bytes: &[u8]) -> Result<String, Utf8DecodeError> {
    let mut text = String::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        let lead = bytes[i];
        let (len, initial) = match lead {
            0x00..=0x7f => (1, u32::from(lead)),
            0xc0..=0xdf => (2, u32::from(lead & 0x1f)),
            0xe0..=0xef => (3, u32::from(lead & 0x0f)),
            0xf0..=0xf7 => (4, u32::from(lead & 0x07)),
            byte => return Err(Utf8DecodeError::UnknownLeadByte { byte, index: i }),
        };
        let continuation = bytes
            .get(i + 1..i + len)
            .ok_or(Utf8DecodeError::IncompleteSequence { len, index: i })?;
        let code_point = continuation
            .iter()
            .fold(initial, |acc, &b| (acc << 6) | u32::from(b & 0x3f));

        if code_point > 0x10_ffff {
            return Err(Utf8DecodeError::CodePointOutOfRange { code_point });
        }
        let c = char::from_u32(code_point).ok_or(Utf8DecodeError::Surrogate { code_point })?;
        text.push(c);
        i += len;
    }
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ascii() {
        assert_eq!(decode_utf8(b"30 mtime=1350244992.023960108\n").unwrap(), "30 mtime=1350244992.023960108\n");
        assert_eq!(decode_utf8(b"").unwrap(), "");
    }

    #[test]
    fn test_multibyte() {
        // 2, 3 and 4 byte sequences
        assert_eq!(decode_utf8("ü".as_bytes()).unwrap(), "ü");
        assert_eq!(decode_utf8("辞書.dic".as_bytes()).unwrap(), "辞書.dic");
        let emoji = decode_utf8(&[0xf0, 0x9f, 0x93, 0x96]).unwrap();
        assert_eq!(emoji, "\u{1f4d6}");
        // above U+FFFF: two UTF-16 units
        assert_eq!(emoji.encode_utf16().count(), 2);
    }

    #[test]
    fn test_truncated_three_byte_sequence() {
        let bytes = "x辞".as_bytes();
        let err = decode_utf8(&bytes[..bytes.len() - 1]).unwrap_err();
        assert_eq!(err, Utf8DecodeError::IncompleteSequence { len: 3, index: 1 });
        assert_eq!(
            std::format!("{err}"),
            "incomplete 3-byte sequence at index 1"
        );
    }

    #[test]
    fn test_truncated_two_and_four_byte_sequences() {
        assert_eq!(
            decode_utf8(&[0xc3]),
            Err(Utf8DecodeError::IncompleteSequence { len: 2, index: 0 })
        );
        assert_eq!(
            decode_utf8(&[b'a', 0xf0, 0x9f, 0x93]),
            Err(Utf8DecodeError::IncompleteSequence { len: 4, index: 1 })
        );
    }

    #[test]
    fn test_unknown_lead_byte() {
        // a lone continuation byte
        assert_eq!(
            decode_utf8(&[b'a', 0x80]),
            Err(Utf8DecodeError::UnknownLeadByte { byte: 0x80, index: 1 })
        );
        assert_eq!(
            decode_utf8(&[0xff]),
            Err(Utf8DecodeError::UnknownLeadByte { byte: 0xff, index: 0 })
        );
    }

    #[test]
    fn test_out_of_range_and_surrogates() {
        assert_eq!(
            decode_utf8(&[0xf7, 0xbf, 0xbf, 0xbf]),
            Err(Utf8DecodeError::CodePointOutOfRange {
                code_point: 0x1f_ffff
            })
        );
        assert_eq!(
            decode_utf8(&[0xed, 0xa0, 0x80]),
            Err(Utf8DecodeError::Surrogate { code_point: 0xd800 })
        );
    }
}
