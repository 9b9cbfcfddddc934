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
//! Module for [`ExtendedHeaderSet`], the records of a PAX extended header.
//!
//! The body of an extended header is a sequence of records
//! `"%d %s=%s\n", <length>, <keyword>, <value>`, where `<length>` is the
//! decimal length of the whole record in bytes, including the trailing
//! newline. Records are UTF-8.
//!
//! See <https://pubs.opengroup.org/onlinepubs/9699919799/utilities/pax.html#tag_20_92_13_03>.

use crate::entry::Entry;
use crate::error::PaxError;
use crate::utf8::decode_utf8;
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::fmt::{Display, Formatter};

/// Value of a PAX record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaxValue {
    /// The value was empty: the field is deleted from the entry.
    Delete,
    /// The value consists of decimal digits only and fits into a `u64`.
    Integer(u64),
    /// Any other value. Fractional numbers such as `mtime=1350244992.023960108`
    /// stay text so no precision is lost.
    Text(String),
}

impl Display for PaxValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Delete => Ok(()),
            Self::Integer(n) => write!(f, "{n}"),
            Self::Text(text) => f.write_str(text),
        }
    }
}

/// One `key=value` record of an extended header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaxRecord {
    name: String,
    value: PaxValue,
    raw_value: String,
}

impl PaxRecord {
    /// Creates a record from its key and the value text.
    ///
    /// `path` is stored as `name` and `linkpath` as `linkname`, as these
    /// override the respective header fields (including the ustar prefix).
    #[must_use]
    pub fn new(key: &str, raw_value: &str) -> Self {
        let name = match key {
            "path" => "name",
            "linkpath" => "linkname",
            key => key,
        };
        let value = if raw_value.is_empty() {
            PaxValue::Delete
        } else if raw_value.bytes().all(|b| b.is_ascii_digit()) {
            raw_value
                .parse::<u64>()
                .map_or_else(|_| PaxValue::Text(raw_value.to_string()), PaxValue::Integer)
        } else {
            PaxValue::Text(raw_value.to_string())
        };
        Self {
            name: name.to_string(),
            value,
            raw_value: raw_value.to_string(),
        }
    }

    /// The field name the record targets, after remapping.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub const fn value(&self) -> &PaxValue {
        &self.value
    }

    /// The value exactly as written in the record.
    #[must_use]
    pub fn raw_value(&self) -> &str {
        &self.raw_value
    }
}

/// Ordered records parsed from the body of one `g` or `x` block.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtendedHeaderSet {
    records: Vec<PaxRecord>,
}

impl ExtendedHeaderSet {
    /// Parses all records of an extended header body.
    ///
    /// # Errors
    /// Fails on the first record that has no valid length prefix, is no valid
    /// UTF-8 or does not match `"<length> <key>=<value>\n"`.
    pub fn parse(bytes: &[u8]) -> Result<Self, PaxError> {
        let mut records = Vec::new();
        let mut offset = 0;

        while offset < bytes.len() {
            let rest = &bytes[offset..];
            let space = memchr::memchr(b' ', rest).ok_or(PaxError::MissingLength { offset })?;
            let length_text =
                decode_utf8(&rest[..space]).map_err(|source| PaxError::Utf8 { offset, source })?;
            let length = parse_record_length(&length_text)
                .filter(|&length| length > space && length <= rest.len())
                .ok_or_else(|| PaxError::InvalidLength {
                    offset,
                    text: length_text.clone(),
                })?;

            let record_text = decode_utf8(&rest[..length])
                .map_err(|source| PaxError::Utf8 { offset, source })?;
            let (key, value) =
                split_record(&record_text).ok_or(PaxError::MalformedRecord { offset })?;
            log::trace!("PAX record at offset {offset}: {key}={value}");
            records.push(PaxRecord::new(key, value));

            offset += length;
        }

        Ok(Self { records })
    }

    /// Applies all records onto `entry`, in order. A [`PaxValue::Delete`]
    /// removes the field, any other value sets or overwrites it.
    pub fn apply(&self, entry: &mut Entry) {
        for record in &self.records {
            entry.apply_record(record);
        }
    }

    /// Appends the records of `other`, which then take precedence on
    /// conflicting keys when applied.
    pub fn extend(&mut self, other: Self) {
        self.records.extend(other.records);
    }

    #[must_use]
    pub fn records(&self) -> &[PaxRecord] {
        &self.records
    }

    /// Returns the value of the last record for `name`, the one that wins.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&PaxValue> {
        self.records
            .iter()
            .rev()
            .find(|record| record.name == name)
            .map(PaxRecord::value)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Decimal digits only.
fn parse_record_length(text: &str) -> Option<usize> {
    if text.is_empty() || !text.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    text.parse().ok()
}

/// Splits `"<length> <key>=<value>\n"` into key and value. The key is
/// non-empty and ends at the first `=`, the value holds no line break.
fn split_record(text: &str) -> Option<(&str, &str)> {
    let (_, key_value) = text.split_once(' ')?;
    let key_value = key_value.strip_suffix('\n')?;
    let (key, value) = key_value.split_once('=')?;
    if key.is_empty() || value.contains(['\n', '\r', '\u{2028}', '\u{2029}']) {
        return None;
    }
    Some((key, value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{pax_body, pax_record};
    use crate::utf8::Utf8DecodeError;

    #[test]
    fn test_parse_records() {
        let body = pax_body(&[
            ("path", "some/very/long/path/to/system.dic"),
            ("mtime", "1350244992.023960108"),
            ("uid", "1000"),
            ("uname", "辞書"),
        ]);
        let set = ExtendedHeaderSet::parse(&body).unwrap();
        assert_eq!(set.len(), 4);
        assert_eq!(set.records()[0].name(), "name");
        assert_eq!(
            set.get("name"),
            Some(&PaxValue::Text("some/very/long/path/to/system.dic".into()))
        );
        assert_eq!(
            set.get("mtime"),
            Some(&PaxValue::Text("1350244992.023960108".into()))
        );
        assert_eq!(set.get("uid"), Some(&PaxValue::Integer(1000)));
        assert_eq!(set.get("uname"), Some(&PaxValue::Text("辞書".into())));
        assert_eq!(set.get("path"), None);
    }

    #[test]
    fn test_record_length_counts_bytes() {
        assert_eq!(pax_record("uid", "1000"), b"12 uid=1000\n".to_vec());
        // 9 + 3 + "uname" + "辞書" (6 bytes)
        let record = pax_record("uname", "辞書");
        assert_eq!(record, "16 uname=辞書\n".as_bytes().to_vec());
        assert!(ExtendedHeaderSet::parse(&record).is_ok());
    }

    #[test]
    fn test_value_typing() {
        assert_eq!(PaxRecord::new("uname", "").value(), &PaxValue::Delete);
        assert_eq!(PaxRecord::new("size", "42").value(), &PaxValue::Integer(42));
        assert_eq!(
            PaxRecord::new("size", "99999999999999999999999").value(),
            &PaxValue::Text("99999999999999999999999".into())
        );
        assert_eq!(
            PaxRecord::new("comment", "-1").value(),
            &PaxValue::Text("-1".into())
        );
        let record = PaxRecord::new("linkpath", "007");
        assert_eq!(record.name(), "linkname");
        assert_eq!(record.value(), &PaxValue::Integer(7));
        assert_eq!(record.raw_value(), "007");
    }

    #[test]
    fn test_value_may_contain_equals_and_spaces() {
        let set = ExtendedHeaderSet::parse(b"27 comment=a = b, c d == e\n").unwrap();
        assert_eq!(set.get("comment"), Some(&PaxValue::Text("a = b, c d == e".into())));
    }

    #[test]
    fn test_missing_equals() {
        let mut body = pax_body(&[("uid", "1")]);
        let offset = body.len();
        body.extend_from_slice(b"11 uname_x\n");
        assert_eq!(
            ExtendedHeaderSet::parse(&body),
            Err(PaxError::MalformedRecord { offset })
        );
    }

    #[test]
    fn test_missing_newline_and_empty_key() {
        assert_eq!(
            ExtendedHeaderSet::parse(b"11 uname=ab "),
            Err(PaxError::MalformedRecord { offset: 0 })
        );
        assert_eq!(
            ExtendedHeaderSet::parse(b"6 =ab\n"),
            Err(PaxError::MalformedRecord { offset: 0 })
        );
    }

    #[test]
    fn test_invalid_lengths() {
        assert_eq!(
            ExtendedHeaderSet::parse(b"12uname=ab\n"),
            Err(PaxError::MissingLength { offset: 0 })
        );
        assert_eq!(
            ExtendedHeaderSet::parse(b"0 a=b\n"),
            Err(PaxError::InvalidLength {
                offset: 0,
                text: "0".into()
            })
        );
        assert_eq!(
            ExtendedHeaderSet::parse(b"99 a=b\n"),
            Err(PaxError::InvalidLength {
                offset: 0,
                text: "99".into()
            })
        );
        assert_eq!(
            ExtendedHeaderSet::parse(b"x6 a=b\n"),
            Err(PaxError::InvalidLength {
                offset: 0,
                text: "x6".into()
            })
        );
    }

    #[test]
    fn test_invalid_utf8() {
        // 3-byte sequence cut off by the end of the record
        assert_eq!(
            ExtendedHeaderSet::parse(b"6 k=\xe8\n"),
            Err(PaxError::Utf8 {
                offset: 0,
                source: Utf8DecodeError::IncompleteSequence { len: 3, index: 4 }
            })
        );

        let mut body = pax_body(&[("a", "b")]);
        let offset = body.len();
        body.extend_from_slice(b"6 k=\xff\n");
        assert_eq!(
            ExtendedHeaderSet::parse(&body),
            Err(PaxError::Utf8 {
                offset,
                source: Utf8DecodeError::UnknownLeadByte {
                    byte: 0xff,
                    index: 4
                }
            })
        );
    }

    #[test]
    fn test_empty_body() {
        assert!(ExtendedHeaderSet::parse(b"").unwrap().is_empty());
    }

    #[test]
    fn test_extend_last_wins() {
        let mut set = ExtendedHeaderSet::parse(&pax_body(&[("uname", "g")])).unwrap();
        set.extend(ExtendedHeaderSet::parse(&pax_body(&[("uname", "e")])).unwrap());
        assert_eq!(set.len(), 2);
        assert_eq!(set.get("uname"), Some(&PaxValue::Text("e".into())));
    }
}
