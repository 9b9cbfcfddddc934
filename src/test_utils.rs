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
//! Builds Tar archives in memory for the tests.

use crate::BLOCKSIZE;
use std::format;
use std::string::ToString;
use std::vec::Vec;

/// Initializes `env_logger` once, so `RUST_LOG=trace cargo test` shows the
/// parser's log output.
pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Header fields of one entry. Numbers are written in octal, as tar does.
#[derive(Debug, Clone, Copy)]
pub struct HeaderSpec<'a> {
    pub name: &'a str,
    pub mode: &'a str,
    pub uid: u64,
    pub gid: u64,
    pub mtime: u64,
    pub typeflag: u8,
    pub linkname: &'a str,
    pub ustar: bool,
    pub uname: &'a str,
    pub gname: &'a str,
    pub dev_major: u64,
    pub dev_minor: u64,
    pub prefix: &'a str,
}

impl<'a> HeaderSpec<'a> {
    /// A regular file in a ustar archive.
    pub const fn file(name: &'a str) -> Self {
        Self {
            name,
            mode: "0000644",
            uid: 0o1750,
            gid: 0o144,
            mtime: 0o14_000_000_000,
            typeflag: b'0',
            linkname: "",
            ustar: true,
            uname: "user",
            gname: "users",
            dev_major: 0,
            dev_minor: 0,
            prefix: "",
        }
    }
}

fn put(block: &mut [u8], offset: usize, bytes: &[u8]) {
    block[offset..offset + bytes.len()].copy_from_slice(bytes);
}

/// Sum of all header bytes, with the checksum field taken as spaces.
pub fn checksum(block: &[u8]) -> u64 {
    block
        .iter()
        .enumerate()
        .map(|(i, &b)| {
            if (148..156).contains(&i) {
                u64::from(b' ')
            } else {
                u64::from(b)
            }
        })
        .sum()
}

pub fn header_block(spec: &HeaderSpec<'_>, size: u64) -> [u8; BLOCKSIZE] {
    let mut block = [0; BLOCKSIZE];
    put(&mut block, 0, spec.name.as_bytes());
    put(&mut block, 100, spec.mode.as_bytes());
    put(&mut block, 108, format!("{:07o}", spec.uid).as_bytes());
    put(&mut block, 116, format!("{:07o}", spec.gid).as_bytes());
    put(&mut block, 124, format!("{size:011o}").as_bytes());
    put(&mut block, 136, format!("{:011o}", spec.mtime).as_bytes());
    block[156] = spec.typeflag;
    put(&mut block, 157, spec.linkname.as_bytes());
    if spec.ustar {
        put(&mut block, 257, b"ustar\0");
        put(&mut block, 263, b"00");
        put(&mut block, 265, spec.uname.as_bytes());
        put(&mut block, 297, spec.gname.as_bytes());
        put(&mut block, 329, format!("{:07o}", spec.dev_major).as_bytes());
        put(&mut block, 337, format!("{:07o}", spec.dev_minor).as_bytes());
        put(&mut block, 345, spec.prefix.as_bytes());
    }
    let sum = checksum(&block);
    put(&mut block, 148, format!("{sum:06o}\0 ").as_bytes());
    block
}

/// Formats one PAX record; the length prefix counts itself.
pub fn pax_record(key: &str, value: &str) -> Vec<u8> {
    // ' ', '=' and '\n'
    let payload_len = key.len() + value.len() + 3;
    let mut len = payload_len + 1;
    loop {
        let total = payload_len + len.to_string().len();
        if total == len {
            break;
        }
        len = total;
    }
    format!("{len} {key}={value}\n").into_bytes()
}

pub fn pax_body(records: &[(&str, &str)]) -> Vec<u8> {
    records
        .iter()
        .flat_map(|(key, value)| pax_record(key, value))
        .collect()
}

#[derive(Debug, Default)]
pub struct TarBuilder {
    data: Vec<u8>,
}

impl TarBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn file(self, name: &str, body: &[u8]) -> Self {
        self.entry(HeaderSpec::file(name), body)
    }

    /// Appends a header with the size of `body`, then `body` padded to the
    /// next block.
    pub fn entry(mut self, spec: HeaderSpec<'_>, body: &[u8]) -> Self {
        self.data
            .extend_from_slice(&header_block(&spec, body.len() as u64));
        self.data.extend_from_slice(body);
        let padding = body.len().div_ceil(BLOCKSIZE) * BLOCKSIZE - body.len();
        self.data.resize(self.data.len() + padding, 0);
        self
    }

    pub fn pax_global(self, records: &[(&str, &str)]) -> Self {
        self.extended_raw(b'g', &pax_body(records))
    }

    pub fn pax_local(self, records: &[(&str, &str)]) -> Self {
        self.extended_raw(b'x', &pax_body(records))
    }

    /// An extended header block of type `typeflag` with an arbitrary body.
    pub fn extended_raw(self, typeflag: u8, body: &[u8]) -> Self {
        let name = if typeflag == b'g' {
            "pax_global_header"
        } else {
            "PaxHeaders.0/entry"
        };
        self.entry(
            HeaderSpec {
                typeflag,
                ..HeaderSpec::file(name)
            },
            body,
        )
    }

    /// The archive, terminated by two zero blocks.
    pub fn finish(mut self) -> Vec<u8> {
        self.data.resize(self.data.len() + 2 * BLOCKSIZE, 0);
        self.data
    }

    pub fn finish_without_terminator(self) -> Vec<u8> {
        self.data
    }
}
