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
//! Interpretation of the numeric text fields of a Tar header.

use crate::error::TarError;
use alloc::string::ToString;

/// A number stored as ASCII text in a Tar header field, with radix `R`.
/// Leading spaces are skipped and the number ends at the first trailing
/// space, since some ustar implementations pad numbers with spaces.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) struct TarFormatNumber<'a, const R: u32>(&'a str);

/// An octal number. Trailing spaces in the string are ignored.
pub(crate) type TarFormatOctal<'a> = TarFormatNumber<'a, 8>;

/// A decimal number. Trailing spaces in the string are ignored.
pub(crate) type TarFormatDecimal<'a> = TarFormatNumber<'a, 10>;

impl<'a, const R: u32> TarFormatNumber<'a, R> {
    pub(crate) const fn new(text: &'a str) -> Self {
        Self(text)
    }

    /// The digits of the field without surrounding padding.
    fn digits(&self) -> &'a str {
        let str = self.0.trim_start_matches(' ');
        let end_index_exclusive = str.find(' ').unwrap_or(str.len());
        &str[0..end_index_exclusive]
    }

    /// Interprets the underlying value as a number of the specified type using
    /// its respective radix. An empty field reads as zero.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying value cannot be parsed as a number
    /// of the specified type and respective radix.
    pub(crate) fn as_number<T>(&self) -> core::result::Result<T, T::FromStrRadixErr>
    where
        T: num_traits::Num,
    {
        match self.digits() {
            "" => Ok(T::zero()),
            str => T::from_str_radix(str, R),
        }
    }

    /// Like [`Self::as_number`], but reports failures as
    /// [`TarError::InvalidNumber`] for the header field `field`.
    pub(crate) fn parse_field<T>(&self, field: &'static str) -> Result<T, TarError>
    where
        T: num_traits::Num,
    {
        self.as_number::<T>().map_err(|_| TarError::InvalidNumber {
            field,
            text: self.0.to_string(),
        })
    }

    /// Reads the leading digits of the field and ignores whatever follows.
    /// Returns `None` if the field doesn't start with a digit (after
    /// whitespace), e.g. for GNU base-256 numbers, or if the value overflows.
    pub(crate) fn leading_number<T>(&self) -> Option<T>
    where
        T: num_traits::Num,
    {
        let str = self.0.trim_start();
        let end_index_exclusive = str
            .find(|c: char| !c.is_digit(R))
            .unwrap_or(str.len());
        match &str[0..end_index_exclusive] {
            "" => None,
            digits => T::from_str_radix(digits, R).ok(),
        }
    }
}
