//! Cursor-based parser over a borrowed byte slice.
//!
//! [`Parser`] is the workhorse for every variable-length structure in this crate: the metadata
//! header, signature blobs and custom attribute blobs. All reads are bounds-checked and the
//! compressed integer forms of ECMA-335 II.23.2 are supported natively.
//!
//! # Example
//!
//! ```rust
//! use dotmeta::file::parser::Parser;
//!
//! let data = [0x0C, 0x80, 0x95, 0x01];
//! let mut parser = Parser::new(&data);
//! assert_eq!(parser.read_compressed_uint()?, 0x0C);
//! assert_eq!(parser.read_compressed_uint()?, 0x95);
//! assert_eq!(parser.read_le::<u8>()?, 0x01);
//! # Ok::<(), dotmeta::Error>(())
//! ```

use crate::{
    file::io::{read_le_at, CilIO},
    metadata::{tables::CodedIndexType, token::Token},
    Error::OutOfBounds,
    Result,
};

/// A binary data parser for reading .NET metadata structures.
///
/// The parser maintains an internal position and validates every access, so truncated or
/// malformed input results in [`crate::Error::OutOfBounds`] or [`crate::Error::Malformed`]
/// instead of a panic.
pub struct Parser<'a> {
    data: &'a [u8],
    position: usize,
}

impl<'a> Parser<'a> {
    /// Create a new [`Parser`] positioned at the start of `data`
    #[must_use]
    pub fn new(data: &'a [u8]) -> Self {
        Parser { data, position: 0 }
    }

    /// Returns the length of the underlying data buffer.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns `true` if the parser has no data.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Returns `true` if there is at least one unread byte
    #[must_use]
    pub fn has_more_data(&self) -> bool {
        self.position < self.data.len()
    }

    /// Number of bytes left after the current position
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.position)
    }

    /// Move to an absolute position. Seeking to the end of the data is allowed.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if `pos` lies past the end of the data
    pub fn seek(&mut self, pos: usize) -> Result<()> {
        if pos > self.data.len() {
            return Err(OutOfBounds);
        }

        self.position = pos;
        Ok(())
    }

    /// Move forward by one byte
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] at the end of the data
    pub fn advance(&mut self) -> Result<()> {
        self.advance_by(1)
    }

    /// Move forward by `step` bytes
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if this would move past the end of the data
    pub fn advance_by(&mut self, step: usize) -> Result<()> {
        match self.position.checked_add(step) {
            Some(end) if end <= self.data.len() => {
                self.position = end;
                Ok(())
            }
            _ => Err(OutOfBounds),
        }
    }

    /// Current position
    #[must_use]
    pub fn pos(&self) -> usize {
        self.position
    }

    /// The whole underlying buffer
    #[must_use]
    pub fn data(&self) -> &'a [u8] {
        self.data
    }

    /// Look at the current byte without consuming it
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] at the end of the data
    pub fn peek_byte(&self) -> Result<u8> {
        self.data.get(self.position).copied().ok_or(OutOfBounds)
    }

    /// Read a little-endian primitive
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if not enough data is left
    pub fn read_le<T: CilIO>(&mut self) -> Result<T> {
        read_le_at::<T>(self.data, &mut self.position)
    }

    /// Consume `len` bytes and return them as a slice
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if not enough data is left
    pub fn read_bytes(&mut self, len: usize) -> Result<&'a [u8]> {
        let start = self.position;
        self.advance_by(len)?;
        Ok(&self.data[start..self.position])
    }

    /// Read a compressed unsigned integer (1, 2 or 4 bytes)
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] for an invalid lead byte, or
    /// [`crate::Error::OutOfBounds`] for truncated data
    pub fn read_compressed_uint(&mut self) -> Result<u32> {
        let first_byte = self.read_le::<u8>()?;

        // 1-byte encoding: 0xxxxxxx
        if (first_byte & 0x80) == 0 {
            return Ok(u32::from(first_byte));
        }

        // 2-byte encoding: 10xxxxxx xxxxxxxx
        if (first_byte & 0xC0) == 0x80 {
            let second_byte = self.read_le::<u8>()?;
            return Ok(((u32::from(first_byte) & 0x3F) << 8) | u32::from(second_byte));
        }

        // 4-byte encoding: 110xxxxx xxxxxxxx xxxxxxxx xxxxxxxx
        if (first_byte & 0xE0) == 0xC0 {
            let b1 = u32::from(self.read_le::<u8>()?);
            let b2 = u32::from(self.read_le::<u8>()?);
            let b3 = u32::from(self.read_le::<u8>()?);
            return Ok(((u32::from(first_byte) & 0x1F) << 24) | (b1 << 16) | (b2 << 8) | b3);
        }

        Err(malformed_error!("Invalid compressed uint - {}", first_byte))
    }

    /// Read a compressed signed integer. The sign bit is rotated into bit 0 of the width
    /// that was used for the encoding.
    ///
    /// # Errors
    /// Same as [`Parser::read_compressed_uint`]
    pub fn read_compressed_int(&mut self) -> Result<i32> {
        let lead = self.peek_byte()?;
        let unsigned = self.read_compressed_uint()?;

        let bits = if lead & 0x80 == 0 {
            7
        } else if lead & 0xC0 == 0x80 {
            14
        } else {
            29
        };

        let magnitude = unsigned >> 1;
        #[allow(clippy::cast_possible_wrap)]
        let value = if unsigned & 1 == 0 {
            magnitude as i32
        } else {
            (magnitude | (u32::MAX << (bits - 1))) as i32
        };

        Ok(value)
    }

    /// Read a compressed `TypeDefOrRef` coded index and return it as a [`Token`]
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if the tag selects no table
    pub fn read_compressed_token(&mut self) -> Result<Token> {
        let compressed_token = self.read_compressed_uint()?;
        CodedIndexType::TypeDefOrRef.decode(compressed_token)
    }

    /// Read a NUL-terminated UTF-8 string. The terminator is consumed but not returned.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if no terminator is found
    pub fn read_string_utf8(&mut self) -> Result<String> {
        let start = self.position;
        let Some(len) = self.data[start..].iter().position(|b| *b == 0) else {
            return Err(OutOfBounds);
        };

        self.position = start + len + 1;
        Ok(String::from_utf8_lossy(&self.data[start..start + len]).into_owned())
    }

    /// Read a serialized string as used by custom attribute blobs: a compressed length
    /// followed by UTF-8 bytes, where the single byte `0xFF` denotes a null string.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if the string exceeds the data
    pub fn read_ser_string(&mut self) -> Result<Option<String>> {
        if self.peek_byte()? == 0xFF {
            self.advance()?;
            return Ok(None);
        }

        let len = self.read_compressed_uint()? as usize;
        let bytes = self.read_bytes(len)?;
        Ok(Some(String::from_utf8_lossy(bytes).into_owned()))
    }
}
