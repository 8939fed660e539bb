use crate::{
    file::{io::write_le, parser::Parser},
    Result,
};

/// Longest stream name, terminator and padding included
pub const MAX_STREAM_NAME_LEN: usize = 32;

/// A stream header, describing the location and name of one metadata stream
///
/// Layout: `u32 offset | u32 size | NUL-terminated ASCII name`, padded to a 4-byte boundary.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StreamHeader {
    /// Offset of the stream, relative to the metadata root
    pub offset: u32,
    /// Size of the stream in bytes
    pub size: u32,
    /// Name of the stream, e.g. `#~` or `#Blob`
    pub name: String,
}

impl StreamHeader {
    /// Create a stream header
    #[must_use]
    pub fn new(name: impl Into<String>, offset: u32, size: u32) -> Self {
        StreamHeader {
            offset,
            size,
            name: name.into(),
        }
    }

    /// Read a stream header at the current parser position and leave the parser on the next
    /// 4-byte boundary, relative to the start of `parser`'s data.
    ///
    /// ## Arguments
    /// * 'parser' - Positioned at the start of the header
    /// * 'verify' - Reject headers whose range overflows or whose name is not terminated
    ///   within [`MAX_STREAM_NAME_LEN`] bytes
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] for truncated data, or
    /// [`crate::Error::Malformed`] when verification fails
    pub fn read(parser: &mut Parser, verify: bool) -> Result<StreamHeader> {
        let offset = parser.read_le::<u32>()?;
        let size = parser.read_le::<u32>()?;
        if verify && offset.checked_add(size).is_none() {
            return Err(malformed_error!(
                "Stream offset and size cause integer overflow - {} + {}",
                offset,
                size
            ));
        }

        let mut name = Vec::with_capacity(8);
        let mut terminated = false;
        for _ in 0..MAX_STREAM_NAME_LEN {
            let byte = parser.read_le::<u8>()?;
            if byte == 0 {
                terminated = true;
                break;
            }
            name.push(byte);
        }

        if verify && !terminated {
            return Err(malformed_error!("Invalid stream header name - not terminated"));
        }

        let aligned = (parser.pos() + 3) & !3;
        parser.seek(aligned.min(parser.len()))?;

        Ok(StreamHeader {
            offset,
            size,
            name: name.iter().map(|b| char::from(*b)).collect(),
        })
    }

    /// The name as stored: one byte per character, `?` for characters above U+00FF
    fn name_bytes(&self) -> Vec<u8> {
        self.name
            .chars()
            .map(|c| u8::try_from(c).unwrap_or(b'?'))
            .collect()
    }

    /// Size of the serialized header in bytes
    #[must_use]
    pub fn header_size(&self) -> usize {
        8 + ((self.name.chars().count() + 1 + 3) & !3)
    }

    /// Append the serialized header
    pub fn write_to(&self, buffer: &mut Vec<u8>) {
        let name = self.name_bytes();
        write_le(buffer, self.offset);
        write_le(buffer, self.size);
        buffer.extend_from_slice(&name);
        let padding = self.header_size() - 8 - name.len();
        buffer.extend(std::iter::repeat(0u8).take(padding));
    }
}
