//! The metadata root (II.24.2.1).
//!
//! The root opens the metadata of an image: a magic signature, a version, a runtime version
//! string of declared length, storage flags and the directory of streams that follow.
//!
//! ```text
//! u32 signature | u16 major | u16 minor | u32 reserved1 | u32 length | version[length]
//! u8 flags | u8 reserved2 | u16 streams | StreamHeader[streams]
//! ```

use bitflags::bitflags;

use crate::{
    file::{io::write_le, parser::Parser},
    metadata::streams::StreamHeader,
    Error::OutOfBounds,
    ReaderOptions, Result,
};

/// The magic signature of a metadata root, `BSJB`
pub const CIL_HEADER_MAGIC: u32 = 0x424A_5342;

/// Name of the hot-table stream
pub const HOT_STREAM_NAME: &str = "#!";
/// Name of the uncompressed (ENC) table stream
pub const UNCOMPRESSED_TABLES_NAME: &str = "#-";

bitflags! {
    #[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
    /// Storage flags of the metadata root
    pub struct StorageFlags: u8 {
        /// The stream headers are preceded by extra data
        const EXTRA_DATA = 0x01;
    }
}

/// The parsed metadata root
#[derive(Clone, Debug)]
pub struct MetadataHeader {
    /// Magic signature, [`CIL_HEADER_MAGIC`] for valid images
    pub signature: u32,
    /// Major version, `1` for current images
    pub major_version: u16,
    /// Minor version, `1` for current images
    pub minor_version: u16,
    /// Reserved, always 0
    pub reserved1: u32,
    /// Declared length of the version string, padding included
    pub string_length: u32,
    /// Runtime version string, e.g. `v4.0.30319`
    pub version: String,
    /// File offset of the flags byte that follows the version string
    pub storage_header_offset: u64,
    /// Storage flags
    pub flags: StorageFlags,
    /// Reserved, always 0
    pub reserved2: u8,
    /// Number of stream headers
    pub stream_count: u16,
    /// The stream headers, in file order
    pub streams: Vec<StreamHeader>,
}

impl MetadataHeader {
    /// Read a metadata root that starts at file offset `0`
    ///
    /// ## Arguments
    /// * 'data'   - The root and everything after it
    /// * 'verify' - Check the magic, the version and the stream headers
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if verification fails or the version string
    /// overruns the data, [`crate::Error::OutOfBounds`] for truncated data
    pub fn read(data: &[u8], verify: bool) -> Result<MetadataHeader> {
        Self::read_at(data, 0, verify)
    }

    /// Read a metadata root using [`ReaderOptions::verify_header`]
    ///
    /// # Errors
    /// See [`MetadataHeader::read`]
    pub fn read_with_options(data: &[u8], options: &ReaderOptions) -> Result<MetadataHeader> {
        Self::read_at(data, 0, options.verify_header)
    }

    /// Read a metadata root located at `file_offset` in the image
    ///
    /// # Errors
    /// See [`MetadataHeader::read`]
    pub fn read_at(data: &[u8], file_offset: u64, verify: bool) -> Result<MetadataHeader> {
        let mut parser = Parser::new(data);

        let signature = parser.read_le::<u32>()?;
        if verify && signature != CIL_HEADER_MAGIC {
            return Err(malformed_error!(
                "Invalid metadata header signature - {:#010x}",
                signature
            ));
        }

        let major_version = parser.read_le::<u16>()?;
        let minor_version = parser.read_le::<u16>()?;
        if verify
            && !((major_version == 1 && minor_version == 1)
                || (major_version == 0 && minor_version >= 19))
        {
            return Err(malformed_error!(
                "Unknown metadata header version - {}.{}",
                major_version,
                minor_version
            ));
        }

        let reserved1 = parser.read_le::<u32>()?;
        let string_length = parser.read_le::<u32>()?;
        let version = Self::read_version(&mut parser, string_length)?;

        let storage_header_offset = file_offset
            .checked_add(parser.pos() as u64)
            .ok_or(OutOfBounds)?;

        let flags = StorageFlags::from_bits_retain(parser.read_le::<u8>()?);
        let reserved2 = parser.read_le::<u8>()?;
        let stream_count = parser.read_le::<u16>()?;

        let mut streams = Vec::with_capacity((stream_count as usize).min(parser.remaining() / 12));
        for _ in 0..stream_count {
            streams.push(StreamHeader::read(&mut parser, verify)?);
        }

        Ok(MetadataHeader {
            signature,
            major_version,
            minor_version,
            reserved1,
            string_length,
            version,
            storage_header_offset,
            flags,
            reserved2,
            stream_count,
            streams,
        })
    }

    /// The version string is NUL-terminated inside its declared length; the cursor always
    /// ends at the declared length.
    fn read_version(parser: &mut Parser, string_length: u32) -> Result<String> {
        let length = string_length as usize;
        if length > parser.remaining() {
            return Err(malformed_error!(
                "Invalid metadata version string - length {} exceeds the remaining {} bytes",
                length,
                parser.remaining()
            ));
        }

        let bytes = parser.read_bytes(length)?;
        let end = bytes.iter().position(|b| *b == 0).unwrap_or(length);
        Ok(String::from_utf8_lossy(&bytes[..end]).into_owned())
    }

    /// The header of the stream called `name`
    #[must_use]
    pub fn stream(&self, name: &str) -> Option<&StreamHeader> {
        self.streams.iter().find(|stream| stream.name == name)
    }

    /// `true` if the image carries a hot-table stream
    #[must_use]
    pub fn has_hot_stream(&self) -> bool {
        self.stream(HOT_STREAM_NAME).is_some()
    }

    /// `true` if the table stream is the uncompressed `#-` variant
    #[must_use]
    pub fn is_uncompressed_tables(&self) -> bool {
        self.stream(UNCOMPRESSED_TABLES_NAME).is_some()
    }

    /// Serialize the header. `string_length` is recomputed from the version string, rounded
    /// up to a multiple of 4 with room for the terminator, and `stream_count` from `streams`.
    ///
    /// # Errors
    /// Returns [`crate::Error::Encoding`] if the version string or the stream list do not fit
    /// their length fields
    pub fn write_to(&self, buffer: &mut Vec<u8>) -> Result<()> {
        let padded_len = (self.version.len() + 1 + 3) & !3;
        let string_length = u32::try_from(padded_len).map_err(|_| {
            crate::Error::Encoding(format!("version string too long - {}", self.version.len()))
        })?;
        let stream_count = u16::try_from(self.streams.len()).map_err(|_| {
            crate::Error::Encoding(format!("too many streams - {}", self.streams.len()))
        })?;

        write_le(buffer, self.signature);
        write_le(buffer, self.major_version);
        write_le(buffer, self.minor_version);
        write_le(buffer, self.reserved1);
        write_le(buffer, string_length);
        buffer.extend_from_slice(self.version.as_bytes());
        buffer.extend(std::iter::repeat(0u8).take(padded_len - self.version.len()));
        buffer.push(self.flags.bits());
        buffer.push(self.reserved2);
        write_le(buffer, stream_count);
        for stream in &self.streams {
            stream.write_to(buffer);
        }

        Ok(())
    }
}
