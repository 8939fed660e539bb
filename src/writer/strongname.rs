use std::io::Write;

use crate::{
    writer::{write_zeros, Chunk},
    Result,
};

/// Placeholder for the strong name signature, filled in after the image is hashed
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StrongNameSignature {
    file_offset: u64,
    rva: u32,
    size: u32,
}

impl StrongNameSignature {
    /// A placeholder of `size` bytes
    #[must_use]
    pub fn new(size: u32) -> Self {
        StrongNameSignature {
            file_offset: 0,
            rva: 0,
            size,
        }
    }
}

impl Chunk for StrongNameSignature {
    fn set_offset(&mut self, file_offset: u64, rva: u32) {
        self.file_offset = file_offset;
        self.rva = rva;
    }

    fn file_offset(&self) -> u64 {
        self.file_offset
    }

    fn rva(&self) -> u32 {
        self.rva
    }

    fn get_file_length(&self) -> u32 {
        self.size
    }

    fn get_virtual_size(&self) -> u32 {
        self.get_file_length()
    }

    fn write_to(&self, writer: &mut dyn Write) -> Result<()> {
        write_zeros(writer, self.size as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn placeholder_is_zero_filled() {
        let mut chunk = StrongNameSignature::new(128);
        chunk.set_offset(0x400, 0x2000);

        assert_eq!(chunk.file_offset(), 0x400);
        assert_eq!(chunk.rva(), 0x2000);
        assert_eq!(chunk.get_file_length(), 128);
        assert_eq!(chunk.get_virtual_size(), 128);

        let mut out = vec![0xCC];
        chunk.write_to(&mut out).unwrap();
        assert_eq!(out.len(), 129);
        assert!(out[1..].iter().all(|b| *b == 0));
    }

    #[test]
    fn writer_errors_are_reported() {
        struct Full;

        impl Write for Full {
            fn write(&mut self, _: &[u8]) -> std::io::Result<usize> {
                Err(std::io::Error::other("disk full"))
            }

            fn flush(&mut self) -> std::io::Result<()> {
                Ok(())
            }
        }

        let chunk = StrongNameSignature::new(16);
        assert!(matches!(
            chunk.write_to(&mut Full),
            Err(crate::Error::FileError(_))
        ));
    }
}
