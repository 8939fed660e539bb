use std::io::Write;

use crate::Result;

/// A contiguous range of the output image
pub trait Chunk {
    /// Assign the final position of the chunk
    fn set_offset(&mut self, file_offset: u64, rva: u32);

    /// File offset assigned by [`Chunk::set_offset`]
    fn file_offset(&self) -> u64;

    /// RVA assigned by [`Chunk::set_offset`]
    fn rva(&self) -> u32;

    /// Number of bytes [`Chunk::write_to`] produces
    fn get_file_length(&self) -> u32;

    /// Size of the chunk once mapped into memory
    fn get_virtual_size(&self) -> u32;

    /// Write the chunk
    ///
    /// # Errors
    /// Returns [`crate::Error::FileError`] if the writer fails
    fn write_to(&self, writer: &mut dyn Write) -> Result<()>;
}

/// Write `count` zero bytes
///
/// # Errors
/// Returns [`crate::Error::FileError`] if the writer fails
pub fn write_zeros(writer: &mut dyn Write, count: usize) -> Result<()> {
    const ZEROS: [u8; 512] = [0; 512];

    let mut left = count;
    while left > 0 {
        let step = left.min(ZEROS.len());
        writer.write_all(&ZEROS[..step])?;
        left -= step;
    }
    Ok(())
}
