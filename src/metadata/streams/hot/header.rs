use crate::{
    file::cursor::{ByteCursor, SliceCursor},
    metadata::streams::hot::{add_offsets, HotTableGeneration},
    Result,
};

/// Per-table header of a hot-table stream.
///
/// Generation CLR 2.0: `u32 numRows | i32 dispTable1 | i32 dispTable2 | i32 dispData | u16 shift`
///
/// Generation CLR 4.0: `u32 numRows | i32 dispTable1 | i32 dispTable2 | i32 dispIndexes |
/// i32 dispData | u16 shift`
///
/// All positions are absolute within the hot stream cursor. `pos_table1 == 0` means the
/// whole table is stored contiguously at `pos_data`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HotTableHeader {
    /// Number of hot rows
    pub num_rows: u32,
    /// Bucket table: `(start, stop)` u16 pairs indexed by the low rid bits
    pub pos_table1: u64,
    /// High rid bits, one byte per hot row
    pub pos_table2: u64,
    /// Row index array, CLR 4.0 only
    pub pos_indexes: Option<u64>,
    /// Start of the row data
    pub pos_data: u64,
    /// Number of low rid bits used as bucket index
    pub shift: u16,
    /// `(1 << shift) - 1`
    pub mask: u32,
}

impl HotTableHeader {
    /// Read a table header at `header_base`
    ///
    /// # Errors
    /// Returns an error if the header is truncated or `shift` cannot produce a 32-bit mask
    pub fn read(
        cursor: &mut SliceCursor,
        header_base: u64,
        mask: u64,
        generation: HotTableGeneration,
    ) -> Result<HotTableHeader> {
        cursor.set_position(header_base);

        let num_rows = cursor.read_u32()?;
        let pos_table1 = add_offsets(mask, header_base, cursor.read_i32()?);
        let pos_table2 = relocate(mask, header_base, cursor.read_i32()?);
        let pos_indexes = match generation {
            HotTableGeneration::Clr20 => None,
            HotTableGeneration::Clr40 => Some(relocate(mask, header_base, cursor.read_i32()?)),
        };
        let pos_data = relocate(mask, header_base, cursor.read_i32()?);
        let shift = cursor.read_u16()?;

        if shift >= 32 {
            return Err(malformed_error!("Invalid hot table shift - {}", shift));
        }

        Ok(HotTableHeader {
            num_rows,
            pos_table1,
            pos_table2,
            pos_indexes,
            pos_data,
            shift,
            mask: (1u32 << shift) - 1,
        })
    }
}

/// `(base + displ) & mask`, applied even when `displ` is zero
pub(crate) fn relocate(mask: u64, base: u64, displ: i32) -> u64 {
    base.wrapping_add_signed(i64::from(displ)) & mask
}
