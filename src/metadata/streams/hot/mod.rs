//! The hot-table stream (`#!`).
//!
//! Pre-compiled images may carry a sparse copy of the rows the runtime touches most. The
//! stream starts with a directory of one signed displacement per table, each non-zero entry
//! pointing to a [`HotTableHeader`]. Two on-disk generations exist, selected by the runtime
//! version the image targets ([`HotTableGeneration`]).
//!
//! Row lookup for a table whose rows are not stored contiguously works in two steps:
//!
//! 1. The low `shift` bits of the rid select a bucket in table 1, a pair of u16 values
//!    `start..stop` into table 2
//! 2. Table 2 holds the high bits of each hot rid; the first byte in the bucket equal to
//!    `rid >> shift` is the hot row index
//!
//! CLR 4.0 images add one indirection through an index array before addressing the row data.
//!
//! # Examples
//!
//! ```rust,ignore
//! use dotmeta::metadata::streams::hot::{HotTableGeneration, HotTableStream};
//!
//! let mut hot = HotTableStream::new(HotTableGeneration::from_version(&header.version), cursor, 0);
//! hot.initialize(OffsetMask::Bits32)?;
//! if let Some(reader) = hot.table_reader(&method_spec_table, 7)? {
//!     // read the row
//! }
//! ```

mod header;

pub use header::HotTableHeader;
pub(crate) use header::relocate;

use std::sync::RwLock;

use tracing::debug;

use crate::{
    config::{OffsetMask, ReaderOptions},
    file::cursor::{ByteCursor, SliceCursor},
    metadata::tables::{TableDescriptor, TableId},
    Result,
};

/// Number of table slots in the directory
pub const MAX_TABLES: usize = TableId::HOT_TABLE_COUNT;

/// Size of the hot heap directory: 4 lead-in bytes and one displacement per table
pub const HOT_HEAP_DIR_SIZE: u64 = 4 + MAX_TABLES as u64 * 4;

/// On-disk layout generation of a hot-table stream
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HotTableGeneration {
    /// Runtimes 1.x and 2.x, 5-field table headers
    Clr20,
    /// Runtime 4.x and later, 6-field table headers with an index array
    Clr40,
}

impl HotTableGeneration {
    /// Pick the generation from the metadata version string
    #[must_use]
    pub fn from_version(version: &str) -> Self {
        if version.starts_with("v1.") || version.starts_with("v2.") {
            HotTableGeneration::Clr20
        } else {
            HotTableGeneration::Clr40
        }
    }
}

/// `base + displ` masked to the image address width. A zero displacement stays zero, which
/// marks "no bucket table" in `dispTable1`.
pub(crate) fn add_offsets(mask: u64, base: u64, displ: i32) -> u64 {
    if displ == 0 {
        return 0;
    }
    relocate(mask, base, displ)
}

/// An initialized hot-table index over a shared cursor.
///
/// Lookups take `&self` and read through their own positioned view of the cursor, so any
/// number of them may run concurrently. [`HotTableStream::dispose`] releases the cursor;
/// afterwards every lookup reports "absent".
pub struct HotTableStream {
    generation: HotTableGeneration,
    base_offset: u64,
    cursor: RwLock<Option<SliceCursor>>,
    headers: Vec<Option<HotTableHeader>>,
}

impl HotTableStream {
    /// Create an index over `cursor`, whose directory starts at `base_offset`
    #[must_use]
    pub fn new(generation: HotTableGeneration, cursor: SliceCursor, base_offset: u64) -> Self {
        HotTableStream {
            generation,
            base_offset,
            cursor: RwLock::new(Some(cursor)),
            headers: vec![None; MAX_TABLES],
        }
    }

    /// The layout generation
    #[must_use]
    pub fn generation(&self) -> HotTableGeneration {
        self.generation
    }

    /// Read the directory and every table header.
    ///
    /// A table whose header cannot be read is treated as absent.
    ///
    /// # Errors
    /// Returns an error if the directory itself is truncated, or [`crate::Error::Disposed`]
    pub fn initialize(&mut self, mask: OffsetMask) -> Result<()> {
        let Some(mut cursor) = self.view() else {
            return Err(crate::Error::Disposed);
        };

        let mask = mask.value();
        let mut headers = vec![None; MAX_TABLES];

        for (index, slot) in headers.iter_mut().enumerate() {
            cursor.set_position(self.base_offset + 4 + index as u64 * 4);
            let header_offset = cursor.read_i32()?;
            if header_offset == 0 {
                continue;
            }

            let header_base = relocate(mask, self.base_offset, header_offset);
            match HotTableHeader::read(&mut cursor, header_base, mask, self.generation) {
                Ok(header) => *slot = Some(header),
                Err(error) => {
                    debug!(
                        table = index,
                        header_base, "skipping corrupt hot table header: {}", error
                    );
                }
            }
        }

        self.headers = headers;
        Ok(())
    }

    /// [`HotTableStream::initialize`] with [`ReaderOptions::hot_table_mask`]
    ///
    /// # Errors
    /// See [`HotTableStream::initialize`]
    pub fn initialize_with_options(&mut self, options: &ReaderOptions) -> Result<()> {
        self.initialize(options.hot_table_mask)
    }

    fn view(&self) -> Option<SliceCursor> {
        read_lock!(self.cursor).as_ref().map(SliceCursor::view)
    }

    /// The header of `table`, if the table has hot rows
    #[must_use]
    pub fn header(&self, table: TableId) -> Option<&HotTableHeader> {
        self.headers.get(table as usize).and_then(Option::as_ref)
    }

    /// Offset of row `rid` of `table` within the hot stream.
    ///
    /// Returns `Ok(None)` if the table or the row is not hot, or the index has been disposed.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if the bucket tables point outside of the stream
    pub fn get_row_offset(&self, table: &TableDescriptor, rid: u32) -> Result<Option<u64>> {
        let Some(header) = self.header(table.id) else {
            return Ok(None);
        };
        let Some(mut cursor) = self.view() else {
            return Ok(None);
        };
        if rid == 0 {
            return Ok(None);
        }

        let row_size = u64::from(table.row_size);

        if header.pos_table1 == 0 {
            return Ok(Some(header.pos_data + u64::from(rid - 1) * row_size));
        }

        cursor.set_position(header.pos_table1 + u64::from(rid & header.mask) * 2);
        let start = cursor.read_u16()?;
        let stop = cursor.read_u16()?;

        #[allow(clippy::cast_possible_truncation)]
        let high_bits = (rid >> header.shift) as u8;

        cursor.set_position(header.pos_table2 + u64::from(start));
        for index in start..stop {
            if cursor.read_u8()? != high_bits {
                continue;
            }

            let row = match header.pos_indexes {
                None => u64::from(index),
                Some(pos_indexes) => {
                    u64::from(cursor.read_u16_at(pos_indexes + u64::from(index) * 2)?)
                }
            };
            return Ok(Some(header.pos_data + row * row_size));
        }

        Ok(None)
    }

    /// A private cursor positioned at row `rid` of `table`
    ///
    /// # Errors
    /// See [`HotTableStream::get_row_offset`]
    pub fn table_reader(&self, table: &TableDescriptor, rid: u32) -> Result<Option<SliceCursor>> {
        let Some(offset) = self.get_row_offset(table, rid)? else {
            return Ok(None);
        };
        let Some(mut cursor) = self.view() else {
            return Ok(None);
        };

        cursor.set_position(offset);
        Ok(Some(cursor))
    }

    /// Release the underlying cursor. Calling this more than once is a no-op.
    pub fn dispose(&self) {
        if let Some(mut cursor) = write_lock!(self.cursor).take() {
            cursor.dispose();
        }
    }

    /// `true` once [`HotTableStream::dispose`] has been called
    #[must_use]
    pub fn is_disposed(&self) -> bool {
        read_lock!(self.cursor).is_none()
    }
}
