//! Metadata tables.
//!
//! Only the parts of the table layer this crate needs are modelled here: table identifiers,
//! coded indices, the shape of a table as seen by the hot-table index, and the `MethodSpec`
//! table with its entities.

mod codedindex;
mod methodspec;
mod tableid;

pub use codedindex::*;
pub use methodspec::*;
pub use tableid::*;

/// A metadata table as far as row addressing is concerned
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TableDescriptor {
    /// Which table
    pub id: TableId,
    /// Size of one row in bytes
    pub row_size: u32,
    /// Number of rows
    pub row_count: u32,
}

impl TableDescriptor {
    /// Create a table descriptor
    #[must_use]
    pub fn new(id: TableId, row_size: u32, row_count: u32) -> Self {
        TableDescriptor {
            id,
            row_size,
            row_count,
        }
    }

    /// `true` if `rid` addresses an existing row
    #[must_use]
    pub fn is_valid_rid(&self, rid: u32) -> bool {
        rid != 0 && rid <= self.row_count
    }
}
