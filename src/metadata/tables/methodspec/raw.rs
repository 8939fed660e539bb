//! The raw `MethodSpec` table row

use crate::{
    file::io::read_le_at_dyn,
    metadata::{
        tables::{CodedIndexType, TableId},
        token::Token,
    },
    Result,
};

#[derive(Clone, Debug, PartialEq, Eq)]
/// The `MethodSpec` table represents instantiations of generic methods. `TableId` = 0x2B
pub struct MethodSpecRaw {
    /// `RowID`
    pub rid: u32,
    /// `Token`
    pub token: Token,
    /// Offset
    pub offset: usize,
    /// an index into the `MethodDefOrRef` coded index, still encoded
    pub method: u32,
    /// an index into the Blob heap
    pub instantiation: u32,
}

impl MethodSpecRaw {
    /// Size of one row
    #[rustfmt::skip]
    #[must_use]
    pub fn row_size(large_method: bool, large_blob: bool) -> u32 {
        let width = |large: bool| if large { 4 } else { 2 };
        /* method */        width(large_method) +
        /* instantiation */ width(large_blob)
    }

    /// Read row `rid` at `offset`, advancing `offset` past it
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if the row is truncated
    pub fn read_row(
        data: &[u8],
        offset: &mut usize,
        rid: u32,
        large_method: bool,
        large_blob: bool,
    ) -> Result<Self> {
        Ok(MethodSpecRaw {
            rid,
            token: Token::from_parts(TableId::MethodSpec, rid),
            offset: *offset,
            method: read_le_at_dyn(data, offset, large_method)?,
            instantiation: read_le_at_dyn(data, offset, large_blob)?,
        })
    }

    /// The `MethodDef` or `MemberRef` token encoded in `method`
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] for an invalid tag
    pub fn method_token(&self) -> Result<Token> {
        CodedIndexType::MethodDefOrRef.decode(self.method)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crafted_short() {
        let data = vec![
            0x01, 0x00, // method
            0x02, 0x02, // instantiation
        ];

        let mut offset = 0;
        let row = MethodSpecRaw::read_row(&data, &mut offset, 1, false, false).unwrap();

        assert_eq!(offset, 4);
        assert_eq!(MethodSpecRaw::row_size(false, false), 4);
        assert_eq!(row.rid, 1);
        assert_eq!(row.token.value(), 0x2B00_0001);
        assert_eq!(row.method_token().unwrap(), Token::new(0x0A00_0000));
        assert_eq!(row.instantiation, 0x0202);
    }

    #[test]
    fn crafted_long() {
        let data = vec![
            0xFF, 0xFF, // padding
            0x06, 0x00, 0x00, 0x00, // method
            0x02, 0x02, 0x02, 0x02, // instantiation
        ];

        let mut offset = 2;
        let row = MethodSpecRaw::read_row(&data, &mut offset, 7, true, true).unwrap();

        assert_eq!(offset, 10);
        assert_eq!(MethodSpecRaw::row_size(true, true), 8);
        assert_eq!(row.offset, 2);
        assert_eq!(row.token.value(), 0x2B00_0007);
        assert_eq!(row.method_token().unwrap(), Token::new(0x0600_0003));
        assert_eq!(row.instantiation, 0x0202_0202);
    }

    #[test]
    fn truncated_row() {
        let mut offset = 0;
        assert!(MethodSpecRaw::read_row(&[0x01, 0x00, 0x02], &mut offset, 1, false, false).is_err());
    }
}
