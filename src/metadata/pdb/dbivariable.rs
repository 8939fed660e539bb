use crate::{file::parser::Parser, metadata::pdb::PdbLocalAttributes, Result};

/// Compiler-generated flag in the symbol record
const COMPILER_GENERATED: u16 = 0x0004;

/// Bytes between the slot index and the flags: type index and address fields
const SKIPPED_FIELDS: usize = 10;

/// A local variable slot record of the DBI stream
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DbiVariable {
    /// Name of the local
    pub name: String,
    /// Attributes derived from the symbol flags
    pub attributes: PdbLocalAttributes,
    /// Slot index in the method's local signature
    pub index: i32,
}

impl DbiVariable {
    /// Read a record: `i32 index | 10 skipped bytes | u16 flags | NUL-terminated name`
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if the record is truncated
    pub fn read(parser: &mut Parser) -> Result<Self> {
        let index = parser.read_le::<i32>()?;
        parser.advance_by(SKIPPED_FIELDS)?;
        let flags = parser.read_le::<u16>()?;
        let name = parser.read_string_utf8()?;

        Ok(DbiVariable {
            name,
            attributes: attributes_from_flags(flags),
            index,
        })
    }
}

fn attributes_from_flags(flags: u16) -> PdbLocalAttributes {
    let mut attributes = PdbLocalAttributes::empty();
    if flags & COMPILER_GENERATED != 0 {
        attributes |= PdbLocalAttributes::DEBUGGER_HIDDEN;
    }
    attributes
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compiler_generated_local() {
        #[rustfmt::skip]
        let data = [
            0x02, 0x00, 0x00, 0x00,
            0xAA, 0xAA, 0xAA, 0xAA, 0xAA, 0xAA, 0xAA, 0xAA, 0xAA, 0xAA,
            0x04, 0x00,
            b'C', b'S', b'$', b'0', 0x00,
        ];

        let mut parser = Parser::new(&data);
        let variable = DbiVariable::read(&mut parser).unwrap();

        assert_eq!(variable.index, 2);
        assert_eq!(variable.name, "CS$0");
        assert_eq!(variable.attributes, PdbLocalAttributes::DEBUGGER_HIDDEN);
        assert!(!parser.has_more_data());
    }

    #[test]
    fn user_local() {
        #[rustfmt::skip]
        let data = [
            0xFF, 0xFF, 0xFF, 0xFF,
            0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
            0x03, 0x00,
            b'i', 0x00,
        ];

        let variable = DbiVariable::read(&mut Parser::new(&data)).unwrap();
        assert_eq!(variable.index, -1);
        assert!(variable.attributes.is_empty());
    }

    #[test]
    fn missing_terminator() {
        let data = [0xFFu8; 18];
        assert!(DbiVariable::read(&mut Parser::new(&data)).is_err());
    }
}
