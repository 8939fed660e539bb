//! Coded indices.
//!
//! A coded index packs a reference into one of several tables into a single integer: the low
//! `tag_bits` select the table, the remaining bits carry the rid.
//!
//! # Reference
//! - [ECMA-335 II.24.2.6: #~ stream](https://ecma-international.org/wp-content/uploads/ECMA-335_6th_edition_june_2012.pdf)

use crate::{
    metadata::{tables::TableId, token::Token},
    Error, Result,
};

/// The coded index kinds used by this crate
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum CodedIndexType {
    /// `TypeDef | TypeRef | TypeSpec`, also used by compressed tokens in signatures
    TypeDefOrRef,
    /// `MethodDef | MemberRef`, used by `MethodSpec.Method` and `CustomAttribute.Type`
    MethodDefOrRef,
    /// Every table that may own a custom attribute
    HasCustomAttribute,
}

const TYPE_DEF_OR_REF: &[Option<TableId>] = &[
    Some(TableId::TypeDef),
    Some(TableId::TypeRef),
    Some(TableId::TypeSpec),
];

const METHOD_DEF_OR_REF: &[Option<TableId>] = &[Some(TableId::MethodDef), Some(TableId::MemberRef)];

const HAS_CUSTOM_ATTRIBUTE: &[Option<TableId>] = &[
    Some(TableId::MethodDef),
    Some(TableId::Field),
    Some(TableId::TypeRef),
    Some(TableId::TypeDef),
    Some(TableId::Param),
    Some(TableId::InterfaceImpl),
    Some(TableId::MemberRef),
    Some(TableId::Module),
    Some(TableId::DeclSecurity),
    Some(TableId::Property),
    Some(TableId::Event),
    Some(TableId::StandAloneSig),
    Some(TableId::ModuleRef),
    Some(TableId::TypeSpec),
    Some(TableId::Assembly),
    Some(TableId::AssemblyRef),
    Some(TableId::File),
    Some(TableId::ExportedType),
    Some(TableId::ManifestResource),
    Some(TableId::GenericParam),
    Some(TableId::GenericParamConstraint),
    Some(TableId::MethodSpec),
];

impl CodedIndexType {
    /// Number of low bits used for the table tag
    #[must_use]
    pub fn tag_bits(self) -> u32 {
        match self {
            CodedIndexType::TypeDefOrRef => 2,
            CodedIndexType::MethodDefOrRef => 1,
            CodedIndexType::HasCustomAttribute => 5,
        }
    }

    fn tables(self) -> &'static [Option<TableId>] {
        match self {
            CodedIndexType::TypeDefOrRef => TYPE_DEF_OR_REF,
            CodedIndexType::MethodDefOrRef => METHOD_DEF_OR_REF,
            CodedIndexType::HasCustomAttribute => HAS_CUSTOM_ATTRIBUTE,
        }
    }

    /// The tag a table is encoded with, if it participates in this coded index
    #[must_use]
    pub fn tag_of(self, table: TableId) -> Option<u32> {
        self.tables()
            .iter()
            .position(|candidate| *candidate == Some(table))
            .map(|tag| tag as u32)
    }

    /// Decode a coded index value into a [`Token`]
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if the tag does not select a table
    pub fn decode(self, value: u32) -> Result<Token> {
        let tag_bits = self.tag_bits();
        let tag = (value & ((1 << tag_bits) - 1)) as usize;

        match self.tables().get(tag) {
            Some(Some(table)) => Ok(Token::from_parts(*table, value >> tag_bits)),
            _ => Err(malformed_error!(
                "Invalid {:?} coded index - {:#x}",
                self,
                value
            )),
        }
    }

    /// Encode a [`Token`] into this coded index form
    ///
    /// # Errors
    /// Returns [`crate::Error::InvalidToken`] if the token's table is not part of this coded index
    pub fn encode(self, token: Token) -> Result<u32> {
        let tag = token
            .table_id()
            .and_then(|table| self.tag_of(table))
            .ok_or(Error::InvalidToken(token))?;

        Ok((token.rid() << self.tag_bits()) | tag)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn type_def_or_ref() {
        let kind = CodedIndexType::TypeDefOrRef;
        assert_eq!(kind.decode(0x49).unwrap(), Token::new(0x0100_0012));
        assert_eq!(kind.decode(0x42).unwrap(), Token::new(0x1B00_0010));
        assert_eq!(kind.encode(Token::new(0x0200_0005)).unwrap(), 0x14);
        assert!(kind.decode(0x03).is_err());
        assert!(kind.encode(Token::new(0x0600_0001)).is_err());
    }

    #[test]
    fn method_def_or_ref() {
        let kind = CodedIndexType::MethodDefOrRef;
        assert_eq!(kind.decode(0x0A).unwrap(), Token::new(0x0600_0005));
        assert_eq!(kind.decode(0x0B).unwrap(), Token::new(0x0A00_0005));
        assert_eq!(kind.encode(Token::new(0x0A00_0005)).unwrap(), 0x0B);
    }

    #[test]
    fn has_custom_attribute_method_spec() {
        let kind = CodedIndexType::HasCustomAttribute;
        assert_eq!(kind.tag_of(TableId::MethodSpec), Some(21));
        assert_eq!(
            kind.encode(Token::from_parts(TableId::MethodSpec, 2)).unwrap(),
            (2 << 5) | 21
        );
        assert!(kind.decode(22).is_err());
    }
}
