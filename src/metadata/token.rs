//! Metadata tokens.
//!
//! A token is the 32-bit address of a metadata row: the high byte names the table, the low
//! 24 bits carry the 1-based row id (rid). Rid `0` denotes a null reference.
//!
//! # Reference
//! - [ECMA-335 II.22: Metadata logical format: tables](https://ecma-international.org/wp-content/uploads/ECMA-335_6th_edition_june_2012.pdf)

use std::fmt;

use crate::metadata::tables::TableId;

/// Mask selecting the rid part of a token
pub const RID_MASK: u32 = 0x00FF_FFFF;

/// A metadata token (`table << 24 | rid`).
///
/// # Example
///
/// ```rust
/// use dotmeta::metadata::{tables::TableId, token::Token};
///
/// let token = Token::from_parts(TableId::MethodSpec, 3);
/// assert_eq!(token.value(), 0x2B00_0003);
/// assert_eq!(token.table_id(), Some(TableId::MethodSpec));
/// assert_eq!(token.rid(), 3);
/// ```
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Token(pub u32);

impl Token {
    /// Create a token from its raw value
    #[must_use]
    pub fn new(value: u32) -> Self {
        Token(value)
    }

    /// Create a token from a table and a rid. Bits of `rid` above 24 are discarded.
    #[must_use]
    pub fn from_parts(table: TableId, rid: u32) -> Self {
        Token(((table as u32) << 24) | (rid & RID_MASK))
    }

    /// The raw 32-bit value
    #[must_use]
    pub fn value(&self) -> u32 {
        self.0
    }

    /// The raw table byte
    #[must_use]
    pub fn table(&self) -> u8 {
        (self.0 >> 24) as u8
    }

    /// The table, if the table byte names a known table
    #[must_use]
    pub fn table_id(&self) -> Option<TableId> {
        TableId::from_u8(self.table())
    }

    /// The 1-based row id
    #[must_use]
    pub fn rid(&self) -> u32 {
        self.0 & RID_MASK
    }

    /// Returns `true` if the rid is `0`
    #[must_use]
    pub fn is_null(&self) -> bool {
        self.rid() == 0
    }
}

impl From<u32> for Token {
    fn from(value: u32) -> Self {
        Token(value)
    }
}

impl From<Token> for u32 {
    fn from(token: Token) -> Self {
        token.0
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Token(0x{:08x}, table: 0x{:02x}, rid: {})",
            self.0,
            self.table(),
            self.rid()
        )
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:08x}", self.0)
    }
}
