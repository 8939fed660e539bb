//! Values carried by a decoded custom attribute blob.

use crate::metadata::signatures::TypeSig;

/// Serialization type tags used by named arguments and boxed values, see ECMA-335 II.23.3
#[allow(non_snake_case, missing_docs)]
pub mod SERIALIZATION_TYPE {
    pub const BOOLEAN: u8 = 0x02;
    pub const CHAR: u8 = 0x03;
    pub const I1: u8 = 0x04;
    pub const U1: u8 = 0x05;
    pub const I2: u8 = 0x06;
    pub const U2: u8 = 0x07;
    pub const I4: u8 = 0x08;
    pub const U4: u8 = 0x09;
    pub const I8: u8 = 0x0A;
    pub const U8: u8 = 0x0B;
    pub const R4: u8 = 0x0C;
    pub const R8: u8 = 0x0D;
    pub const STRING: u8 = 0x0E;
    pub const SZARRAY: u8 = 0x1D;
    pub const TYPE: u8 = 0x50;
    pub const TAGGED_OBJECT: u8 = 0x51;
    pub const FIELD: u8 = 0x53;
    pub const PROPERTY: u8 = 0x54;
    pub const ENUM: u8 = 0x55;
}

/// The value half of a [`CAArgument`]
#[derive(Debug, Clone, PartialEq)]
pub enum CAValue {
    /// `bool`
    Bool(bool),
    /// UTF-16 code unit
    Char(u16),
    /// `sbyte`
    I1(i8),
    /// `byte`
    U1(u8),
    /// `short`
    I2(i16),
    /// `ushort`
    U2(u16),
    /// `int`
    I4(i32),
    /// `uint`
    U4(u32),
    /// `long`
    I8(i64),
    /// `ulong`
    U8(u64),
    /// `float`
    R4(f32),
    /// `double`
    R8(f64),
    /// A string, `None` for a null reference
    String(Option<String>),
    /// A `System.Type` given by its serialized name, `None` for a null reference
    Type(Option<String>),
    /// A value stored in an `object` slot together with its own type
    Boxed(Box<CAArgument>),
    /// A single-dimensional array, `None` for a null reference
    Array(Option<Vec<CAArgument>>),
}

/// A typed custom attribute value.
///
/// Enum values keep the enum type in `arg_type` and hold the underlying integer in `value`.
#[derive(Debug, Clone, PartialEq)]
pub struct CAArgument {
    /// Declared type of the value
    pub arg_type: TypeSig,
    /// The value
    pub value: CAValue,
}

impl CAArgument {
    /// Create an argument
    #[must_use]
    pub fn new(arg_type: TypeSig, value: CAValue) -> Self {
        CAArgument { arg_type, value }
    }
}

/// A field or property assignment following the constructor arguments
#[derive(Debug, Clone, PartialEq)]
pub struct CANamedArgument {
    /// `true` for a field, `false` for a property
    pub is_field: bool,
    /// Type of the field or property
    pub field_type: TypeSig,
    /// Name of the field or property
    pub name: String,
    /// Assigned value
    pub argument: CAArgument,
}

impl CANamedArgument {
    /// `true` if this assigns a property
    #[must_use]
    pub fn is_property(&self) -> bool {
        !self.is_field
    }
}
