//! Decoder for custom attribute blobs, ECMA-335 II.23.3.
//!
//! Constructor arguments are read against the parameter types of the constructor signature.
//! Named arguments carry their own serialization type tag. Enum sizes and the tokens of named
//! enum types come from a [`CustomAttributeTypes`] lookup; without one, enums in constructor
//! arguments are read as `int32` and named enum arguments cannot be decoded.

use crate::{
    file::parser::Parser,
    metadata::{
        customattributes::{
            types::{CAArgument, CANamedArgument, CAValue, SERIALIZATION_TYPE},
            CustomAttributeTypes,
        },
        signatures::{MethodBaseSig, TypeSig},
        token::Token,
    },
    Error::RecursionLimit,
    Result,
};

/// Maximum nesting of arrays and boxed values
pub const MAX_NESTING_DEPTH: usize = 32;

/// The standard custom attribute blob prolog
pub const PROLOG: u16 = 0x0001;

/// Decoded constructor and named arguments
pub type DecodedArguments = (Vec<CAArgument>, Vec<CANamedArgument>);

/// Decode `blob` against the constructor signature `ctor`
///
/// # Errors
/// Returns [`crate::Error::Malformed`] for a wrong prolog or an unsupported type,
/// [`crate::Error::OutOfBounds`] on truncated data
pub fn parse_custom_attribute_blob(
    blob: &[u8],
    ctor: &MethodBaseSig,
    types: Option<&dyn CustomAttributeTypes>,
) -> Result<DecodedArguments> {
    CustomAttributeParser::new(blob, types).parse(ctor)
}

/// Reads a custom attribute blob
pub struct CustomAttributeParser<'a> {
    parser: Parser<'a>,
    types: Option<&'a dyn CustomAttributeTypes>,
    depth: usize,
}

impl<'a> CustomAttributeParser<'a> {
    /// Create a parser over `data`
    #[must_use]
    pub fn new(data: &'a [u8], types: Option<&'a dyn CustomAttributeTypes>) -> Self {
        CustomAttributeParser {
            parser: Parser::new(data),
            types,
            depth: 0,
        }
    }

    /// Decode the whole blob
    ///
    /// # Errors
    /// See [`parse_custom_attribute_blob`]
    pub fn parse(&mut self, ctor: &MethodBaseSig) -> Result<DecodedArguments> {
        let prolog = self.parser.read_le::<u16>()?;
        if prolog != PROLOG {
            return Err(malformed_error!(
                "Invalid custom attribute prolog - 0x{:04X}",
                prolog
            ));
        }

        let mut fixed = Vec::with_capacity(ctor.params.len());
        for param in &ctor.params {
            fixed.push(self.parse_fixed(param)?);
        }

        // Some compilers omit the named argument count when there are none
        let mut named = Vec::new();
        if self.parser.has_more_data() {
            let count = self.parser.read_le::<u16>()?;
            for _ in 0..count {
                named.push(self.parse_named()?);
            }
        }

        Ok((fixed, named))
    }

    fn parse_fixed(&mut self, arg_type: &TypeSig) -> Result<CAArgument> {
        if self.depth >= MAX_NESTING_DEPTH {
            return Err(RecursionLimit(MAX_NESTING_DEPTH));
        }

        self.depth += 1;
        let result = self.parse_fixed_inner(arg_type.remove_modifiers());
        self.depth -= 1;
        result
    }

    fn parse_fixed_inner(&mut self, arg_type: &TypeSig) -> Result<CAArgument> {
        let value = match arg_type {
            TypeSig::ValueType(token) => {
                let underlying = self
                    .types
                    .and_then(|types| types.enum_underlying_type(*token))
                    .unwrap_or(TypeSig::I4);
                return Ok(CAArgument::new(
                    arg_type.clone(),
                    self.parse_primitive(&underlying)?,
                ));
            }
            TypeSig::Class(_) => CAValue::Type(self.parser.read_ser_string()?),
            TypeSig::Object => {
                let boxed_type = self.parse_field_type()?;
                CAValue::Boxed(Box::new(self.parse_fixed(&boxed_type)?))
            }
            TypeSig::SzArray(element) => {
                let count = self.parser.read_le::<u32>()?;
                if count == u32::MAX {
                    CAValue::Array(None)
                } else {
                    let capacity = (count as usize).min(self.parser.remaining());
                    let mut elements = Vec::with_capacity(capacity);
                    for _ in 0..count {
                        elements.push(self.parse_fixed(element)?);
                    }
                    CAValue::Array(Some(elements))
                }
            }
            other => self.parse_primitive(other)?,
        };

        Ok(CAArgument::new(arg_type.clone(), value))
    }

    fn parse_primitive(&mut self, arg_type: &TypeSig) -> Result<CAValue> {
        Ok(match arg_type {
            TypeSig::Boolean => CAValue::Bool(self.parser.read_le::<u8>()? != 0),
            TypeSig::Char => CAValue::Char(self.parser.read_le::<u16>()?),
            TypeSig::I1 => CAValue::I1(self.parser.read_le::<i8>()?),
            TypeSig::U1 => CAValue::U1(self.parser.read_le::<u8>()?),
            TypeSig::I2 => CAValue::I2(self.parser.read_le::<i16>()?),
            TypeSig::U2 => CAValue::U2(self.parser.read_le::<u16>()?),
            TypeSig::I4 => CAValue::I4(self.parser.read_le::<i32>()?),
            TypeSig::U4 => CAValue::U4(self.parser.read_le::<u32>()?),
            TypeSig::I8 => CAValue::I8(self.parser.read_le::<i64>()?),
            TypeSig::U8 => CAValue::U8(self.parser.read_le::<u64>()?),
            TypeSig::R4 => CAValue::R4(self.parser.read_le::<f32>()?),
            TypeSig::R8 => CAValue::R8(self.parser.read_le::<f64>()?),
            TypeSig::String => CAValue::String(self.parser.read_ser_string()?),
            other => {
                return Err(malformed_error!(
                    "Unsupported custom attribute argument type - 0x{:02X}",
                    other.element_type()
                ))
            }
        })
    }

    fn parse_named(&mut self) -> Result<CANamedArgument> {
        let is_field = match self.parser.read_le::<u8>()? {
            SERIALIZATION_TYPE::FIELD => true,
            SERIALIZATION_TYPE::PROPERTY => false,
            other => {
                return Err(malformed_error!(
                    "Invalid named argument kind - 0x{:02X}",
                    other
                ))
            }
        };

        let field_type = self.parse_field_type()?;
        let name = self
            .parser
            .read_ser_string()?
            .ok_or_else(|| malformed_error!("Named argument without a name"))?;
        let argument = self.parse_fixed(&field_type)?;

        Ok(CANamedArgument {
            is_field,
            field_type,
            name,
            argument,
        })
    }

    fn parse_field_type(&mut self) -> Result<TypeSig> {
        let tag = self.parser.read_le::<u8>()?;
        Ok(match tag {
            SERIALIZATION_TYPE::BOOLEAN => TypeSig::Boolean,
            SERIALIZATION_TYPE::CHAR => TypeSig::Char,
            SERIALIZATION_TYPE::I1 => TypeSig::I1,
            SERIALIZATION_TYPE::U1 => TypeSig::U1,
            SERIALIZATION_TYPE::I2 => TypeSig::I2,
            SERIALIZATION_TYPE::U2 => TypeSig::U2,
            SERIALIZATION_TYPE::I4 => TypeSig::I4,
            SERIALIZATION_TYPE::U4 => TypeSig::U4,
            SERIALIZATION_TYPE::I8 => TypeSig::I8,
            SERIALIZATION_TYPE::U8 => TypeSig::U8,
            SERIALIZATION_TYPE::R4 => TypeSig::R4,
            SERIALIZATION_TYPE::R8 => TypeSig::R8,
            SERIALIZATION_TYPE::STRING => TypeSig::String,
            SERIALIZATION_TYPE::TAGGED_OBJECT => TypeSig::Object,
            SERIALIZATION_TYPE::SZARRAY => {
                if self.depth >= MAX_NESTING_DEPTH {
                    return Err(RecursionLimit(MAX_NESTING_DEPTH));
                }
                self.depth += 1;
                let element = self.parse_field_type();
                self.depth -= 1;
                TypeSig::SzArray(Box::new(element?))
            }
            SERIALIZATION_TYPE::TYPE => TypeSig::Class(
                self.types
                    .and_then(|types| types.type_by_name("System.Type"))
                    .unwrap_or(Token::new(0)),
            ),
            SERIALIZATION_TYPE::ENUM => {
                let name = self
                    .parser
                    .read_ser_string()?
                    .ok_or_else(|| malformed_error!("Enum argument without a type name"))?;
                let token = self
                    .types
                    .and_then(|types| types.type_by_name(&name))
                    .ok_or_else(|| malformed_error!("Unresolved enum type - {}", name))?;
                TypeSig::ValueType(token)
            }
            other => {
                return Err(malformed_error!(
                    "Invalid serialization type - 0x{:02X}",
                    other
                ))
            }
        })
    }
}
