//! Encoder for custom attribute blobs, the inverse of [`super::parser`].

use crate::{
    file::io::{write_compressed_uint, write_le},
    metadata::{
        customattributes::{
            parser::PROLOG,
            types::{CAArgument, CANamedArgument, CAValue, SERIALIZATION_TYPE},
        },
        signatures::{TypeNameResolver, TypeSig},
    },
    Error, Result,
};

/// Encode constructor and named arguments into a custom attribute blob.
///
/// `names` supplies the serialized names of enum types used by named or boxed arguments.
///
/// # Errors
/// Returns [`crate::Error::Encoding`] for a type that has no serialized form, or an enum type
/// whose name cannot be resolved
pub fn encode_custom_attribute(
    fixed: &[CAArgument],
    named: &[CANamedArgument],
    names: Option<&dyn TypeNameResolver>,
) -> Result<Vec<u8>> {
    let mut encoder = CustomAttributeEncoder {
        buffer: Vec::new(),
        names,
    };

    write_le(&mut encoder.buffer, PROLOG);
    for argument in fixed {
        encoder.write_value(argument)?;
    }

    let count = u16::try_from(named.len())
        .map_err(|_| Error::Encoding(format!("too many named arguments - {}", named.len())))?;
    write_le(&mut encoder.buffer, count);
    for argument in named {
        encoder.write_named(argument)?;
    }

    Ok(encoder.buffer)
}

struct CustomAttributeEncoder<'a> {
    buffer: Vec<u8>,
    names: Option<&'a dyn TypeNameResolver>,
}

impl CustomAttributeEncoder<'_> {
    fn write_named(&mut self, argument: &CANamedArgument) -> Result<()> {
        self.buffer.push(if argument.is_field {
            SERIALIZATION_TYPE::FIELD
        } else {
            SERIALIZATION_TYPE::PROPERTY
        });
        self.write_field_type(&argument.field_type)?;
        self.write_ser_string(Some(&argument.name))?;
        self.write_value(&argument.argument)
    }

    fn write_value(&mut self, argument: &CAArgument) -> Result<()> {
        match &argument.value {
            CAValue::Bool(value) => self.buffer.push(u8::from(*value)),
            CAValue::Char(value) => write_le(&mut self.buffer, *value),
            CAValue::I1(value) => write_le(&mut self.buffer, *value),
            CAValue::U1(value) => write_le(&mut self.buffer, *value),
            CAValue::I2(value) => write_le(&mut self.buffer, *value),
            CAValue::U2(value) => write_le(&mut self.buffer, *value),
            CAValue::I4(value) => write_le(&mut self.buffer, *value),
            CAValue::U4(value) => write_le(&mut self.buffer, *value),
            CAValue::I8(value) => write_le(&mut self.buffer, *value),
            CAValue::U8(value) => write_le(&mut self.buffer, *value),
            CAValue::R4(value) => write_le(&mut self.buffer, *value),
            CAValue::R8(value) => write_le(&mut self.buffer, *value),
            CAValue::String(value) | CAValue::Type(value) => {
                self.write_ser_string(value.as_deref())?;
            }
            CAValue::Boxed(inner) => {
                self.write_field_type(&inner.arg_type)?;
                self.write_value(inner)?;
            }
            CAValue::Array(None) => write_le(&mut self.buffer, u32::MAX),
            CAValue::Array(Some(elements)) => {
                let count = u32::try_from(elements.len())
                    .map_err(|_| Error::Encoding("array too long".to_string()))?;
                write_le(&mut self.buffer, count);
                for element in elements {
                    self.write_value(element)?;
                }
            }
        }

        Ok(())
    }

    fn write_field_type(&mut self, field_type: &TypeSig) -> Result<()> {
        match field_type.remove_modifiers() {
            primitive @ (TypeSig::Boolean
            | TypeSig::Char
            | TypeSig::I1
            | TypeSig::U1
            | TypeSig::I2
            | TypeSig::U2
            | TypeSig::I4
            | TypeSig::U4
            | TypeSig::I8
            | TypeSig::U8
            | TypeSig::R4
            | TypeSig::R8
            | TypeSig::String) => self.buffer.push(primitive.element_type()),
            TypeSig::Object => self.buffer.push(SERIALIZATION_TYPE::TAGGED_OBJECT),
            TypeSig::Class(_) => self.buffer.push(SERIALIZATION_TYPE::TYPE),
            TypeSig::SzArray(element) => {
                self.buffer.push(SERIALIZATION_TYPE::SZARRAY);
                self.write_field_type(element)?;
            }
            TypeSig::ValueType(token) => {
                let name = self
                    .names
                    .and_then(|names| names.type_full_name(*token))
                    .ok_or_else(|| Error::Encoding(format!("unnamed enum type - {token}")))?;
                self.buffer.push(SERIALIZATION_TYPE::ENUM);
                self.write_ser_string(Some(&name))?;
            }
            other => {
                return Err(Error::Encoding(format!(
                    "no serialization type for element type 0x{:02X}",
                    other.element_type()
                )))
            }
        }

        Ok(())
    }

    fn write_ser_string(&mut self, value: Option<&str>) -> Result<()> {
        match value {
            None => self.buffer.push(0xFF),
            Some(value) => {
                let len = u32::try_from(value.len())
                    .map_err(|_| Error::Encoding("string too long".to_string()))?;
                write_compressed_uint(len, &mut self.buffer)?;
                self.buffer.extend_from_slice(value.as_bytes());
            }
        }

        Ok(())
    }
}
