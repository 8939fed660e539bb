//! Signature model and codec.
//!
//! Every signature blob opens with a [`CallingConvention`] byte whose kind nibble selects the
//! layout that follows:
//!
//! - **Method / Property** - optional generic parameter count, parameter count, return type,
//!   parameters; a sentinel (`0x41`) splits the variable part of a vararg call site off into
//!   [`MethodBaseSig::params_after_sentinel`]
//! - **Field** - a single type
//! - **LocalSig** - count followed by the local types
//! - **GenericInst** - count followed by the type arguments of a `MethodSpec`
//!
//! Types form an owned recursive tree ([`TypeSig`]). Decoding and then encoding a blob
//! reproduces it byte for byte.
//!
//! # Examples
//!
//! ```rust
//! use dotmeta::metadata::signatures::{encode_signature, parse_signature};
//!
//! let blob = &[0x05, 0x02, 0x01, 0x08, 0x41, 0x0E]; // vararg void (int32, ..., string)
//! let sig = parse_signature(blob)?;
//! assert_eq!(encode_signature(&sig)?, blob);
//! # Ok::<(), dotmeta::Error>(())
//! ```
//!
//! # References
//!
//! - ECMA-335 6th Edition, Partition II, Section 23.2 - Blobs and Signatures

mod callingconvention;
mod encoders;
mod fullname;
mod parser;
mod sigs;
mod types;

pub use callingconvention::*;
pub use encoders::*;
pub use fullname::*;
pub use parser::*;
pub use sigs::*;
pub use types::*;

use crate::{ReaderOptions, Result};

/// Parse any signature blob
///
/// # Errors
/// Returns an error if the blob is malformed
pub fn parse_signature(data: &[u8]) -> Result<CallingConventionSig> {
    SignatureParser::new(data).parse_signature()
}

/// Parse any signature blob, nesting types at most [`ReaderOptions::max_signature_depth`] deep
///
/// # Errors
/// Returns an error if the blob is malformed or nests deeper than allowed
pub fn parse_signature_with_options(
    data: &[u8],
    options: &ReaderOptions,
) -> Result<CallingConventionSig> {
    SignatureParser::with_max_depth(data, options.max_signature_depth).parse_signature()
}

/// Parse a method signature blob
///
/// # Errors
/// Returns an error if the blob is not a well-formed method signature
pub fn parse_method_signature(data: &[u8]) -> Result<MethodSig> {
    SignatureParser::new(data).parse_method_signature()
}

/// Parse a property signature blob
///
/// # Errors
/// Returns an error if the blob is not a well-formed property signature
pub fn parse_property_signature(data: &[u8]) -> Result<PropertySig> {
    SignatureParser::new(data).parse_property_signature()
}

/// Parse a field signature blob
///
/// # Errors
/// Returns an error if the blob is not a well-formed field signature
pub fn parse_field_signature(data: &[u8]) -> Result<FieldSig> {
    SignatureParser::new(data).parse_field_signature()
}

/// Parse a local variable signature blob
///
/// # Errors
/// Returns an error if the blob is not a well-formed local variable signature
pub fn parse_local_signature(data: &[u8]) -> Result<LocalSig> {
    SignatureParser::new(data).parse_local_signature()
}

/// Parse the instantiation blob of a `MethodSpec`
///
/// # Errors
/// Returns an error if the blob is not a well-formed generic instantiation
pub fn parse_generic_inst_signature(data: &[u8]) -> Result<GenericInstMethodSig> {
    SignatureParser::new(data).parse_generic_inst_signature()
}

/// Parse a `TypeSpec` blob, a single type without a convention byte
///
/// # Errors
/// Returns an error if the type is malformed
pub fn parse_type_spec_signature(data: &[u8]) -> Result<TypeSig> {
    SignatureParser::new(data).parse_type()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn options_limit_nesting() {
        // field of int32[][][][]
        let blob = [0x06, 0x1D, 0x1D, 0x1D, 0x1D, 0x08];
        let shallow = ReaderOptions {
            max_signature_depth: 3,
            ..ReaderOptions::default()
        };

        assert!(matches!(
            parse_signature_with_options(&blob, &shallow),
            Err(crate::Error::RecursionLimit(3))
        ));
        assert!(parse_signature_with_options(&blob, &ReaderOptions::default()).is_ok());
    }
}
