//! Signature encoders, the exact inverse of [`crate::metadata::signatures::SignatureParser`].

use crate::{
    file::io::{write_compressed_int, write_compressed_uint},
    metadata::{
        signatures::{
            CallingConventionSig, FieldSig, GenericInstMethodSig, LocalSig, MethodBaseSig,
            MethodSig, PropertySig, TypeSig, ELEMENT_TYPE,
        },
        tables::CodedIndexType,
        token::Token,
    },
    Error, Result,
};

fn encode_token(token: Token, buffer: &mut Vec<u8>) -> Result<()> {
    let coded = CodedIndexType::TypeDefOrRef.encode(token)?;
    write_compressed_uint(coded, buffer)
}

fn encode_count(count: usize, buffer: &mut Vec<u8>) -> Result<()> {
    let count = u32::try_from(count)
        .map_err(|_| Error::Encoding(format!("element count too large - {count}")))?;
    write_compressed_uint(count, buffer)
}

/// Append the encoding of a single type
///
/// # Errors
/// Returns an error if a token is not a `TypeDefOrRef` token or a number does not fit the
/// compressed integer range
pub fn encode_type(sig: &TypeSig, buffer: &mut Vec<u8>) -> Result<()> {
    buffer.push(sig.element_type());

    match sig {
        TypeSig::Ptr(inner)
        | TypeSig::ByRef(inner)
        | TypeSig::Pinned(inner)
        | TypeSig::SzArray(inner) => encode_type(inner, buffer)?,
        TypeSig::ValueType(token) | TypeSig::Class(token) => encode_token(*token, buffer)?,
        TypeSig::Var(number) | TypeSig::MVar(number) => write_compressed_uint(*number, buffer)?,
        TypeSig::CModReqd(modifier, inner) | TypeSig::CModOpt(modifier, inner) => {
            encode_token(*modifier, buffer)?;
            encode_type(inner, buffer)?;
        }
        TypeSig::Array(array) => {
            encode_type(&array.element, buffer)?;
            write_compressed_uint(array.rank, buffer)?;
            encode_count(array.sizes.len(), buffer)?;
            for size in &array.sizes {
                write_compressed_uint(*size, buffer)?;
            }
            encode_count(array.lower_bounds.len(), buffer)?;
            for bound in &array.lower_bounds {
                write_compressed_int(*bound, buffer)?;
            }
        }
        TypeSig::GenericInst(inst) => {
            encode_type(&inst.generic_type, buffer)?;
            encode_count(inst.generic_arguments.len(), buffer)?;
            for argument in &inst.generic_arguments {
                encode_type(argument, buffer)?;
            }
        }
        TypeSig::FnPtr(method) => encode_method_base(method, buffer)?,
        _ => {}
    }

    Ok(())
}

fn encode_method_base(sig: &MethodBaseSig, buffer: &mut Vec<u8>) -> Result<()> {
    buffer.push(sig.convention.value());
    if sig.convention.generic() {
        write_compressed_uint(sig.gen_param_count, buffer)?;
    }

    encode_count(sig.param_count(), buffer)?;
    encode_type(&sig.ret_type, buffer)?;
    for param in &sig.params {
        encode_type(param, buffer)?;
    }

    if let Some(after) = &sig.params_after_sentinel {
        buffer.push(ELEMENT_TYPE::SENTINEL);
        for param in after {
            encode_type(param, buffer)?;
        }
    }

    Ok(())
}

fn encode_type_list(types: &[TypeSig], buffer: &mut Vec<u8>) -> Result<()> {
    encode_count(types.len(), buffer)?;
    for sig in types {
        encode_type(sig, buffer)?;
    }
    Ok(())
}

/// Encode a method signature
///
/// # Errors
/// See [`encode_type`]
pub fn encode_method_signature(sig: &MethodSig) -> Result<Vec<u8>> {
    let mut buffer = Vec::new();
    encode_method_base(sig, &mut buffer)?;
    Ok(buffer)
}

/// Encode a property signature
///
/// # Errors
/// See [`encode_type`]
pub fn encode_property_signature(sig: &PropertySig) -> Result<Vec<u8>> {
    let mut buffer = Vec::new();
    encode_method_base(sig, &mut buffer)?;
    Ok(buffer)
}

/// Encode a field signature
///
/// # Errors
/// See [`encode_type`]
pub fn encode_field_signature(sig: &FieldSig) -> Result<Vec<u8>> {
    let mut buffer = vec![sig.convention.value()];
    encode_type(&sig.field_type, &mut buffer)?;
    Ok(buffer)
}

/// Encode a local variable signature
///
/// # Errors
/// See [`encode_type`]
pub fn encode_local_signature(sig: &LocalSig) -> Result<Vec<u8>> {
    let mut buffer = vec![sig.convention.value()];
    encode_type_list(&sig.locals, &mut buffer)?;
    Ok(buffer)
}

/// Encode a generic method instantiation
///
/// # Errors
/// See [`encode_type`]
pub fn encode_generic_inst_signature(sig: &GenericInstMethodSig) -> Result<Vec<u8>> {
    let mut buffer = vec![sig.convention.value()];
    encode_type_list(&sig.generic_arguments, &mut buffer)?;
    Ok(buffer)
}

/// Encode any signature
///
/// # Errors
/// See [`encode_type`]
pub fn encode_signature(sig: &CallingConventionSig) -> Result<Vec<u8>> {
    match sig {
        CallingConventionSig::Field(sig) => encode_field_signature(sig),
        CallingConventionSig::Method(sig) => encode_method_signature(sig),
        CallingConventionSig::Property(sig) => encode_property_signature(sig),
        CallingConventionSig::LocalSig(sig) => encode_local_signature(sig),
        CallingConventionSig::GenericInst(sig) => encode_generic_inst_signature(sig),
    }
}
