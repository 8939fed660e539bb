use crate::metadata::{signatures::MethodSig, token::Token};

#[allow(non_snake_case, missing_docs)]
/// Element type bytes of the signature encoding (II.23.1.16)
pub mod ELEMENT_TYPE {
    pub const END: u8 = 0x00;
    pub const VOID: u8 = 0x01;
    pub const BOOLEAN: u8 = 0x02;
    pub const CHAR: u8 = 0x03;
    pub const I1: u8 = 0x04;
    pub const U1: u8 = 0x05;
    pub const I2: u8 = 0x06;
    pub const U2: u8 = 0x07;
    pub const I4: u8 = 0x08;
    pub const U4: u8 = 0x09;
    pub const I8: u8 = 0x0a;
    pub const U8: u8 = 0x0b;
    pub const R4: u8 = 0x0c;
    pub const R8: u8 = 0x0d;
    pub const STRING: u8 = 0x0e;
    // Followed by type
    pub const PTR: u8 = 0x0f;
    // Followed by type
    pub const BYREF: u8 = 0x10;
    // Followed by a TypeDefOrRef token
    pub const VALUETYPE: u8 = 0x11;
    // Followed by a TypeDefOrRef token
    pub const CLASS: u8 = 0x12;
    // Generic parameter of the declaring type, followed by its number
    pub const VAR: u8 = 0x13;
    // type rank numSizes size1 … numLoBounds lo1 …
    pub const ARRAY: u8 = 0x14;
    // type arg-count arg-1 ... arg-n
    pub const GENERICINST: u8 = 0x15;
    pub const TYPEDBYREF: u8 = 0x16;
    pub const I: u8 = 0x18;
    pub const U: u8 = 0x19;
    // Followed by a method signature
    pub const FNPTR: u8 = 0x1b;
    pub const OBJECT: u8 = 0x1c;
    pub const SZARRAY: u8 = 0x1d;
    // Generic parameter of the declaring method, followed by its number
    pub const MVAR: u8 = 0x1e;
    pub const CMOD_REQD: u8 = 0x1f;
    pub const CMOD_OPT: u8 = 0x20;
    pub const INTERNAL: u8 = 0x21;
    pub const MODIFIER: u8 = 0x40;
    // Start of the variable part of a vararg call site
    pub const SENTINEL: u8 = 0x41;
    pub const PINNED: u8 = 0x45;
}

/// A type signature (II.23.2.12).
///
/// The tree mirrors the encoding one element type per node: modifiers, `byref` and `pinned`
/// wrap the type they apply to, so decoding and re-encoding reproduces the input bytes.
#[derive(Debug, Clone, PartialEq)]
#[allow(missing_docs)]
pub enum TypeSig {
    Void,
    Boolean,
    Char,
    I1,
    U1,
    I2,
    U2,
    I4,
    U4,
    I8,
    U8,
    R4,
    R8,
    String,
    TypedByRef,
    I,
    U,
    Object,
    /// Unmanaged pointer to the inner type
    Ptr(Box<TypeSig>),
    /// Managed reference to the inner type
    ByRef(Box<TypeSig>),
    /// Pinned local
    Pinned(Box<TypeSig>),
    /// Value type, `TypeDefOrRef` token
    ValueType(Token),
    /// Reference type, `TypeDefOrRef` token
    Class(Token),
    /// Generic parameter of the declaring type
    Var(u32),
    /// Generic parameter of the declaring method
    MVar(u32),
    /// General array
    Array(ArraySig),
    /// Single-dimension, zero-based array
    SzArray(Box<TypeSig>),
    /// Instantiated generic type
    GenericInst(GenericInstSig),
    /// Function pointer
    FnPtr(Box<MethodSig>),
    /// Required custom modifier applied to the inner type
    CModReqd(Token, Box<TypeSig>),
    /// Optional custom modifier applied to the inner type
    CModOpt(Token, Box<TypeSig>),
}

/// A general array: element type, rank, and the leading sizes and lower bounds
#[derive(Debug, Clone, PartialEq)]
pub struct ArraySig {
    /// The element type
    pub element: Box<TypeSig>,
    /// Number of dimensions
    pub rank: u32,
    /// Sizes of the leading dimensions
    pub sizes: Vec<u32>,
    /// Lower bounds of the leading dimensions
    pub lower_bounds: Vec<i32>,
}

/// A generic type instantiation
#[derive(Debug, Clone, PartialEq)]
pub struct GenericInstSig {
    /// The generic type, always [`TypeSig::Class`] or [`TypeSig::ValueType`]
    pub generic_type: Box<TypeSig>,
    /// Type arguments in declaration order
    pub generic_arguments: Vec<TypeSig>,
}

impl TypeSig {
    /// The element type byte that introduces this node
    #[must_use]
    pub fn element_type(&self) -> u8 {
        match self {
            TypeSig::Void => ELEMENT_TYPE::VOID,
            TypeSig::Boolean => ELEMENT_TYPE::BOOLEAN,
            TypeSig::Char => ELEMENT_TYPE::CHAR,
            TypeSig::I1 => ELEMENT_TYPE::I1,
            TypeSig::U1 => ELEMENT_TYPE::U1,
            TypeSig::I2 => ELEMENT_TYPE::I2,
            TypeSig::U2 => ELEMENT_TYPE::U2,
            TypeSig::I4 => ELEMENT_TYPE::I4,
            TypeSig::U4 => ELEMENT_TYPE::U4,
            TypeSig::I8 => ELEMENT_TYPE::I8,
            TypeSig::U8 => ELEMENT_TYPE::U8,
            TypeSig::R4 => ELEMENT_TYPE::R4,
            TypeSig::R8 => ELEMENT_TYPE::R8,
            TypeSig::String => ELEMENT_TYPE::STRING,
            TypeSig::TypedByRef => ELEMENT_TYPE::TYPEDBYREF,
            TypeSig::I => ELEMENT_TYPE::I,
            TypeSig::U => ELEMENT_TYPE::U,
            TypeSig::Object => ELEMENT_TYPE::OBJECT,
            TypeSig::Ptr(_) => ELEMENT_TYPE::PTR,
            TypeSig::ByRef(_) => ELEMENT_TYPE::BYREF,
            TypeSig::Pinned(_) => ELEMENT_TYPE::PINNED,
            TypeSig::ValueType(_) => ELEMENT_TYPE::VALUETYPE,
            TypeSig::Class(_) => ELEMENT_TYPE::CLASS,
            TypeSig::Var(_) => ELEMENT_TYPE::VAR,
            TypeSig::MVar(_) => ELEMENT_TYPE::MVAR,
            TypeSig::Array(_) => ELEMENT_TYPE::ARRAY,
            TypeSig::SzArray(_) => ELEMENT_TYPE::SZARRAY,
            TypeSig::GenericInst(_) => ELEMENT_TYPE::GENERICINST,
            TypeSig::FnPtr(_) => ELEMENT_TYPE::FNPTR,
            TypeSig::CModReqd(..) => ELEMENT_TYPE::CMOD_REQD,
            TypeSig::CModOpt(..) => ELEMENT_TYPE::CMOD_OPT,
        }
    }

    /// The wrapped type of a modifier, pointer, reference, pinned or array node
    #[must_use]
    pub fn next(&self) -> Option<&TypeSig> {
        match self {
            TypeSig::Ptr(inner)
            | TypeSig::ByRef(inner)
            | TypeSig::Pinned(inner)
            | TypeSig::SzArray(inner)
            | TypeSig::CModReqd(_, inner)
            | TypeSig::CModOpt(_, inner) => Some(inner),
            TypeSig::Array(array) => Some(&array.element),
            _ => None,
        }
    }

    /// This type with leading custom modifiers and `pinned` stripped
    #[must_use]
    pub fn remove_modifiers(&self) -> &TypeSig {
        let mut current = self;
        while let TypeSig::CModReqd(_, inner) | TypeSig::CModOpt(_, inner) | TypeSig::Pinned(inner) =
            current
        {
            current = inner;
        }
        current
    }

    /// `true` if this type, or any type nested in it, is a `Var` or `MVar`
    #[must_use]
    pub fn contains_generic_parameter(&self) -> bool {
        match self {
            TypeSig::Var(_) | TypeSig::MVar(_) => true,
            TypeSig::GenericInst(inst) => {
                inst.generic_type.contains_generic_parameter()
                    || inst
                        .generic_arguments
                        .iter()
                        .any(TypeSig::contains_generic_parameter)
            }
            TypeSig::FnPtr(method) => {
                method.ret_type.contains_generic_parameter()
                    || method.params.iter().any(TypeSig::contains_generic_parameter)
                    || method
                        .params_after_sentinel
                        .iter()
                        .flatten()
                        .any(TypeSig::contains_generic_parameter)
            }
            _ => self.next().is_some_and(TypeSig::contains_generic_parameter),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generic_parameters_are_found_when_nested() {
        let closed = TypeSig::GenericInst(GenericInstSig {
            generic_type: Box::new(TypeSig::Class(Token::new(0x0100_0001))),
            generic_arguments: vec![TypeSig::I4, TypeSig::SzArray(Box::new(TypeSig::String))],
        });
        assert!(!closed.contains_generic_parameter());

        let open = TypeSig::ByRef(Box::new(TypeSig::SzArray(Box::new(TypeSig::MVar(0)))));
        assert!(open.contains_generic_parameter());
    }

    #[test]
    fn strip_modifiers() {
        let sig = TypeSig::CModOpt(
            Token::new(0x0100_0002),
            Box::new(TypeSig::CModReqd(Token::new(0x0100_0003), Box::new(TypeSig::I4))),
        );
        assert_eq!(sig.remove_modifiers(), &TypeSig::I4);
        assert_eq!(sig.element_type(), ELEMENT_TYPE::CMOD_OPT);
    }
}
