//! # dotmeta Prelude
//!
//! The most commonly used types of the crate, for glob import.

pub use crate::{Error, OffsetMask, ReaderOptions, Result};

pub use crate::file::{
    cursor::{ByteCursor, SliceCursor},
    parser::Parser,
};

pub use crate::metadata::{
    customattributes::{
        CAArgument, CANamedArgument, CAValue, CustomAttribute, CustomAttributeData,
        CustomAttributeList, CustomAttributeRc,
    },
    customdebuginformation::{CustomDebugKind, PdbCustomDebugInfo},
    module::{GenericParamContext, MethodDefOrRef, ModuleContext},
    root::{MetadataHeader, StorageFlags},
    signatures::{
        encode_method_signature, encode_signature, parse_method_signature, parse_signature,
        CallingConvention, CallingConventionSig, FieldSig, FullNameBuilder, GenericInstMethodSig,
        LocalSig, MethodBaseSig, MethodSig, PropertySig, TypeSig,
    },
    streams::{
        hot::{HotTableGeneration, HotTableStream},
        StreamHeader,
    },
    tables::{
        MethodSpec, MethodSpecMap, MethodSpecMd, MethodSpecRc, MethodSpecUser, TableDescriptor,
        TableId,
    },
    token::Token,
};

pub use crate::writer::{Chunk, StrongNameSignature};
