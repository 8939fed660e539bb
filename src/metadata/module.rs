//! The owning-module boundary.
//!
//! Row-backed entities never own the tables, heaps or the type system they were read from.
//! They hold a [`std::sync::Weak`] reference to a [`ModuleContext`] and go through it for
//! every lookup: raw rows, reference resolution, signature blobs, custom attributes and
//! custom debug information.

use crate::metadata::{
    customattributes::CustomAttribute,
    customdebuginformation::PdbCustomDebugInfo,
    signatures::{CallingConventionSig, FullNameBuilder, MethodSig, TypeNameResolver, TypeSig},
    tables::{MethodSpecRaw, TableId},
    token::Token,
};

/// The generic parameters in scope while resolving a reference
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct GenericParamContext {
    /// The type whose `!n` parameters are in scope
    pub type_token: Option<Token>,
    /// The method whose `!!n` parameters are in scope
    pub method_token: Option<Token>,
}

impl GenericParamContext {
    /// A context for code inside `method`, declared by `declaring_type`
    #[must_use]
    pub fn new(declaring_type: Option<Token>, method: Option<Token>) -> Self {
        GenericParamContext {
            type_token: declaring_type,
            method_token: method,
        }
    }

    /// `true` if no generic parameters are in scope
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.type_token.is_none() && self.method_token.is_none()
    }
}

/// A list of rids, either a contiguous run or an explicit list
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RidList {
    /// `start..start + len`
    Contiguous {
        /// First rid
        start: u32,
        /// Number of rids
        len: u32,
    },
    /// Explicit rids, e.g. gathered through a sorted key column
    List(Vec<u32>),
}

impl RidList {
    /// An empty list
    #[must_use]
    pub fn empty() -> Self {
        RidList::Contiguous { start: 0, len: 0 }
    }

    /// Number of rids
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            RidList::Contiguous { len, .. } => *len as usize,
            RidList::List(rids) => rids.len(),
        }
    }

    /// `true` if the list holds no rid
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The rid at `index`
    #[must_use]
    pub fn get(&self, index: usize) -> Option<u32> {
        match self {
            RidList::Contiguous { start, len } => u32::try_from(index)
                .ok()
                .filter(|index| index < len)
                .map(|index| start + index),
            RidList::List(rids) => rids.get(index).copied(),
        }
    }

    /// Iterate over the rids in order
    pub fn iter(&self) -> impl Iterator<Item = u32> + '_ {
        (0..self.len()).filter_map(move |index| self.get(index))
    }
}

/// The class a `MemberRef` belongs to
#[derive(Clone, Debug, PartialEq)]
pub enum MemberRefParent {
    /// A `TypeDef` or `TypeRef`
    Type {
        /// Token of the type
        token: Token,
        /// Full name of the type
        full_name: String,
    },
    /// A `TypeSpec`, typically a generic instantiation
    TypeSpec {
        /// Token of the `TypeSpec` row
        token: Token,
        /// The decoded type signature
        signature: TypeSig,
    },
    /// `ModuleRef`, `MethodDef` or anything else without a type name
    Other(Token),
}

/// A resolved `MethodDef`
#[derive(Clone, Debug, PartialEq)]
pub struct MethodDefInfo {
    /// Token of the method
    pub token: Token,
    /// Name of the method
    pub name: String,
    /// Full name of the declaring type
    pub declaring_type: Option<String>,
    /// Method signature
    pub signature: Option<MethodSig>,
}

/// A resolved `MemberRef` that refers to a method
#[derive(Clone, Debug, PartialEq)]
pub struct MemberRefInfo {
    /// Token of the member reference
    pub token: Token,
    /// Name of the member
    pub name: String,
    /// The referenced class
    pub class: MemberRefParent,
    /// Method signature, `None` for field references
    pub signature: Option<MethodSig>,
}

impl MemberRefInfo {
    /// Full name of the declaring type
    #[must_use]
    pub fn declaring_type_full_name(&self, names: Option<&dyn TypeNameResolver>) -> Option<String> {
        match &self.class {
            MemberRefParent::Type { full_name, .. } => Some(full_name.clone()),
            MemberRefParent::TypeSpec { signature, .. } => {
                Some(FullNameBuilder::new(names).type_full_name(signature))
            }
            MemberRefParent::Other(_) => None,
        }
    }

    /// The type arguments of the declaring type, if it is a generic instantiation
    #[must_use]
    pub fn declaring_type_generic_args(&self) -> Option<&[TypeSig]> {
        match &self.class {
            MemberRefParent::TypeSpec {
                signature: TypeSig::GenericInst(inst),
                ..
            } => Some(&inst.generic_arguments),
            _ => None,
        }
    }
}

/// The result of resolving a `MethodDefOrRef` coded index
#[derive(Clone, Debug, PartialEq)]
pub enum MethodDefOrRef {
    /// A method defined in this module
    MethodDef(MethodDefInfo),
    /// A reference to a method, possibly of another module
    MemberRef(MemberRefInfo),
}

impl MethodDefOrRef {
    /// Token of the resolved row
    #[must_use]
    pub fn token(&self) -> Token {
        match self {
            MethodDefOrRef::MethodDef(method) => method.token,
            MethodDefOrRef::MemberRef(member) => member.token,
        }
    }

    /// Name of the method
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            MethodDefOrRef::MethodDef(method) => &method.name,
            MethodDefOrRef::MemberRef(member) => &member.name,
        }
    }

    /// Signature of the method
    #[must_use]
    pub fn method_sig(&self) -> Option<&MethodSig> {
        match self {
            MethodDefOrRef::MethodDef(method) => method.signature.as_ref(),
            MethodDefOrRef::MemberRef(member) => member.signature.as_ref(),
        }
    }

    /// Full name of the declaring type
    #[must_use]
    pub fn declaring_type_full_name(&self, names: Option<&dyn TypeNameResolver>) -> Option<String> {
        match self {
            MethodDefOrRef::MethodDef(method) => method.declaring_type.clone(),
            MethodDefOrRef::MemberRef(member) => member.declaring_type_full_name(names),
        }
    }
}

/// Lookups a row-backed entity needs from the module it was read from.
///
/// Every method reports "not found" as `None` (or an empty collection); none of them fail.
pub trait ModuleContext: TypeNameResolver + Send + Sync {
    /// Number of rows in the `MethodSpec` table
    fn method_spec_count(&self) -> u32;

    /// The raw `MethodSpec` row `rid`
    fn method_spec_row(&self, rid: u32) -> Option<MethodSpecRaw>;

    /// Resolve a `MethodDefOrRef` coded index
    fn resolve_method_def_or_ref(
        &self,
        coded_index: u32,
        context: &GenericParamContext,
    ) -> Option<MethodDefOrRef>;

    /// Decode the signature stored at `blob_index` in the `#Blob` heap
    fn read_signature(
        &self,
        blob_index: u32,
        context: &GenericParamContext,
    ) -> Option<CallingConventionSig>;

    /// Rids of the `CustomAttribute` rows owned by row `rid` of `table`
    fn custom_attribute_rids(&self, table: TableId, rid: u32) -> RidList;

    /// Read custom attribute row `rid`
    fn read_custom_attribute(&self, rid: u32) -> Option<CustomAttribute>;

    /// Custom debug information attached to `token`
    fn custom_debug_infos(
        &self,
        token: Token,
        context: &GenericParamContext,
    ) -> Vec<PdbCustomDebugInfo>;
}
