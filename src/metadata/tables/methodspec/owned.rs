//! The `MethodSpec` entity trait and entities created in code

use std::sync::{
    atomic::{AtomicU32, Ordering},
    Arc,
};

use crate::metadata::{
    customattributes::CustomAttributeList,
    customdebuginformation::PdbCustomDebugInfoList,
    module::MethodDefOrRef,
    signatures::{CallingConventionSig, FullNameBuilder, GenericInstMethodSig, TypeNameResolver},
    tables::TableId,
    token::Token,
};

/// An instantiated generic method, row 0x2B of the metadata tables.
///
/// Implemented by [`MethodSpecUser`] for entities built in code and by
/// [`super::MethodSpecMd`] for entities read from a module.
pub trait MethodSpec: Send + Sync {
    /// Current row id. Zero until a writer assigns one to a new entity.
    fn rid(&self) -> u32;

    /// Change the row id, used when a writer renumbers rows
    fn set_rid(&self, rid: u32);

    /// Token derived from the current row id
    fn token(&self) -> Token {
        Token::from_parts(TableId::MethodSpec, self.rid())
    }

    /// The generic method, a `MethodDef` or a `MemberRef`
    fn method(&self) -> Option<&MethodDefOrRef>;

    /// The instantiation signature
    fn instantiation(&self) -> Option<&CallingConventionSig>;

    /// Custom attributes applied to this entity
    fn custom_attributes(&self) -> &CustomAttributeList;

    /// Custom debug information of this entity
    fn custom_debug_infos(&self) -> &PdbCustomDebugInfoList;

    /// The instantiation, if it is a generic method instantiation signature
    fn generic_inst_method_sig(&self) -> Option<&GenericInstMethodSig> {
        self.instantiation()
            .and_then(CallingConventionSig::as_generic_inst)
    }

    /// Number of generic arguments supplied by the instantiation
    fn number_of_generic_parameters(&self) -> usize {
        self.generic_inst_method_sig()
            .map_or(0, |sig| sig.generic_arguments.len())
    }

    /// Name of the instantiated method
    fn name(&self) -> &str {
        self.method().map_or("", MethodDefOrRef::name)
    }

    /// Full name, e.g. `System.String Demo.Mapper::Map<System.String>(System.Object)`
    fn full_name(&self, names: Option<&dyn TypeNameResolver>) -> String {
        method_spec_full_name(self.method(), self.generic_inst_method_sig(), names)
    }

    /// `true` if the entity has at least one custom attribute
    fn has_custom_attributes(&self) -> bool {
        self.custom_attributes().count() > 0
    }

    /// `true` if the entity has at least one custom debug information record
    fn has_custom_debug_infos(&self) -> bool {
        self.custom_debug_infos().count() > 0
    }

    /// Tag of this table in the `HasCustomAttribute` coded index
    fn has_custom_attribute_tag(&self) -> u32 {
        21
    }

    /// Tag of this table in the `HasCustomDebugInformation` coded index
    fn has_custom_debug_information_tag(&self) -> u32 {
        21
    }
}

/// Render the full name of a method instantiation.
///
/// A `MethodDef` is rendered with its declaring type and the method generic arguments. A
/// `MemberRef` additionally substitutes the type generic arguments when its class is a
/// generic instantiation. Anything unresolved yields an empty string.
#[must_use]
pub fn method_spec_full_name(
    method: Option<&MethodDefOrRef>,
    instantiation: Option<&GenericInstMethodSig>,
    names: Option<&dyn TypeNameResolver>,
) -> String {
    let method_args = instantiation.map(|sig| sig.generic_arguments.as_slice());

    match method {
        Some(MethodDefOrRef::MethodDef(method)) => match &method.signature {
            Some(sig) => FullNameBuilder::new(names)
                .with_method_args(method_args)
                .method_full_name(method.declaring_type.as_deref(), &method.name, sig),
            None => String::new(),
        },
        Some(MethodDefOrRef::MemberRef(member)) => match &member.signature {
            Some(sig) => {
                let declaring_type = member.declaring_type_full_name(names);
                FullNameBuilder::new(names)
                    .with_type_args(member.declaring_type_generic_args())
                    .with_method_args(method_args)
                    .method_full_name(declaring_type.as_deref(), &member.name, sig)
            }
            None => String::new(),
        },
        None => String::new(),
    }
}

/// A `MethodSpec` created in code
pub struct MethodSpecUser {
    rid: AtomicU32,
    /// The generic method
    pub method: Option<MethodDefOrRef>,
    /// The instantiation signature
    pub instantiation: Option<CallingConventionSig>,
    /// Custom attributes
    pub custom_attributes: CustomAttributeList,
    /// Custom debug information
    pub custom_debug_infos: PdbCustomDebugInfoList,
}

impl MethodSpecUser {
    /// Create an entity with row id 0
    #[must_use]
    pub fn new(method: Option<MethodDefOrRef>, instantiation: Option<CallingConventionSig>) -> Self {
        MethodSpecUser {
            rid: AtomicU32::new(0),
            method,
            instantiation,
            custom_attributes: Arc::new(boxcar::Vec::new()),
            custom_debug_infos: Arc::new(boxcar::Vec::new()),
        }
    }

    /// Instantiate `method` with the given generic arguments
    #[must_use]
    pub fn with_generic_arguments(
        method: MethodDefOrRef,
        generic_arguments: GenericInstMethodSig,
    ) -> Self {
        MethodSpecUser::new(Some(method), Some(generic_arguments.into()))
    }
}

impl MethodSpec for MethodSpecUser {
    fn rid(&self) -> u32 {
        self.rid.load(Ordering::Acquire)
    }

    fn set_rid(&self, rid: u32) {
        self.rid.store(rid, Ordering::Release);
    }

    fn method(&self) -> Option<&MethodDefOrRef> {
        self.method.as_ref()
    }

    fn instantiation(&self) -> Option<&CallingConventionSig> {
        self.instantiation.as_ref()
    }

    fn custom_attributes(&self) -> &CustomAttributeList {
        &self.custom_attributes
    }

    fn custom_debug_infos(&self) -> &PdbCustomDebugInfoList {
        &self.custom_debug_infos
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::{
        customattributes::CustomAttribute,
        module::{MemberRefInfo, MemberRefParent, MethodDefInfo},
        signatures::{GenericInstSig, MethodSig, TypeSig},
    };

    fn map_method() -> MethodDefOrRef {
        MethodDefOrRef::MethodDef(MethodDefInfo {
            token: Token::new(0x0600_0002),
            name: "Map".to_string(),
            declaring_type: Some("Demo.Mapper".to_string()),
            signature: Some(MethodSig::create_static_generic(
                1,
                TypeSig::MVar(0),
                [TypeSig::Object],
            )),
        })
    }

    #[test]
    fn user_created() {
        let spec = MethodSpecUser::with_generic_arguments(
            map_method(),
            GenericInstMethodSig::new([TypeSig::String]),
        );

        assert_eq!(spec.rid(), 0);
        assert_eq!(spec.token(), Token::new(0x2B00_0000));
        spec.set_rid(5);
        assert_eq!(spec.token(), Token::new(0x2B00_0005));

        assert_eq!(spec.name(), "Map");
        assert_eq!(spec.number_of_generic_parameters(), 1);
        assert_eq!(
            spec.full_name(None),
            "System.String Demo.Mapper::Map<System.String>(System.Object)"
        );
        assert_eq!(spec.has_custom_attribute_tag(), 21);
        assert_eq!(spec.has_custom_debug_information_tag(), 21);

        assert!(!spec.has_custom_attributes());
        spec.custom_attributes
            .push(Arc::new(CustomAttribute::new_raw(None, vec![0x01, 0x00])));
        assert!(spec.has_custom_attributes());
    }

    #[test]
    fn member_ref_threads_both_argument_lists() {
        let member = MethodDefOrRef::MemberRef(MemberRefInfo {
            token: Token::new(0x0A00_0004),
            name: "Convert".to_string(),
            class: MemberRefParent::TypeSpec {
                token: Token::new(0x1B00_0001),
                signature: TypeSig::GenericInst(GenericInstSig {
                    generic_type: Box::new(TypeSig::Class(Token::new(0x0100_0002))),
                    generic_arguments: vec![TypeSig::I4],
                }),
            },
            signature: Some(MethodSig::create_instance_generic(
                1,
                TypeSig::MVar(0),
                [TypeSig::Var(0)],
            )),
        });

        let full_name = method_spec_full_name(
            Some(&member),
            Some(&GenericInstMethodSig::new([TypeSig::Boolean])),
            None,
        );
        assert_eq!(
            full_name,
            "System.Boolean <System.Int32>::Convert<System.Boolean>(System.Int32)"
        );
    }

    #[test]
    fn unresolved_method_has_empty_name() {
        let spec = MethodSpecUser::new(None, None);
        assert_eq!(spec.full_name(None), "");
        assert_eq!(spec.name(), "");
        assert_eq!(spec.number_of_generic_parameters(), 0);
        assert!(spec.generic_inst_method_sig().is_none());
    }
}
