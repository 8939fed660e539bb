use std::ops::{Deref, DerefMut};

use crate::metadata::signatures::{CallingConvention, TypeSig};

/// Field signature (II.23.2.4)
#[derive(Debug, Clone, PartialEq)]
pub struct FieldSig {
    /// The convention byte, kind `Field`
    pub convention: CallingConvention,
    /// Type of the field
    pub field_type: TypeSig,
}

impl FieldSig {
    /// Create a field signature
    #[must_use]
    pub fn new(field_type: TypeSig) -> Self {
        FieldSig {
            convention: CallingConvention::FIELD,
            field_type,
        }
    }
}

/// The shared shape of method and property signatures.
///
/// `params_after_sentinel` is `None` when the blob had no sentinel. `Some(vec![])` records a
/// sentinel that was not followed by any parameter and is preserved by the encoder.
#[derive(Debug, Clone, PartialEq)]
pub struct MethodBaseSig {
    /// The convention byte
    pub convention: CallingConvention,
    /// Return type, or property type
    pub ret_type: TypeSig,
    /// Parameters before the sentinel
    pub params: Vec<TypeSig>,
    /// Number of generic parameters, `0` unless the `Generic` flag is set
    pub gen_param_count: u32,
    /// Parameters after the sentinel of a vararg call site
    pub params_after_sentinel: Option<Vec<TypeSig>>,
}

impl MethodBaseSig {
    /// The canonical constructor every helper funnels into
    #[must_use]
    pub fn new(
        convention: CallingConvention,
        gen_param_count: u32,
        ret_type: TypeSig,
        params: impl IntoIterator<Item = TypeSig>,
    ) -> Self {
        MethodBaseSig {
            convention,
            ret_type,
            params: params.into_iter().collect(),
            gen_param_count,
            params_after_sentinel: None,
        }
    }

    /// The `HasThis` flag of the convention
    #[must_use]
    pub fn has_this(&self) -> bool {
        self.convention.has_this()
    }

    /// The `Generic` flag of the convention
    #[must_use]
    pub fn generic(&self) -> bool {
        self.convention.generic()
    }

    /// The `ExplicitThis` flag of the convention
    #[must_use]
    pub fn explicit_this(&self) -> bool {
        self.convention.explicit_this()
    }

    /// Number of parameters as written to the count field: params plus sentinel params
    #[must_use]
    pub fn param_count(&self) -> usize {
        self.params.len() + self.params_after_sentinel.as_ref().map_or(0, Vec::len)
    }
}

/// Method signature (II.23.2.1 - II.23.2.3)
///
/// # Example
///
/// ```rust
/// use dotmeta::metadata::signatures::{MethodSig, TypeSig};
///
/// let sig = MethodSig::create_instance_generic(2, TypeSig::Void, [TypeSig::MVar(0), TypeSig::MVar(1)]);
/// assert!(sig.has_this());
/// assert!(sig.generic());
/// assert_eq!(sig.gen_param_count, 2);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct MethodSig(pub MethodBaseSig);

impl MethodSig {
    /// Create a method signature from all its parts
    #[must_use]
    pub fn new(
        convention: CallingConvention,
        gen_param_count: u32,
        ret_type: TypeSig,
        params: impl IntoIterator<Item = TypeSig>,
    ) -> Self {
        MethodSig(MethodBaseSig::new(
            convention,
            gen_param_count,
            ret_type,
            params,
        ))
    }

    /// A static, non-generic method
    #[must_use]
    pub fn create_static(ret_type: TypeSig, params: impl IntoIterator<Item = TypeSig>) -> Self {
        Self::new(CallingConvention::DEFAULT, 0, ret_type, params)
    }

    /// An instance, non-generic method
    #[must_use]
    pub fn create_instance(ret_type: TypeSig, params: impl IntoIterator<Item = TypeSig>) -> Self {
        Self::new(
            CallingConvention::DEFAULT.with_flag(CallingConvention::HAS_THIS, true),
            0,
            ret_type,
            params,
        )
    }

    /// A static generic method with `gen_param_count` generic parameters
    #[must_use]
    pub fn create_static_generic(
        gen_param_count: u32,
        ret_type: TypeSig,
        params: impl IntoIterator<Item = TypeSig>,
    ) -> Self {
        Self::new(
            CallingConvention::DEFAULT.with_flag(CallingConvention::GENERIC, true),
            gen_param_count,
            ret_type,
            params,
        )
    }

    /// An instance generic method with `gen_param_count` generic parameters
    #[must_use]
    pub fn create_instance_generic(
        gen_param_count: u32,
        ret_type: TypeSig,
        params: impl IntoIterator<Item = TypeSig>,
    ) -> Self {
        Self::new(
            CallingConvention::DEFAULT
                .with_flag(CallingConvention::HAS_THIS, true)
                .with_flag(CallingConvention::GENERIC, true),
            gen_param_count,
            ret_type,
            params,
        )
    }
}

impl Deref for MethodSig {
    type Target = MethodBaseSig;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl DerefMut for MethodSig {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

/// Property signature (II.23.2.5); `HasThis` marks an instance property
#[derive(Debug, Clone, PartialEq)]
pub struct PropertySig(pub MethodBaseSig);

impl PropertySig {
    /// Create a property signature; the kind nibble is forced to `Property`
    #[must_use]
    pub fn new(
        convention: CallingConvention,
        gen_param_count: u32,
        property_type: TypeSig,
        params: impl IntoIterator<Item = TypeSig>,
    ) -> Self {
        let convention = CallingConvention(
            (convention.value() & !CallingConvention::MASK) | CallingConvention::PROPERTY.value(),
        );
        PropertySig(MethodBaseSig::new(
            convention,
            gen_param_count,
            property_type,
            params,
        ))
    }

    /// A static property
    #[must_use]
    pub fn create_static(
        property_type: TypeSig,
        params: impl IntoIterator<Item = TypeSig>,
    ) -> Self {
        Self::new(CallingConvention::PROPERTY, 0, property_type, params)
    }

    /// An instance property
    #[must_use]
    pub fn create_instance(
        property_type: TypeSig,
        params: impl IntoIterator<Item = TypeSig>,
    ) -> Self {
        Self::new(
            CallingConvention::PROPERTY.with_flag(CallingConvention::HAS_THIS, true),
            0,
            property_type,
            params,
        )
    }

    /// A static property with the `Generic` flag and a generic parameter count
    #[must_use]
    pub fn create_static_generic(
        gen_param_count: u32,
        property_type: TypeSig,
        params: impl IntoIterator<Item = TypeSig>,
    ) -> Self {
        Self::new(
            CallingConvention::PROPERTY.with_flag(CallingConvention::GENERIC, true),
            gen_param_count,
            property_type,
            params,
        )
    }

    /// An instance property with the `Generic` flag and a generic parameter count
    #[must_use]
    pub fn create_instance_generic(
        gen_param_count: u32,
        property_type: TypeSig,
        params: impl IntoIterator<Item = TypeSig>,
    ) -> Self {
        Self::new(
            CallingConvention::PROPERTY
                .with_flag(CallingConvention::HAS_THIS, true)
                .with_flag(CallingConvention::GENERIC, true),
            gen_param_count,
            property_type,
            params,
        )
    }
}

impl Deref for PropertySig {
    type Target = MethodBaseSig;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl DerefMut for PropertySig {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

/// Local variable signature (II.23.2.6)
#[derive(Debug, Clone, PartialEq)]
pub struct LocalSig {
    /// The convention byte, kind `LocalSig`
    pub convention: CallingConvention,
    /// Types of the locals in slot order
    pub locals: Vec<TypeSig>,
}

impl LocalSig {
    /// Create a local variable signature
    #[must_use]
    pub fn new(locals: impl IntoIterator<Item = TypeSig>) -> Self {
        LocalSig {
            convention: CallingConvention::LOCAL_SIG,
            locals: locals.into_iter().collect(),
        }
    }
}

/// Generic method instantiation (II.23.2.15), the `Instantiation` of a `MethodSpec`
///
/// Arguments are expected to be closed types; nothing enforces it, see
/// [`GenericInstMethodSig::contains_generic_parameter`].
#[derive(Debug, Clone, PartialEq)]
pub struct GenericInstMethodSig {
    /// The convention byte, kind `GenericInst`
    pub convention: CallingConvention,
    /// The type arguments
    pub generic_arguments: Vec<TypeSig>,
}

impl GenericInstMethodSig {
    /// Create an instantiation from its type arguments
    #[must_use]
    pub fn new(generic_arguments: impl IntoIterator<Item = TypeSig>) -> Self {
        GenericInstMethodSig {
            convention: CallingConvention::GENERIC_INST,
            generic_arguments: generic_arguments.into_iter().collect(),
        }
    }

    /// `true` if any argument mentions a `Var` or `MVar`
    #[must_use]
    pub fn contains_generic_parameter(&self) -> bool {
        self.generic_arguments
            .iter()
            .any(TypeSig::contains_generic_parameter)
    }
}

/// Any signature that starts with a calling convention byte
#[derive(Debug, Clone, PartialEq)]
pub enum CallingConventionSig {
    /// Field signature
    Field(FieldSig),
    /// Method signature (managed and unmanaged kinds)
    Method(MethodSig),
    /// Property signature
    Property(PropertySig),
    /// Local variable signature
    LocalSig(LocalSig),
    /// Generic method instantiation
    GenericInst(GenericInstMethodSig),
}

impl CallingConventionSig {
    /// The convention byte of the wrapped signature
    #[must_use]
    pub fn convention(&self) -> CallingConvention {
        match self {
            CallingConventionSig::Field(sig) => sig.convention,
            CallingConventionSig::Method(sig) => sig.convention,
            CallingConventionSig::Property(sig) => sig.convention,
            CallingConventionSig::LocalSig(sig) => sig.convention,
            CallingConventionSig::GenericInst(sig) => sig.convention,
        }
    }

    /// The method signature, if this is one
    #[must_use]
    pub fn as_method(&self) -> Option<&MethodSig> {
        match self {
            CallingConventionSig::Method(sig) => Some(sig),
            _ => None,
        }
    }

    /// The generic instantiation, if this is one
    #[must_use]
    pub fn as_generic_inst(&self) -> Option<&GenericInstMethodSig> {
        match self {
            CallingConventionSig::GenericInst(sig) => Some(sig),
            _ => None,
        }
    }
}

impl From<GenericInstMethodSig> for CallingConventionSig {
    fn from(sig: GenericInstMethodSig) -> Self {
        CallingConventionSig::GenericInst(sig)
    }
}

impl From<MethodSig> for CallingConventionSig {
    fn from(sig: MethodSig) -> Self {
        CallingConventionSig::Method(sig)
    }
}
