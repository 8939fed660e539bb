//! The calling convention byte that opens every signature blob.

use std::fmt;

/// Calling convention of a signature (II.23.2.1 - II.23.2.6)
///
/// The low nibble holds the signature *kind*, the high nibble holds independent flags. Flags
/// are never validated against the kind, any byte value round-trips unchanged.
///
/// # Example
///
/// ```rust
/// use dotmeta::metadata::signatures::CallingConvention;
///
/// let mut convention = CallingConvention::DEFAULT;
/// convention.set_has_this(true);
/// convention.set_generic(true);
/// assert_eq!(convention.value(), 0x30);
/// assert!(convention.is_default());
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct CallingConvention(pub u8);

impl CallingConvention {
    /// Mask of the kind nibble
    pub const MASK: u8 = 0x0F;

    /// Managed method
    pub const DEFAULT: CallingConvention = CallingConvention(0x0);
    /// Unmanaged cdecl
    pub const C: CallingConvention = CallingConvention(0x1);
    /// Unmanaged stdcall
    pub const STDCALL: CallingConvention = CallingConvention(0x2);
    /// Unmanaged thiscall
    pub const THISCALL: CallingConvention = CallingConvention(0x3);
    /// Unmanaged fastcall
    pub const FASTCALL: CallingConvention = CallingConvention(0x4);
    /// Managed vararg method
    pub const VARARG: CallingConvention = CallingConvention(0x5);
    /// Field signature
    pub const FIELD: CallingConvention = CallingConvention(0x6);
    /// Local variable signature
    pub const LOCAL_SIG: CallingConvention = CallingConvention(0x7);
    /// Property signature
    pub const PROPERTY: CallingConvention = CallingConvention(0x8);
    /// Unmanaged calling convention encoded in modopts
    pub const UNMANAGED: CallingConvention = CallingConvention(0x9);
    /// Generic method instantiation
    pub const GENERIC_INST: CallingConvention = CallingConvention(0xA);
    /// Native vararg
    pub const NATIVE_VARARG: CallingConvention = CallingConvention(0xB);

    /// Generic method, a generic parameter count follows
    pub const GENERIC: u8 = 0x10;
    /// Instance member
    pub const HAS_THIS: u8 = 0x20;
    /// `this` is passed as the first explicit parameter
    pub const EXPLICIT_THIS: u8 = 0x40;
    /// Reserved by the runtime
    pub const RESERVED_BY_CLR: u8 = 0x80;

    /// The raw convention byte
    #[must_use]
    pub fn value(self) -> u8 {
        self.0
    }

    /// The kind nibble
    #[must_use]
    pub fn kind(self) -> u8 {
        self.0 & Self::MASK
    }

    fn is_kind(self, kind: CallingConvention) -> bool {
        self.kind() == kind.0
    }

    /// `true` for a managed, non-vararg method
    #[must_use]
    pub fn is_default(self) -> bool {
        self.is_kind(Self::DEFAULT)
    }

    /// `true` for cdecl
    #[must_use]
    pub fn is_c(self) -> bool {
        self.is_kind(Self::C)
    }

    /// `true` for stdcall
    #[must_use]
    pub fn is_stdcall(self) -> bool {
        self.is_kind(Self::STDCALL)
    }

    /// `true` for thiscall
    #[must_use]
    pub fn is_thiscall(self) -> bool {
        self.is_kind(Self::THISCALL)
    }

    /// `true` for fastcall
    #[must_use]
    pub fn is_fastcall(self) -> bool {
        self.is_kind(Self::FASTCALL)
    }

    /// `true` for a managed vararg method
    #[must_use]
    pub fn is_vararg(self) -> bool {
        self.is_kind(Self::VARARG)
    }

    /// `true` for a field signature
    #[must_use]
    pub fn is_field(self) -> bool {
        self.is_kind(Self::FIELD)
    }

    /// `true` for a local variable signature
    #[must_use]
    pub fn is_local_sig(self) -> bool {
        self.is_kind(Self::LOCAL_SIG)
    }

    /// `true` for a property signature
    #[must_use]
    pub fn is_property(self) -> bool {
        self.is_kind(Self::PROPERTY)
    }

    /// `true` for the unmanaged kind
    #[must_use]
    pub fn is_unmanaged(self) -> bool {
        self.is_kind(Self::UNMANAGED)
    }

    /// `true` for a generic method instantiation
    #[must_use]
    pub fn is_generic_inst(self) -> bool {
        self.is_kind(Self::GENERIC_INST)
    }

    /// `true` for native vararg
    #[must_use]
    pub fn is_native_vararg(self) -> bool {
        self.is_kind(Self::NATIVE_VARARG)
    }

    /// `true` for any of the kinds that introduce a method or property signature
    #[must_use]
    pub fn is_method_like(self) -> bool {
        self.kind() <= Self::NATIVE_VARARG.0
            && !self.is_field()
            && !self.is_local_sig()
            && !self.is_generic_inst()
    }

    fn flag(self, flag: u8) -> bool {
        self.0 & flag != 0
    }

    fn set_flag(&mut self, flag: u8, value: bool) {
        if value {
            self.0 |= flag;
        } else {
            self.0 &= !flag;
        }
    }

    /// The `Generic` flag
    #[must_use]
    pub fn generic(self) -> bool {
        self.flag(Self::GENERIC)
    }

    /// Set or clear the `Generic` flag
    pub fn set_generic(&mut self, value: bool) {
        self.set_flag(Self::GENERIC, value);
    }

    /// The `HasThis` flag
    #[must_use]
    pub fn has_this(self) -> bool {
        self.flag(Self::HAS_THIS)
    }

    /// Set or clear the `HasThis` flag
    pub fn set_has_this(&mut self, value: bool) {
        self.set_flag(Self::HAS_THIS, value);
    }

    /// The `ExplicitThis` flag
    #[must_use]
    pub fn explicit_this(self) -> bool {
        self.flag(Self::EXPLICIT_THIS)
    }

    /// Set or clear the `ExplicitThis` flag
    pub fn set_explicit_this(&mut self, value: bool) {
        self.set_flag(Self::EXPLICIT_THIS, value);
    }

    /// The `ReservedByCLR` flag
    #[must_use]
    pub fn reserved_by_clr(self) -> bool {
        self.flag(Self::RESERVED_BY_CLR)
    }

    /// Set or clear the `ReservedByCLR` flag
    pub fn set_reserved_by_clr(&mut self, value: bool) {
        self.set_flag(Self::RESERVED_BY_CLR, value);
    }

    /// Copy of this convention with a flag set or cleared
    #[must_use]
    pub fn with_flag(mut self, flag: u8, value: bool) -> Self {
        self.set_flag(flag, value);
        self
    }
}

impl From<u8> for CallingConvention {
    fn from(value: u8) -> Self {
        CallingConvention(value)
    }
}

impl From<CallingConvention> for u8 {
    fn from(value: CallingConvention) -> Self {
        value.0
    }
}

impl fmt::Debug for CallingConvention {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CallingConvention(0x{:02x})", self.0)
    }
}
