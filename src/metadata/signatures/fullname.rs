//! Human-readable names for type and method signatures.
//!
//! Types render the way the runtime reflection APIs spell them (`System.Int32`,
//! `System.String[]`, `List`1<System.Int32>`). Generic parameters are substituted from the
//! supplied argument lists and fall back to `!n` / `!!n` when no argument is available.

use crate::metadata::{
    signatures::{MethodBaseSig, TypeSig},
    token::Token,
};

/// Source of type names for `TypeDefOrRef` tokens
pub trait TypeNameResolver {
    /// Full name of the type a token refers to, `None` if it cannot be resolved
    fn type_full_name(&self, token: Token) -> Option<String>;
}

/// Renders type and method names with optional generic argument substitution
#[derive(Clone, Copy, Default)]
pub struct FullNameBuilder<'a> {
    names: Option<&'a dyn TypeNameResolver>,
    type_gen_args: Option<&'a [TypeSig]>,
    method_gen_args: Option<&'a [TypeSig]>,
}

impl<'a> FullNameBuilder<'a> {
    /// Create a builder that resolves tokens through `names`
    #[must_use]
    pub fn new(names: Option<&'a dyn TypeNameResolver>) -> Self {
        FullNameBuilder {
            names,
            type_gen_args: None,
            method_gen_args: None,
        }
    }

    /// Substitute `!n` with the given arguments of the declaring type
    #[must_use]
    pub fn with_type_args(mut self, args: Option<&'a [TypeSig]>) -> Self {
        self.type_gen_args = args;
        self
    }

    /// Substitute `!!n` with the given arguments of the method
    #[must_use]
    pub fn with_method_args(mut self, args: Option<&'a [TypeSig]>) -> Self {
        self.method_gen_args = args;
        self
    }

    fn without_substitution(self) -> Self {
        FullNameBuilder::new(self.names)
    }

    fn token_name(&self, token: Token) -> String {
        self.names
            .and_then(|names| names.type_full_name(token))
            .unwrap_or_default()
    }

    /// Full name of a type
    #[must_use]
    pub fn type_full_name(&self, sig: &TypeSig) -> String {
        let mut name = String::new();
        self.write_type(sig, &mut name);
        name
    }

    fn write_generic_arg(&self, args: Option<&[TypeSig]>, number: u32, prefix: &str, out: &mut String) {
        match args.and_then(|args| args.get(number as usize)) {
            Some(arg) => self.without_substitution().write_type(arg, out),
            None => {
                out.push_str(&format!("{prefix}{number}"));
            }
        }
    }

    fn write_list(&self, types: &[TypeSig], out: &mut String) {
        for (index, sig) in types.iter().enumerate() {
            if index != 0 {
                out.push(',');
            }
            self.write_type(sig, out);
        }
    }

    fn write_type(&self, sig: &TypeSig, out: &mut String) {
        let primitive = match sig {
            TypeSig::Void => "System.Void",
            TypeSig::Boolean => "System.Boolean",
            TypeSig::Char => "System.Char",
            TypeSig::I1 => "System.SByte",
            TypeSig::U1 => "System.Byte",
            TypeSig::I2 => "System.Int16",
            TypeSig::U2 => "System.UInt16",
            TypeSig::I4 => "System.Int32",
            TypeSig::U4 => "System.UInt32",
            TypeSig::I8 => "System.Int64",
            TypeSig::U8 => "System.UInt64",
            TypeSig::R4 => "System.Single",
            TypeSig::R8 => "System.Double",
            TypeSig::String => "System.String",
            TypeSig::TypedByRef => "System.TypedReference",
            TypeSig::I => "System.IntPtr",
            TypeSig::U => "System.UIntPtr",
            TypeSig::Object => "System.Object",
            _ => "",
        };
        if !primitive.is_empty() {
            out.push_str(primitive);
            return;
        }

        match sig {
            TypeSig::Ptr(inner) => {
                self.write_type(inner, out);
                out.push('*');
            }
            TypeSig::ByRef(inner) => {
                self.write_type(inner, out);
                out.push('&');
            }
            TypeSig::Pinned(inner) => self.write_type(inner, out),
            TypeSig::SzArray(inner) => {
                self.write_type(inner, out);
                out.push_str("[]");
            }
            TypeSig::Array(array) => {
                self.write_type(&array.element, out);
                out.push('[');
                match array.rank {
                    0 => out.push_str("<RANK0>"),
                    1 => out.push('*'),
                    rank => {
                        for dimension in 0..rank as usize {
                            if dimension != 0 {
                                out.push(',');
                            }
                            if let Some(lower) = array.lower_bounds.get(dimension) {
                                out.push_str(&format!("{lower}.."));
                                match array.sizes.get(dimension) {
                                    Some(size) => {
                                        let upper = i64::from(*lower) + i64::from(*size) - 1;
                                        out.push_str(&format!("{upper}"));
                                    }
                                    None => out.push('.'),
                                }
                            }
                        }
                    }
                }
                out.push(']');
            }
            TypeSig::ValueType(token) | TypeSig::Class(token) => {
                out.push_str(&self.token_name(*token));
            }
            TypeSig::Var(number) => self.write_generic_arg(self.type_gen_args, *number, "!", out),
            TypeSig::MVar(number) => {
                self.write_generic_arg(self.method_gen_args, *number, "!!", out);
            }
            TypeSig::GenericInst(inst) => {
                self.write_type(&inst.generic_type, out);
                out.push('<');
                self.write_list(&inst.generic_arguments, out);
                out.push('>');
            }
            TypeSig::FnPtr(_) => out.push_str("(fnptr)"),
            TypeSig::CModReqd(modifier, inner) => {
                self.write_type(inner, out);
                out.push_str(&format!(" modreq({})", self.token_name(*modifier)));
            }
            TypeSig::CModOpt(modifier, inner) => {
                self.write_type(inner, out);
                out.push_str(&format!(" modopt({})", self.token_name(*modifier)));
            }
            _ => {}
        }
    }

    /// Full name of a method: `Ret Decl::Name<Args>(P,...,Q)`
    ///
    /// The method generic arguments, when present, are rendered after the name.
    #[must_use]
    pub fn method_full_name(
        &self,
        declaring_type: Option<&str>,
        name: &str,
        sig: &MethodBaseSig,
    ) -> String {
        let mut out = String::new();

        self.write_type(&sig.ret_type, &mut out);
        out.push(' ');
        if let Some(declaring_type) = declaring_type {
            out.push_str(declaring_type);
            out.push_str("::");
        }
        out.push_str(name);

        if let Some(args) = self.method_gen_args {
            out.push('<');
            self.without_substitution().write_list(args, &mut out);
            out.push('>');
        }

        out.push('(');
        self.write_list(&sig.params, &mut out);
        if let Some(after) = &sig.params_after_sentinel {
            if !sig.params.is_empty() {
                out.push(',');
            }
            out.push_str("...");
            for param in after {
                out.push(',');
                self.write_type(param, &mut out);
            }
        }
        out.push(')');

        out
    }
}
