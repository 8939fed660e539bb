use crate::{
    file::parser::Parser,
    metadata::signatures::{
        ArraySig, CallingConvention, CallingConventionSig, FieldSig, GenericInstMethodSig,
        GenericInstSig, LocalSig, MethodBaseSig, MethodSig, PropertySig, TypeSig, ELEMENT_TYPE,
    },
    Error::RecursionLimit,
    Result,
};

/// Default nesting limit for type signatures
pub const MAX_RECURSION_DEPTH: usize = 64;

/// Signature parser for every blob that starts with a calling convention byte
///
/// # Example
///
/// ```rust
/// use dotmeta::metadata::signatures::{SignatureParser, TypeSig};
///
/// // instance void (int32, string)
/// let data = &[0x20, 0x02, 0x01, 0x08, 0x0E];
/// let sig = SignatureParser::new(data).parse_method_signature()?;
/// assert!(sig.has_this());
/// assert_eq!(sig.params, vec![TypeSig::I4, TypeSig::String]);
/// # Ok::<(), dotmeta::Error>(())
/// ```
///
/// A parser instance is meant for exactly one signature.
pub struct SignatureParser<'a> {
    parser: Parser<'a>,
    depth: usize,
    max_depth: usize,
}

impl<'a> SignatureParser<'a> {
    /// Create a new `SignatureParser` with the default recursion limit
    ///
    /// ## Arguments
    /// * 'data' - The signature blob
    #[must_use]
    pub fn new(data: &'a [u8]) -> Self {
        Self::with_max_depth(data, MAX_RECURSION_DEPTH)
    }

    /// Create a new `SignatureParser` with a custom recursion limit
    #[must_use]
    pub fn with_max_depth(data: &'a [u8], max_depth: usize) -> Self {
        SignatureParser {
            parser: Parser::new(data),
            depth: 0,
            max_depth,
        }
    }

    /// Number of bytes consumed so far
    #[must_use]
    pub fn pos(&self) -> usize {
        self.parser.pos()
    }

    /// Parse any signature, dispatching on the kind of the convention byte
    ///
    /// # Errors
    /// Returns an error if the convention kind is unknown or the blob is malformed
    pub fn parse_signature(&mut self) -> Result<CallingConventionSig> {
        let convention = CallingConvention(self.parser.peek_byte()?);

        if convention.is_field() {
            Ok(CallingConventionSig::Field(self.parse_field_signature()?))
        } else if convention.is_local_sig() {
            Ok(CallingConventionSig::LocalSig(self.parse_local_signature()?))
        } else if convention.is_property() {
            Ok(CallingConventionSig::Property(
                self.parse_property_signature()?,
            ))
        } else if convention.is_generic_inst() {
            Ok(CallingConventionSig::GenericInst(
                self.parse_generic_inst_signature()?,
            ))
        } else if convention.is_method_like() {
            Ok(CallingConventionSig::Method(self.parse_method_signature()?))
        } else {
            Err(malformed_error!(
                "Unknown calling convention - {:#04x}",
                convention.value()
            ))
        }
    }

    /// Parse a single type
    ///
    /// # Errors
    /// Returns an error if the type is malformed or nested deeper than the recursion limit
    pub fn parse_type(&mut self) -> Result<TypeSig> {
        self.depth += 1;
        if self.depth > self.max_depth {
            return Err(RecursionLimit(self.max_depth));
        }

        let result = self.parse_type_inner();
        self.depth -= 1;
        result
    }

    fn parse_boxed(&mut self) -> Result<Box<TypeSig>> {
        Ok(Box::new(self.parse_type()?))
    }

    fn parse_type_inner(&mut self) -> Result<TypeSig> {
        let current_byte = self.parser.read_le::<u8>()?;
        match current_byte {
            ELEMENT_TYPE::VOID => Ok(TypeSig::Void),
            ELEMENT_TYPE::BOOLEAN => Ok(TypeSig::Boolean),
            ELEMENT_TYPE::CHAR => Ok(TypeSig::Char),
            ELEMENT_TYPE::I1 => Ok(TypeSig::I1),
            ELEMENT_TYPE::U1 => Ok(TypeSig::U1),
            ELEMENT_TYPE::I2 => Ok(TypeSig::I2),
            ELEMENT_TYPE::U2 => Ok(TypeSig::U2),
            ELEMENT_TYPE::I4 => Ok(TypeSig::I4),
            ELEMENT_TYPE::U4 => Ok(TypeSig::U4),
            ELEMENT_TYPE::I8 => Ok(TypeSig::I8),
            ELEMENT_TYPE::U8 => Ok(TypeSig::U8),
            ELEMENT_TYPE::R4 => Ok(TypeSig::R4),
            ELEMENT_TYPE::R8 => Ok(TypeSig::R8),
            ELEMENT_TYPE::STRING => Ok(TypeSig::String),
            ELEMENT_TYPE::TYPEDBYREF => Ok(TypeSig::TypedByRef),
            ELEMENT_TYPE::I => Ok(TypeSig::I),
            ELEMENT_TYPE::U => Ok(TypeSig::U),
            ELEMENT_TYPE::OBJECT => Ok(TypeSig::Object),
            ELEMENT_TYPE::PTR => Ok(TypeSig::Ptr(self.parse_boxed()?)),
            ELEMENT_TYPE::BYREF => Ok(TypeSig::ByRef(self.parse_boxed()?)),
            ELEMENT_TYPE::PINNED => Ok(TypeSig::Pinned(self.parse_boxed()?)),
            ELEMENT_TYPE::SZARRAY => Ok(TypeSig::SzArray(self.parse_boxed()?)),
            ELEMENT_TYPE::VALUETYPE => Ok(TypeSig::ValueType(
                self.parser.read_compressed_token()?,
            )),
            ELEMENT_TYPE::CLASS => Ok(TypeSig::Class(self.parser.read_compressed_token()?)),
            ELEMENT_TYPE::VAR => Ok(TypeSig::Var(self.parser.read_compressed_uint()?)),
            ELEMENT_TYPE::MVAR => Ok(TypeSig::MVar(self.parser.read_compressed_uint()?)),
            ELEMENT_TYPE::CMOD_REQD => {
                let modifier = self.parser.read_compressed_token()?;
                Ok(TypeSig::CModReqd(modifier, self.parse_boxed()?))
            }
            ELEMENT_TYPE::CMOD_OPT => {
                let modifier = self.parser.read_compressed_token()?;
                Ok(TypeSig::CModOpt(modifier, self.parse_boxed()?))
            }
            ELEMENT_TYPE::ARRAY => {
                let element = self.parse_boxed()?;
                let rank = self.parser.read_compressed_uint()?;

                let num_sizes = self.parser.read_compressed_uint()?;
                let mut sizes = Vec::with_capacity(self.bounded(num_sizes));
                for _ in 0..num_sizes {
                    sizes.push(self.parser.read_compressed_uint()?);
                }

                let num_lo_bounds = self.parser.read_compressed_uint()?;
                let mut lower_bounds = Vec::with_capacity(self.bounded(num_lo_bounds));
                for _ in 0..num_lo_bounds {
                    lower_bounds.push(self.parser.read_compressed_int()?);
                }

                Ok(TypeSig::Array(ArraySig {
                    element,
                    rank,
                    sizes,
                    lower_bounds,
                }))
            }
            ELEMENT_TYPE::GENERICINST => {
                let peek_byte = self.parser.peek_byte()?;
                if peek_byte != ELEMENT_TYPE::CLASS && peek_byte != ELEMENT_TYPE::VALUETYPE {
                    return Err(malformed_error!(
                        "GENERICINST - Next byte is not CLASS or VALUETYPE - {}",
                        peek_byte
                    ));
                }

                let generic_type = self.parse_boxed()?;
                let arg_count = self.parser.read_compressed_uint()?;

                let mut generic_arguments = Vec::with_capacity(self.bounded(arg_count));
                for _ in 0..arg_count {
                    generic_arguments.push(self.parse_type()?);
                }

                Ok(TypeSig::GenericInst(GenericInstSig {
                    generic_type,
                    generic_arguments,
                }))
            }
            ELEMENT_TYPE::FNPTR => Ok(TypeSig::FnPtr(Box::new(self.read_method_signature(false)?))),
            _ => Err(malformed_error!(
                "Unsupported ELEMENT_TYPE - {:#04x}",
                current_byte
            )),
        }
    }

    /// Clamp a declared element count to what the remaining bytes could hold
    fn bounded(&self, count: u32) -> usize {
        (count as usize).min(self.parser.remaining())
    }

    /// `top_level` is false for the signature of a function pointer type; only the outermost
    /// signature may claim a sentinel that follows its counted parameters.
    fn parse_method_base(
        &mut self,
        convention: CallingConvention,
        top_level: bool,
    ) -> Result<MethodBaseSig> {
        let gen_param_count = if convention.generic() {
            self.parser.read_compressed_uint()?
        } else {
            0
        };

        let param_count = self.parser.read_compressed_uint()?;
        let ret_type = self.parse_type()?;

        let mut params = Vec::with_capacity(self.bounded(param_count));
        let mut params_after_sentinel: Option<Vec<TypeSig>> = None;

        let mut read = 0;
        while read < param_count {
            if self.parser.peek_byte()? == ELEMENT_TYPE::SENTINEL {
                if params_after_sentinel.is_some() {
                    return Err(malformed_error!(
                        "Repeated sentinel in method signature at offset {}",
                        self.parser.pos()
                    ));
                }
                self.parser.advance()?;
                params_after_sentinel = Some(Vec::new());
                continue;
            }

            let param = self.parse_type()?;
            match params_after_sentinel.as_mut() {
                Some(after) => after.push(param),
                None => params.push(param),
            }
            read += 1;
        }

        // A sentinel that closes the counted parameters still marks a vararg call site
        if top_level
            && self.parser.has_more_data()
            && self.parser.peek_byte()? == ELEMENT_TYPE::SENTINEL
        {
            if params_after_sentinel.is_some() {
                return Err(malformed_error!(
                    "Repeated sentinel in method signature at offset {}",
                    self.parser.pos()
                ));
            }
            self.parser.advance()?;
            params_after_sentinel = Some(Vec::new());
        }

        Ok(MethodBaseSig {
            convention,
            ret_type,
            params,
            gen_param_count,
            params_after_sentinel,
        })
    }

    /// Parse a method signature - `MethodDefSig`, `MethodRefSig`, `StandAloneMethodSig`
    ///
    /// # Errors
    /// Returns an error if the convention is not a method kind or the blob is malformed
    pub fn parse_method_signature(&mut self) -> Result<MethodSig> {
        self.read_method_signature(true)
    }

    fn read_method_signature(&mut self, top_level: bool) -> Result<MethodSig> {
        let convention = CallingConvention(self.parser.read_le::<u8>()?);
        if !convention.is_method_like() || convention.is_property() {
            return Err(malformed_error!(
                "MethodSig - invalid calling convention - {:#04x}",
                convention.value()
            ));
        }

        Ok(MethodSig(self.parse_method_base(convention, top_level)?))
    }

    /// Parse a property signature (II.23.2.5)
    ///
    /// # Errors
    /// Returns an error if the convention kind is not `Property` or the blob is malformed
    pub fn parse_property_signature(&mut self) -> Result<PropertySig> {
        let convention = CallingConvention(self.parser.read_le::<u8>()?);
        if !convention.is_property() {
            return Err(malformed_error!(
                "PropertySig - invalid calling convention - {:#04x}",
                convention.value()
            ));
        }

        Ok(PropertySig(self.parse_method_base(convention, true)?))
    }

    /// Parse a field signature (II.23.2.4)
    ///
    /// # Errors
    /// Returns an error if the convention kind is not `Field` or the type is malformed
    pub fn parse_field_signature(&mut self) -> Result<FieldSig> {
        let convention = CallingConvention(self.parser.read_le::<u8>()?);
        if !convention.is_field() {
            return Err(malformed_error!(
                "FieldSig - invalid calling convention - {:#04x}",
                convention.value()
            ));
        }

        Ok(FieldSig {
            convention,
            field_type: self.parse_type()?,
        })
    }

    /// Parse a local variable signature (II.23.2.6)
    ///
    /// # Errors
    /// Returns an error if the convention kind is not `LocalSig` or a type is malformed
    pub fn parse_local_signature(&mut self) -> Result<LocalSig> {
        let convention = CallingConvention(self.parser.read_le::<u8>()?);
        if !convention.is_local_sig() {
            return Err(malformed_error!(
                "LocalSig - invalid calling convention - {:#04x}",
                convention.value()
            ));
        }

        Ok(LocalSig {
            convention,
            locals: self.parse_type_list()?,
        })
    }

    /// Parse a generic method instantiation (II.23.2.15)
    ///
    /// # Errors
    /// Returns an error if the convention kind is not `GenericInst` or a type is malformed
    pub fn parse_generic_inst_signature(&mut self) -> Result<GenericInstMethodSig> {
        let convention = CallingConvention(self.parser.read_le::<u8>()?);
        if !convention.is_generic_inst() {
            return Err(malformed_error!(
                "GenericInstMethodSig - invalid calling convention - {:#04x}",
                convention.value()
            ));
        }

        Ok(GenericInstMethodSig {
            convention,
            generic_arguments: self.parse_type_list()?,
        })
    }

    fn parse_type_list(&mut self) -> Result<Vec<TypeSig>> {
        let count = self.parser.read_compressed_uint()?;
        let mut types = Vec::with_capacity(self.bounded(count));
        for _ in 0..count {
            types.push(self.parse_type()?);
        }
        Ok(types)
    }
}
