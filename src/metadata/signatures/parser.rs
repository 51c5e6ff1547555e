use crate::{
    blob::ByteCursor,
    metadata::signatures::{
        CallingConvention, FieldSignature, GenericInstance, LocalVariableSignature,
        MethodSignature, MethodSpecSignature, ModifiedType, PrimitiveKind, PropertySignature,
        SignatureArray, SignatureFlags, TypeNode, TypeSpecSignature, CALLING_CONVENTION,
        ELEMENT_TYPE, MAX_ARRAY_RANK, RESERVED_CONVENTION_BITS, SIGNATURE_HEADER,
    },
    Error, Result,
};

/// Default maximum nesting depth of types within one signature
pub const MAX_RECURSION_DEPTH: usize = 100;

/// Decoder configuration.
///
/// ```rust
/// use cilsig::metadata::signatures::{DecoderOptions, SignatureParser};
///
/// let options = DecoderOptions {
///     max_depth: 8,
///     reject_trailing_data: true,
/// };
/// let mut parser = SignatureParser::with_options(&[0x00, 0x00, 0x01, 0xFF], options);
/// assert!(parser.parse_method_signature().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecoderOptions {
    /// Maximum nesting depth of types, counting a leaf as 1. Values below 1 are treated as 1.
    pub max_depth: usize,
    /// Fail if bytes remain after a complete top-level signature
    pub reject_trailing_data: bool,
}

impl Default for DecoderOptions {
    fn default() -> Self {
        DecoderOptions {
            max_depth: MAX_RECURSION_DEPTH,
            reject_trailing_data: false,
        }
    }
}

/// Signature parser that handles all signature types in ECMA-335
///
/// Every top-level `parse_*` method is all-or-nothing: it either returns a complete
/// signature or the first [`Error`] encountered, never a partially decoded value.
///
/// # Example
///
/// ```rust
/// use cilsig::metadata::signatures::{PrimitiveKind, SignatureParser, TypeNode};
///
/// let data = &[0x20, 0x01, 0x01, 0x0E];
/// let mut parser = SignatureParser::new(data);
/// let sig = parser.parse_method_signature()?;
/// assert!(sig.has_this);
/// assert_eq!(sig.params, vec![TypeNode::Primitive(PrimitiveKind::String)]);
/// # Ok::<(), cilsig::Error>(())
/// ```
///
/// ## Notes:
/// - Besides ECMA-335, it's also worth looking at <https://github.com/dotnet/runtime/blob/main/docs/design/coreclr/profiling/davbr-blog-archive/samples/sigparse.cpp>
/// - A parser is meant for exactly one signature; create a new one per blob.
pub struct SignatureParser<'a> {
    cursor: ByteCursor<'a>,
    options: DecoderOptions,
    depth: usize,
}

impl<'a> SignatureParser<'a> {
    /// Create a new `SignatureParser` with default [`DecoderOptions`]
    ///
    /// ## Arguments
    /// * 'data' - The byte slice to read from
    #[must_use]
    pub fn new(data: &'a [u8]) -> Self {
        Self::with_options(data, DecoderOptions::default())
    }

    /// Create a new `SignatureParser` with explicit options
    ///
    /// ## Arguments
    /// * 'data'    - The byte slice to read from
    /// * 'options' - Limits applied while decoding
    #[must_use]
    pub fn with_options(data: &'a [u8], options: DecoderOptions) -> Self {
        SignatureParser {
            cursor: ByteCursor::new(data),
            options: DecoderOptions {
                max_depth: options.max_depth.max(1),
                ..options
            },
            depth: 0,
        }
    }

    /// Position of the next byte to decode.
    #[must_use]
    pub fn pos(&self) -> usize {
        self.cursor.pos()
    }

    /// Parse a single type from the signature blob
    ///
    /// # Errors
    /// Returns an error if the type is malformed, truncated, or nested deeper than
    /// [`DecoderOptions::max_depth`].
    pub fn parse_type(&mut self) -> Result<TypeNode> {
        if self.depth >= self.options.max_depth {
            return Err(Error::MaxDepthExceeded {
                limit: self.options.max_depth,
                offset: self.cursor.pos(),
            });
        }

        self.depth += 1;
        let result = self.parse_type_inner();
        self.depth -= 1;
        result
    }

    fn parse_type_inner(&mut self) -> Result<TypeNode> {
        let offset = self.cursor.pos();
        let current_byte = self.cursor.read_byte()?;

        if let Some(kind) = PrimitiveKind::from_element_type(current_byte) {
            return Ok(TypeNode::Primitive(kind));
        }

        match current_byte {
            ELEMENT_TYPE::CLASS => Ok(TypeNode::Class(self.cursor.read_compressed_token()?)),
            ELEMENT_TYPE::VALUETYPE => {
                Ok(TypeNode::ValueType(self.cursor.read_compressed_token()?))
            }
            ELEMENT_TYPE::PTR => Ok(TypeNode::Ptr(Box::new(self.parse_type()?))),
            ELEMENT_TYPE::BYREF => Ok(TypeNode::ByRef(Box::new(self.parse_type()?))),
            ELEMENT_TYPE::PINNED => Ok(TypeNode::Pinned(Box::new(self.parse_type()?))),
            ELEMENT_TYPE::SZARRAY => Ok(TypeNode::SzArray(Box::new(self.parse_type()?))),
            ELEMENT_TYPE::ARRAY => self.parse_array(),
            ELEMENT_TYPE::GENERICINST => self.parse_generic_inst(),
            ELEMENT_TYPE::VAR => Ok(TypeNode::GenericParam {
                index: self.cursor.read_compressed_uint()?,
                method: false,
            }),
            ELEMENT_TYPE::MVAR => Ok(TypeNode::GenericParam {
                index: self.cursor.read_compressed_uint()?,
                method: true,
            }),
            ELEMENT_TYPE::CMOD_REQD | ELEMENT_TYPE::CMOD_OPT => {
                let modifier = self.cursor.read_compressed_token()?;
                Ok(TypeNode::Modified(ModifiedType {
                    modifier,
                    required: current_byte == ELEMENT_TYPE::CMOD_REQD,
                    inner: Box::new(self.parse_type()?),
                }))
            }
            ELEMENT_TYPE::FNPTR => Ok(TypeNode::FnPtr(Box::new(self.parse_method_body()?))),
            _ => Err(Error::UnknownElementType {
                offset,
                value: current_byte,
            }),
        }
    }

    /// `ARRAY Type Rank NumSizes Size* NumLoBounds LoBound*` (II.23.2.13)
    fn parse_array(&mut self) -> Result<TypeNode> {
        let element = self.parse_type()?;

        let rank_offset = self.cursor.pos();
        let first_byte = self.cursor.peek_byte()?;
        let rank = self.cursor.read_compressed_uint()?;
        if rank == 0 || rank > MAX_ARRAY_RANK {
            return Err(invalid_encoding!(
                rank_offset,
                first_byte,
                "ARRAY - rank {} outside 1..={}",
                rank,
                MAX_ARRAY_RANK
            ));
        }

        let sizes = self.read_bounded_list(rank, "sizes", ByteCursor::read_compressed_uint)?;
        let lower_bounds =
            self.read_bounded_list(rank, "lower bounds", ByteCursor::read_compressed_int)?;

        Ok(TypeNode::Array(SignatureArray {
            element: Box::new(element),
            rank,
            sizes,
            lower_bounds,
        }))
    }

    /// A compressed count (at most `rank`) followed by that many values.
    fn read_bounded_list<T>(
        &mut self,
        rank: u32,
        what: &str,
        read: fn(&mut ByteCursor<'a>) -> Result<T>,
    ) -> Result<Vec<T>> {
        let count_offset = self.cursor.pos();
        let first_byte = self.cursor.peek_byte()?;
        let count = self.cursor.read_compressed_uint()?;
        if count > rank {
            return Err(invalid_encoding!(
                count_offset,
                first_byte,
                "ARRAY - {} {} exceed rank {}",
                count,
                what,
                rank
            ));
        }

        let mut values = Vec::with_capacity(self.capacity_for(count));
        for _ in 0..count {
            values.push(read(&mut self.cursor)?);
        }
        Ok(values)
    }

    /// `GENERICINST (CLASS | VALUETYPE) TypeDefOrRefOrSpecEncoded GenArgCount Type*` (II.23.2.12)
    fn parse_generic_inst(&mut self) -> Result<TypeNode> {
        let marker_offset = self.cursor.pos();
        let marker = self.cursor.peek_byte()?;
        let value_type = match marker {
            ELEMENT_TYPE::CLASS => false,
            ELEMENT_TYPE::VALUETYPE => true,
            _ => {
                return Err(invalid_encoding!(
                    marker_offset,
                    marker,
                    "GENERICINST - Next byte is not CLASS or VALUETYPE"
                ))
            }
        };
        self.cursor.advance()?;

        let base = self.cursor.read_compressed_token()?;

        let count_offset = self.cursor.pos();
        let arg_count = self.cursor.read_compressed_uint()?;
        if arg_count == 0 {
            return Err(invalid_encoding!(
                count_offset,
                0,
                "GENERICINST - instantiation without type arguments"
            ));
        }

        let args = self.parse_types(arg_count)?;

        Ok(TypeNode::GenericInst(GenericInstance {
            base,
            value_type,
            args,
        }))
    }

    fn parse_types(&mut self, count: u32) -> Result<Vec<TypeNode>> {
        let mut types = Vec::with_capacity(self.capacity_for(count));
        for _ in 0..count {
            types.push(self.parse_type()?);
        }
        Ok(types)
    }

    /// Every encoded element takes at least one byte, so no list can be longer than
    /// what is left of the blob.
    fn capacity_for(&self, count: u32) -> usize {
        (count as usize).min(self.cursor.remaining())
    }

    /// Decode the calling convention byte and the rest of a method signature.
    fn parse_method_body(&mut self) -> Result<MethodSignature> {
        let offset = self.cursor.pos();
        let convention_byte = self.cursor.read_byte()?;

        let flags = SignatureFlags::from_bits_truncate(convention_byte);
        let calling_convention =
            CallingConvention::from_repr(convention_byte & CALLING_CONVENTION::KIND_MASK)
                .ok_or_else(|| {
                    invalid_encoding!(
                        offset,
                        convention_byte,
                        "Invalid method calling convention - 0x{:02X}",
                        convention_byte
                    )
                })?;

        if convention_byte & RESERVED_CONVENTION_BITS != 0 {
            return Err(invalid_encoding!(
                offset,
                convention_byte,
                "Reserved calling convention bit set"
            ));
        }
        if flags.contains(SignatureFlags::EXPLICIT_THIS) && !flags.contains(SignatureFlags::HAS_THIS)
        {
            return Err(invalid_encoding!(
                offset,
                convention_byte,
                "EXPLICITTHIS requires HASTHIS"
            ));
        }

        let generic = flags.contains(SignatureFlags::GENERIC);
        let generic_param_count = if generic {
            self.cursor.read_compressed_uint()?
        } else {
            0
        };

        let param_count = self.cursor.read_compressed_uint()?;
        let return_type = self.parse_type()?;

        let mut params = Vec::with_capacity(self.capacity_for(param_count));
        let mut sentinel = None;
        while params.len() < param_count as usize {
            let sentinel_offset = self.cursor.pos();
            if self.cursor.peek_byte()? == ELEMENT_TYPE::SENTINEL {
                // Marks the start of the vararg-only parameters; it is not a parameter itself
                if !calling_convention.allows_varargs() || sentinel.is_some() {
                    return Err(invalid_encoding!(
                        sentinel_offset,
                        ELEMENT_TYPE::SENTINEL,
                        "Unexpected SENTINEL in {} signature",
                        calling_convention
                    ));
                }

                self.cursor.advance()?;
                sentinel = Some(params.len());
                continue;
            }

            params.push(self.parse_type()?);
        }

        Ok(MethodSignature {
            calling_convention,
            has_this: flags.contains(SignatureFlags::HAS_THIS),
            explicit_this: flags.contains(SignatureFlags::EXPLICIT_THIS),
            generic,
            generic_param_count,
            return_type,
            params,
            sentinel,
        })
    }

    /// Read a header byte and check it against `expected`.
    fn expect_header(&mut self, expected: u8, name: &str) -> Result<()> {
        let offset = self.cursor.pos();
        let head_byte = self.cursor.read_byte()?;
        if head_byte != expected {
            return Err(invalid_encoding!(
                offset,
                head_byte,
                "{} - invalid start, expected 0x{:02X}",
                name,
                expected
            ));
        }
        Ok(())
    }

    /// Enforce [`DecoderOptions::reject_trailing_data`] once a top-level signature is complete.
    fn finish<T>(&self, value: T) -> Result<T> {
        if self.options.reject_trailing_data && self.cursor.has_more_data() {
            let offset = self.cursor.pos();
            return Err(invalid_encoding!(
                offset,
                self.cursor.peek_byte()?,
                "{} trailing byte(s) after signature",
                self.cursor.remaining()
            ));
        }
        Ok(value)
    }

    /// Parse a method signature from the blob - `MethodDefSig`, `MethodRefSig`, `StandAloneMethodSig`
    ///
    /// # Errors
    /// Returns an error if the signature data is malformed or if reading beyond the buffer bounds.
    pub fn parse_method_signature(&mut self) -> Result<MethodSignature> {
        let method = self.parse_method_body()?;
        self.finish(method)
    }

    /// Parse a field signature from the blob (II.23.2.4)
    ///
    /// # Errors
    /// Returns an error if the signature header is invalid or if the field type cannot be parsed.
    pub fn parse_field_signature(&mut self) -> Result<FieldSignature> {
        self.expect_header(SIGNATURE_HEADER::FIELD, "FieldSig")?;

        let field_type = self.parse_type()?;
        self.finish(FieldSignature { field_type })
    }

    /// Parse a property signature from the blob (II.23.2.5)
    ///
    /// # Errors
    /// Returns an error if the property signature header is invalid or if the property type cannot be parsed.
    pub fn parse_property_signature(&mut self) -> Result<PropertySignature> {
        let offset = self.cursor.pos();
        let head_byte = self.cursor.read_byte()?;
        if head_byte & !SignatureFlags::HAS_THIS.bits() != SIGNATURE_HEADER::PROPERTY {
            return Err(invalid_encoding!(
                offset,
                head_byte,
                "PropertySig - invalid start, expected 0x08 or 0x28"
            ));
        }

        let param_count = self.cursor.read_compressed_uint()?;
        let property_type = self.parse_type()?;
        let params = self.parse_types(param_count)?;

        self.finish(PropertySignature {
            has_this: head_byte & SignatureFlags::HAS_THIS.bits() != 0,
            property_type,
            params,
        })
    }

    /// Parse a local variable signature from the blob (II.23.2.6)
    ///
    /// # Errors
    /// Returns an error if the local variable signature header is invalid or if variable types cannot be parsed.
    pub fn parse_local_var_signature(&mut self) -> Result<LocalVariableSignature> {
        self.expect_header(SIGNATURE_HEADER::LOCAL_SIG, "LocalVarSig")?;

        let count_offset = self.cursor.pos();
        let count = self.cursor.read_compressed_uint()?;
        if count == 0 {
            return Err(invalid_encoding!(
                count_offset,
                0,
                "LocalVarSig - at least one local is required"
            ));
        }

        let locals = self.parse_types(count)?;
        self.finish(LocalVariableSignature { locals })
    }

    /// Parse a type specification signature from the blob (II.23.2.14)
    ///
    /// # Errors
    /// Returns an error if the type specification cannot be parsed.
    pub fn parse_type_spec_signature(&mut self) -> Result<TypeSpecSignature> {
        let base = self.parse_type()?;
        self.finish(TypeSpecSignature { base })
    }

    /// Parse a method specification signature from the blob (II.23.2.15)
    ///
    /// # Errors
    /// Returns an error if the method specification header is invalid or if the type arguments cannot be parsed.
    pub fn parse_method_spec_signature(&mut self) -> Result<MethodSpecSignature> {
        self.expect_header(SIGNATURE_HEADER::METHOD_SPEC, "MethodSpecSig")?;

        let count_offset = self.cursor.pos();
        let arg_count = self.cursor.read_compressed_uint()?;
        if arg_count == 0 {
            return Err(invalid_encoding!(
                count_offset,
                0,
                "MethodSpecSig - instantiation without type arguments"
            ));
        }

        let generic_args = self.parse_types(arg_count)?;
        self.finish(MethodSpecSignature { generic_args })
    }
}
