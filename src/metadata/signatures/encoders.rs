//! Signature encoders, the inverse of [`crate::metadata::signatures::SignatureParser`].
//!
//! Each encoder writes the ECMA-335 binary form of one signature kind. They accept
//! only values the decoder could itself have produced, so for every value an encoder
//! accepts, decoding its output yields the same value again:
//!
//! ```rust
//! use cilsig::metadata::signatures::{
//!     encode_method_signature, parse_method_signature, MethodSignature, PrimitiveKind, TypeNode,
//! };
//!
//! let method = MethodSignature {
//!     has_this: true,
//!     return_type: PrimitiveKind::I4.into(),
//!     params: vec![TypeNode::sz_array(PrimitiveKind::String.into())],
//!     ..Default::default()
//! };
//!
//! let blob = encode_method_signature(&method)?;
//! assert_eq!(blob, [0x20, 0x01, 0x08, 0x1D, 0x0E]);
//! assert_eq!(parse_method_signature(&blob)?, method);
//! # Ok::<(), cilsig::Error>(())
//! ```
//!
//! Nesting depth is not limited here; a tree deeper than the decoder's
//! [`crate::metadata::signatures::DecoderOptions::max_depth`] encodes fine but will
//! not decode with those options.

use crate::{
    blob::{write_compressed_int, write_compressed_token, write_compressed_uint},
    metadata::signatures::{
        FieldSignature, LocalVariableSignature, MethodSignature, MethodSpecSignature,
        PropertySignature, SignatureFlags, TypeNode, TypeSpecSignature, ELEMENT_TYPE,
        MAX_ARRAY_RANK, SIGNATURE_HEADER,
    },
    Result,
};

/// Writes a list length as a compressed unsigned integer.
fn write_count(count: usize, observed: u8, what: &str, buffer: &mut Vec<u8>) -> Result<()> {
    let count = u32::try_from(count).map_err(|_| {
        invalid_encoding!(buffer.len(), observed, "Too many {} - {}", what, count)
    })?;
    write_compressed_uint(count, buffer)
}

/// Append the encoding of a single type.
///
/// # Errors
/// Returns [`crate::Error::InvalidEncoding`] for shapes the decoder would reject:
/// arrays of rank 0, above [`MAX_ARRAY_RANK`] or with more sizes / lower bounds than
/// dimensions, generic
/// instantiations without arguments, tokens outside the TypeDef / TypeRef / TypeSpec
/// tables, and values outside the compressed integer ranges.
pub fn encode_type_node(node: &TypeNode, buffer: &mut Vec<u8>) -> Result<()> {
    let element_type = node.element_type();
    buffer.push(element_type);

    match node {
        TypeNode::Primitive(_) => Ok(()),
        TypeNode::Class(token) | TypeNode::ValueType(token) => {
            write_compressed_token(*token, buffer)
        }
        TypeNode::SzArray(inner)
        | TypeNode::Ptr(inner)
        | TypeNode::ByRef(inner)
        | TypeNode::Pinned(inner) => encode_type_node(inner, buffer),
        TypeNode::GenericParam { index, .. } => write_compressed_uint(*index, buffer),
        TypeNode::Modified(modified) => {
            write_compressed_token(modified.modifier, buffer)?;
            encode_type_node(&modified.inner, buffer)
        }
        TypeNode::Array(array) => {
            encode_type_node(&array.element, buffer)?;

            if array.rank == 0 || array.rank > MAX_ARRAY_RANK {
                return Err(invalid_encoding!(
                    buffer.len(),
                    element_type,
                    "ARRAY - rank {} outside 1..={}",
                    array.rank,
                    MAX_ARRAY_RANK
                ));
            }
            if array.sizes.len() > array.rank as usize
                || array.lower_bounds.len() > array.rank as usize
            {
                return Err(invalid_encoding!(
                    buffer.len(),
                    element_type,
                    "ARRAY - more sizes or lower bounds than rank {}",
                    array.rank
                ));
            }

            write_compressed_uint(array.rank, buffer)?;
            write_count(array.sizes.len(), element_type, "array sizes", buffer)?;
            for size in &array.sizes {
                write_compressed_uint(*size, buffer)?;
            }
            write_count(array.lower_bounds.len(), element_type, "lower bounds", buffer)?;
            for bound in &array.lower_bounds {
                write_compressed_int(*bound, buffer)?;
            }
            Ok(())
        }
        TypeNode::GenericInst(inst) => {
            if inst.args.is_empty() {
                return Err(invalid_encoding!(
                    buffer.len(),
                    element_type,
                    "GENERICINST - instantiation without type arguments"
                ));
            }

            buffer.push(if inst.value_type {
                ELEMENT_TYPE::VALUETYPE
            } else {
                ELEMENT_TYPE::CLASS
            });
            write_compressed_token(inst.base, buffer)?;
            write_count(inst.args.len(), element_type, "type arguments", buffer)?;
            for arg in &inst.args {
                encode_type_node(arg, buffer)?;
            }
            Ok(())
        }
        TypeNode::FnPtr(method) => write_method_signature(method, buffer),
    }
}

fn write_method_signature(signature: &MethodSignature, buffer: &mut Vec<u8>) -> Result<()> {
    let header = signature.header_byte();

    if signature.explicit_this && !signature.has_this {
        return Err(invalid_encoding!(
            buffer.len(),
            header,
            "EXPLICITTHIS requires HASTHIS"
        ));
    }
    if !signature.generic && signature.generic_param_count != 0 {
        return Err(invalid_encoding!(
            buffer.len(),
            header,
            "Generic parameter count {} without the GENERIC flag",
            signature.generic_param_count
        ));
    }
    if let Some(index) = signature.sentinel {
        // A sentinel is only written in front of at least one vararg parameter
        if !signature.calling_convention.allows_varargs() || index >= signature.params.len() {
            return Err(invalid_encoding!(
                buffer.len(),
                ELEMENT_TYPE::SENTINEL,
                "Sentinel at {} is not valid for {} with {} parameter(s)",
                index,
                signature.calling_convention,
                signature.params.len()
            ));
        }
    }

    buffer.push(header);
    if signature.generic {
        write_compressed_uint(signature.generic_param_count, buffer)?;
    }
    write_count(signature.params.len(), header, "parameters", buffer)?;

    encode_type_node(&signature.return_type, buffer)?;
    for (index, param) in signature.params.iter().enumerate() {
        if signature.sentinel == Some(index) {
            buffer.push(ELEMENT_TYPE::SENTINEL);
        }
        encode_type_node(param, buffer)?;
    }

    Ok(())
}

/// Encodes a method signature (`MethodDefSig`, `MethodRefSig`, `StandAloneMethodSig`).
///
/// # Errors
/// Returns [`crate::Error::InvalidEncoding`] if the flags are inconsistent
/// (`explicit_this` without `has_this`, a generic parameter count without `generic`),
/// if the sentinel is not followed by a parameter or the calling convention does not
/// allow one, or if any contained type cannot be encoded.
pub fn encode_method_signature(signature: &MethodSignature) -> Result<Vec<u8>> {
    let mut buffer = Vec::new();
    write_method_signature(signature, &mut buffer)?;
    Ok(buffer)
}

/// Encodes a field signature.
///
/// # Errors
/// Returns an error if the field type cannot be encoded.
pub fn encode_field_signature(signature: &FieldSignature) -> Result<Vec<u8>> {
    let mut buffer = vec![SIGNATURE_HEADER::FIELD];
    encode_type_node(&signature.field_type, &mut buffer)?;
    Ok(buffer)
}

/// Encodes a property signature.
///
/// # Errors
/// Returns an error if the property type or any parameter cannot be encoded.
pub fn encode_property_signature(signature: &PropertySignature) -> Result<Vec<u8>> {
    let mut prolog = SIGNATURE_HEADER::PROPERTY;
    if signature.has_this {
        prolog |= SignatureFlags::HAS_THIS.bits();
    }

    let mut buffer = vec![prolog];
    write_count(signature.params.len(), prolog, "parameters", &mut buffer)?;
    encode_type_node(&signature.property_type, &mut buffer)?;
    for param in &signature.params {
        encode_type_node(param, &mut buffer)?;
    }
    Ok(buffer)
}

/// Encodes a local variable signature.
///
/// # Errors
/// Returns [`crate::Error::InvalidEncoding`] if there are no locals, or if any local
/// type cannot be encoded.
pub fn encode_local_var_signature(signature: &LocalVariableSignature) -> Result<Vec<u8>> {
    let mut buffer = vec![SIGNATURE_HEADER::LOCAL_SIG];
    if signature.locals.is_empty() {
        return Err(invalid_encoding!(
            buffer.len(),
            SIGNATURE_HEADER::LOCAL_SIG,
            "LocalVarSig - at least one local is required"
        ));
    }

    write_count(
        signature.locals.len(),
        SIGNATURE_HEADER::LOCAL_SIG,
        "locals",
        &mut buffer,
    )?;
    for local in &signature.locals {
        encode_type_node(local, &mut buffer)?;
    }
    Ok(buffer)
}

/// Encodes a type specification signature, which is a bare type.
///
/// # Errors
/// Returns an error if the type cannot be encoded.
pub fn encode_typespec_signature(signature: &TypeSpecSignature) -> Result<Vec<u8>> {
    let mut buffer = Vec::new();
    encode_type_node(&signature.base, &mut buffer)?;
    Ok(buffer)
}

/// Encodes a method specification signature.
///
/// # Errors
/// Returns [`crate::Error::InvalidEncoding`] if there are no type arguments, or if any
/// argument cannot be encoded.
pub fn encode_method_spec_signature(signature: &MethodSpecSignature) -> Result<Vec<u8>> {
    let mut buffer = vec![SIGNATURE_HEADER::METHOD_SPEC];
    if signature.generic_args.is_empty() {
        return Err(invalid_encoding!(
            buffer.len(),
            SIGNATURE_HEADER::METHOD_SPEC,
            "MethodSpecSig - instantiation without type arguments"
        ));
    }

    write_count(
        signature.generic_args.len(),
        SIGNATURE_HEADER::METHOD_SPEC,
        "type arguments",
        &mut buffer,
    )?;
    for arg in &signature.generic_args {
        encode_type_node(arg, &mut buffer)?;
    }
    Ok(buffer)
}
