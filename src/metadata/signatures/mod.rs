//! Method and type signature parsing for .NET metadata.
//!
//! This module decodes the signature blobs of ECMA-335 Partition II, §23.2 into
//! owned [`TypeNode`] trees. Signatures encode type information, method parameters,
//! generic instantiations and calling conventions in a compact binary format.
//!
//! # Signature Types
//!
//! - **Method Signatures** - Calling convention, return type and parameters ([`parse_method_signature`])
//! - **Field Signatures** - A single, possibly modified, type ([`parse_field_signature`])
//! - **Property Signatures** - Property type and indexer parameters ([`parse_property_signature`])
//! - **LocalVar Signatures** - Local variable types within method bodies ([`parse_local_var_signature`])
//! - **TypeSpec Signatures** - Constructed types such as generic instantiations ([`parse_type_spec_signature`])
//! - **MethodSpec Signatures** - Generic method instantiation arguments ([`parse_method_spec_signature`])
//!
//! # Binary Format
//!
//! - Calling conventions and headers are single bytes
//! - Counts, array bounds and generic parameter indices are compressed integers
//! - Class and value type references are `TypeDefOrRefOrSpecEncoded` coded indices
//! - Custom modifiers, `BYREF` and `PINNED` prefix the type they apply to
//!
//! # Examples
//!
//! ```rust
//! use cilsig::metadata::signatures::{parse_method_signature, PrimitiveKind, TypeNode};
//!
//! // int32 (int32)
//! let method = parse_method_signature(&[0x00, 0x01, 0x08, 0x08])?;
//! assert!(!method.has_this);
//! assert_eq!(method.return_type, TypeNode::Primitive(PrimitiveKind::I4));
//! assert_eq!(method.params, vec![TypeNode::Primitive(PrimitiveKind::I4)]);
//! assert_eq!(method.to_string(), "int32 (int32)");
//! # Ok::<(), cilsig::Error>(())
//! ```
//!
//! ```rust
//! use cilsig::metadata::signatures::parse_local_var_signature;
//!
//! // 2 locals: int32, string
//! let locals = parse_local_var_signature(&[0x07, 0x02, 0x08, 0x0E])?;
//! for (i, local_type) in locals.locals.iter().enumerate() {
//!     println!("Local {}: {}", i, local_type);
//! }
//! # Ok::<(), cilsig::Error>(())
//! ```
//!
//! # References
//!
//! - ECMA-335 6th Edition, Partition II, Section 23.2 - Blobs and Signatures
//! - ECMA-335 6th Edition, Partition II, Section 23.1.16 - Element types used in signatures

mod batch;
mod constants;
mod display;
mod encoders;
mod names;
mod parser;
mod types;

pub use batch::*;
pub use constants::*;
pub use encoders::*;
pub use names::*;
pub use parser::*;
pub use types::*;

use crate::Result;

/// Parse a `MethodSignature` from a byte slice
///
/// ## Arguments
/// * 'data' - The input slice to parse
///
/// # Errors
/// Returns an error if the signature data is malformed or parsing fails
pub fn parse_method_signature(data: &[u8]) -> Result<MethodSignature> {
    let mut parser = SignatureParser::new(data);
    parser.parse_method_signature()
}

/// Parse a `FieldSignature` from a byte slice
///
/// ## Arguments
/// * 'data' - The input slice to parse
///
/// # Errors
/// Returns an error if the signature data is malformed or parsing fails
pub fn parse_field_signature(data: &[u8]) -> Result<FieldSignature> {
    let mut parser = SignatureParser::new(data);
    parser.parse_field_signature()
}

/// Parse a `PropertySignature` from a byte slice
///
/// ## Arguments
/// * 'data' - The input slice to parse
///
/// # Errors
/// Returns an error if the signature data is malformed or parsing fails
pub fn parse_property_signature(data: &[u8]) -> Result<PropertySignature> {
    let mut parser = SignatureParser::new(data);
    parser.parse_property_signature()
}

/// Parse a `LocalVariableSignature` from a byte slice
///
/// ## Arguments
/// * 'data' - The input slice to parse
///
/// # Errors
/// Returns an error if the signature data is malformed or parsing fails
pub fn parse_local_var_signature(data: &[u8]) -> Result<LocalVariableSignature> {
    let mut parser = SignatureParser::new(data);
    parser.parse_local_var_signature()
}

/// Parse a `TypeSpecSignature` from a byte slice
///
/// ## Arguments
/// * 'data' - The input slice to parse
///
/// # Errors
/// Returns an error if the signature data is malformed or parsing fails
pub fn parse_type_spec_signature(data: &[u8]) -> Result<TypeSpecSignature> {
    let mut parser = SignatureParser::new(data);
    parser.parse_type_spec_signature()
}

/// Parse a `MethodSpecSignature` from a byte slice
///
/// ## Arguments
/// * 'data' - The input slice to parse
///
/// # Errors
/// Returns an error if the signature data is malformed or parsing fails
pub fn parse_method_spec_signature(data: &[u8]) -> Result<MethodSpecSignature> {
    let mut parser = SignatureParser::new(data);
    parser.parse_method_spec_signature()
}
