//! # cilsig Prelude
//!
//! This module provides a convenient prelude for the most commonly used types and
//! functions of the cilsig library.

// ================================================================================================
// Core Types and Error Handling
// ================================================================================================

/// The main error type for all cilsig operations
pub use crate::{Error, ErrorKind};

/// The result type used throughout cilsig
pub use crate::Result;

/// Low-level blob reading
pub use crate::blob::ByteCursor;

/// Metadata token type for referencing table entries
pub use crate::metadata::token::{Token, TypeTable};

// ================================================================================================
// Signature Model
// ================================================================================================

/// Decoded type trees
pub use crate::metadata::signatures::{
    GenericInstance, ModifiedType, PrimitiveKind, SignatureArray, TypeNode,
};

/// Decoded signatures
pub use crate::metadata::signatures::{
    CallingConvention, FieldSignature, LocalVariableSignature, MethodSignature,
    MethodSpecSignature, PropertySignature, TypeSpecSignature,
};

/// Type name resolution
pub use crate::metadata::signatures::{TokenResolver, UnresolvedTokens};

// ================================================================================================
// Decoding and Encoding
// ================================================================================================

/// The decoder and its configuration
pub use crate::metadata::signatures::{DecoderOptions, SignatureParser};

/// One-shot decoding functions
pub use crate::metadata::signatures::{
    parse_field_signature, parse_local_var_signature, parse_method_signature,
    parse_method_signatures_parallel, parse_method_spec_signature, parse_property_signature,
    parse_type_spec_signature,
};

/// Encoding functions
pub use crate::metadata::signatures::{
    encode_field_signature, encode_method_signature, encode_type_node,
};
