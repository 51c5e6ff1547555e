// Copyright 2025 Johann Kempter
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//
// SPDX-License-Identifier: Apache-2.0

#![doc(html_no_source)]
#![deny(missing_docs)]
#![deny(unsafe_code)]

//! # cilsig
//!
//! A decoder for the binary signature blobs of .NET (ECMA-335 CLI) metadata.
//!
//! Every method, field, property, local variable set and constructed type in a .NET
//! module is described by a compact, prefix-coded byte string in the `#Blob` heap.
//! `cilsig` turns such a blob into an owned, structured tree: calling convention,
//! return type, parameters, and arbitrarily nested types such as arrays, pointers,
//! generic instantiations and function pointers. Malformed input is reported as a
//! typed [`Error`] carrying the byte offset of the failure, never as a panic.
//!
//! The crate does not load files or resolve metadata tokens. Callers extract blobs
//! from a module themselves and, when they want names instead of tokens, supply a
//! [`TokenResolver`].
//!
//! ## Features
//!
//! - **Complete element-type coverage** - every ECMA-335 §II.23.1.16 type that can appear in a signature
//! - **All signature kinds** - method, field, property, local variable, type and method specifications
//! - **Bounded recursion** - a configurable nesting limit guards against hostile input
//! - **Round-trip encoding** - encoders producing the exact bytes the decoder accepts
//! - **Parallel batches** - `rayon`-backed decoding of many blobs at once
//!
//! ## Quick Start
//!
//! ```rust
//! use cilsig::prelude::*;
//!
//! // instance string (int32, class 0x01000012)
//! let method = parse_method_signature(&[0x20, 0x02, 0x0E, 0x08, 0x12, 0x49])?;
//!
//! assert!(method.has_this);
//! assert_eq!(method.return_type, TypeNode::Primitive(PrimitiveKind::String));
//! assert_eq!(method.params[1], TypeNode::Class(Token::new(0x0100_0012)));
//! assert_eq!(method.to_string(), "instance string (int32, class 0x01000012)");
//! # Ok::<(), cilsig::Error>(())
//! ```
//!
//! ## Architecture
//!
//! - [`blob`] - [`ByteCursor`] and the compressed integer / coded token encodings
//! - [`metadata::signatures`] - the [`metadata::signatures::SignatureParser`], the
//!   [`metadata::signatures::TypeNode`] model, encoders and rendering
//! - [`metadata::token`] - [`Token`], the metadata table references types point to
//!
//! ## Error Handling
//!
//! All fallible operations return [`Result<T>`]. Decoding stops at the first problem:
//!
//! ```rust
//! use cilsig::{metadata::signatures::parse_field_signature, ErrorKind};
//!
//! let err = parse_field_signature(&[0x06, 0x1D]).unwrap_err();
//! assert_eq!(err.kind(), ErrorKind::Truncated);
//! assert_eq!(err.offset(), 2);
//! ```
//!
//! ## Standards Compliance
//!
//! - **ECMA-335 6th Edition**, Partition II, §23.2 - Blobs and signatures
//! - **ECMA-335 6th Edition**, Partition II, §23.1.16 - Element types used in signatures
//!
//! ## Development and Testing
//!
//! ### Fuzzing
//!
//! ```bash
//! cargo +nightly fuzz run signature
//! ```
//!
//! ### Benchmarks
//!
//! ```bash
//! cargo bench
//! ```

#[macro_use]
pub(crate) mod error;

/// Convenient re-exports of the most commonly used types and functions.
///
/// # Example
///
/// ```rust
/// use cilsig::prelude::*;
///
/// let locals = parse_local_var_signature(&[0x07, 0x01, 0x08])?;
/// assert_eq!(locals.locals, vec![TypeNode::Primitive(PrimitiveKind::I4)]);
/// # Ok::<(), cilsig::Error>(())
/// ```
pub mod prelude;

/// Bounds-checked blob reading and the ECMA-335 compressed encodings
pub mod blob;

/// Signatures and tokens of CIL metadata, based on ECMA-335
///
/// # Key Components
///
/// - [`metadata::signatures`] - Signature decoding, encoding and rendering
/// - [`metadata::token`] - Metadata tokens for cross-references
pub mod metadata;

/// `cilsig` Result type
///
/// A type alias for [`std::result::Result<T, Error>`] where the error type is always [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// `cilsig` Error type
///
/// # Examples
///
/// ```rust
/// use cilsig::{metadata::signatures::parse_method_signature, Error};
///
/// match parse_method_signature(&[0x00, 0x01, 0x08]) {
///     Ok(method) => println!("Decoded: {}", method),
///     Err(Error::Truncated { offset, .. }) => println!("Blob ends early at {}", offset),
///     Err(e) => println!("Error: {}", e),
/// }
/// ```
pub use error::{Error, ErrorKind};

/// Bounds-checked cursor over a signature blob.
///
/// See [`blob::ByteCursor`].
pub use blob::ByteCursor;

/// Metadata token, the reference a class or value type carries.
///
/// See [`metadata::token::Token`].
pub use metadata::token::Token;

/// Lookup of type names for tokens.
///
/// See [`metadata::signatures::TokenResolver`].
pub use metadata::signatures::TokenResolver;
