//! Signature and token handling for .NET metadata.
//!
//! # Key Components
//!
//! - [`token`] - Metadata table row references used throughout .NET
//! - [`signatures`] - Method and type signature parsing
//!
//! # Examples
//!
//! ```rust
//! use cilsig::metadata::{signatures::parse_type_spec_signature, token::Token};
//!
//! // class 0x1B000010[]
//! let spec = parse_type_spec_signature(&[0x1D, 0x12, 0x42])?;
//! println!("{}", spec);
//! # let _ = Token::new(0x1B00_0010);
//! # Ok::<(), cilsig::Error>(())
//! ```

/// Implementation of the method and type signatures
pub mod signatures;
/// Commonly used metadata token type
pub mod token;
