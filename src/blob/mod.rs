//! Low-level blob reading primitives.
//!
//! Signature blobs are handed to this crate as already-extracted byte slices. This
//! module provides the two layers every decoder reads through:
//!
//! - [`ByteCursor`] - bounds-checked sequential access with all-or-nothing reads
//! - [`compressed`] - the ECMA-335 compressed unsigned/signed integer and coded token
//!   encodings, as readers on [`ByteCursor`] and as writers into a `Vec<u8>`
//!
//! # Examples
//!
//! ```rust
//! use cilsig::blob::{write_compressed_uint, ByteCursor};
//!
//! let mut blob = Vec::new();
//! write_compressed_uint(0x3FFF, &mut blob)?;
//! write_compressed_uint(0x4000, &mut blob)?;
//!
//! let mut cursor = ByteCursor::new(&blob);
//! assert_eq!(cursor.read_compressed_uint()?, 0x3FFF);
//! assert_eq!(cursor.read_compressed_uint()?, 0x4000);
//! assert!(!cursor.has_more_data());
//! # Ok::<(), cilsig::Error>(())
//! ```

pub mod compressed;
mod cursor;

pub use compressed::{
    write_compressed_int, write_compressed_token, write_compressed_uint, COMPRESSED_NULL,
    MAX_COMPRESSED_INT, MAX_COMPRESSED_UINT, MIN_COMPRESSED_INT,
};
pub use cursor::ByteCursor;
