use strum::{Display, EnumCount, EnumIter};
use thiserror::Error;

macro_rules! truncated_error {
    ($offset:expr, $needed:expr, $remaining:expr) => {
        crate::Error::Truncated {
            offset: $offset,
            needed: $needed,
            remaining: $remaining,
        }
    };
}

macro_rules! invalid_encoding {
    // Single string version
    ($offset:expr, $observed:expr, $msg:expr) => {
        crate::Error::InvalidEncoding {
            offset: $offset,
            observed: $observed,
            message: $msg.to_string(),
        }
    };

    // Format string with arguments version
    ($offset:expr, $observed:expr, $fmt:expr, $($arg:tt)*) => {
        crate::Error::InvalidEncoding {
            offset: $offset,
            observed: $observed,
            message: format!($fmt, $($arg)*),
        }
    };
}

/// The error type returned by every decoding and encoding operation of this crate.
///
/// A single malformed byte anywhere in a signature blob invalidates the whole
/// signature: decoding aborts at the first failure and no partial result is
/// produced. Each variant records the byte offset (relative to the start of the
/// blob) at which the failure was detected, so callers can report or skip an
/// unparseable signature without understanding the binary format.
///
/// # Error Categories
///
/// - [`Error::Truncated`] - The blob ended before a complete value could be read
/// - [`Error::InvalidEncoding`] - A compressed integer, token, header or calling
///   convention byte did not match any valid pattern
/// - [`Error::UnknownElementType`] - An element-type byte outside the recognized set
/// - [`Error::MaxDepthExceeded`] - The nesting guard tripped
///
/// # Examples
///
/// ```rust
/// use cilsig::{metadata::signatures::parse_method_signature, Error, ErrorKind};
///
/// match parse_method_signature(&[0x00, 0x01, 0x08]) {
///     Err(Error::Truncated { offset, .. }) => assert_eq!(offset, 3),
///     other => panic!("unexpected result: {:?}", other),
/// }
///
/// let err = parse_method_signature(&[0x00, 0x00, 0x42]).unwrap_err();
/// assert_eq!(err.kind(), ErrorKind::UnknownElementType);
/// assert_eq!(err.offset(), 2);
/// assert_eq!(err.observed(), Some(0x42));
/// ```
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The cursor ran out of bytes.
    ///
    /// The failed read did not consume anything; `offset` is the cursor position
    /// at which the read was attempted.
    #[error("Out of bound read would have occurred - offset {offset}, needed {needed}, remaining {remaining}")]
    Truncated {
        /// Position at which the read was attempted
        offset: usize,
        /// Number of bytes the read required
        needed: usize,
        /// Number of bytes that were left
        remaining: usize,
    },

    /// A byte sequence does not match any valid pattern for the value being read.
    ///
    /// Covers compressed integers with a reserved length prefix, coded tokens with
    /// the reserved tag, unexpected signature header bytes, invalid calling
    /// conventions and structurally impossible shapes (e.g. an array of rank 0).
    #[error("Invalid encoding at offset {offset} (byte 0x{observed:02X}): {message}")]
    InvalidEncoding {
        /// Position of the offending byte
        offset: usize,
        /// The offending byte value
        observed: u8,
        /// What was expected instead
        message: String,
    },

    /// An element-type byte is outside the set valid in a type position.
    #[error("Unsupported ELEMENT_TYPE 0x{value:02X} at offset {offset}")]
    UnknownElementType {
        /// Position of the element-type byte
        offset: usize,
        /// The element-type byte
        value: u8,
    },

    /// The type nesting guard tripped.
    ///
    /// Signatures come from arbitrary loaded assemblies; the recursive decoder
    /// refuses to nest deeper than the configured limit.
    #[error("Reached the maximum nesting depth allowed - {limit} (offset {offset})")]
    MaxDepthExceeded {
        /// The configured nesting limit
        limit: usize,
        /// Position at which the next nested type would have started
        offset: usize,
    },
}

/// The discriminant of an [`Error`], for callers that only care about the failure class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, EnumCount)]
pub enum ErrorKind {
    /// See [`Error::Truncated`]
    Truncated,
    /// See [`Error::InvalidEncoding`]
    InvalidEncoding,
    /// See [`Error::UnknownElementType`]
    UnknownElementType,
    /// See [`Error::MaxDepthExceeded`]
    MaxDepthExceeded,
}

impl Error {
    /// Returns the failure class of this error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Truncated { .. } => ErrorKind::Truncated,
            Error::InvalidEncoding { .. } => ErrorKind::InvalidEncoding,
            Error::UnknownElementType { .. } => ErrorKind::UnknownElementType,
            Error::MaxDepthExceeded { .. } => ErrorKind::MaxDepthExceeded,
        }
    }

    /// Returns the byte offset within the blob at which decoding failed.
    #[must_use]
    pub fn offset(&self) -> usize {
        match self {
            Error::Truncated { offset, .. }
            | Error::InvalidEncoding { offset, .. }
            | Error::UnknownElementType { offset, .. }
            | Error::MaxDepthExceeded { offset, .. } => *offset,
        }
    }

    /// Returns the offending byte, if the failure was caused by a specific byte value.
    #[must_use]
    pub fn observed(&self) -> Option<u8> {
        match self {
            Error::InvalidEncoding { observed, .. } => Some(*observed),
            Error::UnknownElementType { value, .. } => Some(*value),
            Error::Truncated { .. } | Error::MaxDepthExceeded { .. } => None,
        }
    }
}
