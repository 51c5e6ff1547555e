//! ECMA-335 II.23.2 compressed integer codec.
//!
//! Signature blobs store lengths, counts, generic indices and coded tokens as
//! variable-length big-endian integers. The length of the encoding is selected by
//! the high bits of the first byte:
//!
//! | First byte  | Length | Payload bits | Value range               |
//! |-------------|--------|--------------|---------------------------|
//! | `0xxxxxxx`  | 1      | 7            | `0x00` - `0x7F`           |
//! | `10xxxxxx`  | 2      | 14           | `0x80` - `0x3FFF`         |
//! | `110xxxxx`  | 4      | 29           | `0x4000` - `0x1FFF_FFFF`  |
//! | `0xFF`      | 1      | -            | null marker               |
//!
//! Any other first byte (`0xE0` - `0xFE`) is rejected with
//! [`crate::Error::InvalidEncoding`]. The null marker is only meaningful in a few
//! contexts, so [`ByteCursor::read_compressed_uint`] rejects it too; callers that
//! accept it use [`ByteCursor::read_compressed_uint_or_null`] and check for `None`.
//!
//! Signed values use the same length rules. The payload is rotated right by one bit
//! (the lowest bit is the sign) and sign-extended from 6, 13 or 28 bits.
//!
//! All readers are atomic: the full encoding is bounds-checked before anything is
//! consumed, so a truncated value leaves the cursor where it was.

use crate::{
    blob::ByteCursor,
    metadata::token::{Token, TypeTable},
    Result,
};

/// Largest value representable as a compressed unsigned integer.
pub const MAX_COMPRESSED_UINT: u32 = 0x1FFF_FFFF;

/// Smallest value representable as a compressed signed integer.
pub const MIN_COMPRESSED_INT: i32 = -0x1000_0000;

/// Largest value representable as a compressed signed integer.
pub const MAX_COMPRESSED_INT: i32 = 0x0FFF_FFFF;

/// The reserved first byte denoting a null value.
pub const COMPRESSED_NULL: u8 = 0xFF;

/// Largest row a metadata token can address.
const MAX_TOKEN_ROW: u32 = 0x00FF_FFFF;

/// Returns the encoded length selected by a compressed integer's first byte.
///
/// `None` for the null marker and for the reserved `111xxxxx` prefixes.
#[must_use]
pub fn compressed_length(first_byte: u8) -> Option<usize> {
    if first_byte & 0x80 == 0 {
        Some(1)
    } else if first_byte & 0xC0 == 0x80 {
        Some(2)
    } else if first_byte & 0xE0 == 0xC0 {
        Some(4)
    } else {
        None
    }
}

/// Returns how many bytes `value` occupies when written as a compressed unsigned integer.
///
/// `None` if the value exceeds [`MAX_COMPRESSED_UINT`].
#[must_use]
pub fn compressed_uint_size(value: u32) -> Option<usize> {
    match value {
        0..=0x7F => Some(1),
        0x80..=0x3FFF => Some(2),
        0x4000..=MAX_COMPRESSED_UINT => Some(4),
        _ => None,
    }
}

/// Append `value` as a compressed unsigned integer, choosing the shortest form.
///
/// # Errors
/// Returns [`crate::Error::InvalidEncoding`] if the value exceeds [`MAX_COMPRESSED_UINT`].
///
/// # Examples
///
/// ```rust
/// use cilsig::blob::write_compressed_uint;
///
/// let mut buffer = Vec::new();
/// write_compressed_uint(0x80, &mut buffer)?;
/// assert_eq!(buffer, [0x80, 0x80]);
/// # Ok::<(), cilsig::Error>(())
/// ```
#[allow(clippy::cast_possible_truncation)]
pub fn write_compressed_uint(value: u32, buffer: &mut Vec<u8>) -> Result<()> {
    match compressed_uint_size(value) {
        Some(1) => buffer.push(value as u8),
        Some(2) => {
            buffer.push(0x80 | (value >> 8) as u8);
            buffer.push(value as u8);
        }
        Some(_) => {
            buffer.push(0xC0 | (value >> 24) as u8);
            buffer.push((value >> 16) as u8);
            buffer.push((value >> 8) as u8);
            buffer.push(value as u8);
        }
        None => {
            return Err(invalid_encoding!(
                buffer.len(),
                (value >> 24) as u8,
                "Value {} exceeds the compressed uint range",
                value
            ))
        }
    }
    Ok(())
}

/// Append `value` as a compressed signed integer, choosing the shortest form.
///
/// # Errors
/// Returns [`crate::Error::InvalidEncoding`] if the value is outside
/// [`MIN_COMPRESSED_INT`]..=[`MAX_COMPRESSED_INT`].
///
/// # Examples
///
/// ```rust
/// use cilsig::blob::write_compressed_int;
///
/// let mut buffer = Vec::new();
/// write_compressed_int(-3, &mut buffer)?;
/// assert_eq!(buffer, [0x7B]);
/// # Ok::<(), cilsig::Error>(())
/// ```
#[allow(clippy::cast_sign_loss, clippy::cast_possible_truncation)]
pub fn write_compressed_int(value: i32, buffer: &mut Vec<u8>) -> Result<()> {
    let sign = u32::from(value < 0);
    let rotated = (value as u32) << 1;

    match value {
        -0x40..=0x3F => buffer.push(((rotated & 0x7E) | sign) as u8),
        -0x2000..=0x1FFF => {
            let payload = (rotated & 0x3FFE) | sign;
            buffer.push(0x80 | (payload >> 8) as u8);
            buffer.push(payload as u8);
        }
        MIN_COMPRESSED_INT..=MAX_COMPRESSED_INT => {
            let payload = (rotated & 0x1FFF_FFFE) | sign;
            buffer.push(0xC0 | (payload >> 24) as u8);
            buffer.push((payload >> 16) as u8);
            buffer.push((payload >> 8) as u8);
            buffer.push(payload as u8);
        }
        _ => {
            return Err(invalid_encoding!(
                buffer.len(),
                (value >> 24) as u8,
                "Value {} exceeds the compressed int range",
                value
            ))
        }
    }
    Ok(())
}

/// Append `token` as a `TypeDefOrRefOrSpecEncoded` coded index (II.23.2.8).
///
/// # Errors
/// Returns [`crate::Error::InvalidEncoding`] if the token does not point into the
/// TypeDef, TypeRef or TypeSpec table.
pub fn write_compressed_token(token: Token, buffer: &mut Vec<u8>) -> Result<()> {
    let tag = match token.table() {
        0x02 => 0,
        0x01 => 1,
        0x1B => 2,
        table => {
            return Err(invalid_encoding!(
                buffer.len(),
                table,
                "Token {} is not a TypeDef, TypeRef or TypeSpec",
                token
            ))
        }
    };

    // Rows are 24 bits wide, so the coded index always fits the 4-byte form
    write_compressed_uint((token.row() << 2) | tag, buffer)
}

impl ByteCursor<'_> {
    /// Read a compressed unsigned integer (II.23.2).
    ///
    /// # Errors
    /// Returns [`crate::Error::Truncated`] if the encoding runs past the end of the blob,
    /// or [`crate::Error::InvalidEncoding`] for the null marker and reserved prefixes.
    /// The position is unchanged on failure.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use cilsig::blob::ByteCursor;
    ///
    /// let mut cursor = ByteCursor::new(&[0x7F, 0xBF, 0xFF]);
    /// assert_eq!(cursor.read_compressed_uint()?, 0x7F);
    /// assert_eq!(cursor.read_compressed_uint()?, 0x3FFF);
    /// assert_eq!(cursor.pos(), 3);
    /// # Ok::<(), cilsig::Error>(())
    /// ```
    pub fn read_compressed_uint(&mut self) -> Result<u32> {
        let offset = self.pos();
        if self.peek_byte()? == COMPRESSED_NULL {
            return Err(invalid_encoding!(
                offset,
                COMPRESSED_NULL,
                "Null marker is not valid for a compressed uint here"
            ));
        }

        self.read_compressed_value()
    }

    /// Read a compressed unsigned integer that may be the null marker (`0xFF`).
    ///
    /// Returns `Ok(None)` after consuming the single marker byte.
    ///
    /// # Errors
    /// Returns [`crate::Error::Truncated`] if the encoding runs past the end of the blob,
    /// or [`crate::Error::InvalidEncoding`] for the reserved `0xE0` - `0xFE` prefixes.
    pub fn read_compressed_uint_or_null(&mut self) -> Result<Option<u32>> {
        let first_byte = self.peek_byte()?;

        if first_byte == COMPRESSED_NULL {
            self.advance()?;
            return Ok(None);
        }

        self.read_compressed_value().map(Some)
    }

    /// Decode one compressed value whose first byte is known not to be the null marker.
    fn read_compressed_value(&mut self) -> Result<u32> {
        let offset = self.pos();
        let first_byte = self.peek_byte()?;

        let (length, mask) = match compressed_length(first_byte) {
            Some(1) => (1, 0x7F),
            Some(2) => (2, 0x3FFF),
            Some(_) => (4, MAX_COMPRESSED_UINT),
            None => {
                return Err(invalid_encoding!(
                    offset,
                    first_byte,
                    "Invalid compressed uint prefix"
                ))
            }
        };

        let bytes = self.read_bytes(length)?;
        let value = bytes
            .iter()
            .fold(0u32, |acc, byte| (acc << 8) | u32::from(*byte));

        Ok(value & mask)
    }

    /// Read a compressed signed integer (II.23.2).
    ///
    /// # Errors
    /// Same as [`ByteCursor::read_compressed_uint`].
    ///
    /// # Examples
    ///
    /// ```rust
    /// use cilsig::blob::ByteCursor;
    ///
    /// let mut cursor = ByteCursor::new(&[0x06, 0x7B, 0x80, 0x01]);
    /// assert_eq!(cursor.read_compressed_int()?, 3);
    /// assert_eq!(cursor.read_compressed_int()?, -3);
    /// assert_eq!(cursor.read_compressed_int()?, -8192);
    /// # Ok::<(), cilsig::Error>(())
    /// ```
    #[allow(clippy::cast_possible_wrap)]
    pub fn read_compressed_int(&mut self) -> Result<i32> {
        let first_byte = self.peek_byte()?;
        let unsigned = self.read_compressed_uint()?;

        let magnitude = (unsigned >> 1) as i32;
        if unsigned & 1 == 0 {
            return Ok(magnitude);
        }

        let bias = match compressed_length(first_byte) {
            Some(1) => 0x40,
            Some(2) => 0x2000,
            _ => 0x1000_0000,
        };
        Ok(magnitude - bias)
    }

    /// Read a `TypeDefOrRefOrSpecEncoded` coded index (II.23.2.8) as a [`Token`].
    ///
    /// | Tag | Table    | Token prefix  |
    /// |-----|----------|---------------|
    /// | 0   | TypeDef  | `0x0200_0000` |
    /// | 1   | TypeRef  | `0x0100_0000` |
    /// | 2   | TypeSpec | `0x1B00_0000` |
    ///
    /// # Errors
    /// Returns [`crate::Error::InvalidEncoding`] for the reserved tag 3 and for rows
    /// wider than 24 bits, in addition to the errors of
    /// [`ByteCursor::read_compressed_uint`].
    pub fn read_compressed_token(&mut self) -> Result<Token> {
        let offset = self.pos();
        let first_byte = self.peek_byte()?;

        self.transactional(|cursor| {
            let coded = cursor.read_compressed_uint()?;

            let table = match coded & 0x3 {
                0x0 => TypeTable::TypeDef,
                0x1 => TypeTable::TypeRef,
                0x2 => TypeTable::TypeSpec,
                _ => {
                    return Err(invalid_encoding!(
                        offset,
                        first_byte,
                        "Invalid TypeDefOrRef coded index - {}",
                        coded
                    ))
                }
            };

            // A token row is 24 bits; anything wider would spill into the table byte
            let row = coded >> 2;
            if row > MAX_TOKEN_ROW {
                return Err(invalid_encoding!(
                    offset,
                    first_byte,
                    "TypeDefOrRef row 0x{:X} exceeds 24 bits",
                    row
                ));
            }

            Ok(Token::from_parts(table, row))
        })
    }
}
