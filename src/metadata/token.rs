use std::fmt;

use strum::{Display, EnumIter, FromRepr};

/// A metadata token referencing a row of a metadata table.
///
/// Signatures only ever reference types, through the `TypeDefOrRefOrSpecEncoded`
/// coded index, so the tokens produced by the decoder always point into one of the
/// tables listed in [`TypeTable`]. The decoder treats them as opaque identifiers:
/// resolving a token to a type name is the job of a [`crate::TokenResolver`].
///
/// - The high byte (bits 24-31) indicates the table
/// - The low 24 bits (bits 0-23) indicate the row index within that table
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Token(pub u32);

/// The metadata tables a signature type reference can point into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, FromRepr)]
#[repr(u8)]
pub enum TypeTable {
    /// A type reference into another module or assembly
    TypeRef = 0x01,
    /// A type defined in the current module
    TypeDef = 0x02,
    /// A constructed type described by its own signature blob
    TypeSpec = 0x1B,
}

impl Token {
    /// Creates a new token from a raw 32-bit value
    #[must_use]
    pub fn new(value: u32) -> Self {
        Token(value)
    }

    /// Creates a token for `row` of `table`.
    ///
    /// Only the low 24 bits of `row` are kept.
    #[must_use]
    pub fn from_parts(table: TypeTable, row: u32) -> Self {
        Token((u32::from(table as u8) << 24) | (row & 0x00FF_FFFF))
    }

    /// Returns the raw token value
    #[must_use]
    pub fn value(&self) -> u32 {
        self.0
    }

    /// Extracts the table type from the token (high byte)
    #[must_use]
    pub fn table(&self) -> u8 {
        (self.0 >> 24) as u8
    }

    /// Extracts the row index from the token (low 24 bits)
    #[must_use]
    pub fn row(&self) -> u32 {
        self.0 & 0x00FF_FFFF
    }

    /// Returns the type table of this token, if it points into one.
    #[must_use]
    pub fn type_table(&self) -> Option<TypeTable> {
        TypeTable::from_repr(self.table())
    }

    /// Returns true if this is a null token (value 0)
    #[must_use]
    pub fn is_null(&self) -> bool {
        self.0 == 0
    }
}

impl From<u32> for Token {
    fn from(value: u32) -> Self {
        Token(value)
    }
}

impl From<Token> for u32 {
    fn from(token: Token) -> Self {
        token.0
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.type_table() {
            Some(table) => write!(f, "Token(0x{:08x}, {}, row: {})", self.0, table, self.row()),
            None => write!(
                f,
                "Token(0x{:08x}, table: 0x{:02x}, row: {})",
                self.0,
                self.table(),
                self.row()
            ),
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:08x}", self.0)
    }
}
