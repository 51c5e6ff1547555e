use anyhow::{bail, Context};
use cilsig::{metadata::signatures::DecoderOptions, Error};
use serde::Serialize;

use crate::app::DecodeLimits;

/// A decoding failure in a form suitable for JSON output.
#[derive(Debug, Serialize)]
pub struct ErrorOutput {
    pub kind: String,
    pub offset: usize,
    pub message: String,
}

impl From<&Error> for ErrorOutput {
    fn from(error: &Error) -> Self {
        ErrorOutput {
            kind: error.kind().to_string(),
            offset: error.offset(),
            message: error.to_string(),
        }
    }
}

impl DecodeLimits {
    pub fn options(&self) -> DecoderOptions {
        DecoderOptions {
            max_depth: self.max_depth,
            reject_trailing_data: self.strict,
        }
    }
}

/// Parse hex bytes from one or more arguments.
///
/// Whitespace and commas separate bytes, and an optional `0x` / `0X` prefix is
/// stripped from each group. A group without separators may hold several bytes
/// (`2001010E`).
pub fn parse_hex<S: AsRef<str>>(inputs: &[S]) -> anyhow::Result<Vec<u8>> {
    let mut bytes = Vec::new();

    for group in inputs
        .iter()
        .flat_map(|input| input.as_ref().split(|c: char| c.is_whitespace() || c == ','))
        .filter(|group| !group.is_empty())
    {
        let digits = group
            .strip_prefix("0x")
            .or_else(|| group.strip_prefix("0X"))
            .unwrap_or(group);

        if digits.is_empty() || digits.len() % 2 != 0 {
            bail!("invalid hex byte group '{group}' (expected an even number of digits)");
        }

        for pair in digits.as_bytes().chunks(2) {
            let pair = std::str::from_utf8(pair).with_context(|| format!("invalid hex: {group}"))?;
            let byte =
                u8::from_str_radix(pair, 16).with_context(|| format!("invalid hex: {group}"))?;
            bytes.push(byte);
        }
    }

    Ok(bytes)
}
