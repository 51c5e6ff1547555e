//! Parallel decoding of many independent signature blobs.

use log::{debug, trace};
use rayon::prelude::*;

use crate::{
    metadata::signatures::{DecoderOptions, MethodSignature, SignatureParser},
    Result,
};

/// Decode a batch of method signatures in parallel with default [`DecoderOptions`].
///
/// Results are returned in input order. Each blob is decoded independently, so one
/// malformed blob only fails its own slot.
///
/// # Examples
///
/// ```rust
/// use cilsig::metadata::signatures::parse_method_signatures_parallel;
///
/// let blobs: [&[u8]; 3] = [&[0x00, 0x00, 0x01], &[0x00, 0x01], &[0x20, 0x01, 0x01, 0x0E]];
/// let results = parse_method_signatures_parallel(&blobs);
///
/// assert!(results[0].is_ok());
/// assert!(results[1].is_err());
/// assert!(results[2].as_ref().is_ok_and(|method| method.has_this));
/// ```
#[must_use]
pub fn parse_method_signatures_parallel(blobs: &[&[u8]]) -> Vec<Result<MethodSignature>> {
    parse_method_signatures_parallel_with(blobs, DecoderOptions::default())
}

/// Same as [`parse_method_signatures_parallel`], with explicit options for every blob.
#[must_use]
pub fn parse_method_signatures_parallel_with(
    blobs: &[&[u8]],
    options: DecoderOptions,
) -> Vec<Result<MethodSignature>> {
    debug!("Decoding {} method signature(s)", blobs.len());

    let results: Vec<Result<MethodSignature>> = blobs
        .par_iter()
        .enumerate()
        .map(|(index, blob)| {
            let result = SignatureParser::with_options(blob, options).parse_method_signature();
            if let Err(error) = &result {
                trace!("Method signature #{index} failed: {error}");
            }
            result
        })
        .collect();

    debug!(
        "Decoded method signatures - {} failed",
        results.iter().filter(|result| result.is_err()).count()
    );

    results
}
