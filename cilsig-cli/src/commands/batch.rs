use std::path::Path;

use anyhow::Context;
use cilsig::metadata::signatures::{parse_method_signatures_parallel_with, DecoderOptions};
use log::{debug, info};
use serde::Serialize;

use crate::{
    app::GlobalOptions,
    commands::common::{parse_hex, ErrorOutput},
    output::{emit, Listing},
};

#[derive(Debug, Serialize)]
struct BatchEntry {
    line: usize,
    rendered: Option<String>,
    error: Option<ErrorOutput>,
}

#[derive(Debug, Serialize)]
struct BatchOutput {
    decoded: usize,
    failed: usize,
    entries: Vec<BatchEntry>,
}

/// Read `(line number, blob)` pairs, skipping blank lines and `#` comments.
fn read_blobs(contents: &str) -> anyhow::Result<Vec<(usize, Vec<u8>)>> {
    contents
        .lines()
        .enumerate()
        .map(|(index, line)| (index + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty() && !line.starts_with('#'))
        .map(|(number, line)| {
            parse_hex(&[line])
                .with_context(|| format!("line {number}"))
                .map(|blob| (number, blob))
        })
        .collect()
}

pub fn run(path: &Path, options: DecoderOptions, opts: &GlobalOptions) -> anyhow::Result<()> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;

    let blobs = read_blobs(&contents)?;
    debug!("Read {} blob(s) from {}", blobs.len(), path.display());

    let slices: Vec<&[u8]> = blobs.iter().map(|(_, blob)| blob.as_slice()).collect();
    let results = parse_method_signatures_parallel_with(&slices, options);

    let entries: Vec<BatchEntry> = blobs
        .iter()
        .zip(&results)
        .map(|((line, _), result)| match result {
            Ok(method) => BatchEntry {
                line: *line,
                rendered: Some(method.to_string()),
                error: None,
            },
            Err(error) => BatchEntry {
                line: *line,
                rendered: None,
                error: Some(ErrorOutput::from(error)),
            },
        })
        .collect();

    let failed = entries.iter().filter(|entry| entry.error.is_some()).count();
    let output = BatchOutput {
        decoded: entries.len() - failed,
        failed,
        entries,
    };

    emit(&output, opts, |out| {
        let mut listing = Listing::new(&["Line", "Signature"]).align_right(0);
        for entry in &out.entries {
            let text = match (&entry.rendered, &entry.error) {
                (Some(rendered), _) => rendered.clone(),
                (None, Some(error)) => format!("error: {}", error.message),
                (None, None) => String::new(),
            };
            listing.row(vec![entry.line.to_string(), text]);
        }
        listing.render()
    })?;

    info!("{} decoded, {} failed", output.decoded, output.failed);
    Ok(())
}
