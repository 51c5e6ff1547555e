use anyhow::bail;
use cilsig::{
    metadata::signatures::{DecoderOptions, SignatureParser, TypeNode, UnresolvedTokens},
    Result,
};
use log::debug;
use serde::Serialize;

use crate::{
    app::{GlobalOptions, SignatureKind},
    commands::common::{parse_hex, ErrorOutput},
    output::{emit, Listing},
};

/// One type position of a decoded signature.
#[derive(Debug, Serialize)]
struct EntryOutput {
    role: String,
    rendered: String,
    name: String,
}

#[derive(Debug, Serialize)]
struct DecodeOutput {
    kind: &'static str,
    size: usize,
    rendered: Option<String>,
    entries: Vec<EntryOutput>,
    error: Option<ErrorOutput>,
}

fn entry(role: impl Into<String>, node: &TypeNode) -> EntryOutput {
    EntryOutput {
        role: role.into(),
        rendered: node.to_string(),
        name: node.type_name(&UnresolvedTokens),
    }
}

/// Decode `data` with the grammar of `kind`, returning the rendered signature and
/// one entry per top-level type position.
fn decode(
    kind: SignatureKind,
    data: &[u8],
    options: DecoderOptions,
) -> Result<(String, Vec<EntryOutput>)> {
    let mut parser = SignatureParser::with_options(data, options);

    let decoded = match kind {
        SignatureKind::Method => {
            let method = parser.parse_method_signature()?;
            let mut entries = vec![entry("return", &method.return_type)];
            entries.extend(
                method
                    .fixed_params()
                    .iter()
                    .enumerate()
                    .map(|(i, param)| entry(format!("param {i}"), param)),
            );
            entries.extend(
                method
                    .vararg_params()
                    .iter()
                    .enumerate()
                    .map(|(i, param)| entry(format!("vararg {i}"), param)),
            );
            (method.to_string(), entries)
        }
        SignatureKind::Field => {
            let field = parser.parse_field_signature()?;
            (field.to_string(), vec![entry("field", &field.field_type)])
        }
        SignatureKind::Property => {
            let property = parser.parse_property_signature()?;
            let mut entries = vec![entry("property", &property.property_type)];
            entries.extend(
                property
                    .params
                    .iter()
                    .enumerate()
                    .map(|(i, param)| entry(format!("param {i}"), param)),
            );
            (property.to_string(), entries)
        }
        SignatureKind::Locals => {
            let locals = parser.parse_local_var_signature()?;
            let entries = locals
                .locals
                .iter()
                .enumerate()
                .map(|(i, local)| entry(format!("local {i}"), local))
                .collect();
            (locals.to_string(), entries)
        }
        SignatureKind::Typespec => {
            let spec = parser.parse_type_spec_signature()?;
            (spec.to_string(), vec![entry("type", &spec.base)])
        }
        SignatureKind::Methodspec => {
            let spec = parser.parse_method_spec_signature()?;
            let entries = spec
                .generic_args
                .iter()
                .enumerate()
                .map(|(i, arg)| entry(format!("arg {i}"), arg))
                .collect();
            (spec.to_string(), entries)
        }
    };

    if parser.pos() < data.len() {
        debug!("{} trailing byte(s) ignored", data.len() - parser.pos());
    }
    Ok(decoded)
}

pub fn run(
    kind: SignatureKind,
    hex: &[String],
    options: DecoderOptions,
    opts: &GlobalOptions,
) -> anyhow::Result<()> {
    let data = parse_hex(hex)?;
    debug!(
        "Decoding {} byte(s) as {} signature (max depth {}, strict {})",
        data.len(),
        kind.name(),
        options.max_depth,
        options.reject_trailing_data
    );

    let output = match decode(kind, &data, options) {
        Ok((rendered, entries)) => DecodeOutput {
            kind: kind.name(),
            size: data.len(),
            rendered: Some(rendered),
            entries,
            error: None,
        },
        Err(error) => DecodeOutput {
            kind: kind.name(),
            size: data.len(),
            rendered: None,
            entries: Vec::new(),
            error: Some(ErrorOutput::from(&error)),
        },
    };

    if output.rendered.is_some() || opts.json {
        emit(&output, opts, |out| {
            let mut listing = Listing::new(&["Position", "Type", "Name"]);
            for entry in &out.entries {
                listing.row(vec![
                    entry.role.clone(),
                    entry.rendered.clone(),
                    entry.name.clone(),
                ]);
            }
            format!(
                "{}\n\n{}",
                out.rendered.as_deref().unwrap_or_default(),
                listing.render()
            )
        })?;
    }

    if let Some(error) = output.error {
        bail!("{}", error.message);
    }
    Ok(())
}
