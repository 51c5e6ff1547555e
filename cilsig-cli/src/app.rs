use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// cilsig - decode ECMA-335 (.NET) signature blobs
#[derive(Debug, Parser)]
#[command(name = "cilsig", version, about, long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOptions,

    #[command(subcommand)]
    pub command: Command,
}

/// Options shared across all subcommands.
#[derive(Debug, Parser)]
pub struct GlobalOptions {
    /// Emit output as JSON instead of human-readable text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Enable verbose (debug-level) logging output.
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// Decoder limits.
#[derive(Debug, Args)]
pub struct DecodeLimits {
    /// Maximum type nesting depth.
    #[arg(long, value_name = "N", default_value_t = 100)]
    pub max_depth: usize,

    /// Reject bytes left over after the signature.
    #[arg(long)]
    pub strict: bool,
}

/// Which signature grammar to decode a blob with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SignatureKind {
    /// MethodDefSig, MethodRefSig, StandAloneMethodSig
    Method,
    /// FieldSig
    Field,
    /// PropertySig
    Property,
    /// LocalVarSig
    Locals,
    /// TypeSpec blob
    Typespec,
    /// MethodSpec blob
    Methodspec,
}

impl SignatureKind {
    pub fn name(self) -> &'static str {
        match self {
            SignatureKind::Method => "method",
            SignatureKind::Field => "field",
            SignatureKind::Property => "property",
            SignatureKind::Locals => "locals",
            SignatureKind::Typespec => "typespec",
            SignatureKind::Methodspec => "methodspec",
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Decode one signature blob given as hex bytes.
    Decode {
        /// Signature grammar to apply.
        #[arg(short, long, value_enum, default_value = "method")]
        kind: SignatureKind,

        #[command(flatten)]
        limits: DecodeLimits,

        /// Blob bytes in hex, e.g. `20 01 01 0E` or `0x20,0x01,0x01,0x0E`.
        #[arg(value_name = "HEX", required = true, num_args = 1..)]
        hex: Vec<String>,
    },

    /// Decode a file of method signatures, one hex blob per line, in parallel.
    Batch {
        /// Text file with one hex-encoded method signature per line.
        #[arg(value_name = "FILE")]
        path: PathBuf,

        #[command(flatten)]
        limits: DecodeLimits,
    },
}
