//! Tagwire CLI
//!
//! Encodes and decodes records against JSON schema files, and checks
//! compatibility between schema revisions.

use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use tagwire::{
    check_compatibility, decode, encode_with, from_json, to_json, EncodeOptions, Fingerprint,
    MessageSchema,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "tagwire")]
#[command(about = "Encode, decode and check tagged-field wire buffers")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Encode a JSON record to a wire buffer
    Encode {
        /// Path to the schema file (JSON)
        schema: PathBuf,
        /// JSON record to encode (stdin if omitted)
        #[arg(short, long)]
        input: Option<PathBuf>,
        /// Where to write the encoded buffer
        #[arg(short, long)]
        output: PathBuf,
        /// Drop zero-valued scalars, empty strings and empty lists
        #[arg(long)]
        omit_defaults: bool,
    },

    /// Decode a wire buffer to a JSON record
    Decode {
        /// Path to the schema file (JSON)
        schema: PathBuf,
        /// Encoded buffer to decode
        input: PathBuf,
        /// Where to write the JSON record (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Check compatibility between two schema revisions
    Check {
        /// Older schema file
        old: PathBuf,
        /// Newer schema file
        new: PathBuf,
        /// Strict mode - warnings fail too
        #[arg(long)]
        strict: bool,
    },

    /// Print the fingerprint of a schema file
    Fingerprint {
        /// Path to the schema file (JSON)
        schema: PathBuf,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Encode {
            schema,
            input,
            output,
            omit_defaults,
        } => {
            let schema = load_schema(&schema)?;
            let json: serde_json::Value = match input {
                Some(path) => {
                    let content = fs::read_to_string(&path)
                        .with_context(|| format!("failed to read record {}", path.display()))?;
                    serde_json::from_str(&content)?
                }
                None => {
                    let mut content = String::new();
                    std::io::stdin().read_to_string(&mut content)?;
                    serde_json::from_str(&content)?
                }
            };

            let record = from_json(&json, &schema)?;
            let options = EncodeOptions { omit_defaults };
            let bytes = encode_with(&record, &schema, options)?;

            fs::write(&output, &bytes)
                .with_context(|| format!("failed to write {}", output.display()))?;
            println!(
                "✅ Encoded {} field(s) into {} byte(s) -> {}",
                record.len(),
                bytes.len(),
                output.display()
            );
            Ok(())
        }

        Commands::Decode {
            schema,
            input,
            output,
        } => {
            let schema = load_schema(&schema)?;
            let bytes = fs::read(&input)
                .with_context(|| format!("failed to read buffer {}", input.display()))?;

            let record = decode(&bytes, &schema)?;
            let json = to_json(&record, &schema)?;
            let rendered = serde_json::to_string_pretty(&json)?;

            match output {
                Some(path) => {
                    fs::write(&path, rendered)
                        .with_context(|| format!("failed to write {}", path.display()))?;
                }
                None => println!("{}", rendered),
            }
            Ok(())
        }

        Commands::Check { old, new, strict } => {
            let old_schema = load_schema(&old)?;
            let new_schema = load_schema(&new)?;

            println!(
                "🔍 Checking compatibility: {} -> {}",
                old.display(),
                new.display()
            );

            let report = check_compatibility(&old_schema, &new_schema)?;

            for issue in &report.issues {
                println!("❌ BREAKING: {:?}", issue);
            }
            for warning in &report.warnings {
                println!("⚠️  {}", warning);
            }

            if !report.is_compatible() || (strict && !report.warnings.is_empty()) {
                println!("❌ Schemas are NOT compatible");
                std::process::exit(1);
            }

            println!("✅ Schemas are compatible");
            Ok(())
        }

        Commands::Fingerprint { schema } => {
            let schema = load_schema(&schema)?;
            println!("{}", Fingerprint::of_schema(&schema)?);
            Ok(())
        }
    }
}

fn load_schema(path: &Path) -> anyhow::Result<MessageSchema> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("failed to read schema {}", path.display()))?;
    let schema = serde_json::from_str(&content)
        .with_context(|| format!("invalid schema in {}", path.display()))?;
    Ok(schema)
}
