//! CLI commands.

mod catalog;
mod decode;
mod encode;
mod roundtrip;

use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use dpacct_event::Codec;

use crate::config::{Config, Overrides};

/// dpacct - convert privacy events to and from transfer records.
#[derive(Debug, Parser)]
#[command(name = "dpacct")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Deepest record nesting accepted on decode.
    #[arg(long, global = true)]
    max_depth: Option<usize>,

    /// Reject integers supplied for float fields.
    #[arg(long, global = true)]
    strict_numbers: bool,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Convert a JSON event into transfer-record JSON.
    Encode(encode::EncodeCommand),

    /// Convert transfer-record JSON back into a JSON event.
    Decode(decode::DecodeCommand),

    /// Check that transfer-record JSON survives decode and re-encode.
    Roundtrip(roundtrip::RoundtripCommand),

    /// List the registered event variants.
    Catalog(catalog::CatalogCommand),
}

/// Shared state handed to every command.
pub struct CommandContext {
    pub codec: Codec,
}

impl Cli {
    pub fn overrides(&self) -> Overrides {
        Overrides {
            max_depth: self.max_depth,
            strict_numbers: self.strict_numbers,
            log_level: self.log_level.clone(),
        }
    }

    /// Run the CLI command.
    pub fn run(self, config: &Config) -> Result<()> {
        let ctx = CommandContext {
            codec: Codec::with_config(config.codec_config()),
        };

        match self.command {
            Commands::Encode(cmd) => cmd.run(&ctx),
            Commands::Decode(cmd) => cmd.run(&ctx),
            Commands::Roundtrip(cmd) => cmd.run(&ctx),
            Commands::Catalog(cmd) => cmd.run(&ctx),
        }
    }
}

/// Reads the whole input from `file`, or from stdin when absent or `-`.
fn read_input(file: Option<&Path>) -> Result<String> {
    match file {
        Some(path) if path != Path::new("-") => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display())),
        _ => {
            let mut input = String::new();
            std::io::stdin()
                .read_to_string(&mut input)
                .context("failed to read stdin")?;
            Ok(input)
        }
    }
}

/// Positional input argument shared by the conversion commands.
#[derive(Debug, clap::Args)]
struct InputArgs {
    /// Input file; reads stdin when omitted or `-`.
    file: Option<PathBuf>,
}

impl InputArgs {
    fn read(&self) -> Result<String> {
        read_input(self.file.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_global_flags_become_overrides() {
        let cli = Cli::parse_from(["dpacct", "decode", "--max-depth", "4", "--strict-numbers", "in.json"]);
        let overrides = cli.overrides();
        assert_eq!(overrides.max_depth, Some(4));
        assert!(overrides.strict_numbers);
        assert_eq!(overrides.log_level, None);
    }

    #[test]
    fn test_read_input_from_file() {
        let path = std::env::temp_dir().join(format!("dpacct-input-{}.json", std::process::id()));
        std::fs::write(&path, r#"{"no_op":{}}"#).unwrap();
        let input = read_input(Some(&path)).unwrap();
        std::fs::remove_file(&path).unwrap();
        assert_eq!(input, r#"{"no_op":{}}"#);
    }

    #[test]
    fn test_read_input_missing_file() {
        let err = read_input(Some(Path::new("/nonexistent/dpacct.json"))).unwrap_err();
        assert!(err.to_string().contains("failed to read /nonexistent/dpacct.json"));
    }
}
