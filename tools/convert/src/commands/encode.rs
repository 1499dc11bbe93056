//! `dpacct encode`: JSON event to transfer-record JSON.

use anyhow::{Context, Result};
use clap::Args;
use dpacct_event::{Codec, DpEvent};
use tracing::debug;

use super::{CommandContext, InputArgs};

#[derive(Debug, Args)]
pub struct EncodeCommand {
    #[command(flatten)]
    input: InputArgs,

    /// Print the record on a single line.
    #[arg(long)]
    compact: bool,
}

impl EncodeCommand {
    pub fn run(self, ctx: &CommandContext) -> Result<()> {
        let input = self.input.read()?;
        println!("{}", encode_json(&ctx.codec, &input, !self.compact)?);
        Ok(())
    }
}

/// Parses a serde-JSON event and renders its transfer record as JSON.
pub fn encode_json(codec: &Codec, input: &str, pretty: bool) -> Result<String> {
    let event: DpEvent = serde_json::from_str(input).context("input is not a valid event")?;
    debug!(type_tag = event.type_tag(), depth = event.depth(), "encoding event");

    let record = codec.encode(&event)?;
    let json = if pretty {
        record.to_json_pretty()?
    } else {
        record.to_json()?
    };
    Ok(json)
}
