//! `dpacct roundtrip`: check that a transfer record survives conversion.

use anyhow::{ensure, Context, Result};
use clap::Args;
use dpacct_event::{Codec, DpEvent, TransferRecord};
use tracing::debug;

use crate::output::print_ok;

use super::{CommandContext, InputArgs};

#[derive(Debug, Args)]
pub struct RoundtripCommand {
    #[command(flatten)]
    input: InputArgs,
}

impl RoundtripCommand {
    pub fn run(self, ctx: &CommandContext) -> Result<()> {
        let input = self.input.read()?;
        let event = check_round_trip(&ctx.codec, &input)?;
        print_ok(&format!("{} (depth {})", event.type_tag(), event.depth()));
        Ok(())
    }
}

/// Decodes the record, re-encodes it through memory and through JSON, and
/// requires every decoded copy to be equal.
pub fn check_round_trip(codec: &Codec, input: &str) -> Result<DpEvent> {
    let record = TransferRecord::from_json(input).context("input is not a transfer record")?;
    let event = codec.decode(&record)?;

    let encoded = codec.encode(&event)?;
    let again = codec.decode(&encoded)?;
    ensure!(again == event, "{} changed after re-encoding", event.type_tag());

    let reparsed = TransferRecord::from_json(&encoded.to_json()?)?;
    ensure!(
        codec.decode(&reparsed)? == event,
        "{} changed after passing through JSON",
        event.type_tag()
    );

    debug!(type_tag = event.type_tag(), depth = event.depth(), "round trip ok");
    Ok(event)
}
