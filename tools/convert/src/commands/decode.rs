//! `dpacct decode`: transfer-record JSON to JSON event.

use anyhow::{Context, Result};
use clap::Args;
use dpacct_event::{Codec, TransferRecord};

use super::{CommandContext, InputArgs};

#[derive(Debug, Args)]
pub struct DecodeCommand {
    #[command(flatten)]
    input: InputArgs,

    /// Print the event on a single line.
    #[arg(long)]
    compact: bool,
}

impl DecodeCommand {
    pub fn run(self, ctx: &CommandContext) -> Result<()> {
        let input = self.input.read()?;
        println!("{}", decode_json(&ctx.codec, &input, !self.compact)?);
        Ok(())
    }
}

/// Parses transfer-record JSON and renders the decoded event as serde JSON.
pub fn decode_json(codec: &Codec, input: &str, pretty: bool) -> Result<String> {
    let record = TransferRecord::from_json(input).context("input is not a transfer record")?;
    let event = codec
        .decode(&record)
        .with_context(|| format!("failed to decode {}", record.type_tag()))?;

    let json = if pretty {
        serde_json::to_string_pretty(&event)?
    } else {
        serde_json::to_string(&event)?
    };
    Ok(json)
}

#[cfg(test)]
mod tests {
    use dpacct_event::{CodecConfig, CodecError, DpEvent};

    use super::*;

    #[test]
    fn test_decode_poisson_sampled() {
        let input = r#"{
            "namespace": "dp_accounting.dp_event",
            "type_tag": "PoissonSampledDpEvent",
            "sampling_probability": 0.25,
            "event": {"namespace": "dp_accounting.dp_event", "type_tag": "GaussianDpEvent", "noise_multiplier": 1}
        }"#;
        let json = decode_json(&Codec::default(), input, false).unwrap();
        assert_eq!(
            json,
            r#"{"poisson_sampled":{"sampling_probability":0.25,"event":{"gaussian":{"noise_multiplier":1.0}}}}"#
        );
    }

    #[test]
    fn test_decode_respects_strict_numbers() {
        let input = r#"{"namespace":"dp_accounting.dp_event","type_tag":"LaplaceDpEvent","noise_multiplier":2}"#;
        let strict = Codec::with_config(CodecConfig::default().with_strict_numbers(true));
        let err = decode_json(&strict, input, false).unwrap_err();
        assert!(err.downcast_ref::<CodecError>().unwrap().is_reconstruction_failure());
        assert!(format!("{:#}", err).contains("expected float, found int"));
    }

    #[test]
    fn test_decode_respects_depth_limit() {
        let event = DpEvent::self_composed(DpEvent::self_composed(DpEvent::no_op(), 2), 2);
        let input = event.to_transfer().unwrap().to_json().unwrap();
        let shallow = Codec::with_config(CodecConfig::default().with_max_depth(2));
        let err = decode_json(&shallow, &input, false).unwrap_err();
        assert_eq!(
            err.downcast_ref::<CodecError>(),
            Some(&CodecError::DepthLimitExceeded { limit: 2 })
        );
    }

    #[test]
    fn test_decode_names_the_record() {
        let input = r#"{"namespace":"dp_accounting.dp_event","type_tag":"GaussianDpEvent"}"#;
        let err = decode_json(&Codec::default(), input, false).unwrap_err();
        assert_eq!(err.to_string(), "failed to decode GaussianDpEvent");
    }
}
