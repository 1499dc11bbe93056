//! Error display for the CLI.

use colored::Colorize;
use dpacct_event::CodecError;

/// Print an error in a user-friendly format.
pub fn print_error(err: &anyhow::Error) {
    eprintln!("{} {:#}", "Error:".red().bold(), err);

    if let Some(hint) = err.downcast_ref::<CodecError>().and_then(hint_for) {
        eprintln!("\n{}", hint.yellow());
    }
}

fn hint_for(err: &CodecError) -> Option<&'static str> {
    match err {
        CodecError::ResolutionFailure { .. } => {
            Some("Hint: Run `dpacct catalog` to list the known namespace and type tags.")
        }
        CodecError::DepthLimitExceeded { .. } => {
            Some("Hint: Raise the limit with --max-depth or DPACCT_MAX_DEPTH.")
        }
        CodecError::ReconstructionFailure { .. } => {
            Some("Hint: Run `dpacct catalog` to see each variant's fields.")
        }
        CodecError::NonFiniteFloat { .. } => {
            Some("Hint: JSON has no NaN or infinity; this event can only be converted in memory.")
        }
        _ => None,
    }
}
