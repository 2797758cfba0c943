//! Validate, decode and encode in one call
//!
//! [`convert`] is the single entry point of the engine. It stops at the first
//! failing stage and never returns partial output.

use std::panic::{self, AssertUnwindSafe};
use std::time::Instant;

use serde::Serialize;
use tracing::debug;

use crate::{Encoding, Error, ErrorKind, Result, decode, encode, validation};

/// A single conversion call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConversionRequest<'a> {
    /// Input written in the source representation
    pub raw_input: &'a str,
    /// Representation of `raw_input`
    pub source: Encoding,
    /// Representation to render into
    pub target: Encoding,
}

impl<'a> ConversionRequest<'a> {
    /// Create a request
    pub fn new(raw_input: &'a str, source: Encoding, target: Encoding) -> Self {
        Self {
            raw_input,
            source,
            target,
        }
    }

    /// Run the request through the pipeline
    pub fn convert(&self) -> ConversionOutcome {
        convert(self.raw_input, self.source, self.target)
    }
}

/// Result of a conversion call
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ConversionOutcome {
    /// Every stage succeeded
    Success {
        /// Rendered text in the target representation
        output: String,
        /// Input length in characters
        input_length: usize,
        /// Output length in characters
        output_length: usize,
        /// Wall time spent in the pipeline
        elapsed_micros: u64,
    },
    /// A stage failed; no output is produced
    Failure {
        /// Category of the failure
        kind: ErrorKind,
        /// Human readable detail
        message: String,
    },
}

impl ConversionOutcome {
    /// Build a failure outcome from an error
    pub fn failure(error: &Error) -> Self {
        ConversionOutcome::Failure {
            kind: error.kind(),
            message: error.to_string(),
        }
    }

    /// Check if the conversion succeeded
    pub fn is_success(&self) -> bool {
        matches!(self, ConversionOutcome::Success { .. })
    }

    /// Get the output of a successful conversion
    pub fn output(&self) -> Option<&str> {
        match self {
            ConversionOutcome::Success { output, .. } => Some(output),
            ConversionOutcome::Failure { .. } => None,
        }
    }

    /// Get the error kind of a failed conversion
    pub fn error_kind(&self) -> Option<ErrorKind> {
        match self {
            ConversionOutcome::Success { .. } => None,
            ConversionOutcome::Failure { kind, .. } => Some(*kind),
        }
    }
}

/// Convert `raw_input` from `source` to `target`
///
/// Identical arguments always produce an identical outcome, apart from
/// `elapsed_micros`.
///
/// A panic inside decoding or encoding is caught and reported as
/// [`ErrorKind::UnknownConversionFailure`]. The process-wide panic hook still
/// runs first, so the default hook prints the panic message to stderr; callers
/// that need silence must install their own hook with
/// [`std::panic::set_hook`].
pub fn convert(raw_input: &str, source: Encoding, target: Encoding) -> ConversionOutcome {
    let start_time = Instant::now();
    debug!(%source, %target, bytes = raw_input.len(), "converting");

    match run_stages(raw_input, source, target) {
        Ok(output) => {
            let elapsed = start_time.elapsed();
            let input_length = raw_input.chars().count();
            let output_length = output.chars().count();

            debug!(input_length, output_length, ?elapsed, "conversion completed");

            ConversionOutcome::Success {
                output,
                input_length,
                output_length,
                elapsed_micros: u64::try_from(elapsed.as_micros()).unwrap_or(u64::MAX),
            }
        }
        Err(error) => {
            debug!(kind = %error.kind(), %error, "conversion failed");
            ConversionOutcome::failure(&error)
        }
    }
}

fn run_stages(raw_input: &str, source: Encoding, target: Encoding) -> Result<String> {
    validation::validate(raw_input, source).into_result()?;

    // Malformed input must never take the caller down with it
    panic::catch_unwind(AssertUnwindSafe(|| {
        let scalars = decode::decode(raw_input, source)?;
        debug!(scalars = scalars.len(), "decoded input");
        encode::encode(&scalars, target)
    }))
    .unwrap_or_else(|payload| Err(Error::Internal(panic_message(payload.as_ref()))))
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown internal error".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_metrics() {
        let outcome = convert("Hello", Encoding::Utf8, Encoding::Hex);
        match outcome {
            ConversionOutcome::Success {
                output,
                input_length,
                output_length,
                ..
            } => {
                assert_eq!(output, "48 65 6c 6c 6f");
                assert_eq!(input_length, 5);
                assert_eq!(output_length, 14);
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[test]
    fn test_lengths_count_chars() {
        let outcome = convert("日本", Encoding::Utf8, Encoding::Utf8);
        assert!(matches!(
            outcome,
            ConversionOutcome::Success {
                input_length: 2,
                output_length: 2,
                ..
            }
        ));
    }

    #[test]
    fn test_failure_stops_pipeline() {
        let outcome = convert("zz", Encoding::Hex, Encoding::Utf8);
        assert_eq!(outcome.error_kind(), Some(ErrorKind::MalformedHex));
        assert_eq!(outcome.output(), None);
        assert!(!outcome.is_success());
    }

    #[test]
    fn test_decode_failure() {
        let outcome = convert("d83d", Encoding::Hex, Encoding::Utf8);
        assert_eq!(outcome.error_kind(), Some(ErrorKind::InvalidCodeUnit));
        if let ConversionOutcome::Failure { message, .. } = outcome {
            assert!(message.contains("0xD83D"));
        }
    }

    #[test]
    fn test_request() {
        let request = ConversionRequest::new("\\u0041", Encoding::UnicodeEscape, Encoding::Utf8);
        assert_eq!(request.convert().output(), Some("A"));
    }

    #[test]
    fn test_panic_message() {
        let payload: Box<dyn std::any::Any + Send> = Box::new("boom");
        assert_eq!(panic_message(payload.as_ref()), "boom");

        let payload: Box<dyn std::any::Any + Send> = Box::new(String::from("bang"));
        assert_eq!(panic_message(payload.as_ref()), "bang");

        let payload: Box<dyn std::any::Any + Send> = Box::new(7u8);
        assert_eq!(panic_message(payload.as_ref()), "unknown internal error");
    }

    #[test]
    fn test_outcome_json() {
        let outcome = convert("   ", Encoding::Utf8, Encoding::Hex);
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["status"], "failure");
        assert_eq!(json["kind"], "EmptyInput");
        assert_eq!(json["message"], "Input is empty");

        let outcome = convert("A", Encoding::Utf8, Encoding::Binary);
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["status"], "success");
        assert_eq!(json["output"], "01000001");
        assert_eq!(json["input_length"], 1);
    }
}
