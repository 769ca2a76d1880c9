//! Line forwarding: each non-blank input line becomes one log record.
//!
//! Forwarding stops at end of input or when the cancellation token fires.
//! The token also travels in the [`EmitContext`] handed to the sink, so
//! records emitted after cancellation are dropped by the OTel sink.

use anyhow::{Context, Result};
use otelemetry::{EmitContext, KeyValue, Log, LogSink, Severity};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Forward `input` line by line until EOF or cancellation.
///
/// Returns the number of records emitted.
///
/// # Errors
///
/// Returns an error if reading from `input` fails.
pub async fn run<R, S>(
    input: R,
    log: &Log<S>,
    severity: Severity,
    cancel: CancellationToken,
) -> Result<u64>
where
    R: AsyncBufRead + Unpin,
    S: LogSink,
{
    let ctx = EmitContext::current().with_cancellation(cancel.clone());
    let mut lines = input.lines();
    let mut line_no: i64 = 0;
    let mut emitted = 0;

    loop {
        let line = tokio::select! {
            _ = cancel.cancelled() => {
                debug!(emitted, "forwarding cancelled");
                break;
            }
            line = lines.next_line() => line.context("failed to read input line")?,
        };
        let Some(line) = line else {
            debug!(emitted, "end of input");
            break;
        };
        line_no += 1;
        if line.trim().is_empty() {
            continue;
        }
        log.emit(&ctx, severity, line, [KeyValue::new("pipe.line", line_no)]);
        emitted += 1;
    }

    Ok(emitted)
}
