//! JSON-lines event feed.
//!
//! Reads one `Event` per line from any async reader and forwards it to the
//! engine's ingress channel. Blank lines are ignored; malformed lines are
//! logged and skipped so one bad record does not stop the session.

use anyhow::{Context, Result};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::types::Event;

/// Forward every parseable event from `reader` to `sender`.
///
/// Returns the number of events forwarded. Stops early, without error, if
/// the engine side has gone away.
pub async fn pump_events<R>(reader: R, sender: mpsc::Sender<Event>) -> Result<u64>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = reader.lines();
    let mut line_no = 0u64;
    let mut forwarded = 0u64;

    while let Some(line) = lines
        .next_line()
        .await
        .context("Failed to read event feed")?
    {
        line_no += 1;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let event: Event = match serde_json::from_str(line) {
            Ok(event) => event,
            Err(e) => {
                warn!(line = line_no, error = %e, "Skipping malformed event");
                continue;
            }
        };

        if sender.send(event).await.is_err() {
            debug!(line = line_no, "Engine stopped, closing feed");
            break;
        }
        forwarded += 1;
    }

    Ok(forwarded)
}
