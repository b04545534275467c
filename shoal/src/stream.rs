//! Foreground record consumption

use crate::client::RecordStream;
use crate::error::Result;
use crate::types::{Record, Value};
use futures::StreamExt;
use std::io::Write;
use tracing::debug;

/// Render one record as `<key>: <bins>`
pub fn format_record(record: &Record) -> String {
    format!(
        "{}: {}",
        record.key.display_key(),
        Value::Object(record.bins.clone())
    )
}

/// Print every record of the stream in delivery order.
///
/// Returns the number of records printed once the stream ends. The first
/// error stops consumption and is returned as-is; lines already written stay
/// written and the stream is not polled again.
pub async fn consume_records<W: Write>(mut stream: RecordStream<'_>, out: &mut W) -> Result<u64> {
    let mut printed = 0u64;
    while let Some(item) = stream.next().await {
        let record = item?;
        writeln!(out, "{}", format_record(&record))?;
        printed += 1;
    }
    out.flush()?;
    debug!(records = printed, "Record stream ended");
    Ok(printed)
}
