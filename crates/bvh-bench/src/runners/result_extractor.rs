use csv::{ByteRecord, ReaderBuilder};
use std::path::Path;
use tracing::{debug, warn};

/// Return the last field of the last non-empty row of a delimited result file.
///
/// A row is non-empty when it has at least one field, even if every field is
/// blank. `None` covers a missing or unreadable file as well as a file with no
/// such row; callers treat it as a per-run miss, not an error.
pub fn extract_last_value(path: &Path) -> Option<String> {
    let mut reader = match ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)
    {
        Ok(reader) => reader,
        Err(e) => {
            debug!(path = %path.display(), error = %e, "result file not readable");
            return None;
        }
    };

    let mut last_row: Option<ByteRecord> = None;
    for (line, record) in reader.byte_records().enumerate() {
        match record {
            Ok(record) if !record.is_empty() => last_row = Some(record),
            Ok(_) => {}
            Err(e) => {
                // An I/O failure ends the stream; a malformed row is skipped.
                if matches!(e.kind(), csv::ErrorKind::Io(_)) {
                    warn!(path = %path.display(), error = %e, "stopped reading result file");
                    break;
                }
                debug!(
                    path = %path.display(),
                    row = line + 1,
                    error = %e,
                    "skipping malformed row"
                );
            }
        }
    }

    let row = last_row?;
    row.iter()
        .last()
        .map(|field| String::from_utf8_lossy(field).trim().to_string())
}
