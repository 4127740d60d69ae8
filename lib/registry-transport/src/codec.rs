//! One JSON object per line

use registry_api::Record;

/// Encode a record as a single line, terminator included
pub fn encode_record(record: &Record) -> serde_json::Result<Vec<u8>> {
    let mut line = serde_json::to_vec(record)?;
    line.push(b'\n');
    Ok(line)
}

/// Decode one line (terminator optional)
pub fn decode_record(line: &str) -> serde_json::Result<Record> {
    serde_json::from_str(line.trim_end())
}
