use std::io::Write;

use super::domain::WaitlistEntry;

/// Write the audit log as CSV with a camelCase header row.
pub fn write_csv<W: Write>(entries: &[WaitlistEntry], writer: W) -> Result<(), csv::Error> {
    let mut csv_writer = csv::WriterBuilder::new()
        .has_headers(true)
        .from_writer(writer);

    for entry in entries {
        csv_writer.serialize(entry)?;
    }

    csv_writer.flush()?;
    Ok(())
}

/// One JSON object per line, matching the shape stored in the log.
pub fn write_json_lines<W: Write>(
    entries: &[WaitlistEntry],
    mut writer: W,
) -> Result<(), std::io::Error> {
    for entry in entries {
        serde_json::to_writer(&mut writer, entry)?;
        writer.write_all(b"\n")?;
    }
    writer.flush()
}
