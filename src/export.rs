use anyhow::{Context, Result};
use serde::{Serialize, de::DeserializeOwned};
use std::path::Path;

/// Write `rows` as a CSV table with a header line.
pub fn write_rows<T: Serialize, P: AsRef<Path>>(rows: &[T], file: P) -> Result<()> {
    let file = file.as_ref();
    let mut writer =
        csv::Writer::from_path(file).with_context(|| format!("failed to create {file:?}"))?;

    for row in rows {
        writer.serialize(row).context("failed to serialize row")?;
    }

    writer.flush().context("failed to flush writer stream")?;

    Ok(())
}

/// Read back a CSV table written by [`write_rows`].
pub fn read_rows<T: DeserializeOwned, P: AsRef<Path>>(file: P) -> Result<Vec<T>> {
    let file = file.as_ref();
    let mut reader =
        csv::Reader::from_path(file).with_context(|| format!("failed to open {file:?}"))?;

    reader
        .deserialize::<T>()
        .enumerate()
        .map(|(i_row, row)| row.with_context(|| format!("failed to deserialize row {i_row}")))
        .collect()
}
