use super::OutputResult;
use crate::filings::CompensationTable;
use std::fs;
use std::path::Path;

/// Writes a compensation table as CSV: one header row, then one row per entry
pub fn write_compensation_csv(table: &CompensationTable, path: &Path) -> OutputResult<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(&table.columns)?;
    for row in &table.rows {
        writer.write_record(row)?;
    }
    writer.flush()?;

    Ok(())
}
