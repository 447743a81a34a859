use anyhow::{Context, Result};

use crate::sheet::schema::{RateField, SheetRow, Snapshot, TariffRates, TARIFF_NAME_COLUMN};

/// Parse raw CSV text into row maps, using the first record as the header.
/// Ragged rows are tolerated: a row shorter than the header simply omits the
/// trailing columns rather than filling them with empty strings.
pub fn parse_rows(csv_text: &str) -> Result<Vec<SheetRow>> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(csv_text.as_bytes());
    let headers = reader
        .headers()
        .context("failed reading CSV header row")?
        .clone();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.context("failed reading CSV record")?;
        let row: SheetRow = headers
            .iter()
            .zip(record.iter())
            .map(|(header, cell)| (header.to_string(), cell.to_string()))
            .collect();
        rows.push(row);
    }
    Ok(rows)
}

/// Build a tariff-keyed snapshot from parsed rows. Rows without a tariff
/// name are dropped; rate columns absent from a row are omitted rather than
/// stored as empty strings. Values stay opaque strings.
pub fn build_snapshot(rows: &[SheetRow]) -> Snapshot {
    let mut snapshot = Snapshot::default();
    for row in rows {
        let name = row
            .get(TARIFF_NAME_COLUMN)
            .map(|cell| cell.trim())
            .unwrap_or("");
        if name.is_empty() {
            continue;
        }
        let mut rates = TariffRates::new();
        for field in RateField::ALL {
            if let Some(value) = row.get(field.header()) {
                rates.insert(field.header().to_string(), value.trim().to_string());
            }
        }
        snapshot.insert(name.to_string(), rates);
    }
    snapshot
}
