use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, Color, ContentArrangement, Row, Table};

use crate::sheet::schema::Snapshot;
use crate::snapshot::differ::{ChangeKind, RateChange};

pub fn render_changes_table(changes: &[RateChange]) -> String {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Tariff", "Field", "Old value", "New value"]);

    for change in changes {
        let old_cell = match change.kind {
            ChangeKind::RateChanged => Cell::new(change.old_display()).fg(Color::Red),
            _ => Cell::new(change.old_display()),
        };
        let new_cell = match change.kind {
            ChangeKind::TariffRemoved => Cell::new(change.new_display()).fg(Color::Red),
            _ => Cell::new(change.new_display()).fg(Color::Green),
        };
        table.add_row(Row::from(vec![
            Cell::new(&change.tariff),
            Cell::new(change.field_label()),
            old_cell,
            new_cell,
        ]));
    }
    table.to_string()
}

pub fn render_snapshot_table(snapshot: &Snapshot) -> String {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Tariff", "Field", "Value"]);

    for (tariff, rates) in snapshot.iter() {
        for (header, value) in rates {
            table.add_row(Row::from(vec![
                Cell::new(tariff),
                Cell::new(header.replace('\n', " ")),
                Cell::new(value),
            ]));
        }
    }
    table.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sheet::schema::{RateField, TariffRates};
    use crate::snapshot::differ::find_changes;

    #[test]
    fn changes_table_flattens_multiline_field_labels() {
        let mut rates = TariffRates::new();
        rates.insert(RateField::FlatImport.header().to_string(), "10".to_string());
        let mut old = Snapshot::default();
        old.insert("TariffA".to_string(), rates.clone());

        rates.insert(RateField::FlatImport.header().to_string(), "12".to_string());
        let mut new = Snapshot::default();
        new.insert("TariffA".to_string(), rates);

        let rendered = render_changes_table(&find_changes(&old, &new));
        assert!(rendered.contains("TariffA"));
        assert!(rendered.contains("Flat Import Rate (p/kWh)"));
    }

    #[test]
    fn snapshot_table_lists_every_stored_value() {
        let mut rates = TariffRates::new();
        rates.insert(RateField::StandingCharge.header().to_string(), "45.2".to_string());
        rates.insert(RateField::PeakExport.header().to_string(), "15.0".to_string());
        let mut snapshot = Snapshot::default();
        snapshot.insert("Eco Saver".to_string(), rates);

        let rendered = render_snapshot_table(&snapshot);
        assert!(rendered.contains("45.2"));
        assert!(rendered.contains("15.0"));
    }
}
