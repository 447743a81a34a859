use anyhow::Result;

use crate::snapshot::differ::RateChange;

pub fn changes_to_csv(changes: &[RateChange]) -> Result<String> {
    let mut writer = csv::Writer::from_writer(vec![]);
    writer.write_record(["tariff", "field", "change", "old_value", "new_value"])?;
    for change in changes {
        writer.write_record([
            change.tariff.clone(),
            change
                .field
                .map(|field| field.as_slug().to_string())
                .unwrap_or_default(),
            change.kind.as_slug().to_string(),
            change.old_value.clone().unwrap_or_default(),
            change.new_value.clone().unwrap_or_default(),
        ])?;
    }
    let data = writer.into_inner()?;
    Ok(String::from_utf8_lossy(&data).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sheet::schema::{RateField, Snapshot, TariffRates};
    use crate::snapshot::differ::find_changes;

    #[test]
    fn renders_one_row_per_change_plus_header() {
        let mut rates = TariffRates::new();
        rates.insert(RateField::FlatImport.header().to_string(), "10".to_string());
        let mut old = Snapshot::default();
        old.insert("TariffA".to_string(), rates.clone());

        rates.insert(RateField::FlatImport.header().to_string(), "12".to_string());
        let mut new = Snapshot::default();
        new.insert("TariffA".to_string(), rates);
        new.insert("TariffB".to_string(), TariffRates::new());

        let rendered = changes_to_csv(&find_changes(&old, &new)).expect("csv");
        let lines: Vec<&str> = rendered.trim_end().lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "tariff,field,change,old_value,new_value");
        assert!(lines[1].starts_with("TariffA,flat_import,rate_changed,10,12"));
        assert!(lines[2].starts_with("TariffB,,tariff_added"));
    }
}
