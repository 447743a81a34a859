use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Header of the column that keys the snapshot.
pub const TARIFF_NAME_COLUMN: &str = "Tariff Name";

/// The rate columns tracked for change detection. Header strings must match
/// the published sheet exactly, embedded newlines included.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum RateField {
    StandingCharge,
    FlatImport,
    OffPeakImport,
    OffPeakWindow,
    ShoulderImport,
    PeakImport,
    FlatExport,
    PeakExport,
}

impl RateField {
    /// Declared order fixes the per-tariff report order.
    pub const ALL: [RateField; 8] = [
        RateField::StandingCharge,
        RateField::FlatImport,
        RateField::OffPeakImport,
        RateField::OffPeakWindow,
        RateField::ShoulderImport,
        RateField::PeakImport,
        RateField::FlatExport,
        RateField::PeakExport,
    ];

    pub fn header(&self) -> &'static str {
        match self {
            Self::StandingCharge => "Standing Charge\n(p/day)",
            Self::FlatImport => "Flat Import\nRate (p/kWh)",
            Self::OffPeakImport => "Off-Peak Import\n(p/kWh)",
            Self::OffPeakWindow => "Off-Peak Window\n(e.g. 00:00–05:30)",
            Self::ShoulderImport => "Shoulder Import\n(p/kWh)",
            Self::PeakImport => "Peak Import\n(p/kWh)",
            Self::FlatExport => "Flat Export\nRate (p/kWh)",
            Self::PeakExport => "Peak Export\n(p/kWh)",
        }
    }

    /// Single-line form of the header for tables, logs and the email body.
    pub fn label(&self) -> String {
        self.header().replace('\n', " ")
    }

    pub fn as_slug(&self) -> &'static str {
        match self {
            Self::StandingCharge => "standing_charge",
            Self::FlatImport => "flat_import",
            Self::OffPeakImport => "off_peak_import",
            Self::OffPeakWindow => "off_peak_window",
            Self::ShoulderImport => "shoulder_import",
            Self::PeakImport => "peak_import",
            Self::FlatExport => "flat_export",
            Self::PeakExport => "peak_export",
        }
    }
}

impl Display for RateField {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

#[derive(Debug, Error)]
#[error("unknown rate field: {0}")]
pub struct RateFieldParseError(pub String);

impl FromStr for RateField {
    type Err = RateFieldParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
        match normalized.as_str() {
            "standing_charge" => Ok(Self::StandingCharge),
            "flat_import" => Ok(Self::FlatImport),
            "off_peak_import" => Ok(Self::OffPeakImport),
            "off_peak_window" => Ok(Self::OffPeakWindow),
            "shoulder_import" => Ok(Self::ShoulderImport),
            "peak_import" => Ok(Self::PeakImport),
            "flat_export" => Ok(Self::FlatExport),
            "peak_export" => Ok(Self::PeakExport),
            _ => Err(RateFieldParseError(s.to_string())),
        }
    }
}

/// One parsed CSV row: header string to cell value.
pub type SheetRow = BTreeMap<String, String>;

/// Rate values observed for a single tariff, keyed by the exact header
/// string so the persisted JSON mirrors the sheet.
pub type TariffRates = BTreeMap<String, String>;

/// All tariffs observed at one point in time. Serializes as a plain nested
/// JSON object, which is exactly the shape of the snapshot file on disk.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Snapshot(BTreeMap<String, TariffRates>);

impl Snapshot {
    pub fn insert(&mut self, tariff: String, rates: TariffRates) {
        self.0.insert(tariff, rates);
    }

    pub fn get(&self, tariff: &str) -> Option<&TariffRates> {
        self.0.get(tariff)
    }

    pub fn tariff_names(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &TariffRates)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_slugs_round_trip() {
        for field in RateField::ALL {
            let parsed = field.as_slug().parse::<RateField>().expect("parse slug");
            assert_eq!(parsed, field);
        }
        assert!("wibble".parse::<RateField>().is_err());
    }

    #[test]
    fn labels_are_single_line() {
        for field in RateField::ALL {
            assert!(field.header().contains('\n'));
            assert!(!field.label().contains('\n'));
        }
    }

    #[test]
    fn snapshot_serializes_as_plain_nested_object() {
        let mut rates = TariffRates::new();
        rates.insert(RateField::FlatImport.header().to_string(), "24.5".to_string());
        let mut snapshot = Snapshot::default();
        snapshot.insert("Eco Saver".to_string(), rates);

        let json = serde_json::to_value(&snapshot).expect("serialize");
        let value = json
            .get("Eco Saver")
            .and_then(|t| t.get(RateField::FlatImport.header()))
            .and_then(|v| v.as_str());
        assert_eq!(value, Some("24.5"));
    }
}
