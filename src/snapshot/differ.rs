use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use similar::{ChangeTag, TextDiff};

use crate::sheet::schema::{RateField, Snapshot};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    TariffAdded,
    TariffRemoved,
    RateChanged,
}

impl ChangeKind {
    pub fn as_slug(&self) -> &'static str {
        match self {
            Self::TariffAdded => "tariff_added",
            Self::TariffRemoved => "tariff_removed",
            Self::RateChanged => "rate_changed",
        }
    }
}

/// One detected difference between two snapshots. An added or removed
/// tariff is a single sentinel record with no field; a moved rate carries
/// the field and both values.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RateChange {
    pub tariff: String,
    pub kind: ChangeKind,
    pub field: Option<RateField>,
    pub old_value: Option<String>,
    pub new_value: Option<String>,
}

impl RateChange {
    fn added(tariff: &str) -> Self {
        Self {
            tariff: tariff.to_string(),
            kind: ChangeKind::TariffAdded,
            field: None,
            old_value: None,
            new_value: None,
        }
    }

    fn removed(tariff: &str) -> Self {
        Self {
            tariff: tariff.to_string(),
            kind: ChangeKind::TariffRemoved,
            field: None,
            old_value: None,
            new_value: None,
        }
    }

    fn rate_changed(tariff: &str, field: RateField, old_value: &str, new_value: &str) -> Self {
        Self {
            tariff: tariff.to_string(),
            kind: ChangeKind::RateChanged,
            field: Some(field),
            old_value: Some(old_value.to_string()),
            new_value: Some(new_value.to_string()),
        }
    }

    pub fn field_label(&self) -> String {
        self.field
            .map(|field| field.label())
            .unwrap_or_else(|| "—".to_string())
    }

    pub fn old_display(&self) -> &str {
        match self.kind {
            ChangeKind::TariffAdded => "—",
            ChangeKind::TariffRemoved => "present",
            ChangeKind::RateChanged => self.old_value.as_deref().unwrap_or(""),
        }
    }

    pub fn new_display(&self) -> &str {
        match self.kind {
            ChangeKind::TariffAdded => "added",
            ChangeKind::TariffRemoved => "removed",
            ChangeKind::RateChanged => self.new_value.as_deref().unwrap_or(""),
        }
    }

    /// One-line form for console delivery and logs.
    pub fn summary_line(&self) -> String {
        match self.kind {
            ChangeKind::TariffAdded => format!("{}: tariff added", self.tariff),
            ChangeKind::TariffRemoved => format!("{}: tariff removed", self.tariff),
            ChangeKind::RateChanged => format!(
                "{} | {}: {} → {}",
                self.tariff,
                self.field_label(),
                self.old_display(),
                self.new_display()
            ),
        }
    }
}

/// Compare two snapshots. Tariffs are walked in lexicographic order; within
/// a tariff present in both, fields are compared in declared order with a
/// missing value treated as the empty string.
pub fn find_changes(old: &Snapshot, new: &Snapshot) -> Vec<RateChange> {
    let mut tariffs: BTreeSet<&str> = BTreeSet::new();
    tariffs.extend(old.tariff_names());
    tariffs.extend(new.tariff_names());

    let mut changes = Vec::new();
    for tariff in tariffs {
        match (old.get(tariff), new.get(tariff)) {
            (None, Some(_)) => changes.push(RateChange::added(tariff)),
            (Some(_), None) => changes.push(RateChange::removed(tariff)),
            (Some(old_rates), Some(new_rates)) => {
                for field in RateField::ALL {
                    let old_value = old_rates
                        .get(field.header())
                        .map(String::as_str)
                        .unwrap_or("");
                    let new_value = new_rates
                        .get(field.header())
                        .map(String::as_str)
                        .unwrap_or("");
                    if old_value != new_value {
                        changes.push(RateChange::rate_changed(tariff, field, old_value, new_value));
                    }
                }
            }
            (None, None) => {}
        }
    }

    changes
}

/// Line diff of the two snapshots' pretty JSON renderings, for `diff --raw`.
pub fn textual_diff(old: &Snapshot, new: &Snapshot) -> String {
    let old_str = serde_json::to_string_pretty(old).unwrap_or_default();
    let new_str = serde_json::to_string_pretty(new).unwrap_or_default();
    let diff = TextDiff::from_lines(&old_str, &new_str);
    let mut out = String::new();
    for change in diff.iter_all_changes() {
        let symbol = match change.tag() {
            ChangeTag::Delete => "-",
            ChangeTag::Insert => "+",
            ChangeTag::Equal => " ",
        };
        out.push_str(symbol);
        out.push_str(change.value());
    }
    out
}
