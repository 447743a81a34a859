use std::fmt::Write as _;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::snapshot::differ::RateChange;

/// A batch of detected changes, stamped at build time, renderable as plain
/// text for the console or as the HTML email body.
#[derive(Debug, Clone, Serialize)]
pub struct ChangeReport {
    pub generated_at: DateTime<Utc>,
    pub changes: Vec<RateChange>,
}

impl ChangeReport {
    pub fn new(changes: Vec<RateChange>) -> Self {
        Self {
            generated_at: Utc::now(),
            changes,
        }
    }

    pub fn subject(&self) -> String {
        format!(
            "⚡ Tariff rate change detected — {} update(s)",
            self.changes.len()
        )
    }

    /// One line per change, indented for readability under a heading.
    pub fn render_text(&self) -> String {
        let mut out = String::new();
        for change in &self.changes {
            out.push_str("  ");
            out.push_str(&change.summary_line());
            out.push('\n');
        }
        out
    }

    /// Styled HTML summary: branded header with the UTC timestamp, change
    /// count lead-in, and a table with old values in red and new in green.
    pub fn render_html(&self) -> String {
        let stamp = self.generated_at.format("%d %b %Y %H:%M UTC");
        let count = self.changes.len();

        let mut rows = String::new();
        for (i, change) in self.changes.iter().enumerate() {
            let background = if i % 2 == 0 { "#fff9c4" } else { "#ffffff" };
            let _ = write!(
                rows,
                r#"<tr style="background:{background}">
  <td style="padding:8px;border:1px solid #ddd">{tariff}</td>
  <td style="padding:8px;border:1px solid #ddd">{field}</td>
  <td style="padding:8px;border:1px solid #ddd;color:#c0392b">{old}</td>
  <td style="padding:8px;border:1px solid #ddd;color:#27ae60">{new}</td>
</tr>"#,
                tariff = escape_html(&change.tariff),
                field = escape_html(&change.field_label()),
                old = escape_html(change.old_display()),
                new = escape_html(change.new_display()),
            );
        }

        format!(
            r#"<div style="font-family:Arial,sans-serif;max-width:700px;margin:0 auto">
  <div style="background:#1b4332;color:white;padding:20px;border-radius:8px 8px 0 0">
    <h2 style="margin:0">🌿 Green Tariff Marketplace — Rate Change Alert</h2>
    <p style="margin:6px 0 0;opacity:0.8">{stamp}</p>
  </div>
  <div style="background:#f7f9f7;padding:20px;border-radius:0 0 8px 8px;border:1px solid #e0ede6">
    <p>The tariff check detected <strong>{count} change(s)</strong> in the tariff
       rate spreadsheet. Please review and update the published rates if needed.</p>
    <table style="width:100%;border-collapse:collapse;margin-top:16px">
      <thead>
        <tr style="background:#2d6a4f;color:white">
          <th style="padding:10px;text-align:left">Tariff</th>
          <th style="padding:10px;text-align:left">Field</th>
          <th style="padding:10px;text-align:left">Old value</th>
          <th style="padding:10px;text-align:left">New value</th>
        </tr>
      </thead>
      <tbody>{rows}</tbody>
    </table>
    <p style="margin-top:20px;font-size:0.85em;color:#888">
      This alert was sent automatically by tariff-watch.<br>
      View the spreadsheet to confirm changes and update the changelog.
    </p>
  </div>
</div>"#
        )
    }
}

fn escape_html(raw: &str) -> String {
    raw.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sheet::schema::{RateField, Snapshot, TariffRates};
    use crate::snapshot::differ::find_changes;

    fn one_change_report() -> ChangeReport {
        let mut rates = TariffRates::new();
        rates.insert(RateField::FlatImport.header().to_string(), "10".to_string());
        let mut old = Snapshot::default();
        old.insert("TariffA".to_string(), rates.clone());

        rates.insert(RateField::FlatImport.header().to_string(), "12".to_string());
        let mut new = Snapshot::default();
        new.insert("TariffA".to_string(), rates);

        ChangeReport::new(find_changes(&old, &new))
    }

    #[test]
    fn subject_carries_the_change_count() {
        let report = one_change_report();
        assert!(report.subject().contains("1 update(s)"));
    }

    #[test]
    fn text_rendering_lists_old_and_new_values() {
        let report = one_change_report();
        let text = report.render_text();
        assert!(text.contains("TariffA"));
        assert!(text.contains("10"));
        assert!(text.contains("12"));
        // Field labels in report output never contain the header newline.
        assert!(text.contains("Flat Import Rate (p/kWh)"));
    }

    #[test]
    fn html_rendering_colors_old_and_new_values() {
        let report = one_change_report();
        let html = report.render_html();
        assert!(html.contains(r#"color:#c0392b">10<"#));
        assert!(html.contains(r#"color:#27ae60">12<"#));
        assert!(html.contains("1 change(s)"));
    }

    #[test]
    fn html_rendering_escapes_markup_in_cell_values() {
        let mut report = one_change_report();
        report.changes[0].tariff = "A<b>&Co".to_string();
        let html = report.render_html();
        assert!(html.contains("A&lt;b&gt;&amp;Co"));
        assert!(!html.contains("A<b>&Co"));
    }
}
