pub mod fetcher;
pub mod parser;
pub mod schema;

pub use fetcher::fetch_sheet_text;
pub use parser::{build_snapshot, parse_rows};
pub use schema::{RateField, SheetRow, Snapshot, TariffRates, TARIFF_NAME_COLUMN};
