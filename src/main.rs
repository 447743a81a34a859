use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use tariff_watch::alert::{ChangeReport, NotificationChannel};
use tariff_watch::config::{Config, ConfigOverrides};
use tariff_watch::output::csv::changes_to_csv;
use tariff_watch::output::json::render_json;
use tariff_watch::output::table::{render_changes_table, render_snapshot_table};
use tariff_watch::sheet::schema::RateField;
use tariff_watch::sheet::{build_snapshot, fetch_sheet_text, parse_rows};
use tariff_watch::snapshot::differ::{find_changes, textual_diff, RateChange};
use tariff_watch::snapshot::store::SnapshotStore;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
    Csv,
}

#[derive(Debug, Parser)]
#[command(
    name = "tariff-watch",
    about = "Tariff rate sheet change detection and alerting"
)]
struct Cli {
    /// Sheet CSV URL (overrides TARIFF_SHEET_CSV_URL)
    #[arg(short, long)]
    url: Option<String>,
    /// Snapshot file path (overrides TARIFF_SNAPSHOT_PATH)
    #[arg(short, long)]
    snapshot_path: Option<PathBuf>,
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
    output: OutputFormat,
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Fetch the sheet, alert on changes, persist the new snapshot
    Check,
    /// Fetch the sheet and show pending changes without alerting or persisting
    Diff {
        /// Show a raw line diff of the two snapshots instead of change records
        #[arg(long)]
        raw: bool,
        /// Only show changes to one rate field (snake_case slug)
        #[arg(long)]
        field: Option<RateField>,
    },
    /// Show the stored snapshot
    Show,
    /// Show the resolved configuration (mail secret redacted)
    Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();
    let cli = Cli::parse();

    let mut config = Config::from_env();
    config.apply_overrides(ConfigOverrides {
        sheet_url: cli.url.clone(),
        snapshot_path: cli.snapshot_path.clone(),
    });

    match cli.command.unwrap_or(Commands::Check) {
        Commands::Check => run_check(&config).await,
        Commands::Diff { raw, field } => run_diff(&config, raw, field, cli.output).await,
        Commands::Show => run_show(&config, cli.output),
        Commands::Config => {
            println!("{}", render_json(&config.redacted())?);
            Ok(())
        }
    }
}

/// The pipeline: fetch, diff against the stored snapshot, alert, persist.
/// Delivery must complete before the save; a failed alert leaves the stored
/// snapshot stale and the same diff recomputes on the next run.
async fn run_check(config: &Config) -> Result<()> {
    let url = config.sheet.require_url()?;

    info!("fetching tariff sheet");
    let text = fetch_sheet_text(url).await?;
    let rows = parse_rows(&text)?;
    let new_snapshot = build_snapshot(&rows);
    info!("{} tariff(s) in fetched sheet", new_snapshot.len());

    let store = SnapshotStore::new(config.storage.snapshot_path.clone());
    let old_snapshot = store.load()?;

    if old_snapshot.is_empty() {
        store.save(&new_snapshot)?;
        info!("first run, snapshot saved; no changes to report");
        return Ok(());
    }

    let changes = find_changes(&old_snapshot, &new_snapshot);
    if changes.is_empty() {
        info!("no rate changes detected");
        return Ok(());
    }

    warn!("{} change(s) detected, sending alert", changes.len());
    let report = ChangeReport::new(changes);
    let channel = NotificationChannel::from_config(&config.mailer)?;
    channel.deliver(&report).await?;
    store.save(&new_snapshot)?;
    info!("snapshot updated");
    Ok(())
}

async fn run_diff(
    config: &Config,
    raw: bool,
    field: Option<RateField>,
    format: OutputFormat,
) -> Result<()> {
    let url = config.sheet.require_url()?;
    let text = fetch_sheet_text(url).await?;
    let new_snapshot = build_snapshot(&parse_rows(&text)?);

    let store = SnapshotStore::new(config.storage.snapshot_path.clone());
    let old_snapshot = store.load()?;

    if raw {
        print!("{}", textual_diff(&old_snapshot, &new_snapshot));
        return Ok(());
    }

    let mut changes = find_changes(&old_snapshot, &new_snapshot);
    if let Some(field) = field {
        changes.retain(|change| change.field == Some(field));
    }
    if changes.is_empty() {
        info!("no rate changes detected");
        return Ok(());
    }
    print_changes(&changes, format)
}

fn run_show(config: &Config, format: OutputFormat) -> Result<()> {
    let store = SnapshotStore::new(config.storage.snapshot_path.clone());
    let snapshot = store.load()?;
    if snapshot.is_empty() {
        info!("no stored snapshot at {}", store.path().display());
        return Ok(());
    }
    match format {
        OutputFormat::Table => println!("{}", render_snapshot_table(&snapshot)),
        OutputFormat::Json => println!("{}", render_json(&snapshot)?),
        OutputFormat::Csv => {
            warn!("CSV output for show not implemented, using JSON");
            println!("{}", render_json(&snapshot)?);
        }
    }
    Ok(())
}

fn print_changes(changes: &[RateChange], format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Table => println!("{}", render_changes_table(changes)),
        OutputFormat::Json => println!("{}", render_json(&ChangeReport::new(changes.to_vec()))?),
        OutputFormat::Csv => println!("{}", changes_to_csv(changes)?),
    }
    Ok(())
}
