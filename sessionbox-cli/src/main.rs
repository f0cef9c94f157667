//! Sessionbox CLI — scan bar files for session boxes and their mitigation state.
//!
//! Commands:
//! - `scan` — build ranges and print the capped display set (table or JSON)
//! - `ranges` — print or export every computed range as CSV
//! - `check-config` — parse and validate a TOML config file
//! - `default-config` — print the default TOML config

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::filter::{EnvFilter, LevelFilter};

use sessionbox_core::data::{load_latest, load_store, CsvProvider};
use sessionbox_core::engine::{BoxTone, DisplayBox, RangeSummary};
use sessionbox_core::{build, compose_display, BarStore, EngineConfig, RangeState, SessionRange};

#[derive(Parser)]
#[command(
    name = "sessionbox",
    about = "Sessionbox CLI — session range boxes with breakout and mitigation tracking"
)]
struct Cli {
    /// Log at debug level (overridden by RUST_LOG).
    #[arg(long, short, global = true, default_value_t = false)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build session ranges and print the display set.
    Scan {
        /// CSV file with `time,open,high,low,close` rows.
        #[arg(long)]
        bars: PathBuf,

        /// TOML config file. Defaults to the built-in Morning/Afternoon sessions.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Chart right edge (RFC 3339). Defaults to the last bar's time.
        #[arg(long)]
        now: Option<String>,

        /// Print JSON instead of a table.
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Print every computed range, ignoring display caps.
    Ranges {
        /// CSV file with `time,open,high,low,close` rows.
        #[arg(long)]
        bars: PathBuf,

        /// TOML config file.
        #[arg(long)]
        config: Option<PathBuf>,

        /// History anchor (RFC 3339). Defaults to the last bar's time.
        #[arg(long)]
        now: Option<String>,

        /// Write CSV here instead of stdout.
        #[arg(long)]
        csv: Option<PathBuf>,
    },
    /// Parse and validate a TOML config file.
    CheckConfig {
        path: PathBuf,
    },
    /// Print the default configuration as TOML.
    DefaultConfig,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Scan {
            bars,
            config,
            now,
            json,
        } => run_scan(&bars, config.as_deref(), now.as_deref(), json),
        Commands::Ranges {
            bars,
            config,
            now,
            csv,
        } => run_ranges(&bars, config.as_deref(), now.as_deref(), csv.as_deref()),
        Commands::CheckConfig { path } => run_check_config(&path),
        Commands::DefaultConfig => {
            print!("{}", EngineConfig::default().to_toml()?);
            Ok(())
        }
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::INFO
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(default.into())
                .from_env_lossy(),
        )
        .init();
}

fn load_config(path: Option<&Path>) -> Result<EngineConfig> {
    match path {
        Some(p) => EngineConfig::from_file(p)
            .with_context(|| format!("loading config {}", p.display())),
        None => Ok(EngineConfig::default()),
    }
}

fn parse_now(now: Option<&str>) -> Result<Option<DateTime<Utc>>> {
    now.map(|s| {
        DateTime::parse_from_rfc3339(s)
            .map(|dt| dt.with_timezone(&Utc))
            .with_context(|| format!("--now must be RFC 3339, got '{s}'"))
    })
    .transpose()
}

/// Read the CSV and cut the lookback window.
///
/// With `now` the window ends there; otherwise it ends at the last bar so a
/// historical file keeps its history. Returns the store and the right edge.
fn load_bars(
    path: &Path,
    config: &EngineConfig,
    now: Option<DateTime<Utc>>,
) -> Result<(BarStore, DateTime<Utc>)> {
    let provider = CsvProvider::new(path);
    let zone = config.zone()?;
    let loaded = match now {
        Some(now) => load_store(&provider, config.lookback_days, now, zone)
            .map(|store| Some((store, now))),
        None => load_latest(&provider, config.lookback_days, zone),
    }
    .with_context(|| format!("reading bars from {}", path.display()))?;

    Ok(loaded.unwrap_or_else(|| {
        info!(path = %path.display(), "no bars in file");
        (BarStore::empty(zone), Utc::now())
    }))
}

fn run_scan(bars: &Path, config: Option<&Path>, now: Option<&str>, json: bool) -> Result<()> {
    let config = load_config(config)?;
    let (store, right_edge) = load_bars(bars, &config, parse_now(now)?)?;
    let ranges = build(&store, &config.sessions, &config.build_options());
    let boxes = compose_display(&ranges, &config, right_edge);

    if json {
        println!("{}", serde_json::to_string_pretty(&boxes)?);
    } else {
        print_summary(&store, &ranges, &boxes, right_edge);
    }
    Ok(())
}

fn run_ranges(
    bars: &Path,
    config: Option<&Path>,
    now: Option<&str>,
    out: Option<&Path>,
) -> Result<()> {
    let config = load_config(config)?;
    let (store, _) = load_bars(bars, &config, parse_now(now)?)?;
    let ranges = build(&store, &config.sessions, &config.build_options());

    let csv = export_ranges_csv(&ranges)?;
    match out {
        Some(path) => {
            std::fs::write(path, csv)
                .with_context(|| format!("writing {}", path.display()))?;
            println!("Wrote {} ranges to {}", ranges.len(), path.display());
        }
        None => print!("{csv}"),
    }
    Ok(())
}

fn run_check_config(path: &Path) -> Result<()> {
    let config = EngineConfig::from_file(path)
        .with_context(|| format!("invalid config {}", path.display()))?;
    println!("OK: {}", path.display());
    println!("Timezone:       {}", config.timezone);
    println!("Lookback:       {} days", config.lookback_days);
    println!(
        "Caps:           {} unmitigated / {} mitigated",
        config.max_unmitigated, config.max_mitigated
    );
    for s in &config.sessions {
        println!(
            "Session:        {:<12} {}-{} {:>4} min {}",
            s.key,
            s.start.format("%H:%M"),
            s.end.format("%H:%M"),
            s.duration_minutes(),
            if s.enabled { "" } else { "(disabled)" }
        );
    }
    Ok(())
}

fn state_name(state: &RangeState) -> &'static str {
    match state {
        RangeState::Open => "open",
        RangeState::Broken { .. } => "broken",
        RangeState::Mitigated { .. } => "mitigated",
    }
}

fn tone_name(tone: BoxTone) -> &'static str {
    match tone {
        BoxTone::Bullish => "bull",
        BoxTone::Bearish => "bear",
        BoxTone::Neutral => "-",
    }
}

/// Columns: date, key, high, low, start_utc, end_utc, bars, state, direction,
/// break_utc, mitigation_utc
fn export_ranges_csv(ranges: &[SessionRange]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record([
        "date",
        "key",
        "high",
        "low",
        "start_utc",
        "end_utc",
        "bars",
        "state",
        "direction",
        "break_utc",
        "mitigation_utc",
    ])?;

    let stamp = |t: Option<DateTime<Utc>>| t.map(|t| t.to_rfc3339()).unwrap_or_default();
    for r in ranges {
        wtr.write_record([
            &r.date.to_string(),
            &r.key,
            &format!("{:.6}", r.high),
            &format!("{:.6}", r.low),
            &r.start_utc.to_rfc3339(),
            &r.end_utc.to_rfc3339(),
            &r.bar_count.to_string(),
            state_name(&r.state),
            &r.direction().map(|d| format!("{d:?}")).unwrap_or_default(),
            &stamp(r.break_utc()),
            &stamp(r.mitigation_utc()),
        ])?;
    }

    let bytes = wtr.into_inner().context("flushing CSV writer")?;
    Ok(String::from_utf8(bytes)?)
}

fn print_summary(
    store: &BarStore,
    ranges: &[SessionRange],
    boxes: &[DisplayBox],
    right_edge: DateTime<Utc>,
) {
    let summary = RangeSummary::of(ranges);
    let report = store.report();
    println!();
    println!("=== Session Boxes ===");
    println!("Right edge:     {}", right_edge.to_rfc3339());
    println!(
        "Bars:           {} in window ({} supplied, {} invalid, {} duplicate, {} loose open/close)",
        store.len(),
        report.supplied,
        report.invalid,
        report.duplicates,
        report.out_of_envelope
    );
    println!(
        "Ranges:         {} ({} open, {} broken, {} mitigated)",
        summary.total, summary.open, summary.broken, summary.mitigated
    );
    println!("Displayed:      {}", boxes.len());
    println!();
    println!(
        "{:<11} {:<6} {:>12} {:>12} {:<5} {:<25} {:<25}",
        "date", "label", "high", "low", "tone", "start", "end"
    );
    for b in boxes {
        println!(
            "{:<11} {:<6} {:>12.2} {:>12.2} {:<5} {:<25} {:<25}{}",
            b.date,
            b.label,
            b.high,
            b.low,
            tone_name(b.tone),
            b.start_utc.to_rfc3339(),
            b.end_utc.to_rfc3339(),
            if b.mitigated { "  mitigated" } else { "" }
        );
        if !b.retracements.is_empty() {
            let levels: Vec<String> = b
                .retracements
                .iter()
                .map(|l| format!("{:.0}%={:.2}", l.pct * 100.0, l.price))
                .collect();
            println!("{:<11} retracements: {}", "", levels.join("  "));
        }
    }
}
