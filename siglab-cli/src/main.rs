//! siglab CLI — fetch, run, and cache management commands.
//!
//! Commands:
//! - `fetch` — download KuCoin klines into the local candle cache
//! - `run` — execute a scan from a TOML config file or named preset
//! - `cache status` — report cached symbols, ranges, and sizes
//! - `cache clean` — remove symbols not refreshed recently

use anyhow::{bail, Result};
use chrono::{DateTime, Duration, NaiveDate, NaiveTime, TimeZone, Utc};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

use siglab_core::data::{
    fetch_symbols, read_candles_csv, CandleCache, CandleProvider, DataError, KuCoinProvider,
    StdoutProgress, SyntheticProvider,
};
use siglab_core::domain::Candle;
use siglab_runner::{run_scan_on_candles, save_artifacts, BacktestConfig, ScanReport};

#[derive(Parser)]
#[command(name = "siglab", about = "siglab CLI — combo-signal scalp scan engine")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Download KuCoin klines and cache them locally.
    Fetch {
        /// Symbols to fetch (e.g., BTC/USDT ETH/USDT).
        #[arg(required = true)]
        symbols: Vec<String>,

        /// Start date (YYYY-MM-DD). Defaults to 30 days ago.
        #[arg(long)]
        start: Option<String>,

        /// End date (YYYY-MM-DD). Defaults to today.
        #[arg(long)]
        end: Option<String>,

        /// Candle interval: 1min, 5min, 15min, 1hour, 1day.
        #[arg(long, default_value = "1min")]
        interval: String,

        /// Force re-download even if cached.
        #[arg(long, default_value_t = false)]
        force: bool,

        /// Cache directory. Defaults to ./data.
        #[arg(long, default_value = "data")]
        cache_dir: PathBuf,
    },
    /// Execute a scan from a TOML config file or named preset.
    Run {
        /// Path to a TOML config file.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Named preset: combo_scalp, baseline.
        #[arg(long)]
        preset: Option<String>,

        /// Symbol (used with --preset).
        #[arg(long)]
        symbol: Option<String>,

        /// CSV file with raw candles; bypasses the cache.
        #[arg(long)]
        data: Option<PathBuf>,

        /// Start date (YYYY-MM-DD, used with --preset).
        #[arg(long)]
        start: Option<String>,

        /// End date (YYYY-MM-DD, used with --preset).
        #[arg(long)]
        end: Option<String>,

        /// Offline mode: no network access.
        #[arg(long, default_value_t = false)]
        offline: bool,

        /// Scan deterministic synthetic data instead of real candles.
        #[arg(long, default_value_t = false)]
        synthetic: bool,

        /// Cache directory. Defaults to ./data.
        #[arg(long, default_value = "data")]
        cache_dir: PathBuf,

        /// Output directory for run artifacts.
        #[arg(long, default_value = "results")]
        output_dir: PathBuf,
    },
    /// Cache management commands.
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },
}

#[derive(Subcommand)]
enum CacheAction {
    /// Report cached symbols, date ranges, and sizes.
    Status {
        /// Cache directory. Defaults to ./data.
        #[arg(long, default_value = "data")]
        cache_dir: PathBuf,
    },
    /// Remove cached symbols not refreshed within the given number of days.
    Clean {
        /// Remove symbols not refreshed in this many days.
        #[arg(long)]
        unused_days: u64,

        /// Cache directory. Defaults to ./data.
        #[arg(long, default_value = "data")]
        cache_dir: PathBuf,

        /// Actually delete (without this flag, only previews what would be removed).
        #[arg(long, default_value_t = false)]
        confirm: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Fetch {
            symbols,
            start,
            end,
            interval,
            force,
            cache_dir,
        } => run_fetch(symbols, start, end, interval, force, cache_dir),
        Commands::Run {
            config,
            preset,
            symbol,
            data,
            start,
            end,
            offline,
            synthetic,
            cache_dir,
            output_dir,
        } => run_scan_cmd(
            config, preset, symbol, data, start, end, offline, synthetic, cache_dir, output_dir,
        ),
        Commands::Cache { action } => match action {
            CacheAction::Status { cache_dir } => run_cache_status(&cache_dir),
            CacheAction::Clean {
                unused_days,
                cache_dir,
                confirm,
            } => run_cache_clean(&cache_dir, unused_days, confirm),
        },
    }
}

fn run_fetch(
    symbols: Vec<String>,
    start: Option<String>,
    end: Option<String>,
    interval: String,
    force: bool,
    cache_dir: PathBuf,
) -> Result<()> {
    let (start_ts, end_ts) = range_bounds(
        start.as_deref().map(parse_date).transpose()?,
        end.as_deref().map(parse_date).transpose()?,
    );

    let provider = KuCoinProvider::new().with_interval(&interval)?;
    let cache = CandleCache::new(cache_dir);
    let progress = StdoutProgress;

    let summary = fetch_symbols(
        &provider, &cache, &symbols, start_ts, end_ts, &interval, force, &progress,
    );

    if !summary.all_succeeded() {
        for (sym, err) in &summary.errors {
            eprintln!("Error for {sym}: {err}");
        }
        std::process::exit(1);
    }

    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn run_scan_cmd(
    config_path: Option<PathBuf>,
    preset_name: Option<String>,
    symbol: Option<String>,
    data: Option<PathBuf>,
    start: Option<String>,
    end: Option<String>,
    offline: bool,
    synthetic: bool,
    cache_dir: PathBuf,
    output_dir: PathBuf,
) -> Result<()> {
    if config_path.is_some() && preset_name.is_some() {
        bail!("--config and --preset are mutually exclusive");
    }
    if config_path.is_none() && preset_name.is_none() {
        bail!("one of --config or --preset is required");
    }

    let mut config = if let Some(path) = config_path {
        BacktestConfig::from_file(&path)?
    } else {
        let preset_name = preset_name.unwrap();
        let sym = symbol.as_deref().unwrap_or("BTC/USDT");
        BacktestConfig::preset(
            &preset_name,
            sym,
            start.as_deref().map(parse_date).transpose()?,
            end.as_deref().map(parse_date).transpose()?,
        )?
    };
    if let Some(path) = data {
        config.data.source = Some(path);
    }

    let candles = load_candles(&config, &cache_dir, offline, synthetic)?;
    let report = run_scan_on_candles(&config, &candles)?;

    print_summary(&report, synthetic);

    let paths = save_artifacts(&output_dir, &report)?;
    println!("Artifacts saved to: {}", paths.run_dir.display());

    Ok(())
}

/// Resolve the candle source for a run: synthetic, CSV file, or cache
/// (fetching on a miss unless offline).
fn load_candles(
    config: &BacktestConfig,
    cache_dir: &Path,
    offline: bool,
    synthetic: bool,
) -> Result<Vec<Candle>> {
    let symbol = &config.data.symbol;
    let (start_ts, end_ts) = range_bounds(config.data.start, config.data.end);

    if synthetic {
        let fetched = SyntheticProvider::new(42).fetch(symbol, start_ts, end_ts)?;
        return Ok(fetched.candles);
    }

    if let Some(path) = &config.data.source {
        return Ok(read_candles_csv(path, symbol)?);
    }

    let root = config
        .data
        .cache_dir
        .clone()
        .unwrap_or_else(|| cache_dir.to_path_buf());
    let cache = CandleCache::new(root);
    match cache.load(symbol) {
        Ok(candles) => Ok(candles),
        Err(DataError::NoCachedData { .. }) if !offline => {
            println!("No cached data for {symbol}; fetching from KuCoin...");
            let provider = KuCoinProvider::new();
            let fetched = provider.fetch(symbol, start_ts, end_ts)?;
            cache.store(symbol, provider.interval(), fetched.source, &fetched.candles)?;
            Ok(fetched.candles)
        }
        Err(e) => Err(e.into()),
    }
}

fn parse_date(s: &str) -> Result<NaiveDate> {
    Ok(NaiveDate::parse_from_str(s, "%Y-%m-%d")?)
}

/// Inclusive date range to UTC timestamps; defaults to the last 30 days.
fn range_bounds(start: Option<NaiveDate>, end: Option<NaiveDate>) -> (DateTime<Utc>, DateTime<Utc>) {
    let today = Utc::now().date_naive();
    let start = start.unwrap_or_else(|| today - Duration::days(30));
    let end = end.unwrap_or(today);
    let start_ts = Utc.from_utc_datetime(&start.and_time(NaiveTime::MIN));
    let end_ts =
        Utc.from_utc_datetime(&end.and_time(NaiveTime::MIN)) + Duration::days(1) - Duration::seconds(1);
    (start_ts, end_ts)
}

fn run_cache_status(cache_dir: &Path) -> Result<()> {
    if !cache_dir.exists() {
        println!("Cache directory does not exist: {}", cache_dir.display());
        return Ok(());
    }

    let cache = CandleCache::new(cache_dir);
    let statuses = cache.status()?;
    if statuses.is_empty() {
        println!("Cache is empty: {}", cache_dir.display());
        return Ok(());
    }

    let total_size: u64 = statuses.iter().map(|s| s.size_bytes).sum();
    println!("Cache: {}", cache_dir.display());
    println!("Symbols: {}", statuses.len());
    println!("Total size: {}", format_size(total_size));
    println!();
    println!(
        "{:<12} {:<9} {:<24} {:>9} {:>10}",
        "Symbol", "Interval", "Range", "Bars", "Size"
    );
    println!("{}", "-".repeat(68));
    for status in &statuses {
        let range = format!(
            "{} to {}",
            status.start.format("%Y-%m-%d"),
            status.end.format("%Y-%m-%d")
        );
        println!(
            "{:<12} {:<9} {:<24} {:>9} {:>10}",
            status.symbol,
            status.interval,
            range,
            status.candle_count,
            format_size(status.size_bytes)
        );
    }

    Ok(())
}

fn run_cache_clean(cache_dir: &Path, unused_days: u64, confirm: bool) -> Result<()> {
    if !cache_dir.exists() {
        println!("Cache directory does not exist: {}", cache_dir.display());
        return Ok(());
    }

    let cache = CandleCache::new(cache_dir);
    let cutoff = Utc::now() - Duration::days(unused_days as i64);
    let stale: Vec<_> = cache
        .status()?
        .into_iter()
        .filter(|s| s.cached_at < cutoff)
        .collect();

    if stale.is_empty() {
        println!("No symbols older than {unused_days} days to remove.");
        return Ok(());
    }

    println!(
        "Found {} symbol(s) not refreshed in {unused_days} days:",
        stale.len()
    );
    for status in &stale {
        println!("  {} ({})", status.symbol, format_size(status.size_bytes));
    }

    if !confirm {
        println!();
        println!("Dry run — pass --confirm to actually delete.");
        return Ok(());
    }

    for status in &stale {
        cache.remove(&status.symbol)?;
        println!("Removed: {}", status.symbol);
    }

    println!("Done. Removed {} symbol(s).", stale.len());
    Ok(())
}

fn format_size(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{bytes} B")
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    }
}

fn print_summary(report: &ScanReport, synthetic: bool) {
    let summary = &report.summary;
    println!();
    println!("=== Scan Result ===");
    println!("Symbol:         {}", report.symbol);
    println!("Run ID:         {}", report.run_id);
    println!(
        "Bars:           {} ({} warmup, {} horizon, {} malformed skips)",
        report.bar_count,
        report.skipped.insufficient_warmup,
        report.skipped.insufficient_horizon,
        report.skipped.malformed_bar
    );
    println!("Trades:         {}", summary.trade_count);
    println!();
    println!("--- Performance ---");
    println!("Win Rate:       {:.1}%", summary.win_rate * 100.0);
    println!("Avg PnL:        {:+.2}%", summary.avg_pnl_pct);
    println!("Median PnL:     {:+.2}%", summary.median_pnl_pct);
    println!("Profit Factor:  {:.2}", summary.profit_factor);
    println!("Expectancy:     {:+.2} R", summary.expectancy);
    println!(
        "Avg MFE/MAE:    {:.2} / {:.2} ATR",
        summary.avg_mfe_atr, summary.avg_mae_atr
    );
    println!("Max Consec Loss:{}", summary.max_consecutive_losses);
    let exits: Vec<String> = summary
        .by_exit_reason
        .iter()
        .map(|(reason, count)| format!("{reason} {count}"))
        .collect();
    if !exits.is_empty() {
        println!("Exits:          {}", exits.join(", "));
    }
    println!();
    println!("--- Gate ---");
    println!(
        "Rejections:     {} ({} cooldown, {} score, {} combo, {} trend, {} body, {} volatility)",
        report.gate_rejections.total(),
        report.gate_rejections.cooldown_active,
        report.gate_rejections.score_below_threshold,
        report.gate_rejections.combo_not_allowed,
        report.gate_rejections.trend_misaligned,
        report.gate_rejections.weak_body,
        report.gate_rejections.low_volatility
    );
    if synthetic {
        println!();
        println!("WARNING: Results based on SYNTHETIC data");
    }
    for warning in report.warnings.iter().take(10) {
        println!("WARNING: {warning}");
    }
    if report.warnings.len() > 10 {
        println!("WARNING: ... {} more", report.warnings.len() - 10);
    }
    println!();
}
