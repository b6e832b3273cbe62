//! CLI definition and dispatch.

use clap::{Parser, Subcommand, ValueEnum};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use crate::adapters::caching_adapter::CachingAdapter;
use crate::adapters::csv_adapter::{CsvAdapter, DEFAULT_AVERAGE_VOLUME_WINDOW};
use crate::adapters::csv_universe_adapter::{CsvUniverseAdapter, DEFAULT_VOLUME_COLUMN};
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::domain::config_validation::{validate_data_config, validate_universe_config};
use crate::domain::error::ScreenerError;
use crate::domain::filter::FilterSpec;
use crate::domain::filter_config::{build_filters, optional_value};
use crate::domain::interval::{Interval, Period};
use crate::domain::pipeline::{screen, ScreenReport};
use crate::domain::universe::{
    parse_codes, select, Universe, UniverseCriteria, UniverseEntry, UniverseError,
};
use crate::ports::config_port::ConfigPort;
use crate::ports::market_data_port::MarketDataPort;
use crate::ports::universe_port::UniversePort;

#[derive(Parser, Debug)]
#[command(name = "barscreen", about = "Price and volume pattern screener")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Screen the universe with the filters enabled in the config
    Screen {
        #[arg(short, long)]
        config: PathBuf,
        /// Symbols to screen instead of the configured universe
        #[arg(long)]
        symbols: Option<String>,
        /// Directory of market data CSV files
        #[arg(long)]
        data: Option<PathBuf>,
        #[arg(long)]
        no_cache: bool,
    },
    /// Find symbols with consecutive inside weeks or months
    Inside {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(short, long, value_enum)]
        timeframe: Timeframe,
        #[arg(short, long)]
        num: i64,
        #[arg(long)]
        symbols: Option<String>,
    },
    /// Build the configured filters without touching market data
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// List the pre-screened candidate symbols
    Universe {
        #[arg(short, long)]
        config: PathBuf,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Timeframe {
    #[value(alias = "w")]
    Week,
    #[value(alias = "m")]
    Month,
}

impl Timeframe {
    pub fn interval(&self) -> Interval {
        match self {
            Timeframe::Week => Interval::OneWeek,
            Timeframe::Month => Interval::OneMonth,
        }
    }
}

/// Settings from the `[data]` section.
#[derive(Debug, Clone, PartialEq)]
pub struct DataSettings {
    pub path: PathBuf,
    pub period: Period,
    pub average_volume_window: usize,
    pub cache: bool,
}

pub fn run(cli: Cli) -> ExitCode {
    let stdout = io::stdout();
    run_with_output(cli, &mut stdout.lock())
}

/// Dispatch `cli`, writing symbol lists to `out`.
pub fn run_with_output(cli: Cli, out: &mut dyn Write) -> ExitCode {
    let result = match cli.command {
        Command::Screen {
            config,
            symbols,
            data,
            no_cache,
        } => run_screen(&config, symbols.as_deref(), data.as_deref(), no_cache, out),
        Command::Inside {
            config,
            timeframe,
            num,
            symbols,
        } => run_inside(&config, timeframe, num, symbols.as_deref(), out),
        Command::Validate { config } => run_validate(&config),
        Command::Universe { config } => run_universe(&config, out),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

pub fn load_config(path: &Path) -> Result<FileConfigAdapter, ScreenerError> {
    eprintln!("Loading config from {}", path.display());
    FileConfigAdapter::from_file(path)
}

fn run_screen(
    config_path: &Path,
    symbols_override: Option<&str>,
    data_override: Option<&Path>,
    no_cache: bool,
    out: &mut dyn Write,
) -> Result<(), ScreenerError> {
    // Stage 1: Load and validate config
    let config = load_config(config_path)?;
    validate_data_config(&config)?;
    if symbols_override.is_none() {
        validate_universe_config(&config)?;
    }

    // Stage 2: Build filters; bad parameters abort here
    let mut settings = build_data_settings(&config, data_override)?;
    settings.cache &= !no_cache;
    let filters = build_filters(&config, settings.period)?;
    eprintln!("Filters:");
    for filter in &filters {
        eprintln!("  {filter}");
    }

    // Stage 3: Resolve candidates
    let universe = resolve_universe(symbols_override, &config)?;
    eprintln!("Screening {} symbols...", universe.count());

    // Stage 4: Screen
    run_with_data_port(&settings, |data| {
        run_screen_pipeline(data, &universe, &filters, out).map(|_| ())
    })
}

fn run_inside(
    config_path: &Path,
    timeframe: Timeframe,
    num: i64,
    symbols_override: Option<&str>,
    out: &mut dyn Write,
) -> Result<(), ScreenerError> {
    let config = load_config(config_path)?;
    validate_data_config(&config)?;
    if symbols_override.is_none() {
        validate_universe_config(&config)?;
    }

    let settings = build_data_settings(&config, None)?;
    let filters = vec![inside_timeframe_filter(timeframe, num, settings.period)?];
    let universe = resolve_universe(symbols_override, &config)?;

    let label = match timeframe {
        Timeframe::Week => "week",
        Timeframe::Month => "month",
    };
    eprintln!("{num} inside {label} list");

    run_with_data_port(&settings, |data| {
        run_screen_pipeline(data, &universe, &filters, out).map(|_| ())
    })
}

fn run_validate(config_path: &Path) -> Result<(), ScreenerError> {
    let config = load_config(config_path)?;
    validate_data_config(&config)?;
    validate_universe_config(&config)?;

    let settings = build_data_settings(&config, None)?;
    let criteria = build_universe_criteria(&config)?;
    let filters = build_filters(&config, settings.period)?;

    eprintln!("\nData:");
    eprintln!("  path:   {}", settings.path.display());
    eprintln!("  period: {}", settings.period);
    eprintln!("  cache:  {}", settings.cache);

    eprintln!("\nUniverse:");
    match config.get_string("universe", "symbols") {
        Some(s) if !s.trim().is_empty() => {
            eprintln!("  symbols: {}", parse_codes(&s)?.join(", "));
        }
        _ => {
            let file = config.get_string("universe", "file").unwrap_or_default();
            eprintln!("  file: {file}");
        }
    }
    if criteria.is_unrestricted() {
        eprintln!("  pre-screen: none");
    } else {
        eprintln!("  pre-screen: {criteria:?}");
    }

    eprintln!("\nFilters:");
    if filters.is_empty() {
        eprintln!("  none (every candidate passes)");
    }
    for filter in &filters {
        eprintln!("  {filter}");
    }

    eprintln!("\nConfiguration is valid.");
    Ok(())
}

fn run_universe(config_path: &Path, out: &mut dyn Write) -> Result<(), ScreenerError> {
    let config = load_config(config_path)?;
    validate_universe_config(&config)?;

    let universe = resolve_universe(None, &config)?;
    for symbol in &universe.symbols {
        writeln!(out, "{symbol}")?;
    }
    eprintln!("{} symbols", universe.count());
    Ok(())
}

/// Run `f` against the CSV market data, behind the cache when enabled.
fn run_with_data_port<F>(settings: &DataSettings, f: F) -> Result<(), ScreenerError>
where
    F: FnOnce(&dyn MarketDataPort) -> Result<(), ScreenerError>,
{
    let csv = CsvAdapter::new(settings.path.clone())
        .with_average_volume_window(settings.average_volume_window);
    if settings.cache {
        let cached = CachingAdapter::new(csv);
        f(&cached)
    } else {
        f(&csv)
    }
}

pub fn inside_timeframe_filter(
    timeframe: Timeframe,
    num: i64,
    period: Period,
) -> Result<FilterSpec, ScreenerError> {
    FilterSpec::inside_range(num, timeframe.interval().as_str(), "inside", None, period)
}

pub fn build_data_settings(
    config: &dyn ConfigPort,
    data_override: Option<&Path>,
) -> Result<DataSettings, ScreenerError> {
    let path = match data_override {
        Some(p) => p.to_path_buf(),
        None => config
            .get_string("data", "path")
            .filter(|s| !s.trim().is_empty())
            .map(|s| PathBuf::from(s.trim()))
            .ok_or_else(|| ScreenerError::ConfigMissing {
                section: "data".into(),
                key: "path".into(),
            })?,
    };

    let period = optional_value::<String>(config, "data", "period")?
        .map(|p| {
            p.parse::<Period>()
                .map_err(|e| ScreenerError::ConfigInvalid {
                    section: "data".into(),
                    key: "period".into(),
                    reason: e.to_string(),
                })
        })
        .transpose()?
        .unwrap_or_default();

    let average_volume_window = match optional_value::<i64>(config, "data", "average_volume_window")? {
        None => DEFAULT_AVERAGE_VOLUME_WINDOW,
        Some(window) => usize::try_from(window)
            .ok()
            .filter(|w| *w > 0)
            .ok_or_else(|| ScreenerError::ConfigInvalid {
                section: "data".into(),
                key: "average_volume_window".into(),
                reason: "average_volume_window must be at least 1".into(),
            })?,
    };

    Ok(DataSettings {
        path,
        period,
        average_volume_window,
        cache: config.get_bool("data", "cache", true),
    })
}

pub fn build_universe_criteria(config: &dyn ConfigPort) -> Result<UniverseCriteria, ScreenerError> {
    Ok(UniverseCriteria {
        max_symbol_len: optional_value::<usize>(config, "universe", "max_symbol_len")?,
        alphabetic_only: config.get_bool("universe", "alphabetic_only", false),
        min_volume: optional_value::<u64>(config, "universe", "min_volume")?,
    })
}

/// Candidates from `--symbols`, `[universe] symbols`, or `[universe] file`,
/// in that order of precedence. Explicit lists skip the pre-screen.
pub fn resolve_universe(
    symbols_override: Option<&str>,
    config: &dyn ConfigPort,
) -> Result<Universe, ScreenerError> {
    let explicit = symbols_override.map(str::to_string).or_else(|| {
        config
            .get_string("universe", "symbols")
            .filter(|s| !s.trim().is_empty())
    });

    let universe = match explicit {
        Some(list) => Universe {
            symbols: parse_codes(&list)?,
        },
        None => {
            let file = config
                .get_string("universe", "file")
                .filter(|s| !s.trim().is_empty())
                .ok_or_else(|| ScreenerError::ConfigMissing {
                    section: "universe".into(),
                    key: "file".into(),
                })?;
            let volume_column = optional_value::<usize>(config, "universe", "volume_column")?
                .unwrap_or(DEFAULT_VOLUME_COLUMN);
            let source = CsvUniverseAdapter::new(PathBuf::from(file.trim()))
                .with_headers(config.get_bool("universe", "has_headers", true))
                .with_volume_column(volume_column);
            let criteria = build_universe_criteria(config)?;
            select_from(&source, &criteria)?
        }
    };

    if universe.is_empty() {
        return Err(UniverseError::Empty.into());
    }
    Ok(universe)
}

pub fn select_from(
    source: &dyn UniversePort,
    criteria: &UniverseCriteria,
) -> Result<Universe, ScreenerError> {
    let entries: Vec<UniverseEntry> = source.load_entries()?;
    Ok(select(entries, criteria))
}

/// Screen `universe`, write the pass list to `out`, and report
/// indeterminate checks on stderr.
pub fn run_screen_pipeline(
    data_port: &dyn MarketDataPort,
    universe: &Universe,
    filters: &[FilterSpec],
    out: &mut dyn Write,
) -> Result<ScreenReport, ScreenerError> {
    let report = screen(&universe.symbols, filters, data_port);

    for symbol in &report.passed {
        writeln!(out, "{symbol}")?;
    }
    out.flush()?;

    if !report.diagnostics.is_empty() {
        eprintln!("\n=== Could not evaluate ===");
        for diag in &report.diagnostics {
            eprintln!("  {}: {}: {}", diag.symbol, diag.filter, diag.error);
        }
    }

    eprintln!(
        "\n{} of {} passed ({} failed, {} indeterminate)",
        report.passed.len(),
        report.evaluated,
        report.failed,
        report.indeterminate,
    );
    Ok(report)
}
