//! CLI definition and dispatch.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::csv_report_adapter::CsvReportAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::domain::combiner;
use crate::domain::config_validation::{
    parse_indicator, validate_combiner_config, validate_data_config, validate_simulation_config,
    DataConfig, SimulationConfig,
};
use crate::domain::error::SigtraderError;
use crate::domain::indicator::IndicatorOutput;
use crate::domain::performance::{Performance, SharpeMethod};
use crate::domain::portfolio::{simulate_returns, simulate_shares};
use crate::domain::position::Position;
use crate::domain::price::PriceSeries;
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::DataPort;
use crate::ports::report_port::ReportPort;
use chrono::NaiveDate;

#[derive(Parser, Debug)]
#[command(name = "sigtrader", about = "Indicator signal backtester")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Backtest a single indicator
    Backtest {
        #[arg(short, long)]
        config: PathBuf,
        /// Config section naming the indicator to run
        #[arg(short, long)]
        indicator: Option<String>,
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Simulate a fixed share count instead of log-return compounding
        #[arg(long)]
        shares: Option<f64>,
        #[arg(long)]
        symbol: Option<String>,
    },
    /// Backtest a voting consensus of several indicators
    Combine {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(short, long)]
        output: Option<PathBuf>,
        #[arg(long)]
        symbol: Option<String>,
    },
    /// Show data range for symbol(s)
    Info {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        symbol: Option<String>,
    },
    /// Validate a configuration without fetching data
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Backtest {
            config,
            indicator,
            output,
            shares,
            symbol,
        } => run_backtest(
            &config,
            indicator.as_deref(),
            output.as_ref(),
            shares,
            symbol.as_deref(),
        ),
        Command::Combine {
            config,
            output,
            symbol,
        } => run_combine(&config, output.as_ref(), symbol.as_deref()),
        Command::Info { config, symbol } => run_info(&config, symbol.as_deref()),
        Command::Validate { config } => run_validate(&config),
    }
}

pub fn load_config(path: &PathBuf) -> Result<FileConfigAdapter, ExitCode> {
    FileConfigAdapter::from_file(path).map_err(|e| {
        let err = SigtraderError::ConfigParse {
            file: path.display().to_string(),
            reason: e.to_string(),
        };
        eprintln!("error: {err}");
        ExitCode::from(&err)
    })
}

fn run_backtest(
    config_path: &PathBuf,
    indicator_override: Option<&str>,
    output_path: Option<&PathBuf>,
    shares: Option<f64>,
    symbol_override: Option<&str>,
) -> ExitCode {
    // Stage 1: Load config
    eprintln!("Loading config from {}", config_path.display());
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    // Stage 2: Validate data and simulation settings
    let (data_cfg, sim_cfg) = match validate_run_config(&adapter, symbol_override) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    // Stage 3: Resolve the indicator section
    let section = match resolve_indicator_section(indicator_override, &adapter) {
        Some(s) => s,
        None => {
            eprintln!("error: no indicator configured (use --indicator or set [backtest] indicator)");
            return ExitCode::from(2);
        }
    };
    let kind = match parse_indicator(&adapter, &section) {
        Ok(k) => k,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };
    eprintln!("Running indicator: {}", kind);

    // Stage 4: Fetch price history
    let prices = match load_prices(&data_cfg) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };
    eprintln!(
        "Loaded {} bars for {} ({} to {})",
        prices.len(),
        prices.symbol,
        data_cfg.start_date,
        data_cfg.end_date,
    );

    // Stage 5: Compute positions
    let output = match kind.run(&prices, sim_cfg.position_bound) {
        Ok(o) => o,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    // Stages 6-8: Simulate, summarize, export
    run_simulation(
        &prices,
        &output.positions,
        &output.buy_or_sell,
        &sim_cfg,
        shares,
        output_path,
    )
}

fn run_combine(
    config_path: &PathBuf,
    output_path: Option<&PathBuf>,
    symbol_override: Option<&str>,
) -> ExitCode {
    eprintln!("Loading config from {}", config_path.display());
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    let (data_cfg, sim_cfg) = match validate_run_config(&adapter, symbol_override) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    let settings = match validate_combiner_config(&adapter) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    let prices = match load_prices(&data_cfg) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };
    eprintln!(
        "Loaded {} bars for {} ({} to {})",
        prices.len(),
        prices.symbol,
        data_cfg.start_date,
        data_cfg.end_date,
    );

    let mut outputs: Vec<IndicatorOutput> = Vec::with_capacity(settings.sections.len());
    for section in &settings.sections {
        let kind = match parse_indicator(&adapter, section) {
            Ok(k) => k,
            Err(e) => {
                eprintln!("error: {e}");
                return (&e).into();
            }
        };
        eprintln!("Running indicator: {}", kind);
        // Each member votes unclamped; the bound applies to the consensus.
        match kind.run(&prices, crate::domain::position::PositionBound::LongShort) {
            Ok(o) => outputs.push(o),
            Err(e) => {
                eprintln!("error: {e}");
                return (&e).into();
            }
        }
    }

    let consensus = match combiner::combine(
        &outputs,
        settings.min_to_long,
        settings.min_to_short,
        sim_cfg.position_bound,
    ) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    let long_days = consensus
        .positions
        .iter()
        .filter(|p| **p == Position::Long)
        .count();
    let short_days = consensus
        .positions
        .iter()
        .filter(|p| **p == Position::Short)
        .count();
    eprintln!(
        "Consensus of {} indicators: {} long days, {} short days",
        outputs.len(),
        long_days,
        short_days,
    );

    run_simulation(
        &prices,
        &consensus.positions,
        &consensus.buy_or_sell,
        &sim_cfg,
        None,
        output_path,
    )
}

fn run_info(config_path: &PathBuf, symbol: Option<&str>) -> ExitCode {
    let config = match load_config(config_path) {
        Ok(c) => c,
        Err(code) => return code,
    };

    let csv_dir = match config.get_string("data", "csv_dir") {
        Some(d) => PathBuf::from(d),
        None => {
            eprintln!("error: [data] csv_dir is required for info");
            return ExitCode::from(2);
        }
    };
    let adapter = CsvAdapter::new(csv_dir);

    let symbols = match symbol {
        Some(s) => vec![s.to_string()],
        None => match adapter.list_symbols() {
            Ok(s) => s,
            Err(e) => {
                eprintln!("error: {e}");
                return (&e).into();
            }
        },
    };

    if symbols.is_empty() {
        eprintln!("No symbols found");
        return ExitCode::SUCCESS;
    }

    for s in &symbols {
        match adapter.data_range(s) {
            Ok(Some((min_date, max_date, count))) => {
                println!("{}: {} bars, {} to {}", s, count, min_date, max_date);
            }
            Ok(None) => {
                eprintln!("{}: no data found", s);
            }
            Err(e) => {
                eprintln!("error querying {}: {}", s, e);
            }
        }
    }
    ExitCode::SUCCESS
}

fn run_validate(config_path: &PathBuf) -> ExitCode {
    eprintln!("Validating config: {}", config_path.display());
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    if let Err(e) = validate_data_config(&adapter) {
        eprintln!("error: {e}");
        return (&e).into();
    }
    if let Err(e) = validate_simulation_config(&adapter) {
        eprintln!("error: {e}");
        return (&e).into();
    }

    let mut sections: Vec<String> = Vec::new();
    if let Ok(settings) = validate_combiner_config(&adapter) {
        sections = settings.sections;
    } else if let Some(section) = resolve_indicator_section(None, &adapter) {
        sections.push(section);
    }

    if sections.is_empty() {
        eprintln!("error: no indicator sections configured");
        return ExitCode::from(2);
    }

    eprintln!("\nIndicators:");
    for section in &sections {
        match parse_indicator(&adapter, section) {
            Ok(kind) => eprintln!("  [{}] {}", section, kind),
            Err(e) => {
                eprintln!("  error in [{}]: {}", section, e);
                return (&e).into();
            }
        }
    }

    eprintln!("\nConfiguration is valid.");
    ExitCode::SUCCESS
}

fn validate_run_config(
    adapter: &FileConfigAdapter,
    symbol_override: Option<&str>,
) -> Result<(DataConfig, SimulationConfig), SigtraderError> {
    let mut data_cfg = validate_data_config(adapter)?;
    if let Some(symbol) = symbol_override {
        data_cfg.symbol = symbol.to_uppercase();
    }
    let sim_cfg = validate_simulation_config(adapter)?;
    Ok((data_cfg, sim_cfg))
}

fn resolve_indicator_section(
    indicator_override: Option<&str>,
    config: &dyn ConfigPort,
) -> Option<String> {
    if let Some(section) = indicator_override {
        return Some(section.to_string());
    }
    config.get_string("backtest", "indicator")
}

fn load_prices(data_cfg: &DataConfig) -> Result<PriceSeries, SigtraderError> {
    let adapter = CsvAdapter::new(data_cfg.csv_dir.clone());
    let bars = adapter.fetch_history(&data_cfg.symbol, data_cfg.start_date, data_cfg.end_date)?;
    if bars.len() < 2 {
        return Err(SigtraderError::InsufficientData {
            symbol: data_cfg.symbol.clone(),
            bars: bars.len(),
            minimum: 2,
        });
    }
    let mut prices = PriceSeries::from_bars(&bars)?;
    prices.fill_gaps();
    Ok(prices)
}

fn run_simulation(
    prices: &PriceSeries,
    positions: &[Position],
    buy_or_sell: &[i8],
    sim_cfg: &SimulationConfig,
    shares: Option<f64>,
    output_path: Option<&PathBuf>,
) -> ExitCode {
    let equity = match simulate_returns(
        &prices.dates,
        &prices.adj_close,
        positions,
        buy_or_sell,
        sim_cfg.capital,
        sim_cfg.transaction_fee,
    ) {
        Ok(e) => e,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    if let Some(num_shares) = shares {
        let holdings = match simulate_shares(
            &prices.dates,
            &prices.adj_close,
            positions,
            buy_or_sell,
            sim_cfg.capital,
            sim_cfg.transaction_fee,
            num_shares,
        ) {
            Ok(h) => h,
            Err(e) => {
                eprintln!("error: {e}");
                return (&e).into();
            }
        };
        if let (Some(first), Some(last)) = (holdings.net_holdings.first(), holdings.net_holdings.last())
        {
            eprintln!("\n=== Share Ledger ({} shares) ===", num_shares);
            eprintln!("Start Holdings:   {:.2}", first);
            eprintln!("Final Holdings:   {:.2}", last);
        }
    }

    let perf = match Performance::from_cumulative(
        equity.dates.clone(),
        equity.net_cum_returns.clone(),
    ) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    print_summary(&perf, &equity.dates);

    if let Some(output) = output_path {
        let report = CsvReportAdapter::new();
        if let Err(e) = report.write_equity(&equity, &output.display().to_string()) {
            eprintln!("error: {e}");
            return (&e).into();
        }
        let (by_magnitude, _) = perf.drawdown_episodes(5);
        let dd_path = output.with_extension("drawdowns.csv");
        if let Err(e) = report.write_drawdowns(&by_magnitude, &dd_path.display().to_string()) {
            eprintln!("error: {e}");
            return (&e).into();
        }
        eprintln!("\nReport written to: {}", output.display());
    }

    ExitCode::SUCCESS
}

fn print_summary(perf: &Performance, dates: &[NaiveDate]) {
    eprintln!("\n=== Results ===");
    eprintln!(
        "Net Return:       {:.2}%",
        (perf.cumulative().last().copied().unwrap_or(1.0) - 1.0) * 100.0
    );
    eprintln!("CAGR:             {:.2}%", perf.cagr() * 100.0);
    eprintln!(
        "Sharpe (log):     {:.2}",
        perf.sharpe_ratio(SharpeMethod::Log)
    );
    eprintln!(
        "Sharpe (pct):     {:.2}",
        perf.sharpe_ratio(SharpeMethod::PctChange)
    );
    eprintln!("Max Drawdown:     -{:.1}%", perf.max_drawdown() * 100.0);

    let annual = perf.annual_returns();
    if !annual.is_empty() {
        eprintln!("\n=== Annual Returns ===");
        for ar in &annual {
            let marker = if ar.above_mean { " *" } else { "" };
            eprintln!("  {}:  {:+.2}%{}", ar.year, ar.return_pct, marker);
        }
    }

    let (by_magnitude, _) = perf.drawdown_episodes(5);
    if !by_magnitude.is_empty() {
        eprintln!("\n=== Worst Drawdowns ===");
        for ep in &by_magnitude {
            eprintln!(
                "  {} to {}:  -{:.1}% over {} days",
                ep.start,
                ep.end,
                ep.max_drawdown * 100.0,
                ep.days,
            );
        }
    }

    if let (Some(first), Some(last)) = (dates.first(), dates.last()) {
        eprintln!("\nPeriod: {} to {}", first, last);
    }
}
