//! Edges CLI - odds conversion, staking and bet-performance reports

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use colored::Colorize;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use edges::core::kelly::{KellyCalculator, StakeSizing};
use edges::core::odds::{
    decimal_to_fractional_bounded, fractional_to_decimal, implied_probability,
    DEFAULT_MAX_DENOMINATOR,
};
use edges::error::{
    validate_bankroll, validate_kelly_multiplier, validate_odds, validate_probability,
};
use edges::performance::metrics::{analyze_by_odds_band, calculate_metrics, PerformanceMetrics};
use edges::performance::{compute_cumulative_pnl, PendingStakes, PerformanceAggregator};
use edges::{load_records, AggregatedRow, BetRecord, Dimension, Kpis, NormalizeReport, SortOrder};

#[derive(Parser)]
#[command(name = "edges")]
#[command(author, version, about = "Odds and bet-performance analytics", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Show decimal odds in fractional notation
    Odds {
        /// Decimal odds (e.g. 1.91)
        #[arg(required = true)]
        prices: Vec<f64>,

        /// Largest denominator allowed in the fraction
        #[arg(long, default_value_t = DEFAULT_MAX_DENOMINATOR)]
        max_denominator: u64,
    },

    /// Convert fractional odds (e.g. 10/11, EVS) to decimal
    Fraction {
        fractional: String,
    },

    /// Grouped performance report for a bet export
    Report {
        /// Bet export (.json or .csv)
        file: PathBuf,

        /// Grouping: market, league or bookmaker
        #[arg(long, default_value = "market")]
        by: Dimension,

        /// Row order: roi (performance) or picks (distribution)
        #[arg(long, default_value = "roi")]
        sort: SortOrder,

        /// Leave pending bets out of the staked total
        #[arg(long)]
        exclude_pending_stakes: bool,

        /// Print JSON instead of tables
        #[arg(long)]
        json: bool,
    },

    /// Cumulative profit/loss over settled bets
    Pnl {
        /// Bet export (.json or .csv)
        file: PathBuf,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Kelly stakes for one or more simultaneous bets
    Kelly {
        /// Model probability of winning (0-1), once per bet
        #[arg(short, long, required = true)]
        probability: Vec<f64>,

        /// Decimal odds on offer, once per bet
        #[arg(short, long, required = true)]
        odds: Vec<f64>,

        /// Bankroll
        #[arg(long, env = "EDGES_BANKROLL", default_value = "1000")]
        bankroll: f64,

        /// Kelly multiplier (0.25 = quarter Kelly)
        #[arg(long, default_value = "0.25")]
        multiplier: f64,
    },
}

#[derive(Serialize)]
struct ReportOutput<'a> {
    dimension: Dimension,
    kpis: &'a Kpis,
    rows: &'a [AggregatedRow],
    metrics: &'a PerformanceMetrics,
    odds_bands: &'a [AggregatedRow],
    normalization: &'a NormalizeReport,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        _ => Level::DEBUG,
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")?;

    match cli.command {
        Commands::Odds {
            prices,
            max_denominator,
        } => show_odds(&prices, max_denominator),
        Commands::Fraction { fractional } => show_fraction(&fractional)?,
        Commands::Report {
            file,
            by,
            sort,
            exclude_pending_stakes,
            json,
        } => {
            let pending_stakes = if exclude_pending_stakes {
                PendingStakes::Exclude
            } else {
                PendingStakes::Include
            };
            run_report(&file, by, sort, PerformanceAggregator::new(pending_stakes), json)?;
        }
        Commands::Pnl { file, json } => run_pnl(&file, json)?,
        Commands::Kelly {
            probability,
            odds,
            bankroll,
            multiplier,
        } => run_kelly(&probability, &odds, bankroll, multiplier)?,
    }

    Ok(())
}

fn show_odds(prices: &[f64], max_denominator: u64) {
    println!("{:>10} {:>12} {:>10}", "Decimal", "Fractional", "Implied");
    println!("{}", "-".repeat(34));
    for &price in prices {
        let implied = implied_probability(price)
            .map(|p| format!("{:.1}%", p * 100.0))
            .unwrap_or_else(|| "—".to_string());
        println!(
            "{:>10.2} {:>12} {:>10}",
            price,
            decimal_to_fractional_bounded(price, max_denominator),
            implied
        );
    }
}

fn show_fraction(fractional: &str) -> Result<()> {
    let decimal = fractional_to_decimal(fractional)
        .with_context(|| format!("Not a fractional price: '{}'", fractional))?;
    println!("{} = {:.2}", fractional.trim(), decimal);
    Ok(())
}

fn load(file: &Path) -> Result<(Vec<BetRecord>, NormalizeReport)> {
    let (records, report) =
        load_records(file).with_context(|| format!("Failed to load bets from {:?}", file))?;

    if report.corrected_records > 0 {
        eprintln!(
            "{}",
            format!(
                "Warning: {} of {} records had malformed fields coerced to 0",
                report.corrected_records, report.records
            )
            .yellow()
        );
    }

    Ok((records, report))
}

fn run_report(
    file: &Path,
    dimension: Dimension,
    order: SortOrder,
    aggregator: PerformanceAggregator,
    json: bool,
) -> Result<()> {
    let (records, report) = load(file)?;

    let kpis = aggregator.kpis(&records);
    let rows = aggregator.aggregate(&records, dimension, order);
    let metrics = calculate_metrics(&records);
    let odds_bands = analyze_by_odds_band(&aggregator, &records, order);

    if json {
        let output = ReportOutput {
            dimension,
            kpis: &kpis,
            rows: &rows,
            metrics: &metrics,
            odds_bands: &odds_bands,
            normalization: &report,
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    println!("{}", "Summary".cyan().bold());
    println!("{}", "-".repeat(40));
    println!(
        "Record:    {}W-{}L-{}V ({} picks)",
        kpis.record.won,
        kpis.record.lost,
        kpis.record.void,
        records.len()
    );
    println!("Staked:    {:.2}", kpis.staked);
    println!("Returned:  {:.2}", kpis.returned);
    println!("P/L:       {}", colored_amount(kpis.pnl));
    println!("ROI:       {:.1}%", kpis.roi);
    println!("Hit rate:  {:.1}%", metrics.hit_rate * 100.0);
    println!("Avg price: {:.2}", metrics.avg_price);
    println!(
        "Drawdown:  {:.2} ({:.1}%)",
        metrics.max_drawdown,
        metrics.max_drawdown_pct * 100.0
    );

    println!("\n{}", format!("By {}:", dimension).yellow().bold());
    print_rows(&rows);

    println!("\n{}", "By Odds Band:".yellow().bold());
    print_rows(&odds_bands);

    Ok(())
}

fn print_rows(rows: &[AggregatedRow]) {
    println!(
        "{:<18} {:>6} {:>10} {:>10} {:>10} {:>10} {:>8}",
        "Key", "Picks", "W-L-V", "Staked", "Returned", "P/L", "ROI"
    );
    println!("{}", "-".repeat(78));
    for row in rows {
        println!(
            "{:<18} {:>6} {:>10} {:>10.2} {:>10.2} {:>10.2} {:>7.1}%",
            row.key,
            row.picks,
            format!("{}-{}-{}", row.won, row.lost, row.void),
            row.staked,
            row.returned,
            row.pnl,
            row.roi
        );
    }
}

fn colored_amount(amount: f64) -> String {
    let text = format!("{:+.2}", amount);
    if amount > 0.0 {
        text.green().to_string()
    } else if amount < 0.0 {
        text.red().to_string()
    } else {
        text
    }
}

fn run_pnl(file: &Path, json: bool) -> Result<()> {
    let (records, _) = load(file)?;
    let series = compute_cumulative_pnl(&records);

    if json {
        println!("{}", serde_json::to_string_pretty(&series)?);
        return Ok(());
    }

    println!("{}", "Cumulative P/L".cyan().bold());
    println!("{}", "-".repeat(40));
    for (i, value) in series.values.iter().enumerate() {
        println!("{:>5} {:>12.2}", i + 1, value);
    }
    println!();
    println!("Settled bets: {}", series.values.len());
    println!("Final:        {}", colored_amount(series.last_value));
    println!("Low / High:   {:.2} / {:.2}", series.min, series.max);

    Ok(())
}

fn run_kelly(probabilities: &[f64], odds: &[f64], bankroll: f64, multiplier: f64) -> Result<()> {
    if probabilities.len() != odds.len() {
        anyhow::bail!(
            "Got {} probabilities but {} odds; pass one of each per bet",
            probabilities.len(),
            odds.len()
        );
    }
    for (&p, &o) in probabilities.iter().zip(odds) {
        validate_probability(p)?;
        validate_odds(o)?;
    }
    validate_bankroll(bankroll)?;
    validate_kelly_multiplier(multiplier)?;

    let calc = KellyCalculator::with_defaults(bankroll).with_multiplier(multiplier);
    let bets: Vec<(f64, f64)> = probabilities.iter().copied().zip(odds.iter().copied()).collect();

    if let [(probability, odds)] = bets[..] {
        print_sizing(&calc.calculate_single(probability, odds), multiplier);
        return Ok(());
    }

    // Several bets share the exposure limit
    let sizings = calc.calculate_multiple(&bets);
    println!("{}", "Kelly Stakes".cyan().bold());
    println!("{}", "-".repeat(56));
    println!(
        "{:>4} {:>8} {:>8} {:>8} {:>10} {:>12}",
        "#", "Prob", "Odds", "Edge", "Kelly", "Stake"
    );
    for (i, sizing) in sizings.iter().enumerate() {
        println!(
            "{:>4} {:>7.1}% {:>8.2} {:>+7.1}% {:>9.2}% {:>12.2}",
            i + 1,
            sizing.probability * 100.0,
            sizing.odds,
            sizing.edge * 100.0,
            sizing.kelly_fraction * 100.0,
            sizing.stake
        );
    }
    let total: f64 = sizings.iter().map(|s| s.stake).sum();
    println!("{}", "-".repeat(56));
    println!(
        "Total stake:   {:.2} (limit {:.2})",
        total,
        bankroll * calc.max_total_exposure
    );

    Ok(())
}

fn print_sizing(sizing: &StakeSizing, multiplier: f64) {
    println!("{}", "Kelly Stake".cyan().bold());
    println!("{}", "-".repeat(40));
    println!("Probability:   {:.1}%", sizing.probability * 100.0);
    println!("Odds:          {:.2}", sizing.odds);
    println!("Edge:          {:+.1}%", sizing.edge * 100.0);
    println!("Full Kelly:    {:.2}%", sizing.kelly_fraction * 100.0);
    println!(
        "Recommended:   {:.2}% ({}x Kelly)",
        sizing.recommended_fraction * 100.0,
        multiplier
    );

    if sizing.stake > 0.0 {
        println!("Stake:         {}", format!("{:.2}", sizing.stake).green().bold());
    } else if sizing.edge <= 0.0 {
        println!("Stake:         {}", "no bet (no edge)".red());
    } else {
        println!("Stake:         {}", "no bet (below minimum stake)".red());
    }
}
