use anyhow::{Context, Result, bail};
use serde::Serialize;

use pricelab::config::DemoConfig;
use pricelab::drivers::{
    DriverComparisonChart, DriverComparisonParams, DriverComparisonStats,
    simulate_driver_comparison_chart,
};
use pricelab::pooling::{
    PoolOutcome, RiskPoolChart, RiskPoolParams, RiskPoolStats, simulate_risk_pool_chart,
};
use pricelab::premium::{LoadingRatios, PremiumComparison, PremiumComponents, compare_premiums};
use pricelab::seed::SeedSource;
use pricelab::types::{Seed, SeedOffset};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Demo {
    Pooling,
    Drivers,
    Premium,
    All,
}

impl Demo {
    fn parse(s: &str) -> Result<Self> {
        match s {
            "pooling" => Ok(Demo::Pooling),
            "drivers" => Ok(Demo::Drivers),
            "premium" => Ok(Demo::Premium),
            "all" => Ok(Demo::All),
            other => bail!("unknown demo '{other}' (expected pooling, drivers, premium or all)"),
        }
    }

    fn pooling(self) -> bool {
        matches!(self, Demo::Pooling | Demo::All)
    }

    fn drivers(self) -> bool {
        matches!(self, Demo::Drivers | Demo::All)
    }

    fn premium(self) -> bool {
        matches!(self, Demo::Premium | Demo::All)
    }
}

struct Options {
    demo: Demo,
    pool: RiskPoolParams,
    drivers: DriverComparisonParams,
    compact: bool,
    pool_offset: SeedOffset,
    driver_offset: SeedOffset,
    json: bool,
}

/// Seed of one demo together with how it was derived.
#[derive(Serialize)]
struct SeedInfo {
    seed: Seed,
    base: Seed,
    offset: SeedOffset,
}

#[derive(Serialize)]
struct PoolingReport {
    seed: SeedInfo,
    stats: RiskPoolStats,
    chart: RiskPoolChart,
}

#[derive(Serialize)]
struct DriversReport {
    seed: SeedInfo,
    stats: DriverComparisonStats,
    chart: DriverComparisonChart,
}

#[derive(Serialize, Default)]
struct Report {
    #[serde(skip_serializing_if = "Option::is_none")]
    pooling: Option<PoolingReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    drivers: Option<DriversReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    premium: Option<PremiumComparison>,
}

fn main() -> Result<()> {
    env_logger::init();

    let config = DemoConfig::canonical();
    let args: Vec<String> = std::env::args().collect();
    let opts = parse_args(&args, &config)?;

    config.check_pool_params(&opts.pool)?;
    config.check_driver_params(&opts.drivers)?;

    let display_limit = config.display_limit(opts.compact);
    let mut report = Report::default();

    if opts.demo.pooling() {
        let seed = seed_info(&opts.pool, opts.pool_offset)?;
        log::info!("risk pooling using seed {} (base {}, offset {})", seed.seed, seed.base, seed.offset.0);
        let (chart, stats) = simulate_risk_pool_chart(&opts.pool, seed.seed, display_limit)?;
        report.pooling = Some(PoolingReport { seed, stats, chart });
    }

    if opts.demo.drivers() || opts.demo.premium() {
        let seed = seed_info(&opts.drivers, opts.driver_offset)?;
        log::info!("driver comparison using seed {} (base {}, offset {})", seed.seed, seed.base, seed.offset.0);
        let (chart, stats) = simulate_driver_comparison_chart(&opts.drivers, seed.seed)?;
        if opts.demo.premium() {
            report.premium = Some(compare_premiums(&stats, &config.loading)?);
        }
        report.drivers = Some(DriversReport { seed, stats, chart });
    }

    if opts.json {
        println!("{}", serde_json::to_string_pretty(&report).context("failed to serialise report")?);
        return Ok(());
    }

    if let Some(p) = &report.pooling {
        print_pooling(&opts.pool, p);
    }
    if let Some(d) = &report.drivers {
        if opts.demo.drivers() {
            print_drivers(d);
        }
        if let Some(premium) = &report.premium {
            print_premium(&d.stats, premium, &config.loading);
        }
    }
    Ok(())
}

fn parse_args(args: &[String], config: &DemoConfig) -> Result<Options> {
    let mut opts = Options {
        demo: Demo::All,
        pool: config.default_pool_params(),
        drivers: config.default_driver_params(config.full_cohort_size),
        compact: false,
        pool_offset: SeedOffset::default(),
        driver_offset: SeedOffset::default(),
        json: false,
    };
    let mut cohort_size: Option<usize> = None;
    let mut resimulate = false;

    let mut i = 1;
    while i < args.len() {
        let flag = args[i].as_str();
        match flag {
            "--demo" => opts.demo = Demo::parse(next_value(args, &mut i, flag)?)?,
            "--probability" => opts.pool.accident_probability = parse(flag, next_value(args, &mut i, flag)?)?,
            "--policyholders" => opts.pool.num_policyholders = parse(flag, next_value(args, &mut i, flag)?)?,
            "--base-frequency" => opts.drivers.base_frequency = parse(flag, next_value(args, &mut i, flag)?)?,
            "--base-severity" => opts.drivers.base_severity = parse(flag, next_value(args, &mut i, flag)?)?,
            "--freq-mult" => opts.drivers.freq_multiplier = parse(flag, next_value(args, &mut i, flag)?)?,
            "--sev-mult" => opts.drivers.severity_multiplier = parse(flag, next_value(args, &mut i, flag)?)?,
            "--cohort-size" => cohort_size = Some(parse(flag, next_value(args, &mut i, flag)?)?),
            "--offset" => {
                let offset = SeedOffset(parse(flag, next_value(args, &mut i, flag)?)?);
                opts.pool_offset = offset;
                opts.driver_offset = offset;
            }
            "--compact" => opts.compact = true,
            "--resimulate" => resimulate = true,
            "--json" => opts.json = true,
            other => bail!("unknown argument '{other}'"),
        }
        i += 1;
    }

    opts.drivers.cohort_size = cohort_size.unwrap_or_else(|| config.cohort_size(opts.compact));

    if resimulate {
        let mut rng = rand::rng();
        opts.pool_offset = SeedOffset::redraw(&mut rng);
        opts.driver_offset = SeedOffset::redraw(&mut rng);
        log::info!(
            "re-simulating with offsets pooling={} drivers={}",
            opts.pool_offset.0,
            opts.driver_offset.0
        );
    }
    Ok(opts)
}

fn next_value<'a>(args: &'a [String], i: &mut usize, flag: &str) -> Result<&'a str> {
    *i += 1;
    args.get(*i).map(String::as_str).with_context(|| format!("{flag} requires a value"))
}

fn parse<T: std::str::FromStr>(flag: &str, raw: &str) -> Result<T>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    raw.parse().with_context(|| format!("{flag}: cannot parse '{raw}'"))
}

fn seed_info(params: &impl SeedSource, offset: SeedOffset) -> Result<SeedInfo> {
    Ok(SeedInfo { seed: params.seed(offset)?, base: params.base_seed()?, offset })
}

/// Whole dollars with thousands separators, e.g. `$12,345`.
fn money(amount: f64) -> String {
    let rounded = amount.abs().round() as u64;
    let digits = rounded.to_string();
    let mut out = String::new();
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    if amount < 0.0 && rounded > 0 { format!("-${out}") } else { format!("${out}") }
}

fn print_pooling(params: &RiskPoolParams, report: &PoolingReport) {
    let s = &report.stats;
    let claim = money(params.claim_amount);
    println!(
        "\n=== Risk pooling (seed {}: base {}, offset {}) ===",
        report.seed.seed, report.seed.base, report.seed.offset.0
    );
    println!(
        "  Individual risk:   each of {} policyholders has a {:.1}% chance of a {claim} loss.",
        params.num_policyholders,
        params.accident_probability * 100.0
    );
    println!(
        "  Without insurance: {} people ({:.1}%) faced a {claim} loss.",
        s.num_with_loss, s.percent_with_loss
    );
    println!("  With insurance:    everyone pays a premium of {}.", money(s.fair_premium));
    let outcome = match s.outcome() {
        PoolOutcome::Surplus => "surplus",
        PoolOutcome::Deficit => "deficit",
    };
    println!(
        "  Pooled result:     collected {}, paid {} (actual/expected {:.2}, {outcome} {}).",
        money(s.pool_premium_total),
        money(s.total_losses),
        s.pool_performance,
        money(s.surplus().abs())
    );
    println!("  99% loss ceiling:  {}", money(params.loss_ceiling_99()));
}

fn print_drivers(report: &DriversReport) {
    let s = &report.stats;
    println!(
        "\n=== Driver comparison (seed {}: base {}, offset {}, {} drivers per cohort) ===",
        report.seed.seed, report.seed.base, report.seed.offset.0, s.first.size
    );
    for c in [&s.first, &s.second] {
        println!(
            "  {:<13}  {:>5.1}% accident rate, {:>8} average claim, {:>6} expected cost per driver",
            c.id.to_string(),
            c.mean_frequency * 100.0,
            money(c.mean_severity),
            money(c.expected_loss_per_driver())
        );
    }
    println!(
        "  The second cohort has {:.1}x the accident frequency and {:.1}x the claim cost,",
        s.freq_multiplier, s.severity_multiplier
    );
    println!("  generating {:.1}x the expected losses.", s.loss_multiplier);
}

fn print_premium(stats: &DriverComparisonStats, cmp: &PremiumComparison, ratios: &LoadingRatios) {
    println!("\n=== Premium calculation ===");
    println!(
        "{:>13} | {:>13} | {:>9} | {:>11} | {:>9} | {:>7}",
        "Cohort", "Expected loss", "Expenses", "Risk margin", "Premium", "Loading"
    );
    println!("{}", "-".repeat(13 + 3 + 13 + 3 + 9 + 3 + 11 + 3 + 9 + 3 + 7));
    let row = |name: String, c: &PremiumComponents| {
        println!(
            "{:>13} | {:>13.2} | {:>9.2} | {:>11.2} | {:>9.2} | {:>6.2}x",
            name, c.expected_loss, c.expenses, c.risk_margin, c.premium, c.loading_factor
        );
    };
    row(stats.first.id.to_string(), &cmp.first);
    row(stats.second.id.to_string(), &cmp.second);
    println!(
        "  Premium = expected loss / (1 - {:.0}% expenses - {:.0}% risk margin).",
        ratios.expense_ratio * 100.0,
        ratios.risk_margin_ratio * 100.0
    );
    println!("  The second cohort pays {:.1}x the first cohort's premium.", cmp.premium_ratio);
}
