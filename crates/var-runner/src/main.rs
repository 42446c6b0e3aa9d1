//! var-runner: backtest the full VaR model family over one or more
//! portfolios and write the comparison reports.
//!
//! Usage:
//!   cargo run -p var-runner                              # built-in demo data
//!   cargo run -p var-runner -- --data prices.csv --portfolio CAC40
//!   cargo run -p var-runner -- --alphas 0.01,0.05 --out reports
//!   cargo run -p var-runner -- --seed 7 --days 1000      # demo path controls

use std::path::Path;

use anyhow::Context;
use chrono::NaiveDate;
use rand::rngs::StdRng;
use rand::SeedableRng;
use risk_core::{
    BacktestConfig, DatedSeries, RegimeThresholds, RegimeVarConfig, SignalConfig, VarEstimate,
};
use statrs::distribution::Normal;
use var_backtest::{rank_records, run_backtests, winners_from_ranked, BacktestRequest};
use var_models::{
    build_signal_index, classify_regimes, ewma_var, geopolitical_var, historical_var,
    monte_carlo_var, parametric_var, quantile_regression_var, Garch11,
};

const EWMA_LAMBDA: f64 = 0.94;
const GARCH_ARCH: f64 = 0.08;
const GARCH_GARCH: f64 = 0.90;
const QR_WINDOW: usize = 30;
const DEFAULT_SIMULATIONS: usize = 100_000;
const DEFAULT_DEMO_DAYS: usize = 750;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "var_runner=info,var_backtest=info".into()),
        )
        .init();

    let args: Vec<String> = std::env::args().collect();
    let flag_value = |name: &str| {
        args.iter()
            .position(|a| a == name)
            .and_then(|i| args.get(i + 1))
            .map(|s| s.as_str())
    };

    let alphas: Vec<f64> = flag_value("--alphas")
        .unwrap_or("0.01,0.05")
        .split(',')
        .map(|s| s.trim().parse::<f64>().context("invalid alpha"))
        .collect::<anyhow::Result<_>>()?;
    let out_dir = flag_value("--out").unwrap_or("reports").to_string();
    let simulations: usize = flag_value("--simulations")
        .map(|v| v.parse())
        .transpose()
        .context("invalid --simulations")?
        .unwrap_or(DEFAULT_SIMULATIONS);
    let seed: u64 = flag_value("--seed")
        .map(|v| v.parse())
        .transpose()
        .context("invalid --seed")?
        .unwrap_or(42);
    let demo_days: usize = flag_value("--days")
        .map(|v| v.parse())
        .transpose()
        .context("invalid --days")?
        .unwrap_or(DEFAULT_DEMO_DAYS);

    let portfolios: Vec<(String, DatedSeries)> = if let Some(path) = flag_value("--data") {
        let name = flag_value("--portfolio")
            .map(|s| s.to_string())
            .or_else(|| {
                Path::new(path)
                    .file_stem()
                    .map(|s| s.to_string_lossy().into_owned())
            })
            .unwrap_or_else(|| "portfolio".to_string());
        let prices = load_prices_csv(path)?;
        let returns = DatedSeries::returns_from_prices(&prices)?;
        vec![(name, returns)]
    } else {
        tracing::info!(seed, days = demo_days, "no --data given, using demo portfolios");
        demo_portfolios(seed, demo_days)?
    };

    let backtest_config = BacktestConfig::default();
    let signal_config = SignalConfig::default();
    let thresholds = RegimeThresholds::default();
    let regime_var_config = RegimeVarConfig::default();

    let mut requests: Vec<BacktestRequest> = Vec::new();
    for (name, returns) in &portfolios {
        tracing::info!(portfolio = %name, days = returns.len(), "building model estimates");

        let signal = build_signal_index(returns, &signal_config)?;
        let regimes = classify_regimes(
            &returns.values,
            &signal.values,
            &thresholds,
            signal_config.vol_window,
        )?;

        for &alpha in &alphas {
            let garch = Garch11::fit(&returns.values, GARCH_ARCH, GARCH_GARCH)?;
            let estimates: Vec<(&str, VarEstimate)> = vec![
                (
                    "HS",
                    VarEstimate::Scalar(historical_var(&returns.values, alpha)?),
                ),
                (
                    "VC",
                    VarEstimate::Scalar(parametric_var(&returns.values, alpha)?),
                ),
                (
                    "VC_EWMA",
                    VarEstimate::Series(ewma_var(returns, alpha, EWMA_LAMBDA)?),
                ),
                (
                    "GARCH",
                    VarEstimate::Series(garch.var_series(returns, alpha)?),
                ),
                (
                    "MC-Normal",
                    VarEstimate::Scalar(monte_carlo_var(&returns.values, alpha, simulations)?),
                ),
                (
                    "QR",
                    VarEstimate::Series(quantile_regression_var(returns, alpha, QR_WINDOW)?),
                ),
                (
                    "VaR-Geo",
                    VarEstimate::Series(geopolitical_var(
                        returns,
                        &signal,
                        &regimes,
                        alpha,
                        &regime_var_config,
                    )?),
                ),
            ];

            for (model, var) in estimates {
                requests.push(BacktestRequest {
                    portfolio: name.clone(),
                    alpha,
                    model: model.to_string(),
                    returns: returns.clone(),
                    var,
                });
            }
        }
    }

    let outcome = run_backtests(&requests, &backtest_config);
    let ranked = rank_records(outcome.records.clone());
    let winners = winners_from_ranked(&ranked);

    print!(
        "{}",
        report_gen::render_comparison(&ranked, backtest_config.significance)
    );

    std::fs::create_dir_all(&out_dir)
        .with_context(|| format!("cannot create output directory {out_dir}"))?;
    let out = Path::new(&out_dir);
    std::fs::write(out.join("ranked.csv"), report_gen::ranked_csv(&ranked))?;
    std::fs::write(out.join("winners.csv"), report_gen::winners_csv(&winners))?;
    let as_of = chrono::Utc::now().date_naive();
    std::fs::write(
        out.join("REPORT.md"),
        report_gen::render_report(&ranked, &winners, &outcome.failures, as_of),
    )?;
    let summary = report_gen::run_summary(&outcome, &winners);
    std::fs::write(
        out.join("summary.json"),
        serde_json::to_string_pretty(&summary)?,
    )?;

    tracing::info!(
        out_dir = %out_dir,
        tuples = requests.len(),
        winners = winners.len(),
        "reports written"
    );
    Ok(())
}

/// Read a `date,price` CSV (ISO dates, optional header).
fn load_prices_csv(path: &str) -> anyhow::Result<DatedSeries> {
    let text = std::fs::read_to_string(path).with_context(|| format!("cannot read {path}"))?;
    let mut dates = Vec::new();
    let mut values = Vec::new();
    for (lineno, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let mut parts = line.splitn(2, ',');
        let (date_field, price_field) = (
            parts.next().unwrap_or_default().trim(),
            parts.next().unwrap_or_default().trim(),
        );
        let date = match NaiveDate::parse_from_str(date_field, "%Y-%m-%d") {
            Ok(d) => d,
            // Header row.
            Err(_) if lineno == 0 => continue,
            Err(e) => anyhow::bail!("{path}:{}: invalid date {date_field:?}: {e}", lineno + 1),
        };
        let price: f64 = price_field
            .parse()
            .with_context(|| format!("{path}:{}: invalid price {price_field:?}", lineno + 1))?;
        dates.push(date);
        values.push(price);
    }
    Ok(DatedSeries::new(dates, values)?)
}

/// Two reproducible demo price paths: one broadly calm index and one with a
/// stressed middle stretch, so the regime machinery has something to find.
fn demo_portfolios(seed: u64, days: usize) -> anyhow::Result<Vec<(String, DatedSeries)>> {
    let calm = synthesize_prices("EUROPE_LARGE", seed, days, &[(0, 0.0003, 0.009)])?;
    let stressed = synthesize_prices(
        "GLOBAL_MIX",
        seed.wrapping_add(1),
        days,
        &[
            (0, 0.0004, 0.008),
            (days / 3, -0.0010, 0.028),
            (days / 2, 0.0004, 0.010),
        ],
    )?;
    Ok(vec![calm, stressed])
}

/// Geometric path with piecewise-constant drift/vol segments, keyed by the
/// segment's starting index.
fn synthesize_prices(
    name: &str,
    seed: u64,
    days: usize,
    segments: &[(usize, f64, f64)],
) -> anyhow::Result<(String, DatedSeries)> {
    use rand::distributions::Distribution;

    let mut rng = StdRng::seed_from_u64(seed);
    let start = NaiveDate::from_ymd_opt(2022, 1, 3).context("invalid start date")?;

    let mut price = 100.0f64;
    let mut dates = Vec::with_capacity(days);
    let mut values = Vec::with_capacity(days);
    for i in 0..days {
        let (_, drift, vol) = segments
            .iter()
            .rev()
            .find(|(from, _, _)| i >= *from)
            .copied()
            .unwrap_or((0, 0.0, 0.01));
        let normal = Normal::new(drift, vol)
            .map_err(|e| anyhow::anyhow!("invalid demo segment parameters: {e}"))?;
        price *= 1.0 + normal.sample(&mut rng);
        dates.push(start + chrono::Duration::days(i as i64));
        values.push(price);
    }

    let prices = DatedSeries::new(dates, values)?;
    let returns = DatedSeries::returns_from_prices(&prices)?;
    Ok((name.to_string(), returns))
}
