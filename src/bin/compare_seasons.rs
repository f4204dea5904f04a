use std::path::PathBuf;

use anyhow::{Result, anyhow};
use tracing::info;

use poisson_odds::config::ModelConfig;
use poisson_odds::history::{self, SeasonReport};
use poisson_odds::report;
use poisson_odds::season::{log_likelihood_sum, optimal_baseline_log_likelihood};
use poisson_odds::season_source::JsonDirSource;

const DEFAULT_DATA_DIR: &str = "hist_data";
const DEFAULT_DIVISION: &str = "E0";
const DEFAULT_FROM: u16 = 2006;
const DEFAULT_TO: u16 = 2017;

fn main() -> Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let data_dir = parse_str_arg("--data-dir")
        .or_else(|| std::env::var("SEASON_DATA_DIR").ok())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR));
    let division = parse_str_arg("--division")
        .or_else(|| std::env::var("SEASON_DIVISION").ok())
        .unwrap_or_else(|| DEFAULT_DIVISION.to_string());
    let from = parse_u16_arg("--from").unwrap_or(DEFAULT_FROM);
    let to = parse_u16_arg("--to").unwrap_or(DEFAULT_TO);
    if from > to {
        return Err(anyhow!("--from {from} is after --to {to}"));
    }
    let limit = parse_str_arg("--limit").and_then(|v| v.trim().parse::<usize>().ok());

    let config = ModelConfig::from_env();
    info!(
        data_dir = %data_dir.display(),
        division = %division,
        from,
        to,
        depth = config.poisson_depth,
        "comparing seasons"
    );

    let source = JsonDirSource::new(&data_dir);
    let years: Vec<u16> = (from..=to).collect();
    let reports = history::evaluate_seasons(&source, &division, &years, &config);

    println!("Poisson model vs bookmaker, {division} seasons");
    println!("Data: {}", data_dir.display());
    println!();
    print!("{}", report::render_table(&reports));

    if let Some(limit) = limit {
        println!();
        print_partial(&reports, limit, config.poisson_depth);
    }

    if let Some(path) = parse_str_arg("--json").map(PathBuf::from) {
        report::write_json_summary(&path, &reports)?;
        println!("JSON summary: {}", path.display());
    }
    if let Some(path) = parse_str_arg("--xlsx").map(PathBuf::from) {
        let exported = report::export_workbook(&path, &reports)?;
        println!(
            "Workbook: {} (seasons={} matches={} failed={})",
            path.display(),
            exported.seasons,
            exported.matches,
            exported.failed
        );
    }

    if reports.iter().all(|r| r.outcome.is_err()) {
        return Err(anyhow!("no season could be evaluated"));
    }
    Ok(())
}

fn print_partial(reports: &[SeasonReport], limit: usize, depth: usize) {
    println!("First {} matches:", limit + 1);
    for r in reports {
        let Some(eval) = r.evaluation() else {
            continue;
        };
        let records: Vec<_> = eval.matches.iter().map(|m| m.record.clone()).collect();
        let partial = log_likelihood_sum(&eval.matches, Some(limit)).and_then(|(b, m)| {
            optimal_baseline_log_likelihood(&records, Some(limit), depth).map(|o| (b, m, o))
        });
        match partial {
            Ok((bookmaker, model, optimal)) => println!(
                "{:<12} bookmaker={:.3} model={:.3} optimal={:.3}",
                r.key.to_string(),
                bookmaker,
                model,
                optimal
            ),
            Err(err) => println!("{:<12} failed: {err}", r.key.to_string()),
        }
    }
}

fn parse_str_arg(flag: &str) -> Option<String> {
    let args = std::env::args().skip(1).collect::<Vec<_>>();
    let prefix = format!("{flag}=");
    for (idx, arg) in args.iter().enumerate() {
        if let Some(raw) = arg.strip_prefix(&prefix) {
            let trimmed = raw.trim();
            if !trimmed.is_empty() {
                return Some(trimmed.to_string());
            }
        }
        if arg == flag {
            let Some(next) = args.get(idx + 1) else {
                continue;
            };
            if !next.trim().is_empty() {
                return Some(next.trim().to_string());
            }
        }
    }
    None
}

fn parse_u16_arg(flag: &str) -> Option<u16> {
    parse_str_arg(flag).and_then(|v| v.parse::<u16>().ok())
}
