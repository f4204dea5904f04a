use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use rust_xlsxwriter::{Workbook, Worksheet};
use serde::Serialize;

use crate::history::SeasonReport;
use crate::matches::AnnotatedMatch;
use crate::scoring::Metrics;
use crate::season::SeasonLikelihoods;

pub struct ExportReport {
    pub seasons: usize,
    pub matches: usize,
    pub failed: usize,
}

enum Cell {
    Text(String),
    Number(f64),
}

impl From<&str> for Cell {
    fn from(value: &str) -> Self {
        Cell::Text(value.to_string())
    }
}

impl From<String> for Cell {
    fn from(value: String) -> Self {
        Cell::Text(value)
    }
}

impl From<f64> for Cell {
    fn from(value: f64) -> Self {
        Cell::Number(value)
    }
}

impl From<u32> for Cell {
    fn from(value: u32) -> Self {
        Cell::Number(value as f64)
    }
}

pub fn render_table(reports: &[SeasonReport]) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<12} {:>7} {:>11} {:>11} {:>11} {:>11} {:>9} {:>9}",
        "season", "matches", "bookmaker", "model", "random", "optimal", "brier_m", "brier_b"
    );
    for r in reports {
        match &r.outcome {
            Ok(eval) => {
                let ll = eval.likelihoods;
                let _ = writeln!(
                    out,
                    "{:<12} {:>7} {:>11.3} {:>11.3} {:>11.3} {:>11.3} {:>9.4} {:>9.4}",
                    r.key.to_string(),
                    eval.matches.len(),
                    ll.bookmaker,
                    ll.model,
                    ll.random,
                    ll.optimal,
                    eval.model_metrics.brier,
                    eval.bookmaker_metrics.brier
                );
            }
            Err(err) => {
                let _ = writeln!(out, "{:<12} failed: {err:#}", r.key.to_string());
            }
        }
    }
    out
}

#[derive(Serialize)]
struct SummaryFile {
    generated_at: String,
    seasons: Vec<SeasonSummary>,
}

#[derive(Serialize)]
struct SeasonSummary {
    season: String,
    division: String,
    end_year: u16,
    matches: Option<usize>,
    likelihoods: Option<SeasonLikelihoods>,
    model_metrics: Option<Metrics>,
    bookmaker_metrics: Option<Metrics>,
    error: Option<String>,
}

fn season_summary(r: &SeasonReport) -> SeasonSummary {
    let eval = r.evaluation();
    SeasonSummary {
        season: r.key.to_string(),
        division: r.key.division.clone(),
        end_year: r.key.end_year,
        matches: eval.map(|e| e.matches.len()),
        likelihoods: eval.map(|e| e.likelihoods),
        model_metrics: eval.map(|e| e.model_metrics),
        bookmaker_metrics: eval.map(|e| e.bookmaker_metrics),
        error: r.outcome.as_ref().err().map(|e| format!("{e:#}")),
    }
}

pub fn summary_json(reports: &[SeasonReport]) -> Result<String> {
    let file = SummaryFile {
        generated_at: chrono::Utc::now().to_rfc3339(),
        seasons: reports.iter().map(season_summary).collect(),
    };
    serde_json::to_string_pretty(&file).context("serialize season summary")
}

pub fn write_json_summary(path: &Path, reports: &[SeasonReport]) -> Result<()> {
    if let Some(parent) = path.parent() {
        let _ = fs::create_dir_all(parent);
    }
    let json = summary_json(reports)?;
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, json).with_context(|| format!("write {}", tmp.display()))?;
    fs::rename(&tmp, path).with_context(|| format!("swap {}", path.display()))?;
    Ok(())
}

/// One `Summary` sheet, opened first, plus a sheet of annotated matches per
/// evaluated season.
pub fn export_workbook(path: &Path, reports: &[SeasonReport]) -> Result<ExportReport> {
    let (sheets, exported) = workbook_sheets(reports)?;
    let mut workbook = Workbook::new();
    for sheet in sheets {
        workbook.push_worksheet(sheet);
    }
    workbook
        .save(path)
        .with_context(|| format!("failed writing workbook to {}", path.display()))?;
    Ok(exported)
}

fn workbook_sheets(reports: &[SeasonReport]) -> Result<(Vec<Worksheet>, ExportReport)> {
    let mut summary_rows: Vec<Vec<Cell>> = vec![
        [
            "Season",
            "Matches",
            "Bookmaker LL",
            "Model LL",
            "Random LL",
            "Optimal LL",
            "Model Brier",
            "Bookmaker Brier",
            "Model Accuracy",
            "Bookmaker Accuracy",
            "Error",
        ]
        .into_iter()
        .map(Cell::from)
        .collect(),
    ];

    let mut season_sheets = Vec::new();
    let mut matches = 0usize;
    let mut failed = 0usize;

    for r in reports {
        let Some(eval) = r.evaluation() else {
            failed += 1;
            let err = r
                .outcome
                .as_ref()
                .err()
                .map(|e| format!("{e:#}"))
                .unwrap_or_default();
            let mut row: Vec<Cell> = vec![r.key.to_string().into()];
            row.extend((0..9).map(|_| Cell::from("")));
            row.push(err.into());
            summary_rows.push(row);
            continue;
        };

        let ll = eval.likelihoods;
        summary_rows.push(vec![
            r.key.to_string().into(),
            (eval.matches.len() as f64).into(),
            ll.bookmaker.into(),
            ll.model.into(),
            ll.random.into(),
            ll.optimal.into(),
            eval.model_metrics.brier.into(),
            eval.bookmaker_metrics.brier.into(),
            eval.model_metrics.accuracy.into(),
            eval.bookmaker_metrics.accuracy.into(),
            "".into(),
        ]);

        matches += eval.matches.len();
        let mut sheet = Worksheet::new();
        sheet.set_name(format!("{} {}", r.key.division, r.key.short_code()))?;
        write_rows(&mut sheet, &match_rows(&eval.matches))?;
        season_sheets.push(sheet);
    }

    let mut summary = Worksheet::new();
    summary.set_name("Summary")?;
    write_rows(&mut summary, &summary_rows)?;

    let mut sheets = Vec::with_capacity(season_sheets.len() + 1);
    sheets.push(summary);
    sheets.extend(season_sheets);

    Ok((
        sheets,
        ExportReport {
            seasons: reports.len() - failed,
            matches,
            failed,
        },
    ))
}

fn match_rows(matches: &[AnnotatedMatch]) -> Vec<Vec<Cell>> {
    let header = [
        "HomeTeam", "AwayTeam", "FTHG", "FTAG", "FTR", "BbAvH", "BbAvD", "BbAvA", "modelH",
        "modelD", "modelA", "probH", "probD", "probA",
    ];
    let mut rows = vec![header.into_iter().map(Cell::from).collect::<Vec<_>>()];
    for m in matches {
        let r = &m.record;
        rows.push(vec![
            r.home_team.clone().into(),
            r.away_team.clone().into(),
            r.home_goals.into(),
            r.away_goals.into(),
            r.result.code().into(),
            r.odds_home.into(),
            r.odds_draw.into(),
            r.odds_away.into(),
            m.model.home.into(),
            m.model.draw.into(),
            m.model.away.into(),
            m.implied.home.into(),
            m.implied.draw.into(),
            m.implied.away.into(),
        ]);
    }
    rows
}

fn write_rows(worksheet: &mut Worksheet, rows: &[Vec<Cell>]) -> Result<()> {
    for (row_idx, row) in rows.iter().enumerate() {
        for (col_idx, value) in row.iter().enumerate() {
            let (r, c) = (row_idx as u32, col_idx as u16);
            let written = match value {
                Cell::Text(text) => worksheet.write_string(r, c, text),
                Cell::Number(n) => worksheet.write_number(r, c, *n),
            };
            written.with_context(|| format!("write cell ({row_idx},{col_idx})"))?;
        }
    }
    Ok(())
}
