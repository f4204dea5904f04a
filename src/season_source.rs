use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use serde::Serialize;
use tracing::warn;

use crate::matches::MatchRecord;

/// A division's season, identified by the calendar year it ends in.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct SeasonKey {
    pub division: String,
    pub end_year: u16,
}

impl SeasonKey {
    pub fn new(division: impl Into<String>, end_year: u16) -> Self {
        Self {
            division: division.into(),
            end_year,
        }
    }

    pub fn previous(&self) -> Option<Self> {
        let end_year = self.end_year.checked_sub(1)?;
        Some(Self::new(self.division.clone(), end_year))
    }

    /// `0607` for the season ending in 2007.
    pub fn short_code(&self) -> String {
        let start = self.end_year.saturating_sub(1) % 100;
        format!("{:02}{:02}", start, self.end_year % 100)
    }
}

impl fmt::Display for SeasonKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {}/{:02}",
            self.division,
            self.end_year.saturating_sub(1),
            self.end_year % 100
        )
    }
}

/// Supplies the chronologically ordered match list of one season.
pub trait SeasonSource: Send + Sync {
    fn load(&self, key: &SeasonKey) -> Result<Vec<MatchRecord>>;
}

/// Reads `<root>/<division>/<yyyy>.json`, e.g. `hist_data/E0/0607.json`.
#[derive(Debug, Clone)]
pub struct JsonDirSource {
    root: PathBuf,
}

impl JsonDirSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn season_path(&self, key: &SeasonKey) -> PathBuf {
        self.root
            .join(&key.division)
            .join(format!("{}.json", key.short_code()))
    }
}

impl SeasonSource for JsonDirSource {
    fn load(&self, key: &SeasonKey) -> Result<Vec<MatchRecord>> {
        let path = self.season_path(key);
        let matches = read_season_file(&path).with_context(|| format!("load season {key}"))?;
        warn_result_mismatches(key, &matches);
        Ok(matches)
    }
}

/// Seasons held in memory, for callers that already have the match lists.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    seasons: HashMap<SeasonKey, Vec<MatchRecord>>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: SeasonKey, matches: Vec<MatchRecord>) {
        self.seasons.insert(key, matches);
    }
}

impl SeasonSource for MemorySource {
    fn load(&self, key: &SeasonKey) -> Result<Vec<MatchRecord>> {
        self.seasons
            .get(key)
            .cloned()
            .ok_or_else(|| anyhow!("season {key} not available"))
    }
}

pub fn read_season_file(path: &Path) -> Result<Vec<MatchRecord>> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("read season file {}", path.display()))?;
    parse_season_json(&raw).with_context(|| format!("parse season file {}", path.display()))
}

/// Parses a JSON array of match rows. `null` or blank input is an empty season.
pub fn parse_season_json(raw: &str) -> Result<Vec<MatchRecord>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "null" {
        return Ok(Vec::new());
    }
    serde_json::from_str::<Vec<MatchRecord>>(trimmed).context("invalid season json")
}

// FTR stays authoritative for scoring; a disagreeing score is only flagged.
fn warn_result_mismatches(key: &SeasonKey, matches: &[MatchRecord]) {
    for (index, m) in matches.iter().enumerate() {
        if m.result != m.score_outcome() {
            warn!(
                season = %key,
                index,
                home = %m.home_team,
                away = %m.away_team,
                ftr = m.result.code(),
                "result code disagrees with final score"
            );
        }
    }
}
