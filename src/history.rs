use anyhow::{Context, Result, anyhow};
use rayon::prelude::*;
use tracing::{debug, warn};

use crate::config::ModelConfig;
use crate::season::{SeasonEvaluation, evaluate_season_detailed};
use crate::season_source::{SeasonKey, SeasonSource};

#[derive(Debug)]
pub struct SeasonReport {
    pub key: SeasonKey,
    pub outcome: Result<SeasonEvaluation>,
}

impl SeasonReport {
    pub fn evaluation(&self) -> Option<&SeasonEvaluation> {
        self.outcome.as_ref().ok()
    }
}

/// Loads a season and the one before it, then evaluates the season against a
/// freshly seeded strength table.
pub fn evaluate_season_key<S>(
    source: &S,
    key: &SeasonKey,
    config: &ModelConfig,
) -> Result<SeasonEvaluation>
where
    S: SeasonSource + ?Sized,
{
    let previous_key = key
        .previous()
        .ok_or_else(|| anyhow!("season {key} has no predecessor"))?;
    let current = source.load(key)?;
    let previous = source.load(&previous_key)?;
    debug!(
        season = %key,
        matches = current.len(),
        previous_matches = previous.len(),
        "evaluating season"
    );
    evaluate_season_detailed(&current, &previous, config)
        .with_context(|| format!("evaluate season {key}"))
}

/// Evaluates each listed season of `division`. Seasons are independent and run
/// in parallel; one failing season does not stop the others. Reports come back
/// in season order.
pub fn evaluate_seasons<S>(
    source: &S,
    division: &str,
    end_years: &[u16],
    config: &ModelConfig,
) -> Vec<SeasonReport>
where
    S: SeasonSource + ?Sized,
{
    let mut reports: Vec<SeasonReport> = end_years
        .par_iter()
        .map(|&end_year| {
            let key = SeasonKey::new(division, end_year);
            let outcome = evaluate_season_key(source, &key, config);
            if let Err(err) = &outcome {
                let reason = format!("{err:#}");
                warn!(season = %key, error = %reason, "season evaluation failed");
            }
            SeasonReport { key, outcome }
        })
        .collect();
    reports.sort_by(|a, b| a.key.cmp(&b.key));
    reports
}
