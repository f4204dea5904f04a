use std::collections::{BTreeMap, BTreeSet, HashMap};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::ModelError;
use crate::matches::MatchRecord;

/// Goals scored and conceded by a team over one season's worth of matches.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TeamStrength {
    pub scored: f64,
    pub lost: f64,
}

/// Roughly what a promoted side manages in its first top-flight season.
pub const PROMOTED_DEFAULT: TeamStrength = TeamStrength {
    scored: 40.0,
    lost: 60.0,
};

/// Matches each team plays in a double round robin.
pub fn rounds_for(num_teams: usize) -> Result<f64, ModelError> {
    if num_teams < 2 {
        return Err(ModelError::TooFewTeams { teams: num_teams });
    }
    Ok(2.0 * (num_teams as f64 - 1.0))
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StrengthTable {
    teams: BTreeMap<String, TeamStrength>,
}

impl StrengthTable {
    /// Seeds every team of the current season with its previous-season goal
    /// totals, or with `promoted` when it did not play in that season.
    pub fn initialize(
        current: &[MatchRecord],
        previous: &[MatchRecord],
        promoted: TeamStrength,
    ) -> Self {
        let mut totals: HashMap<&str, TeamStrength> = HashMap::new();
        for m in previous {
            let home = totals.entry(m.home_team.as_str()).or_insert(TeamStrength {
                scored: 0.0,
                lost: 0.0,
            });
            home.scored += m.home_goals as f64;
            home.lost += m.away_goals as f64;

            let away = totals.entry(m.away_team.as_str()).or_insert(TeamStrength {
                scored: 0.0,
                lost: 0.0,
            });
            away.scored += m.away_goals as f64;
            away.lost += m.home_goals as f64;
        }

        let names: BTreeSet<&str> = current
            .iter()
            .flat_map(|m| [m.home_team.as_str(), m.away_team.as_str()])
            .collect();

        let mut teams = BTreeMap::new();
        let mut promoted_count = 0usize;
        for name in names {
            let strength = match totals.get(name) {
                Some(s) => *s,
                None => {
                    warn!(team = name, "no previous-season record, using promoted default");
                    promoted_count += 1;
                    promoted
                }
            };
            teams.insert(name.to_string(), strength);
        }
        debug!(
            teams = teams.len(),
            promoted = promoted_count,
            "initialized strength table"
        );

        Self { teams }
    }

    pub fn from_entries<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = (S, TeamStrength)>,
        S: Into<String>,
    {
        Self {
            teams: entries.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }

    pub fn get(&self, team: &str) -> Result<TeamStrength, ModelError> {
        self.teams
            .get(team)
            .copied()
            .ok_or_else(|| ModelError::MissingTeam {
                team: team.to_string(),
            })
    }

    pub fn len(&self) -> usize {
        self.teams.len()
    }

    pub fn is_empty(&self) -> bool {
        self.teams.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, TeamStrength)> {
        self.teams.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn rounds(&self) -> Result<f64, ModelError> {
        rounds_for(self.len())
    }

    /// Folds one result into both teams' records.
    ///
    /// Each component decays by `weight / rounds` and gains `weight` times
    /// the observed goals, so a single match moves the per-game average
    /// `weight / rounds` of the way toward that match's figure. This is an
    /// exponential moving average, not an exact sliding window.
    ///
    /// `weight` must lie in `(0, rounds)`; otherwise the decay is not positive
    /// and records could turn negative, so the table is left untouched.
    pub fn update(
        &mut self,
        home: &str,
        away: &str,
        home_goals: u32,
        away_goals: u32,
        rounds: f64,
        weight: f64,
    ) -> Result<(), ModelError> {
        if !(weight.is_finite() && weight > 0.0 && weight < rounds) {
            return Err(ModelError::InvalidWeight { weight, rounds });
        }
        let old_home = self.get(home)?;
        let old_away = self.get(away)?;
        let decay = (rounds - weight) / rounds;
        let (hg, ag) = (home_goals as f64, away_goals as f64);

        let new_home = TeamStrength {
            scored: decay * old_home.scored + weight * hg,
            lost: decay * old_home.lost + weight * ag,
        };
        let new_away = TeamStrength {
            scored: decay * old_away.scored + weight * ag,
            lost: decay * old_away.lost + weight * hg,
        };
        self.teams.insert(home.to_string(), new_home);
        self.teams.insert(away.to_string(), new_away);
        Ok(())
    }
}
