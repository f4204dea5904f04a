use serde::Serialize;
use tracing::debug;

use crate::config::ModelConfig;
use crate::distribution::{
    expected_goals, implied_probabilities, max_likelihood_outcome_probability,
    outcome_probabilities,
};
use crate::error::{EvalError, ModelError, Predictor};
use crate::matches::{AnnotatedMatch, MatchRecord, Outcome};
use crate::scoring::{self, Metrics};
use crate::team_strength::{StrengthTable, rounds_for};

/// Season totals of `ln(p)` for the observed result, per predictor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SeasonLikelihoods {
    pub bookmaker: f64,
    pub model: f64,
    pub random: f64,
    pub optimal: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct SeasonEvaluation {
    pub likelihoods: SeasonLikelihoods,
    pub matches: Vec<AnnotatedMatch>,
    pub final_table: StrengthTable,
    pub model_metrics: Metrics,
    pub bookmaker_metrics: Metrics,
}

/// Walks the season in order, pricing each match from the table as it stood
/// before kick-off and then folding the result into the table.
pub fn annotate(
    matches: &[MatchRecord],
    mut table: StrengthTable,
    config: &ModelConfig,
) -> Result<(Vec<AnnotatedMatch>, StrengthTable), EvalError> {
    let rounds = table.rounds()?;
    let mut out = Vec::with_capacity(matches.len());

    for (index, m) in matches.iter().enumerate() {
        let annotated = annotate_one(m, &mut table, rounds, config)
            .map_err(|source| match_error(index, m, source))?;
        out.push(annotated);
    }

    Ok((out, table))
}

fn annotate_one(
    m: &MatchRecord,
    table: &mut StrengthTable,
    rounds: f64,
    config: &ModelConfig,
) -> Result<AnnotatedMatch, ModelError> {
    let home = table.get(&m.home_team)?;
    let away = table.get(&m.away_team)?;
    let (lambda_home, lambda_away) =
        expected_goals(home.scored, home.lost, away.scored, away.lost, rounds)?;
    let model = outcome_probabilities(lambda_home, lambda_away, config.poisson_depth)?;
    let implied = implied_probabilities(m.odds())?;

    table.update(
        &m.home_team,
        &m.away_team,
        m.home_goals,
        m.away_goals,
        rounds,
        config.update_weight,
    )?;

    Ok(AnnotatedMatch {
        record: m.clone(),
        model,
        implied,
    })
}

/// `(bookmaker, model)` log-likelihood sums over positions `0..=limit`, or the
/// whole season when `limit` is `None`.
pub fn log_likelihood_sum(
    annotated: &[AnnotatedMatch],
    limit: Option<usize>,
) -> Result<(f64, f64), EvalError> {
    let mut bookmaker = 0.0_f64;
    let mut model = 0.0_f64;

    for (index, m) in annotated.iter().take(take_count(limit)).enumerate() {
        let outcome = m.record.result;
        let step = log_prob(m.implied.get(outcome), Predictor::Bookmaker, outcome).and_then(
            |b| log_prob(m.model.get(outcome), Predictor::Model, outcome).map(|md| (b, md)),
        );
        let (b, md) = step.map_err(|source| match_error(index, &m.record, source))?;
        bookmaker += b;
        model += md;
    }

    Ok((bookmaker, model))
}

/// Closed-form log-likelihood of pricing every outcome at 1/3, over
/// `0.5 * rounds * (rounds / 2 + 1)` games.
pub fn random_baseline_log_likelihood(num_teams: usize) -> Result<f64, ModelError> {
    let rounds = rounds_for(num_teams)?;
    let games = 0.5 * rounds * (rounds / 2.0 + 1.0);
    Ok(games * (1.0_f64 / 3.0).ln())
}

/// Log-likelihood when every match is priced with its own final score as the
/// Poisson rates.
pub fn optimal_baseline_log_likelihood(
    matches: &[MatchRecord],
    limit: Option<usize>,
    depth: usize,
) -> Result<f64, EvalError> {
    let mut total = 0.0_f64;
    for (index, m) in matches.iter().take(take_count(limit)).enumerate() {
        let ll = max_likelihood_outcome_probability(m.home_goals, m.away_goals, depth)
            .and_then(|p| log_prob(p, Predictor::Optimal, m.score_outcome()))
            .map_err(|source| match_error(index, m, source))?;
        total += ll;
    }
    Ok(total)
}

pub fn evaluate_season(
    current: &[MatchRecord],
    previous: &[MatchRecord],
    config: &ModelConfig,
) -> Result<SeasonLikelihoods, EvalError> {
    evaluate_season_detailed(current, previous, config).map(|e| e.likelihoods)
}

pub fn evaluate_season_detailed(
    current: &[MatchRecord],
    previous: &[MatchRecord],
    config: &ModelConfig,
) -> Result<SeasonEvaluation, EvalError> {
    let table = StrengthTable::initialize(current, previous, config.promoted_strength);
    let num_teams = table.len();
    let (matches, final_table) = annotate(current, table, config)?;

    let (bookmaker, model) = log_likelihood_sum(&matches, None)?;
    let random = random_baseline_log_likelihood(num_teams)?;
    let optimal = optimal_baseline_log_likelihood(current, None, config.poisson_depth)?;

    let outcomes: Vec<Outcome> = matches.iter().map(|m| m.record.result).collect();
    let model_probs: Vec<_> = matches.iter().map(|m| m.model).collect();
    let implied_probs: Vec<_> = matches.iter().map(|m| m.implied).collect();

    debug!(
        matches = matches.len(),
        teams = num_teams,
        bookmaker,
        model,
        "season evaluated"
    );

    Ok(SeasonEvaluation {
        likelihoods: SeasonLikelihoods {
            bookmaker,
            model,
            random,
            optimal,
        },
        model_metrics: scoring::evaluate_probs(&model_probs, &outcomes),
        bookmaker_metrics: scoring::evaluate_probs(&implied_probs, &outcomes),
        matches,
        final_table,
    })
}

fn take_count(limit: Option<usize>) -> usize {
    limit.map_or(usize::MAX, |l| l.saturating_add(1))
}

fn log_prob(p: f64, predictor: Predictor, outcome: Outcome) -> Result<f64, ModelError> {
    if p > 0.0 {
        Ok(p.ln())
    } else {
        Err(ModelError::ZeroProbability { predictor, outcome })
    }
}

fn match_error(index: usize, m: &MatchRecord, source: ModelError) -> EvalError {
    EvalError::Match {
        index,
        home: m.home_team.clone(),
        away: m.away_team.clone(),
        source,
    }
}
