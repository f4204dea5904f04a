use thiserror::Error;

use crate::matches::Outcome;

/// Which probability set a log-likelihood was being taken over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Predictor {
    Bookmaker,
    Model,
    Optimal,
}

impl std::fmt::Display for Predictor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Predictor::Bookmaker => "bookmaker",
            Predictor::Model => "model",
            Predictor::Optimal => "optimal",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum ModelError {
    #[error("invalid scoring rate for {context}: {value}")]
    InvalidRate { context: &'static str, value: f64 },

    #[error("{predictor} assigned zero probability to observed outcome {outcome:?}")]
    ZeroProbability {
        predictor: Predictor,
        outcome: Outcome,
    },

    #[error("team {team} has no strength record")]
    MissingTeam { team: String },

    #[error("invalid bookmaker odds ({home}, {draw}, {away})")]
    InvalidOdds { home: f64, draw: f64, away: f64 },

    #[error("update weight {weight} must lie strictly between 0 and {rounds} rounds")]
    InvalidWeight { weight: f64, rounds: f64 },

    #[error("a round-robin season needs at least two teams, got {teams}")]
    TooFewTeams { teams: usize },
}

#[derive(Debug, Error, PartialEq)]
pub enum EvalError {
    #[error("match {index} ({home} v {away}): {source}")]
    Match {
        index: usize,
        home: String,
        away: String,
        #[source]
        source: ModelError,
    },

    #[error(transparent)]
    Model(#[from] ModelError),
}

impl EvalError {
    pub fn model_error(&self) -> &ModelError {
        match self {
            EvalError::Match { source, .. } => source,
            EvalError::Model(err) => err,
        }
    }

    pub fn match_index(&self) -> Option<usize> {
        match self {
            EvalError::Match { index, .. } => Some(*index),
            EvalError::Model(_) => None,
        }
    }
}
