//! Poisson goal model for football 1X2 probabilities, scored by season
//! log-likelihood against bookmaker prices and two reference baselines.

pub mod config;
pub mod distribution;
pub mod error;
pub mod history;
pub mod matches;
pub mod report;
pub mod scoring;
pub mod season;
pub mod season_source;
pub mod team_strength;

pub use config::ModelConfig;
pub use error::{EvalError, ModelError};
pub use matches::{AnnotatedMatch, MatchRecord, Outcome, Prob3};
pub use season::{SeasonLikelihoods, evaluate_season, evaluate_season_detailed};
pub use team_strength::{StrengthTable, TeamStrength};
