use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::distribution::DEFAULT_DEPTH;
use crate::team_strength::{PROMOTED_DEFAULT, TeamStrength};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Goal counts `0..poisson_depth` are tabulated per side.
    pub poisson_depth: usize,
    /// Seed strength for teams absent from the previous season.
    pub promoted_strength: TeamStrength,
    /// Weight `i` in `new = (rounds - i) / rounds * old + i * observed`.
    pub update_weight: f64,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            poisson_depth: DEFAULT_DEPTH,
            promoted_strength: PROMOTED_DEFAULT,
            update_weight: 1.0,
        }
    }
}

impl ModelConfig {
    pub fn from_env() -> Self {
        Self::default().with_overrides(|key| std::env::var(key).ok())
    }

    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(depth) = lookup("POISSON_DEPTH").and_then(|v| v.trim().parse::<usize>().ok()) {
            self.poisson_depth = depth.clamp(2, 40);
        }
        if let Some(scored) = positive_f64(&lookup, "PROMOTED_SCORED") {
            self.promoted_strength.scored = scored;
        }
        if let Some(lost) = positive_f64(&lookup, "PROMOTED_LOST") {
            self.promoted_strength.lost = lost;
        }
        if let Some(weight) = positive_f64(&lookup, "UPDATE_WEIGHT") {
            self.update_weight = weight;
        }
        self
    }
}

fn positive_f64(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<f64> {
    let raw = lookup(key)?;
    match raw.trim().parse::<f64>() {
        Ok(v) if v.is_finite() && v > 0.0 => Some(v),
        _ => {
            warn!(key, value = %raw, "ignoring non-positive override");
            None
        }
    }
}
