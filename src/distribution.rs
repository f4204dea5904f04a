use crate::error::ModelError;
use crate::matches::{BookmakerOdds, Prob3, classify_outcome};

/// Goal counts 0..DEFAULT_DEPTH are tabulated per side.
pub const DEFAULT_DEPTH: usize = 11;

/// Poisson masses for goal counts `0..depth`. A rate of 0 is the degenerate
/// distribution with all mass on 0 goals.
pub fn poisson_masses(lambda: f64, depth: usize) -> Result<Vec<f64>, ModelError> {
    if !lambda.is_finite() || lambda < 0.0 {
        return Err(ModelError::InvalidRate {
            context: "poisson rate",
            value: lambda,
        });
    }
    let mut out = Vec::with_capacity(depth);
    if depth == 0 {
        return Ok(out);
    }
    out.push((-lambda).exp());
    for k in 1..depth {
        let prev = out[k - 1];
        out.push(prev * lambda / k as f64);
    }
    Ok(out)
}

/// Home/draw/away probabilities from the outer product of two independent
/// Poisson score distributions.
///
/// Scores of `depth` goals or more are dropped, so the triple sums to
/// slightly under 1. For league scoring rates the lost tail is negligible and
/// the triple is left unnormalized.
pub fn outcome_probabilities(
    lambda_home: f64,
    lambda_away: f64,
    depth: usize,
) -> Result<Prob3, ModelError> {
    let goals_home = poisson_masses(lambda_home, depth)?;
    let goals_away = poisson_masses(lambda_away, depth)?;

    let mut p_home = 0.0_f64;
    let mut p_draw = 0.0_f64;
    let mut p_away = 0.0_f64;
    for (i, p_i) in goals_home.iter().enumerate() {
        for (j, p_j) in goals_away.iter().enumerate() {
            let p = p_i * p_j;
            if i > j {
                p_home += p;
            } else if i == j {
                p_draw += p;
            } else {
                p_away += p;
            }
        }
    }

    Ok(Prob3 {
        home: p_home,
        draw: p_draw,
        away: p_away,
    })
}

/// Expected goals for both sides of a fixture.
///
/// Each side's rate is its own attacking average times the opponent's
/// defensive average, both taken per game over `games_played`, combined in
/// log space.
pub fn expected_goals(
    scored_home: f64,
    lost_home: f64,
    scored_away: f64,
    lost_away: f64,
    games_played: f64,
) -> Result<(f64, f64), ModelError> {
    positive("games played", games_played)?;
    positive("home goals scored", scored_home)?;
    positive("home goals conceded", lost_home)?;
    positive("away goals scored", scored_away)?;
    positive("away goals conceded", lost_away)?;

    let lambda_home = ((scored_home / games_played).ln() + (lost_away / games_played).ln()).exp();
    let lambda_away = ((scored_away / games_played).ln() + (lost_home / games_played).ln()).exp();
    Ok((lambda_home, lambda_away))
}

/// Scale factor that strips the overround out of a decimal odds triple.
pub fn bookmaker_margin(odds: BookmakerOdds) -> Result<f64, ModelError> {
    let valid = |o: f64| o.is_finite() && o > 0.0;
    if !(valid(odds.home) && valid(odds.draw) && valid(odds.away)) {
        return Err(ModelError::InvalidOdds {
            home: odds.home,
            draw: odds.draw,
            away: odds.away,
        });
    }
    Ok(1.0 / (1.0 / odds.home + 1.0 / odds.draw + 1.0 / odds.away))
}

pub fn implied_probabilities(odds: BookmakerOdds) -> Result<Prob3, ModelError> {
    let margin = bookmaker_margin(odds)?;
    Ok(Prob3 {
        home: margin / odds.home,
        draw: margin / odds.draw,
        away: margin / odds.away,
    })
}

/// Probability of the observed result when the final score itself is used as
/// the pair of Poisson rates. Serves as a perfect-hindsight reference.
pub fn max_likelihood_outcome_probability(
    home_goals: u32,
    away_goals: u32,
    depth: usize,
) -> Result<f64, ModelError> {
    let probs = outcome_probabilities(home_goals as f64, away_goals as f64, depth)?;
    Ok(probs.get(classify_outcome(home_goals, away_goals)))
}

fn positive(context: &'static str, value: f64) -> Result<(), ModelError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ModelError::InvalidRate { context, value })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn outcome_probabilities_stay_in_unit_interval() {
        for &(lh, la) in &[(0.3, 0.3), (1.4, 1.1), (2.7, 0.6), (0.9, 3.1)] {
            let p = outcome_probabilities(lh, la, DEFAULT_DEPTH).unwrap();
            for v in [p.home, p.draw, p.away] {
                assert!((0.0..=1.0).contains(&v));
            }
            assert!(p.sum() <= 1.0 + 1e-12);
            assert!(p.sum() > 0.999);
        }
    }

    #[test]
    fn truncated_mass_shrinks_with_depth() {
        let shallow = outcome_probabilities(2.5, 2.0, 4).unwrap().sum();
        let mid = outcome_probabilities(2.5, 2.0, 8).unwrap().sum();
        let deep = outcome_probabilities(2.5, 2.0, 30).unwrap().sum();
        assert!(shallow < mid);
        assert!(mid < deep);
        assert_relative_eq!(deep, 1.0, epsilon = 1e-9);
    }

    #[test]
    fn equal_rates_give_symmetric_win_probabilities() {
        let p = outcome_probabilities(1.3, 1.3, DEFAULT_DEPTH).unwrap();
        assert_relative_eq!(p.home, p.away, epsilon = 1e-12);
    }

    #[test]
    fn stronger_home_rate_favours_home() {
        let p = outcome_probabilities(2.2, 0.8, DEFAULT_DEPTH).unwrap();
        assert!(p.home > p.draw && p.home > p.away);
    }

    #[test]
    fn zero_rate_is_degenerate_at_nil() {
        let masses = poisson_masses(0.0, 5).unwrap();
        assert_eq!(masses, vec![1.0, 0.0, 0.0, 0.0, 0.0]);
        let p = outcome_probabilities(0.0, 0.0, DEFAULT_DEPTH).unwrap();
        assert_eq!(p.draw, 1.0);
    }

    #[test]
    fn negative_or_nan_rate_is_rejected() {
        assert!(matches!(
            outcome_probabilities(-0.1, 1.0, DEFAULT_DEPTH),
            Err(ModelError::InvalidRate { .. })
        ));
        assert!(matches!(
            outcome_probabilities(1.0, f64::NAN, DEFAULT_DEPTH),
            Err(ModelError::InvalidRate { .. })
        ));
    }

    #[test]
    fn expected_goals_combines_attack_and_defence() {
        let (lh, la) = expected_goals(76.0, 38.0, 57.0, 57.0, 38.0).unwrap();
        assert_relative_eq!(lh, 2.0 * 1.5, epsilon = 1e-12);
        assert_relative_eq!(la, 1.5 * 1.0, epsilon = 1e-12);
    }

    #[test]
    fn expected_goals_is_symmetric_in_roles() {
        let (a, b, c, d, n) = (61.0, 44.0, 39.0, 58.0, 38.0);
        let forward = expected_goals(a, b, c, d, n).unwrap();
        let swapped = expected_goals(c, d, a, b, n).unwrap();
        assert_eq!(forward.0, swapped.1);
        assert_eq!(forward.1, swapped.0);
    }

    #[test]
    fn expected_goals_rejects_non_positive_averages() {
        let err = expected_goals(0.0, 40.0, 50.0, 50.0, 38.0).unwrap_err();
        assert_eq!(
            err,
            ModelError::InvalidRate {
                context: "home goals scored",
                value: 0.0
            }
        );
        assert!(expected_goals(40.0, 40.0, 50.0, 50.0, 0.0).is_err());
    }

    #[test]
    fn implied_probabilities_remove_overround() {
        let odds = BookmakerOdds {
            home: 1.85,
            draw: 3.40,
            away: 4.50,
        };
        let margin = bookmaker_margin(odds).unwrap();
        assert!(margin < 1.0);
        let p = implied_probabilities(odds).unwrap();
        assert_relative_eq!(p.sum(), 1.0, epsilon = 1e-12);
        assert!(p.home > p.draw && p.draw > p.away);
    }

    #[test]
    fn implied_probabilities_reject_bad_odds() {
        let odds = BookmakerOdds {
            home: 0.0,
            draw: 3.0,
            away: 3.0,
        };
        assert!(matches!(
            implied_probabilities(odds),
            Err(ModelError::InvalidOdds { .. })
        ));
    }

    #[test]
    fn max_likelihood_picks_observed_component() {
        let home_win = outcome_probabilities(2.0, 0.0, DEFAULT_DEPTH).unwrap();
        assert_eq!(
            max_likelihood_outcome_probability(2, 0, DEFAULT_DEPTH).unwrap(),
            home_win.home
        );
        let draw = outcome_probabilities(1.0, 1.0, DEFAULT_DEPTH).unwrap();
        assert_eq!(
            max_likelihood_outcome_probability(1, 1, DEFAULT_DEPTH).unwrap(),
            draw.draw
        );
        let away_win = outcome_probabilities(0.0, 3.0, DEFAULT_DEPTH).unwrap();
        assert_eq!(
            max_likelihood_outcome_probability(0, 3, DEFAULT_DEPTH).unwrap(),
            away_win.away
        );
    }

    #[test]
    fn goalless_draw_has_certain_hindsight_probability() {
        assert_eq!(
            max_likelihood_outcome_probability(0, 0, DEFAULT_DEPTH).unwrap(),
            1.0
        );
    }
}
