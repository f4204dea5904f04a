use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Outcome {
    #[serde(rename = "H")]
    Home,
    #[serde(rename = "D")]
    Draw,
    #[serde(rename = "A")]
    Away,
}

impl Outcome {
    pub fn code(self) -> &'static str {
        match self {
            Outcome::Home => "H",
            Outcome::Draw => "D",
            Outcome::Away => "A",
        }
    }
}

/// Home/draw/away probability triple.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Prob3 {
    pub home: f64,
    pub draw: f64,
    pub away: f64,
}

impl Prob3 {
    pub fn uniform() -> Self {
        Self {
            home: 1.0 / 3.0,
            draw: 1.0 / 3.0,
            away: 1.0 / 3.0,
        }
    }

    pub fn get(&self, outcome: Outcome) -> f64 {
        match outcome {
            Outcome::Home => self.home,
            Outcome::Draw => self.draw,
            Outcome::Away => self.away,
        }
    }

    pub fn sum(&self) -> f64 {
        self.home + self.draw + self.away
    }
}

pub fn classify_outcome(home_goals: u32, away_goals: u32) -> Outcome {
    if home_goals > away_goals {
        Outcome::Home
    } else if home_goals < away_goals {
        Outcome::Away
    } else {
        Outcome::Draw
    }
}

/// Decimal bookmaker odds, averaged across books.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BookmakerOdds {
    pub home: f64,
    pub draw: f64,
    pub away: f64,
}

/// One played fixture, using football-data.co.uk column names on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchRecord {
    #[serde(rename = "HomeTeam")]
    pub home_team: String,
    #[serde(rename = "AwayTeam")]
    pub away_team: String,
    #[serde(rename = "FTHG")]
    pub home_goals: u32,
    #[serde(rename = "FTAG")]
    pub away_goals: u32,
    #[serde(rename = "FTR")]
    pub result: Outcome,
    #[serde(rename = "BbAvH")]
    pub odds_home: f64,
    #[serde(rename = "BbAvD")]
    pub odds_draw: f64,
    #[serde(rename = "BbAvA")]
    pub odds_away: f64,
}

impl MatchRecord {
    pub fn odds(&self) -> BookmakerOdds {
        BookmakerOdds {
            home: self.odds_home,
            draw: self.odds_draw,
            away: self.odds_away,
        }
    }

    /// Outcome implied by the final score, which may disagree with a
    /// hand-entered `FTR` column.
    pub fn score_outcome(&self) -> Outcome {
        classify_outcome(self.home_goals, self.away_goals)
    }
}

/// A match plus the two probability triples computed for it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnotatedMatch {
    #[serde(flatten)]
    pub record: MatchRecord,
    pub model: Prob3,
    pub implied: Prob3,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_outcome_follows_score() {
        assert_eq!(classify_outcome(2, 0), Outcome::Home);
        assert_eq!(classify_outcome(1, 1), Outcome::Draw);
        assert_eq!(classify_outcome(0, 3), Outcome::Away);
    }

    #[test]
    fn match_record_reads_football_data_columns() {
        let raw = r#"{"Div":"E0","HomeTeam":"Arsenal","AwayTeam":"Fulham","FTHG":2,"FTAG":1,"FTR":"H","BbAvH":1.30,"BbAvD":4.90,"BbAvA":10.5}"#;
        let m: MatchRecord = serde_json::from_str(raw).unwrap();
        assert_eq!(m.home_team, "Arsenal");
        assert_eq!(m.result, Outcome::Home);
        assert_eq!(m.odds().away, 10.5);
        assert_eq!(m.score_outcome(), Outcome::Home);
    }

    #[test]
    fn prob3_lookup_by_outcome() {
        let p = Prob3 {
            home: 0.5,
            draw: 0.3,
            away: 0.2,
        };
        assert_eq!(p.get(Outcome::Draw), 0.3);
        assert!((p.sum() - 1.0).abs() < 1e-12);
    }
}
