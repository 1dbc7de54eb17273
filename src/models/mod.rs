use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The tallying methods a race can run under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ElectionMethod {
    WinnerTakeAll,
    Proportional,
    Schulze,
}

impl ElectionMethod {
    /// Tag stored in the database.
    pub fn tag(&self) -> &'static str {
        match self {
            ElectionMethod::WinnerTakeAll => "wta",
            ElectionMethod::Proportional => "proportional",
            ElectionMethod::Schulze => "schulze",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "wta" => Some(ElectionMethod::WinnerTakeAll),
            "proportional" => Some(ElectionMethod::Proportional),
            "schulze" => Some(ElectionMethod::Schulze),
            _ => None,
        }
    }

    /// Ranked methods let voters order candidates relative to each other,
    /// which is what the race's vote-value range exists to accommodate.
    pub fn is_ranked(&self) -> bool {
        matches!(self, ElectionMethod::Schulze)
    }

    pub fn all() -> [ElectionMethod; 3] {
        [
            ElectionMethod::WinnerTakeAll,
            ElectionMethod::Proportional,
            ElectionMethod::Schulze,
        ]
    }

    pub fn title(&self) -> &'static str {
        match self {
            ElectionMethod::WinnerTakeAll => "Winner-Take-All",
            ElectionMethod::Proportional => "Proportional",
            ElectionMethod::Schulze => "Schulze (Condorcet)",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            ElectionMethod::WinnerTakeAll => {
                "Voter may choose only one of all the candidates, and only one winner may be declared."
            }
            ElectionMethod::Proportional => {
                "Voter may choose only one of all the candidates, but all candidates are tallied proportionally in percentages."
            }
            ElectionMethod::Schulze => {
                "Voter may rank all candidates in relation to each other."
            }
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    pub password: String,
}

impl User {
    pub fn new(name: String, email: String, password: String) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name,
            email,
            password,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Election {
    pub id: String,
    pub title: String,
    pub description_short: Option<String>,
    pub description_long: Option<String>,
    pub is_open: bool,
    pub default_method: ElectionMethod,
    pub admin_id: String,
    pub created_at: DateTime<Utc>,
    pub end_date: Option<DateTime<Utc>>,
}

impl Election {
    pub fn new(
        title: String,
        default_method: ElectionMethod,
        admin_id: String,
        end_date: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            title,
            description_short: None,
            description_long: None,
            is_open: true,
            default_method,
            admin_id,
            created_at: Utc::now(),
            end_date,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Race {
    pub id: String,
    pub title: String,
    pub description_short: Option<String>,
    pub description_long: Option<String>,
    pub race_open: bool,
    pub method: ElectionMethod,
    pub min_vote_value: i64,
    pub max_vote_value: i64,
    pub election_id: String,
}

impl Race {
    pub fn new(title: String, election_id: String, method: ElectionMethod) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            title,
            description_short: None,
            description_long: None,
            race_open: true,
            method,
            min_vote_value: 0,
            max_vote_value: 1,
            election_id,
        }
    }

    /// Recompute the permitted vote-value range for this race.
    ///
    /// `effective_candidates` is the candidate count the race is about to
    /// have: callers adding a candidate pass count + 1 before the insert is
    /// visible, callers removing one pass the already-reduced count.
    ///
    /// Non-ranked methods always use [0, 1]. Ranked methods keep the range
    /// wide enough to order every candidate: `max - min >= candidate count`
    /// and `min <= max`. Running this again on an already-valid range is a
    /// no-op.
    pub fn adjust_vote_range(&mut self, effective_candidates: i64) {
        if !self.method.is_ranked() || effective_candidates < 2 {
            self.min_vote_value = 0;
            self.max_vote_value = 1;
            return;
        }
        if self.min_vote_value > self.max_vote_value {
            self.min_vote_value = self.max_vote_value - effective_candidates;
        }
        if self.max_vote_value - self.min_vote_value < effective_candidates {
            self.max_vote_value = self.min_vote_value + effective_candidates;
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Candidate {
    pub id: String,
    pub title: String,
    pub description_short: Option<String>,
    pub description_long: Option<String>,
    pub race_id: String,
}

impl Candidate {
    pub fn new(title: String, race_id: String) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            title,
            description_short: None,
            description_long: None,
            race_id,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vote {
    pub id: String,
    pub value: i64,
    pub candidate_id: String,
    pub user_id: String,
    /// Denormalized from the candidate's race at cast time so ballot queries
    /// don't need a join per vote.
    pub race_id: String,
    pub created_at: DateTime<Utc>,
}

/// Persisted snapshot of a successful tally, kept for audit/history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TallyRecord {
    pub id: String,
    pub race_id: String,
    pub method: ElectionMethod,
    pub payload: String,
    pub computed_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ranked_race() -> Race {
        Race::new("race".to_string(), "election".to_string(), ElectionMethod::Schulze)
    }

    #[test]
    fn range_widens_to_fit_candidates() {
        let mut race = ranked_race();
        race.adjust_vote_range(4);
        assert!(race.min_vote_value <= race.max_vote_value);
        assert!(race.max_vote_value - race.min_vote_value >= 4);
    }

    #[test]
    fn range_adjustment_is_idempotent() {
        let mut race = ranked_race();
        race.adjust_vote_range(5);
        let (min, max) = (race.min_vote_value, race.max_vote_value);
        race.adjust_vote_range(5);
        race.adjust_vote_range(5);
        assert_eq!((race.min_vote_value, race.max_vote_value), (min, max));
    }

    #[test]
    fn inverted_range_is_repaired() {
        let mut race = ranked_race();
        race.min_vote_value = 10;
        race.max_vote_value = 3;
        race.adjust_vote_range(4);
        assert!(race.min_vote_value <= race.max_vote_value);
        assert!(race.max_vote_value - race.min_vote_value >= 4);
    }

    #[test]
    fn non_ranked_method_pins_range_to_unit() {
        let mut race = ranked_race();
        race.method = ElectionMethod::WinnerTakeAll;
        race.min_vote_value = -3;
        race.max_vote_value = 12;
        race.adjust_vote_range(6);
        assert_eq!((race.min_vote_value, race.max_vote_value), (0, 1));
    }

    #[test]
    fn fewer_than_two_candidates_pins_range_to_unit() {
        let mut race = ranked_race();
        race.min_vote_value = 2;
        race.max_vote_value = 9;
        race.adjust_vote_range(1);
        assert_eq!((race.min_vote_value, race.max_vote_value), (0, 1));
    }

    #[test]
    fn method_tags_round_trip() {
        for method in ElectionMethod::all() {
            assert_eq!(ElectionMethod::from_tag(method.tag()), Some(method));
        }
        assert_eq!(ElectionMethod::from_tag("borda"), None);
    }
}
