pub mod evaluator;
pub mod proportional;
pub mod schulze;
pub mod wta;

use crate::db::BallotStore;
use crate::error::ElectError;
use crate::guard;
use crate::models::ElectionMethod;
use log::info;
use serde::Serialize;
use std::collections::HashMap;

/// One directed pairwise preference count: how many voters ranked
/// `preferred` strictly above `over`.
#[derive(Debug, Clone, Serialize)]
pub struct PairwiseCount {
    pub preferred: String,
    pub over: String,
    pub count: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct SchulzeResult {
    /// candidate id -> whether it belongs to the winner set.
    pub winners: HashMap<String, bool>,
    /// All n*(n-1) directed pairwise counts, kept for audit.
    pub pairwise: Vec<PairwiseCount>,
}

/// Method-specific outcome of tallying one race.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "method", content = "results")]
pub enum TallyResult {
    /// candidate id -> summed score, restricted to candidates at the max.
    #[serde(rename = "wta")]
    WinnerTakeAll(HashMap<String, i64>),
    /// candidate id -> fraction of the race's total vote value, in [0, 1].
    #[serde(rename = "proportional")]
    Proportional(HashMap<String, f64>),
    #[serde(rename = "schulze")]
    Schulze(SchulzeResult),
}

impl TallyResult {
    pub fn method(&self) -> ElectionMethod {
        match self {
            TallyResult::WinnerTakeAll(_) => ElectionMethod::WinnerTakeAll,
            TallyResult::Proportional(_) => ElectionMethod::Proportional,
            TallyResult::Schulze(_) => ElectionMethod::Schulze,
        }
    }
}

/// Tally one race under its configured method: guard the preconditions,
/// aggregate the ballots, evaluate the outcome.
pub async fn run_tally(store: &dyn BallotStore, race_id: &str) -> Result<TallyResult, ElectError> {
    guard::check_race(store, race_id).await?;

    let race = store.get_race(race_id).await?;
    let result = match race.method {
        ElectionMethod::WinnerTakeAll => {
            let scores = store.sum_votes_by_candidate(race_id).await?;
            TallyResult::WinnerTakeAll(wta::tally(scores))
        }
        ElectionMethod::Proportional => {
            let scores = store.sum_votes_by_candidate(race_id).await?;
            TallyResult::Proportional(proportional::tally(scores))
        }
        ElectionMethod::Schulze => {
            let candidates: Vec<String> = store
                .candidates_of(race_id)
                .await?
                .into_iter()
                .map(|c| c.id)
                .collect();
            let ballots = store.ballots_by_user(race_id).await?;
            TallyResult::Schulze(schulze::tally(&candidates, &ballots))
        }
    };

    evaluator::check_results(&result)?;
    info!("tallied race {} under {}", race_id, race.method.title());
    Ok(result)
}

/// Tally a race and persist the outcome as a snapshot row.
pub async fn run_and_record(
    store: &dyn BallotStore,
    race_id: &str,
) -> Result<TallyResult, ElectError> {
    let result = run_tally(store, race_id).await?;
    let payload = serde_json::to_string(&result).unwrap_or_default();
    store.record_tally(race_id, result.method(), &payload).await?;
    Ok(result)
}
