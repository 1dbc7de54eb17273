use crate::db::BallotStore;
use crate::error::ElectError;

/// Gate a tally attempt. The checks run in a fixed order and the first
/// failure wins: missing race, empty slate, election still open, no votes.
///
/// A race only becomes tallyable once its election is closed, which also
/// freezes its ballots (closed races reject vote casting), so a tally never
/// races against concurrent vote mutation.
pub async fn check_race(store: &dyn BallotStore, race_id: &str) -> Result<(), ElectError> {
    let race = store.get_race(race_id).await?;

    let candidates = store.candidates_of(race_id).await?;
    if candidates.is_empty() {
        return Err(ElectError::NoCandidates(race_id.to_string()));
    }

    let election = store.get_election(&race.election_id).await?;
    if election.is_open {
        return Err(ElectError::ElectionStillOpen(election.id));
    }

    if store.count_votes(race_id).await? == 0 {
        return Err(ElectError::NoVotes(race_id.to_string()));
    }

    Ok(())
}
