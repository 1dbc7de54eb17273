use thiserror::Error;

/// Everything that can go wrong between casting a vote and reading a tally.
///
/// Guard failures (`NoRace`, `NoCandidates`, `ElectionStillOpen`, `NoVotes`)
/// and evaluation failures (`NoResults`, `NoWinners`, `TiedResults`) are
/// deterministic outcomes of the current data state and are never retried.
#[derive(Debug, Error)]
pub enum ElectError {
    #[error("could not find election with id {0}")]
    NoElection(String),

    #[error("could not find race with id {0}")]
    NoRace(String),

    #[error("could not find candidate with id {0}")]
    NoCandidate(String),

    #[error("could not find user with id {0}")]
    NoUser(String),

    #[error("could not find vote with id {0}")]
    NoVote(String),

    #[error("race {0} has no candidates")]
    NoCandidates(String),

    #[error("no votes have been cast in race {0}")]
    NoVotes(String),

    #[error("election {0} is still open; a race can only be tallied once its election is closed")]
    ElectionStillOpen(String),

    #[error("tally produced no results")]
    NoResults,

    #[error("no candidate won its pairwise comparisons")]
    NoWinners,

    #[error("tied result between candidates {0:?}")]
    TiedResults(Vec<String>),

    #[error("vote value {value} is outside the permitted range [{min}, {max}]")]
    InvalidVoteRange { value: i64, min: i64, max: i64 },

    #[error("user {user_id} has already voted for candidate {candidate_id}")]
    DuplicateVote { user_id: String, candidate_id: String },

    #[error("race {0} is closed and not accepting votes")]
    VotingClosed(String),

    #[error("a user with email {0} already exists")]
    DuplicateEmail(String),

    #[error("failed to decode stored row: {0}")]
    Decode(String),

    #[error(transparent)]
    Db(#[from] sqlx::Error),
}
