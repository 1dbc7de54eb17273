pub mod db;
pub mod error;
pub mod guard;
pub mod models;
pub mod tally;
pub mod tasks;

pub use db::{BallotStore, Database};
pub use error::ElectError;
pub use models::{Candidate, Election, ElectionMethod, Race, TallyRecord, User, Vote};
pub use tally::{TallyResult, run_and_record, run_tally};
