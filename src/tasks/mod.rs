pub mod election_closer;
