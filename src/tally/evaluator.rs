use super::TallyResult;
use crate::error::ElectError;

/// Interpret a raw tally into a verdict, or a typed failure the caller can
/// surface as-is.
///
/// Winner-Take-All keeps only max-score candidates, so more than one entry
/// means a tie; the tied ids travel with the error, sorted so diagnostics
/// are deterministic. Proportional has no tie concept. Schulze fails only
/// when the winner map is empty or nobody dominates.
pub fn check_results(result: &TallyResult) -> Result<(), ElectError> {
    match result {
        TallyResult::WinnerTakeAll(scores) => {
            if scores.is_empty() {
                return Err(ElectError::NoResults);
            }
            if scores.len() > 1 {
                let mut tied: Vec<String> = scores.keys().cloned().collect();
                tied.sort();
                return Err(ElectError::TiedResults(tied));
            }
            Ok(())
        }
        TallyResult::Proportional(shares) => {
            if shares.is_empty() {
                return Err(ElectError::NoResults);
            }
            Ok(())
        }
        TallyResult::Schulze(schulze) => {
            if schulze.winners.is_empty() {
                return Err(ElectError::NoResults);
            }
            if !schulze.winners.values().any(|w| *w) {
                return Err(ElectError::NoWinners);
            }
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tally::SchulzeResult;
    use std::collections::HashMap;

    #[test]
    fn wta_tie_carries_sorted_candidate_ids() {
        let scores: HashMap<String, i64> =
            [("b".to_string(), 1), ("a".to_string(), 1)].into_iter().collect();
        match check_results(&TallyResult::WinnerTakeAll(scores)) {
            Err(ElectError::TiedResults(ids)) => {
                assert_eq!(ids, vec!["a".to_string(), "b".to_string()])
            }
            other => panic!("expected TiedResults, got {other:?}"),
        }
    }

    #[test]
    fn wta_single_winner_passes() {
        let scores: HashMap<String, i64> = [("a".to_string(), 2)].into_iter().collect();
        assert!(check_results(&TallyResult::WinnerTakeAll(scores)).is_ok());
    }

    #[test]
    fn empty_results_are_rejected() {
        assert!(matches!(
            check_results(&TallyResult::WinnerTakeAll(HashMap::new())),
            Err(ElectError::NoResults)
        ));
        assert!(matches!(
            check_results(&TallyResult::Proportional(HashMap::new())),
            Err(ElectError::NoResults)
        ));
        let empty = SchulzeResult { winners: HashMap::new(), pairwise: Vec::new() };
        assert!(matches!(
            check_results(&TallyResult::Schulze(empty)),
            Err(ElectError::NoResults)
        ));
    }

    #[test]
    fn schulze_without_dominant_candidate_is_no_winners() {
        let winners: HashMap<String, bool> =
            [("a".to_string(), false), ("b".to_string(), false)].into_iter().collect();
        let result = TallyResult::Schulze(SchulzeResult { winners, pairwise: Vec::new() });
        assert!(matches!(check_results(&result), Err(ElectError::NoWinners)));
    }
}
