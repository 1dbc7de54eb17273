use std::collections::HashMap;

/// Proportional: each candidate's share of the race's total vote value, as a
/// fraction in [0, 1]. Every candidate with any votes appears. A zero grand
/// total (no votes, or all votes worth zero) yields an empty result rather
/// than a division by zero; the no-votes case is already caught by the guard.
pub fn tally(scores: HashMap<String, i64>) -> HashMap<String, f64> {
    let total: i64 = scores.values().sum();
    if total == 0 {
        return HashMap::new();
    }
    scores
        .into_iter()
        .map(|(id, score)| (id, score as f64 / total as f64))
        .collect()
}
