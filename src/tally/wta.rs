use std::collections::HashMap;

/// Winner-Take-All: keep only the candidates sitting at the maximum summed
/// score. A race where fewer than two candidates received any votes has no
/// meaningful contest, so the result is empty and the evaluator reports it
/// as no-results.
pub fn tally(scores: HashMap<String, i64>) -> HashMap<String, i64> {
    if scores.len() < 2 {
        return HashMap::new();
    }
    let max = match scores.values().copied().max() {
        Some(max) => max,
        None => return HashMap::new(),
    };
    scores.into_iter().filter(|(_, score)| *score == max).collect()
}
