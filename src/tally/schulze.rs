use super::{PairwiseCount, SchulzeResult};
use std::collections::HashMap;

/// Schulze (Condorcet): count, for every ordered pair of distinct candidates
/// (A, B), the voters who ranked A strictly above B (only over voters who
/// ranked both). The winner set then comes from the textbook strongest-path
/// evaluation: A wins iff its strongest beat-path to every rival is at least
/// as strong as the rival's path back.
pub fn tally(
    candidates: &[String],
    ballots: &HashMap<String, HashMap<String, i64>>,
) -> SchulzeResult {
    let n = candidates.len();

    // pref[i][j] = voters preferring candidate i over candidate j. The two
    // directions are independent counts: a voter scoring them equally adds
    // to neither.
    let mut pref = vec![vec![0i64; n]; n];
    for ballot in ballots.values() {
        for i in 0..n {
            for j in 0..n {
                if i == j {
                    continue;
                }
                if let (Some(a), Some(b)) = (ballot.get(&candidates[i]), ballot.get(&candidates[j]))
                {
                    if a > b {
                        pref[i][j] += 1;
                    }
                }
            }
        }
    }

    // Strongest paths, Floyd-Warshall widest-path variant.
    let mut strength = vec![vec![0i64; n]; n];
    for i in 0..n {
        for j in 0..n {
            if i != j && pref[i][j] > pref[j][i] {
                strength[i][j] = pref[i][j];
            }
        }
    }
    for k in 0..n {
        for i in 0..n {
            if i == k {
                continue;
            }
            for j in 0..n {
                if j == i || j == k {
                    continue;
                }
                let via_k = strength[i][k].min(strength[k][j]);
                if via_k > strength[i][j] {
                    strength[i][j] = via_k;
                }
            }
        }
    }

    let winners = candidates
        .iter()
        .enumerate()
        .map(|(i, id)| {
            let wins = (0..n).all(|j| j == i || strength[i][j] >= strength[j][i]);
            (id.clone(), wins)
        })
        .collect();

    let mut pairwise = Vec::with_capacity(n.saturating_sub(1) * n);
    for i in 0..n {
        for j in 0..n {
            if i != j {
                pairwise.push(PairwiseCount {
                    preferred: candidates[i].clone(),
                    over: candidates[j].clone(),
                    count: pref[i][j],
                });
            }
        }
    }

    SchulzeResult { winners, pairwise }
}
