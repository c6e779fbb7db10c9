// Placement scoring: rank at submission time maps to the hub-bound score.

/// Score submitted to the hub for a 1-based leaderboard rank. Absent ranks
/// submit zero. Always inside [0, 100].
pub fn placement_for_rank(rank: Option<usize>) -> u32 {
    match rank {
        Some(1) => 100,
        Some(2) => 80,
        Some(3) => 60,
        Some(4) => 40,
        Some(_) => 20,
        None => 0,
    }
}
