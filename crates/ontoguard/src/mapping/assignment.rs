//! Maximum-weight bipartite assignment between columns and properties.
//!
//! A greedy per-column argmax can leave a property unmapped when two columns
//! both prefer it; the Hungarian algorithm finds the assignment maximizing
//! total score instead. The matrix is padded to square with zero-score
//! dummies, so extra columns or properties simply stay unmatched.

/// Solve the maximum-weight assignment over a rectangular score matrix
/// indexed `[row][col]`. Returns the matched column for each row, `None`
/// for rows matched to a padding column.
///
/// Deterministic: rows are introduced in order and candidate columns are
/// scanned in ascending index, so ties resolve to the earliest row and the
/// lowest column index.
pub(crate) fn max_weight_assignment(scores: &[Vec<f64>]) -> Vec<Option<usize>> {
    let rows = scores.len();
    let cols = scores.iter().map(Vec::len).max().unwrap_or(0);
    if rows == 0 || cols == 0 {
        return vec![None; rows];
    }
    let n = rows.max(cols);

    // Convert to a minimization problem: cost = max_score - score, with
    // padding cells at weight zero.
    let max_score = scores
        .iter()
        .flatten()
        .fold(0.0f64, |acc, &s| acc.max(s));
    let cost = |i: usize, j: usize| -> f64 {
        let weight = scores
            .get(i)
            .and_then(|row| row.get(j))
            .copied()
            .unwrap_or(0.0);
        max_score - weight
    };

    // Hungarian algorithm with potentials, 1-indexed bookkeeping.
    let mut u = vec![0.0f64; n + 1];
    let mut v = vec![0.0f64; n + 1];
    let mut matched_row = vec![0usize; n + 1]; // matched_row[j] = row matched to column j
    let mut way = vec![0usize; n + 1];

    for i in 1..=n {
        matched_row[0] = i;
        let mut j0 = 0usize;
        let mut min_to = vec![f64::INFINITY; n + 1];
        let mut used = vec![false; n + 1];

        loop {
            used[j0] = true;
            let i0 = matched_row[j0];
            let mut delta = f64::INFINITY;
            let mut j1 = 0usize;

            for j in 1..=n {
                if used[j] {
                    continue;
                }
                let current = cost(i0 - 1, j - 1) - u[i0] - v[j];
                if current < min_to[j] {
                    min_to[j] = current;
                    way[j] = j0;
                }
                if min_to[j] < delta {
                    delta = min_to[j];
                    j1 = j;
                }
            }

            for j in 0..=n {
                if used[j] {
                    u[matched_row[j]] += delta;
                    v[j] -= delta;
                } else {
                    min_to[j] -= delta;
                }
            }

            j0 = j1;
            if matched_row[j0] == 0 {
                break;
            }
        }

        // Augment along the alternating path.
        loop {
            let j1 = way[j0];
            matched_row[j0] = matched_row[j1];
            j0 = j1;
            if j0 == 0 {
                break;
            }
        }
    }

    let mut result = vec![None; rows];
    for j in 1..=n {
        let i = matched_row[j];
        if i >= 1 && i <= rows && j <= cols {
            result[i - 1] = Some(j - 1);
        }
    }
    result
}
