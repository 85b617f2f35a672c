//! Optimal pairing of expected and actual tool calls
//!
//! Provides:
//! - Padded square score matrices for lists of unequal length
//! - A Hungarian (Jonker-Volgenant style) solver maximizing total score

use std::time::Instant;
use tracing::trace;

/// Build an `n x n` score matrix with `n = max(rows, cols)`.
///
/// Cells outside the real `rows x cols` range are zero, so padding never
/// contributes to the total.
pub fn padded_score_matrix<F>(rows: usize, cols: usize, mut score: F) -> Vec<Vec<f64>>
where
    F: FnMut(usize, usize) -> f64,
{
    let n = rows.max(cols);
    (0..n)
        .map(|i| {
            (0..n)
                .map(|j| {
                    if i < rows && j < cols {
                        let value = score(i, j);
                        if value.is_finite() {
                            value
                        } else {
                            0.0
                        }
                    } else {
                        0.0
                    }
                })
                .collect()
        })
        .collect()
}

/// Solve the assignment problem on a square matrix, maximizing total score.
///
/// Returns `assignment` where `assignment[row] = column`. Runs in O(n^3).
/// Missing cells in ragged rows count as zero.
pub fn solve_max_assignment(matrix: &[Vec<f64>]) -> Vec<usize> {
    let start = Instant::now();
    let n = matrix.len();
    if n == 0 {
        return Vec::new();
    }

    // Minimize the negated scores
    let cost = |i: usize, j: usize| -> f64 {
        let value = matrix[i].get(j).copied().unwrap_or(0.0);
        if value.is_finite() {
            -value
        } else {
            0.0
        }
    };

    // 1-based potentials; column 0 is the virtual start
    let mut u = vec![0.0_f64; n + 1];
    let mut v = vec![0.0_f64; n + 1];
    let mut p = vec![0_usize; n + 1];
    let mut way = vec![0_usize; n + 1];

    for i in 1..=n {
        p[0] = i;
        let mut j0 = 0;
        let mut minv = vec![f64::INFINITY; n + 1];
        let mut used = vec![false; n + 1];

        loop {
            used[j0] = true;
            let i0 = p[j0];
            let mut delta = f64::INFINITY;
            let mut j1 = 0;

            for j in 1..=n {
                if used[j] {
                    continue;
                }
                let reduced = cost(i0 - 1, j - 1) - u[i0] - v[j];
                if reduced < minv[j] {
                    minv[j] = reduced;
                    way[j] = j0;
                }
                if minv[j] < delta {
                    delta = minv[j];
                    j1 = j;
                }
            }

            for j in 0..=n {
                if used[j] {
                    u[p[j]] += delta;
                    v[j] -= delta;
                } else {
                    minv[j] -= delta;
                }
            }

            j0 = j1;
            if p[j0] == 0 {
                break;
            }
        }

        // Augment along the alternating path
        loop {
            let j1 = way[j0];
            p[j0] = p[j1];
            j0 = j1;
            if j0 == 0 {
                break;
            }
        }
    }

    let mut assignment = vec![0; n];
    for j in 1..=n {
        if p[j] > 0 {
            assignment[p[j] - 1] = j - 1;
        }
    }

    trace!(size = n, "solve_max_assignment");
    crate::trace_time!(start, "solve_max_assignment");
    assignment
}

/// Pairs of an assignment that fall inside the real `rows x cols` range
pub fn real_pairs(
    assignment: &[usize],
    rows: usize,
    cols: usize,
) -> impl Iterator<Item = (usize, usize)> + '_ {
    assignment
        .iter()
        .enumerate()
        .filter(move |&(i, &j)| i < rows && j < cols)
        .map(|(i, &j)| (i, j))
}
