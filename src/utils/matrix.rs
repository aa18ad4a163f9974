//! Matrix utility functions.

use faer::Mat;

/// Detect columns that are constant (zero variance).
pub fn detect_constant_columns(x: &Mat<f64>, tolerance: f64) -> Vec<bool> {
    let n_cols = x.ncols();
    let n_rows = x.nrows();

    if n_rows == 0 {
        return vec![true; n_cols];
    }

    let mut constant = vec![false; n_cols];

    for j in 0..n_cols {
        let first = x[(0, j)];
        let all_same = (1..n_rows).all(|i| (x[(i, j)] - first).abs() < tolerance);
        constant[j] = all_same;
    }

    constant
}

/// Invert a small square matrix via QR decomposition.
///
/// Returns `None` when an R diagonal entry falls below `tolerance`.
pub fn qr_inverse(m: &Mat<f64>, tolerance: f64) -> Option<Mat<f64>> {
    let n = m.nrows();
    debug_assert_eq!(n, m.ncols());

    let qr = m.qr();
    let q = qr.compute_Q();
    let r = qr.R();

    for i in 0..n {
        if r[(i, i)].abs() < tolerance {
            return None;
        }
    }

    // Solve R * X = Q' column by column via back-substitution.
    let mut inv: Mat<f64> = Mat::zeros(n, n);
    let qt = q.transpose();

    for col in 0..n {
        for i in (0..n).rev() {
            let mut sum = qt[(i, col)];
            for j in (i + 1)..n {
                sum -= r[(i, j)] * inv[(j, col)];
            }
            inv[(i, col)] = sum / r[(i, i)];
        }
    }

    Some(inv)
}
