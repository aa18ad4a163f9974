//! Weighted least squares core.
//!
//! Minimizes Σ w_i (y_i - x_i'β)² by transforming rows with √w and
//! solving the resulting least squares problem via QR. Every estimator
//! in this crate, classical and geographically weighted, goes through
//! this one solve path.

use crate::solvers::traits::GwprError;
use crate::utils::qr_inverse;
use faer::{Col, Mat};

/// Output of one weighted least squares solve.
#[derive(Debug, Clone)]
pub(crate) struct LsFit {
    /// Slope coefficients (length = x.ncols()).
    pub coefficients: Col<f64>,
    /// Intercept, when requested.
    pub intercept: Option<f64>,
    /// Fitted values in the original scale.
    pub fitted: Col<f64>,
    /// Residuals in the original scale.
    pub residuals: Col<f64>,
    /// Weighted residual sum of squares.
    pub weighted_rss: f64,
    /// Weighted total sum of squares around the weighted mean of y.
    pub weighted_tss: f64,
    /// (X'WX)⁻¹ of the augmented design when an intercept is present
    /// (intercept row/column first), else of the plain design.
    pub normal_inverse: Mat<f64>,
}

/// Solve a (possibly weighted) least squares problem.
///
/// `weights = None` means unit weights. With `with_intercept`, a leading
/// constant column is added and the intercept is reported separately.
///
/// Returns `SingularMatrix` when the weighted design does not have full
/// column rank at `rank_tolerance`.
pub(crate) fn solve_weighted(
    x: &Mat<f64>,
    y: &Col<f64>,
    weights: Option<&Col<f64>>,
    with_intercept: bool,
    rank_tolerance: f64,
) -> Result<LsFit, GwprError> {
    let n_samples = x.nrows();
    let n_features = x.ncols();
    let n_params = if with_intercept {
        n_features + 1
    } else {
        n_features
    };

    if n_samples != y.nrows() {
        return Err(GwprError::DimensionMismatch {
            x_rows: n_samples,
            y_len: y.nrows(),
        });
    }

    let weights = match weights {
        Some(w) => {
            if w.nrows() != n_samples {
                return Err(GwprError::DimensionMismatch {
                    x_rows: n_samples,
                    y_len: w.nrows(),
                });
            }
            for i in 0..n_samples {
                if w[i] < 0.0 || !w[i].is_finite() {
                    return Err(GwprError::InvalidWeights);
                }
            }
            w.clone()
        }
        None => Col::from_fn(n_samples, |_| 1.0),
    };

    let weight_sum: f64 = weights.iter().sum();
    if weight_sum < 1e-14 {
        return Err(GwprError::InvalidWeights);
    }

    let n_effective = weights.iter().filter(|&&w| w > 1e-14).count();
    if n_effective < n_params {
        return Err(GwprError::InsufficientObservations {
            needed: n_params,
            got: n_effective,
        });
    }

    // Build the (augmented) design and transform: X_w = W^(1/2) X,
    // y_w = W^(1/2) y.
    let mut design = Mat::zeros(n_samples, n_params);
    let mut y_weighted = Col::zeros(n_samples);
    let offset = usize::from(with_intercept);
    for i in 0..n_samples {
        let sw = weights[i].sqrt();
        y_weighted[i] = y[i] * sw;
        if with_intercept {
            design[(i, 0)] = sw;
        }
        for j in 0..n_features {
            design[(i, j + offset)] = x[(i, j)] * sw;
        }
    }

    // Solve via QR; a small R diagonal marks a singular design.
    let qr = design.qr();
    let q = qr.compute_Q();
    let r = qr.R();

    for i in 0..n_params {
        if r[(i, i)].abs() < rank_tolerance {
            return Err(GwprError::SingularMatrix);
        }
    }

    let qty = q.transpose() * &y_weighted;
    let mut beta = Col::zeros(n_params);
    for i in (0..n_params).rev() {
        let mut sum = qty[i];
        for j in (i + 1)..n_params {
            sum -= r[(i, j)] * beta[j];
        }
        beta[i] = sum / r[(i, i)];
    }

    let intercept = with_intercept.then(|| beta[0]);
    let coefficients = Col::from_fn(n_features, |j| beta[j + offset]);

    // Fitted values and residuals in the original scale.
    let mut fitted = Col::zeros(n_samples);
    let mut residuals = Col::zeros(n_samples);
    for i in 0..n_samples {
        let mut pred = intercept.unwrap_or(0.0);
        for j in 0..n_features {
            pred += x[(i, j)] * coefficients[j];
        }
        fitted[i] = pred;
        residuals[i] = y[i] - pred;
    }

    // Weighted sums of squares around the weighted mean of y.
    let y_mean: f64 = y
        .iter()
        .zip(weights.iter())
        .map(|(&yi, &wi)| wi * yi)
        .sum::<f64>()
        / weight_sum;
    let weighted_tss: f64 = y
        .iter()
        .zip(weights.iter())
        .map(|(&yi, &wi)| wi * (yi - y_mean) * (yi - y_mean))
        .sum();
    let weighted_rss: f64 = residuals
        .iter()
        .zip(weights.iter())
        .map(|(&ri, &wi)| wi * ri * ri)
        .sum();

    // (X'WX)⁻¹ on the original-scale design, for standard errors.
    let mut xtwx: Mat<f64> = Mat::zeros(n_params, n_params);
    for i in 0..n_samples {
        let w = weights[i];
        if w <= 1e-14 {
            continue;
        }
        for a in 0..n_params {
            let xa = if with_intercept && a == 0 {
                1.0
            } else {
                x[(i, a - offset)]
            };
            for b in a..n_params {
                let xb = if with_intercept && b == 0 {
                    1.0
                } else {
                    x[(i, b - offset)]
                };
                xtwx[(a, b)] += w * xa * xb;
            }
        }
    }
    for a in 0..n_params {
        for b in 0..a {
            xtwx[(a, b)] = xtwx[(b, a)];
        }
    }

    let normal_inverse = qr_inverse(&xtwx, rank_tolerance).ok_or(GwprError::SingularMatrix)?;

    Ok(LsFit {
        coefficients,
        intercept,
        fitted,
        residuals,
        weighted_rss,
        weighted_tss,
        normal_inverse,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unweighted_exact_line() {
        let x = Mat::from_fn(10, 1, |i, _| i as f64);
        let y = Col::from_fn(10, |i| 2.0 + 3.0 * i as f64);

        let fit = solve_weighted(&x, &y, None, true, 1e-10).unwrap();
        assert!((fit.intercept.unwrap() - 2.0).abs() < 1e-9);
        assert!((fit.coefficients[0] - 3.0).abs() < 1e-9);
        assert!(fit.weighted_rss < 1e-16);
    }

    #[test]
    fn test_zero_weights_drop_observations() {
        // Two populations; zero weights on the second should recover the
        // first population's line exactly.
        let x = Mat::from_fn(20, 1, |i, _| (i % 10) as f64);
        let y = Col::from_fn(20, |i| {
            if i < 10 {
                1.0 + 2.0 * (i as f64)
            } else {
                50.0 - 3.0 * ((i - 10) as f64)
            }
        });
        let w = Col::from_fn(20, |i| if i < 10 { 1.0 } else { 0.0 });

        let fit = solve_weighted(&x, &y, Some(&w), true, 1e-10).unwrap();
        assert!((fit.intercept.unwrap() - 1.0).abs() < 1e-9);
        assert!((fit.coefficients[0] - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_singular_design_detected() {
        // Two perfectly collinear columns.
        let x = Mat::from_fn(10, 2, |i, j| (i as f64) * (j as f64 + 1.0));
        let y = Col::from_fn(10, |i| i as f64);

        let result = solve_weighted(&x, &y, None, true, 1e-10);
        assert!(matches!(result, Err(GwprError::SingularMatrix)));
    }

    #[test]
    fn test_negative_weights_rejected() {
        let x = Mat::from_fn(5, 1, |i, _| i as f64);
        let y = Col::from_fn(5, |i| i as f64);
        let w = Col::from_fn(5, |i| if i == 0 { -1.0 } else { 1.0 });

        let result = solve_weighted(&x, &y, Some(&w), true, 1e-10);
        assert!(matches!(result, Err(GwprError::InvalidWeights)));
    }

    #[test]
    fn test_insufficient_effective_observations() {
        let x = Mat::from_fn(5, 2, |i, j| (i * (j + 2)) as f64);
        let y = Col::from_fn(5, |i| i as f64);
        let w = Col::from_fn(5, |i| if i < 2 { 1.0 } else { 0.0 });

        let result = solve_weighted(&x, &y, Some(&w), true, 1e-10);
        assert!(matches!(
            result,
            Err(GwprError::InsufficientObservations { .. })
        ));
    }

    #[test]
    fn test_normal_inverse_matches_ols_variance() {
        // For x = 0..n-1 with intercept, (X'X) is [[n, Σx], [Σx, Σx²]].
        let n = 6usize;
        let x = Mat::from_fn(n, 1, |i, _| i as f64);
        let y = Col::from_fn(n, |i| 1.0 + i as f64);

        let fit = solve_weighted(&x, &y, None, true, 1e-10).unwrap();

        let sx: f64 = (0..n).map(|i| i as f64).sum();
        let sxx: f64 = (0..n).map(|i| (i * i) as f64).sum();
        let det = n as f64 * sxx - sx * sx;
        // Check the (1,1) element of the inverse: n / det.
        assert!((fit.normal_inverse[(1, 1)] - n as f64 / det).abs() < 1e-9);
    }
}
