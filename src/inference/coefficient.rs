//! Coefficient inference calculations.

use faer::{Col, Mat};
use statrs::distribution::{ContinuousCDF, StudentsT};

/// Computes inference statistics for regression coefficients.
pub struct CoefficientInference;

impl CoefficientInference {
    /// Standard errors from a normal-matrix inverse:
    /// SE(β_j) = sqrt(σ² * (X'WX)⁻¹_{jj}).
    ///
    /// With `with_intercept` the inverse is the augmented one (intercept
    /// first) and the intercept SE is returned separately.
    pub fn standard_errors(
        normal_inverse: &Mat<f64>,
        mse: f64,
        with_intercept: bool,
    ) -> (Col<f64>, Option<f64>) {
        let offset = usize::from(with_intercept);
        let n_features = normal_inverse.nrows() - offset;

        let se_intercept = with_intercept.then(|| {
            let var = mse * normal_inverse[(0, 0)];
            if var >= 0.0 {
                var.sqrt()
            } else {
                f64::NAN
            }
        });

        let se = Col::from_fn(n_features, |j| {
            let var = mse * normal_inverse[(j + offset, j + offset)];
            if var >= 0.0 {
                var.sqrt()
            } else {
                f64::NAN
            }
        });

        (se, se_intercept)
    }

    /// Compute t-statistics for coefficients.
    ///
    /// t_j = β_j / SE(β_j)
    pub fn t_statistics(coefficients: &Col<f64>, std_errors: &Col<f64>) -> Col<f64> {
        let n = coefficients.nrows();
        let mut t_stats = Col::zeros(n);

        for j in 0..n {
            if std_errors[j].is_nan() || std_errors[j] == 0.0 {
                t_stats[j] = f64::NAN;
            } else {
                t_stats[j] = coefficients[j] / std_errors[j];
            }
        }

        t_stats
    }

    /// A single t-statistic, NaN-safe.
    pub fn t_statistic(coefficient: f64, std_error: f64) -> f64 {
        if std_error.is_nan() || std_error == 0.0 {
            f64::NAN
        } else {
            coefficient / std_error
        }
    }

    /// Compute two-tailed p-values from t-statistics.
    ///
    /// p_j = 2 * P(|T| > |t_j|) where T ~ t(df). The df may be
    /// fractional (effective degrees of freedom from the weighted fit).
    pub fn p_values(t_statistics: &Col<f64>, df: f64) -> Col<f64> {
        Col::from_fn(t_statistics.nrows(), |j| {
            Self::p_value(t_statistics[j], df)
        })
    }

    /// A single two-tailed p-value against t(df).
    pub fn p_value(t_statistic: f64, df: f64) -> f64 {
        if df <= 0.0 || t_statistic.is_nan() {
            return f64::NAN;
        }
        match StudentsT::new(0.0, 1.0, df) {
            Ok(dist) => 2.0 * (1.0 - dist.cdf(t_statistic.abs())),
            Err(_) => f64::NAN,
        }
    }

    /// Significance flags at level `alpha`. NaN p-values are not
    /// significant.
    pub fn significant(p_values: &Col<f64>, alpha: f64) -> Vec<bool> {
        p_values.iter().map(|&p| p < alpha).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_t_statistics() {
        let coefficients = Col::from_fn(3, |i| (i + 1) as f64);
        let std_errors = Col::from_fn(3, |_| 0.5);

        let t_stats = CoefficientInference::t_statistics(&coefficients, &std_errors);

        assert!((t_stats[0] - 2.0).abs() < 1e-10);
        assert!((t_stats[1] - 4.0).abs() < 1e-10);
        assert!((t_stats[2] - 6.0).abs() < 1e-10);
    }

    #[test]
    fn test_p_values_bounds() {
        let t_stats = Col::from_fn(3, |i| (i + 1) as f64);
        let p_vals = CoefficientInference::p_values(&t_stats, 10.0);

        for p in p_vals.iter() {
            assert!(*p >= 0.0 && *p <= 1.0);
        }
    }

    #[test]
    fn test_p_values_decrease_with_larger_t() {
        let t_stats = Col::from_fn(4, |i| (i + 1) as f64);
        let p_vals = CoefficientInference::p_values(&t_stats, 8.0);

        for j in 1..4 {
            assert!(p_vals[j] < p_vals[j - 1]);
        }
    }

    #[test]
    fn test_p_value_fractional_df() {
        let p = CoefficientInference::p_value(2.0, 7.4);
        assert!(p > 0.0 && p < 0.1);
        assert!(CoefficientInference::p_value(2.0, 0.0).is_nan());
    }

    #[test]
    fn test_significance_flags() {
        let mut p = Col::zeros(3);
        p[0] = 0.01;
        p[1] = 0.2;
        p[2] = f64::NAN;
        let sig = CoefficientInference::significant(&p, 0.05);
        assert_eq!(sig, vec![true, false, false]);
    }

    #[test]
    fn test_standard_errors_from_inverse() {
        let mut inv = Mat::zeros(2, 2);
        inv[(0, 0)] = 4.0;
        inv[(1, 1)] = 0.25;

        let (se, se_int) = CoefficientInference::standard_errors(&inv, 1.0, true);
        assert!((se_int.unwrap() - 2.0).abs() < 1e-12);
        assert!((se[0] - 0.5).abs() < 1e-12);

        let (se, se_int) = CoefficientInference::standard_errors(&inv, 1.0, false);
        assert!(se_int.is_none());
        assert_eq!(se.nrows(), 2);
    }
}
