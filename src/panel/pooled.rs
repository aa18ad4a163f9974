//! Pooled OLS panel estimator.

use crate::core::panel::PanelData;
use crate::core::result::PanelFitResult;
use crate::inference::CoefficientInference;
use crate::solvers::traits::{FittedPanelModel, GwprError, PanelRegressor};
use crate::solvers::wls::solve_weighted;
use faer::Mat;

/// Pooled OLS: ignores the panel structure and fits a single regression
/// with intercept over all N×T observations.
///
/// Serves as the restricted model for the poolability test and as the
/// baseline the panel estimators are compared against.
#[derive(Debug, Clone)]
pub struct PooledRegressor {
    compute_inference: bool,
    rank_tolerance: f64,
}

impl Default for PooledRegressor {
    fn default() -> Self {
        Self {
            compute_inference: true,
            rank_tolerance: 1e-10,
        }
    }
}

impl PooledRegressor {
    /// Create a pooled estimator with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set whether to compute inference statistics.
    pub fn compute_inference(mut self, compute: bool) -> Self {
        self.compute_inference = compute;
        self
    }

    /// Set the rank tolerance for singularity detection.
    pub fn rank_tolerance(mut self, tol: f64) -> Self {
        self.rank_tolerance = tol;
        self
    }
}

impl PanelRegressor for PooledRegressor {
    type Fitted = FittedPooled;

    fn fit(&self, panel: &PanelData) -> Result<FittedPooled, GwprError> {
        let n = panel.n_obs();
        let k = panel.n_vars();
        let n_params = k + 1;

        if n <= n_params {
            return Err(GwprError::InsufficientObservations {
                needed: n_params + 1,
                got: n,
            });
        }

        let fit = solve_weighted(panel.x(), panel.y(), None, true, self.rank_tolerance)?;

        let df = (n - n_params) as f64;
        let mse = fit.weighted_rss / df;

        let r_squared = if fit.weighted_tss > 0.0 {
            (1.0 - fit.weighted_rss / fit.weighted_tss).clamp(0.0, 1.0)
        } else {
            f64::NAN
        };
        let adj_r_squared = 1.0 - (1.0 - r_squared) * (n as f64 - 1.0) / df;

        let mut result = PanelFitResult::empty(k, n);
        result.coefficients = fit.coefficients.clone();
        result.intercept = fit.intercept;
        result.residuals = fit.residuals.clone();
        result.fitted_values = fit.fitted.clone();
        result.r_squared = r_squared;
        result.adj_r_squared = adj_r_squared;
        result.mse = mse;
        result.n_parameters = n_params;
        result.df_residual = df;

        // Slope covariance block of σ²(X_aug'X_aug)⁻¹.
        result.covariance = Some(Mat::from_fn(k, k, |a, b| {
            mse * fit.normal_inverse[(a + 1, b + 1)]
        }));

        if self.compute_inference {
            let (se, se_int) = CoefficientInference::standard_errors(&fit.normal_inverse, mse, true);
            let t_stats = CoefficientInference::t_statistics(&fit.coefficients, &se);
            result.p_values = CoefficientInference::p_values(&t_stats, df);
            result.intercept_std_error = se_int;
            let t_int =
                CoefficientInference::t_statistic(fit.intercept.unwrap_or(f64::NAN), se_int.unwrap_or(f64::NAN));
            result.intercept_t_statistic = Some(t_int);
            result.intercept_p_value = Some(CoefficientInference::p_value(t_int, df));
            result.std_errors = se;
            result.t_statistics = t_stats;
        }

        Ok(FittedPooled { result })
    }
}

/// A fitted pooled OLS model.
#[derive(Debug, Clone)]
pub struct FittedPooled {
    result: PanelFitResult,
}

impl FittedPanelModel for FittedPooled {
    fn result(&self) -> &PanelFitResult {
        &self.result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::panel::PanelRow;

    fn linear_panel() -> PanelData {
        let mut rows = Vec::new();
        for (i, id) in ["a", "b", "c", "d"].iter().enumerate() {
            for p in 0..3i64 {
                let x = (i as f64) + (p as f64) * 0.5;
                rows.push(PanelRow {
                    location_id: id.to_string(),
                    period: p,
                    dependent: 1.0 + 2.0 * x,
                    explanatory: vec![x],
                    coordinates: (i as f64, 0.0),
                });
            }
        }
        PanelData::from_rows(&rows, vec!["x1".into()]).unwrap()
    }

    #[test]
    fn test_pooled_recovers_exact_line() {
        let panel = linear_panel();
        let fitted = PooledRegressor::new().fit(&panel).unwrap();

        assert!((fitted.intercept().unwrap() - 1.0).abs() < 1e-9);
        assert!((fitted.coefficients()[0] - 2.0).abs() < 1e-9);
        assert!((fitted.r_squared() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_pooled_inference_present() {
        let panel = linear_panel();
        let fitted = PooledRegressor::new().fit(&panel).unwrap();
        let result = fitted.result();

        assert_eq!(result.std_errors.nrows(), 1);
        assert!(result.intercept_std_error.is_some());
        assert!(result.covariance.is_some());
        assert_eq!(result.df_residual as usize, 12 - 2);
    }
}
