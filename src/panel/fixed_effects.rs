//! Fixed effects (within) panel estimator.

use crate::core::panel::PanelData;
use crate::core::result::PanelFitResult;
use crate::inference::CoefficientInference;
use crate::solvers::traits::{FittedPanelModel, GwprError, PanelRegressor};
use crate::solvers::wls::solve_weighted;
use crate::utils::detect_constant_columns;
use faer::{Col, Mat};

/// Fixed effects estimator: removes location-specific intercepts by
/// demeaning every variable within its location, then fits OLS without
/// intercept on the demeaned data.
///
/// Reported R² is the within R². The absorbed per-location intercepts
/// are recovered and exposed on the fitted model.
#[derive(Debug, Clone)]
pub struct FixedEffectsRegressor {
    compute_inference: bool,
    rank_tolerance: f64,
}

impl Default for FixedEffectsRegressor {
    fn default() -> Self {
        Self {
            compute_inference: true,
            rank_tolerance: 1e-10,
        }
    }
}

impl FixedEffectsRegressor {
    /// Create a fixed effects estimator with default settings.
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

impl PanelRegressor for FixedEffectsRegressor {
    type Fitted = FittedFixedEffects;

    fn fit(&self, panel: &PanelData) -> Result<FittedFixedEffects, GwprError> {
        let n = panel.n_obs();
        let n_locations = panel.n_locations();
        let k = panel.n_vars();

        // df = n - N - K: one absorbed intercept per location.
        if n <= n_locations + k {
            return Err(GwprError::InsufficientObservations {
                needed: n_locations + k + 1,
                got: n,
            });
        }

        let means_y = panel.location_means_y();
        let means_x = panel.location_means_x();
        let obs_location = panel.obs_location();

        let y_within = Col::from_fn(n, |s| panel.y()[s] - means_y[obs_location[s]]);
        let x_within = Mat::from_fn(n, k, |s, j| panel.x()[(s, j)] - means_x[(obs_location[s], j)]);

        // A variable without within-location variation cannot be
        // identified once the location intercepts are absorbed.
        let constant = detect_constant_columns(&x_within, self.rank_tolerance);
        if let Some(j) = constant.iter().position(|&c| c) {
            return Err(GwprError::NumericalError(format!(
                "explanatory variable '{}' has no within-location variation",
                panel.var_names()[j]
            )));
        }

        let fit = solve_weighted(&x_within, &y_within, None, false, self.rank_tolerance)?;

        let df = (n - n_locations - k) as f64;
        let mse = fit.weighted_rss / df;

        // Within R² on the demeaned data.
        let tss_within: f64 = y_within.iter().map(|&v| v * v).sum();
        let r_squared = if tss_within > 0.0 {
            (1.0 - fit.weighted_rss / tss_within).clamp(0.0, 1.0)
        } else {
            f64::NAN
        };
        let adj_r_squared = 1.0 - (1.0 - r_squared) * (n as f64 - 1.0) / df;

        // Recover the absorbed unit intercepts: α_i = ȳ_i - x̄_i'β.
        let unit_effects = Col::from_fn(n_locations, |i| {
            let mut a = means_y[i];
            for j in 0..k {
                a -= means_x[(i, j)] * fit.coefficients[j];
            }
            a
        });

        // Residuals and fitted values in the original scale.
        let mut fitted_values = Col::zeros(n);
        let mut residuals = Col::zeros(n);
        for s in 0..n {
            let mut pred = unit_effects[obs_location[s]];
            for j in 0..k {
                pred += panel.x()[(s, j)] * fit.coefficients[j];
            }
            fitted_values[s] = pred;
            residuals[s] = panel.y()[s] - pred;
        }

        let mut result = PanelFitResult::empty(k, n);
        result.coefficients = fit.coefficients.clone();
        result.intercept = None;
        result.residuals = residuals;
        result.fitted_values = fitted_values;
        result.r_squared = r_squared;
        result.adj_r_squared = adj_r_squared;
        result.mse = mse;
        result.n_parameters = n_locations + k;
        result.df_residual = df;
        result.covariance = Some(Mat::from_fn(k, k, |a, b| mse * fit.normal_inverse[(a, b)]));

        if self.compute_inference {
            let (se, _) = CoefficientInference::standard_errors(&fit.normal_inverse, mse, false);
            let t_stats = CoefficientInference::t_statistics(&fit.coefficients, &se);
            result.p_values = CoefficientInference::p_values(&t_stats, df);
            result.std_errors = se;
            result.t_statistics = t_stats;
        }

        Ok(FittedFixedEffects {
            result,
            unit_effects,
        })
    }
}

/// A fitted fixed effects model.
#[derive(Debug, Clone)]
pub struct FittedFixedEffects {
    result: PanelFitResult,
    unit_effects: Col<f64>,
}

impl FittedFixedEffects {
    /// Recovered per-location intercepts, in panel order.
    pub fn unit_effects(&self) -> &Col<f64> {
        &self.unit_effects
    }
}

impl FittedPanelModel for FittedFixedEffects {
    fn result(&self) -> &PanelFitResult {
        &self.result
    }
}
