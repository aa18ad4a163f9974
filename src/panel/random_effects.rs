//! Random effects (Swamy–Arora) panel estimator.

use crate::core::panel::PanelData;
use crate::core::result::PanelFitResult;
use crate::inference::CoefficientInference;
use crate::panel::fixed_effects::FixedEffectsRegressor;
use crate::solvers::traits::{FittedPanelModel, GwprError, PanelRegressor};
use crate::solvers::wls::solve_weighted;
use faer::{Col, Mat};

/// Random effects estimator using Swamy–Arora variance components.
///
/// The idiosyncratic variance comes from the within (fixed effects)
/// residuals, the between variance from a regression on location means.
/// Their ratio gives the quasi-demeaning factor θ ∈ [0, 1): θ = 0
/// reduces to pooled OLS, θ → 1 approaches fixed effects.
#[derive(Debug, Clone)]
pub struct RandomEffectsRegressor {
    compute_inference: bool,
    rank_tolerance: f64,
}

impl Default for RandomEffectsRegressor {
    fn default() -> Self {
        Self {
            compute_inference: true,
            rank_tolerance: 1e-10,
        }
    }
}

impl RandomEffectsRegressor {
    /// Create a random effects estimator with default settings.
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

impl PanelRegressor for RandomEffectsRegressor {
    type Fitted = FittedRandomEffects;

    fn fit(&self, panel: &PanelData) -> Result<FittedRandomEffects, GwprError> {
        let n = panel.n_obs();
        let n_locations = panel.n_locations();
        let t = panel.n_periods() as f64;
        let k = panel.n_vars();

        // The between regression needs N > K + 1 location means.
        if n_locations <= k + 1 {
            return Err(GwprError::InsufficientObservations {
                needed: k + 2,
                got: n_locations,
            });
        }

        // Idiosyncratic variance from the within residuals.
        let within = FixedEffectsRegressor::new()
            .compute_inference(false)
            .rank_tolerance(self.rank_tolerance)
            .fit(panel)?;
        let sigma2_e = within.result().mse;

        // Between variance from the location-mean regression.
        let means_y = panel.location_means_y();
        let means_x = panel.location_means_x();
        let between = solve_weighted(&means_x, &means_y, None, true, self.rank_tolerance)?;
        let df_between = (n_locations - k - 1) as f64;
        let sigma2_between = between.weighted_rss / df_between;

        let sigma2_u = (sigma2_between - sigma2_e / t).max(0.0);

        let denom = sigma2_e + t * sigma2_u;
        if !(denom > 0.0) {
            return Err(GwprError::NumericalError(
                "variance components are degenerate (zero idiosyncratic variance)".to_string(),
            ));
        }
        let theta = 1.0 - (sigma2_e / denom).sqrt();
        if theta >= 1.0 {
            return Err(GwprError::NumericalError(
                "quasi-demeaning factor reached 1; idiosyncratic variance is zero".to_string(),
            ));
        }

        // Quasi-demean and fit GLS: y - θȳ_i on [(1-θ) | x - θx̄_i].
        let obs_location = panel.obs_location();
        let y_star = Col::from_fn(n, |s| panel.y()[s] - theta * means_y[obs_location[s]]);
        let z = Mat::from_fn(n, k + 1, |s, j| {
            if j == 0 {
                1.0 - theta
            } else {
                panel.x()[(s, j - 1)] - theta * means_x[(obs_location[s], j - 1)]
            }
        });

        let gls = solve_weighted(&z, &y_star, None, false, self.rank_tolerance)?;
        let intercept = gls.coefficients[0];
        let slopes = Col::from_fn(k, |j| gls.coefficients[j + 1]);

        let df = (n - k - 1) as f64;
        let mse = gls.weighted_rss / df;

        // Goodness of fit in the original scale.
        let mut fitted_values = Col::zeros(n);
        let mut residuals = Col::zeros(n);
        for s in 0..n {
            let mut pred = intercept;
            for j in 0..k {
                pred += panel.x()[(s, j)] * slopes[j];
            }
            fitted_values[s] = pred;
            residuals[s] = panel.y()[s] - pred;
        }
        let y_mean: f64 = panel.y().iter().sum::<f64>() / n as f64;
        let tss: f64 = panel.y().iter().map(|&v| (v - y_mean) * (v - y_mean)).sum();
        let rss: f64 = residuals.iter().map(|&r| r * r).sum();
        let r_squared = if tss > 0.0 {
            (1.0 - rss / tss).clamp(0.0, 1.0)
        } else {
            f64::NAN
        };
        let adj_r_squared = 1.0 - (1.0 - r_squared) * (n as f64 - 1.0) / df;

        let mut result = PanelFitResult::empty(k, n);
        result.coefficients = slopes.clone();
        result.intercept = Some(intercept);
        result.residuals = residuals;
        result.fitted_values = fitted_values;
        result.r_squared = r_squared;
        result.adj_r_squared = adj_r_squared;
        result.mse = mse;
        result.n_parameters = k + 1;
        result.df_residual = df;
        result.covariance = Some(Mat::from_fn(k, k, |a, b| {
            mse * gls.normal_inverse[(a + 1, b + 1)]
        }));

        if self.compute_inference {
            let (se, se_int) = CoefficientInference::standard_errors(&gls.normal_inverse, mse, true);
            let t_stats = CoefficientInference::t_statistics(&slopes, &se);
            result.p_values = CoefficientInference::p_values(&t_stats, df);
            result.intercept_std_error = se_int;
            let t_int = CoefficientInference::t_statistic(intercept, se_int.unwrap_or(f64::NAN));
            result.intercept_t_statistic = Some(t_int);
            result.intercept_p_value = Some(CoefficientInference::p_value(t_int, df));
            result.std_errors = se;
            result.t_statistics = t_stats;
        }

        Ok(FittedRandomEffects {
            result,
            theta,
            sigma2_e,
            sigma2_u,
        })
    }
}

/// A fitted random effects model.
#[derive(Debug, Clone)]
pub struct FittedRandomEffects {
    result: PanelFitResult,
    theta: f64,
    sigma2_e: f64,
    sigma2_u: f64,
}

impl FittedRandomEffects {
    /// Quasi-demeaning factor θ.
    pub fn theta(&self) -> f64 {
        self.theta
    }

    /// Idiosyncratic error variance.
    pub fn sigma2_idiosyncratic(&self) -> f64 {
        self.sigma2_e
    }

    /// Location effect variance.
    pub fn sigma2_unit(&self) -> f64 {
        self.sigma2_u
    }
}

impl FittedPanelModel for FittedRandomEffects {
    fn result(&self) -> &PanelFitResult {
        &self.result
    }
}
