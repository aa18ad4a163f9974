//! Result structures for classical and local estimation.

use faer::{Col, Mat};

/// Result of one classical panel regression fit (pooled, fixed effects
/// or random effects).
#[derive(Debug, Clone)]
pub struct PanelFitResult {
    /// Estimated slope coefficients (length K).
    pub coefficients: Col<f64>,

    /// Intercept term, if the model has one.
    pub intercept: Option<f64>,

    /// Standard errors of the slope coefficients.
    pub std_errors: Col<f64>,

    /// Standard error of the intercept.
    pub intercept_std_error: Option<f64>,

    /// t-statistics for the slope coefficients.
    pub t_statistics: Col<f64>,

    /// t-statistic for the intercept.
    pub intercept_t_statistic: Option<f64>,

    /// Two-tailed p-values for the slope coefficients.
    pub p_values: Col<f64>,

    /// Two-tailed p-value for the intercept.
    pub intercept_p_value: Option<f64>,

    /// Residuals in the original (untransformed) scale.
    pub residuals: Col<f64>,

    /// Fitted values in the original (untransformed) scale.
    pub fitted_values: Col<f64>,

    /// Goodness of fit. For fixed effects this is the within R².
    pub r_squared: f64,

    /// Adjusted R².
    pub adj_r_squared: f64,

    /// Residual variance estimate on the model's residual df.
    pub mse: f64,

    /// Number of observations used.
    pub n_observations: usize,

    /// Number of estimated mean parameters (slopes + intercept; for
    /// fixed effects the absorbed unit intercepts are counted too).
    pub n_parameters: usize,

    /// Residual degrees of freedom.
    pub df_residual: f64,

    /// Covariance matrix of the slope coefficients (K × K). Used by the
    /// Hausman test.
    pub covariance: Option<Mat<f64>>,
}

impl PanelFitResult {
    /// Create a result shell with inference fields set to NaN.
    pub(crate) fn empty(n_vars: usize, n_obs: usize) -> Self {
        Self {
            coefficients: Col::zeros(n_vars),
            intercept: None,
            std_errors: Col::from_fn(n_vars, |_| f64::NAN),
            intercept_std_error: None,
            t_statistics: Col::from_fn(n_vars, |_| f64::NAN),
            intercept_t_statistic: None,
            p_values: Col::from_fn(n_vars, |_| f64::NAN),
            intercept_p_value: None,
            residuals: Col::zeros(n_obs),
            fitted_values: Col::zeros(n_obs),
            r_squared: f64::NAN,
            adj_r_squared: f64::NAN,
            mse: f64::NAN,
            n_observations: n_obs,
            n_parameters: 0,
            df_residual: 0.0,
            covariance: None,
        }
    }

    /// Residual sum of squares.
    pub fn rss(&self) -> f64 {
        self.residuals.iter().map(|&r| r * r).sum()
    }
}

/// Per-location output of the geographically weighted estimator.
///
/// One of these is produced for every location, in panel order. A
/// location whose weighted design could not be solved keeps its row with
/// NaN estimates and `singular = true`, so downstream tables never lose
/// rows.
#[derive(Debug, Clone)]
pub struct LocalModelResult {
    /// Identifier of the location this row describes.
    pub location_id: String,

    /// Local intercept.
    pub intercept: f64,

    /// Local slope coefficients (length K).
    pub coefficients: Col<f64>,

    /// Standard error of the local intercept.
    pub intercept_std_error: f64,

    /// Standard errors of the local slopes.
    pub std_errors: Col<f64>,

    /// t-statistic of the local intercept.
    pub intercept_t_statistic: f64,

    /// t-statistics of the local slopes.
    pub t_statistics: Col<f64>,

    /// Two-tailed p-value of the local intercept.
    pub intercept_p_value: f64,

    /// Two-tailed p-values of the local slopes.
    pub p_values: Col<f64>,

    /// Weighted goodness of fit centered on this location, in [0, 1].
    pub local_r_squared: f64,

    /// Effective number of contributing observations, Σw / max(w).
    pub effective_obs: f64,

    /// Distance bandwidth used for this location's weights.
    pub bandwidth: f64,

    /// Neighbor count behind the adaptive bandwidth (0 for fixed mode).
    pub neighbor_count: usize,

    /// True when no candidate bandwidth met the minimum-observation
    /// constraint and the maximum candidate was used instead.
    pub bandwidth_exhausted: bool,

    /// True when the weighted design was singular and the estimates are
    /// missing.
    pub singular: bool,
}

impl LocalModelResult {
    /// A missing-value row for a location whose local regression failed.
    pub fn missing(
        location_id: String,
        n_vars: usize,
        bandwidth: f64,
        neighbor_count: usize,
        bandwidth_exhausted: bool,
    ) -> Self {
        let nan_col = || Col::from_fn(n_vars, |_| f64::NAN);
        Self {
            location_id,
            intercept: f64::NAN,
            coefficients: nan_col(),
            intercept_std_error: f64::NAN,
            std_errors: nan_col(),
            intercept_t_statistic: f64::NAN,
            t_statistics: nan_col(),
            intercept_p_value: f64::NAN,
            p_values: nan_col(),
            local_r_squared: f64::NAN,
            effective_obs: f64::NAN,
            bandwidth,
            neighbor_count,
            bandwidth_exhausted,
            singular: true,
        }
    }

    /// Number of explanatory variables in this row.
    pub fn n_vars(&self) -> usize {
        self.coefficients.nrows()
    }
}
