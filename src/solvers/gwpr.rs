//! Geographically weighted panel regression estimator.

use crate::core::options::{BandwidthMode, GwprOptions, GwprOptionsBuilder};
use crate::core::panel::PanelData;
use crate::core::result::LocalModelResult;
use crate::inference::CoefficientInference;
use crate::solvers::bandwidth::{self, BandwidthSelection};
use crate::solvers::traits::{GwprError, PanelRegressor};
use crate::solvers::wls::solve_weighted;
use crate::spatial::distance::DistanceMatrix;
use crate::spatial::weights::{location_weights, observation_weights, weight_matrix};
use faer::{Col, Mat};
use log::{info, warn};
use rayon::prelude::*;

/// Geographically weighted panel regression.
///
/// Fits one weighted least squares regression per location, with weights
/// decaying in distance from that location under the configured kernel
/// and an adaptively selected bandwidth. All T periods of every location
/// enter each local fit, each carrying its location's weight relative to
/// the target.
///
/// A location whose local design is singular is reported as a
/// missing-value row; it never aborts the remaining locations.
///
/// # Example
///
/// ```rust,ignore
/// use gwpr::prelude::*;
///
/// let fitted = GwprEstimator::builder()
///     .kernel(KernelType::Bisquare)
///     .build()?
///     .fit(&panel)?;
///
/// for local in fitted.locals() {
///     println!("{}: R² = {:.3}", local.location_id, local.local_r_squared);
/// }
/// ```
#[derive(Debug, Clone)]
pub struct GwprEstimator {
    options: GwprOptions,
}

impl GwprEstimator {
    /// Create a new estimator with the given options.
    pub fn new(options: GwprOptions) -> Self {
        Self { options }
    }

    /// Create a builder for configuring the estimator.
    pub fn builder() -> GwprEstimatorBuilder {
        GwprEstimatorBuilder::default()
    }

    /// The estimator's options.
    pub fn options(&self) -> &GwprOptions {
        &self.options
    }
}

impl PanelRegressor for GwprEstimator {
    type Fitted = FittedGwpr;

    fn fit(&self, panel: &PanelData) -> Result<FittedGwpr, GwprError> {
        self.options.validate()?;

        let n = panel.n_locations();
        let distances = DistanceMatrix::from_coordinates(panel.coordinates());

        info!(
            "gwpr: {} locations × {} periods, {} variables, kernel = {}, mode = {:?}",
            n,
            panel.n_periods(),
            panel.n_vars(),
            self.options.kernel,
            self.options.bandwidth
        );

        let selection = bandwidth::select(panel, &distances, &self.options)?;

        let locals: Vec<LocalModelResult> = (0..n)
            .into_par_iter()
            .map(|i| fit_local(panel, &distances, &selection, &self.options, i))
            .collect();

        let n_failed = locals.iter().filter(|l| l.singular).count();
        if n_failed > 0 {
            warn!("gwpr: {n_failed} of {n} locations produced singular local designs");
        }

        let weights = weight_matrix(panel, &distances, &selection.bandwidths, self.options.kernel);

        Ok(FittedGwpr {
            options: self.options.clone(),
            location_ids: panel.location_ids().to_vec(),
            var_names: panel.var_names().to_vec(),
            locals,
            weights,
            distances,
            selection,
        })
    }
}

/// Fit the final (full-weight) local regression for one location.
fn fit_local(
    panel: &PanelData,
    distances: &DistanceMatrix,
    selection: &BandwidthSelection,
    options: &GwprOptions,
    i: usize,
) -> LocalModelResult {
    let location_id = panel.location_ids()[i].clone();
    let b = selection.bandwidths[i];
    let neighbor_count = selection.neighbor_counts[i];
    let exhausted = selection.exhausted[i];
    let k = panel.n_vars();

    let loc_w = location_weights(distances, i, b, options.kernel);
    let w = observation_weights(&loc_w, panel.obs_location());

    let fit = match solve_weighted(panel.x(), panel.y(), Some(&w), true, options.rank_tolerance) {
        Ok(fit) => fit,
        Err(err) => {
            warn!("gwpr: location {location_id}: {err}");
            return LocalModelResult::missing(location_id, k, b, neighbor_count, exhausted);
        }
    };

    // Effective number of observations under the weight profile.
    let max_w = w.iter().fold(0.0f64, |acc, &wi| acc.max(wi));
    let effective_obs = w.iter().sum::<f64>() / max_w;
    let df = effective_obs - (k as f64 + 1.0);

    let local_r_squared = if fit.weighted_tss > 0.0 {
        (1.0 - fit.weighted_rss / fit.weighted_tss).clamp(0.0, 1.0)
    } else if fit.weighted_rss < 1e-10 {
        1.0
    } else {
        0.0
    };

    let mut result = LocalModelResult {
        location_id,
        intercept: fit.intercept.unwrap_or(f64::NAN),
        coefficients: fit.coefficients.clone(),
        intercept_std_error: f64::NAN,
        std_errors: Col::from_fn(k, |_| f64::NAN),
        intercept_t_statistic: f64::NAN,
        t_statistics: Col::from_fn(k, |_| f64::NAN),
        intercept_p_value: f64::NAN,
        p_values: Col::from_fn(k, |_| f64::NAN),
        local_r_squared,
        effective_obs,
        bandwidth: b,
        neighbor_count,
        bandwidth_exhausted: exhausted,
        singular: false,
    };

    if options.compute_inference && df > 0.0 {
        let mse = fit.weighted_rss / df;
        let (se, se_int) = CoefficientInference::standard_errors(&fit.normal_inverse, mse, true);
        let t_stats = CoefficientInference::t_statistics(&fit.coefficients, &se);
        let p_vals = CoefficientInference::p_values(&t_stats, df);

        result.intercept_std_error = se_int.unwrap_or(f64::NAN);
        result.intercept_t_statistic =
            CoefficientInference::t_statistic(result.intercept, result.intercept_std_error);
        result.intercept_p_value =
            CoefficientInference::p_value(result.intercept_t_statistic, df);
        result.std_errors = se;
        result.t_statistics = t_stats;
        result.p_values = p_vals;
    }

    result
}

/// A fitted geographically weighted panel regression.
#[derive(Debug, Clone)]
pub struct FittedGwpr {
    options: GwprOptions,
    location_ids: Vec<String>,
    var_names: Vec<String>,
    locals: Vec<LocalModelResult>,
    weights: Mat<f64>,
    distances: DistanceMatrix,
    selection: BandwidthSelection,
}

impl FittedGwpr {
    /// Per-location results, in panel order. Always one entry per
    /// location, including failed ones.
    pub fn locals(&self) -> &[LocalModelResult] {
        &self.locals
    }

    /// The result row for one location index.
    pub fn local(&self, i: usize) -> &LocalModelResult {
        &self.locals[i]
    }

    /// Location identifiers, in panel order.
    pub fn location_ids(&self) -> &[String] {
        &self.location_ids
    }

    /// Explanatory variable names.
    pub fn var_names(&self) -> &[String] {
        &self.var_names
    }

    /// The options the model was fit with.
    pub fn options(&self) -> &GwprOptions {
        &self.options
    }

    /// Full weight matrix (n_locations × n_obs) under the selected
    /// bandwidths.
    pub fn weight_matrix(&self) -> &Mat<f64> {
        &self.weights
    }

    /// Location-to-location distance matrix.
    pub fn distance_matrix(&self) -> &DistanceMatrix {
        &self.distances
    }

    /// The bandwidth selection outcome.
    pub fn selection(&self) -> &BandwidthSelection {
        &self.selection
    }

    /// Whether this fit used a cross-validated adaptive bandwidth.
    pub fn is_adaptive(&self) -> bool {
        !matches!(self.options.bandwidth, BandwidthMode::Fixed(_))
    }

    /// Fitted values at each location's own observations, using that
    /// location's local model. NaN for singular locations.
    pub fn local_fitted_values(&self, panel: &PanelData) -> Col<f64> {
        let t = panel.n_periods();
        Col::from_fn(panel.n_obs(), |s| {
            let local = &self.locals[s / t];
            if local.singular {
                return f64::NAN;
            }
            let mut pred = local.intercept;
            for j in 0..panel.n_vars() {
                pred += panel.x()[(s, j)] * local.coefficients[j];
            }
            pred
        })
    }
}

/// Builder for `GwprEstimator`.
#[derive(Debug, Clone, Default)]
pub struct GwprEstimatorBuilder {
    builder: GwprOptionsBuilder,
}

impl GwprEstimatorBuilder {
    /// Create a new builder with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the kernel family.
    pub fn kernel(mut self, kernel: crate::core::kernel::KernelType) -> Self {
        self.builder = self.builder.kernel(kernel);
        self
    }

    /// Set the bandwidth selection mode.
    pub fn bandwidth(mut self, mode: BandwidthMode) -> Self {
        self.builder = self.builder.bandwidth(mode);
        self
    }

    /// Set the minimum candidate neighbor count.
    pub fn min_neighbors(mut self, count: usize) -> Self {
        self.builder = self.builder.min_neighbors(count);
        self
    }

    /// Set whether to compute inference statistics.
    pub fn compute_inference(mut self, compute: bool) -> Self {
        self.builder = self.builder.compute_inference(compute);
        self
    }

    /// Set the significance threshold used in exported tables.
    pub fn significance_level(mut self, alpha: f64) -> Self {
        self.builder = self.builder.significance_level(alpha);
        self
    }

    /// Set the rank tolerance for singularity detection.
    pub fn rank_tolerance(mut self, tol: f64) -> Self {
        self.builder = self.builder.rank_tolerance(tol);
        self
    }

    /// Build the estimator, validating the options.
    pub fn build(self) -> Result<GwprEstimator, GwprError> {
        Ok(GwprEstimator::new(self.builder.build()?))
    }
}
