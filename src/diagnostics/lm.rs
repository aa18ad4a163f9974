//! Breusch–Pagan Lagrange multiplier test for random effects.

use crate::core::panel::PanelData;
use crate::panel::pooled::FittedPooled;
use crate::solvers::traits::{FittedPanelModel, GwprError};
use statrs::distribution::{ChiSquared, ContinuousCDF};

/// Result of the Breusch–Pagan LM test.
#[derive(Debug, Clone, Copy)]
pub struct LmTest {
    /// χ²(1) statistic.
    pub statistic: f64,
    /// Degrees of freedom (1).
    pub df: usize,
    /// Upper-tail p-value. Small values reject pooled OLS in favor of
    /// random effects.
    pub p_value: f64,
}

/// Test for the presence of location random effects using the pooled
/// OLS residuals:
///
/// LM = NT / (2(T-1)) * [ Σ_i (Σ_t e_it)² / Σ_it e_it² - 1 ]²  ~  χ²(1)
pub fn breusch_pagan(panel: &PanelData, pooled: &FittedPooled) -> Result<LmTest, GwprError> {
    let n_locations = panel.n_locations();
    let t = panel.n_periods();
    if t < 2 {
        return Err(GwprError::InsufficientObservations { needed: 2, got: t });
    }

    let residuals = &pooled.result().residuals;
    if residuals.nrows() != panel.n_obs() {
        return Err(GwprError::DimensionMismatch {
            x_rows: panel.n_obs(),
            y_len: residuals.nrows(),
        });
    }

    let mut sum_sq_location = 0.0;
    let mut sum_sq = 0.0;
    for i in 0..n_locations {
        let mut location_sum = 0.0;
        for s in panel.obs_range(i) {
            location_sum += residuals[s];
            sum_sq += residuals[s] * residuals[s];
        }
        sum_sq_location += location_sum * location_sum;
    }

    if !(sum_sq > 0.0) {
        return Err(GwprError::NumericalError(
            "pooled residual sum of squares is zero; LM statistic undefined".to_string(),
        ));
    }

    let nt = (n_locations * t) as f64;
    let ratio = sum_sq_location / sum_sq - 1.0;
    let statistic = nt / (2.0 * (t as f64 - 1.0)) * ratio * ratio;

    let p_value = match ChiSquared::new(1.0) {
        Ok(dist) => 1.0 - dist.cdf(statistic),
        Err(_) => f64::NAN,
    };

    Ok(LmTest {
        statistic,
        df: 1,
        p_value,
    })
}
