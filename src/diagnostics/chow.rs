//! Poolability (Chow) test.

use crate::core::panel::PanelData;
use crate::panel::fixed_effects::FixedEffectsRegressor;
use crate::panel::pooled::PooledRegressor;
use crate::solvers::traits::{FittedPanelModel, GwprError, PanelRegressor};
use statrs::distribution::{ContinuousCDF, FisherSnedecor};

/// Result of the poolability F test.
#[derive(Debug, Clone, Copy)]
pub struct PoolabilityTest {
    /// F statistic.
    pub statistic: f64,
    /// Numerator degrees of freedom (N - 1).
    pub df_num: f64,
    /// Denominator degrees of freedom (n - N - K).
    pub df_den: f64,
    /// Upper-tail p-value. Small values reject pooling in favor of
    /// location-specific intercepts.
    pub p_value: f64,
}

/// Test whether a single pooled intercept is adequate against
/// location-specific intercepts (fixed effects).
///
/// F = [(RSS_pooled - RSS_fe) / (N - 1)] / [RSS_fe / (n - N - K)]
pub fn chow_poolability(panel: &PanelData) -> Result<PoolabilityTest, GwprError> {
    let n = panel.n_obs();
    let n_locations = panel.n_locations();
    let k = panel.n_vars();

    let pooled = PooledRegressor::new().compute_inference(false).fit(panel)?;
    let within = FixedEffectsRegressor::new()
        .compute_inference(false)
        .fit(panel)?;

    let rss_pooled = pooled.result().rss();
    let rss_within = within.result().rss();

    let df_num = (n_locations - 1) as f64;
    let df_den = (n - n_locations - k) as f64;
    if df_num <= 0.0 || df_den <= 0.0 {
        return Err(GwprError::InsufficientObservations {
            needed: n_locations + k + 1,
            got: n,
        });
    }

    if !(rss_within > 0.0) {
        return Err(GwprError::NumericalError(
            "within residual sum of squares is zero; F statistic undefined".to_string(),
        ));
    }

    let statistic = ((rss_pooled - rss_within) / df_num) / (rss_within / df_den);
    let p_value = match FisherSnedecor::new(df_num, df_den) {
        Ok(dist) => 1.0 - dist.cdf(statistic.max(0.0)),
        Err(_) => f64::NAN,
    };

    Ok(PoolabilityTest {
        statistic,
        df_num,
        df_den,
        p_value,
    })
}
