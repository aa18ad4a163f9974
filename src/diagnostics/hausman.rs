//! Hausman specification test.

use crate::panel::fixed_effects::FittedFixedEffects;
use crate::panel::random_effects::FittedRandomEffects;
use crate::solvers::traits::{FittedPanelModel, GwprError};
use crate::utils::qr_inverse;
use faer::{Col, Mat};
use statrs::distribution::{ChiSquared, ContinuousCDF};

/// Result of the Hausman test.
#[derive(Debug, Clone, Copy)]
pub struct HausmanTest {
    /// χ² statistic.
    pub statistic: f64,
    /// Degrees of freedom (number of slope coefficients).
    pub df: usize,
    /// Upper-tail p-value. Small values reject random effects in favor
    /// of fixed effects.
    pub p_value: f64,
}

/// Compare fixed and random effects slope estimates:
///
/// H = (β_fe - β_re)' [V_fe - V_re]⁻¹ (β_fe - β_re)  ~  χ²(K)
///
/// Both fitted models must carry their slope covariance matrices.
pub fn hausman(
    fe: &FittedFixedEffects,
    re: &FittedRandomEffects,
) -> Result<HausmanTest, GwprError> {
    let k = fe.coefficients().nrows();
    if re.coefficients().nrows() != k {
        return Err(GwprError::DimensionMismatch {
            x_rows: k,
            y_len: re.coefficients().nrows(),
        });
    }

    let v_fe = fe.result().covariance.as_ref().ok_or_else(|| {
        GwprError::NumericalError("fixed effects fit has no covariance matrix".to_string())
    })?;
    let v_re = re.result().covariance.as_ref().ok_or_else(|| {
        GwprError::NumericalError("random effects fit has no covariance matrix".to_string())
    })?;

    let diff = Col::from_fn(k, |j| fe.coefficients()[j] - re.coefficients()[j]);
    let v_diff = Mat::from_fn(k, k, |a, b| v_fe[(a, b)] - v_re[(a, b)]);

    let v_inv = qr_inverse(&v_diff, 1e-14).ok_or_else(|| {
        GwprError::NumericalError(
            "covariance difference is not invertible; Hausman statistic undefined".to_string(),
        )
    })?;

    let mut statistic = 0.0;
    for a in 0..k {
        for b in 0..k {
            statistic += diff[a] * v_inv[(a, b)] * diff[b];
        }
    }
    // The covariance difference can lose positive definiteness in
    // finite samples; a slightly negative quadratic form is treated as
    // zero, anything clearly negative is an error.
    if statistic < -1e-8 {
        return Err(GwprError::NumericalError(
            "negative Hausman statistic; covariance difference is not positive definite"
                .to_string(),
        ));
    }
    let statistic = statistic.max(0.0);

    let p_value = match ChiSquared::new(k as f64) {
        Ok(dist) => 1.0 - dist.cdf(statistic),
        Err(_) => f64::NAN,
    };

    Ok(HausmanTest {
        statistic,
        df: k,
        p_value,
    })
}
