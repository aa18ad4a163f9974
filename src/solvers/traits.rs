//! Core traits and errors for panel estimators.

use crate::core::options::OptionsError;
use crate::core::panel::{PanelData, PanelError};
use crate::core::result::PanelFitResult;
use faer::{Col, Mat};
use thiserror::Error;

/// Errors that can occur during estimation.
#[derive(Debug, Error)]
pub enum GwprError {
    #[error("dimension mismatch: X has {x_rows} rows but y has {y_len} elements")]
    DimensionMismatch { x_rows: usize, y_len: usize },

    #[error("insufficient observations: need at least {needed}, got {got}")]
    InsufficientObservations { needed: usize, got: usize },

    #[error("weighted design matrix is singular or nearly singular")]
    SingularMatrix,

    #[error("local design at location '{location}' is singular")]
    SingularDesign { location: String },

    #[error("no admissible bandwidth candidate for location '{location}'")]
    BandwidthSearchExhausted { location: String },

    #[error("invalid weights: all weights must be non-negative and not all zero")]
    InvalidWeights,

    #[error("invalid options: {0}")]
    InvalidOptions(#[from] OptionsError),

    #[error("invalid panel: {0}")]
    InvalidPanel(#[from] PanelError),

    #[error("numerical error: {0}")]
    NumericalError(String),
}

/// A panel regression estimator that can be fit to a validated panel.
pub trait PanelRegressor {
    /// The type of the fitted model.
    type Fitted;

    /// Fit the model to the panel.
    fn fit(&self, panel: &PanelData) -> Result<Self::Fitted, GwprError>;
}

/// A fitted classical panel model.
pub trait FittedPanelModel {
    /// Access the fit result (coefficients, statistics, inference).
    fn result(&self) -> &PanelFitResult;

    /// Get the slope coefficients (convenience method).
    fn coefficients(&self) -> &Col<f64> {
        &self.result().coefficients
    }

    /// Get the intercept (convenience method).
    fn intercept(&self) -> Option<f64> {
        self.result().intercept
    }

    /// Get R² (convenience method).
    fn r_squared(&self) -> f64 {
        self.result().r_squared
    }

    /// Predict mean responses for new explanatory values.
    fn predict(&self, x: &Mat<f64>) -> Col<f64> {
        let result = self.result();
        let intercept = result.intercept.unwrap_or(0.0);
        let k = result.coefficients.nrows().min(x.ncols());

        Col::from_fn(x.nrows(), |i| {
            let mut pred = intercept;
            for j in 0..k {
                pred += x[(i, j)] * result.coefficients[j];
            }
            pred
        })
    }
}
