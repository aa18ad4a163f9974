//! Geographically weighted panel regression for balanced spatial
//! panels.
//!
//! This library fits regression models over panel data observed at
//! fixed spatial locations: classical pooled, fixed effects and random
//! effects estimators, specification tests to choose between them, and
//! a geographically weighted estimator whose coefficients vary by
//! location through kernel-weighted local least squares with adaptive,
//! cross-validated bandwidths.
//!
//! # Example
//!
//! ```rust,ignore
//! use gwpr::prelude::*;
//!
//! let schema = PanelSchema::new("poverty_rate", &["unemployment", "education"]);
//! let panel = gwpr::io::read_panel("panel.csv", &schema)?;
//!
//! // Classical estimators and specification tests.
//! let fixed = FixedEffectsRegressor::new().fit(&panel)?;
//! let random = RandomEffectsRegressor::new().fit(&panel)?;
//! let test = hausman(&fixed, &random)?;
//! println!("Hausman χ²({}) = {:.3}, p = {:.4}", test.df, test.statistic, test.p_value);
//!
//! // Geographically weighted fit with a bisquare kernel.
//! let fitted = GwprEstimator::builder()
//!     .kernel(KernelType::Bisquare)
//!     .build()?
//!     .fit(&panel)?;
//!
//! gwpr::io::write_tables(&fitted, "results/")?;
//! ```

pub mod core;
pub mod diagnostics;
pub mod inference;
pub mod io;
pub mod panel;
pub mod solvers;
pub mod spatial;
pub mod utils;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::core::{
        BandwidthMode, GwprOptions, GwprOptionsBuilder, KernelType, LocalModelResult,
        OptionsError, PanelData, PanelError, PanelFitResult, PanelRow,
    };
    pub use crate::diagnostics::{
        breusch_pagan, chow_poolability, hausman, HausmanTest, LmTest, PoolabilityTest,
    };
    pub use crate::io::{read_panel, write_tables, PanelIoError, PanelSchema};
    pub use crate::panel::{
        FittedFixedEffects, FittedPooled, FittedRandomEffects, FixedEffectsRegressor,
        PooledRegressor, RandomEffectsRegressor,
    };
    pub use crate::solvers::{
        BandwidthSelection, FittedGwpr, FittedPanelModel, GwprError, GwprEstimator,
        GwprEstimatorBuilder, PanelRegressor,
    };
    pub use crate::spatial::DistanceMatrix;
}

pub use crate::core::{GwprOptions, KernelType, LocalModelResult, PanelData};
pub use crate::solvers::{FittedGwpr, GwprError, GwprEstimator, PanelRegressor};
