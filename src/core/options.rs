//! Estimation options and configuration.

use crate::core::kernel::KernelType;
use thiserror::Error;

/// How the spatial bandwidth is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum BandwidthMode {
    /// One adaptive bandwidth per location, each selected by
    /// leave-one-location-out cross-validation. This is the primary mode.
    #[default]
    AdaptiveLocal,
    /// A single neighbor count shared by all locations, selected by
    /// minimizing the summed cross-validation score. The distance
    /// bandwidth still differs per location.
    AdaptiveGlobal,
    /// A fixed distance bandwidth applied to every location; no search.
    Fixed(f64),
}

/// Configuration for the geographically weighted estimator.
#[derive(Debug, Clone)]
pub struct GwprOptions {
    /// Kernel family for distance weighting (default: Gaussian).
    pub kernel: KernelType,
    /// Bandwidth selection mode (default: per-location adaptive).
    pub bandwidth: BandwidthMode,
    /// Lower bound on the candidate neighbor count during bandwidth
    /// search. `None` derives it from the variable count and panel length
    /// so the local regression stays identified.
    pub min_neighbors: Option<usize>,
    /// Whether to compute standard errors, t-statistics and p-values
    /// (default: true).
    pub compute_inference: bool,
    /// Threshold used for the significance flags in exported tables
    /// (default: 0.05).
    pub significance_level: f64,
    /// Tolerance below which an R diagonal entry marks the weighted
    /// design as singular.
    pub rank_tolerance: f64,
}

impl Default for GwprOptions {
    fn default() -> Self {
        Self {
            kernel: KernelType::Gaussian,
            bandwidth: BandwidthMode::AdaptiveLocal,
            min_neighbors: None,
            compute_inference: true,
            significance_level: 0.05,
            rank_tolerance: 1e-10,
        }
    }
}

/// Errors that can occur when validating estimation options.
#[derive(Debug, Error)]
pub enum OptionsError {
    #[error("fixed bandwidth must be positive, got {0}")]
    InvalidBandwidth(f64),
    #[error("min_neighbors must be at least 2, got {0}")]
    InvalidMinNeighbors(usize),
    #[error("significance_level must be in (0, 1), got {0}")]
    InvalidSignificanceLevel(f64),
    #[error("rank_tolerance must be positive, got {0}")]
    InvalidRankTolerance(f64),
}

impl GwprOptions {
    /// Create a new builder for estimation options.
    pub fn builder() -> GwprOptionsBuilder {
        GwprOptionsBuilder::default()
    }

    /// Validate the options and return an error if invalid.
    pub fn validate(&self) -> Result<(), OptionsError> {
        if let BandwidthMode::Fixed(b) = self.bandwidth {
            if !(b > 0.0) {
                return Err(OptionsError::InvalidBandwidth(b));
            }
        }
        if let Some(m) = self.min_neighbors {
            if m < 2 {
                return Err(OptionsError::InvalidMinNeighbors(m));
            }
        }
        if self.significance_level <= 0.0 || self.significance_level >= 1.0 {
            return Err(OptionsError::InvalidSignificanceLevel(
                self.significance_level,
            ));
        }
        if self.rank_tolerance <= 0.0 {
            return Err(OptionsError::InvalidRankTolerance(self.rank_tolerance));
        }
        Ok(())
    }
}

/// Builder for `GwprOptions`.
#[derive(Debug, Clone, Default)]
pub struct GwprOptionsBuilder {
    options: GwprOptions,
}

impl GwprOptionsBuilder {
    /// Create a new builder with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the kernel family.
    pub fn kernel(mut self, kernel: KernelType) -> Self {
        self.options.kernel = kernel;
        self
    }

    /// Set the bandwidth selection mode.
    pub fn bandwidth(mut self, mode: BandwidthMode) -> Self {
        self.options.bandwidth = mode;
        self
    }

    /// Set the minimum candidate neighbor count.
    pub fn min_neighbors(mut self, count: usize) -> Self {
        self.options.min_neighbors = Some(count);
        self
    }

    /// Set whether to compute inference statistics.
    pub fn compute_inference(mut self, compute: bool) -> Self {
        self.options.compute_inference = compute;
        self
    }

    /// Set the significance threshold used in exported tables.
    pub fn significance_level(mut self, alpha: f64) -> Self {
        self.options.significance_level = alpha;
        self
    }

    /// Set the rank tolerance for singularity detection.
    pub fn rank_tolerance(mut self, tol: f64) -> Self {
        self.options.rank_tolerance = tol;
        self
    }

    /// Build and validate the options.
    pub fn build(self) -> Result<GwprOptions, OptionsError> {
        self.options.validate()?;
        Ok(self.options)
    }

    /// Build the options without validation.
    pub fn build_unchecked(self) -> GwprOptions {
        self.options
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options() {
        let opts = GwprOptions::default();
        assert_eq!(opts.kernel, KernelType::Gaussian);
        assert_eq!(opts.bandwidth, BandwidthMode::AdaptiveLocal);
        assert!(opts.compute_inference);
        assert!((opts.significance_level - 0.05).abs() < 1e-12);
    }

    #[test]
    fn test_builder() {
        let opts = GwprOptions::builder()
            .kernel(KernelType::Bisquare)
            .bandwidth(BandwidthMode::AdaptiveGlobal)
            .min_neighbors(4)
            .build()
            .unwrap();

        assert_eq!(opts.kernel, KernelType::Bisquare);
        assert_eq!(opts.bandwidth, BandwidthMode::AdaptiveGlobal);
        assert_eq!(opts.min_neighbors, Some(4));
    }

    #[test]
    fn test_validation_invalid_fixed_bandwidth() {
        let result = GwprOptions::builder()
            .bandwidth(BandwidthMode::Fixed(0.0))
            .build();
        assert!(matches!(result, Err(OptionsError::InvalidBandwidth(_))));
    }

    #[test]
    fn test_validation_invalid_min_neighbors() {
        let result = GwprOptions::builder().min_neighbors(1).build();
        assert!(matches!(result, Err(OptionsError::InvalidMinNeighbors(1))));
    }

    #[test]
    fn test_validation_invalid_significance_level() {
        let result = GwprOptions::builder().significance_level(1.0).build();
        assert!(matches!(
            result,
            Err(OptionsError::InvalidSignificanceLevel(_))
        ));
    }

    #[test]
    fn test_validation_invalid_rank_tolerance() {
        let result = GwprOptions::builder().rank_tolerance(0.0).build();
        assert!(matches!(result, Err(OptionsError::InvalidRankTolerance(_))));
    }
}
