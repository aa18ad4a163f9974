//! Spatial kernel weight functions.

/// Kernel family used to turn a location-to-location distance into a
/// regression weight.
///
/// All kernels return 1 at distance zero and decay monotonically with
/// distance for a fixed bandwidth. Gaussian and Exponential have infinite
/// support; Bisquare is exactly zero at and beyond the bandwidth, which
/// keeps far-away observations out of the local fit entirely.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KernelType {
    /// w = exp(-0.5 * (d/b)²)
    #[default]
    Gaussian,
    /// w = (1 - (d/b)²)² for d < b, 0 otherwise.
    Bisquare,
    /// w = exp(-d/b)
    Exponential,
}

impl KernelType {
    /// Compute the weight for a distance `d` under bandwidth `b`.
    ///
    /// `b` must be positive; `d` must be non-negative.
    pub fn weight(&self, d: f64, b: f64) -> f64 {
        debug_assert!(b > 0.0, "bandwidth must be positive");
        match self {
            KernelType::Gaussian => {
                let u = d / b;
                (-0.5 * u * u).exp()
            }
            KernelType::Bisquare => {
                if d < b {
                    let u = d / b;
                    let v = 1.0 - u * u;
                    v * v
                } else {
                    0.0
                }
            }
            KernelType::Exponential => (-d / b).exp(),
        }
    }

    /// Whether the kernel assigns zero weight beyond the bandwidth.
    pub fn has_compact_support(&self) -> bool {
        matches!(self, KernelType::Bisquare)
    }
}

impl std::fmt::Display for KernelType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            KernelType::Gaussian => write!(f, "gaussian"),
            KernelType::Bisquare => write!(f, "bisquare"),
            KernelType::Exponential => write!(f, "exponential"),
        }
    }
}
