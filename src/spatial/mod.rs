//! Spatial structure: distances and kernel weights.

pub mod distance;
pub mod weights;

pub use distance::DistanceMatrix;
pub use weights::{location_weights, observation_weights, weight_matrix};
