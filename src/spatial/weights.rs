//! Kernel weight vectors and matrices.

use crate::core::kernel::KernelType;
use crate::core::panel::PanelData;
use crate::spatial::distance::DistanceMatrix;
use faer::{Col, Mat};

/// Kernel weights from a target location to every location.
pub fn location_weights(
    distances: &DistanceMatrix,
    target: usize,
    bandwidth: f64,
    kernel: KernelType,
) -> Vec<f64> {
    (0..distances.n_locations())
        .map(|j| kernel.weight(distances.get(target, j), bandwidth))
        .collect()
}

/// Expand per-location weights to per-observation weights: every
/// observation carries the weight of its location.
pub fn observation_weights(location_weights: &[f64], obs_location: &[usize]) -> Col<f64> {
    Col::from_fn(obs_location.len(), |s| location_weights[obs_location[s]])
}

/// Full weight matrix (n_locations × n_obs): row i holds the weights of
/// every observation relative to target location i.
pub fn weight_matrix(
    panel: &PanelData,
    distances: &DistanceMatrix,
    bandwidths: &[f64],
    kernel: KernelType,
) -> Mat<f64> {
    let obs_location = panel.obs_location();
    Mat::from_fn(panel.n_locations(), panel.n_obs(), |i, s| {
        kernel.weight(distances.get(i, obs_location[s]), bandwidths[i])
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::panel::PanelRow;

    #[test]
    fn test_observation_weights_expand_locations() {
        let loc_w = vec![1.0, 0.5, 0.0];
        let obs_location = vec![0, 0, 1, 1, 2, 2];
        let w = observation_weights(&loc_w, &obs_location);
        assert_eq!(w.nrows(), 6);
        assert_eq!(w[0], 1.0);
        assert_eq!(w[2], 0.5);
        assert_eq!(w[5], 0.0);
    }

    #[test]
    fn test_weight_matrix_shape_and_self_weight() {
        let mut rows = Vec::new();
        for (i, id) in ["a", "b"].iter().enumerate() {
            for p in 0..3i64 {
                rows.push(PanelRow {
                    location_id: id.to_string(),
                    period: p,
                    dependent: 1.0,
                    explanatory: vec![p as f64],
                    coordinates: (i as f64 * 2.0, 0.0),
                });
            }
        }
        let panel = PanelData::from_rows(&rows, vec!["x1".into()]).unwrap();
        let distances = DistanceMatrix::from_coordinates(panel.coordinates());
        let w = weight_matrix(&panel, &distances, &[1.0, 1.0], KernelType::Bisquare);

        assert_eq!(w.nrows(), 2);
        assert_eq!(w.ncols(), 6);
        // Own observations sit at distance zero: weight 1.
        for s in 0..3 {
            assert_eq!(w[(0, s)], 1.0);
        }
        // The other location is beyond the bandwidth: bisquare cuts to 0.
        for s in 3..6 {
            assert_eq!(w[(0, s)], 0.0);
        }
    }
}
