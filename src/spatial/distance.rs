//! Pairwise location distances.

use faer::Mat;

/// Symmetric Euclidean distance matrix between locations, computed once
/// from coordinates and reused for every kernel and bandwidth.
///
/// Sorted per-row copies are kept alongside the matrix so adaptive
/// bandwidth lookups (distance to the q-th nearest location) are O(1).
#[derive(Debug, Clone)]
pub struct DistanceMatrix {
    values: Mat<f64>,
    sorted: Vec<Vec<f64>>,
}

impl DistanceMatrix {
    /// Build the distance matrix from per-location coordinates.
    pub fn from_coordinates(coordinates: &[(f64, f64)]) -> Self {
        let n = coordinates.len();
        let mut values = Mat::zeros(n, n);
        for i in 0..n {
            for j in (i + 1)..n {
                let dx = coordinates[i].0 - coordinates[j].0;
                let dy = coordinates[i].1 - coordinates[j].1;
                let d = (dx * dx + dy * dy).sqrt();
                values[(i, j)] = d;
                values[(j, i)] = d;
            }
        }

        let mut sorted = Vec::with_capacity(n);
        for i in 0..n {
            let mut row: Vec<f64> = (0..n).map(|j| values[(i, j)]).collect();
            row.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
            sorted.push(row);
        }

        Self { values, sorted }
    }

    /// Number of locations.
    pub fn n_locations(&self) -> usize {
        self.values.nrows()
    }

    /// Distance between locations `i` and `j`.
    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.values[(i, j)]
    }

    /// The full matrix.
    pub fn values(&self) -> &Mat<f64> {
        &self.values
    }

    /// Distance from location `i` to its q-th nearest location, counting
    /// `i` itself first: `kth_nearest(i, 1) == 0`, and `q == n` gives the
    /// distance to the farthest location.
    pub fn kth_nearest(&self, i: usize, q: usize) -> f64 {
        debug_assert!(q >= 1 && q <= self.n_locations());
        self.sorted[i][q - 1]
    }

    /// Largest distance from location `i` to any other location.
    pub fn max_distance(&self, i: usize) -> f64 {
        self.sorted[i][self.n_locations() - 1]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_symmetry_and_zero_diagonal() {
        let coords = [(0.0, 0.0), (3.0, 4.0), (-1.0, 2.0), (10.0, -5.0)];
        let d = DistanceMatrix::from_coordinates(&coords);
        for i in 0..4 {
            assert_eq!(d.get(i, i), 0.0);
            for j in 0..4 {
                assert_eq!(d.get(i, j), d.get(j, i));
                assert!(d.get(i, j) >= 0.0);
            }
        }
        // 3-4-5 triangle
        assert!((d.get(0, 1) - 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_kth_nearest() {
        let coords = [(0.0, 0.0), (1.0, 0.0), (4.0, 0.0)];
        let d = DistanceMatrix::from_coordinates(&coords);
        assert_eq!(d.kth_nearest(0, 1), 0.0);
        assert!((d.kth_nearest(0, 2) - 1.0).abs() < 1e-12);
        assert!((d.kth_nearest(0, 3) - 4.0).abs() < 1e-12);
        assert!((d.max_distance(1) - 3.0).abs() < 1e-12);
    }
}
