//! Balanced panel data container and input-contract validation.

use faer::{Col, Mat};
use std::collections::HashMap;
use thiserror::Error;

/// Errors raised while assembling a panel from raw rows.
///
/// All of these are input-contract violations and abort the run before
/// any estimation starts.
#[derive(Debug, Error)]
pub enum PanelError {
    #[error("panel is empty")]
    EmptyPanel,

    #[error("row for location '{location}' has {got} explanatory values, expected {expected}")]
    DimensionMismatch {
        location: String,
        expected: usize,
        got: usize,
    },

    #[error("location '{location}' is missing period {period}")]
    MissingData { location: String, period: i64 },

    #[error("duplicate observation for location '{location}' at period {period}")]
    DuplicateObservation { location: String, period: i64 },

    #[error("location '{location}' has inconsistent coordinates across periods")]
    CoordinateMismatch { location: String },

    #[error("non-finite value for location '{location}' at period {period}")]
    NonFiniteValue { location: String, period: i64 },
}

/// One raw (location, period) record as read from the input table.
#[derive(Debug, Clone)]
pub struct PanelRow {
    pub location_id: String,
    pub period: i64,
    pub dependent: f64,
    pub explanatory: Vec<f64>,
    pub coordinates: (f64, f64),
}

/// A validated, balanced panel: N locations observed over the same T
/// periods with K explanatory variables each.
///
/// Observations are stored location-major (all periods of location 0,
/// then location 1, ...), so the rows belonging to location `i` occupy
/// the contiguous range `i*T .. (i+1)*T`. Coordinates are per location
/// and constant across periods by construction.
#[derive(Debug, Clone)]
pub struct PanelData {
    location_ids: Vec<String>,
    coordinates: Vec<(f64, f64)>,
    periods: Vec<i64>,
    var_names: Vec<String>,
    y: Col<f64>,
    x: Mat<f64>,
    obs_location: Vec<usize>,
}

impl PanelData {
    /// Assemble a panel from raw rows, validating the input contract:
    /// no missing or duplicated (location, period) pairs, constant
    /// coordinates per location, consistent variable counts, finite
    /// values.
    ///
    /// Locations keep their order of first appearance; periods are
    /// sorted ascending.
    pub fn from_rows(rows: &[PanelRow], var_names: Vec<String>) -> Result<Self, PanelError> {
        if rows.is_empty() {
            return Err(PanelError::EmptyPanel);
        }
        let n_vars = var_names.len();

        let mut location_ids: Vec<String> = Vec::new();
        let mut location_index: HashMap<String, usize> = HashMap::new();
        let mut coordinates: Vec<(f64, f64)> = Vec::new();
        let mut periods: Vec<i64> = Vec::new();

        for row in rows {
            if row.explanatory.len() != n_vars {
                return Err(PanelError::DimensionMismatch {
                    location: row.location_id.clone(),
                    expected: n_vars,
                    got: row.explanatory.len(),
                });
            }
            if !row.dependent.is_finite()
                || row.explanatory.iter().any(|v| !v.is_finite())
                || !row.coordinates.0.is_finite()
                || !row.coordinates.1.is_finite()
            {
                return Err(PanelError::NonFiniteValue {
                    location: row.location_id.clone(),
                    period: row.period,
                });
            }

            match location_index.get(&row.location_id) {
                Some(&idx) => {
                    let (cx, cy) = coordinates[idx];
                    if cx != row.coordinates.0 || cy != row.coordinates.1 {
                        return Err(PanelError::CoordinateMismatch {
                            location: row.location_id.clone(),
                        });
                    }
                }
                None => {
                    location_index.insert(row.location_id.clone(), location_ids.len());
                    location_ids.push(row.location_id.clone());
                    coordinates.push(row.coordinates);
                }
            }
            if !periods.contains(&row.period) {
                periods.push(row.period);
            }
        }
        periods.sort_unstable();

        let n_locations = location_ids.len();
        let n_periods = periods.len();
        let n_obs = n_locations * n_periods;
        let period_index: HashMap<i64, usize> =
            periods.iter().enumerate().map(|(i, &p)| (p, i)).collect();

        // Place every row into its (location, period) slot, then check
        // that each slot was filled exactly once.
        let mut slot: Vec<Option<&PanelRow>> = vec![None; n_obs];
        for row in rows {
            let li = location_index[&row.location_id];
            let pi = period_index[&row.period];
            let s = li * n_periods + pi;
            if slot[s].is_some() {
                return Err(PanelError::DuplicateObservation {
                    location: row.location_id.clone(),
                    period: row.period,
                });
            }
            slot[s] = Some(row);
        }
        let mut y = Col::zeros(n_obs);
        let mut x = Mat::zeros(n_obs, n_vars);
        let mut obs_location = vec![0usize; n_obs];
        for li in 0..n_locations {
            for pi in 0..n_periods {
                let s = li * n_periods + pi;
                let row = match slot[s] {
                    Some(row) => row,
                    None => {
                        return Err(PanelError::MissingData {
                            location: location_ids[li].clone(),
                            period: periods[pi],
                        })
                    }
                };
                y[s] = row.dependent;
                for j in 0..n_vars {
                    x[(s, j)] = row.explanatory[j];
                }
                obs_location[s] = li;
            }
        }

        Ok(Self {
            location_ids,
            coordinates,
            periods,
            var_names,
            y,
            x,
            obs_location,
        })
    }

    /// Number of spatial locations (N).
    pub fn n_locations(&self) -> usize {
        self.location_ids.len()
    }

    /// Number of time periods (T).
    pub fn n_periods(&self) -> usize {
        self.periods.len()
    }

    /// Total number of observations (N × T).
    pub fn n_obs(&self) -> usize {
        self.y.nrows()
    }

    /// Number of explanatory variables (K).
    pub fn n_vars(&self) -> usize {
        self.var_names.len()
    }

    /// Location identifiers in storage order.
    pub fn location_ids(&self) -> &[String] {
        &self.location_ids
    }

    /// Per-location coordinates in storage order.
    pub fn coordinates(&self) -> &[(f64, f64)] {
        &self.coordinates
    }

    /// Sorted time periods.
    pub fn periods(&self) -> &[i64] {
        &self.periods
    }

    /// Explanatory variable names.
    pub fn var_names(&self) -> &[String] {
        &self.var_names
    }

    /// Dependent values, location-major.
    pub fn y(&self) -> &Col<f64> {
        &self.y
    }

    /// Explanatory values (n_obs × K), location-major.
    pub fn x(&self) -> &Mat<f64> {
        &self.x
    }

    /// Location index of each observation row.
    pub fn obs_location(&self) -> &[usize] {
        &self.obs_location
    }

    /// Range of observation rows belonging to location `i`.
    pub fn obs_range(&self, i: usize) -> std::ops::Range<usize> {
        let t = self.n_periods();
        i * t..(i + 1) * t
    }

    /// Index of a location id, if present.
    pub fn location_index(&self, id: &str) -> Option<usize> {
        self.location_ids.iter().position(|s| s == id)
    }

    /// Per-location mean of the dependent variable.
    pub fn location_means_y(&self) -> Col<f64> {
        let t = self.n_periods() as f64;
        Col::from_fn(self.n_locations(), |i| {
            self.obs_range(i).map(|s| self.y[s]).sum::<f64>() / t
        })
    }

    /// Per-location means of the explanatory variables (N × K).
    pub fn location_means_x(&self) -> Mat<f64> {
        let t = self.n_periods() as f64;
        Mat::from_fn(self.n_locations(), self.n_vars(), |i, j| {
            self.obs_range(i).map(|s| self.x[(s, j)]).sum::<f64>() / t
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(id: &str, period: i64, y: f64, x: f64, coord: (f64, f64)) -> PanelRow {
        PanelRow {
            location_id: id.to_string(),
            period,
            dependent: y,
            explanatory: vec![x],
            coordinates: coord,
        }
    }

    fn small_panel() -> Vec<PanelRow> {
        let mut rows = Vec::new();
        for (i, id) in ["a", "b", "c"].iter().enumerate() {
            for p in 0..2i64 {
                rows.push(row(
                    id,
                    p,
                    i as f64 + p as f64,
                    p as f64,
                    (i as f64, 0.0),
                ));
            }
        }
        rows
    }

    #[test]
    fn test_balanced_panel_accepted() {
        let panel = PanelData::from_rows(&small_panel(), vec!["x1".into()]).unwrap();
        assert_eq!(panel.n_locations(), 3);
        assert_eq!(panel.n_periods(), 2);
        assert_eq!(panel.n_obs(), 6);
        assert_eq!(panel.obs_range(1), 2..4);
        assert_eq!(panel.obs_location(), &[0, 0, 1, 1, 2, 2]);
    }

    #[test]
    fn test_empty_panel_rejected() {
        let result = PanelData::from_rows(&[], vec!["x1".into()]);
        assert!(matches!(result, Err(PanelError::EmptyPanel)));
    }

    #[test]
    fn test_missing_pair_rejected() {
        let mut rows = small_panel();
        rows.pop();
        let result = PanelData::from_rows(&rows, vec!["x1".into()]);
        assert!(matches!(result, Err(PanelError::MissingData { .. })));
    }

    #[test]
    fn test_duplicate_pair_rejected() {
        let mut rows = small_panel();
        let dup = rows[0].clone();
        rows.push(dup);
        let result = PanelData::from_rows(&rows, vec!["x1".into()]);
        assert!(matches!(
            result,
            Err(PanelError::DuplicateObservation { .. })
        ));
    }

    #[test]
    fn test_coordinate_drift_rejected() {
        let mut rows = small_panel();
        rows[1].coordinates = (99.0, 0.0);
        let result = PanelData::from_rows(&rows, vec!["x1".into()]);
        assert!(matches!(result, Err(PanelError::CoordinateMismatch { .. })));
    }

    #[test]
    fn test_non_finite_rejected() {
        let mut rows = small_panel();
        rows[2].dependent = f64::NAN;
        let result = PanelData::from_rows(&rows, vec!["x1".into()]);
        assert!(matches!(result, Err(PanelError::NonFiniteValue { .. })));
    }

    #[test]
    fn test_location_means() {
        let panel = PanelData::from_rows(&small_panel(), vec!["x1".into()]).unwrap();
        let my = panel.location_means_y();
        // Location "a": y = 0, 1 -> mean 0.5
        assert!((my[0] - 0.5).abs() < 1e-12);
        let mx = panel.location_means_x();
        // Every location: x = 0, 1 -> mean 0.5
        for i in 0..3 {
            assert!((mx[(i, 0)] - 0.5).abs() < 1e-12);
        }
    }
}
