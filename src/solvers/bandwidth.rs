//! Adaptive bandwidth selection by leave-one-location-out
//! cross-validation.
//!
//! For a candidate neighbor count q, a location's bandwidth is the
//! distance to its q-th nearest location (counting itself first). The CV
//! score of a candidate zeroes the weight of the target location's own
//! observations, fits the weighted regression on everything else, and
//! accumulates the squared error of predicting the target's dependent
//! values. Smaller candidates win ties.

use crate::core::options::{BandwidthMode, GwprOptions};
use crate::core::panel::PanelData;
use crate::solvers::traits::GwprError;
use crate::solvers::wls::solve_weighted;
use crate::spatial::distance::DistanceMatrix;
use crate::spatial::weights::{location_weights, observation_weights};
use log::{debug, warn};
use rayon::prelude::*;

/// Outcome of bandwidth selection, one entry per location.
#[derive(Debug, Clone)]
pub struct BandwidthSelection {
    /// Selected neighbor count per location (0 in fixed mode).
    pub neighbor_counts: Vec<usize>,
    /// Selected distance bandwidth per location.
    pub bandwidths: Vec<f64>,
    /// Cross-validation score of the selected candidate (NaN in fixed
    /// mode and for fallback locations).
    pub cv_scores: Vec<f64>,
    /// True where no candidate was admissible and the maximum bandwidth
    /// was used as a fallback.
    pub exhausted: Vec<bool>,
}

struct LocationChoice {
    neighbor_count: usize,
    bandwidth: f64,
    cv_score: f64,
    exhausted: bool,
}

/// Select bandwidths for every location according to the configured
/// mode.
pub(crate) fn select(
    panel: &PanelData,
    distances: &DistanceMatrix,
    options: &GwprOptions,
) -> Result<BandwidthSelection, GwprError> {
    match options.bandwidth {
        BandwidthMode::Fixed(b) => Ok(fixed_selection(panel, distances, b)),
        BandwidthMode::AdaptiveLocal => select_local(panel, distances, options),
        BandwidthMode::AdaptiveGlobal => select_global(panel, distances, options),
    }
}

/// Smallest candidate neighbor count: enough locations that the
/// leave-one-location-out fit keeps at least K+2 observations.
pub(crate) fn default_min_neighbors(n_vars: usize, n_periods: usize) -> usize {
    (n_vars + 2).div_ceil(n_periods) + 1
}

fn candidate_range(panel: &PanelData, options: &GwprOptions) -> (usize, usize) {
    let n = panel.n_locations();
    let q_min = options
        .min_neighbors
        .unwrap_or_else(|| default_min_neighbors(panel.n_vars(), panel.n_periods()))
        .clamp(2, n);
    (q_min, n)
}

fn fixed_selection(panel: &PanelData, distances: &DistanceMatrix, b: f64) -> BandwidthSelection {
    let n = panel.n_locations();
    let neighbor_counts = (0..n)
        .map(|i| (0..n).filter(|&j| distances.get(i, j) <= b).count())
        .collect();
    BandwidthSelection {
        neighbor_counts,
        bandwidths: vec![b; n],
        cv_scores: vec![f64::NAN; n],
        exhausted: vec![false; n],
    }
}

fn select_local(
    panel: &PanelData,
    distances: &DistanceMatrix,
    options: &GwprOptions,
) -> Result<BandwidthSelection, GwprError> {
    let n = panel.n_locations();
    let (q_min, q_max) = candidate_range(panel, options);

    let choices: Vec<Result<LocationChoice, GwprError>> = (0..n)
        .into_par_iter()
        .map(|i| choose_for_location(panel, distances, options, i, q_min, q_max))
        .collect();

    let mut selection = BandwidthSelection {
        neighbor_counts: Vec::with_capacity(n),
        bandwidths: Vec::with_capacity(n),
        cv_scores: Vec::with_capacity(n),
        exhausted: Vec::with_capacity(n),
    };
    for (i, choice) in choices.into_iter().enumerate() {
        let choice = choice?;
        debug!(
            "location {}: q = {}, bandwidth = {:.6}, cv = {:.6e}{}",
            panel.location_ids()[i],
            choice.neighbor_count,
            choice.bandwidth,
            choice.cv_score,
            if choice.exhausted { " (fallback)" } else { "" }
        );
        selection.neighbor_counts.push(choice.neighbor_count);
        selection.bandwidths.push(choice.bandwidth);
        selection.cv_scores.push(choice.cv_score);
        selection.exhausted.push(choice.exhausted);
    }
    Ok(selection)
}

fn choose_for_location(
    panel: &PanelData,
    distances: &DistanceMatrix,
    options: &GwprOptions,
    i: usize,
    q_min: usize,
    q_max: usize,
) -> Result<LocationChoice, GwprError> {
    let mut best: Option<(usize, f64, f64)> = None;

    for q in q_min..=q_max {
        let b = distances.kth_nearest(i, q);
        if b <= 0.0 {
            continue;
        }
        let score = match cv_score(panel, distances, options, i, b) {
            Ok(score) => score,
            Err(_) => continue,
        };
        // Strict comparison with ascending q keeps the smaller, more
        // local candidate on ties.
        if best.map_or(true, |(_, _, s)| score < s) {
            best = Some((q, b, score));
        }
    }

    match best {
        Some((q, b, score)) => Ok(LocationChoice {
            neighbor_count: q,
            bandwidth: b,
            cv_score: score,
            exhausted: false,
        }),
        None => {
            let b = distances.max_distance(i);
            if b <= 0.0 {
                return Err(GwprError::BandwidthSearchExhausted {
                    location: panel.location_ids()[i].clone(),
                });
            }
            warn!(
                "no admissible bandwidth for location {}; falling back to maximum distance {:.6}",
                panel.location_ids()[i],
                b
            );
            Ok(LocationChoice {
                neighbor_count: q_max,
                bandwidth: b,
                cv_score: f64::NAN,
                exhausted: true,
            })
        }
    }
}

fn select_global(
    panel: &PanelData,
    distances: &DistanceMatrix,
    options: &GwprOptions,
) -> Result<BandwidthSelection, GwprError> {
    let n = panel.n_locations();
    let (q_min, q_max) = candidate_range(panel, options);

    let scored: Vec<Option<f64>> = (q_min..=q_max)
        .into_par_iter()
        .map(|q| {
            let mut total = 0.0;
            for i in 0..n {
                let b = distances.kth_nearest(i, q);
                if b <= 0.0 {
                    return None;
                }
                match cv_score(panel, distances, options, i, b) {
                    Ok(score) => total += score,
                    Err(_) => return None,
                }
            }
            Some(total)
        })
        .collect();

    let mut best: Option<(usize, f64)> = None;
    for (offset, score) in scored.into_iter().enumerate() {
        if let Some(score) = score {
            if best.map_or(true, |(_, s)| score < s) {
                best = Some((q_min + offset, score));
            }
        }
    }

    match best {
        Some((q, total)) => {
            debug!("global bandwidth: q = {q}, summed cv = {total:.6e}");
            let bandwidths: Vec<f64> = (0..n).map(|i| distances.kth_nearest(i, q)).collect();
            Ok(BandwidthSelection {
                neighbor_counts: vec![q; n],
                bandwidths,
                cv_scores: vec![total; n],
                exhausted: vec![false; n],
            })
        }
        None => {
            // No shared candidate was admissible anywhere; fall back to
            // the widest neighborhood and flag every location.
            let bandwidths: Vec<f64> = (0..n).map(|i| distances.max_distance(i)).collect();
            if bandwidths.iter().any(|&b| b <= 0.0) {
                return Err(GwprError::BandwidthSearchExhausted {
                    location: panel.location_ids()[0].clone(),
                });
            }
            warn!("no admissible shared bandwidth; falling back to maximum distances");
            Ok(BandwidthSelection {
                neighbor_counts: vec![q_max; n],
                bandwidths,
                cv_scores: vec![f64::NAN; n],
                exhausted: vec![true; n],
            })
        }
    }
}

/// Leave-one-location-out squared prediction error for location `i`
/// under bandwidth `b`.
fn cv_score(
    panel: &PanelData,
    distances: &DistanceMatrix,
    options: &GwprOptions,
    i: usize,
    b: f64,
) -> Result<f64, GwprError> {
    let mut loc_w = location_weights(distances, i, b, options.kernel);
    loc_w[i] = 0.0;
    let w = observation_weights(&loc_w, panel.obs_location());

    // Identification: the held-out fit needs at least K+2 contributing
    // observations.
    let contributing = w.iter().filter(|&&wi| wi > 0.0).count();
    if contributing < panel.n_vars() + 2 {
        return Err(GwprError::InsufficientObservations {
            needed: panel.n_vars() + 2,
            got: contributing,
        });
    }

    let fit = solve_weighted(panel.x(), panel.y(), Some(&w), true, options.rank_tolerance)?;

    let intercept = fit.intercept.unwrap_or(0.0);
    let mut error = 0.0;
    for s in panel.obs_range(i) {
        let mut pred = intercept;
        for j in 0..panel.n_vars() {
            pred += panel.x()[(s, j)] * fit.coefficients[j];
        }
        let e = panel.y()[s] - pred;
        error += e * e;
    }
    Ok(error)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_min_neighbors() {
        // K = 1, T = 6: ceil(3/6) + 1 = 2
        assert_eq!(default_min_neighbors(1, 6), 2);
        // K = 3, T = 2: ceil(5/2) + 1 = 4
        assert_eq!(default_min_neighbors(3, 2), 4);
        // K = 4, T = 1: ceil(6/1) + 1 = 7
        assert_eq!(default_min_neighbors(4, 1), 7);
    }
}
