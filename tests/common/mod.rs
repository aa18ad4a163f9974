//! Common test utilities and panel generators.

use gwpr::prelude::*;

/// Simple deterministic "random" in [-1, 1] for reproducibility.
pub fn lcg(state: &mut u64) -> f64 {
    *state = state.wrapping_mul(6364136223846793005).wrapping_add(1);
    ((*state >> 33) as f64) / (u32::MAX as f64) * 2.0 - 1.0
}

/// Panel where every location follows the same line y = intercept +
/// slope * x, with no noise. Locations sit on a horizontal line two
/// units apart; x varies over periods and locations.
pub fn uniform_line_panel(
    n_locations: usize,
    n_periods: usize,
    intercept: f64,
    slope: f64,
) -> PanelData {
    let mut rows = Vec::new();
    for i in 0..n_locations {
        for p in 0..n_periods {
            let x = p as f64 + 0.3 * i as f64;
            rows.push(PanelRow {
                location_id: format!("loc{i}"),
                period: p as i64,
                dependent: intercept + slope * x,
                explanatory: vec![x],
                coordinates: (2.0 * i as f64, 0.0),
            });
        }
    }
    PanelData::from_rows(&rows, vec!["x1".into()]).expect("balanced panel")
}

/// Same shape as `uniform_line_panel` but with LCG noise added to the
/// dependent variable.
pub fn noisy_line_panel(
    n_locations: usize,
    n_periods: usize,
    intercept: f64,
    slope: f64,
    noise: f64,
    seed: u64,
) -> PanelData {
    let mut state = seed;
    let mut rows = Vec::new();
    for i in 0..n_locations {
        for p in 0..n_periods {
            let x = p as f64 + 0.3 * i as f64;
            rows.push(PanelRow {
                location_id: format!("loc{i}"),
                period: p as i64,
                dependent: intercept + slope * x + noise * lcg(&mut state),
                explanatory: vec![x],
                coordinates: (2.0 * i as f64, 0.0),
            });
        }
    }
    PanelData::from_rows(&rows, vec!["x1".into()]).expect("balanced panel")
}

/// Panel with location-specific intercepts (unit effects) on a common
/// slope, plus noise.
pub fn unit_effects_panel(
    n_locations: usize,
    n_periods: usize,
    effect_scale: f64,
    slope: f64,
    noise: f64,
    seed: u64,
) -> PanelData {
    let mut state = seed;
    let mut rows = Vec::new();
    for i in 0..n_locations {
        let alpha = effect_scale * (i as f64 - n_locations as f64 / 2.0);
        for p in 0..n_periods {
            let x = p as f64 + 0.5 * lcg(&mut state);
            rows.push(PanelRow {
                location_id: format!("loc{i}"),
                period: p as i64,
                dependent: alpha + slope * x + noise * lcg(&mut state),
                explanatory: vec![x],
                coordinates: (2.0 * i as f64, i as f64),
            });
        }
    }
    PanelData::from_rows(&rows, vec!["x1".into()]).expect("balanced panel")
}

/// Locations on a line with slopes that vary by location: y = (10 + i) * x,
/// x symmetric over periods {-1, 0, 1}. Locations are spaced ten units
/// apart so bisquare bandwidths can isolate neighborhoods exactly.
pub fn varying_slope_panel(n_locations: usize) -> PanelData {
    let mut rows = Vec::new();
    for i in 0..n_locations {
        let slope = 10.0 + i as f64;
        for (p, x) in [-1.0f64, 0.0, 1.0].iter().enumerate() {
            rows.push(PanelRow {
                location_id: format!("loc{i}"),
                period: p as i64,
                dependent: slope * x,
                explanatory: vec![*x],
                coordinates: (10.0 * i as f64, 0.0),
            });
        }
    }
    PanelData::from_rows(&rows, vec!["x1".into()]).expect("balanced panel")
}
