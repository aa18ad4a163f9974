//! Bandwidth selection tests.

mod common;

use gwpr::prelude::*;

#[test]
fn test_selection_is_deterministic() {
    let panel = common::noisy_line_panel(8, 4, 1.0, 2.0, 0.5, 42);

    let estimator = GwprEstimator::builder()
        .kernel(KernelType::Gaussian)
        .build()
        .expect("valid options");

    let first = estimator.fit(&panel).expect("fit should succeed");
    let second = estimator.fit(&panel).expect("fit should succeed");

    assert_eq!(
        first.selection().neighbor_counts,
        second.selection().neighbor_counts
    );
    for i in 0..panel.n_locations() {
        assert_eq!(
            first.selection().bandwidths[i],
            second.selection().bandwidths[i]
        );
        assert_eq!(
            first.local(i).coefficients[0],
            second.local(i).coefficients[0]
        );
    }
}

#[test]
fn test_equidistant_candidates_keep_smallest_count() {
    // The center of a square is equidistant from all four corners, so
    // every candidate neighbor count gives the center the same bandwidth,
    // identical weights, and a bitwise-identical CV score. The tie must
    // resolve to the smallest count.
    let coords = [(0.0, 0.0), (1.0, 1.0), (1.0, -1.0), (-1.0, 1.0), (-1.0, -1.0)];
    let mut state = 3u64;
    let mut rows = Vec::new();
    for (i, &(cx, cy)) in coords.iter().enumerate() {
        for p in 0..3i64 {
            let x = p as f64 + 0.1 * i as f64;
            rows.push(PanelRow {
                location_id: format!("loc{i}"),
                period: p,
                dependent: 1.0 + 2.0 * x + 0.3 * common::lcg(&mut state),
                explanatory: vec![x],
                coordinates: (cx, cy),
            });
        }
    }
    let panel = PanelData::from_rows(&rows, vec!["x1".into()]).unwrap();

    let fitted = GwprEstimator::builder()
        .min_neighbors(2)
        .build()
        .expect("valid options")
        .fit(&panel)
        .expect("fit should succeed");

    // All five candidates (q = 2..=5) tie exactly for the center.
    assert_eq!(fitted.selection().neighbor_counts[0], 2);
}

#[test]
fn test_global_mode_shares_neighbor_count() {
    let panel = common::noisy_line_panel(7, 4, 1.0, 2.0, 0.3, 7);

    let fitted = GwprEstimator::builder()
        .bandwidth(BandwidthMode::AdaptiveGlobal)
        .build()
        .expect("valid options")
        .fit(&panel)
        .expect("fit should succeed");

    let counts = &fitted.selection().neighbor_counts;
    assert!(counts.iter().all(|&q| q == counts[0]));
    // Distance bandwidths still differ per location.
    assert_eq!(fitted.selection().bandwidths.len(), 7);
}

#[test]
fn test_fixed_mode_skips_search() {
    let panel = common::uniform_line_panel(5, 3, 0.0, 1.0);

    let fitted = GwprEstimator::builder()
        .bandwidth(BandwidthMode::Fixed(3.5))
        .build()
        .expect("valid options")
        .fit(&panel)
        .expect("fit should succeed");

    for local in fitted.locals() {
        assert_eq!(local.bandwidth, 3.5);
        assert!(!local.bandwidth_exhausted);
    }
    assert!(fitted.selection().cv_scores.iter().all(|s| s.is_nan()));
}

#[test]
fn test_selected_bandwidth_is_kth_distance() {
    let panel = common::noisy_line_panel(6, 4, 1.0, 2.0, 0.4, 11);

    let fitted = GwprEstimator::builder()
        .build()
        .expect("valid options")
        .fit(&panel)
        .expect("fit should succeed");

    let distances = fitted.distance_matrix();
    let selection = fitted.selection();
    for i in 0..panel.n_locations() {
        let q = selection.neighbor_counts[i];
        assert_eq!(selection.bandwidths[i], distances.kth_nearest(i, q));
    }
}
