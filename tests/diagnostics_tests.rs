//! Specification test suites.

mod common;

use gwpr::prelude::*;

#[test]
fn test_poolability_rejects_under_strong_effects() {
    let with_effects = common::unit_effects_panel(8, 6, 15.0, 2.0, 0.3, 19);
    let test = chow_poolability(&with_effects).expect("test");

    assert!(test.statistic > 0.0);
    assert_eq!(test.df_num as usize, 7);
    assert_eq!(test.df_den as usize, 8 * 6 - 8 - 1);
    assert!(
        test.p_value < 0.01,
        "expected strong rejection, p = {}",
        test.p_value
    );
}

#[test]
fn test_poolability_statistic_orders_with_effect_size() {
    let strong = common::unit_effects_panel(8, 6, 15.0, 2.0, 0.5, 19);
    let none = common::noisy_line_panel(8, 6, 1.0, 2.0, 0.5, 19);

    let f_strong = chow_poolability(&strong).expect("test").statistic;
    let f_none = chow_poolability(&none).expect("test").statistic;

    assert!(f_strong > f_none);
    let p_none = chow_poolability(&none).expect("test").p_value;
    assert!((0.0..=1.0).contains(&p_none));
}

#[test]
fn test_breusch_pagan_detects_random_effects() {
    let with_effects = common::unit_effects_panel(10, 6, 8.0, 2.0, 0.5, 41);
    let pooled = PooledRegressor::new().fit(&with_effects).expect("pooled");

    let test = breusch_pagan(&with_effects, &pooled).expect("lm test");
    assert_eq!(test.df, 1);
    assert!(test.statistic >= 0.0);
    assert!(
        test.p_value < 0.05,
        "expected rejection under strong effects, p = {}",
        test.p_value
    );
}

#[test]
fn test_breusch_pagan_statistic_orders_with_effect_size() {
    let strong = common::unit_effects_panel(10, 6, 8.0, 2.0, 0.5, 41);
    let none = common::noisy_line_panel(10, 6, 1.0, 2.0, 0.5, 41);

    let pooled_strong = PooledRegressor::new().fit(&strong).expect("pooled");
    let pooled_none = PooledRegressor::new().fit(&none).expect("pooled");

    let lm_strong = breusch_pagan(&strong, &pooled_strong).expect("lm").statistic;
    let lm_none = breusch_pagan(&none, &pooled_none).expect("lm").statistic;

    assert!(lm_strong > lm_none);
}

#[test]
fn test_hausman_runs_on_effects_panel() {
    let panel = common::unit_effects_panel(10, 6, 5.0, 2.0, 0.5, 63);

    let fe = FixedEffectsRegressor::new().fit(&panel).expect("fe");
    let re = RandomEffectsRegressor::new().fit(&panel).expect("re");

    let test = hausman(&fe, &re).expect("hausman");
    assert_eq!(test.df, 1);
    assert!(test.statistic >= 0.0);
    assert!((0.0..=1.0).contains(&test.p_value));
}

#[test]
fn test_hausman_requires_covariance() {
    let panel = common::unit_effects_panel(8, 5, 4.0, 2.0, 0.4, 70);

    let fe = FixedEffectsRegressor::new().fit(&panel).expect("fe");
    let re = RandomEffectsRegressor::new().fit(&panel).expect("re");

    // Covariances are always produced by the estimators; the test is
    // well-defined end to end.
    assert!(fe.result().covariance.is_some());
    assert!(re.result().covariance.is_some());
    assert!(hausman(&fe, &re).is_ok());
}

#[test]
fn test_chow_rejects_degenerate_within_fit() {
    // Exact within fit (zero residuals) leaves the F statistic
    // undefined.
    let mut rows = Vec::new();
    for i in 0..4 {
        for p in 0..3i64 {
            let x = p as f64;
            rows.push(PanelRow {
                location_id: format!("loc{i}"),
                period: p,
                dependent: 10.0 * i as f64 + 2.0 * x,
                explanatory: vec![x],
                coordinates: (i as f64, 0.0),
            });
        }
    }
    let panel = PanelData::from_rows(&rows, vec!["x1".into()]).unwrap();

    assert!(matches!(
        chow_poolability(&panel),
        Err(GwprError::NumericalError(_))
    ));
}
