use super::*;

#[test]
fn time_range_new_rejects_inverted_and_non_finite() {
    assert!(TimeRange::new(1.0, 0.5).is_err());
    assert!(TimeRange::new(f64::NAN, 1.0).is_err());
    assert!(TimeRange::new(0.0, f64::INFINITY).is_err());
    assert!(TimeRange::new(1.0, 1.0).is_ok());
}

#[test]
fn duration_center_and_contains() {
    let r = TimeRange::new(2.0, 3.0).unwrap();
    assert_eq!(r.duration(), 1.0);
    assert_eq!(r.center(), 2.5);
    assert!(r.contains(2.0));
    assert!(r.contains(3.0));
    assert!(!r.contains(3.01));
    assert_eq!(TimeRange::raw(3.0, 1.0).duration(), 0.0);
}

#[test]
fn degenerate_detection() {
    assert!(TimeRange::raw(1.0, 1.0).is_degenerate());
    assert!(TimeRange::raw(1.0, 1.005).is_degenerate());
    assert!(TimeRange::raw(2.0, 1.0).is_degenerate());
    assert!(!TimeRange::raw(1.0, 1.02).is_degenerate());
}

#[test]
fn union_covers_both() {
    let u = TimeRange::raw(1.0, 2.0).union(TimeRange::raw(0.5, 1.5));
    assert_eq!(u, TimeRange::raw(0.5, 2.0));
}
