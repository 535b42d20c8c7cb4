use super::*;

fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

#[test]
fn colors_follow_position() {
    assert_eq!(TrackColor::for_position(0), TrackColor::Blue);
    assert_eq!(TrackColor::for_position(1), TrackColor::Green);
    assert_eq!(TrackColor::for_position(2), TrackColor::Purple);
}

#[test]
fn seconds_offset_shifts_both_edges() {
    let w = derive_window(
        TimeRange::raw(2.0, 3.0),
        Some(&TimeOffset::seconds(-0.2, 0.1)),
    );
    assert!(approx(w.start, 1.8));
    assert!(approx(w.end, 3.1));
}

#[test]
fn percentage_offset_uses_word_duration() {
    let offset = TimeOffset(
        OffsetValue::Percent("-50%".to_string()),
        OffsetValue::Percent("25%".to_string()),
    );
    let w = derive_window(TimeRange::raw(2.0, 4.0), Some(&offset));
    assert!(approx(w.start, 1.0));
    assert!(approx(w.end, 4.5));
}

#[test]
fn negative_start_clamps_to_zero_with_min_width() {
    let w = derive_window(
        TimeRange::raw(0.1, 0.2),
        Some(&TimeOffset::seconds(-1.0, -0.15)),
    );
    assert_eq!(w.start, 0.0);
    assert!(approx(w.end, 0.1));
}

#[test]
fn degenerate_window_recenters_on_midpoint() {
    // Offsets collapse the window entirely.
    let w = derive_window(
        TimeRange::raw(2.0, 3.0),
        Some(&TimeOffset::seconds(0.5, -0.5)),
    );
    assert!(approx(w.center(), 2.5));
    assert!(approx(w.duration(), 0.5));

    // Long words cap the recentered window at 0.5s.
    let w = derive_window(
        TimeRange::raw(0.0, 10.0),
        Some(&TimeOffset::seconds(6.0, -6.0)),
    );
    assert!(approx(w.duration(), 0.5));
    assert!(approx(w.center(), 5.0));

    // Very short words get at least 0.1s.
    let w = derive_window(TimeRange::raw(1.0, 1.0), None);
    assert!(approx(w.duration(), 0.1));
}

#[test]
fn offsets_deserialize_from_mixed_array() {
    let offset: TimeOffset = serde_json::from_str(r#"[-0.1, "20%"]"#).unwrap();
    assert_eq!(offset.0, OffsetValue::Seconds(-0.1));
    assert_eq!(offset.1, OffsetValue::Percent("20%".to_string()));
    let (s, e) = offset.resolve(2.0);
    assert!(approx(s, -0.1));
    assert!(approx(e, 0.4));
}

#[test]
fn garbage_percent_resolves_to_zero() {
    assert_eq!(OffsetValue::Percent("lots".to_string()).resolve(3.0), 0.0);
}
