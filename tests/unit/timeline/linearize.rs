use super::*;
use crate::{document::model::Word, foundation::ids::SequentialIdGen};

fn clip(id: &str, start: f64, end: f64) -> Clip {
    Clip::new(id, "s", vec![Word::new(format!("{id}0"), id, start, end)])
}

fn timeline() -> Timeline {
    let clips = vec![clip("a", 0.0, 2.0), clip("b", 2.0, 5.0), clip("c", 5.0, 6.0)];
    Timeline::from_clips(&clips, &BTreeSet::new())
}

fn order(ids: &[&str]) -> Vec<String> {
    ids.iter().map(|s| format!("timeline_{s}")).collect()
}

fn starts(t: &Timeline) -> Vec<(String, f64, bool)> {
    t.clips
        .iter()
        .map(|c| (c.source_clip_id.clone(), c.start_time, c.enabled))
        .collect()
}

#[test]
fn from_clips_projects_source_ranges() {
    let t = timeline();
    let b = t.clip("timeline_b").unwrap();
    assert_eq!((b.in_point, b.out_point, b.duration), (2.0, 5.0, 3.0));
    assert_eq!(t.total_duration, 6.0);
    assert!(!t.sequential);
    assert_eq!(t.id_for_source("c"), Some("timeline_c"));
}

#[test]
fn linearize_places_by_running_sum_and_parks_the_rest() {
    let mut t = timeline();
    t.linearize(&order(&["c", "a"]));
    assert_eq!(
        starts(&t),
        vec![
            ("c".to_string(), 0.0, true),
            ("a".to_string(), 1.0, true),
            ("b".to_string(), 3.0, false),
        ]
    );
    assert_eq!(t.total_duration, 3.0);
    assert_eq!(t.sequential_duration(), 3.0);
    assert_eq!(t.clips.len(), 3);
}

#[test]
fn linearize_is_idempotent() {
    let mut t = timeline();
    t.linearize(&order(&["b", "c"]));
    let once = t.clone();
    t.linearize(&order(&["b", "c"]));
    assert_eq!(t, once);
    t.recalculate();
    assert_eq!(t, once);
}

#[test]
fn unknown_and_repeated_ids_are_ignored() {
    let mut t = timeline();
    let mut o = order(&["a", "a", "b"]);
    o.push("ghost".to_string());
    t.linearize(&o);
    assert_eq!(t.clip_order, order(&["a", "b"]));
    assert_eq!(t.sequential_duration(), 5.0);
}

#[test]
fn clip_at_time_skips_disabled() {
    let mut t = timeline();
    t.linearize(&order(&["a"]));
    assert_eq!(t.clip_at_time(1.0).unwrap().source_clip_id, "a");
    // b and c are parked at 2.0 but disabled.
    assert!(t.clip_at_time(2.5).is_none());
}

#[test]
fn trim_updates_duration_and_relinearizes() {
    let mut t = timeline();
    t.linearize(&order(&["a", "b", "c"]));
    t.trim("timeline_a", 0.5, 1.5).unwrap();
    assert_eq!(t.clip("timeline_a").unwrap().duration, 1.0);
    assert_eq!(t.clip("timeline_b").unwrap().start_time, 1.0);
    assert!(t.trim("timeline_a", 2.0, 1.0).is_err());
    assert!(t.trim("nope", 0.0, 1.0).is_err());
}

#[test]
fn split_at_divides_source_range() {
    let mut t = timeline();
    t.linearize(&order(&["a", "b", "c"]));
    let right = t
        .split_at("timeline_b", 3.0, &mut SequentialIdGen::new())
        .unwrap();
    assert_eq!(right, "timeline_b_split_0");

    let l = t.clip("timeline_b").unwrap();
    let r = t.clip(&right).unwrap();
    assert_eq!((l.in_point, l.out_point, l.duration), (2.0, 3.0, 1.0));
    assert_eq!((r.in_point, r.out_point, r.duration), (3.0, 5.0, 2.0));
    assert_eq!(r.start_time, 3.0);
    assert_eq!(t.clip_order[2], right);
    assert_eq!(t.sequential_duration(), 6.0);

    assert!(t.split_at("timeline_a", 0.0, &mut SequentialIdGen::new()).is_err());
}

#[test]
fn seek_clamps() {
    let mut t = timeline();
    assert_eq!(t.seek(-1.0), 0.0);
    assert_eq!(t.seek(100.0), 6.0);
    assert_eq!(t.seek(f64::NAN), 0.0);
}

#[test]
fn sync_inserts_new_clips_after_their_predecessor() {
    let mut t = timeline();
    t.linearize(&order(&["a", "b", "c"]));

    // b was split into b1/b2 and c was deleted in the document.
    let clips = vec![
        clip("a", 0.0, 2.0),
        clip("b1", 2.0, 3.0),
        clip("b2", 3.0, 5.0),
        clip("c", 5.0, 6.0),
    ];
    let deleted: BTreeSet<String> = ["c".to_string()].into();
    t.sync_with_clips(&clips, &deleted);

    assert_eq!(t.clip_order, order(&["a", "b1", "b2"]));
    assert_eq!(t.clip("timeline_b2").unwrap().start_time, 3.0);
    assert_eq!(t.total_duration, 5.0);
    assert!(t.clip("timeline_c").is_none());
}

#[test]
fn sync_keeps_trims_of_untouched_sources() {
    let mut t = timeline();
    t.linearize(&order(&["a", "b", "c"]));
    t.trim("timeline_a", 0.5, 1.0).unwrap();

    // b was split in the document; a is untouched.
    let clips = vec![
        clip("a", 0.0, 2.0),
        clip("b1", 2.0, 3.0),
        clip("b2", 3.0, 5.0),
        clip("c", 5.0, 6.0),
    ];
    t.sync_with_clips(&clips, &BTreeSet::new());

    let a = t.clip("timeline_a").unwrap();
    assert_eq!((a.in_point, a.out_point, a.duration), (0.5, 1.0, 0.5));
    assert_eq!(t.clip("timeline_b1").unwrap().start_time, 0.5);
}

#[test]
fn sync_keeps_both_halves_of_a_timeline_split() {
    let mut t = timeline();
    t.linearize(&order(&["a", "b", "c"]));
    let right = t
        .split_at("timeline_b", 3.0, &mut SequentialIdGen::new())
        .unwrap();

    let clips = vec![clip("a", 0.0, 2.0), clip("b", 2.0, 5.0)];
    t.sync_with_clips(&clips, &BTreeSet::new());

    let l = t.clip("timeline_b").unwrap();
    let r = t.clip(&right).unwrap();
    assert_eq!((l.in_point, l.out_point), (2.0, 3.0));
    assert_eq!((r.in_point, r.out_point), (3.0, 5.0));
    assert_eq!(t.sequential_duration(), 5.0);
}

#[test]
fn sync_remaps_trims_when_the_source_is_retimed() {
    let mut t = timeline();
    t.trim("timeline_b", 3.0, 5.0).unwrap();

    // b stretched from [2, 5] to [2, 8].
    let clips = vec![clip("a", 0.0, 2.0), clip("b", 2.0, 8.0), clip("c", 8.0, 9.0)];
    t.sync_with_clips(&clips, &BTreeSet::new());

    let b = t.clip("timeline_b").unwrap();
    assert_eq!((b.in_point, b.out_point, b.duration), (4.0, 8.0, 4.0));
    let a = t.clip("timeline_a").unwrap();
    assert_eq!((a.in_point, a.out_point), (0.0, 2.0));
}
