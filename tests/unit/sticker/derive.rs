use super::*;
use crate::document::model::Word;

fn clip(id: &str, start: f64, end: f64) -> Clip {
    Clip::new(id, "s", vec![Word::new(format!("{id}0"), id, start, end)])
}

fn text(id: &str, start: f64) -> InsertedText {
    InsertedText {
        id: id.to_string(),
        content: format!("text {id}"),
        start,
        end: start + 1.0,
    }
}

#[test]
fn sticker_ids_derive_from_text_ids() {
    let s = sticker_for(&text("t1", 0.0));
    assert_eq!(s.id, "sticker_t1");
    assert_eq!(s.original_inserted_text_id, "t1");
}

#[test]
fn overlapping_clips_pick_closest_center() {
    let clips = vec![clip("a", 0.0, 4.0), clip("b", 3.0, 5.0)];
    let none = BTreeSet::new();
    // a center 2.0, b center 4.0
    assert_eq!(find_clip_at_time(&clips, &none, 3.2), Some(1));
    assert_eq!(find_clip_at_time(&clips, &none, 2.9), Some(0));
    assert_eq!(find_clip_at_time(&clips, &none, 9.0), None);

    let deleted: BTreeSet<String> = ["b".to_string()].into();
    assert_eq!(find_clip_at_time(&clips, &deleted, 3.2), Some(0));
}

#[test]
fn derive_replaces_stale_stickers_and_drops_orphans() {
    let mut clips = vec![clip("a", 0.0, 2.0), clip("b", 2.5, 4.0)];
    clips[0].stickers.push(sticker_for(&text("gone", 0.5)));

    let texts = vec![text("t2", 1.5), text("t1", 0.2), text("t3", 3.0), text("t4", 10.0)];
    let out = derive_stickers(&clips, &BTreeSet::new(), &texts);

    let a: Vec<&str> = out[0].stickers.iter().map(|s| s.id.as_str()).collect();
    assert_eq!(a, vec!["sticker_t1", "sticker_t2"]);
    assert_eq!(out[1].stickers.len(), 1);
    assert_eq!(out.iter().map(|c| c.stickers.len()).sum::<usize>(), 3);
}

#[test]
fn derive_is_a_pure_projection() {
    let clips = vec![clip("a", 0.0, 2.0)];
    let texts = vec![text("t1", 0.5), text("t1", 0.7)];
    let once = derive_stickers(&clips, &BTreeSet::new(), &texts);
    let twice = derive_stickers(&once, &BTreeSet::new(), &texts);
    assert_eq!(once, twice);
    assert_eq!(once[0].stickers.len(), 1);
}

#[test]
fn update_refreshes_matching_sticker() {
    let mut clips = derive_stickers(
        &[clip("a", 0.0, 2.0)],
        &BTreeSet::new(),
        &[text("t1", 0.5)],
    );
    let mut edited = text("t1", 0.8);
    edited.content = "edited".to_string();
    assert!(update_sticker(&mut clips, &edited));
    assert_eq!(clips[0].stickers[0].text, "edited");
    assert_eq!(clips[0].stickers[0].start, 0.8);
    assert!(!update_sticker(&mut clips, &text("zz", 0.0)));
}
