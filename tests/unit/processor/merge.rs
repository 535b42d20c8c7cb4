use super::*;
use crate::{
    document::model::Word,
    foundation::ids::SequentialIdGen,
    processor::measure::GlyphWidthMeasure,
    processor::split::{SplitMode, split_clip},
};

fn clip(id: &str, speaker: &str, start: f64, secs: &[f64]) -> Clip {
    let mut t = start;
    let words = secs
        .iter()
        .enumerate()
        .map(|(i, d)| {
            let w = Word::new(format!("{id}{i}"), format!("{id}{i}"), t, t + d);
            t += d;
            w
        })
        .collect();
    Clip::new(id, speaker, words)
}

fn ids_of(clips: &[Clip]) -> Vec<&str> {
    clips.iter().map(|c| c.id.as_str()).collect()
}

fn abc() -> Vec<Clip> {
    vec![
        clip("a", "s1", 0.0, &[1.0, 1.0]),
        clip("b", "s1", 2.0, &[1.5, 1.5]),
        clip("c", "s2", 5.0, &[1.0]),
    ]
}

fn sel(ids: &[&str]) -> Vec<String> {
    ids.iter().map(|s| s.to_string()).collect()
}

#[test]
fn manual_merge_concatenates_and_keeps_first_attributes() {
    let clips = abc();
    let merged = merge_clips(&clips[1..], &mut SequentialIdGen::new()).unwrap();
    assert_eq!(merged.id, "merged_0");
    assert_eq!(merged.speaker, "s1");
    assert_eq!(merged.full_text, "b0 b1 c0");
    assert_eq!(merged.subtitle, merged.full_text);
    assert_eq!(merged.words[2], clips[2].words[0]);
}

#[test]
fn non_contiguous_merge_is_rejected() {
    let clips = abc();
    let err = merge_in_document(
        &clips,
        &BTreeSet::new(),
        &sel(&["a", "c"]),
        &mut SequentialIdGen::new(),
    )
    .unwrap_err();
    assert!(matches!(err, SubcutError::InvalidRange(_)));
}

#[test]
fn contiguous_merge_replaces_at_first_position() {
    let clips = abc();
    let out = merge_in_document(
        &clips,
        &BTreeSet::new(),
        &sel(&["b", "a"]),
        &mut SequentialIdGen::new(),
    )
    .unwrap();
    assert_eq!(ids_of(&out), vec!["merged_0", "c"]);
    assert_eq!(out[0].full_text, "a0 a1 b0 b1");
}

#[test]
fn soft_deleted_clip_between_does_not_break_contiguity() {
    let clips = abc();
    let deleted: BTreeSet<String> = ["b".to_string()].into();
    let out = merge_in_document(&clips, &deleted, &sel(&["a", "c"]), &mut SequentialIdGen::new())
        .unwrap();
    assert_eq!(ids_of(&out), vec!["merged_0", "b"]);
}

#[test]
fn merge_needs_two_known_clips() {
    let clips = abc();
    let mut ids = SequentialIdGen::new();
    assert!(matches!(
        merge_in_document(&clips, &BTreeSet::new(), &sel(&["a", "a"]), &mut ids),
        Err(SubcutError::InvalidRange(_))
    ));
    assert!(matches!(
        merge_in_document(&clips, &BTreeSet::new(), &sel(&["a", "zz"]), &mut ids),
        Err(SubcutError::NotFound(_))
    ));
}

#[test]
fn merge_of_split_round_trips_words_and_text() {
    let original = clip("x", "s", 0.0, &[0.4, 0.5, 0.6, 0.7, 0.2]);
    let mut ids = SequentialIdGen::new();
    let pieces = split_clip(
        &original,
        &SplitMode::AtWord { index: 2 },
        &ProcessorConfig::default(),
        &GlyphWidthMeasure::default(),
        &mut ids,
    )
    .unwrap();
    let merged = merge_clips(&pieces, &mut ids).unwrap();
    assert_eq!(merged.words, original.words);
    assert_eq!(merged.full_text, original.full_text);
    assert_eq!(merged.speaker, original.speaker);
}

#[test]
fn short_clips_fold_until_a_long_clip_or_speaker_change() {
    let clips = vec![
        clip("a", "s1", 0.0, &[0.2]),
        clip("b", "s1", 0.2, &[0.2]),
        clip("c", "s1", 0.4, &[2.0]),
        clip("d", "s1", 2.4, &[0.1]),
        clip("e", "s2", 2.5, &[0.1]),
    ];
    let out = merge_sequence(
        clips,
        &MergeMode::ShortClips {
            min_secs: Some(0.5),
        },
        &ProcessorConfig::default(),
        &GlyphWidthMeasure::default(),
        &mut SequentialIdGen::new(),
    )
    .unwrap();
    let texts: Vec<&str> = out.iter().map(|c| c.full_text.as_str()).collect();
    assert_eq!(texts, vec!["a0 b0", "c0", "d0", "e0"]);
}

#[test]
fn short_clips_threshold_defaults_to_config() {
    let clips = vec![
        clip("a", "s1", 0.0, &[0.3]),
        clip("b", "s1", 0.3, &[0.3]),
        clip("c", "s1", 0.6, &[0.8]),
    ];
    let merge = |config: &ProcessorConfig| {
        let out = merge_sequence(
            clips.clone(),
            &MergeMode::ShortClips { min_secs: None },
            config,
            &GlyphWidthMeasure::default(),
            &mut SequentialIdGen::new(),
        )
        .unwrap();
        out.iter().map(|c| c.full_text.clone()).collect::<Vec<_>>()
    };

    assert_eq!(merge(&ProcessorConfig::default()), vec!["a0 b0", "c0"]);
    let wider = ProcessorConfig {
        min_clip_duration: 1.0,
        ..ProcessorConfig::default()
    };
    assert_eq!(merge(&wider), vec!["a0 b0 c0"]);
}

#[test]
fn by_speaker_merges_runs_within_width() {
    let clips = vec![
        clip("a", "s1", 0.0, &[1.0]),
        clip("b", "s1", 1.0, &[1.0]),
        clip("c", "s2", 2.0, &[1.0]),
        clip("d", "s1", 3.0, &[1.0]),
    ];
    let out = merge_sequence(
        clips.clone(),
        &MergeMode::BySpeaker,
        &ProcessorConfig::default(),
        &GlyphWidthMeasure::default(),
        &mut SequentialIdGen::new(),
    )
    .unwrap();
    let texts: Vec<&str> = out.iter().map(|c| c.full_text.as_str()).collect();
    assert_eq!(texts, vec!["a0 b0", "c0", "d0"]);

    let disabled = ProcessorConfig {
        merge_same_speaker: false,
        ..ProcessorConfig::default()
    };
    let out = merge_sequence(
        clips.clone(),
        &MergeMode::BySpeaker,
        &disabled,
        &GlyphWidthMeasure::default(),
        &mut SequentialIdGen::new(),
    )
    .unwrap();
    assert_eq!(out, clips);
}

#[test]
fn by_speaker_respects_max_width() {
    let long = |id: &str, start: f64| {
        let mut c = clip(id, "s1", start, &[1.0]);
        c.words[0].text = "x".repeat(20);
        c.rebuild_text();
        c
    };
    // Each 20-char word is 594px wide at the default font; two never fit in 768px.
    let out = merge_sequence(
        vec![long("a", 0.0), long("b", 1.0)],
        &MergeMode::BySpeaker,
        &ProcessorConfig::default(),
        &GlyphWidthMeasure::default(),
        &mut SequentialIdGen::new(),
    )
    .unwrap();
    assert_eq!(ids_of(&out), vec!["a", "b"]);
}
