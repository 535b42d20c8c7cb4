use super::*;
use crate::{foundation::ids::SequentialIdGen, processor::measure::GlyphWidthMeasure};

fn clip(n: usize, word_secs: f64) -> Clip {
    let words = (0..n)
        .map(|i| {
            let s = i as f64 * word_secs;
            Word::new(format!("w{i}"), format!("word{i}"), s, s + word_secs)
        })
        .collect();
    Clip::new("c", "spk", words)
}

fn run(c: &Clip, mode: SplitMode) -> SubcutResult<Vec<Clip>> {
    split_clip(
        c,
        &mode,
        &ProcessorConfig::default(),
        &GlyphWidthMeasure::default(),
        &mut SequentialIdGen::new(),
    )
}

fn lens(pieces: &[Clip]) -> Vec<usize> {
    pieces.iter().map(|p| p.words.len()).collect()
}

#[test]
fn half_rounds_up() {
    assert_eq!(lens(&run(&clip(5, 1.0), SplitMode::Half).unwrap()), vec![3, 2]);
    assert_eq!(lens(&run(&clip(4, 1.0), SplitMode::Half).unwrap()), vec![2, 2]);
}

#[test]
fn at_word_preserves_timings_ids_and_speaker() {
    let c = clip(4, 0.5);
    let pieces = run(&c, SplitMode::AtWord { index: 1 }).unwrap();
    assert_eq!(lens(&pieces), vec![1, 3]);
    assert_eq!(pieces[0].words[0], c.words[0]);
    assert_eq!(pieces[1].words, c.words[1..].to_vec());
    assert_eq!(pieces[1].full_text, "word1 word2 word3");
    assert_eq!(pieces[0].speaker, "spk");
    assert_eq!(pieces[0].id, "c_split_0");
    assert_eq!(pieces[1].id, "c_split_1");
}

#[test]
fn at_word_out_of_range_is_invalid() {
    let c = clip(3, 1.0);
    for index in [0, 3, 7] {
        let err = run(&c, SplitMode::AtWord { index }).unwrap_err();
        assert!(matches!(err, SubcutError::InvalidRange(_)));
    }
}

#[test]
fn single_word_clip_cannot_split() {
    let err = run(&clip(1, 1.0), SplitMode::Half).unwrap_err();
    assert!(matches!(err, SubcutError::InvalidRange(_)));
}

#[test]
fn fraction_snaps_to_nearest_word_boundary() {
    let c = clip(4, 1.0);
    assert_eq!(
        lens(&run(&c, SplitMode::AtFraction { fraction: 0.3 }).unwrap()),
        vec![1, 3]
    );
    assert_eq!(
        lens(&run(&c, SplitMode::AtFraction { fraction: 0.9 }).unwrap()),
        vec![3, 1]
    );
    assert!(run(&c, SplitMode::AtFraction { fraction: 1.0 }).is_err());
}

#[test]
fn duration_mode_chunks_evenly() {
    // 10 words x 1s = 10s, max 4s -> 3 target clips -> 4 words per clip.
    let pieces = run(&clip(10, 1.0), SplitMode::Duration {
            max_secs: Some(4.0),
        }).unwrap();
    assert_eq!(lens(&pieces), vec![4, 4, 2]);

    let short = clip(3, 1.0);
    let pieces = run(&short, SplitMode::Duration {
            max_secs: Some(4.0),
        }).unwrap();
    assert_eq!(pieces, vec![short]);
}

#[test]
fn duration_mode_falls_back_to_configured_maximum() {
    let config = ProcessorConfig {
        max_clip_duration: 3.0,
        ..ProcessorConfig::default()
    };
    let pieces = split_clip(
        &clip(6, 1.0),
        &SplitMode::Duration { max_secs: None },
        &config,
        &GlyphWidthMeasure::default(),
        &mut SequentialIdGen::new(),
    )
    .unwrap();
    assert_eq!(lens(&pieces), vec![3, 3]);

    // Default maximum is 5s.
    let pieces = run(&clip(6, 1.0), SplitMode::Duration { max_secs: None }).unwrap();
    assert_eq!(lens(&pieces), vec![3, 3]);
    let pieces = run(&clip(4, 1.0), SplitMode::Duration { max_secs: None }).unwrap();
    assert_eq!(lens(&pieces), vec![4]);
}

#[test]
fn automatic_modes_pass_single_word_clips_through() {
    assert!(SplitMode::LineBreak.is_automatic());
    assert!(SplitMode::Duration { max_secs: None }.is_automatic());
    assert!(!SplitMode::Half.is_automatic());
    assert!(!SplitMode::AtWord { index: 1 }.is_automatic());

    let single = clip(1, 9.0);
    assert_eq!(run(&single, SplitMode::LineBreak).unwrap(), vec![single.clone()]);
    assert_eq!(
        run(&single, SplitMode::Duration { max_secs: Some(2.0) }).unwrap(),
        vec![single.clone()]
    );
    let err = run(&single, SplitMode::Half).unwrap_err();
    assert!(matches!(err, SubcutError::InvalidRange(_)));
}

#[test]
fn line_break_fills_up_to_max_width() {
    // Each "wordN" is 5 narrow chars: 5 * 0.55 * 54px = 148.5px, space 16.2px.
    // Max width 768px fits 4 words (4*148.5 + 3*16.2 = 642.6), not 5 (807.3).
    let pieces = run(&clip(10, 0.3), SplitMode::LineBreak).unwrap();
    assert_eq!(lens(&pieces), vec![4, 4, 2]);

    let fits = clip(3, 0.3);
    assert_eq!(run(&fits, SplitMode::LineBreak).unwrap(), vec![fits]);
}

#[test]
fn stickers_follow_their_start_time() {
    let mut c = clip(4, 1.0);
    c.stickers.push(Sticker {
        id: "sticker_t1".to_string(),
        text: "wow".to_string(),
        start: 2.5,
        end: 3.0,
        original_inserted_text_id: "t1".to_string(),
    });
    let pieces = run(&c, SplitMode::Half).unwrap();
    assert!(pieces[0].stickers.is_empty());
    assert_eq!(pieces[1].stickers.len(), 1);
}
