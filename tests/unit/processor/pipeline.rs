use super::*;
use crate::{document::model::Word, foundation::ids::SequentialIdGen};

fn clip(id: &str, speaker: &str, n: usize, start: f64, secs: f64) -> Clip {
    let words = (0..n)
        .map(|i| {
            let s = start + i as f64 * secs;
            Word::new(format!("{id}{i}"), format!("{id}{i}"), s, s + secs)
        })
        .collect();
    Clip::new(id, speaker, words)
}

#[test]
fn line_break_then_short_merge_renumbers_once() {
    let processor = ClipProcessor::default();
    let clips = vec![
        clip("a", "s1", 12, 0.0, 0.5),
        clip("b", "s1", 1, 6.0, 0.2),
        clip("c", "s1", 1, 6.2, 0.2),
    ];
    let steps = vec![
        PipelineStep::Split {
            mode: SplitMode::Duration {
                max_secs: Some(3.0),
            },
            only: None,
        },
        PipelineStep::Merge {
            mode: MergeMode::ShortClips {
                min_secs: Some(0.5),
            },
        },
    ];
    let out = processor
        .process_pipeline(clips, &steps, &mut SequentialIdGen::new())
        .unwrap();

    let lens: Vec<usize> = out.iter().map(|c| c.words.len()).collect();
    assert_eq!(lens, vec![6, 6, 2]);
    let indices: Vec<usize> = out.iter().map(|c| c.timeline).collect();
    assert_eq!(indices, vec![1, 2, 3]);
}

#[test]
fn split_filter_limits_targets() {
    let processor = ClipProcessor::default();
    let clips = vec![clip("a", "s", 4, 0.0, 1.0), clip("b", "s", 4, 4.0, 1.0)];
    let steps = vec![PipelineStep::Split {
        mode: SplitMode::Half,
        only: Some(["b".to_string()].into()),
    }];
    let out = processor
        .process_pipeline(clips, &steps, &mut SequentialIdGen::new())
        .unwrap();
    let ids: Vec<&str> = out.iter().map(|c| c.id.as_str()).collect();
    assert_eq!(ids, vec!["a", "b_split_0", "b_split_1"]);
}

#[test]
fn invalid_stage_aborts() {
    let processor = ClipProcessor::default();
    let steps = vec![PipelineStep::Split {
        mode: SplitMode::AtWord { index: 9 },
        only: None,
    }];
    assert!(
        processor
            .process_pipeline(
                vec![clip("a", "s", 3, 0.0, 1.0)],
                &steps,
                &mut SequentialIdGen::new()
            )
            .is_err()
    );
}

#[test]
fn steps_deserialize_from_json() {
    let steps: Vec<PipelineStep> = serde_json::from_str(
        r#"[
            { "op": "split", "mode": { "mode": "line_break" } },
            { "op": "merge", "mode": { "mode": "short_clips", "min_secs": 0.4 } }
        ]"#,
    )
    .unwrap();
    assert_eq!(
        steps[0],
        PipelineStep::Split {
            mode: SplitMode::LineBreak,
            only: None
        }
    );
    assert_eq!(
        steps[1],
        PipelineStep::Merge {
            mode: MergeMode::ShortClips {
                min_secs: Some(0.4)
            }
        }
    );

    let fallback: PipelineStep =
        serde_json::from_str(r#"{ "op": "split", "mode": { "mode": "duration" } }"#).unwrap();
    assert_eq!(
        fallback,
        PipelineStep::Split {
            mode: SplitMode::Duration { max_secs: None },
            only: None
        }
    );
}
