use std::collections::BTreeSet;

use crate::{
    document::model::{Clip, Word},
    foundation::error::{SubcutError, SubcutResult},
    foundation::ids::IdGenerator,
};

fn clip_slot(clips: &[Clip], clip_id: &str) -> SubcutResult<usize> {
    clips
        .iter()
        .position(|c| c.id == clip_id)
        .ok_or_else(|| SubcutError::not_found(format!("clip '{clip_id}'")))
}

fn word_slot(clip: &Clip, word_id: &str) -> SubcutResult<usize> {
    clip.word_position(word_id).ok_or_else(|| {
        SubcutError::not_found(format!("word '{word_id}' in clip '{}'", clip.id))
    })
}

/// Move `source` to the position currently held by `target` within one clip.
pub fn reorder_words(clip: &Clip, source: &str, target: &str) -> SubcutResult<Clip> {
    let from = word_slot(clip, source)?;
    let to = word_slot(clip, target)?;
    let mut out = clip.clone();
    let word = out.words.remove(from);
    out.words.insert(to, word);
    out.rebuild_text();
    Ok(out)
}

/// Move one word from `source_clip` into `target_clip` at `position` (appended when `None`
/// or past the end).
///
/// A clip cannot give away its last word; delete the clip instead.
pub fn move_word(
    clips: &[Clip],
    source_clip: &str,
    target_clip: &str,
    word_id: &str,
    position: Option<usize>,
) -> SubcutResult<Vec<Clip>> {
    let src = clip_slot(clips, source_clip)?;
    let dst = clip_slot(clips, target_clip)?;
    let from = word_slot(&clips[src], word_id)?;
    if src != dst && clips[src].words.len() == 1 {
        return Err(SubcutError::invalid_range(format!(
            "word '{word_id}' is the last word of clip '{source_clip}'"
        )));
    }

    let mut out = clips.to_vec();
    let word = out[src].words.remove(from);
    let words = &mut out[dst].words;
    let at = position.unwrap_or(words.len()).min(words.len());
    words.insert(at, word);
    out[src].rebuild_text();
    out[dst].rebuild_text();
    Ok(out)
}

/// Drag-reorder clips.
///
/// A single clip moves to the slot of `over`. When `active` is part of a multi-clip
/// `selected` set, the whole selection moves as a block (keeping its relative order) next
/// to `over`: after it when dragging down, before it when dragging up.
pub fn reorder_clips(
    clips: &[Clip],
    active: &str,
    over: &str,
    selected: &BTreeSet<String>,
) -> SubcutResult<Vec<Clip>> {
    let old = clip_slot(clips, active)?;
    let new = clip_slot(clips, over)?;

    if selected.len() > 1 && selected.contains(active) {
        let (moving, staying): (Vec<&Clip>, Vec<&Clip>) =
            clips.iter().partition(|c| selected.contains(&c.id));
        let insert_at = if selected.contains(over) {
            clips[..new]
                .iter()
                .filter(|c| !selected.contains(&c.id))
                .count()
        } else {
            let over_pos = staying.iter().position(|c| c.id == over).unwrap_or(0);
            if old < new { over_pos + 1 } else { over_pos }
        };
        let mut out: Vec<Clip> = Vec::with_capacity(clips.len());
        out.extend(staying[..insert_at].iter().map(|c| (*c).clone()));
        out.extend(moving.into_iter().cloned());
        out.extend(staying[insert_at..].iter().map(|c| (*c).clone()));
        return Ok(out);
    }

    let mut out = clips.to_vec();
    let clip = out.remove(old);
    out.insert(new, clip);
    Ok(out)
}

/// Replace a clip's words by re-tokenizing `text` on whitespace.
///
/// The clip's original span is divided evenly among the new tokens. A token keeps the id
/// (and mirrors) of the old word at the same position when the text is identical,
/// otherwise of the first unused old word with the same case-insensitive text; remaining
/// tokens get fresh `{clip_id}_w_{n}` ids.
pub fn retokenize_clip(clip: &Clip, text: &str, ids: &mut dyn IdGenerator) -> Clip {
    let tokens: Vec<&str> = text.split_whitespace().collect();
    let (start, end) = match (clip.words.first(), clip.words.last()) {
        (Some(first), Some(last)) => (first.start, last.end),
        _ => (0.0, 3.0),
    };
    let step = if tokens.is_empty() {
        0.0
    } else {
        (end - start) / tokens.len() as f64
    };

    let mut used = vec![false; clip.words.len()];
    let mut reused: Vec<Option<usize>> = vec![None; tokens.len()];
    for (i, token) in tokens.iter().enumerate() {
        if clip.words.get(i).is_some_and(|w| w.text == *token) {
            used[i] = true;
            reused[i] = Some(i);
        }
    }
    for (i, token) in tokens.iter().enumerate() {
        if reused[i].is_some() {
            continue;
        }
        let key = token.to_lowercase();
        if let Some(j) = (0..clip.words.len())
            .find(|&j| !used[j] && clip.words[j].text.trim().to_lowercase() == key)
        {
            used[j] = true;
            reused[i] = Some(j);
        }
    }

    let words = tokens
        .iter()
        .zip(reused)
        .enumerate()
        .map(|(i, (token, old))| {
            let word_start = start + step * i as f64;
            let mut word = match old {
                Some(j) => clip.words[j].clone(),
                None => {
                    let id = format!("{}_w_{}", clip.id, ids.next_id());
                    let mut w = Word::new(id, *token, 0.0, 0.0);
                    w.confidence = clip.words.get(i).and_then(|o| o.confidence);
                    w
                }
            };
            word.text = (*token).to_string();
            word.start = word_start;
            word.end = word_start + step;
            word
        })
        .collect();

    let mut out = Clip {
        words,
        ..clip.clone()
    };
    out.rebuild_text();
    out
}

#[cfg(test)]
#[path = "../../tests/unit/document/edit.rs"]
mod tests;
