mod render;

pub use render::{render, RenderMode, SegmentStyle, StyledSegment};

use serde::Serialize;
use similar::{ChangeTag, TextDiff};
use std::collections::HashSet;
use std::ops::Range;
use unicode_segmentation::UnicodeSegmentation;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DiffTag {
    Equal,
    Insert,
    Delete,
}

/// One edit operation. Concatenating the segments of all non-Delete ops
/// reconstructs the revised text; all non-Insert ops reconstruct the
/// original.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DiffOp {
    pub tag: DiffTag,
    pub segment: String,
}

/// Computes a character-level minimal diff and cleans it up so edit
/// boundaries land on word boundaries instead of mid-word fragments.
pub fn compute_diff(original: &str, revised: &str) -> Vec<DiffOp> {
    let runs = raw_char_runs(original, revised);
    semantic_cleanup(original, revised, &runs)
}

/// Minimal Myers edit script at character granularity, collected into
/// maximal same-tag runs.
fn raw_char_runs(original: &str, revised: &str) -> Vec<DiffOp> {
    let text_diff = TextDiff::from_chars(original, revised);
    let mut runs: Vec<DiffOp> = Vec::new();

    for change in text_diff.iter_all_changes() {
        let tag = match change.tag() {
            ChangeTag::Equal => DiffTag::Equal,
            ChangeTag::Insert => DiffTag::Insert,
            ChangeTag::Delete => DiffTag::Delete,
        };
        let value = change.as_str().unwrap_or("");
        match runs.last_mut() {
            Some(last) if last.tag == tag => last.segment.push_str(value),
            _ => runs.push(DiffOp {
                tag,
                segment: value.to_string(),
            }),
        }
    }

    runs
}

/// A span of both texts: either shared context (identical slices) or a
/// changed region pairing deleted original text with inserted revised text.
#[derive(Clone, Debug)]
struct Piece {
    change: bool,
    orig: Range<usize>,
    rev: Range<usize>,
}

/// Refines the minimal edit script for readability. Single-sided edits are
/// first slid within their surrounding context to a position where both
/// endpoints are word boundaries; whatever remains misaligned is expanded
/// into the neighboring context until both endpoints sit on word boundaries
/// of both texts. Context stolen from an equality is replayed on the delete
/// and insert sides alike, so reconstruction of either text is unaffected.
/// Equalities consumed whole merge the regions around them.
fn semantic_cleanup(original: &str, revised: &str, runs: &[DiffOp]) -> Vec<DiffOp> {
    let mut pieces = build_pieces(runs);
    let wb_orig = word_boundaries(original);
    let wb_rev = word_boundaries(revised);

    for i in 0..pieces.len() {
        if !pieces[i].change {
            continue;
        }

        slide_region(&mut pieces, i, original, revised, &wb_orig, &wb_rev);

        // Expand left into the tail of the preceding equality.
        if i > 0 {
            let avail = pieces[i - 1].orig.len();
            let start_o = pieces[i].orig.start;
            let start_r = pieces[i].rev.start;
            let k = (0..=avail)
                .find(|&k| wb_orig.contains(&(start_o - k)) && wb_rev.contains(&(start_r - k)))
                .unwrap_or(avail);
            if k > 0 {
                pieces[i - 1].orig.end -= k;
                pieces[i - 1].rev.end -= k;
                pieces[i].orig.start -= k;
                pieces[i].rev.start -= k;
            }
        }

        // Expand right into the head of the following equality.
        if i + 1 < pieces.len() {
            let avail = pieces[i + 1].orig.len();
            let end_o = pieces[i].orig.end;
            let end_r = pieces[i].rev.end;
            let k = (0..=avail)
                .find(|&k| wb_orig.contains(&(end_o + k)) && wb_rev.contains(&(end_r + k)))
                .unwrap_or(avail);
            if k > 0 {
                pieces[i + 1].orig.start += k;
                pieces[i + 1].rev.start += k;
                pieces[i].orig.end += k;
                pieces[i].rev.end += k;
            }
        }
    }

    // Drop emptied equalities and merge the changed regions they separated.
    let mut cleaned: Vec<Piece> = Vec::new();
    for piece in pieces {
        if piece.orig.is_empty() && piece.rev.is_empty() {
            continue;
        }
        match cleaned.last_mut() {
            Some(last) if last.change && piece.change => {
                last.orig.end = piece.orig.end;
                last.rev.end = piece.rev.end;
            }
            _ => cleaned.push(piece),
        }
    }

    let mut diff = Vec::new();
    for piece in cleaned {
        if piece.change {
            if !piece.orig.is_empty() {
                diff.push(DiffOp {
                    tag: DiffTag::Delete,
                    segment: original[piece.orig.clone()].to_string(),
                });
            }
            if !piece.rev.is_empty() {
                diff.push(DiffOp {
                    tag: DiffTag::Insert,
                    segment: revised[piece.rev].to_string(),
                });
            }
        } else {
            diff.push(DiffOp {
                tag: DiffTag::Equal,
                segment: original[piece.orig].to_string(),
            });
        }
    }

    diff
}

/// Slides a pure insertion or pure deletion through its surrounding shared
/// context, looking for an equivalent position where the edit's endpoints
/// and its location in the untouched text all fall on word boundaries. The
/// rightmost fully aligned position wins; if none exists the region is left
/// where the minimal script put it.
fn slide_region(
    pieces: &mut [Piece],
    i: usize,
    original: &str,
    revised: &str,
    wb_orig: &HashSet<usize>,
    wb_rev: &HashSet<usize>,
) {
    let is_insert = pieces[i].orig.is_empty();
    let is_delete = pieces[i].rev.is_empty();
    if is_insert == is_delete {
        return;
    }

    let active = if is_insert { revised } else { original };
    let (active_wb, passive_wb) = if is_insert {
        (wb_rev, wb_orig)
    } else {
        (wb_orig, wb_rev)
    };
    let (base_range, base_pos) = if is_insert {
        (pieces[i].rev.clone(), pieces[i].orig.start)
    } else {
        (pieces[i].orig.clone(), pieces[i].rev.start)
    };

    // Candidate positions: (active start, active end, passive position).
    let mut candidates = vec![(base_range.start, base_range.end, base_pos)];

    // Slide left while the edit ends with the character preceding it.
    let mut left_room = if i > 0 { pieces[i - 1].orig.len() } else { 0 };
    let (mut start, mut end, mut pos) = candidates[0];
    while left_room > 0 {
        let prev = match active[..start].chars().next_back() {
            Some(c) => c,
            None => break,
        };
        let step = prev.len_utf8();
        if step > left_room || !active[start..end].ends_with(prev) {
            break;
        }
        start -= step;
        end -= step;
        pos -= step;
        left_room -= step;
        candidates.push((start, end, pos));
    }

    // Slide right while the edit starts with the character following it.
    let mut right_room = if i + 1 < pieces.len() {
        pieces[i + 1].orig.len()
    } else {
        0
    };
    let (mut start, mut end, mut pos) = candidates[0];
    while right_room > 0 {
        let next = match active[end..].chars().next() {
            Some(c) => c,
            None => break,
        };
        let step = next.len_utf8();
        if step > right_room || !active[start..end].starts_with(next) {
            break;
        }
        start += step;
        end += step;
        pos += step;
        right_room -= step;
        candidates.push((start, end, pos));
    }

    let aligned = candidates
        .into_iter()
        .filter(|&(s, e, p)| {
            active_wb.contains(&s) && active_wb.contains(&e) && passive_wb.contains(&p)
        })
        .max_by_key(|&(s, _, _)| s);

    if let Some((s, e, p)) = aligned {
        if is_insert {
            pieces[i].rev = s..e;
            pieces[i].orig = p..p;
            if i > 0 {
                pieces[i - 1].rev.end = s;
                pieces[i - 1].orig.end = p;
            }
            if i + 1 < pieces.len() {
                pieces[i + 1].rev.start = e;
                pieces[i + 1].orig.start = p;
            }
        } else {
            pieces[i].orig = s..e;
            pieces[i].rev = p..p;
            if i > 0 {
                pieces[i - 1].orig.end = s;
                pieces[i - 1].rev.end = p;
            }
            if i + 1 < pieces.len() {
                pieces[i + 1].orig.start = e;
                pieces[i + 1].rev.start = p;
            }
        }
    }
}

/// Maps same-tag runs onto byte ranges of both texts. Consecutive deletes
/// and inserts collapse into one changed region, so pieces strictly
/// alternate between shared context and changed regions.
fn build_pieces(runs: &[DiffOp]) -> Vec<Piece> {
    let mut pieces: Vec<Piece> = Vec::new();
    let mut o = 0usize;
    let mut r = 0usize;

    for run in runs {
        let len = run.segment.len();
        match run.tag {
            DiffTag::Equal => {
                pieces.push(Piece {
                    change: false,
                    orig: o..o + len,
                    rev: r..r + len,
                });
                o += len;
                r += len;
            }
            DiffTag::Delete => {
                match pieces.last_mut() {
                    Some(last) if last.change => last.orig.end = o + len,
                    _ => pieces.push(Piece {
                        change: true,
                        orig: o..o + len,
                        rev: r..r,
                    }),
                }
                o += len;
            }
            DiffTag::Insert => {
                match pieces.last_mut() {
                    Some(last) if last.change => last.rev.end = r + len,
                    _ => pieces.push(Piece {
                        change: true,
                        orig: o..o,
                        rev: r..r + len,
                    }),
                }
                r += len;
            }
        }
    }

    pieces
}

fn word_boundaries(text: &str) -> HashSet<usize> {
    let mut bounds: HashSet<usize> = text
        .split_word_bound_indices()
        .map(|(index, _)| index)
        .collect();
    bounds.insert(text.len());
    bounds
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reconstruct_original(diff: &[DiffOp]) -> String {
        diff.iter()
            .filter(|op| op.tag != DiffTag::Insert)
            .map(|op| op.segment.as_str())
            .collect()
    }

    fn reconstruct_revised(diff: &[DiffOp]) -> String {
        diff.iter()
            .filter(|op| op.tag != DiffTag::Delete)
            .map(|op| op.segment.as_str())
            .collect()
    }

    fn assert_invariants(original: &str, revised: &str) {
        let diff = compute_diff(original, revised);
        assert_eq!(reconstruct_original(&diff), original);
        assert_eq!(reconstruct_revised(&diff), revised);
        for op in &diff {
            assert!(!op.segment.is_empty(), "zero-length segment in {:?}", diff);
        }
        for window in diff.windows(2) {
            assert_ne!(window[0].tag, window[1].tag, "adjacent tags in {:?}", diff);
        }
    }

    #[test]
    fn identical_inputs_yield_single_equal_op() {
        let diff = compute_diff("nothing changed here", "nothing changed here");
        assert_eq!(
            diff,
            vec![DiffOp {
                tag: DiffTag::Equal,
                segment: "nothing changed here".to_string(),
            }]
        );
    }

    #[test]
    fn empty_inputs_yield_empty_diff() {
        assert!(compute_diff("", "").is_empty());
    }

    #[test]
    fn reconstruction_holds_for_assorted_pairs() {
        assert_invariants("Helo world!1", "Hello, world!");
        assert_invariants("", "brand new text");
        assert_invariants("soon to be deleted", "");
        assert_invariants("the quick brown fox", "the quick brown fox jumps");
        assert_invariants("I has a apple", "I have an apple");
        assert_invariants("naïve café", "naive cafe");
        assert_invariants("word", "words matter");
        assert_invariants("a b c d", "d c b a");
        assert_invariants("aaa", "aaaa");
    }

    #[test]
    fn cleanup_aligns_edits_to_word_boundaries() {
        // A minimal char diff would keep "quick" as shared context inside
        // "quicker"; cleanup widens the edit to the whole word.
        let diff = compute_diff("The quick fox", "The quicker fox");
        assert_eq!(
            diff,
            vec![
                DiffOp {
                    tag: DiffTag::Equal,
                    segment: "The ".to_string(),
                },
                DiffOp {
                    tag: DiffTag::Delete,
                    segment: "quick".to_string(),
                },
                DiffOp {
                    tag: DiffTag::Insert,
                    segment: "quicker".to_string(),
                },
                DiffOp {
                    tag: DiffTag::Equal,
                    segment: " fox".to_string(),
                },
            ]
        );
    }

    #[test]
    fn inserted_word_slides_to_a_word_boundary() {
        // The minimal script inserts "wo t" inside "one |t|hree"; sliding
        // recovers the whole inserted word.
        let diff = compute_diff("one three", "one two three");
        assert_eq!(
            diff,
            vec![
                DiffOp {
                    tag: DiffTag::Equal,
                    segment: "one ".to_string(),
                },
                DiffOp {
                    tag: DiffTag::Insert,
                    segment: "two ".to_string(),
                },
                DiffOp {
                    tag: DiffTag::Equal,
                    segment: "three".to_string(),
                },
            ]
        );
    }

    #[test]
    fn deleted_word_slides_to_a_word_boundary() {
        let diff = compute_diff("one two three", "one three");
        assert_eq!(
            diff,
            vec![
                DiffOp {
                    tag: DiffTag::Equal,
                    segment: "one ".to_string(),
                },
                DiffOp {
                    tag: DiffTag::Delete,
                    segment: "two ".to_string(),
                },
                DiffOp {
                    tag: DiffTag::Equal,
                    segment: "three".to_string(),
                },
            ]
        );
    }

    #[test]
    fn rewrite_scenario_produces_readable_chunks() {
        let diff = compute_diff("Helo world!1", "Hello, world!");
        assert_eq!(reconstruct_original(&diff), "Helo world!1");
        assert_eq!(reconstruct_revised(&diff), "Hello, world!");

        // The misspelled word is replaced as a unit rather than keeping
        // "Hel" + "o" fragments from the minimal script.
        assert!(diff.contains(&DiffOp {
            tag: DiffTag::Delete,
            segment: "Helo".to_string(),
        }));
        assert!(diff.contains(&DiffOp {
            tag: DiffTag::Insert,
            segment: "Hello,".to_string(),
        }));
        assert!(diff.contains(&DiffOp {
            tag: DiffTag::Delete,
            segment: "1".to_string(),
        }));
    }

    #[test]
    fn diff_is_deterministic() {
        let first = compute_diff("some mispeled text", "some misspelled text");
        let second = compute_diff("some mispeled text", "some misspelled text");
        assert_eq!(first, second);
    }
}
