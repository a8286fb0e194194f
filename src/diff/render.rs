use serde::{Deserialize, Serialize};

use super::{DiffOp, DiffTag};

/// Presentation selected by the caller for a computed diff.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RenderMode {
    /// Revised text only, no styling.
    Plain,
    /// Insertions and deletions both visible.
    #[default]
    Diff,
    /// Revised text with changed spans highlighted; deletions omitted.
    DiffOverwrite,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SegmentStyle {
    None,
    Insert,
    Delete,
    Overwrite,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StyledSegment {
    pub text: String,
    pub style: SegmentStyle,
}

/// Maps a cleaned diff to styled segments. One walk over the ops in their
/// natural order, parameterized by a per-mode style table and a skip
/// predicate; no mode gets its own loop.
pub fn render(diff: &[DiffOp], mode: RenderMode) -> Vec<StyledSegment> {
    let style_of = |tag: DiffTag| match (mode, tag) {
        (RenderMode::Plain, _) => SegmentStyle::None,
        (RenderMode::Diff, DiffTag::Insert) => SegmentStyle::Insert,
        (RenderMode::Diff, DiffTag::Delete) => SegmentStyle::Delete,
        (RenderMode::Diff, DiffTag::Equal) => SegmentStyle::None,
        (RenderMode::DiffOverwrite, DiffTag::Insert) => SegmentStyle::Overwrite,
        (RenderMode::DiffOverwrite, _) => SegmentStyle::None,
    };
    let skip = |tag: DiffTag| match mode {
        RenderMode::Diff => false,
        RenderMode::Plain | RenderMode::DiffOverwrite => tag == DiffTag::Delete,
    };

    diff.iter()
        .filter(|op| !skip(op.tag))
        .map(|op| StyledSegment {
            text: op.segment.clone(),
            style: style_of(op.tag),
        })
        .collect()
}
