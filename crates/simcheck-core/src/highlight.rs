//! Position-aligned highlight rendering from matched blocks.

use crate::matcher::MatchBlock;

/// A run of text that is either part of a match or unique to its side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub text: String,
    pub matched: bool,
}

/// Split both texts into alternating matched/unmatched segments using the
/// block triples. Concatenating the segments of one side reproduces that
/// side's text exactly.
///
/// Blocks must be ascending in both offsets and non-overlapping, as produced
/// by [`crate::matcher::SequenceMatcher::matching_blocks`]. Offsets are char
/// offsets.
pub fn aligned_segments(
    text_a: &str,
    text_b: &str,
    blocks: &[MatchBlock],
) -> (Vec<Segment>, Vec<Segment>) {
    let a: Vec<char> = text_a.chars().collect();
    let b: Vec<char> = text_b.chars().collect();

    let mut out_a = Vec::new();
    let mut out_b = Vec::new();
    let mut pos_a = 0;
    let mut pos_b = 0;

    for block in blocks {
        push_segment(&mut out_a, &a[pos_a..block.a], false);
        push_segment(&mut out_b, &b[pos_b..block.b], false);
        push_segment(&mut out_a, &a[block.a..block.a + block.len], true);
        push_segment(&mut out_b, &b[block.b..block.b + block.len], true);
        pos_a = block.a + block.len;
        pos_b = block.b + block.len;
    }
    push_segment(&mut out_a, &a[pos_a..], false);
    push_segment(&mut out_b, &b[pos_b..], false);

    (out_a, out_b)
}

fn push_segment(out: &mut Vec<Segment>, chars: &[char], matched: bool) {
    if chars.is_empty() {
        return;
    }
    out.push(Segment {
        text: chars.iter().collect(),
        matched,
    });
}

/// Render segments as HTML, wrapping matched runs in a highlight span.
pub fn to_html(segments: &[Segment]) -> String {
    let mut html = String::new();
    for segment in segments {
        let escaped = escape_html(&segment.text);
        if segment.matched {
            html.push_str("<span style=\"background-color: #FFFF99;\">");
            html.push_str(&escaped);
            html.push_str("</span>");
        } else {
            html.push_str(&escaped);
        }
    }
    html
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
