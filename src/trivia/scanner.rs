//! The gap scanner.
//!
//! Scans the trivia between two consecutive real children (or before the
//! first / after the last) and produces the comments that belong to the
//! container rather than to a neighboring node. Works by direct character
//! inspection of `/`, `//`, `/*`, `/**` at the cursor - never a tokenizer
//! or regex - so a division or regex-literal slash inside neighboring
//! token text can never be misread as a comment start (the gap itself
//! contains no such tokens).

use crate::base::{TextRange, TextSize};

use super::comment::{CommentContext, CommentKind, CommentNode};

/// Result of probing the cursor for a comment start.
enum CommentHit {
    Line { end: usize },
    Block { end: usize, doc: bool },
    /// `/*` with no closing `*/`: malformed trivia, stop scanning.
    Unterminated,
    None,
}

/// Scan one gap `[gap_start, gap_end)`.
///
/// * `has_following_child` - a real child follows this gap, so doc-style
///   comments are left for it to claim (the pass stops at them).
/// * `skip_trailing` - run the trailing-skip pass first. Off only for the
///   whole-file leading gap, where there is no code above to be flush
///   with.
///
/// Kept comments are appended to `out` in ascending position order.
pub fn scan_gap(
    text: &str,
    gap_start: TextSize,
    gap_end: TextSize,
    has_following_child: bool,
    skip_trailing: bool,
    context: CommentContext,
    out: &mut Vec<CommentNode>,
) {
    let bytes = text.as_bytes();
    let end = usize::from(gap_end).min(bytes.len());
    let mut pos = usize::from(gap_start);

    if skip_trailing {
        match trailing_skip(bytes, pos, end) {
            Some(p) => pos = p,
            None => return, // malformed trivia
        }
    }

    // Leading-comment pass.
    loop {
        while pos < end && bytes[pos].is_ascii_whitespace() {
            pos += 1;
        }
        if pos >= end {
            return;
        }
        let (comment_end, kind, doc) = match comment_at(bytes, pos) {
            CommentHit::None | CommentHit::Unterminated => return,
            CommentHit::Line { end } => (end, CommentKind::Line, false),
            CommentHit::Block { end, doc } => (end, CommentKind::Block, doc),
        };
        // Doc comments attach to the following child, not the container -
        // unless nothing follows to claim them.
        if doc && has_following_child {
            return;
        }
        if !is_standalone(bytes, comment_end) {
            return; // belongs to the code sharing its line
        }
        out.push(CommentNode::new(
            TextRange::new(TextSize::new(pos as u32), TextSize::new(comment_end as u32)),
            kind,
            doc,
            context,
        ));
        // Comments sharing the kept comment's closing line fold into the
        // group: re-run the trailing-skip rules from here.
        match trailing_skip(bytes, comment_end, end) {
            Some(p) => pos = p,
            None => return,
        }
    }
}

/// Step 1: consume the remainder of the current source line.
///
/// Returns the position the leading pass should resume from, or `None` on
/// malformed trivia. A single-line comment is consumed and ends the pass
/// (it is used up); a multi-line comment is consumed and the line scan
/// continues past it; commas are separators and are skipped; any other
/// significant character ends the pass exactly at that character.
fn trailing_skip(bytes: &[u8], mut pos: usize, end: usize) -> Option<usize> {
    while pos < end {
        let c = bytes[pos];
        if c == b'\n' {
            return Some(pos);
        }
        if c.is_ascii_whitespace() || c == b',' {
            pos += 1;
            continue;
        }
        match comment_at(bytes, pos) {
            CommentHit::Line { end: comment_end } => return Some(comment_end),
            CommentHit::Block {
                end: comment_end, ..
            } => {
                pos = comment_end;
            }
            CommentHit::Unterminated => return None,
            CommentHit::None => return Some(pos),
        }
    }
    Some(pos)
}

/// Step 3: keep a discovered comment only if no significant token shares
/// the rest of its line. Follow-on comments are trivia, not tokens, so
/// the probe walks over them; end-of-file and a flush closing brace also
/// keep the comment.
fn is_standalone(bytes: &[u8], mut probe: usize) -> bool {
    loop {
        if probe >= bytes.len() {
            return true; // end-of-file
        }
        let c = bytes[probe];
        if c == b'\n' {
            return true;
        }
        if c.is_ascii_whitespace() {
            probe += 1;
            continue;
        }
        match comment_at(bytes, probe) {
            // A line comment runs to its newline, so any token after it
            // sits on a later line.
            CommentHit::Line { .. } | CommentHit::Unterminated => return true,
            CommentHit::Block { end, .. } => {
                if bytes[probe..end].contains(&b'\n') {
                    return true;
                }
                probe = end;
            }
            CommentHit::None => return c == b'}',
        }
    }
}

/// Probe for a comment start at `pos` by direct character inspection.
fn comment_at(bytes: &[u8], pos: usize) -> CommentHit {
    if pos + 1 >= bytes.len() || bytes[pos] != b'/' {
        return CommentHit::None;
    }
    match bytes[pos + 1] {
        b'/' => {
            let mut end = pos + 2;
            while end < bytes.len() && bytes[end] != b'\n' {
                end += 1;
            }
            CommentHit::Line { end }
        }
        b'*' => {
            let doc = pos + 3 < bytes.len() && bytes[pos + 2] == b'*' && bytes[pos + 3] != b'/';
            let mut cursor = pos + 2;
            while cursor + 1 < bytes.len() {
                if bytes[cursor] == b'*' && bytes[cursor + 1] == b'/' {
                    return CommentHit::Block {
                        end: cursor + 2,
                        doc,
                    };
                }
                cursor += 1;
            }
            CommentHit::Unterminated
        }
        _ => CommentHit::None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn scan(
        text: &str,
        gap: std::ops::Range<u32>,
        has_following_child: bool,
        skip_trailing: bool,
    ) -> Vec<(u32, u32, CommentKind, bool)> {
        let mut out = Vec::new();
        scan_gap(
            text,
            TextSize::new(gap.start),
            TextSize::new(gap.end),
            has_following_child,
            skip_trailing,
            CommentContext::Statement,
            &mut out,
        );
        out.iter()
            .map(|c| {
                (
                    c.range().start().into(),
                    c.range().end().into(),
                    c.kind(),
                    c.is_doc(),
                )
            })
            .collect()
    }

    #[test]
    fn test_leading_line_comment_is_kept() {
        // File-root leading gap: no trailing-skip.
        let text = "// a\nlet a;";
        assert_eq!(
            scan(text, 0..5, true, false),
            vec![(0, 4, CommentKind::Line, false)]
        );
    }

    #[test]
    fn test_comment_on_code_line_is_used_up_by_trailing_skip() {
        // Gap after `let a;` (ends at 6): `// t` sits on the code's line.
        let text = "let a; // t\nlet b;";
        assert_eq!(scan(text, 6..12, true, true), vec![]);
    }

    #[test]
    fn test_block_comment_then_line_continues_trailing_skip() {
        // `/*x*/` on the code line is passed over, then `// t` ends the
        // pass; the next-line comment is the only one kept.
        let text = "a; /*x*/ // t\n// keep\nb;";
        assert_eq!(
            scan(text, 2..22, true, true),
            vec![(14, 21, CommentKind::Line, false)]
        );
    }

    #[test]
    fn test_comment_sharing_line_with_next_child_is_dropped() {
        // `/*b*/` is flush against `let b;` on the same line.
        let text = "let a;\n/*b*/let b;";
        assert_eq!(scan(text, 6..12, true, true), vec![]);
    }

    #[test]
    fn test_comment_flush_against_closing_brace_is_kept() {
        let text = "{\nx;\n/*c*/ }";
        assert_eq!(
            scan(text, 4..11, false, true),
            vec![(5, 10, CommentKind::Block, false)]
        );
    }

    #[test]
    fn test_comment_on_previous_code_line_before_brace_is_used_up() {
        // Same shape but the comment shares the statement's line: the
        // trailing-skip pass consumes it.
        let text = "{\nx; /*c*/ }";
        assert_eq!(scan(text, 4..11, false, true), vec![]);
    }

    #[test]
    fn test_comment_at_eof_is_kept() {
        let text = "let a;\n//b";
        assert_eq!(
            scan(text, 6..10, false, true),
            vec![(7, 10, CommentKind::Line, false)]
        );
    }

    #[test]
    fn test_doc_comment_left_for_following_child() {
        // `/** d */` immediately precedes `b;`: the child claims it.
        let text = "a;\n/** d */\nb;";
        assert_eq!(scan(text, 2..12, true, true), vec![]);
    }

    #[test]
    fn test_doc_comment_captured_when_nothing_follows() {
        let text = "a;\n/** d */";
        assert_eq!(
            scan(text, 2..11, false, true),
            vec![(3, 11, CommentKind::Block, true)]
        );
    }

    #[test]
    fn test_doc_comment_stops_later_comments_too() {
        let text = "a;\n// one\n/** d */\n// two\nb;";
        assert_eq!(
            scan(text, 2..26, true, true),
            vec![(3, 9, CommentKind::Line, false)]
        );
    }

    #[test]
    fn test_empty_block_comment_is_not_doc() {
        let text = "a;\n/**/\nb;";
        assert_eq!(
            scan(text, 2..8, true, true),
            vec![(3, 7, CommentKind::Block, false)]
        );
    }

    #[test]
    fn test_unterminated_block_yields_nothing_past_it() {
        let text = "a;\n// kept\n/* broken\nb;";
        assert_eq!(
            scan(text, 2..23, false, true),
            vec![(3, 10, CommentKind::Line, false)]
        );
    }

    #[test]
    fn test_commas_are_skipped_in_trailing_pass() {
        // Enum-style gap beginning at the previous member's end.
        let text = "A, // t\n// keep\nB";
        assert_eq!(
            scan(text, 1..16, true, true),
            vec![(8, 15, CommentKind::Line, false)]
        );
    }

    #[test]
    fn test_multiple_standalone_comments_all_kept() {
        let text = "a;\n// one\n\n/* two */\n// three\nb;";
        assert_eq!(
            scan(text, 2..30, true, true),
            vec![
                (3, 9, CommentKind::Line, false),
                (11, 20, CommentKind::Block, false),
                (21, 29, CommentKind::Line, false),
            ]
        );
    }

    #[test]
    fn test_same_line_follow_on_comment_folds_into_group() {
        // `/* b */` shares the kept comment's line: it is trivia for the
        // standalone probe and is consumed by the trailing re-run, so
        // only the group head and the next-line comment are emitted.
        let text = "a;\n/* a */ /* b */\n// next\nb;";
        assert_eq!(
            scan(text, 2..27, true, true),
            vec![
                (3, 10, CommentKind::Block, false),
                (19, 26, CommentKind::Line, false),
            ]
        );
    }

    #[test]
    fn test_multiline_follow_on_comment_keeps_head() {
        // The follow-on block spans a newline, so the next token is not
        // on the head comment's line.
        let text = "a;\n/* a */ /* b\n*/ b;";
        assert_eq!(
            scan(text, 2..19, true, true),
            vec![(3, 10, CommentKind::Block, false)]
        );
    }

    #[rstest]
    #[case("let a;let b;", 6..6)]
    #[case("a;\n\n  \nb;", 2..7)]
    fn test_gap_without_comments_yields_nothing(
        #[case] text: &str,
        #[case] gap: std::ops::Range<u32>,
    ) {
        assert_eq!(scan(text, gap, true, true), vec![]);
    }
}
