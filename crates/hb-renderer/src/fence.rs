//! Fenced code block tracking for line-based scanners.
//!
//! The TOC extractor and the component tag isolator both walk raw markdown
//! line by line and must ignore anything inside ```` ``` ```` or `~~~` fences.

/// Open fence: marker character and run length.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct OpenFence {
    marker: char,
    len: usize,
}

/// Tracks whether a line-by-line scan is inside a fenced code block.
#[derive(Debug, Default)]
pub(crate) struct FenceTracker {
    open: Option<OpenFence>,
}

impl FenceTracker {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Feed the next line. Returns `true` when the line belongs to a code
    /// block, fence markers included.
    pub(crate) fn is_code_line(&mut self, line: &str) -> bool {
        let Some(trimmed) = strip_indent(line) else {
            return self.open.is_some();
        };

        match self.open {
            Some(open) => {
                if closes(trimmed, open) {
                    self.open = None;
                }
                true
            }
            None => match opening(trimmed) {
                Some(open) => {
                    self.open = Some(open);
                    true
                }
                None => false,
            },
        }
    }
}

/// Strip up to three spaces of indentation; four or more is not a fence.
fn strip_indent(line: &str) -> Option<&str> {
    let indent = line.len() - line.trim_start_matches(' ').len();
    (indent <= 3).then(|| &line[indent..])
}

fn run_length(s: &str, marker: char) -> usize {
    s.chars().take_while(|&c| c == marker).count()
}

fn opening(trimmed: &str) -> Option<OpenFence> {
    let marker = trimmed.chars().next().filter(|c| matches!(c, '`' | '~'))?;
    let len = run_length(trimmed, marker);
    if len < 3 {
        return None;
    }
    // Backtick fences cannot carry backticks in their info string.
    if marker == '`' && trimmed[len..].contains('`') {
        return None;
    }
    Some(OpenFence { marker, len })
}

fn closes(trimmed: &str, open: OpenFence) -> bool {
    let len = run_length(trimmed, open.marker);
    len >= open.len && trimmed[len..].trim().is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn code_flags(input: &str) -> Vec<bool> {
        let mut tracker = FenceTracker::new();
        input.lines().map(|l| tracker.is_code_line(l)).collect()
    }

    #[test]
    fn test_plain_lines_are_not_code() {
        assert_eq!(code_flags("# Title\ntext\n## Sub"), vec![false, false, false]);
    }

    #[test]
    fn test_backtick_fence_marks_inner_lines() {
        assert_eq!(
            code_flags("before\n```rust\n## not a heading\n```\nafter"),
            vec![false, true, true, true, false]
        );
    }

    #[test]
    fn test_tilde_fence_needs_matching_marker() {
        assert_eq!(
            code_flags("~~~\n```\n~~~\nx"),
            vec![true, true, true, false]
        );
    }

    #[test]
    fn test_shorter_closing_run_does_not_close() {
        assert_eq!(
            code_flags("````\n```\n````\nx"),
            vec![true, true, true, false]
        );
    }

    #[test]
    fn test_closing_fence_with_text_does_not_close() {
        assert_eq!(code_flags("```\n``` rust\nx"), vec![true, true, true]);
    }

    #[test]
    fn test_indented_four_spaces_is_not_a_fence() {
        assert_eq!(code_flags("    ```\n## x"), vec![false, false]);
    }

    #[test]
    fn test_inline_backticks_are_not_a_fence() {
        assert_eq!(code_flags("``code``\n```a`b"), vec![false, false]);
    }
}
