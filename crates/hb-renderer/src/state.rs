//! Builder state for constructs that span several markdown events.

use pulldown_cmark::Alignment;

/// Collects the text of a fenced or indented code block.
#[derive(Default)]
pub(crate) struct CodeBlockState {
    active: bool,
    /// First word of the fence info string (e.g. `rust:src/main.rs`).
    language: Option<String>,
    buffer: String,
}

impl CodeBlockState {
    pub(crate) fn start(&mut self, language: Option<String>) {
        self.active = true;
        self.language = language;
        self.buffer.clear();
    }

    /// End the block and return `(language, source)`.
    pub(crate) fn end(&mut self) -> (Option<String>, String) {
        self.active = false;
        (self.language.take(), std::mem::take(&mut self.buffer))
    }

    pub(crate) fn is_active(&self) -> bool {
        self.active
    }

    pub(crate) fn push_str(&mut self, text: &str) {
        self.buffer.push_str(text);
    }
}

/// Tracks header/body position and column alignment inside a table.
#[derive(Default)]
pub(crate) struct TableState {
    in_head: bool,
    alignments: Vec<Alignment>,
    cell_index: usize,
}

impl TableState {
    pub(crate) fn start(&mut self, alignments: Vec<Alignment>) {
        self.alignments = alignments;
        self.in_head = false;
        self.cell_index = 0;
    }

    pub(crate) fn start_head(&mut self) {
        self.in_head = true;
        self.cell_index = 0;
    }

    pub(crate) fn end_head(&mut self) {
        self.in_head = false;
    }

    pub(crate) fn start_row(&mut self) {
        self.cell_index = 0;
    }

    pub(crate) fn next_cell(&mut self) {
        self.cell_index += 1;
    }

    /// `th` in the header row, `td` elsewhere.
    pub(crate) fn cell_tag(&self) -> &'static str {
        if self.in_head { "th" } else { "td" }
    }

    /// Inline style for the current cell, if the column is aligned.
    pub(crate) fn current_alignment_style(&self) -> Option<&'static str> {
        match self.alignments.get(self.cell_index) {
            Some(Alignment::Left) => Some("text-align:left"),
            Some(Alignment::Center) => Some("text-align:center"),
            Some(Alignment::Right) => Some("text-align:right"),
            Some(Alignment::None) | None => None,
        }
    }
}

/// Captures image alt text, which arrives as nested inline events.
#[derive(Default)]
pub(crate) struct ImageState {
    /// `(src, title)` of the image being captured.
    pending: Option<(String, String)>,
    alt_text: String,
}

impl ImageState {
    pub(crate) fn start(&mut self, src: String, title: String) {
        self.pending = Some((src, title));
        self.alt_text.clear();
    }

    /// Finish capture and return `(src, title, alt)`.
    pub(crate) fn end(&mut self) -> Option<(String, String, String)> {
        let (src, title) = self.pending.take()?;
        Some((src, title, std::mem::take(&mut self.alt_text)))
    }

    pub(crate) fn is_active(&self) -> bool {
        self.pending.is_some()
    }

    pub(crate) fn push_str(&mut self, text: &str) {
        self.alt_text.push_str(text);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_block_state() {
        let mut code = CodeBlockState::default();
        code.start(Some("rust".to_owned()));
        code.push_str("fn main() {}\n");

        assert!(code.is_active());
        assert_eq!(code.end(), (Some("rust".to_owned()), "fn main() {}\n".to_owned()));
        assert!(!code.is_active());
    }

    #[test]
    fn test_table_state_alignment() {
        let mut table = TableState::default();
        table.start(vec![Alignment::None, Alignment::Right]);
        table.start_head();

        assert_eq!(table.cell_tag(), "th");
        assert_eq!(table.current_alignment_style(), None);
        table.next_cell();
        assert_eq!(table.current_alignment_style(), Some("text-align:right"));

        table.end_head();
        table.start_row();
        assert_eq!(table.cell_tag(), "td");
        assert_eq!(table.current_alignment_style(), None);
    }

    #[test]
    fn test_image_state() {
        let mut image = ImageState::default();
        image.start("/a.png".to_owned(), String::new());
        image.push_str("An ");
        image.push_str("image");

        assert!(image.is_active());
        assert_eq!(
            image.end(),
            Some(("/a.png".to_owned(), String::new(), "An image".to_owned()))
        );
        assert!(!image.is_active());
    }
}
