//! Terminal output.
//!
//! Status lines go to stderr, styled when the terminal supports it; command
//! results (JSON) go to stdout unstyled so they can be piped.

use console::{Style, Term};

pub(crate) struct Output {
    status: Term,
    results: Term,
}

impl Output {
    pub(crate) fn new() -> Self {
        Self {
            status: Term::stderr(),
            results: Term::stdout(),
        }
    }

    fn status_line(&self, style: &Style, msg: &str) {
        // Nothing useful to do when stderr is gone.
        let _ = self.status.write_line(&style.apply_to(msg).to_string());
    }

    pub(crate) fn info(&self, msg: &str) {
        self.status_line(&Style::new(), msg);
    }

    pub(crate) fn success(&self, msg: &str) {
        self.status_line(&Style::new().green(), msg);
    }

    pub(crate) fn warning(&self, msg: &str) {
        self.status_line(&Style::new().yellow(), msg);
    }

    pub(crate) fn error(&self, msg: &str) {
        self.status_line(&Style::new().red().bold(), msg);
    }

    /// Write a command result to stdout.
    pub(crate) fn data(&self, content: &str) -> std::io::Result<()> {
        self.results.write_line(content)
    }
}
