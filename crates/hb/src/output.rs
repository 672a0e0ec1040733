//! Styled status lines on stderr.

use console::{Style, Term};

/// Writes build status to stderr, colored when the terminal supports it.
pub(crate) struct Output {
    term: Term,
}

impl Output {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self {
            term: Term::stderr(),
        }
    }

    fn line(&self, style: &Style, msg: &str) {
        // Nothing sensible to do if stderr is gone.
        let _ = self.term.write_line(&style.apply_to(msg).to_string());
    }

    /// Plain progress detail.
    pub(crate) fn info(&self, msg: &str) {
        self.line(&Style::new().dim(), msg);
    }

    pub(crate) fn success(&self, msg: &str) {
        self.line(&Style::new().green().bold(), msg);
    }

    pub(crate) fn warning(&self, msg: &str) {
        self.line(&Style::new().yellow(), msg);
    }

    pub(crate) fn error(&self, msg: &str) {
        self.line(&Style::new().red().bold(), msg);
    }
}
