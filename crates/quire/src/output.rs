//! Terminal output: results on stdout, styled messages on stderr.

use console::{Style, Term};
use serde::Serialize;

/// Terminal output formatter.
pub(crate) struct Output {
    out: Term,
    term: Term,
    red: Style,
}

impl Output {
    /// Create a new output formatter.
    #[must_use]
    pub(crate) fn new() -> Self {
        Self {
            out: Term::stdout(),
            term: Term::stderr(),
            red: Style::new().red(),
        }
    }

    /// Write a result line to stdout.
    pub(crate) fn line(&self, line: &str) -> std::io::Result<()> {
        self.out.write_line(line)
    }

    /// Write a value to stdout as pretty-printed JSON.
    pub(crate) fn json<T: Serialize>(&self, value: &T) -> Result<(), crate::error::CliError> {
        let json = serde_json::to_string_pretty(value)?;
        self.out.write_line(&json)?;
        Ok(())
    }

    /// Print an error message (red).
    pub(crate) fn error(&self, msg: &str) {
        let _ = self.term.write_line(&self.red.apply_to(msg).to_string());
    }
}
