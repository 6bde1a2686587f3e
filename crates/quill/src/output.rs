//! Terminal reporting for site builds.

use std::fmt::Display;
use std::path::Path;

use console::{Style, Term};

/// Writes build progress and results to stderr.
pub(crate) struct Output {
    term: Term,
    dim: Style,
    green: Style,
    yellow: Style,
    red: Style,
}

impl Output {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self {
            term: Term::stderr(),
            dim: Style::new().dim(),
            green: Style::new().green(),
            yellow: Style::new().yellow(),
            red: Style::new().red(),
        }
    }

    fn line(&self, style: &Style, msg: &str) {
        let _ = self.term.write_line(&style.apply_to(msg).to_string());
    }

    /// Announce the site root and output directory of a build.
    pub(crate) fn site(&self, root: &Path, output_dir: &Path) {
        self.line(&self.dim, &format!("Site:   {}", root.display()));
        self.line(&self.dim, &format!("Output: {}", output_dir.display()));
    }

    /// Report a document that could not be rendered or written.
    pub(crate) fn failed(&self, source: &Path, error: &impl Display) {
        self.line(&self.yellow, &format!("  skipped {}: {error}", source.display()));
    }

    /// Final line of a build: green when every document was written.
    pub(crate) fn summary(&self, written: usize, total: usize, output_dir: &Path) {
        let msg = format!(
            "Built {written} of {total} documents to {}",
            output_dir.display()
        );
        let style = if written == total { &self.green } else { &self.yellow };
        self.line(style, &msg);
    }

    /// Confirm a single rendered file.
    pub(crate) fn wrote(&self, path: &Path) {
        self.line(&self.green, &format!("Wrote {}", path.display()));
    }

    /// Print a fatal error.
    pub(crate) fn error(&self, msg: &str) {
        self.line(&self.red, msg);
    }
}
