//! Locating the structured result line in noisy tool output

use crate::error::{AppError, Result};

/// Finds the single machine-readable line among progress and diagnostic text
pub struct OutputExtractor;

impl OutputExtractor {
    /// Return the last line of `stdout` whose trimmed text starts with `{`
    ///
    /// `stderr` is only carried into the error for diagnostics.
    pub fn extract(stdout: &str, stderr: &str) -> Result<String> {
        Self::find_structured_line(stdout)
            .map(str::to_string)
            .ok_or_else(|| AppError::extraction(stdout, stderr))
    }

    /// Scan from the end so trailing diagnostics and blank lines are skipped
    ///
    /// Lines break on every Unicode line boundary, not only `\n`, so a
    /// progress line ending in a form feed or `\r` still separates from the
    /// record after it.
    pub fn find_structured_line(stdout: &str) -> Option<&str> {
        stdout
            .split(is_line_boundary)
            .rev()
            .map(|line| line.trim_matches(is_blank))
            .find(|line| line.starts_with('{'))
    }
}

fn is_line_boundary(c: char) -> bool {
    matches!(
        c,
        '\n' | '\r' | '\x0b' | '\x0c' | '\x1c' | '\x1d' | '\x1e' | '\u{85}' | '\u{2028}' | '\u{2029}'
    )
}

// Unicode whitespace plus the ASCII information separators
fn is_blank(c: char) -> bool {
    c.is_whitespace() || ('\x1c'..='\x1f').contains(&c)
}
