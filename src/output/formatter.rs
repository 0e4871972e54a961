//! Core formatting trait and the plain text implementation

use crate::{
    error::{AppError, ErrorKind, Result},
    models::{AnalysisContext, FailureDiagnostics, NormalizedMetrics, TestResult},
};
use std::fmt::Write as _;

/// Main trait for output formatting
pub trait OutputFormatter {
    /// Format a header section
    fn format_header(&self, title: &str) -> Result<String>;

    /// Format the three normalized metrics
    fn format_metrics(&self, metrics: &NormalizedMetrics) -> Result<String>;

    /// Format the context the report was written for
    fn format_context(&self, context: &AnalysisContext) -> Result<String>;

    /// Format the analysis text (an HTML fragment)
    fn format_analysis(&self, analysis: &str) -> Result<String>;

    /// Format a classified failure
    fn format_failure(
        &self,
        kind: ErrorKind,
        message: &str,
        diagnostics: Option<&FailureDiagnostics>,
    ) -> Result<String>;

    fn format_error(&self, error: &str) -> Result<String>;

    fn format_warning(&self, warning: &str) -> Result<String>;

    /// Format a complete result
    fn format_result(&self, result: &TestResult) -> Result<String> {
        let mut output = String::new();
        output.push_str(&self.format_header("Network Speed Report")?);
        output.push_str("\n\n");

        match result {
            TestResult::Success {
                metrics,
                context,
                analysis,
            } => {
                output.push_str(&self.format_metrics(metrics)?);
                output.push('\n');
                output.push_str(&self.format_context(context)?);
                output.push_str("\n\n");
                output.push_str(&self.format_analysis(analysis)?);
            }
            TestResult::Failure {
                kind,
                message,
                diagnostics,
            } => {
                output.push_str(&self.format_failure(*kind, message, diagnostics.as_ref())?);
            }
        }

        Ok(output)
    }
}

/// Configuration options for formatting
#[derive(Debug, Clone)]
pub struct FormattingOptions {
    pub enable_color: bool,
    /// Include captured diagnostics on failure
    pub verbose_mode: bool,
    /// Width used for wrapping the analysis text
    pub max_width: usize,
}

impl Default for FormattingOptions {
    fn default() -> Self {
        Self {
            enable_color: true,
            verbose_mode: false,
            max_width: 100,
        }
    }
}

/// Plain text formatter
pub struct PlainFormatter {
    options: FormattingOptions,
}

impl PlainFormatter {
    pub fn new(options: FormattingOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &FormattingOptions {
        &self.options
    }
}

impl OutputFormatter for PlainFormatter {
    fn format_header(&self, title: &str) -> Result<String> {
        let mut output = String::new();
        let border = "=".repeat(title.len() + 4);

        writeln!(output, "{}", border).map_err(fmt_error)?;
        writeln!(output, "  {}  ", title).map_err(fmt_error)?;
        write!(output, "{}", border).map_err(fmt_error)?;

        Ok(output)
    }

    fn format_metrics(&self, metrics: &NormalizedMetrics) -> Result<String> {
        let mut output = String::new();
        writeln!(output, "  {:<10} {}", "Download:", metrics.download).map_err(fmt_error)?;
        writeln!(output, "  {:<10} {}", "Upload:", metrics.upload).map_err(fmt_error)?;
        write!(output, "  {:<10} {}", "Ping:", metrics.ping).map_err(fmt_error)?;
        Ok(output)
    }

    fn format_context(&self, context: &AnalysisContext) -> Result<String> {
        Ok(format!("  {:<10} {}", "Context:", context))
    }

    fn format_analysis(&self, analysis: &str) -> Result<String> {
        let mut output = String::from("Analysis:\n");
        let text = html_to_text(analysis);
        output.push_str(&wrap_text(&text, self.options.max_width, "  "));
        Ok(output)
    }

    fn format_failure(
        &self,
        kind: ErrorKind,
        message: &str,
        diagnostics: Option<&FailureDiagnostics>,
    ) -> Result<String> {
        let mut output = self.format_error(&format!("{}: {}", kind, message))?;

        if self.options.verbose_mode {
            if let Some(diagnostics) = diagnostics {
                output.push('\n');
                output.push_str(&format_diagnostics(diagnostics)?);
            }
        }

        Ok(output)
    }

    fn format_error(&self, error: &str) -> Result<String> {
        Ok(format!("ERROR: {}", error))
    }

    fn format_warning(&self, warning: &str) -> Result<String> {
        Ok(format!("WARNING: {}", warning))
    }
}

fn fmt_error(e: std::fmt::Error) -> AppError {
    AppError::io(format!("Failed to format output: {}", e))
}

/// Render captured process output for a failure report
pub fn format_diagnostics(diagnostics: &FailureDiagnostics) -> Result<String> {
    let mut output = String::from("Diagnostics:");

    if let Some(code) = diagnostics.exit_code {
        write!(output, "\n  exit code: {}", code).map_err(fmt_error)?;
    }
    if let Some(ref line) = diagnostics.raw_line {
        write!(output, "\n  structured line: {}", line).map_err(fmt_error)?;
    }
    if let Some(ref stdout) = diagnostics.stdout {
        write!(output, "\n  stdout:\n{}", indent(stdout, "    ")).map_err(fmt_error)?;
    }
    if let Some(ref stderr) = diagnostics.stderr {
        write!(output, "\n  stderr:\n{}", indent(stderr, "    ")).map_err(fmt_error)?;
    }

    Ok(output)
}

fn indent(text: &str, prefix: &str) -> String {
    text.lines()
        .map(|line| format!("{}{}", prefix, line))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Turn the report's HTML fragment into terminal text
///
/// `<br>` becomes a line break, paragraph and list boundaries become blank
/// lines, all other tags are dropped and the common entities are decoded.
pub fn html_to_text(html: &str) -> String {
    let mut text = String::with_capacity(html.len());
    let mut rest = html;

    while let Some(start) = rest.find('<') {
        text.push_str(&rest[..start]);
        let Some(end) = rest[start..].find('>') else {
            text.push_str(&rest[start..]);
            rest = "";
            break;
        };

        let tag = rest[start + 1..start + end]
            .trim()
            .trim_end_matches('/')
            .trim()
            .to_ascii_lowercase();
        let name = tag.split_whitespace().next().unwrap_or("");

        match name {
            "br" => text.push('\n'),
            "/p" | "/ul" | "/ol" | "/h1" | "/h2" | "/h3" | "/div" => text.push_str("\n\n"),
            "li" => text.push_str("\n- "),
            _ => {}
        }

        rest = &rest[start + end + 1..];
    }
    text.push_str(rest);

    let decoded = text
        .replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&");

    // Collapse runs of blank lines left by adjacent block tags
    let mut lines: Vec<&str> = Vec::new();
    for line in decoded.lines().map(str::trim) {
        if line.is_empty() && lines.last().map_or(true, |last| last.is_empty()) {
            continue;
        }
        lines.push(line);
    }
    while lines.last().is_some_and(|last| last.is_empty()) {
        lines.pop();
    }

    lines.join("\n")
}

/// Word-wrap each line of `text` to `width`, prefixing every output line
pub fn wrap_text(text: &str, width: usize, prefix: &str) -> String {
    let usable = width.saturating_sub(prefix.len()).max(20);
    let mut output = Vec::new();

    for line in text.lines() {
        if line.is_empty() {
            output.push(String::new());
            continue;
        }

        let mut current = String::new();
        for word in line.split_whitespace() {
            if !current.is_empty() && current.len() + 1 + word.len() > usable {
                output.push(format!("{}{}", prefix, current));
                current.clear();
            }
            if !current.is_empty() {
                current.push(' ');
            }
            current.push_str(word);
        }
        if !current.is_empty() {
            output.push(format!("{}{}", prefix, current));
        }
    }

    output.join("\n")
}
