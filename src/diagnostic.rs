use owo_colors::{OwoColorize, Style};
use std::fmt;

/// Byte range into the source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Span used for nodes that did not come from source text (e.g. a JSON AST).
    pub fn dummy() -> Self {
        Self { start: 0, end: 0 }
    }

    pub fn merge(self, other: Span) -> Span {
        Span {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }

    pub fn is_dummy(&self) -> bool {
        self.start == 0 && self.end == 0
    }
}

impl From<chumsky::span::SimpleSpan> for Span {
    fn from(span: chumsky::span::SimpleSpan) -> Self {
        Span::new(span.start, span.end)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Label {
    pub span: Span,
    pub message: String,
}

impl Label {
    pub fn primary(span: Span, message: impl Into<String>) -> Self {
        Self {
            span,
            message: message.into(),
        }
    }
}

/// A reportable problem: header, optional code, source labels and trailing notes.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub severity: Severity,
    pub code: Option<String>,
    pub message: String,
    pub labels: Vec<Label>,
    pub notes: Vec<String>,
}

impl Diagnostic {
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            code: None,
            message: message.into(),
            labels: Vec::new(),
            notes: Vec::new(),
        }
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    /// Labels with a dummy span are dropped so AST-only errors render without a snippet.
    pub fn with_label(mut self, label: Label) -> Self {
        if !label.span.is_dummy() {
            self.labels.push(label);
        }
        self
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.notes.push(format!("help: {}", help.into()));
        self
    }
}

/// 1-based line and column of a byte offset.
pub fn line_col(source: &str, offset: usize) -> (usize, usize) {
    let mut line = 1;
    let mut col = 1;
    for (index, ch) in source.char_indices() {
        if index >= offset {
            break;
        }
        if ch == '\n' {
            line += 1;
            col = 1;
        } else {
            col += 1;
        }
    }
    (line, col)
}

fn line_text(source: &str, line: usize) -> Option<&str> {
    source.lines().nth(line.saturating_sub(1))
}

pub struct DiagnosticRenderer<'a> {
    source: &'a str,
    origin: &'a str,
    use_color: bool,
}

impl<'a> DiagnosticRenderer<'a> {
    pub fn new(source: &'a str, origin: &'a str, use_color: bool) -> Self {
        Self {
            source,
            origin,
            use_color,
        }
    }

    pub fn render(&self, diagnostic: &Diagnostic) -> String {
        let mut out = String::new();

        let severity = match diagnostic.severity {
            Severity::Error => self.paint("error", Style::new().red().bold()),
        };
        let message = self.paint(&diagnostic.message, Style::new().bold());
        match &diagnostic.code {
            Some(code) => out.push_str(&format!("{}[{}]: {}\n", severity, code, message)),
            None => out.push_str(&format!("{}: {}\n", severity, message)),
        }

        if let Some(first) = diagnostic.labels.first() {
            let (line, col) = line_col(self.source, first.span.start);
            let gutter_width = diagnostic
                .labels
                .iter()
                .map(|label| line_col(self.source, label.span.start).0.to_string().len())
                .max()
                .unwrap_or(1);
            let pad = " ".repeat(gutter_width);
            let bar = self.paint("|", Style::new().blue());

            out.push_str(&format!(
                "{}{} {}:{}:{}\n",
                pad,
                self.paint("-->", Style::new().blue()),
                self.origin,
                line,
                col
            ));
            out.push_str(&format!("{} {}\n", pad, bar));
            for label in &diagnostic.labels {
                self.render_label(&mut out, label, gutter_width);
            }
            out.push_str(&format!("{} {}\n", pad, bar));
        }

        for note in &diagnostic.notes {
            out.push_str(&format!("  {} {}\n", self.paint("=", Style::new().blue()), note));
        }

        out
    }

    fn render_label(&self, out: &mut String, label: &Label, gutter_width: usize) {
        let (line, col) = line_col(self.source, label.span.start);
        let Some(text) = line_text(self.source, line) else {
            return;
        };
        let bar = self.paint("|", Style::new().blue());
        let number = self.paint(&format!("{:>width$}", line, width = gutter_width), Style::new().blue());
        out.push_str(&format!("{} {} {}\n", number, bar, text));

        // Multi-line spans are underlined up to the end of their first line.
        let line_remaining = text.chars().count().saturating_sub(col - 1).max(1);
        let span_len = self.source[label.span.start.min(self.source.len())..label.span.end.min(self.source.len())]
            .chars()
            .take_while(|ch| *ch != '\n')
            .count()
            .clamp(1, line_remaining);
        let carets = self.paint(&"^".repeat(span_len), Style::new().red().bold());
        let mut marker = format!("{}{}", " ".repeat(col - 1), carets);
        if !label.message.is_empty() {
            marker.push(' ');
            marker.push_str(&self.paint(&label.message, Style::new().red()));
        }
        out.push_str(&format!("{} {} {}\n", " ".repeat(gutter_width), bar, marker));
    }

    fn paint(&self, text: &str, style: Style) -> String {
        if self.use_color {
            text.style(style).to_string()
        } else {
            text.to_string()
        }
    }
}

pub fn render_diagnostics(source: &str, origin: &str, diagnostics: &[Diagnostic], use_color: bool) -> String {
    let renderer = DiagnosticRenderer::new(source, origin, use_color);
    let mut out = String::new();
    for diagnostic in diagnostics {
        out.push_str(&renderer.render(diagnostic));
        out.push('\n');
    }

    let errors = diagnostics
        .iter()
        .filter(|d| d.severity == Severity::Error)
        .count();
    if errors > 0 {
        out.push_str(&format!(
            "error: aborting due to {} error{}\n",
            errors,
            if errors == 1 { "" } else { "s" }
        ));
    }
    out
}
