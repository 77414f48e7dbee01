use crate::sourcemap::Source;
use crate::span::Span;

pub mod prelude {
    pub use super::{Diagnostic, DiagnosticEmitter, IntoDiagnostic, Severity};
    pub use crate::span::Span;
}

/// Message severities, lowest to highest. Only [`Severity::Error`]
/// bumps the session's error counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, serde::Serialize)]
pub enum Severity {
    Debug,
    Info,
    Warning,
    Error,
}

/// A preformatted message with a severity and an optional source span.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub message: String,
    pub span: Option<Span>,
}

impl Diagnostic {
    pub fn new(severity: Severity) -> Self {
        Self {
            severity,
            message: String::new(),
            span: None,
        }
    }

    pub fn debug() -> Self {
        Self::new(Severity::Debug)
    }

    pub fn info() -> Self {
        Self::new(Severity::Info)
    }

    pub fn warning() -> Self {
        Self::new(Severity::Warning)
    }

    pub fn error() -> Self {
        Self::new(Severity::Error)
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    pub fn with_span(mut self, span: Span) -> Self {
        self.span = Some(span);
        self
    }
}

pub trait DiagnosticEmitter {
    fn emit_diagnostic(&mut self, diagnostic: Diagnostic, source: &Source);
}

impl DiagnosticEmitter for Vec<Diagnostic> {
    fn emit_diagnostic(&mut self, diagnostic: Diagnostic, _source: &Source) {
        self.push(diagnostic);
    }
}

/// Routes diagnostics through `tracing`, whose subscriber prefixes each
/// line with a timestamp and the severity.
#[derive(Debug, Default)]
pub struct LogDiagnosticEmitter;

impl DiagnosticEmitter for LogDiagnosticEmitter {
    fn emit_diagnostic(&mut self, diagnostic: Diagnostic, source: &Source) {
        let rendered = match diagnostic.span {
            Some(span) => {
                let (line, col) = source.line_col(span.start);
                format!("{}:{line}:{col}: {}", source.name(), diagnostic.message)
            }
            None => diagnostic.message,
        };

        match diagnostic.severity {
            Severity::Debug => tracing::debug!("{rendered}"),
            Severity::Info => tracing::info!("{rendered}"),
            Severity::Warning => tracing::warn!("{rendered}"),
            Severity::Error => tracing::error!("{rendered}"),
        }
    }
}

pub trait IntoDiagnostic {
    fn into_diagnostic(self) -> Diagnostic;
}

impl IntoDiagnostic for Diagnostic {
    fn into_diagnostic(self) -> Diagnostic {
        self
    }
}
