pub mod diagnostics;
pub mod sourcemap;
pub mod span;

use diagnostics::{DiagnosticEmitter, IntoDiagnostic, Severity};
pub use lasso;
use sourcemap::Source;

pub type InternedStr = lasso::Spur;
pub type Interner = lasso::Rodeo;

#[derive(thiserror::Error, Debug)]
#[error("had errors")]
pub struct HadErrors;

/// State shared by every stage of one compilation: the source text, the
/// identifier interner, the diagnostics sink and its error counter.
pub struct Session<D: DiagnosticEmitter> {
    pub source: Source,
    pub interner: Interner,

    pub diagnostics: D,
    error_count: usize,
}

impl<D: DiagnosticEmitter> Session<D> {
    pub fn new(source: Source, diagnostics: D) -> Self {
        Self {
            source,
            interner: Interner::new(),

            diagnostics,
            error_count: 0,
        }
    }

    /// Emit one diagnostic, counting it if it is an error. Stages keep
    /// running after errors; the counter is the failure signal.
    pub fn report(&mut self, diagnostic: impl IntoDiagnostic) {
        let diagnostic = diagnostic.into_diagnostic();

        if diagnostic.severity >= Severity::Error {
            self.error_count += 1;
        }

        self.diagnostics.emit_diagnostic(diagnostic, &self.source);
    }

    pub fn report_all<I>(&mut self, diagnostics: I)
    where
        I: IntoIterator,
        I::Item: IntoDiagnostic,
    {
        for diagnostic in diagnostics {
            self.report(diagnostic);
        }
    }

    pub fn error_count(&self) -> usize {
        self.error_count
    }

    pub fn reset_error_count(&mut self) {
        self.error_count = 0;
    }

    pub fn had_errors(&self) -> bool {
        self.error_count > 0
    }

    /// The emitted assembly is only safe to hand to the assembler when
    /// no error has been reported.
    pub fn finish(&self) -> Result<(), HadErrors> {
        if self.had_errors() {
            Err(HadErrors)
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::diagnostics::Diagnostic;
    use crate::sourcemap::Source;
    use crate::Session;

    fn session() -> Session<Vec<Diagnostic>> {
        Session::new(Source::new("test.eps", ""), vec![])
    }

    #[test]
    fn only_errors_are_counted() {
        let mut session = session();

        session.report(Diagnostic::info().with_message("reading file"));
        session.report(Diagnostic::warning().with_message("shadowed"));
        assert_eq!(session.error_count(), 0);
        assert!(session.finish().is_ok());

        session.report(Diagnostic::error().with_message("undefined variable"));
        session.report(Diagnostic::error().with_message("bad arity"));
        assert_eq!(session.error_count(), 2);
        assert!(session.had_errors());
        assert!(session.finish().is_err());

        assert_eq!(session.diagnostics.len(), 4);
    }

    #[test]
    fn counter_resets() {
        let mut session = session();

        session.report(Diagnostic::error().with_message("oops"));
        session.reset_error_count();

        assert_eq!(session.error_count(), 0);
        assert!(!session.had_errors());
    }
}
