use epsilang_session::diagnostics::DiagnosticEmitter;
use epsilang_session::Session;

/// Run the full pipeline over the session's source and return the
/// assembly text. Every stage runs regardless of earlier errors and
/// reports into the session; the caller gates on the error count.
pub fn compile<D: DiagnosticEmitter>(session: &mut Session<D>) -> String {
    let (tokens, lexer_errors) =
        epsilang_frontend::lex(session.source.contents(), &mut session.interner);
    session.report_all(lexer_errors);

    let (module, parse_errors) = epsilang_frontend::parse(tokens);
    session.report_all(parse_errors);

    let (symbols, declare_errors) = epsilang_middle::declare(&module, &session.interner);
    session.report_all(declare_errors);

    let (asm, codegen_errors) = epsilang_backend::generate(&module, &symbols, &session.interner);
    session.report_all(codegen_errors);

    asm
}

pub fn dump_tokens<D: DiagnosticEmitter>(
    session: &mut Session<D>,
) -> serde_json::Result<String> {
    let (tokens, lexer_errors) =
        epsilang_frontend::lex(session.source.contents(), &mut session.interner);
    session.report_all(lexer_errors);

    let tokens: Vec<_> = tokens.collect();
    serde_json::to_string_pretty(&tokens)
}

pub fn dump_ast<D: DiagnosticEmitter>(session: &mut Session<D>) -> serde_json::Result<String> {
    let (tokens, lexer_errors) =
        epsilang_frontend::lex(session.source.contents(), &mut session.interner);
    session.report_all(lexer_errors);

    let (module, parse_errors) = epsilang_frontend::parse(tokens);
    session.report_all(parse_errors);

    serde_json::to_string_pretty(&module)
}
