use epsilang_frontend::ast::*;
use epsilang_ir::symbols::{FuncSymbol, GlobalSymbol, LocalTable, Symbols};
use epsilang_ir::Ident;
use epsilang_session::diagnostics::prelude::*;
use epsilang_session::Interner;

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct DeclareError {
    pub kind: DeclareErrorKind,
    pub span: Span,
}

#[derive(serde::Serialize, thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum DeclareErrorKind {
    #[error("variable `{0}` is already declared; keeping its first slot")]
    DuplicateVariable(String),

    #[error("function `{0}` is already defined; keeping the first definition")]
    DuplicateFunction(String),

    #[error("function definitions are only allowed at the top level")]
    NestedFunction,
}

impl IntoDiagnostic for DeclareError {
    fn into_diagnostic(self) -> Diagnostic {
        // redeclaring a variable reuses its slot, which is harmless
        let severity = match self.kind {
            DeclareErrorKind::DuplicateVariable(_) => Severity::Warning,
            _ => Severity::Error,
        };

        Diagnostic::new(severity)
            .with_message(self.kind.to_string())
            .with_span(self.span)
    }
}

/// Walk the module once and populate the symbol tables: top-level
/// `let`s (and `let`s in blocks outside any function) become globals,
/// top-level `fn`s enter the function table, and `let`s anywhere in a
/// function body allocate that function's local slots in declaration
/// order. Running this again over the same tree produces an equal
/// `Symbols` value.
pub fn declare(module: &Module, interner: &Interner) -> (Symbols, Vec<DeclareError>) {
    let mut pass = DeclarePass {
        symbols: Symbols::new(),
        interner,
        errors: vec![],
    };

    for (index, stmt) in module.stmts.iter().enumerate() {
        match stmt {
            Stmt::Func(func) => pass.declare_func(func, index),
            other => pass.declare_global_stmt(other),
        }
    }

    (pass.symbols, pass.errors)
}

struct DeclarePass<'a> {
    symbols: Symbols,
    interner: &'a Interner,
    errors: Vec<DeclareError>,
}

impl DeclarePass<'_> {
    fn declare_func(&mut self, func: &FuncDecl, stmt_index: usize) {
        let name = self.interner.resolve(&func.ident.ident);

        let mut symbol = FuncSymbol {
            ident: func.ident.ident,
            label: format!("func_{name}"),
            stmt_index,

            params: func.params.iter().map(|p| p.ident).collect(),
            locals: LocalTable::new(),
        };

        self.declare_locals(&func.body, &mut symbol);

        if self.symbols.declare_func(symbol).is_err() {
            self.errors.push(DeclareError {
                kind: DeclareErrorKind::DuplicateFunction(name.to_owned()),
                span: func.ident.span,
            });
        }
    }

    fn declare_locals(&mut self, block: &Block, symbol: &mut FuncSymbol) {
        for stmt in &block.stmts {
            match stmt {
                Stmt::Let { ident, .. } => {
                    if symbol.param_index(ident.ident).is_some()
                        || symbol.locals.contains(ident.ident)
                    {
                        self.report_duplicate(ident);
                    } else {
                        symbol.locals.declare(ident.ident);
                    }
                }

                Stmt::If(if_stmt) => self.declare_locals_in_if(if_stmt, symbol),
                Stmt::While { body, .. } => self.declare_locals(body, symbol),

                Stmt::Func(nested) => self.errors.push(DeclareError {
                    kind: DeclareErrorKind::NestedFunction,
                    span: nested.ident.span,
                }),

                _ => {}
            }
        }
    }

    fn declare_locals_in_if(&mut self, if_stmt: &IfStmt, symbol: &mut FuncSymbol) {
        self.declare_locals(&if_stmt.then_block, symbol);

        match if_stmt.else_branch.as_deref() {
            Some(ElseBranch::If(nested)) => self.declare_locals_in_if(nested, symbol),
            Some(ElseBranch::Block(block)) => self.declare_locals(block, symbol),
            None => {}
        }
    }

    // `let`s outside any function, at any block depth, live in `.data`
    fn declare_global_stmt(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::Let { ident, .. } => self.declare_global(ident),

            Stmt::If(if_stmt) => self.declare_globals_in_if(if_stmt),
            Stmt::While { body, .. } => {
                for stmt in &body.stmts {
                    self.declare_global_stmt(stmt);
                }
            }

            Stmt::Func(nested) => self.errors.push(DeclareError {
                kind: DeclareErrorKind::NestedFunction,
                span: nested.ident.span,
            }),

            _ => {}
        }
    }

    fn declare_globals_in_if(&mut self, if_stmt: &IfStmt) {
        for stmt in &if_stmt.then_block.stmts {
            self.declare_global_stmt(stmt);
        }

        match if_stmt.else_branch.as_deref() {
            Some(ElseBranch::If(nested)) => self.declare_globals_in_if(nested),
            Some(ElseBranch::Block(block)) => {
                for stmt in &block.stmts {
                    self.declare_global_stmt(stmt);
                }
            }
            None => {}
        }
    }

    fn declare_global(&mut self, ident: &Ident) {
        let name = self.interner.resolve(&ident.ident);

        let symbol = GlobalSymbol {
            ident: ident.ident,
            label: format!("var_{name}"),
        };

        if !self.symbols.declare_global(symbol) {
            self.report_duplicate(ident);
        }
    }

    fn report_duplicate(&mut self, ident: &Ident) {
        self.errors.push(DeclareError {
            kind: DeclareErrorKind::DuplicateVariable(
                self.interner.resolve(&ident.ident).to_owned(),
            ),
            span: ident.span,
        });
    }
}
