
use epsilang_frontend::ast::*;
use epsilang_ir::symbols::{FuncId, Symbols};
use epsilang_ir::{BinOp, CmpOp, Ident};
use epsilang_session::diagnostics::prelude::*;
use epsilang_session::Interner;

/// System V AMD64 integer argument registers, in passing order. Calls
/// and definitions are capped at this many parameters.
const ARG_REGISTERS: [&str; 6] = ["rdi", "rsi", "rdx", "rcx", "r8", "r9"];

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct CodegenError {
    pub kind: CodegenErrorKind,
    pub span: Span,
}

#[derive(serde::Serialize, thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CodegenErrorKind {
    #[error("undefined variable `{0}`")]
    UndefinedVariable(String),

    #[error("call to undefined function `{0}`")]
    UndefinedFunction(String),

    #[error("function `{name}` takes {expected} arguments but {found} were passed")]
    ArityMismatch {
        name: String,
        expected: usize,
        found: usize,
    },

    #[error("function `{0}` has {1} parameters; at most 6 are supported")]
    TooManyParameters(String, usize),

    #[error("call to `{0}` passes {1} arguments; at most 6 are supported")]
    TooManyArguments(String, usize),
}

impl IntoDiagnostic for CodegenError {
    fn into_diagnostic(self) -> Diagnostic {
        Diagnostic::error()
            .with_message(self.kind.to_string())
            .with_span(self.span)
    }
}

/// Emit a complete FASM ELF64 program for the module. Nodes that fail
/// a semantic check are reported and skipped; the text is still
/// produced, and the caller decides from the error count whether it is
/// safe to assemble.
pub fn generate(
    module: &Module,
    symbols: &Symbols,
    interner: &Interner,
) -> (String, Vec<CodegenError>) {
    let codegen = CodeGenerator {
        module,
        symbols,
        interner,

        output: String::new(),
        labels: LabelAlloc::default(),
        errors: vec![],

        current_func: None,
    };

    codegen.run()
}

struct CodeGenerator<'a> {
    module: &'a Module,
    symbols: &'a Symbols,
    interner: &'a Interner,

    output: String,
    labels: LabelAlloc,
    errors: Vec<CodegenError>,

    // frame context while emitting a function body
    current_func: Option<FuncId>,
}

/// Where a resolved identifier lives. Parameters and locals share the
/// frame; `offset` is the (positive) displacement below `rbp`.
enum Place<'a> {
    Frame { offset: usize },
    Global { label: &'a str },
}

impl Place<'_> {
    fn addr(&self) -> String {
        match self {
            Place::Frame { offset } => format!("[rbp-{offset}]"),
            Place::Global { label } => format!("[{label}]"),
        }
    }
}

impl<'a> CodeGenerator<'a> {
    fn run(mut self) -> (String, Vec<CodegenError>) {
        self.push_line(0, "format ELF64");
        self.push_line(0, "");

        self.gen_data_section();

        self.push_line(0, "section '.text' executable");
        self.push_line(0, "");

        for id in 0..self.symbols.funcs().len() {
            self.gen_func(FuncId(id));
        }

        self.gen_start();

        (self.output, self.errors)
    }

    fn gen_data_section(&mut self) {
        self.push_line(0, "section '.data' writeable");

        for global in self.symbols.globals() {
            self.push_line(1, format!("{} dq 0", global.label));
            self.push_line(1, format!("{0}_len = $ - {0}", global.label));
        }

        self.push_line(0, "");
    }

    fn gen_func(&mut self, id: FuncId) {
        let func = self.symbols.func(id);

        let Stmt::Func(decl) = &self.module.stmts[func.stmt_index] else {
            // the declaration pass only registers function statements
            return;
        };

        if func.params.len() > ARG_REGISTERS.len() {
            self.errors.push(CodegenError {
                kind: CodegenErrorKind::TooManyParameters(
                    self.interner.resolve(&func.ident).to_owned(),
                    func.params.len(),
                ),
                span: decl.ident.span,
            });
            return;
        }

        self.current_func = Some(id);

        self.push_line(0, format!("{}:", func.label));

        // prologue: one qword slot per parameter spill and per local
        self.push_line(1, "push rbp");
        self.push_line(1, "mov rbp, rsp");
        let slots = func.slot_count();
        if slots > 0 {
            self.push_line(1, format!("sub rsp, {}", 8 * slots));
        }

        for (i, reg) in ARG_REGISTERS.iter().take(func.params.len()).enumerate() {
            self.push_line(1, format!("mov [rbp-{}], {}", 8 * (i + 1), reg));
        }

        for stmt in &decl.body.stmts {
            self.gen_stmt(stmt);
        }

        // fall-off-the-end return
        self.gen_epilogue();
        self.push_line(0, "");

        self.current_func = None;
    }

    fn gen_start(&mut self) {
        self.push_line(0, "public _start");
        self.push_line(0, "_start:");

        for stmt in &self.module.stmts {
            if !matches!(stmt, Stmt::Func(_)) {
                self.gen_stmt(stmt);
            }
        }

        // `exit` leaves 60 in rax and the status in rdi
        self.push_line(1, "syscall");
    }

    fn gen_stmt(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::Exit(expr) => {
                self.gen_expr(expr);
                self.push_line(1, "mov rax, 60");
            }

            Stmt::Let { ident, expr } | Stmt::Assign { ident, expr } => {
                self.gen_expr(expr);
                if let Some(place) = self.resolve_var(ident) {
                    self.push_line(1, format!("mov {}, rdi", place.addr()));
                }
            }

            Stmt::If(if_stmt) => self.gen_if(if_stmt),

            Stmt::While { cond, body } => self.gen_while(cond, body),

            Stmt::Return(expr) => {
                self.gen_expr(expr);
                self.push_line(1, "mov rax, rdi");
                self.gen_epilogue();
            }

            // value evaluated into rdi and discarded
            Stmt::Expr(expr) => self.gen_expr(expr),

            // top-level functions are emitted separately; nested ones
            // were rejected by the declaration pass
            Stmt::Func(_) => {}

            // already reported by the parser
            Stmt::ParseError => {}
        }
    }

    fn gen_if(&mut self, if_stmt: &IfStmt) {
        let label_true = self.labels.fresh("if_true");
        let label_false = self.labels.fresh("if_false");
        let label_end = self.labels.fresh("if_end");

        self.gen_cond(&if_stmt.cond, &label_true, &label_false);

        self.push_label(&label_true);
        for stmt in &if_stmt.then_block.stmts {
            self.gen_stmt(stmt);
        }
        self.push_line(1, format!("jmp {label_end}"));

        self.push_label(&label_false);
        match if_stmt.else_branch.as_deref() {
            Some(ElseBranch::If(nested)) => self.gen_if(nested),
            Some(ElseBranch::Block(block)) => {
                for stmt in &block.stmts {
                    self.gen_stmt(stmt);
                }
            }
            None => {}
        }

        self.push_label(&label_end);
    }

    fn gen_while(&mut self, cond: &Cond, body: &Block) {
        let label_start = self.labels.fresh("while_start");
        let label_body = self.labels.fresh("while_body");
        let label_end = self.labels.fresh("while_end");

        self.push_label(&label_start);
        self.gen_cond(cond, &label_body, &label_end);

        self.push_label(&label_body);
        for stmt in &body.stmts {
            self.gen_stmt(stmt);
        }
        self.push_line(1, format!("jmp {label_start}"));

        self.push_label(&label_end);
    }

    /// Branch to `label_true` when the condition holds, `label_false`
    /// otherwise. A bare expression condition is tested against zero.
    fn gen_cond(&mut self, cond: &Cond, label_true: &str, label_false: &str) {
        match cond {
            Cond::Compare { op, lhs, rhs } => {
                self.gen_expr(lhs);
                self.push_line(1, "push rdi");
                self.gen_expr(rhs);
                self.push_line(1, "pop rax");

                // rax = left, rdi = right
                self.push_line(1, "cmp rax, rdi");
                self.push_line(1, format!("{} {label_true}", jump_mnemonic(*op)));
            }

            Cond::Expr(expr) => {
                self.gen_expr(expr);
                self.push_line(1, "cmp rdi, 0");
                self.push_line(1, format!("jne {label_true}"));
            }
        }

        self.push_line(1, format!("jmp {label_false}"));
    }

    /// Every expression leaves its value in `rdi`.
    fn gen_expr(&mut self, expr: &Expr) {
        match &expr.kind {
            ExprKind::Integer(n) => self.push_line(1, format!("mov rdi, {n}")),

            ExprKind::Var(ident) => {
                if let Some(place) = self.resolve_var(ident) {
                    self.push_line(1, format!("mov rdi, {}", place.addr()));
                }
            }

            ExprKind::BinOp { op, lhs, rhs } => {
                self.gen_expr(lhs);
                self.push_line(1, "push rdi");
                self.gen_expr(rhs);
                self.push_line(1, "pop rax");

                // rax = left, rdi = right
                match op {
                    BinOp::Add => self.push_line(1, "add rdi, rax"),
                    BinOp::Sub => {
                        self.push_line(1, "sub rax, rdi");
                        self.push_line(1, "mov rdi, rax");
                    }
                    BinOp::Mul => self.push_line(1, "imul rdi, rax"),
                    BinOp::Div => {
                        self.push_line(1, "cqo");
                        self.push_line(1, "idiv rdi");
                        self.push_line(1, "mov rdi, rax");
                    }
                }
            }

            ExprKind::Call { callee, args } => self.gen_call(callee, args),

            ExprKind::ParseError => {}
        }
    }

    fn gen_call(&mut self, callee: &Ident, args: &[Expr]) {
        let symbols = self.symbols;

        let Some((_, func)) = symbols.lookup_func(callee.ident) else {
            self.errors.push(CodegenError {
                kind: CodegenErrorKind::UndefinedFunction(
                    self.interner.resolve(&callee.ident).to_owned(),
                ),
                span: callee.span,
            });
            return;
        };

        if args.len() > ARG_REGISTERS.len() {
            self.errors.push(CodegenError {
                kind: CodegenErrorKind::TooManyArguments(
                    self.interner.resolve(&callee.ident).to_owned(),
                    args.len(),
                ),
                span: callee.span,
            });
            return;
        }

        if args.len() != func.params.len() {
            self.errors.push(CodegenError {
                kind: CodegenErrorKind::ArityMismatch {
                    name: self.interner.resolve(&callee.ident).to_owned(),
                    expected: func.params.len(),
                    found: args.len(),
                },
                span: callee.span,
            });
            return;
        }

        // save the caller's argument registers
        for reg in ARG_REGISTERS {
            self.push_line(1, format!("push {reg}"));
        }

        // evaluate arguments left to right, stash each on the stack,
        // then pop them into the registers in reverse
        for arg in args {
            self.gen_expr(arg);
            self.push_line(1, "push rdi");
        }
        for reg in ARG_REGISTERS.iter().take(args.len()).rev() {
            self.push_line(1, format!("pop {reg}"));
        }

        self.push_line(1, format!("call {}", func.label));

        // restore in complementary order, then move the return value
        // where expression evaluation expects it
        for reg in ARG_REGISTERS.iter().rev() {
            self.push_line(1, format!("pop {reg}"));
        }
        self.push_line(1, "mov rdi, rax");
    }

    /// Resolution order: current function's parameters, then its
    /// locals, then globals. Locals therefore shadow globals.
    fn resolve_var(&mut self, ident: &Ident) -> Option<Place<'a>> {
        let symbols = self.symbols;

        if let Some(id) = self.current_func {
            let func = symbols.func(id);

            if let Some(i) = func.param_index(ident.ident) {
                return Some(Place::Frame {
                    offset: 8 * (i + 1),
                });
            }

            if let Some(k) = func.locals.get(ident.ident) {
                return Some(Place::Frame {
                    offset: 8 * (func.params.len() + k + 1),
                });
            }
        }

        if let Some(global) = symbols.lookup_global(ident.ident) {
            return Some(Place::Global {
                label: &global.label,
            });
        }

        self.errors.push(CodegenError {
            kind: CodegenErrorKind::UndefinedVariable(
                self.interner.resolve(&ident.ident).to_owned(),
            ),
            span: ident.span,
        });
        None
    }

    fn gen_epilogue(&mut self) {
        self.push_line(1, "mov rsp, rbp");
        self.push_line(1, "pop rbp");
        self.push_line(1, "ret");
    }

    fn push_label(&mut self, label: &str) {
        self.push_line(0, format!("{label}:"));
    }

    fn push_line(&mut self, indent: u8, line: impl AsRef<str>) {
        const INDENT: &str = "    ";

        for _ in 0..indent {
            self.output.push_str(INDENT);
        }

        self.output.push_str(line.as_ref());
        self.output.push('\n');
    }
}

fn jump_mnemonic(op: CmpOp) -> &'static str {
    match op {
        CmpOp::Eq => "je",
        CmpOp::Ne => "jne",
        CmpOp::Ge => "jge",
        CmpOp::Le => "jle",
        CmpOp::Gt => "jg",
        CmpOp::Lt => "jl",
    }
}

/// Issues labels unique within one compilation. Scoped to a single
/// code-generation run so repeated compilations are reproducible.
#[derive(Default)]
struct LabelAlloc {
    counter: usize,
}

impl LabelAlloc {
    fn fresh(&mut self, base: &str) -> String {
        let n = self.counter;
        self.counter += 1;
        format!("{base}_{n}")
    }
}
