mod cli;
mod compilation;
mod test_suite;

use std::path::PathBuf;

use clap::Parser as _;
use cli::{Cli, Command};
use epsilang_backend::assembler::{Assembler, Linker, ToolError};
use epsilang_session::diagnostics::LogDiagnosticEmitter;
use epsilang_session::sourcemap::Source;
use epsilang_session::Session;
use tracing::{debug, info, warn};

#[derive(thiserror::Error, Debug)]
enum CompilerError {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Tool(#[from] ToolError),

    #[error("errors while compiling")]
    HadErrors,
}

impl From<epsilang_session::HadErrors> for CompilerError {
    fn from(_: epsilang_session::HadErrors) -> Self {
        Self::HadErrors
    }
}

type CompilerResult<T> = Result<T, CompilerError>;

fn main() {
    let cli = Cli::try_parse().unwrap_or_else(|err| {
        use clap::error::ErrorKind;

        let _ = err.print();
        let code = match err.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => 0,
            _ => 1,
        };
        std::process::exit(code);
    });

    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    if let Err(err) = run(cli) {
        tracing::error!("{err}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> CompilerResult<()> {
    match cli.command {
        Command::Build {
            input,
            output_dir,
            asm_only,
            emit_tokens,
            emit_ast,
        } => build(input, output_dir, asm_only, emit_tokens, emit_ast),

        Command::Test { dir } => test_suite::run_suite(&dir),
    }
}

fn build(
    input: PathBuf,
    output_dir: PathBuf,
    asm_only: bool,
    emit_tokens: bool,
    emit_ast: bool,
) -> CompilerResult<()> {
    info!("compiling {}", input.display());

    let contents = std::fs::read_to_string(&input)?;
    let source = Source::new(input.display().to_string(), contents);
    let mut session = Session::new(source, LogDiagnosticEmitter);

    if emit_tokens || emit_ast {
        if emit_tokens {
            println!("{}", compilation::dump_tokens(&mut session)?);
        }
        if emit_ast {
            println!("{}", compilation::dump_ast(&mut session)?);
        }
        return session.finish().map_err(Into::into);
    }

    let asm = compilation::compile(&mut session);

    std::fs::create_dir_all(&output_dir)?;
    let asm_path = output_dir.join("output.asm");
    debug!("writing assembly to {}", asm_path.display());
    std::fs::write(&asm_path, &asm)?;

    // the assembly file is written even when compilation failed, but
    // it must not be assembled: the error count is the contract
    if session.had_errors() {
        info!("error count: {}", session.error_count());
        return Err(CompilerError::HadErrors);
    }

    if asm_only {
        info!("assembly written to {}", asm_path.display());
        return Ok(());
    }

    let (Some(assembler), Some(linker)) = (Assembler::detect(), Linker::detect()) else {
        warn!(
            "host is not x86-64 linux; leaving {} unassembled",
            asm_path.display()
        );
        return Ok(());
    };

    let obj_path = output_dir.join("output.o");
    let exe_path = output_dir.join("output");

    debug!("assembling {}", obj_path.display());
    assembler.assemble(&asm_path, &obj_path)?;

    debug!("linking {}", exe_path.display());
    linker.link(&obj_path, &exe_path)?;

    info!("binary written to {}", exe_path.display());
    Ok(())
}
