use std::fs::{self, DirEntry};
use std::path::Path;

use epsilang_session::diagnostics::Diagnostic;
use epsilang_session::sourcemap::Source;
use epsilang_session::Session;
use owo_colors::OwoColorize;

use crate::{compilation, CompilerError, CompilerResult};

/// Compile every sample program under `<dir>/valid` and `<dir>/invalid`
/// and check each lands on the expected side of the error count.
pub fn run_suite(dir: &Path) -> CompilerResult<()> {
    println!("{}", "compiling sample programs...".blue().bold());

    let mut output = SuiteOutput::new();

    for entry in fs::read_dir(dir.join("valid"))? {
        output.append(run_entry(entry?, false)?);
    }

    for entry in fs::read_dir(dir.join("invalid"))? {
        output.append(run_entry(entry?, true)?);
    }

    print!("\n{} of {} programs behaved - ", output.passed, output.total);

    if output.passed == output.total {
        println!("{}", "all ok".green());
        Ok(())
    } else {
        println!(
            "{}",
            format_args!("{} failed", output.total - output.passed)
                .red()
                .bold()
        );
        Err(CompilerError::HadErrors)
    }
}

fn run_entry(entry: DirEntry, expect_errors: bool) -> CompilerResult<SuiteOutput> {
    let metadata = entry.metadata()?;
    let path = entry.path();

    if metadata.is_dir() {
        let mut output = SuiteOutput::new();

        for entry in fs::read_dir(path)? {
            output.append(run_entry(entry?, expect_errors)?);
        }

        return Ok(output);
    }

    let contents = fs::read_to_string(&path)?;
    let source = Source::new(path.display().to_string(), contents);

    // collect diagnostics instead of logging them, so the suite output
    // stays readable
    let mut session = Session::new(source, Vec::<Diagnostic>::new());
    compilation::compile(&mut session);

    print!(" - {} - ", path.display());

    let passed = if expect_errors {
        if session.had_errors() {
            println!("{}", "ok".green().bold());
            true
        } else {
            println!("{}", "err (unexpectedly compiled)".red().bold());
            false
        }
    } else if session.had_errors() {
        println!("{}", "err (failed to compile)".red().bold());
        for diagnostic in &session.diagnostics {
            println!("     {}", diagnostic.message);
        }
        false
    } else {
        println!("{}", "ok".green().bold());
        true
    };

    Ok(SuiteOutput {
        passed: usize::from(passed),
        total: 1,
    })
}

#[derive(Clone, Copy)]
struct SuiteOutput {
    passed: usize,
    total: usize,
}

impl SuiteOutput {
    fn new() -> Self {
        Self { passed: 0, total: 0 }
    }

    fn append(&mut self, other: Self) {
        self.passed += other.passed;
        self.total += other.total;
    }
}
