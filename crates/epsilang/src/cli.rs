use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Also print debug-level log messages.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Compile a program and, on a supported host, assemble and link
    /// it with `fasm` and `ld`.
    Build {
        /// The input file.
        input: PathBuf,

        /// Directory the assembly, object and executable are written
        /// to.
        #[arg(short, long, default_value = "../output")]
        output_dir: PathBuf,

        /// Stop after writing the assembly file.
        #[arg(long)]
        asm_only: bool,

        /// Print the token stream as JSON and skip the build.
        #[arg(long)]
        emit_tokens: bool,

        /// Print the syntax tree as JSON and skip the build.
        #[arg(long)]
        emit_ast: bool,
    },

    /// Compile the sample programs: everything under `<dir>/valid`
    /// must compile cleanly, everything under `<dir>/invalid` must be
    /// rejected.
    Test {
        /// Suite directory.
        #[arg(default_value = "test_suite/stage_1")]
        dir: PathBuf,
    },
}
