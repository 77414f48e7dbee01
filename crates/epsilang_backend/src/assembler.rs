//! Drivers for the external tools the compiler shells out to: `fasm`
//! to assemble the emitted text and `ld` to link the object.

use std::ffi::OsStr;
use std::process::Command;

use target_lexicon::{Architecture, OperatingSystem, Triple};

#[derive(thiserror::Error, Debug)]
pub enum ToolError {
    #[error("couldn't run {tool}: {source}")]
    Io {
        tool: &'static str,
        source: std::io::Error,
    },

    #[error(
        "{tool} exited with code {code} and stderr output:\n{}",
        String::from_utf8_lossy(.stderr)
    )]
    Exited {
        tool: &'static str,
        code: i32,
        stderr: Vec<u8>,
    },

    #[error(
        "{tool} terminated with stderr output:\n{}",
        String::from_utf8_lossy(.stderr)
    )]
    Terminated {
        tool: &'static str,
        stderr: Vec<u8>,
    },
}

/// The emitted text is FASM-dialect ELF64; only an x86-64 Linux host
/// can assemble and run the result, so detection checks the host
/// triple rather than probing the tools.
fn host_is_supported() -> bool {
    let host = Triple::host();
    host.architecture == Architecture::X86_64
        && host.operating_system == OperatingSystem::Linux
}

#[derive(Debug, Clone)]
pub enum Assembler {
    Fasm,
    Custom(String, Vec<String>),
}

impl Assembler {
    pub fn detect() -> Option<Self> {
        host_is_supported().then_some(Self::Fasm)
    }

    pub fn assemble<P0: AsRef<OsStr>, P1: AsRef<OsStr>>(
        &self,
        asm_file: P0,
        obj_file: P1,
    ) -> Result<(), ToolError> {
        let mut cmd = match self {
            Self::Fasm => Command::new("fasm"),

            Self::Custom(cmd, args) => {
                let mut cmd = Command::new(cmd);
                cmd.args(args);
                cmd
            }
        };

        // fasm takes the input and output paths positionally
        cmd.arg(asm_file);
        cmd.arg(obj_file);

        run_tool("assembler", cmd)
    }
}

#[derive(Debug, Clone)]
pub enum Linker {
    Ld,
    Custom(String, Vec<String>),
}

impl Linker {
    pub fn detect() -> Option<Self> {
        host_is_supported().then_some(Self::Ld)
    }

    pub fn link<P0: AsRef<OsStr>, P1: AsRef<OsStr>>(
        &self,
        obj_file: P0,
        output: P1,
    ) -> Result<(), ToolError> {
        let mut cmd = match self {
            Self::Ld => Command::new("ld"),

            Self::Custom(cmd, args) => {
                let mut cmd = Command::new(cmd);
                cmd.args(args);
                cmd
            }
        };

        cmd.arg("-o");
        cmd.arg(output);
        cmd.arg(obj_file);

        run_tool("linker", cmd)
    }
}

fn run_tool(tool: &'static str, mut cmd: Command) -> Result<(), ToolError> {
    let output = cmd.output().map_err(|source| ToolError::Io { tool, source })?;

    if output.status.success() {
        return Ok(());
    }

    match output.status.code() {
        Some(code) => Err(ToolError::Exited {
            tool,
            code,
            stderr: output.stderr,
        }),

        None => Err(ToolError::Terminated {
            tool,
            stderr: output.stderr,
        }),
    }
}
