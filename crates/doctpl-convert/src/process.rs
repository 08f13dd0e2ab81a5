//! Running external tools to completion.

use std::ffi::OsStr;
use std::fs::File;
use std::io::{ErrorKind, Read, Seek, SeekFrom};
use std::path::Path;
use std::process::{Command, Stdio};
use std::time::Duration;

use wait_timeout::ChildExt;

use crate::error::{ConversionError, Result};

/// A program plus the arguments that precede every call-specific argument,
/// e.g. `["flatpak", "run", "org.libreoffice.LibreOffice"]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tool {
    program: String,
    args: Vec<String>,
}

impl Tool {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    /// Builds a tool from a configured command line. `what` names the tool
    /// in the error for an empty line.
    pub fn from_argv<I, S>(argv: I, what: &'static str) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut argv = argv.into_iter().map(Into::into);
        let program = argv.next().ok_or(ConversionError::EmptyCommand(what))?;
        Ok(Self {
            program,
            args: argv.collect(),
        })
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    /// A fresh [`Command`] with the leading arguments applied.
    pub fn command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);
        cmd
    }
}

/// Runs `cmd` with no stdin and discarded stdout, waiting at most `timeout`.
///
/// Stderr goes to an anonymous temp file so that a chatty tool cannot block
/// on a full pipe; on failure its contents become part of the error. A tool
/// that overruns the timeout is killed.
pub fn run(cmd: &mut Command, timeout: Option<Duration>) -> Result<()> {
    let line = describe(cmd);
    let stderr = tempfile::tempfile()?;
    cmd.stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::from(stderr.try_clone()?));

    log::debug!("running `{line}`");
    let mut child = cmd.spawn()?;

    let status = match timeout {
        Some(duration) => match child.wait_timeout(duration)? {
            Some(status) => status,
            None => {
                child.kill()?;
                child.wait()?;
                log::warn!("`{line}` timed out after {duration:?}");
                return Err(ConversionError::Timeout(line, duration));
            }
        },
        None => child.wait()?,
    };

    if !status.success() {
        return Err(ConversionError::Failed {
            command: line,
            status,
            stderr: read_back(stderr)?,
        });
    }
    Ok(())
}

/// The command line as it would be typed.
pub fn describe(cmd: &Command) -> String {
    std::iter::once(cmd.get_program())
        .chain(cmd.get_args())
        .map(OsStr::to_string_lossy)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Reads a file `cmd` was expected to write.
pub fn read_output(cmd: &Command, path: &Path) -> Result<Vec<u8>> {
    match std::fs::read(path) {
        Ok(bytes) => Ok(bytes),
        Err(err) if err.kind() == ErrorKind::NotFound => Err(ConversionError::MissingOutput {
            command: describe(cmd),
            path: path.to_path_buf(),
        }),
        Err(err) => Err(err.into()),
    }
}

fn read_back(mut file: File) -> std::io::Result<String> {
    file.seek(SeekFrom::Start(0))?;
    let mut buf = Vec::new();
    file.read_to_end(&mut buf)?;
    Ok(String::from_utf8_lossy(&buf).trim().to_string())
}
