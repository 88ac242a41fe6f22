//! Subprocess execution for the samtools binary.
//!
//! All domain work (BAM/CRAM parsing, sorting, index structures, depth
//! computation) happens inside samtools; this module only builds argv,
//! spawns one blocking child per call, and captures its output. No shell
//! is ever involved, so argument strings can never be re-split or expanded.

use crate::error::{ExecError, ExecResult};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

/// Environment variable overriding the samtools binary location.
pub const SAMTOOLS_ENV: &str = "SAMTOOLS";

/// Default binary name resolved via PATH.
const DEFAULT_BIN: &str = "samtools";

/// An assembled samtools invocation: subcommand plus ordered arguments.
///
/// Built by the tool modules, consumed by [`SamtoolsRunner::run`]. The
/// rendered form is echoed back to the orchestrator for auditability.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    args: Vec<String>,
}

impl CommandSpec {
    /// Starts a spec for a samtools subcommand (`view`, `sort`, ...).
    #[must_use]
    pub fn subcommand(name: &str) -> Self {
        Self {
            args: vec![name.to_string()],
        }
    }

    /// Starts a spec for a top-level samtools option (`--version`, `--help`).
    #[must_use]
    pub fn toplevel(option: &str) -> Self {
        Self {
            args: vec![option.to_string()],
        }
    }

    /// The spec behind [`SamtoolsRunner::version`].
    #[must_use]
    pub fn version() -> Self {
        Self::toplevel("--version")
    }

    /// The spec behind [`SamtoolsRunner::help`].
    #[must_use]
    pub fn help(command: Option<&str>) -> Self {
        match command {
            Some(cmd) => {
                let mut s = Self::subcommand(cmd);
                s.flag("--help");
                s
            }
            None => Self::toplevel("--help"),
        }
    }

    /// Appends a bare flag like `-H`.
    pub fn flag(&mut self, flag: &str) -> &mut Self {
        self.args.push(flag.to_string());
        self
    }

    /// Appends an option with its value, e.g. `-f 0x2`.
    pub fn opt(&mut self, option: &str, value: impl AsRef<str>) -> &mut Self {
        self.args.push(option.to_string());
        self.args.push(value.as_ref().to_string());
        self
    }

    /// Appends a positional argument.
    pub fn arg(&mut self, value: impl AsRef<str>) -> &mut Self {
        self.args.push(value.as_ref().to_string());
        self
    }

    /// Appends several positional arguments.
    pub fn args<I, S>(&mut self, values: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for v in values {
            self.args.push(v.as_ref().to_string());
        }
        self
    }

    /// The argv passed to the child, excluding the binary itself.
    #[must_use]
    pub fn argv(&self) -> &[String] {
        &self.args
    }

    /// Renders the command line in canonical form, e.g.
    /// `samtools view -b -f 0x2 in.bam chr1:1-1000`.
    ///
    /// Use [`SamtoolsRunner::render`] when the resolved binary should be
    /// shown instead of the canonical name.
    #[must_use]
    pub fn render(&self) -> String {
        self.render_with(DEFAULT_BIN)
    }

    /// Renders the command line with an explicit binary.
    #[must_use]
    pub fn render_with(&self, bin: &str) -> String {
        let mut line = String::from(bin);
        for arg in &self.args {
            line.push(' ');
            line.push_str(arg);
        }
        line
    }
}

/// Captured output of a successful samtools invocation.
#[derive(Debug, Clone)]
pub struct ExecOutput {
    pub stdout: String,
    pub stderr: String,
}

impl ExecOutput {
    /// The text a caller normally wants: stdout, falling back to stderr
    /// (samtools writes progress and some reports there), falling back to
    /// a fixed completion message.
    #[must_use]
    pub fn display_text(&self) -> String {
        if !self.stdout.is_empty() {
            self.stdout.clone()
        } else if !self.stderr.is_empty() {
            self.stderr.clone()
        } else {
            "Command completed successfully with no output.".to_string()
        }
    }
}

/// Runs samtools subcommands as blocking child processes.
#[derive(Debug, Clone)]
pub struct SamtoolsRunner {
    bin: PathBuf,
}

impl SamtoolsRunner {
    /// Creates a runner for an explicit binary path.
    #[must_use]
    pub fn new(bin: PathBuf) -> Self {
        Self { bin }
    }

    /// Resolves the binary: explicit override, then `$SAMTOOLS`, then
    /// `samtools` on PATH.
    #[must_use]
    pub fn resolve(override_bin: Option<PathBuf>) -> Self {
        let bin = override_bin
            .or_else(|| std::env::var_os(SAMTOOLS_ENV).map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from(DEFAULT_BIN));
        Self { bin }
    }

    /// The binary this runner spawns.
    #[must_use]
    pub fn bin(&self) -> &Path {
        &self.bin
    }

    /// Renders a spec's command line with the resolved binary, so the
    /// echoed audit line names the executable that actually ran.
    #[must_use]
    pub fn render(&self, spec: &CommandSpec) -> String {
        spec.render_with(&self.bin.to_string_lossy())
    }

    /// Executes one samtools invocation and captures its output.
    ///
    /// Blocks until the child exits; callers on the async side wrap this in
    /// `spawn_blocking`.
    ///
    /// # Errors
    ///
    /// - [`ExecError::Spawn`] if the binary cannot be launched
    /// - [`ExecError::Failed`] on a non-zero exit status
    /// - [`ExecError::Signalled`] if the child died without a status
    pub fn run(&self, spec: &CommandSpec) -> ExecResult<ExecOutput> {
        tracing::debug!(cmd = %self.render(spec), "spawning samtools");

        let output = Command::new(&self.bin)
            .args(spec.argv())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .map_err(|source| ExecError::Spawn {
                bin: self.bin.clone(),
                source,
            })?;

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();

        if output.status.success() {
            tracing::debug!(
                stdout_bytes = stdout.len(),
                stderr_bytes = stderr.len(),
                "samtools completed"
            );
            Ok(ExecOutput { stdout, stderr })
        } else if let Some(code) = output.status.code() {
            tracing::warn!(code, stderr = %stderr.trim_end(), "samtools failed");
            Err(ExecError::Failed {
                status: format!("exit code {code}"),
                stderr: if stderr.trim().is_empty() {
                    stdout.trim_end().to_string()
                } else {
                    stderr.trim_end().to_string()
                },
            })
        } else {
            Err(ExecError::Signalled)
        }
    }

    /// Runs `samtools --version`.
    pub fn version(&self) -> ExecResult<ExecOutput> {
        self.run(&CommandSpec::version())
    }

    /// Runs `samtools --help` or `samtools <command> --help`.
    pub fn help(&self, command: Option<&str>) -> ExecResult<ExecOutput> {
        self.run(&CommandSpec::help(command))
    }
}
