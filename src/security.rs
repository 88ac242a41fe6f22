//! Security module for the samtools-mcp server.
//!
//! Provides protection against:
//! - Shell metacharacter injection through pass-through arguments
//! - Arbitrary argv injection through the help tool
//! - Confusing child-process failures from missing files
//!
//! # Design
//!
//! Child processes are always spawned directly (never through a shell), so
//! metacharacters cannot actually expand. They are rejected anyway: a token
//! like `>` or `$(...)` in `extra_args` always signals a caller that expected
//! shell semantics, and samtools would otherwise treat it as a filename.

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Security-related errors.
#[derive(Error, Debug, Clone)]
pub enum SecurityError {
    #[error("Argument rejected: '{token}' contains shell metacharacter '{meta}'")]
    ShellMetacharacter { token: String, meta: char },

    #[error("Output redirection is not supported; use the 'output_file' parameter instead of '>'")]
    Redirection,

    #[error("Unknown samtools subcommand: '{command}'")]
    UnknownCommand { command: String },

    #[error("Input file not found: '{}'", path.display())]
    InputNotFound { path: PathBuf },

    #[error("Input path is not a file: '{}'", path.display())]
    NotAFile { path: PathBuf },

    #[error("Output directory does not exist: '{}'", dir.display())]
    OutputDirMissing { dir: PathBuf },
}

impl SecurityError {
    /// Returns a machine-readable error code.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::ShellMetacharacter { .. } => "SHELL_METACHARACTER",
            Self::Redirection => "REDIRECTION",
            Self::UnknownCommand { .. } => "UNKNOWN_COMMAND",
            Self::InputNotFound { .. } => "INPUT_NOT_FOUND",
            Self::NotAFile { .. } => "NOT_A_FILE",
            Self::OutputDirMissing { .. } => "OUTPUT_DIR_MISSING",
        }
    }
}

/// Characters that only make sense to a shell. Tokens containing any of
/// these are rejected before they reach argv.
const SHELL_METACHARACTERS: &[char] = &[
    ';', '|', '&', '$', '`', '<', '>', '(', ')', '{', '}', '\'', '"', '\\', '\n', '\r',
];

/// File extensions treated as alignment files by `list_files`.
pub const ALIGNMENT_EXTENSIONS: &[&str] = &["sam", "bam", "cram"];

/// The samtools subcommands the help tool may be asked about.
const KNOWN_COMMANDS: &[&str] = &[
    "view", "sort", "index", "merge", "depth", "flagstat", "idxstats", "faidx", "fqidx", "stats",
    "dict", "cat", "split", "quickcheck", "fixmate", "markdup", "rmdup", "calmd", "reheader",
    "targetcut", "addreplacerg", "collate", "bedcov", "mpileup", "coverage", "ampliconclip",
    "ampliconstats", "tview", "head", "fasta", "fastq", "import", "samples", "consensus",
    "reference", "reset", "cram-size", "checksum",
];

/// Splits a free-form extra-arguments string into vetted argv tokens.
///
/// Tokens are whitespace-separated, matching how the command line would have
/// been parsed. Every token is checked for shell metacharacters; a bare `>`
/// gets a dedicated error pointing the caller at `output_file`.
///
/// # Errors
///
/// Returns `SecurityError` if any token would require shell interpretation.
pub fn validate_extra_args(args: &str) -> Result<Vec<String>, SecurityError> {
    let mut tokens = Vec::new();
    for token in args.split_whitespace() {
        if token == ">" || token == ">>" {
            return Err(SecurityError::Redirection);
        }
        if let Some(meta) = token.chars().find(|c| SHELL_METACHARACTERS.contains(c)) {
            return Err(SecurityError::ShellMetacharacter {
                token: token.to_string(),
                meta,
            });
        }
        if token.chars().any(char::is_control) {
            return Err(SecurityError::ShellMetacharacter {
                token: token.escape_default().to_string(),
                meta: '\0',
            });
        }
        tokens.push(token.to_string());
    }
    Ok(tokens)
}

/// Validates a subcommand name for the help tool against the known list.
///
/// # Errors
///
/// Returns `SecurityError::UnknownCommand` for anything not in the list,
/// which also blocks option-shaped strings like `--version --foo`.
pub fn validate_help_topic(command: &str) -> Result<&str, SecurityError> {
    let trimmed = command.trim();
    if KNOWN_COMMANDS.contains(&trimmed) {
        Ok(trimmed)
    } else {
        Err(SecurityError::UnknownCommand {
            command: command.to_string(),
        })
    }
}

/// Checks that an input path exists and is a regular file.
///
/// samtools produces its own error for missing files, but checking up front
/// gives the orchestrator a structured error instead of parsed stderr.
pub fn validate_input_path(path: &str) -> Result<PathBuf, SecurityError> {
    let p = PathBuf::from(path);
    if !p.exists() {
        return Err(SecurityError::InputNotFound { path: p });
    }
    if !p.is_file() {
        return Err(SecurityError::NotAFile { path: p });
    }
    Ok(p)
}

/// Checks that the parent directory of an output path exists.
pub fn validate_output_path(path: &str) -> Result<PathBuf, SecurityError> {
    let p = PathBuf::from(path);
    let dir = match p.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    if !dir.is_dir() {
        return Err(SecurityError::OutputDirMissing { dir });
    }
    Ok(p)
}

/// Returns true if the path has an alignment-file extension (.sam/.bam/.cram).
#[must_use]
pub fn is_alignment_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| {
            ALIGNMENT_EXTENSIONS
                .iter()
                .any(|known| ext.eq_ignore_ascii_case(known))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extra_args_plain_tokens() {
        let tokens = validate_extra_args("-q 30 --no-PG").unwrap();
        assert_eq!(tokens, vec!["-q", "30", "--no-PG"]);
    }

    #[test]
    fn test_extra_args_empty() {
        assert!(validate_extra_args("").unwrap().is_empty());
        assert!(validate_extra_args("   ").unwrap().is_empty());
    }

    #[test]
    fn test_extra_args_rejects_redirection() {
        let err = validate_extra_args("-b > out.bam").unwrap_err();
        assert_eq!(err.code(), "REDIRECTION");
    }

    #[test]
    fn test_extra_args_rejects_metacharacters() {
        for bad in ["a;b", "a|b", "$(whoami)", "`id`", "a&&b", "\"quoted\""] {
            let err = validate_extra_args(bad).unwrap_err();
            assert_eq!(err.code(), "SHELL_METACHARACTER", "should reject {bad}");
        }
    }

    #[test]
    fn test_help_topic_known() {
        assert_eq!(validate_help_topic("view").unwrap(), "view");
        assert_eq!(validate_help_topic(" sort ").unwrap(), "sort");
    }

    #[test]
    fn test_help_topic_rejects_options_and_unknowns() {
        assert!(validate_help_topic("--version").is_err());
        assert!(validate_help_topic("rm -rf /").is_err());
        assert!(validate_help_topic("").is_err());
    }

    #[test]
    fn test_alignment_extension_check() {
        assert!(is_alignment_file(Path::new("sample.bam")));
        assert!(is_alignment_file(Path::new("sample.CRAM")));
        assert!(!is_alignment_file(Path::new("sample.bam.bai")));
        assert!(!is_alignment_file(Path::new("reference.fa")));
    }

    #[test]
    fn test_input_path_missing() {
        let err = validate_input_path("/no/such/file.bam").unwrap_err();
        assert_eq!(err.code(), "INPUT_NOT_FOUND");
    }

    #[test]
    fn test_output_path_parent_must_exist() {
        assert!(validate_output_path("out.bam").is_ok());
        let err = validate_output_path("/no/such/dir/out.bam").unwrap_err();
        assert_eq!(err.code(), "OUTPUT_DIR_MISSING");
    }
}
