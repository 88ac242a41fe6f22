//! The `list_files` tool: enumerate alignment files in a directory.
//!
//! The only tool that never touches samtools; it answers "what is there to
//! work on" for an orchestrator that cannot list directories itself.

use crate::security;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Input for the list_files tool.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct ListFilesInput {
    /// Directory to scan (default: current directory)
    #[serde(default = "default_directory")]
    pub directory: String,
}

fn default_directory() -> String {
    ".".to_string()
}

/// Output for the list_files tool.
#[derive(Debug, Serialize, JsonSchema)]
pub struct ListFilesOutput {
    /// The directory that was scanned
    pub directory: String,
    /// Alignment file names (.sam/.bam/.cram), sorted
    pub files: Vec<String>,
    /// Number of files found
    pub total: usize,
}

/// Executes the list_files tool.
///
/// # Errors
///
/// Returns an error string if the directory cannot be read.
pub fn execute_list_files(input: ListFilesInput) -> Result<ListFilesOutput, String> {
    let dir = Path::new(&input.directory);
    let entries = std::fs::read_dir(dir)
        .map_err(|e| format!("Cannot read directory '{}': {e}", input.directory))?;

    let mut files: Vec<String> = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| format!("Error listing '{}': {e}", input.directory))?;
        let path = entry.path();
        if path.is_file() && security::is_alignment_file(&path) {
            if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
                files.push(name.to_string());
            }
        }
    }
    files.sort();

    let total = files.len();
    Ok(ListFilesOutput {
        directory: input.directory,
        files,
        total,
    })
}
