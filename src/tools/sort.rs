//! The `sort` and `merge` tools.

use crate::exec::{CommandSpec, SamtoolsRunner};
use crate::security;
use crate::types::MemSize;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Input for the sort tool.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct SortInput {
    /// Input SAM/BAM/CRAM file to sort
    pub input_file: String,
    /// Output file (omit to return sorted records on stdout)
    #[serde(default)]
    pub output_file: Option<String>,
    /// Sort by read name instead of coordinate
    #[serde(default)]
    pub sort_by_name: bool,
    /// Number of additional worker threads (-@)
    #[serde(default)]
    pub threads: Option<u32>,
    /// Memory per thread, e.g. '768M' (-m)
    #[serde(default)]
    pub memory_per_thread: Option<MemSize>,
    /// Additional samtools sort arguments, whitespace-separated
    #[serde(default)]
    pub extra_args: Option<String>,
}

/// Output for the sort tool.
#[derive(Debug, Serialize, JsonSchema)]
pub struct SortOutput {
    /// The command line that was executed
    pub command: String,
    /// Status or captured output
    pub message: String,
    /// Destination file when output_file was set
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_file: Option<String>,
}

/// Builds the `sort` argv.
///
/// Shape: `sort [-n] [-@ N] [-m MEM] [-o FILE] [extra..] INPUT`
pub fn build_sort_args(input: &SortInput) -> Result<CommandSpec, String> {
    security::validate_input_path(&input.input_file).map_err(|e| e.to_string())?;

    let mut spec = CommandSpec::subcommand("sort");
    if input.sort_by_name {
        spec.flag("-n");
    }
    if let Some(threads) = input.threads {
        spec.opt("-@", threads.to_string());
    }
    if let Some(mem) = &input.memory_per_thread {
        spec.opt("-m", mem.as_str());
    }
    if let Some(out) = &input.output_file {
        security::validate_output_path(out).map_err(|e| e.to_string())?;
        spec.opt("-o", out);
    }
    if let Some(extra) = &input.extra_args {
        let tokens = security::validate_extra_args(extra).map_err(|e| e.to_string())?;
        spec.args(tokens);
    }
    spec.arg(&input.input_file);
    Ok(spec)
}

/// Executes the sort tool.
///
/// # Errors
///
/// Returns an error string if validation fails or samtools exits non-zero.
pub fn execute_sort(runner: &SamtoolsRunner, input: SortInput) -> Result<SortOutput, String> {
    let spec = build_sort_args(&input)?;
    let result = runner.run(&spec).map_err(|e| e.to_string())?;

    let message = match &input.output_file {
        Some(file) if result.stdout.is_empty() => format!("Sorted output written to {file}"),
        _ => result.display_text(),
    };

    Ok(SortOutput {
        command: runner.render(&spec),
        message,
        output_file: input.output_file,
    })
}

/// Input for the merge tool.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct MergeInput {
    /// Output merged file
    pub output_file: String,
    /// Sorted input BAM/CRAM files to merge (at least one)
    pub input_files: Vec<String>,
    /// Number of additional worker threads (-@)
    #[serde(default)]
    pub threads: Option<u32>,
    /// Additional samtools merge arguments, whitespace-separated
    #[serde(default)]
    pub extra_args: Option<String>,
}

/// Output for the merge tool.
#[derive(Debug, Serialize, JsonSchema)]
pub struct MergeOutput {
    /// The command line that was executed
    pub command: String,
    /// Status or captured output
    pub message: String,
    /// Number of input files merged
    pub inputs_merged: usize,
    /// The merged output file
    pub output_file: String,
}

/// Builds the `merge` argv.
///
/// Shape: `merge [-@ N] [extra..] OUT IN1 [IN2..]` (output first, per samtools)
pub fn build_merge_args(input: &MergeInput) -> Result<CommandSpec, String> {
    if input.input_files.is_empty() {
        return Err("merge requires at least one input file".to_string());
    }
    for in_file in &input.input_files {
        security::validate_input_path(in_file).map_err(|e| e.to_string())?;
    }
    security::validate_output_path(&input.output_file).map_err(|e| e.to_string())?;

    let mut spec = CommandSpec::subcommand("merge");
    if let Some(threads) = input.threads {
        spec.opt("-@", threads.to_string());
    }
    if let Some(extra) = &input.extra_args {
        let tokens = security::validate_extra_args(extra).map_err(|e| e.to_string())?;
        spec.args(tokens);
    }
    spec.arg(&input.output_file);
    spec.args(&input.input_files);
    Ok(spec)
}

/// Executes the merge tool.
///
/// # Errors
///
/// Returns an error string if validation fails or samtools exits non-zero.
pub fn execute_merge(runner: &SamtoolsRunner, input: MergeInput) -> Result<MergeOutput, String> {
    let spec = build_merge_args(&input)?;
    let result = runner.run(&spec).map_err(|e| e.to_string())?;

    let message = if result.stdout.is_empty() && result.stderr.is_empty() {
        format!("Merged {} files into {}", input.input_files.len(), input.output_file)
    } else {
        result.display_text()
    };

    Ok(MergeOutput {
        command: runner.render(&spec),
        message,
        inputs_merged: input.input_files.len(),
        output_file: input.output_file,
    })
}
