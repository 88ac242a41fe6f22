//! The `flagstat`, `idxstats`, and `depth` tools.

use crate::exec::{CommandSpec, SamtoolsRunner};
use crate::security;
use crate::types::Region;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Input for the flagstat tool.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct FlagstatInput {
    /// Input BAM/CRAM file
    pub input_file: String,
}

/// Output for the flagstat tool.
#[derive(Debug, Serialize, JsonSchema)]
pub struct FlagstatOutput {
    /// The command line that was executed
    pub command: String,
    /// The flagstat report text
    pub report: String,
}

/// Executes the flagstat tool.
///
/// # Errors
///
/// Returns an error string if validation fails or samtools exits non-zero.
pub fn execute_flagstat(
    runner: &SamtoolsRunner,
    input: FlagstatInput,
) -> Result<FlagstatOutput, String> {
    security::validate_input_path(&input.input_file).map_err(|e| e.to_string())?;

    let mut spec = CommandSpec::subcommand("flagstat");
    spec.arg(&input.input_file);
    let result = runner.run(&spec).map_err(|e| e.to_string())?;

    Ok(FlagstatOutput {
        command: runner.render(&spec),
        report: result.display_text(),
    })
}

/// Input for the idxstats tool.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct IdxstatsInput {
    /// Indexed BAM/CRAM file
    pub input_file: String,
}

/// Output for the idxstats tool.
#[derive(Debug, Serialize, JsonSchema)]
pub struct IdxstatsOutput {
    /// The command line that was executed
    pub command: String,
    /// TSV report: ref name, length, mapped reads, unmapped reads
    pub report: String,
    /// Number of reference sequences in the report (including '*')
    pub references: usize,
}

/// Executes the idxstats tool.
///
/// # Errors
///
/// Returns an error string if validation fails or samtools exits non-zero.
pub fn execute_idxstats(
    runner: &SamtoolsRunner,
    input: IdxstatsInput,
) -> Result<IdxstatsOutput, String> {
    security::validate_input_path(&input.input_file).map_err(|e| e.to_string())?;

    let mut spec = CommandSpec::subcommand("idxstats");
    spec.arg(&input.input_file);
    let result = runner.run(&spec).map_err(|e| e.to_string())?;

    let references = result.stdout.lines().filter(|l| !l.is_empty()).count();

    Ok(IdxstatsOutput {
        command: runner.render(&spec),
        report: result.display_text(),
        references,
    })
}

/// Input for the depth tool.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct DepthInput {
    /// Input BAM/CRAM files (at least one; positions are reported per file)
    pub input_files: Vec<String>,
    /// Restrict depth computation to this region (-r)
    #[serde(default)]
    pub region: Option<Region>,
    /// Write the per-position table to this file instead of returning it
    #[serde(default)]
    pub output_file: Option<String>,
    /// Additional samtools depth arguments, whitespace-separated
    #[serde(default)]
    pub extra_args: Option<String>,
}

/// Output for the depth tool.
#[derive(Debug, Serialize, JsonSchema)]
pub struct DepthOutput {
    /// The command line that was executed
    pub command: String,
    /// Per-position depth table (chrom, pos, depth per input)
    pub output: String,
    /// Number of positions reported, when returned inline
    #[serde(skip_serializing_if = "Option::is_none")]
    pub positions: Option<usize>,
    /// Destination file when output_file was set
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_file: Option<String>,
}

/// Builds the `depth` argv.
///
/// Shape: `depth [-r REGION] [-o FILE] [extra..] IN1 [IN2..]`
///
/// Unlike `view`, samtools depth takes its region through `-r`; a trailing
/// positional would be read as another input file.
pub fn build_depth_args(input: &DepthInput) -> Result<CommandSpec, String> {
    if input.input_files.is_empty() {
        return Err("depth requires at least one input file".to_string());
    }
    for in_file in &input.input_files {
        security::validate_input_path(in_file).map_err(|e| e.to_string())?;
    }

    let mut spec = CommandSpec::subcommand("depth");
    if let Some(region) = &input.region {
        spec.opt("-r", region.as_str());
    }
    if let Some(out) = &input.output_file {
        security::validate_output_path(out).map_err(|e| e.to_string())?;
        spec.opt("-o", out);
    }
    if let Some(extra) = &input.extra_args {
        let tokens = security::validate_extra_args(extra).map_err(|e| e.to_string())?;
        spec.args(tokens);
    }
    spec.args(&input.input_files);
    Ok(spec)
}

/// Executes the depth tool.
///
/// # Errors
///
/// Returns an error string if validation fails or samtools exits non-zero.
pub fn execute_depth(runner: &SamtoolsRunner, input: DepthInput) -> Result<DepthOutput, String> {
    let spec = build_depth_args(&input)?;
    let result = runner.run(&spec).map_err(|e| e.to_string())?;

    let (output, positions) = match &input.output_file {
        Some(file) if result.stdout.is_empty() => (format!("Output written to {file}"), None),
        _ => {
            let n = result.stdout.lines().filter(|l| !l.is_empty()).count();
            (result.display_text(), Some(n))
        }
    };

    Ok(DepthOutput {
        command: runner.render(&spec),
        output,
        positions,
        output_file: input.output_file,
    })
}
