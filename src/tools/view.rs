//! The `view` tool: view and convert SAM/BAM/CRAM files.

use crate::exec::{CommandSpec, SamtoolsRunner};
use crate::security;
use crate::types::{FlagSet, OutputFormat, Region};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Input for the view tool.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct ViewInput {
    /// Input SAM/BAM/CRAM file
    pub input_file: String,
    /// Output format: sam, bam, or cram
    #[serde(default)]
    pub output_format: Option<OutputFormat>,
    /// Genomic region to view (chr, chr:start, or chr:start-end)
    #[serde(default)]
    pub region: Option<Region>,
    /// Only output the header section
    #[serde(default)]
    pub header_only: bool,
    /// Only count matching records instead of printing them
    #[serde(default)]
    pub count_only: bool,
    /// FLAG bits a record must have set (-f)
    #[serde(default)]
    pub flags_required: Option<FlagSet>,
    /// FLAG bits that exclude a record (-F)
    #[serde(default)]
    pub flags_filter_out: Option<FlagSet>,
    /// Write output to this file instead of returning it
    #[serde(default)]
    pub output_file: Option<String>,
    /// Additional samtools view arguments, whitespace-separated
    #[serde(default)]
    pub extra_args: Option<String>,
}

/// Output for the view tool.
#[derive(Debug, Serialize, JsonSchema)]
pub struct ViewOutput {
    /// The command line that was executed
    pub command: String,
    /// Captured output text
    pub output: String,
    /// Record count when count_only was set
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<u64>,
    /// Destination file when output_file was set
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_file: Option<String>,
}

/// Builds the `view` argv from validated inputs.
///
/// Shape: `view [fmt] [-H] [-c] [-f N] [-F N] [-o FILE] [extra..] INPUT [REGION]`
pub fn build_args(input: &ViewInput) -> Result<CommandSpec, String> {
    security::validate_input_path(&input.input_file).map_err(|e| e.to_string())?;

    let mut spec = CommandSpec::subcommand("view");
    if let Some(fmt) = input.output_format {
        spec.flag(fmt.view_flag());
    }
    if input.header_only {
        spec.flag("-H");
    }
    if input.count_only {
        spec.flag("-c");
    }
    if let Some(flags) = &input.flags_required {
        spec.opt("-f", flags.as_str());
    }
    if let Some(flags) = &input.flags_filter_out {
        spec.opt("-F", flags.as_str());
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
    if let Some(region) = &input.region {
        spec.arg(region.as_str());
    }
    Ok(spec)
}

/// Executes the view tool.
///
/// # Errors
///
/// Returns an error string if validation fails or samtools exits non-zero.
pub fn execute_view(runner: &SamtoolsRunner, input: ViewInput) -> Result<ViewOutput, String> {
    let spec = build_args(&input)?;
    let result = runner.run(&spec).map_err(|e| e.to_string())?;

    let count = if input.count_only {
        result.stdout.trim().parse::<u64>().ok()
    } else {
        None
    };

    let output = match &input.output_file {
        Some(file) if result.stdout.is_empty() => format!("Output written to {file}"),
        _ => result.display_text(),
    };

    Ok(ViewOutput {
        command: runner.render(&spec),
        output,
        count,
        output_file: input.output_file,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn sample_input(dir: &TempDir) -> String {
        let path = dir.path().join("sample.bam");
        fs::write(&path, b"BAM\x01").unwrap();
        path.to_string_lossy().into_owned()
    }

    #[test]
    fn test_view_args_minimal() {
        let dir = TempDir::new().unwrap();
        let input_file = sample_input(&dir);
        let input = ViewInput {
            input_file: input_file.clone(),
            output_format: None,
            region: None,
            header_only: false,
            count_only: false,
            flags_required: None,
            flags_filter_out: None,
            output_file: None,
            extra_args: None,
        };
        let spec = build_args(&input).unwrap();
        assert_eq!(spec.argv(), &["view", input_file.as_str()]);
    }

    #[test]
    fn test_view_args_full() {
        let dir = TempDir::new().unwrap();
        let input_file = sample_input(&dir);
        let out = dir.path().join("out.bam").to_string_lossy().into_owned();
        let input = ViewInput {
            input_file: input_file.clone(),
            output_format: Some(OutputFormat::Bam),
            region: Some(Region::parse("chr1:1-1000").unwrap()),
            header_only: true,
            count_only: false,
            flags_required: Some(FlagSet::parse("0x2").unwrap()),
            flags_filter_out: Some(FlagSet::parse("4").unwrap()),
            output_file: Some(out.clone()),
            extra_args: Some("-q 30".to_string()),
        };
        let spec = build_args(&input).unwrap();
        assert_eq!(
            spec.argv(),
            &[
                "view",
                "-b",
                "-H",
                "-f",
                "0x2",
                "-F",
                "4",
                "-o",
                out.as_str(),
                "-q",
                "30",
                input_file.as_str(),
                "chr1:1-1000"
            ]
        );
    }

    #[test]
    fn test_view_rejects_missing_input() {
        let input = ViewInput {
            input_file: "/no/such/sample.bam".to_string(),
            output_format: None,
            region: None,
            header_only: false,
            count_only: false,
            flags_required: None,
            flags_filter_out: None,
            output_file: None,
            extra_args: None,
        };
        let err = build_args(&input).unwrap_err();
        assert!(err.contains("not found"));
    }

    #[test]
    fn test_view_rejects_shell_extra_args() {
        let dir = TempDir::new().unwrap();
        let input = ViewInput {
            input_file: sample_input(&dir),
            output_format: None,
            region: None,
            header_only: false,
            count_only: false,
            flags_required: None,
            flags_filter_out: None,
            output_file: None,
            extra_args: Some("-b > hijack.bam".to_string()),
        };
        let err = build_args(&input).unwrap_err();
        assert!(err.contains("output_file"), "got: {err}");
    }
}
