//! The `index` and `faidx` tools.

use crate::exec::{CommandSpec, SamtoolsRunner};
use crate::security;
use crate::types::Region;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Input for the index tool.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct IndexInput {
    /// Input BAM/CRAM file to index
    pub input_file: String,
    /// Output index file (default: input file plus .bai/.crai)
    #[serde(default)]
    pub output_file: Option<String>,
    /// Generate a CSI index instead of BAI
    #[serde(default)]
    pub csi_format: bool,
    /// Additional samtools index arguments, whitespace-separated
    #[serde(default)]
    pub extra_args: Option<String>,
}

/// Output for the index tool.
#[derive(Debug, Serialize, JsonSchema)]
pub struct IndexOutput {
    /// The command line that was executed
    pub command: String,
    /// Status or captured output
    pub message: String,
    /// The index file that was written, when known
    #[serde(skip_serializing_if = "Option::is_none")]
    pub index_file: Option<String>,
}

/// Builds the `index` argv.
///
/// Shape: `index [-c] [extra..] INPUT [OUTPUT]`
pub fn build_index_args(input: &IndexInput) -> Result<CommandSpec, String> {
    security::validate_input_path(&input.input_file).map_err(|e| e.to_string())?;

    let mut spec = CommandSpec::subcommand("index");
    if input.csi_format {
        spec.flag("-c");
    }
    if let Some(extra) = &input.extra_args {
        let tokens = security::validate_extra_args(extra).map_err(|e| e.to_string())?;
        spec.args(tokens);
    }
    spec.arg(&input.input_file);
    if let Some(out) = &input.output_file {
        security::validate_output_path(out).map_err(|e| e.to_string())?;
        spec.arg(out);
    }
    Ok(spec)
}

/// Executes the index tool.
///
/// # Errors
///
/// Returns an error string if validation fails or samtools exits non-zero.
pub fn execute_index(runner: &SamtoolsRunner, input: IndexInput) -> Result<IndexOutput, String> {
    let spec = build_index_args(&input)?;
    let result = runner.run(&spec).map_err(|e| e.to_string())?;

    // samtools index is silent on success
    let index_file = input.output_file.clone().or_else(|| {
        let suffix = if input.csi_format { ".csi" } else { ".bai" };
        Some(format!("{}{suffix}", input.input_file))
    });
    let message = if result.stdout.is_empty() && result.stderr.is_empty() {
        match &index_file {
            Some(f) => format!("Index written to {f}"),
            None => "Index created".to_string(),
        }
    } else {
        result.display_text()
    };

    Ok(IndexOutput {
        command: runner.render(&spec),
        message,
        index_file,
    })
}

/// Input for the faidx tool.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct FaidxInput {
    /// Input FASTA file
    pub input_file: String,
    /// Regions to extract (omit to only build the .fai index)
    #[serde(default)]
    pub regions: Vec<Region>,
    /// Write extracted sequences to this file instead of returning them
    #[serde(default)]
    pub output_file: Option<String>,
}

/// Output for the faidx tool.
#[derive(Debug, Serialize, JsonSchema)]
pub struct FaidxOutput {
    /// The command line that was executed
    pub command: String,
    /// Extracted sequence text, or a status message
    pub output: String,
    /// Destination file when output_file was set
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_file: Option<String>,
}

/// Builds the `faidx` argv.
///
/// Shape: `faidx [-o FILE] INPUT [REGION..]`
pub fn build_faidx_args(input: &FaidxInput) -> Result<CommandSpec, String> {
    security::validate_input_path(&input.input_file).map_err(|e| e.to_string())?;

    let mut spec = CommandSpec::subcommand("faidx");
    if let Some(out) = &input.output_file {
        security::validate_output_path(out).map_err(|e| e.to_string())?;
        spec.opt("-o", out);
    }
    spec.arg(&input.input_file);
    for region in &input.regions {
        spec.arg(region.as_str());
    }
    Ok(spec)
}

/// Executes the faidx tool.
///
/// # Errors
///
/// Returns an error string if validation fails or samtools exits non-zero.
pub fn execute_faidx(runner: &SamtoolsRunner, input: FaidxInput) -> Result<FaidxOutput, String> {
    let spec = build_faidx_args(&input)?;
    let result = runner.run(&spec).map_err(|e| e.to_string())?;

    let output = match (&input.output_file, input.regions.is_empty()) {
        (Some(file), _) if result.stdout.is_empty() => format!("Output written to {file}"),
        (None, true) if result.stdout.is_empty() && result.stderr.is_empty() => {
            format!("FASTA index written to {}.fai", input.input_file)
        }
        _ => result.display_text(),
    };

    Ok(FaidxOutput {
        command: runner.render(&spec),
        output,
        output_file: input.output_file,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn touch(dir: &TempDir, name: &str) -> String {
        let path = dir.path().join(name);
        fs::write(&path, b"x").unwrap();
        path.to_string_lossy().into_owned()
    }

    #[test]
    fn test_index_args_csi() {
        let dir = TempDir::new().unwrap();
        let input_file = touch(&dir, "in.bam");
        let input = IndexInput {
            input_file: input_file.clone(),
            output_file: None,
            csi_format: true,
            extra_args: None,
        };
        let spec = build_index_args(&input).unwrap();
        assert_eq!(spec.argv(), &["index", "-c", input_file.as_str()]);
    }

    #[test]
    fn test_index_explicit_output_is_positional() {
        let dir = TempDir::new().unwrap();
        let input_file = touch(&dir, "in.bam");
        let out = dir.path().join("custom.bai").to_string_lossy().into_owned();
        let input = IndexInput {
            input_file: input_file.clone(),
            output_file: Some(out.clone()),
            csi_format: false,
            extra_args: None,
        };
        let spec = build_index_args(&input).unwrap();
        assert_eq!(spec.argv(), &["index", input_file.as_str(), out.as_str()]);
    }

    #[test]
    fn test_faidx_args_with_regions() {
        let dir = TempDir::new().unwrap();
        let input_file = touch(&dir, "ref.fa");
        let input = FaidxInput {
            input_file: input_file.clone(),
            regions: vec![
                Region::parse("chr1").unwrap(),
                Region::parse("chr2:1-1000").unwrap(),
            ],
            output_file: None,
        };
        let spec = build_faidx_args(&input).unwrap();
        assert_eq!(
            spec.argv(),
            &["faidx", input_file.as_str(), "chr1", "chr2:1-1000"]
        );
    }

    #[test]
    fn test_faidx_output_flag_precedes_input() {
        let dir = TempDir::new().unwrap();
        let input_file = touch(&dir, "ref.fa");
        let out = dir.path().join("seqs.fa").to_string_lossy().into_owned();
        let input = FaidxInput {
            input_file: input_file.clone(),
            regions: vec![Region::parse("chr1").unwrap()],
            output_file: Some(out.clone()),
        };
        let spec = build_faidx_args(&input).unwrap();
        assert_eq!(
            spec.argv(),
            &["faidx", "-o", out.as_str(), input_file.as_str(), "chr1"]
        );
    }
}
