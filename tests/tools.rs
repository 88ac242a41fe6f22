//! Integration tests for MCP tool execution.
//!
//! Tests the public tool API end-to-end against a stub samtools binary,
//! verifying both the argv that reaches the child and the shape of the
//! relayed output.

#![cfg(unix)]

mod common;

use common::StubSamtools;
use samtools_mcp::tools::*;
use samtools_mcp::types::{FlagSet, OutputFormat, Region};

// ============================================================================
// View Tool Tests
// ============================================================================

#[test]
fn test_view_happy_path() {
    let stub = StubSamtools::new();
    let input_file = stub.write_file("sample.bam", b"BAM\x01");

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

    let result = execute_view(&stub.runner(), input).unwrap();

    assert_eq!(result.command, format!("{} view {input_file}", stub.bin_str()));
    assert_eq!(stub.calls(), vec![format!("view {input_file}")]);
}

#[test]
fn test_view_count_only_parses_count() {
    let stub = StubSamtools::new();
    let input_file = stub.write_file("sample.bam", b"BAM\x01");

    let input = ViewInput {
        input_file,
        output_format: None,
        region: None,
        header_only: false,
        count_only: true,
        flags_required: None,
        flags_filter_out: None,
        output_file: None,
        extra_args: None,
    };

    let result = execute_view(&stub.runner(), input).unwrap();

    assert_eq!(result.count, Some(42));
    assert_eq!(result.output.trim(), "42");
}

#[test]
fn test_view_full_argv_reaches_child() {
    let stub = StubSamtools::new();
    let input_file = stub.write_file("sample.cram", b"CRAM");
    let out = stub.path("out.bam");

    let input = ViewInput {
        input_file: input_file.clone(),
        output_format: Some(OutputFormat::Bam),
        region: Some(Region::parse("chr2:1,000-2,000").unwrap()),
        header_only: false,
        count_only: false,
        flags_required: Some(FlagSet::parse("0x2").unwrap()),
        flags_filter_out: Some(FlagSet::parse("256").unwrap()),
        output_file: Some(out.clone()),
        extra_args: Some("-q 30".to_string()),
    };

    execute_view(&stub.runner(), input).unwrap();

    assert_eq!(
        stub.calls(),
        vec![format!(
            "view -b -f 0x2 -F 256 -o {out} -q 30 {input_file} chr2:1,000-2,000"
        )]
    );
}

#[test]
fn test_view_output_file_message() {
    let stub = StubSamtools::new();
    let input_file = stub.write_file("sample.bam", b"BAM\x01");
    let out = stub.path("out.sam");

    let input = ViewInput {
        input_file,
        output_format: None,
        region: None,
        header_only: true,
        count_only: false,
        flags_required: None,
        flags_filter_out: None,
        output_file: Some(out.clone()),
        extra_args: None,
    };

    let result = execute_view(&stub.runner(), input).unwrap();

    assert_eq!(result.output, format!("Output written to {out}"));
    assert_eq!(result.output_file.as_deref(), Some(out.as_str()));
}

// ============================================================================
// Sort / Merge Tool Tests
// ============================================================================

#[test]
fn test_sort_writes_to_output_file() {
    let stub = StubSamtools::new();
    let input_file = stub.write_file("unsorted.bam", b"BAM\x01");
    let out = stub.path("sorted.bam");

    let input = SortInput {
        input_file: input_file.clone(),
        output_file: Some(out.clone()),
        sort_by_name: false,
        threads: Some(2),
        memory_per_thread: None,
        extra_args: None,
    };

    let result = execute_sort(&stub.runner(), input).unwrap();

    assert_eq!(result.message, format!("Sorted output written to {out}"));
    assert_eq!(stub.calls(), vec![format!("sort -@ 2 -o {out} {input_file}")]);
}

#[test]
fn test_merge_argv_order() {
    let stub = StubSamtools::new();
    let a = stub.write_file("a.bam", b"BAM\x01");
    let b = stub.write_file("b.bam", b"BAM\x01");
    let out = stub.path("merged.bam");

    let input = MergeInput {
        output_file: out.clone(),
        input_files: vec![a.clone(), b.clone()],
        threads: None,
        extra_args: None,
    };

    let result = execute_merge(&stub.runner(), input).unwrap();

    assert_eq!(result.inputs_merged, 2);
    assert!(result.message.contains("Merged 2 files"));
    // samtools merge takes the output first, then inputs
    assert_eq!(stub.calls(), vec![format!("merge {out} {a} {b}")]);
}

#[test]
fn test_merge_missing_input_is_tool_error() {
    let stub = StubSamtools::new();
    let a = stub.write_file("a.bam", b"BAM\x01");

    let input = MergeInput {
        output_file: stub.path("merged.bam"),
        input_files: vec![a, stub.path("missing.bam")],
        threads: None,
        extra_args: None,
    };

    let err = execute_merge(&stub.runner(), input).unwrap_err();

    assert!(err.contains("not found"), "got: {err}");
    assert!(stub.calls().is_empty(), "child must not be spawned");
}

// ============================================================================
// Index / Faidx Tool Tests
// ============================================================================

#[test]
fn test_index_default_bai_name() {
    let stub = StubSamtools::new();
    let input_file = stub.write_file("sorted.bam", b"BAM\x01");

    let input = IndexInput {
        input_file: input_file.clone(),
        output_file: None,
        csi_format: false,
        extra_args: None,
    };

    let result = execute_index(&stub.runner(), input).unwrap();

    assert_eq!(result.index_file, Some(format!("{input_file}.bai")));
    assert!(result.message.contains(".bai"));
}

#[test]
fn test_index_csi() {
    let stub = StubSamtools::new();
    let input_file = stub.write_file("sorted.bam", b"BAM\x01");

    let input = IndexInput {
        input_file: input_file.clone(),
        output_file: None,
        csi_format: true,
        extra_args: None,
    };

    let result = execute_index(&stub.runner(), input).unwrap();

    assert_eq!(result.index_file, Some(format!("{input_file}.csi")));
    assert_eq!(stub.calls(), vec![format!("index -c {input_file}")]);
}

#[test]
fn test_faidx_extracts_regions() {
    let stub = StubSamtools::new();
    let input_file = stub.write_file("ref.fa", b">chr1\nACGT\n");

    let input = FaidxInput {
        input_file,
        regions: vec![Region::parse("chr1:1-8").unwrap()],
        output_file: None,
    };

    let result = execute_faidx(&stub.runner(), input).unwrap();

    assert!(result.output.contains(">chr1:1-8"));
    assert!(result.output.contains("ACGTACGT"));
}

#[test]
fn test_faidx_index_only_message() {
    let stub = StubSamtools::new();
    let input_file = stub.write_file("ref.fa", b">chr1\nACGT\n");

    let input = FaidxInput {
        input_file: input_file.clone(),
        regions: vec![],
        output_file: None,
    };

    let result = execute_faidx(&stub.runner(), input).unwrap();

    assert_eq!(result.output, format!("FASTA index written to {input_file}.fai"));
}

// ============================================================================
// Flagstat / Idxstats / Depth Tool Tests
// ============================================================================

#[test]
fn test_flagstat_relays_report() {
    let stub = StubSamtools::new();
    let input_file = stub.write_file("sample.bam", b"BAM\x01");

    let input = FlagstatInput {
        input_file: input_file.clone(),
    };

    let result = execute_flagstat(&stub.runner(), input).unwrap();

    assert!(result.report.contains("10 + 0 in total"));
    assert_eq!(
        result.command,
        format!("{} flagstat {input_file}", stub.bin_str())
    );
}

#[test]
fn test_idxstats_counts_references() {
    let stub = StubSamtools::new();
    let input_file = stub.write_file("sample.bam", b"BAM\x01");

    let input = IdxstatsInput { input_file };

    let result = execute_idxstats(&stub.runner(), input).unwrap();

    assert_eq!(result.references, 2); // chr1 and '*'
    assert!(result.report.starts_with("chr1\t"));
}

#[test]
fn test_depth_counts_positions_and_uses_dash_r() {
    let stub = StubSamtools::new();
    let a = stub.write_file("a.bam", b"BAM\x01");

    let input = DepthInput {
        input_files: vec![a.clone()],
        region: Some(Region::parse("chr1:1-3").unwrap()),
        output_file: None,
        extra_args: None,
    };

    let result = execute_depth(&stub.runner(), input).unwrap();

    assert_eq!(result.positions, Some(3));
    assert_eq!(stub.calls(), vec![format!("depth -r chr1:1-3 {a}")]);
}

#[test]
fn test_depth_output_file_argv() {
    let stub = StubSamtools::new();
    let a = stub.write_file("a.bam", b"BAM\x01");
    let out = stub.path("depth.tsv");

    // The stub still prints a table; a real samtools with -o would not.
    // Only the argv matters here.
    let input = DepthInput {
        input_files: vec![a.clone()],
        region: None,
        output_file: Some(out.clone()),
        extra_args: None,
    };

    execute_depth(&stub.runner(), input).unwrap();

    assert_eq!(stub.calls(), vec![format!("depth -o {out} {a}")]);
}

// ============================================================================
// List Files Tool Tests
// ============================================================================

#[test]
fn test_list_files_end_to_end() {
    let stub = StubSamtools::new();
    stub.write_file("reads.bam", b"");
    stub.write_file("reads.sam", b"");
    stub.write_file("notes.txt", b"");

    let input = ListFilesInput {
        directory: stub.dir.path().to_string_lossy().into_owned(),
    };

    let result = execute_list_files(input).unwrap();

    assert_eq!(result.files, vec!["reads.bam", "reads.sam"]);
    assert_eq!(result.total, 2);
}
