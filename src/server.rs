//! MCP server implementation using rmcp.

use crate::exec::{CommandSpec, SamtoolsRunner};
use crate::tools;
use crate::types::{FlagSet, MemSize, OutputFormat, Region};
use rmcp::model::{CallToolResult, Content, ServerCapabilities, ServerInfo};
use rmcp::{schemars, tool, ServerHandler};
use schemars::JsonSchema;
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;

/// Maximum response size in bytes. Responses exceeding this are truncated
/// to prevent context window exhaustion in LLM consumers.
const MAX_RESPONSE_BYTES: usize = 512 * 1024; // 512KB

/// Truncates a JSON response string at a clean boundary before the limit,
/// appending a truncation notice. Works with both compact and pretty JSON.
fn truncate_response(mut json: String) -> String {
    if json.len() <= MAX_RESPONSE_BYTES {
        return json;
    }
    let original_len = json.len();
    // Floor the limit to a char boundary before slicing; serde_json does
    // not escape non-ASCII, so the limit can land inside a code point
    let mut limit = MAX_RESPONSE_BYTES;
    while !json.is_char_boundary(limit) {
        limit -= 1;
    }
    // Find clean cut: last newline (record boundary), then comma, then limit
    let search_region = &json[..limit];
    let safe_cut = search_region
        .rfind('\n')
        .or_else(|| search_region.rfind(','))
        .map_or(limit, |i| i + 1);
    json.truncate(safe_cut);
    json.push_str(&format!(
        "...\n[TRUNCATED: response exceeded {} bytes, showing first {}]",
        original_len, safe_cut
    ));
    json
}

/// Helper to run a blocking tool operation and return structured MCP results.
///
/// Uses `spawn_blocking()` because every tool either waits on a child
/// process or touches the filesystem. Returns either:
/// - `CallToolResult::success()` with JSON content for success
/// - `CallToolResult::error()` with error details for tool errors
/// - `rmcp::Error::internal_error()` for panics/JoinErrors
async fn run_tool<T, E, F>(name: &'static str, f: F) -> Result<CallToolResult, rmcp::Error>
where
    T: Serialize + Send + 'static,
    E: std::fmt::Display + Send + 'static,
    F: FnOnce() -> Result<T, E> + Send + 'static,
{
    let result = tokio::task::spawn_blocking(f).await;

    match result {
        Ok(Ok(output)) => {
            let json = serde_json::to_string(&output)
                .map_err(|e| rmcp::Error::internal_error(e.to_string(), None))?;
            let json = truncate_response(json);
            Ok(CallToolResult::success(vec![Content::text(json)]))
        }
        Ok(Err(e)) => {
            tracing::debug!(tool = name, error = %e, "tool returned error");
            Ok(CallToolResult::error(vec![Content::text(e.to_string())]))
        }
        Err(e) => Err(rmcp::Error::internal_error(e.to_string(), None)),
    }
}

/// Output for the samtools_version tool.
#[derive(Debug, Serialize, JsonSchema)]
pub struct VersionOutput {
    /// The command line that was executed
    pub command: String,
    /// Version and build information reported by samtools
    pub version: String,
}

/// Output for the samtools_help tool.
#[derive(Debug, Serialize, JsonSchema)]
pub struct HelpOutput {
    /// The command line that was executed
    pub command: String,
    /// The help text
    pub help: String,
}

/// MCP server exposing samtools commands as tools.
#[derive(Clone)]
pub struct SamtoolsServer {
    runner: Arc<SamtoolsRunner>,
}

impl SamtoolsServer {
    /// Creates a server around a resolved samtools binary.
    #[must_use]
    pub fn new(samtools_bin: Option<PathBuf>) -> Self {
        Self {
            runner: Arc::new(SamtoolsRunner::resolve(samtools_bin)),
        }
    }

    /// Creates a server from an existing runner (tests).
    #[must_use]
    pub fn with_runner(runner: SamtoolsRunner) -> Self {
        Self {
            runner: Arc::new(runner),
        }
    }

    /// The runner used for child processes.
    #[must_use]
    pub fn runner(&self) -> &Arc<SamtoolsRunner> {
        &self.runner
    }
}

// Tool implementations using rmcp macros
#[tool(tool_box)]
impl SamtoolsServer {
    /// View and convert SAM/BAM/CRAM files.
    #[tool(description = "View and convert SAM/BAM/CRAM files.\n\n\
        Examples: header only (header_only=true), record count (count_only=true),\n\
        a region slice (region='chr1:1000-2000'), BAM conversion (output_format='bam',\n\
        output_file='out.bam').\n\n\
        Tip: region queries need an index; run the 'index' tool first.")]
    async fn view(
        &self,
        #[tool(param)]
        #[schemars(description = "Input SAM/BAM/CRAM file path")]
        input_file: String,
        #[tool(param)]
        #[schemars(description = "Output format: sam, bam, or cram")]
        output_format: Option<OutputFormat>,
        #[tool(param)]
        #[schemars(description = "Genomic region: chr, chr:start, or chr:start-end")]
        region: Option<Region>,
        #[tool(param)]
        #[schemars(description = "Only output the header section")]
        header_only: Option<bool>,
        #[tool(param)]
        #[schemars(description = "Only count matching records")]
        count_only: Option<bool>,
        #[tool(param)]
        #[schemars(description = "Required FLAG bits, decimal or 0x hex (-f)")]
        flags_required: Option<FlagSet>,
        #[tool(param)]
        #[schemars(description = "Excluded FLAG bits, decimal or 0x hex (-F)")]
        flags_filter_out: Option<FlagSet>,
        #[tool(param)]
        #[schemars(description = "Write output to this file instead of returning it")]
        output_file: Option<String>,
        #[tool(param)]
        #[schemars(description = "Additional samtools view arguments, whitespace-separated")]
        extra_args: Option<String>,
    ) -> Result<CallToolResult, rmcp::Error> {
        let input = tools::ViewInput {
            input_file,
            output_format,
            region,
            header_only: header_only.unwrap_or(false),
            count_only: count_only.unwrap_or(false),
            flags_required,
            flags_filter_out,
            output_file,
            extra_args,
        };
        let runner = Arc::clone(&self.runner);
        run_tool("view", move || tools::execute_view(&runner, input)).await
    }

    /// Sort a SAM/BAM/CRAM file.
    #[tool(description = "Sort SAM/BAM/CRAM files by coordinate (default) or read name.\n\n\
        Examples: sort(input_file='in.bam', output_file='in.sorted.bam', threads=4)\n\n\
        Tip: coordinate-sorted output is required before 'index'.")]
    async fn sort(
        &self,
        #[tool(param)]
        #[schemars(description = "Input file to sort")]
        input_file: String,
        #[tool(param)]
        #[schemars(description = "Output file (omit to return sorted records)")]
        output_file: Option<String>,
        #[tool(param)]
        #[schemars(description = "Sort by read name instead of coordinate")]
        sort_by_name: Option<bool>,
        #[tool(param)]
        #[schemars(description = "Number of additional worker threads (-@)")]
        threads: Option<u32>,
        #[tool(param)]
        #[schemars(description = "Memory per thread, e.g. '768M' (-m)")]
        memory_per_thread: Option<MemSize>,
        #[tool(param)]
        #[schemars(description = "Additional samtools sort arguments, whitespace-separated")]
        extra_args: Option<String>,
    ) -> Result<CallToolResult, rmcp::Error> {
        let input = tools::SortInput {
            input_file,
            output_file,
            sort_by_name: sort_by_name.unwrap_or(false),
            threads,
            memory_per_thread,
            extra_args,
        };
        let runner = Arc::clone(&self.runner);
        run_tool("sort", move || tools::execute_sort(&runner, input)).await
    }

    /// Index a BAM/CRAM file.
    #[tool(description = "Index a coordinate-sorted BAM/CRAM file (.bai, or .csi with csi_format=true).\n\n\
        Region queries in 'view' and the 'idxstats' tool require this index.")]
    async fn index(
        &self,
        #[tool(param)]
        #[schemars(description = "Input BAM/CRAM file to index")]
        input_file: String,
        #[tool(param)]
        #[schemars(description = "Output index file (default: input plus .bai/.csi)")]
        output_file: Option<String>,
        #[tool(param)]
        #[schemars(description = "Generate a CSI index instead of BAI")]
        csi_format: Option<bool>,
        #[tool(param)]
        #[schemars(description = "Additional samtools index arguments, whitespace-separated")]
        extra_args: Option<String>,
    ) -> Result<CallToolResult, rmcp::Error> {
        let input = tools::IndexInput {
            input_file,
            output_file,
            csi_format: csi_format.unwrap_or(false),
            extra_args,
        };
        let runner = Arc::clone(&self.runner);
        run_tool("index", move || tools::execute_index(&runner, input)).await
    }

    /// Merge sorted alignment files.
    #[tool(description = "Merge multiple sorted BAM/CRAM files into one.\n\n\
        Example: merge(output_file='all.bam', input_files=['a.bam','b.bam'], threads=4)")]
    async fn merge(
        &self,
        #[tool(param)]
        #[schemars(description = "Output merged file")]
        output_file: String,
        #[tool(param)]
        #[schemars(description = "Sorted input BAM/CRAM files to merge")]
        input_files: Vec<String>,
        #[tool(param)]
        #[schemars(description = "Number of additional worker threads (-@)")]
        threads: Option<u32>,
        #[tool(param)]
        #[schemars(description = "Additional samtools merge arguments, whitespace-separated")]
        extra_args: Option<String>,
    ) -> Result<CallToolResult, rmcp::Error> {
        let input = tools::MergeInput {
            output_file,
            input_files,
            threads,
            extra_args,
        };
        let runner = Arc::clone(&self.runner);
        run_tool("merge", move || tools::execute_merge(&runner, input)).await
    }

    /// Per-position coverage depth.
    #[tool(description = "Compute per-position depth for one or more BAM/CRAM files.\n\n\
        Output is a TSV table: chromosome, position, depth per input file.\n\
        Restrict with region='chr1:1-10000'; large outputs are truncated, so\n\
        prefer a region or output_file for whole-genome runs.")]
    async fn depth(
        &self,
        #[tool(param)]
        #[schemars(description = "Input BAM/CRAM files")]
        input_files: Vec<String>,
        #[tool(param)]
        #[schemars(description = "Restrict to this region (chr:start-end)")]
        region: Option<Region>,
        #[tool(param)]
        #[schemars(description = "Write the table to this file instead of returning it")]
        output_file: Option<String>,
        #[tool(param)]
        #[schemars(description = "Additional samtools depth arguments, whitespace-separated")]
        extra_args: Option<String>,
    ) -> Result<CallToolResult, rmcp::Error> {
        let input = tools::DepthInput {
            input_files,
            region,
            output_file,
            extra_args,
        };
        let runner = Arc::clone(&self.runner);
        run_tool("depth", move || tools::execute_depth(&runner, input)).await
    }

    /// Flag statistics for an alignment file.
    #[tool(description = "Full flag statistics for a BAM/CRAM file: total reads, mapped,\n\
        paired, duplicates, etc. Works without an index.")]
    async fn flagstat(
        &self,
        #[tool(param)]
        #[schemars(description = "Input BAM/CRAM file")]
        input_file: String,
    ) -> Result<CallToolResult, rmcp::Error> {
        let input = tools::FlagstatInput { input_file };
        let runner = Arc::clone(&self.runner);
        run_tool("flagstat", move || tools::execute_flagstat(&runner, input)).await
    }

    /// Per-reference mapping statistics from the index.
    #[tool(description = "Per-reference read counts from a BAM/CRAM index.\n\n\
        Returns TSV rows: reference name, length, mapped reads, unmapped reads.\n\
        Requires the file to be indexed (run 'index' first).")]
    async fn idxstats(
        &self,
        #[tool(param)]
        #[schemars(description = "Indexed BAM/CRAM file")]
        input_file: String,
    ) -> Result<CallToolResult, rmcp::Error> {
        let input = tools::IdxstatsInput { input_file };
        let runner = Arc::clone(&self.runner);
        run_tool("idxstats", move || tools::execute_idxstats(&runner, input)).await
    }

    /// FASTA indexing and sequence extraction.
    #[tool(description = "Index a FASTA file, or extract sequences from an indexed FASTA.\n\n\
        With no regions, writes the .fai index. With regions (e.g. ['chr1', 'chr2:1-1000']),\n\
        returns the extracted sequences.")]
    async fn faidx(
        &self,
        #[tool(param)]
        #[schemars(description = "Input FASTA file")]
        input_file: String,
        #[tool(param)]
        #[schemars(description = "Regions to extract, e.g. ['chr1', 'chr2:1-1000']")]
        regions: Option<Vec<Region>>,
        #[tool(param)]
        #[schemars(description = "Write extracted sequences to this file")]
        output_file: Option<String>,
    ) -> Result<CallToolResult, rmcp::Error> {
        let input = tools::FaidxInput {
            input_file,
            regions: regions.unwrap_or_default(),
            output_file,
        };
        let runner = Arc::clone(&self.runner);
        run_tool("faidx", move || tools::execute_faidx(&runner, input)).await
    }

    /// List alignment files in a directory.
    #[tool(description = "List SAM/BAM/CRAM files in a directory.\n\n\
        Use this first to discover files to operate on.")]
    async fn list_files(
        &self,
        #[tool(param)]
        #[schemars(description = "Directory to scan (default: current directory)")]
        directory: Option<String>,
    ) -> Result<CallToolResult, rmcp::Error> {
        let input = tools::ListFilesInput {
            directory: directory.unwrap_or_else(|| ".".to_string()),
        };
        run_tool("list_files", move || tools::execute_list_files(input)).await
    }

    /// samtools help text.
    #[tool(description = "Get samtools help, either general or for one subcommand\n\
        (e.g. command='view'). Useful for discovering extra_args options.")]
    async fn samtools_help(
        &self,
        #[tool(param)]
        #[schemars(description = "Subcommand to get help for (omit for general help)")]
        command: Option<String>,
    ) -> Result<CallToolResult, rmcp::Error> {
        let runner = Arc::clone(&self.runner);
        run_tool("samtools_help", move || {
            let topic = match &command {
                Some(c) => Some(
                    crate::security::validate_help_topic(c)
                        .map_err(|e| e.to_string())?
                        .to_string(),
                ),
                None => None,
            };
            let result = runner.help(topic.as_deref()).map_err(|e| e.to_string())?;
            Ok::<_, String>(HelpOutput {
                command: runner.render(&CommandSpec::help(topic.as_deref())),
                help: result.display_text(),
            })
        })
        .await
    }

    /// samtools version information.
    #[tool(description = "Get the samtools version and build configuration.")]
    async fn samtools_version(&self) -> Result<CallToolResult, rmcp::Error> {
        let runner = Arc::clone(&self.runner);
        run_tool("samtools_version", move || {
            let result = runner.version().map_err(|e| e.to_string())?;
            Ok::<_, String>(VersionOutput {
                command: runner.render(&CommandSpec::version()),
                version: result.display_text(),
            })
        })
        .await
    }
}

// Implement ServerHandler trait
#[tool(tool_box)]
impl ServerHandler for SamtoolsServer {
    fn get_info(&self) -> ServerInfo {
        let instructions = "samtools-mcp: operate on SAM/BAM/CRAM alignment files via samtools.\n\n\
             WORKFLOW:\n\
             1. list_files -> discover alignment files\n\
             2. sort -> coordinate-sort (output_file='x.sorted.bam')\n\
             3. index -> build the .bai/.csi index\n\
             4. flagstat/idxstats/depth -> statistics; view -> inspect records\n\n\
             TIPS:\n\
             - view with header_only=true is the cheapest way to inspect a file\n\
             - region queries ('chr1:1000-2000') require an index\n\
             - pass output_file for large results instead of returning them inline\n\
             - samtools_help(command='view') lists options usable in extra_args\n\n\
             All tools run the local samtools binary; nothing is parsed or\n\
             modified by this server itself."
            .to_string();

        ServerInfo {
            instructions: Some(instructions),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }
}
