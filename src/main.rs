//! samtools-mcp: MCP server exposing samtools commands as typed tools.
//!
//! Usage:
//!   samtools-mcp --mcp                    # Start MCP server on stdin/stdout
//!   samtools-mcp flagstat in.bam          # Run one tool from the CLI
//!   samtools-mcp view in.bam -r chr1:1-100
//!   samtools-mcp list-files /data

use clap::{Parser, Subcommand};
use rmcp::ServiceExt;
use samtools_mcp::server::SamtoolsServer;
use samtools_mcp::types::{MemSize, OutputFormat, Region};
use samtools_mcp::{tools, SamtoolsRunner};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "samtools-mcp")]
#[command(about = "MCP server exposing samtools commands as typed tools")]
#[command(version)]
struct Cli {
    /// Run as MCP server (stdin/stdout JSON-RPC)
    #[arg(long)]
    mcp: bool,

    /// Path to the samtools binary (default: $SAMTOOLS, then PATH)
    #[arg(long)]
    samtools: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// View and convert SAM/BAM/CRAM files
    View {
        /// Input file
        input_file: String,

        /// Output format: sam, bam, or cram
        #[arg(short = 'f', long)]
        format: Option<OutputFormat>,

        /// Genomic region (chr:start-end)
        #[arg(short, long)]
        region: Option<Region>,

        /// Only output the header
        #[arg(short = 'H', long)]
        header_only: bool,

        /// Only count records
        #[arg(short, long)]
        count: bool,

        /// Output file
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Sort a SAM/BAM/CRAM file
    Sort {
        /// Input file
        input_file: String,

        /// Output file
        #[arg(short, long)]
        output: Option<String>,

        /// Sort by read name instead of coordinate
        #[arg(short = 'n', long)]
        by_name: bool,

        /// Additional worker threads
        #[arg(short, long)]
        threads: Option<u32>,

        /// Memory per thread (e.g. 768M)
        #[arg(short, long)]
        memory: Option<MemSize>,
    },

    /// Index a BAM/CRAM file
    Index {
        /// Input file
        input_file: String,

        /// Output index file
        #[arg(short, long)]
        output: Option<String>,

        /// Generate CSI instead of BAI
        #[arg(short, long)]
        csi: bool,
    },

    /// Merge sorted alignment files
    Merge {
        /// Output merged file
        output_file: String,

        /// Input files
        #[arg(required = true)]
        input_files: Vec<String>,

        /// Additional worker threads
        #[arg(short, long)]
        threads: Option<u32>,
    },

    /// Per-position coverage depth
    Depth {
        /// Input files
        #[arg(required = true)]
        input_files: Vec<String>,

        /// Restrict to this region
        #[arg(short, long)]
        region: Option<Region>,

        /// Output file
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Flag statistics
    Flagstat {
        /// Input file
        input_file: String,
    },

    /// Per-reference statistics from the index
    Idxstats {
        /// Input file
        input_file: String,
    },

    /// Index a FASTA file or extract regions
    Faidx {
        /// Input FASTA file
        input_file: String,

        /// Regions to extract
        regions: Vec<Region>,

        /// Output file
        #[arg(short, long)]
        output: Option<String>,
    },

    /// List alignment files in a directory
    ListFiles {
        /// Directory to scan
        #[arg(default_value = ".")]
        directory: String,
    },

    /// Show samtools version information
    Version,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // CRITICAL: Log to stderr only (stdout is JSON-RPC for MCP)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("samtools_mcp=info".parse()?),
        )
        .with_writer(std::io::stderr)
        .init();

    if cli.mcp {
        run_mcp_server(cli.samtools).await
    } else if let Some(cmd) = cli.command {
        run_cli(cli.samtools, cmd)
    } else {
        eprintln!("Use --mcp to start the MCP server, or a subcommand for CLI mode.");
        eprintln!("Run with --help for more information.");
        std::process::exit(1);
    }
}

async fn run_mcp_server(samtools: Option<PathBuf>) -> anyhow::Result<()> {
    let server = SamtoolsServer::new(samtools);
    tracing::info!(
        bin = %server.runner().bin().display(),
        "Starting samtools MCP server"
    );

    // Run the MCP server on stdin/stdout
    let service = server.serve(rmcp::transport::io::stdio()).await?;
    service.waiting().await?;

    Ok(())
}

fn run_cli(samtools: Option<PathBuf>, cmd: Commands) -> anyhow::Result<()> {
    let runner = SamtoolsRunner::resolve(samtools);

    match cmd {
        Commands::View {
            input_file,
            format,
            region,
            header_only,
            count,
            output,
        } => {
            let input = tools::ViewInput {
                input_file,
                output_format: format,
                region,
                header_only,
                count_only: count,
                flags_required: None,
                flags_filter_out: None,
                output_file: output,
                extra_args: None,
            };
            let result = tools::execute_view(&runner, input).map_err(|e| anyhow::anyhow!(e))?;
            println!("{}", serde_json::to_string_pretty(&result)?);
        }

        Commands::Sort {
            input_file,
            output,
            by_name,
            threads,
            memory,
        } => {
            let input = tools::SortInput {
                input_file,
                output_file: output,
                sort_by_name: by_name,
                threads,
                memory_per_thread: memory,
                extra_args: None,
            };
            let result = tools::execute_sort(&runner, input).map_err(|e| anyhow::anyhow!(e))?;
            println!("{}", serde_json::to_string_pretty(&result)?);
        }

        Commands::Index {
            input_file,
            output,
            csi,
        } => {
            let input = tools::IndexInput {
                input_file,
                output_file: output,
                csi_format: csi,
                extra_args: None,
            };
            let result = tools::execute_index(&runner, input).map_err(|e| anyhow::anyhow!(e))?;
            println!("{}", serde_json::to_string_pretty(&result)?);
        }

        Commands::Merge {
            output_file,
            input_files,
            threads,
        } => {
            let input = tools::MergeInput {
                output_file,
                input_files,
                threads,
                extra_args: None,
            };
            let result = tools::execute_merge(&runner, input).map_err(|e| anyhow::anyhow!(e))?;
            println!("{}", serde_json::to_string_pretty(&result)?);
        }

        Commands::Depth {
            input_files,
            region,
            output,
        } => {
            let input = tools::DepthInput {
                input_files,
                region,
                output_file: output,
                extra_args: None,
            };
            let result = tools::execute_depth(&runner, input).map_err(|e| anyhow::anyhow!(e))?;
            println!("{}", serde_json::to_string_pretty(&result)?);
        }

        Commands::Flagstat { input_file } => {
            let input = tools::FlagstatInput { input_file };
            let result =
                tools::execute_flagstat(&runner, input).map_err(|e| anyhow::anyhow!(e))?;
            println!("{}", result.report);
        }

        Commands::Idxstats { input_file } => {
            let input = tools::IdxstatsInput { input_file };
            let result =
                tools::execute_idxstats(&runner, input).map_err(|e| anyhow::anyhow!(e))?;
            println!("{}", result.report);
        }

        Commands::Faidx {
            input_file,
            regions,
            output,
        } => {
            let input = tools::FaidxInput {
                input_file,
                regions,
                output_file: output,
            };
            let result = tools::execute_faidx(&runner, input).map_err(|e| anyhow::anyhow!(e))?;
            println!("{}", result.output);
        }

        Commands::ListFiles { directory } => {
            let input = tools::ListFilesInput { directory };
            let result = tools::execute_list_files(input).map_err(|e| anyhow::anyhow!(e))?;
            println!("{}", serde_json::to_string_pretty(&result)?);
        }

        Commands::Version => {
            let result = runner.version().map_err(|e| anyhow::anyhow!(e.to_string()))?;
            print!("{}", result.display_text());
        }
    }

    Ok(())
}
