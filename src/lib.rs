//! samtools-mcp: MCP server exposing samtools commands as typed tools.
//!
//! This library lets an LLM orchestrator operate on SAM/BAM/CRAM alignment
//! files without shelling out itself. It is a dispatcher:
//! - Typed, validated tool parameters (regions, FLAG masks, formats)
//! - Safe argv assembly (never a shell)
//! - One blocking subprocess per call, output relayed back
//!
//! All domain work is delegated to the external `samtools` binary.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │              MCP Server (rmcp)              │
//! │         JSON-RPC over stdin/stdout          │
//! └─────────────────┬───────────────────────────┘
//!                   │
//! ┌─────────────────▼───────────────────────────┐
//! │               Tool Router                   │
//! │  view, sort, index, merge, depth, stats...  │
//! └─────────────────┬───────────────────────────┘
//!                   │ validate (types, security)
//! ┌─────────────────▼───────────────────────────┐
//! │            SamtoolsRunner                   │
//! │   argv assembly + spawn_blocking bridge     │
//! └─────────────────┬───────────────────────────┘
//!                   │
//! ┌─────────────────▼───────────────────────────┐
//! │          samtools child process             │
//! │     (BAM/CRAM parsing, sorting, depth)      │
//! └─────────────────────────────────────────────┘
//! ```

pub mod error;
pub mod exec;
pub mod security;
pub mod server;
pub mod tools;
pub mod types;

pub use error::{Result, ServerError};
pub use exec::{CommandSpec, SamtoolsRunner};
pub use types::{FlagSet, MemSize, OutputFormat, Region};
