//! MCP tool implementations.
//!
//! Each tool is an `Input` struct (deserialized from the MCP call), an
//! `Output` struct (serialized back as JSON), and an `execute_*` function
//! that builds a [`crate::exec::CommandSpec`] and runs it. Tool-level
//! failures are `Err(String)` so the server can return them as MCP error
//! results rather than protocol errors.

pub mod files;
pub mod index;
pub mod sort;
pub mod stats;
pub mod view;

// view
pub use view::{execute_view, ViewInput, ViewOutput};

// sort / merge
pub use sort::{execute_merge, execute_sort, MergeInput, MergeOutput, SortInput, SortOutput};

// index / faidx
pub use index::{execute_faidx, execute_index, FaidxInput, FaidxOutput, IndexInput, IndexOutput};

// flagstat / idxstats / depth
pub use stats::{
    execute_depth, execute_flagstat, execute_idxstats, DepthInput, DepthOutput, FlagstatInput,
    FlagstatOutput, IdxstatsInput, IdxstatsOutput,
};

// list_files
pub use files::{execute_list_files, ListFilesInput, ListFilesOutput};
