//! hashwish - nudge a commit's author and committer timestamps until its
//! object id starts with a prefix you wish for.
//!
//! The library holds the commit templating and the offset search; the binary
//! adds configuration, repository access and output.

pub mod cli;
pub mod commit;
pub mod config;
pub mod error;
pub mod git;
pub mod search;

// Re-exports for ergonomics
pub use commit::{CommitRecord, object_id};
pub use error::*;
pub use search::{OffsetSchedule, PrefixSet, Search, SearchOutcome, Solution, wish};
