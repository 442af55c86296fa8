//! CLI Module
//!
//! Provides command-line interface functionality including:
//! - Exit codes for automation
//! - Chunked input from files and stdin
//! - Text, JSON and CSV record output

pub mod exit_codes;
pub mod output;
pub mod pipe;

pub use exit_codes::{ExitCodes, CliResult, exit_code_description, print_exit_codes};
pub use output::{OutputFormat, format_info, format_sentence, format_summary, CSV_HEADER};
pub use pipe::{ChunkReader, PipeMode, DEFAULT_CHUNK_SIZE};
