//! # NMEAScope Core Library
//!
//! A streaming decoder for NMEA 0183 sentences with support for:
//! - Noisy, fragmented input (serial lines, sockets, log files)
//! - Checksum validation and resynchronisation after garbage
//! - Talker identifiers (`$GPGGA`, `$U8AAM`, proprietary `$P...`)
//! - Pluggable sentence catalogs described in YAML
//!
//! ## Features
//!
//! - Built-in catalog of standard sentences
//! - Vendor catalogs merged at runtime
//! - Typed field decoding with unknown-sentence fallback
//! - Random sentence synthesis for testing
//! - JSON-Schema export of the catalog format
//! - CLI with exit codes and pipe support
//!
//! ## Example
//!
//! ```rust
//! use nmeascope_core::{Parser, ProtocolsInput};
//!
//! let mut parser = Parser::with_options(true, 1024)?;
//! parser.add_protocols(ProtocolsInput::Content(
//!     "protocols:\n  - protocol: GYRO\n    sentences:\n      - sentence: HEHDT\n        fields:\n          - { name: heading, type: float }\n          - { name: reference, type: string }\n".into(),
//! ))?;
//!
//! for sentence in parser.parse_data("$GPGGA,074844.199,3652.514,N,00225.679,W,1,12,1.0,0.0,M,0.0,M,,*79\r\n") {
//!     println!("{} from {:?}", sentence.sentence(), sentence.talker());
//! }
//! # Ok::<(), nmeascope_core::ProtocolError>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod cli;
pub mod config;
pub mod core;

// Re-exports for convenience
pub use crate::cli::{CliResult, ExitCodes, OutputFormat, PipeMode};
pub use crate::config::{ConfigError, ParserConfig, ProtocolSource};
pub use crate::core::catalog::{Catalog, ProtocolInfo, ProtocolSummary, StoredSentence};
pub use crate::core::parser::{Parser, SentenceInfo, DEFAULT_BUFFER_LIMIT};
pub use crate::core::protocol::{
    Data, DecodeError, FrameRejection, KnownSentence, NmeaSentence, ParsedField, RawFrame, Talker,
    UnknownSentence,
};
pub use crate::core::protocol_dsl::{
    FieldDef, FieldType, ProtocolDef, ProtocolError, ProtocolsFile, ProtocolsInput, SentenceDef, Version,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
