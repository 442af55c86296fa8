//! Streaming NMEA parser
//!
//! [`Parser`] owns a sentence catalog and the carry buffer holding an
//! unterminated frame between calls, so input can be fed in arbitrary
//! chunks as it arrives from a serial line or socket.
//!
//! ```rust
//! use nmeascope_core::Parser;
//!
//! let mut parser = Parser::with_options(true, 1024)?;
//! assert!(parser.parse_data("$GPHDT,123.4,T*").is_empty());
//! let sentences = parser.parse_data("31\r\n");
//! assert_eq!(sentences[0].sentence(), "HDT");
//! # Ok::<(), nmeascope_core::ProtocolError>(())
//! ```

use chrono::Utc;
use serde::Serialize;

use super::catalog::{Catalog, ProtocolSummary, StoredSentence};
use super::protocol::framing::extract_frames;
use super::protocol::nmea::{self, split_talker, NmeaSentence, NMEA_ID_LENGTH};
use super::protocol::talker::{self, Talker};
use super::protocol_dsl::{ProtocolError, ProtocolsInput};
use super::simulator;
use crate::config::{ConfigError, ParserConfig};

/// Default carry buffer capacity in characters
pub const DEFAULT_BUFFER_LIMIT: usize = 1024;

/// Catalog entry found for an identifier
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SentenceInfo {
    /// Matched definition
    #[serde(flatten)]
    pub definition: StoredSentence,
    /// Talker, when matched through a talker prefix
    pub talker: Option<Talker>,
}

/// Streaming NMEA parser
#[derive(Debug, Clone)]
pub struct Parser {
    memory: bool,
    buffer: String,
    buffer_limit: usize,
    catalog: Catalog,
}

impl Parser {
    /// Parser over the standard catalog, without carry-over
    pub fn new() -> Result<Self, ProtocolError> {
        Self::with_options(false, DEFAULT_BUFFER_LIMIT)
    }

    /// Parser over the standard catalog
    pub fn with_options(memory: bool, buffer_limit: usize) -> Result<Self, ProtocolError> {
        check_limit(buffer_limit)?;
        Ok(Self {
            memory,
            buffer: String::new(),
            buffer_limit,
            catalog: Catalog::standard()?,
        })
    }

    /// Parser configured from a settings file, extra catalogs included
    pub fn from_config(config: &ParserConfig) -> Result<Self, ConfigError> {
        let mut parser = Self::with_options(config.memory, config.buffer_limit)?;
        for source in &config.protocols {
            parser.add_protocols(source.to_input()?)?;
        }
        Ok(parser)
    }

    /// Carry-over enabled
    pub fn memory(&self) -> bool {
        self.memory
    }

    /// Enable or disable carry-over; disabling drops the pending tail
    pub fn set_memory(&mut self, memory: bool) {
        self.memory = memory;
        if !memory {
            self.buffer.clear();
        }
    }

    /// Carry buffer capacity in characters
    pub fn buffer_limit(&self) -> usize {
        self.buffer_limit
    }

    /// Change the carry buffer capacity
    pub fn set_buffer_limit(&mut self, limit: usize) -> Result<(), ProtocolError> {
        check_limit(limit)?;
        self.buffer_limit = limit;
        self.enforce_limit();
        Ok(())
    }

    /// Merge more sentence definitions into the catalog
    ///
    /// Returns the number of sentence definitions applied. Definitions for an
    /// identifier already present replace the old ones.
    pub fn add_protocols(&mut self, input: ProtocolsInput) -> Result<usize, ProtocolError> {
        let file = input.load()?;
        let applied = self.catalog.merge(&file);
        tracing::info!(
            "Added {} sentences from {} protocols ({} known)",
            applied,
            file.protocols.len(),
            self.catalog.len()
        );
        Ok(applied)
    }

    /// Underlying catalog
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Sentence identifiers grouped by protocol
    pub fn protocols(&self) -> Vec<ProtocolSummary> {
        self.catalog.summarize()
    }

    /// Every known sentence, ordered by identifier
    pub fn sentences(&self) -> impl Iterator<Item = &StoredSentence> {
        self.catalog.sentences()
    }

    /// Look up `id` directly, then with its talker prefix stripped
    pub fn sentence_info(&self, id: &str) -> Option<SentenceInfo> {
        if id.chars().count() < NMEA_ID_LENGTH {
            return None;
        }
        if let Some(stored) = self.catalog.get(id) {
            return Some(SentenceInfo { definition: stored.clone(), talker: None });
        }
        let (prefix, core) = split_talker(id)?;
        self.catalog.get(core).map(|stored| SentenceInfo {
            definition: stored.clone(),
            talker: Some(talker::resolve(prefix)),
        })
    }

    /// Decode every complete frame in `text`
    ///
    /// With memory enabled, an unterminated frame at the end of `text` is kept
    /// and completed by the next call. All sentences returned by one call
    /// share the same timestamp.
    pub fn parse_data(&mut self, text: &str) -> Vec<NmeaSentence> {
        let timestamp = Utc::now();
        let extraction = if self.memory && !self.buffer.is_empty() {
            let mut data = std::mem::take(&mut self.buffer);
            data.push_str(text);
            extract_frames(&data, true)
        } else {
            extract_frames(text, self.memory)
        };

        self.buffer = extraction.carry;
        self.enforce_limit();

        extraction
            .frames
            .into_iter()
            .map(|frame| nmea::decode(frame, timestamp, &self.catalog))
            .collect()
    }

    /// Random valid frame for `id`, see [`simulator::fake_sentence`]
    pub fn fake_sentence(&self, id: &str) -> Option<String> {
        simulator::fake_sentence(&self.catalog, id)
    }

    /// Unterminated data waiting for the next chunk
    pub fn pending(&self) -> &str {
        &self.buffer
    }

    /// Drop the pending data
    pub fn clear_buffer(&mut self) {
        self.buffer.clear();
    }

    fn enforce_limit(&mut self) {
        let excess = self.buffer.chars().count().saturating_sub(self.buffer_limit);
        if excess == 0 {
            return;
        }
        let cut = self
            .buffer
            .char_indices()
            .nth(excess)
            .map_or(self.buffer.len(), |(index, _)| index);
        tracing::warn!(
            "Carry buffer exceeds {} characters, dropping {} oldest",
            self.buffer_limit,
            excess
        );
        self.buffer.drain(..cut);
    }
}

fn check_limit(limit: usize) -> Result<(), ProtocolError> {
    if limit == 0 {
        return Err(ProtocolError::InvalidInput("buffer limit must be positive".to_string()));
    }
    Ok(())
}
