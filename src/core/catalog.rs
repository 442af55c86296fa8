//! Sentence catalog
//!
//! Merged view of every loaded protocol, keyed by sentence identifier.
//! Merging is last-writer-wins per identifier.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::protocol_dsl::{FieldDef, ProtocolDef, ProtocolError, ProtocolsFile, Version};

/// Built-in standard NMEA 0183 sentences
const STANDARD_PROTOCOLS_YAML: &str = include_str!("../../protocols/nmea.yaml");

/// Protocol a stored sentence belongs to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProtocolInfo {
    /// Protocol name
    pub name: String,
    /// Part of the NMEA standard
    pub standard: bool,
    /// Protocol version
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<Version>,
}

impl ProtocolInfo {
    /// Name reported for sentences missing from the catalog
    pub const UNKNOWN: &'static str = "UNKNOWN";

    /// Placeholder protocol of unknown sentences
    pub fn unknown() -> Self {
        Self {
            name: Self::UNKNOWN.to_string(),
            standard: false,
            version: None,
        }
    }

    fn from_def(def: &ProtocolDef) -> Self {
        Self {
            name: def.protocol.clone(),
            standard: def.standard,
            version: def.version.clone(),
        }
    }
}

/// Catalog entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredSentence {
    /// Sentence identifier
    pub sentence: String,
    /// Owning protocol
    pub protocol: ProtocolInfo,
    /// Fields in order
    pub fields: Vec<FieldDef>,
    /// Description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Sentences of one `(protocol, version)` pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProtocolSummary {
    /// Protocol name
    pub protocol: String,
    /// Protocol version
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<Version>,
    /// Sentence identifiers
    pub sentences: Vec<String>,
}

/// Sentence catalog
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    sentences: BTreeMap<String, StoredSentence>,
    protocols: Vec<ProtocolInfo>,
}

impl Catalog {
    /// Empty catalog
    pub fn new() -> Self {
        Self::default()
    }

    /// Catalog holding the built-in standard sentences
    pub fn standard() -> Result<Self, ProtocolError> {
        let file = ProtocolsFile::from_yaml(STANDARD_PROTOCOLS_YAML)?;
        let mut catalog = Self::new();
        catalog.merge(&file);
        Ok(catalog)
    }

    /// Catalog built from one protocols file
    pub fn from_file(file: &ProtocolsFile) -> Self {
        let mut catalog = Self::new();
        catalog.merge(file);
        catalog
    }

    /// Insert or overwrite every sentence of `file`
    ///
    /// Returns the number of sentence definitions applied.
    pub fn merge(&mut self, file: &ProtocolsFile) -> usize {
        let mut applied = 0;
        for def in &file.protocols {
            let info = ProtocolInfo::from_def(def);
            for sentence in &def.sentences {
                self.sentences.insert(
                    sentence.sentence.clone(),
                    StoredSentence {
                        sentence: sentence.sentence.clone(),
                        protocol: info.clone(),
                        fields: sentence.fields.clone(),
                        description: sentence.description.clone(),
                    },
                );
                applied += 1;
            }
            match self.protocols.iter_mut().find(|p| p.name == info.name) {
                Some(existing) => *existing = info,
                None => self.protocols.push(info),
            }
        }
        applied
    }

    /// Look up a sentence by exact identifier
    pub fn get(&self, sentence: &str) -> Option<&StoredSentence> {
        self.sentences.get(sentence)
    }

    /// Whether `sentence` is known
    pub fn contains(&self, sentence: &str) -> bool {
        self.sentences.contains_key(sentence)
    }

    /// Number of sentences
    pub fn len(&self) -> usize {
        self.sentences.len()
    }

    /// No sentences at all
    pub fn is_empty(&self) -> bool {
        self.sentences.is_empty()
    }

    /// All sentences ordered by identifier
    pub fn sentences(&self) -> impl Iterator<Item = &StoredSentence> {
        self.sentences.values()
    }

    /// Every protocol ever merged, deduplicated by name
    pub fn protocols(&self) -> &[ProtocolInfo] {
        &self.protocols
    }

    /// Group sentence identifiers by `(protocol, version)`
    pub fn summarize(&self) -> Vec<ProtocolSummary> {
        let mut groups: BTreeMap<(String, Option<Version>), Vec<String>> = BTreeMap::new();
        for stored in self.sentences.values() {
            let ids = groups
                .entry((stored.protocol.name.clone(), stored.protocol.version.clone()))
                .or_default();
            if !ids.contains(&stored.sentence) {
                ids.push(stored.sentence.clone());
            }
        }
        groups
            .into_iter()
            .map(|((protocol, version), sentences)| ProtocolSummary {
                protocol,
                version,
                sentences,
            })
            .collect()
    }
}
