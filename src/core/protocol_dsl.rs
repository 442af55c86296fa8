//! Protocol Definition DSL
//!
//! Declarative sentence catalogs. A protocols file lists one or more
//! protocols, each describing the comma-separated fields of its sentences:
//!
//! ```yaml
//! protocols:
//!   - protocol: NORSUB8
//!     version: "1.0"
//!     standard: false
//!     sentences:
//!       - sentence: PNORSUB8
//!         description: Attitude and heave
//!         fields:
//!           - name: roll
//!             type: float
//!             units: deg
//! ```
//!
//! Files are loaded from YAML (JSON being a subset of it), validated, and
//! merged into a [`Catalog`](crate::core::catalog::Catalog).

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Default file name used by [`write_json_schema`]
pub const JSON_SCHEMA_FILENAME: &str = "nmea_protocols_schema.json";

/// Errors raised while loading or adding protocol definitions
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// The definitions do not match the expected shape
    #[error("Validation error: {0}")]
    Validation(String),

    /// Empty or ambiguous input to `add_protocols`
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A protocols file could not be read
    #[error("Cannot read {path}: {source}")]
    Io {
        /// File that failed
        path: PathBuf,
        /// Underlying error
        source: std::io::Error,
    },

    /// YAML syntax or shape error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ProtocolError {
    /// Whether this error reports malformed catalog definitions
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_) | Self::Yaml(_))
    }
}

/// Field data type
///
/// Several C-style spellings are accepted as aliases when reading YAML.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FieldType {
    /// Signed 8-bit integer
    #[serde(rename = "int8", alias = "signed char")]
    Int8,
    /// Signed 16-bit integer
    #[serde(rename = "int16", alias = "short")]
    Int16,
    /// Signed 32-bit integer
    #[serde(rename = "int32", alias = "int")]
    Int32,
    /// Signed 64-bit integer
    #[serde(rename = "int64", alias = "long")]
    Int64,
    /// Unsigned 8-bit integer
    #[serde(rename = "uint8", alias = "char")]
    Uint8,
    /// Unsigned 16-bit integer
    #[serde(rename = "uint16", alias = "unsigned short")]
    Uint16,
    /// Unsigned 32-bit integer
    #[serde(rename = "uint32", alias = "unsigned int")]
    Uint32,
    /// Unsigned 64-bit integer
    #[serde(rename = "uint64", alias = "unsigned long")]
    Uint64,
    /// 32-bit float
    #[serde(rename = "float32", alias = "float")]
    Float32,
    /// 64-bit float
    #[serde(rename = "float64", alias = "double")]
    Float64,
    /// Generic number, decoded as a 64-bit float
    #[serde(rename = "number")]
    Number,
    /// Free text
    #[serde(rename = "string")]
    String,
    /// Boolean
    #[serde(rename = "boolean", alias = "bool")]
    Boolean,
}

impl FieldType {
    /// Every accepted spelling, canonical names first
    pub const SPELLINGS: &'static [&'static str] = &[
        "int8", "int16", "int32", "int64",
        "uint8", "uint16", "uint32", "uint64",
        "float32", "float64", "number", "string", "boolean",
        "signed char", "short", "int", "long",
        "char", "unsigned short", "unsigned int", "unsigned long",
        "float", "double", "bool",
    ];

    /// Canonical name
    pub fn name(&self) -> &'static str {
        match self {
            Self::Int8 => "int8",
            Self::Int16 => "int16",
            Self::Int32 => "int32",
            Self::Int64 => "int64",
            Self::Uint8 => "uint8",
            Self::Uint16 => "uint16",
            Self::Uint32 => "uint32",
            Self::Uint64 => "uint64",
            Self::Float32 => "float32",
            Self::Float64 => "float64",
            Self::Number => "number",
            Self::String => "string",
            Self::Boolean => "boolean",
        }
    }

    /// Integer kinds
    pub fn is_integer(&self) -> bool {
        matches!(
            self,
            Self::Int8 | Self::Int16 | Self::Int32 | Self::Int64
                | Self::Uint8 | Self::Uint16 | Self::Uint32 | Self::Uint64
        )
    }

    /// Floating point kinds
    pub fn is_float(&self) -> bool {
        matches!(self, Self::Float32 | Self::Float64 | Self::Number)
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for FieldType {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let ty = match s {
            "int8" | "signed char" => Self::Int8,
            "int16" | "short" => Self::Int16,
            "int32" | "int" => Self::Int32,
            "int64" | "long" => Self::Int64,
            "uint8" | "char" => Self::Uint8,
            "uint16" | "unsigned short" => Self::Uint16,
            "uint32" | "unsigned int" => Self::Uint32,
            "uint64" | "unsigned long" => Self::Uint64,
            "float32" | "float" => Self::Float32,
            "float64" | "double" => Self::Float64,
            "number" => Self::Number,
            "string" => Self::String,
            "boolean" | "bool" => Self::Boolean,
            other => {
                return Err(ProtocolError::Validation(format!("unknown field type '{}'", other)))
            }
        };
        Ok(ty)
    }
}

/// Protocol version: 1 to 3 dot-separated non-negative integers
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "VersionRepr", into = "String")]
pub struct Version(String);

impl Version {
    /// Maximum number of components (`major.minor.patch`)
    pub const MAX_COMPONENTS: usize = 3;

    /// Validate and wrap a version string
    pub fn parse(text: &str) -> Result<Self, ProtocolError> {
        let components: Vec<&str> = text.split('.').collect();
        if components.len() > Self::MAX_COMPONENTS {
            return Err(ProtocolError::Validation(format!(
                "version '{}' has more than {} components",
                text,
                Self::MAX_COMPONENTS
            )));
        }
        for component in &components {
            if component.is_empty() || !component.bytes().all(|b| b.is_ascii_digit()) {
                return Err(ProtocolError::Validation(format!(
                    "version '{}' contains invalid component '{}'",
                    text, component
                )));
            }
        }
        Ok(Self(text.to_string()))
    }

    /// Numeric components
    pub fn components(&self) -> Vec<u64> {
        self.0.split('.').filter_map(|c| c.parse().ok()).collect()
    }

    /// Version text
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Version {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl From<Version> for String {
    fn from(v: Version) -> Self {
        v.0
    }
}

/// YAML reads an unquoted `version: 1.10` as the number `1.1`
#[derive(Deserialize)]
#[serde(untagged)]
enum VersionRepr {
    Text(String),
    Integer(u64),
    Float(f64),
}

impl TryFrom<VersionRepr> for Version {
    type Error = ProtocolError;

    fn try_from(repr: VersionRepr) -> Result<Self, Self::Error> {
        let number = match repr {
            VersionRepr::Text(s) => return Self::parse(&s),
            VersionRepr::Integer(n) => n.to_string(),
            VersionRepr::Float(f) => f.to_string(),
        };
        Err(ProtocolError::Validation(format!(
            "version {} must be a quoted string (e.g. \"{}\")",
            number, number
        )))
    }
}

/// Field definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDef {
    /// Field name
    pub name: String,
    /// Field type
    #[serde(rename = "type")]
    pub field_type: FieldType,
    /// Unit (e.g. "deg", "m")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub units: Option<String>,
    /// Free-form note
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl FieldDef {
    /// Field with no units or note
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            field_type,
            units: None,
            note: None,
        }
    }
}

/// Sentence definition inside a protocol
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentenceDef {
    /// Sentence identifier (`GGA`, `PNORSUB8`, ...)
    pub sentence: String,
    /// Fields in order
    pub fields: Vec<FieldDef>,
    /// Description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Complete protocol definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProtocolDef {
    /// Protocol name
    pub protocol: String,
    /// Protocol version
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<Version>,
    /// Part of the NMEA standard
    #[serde(default)]
    pub standard: bool,
    /// Sentence definitions
    pub sentences: Vec<SentenceDef>,
}

impl ProtocolDef {
    /// Check what serde cannot express
    pub fn validate(&self) -> Result<(), ProtocolError> {
        if self.protocol.trim().is_empty() {
            return Err(ProtocolError::Validation("protocol name is empty".to_string()));
        }
        for sentence in &self.sentences {
            if sentence.sentence.is_empty() {
                return Err(ProtocolError::Validation(format!(
                    "protocol '{}' has a sentence with an empty identifier",
                    self.protocol
                )));
            }
            if let Some(field) = sentence.fields.iter().find(|f| f.name.is_empty()) {
                return Err(ProtocolError::Validation(format!(
                    "sentence '{}' has an unnamed {} field",
                    sentence.sentence, field.field_type
                )));
            }
        }
        Ok(())
    }
}

/// Top-level protocols document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProtocolsFile {
    /// Protocols
    pub protocols: Vec<ProtocolDef>,
}

impl ProtocolsFile {
    /// Load protocols from YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self, ProtocolError> {
        if yaml.trim().is_empty() {
            return Err(ProtocolError::Validation("protocols content is empty".to_string()));
        }
        let file: Self = serde_yaml::from_str(yaml)?;
        file.validate()?;
        Ok(file)
    }

    /// Load protocols from a YAML file
    pub fn from_path(path: &Path) -> Result<Self, ProtocolError> {
        let content = std::fs::read_to_string(path).map_err(|source| ProtocolError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(&content)
    }

    /// Wrap already parsed protocols
    pub fn from_protocols(protocols: Vec<ProtocolDef>) -> Result<Self, ProtocolError> {
        let file = Self { protocols };
        file.validate()?;
        Ok(file)
    }

    /// Validate every protocol
    pub fn validate(&self) -> Result<(), ProtocolError> {
        self.protocols.iter().try_for_each(ProtocolDef::validate)
    }

    /// Export to YAML
    pub fn to_yaml(&self) -> Result<String, ProtocolError> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Number of sentence definitions across all protocols
    pub fn sentence_count(&self) -> usize {
        self.protocols.iter().map(|p| p.sentences.len()).sum()
    }
}

/// Source of protocols for `Parser::add_protocols`
#[derive(Debug, Clone)]
pub enum ProtocolsInput {
    /// Path to a YAML file
    File(PathBuf),
    /// YAML text
    Content(String),
    /// Already parsed definitions
    Protocols(Vec<ProtocolDef>),
}

impl ProtocolsInput {
    /// Build from optional parts, exactly one of which must be set
    pub fn from_parts(
        file: Option<PathBuf>,
        content: Option<String>,
        protocols: Option<Vec<ProtocolDef>>,
    ) -> Result<Self, ProtocolError> {
        match (file, content, protocols) {
            (Some(file), None, None) => Ok(Self::File(file)),
            (None, Some(content), None) => Ok(Self::Content(content)),
            (None, None, Some(protocols)) => Ok(Self::Protocols(protocols)),
            (None, None, None) => Err(ProtocolError::InvalidInput(
                "one of file, content or protocols is required".to_string(),
            )),
            _ => Err(ProtocolError::InvalidInput(
                "only one of file, content or protocols may be given".to_string(),
            )),
        }
    }

    /// Read and validate the definitions
    pub fn load(self) -> Result<ProtocolsFile, ProtocolError> {
        match self {
            Self::File(path) => {
                if path.as_os_str().is_empty() {
                    return Err(ProtocolError::InvalidInput("protocols file path is empty".to_string()));
                }
                ProtocolsFile::from_path(&path)
            }
            Self::Content(content) => ProtocolsFile::from_yaml(&content),
            Self::Protocols(protocols) => ProtocolsFile::from_protocols(protocols),
        }
    }
}

/// JSON-Schema (draft-07) of the protocols file format
pub fn protocols_json_schema() -> serde_json::Value {
    let field = serde_json::json!({
        "type": "object",
        "properties": {
            "name": { "type": "string" },
            "type": { "type": "string", "enum": FieldType::SPELLINGS },
            "units": { "type": "string" },
            "note": { "type": "string" }
        },
        "required": ["name", "type"],
        "additionalProperties": false
    });
    let sentence = serde_json::json!({
        "type": "object",
        "properties": {
            "sentence": { "type": "string", "minLength": 1 },
            "fields": { "type": "array", "items": field },
            "description": { "type": "string" }
        },
        "required": ["sentence", "fields"],
        "additionalProperties": false
    });
    let protocol = serde_json::json!({
        "type": "object",
        "properties": {
            "protocol": { "type": "string" },
            "version": { "type": "string", "pattern": r"^\d+(\.\d+){0,2}$" },
            "standard": { "type": "boolean", "default": false },
            "sentences": { "type": "array", "items": sentence }
        },
        "required": ["protocol", "sentences"],
        "additionalProperties": false
    });
    serde_json::json!({
        "$schema": "http://json-schema.org/draft-07/schema#",
        "$ref": "#/definitions/NMEAProtocolsSchema",
        "definitions": {
            "NMEAProtocolsSchema": {
                "type": "object",
                "properties": {
                    "protocols": { "type": "array", "items": protocol }
                },
                "required": ["protocols"],
                "additionalProperties": false
            }
        }
    })
}

/// Write the JSON schema to `dir/filename` and return the full path
pub fn write_json_schema(dir: &Path, filename: Option<&str>) -> Result<PathBuf, ProtocolError> {
    let path = dir.join(filename.unwrap_or(JSON_SCHEMA_FILENAME));
    let content = serde_json::to_string_pretty(&protocols_json_schema())?;
    std::fs::write(&path, content).map_err(|source| ProtocolError::Io {
        path: path.clone(),
        source,
    })?;
    Ok(path)
}
