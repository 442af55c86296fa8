//! NMEA 0183 sentence decoding
//!
//! Turns validated [`RawFrame`]s into typed sentences using the definitions
//! held by a [`Catalog`]. Identifiers are matched directly first (`PNORSUB8`,
//! `HEHDT`), then with the talker prefix stripped (`GPGGA` -> `GGA`). Frames
//! that match nothing, or whose fields do not fit the matched definition,
//! come out as [`NmeaSentence::Unknown`] rather than being dropped.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::framing::RawFrame;
use super::talker::{self, Talker};
use crate::core::catalog::{Catalog, ProtocolInfo, StoredSentence};
use crate::core::protocol_dsl::{FieldDef, FieldType};

/// Length of the sentence code that follows the talker prefix
pub const NMEA_ID_LENGTH: usize = 3;

/// Name given to every field of an unknown sentence
pub const UNKNOWN_FIELD: &str = "unknown";

/// Decoded field value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Data {
    /// Empty field
    Null,
    /// Boolean
    Boolean(bool),
    /// Any integer type
    Integer(i64),
    /// Integer above `i64::MAX`
    Unsigned(u64),
    /// Any floating point type
    Float(f64),
    /// Text
    String(String),
}

impl Data {
    /// Numeric value, if any
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Integer(v) => Some(*v as f64),
            Self::Unsigned(v) => Some(*v as f64),
            Self::Float(v) => Some(*v),
            _ => None,
        }
    }

    /// Integer value, if any and if it fits
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Integer(v) => Some(*v),
            Self::Unsigned(v) => i64::try_from(*v).ok(),
            _ => None,
        }
    }

    /// Non-negative integer value, if any
    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Self::Integer(v) => u64::try_from(*v).ok(),
            Self::Unsigned(v) => Some(*v),
            _ => None,
        }
    }

    /// Text value, if any
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(v) => Some(v),
            _ => None,
        }
    }

    /// Boolean value, if any
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Boolean(v) => Some(*v),
            _ => None,
        }
    }

    /// Field was empty
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }
}

impl fmt::Display for Data {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => Ok(()),
            Self::Boolean(v) => write!(f, "{}", v),
            Self::Integer(v) => write!(f, "{}", v),
            Self::Unsigned(v) => write!(f, "{}", v),
            Self::Float(v) => write!(f, "{}", v),
            Self::String(v) => f.write_str(v),
        }
    }
}

/// Field definition together with its decoded value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedField {
    /// Definition the value was decoded with
    #[serde(flatten)]
    pub definition: FieldDef,
    /// Decoded value
    pub data: Data,
}

/// Sentence matched against the catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KnownSentence {
    /// Time the chunk containing this sentence was parsed
    pub timestamp: DateTime<Utc>,
    /// Complete frame
    pub raw: String,
    /// Catalog identifier (talker prefix removed when matched through it)
    pub sentence: String,
    /// Transmitted checksum
    pub checksum: u8,
    /// Owning protocol
    pub protocol: ProtocolInfo,
    /// Description from the catalog
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Talker, when matched through a talker prefix
    pub talker: Option<Talker>,
    /// Decoded fields
    pub fields: Vec<ParsedField>,
    /// Decoded values, in field order
    pub data: Vec<Data>,
}

impl KnownSentence {
    /// Value of the field called `name`
    pub fn value(&self, name: &str) -> Option<&Data> {
        self.fields
            .iter()
            .find(|f| f.definition.name == name)
            .map(|f| &f.data)
    }
}

/// Sentence missing from the catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnknownSentence {
    /// Time the chunk containing this sentence was parsed
    pub timestamp: DateTime<Utc>,
    /// Complete frame
    pub raw: String,
    /// Identifier as received
    pub sentence: String,
    /// Transmitted checksum
    pub checksum: u8,
    /// Always [`ProtocolInfo::UNKNOWN`]
    pub protocol: ProtocolInfo,
    /// Always `None`
    pub talker: Option<Talker>,
    /// Raw fields as strings
    pub fields: Vec<ParsedField>,
}

impl UnknownSentence {
    fn from_frame(frame: RawFrame, timestamp: DateTime<Utc>) -> Self {
        let fields = frame
            .fields
            .into_iter()
            .map(|value| ParsedField {
                definition: FieldDef::new(UNKNOWN_FIELD, FieldType::String),
                data: Data::String(value),
            })
            .collect();
        Self {
            timestamp,
            raw: frame.raw,
            sentence: frame.sentence,
            checksum: frame.checksum,
            protocol: ProtocolInfo::unknown(),
            talker: None,
            fields,
        }
    }
}

/// Decoded sentence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum NmeaSentence {
    /// Matched a catalog definition
    Known(KnownSentence),
    /// Did not match
    Unknown(UnknownSentence),
}

impl NmeaSentence {
    /// Identifier (catalog id for known sentences, as received otherwise)
    pub fn sentence(&self) -> &str {
        match self {
            Self::Known(s) => &s.sentence,
            Self::Unknown(s) => &s.sentence,
        }
    }

    /// Complete frame
    pub fn raw(&self) -> &str {
        match self {
            Self::Known(s) => &s.raw,
            Self::Unknown(s) => &s.raw,
        }
    }

    /// Transmitted checksum
    pub fn checksum(&self) -> u8 {
        match self {
            Self::Known(s) => s.checksum,
            Self::Unknown(s) => s.checksum,
        }
    }

    /// Parse time
    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            Self::Known(s) => s.timestamp,
            Self::Unknown(s) => s.timestamp,
        }
    }

    /// Owning protocol
    pub fn protocol(&self) -> &ProtocolInfo {
        match self {
            Self::Known(s) => &s.protocol,
            Self::Unknown(s) => &s.protocol,
        }
    }

    /// Talker, if resolved
    pub fn talker(&self) -> Option<&Talker> {
        match self {
            Self::Known(s) => s.talker.as_ref(),
            Self::Unknown(s) => s.talker.as_ref(),
        }
    }

    /// Decoded fields
    pub fn fields(&self) -> &[ParsedField] {
        match self {
            Self::Known(s) => &s.fields,
            Self::Unknown(s) => &s.fields,
        }
    }

    /// Known sentence, if matched
    pub fn as_known(&self) -> Option<&KnownSentence> {
        match self {
            Self::Known(s) => Some(s),
            Self::Unknown(_) => None,
        }
    }

    /// Matched a catalog definition
    pub fn is_known(&self) -> bool {
        matches!(self, Self::Known(_))
    }
}

/// Field coercion failures
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    /// Field count differs from the definition
    #[error("{sentence} has {expected} fields but the frame carries {found}")]
    FieldCount {
        /// Matched identifier
        sentence: String,
        /// Fields in the definition
        expected: usize,
        /// Fields in the frame
        found: usize,
    },
    /// No integer at the start of the text
    #[error("invalid integer '{value}' for {field_type} field")]
    InvalidInteger {
        /// Field text
        value: String,
        /// Declared type
        field_type: FieldType,
    },
    /// Integer is outside `i64::MIN..=u64::MAX`
    #[error("integer '{value}' out of range for {field_type} field")]
    IntegerOverflow {
        /// Field text
        value: String,
        /// Declared type
        field_type: FieldType,
    },
    /// No number at the start of the text
    #[error("invalid float number '{value}' for {field_type} field")]
    InvalidFloat {
        /// Field text
        value: String,
        /// Declared type
        field_type: FieldType,
    },
}

/// Coerce one field's text to its declared type
///
/// Empty text is [`Data::Null`] whatever the type. Any other text is a `true`
/// boolean, `"false"` included. Numbers are read from the leading numeric
/// part of the text, so `"12.5"` in an integer field gives `12` and `"0x1A"`
/// gives `26`.
pub fn coerce_field(text: &str, field_type: FieldType) -> Result<Data, DecodeError> {
    if text.is_empty() {
        return Ok(Data::Null);
    }
    match field_type {
        FieldType::String => Ok(Data::String(text.to_string())),
        FieldType::Boolean => Ok(Data::Boolean(true)),
        t if t.is_float() => parse_float_prefix(text)
            .map(Data::Float)
            .ok_or_else(|| DecodeError::InvalidFloat { value: text.to_string(), field_type }),
        _ => {
            let value = parse_integer_prefix(text)
                .ok_or_else(|| DecodeError::InvalidInteger { value: text.to_string(), field_type })?;
            i64::try_from(value)
                .map(Data::Integer)
                .or_else(|_| u64::try_from(value).map(Data::Unsigned))
                .map_err(|_| DecodeError::IntegerOverflow { value: text.to_string(), field_type })
        }
    }
}

/// Leading `[+-]?(0x)?digits` of `text`, saturating far outside the 64-bit range
fn parse_integer_prefix(text: &str) -> Option<i128> {
    let trimmed = text.trim_start();
    let (negative, rest) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };
    let (radix, digits) = match rest.get(..2) {
        Some("0x" | "0X") => (16, &rest[2..]),
        _ => (10, rest),
    };

    let mut value: i128 = 0;
    let mut count = 0;
    for digit in digits.chars().map_while(|c| c.to_digit(radix)) {
        value = value.saturating_mul(i128::from(radix)).saturating_add(i128::from(digit));
        count += 1;
    }
    if count == 0 {
        return None;
    }
    Some(if negative { -value } else { value })
}

fn parse_float_prefix(text: &str) -> Option<f64> {
    let trimmed = text.trim_start();
    let bytes = trimmed.as_bytes();
    let mut end = usize::from(matches!(bytes.first(), Some(b'+' | b'-')));

    if trimmed[end..].starts_with("Infinity") {
        return trimmed[..end + "Infinity".len()].replace("Infinity", "inf").parse().ok();
    }

    let count_digits = |from: usize| bytes[from..].iter().take_while(|b| b.is_ascii_digit()).count();

    let int_digits = count_digits(end);
    end += int_digits;
    let mut frac_digits = 0;
    if bytes.get(end) == Some(&b'.') {
        frac_digits = count_digits(end + 1);
        if int_digits > 0 || frac_digits > 0 {
            end += 1 + frac_digits;
        }
    }
    if int_digits == 0 && frac_digits == 0 {
        return None;
    }
    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let exp_sign = usize::from(matches!(bytes.get(end + 1), Some(b'+' | b'-')));
        let exp_digits = count_digits(end + 1 + exp_sign);
        if exp_digits > 0 {
            end += 1 + exp_sign + exp_digits;
        }
    }
    trimmed[..end].parse().ok()
}

/// Split `GPGGA` into `("GP", "GGA")`
///
/// Identifiers of [`NMEA_ID_LENGTH`] characters or fewer have no talker.
pub fn split_talker(sentence: &str) -> Option<(&str, &str)> {
    let (index, _) = sentence.char_indices().rev().nth(NMEA_ID_LENGTH - 1)?;
    if index == 0 {
        return None;
    }
    Some(sentence.split_at(index))
}

fn decode_fields(frame: &RawFrame, stored: &StoredSentence) -> Result<Vec<ParsedField>, DecodeError> {
    if stored.fields.len() != frame.fields.len() {
        return Err(DecodeError::FieldCount {
            sentence: stored.sentence.clone(),
            expected: stored.fields.len(),
            found: frame.fields.len(),
        });
    }
    stored
        .fields
        .iter()
        .zip(&frame.fields)
        .map(|(definition, text)| {
            Ok(ParsedField {
                definition: definition.clone(),
                data: coerce_field(text, definition.field_type)?,
            })
        })
        .collect()
}

fn decode_known(
    frame: &RawFrame,
    stored: &StoredSentence,
    talker: Option<Talker>,
    timestamp: DateTime<Utc>,
) -> Option<KnownSentence> {
    match decode_fields(frame, stored) {
        Ok(fields) => Some(KnownSentence {
            timestamp,
            raw: frame.raw.clone(),
            sentence: stored.sentence.clone(),
            checksum: frame.checksum,
            protocol: stored.protocol.clone(),
            description: stored.description.clone(),
            talker,
            data: fields.iter().map(|f| f.data.clone()).collect(),
            fields,
        }),
        Err(e) => {
            tracing::debug!("Invalid {} frame {:?}: {}", stored.sentence, frame.raw, e);
            None
        }
    }
}

/// Decode a frame against the catalog
///
/// Never fails: anything that cannot be decoded as a known sentence is
/// returned as [`NmeaSentence::Unknown`].
pub fn decode(frame: RawFrame, timestamp: DateTime<Utc>, catalog: &Catalog) -> NmeaSentence {
    if let Some(stored) = catalog.get(&frame.sentence) {
        if let Some(known) = decode_known(&frame, stored, None, timestamp) {
            return NmeaSentence::Known(known);
        }
    }

    if let Some((prefix, core)) = split_talker(&frame.sentence) {
        if let Some(stored) = catalog.get(core) {
            if let Some(known) = decode_known(&frame, stored, Some(talker::resolve(prefix)), timestamp) {
                return NmeaSentence::Known(known);
            }
        }
    }

    tracing::debug!("Unknown NMEA sentence {}", frame.sentence);
    NmeaSentence::Unknown(UnknownSentence::from_frame(frame, timestamp))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::protocol::framing::{encode_frame, parse_frame};
    use crate::core::protocol_dsl::ProtocolsFile;

    const GGA: &str = "$GPGGA,074844.199,3652.514,N,00225.679,W,1,12,1.0,0.0,M,0.0,M,,*79\r\n";

    const TEST_PROTOCOLS: &str = r#"
protocols:
  - protocol: TESTING
    version: "1.2.3"
    sentences:
      - sentence: PTEST
        description: Invented sentence
        fields:
          - { name: latitude, type: number, units: deg }
          - { name: count, type: int16 }
          - { name: flag, type: boolean }
          - { name: label, type: string }
      - sentence: HEHDT
        fields:
          - { name: heading, type: float }
          - { name: reference, type: string }
"#;

    fn catalog() -> Catalog {
        let mut catalog = Catalog::standard().unwrap();
        catalog.merge(&ProtocolsFile::from_yaml(TEST_PROTOCOLS).unwrap());
        catalog
    }

    fn decode_text(text: &str) -> NmeaSentence {
        decode(parse_frame(text).unwrap(), Utc::now(), &catalog())
    }

    #[test]
    fn test_gga_with_talker() {
        let sentence = decode_text(GGA);
        let gga = sentence.as_known().expect("GGA should be known");
        assert_eq!(gga.sentence, "GGA");
        assert_eq!(gga.raw, GGA);
        assert_eq!(gga.checksum, 0x79);
        assert_eq!(
            gga.talker,
            Some(Talker { id: "GP".into(), description: "Global Positioning System receiver".into() })
        );
        assert_eq!(gga.protocol.name, "NMEA");
        assert_eq!(gga.data.len(), 14);
        assert_eq!(gga.value("utc_time"), Some(&Data::String("074844.199".into())));
        assert_eq!(gga.value("latitude"), Some(&Data::Float(3652.514)));
        assert_eq!(gga.value("satellites_used"), Some(&Data::Integer(12)));
        assert_eq!(gga.value("dgps_station_id"), Some(&Data::Null));
    }

    #[test]
    fn test_direct_match_has_no_talker() {
        let frame = encode_frame("PTEST", &["1.5", "-3", "false", "abc"]);
        let sentence = decode_text(&frame);
        let known = sentence.as_known().unwrap();
        assert_eq!(known.sentence, "PTEST");
        assert!(known.talker.is_none());
        assert_eq!(
            known.data,
            vec![Data::Float(1.5), Data::Integer(-3), Data::Boolean(true), Data::String("abc".into())]
        );
        assert_eq!(known.protocol.version.as_ref().map(|v| v.as_str()), Some("1.2.3"));

        let frame = encode_frame("HEHDT", &["123.4", "T"]);
        assert!(decode_text(&frame).as_known().unwrap().talker.is_none());
    }

    #[test]
    fn test_user_and_unknown_talkers() {
        let aam = ["A", "A", "0.10", "N", "WPTNME"];
        let u8aam = decode_text(&encode_frame("U8AAM", &aam));
        assert_eq!(u8aam.talker().unwrap().description, "User Configured");

        let xxaam = decode_text(&encode_frame("XXAAM", &aam));
        assert_eq!(xxaam.talker(), Some(&Talker { id: "XX".into(), description: "unknown".into() }));
    }

    #[test]
    fn test_unknown_sentence() {
        let frame = encode_frame("GPXYZ", &["1", "", "B"]);
        let sentence = decode_text(&frame);
        match sentence {
            NmeaSentence::Unknown(unknown) => {
                assert_eq!(unknown.sentence, "GPXYZ");
                assert_eq!(unknown.protocol.name, "UNKNOWN");
                assert!(unknown.talker.is_none());
                assert_eq!(unknown.fields.len(), 3);
                assert!(unknown.fields.iter().all(|f| f.definition.name == "unknown"
                    && f.definition.field_type == FieldType::String));
                assert_eq!(unknown.fields[1].data, Data::String(String::new()));
            }
            NmeaSentence::Known(_) => panic!("expected unknown sentence"),
        }
    }

    #[test]
    fn test_field_count_mismatch_is_unknown() {
        let sentence = decode_text(&encode_frame("GPHDT", &["10.0", "T", "extra"]));
        assert!(!sentence.is_known());
        assert_eq!(sentence.sentence(), "GPHDT");
    }

    #[test]
    fn test_coercion_failure_is_unknown() {
        let sentence = decode_text(&encode_frame("PTEST", &["north", "1", "", ""]));
        assert!(!sentence.is_known());
        let sentence = decode_text(&encode_frame("GPZDA", &["120000", "x", "1", "2024", "0", "0"]));
        assert!(!sentence.is_known());
    }

    #[test]
    fn test_coerce_field() {
        assert_eq!(coerce_field("", FieldType::Int32), Ok(Data::Null));
        assert_eq!(coerce_field("", FieldType::Boolean), Ok(Data::Null));
        assert_eq!(coerce_field("", FieldType::String), Ok(Data::Null));
        assert_eq!(coerce_field("0", FieldType::Boolean), Ok(Data::Boolean(true)));
        assert_eq!(coerce_field("false", FieldType::Boolean), Ok(Data::Boolean(true)));
        assert_eq!(coerce_field("42", FieldType::Uint8), Ok(Data::Integer(42)));
        assert_eq!(coerce_field("-7", FieldType::Int8), Ok(Data::Integer(-7)));
        assert_eq!(coerce_field("12.9", FieldType::Int32), Ok(Data::Integer(12)));
        assert_eq!(coerce_field(" 5x", FieldType::Int32), Ok(Data::Integer(5)));
        assert!(matches!(coerce_field("x5", FieldType::Int32), Err(DecodeError::InvalidInteger { .. })));
        assert!(matches!(coerce_field("-", FieldType::Int32), Err(DecodeError::InvalidInteger { .. })));
        assert!(matches!(
            coerce_field("99999999999999999999", FieldType::Uint64),
            Err(DecodeError::IntegerOverflow { .. })
        ));
        assert!(matches!(
            coerce_field("-9223372036854775809", FieldType::Int64),
            Err(DecodeError::IntegerOverflow { .. })
        ));
        assert_eq!(coerce_field("3.25", FieldType::Float32), Ok(Data::Float(3.25)));
        assert_eq!(coerce_field("-1e3", FieldType::Float64), Ok(Data::Float(-1000.0)));
        assert_eq!(coerce_field(".5", FieldType::Number), Ok(Data::Float(0.5)));
        assert_eq!(coerce_field("7.", FieldType::Number), Ok(Data::Float(7.0)));
        assert_eq!(coerce_field("1.5e", FieldType::Number), Ok(Data::Float(1.5)));
        assert_eq!(coerce_field("2.5M", FieldType::Number), Ok(Data::Float(2.5)));
        assert_eq!(coerce_field("Infinity", FieldType::Number), Ok(Data::Float(f64::INFINITY)));
        assert_eq!(coerce_field("-Infinity", FieldType::Number), Ok(Data::Float(f64::NEG_INFINITY)));
        assert!(matches!(coerce_field("N", FieldType::Float64), Err(DecodeError::InvalidFloat { .. })));
        assert!(matches!(coerce_field(".", FieldType::Float64), Err(DecodeError::InvalidFloat { .. })));
    }

    #[test]
    fn test_coerce_unsigned_64() {
        assert_eq!(
            coerce_field("18446744073709551615", FieldType::Uint64),
            Ok(Data::Unsigned(u64::MAX))
        );
        assert_eq!(
            coerce_field("9223372036854775808", FieldType::Uint64),
            Ok(Data::Unsigned(1 << 63))
        );
        assert_eq!(
            coerce_field("9223372036854775807", FieldType::Uint64),
            Ok(Data::Integer(i64::MAX))
        );
        assert_eq!(Data::Unsigned(u64::MAX).as_u64(), Some(u64::MAX));
        assert_eq!(Data::Unsigned(u64::MAX).as_i64(), None);
        assert_eq!(Data::Integer(-1).as_u64(), None);
    }

    #[test]
    fn test_coerce_hex_integer() {
        assert_eq!(coerce_field("0x1A", FieldType::Int32), Ok(Data::Integer(26)));
        assert_eq!(coerce_field("-0Xff", FieldType::Int32), Ok(Data::Integer(-255)));
        assert_eq!(coerce_field("0x1g", FieldType::Int32), Ok(Data::Integer(1)));
        assert_eq!(coerce_field("0b1", FieldType::Int32), Ok(Data::Integer(0)));
        assert!(matches!(coerce_field("0x", FieldType::Int32), Err(DecodeError::InvalidInteger { .. })));
    }

    #[test]
    fn test_split_talker() {
        assert_eq!(split_talker("GPGGA"), Some(("GP", "GGA")));
        assert_eq!(split_talker("U8AAM"), Some(("U8", "AAM")));
        assert_eq!(split_talker("PGGA"), Some(("P", "GGA")));
        assert_eq!(split_talker("GGA"), None);
        assert_eq!(split_talker("GG"), None);
        assert_eq!(split_talker(""), None);
    }

    #[test]
    fn test_serialize_sentence() {
        let json = serde_json::to_value(decode_text(GGA)).unwrap();
        assert_eq!(json["kind"], "known");
        assert_eq!(json["sentence"], "GGA");
        assert_eq!(json["talker"]["id"], "GP");
        assert_eq!(json["fields"][0]["name"], "utc_time");
        assert_eq!(json["fields"][0]["type"], "string");
        assert_eq!(json["data"][6], 12);
        assert!(json["data"][13].is_null());
    }
}
