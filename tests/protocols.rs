//! Catalog loading through the public API

use std::path::PathBuf;

use nmeascope_core::core::protocol_dsl::{write_json_schema, JSON_SCHEMA_FILENAME};
use nmeascope_core::{
    FieldDef, FieldType, Parser, ProtocolDef, ProtocolError, ProtocolSummary, ProtocolsFile, ProtocolsInput,
    SentenceDef,
};

const VENDOR_PROTOCOLS: [&str; 12] = [
    "GYROCOMPAS1", "Tokimek PTVG", "RDI ADCP", "SMCA", "SMCC",
    "NORSUB", "NORSUB2", "NORSUB6", "NORSUB7", "NORSUB7b", "NORSUB8", "NORSUB PRDID",
];

const VENDOR_SENTENCES: [&str; 13] = [
    "HEHDT", "PHTRO", "PHINF", "PTVG", "PRDID", "PSMCA", "PSMCC",
    "PNORSUB", "PNORSUB2", "PNORSUB6", "PNORSUB7", "PNORSUB7b", "PNORSUB8",
];

fn norsub_file() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/norsub.yaml")
}

fn assert_vendor_catalog(parser: &Parser) {
    let summary = parser.protocols();
    let names: Vec<&str> = summary.iter().map(|p| p.protocol.as_str()).collect();
    assert!(names.contains(&"NMEA"));
    for protocol in VENDOR_PROTOCOLS {
        assert!(names.contains(&protocol), "protocol {} missing", protocol);
    }

    let ids: Vec<&str> = parser.sentences().map(|s| s.sentence.as_str()).collect();
    for id in ["AAM", "GGA"].into_iter().chain(VENDOR_SENTENCES) {
        assert!(ids.contains(&id), "sentence {} missing", id);
    }
}

#[test]
fn test_standard_catalog() {
    let parser = Parser::new().unwrap();
    let summary = parser.protocols();
    assert_eq!(summary.len(), 1);
    assert_eq!(summary[0].protocol, "NMEA");
    assert!(summary[0].sentences.iter().any(|s| s == "GGA"));
    assert!(summary[0].sentences.iter().any(|s| s == "AAM"));
}

#[test]
fn test_add_protocols_file() {
    let mut parser = Parser::new().unwrap();
    let applied = parser.add_protocols(ProtocolsInput::File(norsub_file())).unwrap();
    assert_eq!(applied, 14);
    assert_vendor_catalog(&parser);
}

#[test]
fn test_add_protocols_content() {
    let content = std::fs::read_to_string(norsub_file()).unwrap();
    let mut parser = Parser::new().unwrap();
    parser.add_protocols(ProtocolsInput::Content(content)).unwrap();
    assert_vendor_catalog(&parser);
}

#[test]
fn test_add_protocols_parsed() {
    let file = ProtocolsFile::from_path(&norsub_file()).unwrap();
    let mut parser = Parser::new().unwrap();
    parser.add_protocols(ProtocolsInput::Protocols(file.protocols)).unwrap();
    assert_vendor_catalog(&parser);
}

#[test]
fn test_norsub8_summary() {
    let mut parser = Parser::new().unwrap();
    parser.add_protocols(ProtocolsInput::File(norsub_file())).unwrap();

    let norsub8 = parser.protocols().into_iter().find(|p| p.protocol == "NORSUB8").unwrap();
    assert_eq!(
        norsub8,
        ProtocolSummary { protocol: "NORSUB8".into(), version: None, sentences: vec!["PNORSUB8".into()] }
    );

    let stored = parser.catalog().get("PNORSUB8").unwrap();
    assert_eq!(stored.fields.len(), 24);
    assert_eq!(stored.fields[0], FieldDef { units: Some("us".into()), ..FieldDef::new("time", FieldType::Uint32) });
    assert_eq!(stored.fields[4].note.as_deref(), Some("From 0 to 360"));
    assert_eq!(stored.fields[2].field_type, FieldType::Float64);
    assert!(!stored.protocol.standard);
    assert_eq!(
        stored.description.as_deref(),
        Some("The whole regular attitude information from the MRU")
    );
}

#[test]
fn test_later_definition_wins() {
    let mut parser = Parser::new().unwrap();
    parser.add_protocols(ProtocolsInput::File(norsub_file())).unwrap();
    // PRDID is defined by both RDI ADCP and NORSUB PRDID
    assert_eq!(parser.catalog().get("PRDID").unwrap().protocol.name, "NORSUB PRDID");

    let hdt = ProtocolDef {
        protocol: "CUSTOM".into(),
        version: None,
        standard: false,
        sentences: vec![SentenceDef {
            sentence: "HDT".into(),
            fields: vec![FieldDef::new("heading", FieldType::Float64)],
            description: None,
        }],
    };
    parser.add_protocols(ProtocolsInput::Protocols(vec![hdt])).unwrap();
    let stored = parser.catalog().get("HDT").unwrap();
    assert_eq!(stored.protocol.name, "CUSTOM");
    assert_eq!(stored.fields.len(), 1);
}

#[test]
fn test_add_protocols_errors() {
    let mut parser = Parser::new().unwrap();

    let missing = ProtocolsInput::from_parts(None, None, None);
    assert!(matches!(missing, Err(ProtocolError::InvalidInput(_))));

    let empty_path = parser.add_protocols(ProtocolsInput::File(PathBuf::new()));
    assert!(matches!(empty_path, Err(ProtocolError::InvalidInput(_))));

    let empty_content = parser.add_protocols(ProtocolsInput::Content(String::new()));
    assert!(empty_content.unwrap_err().is_validation());

    let not_a_list = parser.add_protocols(ProtocolsInput::Content("protocols: {}".into()));
    assert!(not_a_list.unwrap_err().is_validation());

    let bad_version = "protocols:\n  - protocol: X\n    version: 1.2.3.4\n    sentences: []\n";
    assert!(parser.add_protocols(ProtocolsInput::Content(bad_version.into())).unwrap_err().is_validation());

    let bad_type = "protocols:\n  - protocol: X\n    sentences:\n      - sentence: PX\n        fields:\n          - { name: a, type: quad }\n";
    assert!(parser.add_protocols(ProtocolsInput::Content(bad_type.into())).unwrap_err().is_validation());

    let missing_file = parser.add_protocols(ProtocolsInput::File("does/not/exist.yaml".into()));
    assert!(matches!(missing_file, Err(ProtocolError::Io { .. })));

    assert_eq!(parser.protocols().len(), 1);
}

#[test]
fn test_schema_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_json_schema(dir.path(), None).unwrap();
    assert_eq!(path.file_name().unwrap(), JSON_SCHEMA_FILENAME);

    let schema: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(schema["$ref"], "#/definitions/NMEAProtocolsSchema");
}
