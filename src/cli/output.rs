//! Record formatting for the CLI

use clap::ValueEnum;
use std::fmt::Write as _;

use crate::core::catalog::ProtocolSummary;
use crate::core::parser::SentenceInfo;
use crate::core::protocol::nmea::NmeaSentence;

/// CLI output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text
    #[default]
    Text,
    /// JSON format for scripting (one object per line for records)
    Json,
    /// CSV format
    Csv,
}

/// Header line printed before CSV records
pub const CSV_HEADER: &str = "timestamp,sentence,talker,protocol,fields";

fn csv_escape(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

/// Format one decoded sentence
pub fn format_sentence(sentence: &NmeaSentence, format: OutputFormat) -> serde_json::Result<String> {
    let timestamp = sentence.timestamp().to_rfc3339();
    let talker = sentence.talker().map_or("", |t| t.id.as_str());
    match format {
        OutputFormat::Json => serde_json::to_string(sentence),
        OutputFormat::Csv => {
            let mut line = format!(
                "{},{},{},{}",
                timestamp,
                csv_escape(sentence.sentence()),
                csv_escape(talker),
                csv_escape(&sentence.protocol().name)
            );
            for field in sentence.fields() {
                line.push(',');
                line.push_str(&csv_escape(&field.data.to_string()));
            }
            Ok(line)
        }
        OutputFormat::Text => {
            let mut line = format!("{} {:<8}", timestamp, sentence.sentence());
            if !talker.is_empty() {
                let _ = write!(line, " [{}]", talker);
            }
            let _ = write!(line, " {}", sentence.protocol().name);
            let values: Vec<String> = match sentence {
                NmeaSentence::Known(known) => known
                    .fields
                    .iter()
                    .map(|f| format!("{}={}", f.definition.name, f.data))
                    .collect(),
                NmeaSentence::Unknown(unknown) => unknown.fields.iter().map(|f| f.data.to_string()).collect(),
            };
            if !values.is_empty() {
                let _ = write!(line, ": {}", values.join(" "));
            }
            Ok(line)
        }
    }
}

/// Format the catalog summary
pub fn format_summary(summary: &[ProtocolSummary], format: OutputFormat) -> serde_json::Result<String> {
    match format {
        OutputFormat::Json => serde_json::to_string_pretty(summary),
        OutputFormat::Csv => {
            let mut out = String::from("protocol,version,sentence");
            for group in summary {
                let version = group.version.as_ref().map_or("", |v| v.as_str());
                for id in &group.sentences {
                    let _ = write!(out, "\n{},{},{}", csv_escape(&group.protocol), version, csv_escape(id));
                }
            }
            Ok(out)
        }
        OutputFormat::Text => {
            let mut out = String::new();
            for group in summary {
                if !out.is_empty() {
                    out.push('\n');
                }
                match &group.version {
                    Some(version) => {
                        let _ = write!(out, "{} v{}", group.protocol, version);
                    }
                    None => out.push_str(&group.protocol),
                }
                let _ = write!(out, " ({}): {}", group.sentences.len(), group.sentences.join(", "));
            }
            Ok(out)
        }
    }
}

/// Format a catalog entry
pub fn format_info(info: &SentenceInfo, format: OutputFormat) -> serde_json::Result<String> {
    let def = &info.definition;
    match format {
        OutputFormat::Json => serde_json::to_string_pretty(info),
        OutputFormat::Csv => {
            let mut out = String::from("index,name,type,units,note");
            for (i, field) in def.fields.iter().enumerate() {
                let _ = write!(
                    out,
                    "\n{},{},{},{},{}",
                    i + 1,
                    csv_escape(&field.name),
                    field.field_type,
                    csv_escape(field.units.as_deref().unwrap_or_default()),
                    csv_escape(field.note.as_deref().unwrap_or_default())
                );
            }
            Ok(out)
        }
        OutputFormat::Text => {
            let mut out = format!("{} ({}", def.sentence, def.protocol.name);
            if let Some(version) = &def.protocol.version {
                let _ = write!(out, " v{}", version);
            }
            out.push(')');
            if let Some(description) = &def.description {
                let _ = write!(out, "\n  {}", description);
            }
            if let Some(talker) = &info.talker {
                let _ = write!(out, "\n  Talker: {} ({})", talker.id, talker.description);
            }
            for (i, field) in def.fields.iter().enumerate() {
                let _ = write!(out, "\n  {:>2}. {:<24} {:<8}", i + 1, field.name, field.field_type.name());
                if let Some(units) = &field.units {
                    let _ = write!(out, " [{}]", units);
                }
                if let Some(note) = &field.note {
                    let _ = write!(out, " {}", note);
                }
            }
            Ok(out)
        }
    }
}
