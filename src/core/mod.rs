//! Core module containing the main functionality of NMEAScope
//!
//! This module provides:
//! - NMEA 0183 wire protocol (checksum, framing, talkers, decoding)
//! - Protocol DSL (declarative sentence catalogs)
//! - Sentence catalog
//! - Streaming parser
//! - Sentence simulation

pub mod catalog;
pub mod parser;
pub mod protocol;
pub mod protocol_dsl;
pub mod simulator;
