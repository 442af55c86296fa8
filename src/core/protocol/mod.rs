//! NMEA 0183 wire protocol
//!
//! Provides the building blocks of the streaming parser:
//! - XOR checksum
//! - Frame extraction (`$...*XX\r\n`)
//! - Talker identifiers
//! - Sentence decoding against a catalog

pub mod checksum;
pub mod framing;
pub mod nmea;
pub mod talker;

pub use checksum::calculate as calc_checksum;
pub use framing::{encode_frame, extract_frames, parse_frame, Extraction, FrameRejection, RawFrame};
pub use nmea::{decode, Data, DecodeError, KnownSentence, NmeaSentence, ParsedField, UnknownSentence};
pub use talker::Talker;
