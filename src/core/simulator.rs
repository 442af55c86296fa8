//! Sentence simulator
//!
//! Synthesizes random but well-formed frames from catalog definitions, for
//! feeding parsers and devices under test without real hardware.

use rand::distributions::Alphanumeric;
use rand::Rng;

use super::catalog::{Catalog, StoredSentence};
use super::protocol::framing::encode_frame;
use super::protocol::nmea::{split_talker, NMEA_ID_LENGTH};
use super::protocol_dsl::FieldType;

/// Longest synthesized string field
pub const MAX_STRING_LENGTH: usize = 12;

/// Upper bound of synthesized `float32` values
const FLOAT32_RANGE: f32 = 838_860.8;

/// Upper bound of synthesized `float64` and `number` values
const FLOAT64_RANGE: f64 = 9_007_199_254_740.0;

/// Random text for a field of `field_type`
///
/// The text always coerces back to the same type: integers are in range for
/// their width, floats are finite, strings are alphanumeric.
pub fn random_value<R: Rng + ?Sized>(field_type: FieldType, rng: &mut R) -> String {
    match field_type {
        FieldType::Int8 => rng.gen::<i8>().to_string(),
        FieldType::Int16 => rng.gen::<i16>().to_string(),
        FieldType::Int32 => rng.gen::<i32>().to_string(),
        FieldType::Int64 => rng.gen::<i64>().to_string(),
        FieldType::Uint8 => rng.gen::<u8>().to_string(),
        FieldType::Uint16 => rng.gen::<u16>().to_string(),
        FieldType::Uint32 => rng.gen::<u32>().to_string(),
        FieldType::Uint64 => rng.gen::<u64>().to_string(),
        FieldType::Float32 => rng.gen_range(0.0..FLOAT32_RANGE).to_string(),
        FieldType::Float64 | FieldType::Number => rng.gen_range(0.0..FLOAT64_RANGE).to_string(),
        FieldType::Boolean => rng.gen_bool(0.5).to_string(),
        FieldType::String => {
            let len = rng.gen_range(1..=MAX_STRING_LENGTH);
            rng.sample_iter(Alphanumeric).take(len).map(char::from).collect()
        }
    }
}

/// Frame for `stored` sent under the identifier `id`
pub fn synthesize_with<R: Rng + ?Sized>(stored: &StoredSentence, id: &str, rng: &mut R) -> String {
    let values: Vec<String> = stored
        .fields
        .iter()
        .map(|field| random_value(field.field_type, rng))
        .collect();
    encode_frame(id, &values)
}

/// [`synthesize_with`] using the thread-local generator
pub fn synthesize(stored: &StoredSentence, id: &str) -> String {
    synthesize_with(stored, id, &mut rand::thread_rng())
}

/// Random frame for `id`
///
/// `id` is looked up directly first, then as talker plus sentence code
/// (`GPGGA`). The returned frame carries `id` unchanged. Returns `None` for
/// identifiers shorter than a sentence code or missing from the catalog.
pub fn fake_sentence(catalog: &Catalog, id: &str) -> Option<String> {
    if id.chars().count() < NMEA_ID_LENGTH {
        return None;
    }
    if let Some(stored) = catalog.get(id) {
        return Some(synthesize(stored, id));
    }
    let (_, core) = split_talker(id)?;
    catalog.get(core).map(|stored| synthesize(stored, id))
}
