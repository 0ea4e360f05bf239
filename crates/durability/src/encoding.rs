//! Canonical snapshot encoding
//!
//! A `KeyValueMap` has no iteration order, so it is serialized through an
//! ordered view: keys appear in ascending byte order. Equal mappings always
//! encode to identical bytes, which is what makes hash deduplication sound.

use snapkv_core::KeyValueMap;
use std::collections::BTreeMap;

/// Encode a mapping as a canonical JSON object
pub fn encode_map(map: &KeyValueMap) -> Result<Vec<u8>, serde_json::Error> {
    let ordered: BTreeMap<&str, &str> = map
        .iter()
        .map(|(key, value)| (key.as_str(), value.as_str()))
        .collect();
    serde_json::to_vec(&ordered)
}

/// Decode a JSON object of string keys and string values
///
/// Surrounding whitespace (including the trailing newline snapshot files
/// carry) is accepted.
pub fn decode_map(bytes: &[u8]) -> Result<KeyValueMap, serde_json::Error> {
    serde_json::from_slice(bytes)
}
