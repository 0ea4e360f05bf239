//! Key-value mapping type
//!
//! Keys are unique and carry no ordering guarantee. Only the store actor
//! mutates a live `KeyValueMap`; every other component works on copies.

use std::collections::HashMap;

/// Mapping from string key to string value
pub type KeyValueMap = HashMap<String, String>;

/// Build a single-entry mapping `{key: value}`
///
/// This is the shape of a successful GET result.
pub fn single_entry(key: impl Into<String>, value: impl Into<String>) -> KeyValueMap {
    let mut map = KeyValueMap::with_capacity(1);
    map.insert(key.into(), value.into());
    map
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_entry() {
        let map = single_entry("key1", "value1");
        assert_eq!(map.len(), 1);
        assert_eq!(map.get("key1").map(String::as_str), Some("value1"));
    }
}
