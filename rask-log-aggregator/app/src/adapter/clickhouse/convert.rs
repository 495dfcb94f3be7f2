use std::collections::HashMap;

/// Convert string to fixed-size byte array for FixedString columns
/// Pads with zeros if shorter, truncates if longer
#[must_use]
pub fn string_to_fixed_bytes<const N: usize>(s: &str) -> [u8; N] {
    let mut result = [0u8; N];
    let bytes = s.as_bytes();
    let len = bytes.len().min(N);
    result[..len].copy_from_slice(&bytes[..len]);
    result
}

/// Convert HashMap to Vec for ClickHouse Map type
#[must_use]
pub fn hashmap_to_vec<S: ::std::hash::BuildHasher>(
    map: HashMap<String, String, S>,
) -> Vec<(String, String)> {
    map.into_iter().collect()
}
