//! Key-pattern sorting of mapping entries.

use regex::Regex;

use crate::{Map, TreeError, TreeResult};

/// Stable-sort entries by a key derived from named capture groups.
///
/// Each key must match `pattern`; the strings captured by `groups` (missing
/// optional groups capture as empty) are handed to `sort_key`, and entries are
/// reordered by the resulting key. Fails with [`TreeError::PatternMismatch`]
/// for the first key that does not match.
pub fn sort_by_keys_pattern<L, K, F>(
    map: &Map<L>,
    pattern: &Regex,
    groups: &[&str],
    sort_key: F,
) -> TreeResult<Map<L>>
where
    L: Clone,
    K: Ord,
    F: Fn(&[&str]) -> K,
{
    let mut entries = map
        .iter()
        .map(|(key, value)| {
            let captures = pattern
                .captures(key)
                .ok_or_else(|| TreeError::PatternMismatch { key: key.clone() })?;
            let captured: Vec<&str> = groups
                .iter()
                .map(|group| captures.name(group).map(|m| m.as_str()).unwrap_or(""))
                .collect();
            Ok((sort_key(&captured), key.clone(), value.clone()))
        })
        .collect::<TreeResult<Vec<_>>>()?;
    entries.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(entries
        .into_iter()
        .map(|(_, key, value)| (key, value))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{map_from_json, Json};
    use serde_json::json;

    fn tree(value: Json) -> Map<Json> {
        map_from_json(value).expect("test fixtures are objects")
    }

    #[test]
    fn numeric_sort_keys_beat_lexical_ordering() {
        let map = tree(json!({"v10_a": 2, "v2_a": 1}));
        let pattern = Regex::new(r"v(?P<n>\d+)_a").unwrap();
        let sorted = sort_by_keys_pattern(&map, &pattern, &["n"], |captured| {
            captured[0].parse::<u64>().unwrap_or(0)
        })
        .unwrap();
        let keys: Vec<_> = sorted.keys().cloned().collect();
        assert_eq!(keys, ["v2_a", "v10_a"]);
    }

    #[test]
    fn equal_sort_keys_preserve_insertion_order() {
        let map = tree(json!({"b_1": 1, "a_1": 2, "c_1": 3}));
        let pattern = Regex::new(r"[a-z]_(?P<n>\d)").unwrap();
        let sorted =
            sort_by_keys_pattern(&map, &pattern, &["n"], |captured| captured[0].to_owned())
                .unwrap();
        let keys: Vec<_> = sorted.keys().cloned().collect();
        assert_eq!(keys, ["b_1", "a_1", "c_1"]);
    }

    #[test]
    fn non_matching_keys_fail_with_the_offending_key() {
        let map = tree(json!({"v1": 1, "oops": 2}));
        let pattern = Regex::new(r"v(?P<n>\d+)").unwrap();
        let err = sort_by_keys_pattern(&map, &pattern, &["n"], |captured| captured[0].to_owned())
            .unwrap_err();
        match err {
            TreeError::PatternMismatch { key } => assert_eq!(key, "oops"),
            other => panic!("unexpected error: {other}"),
        }
    }
}
