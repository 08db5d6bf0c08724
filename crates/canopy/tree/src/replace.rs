//! Entry-to-entry substitution rules.

use std::fmt::Display;
use std::hash::Hash;

use indexmap::IndexMap;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::{TreeError, TreeResult};

/// One substitution rule: `dst` receives the contents of `src` with `find`
/// replaced by `repl`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Repl<K> {
    /// Source entry to read from.
    pub src: K,
    /// Destination entry to write to.
    pub dst: K,
    /// Substring (or pattern, for [`replace_pattern`]) to find in the source.
    pub find: String,
    /// Replacement for what was found.
    pub repl: String,
}

impl<K> Repl<K> {
    pub fn new(src: K, dst: K, find: impl Into<String>, repl: impl Into<String>) -> Self {
        Self {
            src,
            dst,
            find: find.into(),
            repl: repl.into(),
        }
    }
}

/// Apply literal substring substitutions, rule by rule.
///
/// Rules run in order and write their result back before the next rule runs,
/// so later rules may read entries written by earlier ones. Fails with
/// [`TreeError::MissingKey`] when a rule's source entry is absent.
pub fn replace<K>(map: &mut IndexMap<K, String>, repls: &[Repl<K>]) -> TreeResult<()>
where
    K: Hash + Eq + Clone + Display,
{
    for repl in repls {
        let source = lookup(map, &repl.src)?;
        let replaced = source.replace(&repl.find, &repl.repl);
        map.insert(repl.dst.clone(), replaced);
    }
    Ok(())
}

/// Apply regular-expression substitutions, rule by rule.
///
/// Same sequencing as [`replace`]; `find` is compiled per rule and an invalid
/// pattern fails with [`TreeError::InvalidPattern`].
pub fn replace_pattern<K>(map: &mut IndexMap<K, String>, repls: &[Repl<K>]) -> TreeResult<()>
where
    K: Hash + Eq + Clone + Display,
{
    for repl in repls {
        let pattern = Regex::new(&repl.find)?;
        let source = lookup(map, &repl.src)?;
        let replaced = pattern.replace_all(source, repl.repl.as_str()).into_owned();
        map.insert(repl.dst.clone(), replaced);
    }
    Ok(())
}

fn lookup<'m, K>(map: &'m IndexMap<K, String>, key: &K) -> TreeResult<&'m String>
where
    K: Hash + Eq + Display,
{
    map.get(key).ok_or_else(|| TreeError::MissingKey {
        key: key.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entries(pairs: &[(&str, &str)]) -> IndexMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn literal_replacement_writes_the_destination() {
        let mut map = entries(&[("a", "foo-1"), ("b", "")]);
        replace(
            &mut map,
            &[Repl::new("a".to_string(), "b".to_string(), "foo", "bar")],
        )
        .unwrap();
        assert_eq!(map, entries(&[("a", "foo-1"), ("b", "bar-1")]));
    }

    #[test]
    fn later_rules_read_earlier_writes() {
        let mut map = entries(&[("a", "x-1")]);
        replace(
            &mut map,
            &[
                Repl::new("a".to_string(), "b".to_string(), "x", "y"),
                Repl::new("b".to_string(), "c".to_string(), "y", "z"),
            ],
        )
        .unwrap();
        assert_eq!(map["b"], "y-1");
        assert_eq!(map["c"], "z-1");
    }

    #[test]
    fn missing_source_fails() {
        let mut map = entries(&[("a", "x")]);
        let err = replace(
            &mut map,
            &[Repl::new("nope".to_string(), "b".to_string(), "x", "y")],
        )
        .unwrap_err();
        match err {
            TreeError::MissingKey { key } => assert_eq!(key, "nope"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn pattern_replacement_supports_capture_groups() {
        let mut map = entries(&[("src", "sample_042")]);
        replace_pattern(
            &mut map,
            &[Repl::new(
                "src".to_string(),
                "dst".to_string(),
                r"sample_(\d+)",
                "run-$1",
            )],
        )
        .unwrap();
        assert_eq!(map["dst"], "run-042");
    }

    #[test]
    fn invalid_patterns_fail() {
        let mut map = entries(&[("a", "x")]);
        let err = replace_pattern(
            &mut map,
            &[Repl::new("a".to_string(), "b".to_string(), "(", "y")],
        )
        .unwrap_err();
        assert!(matches!(err, TreeError::InvalidPattern(_)));
    }
}
