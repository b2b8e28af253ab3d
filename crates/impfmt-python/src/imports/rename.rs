//! Explicit symbol rename maps.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Mapping from old dotted names to new ones.
///
/// A key matches a source name exactly or as a dotted prefix: with
/// `{"old.pkg": "new.pkg"}`, `old.pkg.Thing` becomes `new.pkg.Thing`. When
/// several keys match, the longest one wins.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RenameMap(BTreeMap<String, String>);

impl RenameMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, old: impl Into<String>, new: impl Into<String>) {
        self.0.insert(old.into(), new.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// The same map with keys and values swapped.
    pub fn inverted(&self) -> Self {
        Self(
            self.0
                .iter()
                .map(|(old, new)| (new.clone(), old.clone()))
                .collect(),
        )
    }

    /// New name for `source_name`, if any key matches.
    pub fn rename(&self, source_name: &str) -> Option<String> {
        self.0
            .iter()
            .filter_map(|(old, new)| {
                if source_name == old {
                    Some((old.len(), new.clone()))
                } else {
                    source_name
                        .strip_prefix(old.as_str())
                        .filter(|rest| rest.starts_with('.') && !old.ends_with('.'))
                        .map(|rest| (old.len(), format!("{}{}", new, rest)))
                }
            })
            .max_by_key(|(len, _)| *len)
            .map(|(_, renamed)| renamed)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for RenameMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_and_prefix_matches() {
        let map: RenameMap = [("old.pkg.Thing", "new.pkg.Thing"), ("legacy", "modern")]
            .into_iter()
            .collect();
        assert_eq!(map.rename("old.pkg.Thing"), Some("new.pkg.Thing".into()));
        assert_eq!(map.rename("legacy.util.f"), Some("modern.util.f".into()));
        assert_eq!(map.rename("legacyx.f"), None);
        assert_eq!(map.rename("old.pkg"), None);
    }

    #[test]
    fn longest_key_wins() {
        let map: RenameMap = [("a", "x"), ("a.b", "y")].into_iter().collect();
        assert_eq!(map.rename("a.b.c"), Some("y.c".into()));
        assert_eq!(map.rename("a.c"), Some("x.c".into()));
    }

    #[test]
    fn inverted_swaps() {
        let map: RenameMap = [("old.A", "new.A")].into_iter().collect();
        assert_eq!(map.inverted().rename("new.A"), Some("old.A".into()));
        assert_eq!(map.inverted().rename("old.A"), None);
    }
}
