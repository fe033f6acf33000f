use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const SERVICE_TAG: &str = "service";
pub const REGION_TAG: &str = "region";
pub const ZONE_TAG: &str = "zone";
pub const SUB_ZONE_TAG: &str = "sub-zone";
pub const EXTERNAL_SERVICE_TAG: &str = "external-service-name";

/// A selector value that matches any value for its key.
pub const MATCH_ALL: &str = "*";

pub type Map = BTreeMap<String, String>;

/// The tags describing a concrete workload, inbound, or outbound.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TagSet(Map);

/// A set of required tags. A value of `*` requires only that the key is present.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Selector(Map);

/// Describes how specific a selector is.
///
/// Ranks are ordered by the number of exact matches first; the number of
/// wildcard matches only breaks ties between equally exact selectors.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct TagSelectorRank {
    pub exact_matches: usize,
    pub wildcard_matches: usize,
}

// === impl TagSet ===

impl TagSet {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn service(&self) -> Option<&str> {
        self.get(SERVICE_TAG)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &String)> {
        self.0.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

impl From<Map> for TagSet {
    #[inline]
    fn from(tags: Map) -> Self {
        Self(tags)
    }
}

impl AsRef<Map> for TagSet {
    #[inline]
    fn as_ref(&self) -> &Map {
        &self.0
    }
}

impl std::iter::FromIterator<(String, String)> for TagSet {
    fn from_iter<T: IntoIterator<Item = (String, String)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'t> std::iter::FromIterator<(&'t str, &'t str)> for TagSet {
    fn from_iter<T: IntoIterator<Item = (&'t str, &'t str)>>(iter: T) -> Self {
        iter.into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }
}

impl std::fmt::Display for TagSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write_pairs(f, &self.0)
    }
}

// === impl Selector ===

impl Selector {
    /// Selects all workloads of the named service.
    pub fn service(name: impl Into<String>) -> Self {
        Self(Some((SERVICE_TAG.to_string(), name.into())).into_iter().collect())
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn service_name(&self) -> Option<&str> {
        self.get(SERVICE_TAG)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &String)> {
        self.0.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn matches(&self, tags: &TagSet) -> bool {
        self.matches_map(&tags.0)
    }

    /// Tests this selector against another selector, treating the other
    /// selector's values as concrete tags.
    pub fn matches_selector(&self, other: &Selector) -> bool {
        self.matches_map(&other.0)
    }

    fn matches_map(&self, tags: &Map) -> bool {
        self.0.iter().all(|(key, value)| match tags.get(key) {
            Some(v) => value == MATCH_ALL || v == value,
            None => false,
        })
    }

    pub fn rank(&self) -> TagSelectorRank {
        let wildcard_matches = self.0.values().filter(|v| *v == MATCH_ALL).count();
        TagSelectorRank {
            exact_matches: self.0.len() - wildcard_matches,
            wildcard_matches,
        }
    }

    /// Returns the rank of this selector if it matches the given tags.
    pub fn rank_for(&self, tags: &TagSet) -> Option<TagSelectorRank> {
        self.matches(tags).then(|| self.rank())
    }

    /// Narrows this selector to the given tags: wildcard values are replaced by
    /// the concrete tag value, exact values are kept, and tags the selector
    /// doesn't mention are added.
    pub fn narrowed_to(&self, tags: &TagSet) -> Selector {
        let mut narrowed = self.0.clone();
        for (key, value) in narrowed.iter_mut() {
            if value == MATCH_ALL {
                if let Some(v) = tags.get(key) {
                    *value = v.to_string();
                }
            }
        }
        for (key, value) in tags.iter() {
            narrowed
                .entry(key.clone())
                .or_insert_with(|| value.clone());
        }
        Selector(narrowed)
    }
}

impl From<Map> for Selector {
    #[inline]
    fn from(map: Map) -> Self {
        Self(map)
    }
}

impl std::iter::FromIterator<(String, String)> for Selector {
    fn from_iter<T: IntoIterator<Item = (String, String)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'t> std::iter::FromIterator<(&'t str, &'t str)> for Selector {
    fn from_iter<T: IntoIterator<Item = (&'t str, &'t str)>>(iter: T) -> Self {
        iter.into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }
}

impl std::fmt::Display for Selector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write_pairs(f, &self.0)
    }
}

// === impl TagSelectorRank ===

impl TagSelectorRank {
    pub fn combined_with(self, other: Self) -> Self {
        Self {
            exact_matches: self.exact_matches + other.exact_matches,
            wildcard_matches: self.wildcard_matches + other.wildcard_matches,
        }
    }
}

fn write_pairs(f: &mut std::fmt::Formatter<'_>, map: &Map) -> std::fmt::Result {
    for (i, (k, v)) in map.iter().enumerate() {
        if i > 0 {
            f.write_str(",")?;
        }
        write!(f, "{k}={v}")?;
    }
    Ok(())
}
