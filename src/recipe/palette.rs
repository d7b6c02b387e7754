//! Shared, read-only inputs of a batch.

use rustc_hash::{FxHashMap, FxHashSet};

/// Alias name to literal value, referenced as `@name`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Palette(FxHashMap<String, String>);

impl Palette {
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Palette {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(name, value)| (name.into(), value.into()))
                .collect(),
        )
    }
}

/// Ids the optimizer never rewrites, drops, or hands out.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReservedIds(FxHashSet<String>);

impl ReservedIds {
    #[inline]
    pub fn contains(&self, id: &str) -> bool {
        self.0.contains(id)
    }
}

impl<S: Into<String>> FromIterator<S> for ReservedIds {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}
