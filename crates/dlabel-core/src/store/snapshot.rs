use std::{collections::BTreeMap, ops::Index};

use dlabel_model::{LabelResult, Labels};

/// Point-in-time copy of every label result, ordered by name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LabelSet(BTreeMap<String, LabelResult>);

impl LabelSet {
    pub fn get(&self, name: &str) -> Option<&LabelResult> {
        self.0.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &LabelResult)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Flatten into the `name -> value` form advertised to clients.
    pub fn to_labels(&self) -> Labels {
        self.iter().map(|(name, r)| (name, r.value())).collect()
    }

    pub fn into_inner(self) -> BTreeMap<String, LabelResult> {
        self.0
    }
}

impl From<BTreeMap<String, LabelResult>> for LabelSet {
    fn from(map: BTreeMap<String, LabelResult>) -> Self {
        Self(map)
    }
}

/// Panics if `name` is not present, like map indexing.
impl Index<&str> for LabelSet {
    type Output = LabelResult;

    fn index(&self, name: &str) -> &LabelResult {
        &self.0[name]
    }
}
