use std::collections::{BTreeMap, HashSet};

/// Occurrences of each NFT tag among the NFTs created in a block.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagsCount {
    tags: BTreeMap<String, u64>,
}

impl TagsCount {
    pub fn new() -> Self {
        Self::default()
    }

    /// Counts every distinct non-empty tag once.
    pub fn parse_tags(&mut self, tags: &[String]) {
        let mut seen = HashSet::new();
        for tag in tags {
            if tag.is_empty() || !seen.insert(tag.as_str()) {
                continue;
            }
            *self.tags.entry(tag.clone()).or_default() += 1;
        }
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    pub fn get_tags(&self) -> Vec<String> {
        self.tags.keys().cloned().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &u64)> {
        self.tags.iter()
    }
}
