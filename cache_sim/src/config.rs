use anyhow::Result;
use serde::Deserialize;

use crate::cache::{self, AssociativeCache, DEFAULT_BLOCK_SIZE_WORDS, DEFAULT_NUM_BLOCKS};

/// cache geometry, e.g. `{"num_blocks": 128, "block_size_words": 16}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CacheConfig {
    pub num_blocks: usize,
    pub block_size_words: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            num_blocks: DEFAULT_NUM_BLOCKS,
            block_size_words: DEFAULT_BLOCK_SIZE_WORDS,
        }
    }
}

impl CacheConfig {
    pub fn deser(file: impl std::io::Read) -> Result<Self> {
        Ok(serde_json::from_reader(file)?)
    }
    pub fn build(&self) -> cache::Result<AssociativeCache> {
        AssociativeCache::new(self.num_blocks, self.block_size_words)
    }
}
