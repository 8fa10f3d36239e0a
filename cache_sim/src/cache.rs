use std::fmt;

use serde::Deserialize;
use thiserror::Error;

use crate::{
    line::{CacheDump, CacheLine},
    stat::{AddStats, CacheStat, Stats},
};

/// 2K-word cache as 128 blocks of 16 words.
pub const DEFAULT_NUM_BLOCKS: usize = 128usize;
pub const DEFAULT_BLOCK_SIZE_WORDS: usize = 16usize;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum CacheError {
    #[error("invalid cache configuration: {reason} (num_blocks = {num_blocks}, block_size_words = {block_size_words})")]
    InvalidConfiguration {
        num_blocks: usize,
        block_size_words: usize,
        reason: &'static str,
    },
    #[error("address {address} is negative")]
    InvalidAddress { address: i64 },
}

pub type Result<T> = std::result::Result<T, CacheError>;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AccessKind {
    #[default]
    Read,
    Write,
}

impl AccessKind {
    pub fn is_write(self) -> bool {
        self == AccessKind::Write
    }
}

impl From<bool> for AccessKind {
    fn from(is_write: bool) -> Self {
        if is_write {
            AccessKind::Write
        } else {
            AccessKind::Read
        }
    }
}

impl fmt::Display for AccessKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccessKind::Read => write!(f, "read"),
            AccessKind::Write => write!(f, "write"),
        }
    }
}

/// one element of an access stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Access {
    pub address: i64,
    #[serde(default, rename = "write", with = "kind_as_bool")]
    pub kind: AccessKind,
}

impl Access {
    pub fn read(address: i64) -> Self {
        Self {
            address,
            kind: AccessKind::Read,
        }
    }
    pub fn write(address: i64) -> Self {
        Self {
            address,
            kind: AccessKind::Write,
        }
    }
}

mod kind_as_bool {
    use serde::{Deserialize, Deserializer};

    use super::AccessKind;

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<AccessKind, D::Error> {
        bool::deserialize(d).map(AccessKind::from)
    }
}

/// fully-associative cache with LRU replacement.
///
/// Only metadata is modelled: which tags are resident, whether they were
/// written since load and when they were last touched. Recency is ordered by a
/// logical clock advanced once per access.
pub struct AssociativeCache {
    lines: Vec<CacheLine>,
    block_size_words: usize,
    block_offset_bits: u32,
    current_time: u64,
    stat: CacheStat,
}

impl AssociativeCache {
    pub fn new(num_blocks: usize, block_size_words: usize) -> Result<Self> {
        let invalid = |reason| CacheError::InvalidConfiguration {
            num_blocks,
            block_size_words,
            reason,
        };
        if num_blocks == 0 {
            return Err(invalid("cache must hold at least one block"));
        }
        if !block_size_words.is_power_of_two() {
            return Err(invalid("block size must be a positive power of two"));
        }
        Ok(Self::with_geometry(num_blocks, block_size_words))
    }

    /// `num_blocks >= 1` and `block_size_words` a power of two.
    fn with_geometry(num_blocks: usize, block_size_words: usize) -> Self {
        log::info!("fully-associative cache: {num_blocks} blocks x {block_size_words} words.");
        Self {
            lines: vec![CacheLine::default(); num_blocks],
            block_size_words,
            block_offset_bits: block_size_words.trailing_zeros(),
            current_time: 0,
            stat: CacheStat::default(),
        }
    }

    pub fn num_blocks(&self) -> usize {
        self.lines.len()
    }
    pub fn block_size_words(&self) -> usize {
        self.block_size_words
    }
    pub fn block_offset_bits(&self) -> u32 {
        self.block_offset_bits
    }
    pub fn current_time(&self) -> u64 {
        self.current_time
    }
    pub fn valid_lines(&self) -> usize {
        self.lines.iter().filter(|l| l.valid).count()
    }
    pub fn dirty_lines(&self) -> usize {
        self.lines.iter().filter(|l| l.dirty).count()
    }

    /// tag of the block containing `address`.
    pub fn tag_of(&self, address: i64) -> Result<u64> {
        let address = u64::try_from(address).map_err(|_| CacheError::InvalidAddress { address })?;
        Ok(address >> self.block_offset_bits)
    }

    pub fn access(&mut self, address: i64, kind: AccessKind) -> Result<()> {
        let tag = self.tag_of(address)?;
        self.current_time += 1;
        self.stat.total_accesses += 1;
        let now = self.current_time;

        if let Some(line) = self.lines.iter_mut().find(|l| l.matches(tag)) {
            log::trace!("{kind} {address:#x}: hit (tag {tag:#x})");
            line.last_access_time = now;
            if kind.is_write() {
                line.dirty = true;
            }
            return Ok(());
        }

        self.stat.total_misses += 1;
        match kind {
            AccessKind::Read => self.stat.read_misses += 1,
            AccessKind::Write => self.stat.write_misses += 1,
        }
        let victim = self.select_victim();
        let line = &mut self.lines[victim];
        if line.valid {
            self.stat.evictions += 1;
            log::debug!(
                "evict tag {:#x} from slot {victim}{}",
                line.tag,
                if line.dirty { " (dirty)" } else { "" }
            );
        }
        log::trace!("{kind} {address:#x}: miss (tag {tag:#x}) -> slot {victim}");
        line.load(tag, now, kind.is_write());
        Ok(())
    }

    pub fn access_all(&mut self, accesses: impl IntoIterator<Item = Access>) -> Result<()> {
        for Access { address, kind } in accesses {
            self.access(address, kind)?;
        }
        Ok(())
    }

    /// single left-to-right pass keeping a running minimum that starts at the
    /// current time. Invalid lines always replace the candidate, so the last
    /// invalid line wins; among valid lines only a strictly older one does,
    /// so the first of equal timestamps wins.
    fn select_victim(&self) -> usize {
        let (victim, _) = self.lines.iter().enumerate().fold(
            (0, self.current_time),
            |(victim, min), (index, line)| {
                if !line.valid || line.last_access_time < min {
                    (index, line.last_access_time)
                } else {
                    (victim, min)
                }
            },
        );
        victim
    }

    pub fn stats(&self) -> CacheStat {
        self.stat
    }

    pub fn dump(&self) -> CacheDump {
        CacheDump::new(
            self.lines
                .iter()
                .enumerate()
                .map(|(i, l)| l.snapshot(i))
                .collect(),
        )
    }
}

impl Default for AssociativeCache {
    fn default() -> Self {
        Self::with_geometry(DEFAULT_NUM_BLOCKS, DEFAULT_BLOCK_SIZE_WORDS)
    }
}

impl AddStats for AssociativeCache {
    fn add_stats(&self, buf: &mut Stats) {
        buf.push(Box::new(self.stats()));
    }
}
