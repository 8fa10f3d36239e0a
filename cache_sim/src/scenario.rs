use std::{fmt, ops::Range, str::FromStr};

use crate::cache::{Access, AccessKind};

/// access patterns used to demonstrate spatial and temporal locality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scenario {
    SpatialRead,
    SpatialWrite,
    TemporalRead,
    TemporalWrite,
    MixedRead,
    MixedWrite,
    /// read-modify-write of every word, e.g. `arr[i] = x * arr[i]`
    MixedReadWrite,
}

fn sweep(r: Range<i64>, kind: AccessKind) -> impl Iterator<Item = Access> {
    r.map(move |address| Access { address, kind })
}

fn read_then_write(r: Range<i64>) -> impl Iterator<Item = Access> {
    r.flat_map(|address| [Access::read(address), Access::write(address)])
}

impl Scenario {
    pub const ALL: [Scenario; 7] = [
        Scenario::SpatialRead,
        Scenario::SpatialWrite,
        Scenario::TemporalRead,
        Scenario::TemporalWrite,
        Scenario::MixedRead,
        Scenario::MixedWrite,
        Scenario::MixedReadWrite,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Scenario::SpatialRead => "spatial-read",
            Scenario::SpatialWrite => "spatial-write",
            Scenario::TemporalRead => "temporal-read",
            Scenario::TemporalWrite => "temporal-write",
            Scenario::MixedRead => "mixed-read",
            Scenario::MixedWrite => "mixed-write",
            Scenario::MixedReadWrite => "mixed-read-write",
        }
    }

    pub fn accesses(self) -> Vec<Access> {
        use AccessKind::*;
        match self {
            Scenario::SpatialRead => sweep(0..1000, Read).collect(),
            Scenario::SpatialWrite => sweep(0..2000, Write).collect(),
            Scenario::TemporalRead => sweep(0..1000, Read)
                .chain(sweep(0..1000, Read))
                .chain(sweep(1000..2000, Read))
                .chain(sweep(1000..2000, Read))
                .collect(),
            Scenario::TemporalWrite => sweep(0..4000, Write)
                .chain(sweep(0..4000, Write))
                .chain(sweep(1000..2000, Write))
                .chain(sweep(1000..2000, Write))
                .collect(),
            Scenario::MixedRead => sweep(0..100, Read)
                .chain(sweep(500..3000, Read))
                .chain(sweep(500..3000, Read))
                .collect(),
            Scenario::MixedWrite => sweep(0..1000, Write)
                .chain(sweep(0..1000, Write))
                .chain(sweep(2000..6000, Write))
                .collect(),
            Scenario::MixedReadWrite => read_then_write(0..1000)
                .chain(read_then_write(0..1000))
                .chain(read_then_write(2000..6000))
                .collect(),
        }
    }
}

impl fmt::Display for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Scenario {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Scenario::ALL
            .into_iter()
            .find(|sc| sc.name() == s)
            .ok_or_else(|| {
                let names: Vec<_> = Scenario::ALL.iter().map(|sc| sc.name()).collect();
                anyhow::anyhow!("unknown scenario `{s}` (one of: {})", names.join(", "))
            })
    }
}
