use std::fmt;

use crate::stat::{Stat, StatView, Width};

/// replacement/state metadata of one physical slot.
#[derive(Default, Clone, Copy)]
pub(crate) struct CacheLine {
    pub valid: bool,
    pub dirty: bool,
    /// only meaningful while `valid`
    pub tag: u64,
    pub last_access_time: u64,
}

impl CacheLine {
    pub fn matches(&self, tag: u64) -> bool {
        self.valid && self.tag == tag
    }
    pub fn load(&mut self, tag: u64, now: u64, dirty: bool) {
        self.valid = true;
        self.tag = tag;
        self.last_access_time = now;
        self.dirty = dirty;
    }
    pub fn snapshot(&self, index: usize) -> LineSnapshot {
        LineSnapshot {
            index,
            tag: self.valid.then_some(self.tag),
            valid: self.valid,
            dirty: self.dirty,
            last_access_time: self.last_access_time,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineSnapshot {
    pub index: usize,
    /// `None` while the slot has never been loaded
    pub tag: Option<u64>,
    pub valid: bool,
    pub dirty: bool,
    pub last_access_time: u64,
}

impl LineSnapshot {
    pub fn is_clean(&self) -> bool {
        self.valid && !self.dirty
    }
}

impl fmt::Display for LineSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self.tag {
            Some(t) => format!("{t:#06x}"),
            None => "-".to_string(),
        };
        let state = match (self.valid, self.dirty) {
            (false, _) => ' ',
            (true, false) => 'C',
            (true, true) => 'D',
        };
        write!(
            f,
            "#{:<4} {tag:>8} {state} t={:<7}",
            self.index, self.last_access_time
        )
    }
}

/// copy of every slot in physical index order.
#[derive(Debug, Clone, Default)]
pub struct CacheDump {
    lines: Vec<LineSnapshot>,
}

impl CacheDump {
    pub(crate) fn new(lines: Vec<LineSnapshot>) -> Self {
        Self { lines }
    }
    pub fn lines(&self) -> &[LineSnapshot] {
        &self.lines
    }
    pub fn len(&self) -> usize {
        self.lines.len()
    }
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
    pub fn valid_count(&self) -> usize {
        self.lines.iter().filter(|l| l.valid).count()
    }
    pub fn dirty_count(&self) -> usize {
        self.lines.iter().filter(|l| l.dirty).count()
    }
}

impl IntoIterator for CacheDump {
    type Item = LineSnapshot;

    type IntoIter = <Vec<LineSnapshot> as IntoIterator>::IntoIter;

    fn into_iter(self) -> Self::IntoIter {
        self.lines.into_iter()
    }
}

/// width of one rendered `LineSnapshot` plus separator
const CELL_WIDTH: usize = 30;

impl Stat for CacheDump {
    fn view(&self, max_width: usize) -> Box<dyn StatView + '_> {
        Box::new(CacheDumpView {
            dump: self,
            chunk_size: CacheDumpView::chunk_size(max_width),
        })
    }
}

pub struct CacheDumpView<'a> {
    dump: &'a CacheDump,
    chunk_size: usize,
}

impl Width for CacheDumpView<'_> {
    fn width_by_chunk_size(chunk_size: usize) -> usize {
        chunk_size * CELL_WIDTH
    }
}

impl StatView for CacheDumpView<'_> {
    fn header(&self) -> &'static str {
        "cache lines (format: `#slot tag state(C: clean / D: dirty) t=last access`)"
    }
    fn width(&self) -> usize {
        Self::width_by_chunk_size(self.chunk_size)
    }
}

impl fmt::Display for CacheDumpView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.dump.lines.chunks(self.chunk_size) {
            write!(f, " ")?;
            for line in row {
                write!(f, " {line}")?;
            }
            writeln!(f)?;
        }
        write!(
            f,
            "  valid: {} / {}, dirty: {}",
            self.dump.valid_count(),
            self.dump.len(),
            self.dump.dirty_count()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_hides_tag_of_invalid_line() {
        let line = CacheLine::default();
        let s = line.snapshot(3);
        assert_eq!(3, s.index);
        assert_eq!(None, s.tag);
        assert!(!s.valid && !s.dirty);
        assert!(!line.matches(0));
    }
    #[test]
    fn test_load() {
        let mut line = CacheLine::default();
        line.load(0x2a, 7, false);
        assert!(line.matches(0x2a));
        assert!(!line.matches(0x2b));
        let s = line.snapshot(0);
        assert_eq!(Some(0x2a), s.tag);
        assert_eq!(7, s.last_access_time);
        assert!(s.is_clean());
        line.load(0x10, 9, true);
        assert!(!line.matches(0x2a));
        assert!(line.snapshot(0).dirty);
    }
    #[test]
    fn test_dump_view_chunks_rows() {
        let dump = CacheDump::new((0..5).map(|i| CacheLine::default().snapshot(i)).collect());
        let out = format!("{}", dump.view(2 * CELL_WIDTH + 5));
        // 5 slots at 2 per row
        assert_eq!(4, out.lines().count());
        assert!(out.ends_with("valid: 0 / 5, dirty: 0"));
    }
}
