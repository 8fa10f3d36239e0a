use std::fmt;

pub trait Width {
    fn width_by_chunk_size(chunk_size: usize) -> usize;
    fn chunk_size(max_width: usize) -> usize {
        let mut chunk_size = 2;
        loop {
            if Self::width_by_chunk_size(chunk_size) > max_width {
                break chunk_size - 1;
            }
            chunk_size += 1;
        }
    }
}

pub trait Stat {
    fn view(&self, max_width: usize) -> Box<dyn StatView + '_>;
}

pub trait StatView: fmt::Display {
    /// header of stat
    fn header(&self) -> &'static str;
    /// body width
    fn width(&self) -> usize;
}

pub trait AddStats {
    /// add stat to `buf`.
    fn add_stats(&self, buf: &mut Stats);
}

#[derive(Default)]
pub struct Stats {
    stats: Vec<Box<dyn Stat>>,
}

impl Stats {
    pub fn push(&mut self, stat: Box<dyn Stat>) {
        self.stats.push(stat)
    }
    pub fn is_empty(&self) -> bool {
        self.stats.is_empty()
    }
}

pub struct StatAllView<'s> {
    views: Vec<Box<dyn StatView + 's>>,
}

impl Stats {
    pub fn view(&self, max_width: usize) -> StatAllView<'_> {
        StatAllView {
            views: self.stats.iter().map(|s| s.view(max_width)).collect(),
        }
    }
}

impl fmt::Display for StatAllView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = self
            .views
            .iter()
            .map(|s| s.header().len().max(s.width()))
            .max()
            .unwrap_or(0);
        writeln!(f, "{:-^width$}", " statistics ")?;
        for sv in &self.views {
            writeln!(f, "{}:", sv.header())?;
            writeln!(f, "{}", sv)?;
        }
        write!(f, "{:-<width$}", "")
    }
}

/// aggregated counters of an `AssociativeCache`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStat {
    pub total_accesses: u64,
    pub total_misses: u64,
    pub read_misses: u64,
    pub write_misses: u64,
    /// misses that replaced a valid line
    pub evictions: u64,
}

impl CacheStat {
    pub fn hits(&self) -> u64 {
        self.total_accesses.saturating_sub(self.total_misses)
    }
    /// `None` until the first access; there is no meaningful rate over zero accesses.
    pub fn hit_rate(&self) -> Option<f64> {
        self.miss_rate().map(|m| 1.0 - m)
    }
    pub fn miss_rate(&self) -> Option<f64> {
        if self.total_accesses == 0 {
            None
        } else {
            Some(self.total_misses as f64 / self.total_accesses as f64)
        }
    }
}

fn percent(rate: Option<f64>) -> String {
    match rate {
        Some(r) => format!("{:.2} %", r * 100.0),
        None => "n/a".to_string(),
    }
}

impl Stat for CacheStat {
    fn view(&self, _: usize) -> Box<dyn StatView + '_> {
        Box::new(self)
    }
}

impl StatView for &'_ CacheStat {
    fn header(&self) -> &'static str {
        "cache stat"
    }
    fn width(&self) -> usize {
        33
    }
}

impl fmt::Display for &'_ CacheStat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        macro_rules! output {
            ($name:expr => $v:expr) => {{
                let v = format!("#{}", $v);
                writeln!(f, "  {:>14}: {v:>14}", $name)
            }};
        }
        output!("searches" => self.total_accesses)?;
        output!("hits" => self.hits())?;
        output!("misses" => self.total_misses)?;
        output!("read misses" => self.read_misses)?;
        output!("write misses" => self.write_misses)?;
        output!("evictions" => self.evictions)?;
        write!(f, "  {:>14}: {:>14}", "hit rate", percent(self.hit_rate()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rates_undefined_without_accesses() {
        let s = CacheStat::default();
        assert_eq!(None, s.hit_rate());
        assert_eq!(None, s.miss_rate());
        assert_eq!(0, s.hits());
        assert!(format!("{}", &s).ends_with("n/a"));
    }
    #[test]
    fn test_rates() {
        let s = CacheStat {
            total_accesses: 4,
            total_misses: 1,
            read_misses: 1,
            ..Default::default()
        };
        assert_eq!(3, s.hits());
        assert_eq!(Some(0.75), s.hit_rate());
        assert_eq!(Some(0.25), s.miss_rate());
        assert!(format!("{}", &s).ends_with("75.00 %"));
    }
    #[test]
    fn test_hits_never_underflow() {
        let s = CacheStat {
            total_accesses: 1,
            total_misses: 3,
            ..Default::default()
        };
        assert_eq!(0, s.hits());
    }
    #[test]
    fn test_all_view_frames_every_stat() {
        let mut stats = Stats::default();
        assert!(stats.is_empty());
        stats.push(Box::<CacheStat>::default());
        let out = format!("{}", stats.view(80));
        assert!(out.starts_with("---"));
        assert!(out.contains("cache stat:"));
        assert!(out.ends_with('-'));
    }
}
