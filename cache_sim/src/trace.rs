use anyhow::Result;
use serde::Deserialize;

use crate::cache::Access;

/// recorded access stream, e.g. `{"accesses": [{"address": 16, "write": true}]}`.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Trace {
    pub accesses: Vec<Access>,
}

impl Trace {
    pub fn deser(file: impl std::io::Read) -> Result<Self> {
        Ok(serde_json::from_reader(file)?)
    }
    pub fn len(&self) -> usize {
        self.accesses.len()
    }
    pub fn is_empty(&self) -> bool {
        self.accesses.is_empty()
    }
}

impl IntoIterator for Trace {
    type Item = Access;

    type IntoIter = <Vec<Access> as IntoIterator>::IntoIter;

    fn into_iter(self) -> Self::IntoIter {
        self.accesses.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{AccessKind, AssociativeCache, CacheError};

    #[test]
    fn test_deser() {
        let json = r#"{"accesses": [
            {"address": 0},
            {"address": 16, "write": true},
            {"address": 1, "write": false}
        ]}"#;
        let trace = Trace::deser(json.as_bytes()).unwrap();
        assert_eq!(3, trace.len());
        assert_eq!(AccessKind::Read, trace.accesses[0].kind);
        assert_eq!(Access::write(16), trace.accesses[1]);
        let mut c = AssociativeCache::new(2, 16).unwrap();
        c.access_all(trace).unwrap();
        let s = c.stats();
        assert_eq!((3, 2, 1, 1), (s.total_accesses, s.total_misses, s.read_misses, s.write_misses));
    }
    #[test]
    fn test_negative_address_is_rejected_on_replay() {
        let trace = Trace::deser(r#"{"accesses": [{"address": -16}]}"#.as_bytes()).unwrap();
        let mut c = AssociativeCache::default();
        assert_eq!(
            Err(CacheError::InvalidAddress { address: -16 }),
            c.access_all(trace)
        );
    }
    #[test]
    fn test_malformed() {
        assert!(Trace::deser(r#"{"accesses": [{"write": true}]}"#.as_bytes()).is_err());
        assert!(Trace::deser("[]".as_bytes()).is_err());
        // misspelled keys must not fall back to a read
        assert!(Trace::deser(r#"{"accesses": [{"address": 16, "Write": true}]}"#.as_bytes()).is_err());
        assert!(Trace::deser(r#"{"accesses": [], "acceses": []}"#.as_bytes()).is_err());
    }
}
