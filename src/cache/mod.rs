//! Fixed-capacity sector cache with least-recently-used eviction.
//!
//! Lines are scanned linearly; at this capacity that beats maintaining any
//! index. A logical clock orders accesses: every hit and insert stamps the
//! line with the current clock and advances it, so the smallest stamp is
//! always the least recently touched line.

use crate::proto::SectorBuf;

/// Reserved address marking an empty line.
const EMPTY_TRACK: i32 = -1;
const EMPTY_SECTOR: i16 = -1;

#[derive(Debug, Clone)]
struct CacheLine {
    track: i32,
    sector: i16,
    last_access: u64,
    buf: SectorBuf,
}

impl CacheLine {
    fn empty() -> Self {
        Self {
            track: EMPTY_TRACK,
            sector: EMPTY_SECTOR,
            last_access: 0,
            buf: [0; crate::proto::SECTOR_SIZE],
        }
    }

    fn is_empty(&self) -> bool {
        self.track == EMPTY_TRACK && self.sector == EMPTY_SECTOR
    }
}

/// Counters the cache keeps about itself.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CacheMetrics {
    pub inserts: u64,
    pub gets: u64,
    pub hits: u64,
    pub misses: u64,
    pub hit_ratio: f64,
}

#[derive(Debug)]
pub struct SectorCache {
    lines: Vec<CacheLine>,
    clock: u64,
    inserts: u64,
    hits: u64,
    misses: u64,
}

impl SectorCache {
    /// Allocate `capacity` empty lines up front.
    pub fn new(capacity: usize) -> Self {
        Self {
            lines: vec![CacheLine::empty(); capacity],
            clock: 1,
            inserts: 0,
            hits: 0,
            misses: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.lines.len()
    }

    /// Number of lines currently holding a sector.
    pub fn resident(&self) -> usize {
        self.lines.iter().filter(|l| !l.is_empty()).count()
    }

    /// Find the sector, refreshing its access time on a hit.
    pub fn lookup(&mut self, track: i32, sector: i16) -> Option<&mut SectorBuf> {
        let slot = self
            .lines
            .iter()
            .position(|l| l.track == track && l.sector == sector && !l.is_empty());
        match slot {
            Some(i) => {
                self.hits += 1;
                let line = &mut self.lines[i];
                line.last_access = self.clock;
                self.clock += 1;
                Some(&mut line.buf)
            }
            None => {
                self.misses += 1;
                None
            }
        }
    }

    /// Insert or refresh a sector.
    ///
    /// Same address: overwrite in place. Otherwise take the first empty
    /// line, or evict the line with the smallest access stamp (first in
    /// scan order on a tie).
    pub fn insert(&mut self, track: i32, sector: i16, buf: &SectorBuf) {
        if self.lines.is_empty() {
            return;
        }

        let slot = self
            .lines
            .iter()
            .position(|l| l.track == track && l.sector == sector && !l.is_empty())
            .or_else(|| self.lines.iter().position(|l| l.is_empty()))
            .unwrap_or_else(|| {
                let mut victim = 0;
                for (i, line) in self.lines.iter().enumerate() {
                    if line.last_access < self.lines[victim].last_access {
                        victim = i;
                    }
                }
                victim
            });

        let line = &mut self.lines[slot];
        line.track = track;
        line.sector = sector;
        line.buf = *buf;
        line.last_access = self.clock;
        self.clock += 1;
        self.inserts += 1;
    }

    /// Snapshot the counters.
    ///
    /// Hit ratio is hits / (hits + misses), 0 before the first lookup.
    pub fn metrics(&self) -> CacheMetrics {
        let gets = self.hits + self.misses;
        let hit_ratio = if gets == 0 {
            0.0
        } else {
            self.hits as f64 / gets as f64
        };
        CacheMetrics {
            inserts: self.inserts,
            gets,
            hits: self.hits,
            misses: self.misses,
            hit_ratio,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proto::SECTOR_SIZE;

    fn sector(fill: u8) -> SectorBuf {
        [fill; SECTOR_SIZE]
    }

    #[test]
    fn lookup_after_insert_hits() {
        let mut cache = SectorCache::new(4);
        cache.insert(2, 7, &sector(0xaa));
        let buf = cache.lookup(2, 7).expect("sector should be cached");
        assert_eq!(buf[0], 0xaa);
        assert_eq!(cache.resident(), 1);

        let m = cache.metrics();
        assert_eq!(m.hits, 1);
        assert_eq!(m.misses, 0);
        assert_eq!(m.inserts, 1);
    }

    #[test]
    fn miss_counts_and_inserts_nothing() {
        let mut cache = SectorCache::new(4);
        assert!(cache.lookup(1, 1).is_none());
        assert_eq!(cache.resident(), 0);

        let m = cache.metrics();
        assert_eq!(m.misses, 1);
        assert_eq!(m.gets, 1);
        assert_eq!(m.hit_ratio, 0.0);
    }

    #[test]
    fn never_exceeds_capacity() {
        let mut cache = SectorCache::new(3);
        for i in 0..10 {
            cache.insert(i, 0, &sector(i as u8));
            assert!(cache.resident() <= 3);
        }
        assert_eq!(cache.resident(), 3);
    }

    #[test]
    fn evicts_least_recently_accessed() {
        let mut cache = SectorCache::new(3);
        cache.insert(0, 0, &sector(0));
        cache.insert(1, 0, &sector(1));
        cache.insert(2, 0, &sector(2));

        // Touch (0,0) and (2,0); (1,0) becomes the oldest.
        assert!(cache.lookup(0, 0).is_some());
        assert!(cache.lookup(2, 0).is_some());

        cache.insert(3, 0, &sector(3));
        assert!(cache.lookup(1, 0).is_none(), "oldest line must be evicted");
        assert!(cache.lookup(0, 0).is_some());
        assert!(cache.lookup(2, 0).is_some());
        assert!(cache.lookup(3, 0).is_some());
    }

    #[test]
    fn eviction_tie_break_is_scan_order() {
        let mut cache = SectorCache::new(2);
        cache.insert(0, 0, &sector(0)); // clock 1
        cache.insert(1, 0, &sector(1)); // clock 2
        // (0,0) has the smaller stamp and sits first in scan order.
        cache.insert(2, 0, &sector(2));
        assert!(cache.lookup(0, 0).is_none());
        assert!(cache.lookup(1, 0).is_some());
    }

    #[test]
    fn reinsert_same_address_refreshes() {
        let mut cache = SectorCache::new(2);
        cache.insert(0, 0, &sector(0));
        cache.insert(1, 0, &sector(1));
        // Refreshing (0,0) makes (1,0) the eviction victim.
        cache.insert(0, 0, &sector(9));
        assert_eq!(cache.resident(), 2);

        cache.insert(2, 0, &sector(2));
        assert!(cache.lookup(1, 0).is_none());
        let buf = cache.lookup(0, 0).expect("refreshed line survives");
        assert_eq!(buf[0], 9);
    }

    #[test]
    fn hit_ratio_counts_lookups() {
        let mut cache = SectorCache::new(2);
        cache.insert(0, 0, &sector(0));
        assert!(cache.lookup(0, 0).is_some());
        assert!(cache.lookup(0, 0).is_some());
        assert!(cache.lookup(5, 5).is_none());

        let m = cache.metrics();
        assert_eq!(m.gets, 3);
        assert!((m.hit_ratio - 2.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn zero_capacity_is_inert() {
        let mut cache = SectorCache::new(0);
        cache.insert(0, 0, &sector(1));
        assert!(cache.lookup(0, 0).is_none());
        assert_eq!(cache.resident(), 0);
    }
}
