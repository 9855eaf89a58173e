use crate::fs::file_table::Handle;

/// Sector-to-file assignment table.
///
/// One slot per (track, sector) address, scanned track-major. The k-th
/// slot owned by a handle, in scan order, is that file's logical sector k.
/// Slots are claimed lazily by the first write that needs them and are
/// never reclaimed or rebalanced while the session is mounted.
#[derive(Debug)]
pub struct SectorMap {
    slots: Vec<Option<Handle>>,
    tracks: usize,
    sectors_per_track: usize,
}

impl SectorMap {
    pub fn new(tracks: usize, sectors_per_track: usize) -> Self {
        Self {
            slots: vec![None; tracks * sectors_per_track],
            tracks,
            sectors_per_track,
        }
    }

    /// Address of the file's logical sector `index`, if assigned.
    pub fn locate(&self, handle: Handle, index: usize) -> Option<(i32, i16)> {
        let slot = self
            .slots
            .iter()
            .enumerate()
            .filter(|(_, owner)| **owner == Some(handle))
            .nth(index)
            .map(|(i, _)| i)?;
        Some(self.address(slot))
    }

    /// Claim the first unassigned slot in scan order for this file.
    pub fn allocate(&mut self, handle: Handle) -> Option<(i32, i16)> {
        let slot = self.slots.iter().position(|owner| owner.is_none())?;
        self.slots[slot] = Some(handle);
        Some(self.address(slot))
    }

    /// Number of sectors assigned to the file.
    pub fn sector_count(&self, handle: Handle) -> usize {
        self.slots.iter().filter(|owner| **owner == Some(handle)).count()
    }

    /// Release every assignment (mount/unmount).
    pub fn reset(&mut self) {
        self.slots.iter_mut().for_each(|s| *s = None);
    }

    fn address(&self, slot: usize) -> (i32, i16) {
        debug_assert!(slot < self.tracks * self.sectors_per_track);
        ((slot / self.sectors_per_track) as i32, (slot % self.sectors_per_track) as i16)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allocation_is_track_major() {
        let mut map = SectorMap::new(2, 3);
        assert_eq!(map.allocate(0), Some((0, 0)));
        assert_eq!(map.allocate(0), Some((0, 1)));
        assert_eq!(map.allocate(1), Some((0, 2)));
        assert_eq!(map.allocate(0), Some((1, 0)));
    }

    #[test]
    fn locate_kth_in_scan_order() {
        let mut map = SectorMap::new(2, 3);
        map.allocate(7); // (0,0)
        map.allocate(3); // (0,1)
        map.allocate(7); // (0,2)
        map.allocate(7); // (1,0)

        assert_eq!(map.locate(7, 0), Some((0, 0)));
        assert_eq!(map.locate(7, 1), Some((0, 2)));
        assert_eq!(map.locate(7, 2), Some((1, 0)));
        assert_eq!(map.locate(7, 3), None);
        assert_eq!(map.locate(3, 0), Some((0, 1)));
    }

    #[test]
    fn exhaustion_returns_none() {
        let mut map = SectorMap::new(1, 2);
        assert!(map.allocate(0).is_some());
        assert!(map.allocate(0).is_some());
        assert!(map.allocate(0).is_none());
    }

    #[test]
    fn reset_releases_all_slots() {
        let mut map = SectorMap::new(1, 2);
        map.allocate(4);
        map.allocate(4);
        map.reset();
        assert_eq!(map.sector_count(4), 0);
        assert_eq!(map.allocate(9), Some((0, 0)));
    }
}
