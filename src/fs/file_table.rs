use crate::fs::config::MAX_NAME_LEN;
use crate::fs::error::{FsError, Result};

/// Slot index in the table, handed back to the caller by open.
pub type Handle = usize;

#[derive(Debug, Clone)]
pub struct FileEntry {
    pub name: String,
    pub size: usize,
    pub position: usize,
    pub open: bool,
}

/// The open-file table: a fixed number of descriptor slots.
///
/// A name keeps its slot (and therefore its handle and size) across
/// close/open cycles; only mount/unmount clears the table.
#[derive(Debug)]
pub struct FileTable {
    entries: Vec<Option<FileEntry>>,
}

impl FileTable {
    pub fn new(capacity: usize) -> Self {
        Self { entries: vec![None; capacity] }
    }

    /// Open by name. A known, closed name reopens its slot; an unseen name
    /// takes the first free slot with size 0 and position 0.
    pub fn open(&mut self, name: &str) -> Result<Handle> {
        if name.len() > MAX_NAME_LEN {
            return Err(FsError::NameTooLong(name.to_string()));
        }

        if let Some(handle) = self.find_by_name(name) {
            let entry = self.entries[handle].as_mut().ok_or(FsError::InvalidHandle(handle))?;
            if entry.open {
                return Err(FsError::AlreadyOpen(name.to_string()));
            }
            entry.open = true;
            return Ok(handle);
        }

        let slot = self
            .entries
            .iter()
            .position(|e| e.is_none())
            .ok_or(FsError::FileTableFull)?;
        self.entries[slot] = Some(FileEntry {
            name: name.to_string(),
            size: 0,
            position: 0,
            open: true,
        });
        Ok(slot)
    }

    /// Close a handle: position back to 0, open flag cleared. Name and
    /// size stay behind for a later reopen.
    pub fn close(&mut self, handle: Handle) -> Result<()> {
        let entry = self.get_open_mut(handle)?;
        entry.position = 0;
        entry.open = false;
        Ok(())
    }

    pub fn get(&self, handle: Handle) -> Result<&FileEntry> {
        self.entries
            .get(handle)
            .and_then(|e| e.as_ref())
            .ok_or(FsError::InvalidHandle(handle))
    }

    pub fn get_open(&self, handle: Handle) -> Result<&FileEntry> {
        let entry = self.get(handle)?;
        if !entry.open {
            return Err(FsError::FileNotOpen(handle));
        }
        Ok(entry)
    }

    pub fn get_open_mut(&mut self, handle: Handle) -> Result<&mut FileEntry> {
        let entry = self
            .entries
            .get_mut(handle)
            .and_then(|e| e.as_mut())
            .ok_or(FsError::InvalidHandle(handle))?;
        if !entry.open {
            return Err(FsError::FileNotOpen(handle));
        }
        Ok(entry)
    }

    /// All live descriptors, for the shell's table listing.
    pub fn iter(&self) -> impl Iterator<Item = (Handle, &FileEntry)> {
        self.entries
            .iter()
            .enumerate()
            .filter_map(|(i, e)| e.as_ref().map(|e| (i, e)))
    }

    pub fn open_count(&self) -> usize {
        self.iter().filter(|(_, e)| e.open).count()
    }

    /// Forget every descriptor (mount/unmount).
    pub fn reset(&mut self) {
        self.entries.iter_mut().for_each(|e| *e = None);
    }

    fn find_by_name(&self, name: &str) -> Option<Handle> {
        self.entries
            .iter()
            .position(|e| e.as_ref().is_some_and(|e| e.name == name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_returns_slot_index() {
        let mut table = FileTable::new(4);
        assert_eq!(table.open("a").unwrap(), 0);
        assert_eq!(table.open("b").unwrap(), 1);
    }

    #[test]
    fn double_open_fails() {
        let mut table = FileTable::new(4);
        table.open("a").unwrap();
        assert!(matches!(table.open("a"), Err(FsError::AlreadyOpen(_))));
    }

    #[test]
    fn reopen_keeps_handle_and_size_resets_position() {
        let mut table = FileTable::new(4);
        let h = table.open("a").unwrap();
        {
            let entry = table.get_open_mut(h).unwrap();
            entry.size = 500;
            entry.position = 123;
        }
        table.close(h).unwrap();
        assert!(matches!(table.get_open(h), Err(FsError::FileNotOpen(_))));

        let again = table.open("a").unwrap();
        assert_eq!(again, h);
        let entry = table.get_open(again).unwrap();
        assert_eq!(entry.size, 500);
        assert_eq!(entry.position, 0);
    }

    #[test]
    fn close_requires_open() {
        let mut table = FileTable::new(4);
        let h = table.open("a").unwrap();
        table.close(h).unwrap();
        assert!(table.close(h).is_err());
        assert!(matches!(table.close(99), Err(FsError::InvalidHandle(99))));
    }

    #[test]
    fn table_exhaustion() {
        let mut table = FileTable::new(2);
        table.open("a").unwrap();
        table.open("b").unwrap();
        assert!(matches!(table.open("c"), Err(FsError::FileTableFull)));
    }

    #[test]
    fn name_length_bound() {
        let mut table = FileTable::new(2);
        let long = "x".repeat(MAX_NAME_LEN + 1);
        assert!(matches!(table.open(&long), Err(FsError::NameTooLong(_))));
    }

    #[test]
    fn reset_clears_everything() {
        let mut table = FileTable::new(2);
        table.open("a").unwrap();
        table.reset();
        assert_eq!(table.iter().count(), 0);
        // The name is gone, so it gets a fresh slot 0 again.
        assert_eq!(table.open("a").unwrap(), 0);
    }
}
