//! Storage translation layer and session lifecycle.
//!
//! Maps open file handles and byte offsets onto (track, sector) addresses
//! on the remote device, driving the transport through the sector cache.
//! All table state lives in an explicit session object; mount and unmount
//! both reset it, so nothing logical survives a remount.

use crate::cache::{CacheMetrics, SectorCache};
use crate::fs::config::{MAX_FILES, SECTORS_PER_TRACK, TRACK_COUNT};
use crate::fs::error::{FsError, Result};
use crate::fs::file_table::{FileEntry, FileTable, Handle};
use crate::fs::sector_map::SectorMap;
use crate::net::{Endpoint, Transport};
use crate::proto::{CommandBlock, SectorBuf, SECTOR_SIZE};
use crate::utils::generate_uuid;

pub mod config;
pub mod error;
pub mod file_table;
pub mod init;
pub mod sector_map;

/// One client session against the remote storage controller.
#[derive(Debug)]
pub struct FileSystem {
    endpoint: Endpoint,
    transport: Transport,
    cache: SectorCache,
    files: FileTable,
    sectors: SectorMap,
    mounted: bool,
    session_id: String,
}

impl FileSystem {
    pub fn new(endpoint: Endpoint, cache_lines: usize) -> Self {
        Self {
            endpoint,
            transport: Transport::new(),
            cache: SectorCache::new(cache_lines),
            files: FileTable::new(MAX_FILES),
            sectors: SectorMap::new(TRACK_COUNT, SECTORS_PER_TRACK),
            mounted: false,
            session_id: generate_uuid(),
        }
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    pub fn cache_metrics(&self) -> CacheMetrics {
        self.cache.metrics()
    }

    /// Descriptors currently in the table, for listings.
    pub fn files(&self) -> impl Iterator<Item = (Handle, &FileEntry)> {
        self.files.iter()
    }

    pub fn open_file_count(&self) -> usize {
        self.files.open_count()
    }

    pub fn stat(&self, handle: Handle) -> Result<FileEntry> {
        Ok(self.files.get(handle)?.clone())
    }

    /// Connect and perform the mount handshake. Starts the session from a
    /// clean file table and sector map.
    pub fn mount(&mut self) -> Result<()> {
        if self.mounted {
            return Err(FsError::AlreadyMounted);
        }

        self.transport.connect(&self.endpoint)?;
        if let Err(e) = self.command(CommandBlock::mount(), None, None) {
            self.transport.disconnect();
            return Err(e);
        }

        self.files.reset();
        self.sectors.reset();
        self.mounted = true;
        Ok(())
    }

    /// Unmount handshake, then drop the connection. Clears the same state
    /// as mount so the logical view does not outlive the session.
    pub fn unmount(&mut self) -> Result<()> {
        if !self.mounted {
            return Err(FsError::NotMounted);
        }

        self.command(CommandBlock::unmount(), None, None)?;
        self.files.reset();
        self.sectors.reset();
        self.mounted = false;
        self.transport.disconnect();
        Ok(())
    }

    pub fn open(&mut self, name: &str) -> Result<Handle> {
        self.files.open(name)
    }

    pub fn close(&mut self, handle: Handle) -> Result<()> {
        self.files.close(handle)
    }

    /// Set the file position. Anywhere from 0 through the current size is
    /// valid; position == size is the legal at-end state.
    pub fn seek(&mut self, handle: Handle, offset: i64) -> Result<()> {
        self.require_mounted()?;
        let entry = self.files.get_open_mut(handle)?;
        if offset < 0 || offset as usize > entry.size {
            return Err(FsError::SeekOutOfBounds { offset, size: entry.size });
        }
        entry.position = offset as usize;
        Ok(())
    }

    /// Read up to `count` bytes from the current position.
    ///
    /// The byte range is walked one sector at a time; running out of
    /// assigned sectors ends the read early with whatever was copied.
    pub fn read(&mut self, handle: Handle, count: usize) -> Result<Vec<u8>> {
        self.require_mounted()?;
        self.files.get_open(handle)?;

        let mut out = Vec::with_capacity(count);
        while out.len() < count {
            let position = self.files.get_open(handle)?.position;
            let index = position / SECTOR_SIZE;
            let offset = position % SECTOR_SIZE;

            let (track, sector) = match self.sectors.locate(handle, index) {
                Some(address) => address,
                None => break, // end of assigned data, not an error
            };

            let len = (count - out.len()).min(SECTOR_SIZE - offset);
            let buf = self.sector_for_read(track, sector)?;
            out.extend_from_slice(&buf[offset..offset + len]);
            self.files.get_open_mut(handle)?.position += len;
        }
        Ok(out)
    }

    /// Write `data` at the current position, allocating sectors as the
    /// file grows. Returns the number of bytes written.
    pub fn write(&mut self, handle: Handle, data: &[u8]) -> Result<usize> {
        self.require_mounted()?;
        self.files.get_open(handle)?;

        let mut written = 0;
        while written < data.len() {
            let position = self.files.get_open(handle)?.position;
            let index = position / SECTOR_SIZE;
            let offset = position % SECTOR_SIZE;

            let (track, sector) = match self.sectors.locate(handle, index) {
                Some(address) => address,
                None => self.sectors.allocate(handle).ok_or(FsError::StorageFull)?,
            };

            let len = (data.len() - written).min(SECTOR_SIZE - offset);

            // Whole sectors travel on the wire, so a partial write first
            // needs the sector's current contents. A freshly allocated
            // sector is fetched too: bytes outside the written range keep
            // whatever the device initialized them to.
            let mut buf = match self.cache.lookup(track, sector).map(|b| *b) {
                Some(buf) => buf,
                None => self.fetch_sector(track, sector)?,
            };
            buf[offset..offset + len].copy_from_slice(&data[written..written + len]);

            self.store_sector(track, sector, &buf)?;
            self.cache.insert(track, sector, &buf);

            written += len;
            let entry = self.files.get_open_mut(handle)?;
            entry.position += len;
            if entry.position > entry.size {
                entry.size = entry.position;
            }
        }
        Ok(written)
    }

    fn require_mounted(&self) -> Result<()> {
        if self.mounted {
            Ok(())
        } else {
            Err(FsError::NotMounted)
        }
    }

    /// Sector contents for the read path: cache first, remote on a miss.
    fn sector_for_read(&mut self, track: i32, sector: i16) -> Result<SectorBuf> {
        if let Some(buf) = self.cache.lookup(track, sector) {
            return Ok(*buf);
        }
        let buf = self.fetch_sector(track, sector)?;
        self.cache.insert(track, sector, &buf);
        Ok(buf)
    }

    /// Remote seek + read round-trips for one sector.
    fn fetch_sector(&mut self, track: i32, sector: i16) -> Result<SectorBuf> {
        self.command(CommandBlock::seek(track), None, None)?;
        let mut buf = [0u8; SECTOR_SIZE];
        self.command(CommandBlock::read(sector, track), None, Some(&mut buf))?;
        Ok(buf)
    }

    /// Remote write of one full sector.
    fn store_sector(&mut self, track: i32, sector: i16, buf: &SectorBuf) -> Result<()> {
        self.command(CommandBlock::write(sector, track), Some(buf), None)?;
        Ok(())
    }

    /// One command round-trip; a nonzero response status is a hard error.
    fn command(
        &mut self,
        cmd: CommandBlock,
        send: Option<&SectorBuf>,
        recv: Option<&mut SectorBuf>,
    ) -> Result<CommandBlock> {
        let response = self.transport.call(cmd.encode(), send, recv)?;
        let response = CommandBlock::decode(response);
        if response.status != 0 {
            return Err(FsError::Controller { op: cmd.op, status: response.status });
        }
        Ok(response)
    }
}
