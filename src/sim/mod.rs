//! In-memory storage controller, served over TCP.
//!
//! Stands in for the real remote controller so the shell and the tests can
//! run self-contained. One client is served at a time; when a session
//! unmounts, the listener goes back to accepting so the client can mount
//! again. Sector contents survive across sessions within one controller
//! lifetime, and across runs through an optional image file.

use std::collections::HashMap;
use std::fs;
use std::io::{self, Read, Write};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::path::PathBuf;
use std::thread;

use serde::{Deserialize, Serialize};

use crate::fs::config::{SECTORS_PER_TRACK, TRACK_COUNT};
use crate::proto::{CommandBlock, SECTOR_SIZE, OP_MOUNT, OP_READ, OP_SEEK, OP_UNMOUNT, OP_WRITE};

/// Everything the controller persists between runs.
#[derive(Debug, Default, Serialize, Deserialize)]
struct ControllerImage {
    sectors: HashMap<(i32, i16), Vec<u8>>,
}

#[derive(Debug)]
pub struct StorageController {
    image: ControllerImage,
    image_path: Option<PathBuf>,
    current_track: i32,
}

impl StorageController {
    pub fn new(image_path: Option<PathBuf>) -> Self {
        let image = image_path
            .as_deref()
            .and_then(|path| fs::read(path).ok())
            .and_then(|bytes| bincode::deserialize(&bytes).ok())
            .unwrap_or_default();
        Self { image, image_path, current_track: -1 }
    }

    /// Bind a loopback port and serve on a background thread. Returns the
    /// bound address for the client to mount against.
    pub fn spawn(image_path: Option<PathBuf>) -> io::Result<SocketAddr> {
        let listener = TcpListener::bind(("127.0.0.1", 0))?;
        let addr = listener.local_addr()?;
        let mut controller = Self::new(image_path);
        thread::spawn(move || controller.serve(listener));
        Ok(addr)
    }

    fn serve(&mut self, listener: TcpListener) {
        for stream in listener.incoming() {
            let Ok(stream) = stream else { continue };
            // A transport-level failure just drops this client; the next
            // mount gets a fresh connection.
            let _ = self.handle_client(stream);
            self.current_track = -1;
        }
    }

    fn handle_client(&mut self, mut stream: TcpStream) -> io::Result<()> {
        loop {
            let mut register = [0u8; 8];
            if stream.read_exact(&mut register).is_err() {
                return Ok(()); // client went away
            }
            let cmd = CommandBlock::decode(u64::from_be_bytes(register));

            match cmd.op {
                OP_MOUNT => {
                    reply(&mut stream, cmd.with_status(0))?;
                }
                OP_SEEK => {
                    let status = if track_in_range(cmd.track) {
                        self.current_track = cmd.track;
                        0
                    } else {
                        1
                    };
                    reply(&mut stream, cmd.with_status(status))?;
                }
                OP_READ => {
                    match self.resolve(cmd) {
                        Some((track, sector)) => {
                            let contents = self.sector_contents(track, sector);
                            reply(&mut stream, cmd.with_status(0))?;
                            stream.write_all(&contents)?;
                        }
                        None => reply(&mut stream, cmd.with_status(1))?,
                    }
                }
                OP_WRITE => {
                    let mut payload = [0u8; SECTOR_SIZE];
                    stream.read_exact(&mut payload)?;
                    match self.resolve(cmd) {
                        Some((track, sector)) => {
                            self.image.sectors.insert((track, sector), payload.to_vec());
                            reply(&mut stream, cmd.with_status(0))?;
                        }
                        None => reply(&mut stream, cmd.with_status(1))?,
                    }
                }
                OP_UNMOUNT => {
                    self.save_image();
                    reply(&mut stream, cmd.with_status(0))?;
                    return Ok(()); // connection closes with the session
                }
                _ => {
                    reply(&mut stream, cmd.with_status(1))?;
                }
            }
        }
    }

    /// Full address for a read/write: the register's track when given,
    /// else wherever the head was last seeked.
    fn resolve(&self, cmd: CommandBlock) -> Option<(i32, i16)> {
        let track = if cmd.track >= 0 { cmd.track } else { self.current_track };
        if !track_in_range(track) || !sector_in_range(cmd.sector) {
            return None;
        }
        Some((track, cmd.sector))
    }

    /// Sectors never written before read as the device-initialized
    /// pattern, which for this device is zeros.
    fn sector_contents(&self, track: i32, sector: i16) -> Vec<u8> {
        self.image
            .sectors
            .get(&(track, sector))
            .cloned()
            .unwrap_or_else(|| vec![0u8; SECTOR_SIZE])
    }

    fn save_image(&self) {
        let Some(path) = &self.image_path else { return };
        if let Ok(bytes) = bincode::serialize(&self.image) {
            let _ = fs::write(path, bytes);
        }
    }
}

fn reply(stream: &mut TcpStream, response: CommandBlock) -> io::Result<()> {
    stream.write_all(&response.encode().to_be_bytes())
}

fn track_in_range(track: i32) -> bool {
    (0..TRACK_COUNT as i32).contains(&track)
}

fn sector_in_range(sector: i16) -> bool {
    (0..SECTORS_PER_TRACK as i16).contains(&sector)
}
