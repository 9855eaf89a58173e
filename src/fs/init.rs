use std::env;
use std::path::PathBuf;
use std::sync::mpsc::Sender;
use std::thread;
use std::time::Duration;

use crate::fs::config::{CACHE_LINES_ENV, DEFAULT_CACHE_LINES};
use crate::fs::FileSystem;
use crate::net::Endpoint;
use crate::shell::BootProgress;
use crate::sim::StorageController;

const IMAGE_PATH: &str = "controller.img";

/// Boot a storage session on a worker thread, reporting progress back to
/// the shell. With no endpoint configured in the environment, a local
/// controller is spawned and the session mounts against it.
pub fn perform_session_boot(tx: Sender<BootProgress>) {
    let endpoint = match Endpoint::from_env() {
        Some(endpoint) => {
            tx.send(BootProgress::Step("📡 Using configured storage controller..."))
                .unwrap();
            endpoint
        }
        None => {
            tx.send(BootProgress::Step("🧠 Starting local storage controller..."))
                .unwrap();
            match StorageController::spawn(Some(PathBuf::from(IMAGE_PATH))) {
                Ok(addr) => Endpoint::new(addr.ip().to_string(), addr.port()),
                Err(e) => {
                    tx.send(BootProgress::Finished(Err(Box::new(e)))).unwrap();
                    return;
                }
            }
        }
    };

    for i in 0..=40 {
        let _ = tx.send(BootProgress::Progress(i));
        thread::sleep(Duration::from_millis(5));
    }

    tx.send(BootProgress::Step("⚙️  Mounting remote file system..."))
        .unwrap();

    let cache_lines = env::var(CACHE_LINES_ENV)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(DEFAULT_CACHE_LINES);

    let mut fs = FileSystem::new(endpoint, cache_lines);
    if let Err(e) = fs.mount() {
        tx.send(BootProgress::Finished(Err(Box::new(e)))).unwrap();
        return;
    }

    for i in 40..=100 {
        let _ = tx.send(BootProgress::Progress(i));
        thread::sleep(Duration::from_millis(5));
    }

    tx.send(BootProgress::Finished(Ok(fs))).unwrap();
}
