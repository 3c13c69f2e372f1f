//! Append-only JSON-lines file store with size-based rotation.
//!
//! Each saved record becomes one compact JSON line. When the active file
//! reaches the configured size threshold, it is shifted to a numbered slot
//! (`requests.log` → `requests.log.1`, previous `.1` → `.2`, …) and a fresh
//! file is opened; slots past `max_rotated_files` are removed. Daily
//! rotation is unnecessary — every record carries its own timestamp.
//!
//! Thread-safe: a `Mutex<BufWriter>` serialises writes from concurrent
//! request handlers.

use crate::store::LogStore;
use apitrail_core::config::FileStoreConfig;
use apitrail_core::{RequestLog, TrailError};
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::sync::Mutex;
use tracing::debug;

pub struct FileStore {
    config: FileStoreConfig,
    state: Mutex<FileState>,
}

struct FileState {
    writer: BufWriter<File>,
    written: u64,
}

impl FileStore {
    /// Open (or create) the active log file, creating parent directories
    /// as needed.
    pub fn open(config: FileStoreConfig) -> Result<Self, TrailError> {
        if let Some(parent) = config.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&config.path)?;
        let written = file.metadata()?.len();

        Ok(Self {
            config,
            state: Mutex::new(FileState {
                writer: BufWriter::new(file),
                written,
            }),
        })
    }

    /// Slot path: `requests.log` → `requests.log.3`.
    fn slot(&self, index: usize) -> PathBuf {
        let mut path = self.config.path.as_os_str().to_owned();
        path.push(format!(".{index}"));
        PathBuf::from(path)
    }

    /// Shift rotated slots up by one and move the active file into `.1`,
    /// then reopen a fresh active file.
    fn rotate(&self, state: &mut FileState) -> io::Result<()> {
        state.writer.flush()?;

        let keep = self.config.max_rotated_files;
        if keep == 0 {
            fs::remove_file(&self.config.path)?;
        } else {
            let oldest = self.slot(keep);
            if oldest.exists() {
                fs::remove_file(&oldest)?;
            }
            for index in (1..keep).rev() {
                let from = self.slot(index);
                if from.exists() {
                    fs::rename(&from, self.slot(index + 1))?;
                }
            }
            fs::rename(&self.config.path, self.slot(1))?;
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.config.path)?;
        state.writer = BufWriter::new(file);
        state.written = 0;
        debug!(path = %self.config.path.display(), "Rotated request log file");
        Ok(())
    }
}

impl LogStore for FileStore {
    fn save(&self, record: &RequestLog) -> Result<(), TrailError> {
        let line = record.to_json_line();
        let mut state = self
            .state
            .lock()
            .map_err(|_| TrailError::Store("file store lock poisoned".to_string()))?;

        if self.config.max_file_size_bytes > 0 && state.written >= self.config.max_file_size_bytes
        {
            self.rotate(&mut state)?;
        }

        state.writer.write_all(line.as_bytes())?;
        state.writer.write_all(b"\n")?;
        state.writer.flush()?;
        state.written += line.len() as u64 + 1;
        Ok(())
    }
}
