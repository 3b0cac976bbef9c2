//! File persistence with file locking.
//!
//! Readers take a shared lock; writers go through a locked temp file that is
//! atomically renamed over the target, so a crash mid-write never leaves a
//! truncated config behind.

use crate::{Error, Result};
use fs2::FileExt;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;
use tempfile::NamedTempFile;

/// Read a whole file under a shared lock
pub fn read_locked(path: &Path) -> Result<String> {
    let file = File::open(path)?;
    file.lock_shared()?;

    let mut contents = String::new();
    let read = std::io::BufReader::new(&file).read_to_string(&mut contents);
    file.unlock()?;
    read?;

    Ok(contents)
}

/// Replace `path` with `contents` atomically
///
/// 1. Write to a temp file in the same directory
/// 2. Sync to disk
/// 3. Rename over the original
pub fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    let parent = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    std::fs::create_dir_all(parent)?;

    let temp = NamedTempFile::new_in(parent)?;
    // Serializes concurrent writers
    temp.as_file().lock_exclusive()?;

    {
        let mut writer = std::io::BufWriter::new(temp.as_file());
        writer.write_all(contents.as_bytes())?;
        writer.flush()?;
    }

    temp.as_file().sync_all()?;
    temp.as_file().unlock()?;

    temp.persist(path).map_err(|e| Error::Io(e.error))?;
    tracing::debug!("Wrote {} bytes to {:?}", contents.len(), path);
    Ok(())
}

/// Load and parse a TOML file
pub fn load_toml<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let contents = read_locked(path)?;
    Ok(toml::from_str(&contents)?)
}

/// Serialize `value` as pretty TOML and write it atomically
pub fn save_toml<T: Serialize>(value: &T, path: &Path) -> Result<()> {
    let contents = toml::to_string_pretty(value)?;
    write_atomic(path, &contents)
}
