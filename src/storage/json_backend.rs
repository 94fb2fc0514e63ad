use std::{
    fs,
    path::{Path, PathBuf},
};

use chrono::Utc;
use tracing::{debug, warn};

use super::KeyValueBackend;
use crate::{
    errors::Result,
    utils::{ensure_dir, paths, write_atomic},
};

const FILE_EXTENSION: &str = "json";
const BACKUP_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Stores each key as `<data_dir>/<encoded key>.json`.
#[derive(Debug, Clone)]
pub struct JsonFileBackend {
    data_dir: PathBuf,
    backups_dir: PathBuf,
}

impl JsonFileBackend {
    /// Opens (and creates) the data and backup folders under `base`.
    pub fn new(base: &Path) -> Result<Self> {
        let data_dir = paths::data_dir_in(base);
        let backups_dir = paths::backup_dir_in(base);
        ensure_dir(&data_dir)?;
        ensure_dir(&backups_dir)?;
        Ok(Self {
            data_dir,
            backups_dir,
        })
    }

    pub fn new_default() -> Result<Self> {
        Self::new(&paths::app_data_dir())
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn backups_dir(&self) -> &Path {
        &self.backups_dir
    }

    pub fn path_for(&self, key: &str) -> PathBuf {
        self.data_dir
            .join(format!("{}.{FILE_EXTENSION}", encode_key(key)))
    }
}

impl KeyValueBackend for JsonFileBackend {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key);
        if !path.exists() {
            return Ok(None);
        }
        Ok(Some(fs::read_to_string(path)?))
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let path = self.path_for(key);
        write_atomic(&path, value)?;
        debug!(key, path = %path.display(), "stored value");
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<bool> {
        let path = self.path_for(key);
        if !path.exists() {
            return Ok(false);
        }
        fs::remove_file(path)?;
        Ok(true)
    }

    fn keys(&self) -> Result<Vec<String>> {
        if !self.data_dir.exists() {
            return Ok(Vec::new());
        }
        let mut keys = Vec::new();
        for entry in fs::read_dir(&self.data_dir)? {
            let path = entry?.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(FILE_EXTENSION) {
                continue;
            }
            let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) else {
                continue;
            };
            match decode_key(stem) {
                Some(key) => keys.push(key),
                None => warn!(file = %path.display(), "skipping file with an undecodable name"),
            }
        }
        keys.sort();
        Ok(keys)
    }

    fn quarantine(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key);
        if !path.exists() {
            return Ok(None);
        }
        ensure_dir(&self.backups_dir)?;
        let target = self.backups_dir.join(format!(
            "{}_{}.{FILE_EXTENSION}",
            encode_key(key),
            Utc::now().format(BACKUP_TIMESTAMP_FORMAT)
        ));
        fs::rename(&path, &target)?;
        Ok(Some(target.display().to_string()))
    }
}

/// Keeps `[A-Za-z0-9._-]` and escapes every other byte as `%XX`.
fn encode_key(key: &str) -> String {
    let mut encoded = String::with_capacity(key.len());
    for byte in key.bytes() {
        match byte {
            b'a'..=b'z' | b'A'..=b'Z' | b'0'..=b'9' | b'.' | b'_' | b'-' => {
                encoded.push(byte as char)
            }
            other => encoded.push_str(&format!("%{other:02X}")),
        }
    }
    encoded
}

fn decode_key(encoded: &str) -> Option<String> {
    let bytes = encoded.as_bytes();
    let mut decoded = Vec::with_capacity(bytes.len());
    let mut index = 0;
    while index < bytes.len() {
        if bytes[index] == b'%' {
            let hex = encoded.get(index + 1..index + 3)?;
            decoded.push(u8::from_str_radix(hex, 16).ok()?);
            index += 3;
        } else {
            decoded.push(bytes[index]);
            index += 1;
        }
    }
    String::from_utf8(decoded).ok()
}
