//! Directory-backed tile mirror.
//!
//! Layout:
//!
//! ```text
//! <dir>/
//! ├── SCHEMA                     # schema version marker
//! └── <sha256(url)>.tile         # bincode TileRecord
//! ```

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::{debug, info, warn};

use super::{BoxFuture, MirrorError, TileMirror};
use crate::cache::types::CachedTile;

/// Current on-disk record schema.
pub const SCHEMA_VERSION: u32 = 1;

const SCHEMA_FILE: &str = "SCHEMA";
const TILE_EXTENSION: &str = "tile";
const TEMP_EXTENSION: &str = "tmp";

#[derive(Debug, Serialize, Deserialize)]
struct TileRecord {
    schema_version: u32,
    url: String,
    data: Vec<u8>,
    timestamp: u64,
    access_count: u64,
    last_accessed: u64,
}

impl From<&CachedTile> for TileRecord {
    fn from(tile: &CachedTile) -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            url: tile.url.clone(),
            data: tile.data.to_vec(),
            timestamp: tile.timestamp,
            access_count: tile.access_count,
            last_accessed: tile.last_accessed,
        }
    }
}

impl From<TileRecord> for CachedTile {
    fn from(record: TileRecord) -> Self {
        Self {
            url: record.url,
            data: record.data.into(),
            timestamp: record.timestamp,
            access_count: record.access_count,
            last_accessed: record.last_accessed,
        }
    }
}

/// Tile mirror storing one file per tile.
#[derive(Debug, Clone)]
pub struct DiskMirror {
    directory: PathBuf,
}

impl DiskMirror {
    /// Open (creating if needed) a mirror directory.
    ///
    /// Fails with [`MirrorError::Schema`] if the directory was written with a
    /// newer schema than this build understands.
    pub async fn open(directory: impl Into<PathBuf>) -> Result<Self, MirrorError> {
        let directory = directory.into();
        tokio::fs::create_dir_all(&directory).await?;

        let marker = directory.join(SCHEMA_FILE);
        match tokio::fs::read_to_string(&marker).await {
            Ok(contents) => match contents.trim().parse::<u32>() {
                Ok(found) if found > SCHEMA_VERSION => {
                    return Err(MirrorError::Schema {
                        found,
                        supported: SCHEMA_VERSION,
                    });
                }
                Ok(found) if found == SCHEMA_VERSION => {}
                Ok(found) => {
                    info!(
                        from = found,
                        to = SCHEMA_VERSION,
                        "Upgrading tile mirror schema marker"
                    );
                    Self::write_schema_marker(&marker).await?;
                }
                Err(_) => {
                    warn!(path = %marker.display(), "Unreadable schema marker, rewriting");
                    Self::write_schema_marker(&marker).await?;
                }
            },
            Err(e) if e.kind() == ErrorKind::NotFound => {
                Self::write_schema_marker(&marker).await?;
            }
            Err(e) => return Err(e.into()),
        }

        debug!(directory = %directory.display(), "Tile mirror opened");
        Ok(Self { directory })
    }

    /// Mirror directory.
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    async fn write_schema_marker(path: &Path) -> Result<(), MirrorError> {
        tokio::fs::write(path, SCHEMA_VERSION.to_string()).await?;
        Ok(())
    }

    /// File name for a tile URL: hex SHA-256 plus extension.
    fn key_to_filename(url: &str) -> String {
        format!("{:x}.{}", Sha256::digest(url.as_bytes()), TILE_EXTENSION)
    }

    fn tile_path(&self, url: &str) -> PathBuf {
        self.directory.join(Self::key_to_filename(url))
    }

    async fn read_record(path: &Path) -> Result<TileRecord, MirrorError> {
        let bytes = tokio::fs::read(path).await?;
        bincode::deserialize(&bytes).map_err(MirrorError::Decode)
    }

    /// Best-effort removal of a record skipped during load.
    async fn discard_record(path: &Path) {
        if let Err(e) = Self::remove_if_exists(path).await {
            warn!(path = %path.display(), error = %e, "Failed to remove skipped tile record");
        }
    }

    async fn remove_if_exists(path: &Path) -> Result<(), MirrorError> {
        match tokio::fs::remove_file(path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

impl TileMirror for DiskMirror {
    fn load_all(&self) -> BoxFuture<'_, Result<Vec<CachedTile>, MirrorError>> {
        Box::pin(async move {
            let mut tiles = Vec::new();
            let mut entries = tokio::fs::read_dir(&self.directory).await?;

            loop {
                let entry = match entries.next_entry().await {
                    Ok(Some(entry)) => entry,
                    Ok(None) => break,
                    Err(e) => {
                        warn!(
                            directory = %self.directory.display(),
                            error = %e,
                            "Stopped listing tile mirror early"
                        );
                        break;
                    }
                };

                let path = entry.path();
                if !path.extension().is_some_and(|ext| ext == TILE_EXTENSION) {
                    continue;
                }

                match Self::read_record(&path).await {
                    Ok(record) if record.schema_version == SCHEMA_VERSION => {
                        tiles.push(record.into());
                    }
                    Ok(record) => {
                        warn!(
                            path = %path.display(),
                            schema_version = record.schema_version,
                            "Skipping tile record with unsupported schema"
                        );
                        Self::discard_record(&path).await;
                    }
                    Err(e) => {
                        warn!(path = %path.display(), error = %e, "Skipping unreadable tile record");
                        Self::discard_record(&path).await;
                    }
                }
            }

            debug!(count = tiles.len(), "Loaded tile records from disk");
            Ok(tiles)
        })
    }

    fn store(&self, tile: CachedTile) -> BoxFuture<'_, Result<(), MirrorError>> {
        let path = self.tile_path(&tile.url);
        Box::pin(async move {
            let encoded =
                bincode::serialize(&TileRecord::from(&tile)).map_err(MirrorError::Encode)?;

            // Write atomically via temp file
            let temp_path = path.with_extension(TEMP_EXTENSION);
            tokio::fs::write(&temp_path, &encoded).await?;
            tokio::fs::rename(&temp_path, &path).await?;
            Ok(())
        })
    }

    fn delete<'a>(&'a self, url: &'a str) -> BoxFuture<'a, Result<(), MirrorError>> {
        Box::pin(async move { Self::remove_if_exists(&self.tile_path(url)).await })
    }

    fn clear(&self) -> BoxFuture<'_, Result<(), MirrorError>> {
        Box::pin(async move {
            let mut removed = 0usize;
            let mut entries = tokio::fs::read_dir(&self.directory).await?;

            while let Some(entry) = entries.next_entry().await? {
                let path = entry.path();
                let is_tile_file = path
                    .extension()
                    .is_some_and(|ext| ext == TILE_EXTENSION || ext == TEMP_EXTENSION);
                if is_tile_file {
                    Self::remove_if_exists(&path).await?;
                    removed += 1;
                }
            }

            debug!(removed, "Cleared tile mirror");
            Ok(())
        })
    }

    fn name(&self) -> &str {
        "disk"
    }
}
