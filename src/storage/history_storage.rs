use std::io;
use std::path::{Path, PathBuf};

use bincode::config;
use compio::fs;
use snafu::prelude::*;
use tracing::{debug, info};

use crate::history::LocalHistory;

/// Storage location relative to the project root.
pub const DEFAULT_STORAGE_PATH: &str = ".lvcs/history.bin";

const FORMAT_VERSION: u32 = 1;
const DEFAULT_COMPRESSION_LEVEL: i32 = 3;

/// Reads and writes a whole history as one zstd-compressed bincode file.
///
/// The payload starts with a format version so that older files are
/// rejected instead of misread.
#[derive(Debug, Clone)]
pub struct HistoryStorage {
    path: PathBuf,
    compression_level: i32,
}

impl HistoryStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        HistoryStorage {
            path: path.into(),
            compression_level: DEFAULT_COMPRESSION_LEVEL,
        }
    }

    pub fn with_compression_level(mut self, compression_level: i32) -> Self {
        self.compression_level = compression_level;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the stored history, or an empty one when nothing was stored yet.
    pub async fn read(&self) -> Result<LocalHistory, StorageError> {
        debug!("Reading local history from {}", self.path.display());
        let bytes = match fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(error) if error.kind() == io::ErrorKind::NotFound => {
                info!("No existing local history found, starting fresh");
                return Ok(LocalHistory::new());
            }
            Err(error) => {
                return Err(error).context(ReadSnafu {
                    path: self.path.clone(),
                });
            }
        };

        let history = Self::decode(&bytes)?;
        debug!(
            "Read local history with {} change sets",
            history.change_list().len()
        );
        Ok(history)
    }

    pub async fn write(&self, history: &LocalHistory) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).await.context(WriteSnafu {
                path: self.path.clone(),
            })?;
        }

        let bytes = self.encode(history)?;
        let length = bytes.len();
        let result = fs::write(&self.path, bytes).await;
        result.0.context(WriteSnafu {
            path: self.path.clone(),
        })?;

        debug!("Wrote {} bytes to {}", length, self.path.display());
        Ok(())
    }

    pub fn encode(&self, history: &LocalHistory) -> Result<Vec<u8>, StorageError> {
        let encoded = bincode::encode_to_vec((FORMAT_VERSION, history), config::standard())
            .context(EncodeSnafu)?;
        zstd::encode_all(encoded.as_slice(), self.compression_level).context(CompressSnafu)
    }

    pub fn decode(bytes: &[u8]) -> Result<LocalHistory, StorageError> {
        let encoded = zstd::decode_all(bytes).context(DecompressSnafu)?;

        let (version, offset): (u32, usize) =
            bincode::decode_from_slice(&encoded, config::standard()).context(DecodeSnafu)?;
        ensure!(
            version == FORMAT_VERSION,
            UnsupportedVersionSnafu { version }
        );

        let (history, _): (LocalHistory, usize) =
            bincode::decode_from_slice(&encoded[offset..], config::standard())
                .context(DecodeSnafu)?;
        Ok(history)
    }
}

#[derive(Debug, Snafu)]
pub enum StorageError {
    #[snafu(display("Failed to read local history from {}", path.display()))]
    ReadError { path: PathBuf, source: io::Error },
    #[snafu(display("Failed to write local history to {}", path.display()))]
    WriteError { path: PathBuf, source: io::Error },
    #[snafu(display("Failed to encode local history"))]
    EncodeError {
        source: bincode::error::EncodeError,
    },
    #[snafu(display("Failed to decode local history"))]
    DecodeError {
        source: bincode::error::DecodeError,
    },
    #[snafu(display("Failed to compress local history"))]
    CompressError { source: io::Error },
    #[snafu(display("Failed to decompress local history"))]
    DecompressError { source: io::Error },
    #[snafu(display("Local history format version {} is not supported", version))]
    UnsupportedVersionError { version: u32 },
}
