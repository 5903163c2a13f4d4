//! Archive Codec Implementation using `zip`

use async_trait::async_trait;
use bridge_traits::{
    codec::{ArchiveCodec, ArchiveEntries},
    error::{BridgeError, Result},
};
use bytes::Bytes;
use std::io::{Cursor, Read};
use tracing::debug;

/// Zip decoder.
///
/// Decompression is CPU-bound, so it runs on the blocking pool rather than
/// on the calling task.
#[derive(Debug, Default, Clone, Copy)]
pub struct ZipCodec;

impl ZipCodec {
    pub fn new() -> Self {
        Self
    }

    fn decode_blocking(data: Bytes) -> Result<ArchiveEntries> {
        let mut archive = zip::ZipArchive::new(Cursor::new(data))
            .map_err(|e| BridgeError::Codec(e.to_string()))?;

        let mut entries = ArchiveEntries::new();
        for index in 0..archive.len() {
            let mut file = archive
                .by_index(index)
                .map_err(|e| BridgeError::Codec(e.to_string()))?;
            let name = file.name().to_string();
            let declared = file.size();

            // The declared size is untrusted: never pre-allocate from it, and
            // read at most one byte past it so a mismatch is detectable.
            let mut contents = Vec::new();
            (&mut file)
                .take(declared.saturating_add(1))
                .read_to_end(&mut contents)
                .map_err(|e| BridgeError::Codec(format!("{}: {}", name, e)))?;
            if contents.len() as u64 != declared {
                return Err(BridgeError::Codec(format!(
                    "{}: declared size {} but entry holds {} bytes",
                    name,
                    declared,
                    contents.len()
                )));
            }
            entries.insert(name, Bytes::from(contents));
        }

        Ok(entries)
    }
}

#[async_trait]
impl ArchiveCodec for ZipCodec {
    async fn decode(&self, data: Bytes) -> Result<ArchiveEntries> {
        let size = data.len();
        let entries = core_async::task::spawn_blocking(move || Self::decode_blocking(data))
            .await
            .map_err(|e| BridgeError::OperationFailed(format!("zip decode task: {}", e)))??;
        debug!(size, entries = entries.len(), "Decoded archive");
        Ok(entries)
    }
}
