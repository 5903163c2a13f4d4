//! Archive Codec Abstraction

use async_trait::async_trait;
use bytes::Bytes;
use std::collections::BTreeMap;

use crate::error::Result;

/// Decoded archive: entry path (relative, `/`-separated) to entry bytes.
///
/// Directory markers keep their trailing `/` and carry empty contents.
pub type ArchiveEntries = BTreeMap<String, Bytes>;

/// Byte-level decompression codec for multi-entry archives.
///
/// Decoding a malformed buffer fails with
/// [`BridgeError::Codec`](crate::BridgeError::Codec).
#[async_trait]
pub trait ArchiveCodec: Send + Sync {
    async fn decode(&self, data: Bytes) -> Result<ArchiveEntries>;
}
