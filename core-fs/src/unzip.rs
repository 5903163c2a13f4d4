//! Archive expansion: decode a compressed buffer and materialize its file
//! entries under a target directory.

use bridge_traits::{ArchiveCodec, BridgeError, FetchOptions, Fetcher};
use bytes::Bytes;
use core_async::task::join_all;
use tracing::{debug, warn};

use crate::assertions::{assert_absolute_path, assert_file_url};
use crate::error::{first_failure, FsError, IoResult, VoidIoResult};
use crate::opfs::Opfs;
use crate::paths::{is_within, join, SEPARATOR};

impl Opfs {
    /// Expand the archive stored at `zip_path` into `target`.
    ///
    /// Equivalent to `unzip -o <zip_path> -d <target>`.
    pub async fn unzip(&self, zip_path: &str, target: &str) -> VoidIoResult {
        assert_absolute_path(target);
        let data = self.read_file(zip_path).await?;
        self.unzip_buffer(data, target).await
    }

    /// Retrieve an archive from `url` and expand it into `target`.
    ///
    /// Redirects follow `options.redirect` (follow by default). The request
    /// is not abortable.
    pub async fn unzip_from_url(
        &self,
        url: &str,
        target: &str,
        options: &FetchOptions,
    ) -> VoidIoResult {
        assert_file_url(url);
        assert_absolute_path(target);

        let data = self
            .fetcher()?
            .fetch(url, options)
            .await
            .map_err(|e| match e {
                BridgeError::Http(m) => FsError::Retrieval(m),
                other => FsError::Retrieval(other.to_string()),
            })?;
        self.unzip_buffer(data, target).await
    }

    /// Decode `data` and write every file entry under `target`.
    ///
    /// Entries ending in `/` are directory markers and produce no node;
    /// writing a file creates its parents. All writes run concurrently and
    /// all of them are awaited. The result is the first failure in entry
    /// path order; writes that succeeded are kept.
    pub async fn unzip_buffer(&self, data: Bytes, target: &str) -> VoidIoResult {
        assert_absolute_path(target);

        let entries = self.codec()?.decode(data).await.map_err(|e| match e {
            BridgeError::Codec(m) => FsError::Codec(m),
            other => FsError::Codec(other.to_string()),
        })?;

        let writes = entries
            .into_iter()
            .filter(|(entry, _)| !entry.ends_with(SEPARATOR))
            .map(|(entry, contents)| {
                let fs = self.clone();
                let path = join(target, &entry);
                async move {
                    if !is_within(target, &path) {
                        return Err(FsError::Codec(format!(
                            "entry {} escapes target directory",
                            entry
                        )));
                    }
                    fs.write_file(&path, contents).await
                }
            });

        let results = join_all(writes).await;
        let total = results.len();
        let outcome = first_failure(results);

        match &outcome {
            Ok(()) => debug!(target = %target, files = total, "Expanded archive"),
            Err(e) => warn!(target = %target, files = total, error = %e, "Archive expansion failed"),
        }
        outcome
    }

    fn fetcher(&self) -> IoResult<&dyn Fetcher> {
        self.fetcher
            .as_deref()
            .ok_or_else(|| FsError::Retrieval("no fetcher configured".to_string()))
    }

    fn codec(&self) -> IoResult<&dyn ArchiveCodec> {
        self.codec
            .as_deref()
            .ok_or_else(|| FsError::Codec("no archive codec configured".to_string()))
    }
}
