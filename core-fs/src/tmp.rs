//! Temp-file lifecycle: creation under the temp root, wholesale deletion and
//! expiry sweeps.

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use crate::error::{IoResult, VoidIoResult};
use crate::opfs::Opfs;
use crate::paths::{generate_temp_path, join};
use crate::types::TempOptions;

impl Opfs {
    /// Create a temp file or directory and return its path.
    ///
    /// The random token is a v4 UUID; collisions are not checked for. A
    /// store failure is returned unchanged and no path is reported.
    pub async fn mk_temp(&self, options: &TempOptions) -> IoResult<String> {
        let path = generate_temp_path(&self.tmp_dir, options);

        let created = if options.is_directory {
            self.mkdir(&path).await
        } else {
            self.create_file(&path).await
        };

        debug!(path = %path, is_directory = options.is_directory, ok = created.is_ok(), "mk_temp");
        created.and(Ok(path))
    }

    /// Remove the temp root and everything below it.
    pub async fn delete_temp(&self) -> VoidIoResult {
        self.remove(&self.tmp_dir).await
    }

    /// Remove every file under the temp root last modified at or before
    /// `expired`.
    ///
    /// Directories are never removed, even when the sweep leaves them empty.
    /// The first store error stops the sweep; files already removed stay
    /// removed.
    pub async fn prune_temp(&self, expired: DateTime<Utc>) -> VoidIoResult {
        let cutoff = expired.timestamp_millis();
        let entries = self.read_dir(&self.tmp_dir, true).await?;

        let mut removed = 0usize;
        for entry in entries {
            let handle = &entry.handle;
            let is_expired = handle.last_modified.is_some_and(|modified| modified <= cutoff);
            if handle.is_file() && is_expired {
                self.remove(&join(&self.tmp_dir, &entry.path)).await?;
                removed += 1;
            }
        }

        info!(removed, cutoff, "Pruned temp directory");
        Ok(())
    }
}
