#![forbid(unsafe_code)]

use super::*;
use mop_core::{Mop, replay};

impl SqliteStore {
    /// The MOP as it was at `target_version`.
    ///
    /// `Ok(None)` means the version does not exist yet. Only change-log entries newer
    /// than the target are loaded; the rebuild itself is a pure fold in `mop_core`.
    pub fn get_mop_version(
        &self,
        mop_id: i64,
        target_version: i64,
    ) -> Result<Option<Mop>, StoreError> {
        if target_version < 1 {
            return Err(StoreError::InvalidInput("version must be >= 1"));
        }

        let tx = self.conn.unchecked_transaction()?;
        let current = load_mop(&tx, mop_id)?.ok_or(StoreError::UnknownId)?;
        if target_version > current.version {
            return Ok(None);
        }
        let newer = load_changes(&tx, mop_id, Some(target_version))?;
        tx.commit()?;

        let Some(reconstruction) = replay::reconstruct(&current, &newer, target_version) else {
            return Ok(None);
        };
        if !reconstruction.skipped.is_empty() {
            tracing::warn!(
                mop_id,
                target_version,
                skipped = ?reconstruction.skipped,
                "skipped historical step changes whose step no longer exists"
            );
        }
        tracing::debug!(
            mop_id,
            target_version,
            current_version = current.version,
            reverted = newer.len(),
            "reconstructed mop version"
        );
        Ok(Some(reconstruction.mop))
    }
}
