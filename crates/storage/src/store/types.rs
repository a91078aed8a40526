#![forbid(unsafe_code)]

use mop_core::ChangeRecord;

/// All change-log entries that produced one version.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VersionChanges {
    pub version: i64,
    pub changed_at_ms: i64,
    pub changes: Vec<ChangeRecord>,
}

/// Entries must already be ordered by target version ascending.
pub(crate) fn group_by_version(entries: Vec<ChangeRecord>) -> Vec<VersionChanges> {
    let mut out: Vec<VersionChanges> = Vec::new();
    for entry in entries {
        match out.last_mut() {
            Some(group) if group.version == entry.target_version => group.changes.push(entry),
            _ => out.push(VersionChanges {
                version: entry.target_version,
                changed_at_ms: entry.changed_at_ms,
                changes: vec![entry],
            }),
        }
    }
    out
}
