#![forbid(unsafe_code)]

//! Rebuilding historical MOP snapshots from the change log.
//!
//! Both directions are folds over an ordered slice of [`ChangeRecord`]s that produce a
//! fresh snapshot; the input MOP is never touched, so callers can keep serving the
//! current state while a reconstruction is in progress.
//!
//! Step changes are replayed by step number. Step numbers are stable today because steps
//! are never reordered or removed; if that ever changes, replay-by-number can hit the
//! wrong step. Changes whose step no longer exists are skipped and reported.

use crate::change::{ChangeRecord, FieldKind};
use crate::model::Mop;
use crate::prerequisites;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Reconstruction {
    pub mop: Mop,
    /// Ids of change records that could not be replayed (missing step).
    pub skipped: Vec<i64>,
}

/// Snapshot of `current` as it was at `target_version`, or `None` if that version does
/// not exist yet.
///
/// `changes` may be in any order and may include entries at or below the target; only
/// entries with `target_version > target` are reverted, newest first.
pub fn reconstruct(
    current: &Mop,
    changes: &[ChangeRecord],
    target_version: i64,
) -> Option<Reconstruction> {
    if target_version > current.version {
        return None;
    }

    let mut newest_first = changes.iter().collect::<Vec<_>>();
    newest_first.sort_by(|a, b| {
        b.target_version
            .cmp(&a.target_version)
            .then_with(|| b.id.cmp(&a.id))
    });

    let initial = Reconstruction {
        mop: current.clone(),
        skipped: Vec::new(),
    };
    let mut out = newest_first
        .into_iter()
        .take_while(|change| change.target_version > target_version)
        .fold(initial, |acc, change| overwrite(acc, change, &change.old_value));
    out.mop.version = target_version;
    Some(out)
}

/// Replays recorded new values on top of `snapshot` for every change in
/// `(snapshot.version, to_version]`, oldest first.
pub fn fast_forward(snapshot: &Mop, changes: &[ChangeRecord], to_version: i64) -> Reconstruction {
    let mut oldest_first = changes
        .iter()
        .filter(|change| {
            change.target_version > snapshot.version && change.target_version <= to_version
        })
        .collect::<Vec<_>>();
    oldest_first.sort_by(|a, b| {
        a.target_version
            .cmp(&b.target_version)
            .then_with(|| a.id.cmp(&b.id))
    });

    let initial = Reconstruction {
        mop: snapshot.clone(),
        skipped: Vec::new(),
    };
    let mut out = oldest_first
        .into_iter()
        .fold(initial, |acc, change| overwrite(acc, change, &change.new_value));
    out.mop.version = to_version.max(snapshot.version);
    out
}

fn overwrite(mut acc: Reconstruction, change: &ChangeRecord, value: &str) -> Reconstruction {
    match change.field {
        FieldKind::Title => acc.mop.title = value.to_string(),
        FieldKind::Description => acc.mop.description = value.to_string(),
        FieldKind::Prerequisites => acc.mop.prerequisites = prerequisites::decode(value),
        FieldKind::Steps => {
            let step = change
                .step_number
                .and_then(|n| acc.mop.step_by_number_mut(n));
            match step {
                Some(step) => step.action = value.to_string(),
                None => acc.skipped.push(change.id),
            }
        }
    }
    acc
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Step;

    fn step(id: i64, step_number: i64, action: &str) -> Step {
        Step {
            id,
            step_number,
            mop_id: 1,
            action: action.to_string(),
        }
    }

    fn change(
        id: i64,
        field: FieldKind,
        old: &str,
        new: &str,
        target_version: i64,
        step_number: Option<i64>,
    ) -> ChangeRecord {
        ChangeRecord {
            id,
            mop_id: 1,
            field,
            old_value: old.to_string(),
            new_value: new.to_string(),
            target_version,
            step_number,
            changed_at_ms: id,
        }
    }

    // v1: title A, steps [s1, s2], prereqs [wrench]
    // v2: title B
    // v3: step 2 -> s2b, prereqs [wrench, ladder]
    // v4: title C, title D (same batch)
    fn current_and_log() -> (Mop, Vec<ChangeRecord>) {
        let current = Mop {
            id: 1,
            title: "D".to_string(),
            description: "desc".to_string(),
            prerequisites: vec!["wrench".to_string(), "ladder".to_string()],
            steps: vec![step(11, 1, "s1"), step(12, 2, "s2b")],
            version: 4,
            created_at_ms: 0,
        };
        let log = vec![
            change(1, FieldKind::Title, "A", "B", 2, None),
            change(2, FieldKind::Steps, "s2", "s2b", 3, Some(2)),
            change(3, FieldKind::Prerequisites, "wrench", "wrench\u{1f}ladder", 3, None),
            change(4, FieldKind::Title, "B", "C", 4, None),
            change(5, FieldKind::Title, "C", "D", 4, None),
        ];
        (current, log)
    }

    #[test]
    fn future_version_does_not_exist() {
        let (current, log) = current_and_log();
        assert!(reconstruct(&current, &log, 5).is_none());
    }

    #[test]
    fn current_version_is_returned_unchanged() {
        let (current, log) = current_and_log();
        let out = reconstruct(&current, &log, 4).expect("version exists");
        assert_eq!(out.mop, current);
        assert!(out.skipped.is_empty());
    }

    #[test]
    fn reverts_newest_first_within_a_batch() {
        let (current, log) = current_and_log();
        let v3 = reconstruct(&current, &log, 3).expect("v3").mop;
        assert_eq!(v3.title, "B");
        assert_eq!(v3.version, 3);
        assert_eq!(v3.steps[1].action, "s2b");
    }

    #[test]
    fn reconstructs_the_original_version() {
        let (current, mut log) = current_and_log();
        log.reverse();
        let v1 = reconstruct(&current, &log, 1).expect("v1").mop;
        assert_eq!(v1.title, "A");
        assert_eq!(v1.prerequisites, vec!["wrench".to_string()]);
        assert_eq!(v1.steps[1].action, "s2");
        assert_eq!(v1.steps[1].id, 12);
        assert_eq!(v1.version, 1);
        assert_eq!(current.title, "D", "input snapshot must not change");
    }

    #[test]
    fn missing_steps_are_skipped_not_fatal() {
        let (current, mut log) = current_and_log();
        log.push(change(6, FieldKind::Steps, "gone", "still gone", 4, Some(9)));
        let out = reconstruct(&current, &log, 1).expect("v1");
        assert_eq!(out.skipped, vec![6]);
        assert_eq!(out.mop.title, "A");
    }

    #[test]
    fn fast_forward_from_every_version_reaches_current() {
        let (current, log) = current_and_log();
        for version in 1..=current.version {
            let past = reconstruct(&current, &log, version).expect("exists").mop;
            let replayed = fast_forward(&past, &log, current.version);
            assert_eq!(replayed.mop, current, "replay from v{version}");
        }
    }
}
