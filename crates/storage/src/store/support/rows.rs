#![forbid(unsafe_code)]

use super::super::StoreError;
use mop_core::{ChangeRecord, FieldKind, Mop, MopSummary, Prompt, PromptKind, Step, prerequisites};
use rusqlite::types::Type;
use rusqlite::{Connection, OptionalExtension, Row, params};

pub(in crate::store) fn load_mop(conn: &Connection, id: i64) -> Result<Option<Mop>, StoreError> {
    let row = conn
        .query_row(
            r#"
            SELECT id, title, description, prerequisites, version, created_at_ms
            FROM mops
            WHERE id = ?1
            "#,
            params![id],
            mop_header_row,
        )
        .optional()?;

    let Some(mut mop) = row else {
        return Ok(None);
    };
    mop.steps = load_steps(conn, mop.id)?;
    Ok(Some(mop))
}

pub(in crate::store) fn latest_mop_id(conn: &Connection) -> Result<Option<i64>, StoreError> {
    Ok(conn
        .query_row("SELECT MAX(id) FROM mops", [], |row| {
            row.get::<_, Option<i64>>(0)
        })?)
}

pub(in crate::store) fn mop_exists(conn: &Connection, id: i64) -> Result<bool, StoreError> {
    Ok(conn
        .query_row("SELECT 1 FROM mops WHERE id = ?1", params![id], |row| {
            row.get::<_, i64>(0)
        })
        .optional()?
        .is_some())
}

pub(in crate::store) fn load_steps(
    conn: &Connection,
    mop_id: i64,
) -> Result<Vec<Step>, StoreError> {
    let mut stmt = conn.prepare(
        r#"
        SELECT id, step_number, mop_id, action
        FROM steps
        WHERE mop_id = ?1
        ORDER BY step_number ASC
        "#,
    )?;
    let rows = stmt.query_map(params![mop_id], |row| {
        Ok(Step {
            id: row.get(0)?,
            step_number: row.get(1)?,
            mop_id: row.get(2)?,
            action: row.get(3)?,
        })
    })?;
    Ok(rows.collect::<Result<Vec<_>, _>>()?)
}

/// Change-log entries for one MOP, ascending by (target_version, id).
/// With `after_version`, only entries that produced a later version are returned.
pub(in crate::store) fn load_changes(
    conn: &Connection,
    mop_id: i64,
    after_version: Option<i64>,
) -> Result<Vec<ChangeRecord>, StoreError> {
    let mut stmt = conn.prepare(
        r#"
        SELECT id, mop_id, field, old_value, new_value, target_version, step_number, changed_at_ms
        FROM changes
        WHERE mop_id = ?1 AND (?2 IS NULL OR target_version > ?2)
        ORDER BY target_version ASC, id ASC
        "#,
    )?;
    let rows = stmt.query_map(params![mop_id, after_version], change_row)?;
    Ok(rows.collect::<Result<Vec<_>, _>>()?)
}

pub(in crate::store) fn summary_row(row: &Row<'_>) -> rusqlite::Result<MopSummary> {
    Ok(MopSummary {
        id: row.get(0)?,
        title: row.get(1)?,
        version: row.get(2)?,
        step_count: usize::try_from(row.get::<_, i64>(3)?).unwrap_or_default(),
        created_at_ms: row.get(4)?,
    })
}

pub(in crate::store) fn prompt_row(row: &Row<'_>) -> rusqlite::Result<Prompt> {
    let raw = row.get::<_, String>(0)?;
    let kind = PromptKind::parse(&raw)
        .map_err(|err| rusqlite::Error::FromSqlConversionFailure(0, Type::Text, Box::new(err)))?;
    Ok(Prompt {
        kind,
        content: row.get(1)?,
        updated_at_ms: row.get(2)?,
    })
}

pub(in crate::store) fn to_sqlite_i64(value: usize) -> Result<i64, StoreError> {
    i64::try_from(value).map_err(|_| StoreError::InvalidInput("numeric overflow"))
}

fn mop_header_row(row: &Row<'_>) -> rusqlite::Result<Mop> {
    Ok(Mop {
        id: row.get(0)?,
        title: row.get(1)?,
        description: row.get(2)?,
        prerequisites: prerequisites::decode(&row.get::<_, String>(3)?),
        steps: Vec::new(),
        version: row.get(4)?,
        created_at_ms: row.get(5)?,
    })
}

fn change_row(row: &Row<'_>) -> rusqlite::Result<ChangeRecord> {
    let raw_field = row.get::<_, String>(2)?;
    let field = FieldKind::parse(&raw_field)
        .map_err(|err| rusqlite::Error::FromSqlConversionFailure(2, Type::Text, Box::new(err)))?;
    Ok(ChangeRecord {
        id: row.get(0)?,
        mop_id: row.get(1)?,
        field,
        old_value: row.get(3)?,
        new_value: row.get(4)?,
        target_version: row.get(5)?,
        step_number: row.get(6)?,
        changed_at_ms: row.get(7)?,
    })
}
