#![forbid(unsafe_code)]

mod rows;
mod schema;
mod time;

pub(super) use rows::*;
pub(super) use schema::migrate_sqlite_schema;
pub(super) use time::now_ms;
