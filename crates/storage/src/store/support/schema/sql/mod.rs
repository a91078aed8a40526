#![forbid(unsafe_code)]

mod changes;
mod core;
mod indexes;
mod mops;
mod pragmas;
mod prompts;

pub(super) fn full_schema_sql() -> String {
    let mut sql = String::new();
    sql.push_str(pragmas::SQL);
    sql.push_str(core::SQL);
    sql.push_str(mops::SQL);
    sql.push_str(changes::SQL);
    sql.push_str(prompts::SQL);
    sql.push_str(indexes::SQL);
    sql
}
