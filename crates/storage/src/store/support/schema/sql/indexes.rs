#![forbid(unsafe_code)]

pub(super) const SQL: &str = r#"

        CREATE INDEX IF NOT EXISTS idx_steps_mop_number ON steps(mop_id, step_number);
        CREATE INDEX IF NOT EXISTS idx_changes_mop_version ON changes(mop_id, target_version, id);
        "#;
