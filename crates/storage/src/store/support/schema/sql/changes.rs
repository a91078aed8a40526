#![forbid(unsafe_code)]

pub(super) const SQL: &str = r#"

        -- Append-only change log. `target_version` is the version the entry produced.
        CREATE TABLE IF NOT EXISTS changes (
          id INTEGER PRIMARY KEY AUTOINCREMENT,
          mop_id INTEGER NOT NULL,
          field TEXT NOT NULL CHECK(field IN ('title', 'description', 'prerequisites', 'steps')),
          old_value TEXT NOT NULL,
          new_value TEXT NOT NULL,
          target_version INTEGER NOT NULL CHECK(target_version >= 2),
          step_number INTEGER,
          changed_at_ms INTEGER NOT NULL,
          CHECK((field = 'steps') = (step_number IS NOT NULL)),
          FOREIGN KEY(mop_id) REFERENCES mops(id) ON DELETE CASCADE
        );

        CREATE TRIGGER IF NOT EXISTS changes_append_only
        BEFORE UPDATE ON changes
        BEGIN
          SELECT RAISE(ABORT, 'changes are append-only');
        END;
"#;
