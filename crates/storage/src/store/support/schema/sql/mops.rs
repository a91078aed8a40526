#![forbid(unsafe_code)]

pub(super) const SQL: &str = r#"

        -- `prerequisites` holds the whole ordered list joined by U+001F.
        CREATE TABLE IF NOT EXISTS mops (
          id INTEGER PRIMARY KEY AUTOINCREMENT,
          title TEXT NOT NULL,
          description TEXT NOT NULL,
          prerequisites TEXT NOT NULL,
          version INTEGER NOT NULL CHECK(version >= 1),
          created_at_ms INTEGER NOT NULL,
          updated_at_ms INTEGER NOT NULL
        );

        CREATE TABLE IF NOT EXISTS steps (
          id INTEGER PRIMARY KEY AUTOINCREMENT,
          mop_id INTEGER NOT NULL,
          step_number INTEGER NOT NULL CHECK(step_number >= 1),
          action TEXT NOT NULL,
          UNIQUE(mop_id, step_number),
          FOREIGN KEY(mop_id) REFERENCES mops(id) ON DELETE CASCADE
        );
"#;
