#![forbid(unsafe_code)]

pub(super) const SQL: &str = r#"

        CREATE TABLE IF NOT EXISTS prompts (
          kind TEXT PRIMARY KEY CHECK(kind IN ('general_info', 'detailed_steps', 'validation')),
          content TEXT NOT NULL,
          updated_at_ms INTEGER NOT NULL
        );
"#;
