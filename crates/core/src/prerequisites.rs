#![forbid(unsafe_code)]

//! Single-string encoding of a prerequisite list.
//!
//! The store keeps prerequisites in one text column and the change log keeps a whole
//! list per entry, so both use the same encoding: items joined by the ASCII unit
//! separator. Items must be non-empty and must not contain the separator, otherwise
//! the round trip would not preserve the list. Items are also distinct.

use std::collections::BTreeSet;

pub const DELIMITER: char = '\u{1f}';

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ListError {
    Empty { index: usize },
    ContainsDelimiter { index: usize },
    Duplicate { index: usize },
}

impl std::fmt::Display for ListError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty { index } => write!(f, "prerequisite #{index} is empty"),
            Self::ContainsDelimiter { index } => write!(
                f,
                "prerequisite #{index} contains the reserved unit separator character"
            ),
            Self::Duplicate { index } => {
                write!(f, "prerequisite #{index} repeats an earlier item")
            }
        }
    }
}

impl std::error::Error for ListError {}

pub fn validate(items: &[String]) -> Result<(), ListError> {
    let mut seen = BTreeSet::new();
    for (index, item) in items.iter().enumerate() {
        if item.trim().is_empty() {
            return Err(ListError::Empty { index });
        }
        if item.contains(DELIMITER) {
            return Err(ListError::ContainsDelimiter { index });
        }
        if !seen.insert(item.as_str()) {
            return Err(ListError::Duplicate { index });
        }
    }
    Ok(())
}

pub fn encode(items: &[String]) -> Result<String, ListError> {
    validate(items)?;
    let mut out = String::new();
    for (index, item) in items.iter().enumerate() {
        if index > 0 {
            out.push(DELIMITER);
        }
        out.push_str(item);
    }
    Ok(out)
}

pub fn decode(raw: &str) -> Vec<String> {
    if raw.is_empty() {
        return Vec::new();
    }
    raw.split(DELIMITER).map(str::to_string).collect()
}
