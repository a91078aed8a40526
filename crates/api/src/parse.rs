#![forbid(unsafe_code)]

//! Strict readers for generator output. The outermost JSON value is located first so a
//! surrounding code fence or a sentence of preamble does not matter; everything inside it
//! must then deserialize exactly, with no partial salvage.

use crate::error::ApiError;
use mop_core::ProposedChange;
use serde::Deserialize;
use serde::de::DeserializeOwned;

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub(crate) struct GeneralInfo {
    pub(crate) title: String,
    #[serde(default)]
    pub(crate) description: String,
    #[serde(default)]
    pub(crate) prerequisites: Vec<String>,
}

#[derive(Deserialize)]
struct StepItem {
    action: String,
}

fn extract(raw: &str, open: char, close: char) -> Option<&str> {
    let start = raw.find(open)?;
    let end = raw.rfind(close)?;
    if end <= start {
        return None;
    }
    Some(&raw[start..=end])
}

fn parse_json<T: DeserializeOwned>(
    raw: &str,
    open: char,
    close: char,
    what: &str,
) -> Result<T, ApiError> {
    let json = extract(raw, open, close)
        .ok_or_else(|| ApiError::Parse(format!("no JSON {what} found in generator output")))?;
    serde_json::from_str(json).map_err(|e| ApiError::Parse(format!("invalid {what}: {e}")))
}

pub(crate) fn general_info(raw: &str) -> Result<GeneralInfo, ApiError> {
    let info: GeneralInfo = parse_json(raw, '{', '}', "object")?;
    if info.title.trim().is_empty() {
        return Err(ApiError::Parse("generated title is empty".to_string()));
    }
    Ok(info)
}

/// A non-empty list of non-blank step actions.
pub(crate) fn step_actions(raw: &str) -> Result<Vec<String>, ApiError> {
    let items: Vec<StepItem> = parse_json(raw, '[', ']', "step array")?;
    if items.is_empty() {
        return Err(ApiError::Parse("generated step list is empty".to_string()));
    }
    if items.iter().any(|item| item.action.trim().is_empty()) {
        return Err(ApiError::Parse("generated step action is empty".to_string()));
    }
    Ok(items.into_iter().map(|item| item.action).collect())
}

/// Change proposals; an empty array is valid and means "nothing to change".
pub(crate) fn proposals(raw: &str) -> Result<Vec<ProposedChange>, ApiError> {
    parse_json(raw, '[', ']', "change array")
}

#[cfg(test)]
mod tests {
    use super::*;
    use mop_core::ChangeValue;

    #[test]
    fn general_info_tolerates_fences() {
        let raw = concat!(
            "Here you go:\n```json\n",
            r#"{"title":"Swap PSU","description":"rack 12","prerequisites":["wrench"]}"#,
            "\n```"
        );
        let info = general_info(raw).expect("parse");
        assert_eq!(info.title, "Swap PSU");
        assert_eq!(info.prerequisites, vec!["wrench"]);
    }

    #[test]
    fn general_info_rejects_missing_title() {
        assert!(matches!(general_info("{\"description\":\"x\"}"), Err(ApiError::Parse(_))));
        assert!(matches!(general_info("{\"title\":\"  \"}"), Err(ApiError::Parse(_))));
        assert!(matches!(general_info("no json at all"), Err(ApiError::Parse(_))));
    }

    #[test]
    fn step_actions_are_strict() {
        let actions =
            step_actions(r#"[{"action":"Drain"},{"action":"Reboot"}]"#).expect("parse");
        assert_eq!(actions, vec!["Drain", "Reboot"]);

        assert!(matches!(step_actions("[]"), Err(ApiError::Parse(_))));
        assert!(matches!(step_actions("[{\"action\":\" \"}]"), Err(ApiError::Parse(_))));
        // One malformed element fails the whole list.
        assert!(matches!(
            step_actions("[{\"action\":\"ok\"},{\"step\":\"bad\"}]"),
            Err(ApiError::Parse(_))
        ));
    }

    #[test]
    fn proposals_accept_list_values_and_empty_arrays() {
        let raw = r#"[
            {"field":"steps","oldValue":"Remove PSU","newValue":"Unlatch PSU","stepNumber":2},
            {"field":"prerequisites","newValue":["wrench","ESD strap"]}
        ]"#;
        let parsed = proposals(raw).expect("parse");
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[0].step_number, Some(2));
        assert_eq!(
            parsed[1].new_value,
            ChangeValue::List(vec!["wrench".to_string(), "ESD strap".to_string()])
        );
        assert!(proposals("[]").expect("empty").is_empty());
        assert!(matches!(proposals("{\"field\":\"title\"}"), Err(ApiError::Parse(_))));
    }
}
