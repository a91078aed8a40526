#![forbid(unsafe_code)]

use mop_core::{Mop, Prompt, PromptKind};
use mop_storage::{SqliteStore, StoreError};

const GENERAL_INFO: &str = "\
You are writing a Methods of Procedure (MOP) for data center operations.
Request: {{prompt}}
Context: {{context}}
Difficulty level: {{difficulty}}
Risk assessment: {{risk}}

Return a single JSON object in exactly this format, with no additional text:
{ \"title\": \"string\", \"description\": \"string\", \"prerequisites\": [\"string\"] }";

const DETAILED_STEPS: &str = "\
You are writing the steps of a Methods of Procedure (MOP) for data center operations.
Title: {{title}}
Description: {{description}}
Request: {{prompt}}
Context: {{context}}
Difficulty level: {{difficulty}}
Risk assessment: {{risk}}

Write one action per step. Wrap every tool or piece of equipment a step needs in
square brackets, for example \"Loosen the bolts with a [torque wrench]\".
Return a JSON array in exactly this format, with no additional text:
[ { \"action\": \"string\" } ]";

const VALIDATION: &str = "\
You are validating a list of steps for a Methods of Procedure (MOP) in data center operations.
The steps are as follows:
{{steps}}

Validate the following:
- Ensure the steps are in a logical order.
- Identify and remove any duplicate, unnecessary, or missing steps.
- Adjust the steps to make them clear and concise.
Keep the square brackets around tools and equipment.

Return the validated steps as a JSON array in exactly this format, with no additional text:
[ { \"action\": \"string\" } ]";

const REVISION: &str = "\
You are revising a Methods of Procedure (MOP) for data center operations.
Title: {{title}}
Description: {{description}}
Prerequisites:
{{prerequisites}}
Steps:
{{steps}}

Feedback: {{feedback}}

Return the edits as a JSON array in exactly this format, with no additional text:
[ { \"field\": \"title|description|prerequisites|steps\", \"oldValue\": \"string\",
    \"newValue\": \"string\", \"stepNumber\": 1 } ]
Use stepNumber only for field \"steps\". For prerequisites, newValue is the complete new list
as a JSON array of strings. Return [] when no edit is needed.";

pub fn default_template(kind: PromptKind) -> &'static str {
    match kind {
        PromptKind::GeneralInfo => GENERAL_INFO,
        PromptKind::DetailedSteps => DETAILED_STEPS,
        PromptKind::Validation => VALIDATION,
    }
}

/// Stored template for `kind`, falling back to the built-in one (`updated_at_ms = 0`).
pub fn effective_prompt(store: &SqliteStore, kind: PromptKind) -> Result<Prompt, StoreError> {
    Ok(store.get_prompt(kind)?.unwrap_or_else(|| Prompt {
        kind,
        content: default_template(kind).to_string(),
        updated_at_ms: 0,
    }))
}

/// Effective templates for one pipeline run.
#[derive(Clone, Debug)]
pub(crate) struct Templates {
    pub(crate) general_info: String,
    pub(crate) detailed_steps: String,
    pub(crate) validation: String,
}

impl Templates {
    pub(crate) fn load(store: &SqliteStore) -> Result<Self, StoreError> {
        Ok(Self {
            general_info: effective_prompt(store, PromptKind::GeneralInfo)?.content,
            detailed_steps: effective_prompt(store, PromptKind::DetailedSteps)?.content,
            validation: effective_prompt(store, PromptKind::Validation)?.content,
        })
    }
}

/// Replaces every `{{name}}` with its value. Unknown placeholders are left as-is.
pub(crate) fn render(template: &str, vars: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let Some(end) = after.find("}}") else {
            out.push_str(&rest[start..]);
            return out;
        };
        let name = after[..end].trim();
        match vars.iter().find(|(key, _)| *key == name) {
            Some((_, value)) => out.push_str(value),
            None => out.push_str(&rest[start..start + 2 + end + 2]),
        }
        rest = &after[end + 2..];
    }
    out.push_str(rest);
    out
}

pub(crate) fn numbered<S: AsRef<str>>(items: &[S]) -> String {
    items
        .iter()
        .enumerate()
        .map(|(index, item)| format!("{}. {}", index + 1, item.as_ref()))
        .collect::<Vec<_>>()
        .join("\n")
}

pub(crate) fn revision_prompt(mop: &Mop, feedback: &str) -> String {
    let steps = mop
        .steps
        .iter()
        .map(|step| format!("{}. {}", step.step_number, step.action))
        .collect::<Vec<_>>()
        .join("\n");
    let prerequisites = mop
        .prerequisites
        .iter()
        .map(|item| format!("- {item}"))
        .collect::<Vec<_>>()
        .join("\n");
    render(
        REVISION,
        &[
            ("title", mop.title.as_str()),
            ("description", mop.description.as_str()),
            ("prerequisites", prerequisites.as_str()),
            ("steps", steps.as_str()),
            ("feedback", feedback),
        ],
    )
}
