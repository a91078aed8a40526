#![forbid(unsafe_code)]

use crate::error::ApiError;
use crate::generator::ContentGenerator;
use crate::parse;
use crate::templates::{Templates, numbered, render};
use mop_core::{reconcile, strip_markers};
use mop_storage::CreateMopRequest;
use serde::{Deserialize, Serialize};

/// A request to draft a new MOP from free text.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MopInput {
    pub prompt: String,
    #[serde(default)]
    pub difficulty_level: Option<String>,
    #[serde(default)]
    pub risk_assessment: Option<String>,
    #[serde(default)]
    pub context: Option<String>,
}

/// General info, then steps, then a validation pass over the numbered steps. Tools the
/// validated steps mark as `[tool]` are merged into the prerequisites, and every marker
/// is stripped before the request is returned.
pub(crate) fn draft_mop<G: ContentGenerator + ?Sized>(
    generator: &G,
    templates: &Templates,
    input: &MopInput,
) -> Result<CreateMopRequest, ApiError> {
    let prompt = input.prompt.trim();
    if prompt.is_empty() {
        return Err(ApiError::Validation("prompt must not be empty".to_string()));
    }
    let context = input.context.as_deref().unwrap_or("none");
    let difficulty = input.difficulty_level.as_deref().unwrap_or("unspecified");
    let risk = input.risk_assessment.as_deref().unwrap_or("unspecified");

    let info_text = generator.generate(&render(
        &templates.general_info,
        &[
            ("prompt", prompt),
            ("context", context),
            ("difficulty", difficulty),
            ("risk", risk),
        ],
    ))?;
    let info = parse::general_info(&info_text)?;

    let steps_text = generator.generate(&render(
        &templates.detailed_steps,
        &[
            ("prompt", prompt),
            ("context", context),
            ("difficulty", difficulty),
            ("risk", risk),
            ("title", info.title.as_str()),
            ("description", info.description.as_str()),
        ],
    ))?;
    let drafted = parse::step_actions(&steps_text)?;
    tracing::debug!(steps = drafted.len(), "drafted mop steps");

    let validated_text = generator.generate(&render(
        &templates.validation,
        &[("steps", numbered(&drafted).as_str())],
    ))?;
    let validated = parse::step_actions(&validated_text)?;

    let prerequisites = reconcile(&validated, &info.prerequisites);
    let steps = validated
        .iter()
        .map(|action| strip_markers(action).trim().to_string())
        .collect::<Vec<_>>();
    tracing::info!(
        title = %info.title,
        steps = steps.len(),
        prerequisites = prerequisites.len(),
        "drafted mop"
    );

    Ok(CreateMopRequest {
        title: strip_markers(&info.title).trim().to_string(),
        description: strip_markers(&info.description).trim().to_string(),
        prerequisites,
        steps,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::GenerateError;
    use crate::templates::default_template;
    use mop_core::PromptKind;
    use std::cell::RefCell;

    struct Scripted {
        replies: RefCell<Vec<&'static str>>,
        prompts: RefCell<Vec<String>>,
    }

    impl Scripted {
        fn new(replies: &[&'static str]) -> Self {
            Self {
                replies: RefCell::new(replies.iter().rev().copied().collect()),
                prompts: RefCell::new(Vec::new()),
            }
        }
    }

    impl ContentGenerator for Scripted {
        fn generate(&self, prompt: &str) -> Result<String, GenerateError> {
            self.prompts.borrow_mut().push(prompt.to_string());
            self.replies
                .borrow_mut()
                .pop()
                .map(str::to_string)
                .ok_or(GenerateError::Empty)
        }
    }

    fn templates() -> Templates {
        Templates {
            general_info: default_template(PromptKind::GeneralInfo).to_string(),
            detailed_steps: default_template(PromptKind::DetailedSteps).to_string(),
            validation: default_template(PromptKind::Validation).to_string(),
        }
    }

    fn input(prompt: &str) -> MopInput {
        MopInput {
            prompt: prompt.to_string(),
            risk_assessment: Some("high".to_string()),
            ..MopInput::default()
        }
    }

    #[test]
    fn validated_tools_become_prerequisites() {
        let generator = Scripted::new(&[
            r#"{"title":"Replace fan tray","description":"Spine 3","prerequisites":["ESD strap"]}"#,
            r#"[{"action":"Remove screws with [screwdriver]"},{"action":"Pull tray"}]"#,
            r#"[
                {"action":"Put on [ESD strap]"},
                {"action":"Remove screws with [screwdriver]"},
                {"action":"Pull tray with [tray puller]"}
            ]"#,
        ]);

        let request =
            draft_mop(&generator, &templates(), &input("replace the fan tray")).expect("draft");
        assert_eq!(request.title, "Replace fan tray");
        assert_eq!(request.prerequisites, vec!["ESD strap", "screwdriver", "tray puller"]);
        assert_eq!(
            request.steps,
            vec![
                "Put on ESD strap",
                "Remove screws with screwdriver",
                "Pull tray with tray puller"
            ]
        );

        let prompts = generator.prompts.borrow();
        assert_eq!(prompts.len(), 3);
        assert!(prompts[0].contains("replace the fan tray"));
        assert!(prompts[0].contains("Risk assessment: high"));
        assert!(prompts[1].contains("Title: Replace fan tray"));
        assert!(prompts[2].contains("1. Remove screws with [screwdriver]\n2. Pull tray"));
    }

    #[test]
    fn empty_prompt_never_reaches_the_generator() {
        let generator = Scripted::new(&[]);
        let err = draft_mop(&generator, &templates(), &input("  ")).expect_err("empty");
        assert!(matches!(err, ApiError::Validation(_)));
        assert!(generator.prompts.borrow().is_empty());
    }

    #[test]
    fn malformed_steps_are_a_parse_error() {
        let generator = Scripted::new(&[r#"{"title":"T"}"#, "I cannot help with that."]);
        let err = draft_mop(&generator, &templates(), &input("x")).expect_err("parse");
        assert!(matches!(err, ApiError::Parse(_)));
    }

    #[test]
    fn generator_failure_is_surfaced() {
        let generator = Scripted::new(&[r#"{"title":"T"}"#]);
        let err = draft_mop(&generator, &templates(), &input("x")).expect_err("generation");
        assert!(matches!(err, ApiError::GenerationFailed(GenerateError::Empty)));
    }
}
