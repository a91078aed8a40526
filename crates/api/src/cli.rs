#![forbid(unsafe_code)]

//! Argument parsing and dispatch for the `mop` binary.

use crate::api::{Api, ApiOutput};
use crate::config::AppConfig;
use crate::draft::MopInput;
use crate::error::ApiError;
use crate::generator::ContentGenerator;
use mop_core::{PromptKind, ProposedChange};
use serde::Serialize;
use serde_json::{Value, json};
use std::path::PathBuf;

const DEFAULT_LIST_LIMIT: usize = 20;

pub fn usage() -> &'static str {
    "mop — versioned Methods of Procedure\n\n\
USAGE:\n\
  mop [GLOBAL FLAGS] <COMMAND>\n\n\
COMMANDS:\n\
  create --prompt TEXT [--difficulty LEVEL] [--risk TEXT] [--context TEXT]\n\
  list [--limit N] [--offset N]\n\
  show ID\n\
  latest\n\
  version ID VERSION\n\
  history ID\n\
  update ID --feedback TEXT\n\
  apply ID (--changes JSON | --changes-file PATH) [--expected-version V]\n\
  delete ID\n\
  prompt get KIND\n\
  prompt set KIND (--text TEXT | --file PATH)\n\n\
GLOBAL FLAGS:\n\
  --storage-dir DIR     (MOP_STORAGE_DIR, default ./.mop)\n\
  --generator-bin PATH  (MOP_GENERATOR_BIN)\n\
  --generator-arg ARG   (repeatable; MOP_GENERATOR_ARGS, whitespace separated)\n\
  --log FILTER          (MOP_LOG, default info)\n\n\
NOTES:\n\
  - KIND is one of general_info, detailed_steps, validation.\n\
  - stdout carries one JSON envelope; logs go to stderr.\n"
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TextSource {
    Inline(String),
    File(PathBuf),
}

impl TextSource {
    fn read(&self) -> Result<String, ApiError> {
        match self {
            Self::Inline(text) => Ok(text.clone()),
            Self::File(path) => std::fs::read_to_string(path)
                .map_err(|e| ApiError::Validation(format!("read {}: {e}", path.display()))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CliCommand {
    Help,
    Create(MopInput),
    List { limit: usize, offset: usize },
    Show { id: i64 },
    Latest,
    Version { id: i64, version: i64 },
    History { id: i64 },
    Update { id: i64, feedback: String },
    Apply {
        id: i64,
        changes: TextSource,
        expected_version: Option<i64>,
    },
    Delete { id: i64 },
    PromptGet { kind: PromptKind },
    PromptSet { kind: PromptKind, content: TextSource },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Invocation {
    pub config: AppConfig,
    pub command: CliCommand,
}

/// Global flags may appear anywhere; they are taken out first and override `config`.
pub fn parse_args(args: &[String], mut config: AppConfig) -> Result<Invocation, String> {
    if args.iter().any(|a| a == "-h" || a == "--help") {
        return Ok(Invocation {
            config,
            command: CliCommand::Help,
        });
    }

    let mut rest = Vec::with_capacity(args.len());
    let mut i = 0usize;
    while i < args.len() {
        if !config.take_flag(args, &mut i)? {
            rest.push(args[i].clone());
        }
        i += 1;
    }

    let command = parse_command(&rest)?;
    Ok(Invocation { config, command })
}

fn parse_command(args: &[String]) -> Result<CliCommand, String> {
    let Some((name, rest)) = args.split_first() else {
        return Err(format!("missing command\n\n{}", usage()));
    };
    let mut words = Words::new(rest);
    let command = match name.as_str() {
        "help" => CliCommand::Help,
        "create" => {
            let mut input = MopInput::default();
            while let Some(flag) = words.next_flag()? {
                match flag {
                    "--prompt" => input.prompt = words.value("--prompt requires TEXT")?,
                    "--difficulty" => {
                        input.difficulty_level = Some(words.value("--difficulty requires LEVEL")?)
                    }
                    "--risk" => input.risk_assessment = Some(words.value("--risk requires TEXT")?),
                    "--context" => input.context = Some(words.value("--context requires TEXT")?),
                    other => return Err(format!("unknown create flag: {other}")),
                }
            }
            if input.prompt.trim().is_empty() {
                return Err("create requires --prompt TEXT".to_string());
            }
            CliCommand::Create(input)
        }
        "list" => {
            let mut limit = DEFAULT_LIST_LIMIT;
            let mut offset = 0usize;
            while let Some(flag) = words.next_flag()? {
                match flag {
                    "--limit" => limit = words.number("--limit must be a non-negative integer")?,
                    "--offset" => offset = words.number("--offset must be a non-negative integer")?,
                    other => return Err(format!("unknown list flag: {other}")),
                }
            }
            CliCommand::List { limit, offset }
        }
        "show" => CliCommand::Show { id: words.id()? },
        "latest" => CliCommand::Latest,
        "version" => {
            let id = words.id()?;
            let version = words.number("VERSION must be an integer")?;
            CliCommand::Version { id, version }
        }
        "history" => CliCommand::History { id: words.id()? },
        "update" => {
            let id = words.id()?;
            let mut feedback = None;
            while let Some(flag) = words.next_flag()? {
                match flag {
                    "--feedback" => feedback = Some(words.value("--feedback requires TEXT")?),
                    other => return Err(format!("unknown update flag: {other}")),
                }
            }
            let feedback = feedback.ok_or("update requires --feedback TEXT")?;
            CliCommand::Update { id, feedback }
        }
        "apply" => {
            let id = words.id()?;
            let mut changes = None;
            let mut expected_version = None;
            while let Some(flag) = words.next_flag()? {
                match flag {
                    "--changes" => {
                        changes = Some(TextSource::Inline(words.value("--changes requires JSON")?))
                    }
                    "--changes-file" => {
                        changes = Some(TextSource::File(PathBuf::from(
                            words.value("--changes-file requires PATH")?,
                        )))
                    }
                    "--expected-version" => {
                        expected_version =
                            Some(words.number("--expected-version must be an integer")?)
                    }
                    other => return Err(format!("unknown apply flag: {other}")),
                }
            }
            let changes = changes.ok_or("apply requires --changes JSON or --changes-file PATH")?;
            CliCommand::Apply {
                id,
                changes,
                expected_version,
            }
        }
        "delete" => CliCommand::Delete { id: words.id()? },
        "prompt" => {
            let action = words.value("prompt requires get|set")?;
            let kind = words.value("prompt requires KIND")?;
            let kind = PromptKind::parse(&kind).map_err(|e| e.to_string())?;
            match action.as_str() {
                "get" => CliCommand::PromptGet { kind },
                "set" => {
                    let mut content = None;
                    while let Some(flag) = words.next_flag()? {
                        match flag {
                            "--text" => {
                                content =
                                    Some(TextSource::Inline(words.value("--text requires TEXT")?))
                            }
                            "--file" => {
                                let path = words.value("--file requires PATH")?;
                                content = Some(TextSource::File(PathBuf::from(path)))
                            }
                            other => return Err(format!("unknown prompt set flag: {other}")),
                        }
                    }
                    let content = content.ok_or("prompt set requires --text TEXT or --file PATH")?;
                    CliCommand::PromptSet { kind, content }
                }
                other => return Err(format!("unknown prompt action: {other} (expected get|set)")),
            }
        }
        other => return Err(format!("unknown command: {other}\n\n{}", usage())),
    };
    words.finish()?;
    Ok(command)
}

struct Words<'a> {
    args: &'a [String],
    pos: usize,
}

impl<'a> Words<'a> {
    fn new(args: &'a [String]) -> Self {
        Self { args, pos: 0 }
    }

    fn value(&mut self, missing: &str) -> Result<String, String> {
        let v = self.args.get(self.pos).ok_or_else(|| missing.to_string())?;
        self.pos += 1;
        Ok(v.clone())
    }

    fn number<T: std::str::FromStr>(&mut self, invalid: &str) -> Result<T, String> {
        self.value(invalid)?.trim().parse::<T>().map_err(|_| invalid.to_string())
    }

    fn id(&mut self) -> Result<i64, String> {
        self.number("ID must be an integer")
    }

    fn next_flag(&mut self) -> Result<Option<&'a str>, String> {
        let Some(arg) = self.args.get(self.pos) else {
            return Ok(None);
        };
        if !arg.starts_with("--") {
            return Err(format!("unexpected argument: {arg}"));
        }
        self.pos += 1;
        Ok(Some(arg.as_str()))
    }

    fn finish(&self) -> Result<(), String> {
        match self.args.get(self.pos) {
            Some(extra) => Err(format!("unexpected argument: {extra}")),
            None => Ok(()),
        }
    }
}

fn to_value<T: Serialize>(output: ApiOutput<T>) -> Result<Value, ApiError> {
    serde_json::to_value(output).map_err(|e| ApiError::Parse(format!("encode output: {e}")))
}

/// Executes one command. Soft results come back as `Ok` with a message and no data.
pub fn run<G: ContentGenerator>(api: &mut Api<G>, command: CliCommand) -> Result<Value, ApiError> {
    match command {
        CliCommand::Help => Ok(json!({ "message": usage() })),
        CliCommand::Create(input) => to_value(api.create_mop(input)?),
        CliCommand::List { limit, offset } => to_value(api.list_mops(limit, offset)?),
        CliCommand::Show { id } => to_value(api.get_mop(id)?),
        CliCommand::Latest => to_value(api.get_latest_mop()?),
        CliCommand::Version { id, version } => to_value(api.get_mop_version(id, version)?),
        CliCommand::History { id } => to_value(api.get_changes(id)?),
        CliCommand::Update { id, feedback } => to_value(api.update_mop(id, &feedback)?),
        CliCommand::Apply {
            id,
            changes,
            expected_version,
        } => {
            let raw = changes.read()?;
            let changes: Vec<ProposedChange> = serde_json::from_str(&raw).map_err(|e| {
                ApiError::Validation(format!("changes must be a JSON array of proposals: {e}"))
            })?;
            to_value(api.apply_changes(id, expected_version, changes)?)
        }
        CliCommand::Delete { id } => to_value(api.delete_mop(id)?),
        CliCommand::PromptGet { kind } => to_value(api.get_prompt(kind)?),
        CliCommand::PromptSet { kind, content } => {
            let content = content.read()?;
            to_value(api.update_prompt(kind, &content)?)
        }
    }
}

pub fn envelope_ok(result: Value) -> Value {
    json!({
        "success": true,
        "result": result,
        "error": null
    })
}

pub fn envelope_error(code: &str, message: &str) -> Value {
    json!({
        "success": false,
        "result": null,
        "error": {
            "code": code,
            "message": message.trim()
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    fn parse(raw: &[&str]) -> Result<CliCommand, String> {
        parse_args(&args(raw), AppConfig::default()).map(|inv| inv.command)
    }

    #[test]
    fn global_flags_are_accepted_anywhere() {
        let inv = parse_args(
            &args(&["show", "--storage-dir", "/tmp/m", "7", "--log", "debug"]),
            AppConfig::default(),
        )
        .expect("parse");
        assert_eq!(inv.command, CliCommand::Show { id: 7 });
        assert_eq!(inv.config.storage_dir, PathBuf::from("/tmp/m"));
        assert_eq!(inv.config.log_filter, "debug");
    }

    #[test]
    fn create_collects_optional_inputs() {
        let cmd = parse(&["create", "--prompt", "swap PSU", "--risk", "low"]).expect("parse");
        match cmd {
            CliCommand::Create(input) => {
                assert_eq!(input.prompt, "swap PSU");
                assert_eq!(input.risk_assessment.as_deref(), Some("low"));
                assert!(input.context.is_none());
            }
            other => panic!("expected Create, got {other:?}"),
        }
        assert!(parse(&["create"]).is_err());
    }

    #[test]
    fn apply_requires_a_change_source() {
        let cmd =
            parse(&["apply", "3", "--changes", "[]", "--expected-version", "2"]).expect("parse");
        assert_eq!(
            cmd,
            CliCommand::Apply {
                id: 3,
                changes: TextSource::Inline("[]".to_string()),
                expected_version: Some(2),
            }
        );
        assert!(parse(&["apply", "3"]).is_err());
        assert!(parse(&["apply", "x", "--changes", "[]"]).is_err());
    }

    #[test]
    fn prompt_kinds_accept_dashes() {
        assert_eq!(
            parse(&["prompt", "get", "general-info"]).expect("parse"),
            CliCommand::PromptGet {
                kind: PromptKind::GeneralInfo
            }
        );
        assert!(parse(&["prompt", "get", "summary"]).is_err());
        assert!(parse(&["prompt", "set", "validation"]).is_err());
    }

    #[test]
    fn leftovers_and_unknown_commands_are_usage_errors() {
        assert!(parse(&[]).is_err());
        assert!(parse(&["frobnicate"]).is_err());
        assert!(parse(&["latest", "now"]).is_err());
        assert!(parse(&["version", "1"]).is_err());
        assert_eq!(parse(&["list"]).expect("list"), CliCommand::List { limit: 20, offset: 0 });
        assert_eq!(parse(&["--help"]).expect("help"), CliCommand::Help);
    }

    #[test]
    fn envelopes_have_a_fixed_shape() {
        let ok = envelope_ok(json!({ "data": 1 }));
        assert_eq!(ok["success"], json!(true));
        assert_eq!(ok["error"], Value::Null);

        let err = envelope_error("PARSE_ERROR", " bad output \n");
        assert_eq!(err["success"], json!(false));
        assert_eq!(err["result"], Value::Null);
        assert_eq!(err["error"]["code"], json!("PARSE_ERROR"));
        assert_eq!(err["error"]["message"], json!("bad output"));
    }
}
