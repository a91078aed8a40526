#![forbid(unsafe_code)]

use crate::config::GeneratorConfig;
use std::io::Write;
use std::process::{ChildStdin, Command, Stdio};

/// Produces free text for a prompt. One blocking request-response, no retries.
pub trait ContentGenerator {
    fn generate(&self, prompt: &str) -> Result<String, GenerateError>;
}

impl<G: ContentGenerator + ?Sized> ContentGenerator for Box<G> {
    fn generate(&self, prompt: &str) -> Result<String, GenerateError> {
        (**self).generate(prompt)
    }
}

#[derive(Debug)]
pub enum GenerateError {
    NotConfigured,
    Spawn { bin: String, source: std::io::Error },
    Io(std::io::Error),
    Exit { code: Option<i32>, stderr: String },
    Empty,
}

impl std::fmt::Display for GenerateError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotConfigured => write!(
                f,
                "no generator configured (set --generator-bin or MOP_GENERATOR_BIN)"
            ),
            Self::Spawn { bin, source } => write!(f, "failed to spawn generator ({bin}): {source}"),
            Self::Io(err) => write!(f, "generator io: {err}"),
            Self::Exit { code, stderr } => match code {
                Some(code) => write!(f, "generator exited with status {code}: {stderr}"),
                None => write!(f, "generator terminated by signal: {stderr}"),
            },
            Self::Empty => write!(f, "generator returned no content"),
        }
    }
}

impl std::error::Error for GenerateError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Spawn { source, .. } => Some(source),
            Self::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for GenerateError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

/// Runs an external executable per request: the prompt goes to stdin, the trimmed
/// stdout is the generated text.
#[derive(Clone, Debug)]
pub struct CommandGenerator {
    bin: Option<String>,
    args: Vec<String>,
}

impl CommandGenerator {
    pub fn new(config: &GeneratorConfig) -> Self {
        Self {
            bin: config.bin.clone(),
            args: config.args.clone(),
        }
    }

    fn command(&self, bin: &str) -> Command {
        let mut cmd = Command::new(bin);
        cmd.args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        cmd
    }
}

impl ContentGenerator for CommandGenerator {
    fn generate(&self, prompt: &str) -> Result<String, GenerateError> {
        let bin = self.bin.as_deref().ok_or(GenerateError::NotConfigured)?;
        tracing::debug!(bin, prompt_chars = prompt.chars().count(), "invoking generator");

        let mut child = self
            .command(bin)
            .spawn()
            .map_err(|source| GenerateError::Spawn {
                bin: bin.to_string(),
                source,
            })?;
        // stdin is written on its own thread while stdout and stderr drain.
        let stdin = child.stdin.take();
        let (written, output) = std::thread::scope(|scope| {
            let writer = scope.spawn(move || write_prompt(stdin, prompt));
            let output = child.wait_with_output();
            let written = writer
                .join()
                .unwrap_or_else(|_| Err(std::io::Error::other("prompt writer panicked")));
            (written, output)
        });
        let output = output?;
        written?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            tracing::warn!(bin, code = ?output.status.code(), "generator failed");
            return Err(GenerateError::Exit {
                code: output.status.code(),
                stderr,
            });
        }

        let text = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if text.is_empty() {
            tracing::warn!(bin, "generator returned empty output");
            return Err(GenerateError::Empty);
        }
        Ok(text)
    }
}

// A generator may exit without draining stdin; its exit status decides.
fn write_prompt(stdin: Option<ChildStdin>, prompt: &str) -> std::io::Result<()> {
    let Some(mut stdin) = stdin else {
        return Ok(());
    };
    match stdin.write_all(prompt.as_bytes()) {
        Err(err) if err.kind() == std::io::ErrorKind::BrokenPipe => Ok(()),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn generator(bin: Option<&str>, args: &[&str]) -> CommandGenerator {
        CommandGenerator::new(&GeneratorConfig {
            bin: bin.map(str::to_string),
            args: args.iter().map(|s| s.to_string()).collect(),
        })
    }

    #[test]
    fn missing_bin_is_not_configured() {
        let err = generator(None, &[]).generate("hi").expect_err("no bin");
        assert!(matches!(err, GenerateError::NotConfigured));
    }

    #[test]
    fn spawn_failure_names_the_binary() {
        let err = generator(Some("definitely-not-a-real-generator-bin"), &[])
            .generate("hi")
            .expect_err("spawn must fail");
        match err {
            GenerateError::Spawn { bin, .. } => {
                assert_eq!(bin, "definitely-not-a-real-generator-bin")
            }
            other => panic!("expected Spawn, got {other:?}"),
        }
    }

    #[cfg(unix)]
    #[test]
    fn prompt_is_piped_through_stdin() {
        let out = generator(Some("cat"), &[])
            .generate("  [{\"action\":\"Reboot\"}]\n")
            .expect("cat echoes");
        assert_eq!(out, "[{\"action\":\"Reboot\"}]");
    }

    #[cfg(unix)]
    #[test]
    fn large_prompts_do_not_stall_the_pipes() {
        let prompt = "x".repeat(256 * 1024);
        let (tx, rx) = std::sync::mpsc::channel();
        std::thread::spawn(move || {
            let _ = tx.send(generator(Some("cat"), &[]).generate(&prompt));
        });
        let out = rx
            .recv_timeout(std::time::Duration::from_secs(30))
            .expect("generator finished")
            .expect("cat echoes");
        assert_eq!(out.len(), 256 * 1024);
    }

    #[cfg(unix)]
    #[test]
    fn non_zero_exit_and_empty_output_fail() {
        let err = generator(Some("false"), &[]).generate("x").expect_err("exit 1");
        assert!(matches!(err, GenerateError::Exit { code: Some(1), .. }));

        let err = generator(Some("true"), &[]).generate("x").expect_err("no stdout");
        assert!(matches!(err, GenerateError::Empty));
    }
}
