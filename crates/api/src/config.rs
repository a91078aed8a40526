#![forbid(unsafe_code)]

use std::path::PathBuf;

pub const DEFAULT_STORAGE_DIR: &str = ".mop";
pub const DEFAULT_LOG_FILTER: &str = "info";

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GeneratorConfig {
    pub bin: Option<String>,
    pub args: Vec<String>,
}

/// Process-level settings, resolved once at startup and passed down explicitly.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AppConfig {
    pub storage_dir: PathBuf,
    pub generator: GeneratorConfig,
    pub log_filter: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            storage_dir: PathBuf::from(DEFAULT_STORAGE_DIR),
            generator: GeneratorConfig::default(),
            log_filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(env_var)
    }

    /// Defaults overlaid with `MOP_*` variables as returned by `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        if let Some(dir) = lookup("MOP_STORAGE_DIR") {
            config.storage_dir = PathBuf::from(dir);
        }
        config.generator.bin = lookup("MOP_GENERATOR_BIN");
        if let Some(args) = lookup("MOP_GENERATOR_ARGS") {
            config.generator.args = split_args(&args);
        }
        if let Some(filter) = lookup("MOP_LOG") {
            config.log_filter = filter;
        }
        config
    }

    /// Consumes a global flag starting at `args[*i]`. Returns `Ok(false)` for anything
    /// that is not a global flag, leaving `i` untouched.
    pub fn take_flag(&mut self, args: &[String], i: &mut usize) -> Result<bool, String> {
        match args[*i].as_str() {
            "--storage-dir" => {
                *i += 1;
                let v = args.get(*i).ok_or("--storage-dir requires DIR")?;
                self.storage_dir = PathBuf::from(v);
            }
            "--generator-bin" => {
                *i += 1;
                let v = args.get(*i).ok_or("--generator-bin requires PATH")?;
                self.generator.bin = Some(v.to_string());
            }
            "--generator-arg" => {
                *i += 1;
                let v = args.get(*i).ok_or("--generator-arg requires ARG")?;
                self.generator.args.push(v.to_string());
            }
            "--log" => {
                *i += 1;
                let v = args.get(*i).ok_or("--log requires FILTER")?;
                self.log_filter = v.to_string();
            }
            _ => return Ok(false),
        }
        Ok(true)
    }
}

pub fn env_var(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn split_args(raw: &str) -> Vec<String> {
    raw.split_whitespace().map(str::to_string).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect::<HashMap<_, _>>();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn defaults_apply_without_environment() {
        let config = AppConfig::from_lookup(lookup(&[]));
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.storage_dir, PathBuf::from(".mop"));
        assert_eq!(config.log_filter, "info");
        assert!(config.generator.bin.is_none());
    }

    #[test]
    fn environment_overrides_defaults() {
        let config = AppConfig::from_lookup(lookup(&[
            ("MOP_STORAGE_DIR", "/var/lib/mop"),
            ("MOP_GENERATOR_BIN", "llm"),
            ("MOP_GENERATOR_ARGS", "-m  small --json"),
            ("MOP_LOG", "mop_storage=debug"),
        ]));
        assert_eq!(config.storage_dir, PathBuf::from("/var/lib/mop"));
        assert_eq!(config.generator.bin.as_deref(), Some("llm"));
        assert_eq!(config.generator.args, vec!["-m", "small", "--json"]);
        assert_eq!(config.log_filter, "mop_storage=debug");
    }

    #[test]
    fn flags_override_environment() {
        let mut config = AppConfig::from_lookup(lookup(&[("MOP_STORAGE_DIR", "/env")]));
        let args = ["--storage-dir", "/flag", "--generator-arg", "-q", "list"]
            .iter()
            .map(|s| s.to_string())
            .collect::<Vec<_>>();

        let mut i = 0;
        assert!(config.take_flag(&args, &mut i).expect("storage dir"));
        i += 1;
        assert!(config.take_flag(&args, &mut i).expect("generator arg"));
        i += 1;
        assert!(!config.take_flag(&args, &mut i).expect("not a flag"));
        assert_eq!(i, 4);
        assert_eq!(config.storage_dir, PathBuf::from("/flag"));
        assert_eq!(config.generator.args, vec!["-q"]);
    }

    #[test]
    fn flag_without_value_is_an_error() {
        let mut config = AppConfig::default();
        let args = vec!["--log".to_string()];
        let err = config.take_flag(&args, &mut 0).expect_err("missing value");
        assert!(err.contains("--log"));
    }
}
