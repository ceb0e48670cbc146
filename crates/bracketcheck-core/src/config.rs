//! Configuration resolution for bracketcheck.
//!
//! Implements hierarchical config resolution:
//! 1. Built-in defaults
//! 2. Global config (~/.config/bracketcheck/settings.json)
//! 3. Explicit config file (`--config`)
//! 4. Environment variables
//! 5. CLI arguments (highest priority, applied by the binaries)

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::grammar::{Grammar, GrammarDef, Preset};

/// Complete bracketcheck configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct Config {
    #[serde(default)]
    pub grammar: GrammarConfig,
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub log: LogConfig,
}

/// Which bracket grammar to evaluate with.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct GrammarConfig {
    /// Built-in preset, used when no custom grammar is given.
    #[serde(default)]
    pub preset: Preset,
    /// Custom grammar; takes precedence over `preset`.
    #[serde(default)]
    pub custom: Option<GrammarDef>,
}

impl GrammarConfig {
    /// Validate and compile the selected grammar.
    pub fn resolve(&self) -> Result<Grammar> {
        match &self.custom {
            Some(def) => Grammar::compile(def),
            None => Ok(self.preset.grammar()),
        }
    }
}

/// Session execution settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct SessionConfig {
    /// Evaluation workers. `1` is sequential, `0` uses every core.
    pub jobs: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self { jobs: 1 }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct LogConfig {
    /// Default filter when `RUST_LOG` is unset.
    pub level: String,
    pub json: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            json: false,
        }
    }
}

/// Load configuration with hierarchical resolution.
///
/// `explicit` must exist when given; the global file is optional.
pub fn load_config(explicit: Option<&Path>) -> Result<Config> {
    let mut config = Config::default();

    // Load global config
    if let Some(global_path) = global_config_path() {
        if global_path.exists() {
            debug!(path = %global_path.display(), "loading global config");
            let global = read_layer(&global_path)?;
            merge_config(&mut config, global);
        }
    }

    // Load explicit config
    if let Some(path) = explicit {
        debug!(path = %path.display(), "loading config file");
        let file = read_layer(path)?;
        merge_config(&mut config, file);
    }

    // Apply environment overrides
    apply_env_overrides(&mut config);

    Ok(config)
}

/// Get the global config file path.
pub fn global_config_path() -> Option<PathBuf> {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .ok()
            .map(|h| PathBuf::from(h).join(".bracketcheck").join("settings.json"))
    }
    #[cfg(target_os = "macos")]
    {
        std::env::var("HOME").ok().map(|h| {
            PathBuf::from(h).join("Library/Application Support/bracketcheck/settings.json")
        })
    }
    #[cfg(target_os = "linux")]
    {
        std::env::var("XDG_CONFIG_HOME")
            .ok()
            .map(PathBuf::from)
            .or_else(|| std::env::var("HOME").ok().map(|h| PathBuf::from(h).join(".config")))
            .map(|p| p.join("bracketcheck").join("settings.json"))
    }
    #[cfg(not(any(target_os = "windows", target_os = "macos", target_os = "linux")))]
    {
        None
    }
}

/// One settings file as written: only the fields it names are set.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct ConfigLayer {
    grammar: GrammarLayer,
    session: SessionLayer,
    log: LogLayer,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct GrammarLayer {
    preset: Option<Preset>,
    custom: Option<GrammarDef>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct SessionLayer {
    jobs: Option<usize>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct LogLayer {
    level: Option<String>,
    json: Option<bool>,
}

/// Load a single settings file on top of the built-in defaults.
pub fn load_config_file(path: &Path) -> Result<Config> {
    let mut config = Config::default();
    merge_config(&mut config, read_layer(path)?);
    Ok(config)
}

fn read_layer(path: &Path) -> Result<ConfigLayer> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        Error::Config(format!("Failed to read config file {}: {}", path.display(), e))
    })?;
    let layer: ConfigLayer = serde_json::from_str(&content).map_err(|e| {
        Error::Config(format!("Failed to parse config file {}: {}", path.display(), e))
    })?;
    if let Some(def) = &layer.grammar.custom {
        def.validate().map_err(|e| {
            Error::Config(format!("Invalid grammar in {}: {}", path.display(), e))
        })?;
    }
    Ok(layer)
}

fn merge_config(base: &mut Config, overlay: ConfigLayer) {
    if let Some(preset) = overlay.grammar.preset {
        base.grammar.preset = preset;
    }
    if let Some(custom) = overlay.grammar.custom {
        base.grammar.custom = Some(custom);
    }
    if let Some(jobs) = overlay.session.jobs {
        base.session.jobs = jobs;
    }
    if let Some(level) = overlay.log.level {
        base.log.level = level;
    }
    if let Some(json) = overlay.log.json {
        base.log.json = json;
    }
}

fn apply_env_overrides(config: &mut Config) {
    apply_overrides(config, |key| std::env::var(key).ok());
}

/// Apply `BRACKETCHECK_*` overrides looked up through `var`.
fn apply_overrides(config: &mut Config, var: impl Fn(&str) -> Option<String>) {
    if let Some(val) = var("BRACKETCHECK_GRAMMAR") {
        match val.parse::<Preset>() {
            Ok(preset) => {
                config.grammar.preset = preset;
                config.grammar.custom = None;
            }
            Err(e) => warn!(error = %e, "ignoring BRACKETCHECK_GRAMMAR"),
        }
    }
    if let Some(val) = var("BRACKETCHECK_JOBS") {
        match val.parse() {
            Ok(jobs) => config.session.jobs = jobs,
            Err(e) => warn!(error = %e, value = %val, "ignoring BRACKETCHECK_JOBS"),
        }
    }
    if let Some(val) = var("BRACKETCHECK_LOG_LEVEL") {
        config.log.level = val;
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::grammar::OtherChars;

    #[test]
    fn default_config_is_ordered_and_sequential() {
        let config = Config::default();
        assert_eq!(config.grammar.preset, Preset::Ordered);
        assert!(config.grammar.custom.is_none());
        assert_eq!(config.session.jobs, 1);
        assert_eq!(config.log.level, "warn");
    }

    #[test]
    fn empty_file_means_defaults() {
        let config: Config = serde_json::from_str("{}").unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn load_explicit_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(
            &path,
            r#"{"grammar": {"preset": "nested"}, "session": {"jobs": 4}}"#,
        )
        .unwrap();

        let config = load_config_file(&path).unwrap();
        assert_eq!(config.grammar.preset, Preset::Nested);
        assert_eq!(config.session.jobs, 4);
        assert_eq!(config.log, LogConfig::default());
    }

    #[test]
    fn custom_grammar_from_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(
            &path,
            r#"{"grammar": {"custom": {
                "kinds": [
                    {"name": "round", "open": "(", "close": ")"},
                    {"name": "angle", "open": "<", "close": ">"}
                ],
                "other_chars": "ignore"
            }}}"#,
        )
        .unwrap();

        let config = load_config_file(&path).unwrap();
        let def = config.grammar.custom.as_ref().unwrap();
        assert_eq!(def.other_chars, OtherChars::Ignore);
        let grammar = config.grammar.resolve().unwrap();
        assert!(crate::evaluator::evaluate(&grammar, "<(a)>"));
        assert!(!crate::evaluator::evaluate(&grammar, "<(>)"));
    }

    #[test]
    fn invalid_custom_grammar_is_config_error() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(
            &path,
            r#"{"grammar": {"custom": {"kinds": [{"name": "x", "open": "|", "close": "|"}]}}}"#,
        )
        .unwrap();
        assert!(matches!(load_config_file(&path), Err(Error::Config(_))));
    }

    #[test]
    fn missing_file_is_config_error() {
        let err = load_config_file(Path::new("/nonexistent/bracketcheck.json")).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn env_overrides_apply() {
        let mut config = Config::default();
        config.grammar.custom = Some(GrammarDef::nested());
        apply_overrides(&mut config, |key| match key {
            "BRACKETCHECK_GRAMMAR" => Some("nested".into()),
            "BRACKETCHECK_JOBS" => Some("8".into()),
            "BRACKETCHECK_LOG_LEVEL" => Some("debug".into()),
            _ => None,
        });
        assert_eq!(config.grammar.preset, Preset::Nested);
        assert!(config.grammar.custom.is_none());
        assert_eq!(config.session.jobs, 8);
        assert_eq!(config.log.level, "debug");
    }

    #[test]
    fn bad_env_values_are_ignored() {
        let mut config = Config::default();
        apply_overrides(&mut config, |key| match key {
            "BRACKETCHECK_GRAMMAR" => Some("loose".into()),
            "BRACKETCHECK_JOBS" => Some("many".into()),
            _ => None,
        });
        assert_eq!(config, Config::default());
    }

    #[test]
    fn merge_keeps_custom_grammar_when_overlay_has_none() {
        let mut base = Config::default();
        base.grammar.custom = Some(GrammarDef::nested());
        merge_config(&mut base, ConfigLayer::default());
        assert!(base.grammar.custom.is_some());
    }

    #[test]
    fn later_file_only_overrides_fields_it_sets() {
        let dir = tempfile::TempDir::new().unwrap();
        let global = dir.path().join("global.json");
        let explicit = dir.path().join("explicit.json");
        std::fs::write(
            &global,
            r#"{"session": {"jobs": 4}, "log": {"level": "debug", "json": true}}"#,
        )
        .unwrap();
        std::fs::write(&explicit, r#"{"grammar": {"preset": "nested"}}"#).unwrap();

        let mut config = Config::default();
        merge_config(&mut config, read_layer(&global).unwrap());
        merge_config(&mut config, read_layer(&explicit).unwrap());

        assert_eq!(config.grammar.preset, Preset::Nested);
        assert_eq!(config.session.jobs, 4);
        assert_eq!(config.log.level, "debug");
        assert!(config.log.json);
    }

    #[test]
    fn later_file_can_reset_to_default_values() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, r#"{"session": {"jobs": 1}, "log": {"json": false}}"#).unwrap();

        let mut config = Config::default();
        config.session.jobs = 8;
        config.log.json = true;
        config.log.level = "info".into();
        merge_config(&mut config, read_layer(&path).unwrap());

        assert_eq!(config.session.jobs, 1);
        assert!(!config.log.json);
        assert_eq!(config.log.level, "info");
    }
}
