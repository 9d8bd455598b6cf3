//! Application configuration.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{RunnerError, RunnerResult};

/// Global application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// How the external renderer is invoked.
    pub renderer: RendererConfig,

    /// Logging configuration.
    pub logging: LoggingConfig,
}

/// External renderer invocation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RendererConfig {
    /// Interpreter (or any executable) that hosts the renderer.
    pub python: PathBuf,

    /// Arguments placed before the script path, e.g. `-m manim`.
    pub program_args: Vec<String>,

    /// Container format passed to `--format`.
    pub format: String,

    /// Hard limit for a single render.
    pub timeout_secs: u64,

    /// Pass `--disable_caching` to the renderer.
    pub disable_caching: bool,

    /// Directory for temporary script files (system temp dir when unset).
    pub scratch_dir: Option<PathBuf>,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "scenerun=debug,warn").
    pub level: String,

    /// Whether to output structured JSON logs.
    pub json: bool,

    /// Optional log file path. Logs go to stderr when unset.
    pub file: Option<PathBuf>,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            python: default_python(),
            program_args: vec!["-m".to_string(), "manim".to_string()],
            format: "mp4".to_string(),
            timeout_secs: 300,
            disable_caching: true,
            scratch_dir: None,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
            file: None,
        }
    }
}

impl AppConfig {
    /// Load config from the standard location, then apply environment overrides.
    ///
    /// A missing file yields defaults; an unreadable or malformed one is an error.
    pub fn load() -> RunnerResult<Self> {
        let mut config = Self::load_file(&config_file_path())?;
        config.apply_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Load config from an explicit path, then apply environment overrides.
    pub fn load_from(path: &Path) -> RunnerResult<Self> {
        if !path.exists() {
            return Err(RunnerError::config(format!(
                "config file not found: {}",
                path.display()
            )));
        }
        let mut config = Self::load_file(path)?;
        config.apply_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    fn load_file(path: &Path) -> RunnerResult<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path).map_err(|e| {
            RunnerError::config(format!("failed to read {}: {e}", path.display()))
        })?;
        serde_json::from_str(&content)
            .map_err(|e| RunnerError::config(format!("failed to parse {}: {e}", path.display())))
    }

    /// Overlay `SCENERUN_*` settings. Unparseable values are ignored.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(python) = lookup("SCENERUN_PYTHON").filter(|v| !v.trim().is_empty()) {
            self.renderer.python = PathBuf::from(python);
        }
        if let Some(secs) = lookup("SCENERUN_TIMEOUT_SECS").and_then(|v| v.trim().parse().ok()) {
            self.renderer.timeout_secs = secs;
        }
        if let Some(dir) = lookup("SCENERUN_SCRATCH_DIR").filter(|v| !v.trim().is_empty()) {
            self.renderer.scratch_dir = Some(PathBuf::from(dir));
        }
        if let Some(level) = lookup("SCENERUN_LOG").filter(|v| !v.trim().is_empty()) {
            self.logging.level = level;
        }
        if let Some(json) = lookup("SCENERUN_LOG_JSON") {
            self.logging.json = matches!(json.trim().to_ascii_lowercase().as_str(), "1" | "true");
        }
    }
}

/// Standard config file location.
pub fn config_file_path() -> PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
            PathBuf::from(home).join(".config")
        });
    base.join("scenerun").join("config.json")
}

/// Interpreter of the active virtualenv, or the platform's default Python.
fn default_python() -> PathBuf {
    if let Ok(venv) = std::env::var("VIRTUAL_ENV") {
        let venv = PathBuf::from(venv);
        return if cfg!(windows) {
            venv.join("Scripts").join("python.exe")
        } else {
            venv.join("bin").join("python")
        };
    }
    PathBuf::from(if cfg!(windows) { "python" } else { "python3" })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_renderer_defaults() {
        let config = RendererConfig::default();
        assert_eq!(config.program_args, vec!["-m", "manim"]);
        assert_eq!(config.format, "mp4");
        assert_eq!(config.timeout_secs, 300);
        assert!(config.disable_caching);
        assert!(config.scratch_dir.is_none());
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config: AppConfig =
            serde_json::from_str(r#"{"renderer": {"timeout_secs": 60}}"#).unwrap();
        assert_eq!(config.renderer.timeout_secs, 60);
        assert_eq!(config.renderer.format, "mp4");
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_load_from_reads_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(
            &path,
            r#"{"renderer": {"python": "/opt/venv/bin/python", "disable_caching": false}}"#,
        )
        .unwrap();

        let config = AppConfig::load_file(&path).unwrap();
        assert_eq!(config.renderer.python, PathBuf::from("/opt/venv/bin/python"));
        assert!(!config.renderer.disable_caching);
    }

    #[test]
    fn test_malformed_file_is_config_error() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{ not json").unwrap();

        let err = AppConfig::load_file(&path).unwrap_err();
        assert!(matches!(err, RunnerError::Config { .. }));
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = tempfile::TempDir::new().unwrap();
        let config = AppConfig::load_file(&dir.path().join("absent.json")).unwrap();
        assert_eq!(config.renderer.timeout_secs, 300);
    }

    #[test]
    fn test_load_from_missing_path_is_error() {
        let dir = tempfile::TempDir::new().unwrap();
        assert!(AppConfig::load_from(&dir.path().join("absent.json")).is_err());
    }

    #[test]
    fn test_env_overrides() {
        let mut config = AppConfig::default();
        config.apply_overrides(lookup_from(&[
            ("SCENERUN_PYTHON", "/usr/local/bin/python3.11"),
            ("SCENERUN_TIMEOUT_SECS", "42"),
            ("SCENERUN_SCRATCH_DIR", "/var/tmp/scenerun"),
            ("SCENERUN_LOG", "debug"),
            ("SCENERUN_LOG_JSON", "TRUE"),
        ]));

        assert_eq!(config.renderer.python, PathBuf::from("/usr/local/bin/python3.11"));
        assert_eq!(config.renderer.timeout_secs, 42);
        assert_eq!(
            config.renderer.scratch_dir,
            Some(PathBuf::from("/var/tmp/scenerun"))
        );
        assert_eq!(config.logging.level, "debug");
        assert!(config.logging.json);
    }

    #[test]
    fn test_invalid_timeout_override_is_ignored() {
        let mut config = AppConfig::default();
        config.apply_overrides(lookup_from(&[("SCENERUN_TIMEOUT_SECS", "soon")]));
        assert_eq!(config.renderer.timeout_secs, 300);
    }
}
