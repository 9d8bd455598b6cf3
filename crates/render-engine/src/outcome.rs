//! Render request and the result record printed for the caller.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Render quality preset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quality {
    Low,
    High,
}

impl Quality {
    /// Parse a quality argument. Only the exact text `low` selects
    /// [`Quality::Low`]; anything else renders at high quality.
    pub fn parse(value: &str) -> Self {
        if value == "low" {
            Self::Low
        } else {
            Self::High
        }
    }

    /// Renderer flag for this preset.
    pub fn flag(self) -> &'static str {
        match self {
            Self::Low => "-ql",
            Self::High => "-qh",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::High => "high",
        }
    }
}

impl fmt::Display for Quality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single render invocation.
#[derive(Debug, Clone)]
pub struct RenderRequest {
    /// Script source code.
    pub script: String,

    /// Scene the renderer should look up inside the script.
    pub scene: String,

    /// Where the renderer writes the video.
    pub output_path: PathBuf,

    pub quality: Quality,
}

/// Result record emitted as one JSON object on stdout.
///
/// Fields that do not apply to the outcome are omitted from the JSON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderOutcome {
    pub success: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_path: Option<PathBuf>,

    /// Size of the rendered file in bytes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_size: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exit_code: Option<i32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stdout: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stderr: Option<String>,
}

impl RenderOutcome {
    /// The renderer exited cleanly and produced `file_size` bytes at `output_path`.
    pub fn rendered(
        output_path: PathBuf,
        file_size: u64,
        stdout: String,
        stderr: String,
    ) -> Self {
        Self {
            success: true,
            output_path: Some(output_path),
            file_size: Some(file_size),
            error: None,
            exit_code: None,
            stdout: Some(stdout),
            stderr: Some(stderr),
        }
    }

    /// The renderer ran to completion but did not produce the output file.
    pub fn renderer_failed(exit_code: Option<i32>, stdout: String, stderr: String) -> Self {
        let error = match exit_code {
            Some(code) => format!("Manim failed with exit code {code}"),
            None => "Manim was terminated without an exit code".to_string(),
        };
        Self {
            exit_code,
            stdout: Some(stdout),
            stderr: Some(stderr),
            ..Self::failure(error)
        }
    }

    /// A failure with only a message.
    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            output_path: None,
            file_size: None,
            error: Some(error.into()),
            exit_code: None,
            stdout: None,
            stderr: None,
        }
    }

    /// Compact single-line JSON, as consumed by the calling process.
    pub fn to_json_line(&self) -> String {
        // A struct of strings, integers and paths always serializes.
        serde_json::to_string(self).unwrap_or_else(|e| {
            format!(
                r#"{{"success":false,"error":"failed to encode result: {}"}}"#,
                e.to_string().replace('"', "'")
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_quality_flags() {
        assert_eq!(Quality::parse("low").flag(), "-ql");
        assert_eq!(Quality::parse("high").flag(), "-qh");
        assert_eq!(Quality::parse("LOW").flag(), "-qh");
        assert_eq!(Quality::parse(" low").flag(), "-qh");
    }

    proptest! {
        #[test]
        fn test_non_low_quality_is_high(value in "[a-zA-Z0-9 ]{0,12}") {
            prop_assume!(value != "low");
            prop_assert_eq!(Quality::parse(&value), Quality::High);
        }
    }

    #[test]
    fn test_success_record_shape() {
        let outcome = RenderOutcome::rendered(
            PathBuf::from("/tmp/out.mp4"),
            1024,
            "rendered".to_string(),
            String::new(),
        );
        let value: serde_json::Value = serde_json::from_str(&outcome.to_json_line()).unwrap();
        assert_eq!(value["success"], true);
        assert_eq!(value["output_path"], "/tmp/out.mp4");
        assert_eq!(value["file_size"], 1024);
        assert!(value.get("error").is_none());
        assert!(value.get("exit_code").is_none());
    }

    #[test]
    fn test_failure_record_omits_absent_fields() {
        let json = RenderOutcome::failure("Manim execution timed out (5 minutes)").to_json_line();
        assert_eq!(
            json,
            r#"{"success":false,"error":"Manim execution timed out (5 minutes)"}"#
        );
    }

    #[test]
    fn test_renderer_failure_mentions_exit_code() {
        let outcome = RenderOutcome::renderer_failed(Some(2), String::new(), "boom".to_string());
        assert!(!outcome.success);
        assert_eq!(outcome.error.as_deref(), Some("Manim failed with exit code 2"));
        assert_eq!(outcome.exit_code, Some(2));
        assert_eq!(outcome.stderr.as_deref(), Some("boom"));
    }

    #[test]
    fn test_signal_termination_message() {
        let outcome = RenderOutcome::renderer_failed(None, String::new(), String::new());
        assert_eq!(
            outcome.error.as_deref(),
            Some("Manim was terminated without an exit code")
        );
    }

    #[test]
    fn test_record_parses_back() {
        let outcome = RenderOutcome::renderer_failed(Some(1), "out".into(), "err".into());
        let parsed: RenderOutcome = serde_json::from_str(&outcome.to_json_line()).unwrap();
        assert_eq!(parsed, outcome);
    }
}
