//! Error types shared across scenerun crates.

use std::path::PathBuf;
use std::time::Duration;

/// Top-level error type for scenerun operations.
#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Failed to start renderer `{program}`: {source}")]
    Spawn {
        program: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Render exceeded the {limit:?} timeout")]
    Timeout { limit: Duration },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Result type alias using RunnerError.
pub type RunnerResult<T> = Result<T, RunnerError>;

impl RunnerError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    pub fn spawn(program: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Spawn {
            program: program.into(),
            source,
        }
    }

    pub fn timeout(limit: Duration) -> Self {
        Self::Timeout { limit }
    }
}

/// Human-readable duration used in timeout messages ("5 minutes", "30 seconds").
pub fn describe_duration(limit: Duration) -> String {
    let secs = limit.as_secs();
    if limit.subsec_nanos() != 0 || secs == 0 {
        return format!("{} ms", limit.as_millis());
    }
    if secs % 60 == 0 {
        let minutes = secs / 60;
        return format!("{minutes} minute{}", if minutes == 1 { "" } else { "s" });
    }
    format!("{secs} second{}", if secs == 1 { "" } else { "s" })
}
