use thiserror::Error;

/// Structural and configuration errors. Any of these aborts a harness run;
/// problems inside workload bodies never surface here.
#[derive(Error, Debug)]
pub enum HarnessError {
    #[error("duplicate workload: {name}")]
    DuplicateWorkload { name: String },

    #[error("workload not found: {name}")]
    NotFound { name: String },

    #[error("invalid configuration: {reason}")]
    InvalidConfiguration { reason: String },

    #[error("malformed workload {name}: {reason}")]
    MalformedWorkload { name: String, reason: String },

    #[error("harness is {actual}, expected {expected}")]
    InvalidState {
        expected: &'static str,
        actual: &'static str,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl HarnessError {
    pub fn invalid_config(reason: impl Into<String>) -> Self {
        Self::InvalidConfiguration {
            reason: reason.into(),
        }
    }

    /// Load-time errors move the driver into its `Failed` state.
    pub fn is_load_time(&self) -> bool {
        matches!(
            self,
            Self::DuplicateWorkload { .. }
                | Self::NotFound { .. }
                | Self::InvalidConfiguration { .. }
                | Self::MalformedWorkload { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, HarnessError>;
