use clap::ValueEnum;
use serde::{Deserialize, Serialize};

pub mod catalog;
pub mod driver;
pub mod equivalence;
pub mod error;
pub mod registry;
pub mod report;
pub mod runner;
pub mod stats;
pub mod value;
pub mod workload;

pub use driver::{CancelToken, DriverState, Harness};
pub use error::{HarnessError, Result};
pub use report::HarnessReport;
pub use runner::RunConfig;
pub use value::Value;
pub use workload::{Variant, Workload};

/// Implementation style of a workload variant.
#[derive(Clone, Copy, Debug, ValueEnum, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Style {
    /// Iterator adaptors, folds and closures.
    Functional,
    /// Explicit loops and mutable accumulators.
    Imperative,
    /// Collect-based construction of intermediate containers.
    Comprehension,
}

impl Style {
    pub const ALL: [Style; 3] = [Style::Functional, Style::Imperative, Style::Comprehension];

    pub fn as_str(&self) -> &'static str {
        match self {
            Style::Functional => "functional",
            Style::Imperative => "imperative",
            Style::Comprehension => "comprehension",
        }
    }

    pub fn parse(label: &str) -> Option<Style> {
        Style::ALL.into_iter().find(|s| s.as_str() == label)
    }
}
