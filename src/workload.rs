//! Workload definitions: a named computation with several equivalent
//! implementations and an optional declared result.

use crate::error::{HarnessError, Result};
use crate::value::Value;
use crate::Style;
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::fmt;
use std::sync::Arc;

/// Zero-argument executable body of a variant.
pub type Body = Arc<dyn Fn() -> anyhow::Result<Value> + Send + Sync>;

/// One labeled implementation of a workload. Immutable once built.
#[derive(Clone)]
pub struct Variant {
    label: String,
    param: Option<i64>,
    body: Body,
}

impl Variant {
    pub fn new<F>(label: impl Into<String>, body: F) -> Self
    where
        F: Fn() -> anyhow::Result<Value> + Send + Sync + 'static,
    {
        Self {
            label: label.into(),
            param: None,
            body: Arc::new(body),
        }
    }

    /// Bind a size parameter into the body. The parameter is recorded so the
    /// report can show what the variant was run with.
    pub fn parameterized<F>(label: impl Into<String>, param: i64, body: F) -> Self
    where
        F: Fn(i64) -> anyhow::Result<Value> + Send + Sync + 'static,
    {
        Self {
            label: label.into(),
            param: Some(param),
            body: Arc::new(move || body(param)),
        }
    }

    /// Shorthand for a variant tagged with one of the known styles.
    pub fn styled<F>(style: Style, param: i64, body: F) -> Self
    where
        F: Fn(i64) -> anyhow::Result<Value> + Send + Sync + 'static,
    {
        Self::parameterized(style.as_str(), param, body)
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn param(&self) -> Option<i64> {
        self.param
    }

    pub fn style(&self) -> Option<Style> {
        Style::parse(&self.label)
    }

    pub fn execute(&self) -> anyhow::Result<Value> {
        (self.body)()
    }

    pub(crate) fn body(&self) -> Body {
        Arc::clone(&self.body)
    }
}

impl fmt::Debug for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Variant")
            .field("label", &self.label)
            .field("param", &self.param)
            .finish_non_exhaustive()
    }
}

/// Labels a registry accepts for variants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyleSet {
    labels: BTreeSet<String>,
}

impl Default for StyleSet {
    fn default() -> Self {
        Self {
            labels: Style::ALL.iter().map(|s| s.as_str().to_string()).collect(),
        }
    }
}

impl StyleSet {
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.labels.insert(label.into());
        self
    }

    pub fn contains(&self, label: &str) -> bool {
        self.labels.contains(label)
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.labels.iter().map(String::as_str)
    }
}

#[derive(Debug, Clone)]
pub struct Workload {
    name: String,
    description: Option<String>,
    params: BTreeMap<String, i64>,
    variants: Vec<Variant>,
    expected: Option<Value>,
}

impl Workload {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            params: BTreeMap::new(),
            variants: Vec::new(),
            expected: None,
        }
    }

    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn param(mut self, key: impl Into<String>, value: i64) -> Self {
        self.params.insert(key.into(), value);
        self
    }

    /// Append a variant. Declaration order is preserved everywhere downstream.
    pub fn variant(mut self, variant: Variant) -> Self {
        self.variants.push(variant);
        self
    }

    pub fn expect(mut self, value: impl Into<Value>) -> Self {
        self.expected = Some(value.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn params(&self) -> &BTreeMap<String, i64> {
        &self.params
    }

    pub fn variants(&self) -> &[Variant] {
        &self.variants
    }

    pub fn expected(&self) -> Option<&Value> {
        self.expected.as_ref()
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.variants.iter().map(Variant::label)
    }

    pub fn validate(&self, styles: &StyleSet) -> Result<()> {
        let malformed = |reason: String| HarnessError::MalformedWorkload {
            name: self.name.clone(),
            reason,
        };

        if self.name.trim().is_empty() {
            return Err(malformed("name must not be empty".to_string()));
        }
        if self.variants.len() < 2 {
            return Err(malformed(format!(
                "needs at least 2 variants, has {}",
                self.variants.len()
            )));
        }

        let mut seen = HashSet::new();
        for label in self.labels() {
            if !styles.contains(label) {
                return Err(malformed(format!("unknown variant style `{label}`")));
            }
            if !seen.insert(label) {
                return Err(malformed(format!("variant `{label}` declared twice")));
            }
        }
        Ok(())
    }
}
