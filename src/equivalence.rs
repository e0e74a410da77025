//! Correctness gate: do all variants of a workload agree with the oracle?

use serde::{Deserialize, Serialize};

use crate::runner::VariantSamples;
use crate::value::Value;
use crate::workload::Workload;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    /// Every variant that produced a value agrees with the oracle.
    Pass,
    /// At least one variant produced a value different from the oracle.
    Mismatch,
    /// No variant produced a value.
    Inconclusive,
}

impl Verdict {
    pub fn as_str(&self) -> &'static str {
        match self {
            Verdict::Pass => "pass",
            Verdict::Mismatch => "mismatch",
            Verdict::Inconclusive => "inconclusive",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum OracleSource {
    Declared,
    FirstVariant { variant: String },
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Oracle {
    pub value: Value,
    #[serde(flatten)]
    pub source: OracleSource,
}

/// A distinct value and every variant that produced it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValueGroup {
    pub value: Value,
    pub variants: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Divergence {
    pub variant: String,
    pub value: Value,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Equivalence {
    pub verdict: Verdict,
    pub oracle: Option<Oracle>,
    pub groups: Vec<ValueGroup>,
    pub mismatches: Vec<Divergence>,
    /// Variants without a single successful sample. They contribute nothing
    /// to the comparison and are never counted as mismatches.
    pub never_succeeded: Vec<String>,
}

pub fn check(workload: &Workload, samples_by_variant: &[VariantSamples]) -> Equivalence {
    // First successful value per variant, declaration order.
    let firsts: Vec<(&str, Option<&Value>)> = workload
        .variants()
        .iter()
        .map(|variant| {
            let value = samples_by_variant
                .iter()
                .find(|vs| vs.label == variant.label())
                .and_then(|vs| vs.samples.iter().find_map(|s| s.value()));
            (variant.label(), value)
        })
        .collect();

    let never_succeeded: Vec<String> = firsts
        .iter()
        .filter(|(_, v)| v.is_none())
        .map(|(label, _)| label.to_string())
        .collect();

    let oracle = match workload.expected() {
        Some(expected) => Some(Oracle {
            value: expected.clone(),
            source: OracleSource::Declared,
        }),
        None => firsts.iter().find_map(|(label, v)| {
            v.map(|value| Oracle {
                value: value.clone(),
                source: OracleSource::FirstVariant {
                    variant: label.to_string(),
                },
            })
        }),
    };

    let mut groups: Vec<ValueGroup> = Vec::new();
    for (label, value) in firsts.iter().filter_map(|(l, v)| v.map(|v| (*l, v))) {
        match groups.iter_mut().find(|g| &g.value == value) {
            Some(group) => group.variants.push(label.to_string()),
            None => groups.push(ValueGroup {
                value: value.clone(),
                variants: vec![label.to_string()],
            }),
        }
    }

    if groups.is_empty() {
        return Equivalence {
            verdict: Verdict::Inconclusive,
            oracle,
            groups,
            mismatches: Vec::new(),
            never_succeeded,
        };
    }

    let mismatches: Vec<Divergence> = match &oracle {
        Some(oracle) => firsts
            .iter()
            .filter_map(|(label, v)| match v {
                Some(value) if *value != &oracle.value => Some(Divergence {
                    variant: label.to_string(),
                    value: (*value).clone(),
                }),
                _ => None,
            })
            .collect(),
        None => Vec::new(),
    };

    let verdict = if mismatches.is_empty() {
        Verdict::Pass
    } else {
        Verdict::Mismatch
    };

    Equivalence {
        verdict,
        oracle,
        groups,
        mismatches,
        never_succeeded,
    }
}
