//! Per-variant timing statistics and the pairwise ratio.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::runner::{Failure, VariantSamples};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DurationStats {
    pub count: usize,
    pub min_ns: u64,
    pub median_ns: u64,
    pub mean_ns: f64,
    pub max_ns: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariantStats {
    pub label: String,
    pub failure_count: usize,
    /// `None` when the variant never succeeded.
    pub timing: Option<DurationStats>,
    pub first_failure: Option<Failure>,
}

/// `numerator.median / denominator.median`, i.e. second variant over first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ratio {
    pub numerator: String,
    pub denominator: String,
    pub value: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceSummary {
    pub variants: Vec<VariantStats>,
    pub ratio: Option<Ratio>,
}

fn nanos(d: Duration) -> u64 {
    u64::try_from(d.as_nanos()).unwrap_or(u64::MAX)
}

/// Statistics over a set of durations; `None` for an empty set.
pub fn duration_stats(durations: &[Duration]) -> Option<DurationStats> {
    if durations.is_empty() {
        return None;
    }
    let mut sorted: Vec<u64> = durations.iter().copied().map(nanos).collect();
    sorted.sort_unstable();

    let count = sorted.len();
    let mid = count / 2;
    let median_ns = if count % 2 == 1 {
        sorted[mid]
    } else {
        // Two middles; midpoint without overflow.
        let (lo, hi) = (sorted[mid - 1], sorted[mid]);
        lo + (hi - lo) / 2
    };
    let total: u128 = sorted.iter().map(|&n| n as u128).sum();

    Some(DurationStats {
        count,
        min_ns: sorted[0],
        median_ns,
        mean_ns: total as f64 / count as f64,
        max_ns: sorted[count - 1],
    })
}

pub fn summarize(samples: &[VariantSamples]) -> PerformanceSummary {
    let variants: Vec<VariantStats> = samples
        .iter()
        .map(|vs| {
            let ok: Vec<Duration> = vs
                .samples
                .iter()
                .filter(|s| s.is_success())
                .map(|s| s.duration)
                .collect();
            VariantStats {
                label: vs.label.clone(),
                failure_count: vs.failure_count(),
                timing: duration_stats(&ok),
                first_failure: vs.samples.iter().find_map(|s| s.failure().cloned()),
            }
        })
        .collect();

    let ratio = match variants.as_slice() {
        [a, b] => Some(Ratio {
            numerator: b.label.clone(),
            denominator: a.label.clone(),
            value: median_ratio(b.timing.as_ref(), a.timing.as_ref()),
        }),
        _ => None,
    };

    PerformanceSummary { variants, ratio }
}

fn median_ratio(num: Option<&DurationStats>, den: Option<&DurationStats>) -> Option<f64> {
    let (num, den) = (num?, den?);
    if den.median_ns == 0 {
        return None;
    }
    Some(num.median_ns as f64 / den.median_ns as f64)
}
