use std::collections::BTreeMap;
use std::fmt::Write as _;

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::equivalence::{Equivalence, Verdict};
use crate::runner::RunConfig;
use crate::stats::PerformanceSummary;
use crate::value::Value;

pub const SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunMeta {
    pub schema_version: u32,
    pub harness_version: String,
    pub repetitions: u32,
    pub warmup: u32,
    pub timeout_ms: Option<u64>,
    pub parallel: bool,
    pub stack_size: usize,
    /// RFC 3339, UTC, whole seconds.
    pub started_at: String,
    pub git_sha: Option<String>,
}

impl RunMeta {
    pub fn capture(cfg: &RunConfig) -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            harness_version: env!("CARGO_PKG_VERSION").to_string(),
            repetitions: cfg.repetitions,
            warmup: cfg.warmup,
            timeout_ms: cfg
                .timeout
                .map(|t| u64::try_from(t.as_millis()).unwrap_or(u64::MAX)),
            parallel: cfg.parallel,
            stack_size: cfg.stack_size,
            started_at: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
            git_sha: commit_from_env(),
        }
    }
}

/// CI variables that carry the commit under test, most specific first.
const COMMIT_VARS: [&str; 2] = ["GIT_SHA", "GITHUB_SHA"];

fn commit_from_env() -> Option<String> {
    COMMIT_VARS.iter().find_map(|var| {
        let sha = std::env::var(var).ok()?;
        let sha = sha.trim();
        (!sha.is_empty()).then(|| sha.get(..12).unwrap_or(sha).to_string())
    })
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkloadReport {
    pub name: String,
    pub description: Option<String>,
    pub params: BTreeMap<String, i64>,
    pub expected: Option<Value>,
    #[serde(flatten)]
    pub equivalence: Equivalence,
    #[serde(flatten)]
    pub performance: PerformanceSummary,
}

impl WorkloadReport {
    pub fn verdict(&self) -> Verdict {
        self.equivalence.verdict
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HarnessReport {
    pub run: RunMeta,
    pub workloads: Vec<WorkloadReport>,
    /// Workloads not measured because the run was cancelled.
    pub skipped: Vec<String>,
    pub cancelled: bool,
    /// SHA-256 over verdicts and values; durations excluded.
    pub digest: String,
}

impl HarnessReport {
    pub fn new(run: RunMeta, workloads: Vec<WorkloadReport>, skipped: Vec<String>) -> Self {
        let digest = digest(&workloads);
        Self {
            run,
            cancelled: !skipped.is_empty(),
            workloads,
            skipped,
            digest,
        }
    }

    pub fn all_passed(&self) -> bool {
        self.skipped.is_empty() && self.workloads.iter().all(|w| w.verdict() == Verdict::Pass)
    }

    /// 0 when everything passed, 1 otherwise.
    pub fn exit_code(&self) -> u8 {
        if self.all_passed() {
            0
        } else {
            1
        }
    }

    pub fn count(&self, verdict: Verdict) -> usize {
        self.workloads.iter().filter(|w| w.verdict() == verdict).count()
    }

    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Fixed-width summary, one block per workload.
    pub fn render_text(&self) -> String {
        let mut out = String::new();
        for w in &self.workloads {
            let _ = writeln!(out, "{:<24} {}", w.name, w.verdict().as_str().to_uppercase());
            if let Some(oracle) = &w.equivalence.oracle {
                let _ = writeln!(out, "  oracle     {}", oracle.value);
            }
            for m in &w.equivalence.mismatches {
                let _ = writeln!(out, "  diverges   {} = {}", m.variant, m.value);
            }
            for label in &w.equivalence.never_succeeded {
                let _ = writeln!(out, "  no value   {label}");
            }
            for v in &w.performance.variants {
                match &v.timing {
                    Some(t) => {
                        let _ = writeln!(
                            out,
                            "  {:<14} n={:<4} min={:>12} med={:>12} mean={:>14.1} max={:>12} fail={}",
                            v.label, t.count, t.min_ns, t.median_ns, t.mean_ns, t.max_ns, v.failure_count
                        );
                    }
                    None => {
                        let _ = writeln!(out, "  {:<14} n=0    fail={}", v.label, v.failure_count);
                    }
                }
            }
            if let Some(ratio) = &w.performance.ratio {
                let shown = ratio
                    .value
                    .map(|r| format!("{r:.3}"))
                    .unwrap_or_else(|| "undefined".to_string());
                let _ = writeln!(out, "  ratio      {}/{} = {shown}", ratio.numerator, ratio.denominator);
            }
        }
        for name in &self.skipped {
            let _ = writeln!(out, "{name:<24} SKIPPED");
        }
        let _ = writeln!(
            out,
            "pass={} mismatch={} inconclusive={} skipped={} digest={}",
            self.count(Verdict::Pass),
            self.count(Verdict::Mismatch),
            self.count(Verdict::Inconclusive),
            self.skipped.len(),
            &self.digest[..16.min(self.digest.len())]
        );
        out
    }
}

fn digest(workloads: &[WorkloadReport]) -> String {
    let mut hasher = Sha256::new();
    for w in workloads {
        hasher.update(w.name.as_bytes());
        hasher.update([0u8]);
        hasher.update(w.verdict().as_str().as_bytes());
        for group in &w.equivalence.groups {
            hasher.update(group.value.to_string().as_bytes());
            for label in &group.variants {
                hasher.update(b"|");
                hasher.update(label.as_bytes());
            }
        }
        for v in &w.performance.variants {
            hasher.update(v.label.as_bytes());
            hasher.update((v.failure_count as u64).to_le_bytes());
        }
        hasher.update([0xffu8]);
    }
    hex(&hasher.finalize())
}

fn hex(bytes: &[u8]) -> String {
    let mut s = String::with_capacity(bytes.len() * 2);
    for b in bytes {
        let _ = write!(s, "{b:02x}");
    }
    s
}
