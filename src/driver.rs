//! Harness driver: load workloads, measure every variant, assemble the report.
//!
//! ```text
//! Idle -> Loading -> Running -> Reporting -> Done
//!            \
//!             -> Failed
//! ```
//!
//! Only load-time problems (duplicate or malformed workloads, bad
//! configuration, unknown selections) reach `Failed`. Faults inside workload
//! bodies are recorded as samples and degrade that workload's verdict.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};

use crate::equivalence;
use crate::error::{HarnessError, Result};
use crate::registry::WorkloadRegistry;
use crate::report::{HarnessReport, RunMeta, WorkloadReport};
use crate::runner::{RunConfig, VariantRunner, VariantSamples};
use crate::stats;
use crate::workload::{StyleSet, Workload};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DriverState {
    Idle,
    Loading,
    Running,
    Reporting,
    Done,
    Failed,
}

impl DriverState {
    pub fn as_str(&self) -> &'static str {
        match self {
            DriverState::Idle => "idle",
            DriverState::Loading => "loading",
            DriverState::Running => "running",
            DriverState::Reporting => "reporting",
            DriverState::Done => "done",
            DriverState::Failed => "failed",
        }
    }
}

/// Cooperative cancellation, honoured between workloads only.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

pub struct Harness {
    config: RunConfig,
    registry: WorkloadRegistry,
    selection: Vec<String>,
    state: DriverState,
}

impl Harness {
    pub fn new(config: RunConfig) -> Self {
        Self::with_styles(config, StyleSet::default())
    }

    pub fn with_styles(config: RunConfig, styles: StyleSet) -> Self {
        Self {
            config,
            registry: WorkloadRegistry::with_styles(styles),
            selection: Vec::new(),
            state: DriverState::Idle,
        }
    }

    /// Restrict the run to the named workloads. Empty means all of them.
    pub fn select<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.selection = names.into_iter().map(Into::into).collect();
        self
    }

    pub fn state(&self) -> DriverState {
        self.state
    }

    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    pub fn registry(&self) -> &WorkloadRegistry {
        &self.registry
    }

    fn expect_state(&self, expected: DriverState) -> Result<()> {
        if self.state == expected {
            Ok(())
        } else {
            Err(HarnessError::InvalidState {
                expected: expected.as_str(),
                actual: self.state.as_str(),
            })
        }
    }

    pub fn load<I>(&mut self, workloads: I) -> Result<()>
    where
        I: IntoIterator<Item = Workload>,
    {
        self.expect_state(DriverState::Idle)?;
        self.state = DriverState::Loading;

        let loaded = self.populate(workloads);
        if let Err(err) = &loaded {
            tracing::error!(error = %err, "loading failed");
            self.state = DriverState::Failed;
        }
        loaded
    }

    fn populate<I>(&mut self, workloads: I) -> Result<()>
    where
        I: IntoIterator<Item = Workload>,
    {
        self.config.validate()?;
        for workload in workloads {
            self.registry.register(workload)?;
        }
        self.registry.select(&self.selection)?;
        tracing::info!(
            workloads = self.registry.len(),
            selected = self.selection.len(),
            "workloads loaded"
        );
        Ok(())
    }

    pub fn run(&mut self, cancel: &CancelToken) -> Result<HarnessReport> {
        self.expect_state(DriverState::Loading)?;
        self.state = DriverState::Running;

        let targets: Vec<&Workload> = if self.selection.is_empty() {
            self.registry.list().collect()
        } else {
            self.registry.select(&self.selection)?
        };
        let runner = self.config.runner();
        let repetitions = self.config.repetitions;

        let measured: Vec<Option<Vec<VariantSamples>>> = if self.config.parallel {
            let pool = worker_pool(targets.len(), self.config.stack_size)?;
            pool.install(|| {
                targets
                    .par_iter()
                    .map(|w| {
                        if cancel.is_cancelled() {
                            return Ok(None);
                        }
                        measure(&runner, w, repetitions).map(Some)
                    })
                    .collect::<Result<_>>()
            })?
        } else {
            let mut out = Vec::with_capacity(targets.len());
            for w in &targets {
                if cancel.is_cancelled() {
                    out.push(None);
                    continue;
                }
                out.push(Some(measure(&runner, w, repetitions)?));
            }
            out
        };

        self.state = DriverState::Reporting;

        let mut reports = Vec::new();
        let mut skipped = Vec::new();
        for (workload, samples) in targets.iter().zip(measured) {
            match samples {
                Some(samples) => reports.push(assemble(workload, &samples)),
                None => skipped.push(workload.name().to_string()),
            }
        }
        if !skipped.is_empty() {
            tracing::warn!(skipped = skipped.len(), "run cancelled before all workloads were measured");
        }

        let report = HarnessReport::new(RunMeta::capture(&self.config), reports, skipped);
        self.state = DriverState::Done;
        Ok(report)
    }
}

/// Load and run in one step.
pub fn run_suite<I, S>(
    config: RunConfig,
    workloads: I,
    selection: &[S],
    cancel: &CancelToken,
) -> Result<HarnessReport>
where
    I: IntoIterator<Item = Workload>,
    S: AsRef<str>,
{
    let mut harness = Harness::new(config).select(selection.iter().map(|s| s.as_ref().to_string()));
    harness.load(workloads)?;
    harness.run(cancel)
}

/// Pool private to one run. Each worker measures one workload at a time.
fn worker_pool(workloads: usize, stack_size: usize) -> Result<ThreadPool> {
    let cores = std::thread::available_parallelism().map_or(1, |n| n.get());
    ThreadPoolBuilder::new()
        .num_threads(workloads.clamp(1, cores))
        .stack_size(stack_size)
        .thread_name(|i| format!("workload-worker-{i}"))
        .build()
        .map_err(|err| HarnessError::invalid_config(format!("could not start worker pool: {err}")))
}

fn measure(runner: &VariantRunner, workload: &Workload, repetitions: u32) -> Result<Vec<VariantSamples>> {
    let _span = tracing::info_span!("workload", name = workload.name()).entered();
    workload
        .variants()
        .iter()
        .map(|variant| -> Result<VariantSamples> {
            Ok(VariantSamples {
                label: variant.label().to_string(),
                samples: runner.run(variant, repetitions)?,
            })
        })
        .collect()
}

fn assemble(workload: &Workload, samples: &[VariantSamples]) -> WorkloadReport {
    let equivalence = equivalence::check(workload, samples);
    let performance = stats::summarize(samples);

    tracing::info!(
        workload = workload.name(),
        verdict = equivalence.verdict.as_str(),
        ratio = ?performance.ratio.as_ref().and_then(|r| r.value),
        "workload checked"
    );
    for m in &equivalence.mismatches {
        tracing::warn!(workload = workload.name(), variant = %m.variant, value = %m.value, "variant diverges from oracle");
    }

    WorkloadReport {
        name: workload.name().to_string(),
        description: workload.description().map(str::to_string),
        params: workload.params().clone(),
        expected: workload.expected().cloned(),
        equivalence,
        performance,
    }
}
