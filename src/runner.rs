use std::any::Any;
use std::hint::black_box;
use std::panic::{self, AssertUnwindSafe};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use crate::error::{HarnessError, Result};
use crate::value::Value;
use crate::workload::{Body, Variant};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RunConfig {
    /// Measured invocations per variant.
    pub repetitions: u32,
    /// Discarded invocations before measurement starts.
    pub warmup: u32,
    pub timeout: Option<Duration>,
    /// Measure independent workloads concurrently on a dedicated pool, one
    /// workload per worker with its variants still sequential. Workers are
    /// ordinary OS threads: they are not pinned and the scheduler may
    /// preempt them, so timings from parallel runs are noisier than
    /// sequential ones.
    pub parallel: bool,
    /// Stack size for every thread that runs a body (timeout threads and
    /// parallel workers).
    pub stack_size: usize,
}

/// Matches the usual main-thread stack on Linux.
pub const DEFAULT_STACK_SIZE: usize = 8 * 1024 * 1024;

const MIN_STACK_SIZE: usize = 64 * 1024;

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            repetitions: 1,
            warmup: 0,
            timeout: None,
            parallel: false,
            stack_size: DEFAULT_STACK_SIZE,
        }
    }
}

impl RunConfig {
    pub fn validate(&self) -> Result<()> {
        if self.repetitions == 0 {
            return Err(HarnessError::invalid_config("repetitions must be at least 1"));
        }
        if self.timeout == Some(Duration::ZERO) {
            return Err(HarnessError::invalid_config("timeout must be greater than zero"));
        }
        if self.stack_size < MIN_STACK_SIZE {
            return Err(HarnessError::invalid_config(format!(
                "stack size must be at least {MIN_STACK_SIZE} bytes"
            )));
        }
        Ok(())
    }

    pub fn runner(&self) -> VariantRunner {
        VariantRunner {
            warmup: self.warmup,
            timeout: self.timeout,
            stack_size: self.stack_size,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// The body returned an error.
    RuntimeFault,
    /// The body panicked.
    Panic,
    /// The per-invocation timeout fired first.
    Timeout,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Failure {
    pub kind: FailureKind,
    pub detail: String,
}

impl Failure {
    fn new(kind: FailureKind, detail: impl Into<String>) -> Self {
        Self {
            kind,
            detail: detail.into(),
        }
    }
}

/// Outcome of a single invocation.
#[derive(Clone, Debug)]
pub struct Sample {
    pub variant_label: String,
    /// Zero-based index among the measured invocations.
    pub repetition: u32,
    pub outcome: std::result::Result<Value, Failure>,
    pub duration: Duration,
}

impl Sample {
    pub fn value(&self) -> Option<&Value> {
        self.outcome.as_ref().ok()
    }

    pub fn failure(&self) -> Option<&Failure> {
        self.outcome.as_ref().err()
    }

    pub fn is_success(&self) -> bool {
        self.outcome.is_ok()
    }
}

/// Every sample of one variant, in repetition order.
#[derive(Clone, Debug)]
pub struct VariantSamples {
    pub label: String,
    pub samples: Vec<Sample>,
}

impl VariantSamples {
    pub fn failure_count(&self) -> usize {
        self.samples.iter().filter(|s| !s.is_success()).count()
    }
}

/// Executes variants one invocation at a time and turns every fault into data.
#[derive(Clone, Debug)]
pub struct VariantRunner {
    warmup: u32,
    timeout: Option<Duration>,
    stack_size: usize,
}

impl Default for VariantRunner {
    fn default() -> Self {
        Self::new(0, None)
    }
}

impl VariantRunner {
    pub fn new(warmup: u32, timeout: Option<Duration>) -> Self {
        Self {
            warmup,
            timeout,
            stack_size: DEFAULT_STACK_SIZE,
        }
    }

    pub fn with_stack_size(mut self, stack_size: usize) -> Self {
        self.stack_size = stack_size;
        self
    }

    /// Invoke `variant` `repetitions` times in sequence, one `Sample` each.
    ///
    /// With a timeout configured every invocation runs on its own thread. A
    /// timed-out invocation cannot be stopped, so once one times out (warmup
    /// included) the body is not called again: every remaining repetition is
    /// recorded as a `Timeout` without being invoked.
    pub fn run(&self, variant: &Variant, repetitions: u32) -> Result<Vec<Sample>> {
        if repetitions == 0 {
            return Err(HarnessError::invalid_config("repetitions must be at least 1"));
        }

        let body = variant.body();
        let mut stalled = false;
        for _ in 0..self.warmup {
            let (outcome, _) = black_box(self.invoke(&body));
            if is_timeout(&outcome) {
                stalled = true;
                break;
            }
        }

        let mut samples = Vec::with_capacity(repetitions as usize);
        for repetition in 0..repetitions {
            let (outcome, duration) = if stalled {
                (
                    Err(Failure::new(
                        FailureKind::Timeout,
                        "not invoked: an earlier invocation is still running",
                    )),
                    Duration::ZERO,
                )
            } else {
                self.invoke(&body)
            };
            stalled |= is_timeout(&outcome);

            match &outcome {
                Ok(value) => tracing::debug!(
                    variant = variant.label(),
                    repetition,
                    ns = duration.as_nanos() as u64,
                    %value,
                    "sample"
                ),
                Err(failure) => tracing::warn!(
                    variant = variant.label(),
                    repetition,
                    kind = ?failure.kind,
                    detail = %failure.detail,
                    "variant invocation failed"
                ),
            }
            samples.push(Sample {
                variant_label: variant.label().to_string(),
                repetition,
                outcome,
                duration,
            });
        }
        Ok(samples)
    }

    fn invoke(&self, body: &Body) -> Invocation {
        match self.timeout {
            None => invoke_inline(body),
            Some(limit) => invoke_with_timeout(body, limit, self.stack_size),
        }
    }
}

type Invocation = (std::result::Result<Value, Failure>, Duration);

fn is_timeout(outcome: &std::result::Result<Value, Failure>) -> bool {
    matches!(outcome, Err(f) if f.kind == FailureKind::Timeout)
}

fn invoke_inline(body: &Body) -> Invocation {
    let start = Instant::now();
    let raw = panic::catch_unwind(AssertUnwindSafe(|| body()));
    let elapsed = start.elapsed();
    (classify(raw), elapsed)
}

fn invoke_with_timeout(body: &Body, limit: Duration, stack_size: usize) -> Invocation {
    let (tx, rx) = mpsc::channel();
    let body = Body::clone(body);
    let waited = Instant::now();

    let spawned = thread::Builder::new()
        .name("variant-invocation".to_string())
        .stack_size(stack_size)
        .spawn(move || {
            // Receiver may be gone after a timeout.
            let _ = tx.send(invoke_inline(&body));
        });
    if let Err(err) = spawned {
        return (
            Err(Failure::new(
                FailureKind::RuntimeFault,
                format!("could not spawn invocation thread: {err}"),
            )),
            Duration::ZERO,
        );
    }

    match rx.recv_timeout(limit) {
        Ok(done) => done,
        Err(RecvTimeoutError::Timeout) => (
            Err(Failure::new(
                FailureKind::Timeout,
                format!("no result after {} ms", limit.as_millis()),
            )),
            waited.elapsed(),
        ),
        Err(RecvTimeoutError::Disconnected) => (
            Err(Failure::new(
                FailureKind::Panic,
                "invocation thread exited without a result",
            )),
            waited.elapsed(),
        ),
    }
}

fn classify(raw: std::thread::Result<anyhow::Result<Value>>) -> std::result::Result<Value, Failure> {
    match raw {
        Ok(Ok(value)) => Ok(black_box(value)),
        Ok(Err(err)) => Err(Failure::new(FailureKind::RuntimeFault, format!("{err:#}"))),
        Err(payload) => Err(Failure::new(FailureKind::Panic, panic_message(payload.as_ref()))),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
