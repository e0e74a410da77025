use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use paired_workload_bench::driver::{run_suite, CancelToken, Harness};
use paired_workload_bench::equivalence::Verdict;
use paired_workload_bench::runner::{FailureKind, RunConfig};
use paired_workload_bench::{catalog, HarnessError, Value, Variant, Workload};

fn no_selection() -> &'static [&'static str] {
    &[]
}

fn reps(n: u32) -> RunConfig {
    RunConfig {
        repetitions: n,
        ..RunConfig::default()
    }
}

#[test]
fn builtin_catalog_passes() {
    let report = run_suite(reps(1), catalog::all(), no_selection(), &CancelToken::new()).unwrap();
    assert_eq!(report.workloads.len(), 13);
    for w in &report.workloads {
        assert_eq!(w.verdict(), Verdict::Pass, "{} -> {:?}", w.name, w.equivalence);
    }
    assert_eq!(report.exit_code(), 0);
}

#[test]
fn array_concat_reduce_scenario() {
    let report = run_suite(reps(3), catalog::all(), &["array-concat-reduce"], &CancelToken::new()).unwrap();
    let w = &report.workloads[0];
    assert_eq!(w.name, "array-concat-reduce");
    assert_eq!(w.verdict(), Verdict::Pass);
    assert_eq!(w.expected, Some(Value::Int(4_000_000)));
    assert_eq!(w.params["n"], 2000);

    let ratio = w.performance.ratio.as_ref().unwrap();
    assert_eq!(ratio.numerator, "imperative");
    assert_eq!(ratio.denominator, "functional");
    for v in &w.performance.variants {
        assert_eq!(v.timing.as_ref().unwrap().count, 3);
        assert_eq!(v.failure_count, 0);
    }
}

#[test]
fn map_union_scenario() {
    let report = run_suite(reps(1), catalog::all(), &["map-union"], &CancelToken::new()).unwrap();
    let w = &report.workloads[0];
    assert_eq!(w.verdict(), Verdict::Pass);
    assert_eq!(w.equivalence.groups.len(), 1);
    assert_eq!(w.equivalence.groups[0].value, Value::Int(2501));
}

#[test]
fn mismatch_lists_every_divergent_variant() {
    let w = Workload::new("off-by-one")
        .variant(Variant::new("functional", || Ok(Value::Int(10))))
        .variant(Variant::new("imperative", || Ok(Value::Int(11))))
        .variant(Variant::new("comprehension", || Ok(Value::Int(12))))
        .expect(10_i64);
    let report = run_suite(reps(2), [w], no_selection(), &CancelToken::new()).unwrap();
    let eq = &report.workloads[0].equivalence;
    assert_eq!(eq.verdict, Verdict::Mismatch);
    let diverging: Vec<_> = eq.mismatches.iter().map(|d| (d.variant.as_str(), d.value.clone())).collect();
    assert_eq!(
        diverging,
        [("imperative", Value::Int(11)), ("comprehension", Value::Int(12))]
    );
    assert_eq!(eq.groups.len(), 3);
    assert!(report.workloads[0].performance.ratio.is_none());
    assert_eq!(report.exit_code(), 1);
}

#[test]
fn every_variant_failing_is_inconclusive() {
    let w = Workload::new("broken")
        .variant(Variant::new("functional", || anyhow::bail!("no")))
        .variant(Variant::new("imperative", || panic!("also no")))
        .expect(1_i64);
    let report = run_suite(reps(4), [w], no_selection(), &CancelToken::new()).unwrap();
    let wr = &report.workloads[0];
    assert_eq!(wr.verdict(), Verdict::Inconclusive);
    for v in &wr.performance.variants {
        assert_eq!(v.failure_count, 4);
        assert!(v.timing.is_none());
    }
    assert_eq!(wr.performance.ratio.as_ref().unwrap().value, None);
    assert_eq!(
        wr.performance.variants[1].first_failure.as_ref().unwrap().kind,
        FailureKind::Panic
    );
    assert_eq!(report.exit_code(), 1);
}

#[test]
fn failing_variant_is_reported_apart_from_disagreement() {
    let w = Workload::new("half-broken")
        .variant(Variant::new("functional", || anyhow::bail!("fault")))
        .variant(Variant::new("imperative", || Ok(Value::Int(6000))))
        .expect(6000_i64);
    let report = run_suite(reps(3), [w], no_selection(), &CancelToken::new()).unwrap();
    let wr = &report.workloads[0];
    assert_eq!(wr.verdict(), Verdict::Pass);
    assert_eq!(wr.equivalence.never_succeeded, ["functional"]);
    assert!(wr.equivalence.mismatches.is_empty());
    assert_eq!(wr.performance.variants[0].failure_count, 3);
    assert_eq!(wr.performance.variants[1].failure_count, 0);
}

#[test]
fn intermittent_failure_still_yields_comparison_value() {
    let calls = Arc::new(AtomicU32::new(0));
    let counter = Arc::clone(&calls);
    let flaky = Variant::new("functional", move || {
        if counter.fetch_add(1, Ordering::SeqCst) % 2 == 0 {
            anyhow::bail!("odd call");
        }
        Ok(Value::from("ok"))
    });
    let w = Workload::new("flaky")
        .variant(flaky)
        .variant(Variant::new("imperative", || Ok(Value::from("ok"))));
    let report = run_suite(reps(4), [w], no_selection(), &CancelToken::new()).unwrap();
    let wr = &report.workloads[0];
    assert_eq!(wr.verdict(), Verdict::Pass);
    assert_eq!(wr.performance.variants[0].failure_count, 2);
    assert_eq!(wr.performance.variants[0].timing.as_ref().unwrap().count, 2);
}

#[test]
fn timeout_is_recorded_not_fatal() {
    let w = Workload::new("slow")
        .variant(Variant::new("functional", || {
            std::thread::sleep(Duration::from_millis(400));
            Ok(Value::Int(1))
        }))
        .variant(Variant::new("imperative", || Ok(Value::Int(1))))
        .expect(1_i64);
    let cfg = RunConfig {
        timeout: Some(Duration::from_millis(25)),
        ..RunConfig::default()
    };
    let report = run_suite(cfg, [w], no_selection(), &CancelToken::new()).unwrap();
    let wr = &report.workloads[0];
    assert_eq!(wr.verdict(), Verdict::Pass);
    assert_eq!(
        wr.performance.variants[0].first_failure.as_ref().unwrap().kind,
        FailureKind::Timeout
    );
    assert_eq!(report.run.timeout_ms, Some(25));
}

#[test]
fn two_runs_agree_on_verdicts_and_stat_ordering() {
    let selection = ["closure-call", "map-union", "string-transform"];
    let a = run_suite(reps(5), catalog::all(), &selection, &CancelToken::new()).unwrap();
    let b = run_suite(reps(5), catalog::all(), &selection, &CancelToken::new()).unwrap();

    assert_eq!(a.digest, b.digest);
    for (wa, wb) in a.workloads.iter().zip(&b.workloads) {
        assert_eq!(wa.name, wb.name);
        assert_eq!(wa.verdict(), wb.verdict());
        for (va, vb) in wa.performance.variants.iter().zip(&wb.performance.variants) {
            assert_eq!(va.label, vb.label);
            for t in [va.timing.as_ref().unwrap(), vb.timing.as_ref().unwrap()] {
                assert_eq!(t.count, 5);
                assert!(t.min_ns <= t.median_ns && t.median_ns <= t.max_ns);
                assert!(t.min_ns as f64 <= t.mean_ns && t.mean_ns <= t.max_ns as f64);
            }
        }
    }
}

#[test]
fn loading_is_idempotent_across_instances() {
    let mut first = Harness::new(RunConfig::default());
    let mut second = Harness::new(RunConfig::default());
    first.load(catalog::all()).unwrap();
    second.load(catalog::all()).unwrap();

    let shape = |h: &Harness| -> Vec<(String, Vec<String>)> {
        h.registry()
            .list()
            .map(|w| (w.name().to_string(), w.labels().map(str::to_string).collect()))
            .collect()
    };
    assert_eq!(shape(&first), shape(&second));
}

#[test]
fn duplicate_catalog_load_fails() {
    let mut doubled = catalog::all();
    doubled.extend(catalog::all());
    let err = run_suite(reps(1), doubled, no_selection(), &CancelToken::new()).unwrap_err();
    assert!(matches!(err, HarnessError::DuplicateWorkload { ref name } if name == "array-concat-reduce"));
}

#[test]
fn zero_repetitions_is_a_configuration_error() {
    let err = run_suite(reps(0), catalog::all(), no_selection(), &CancelToken::new()).unwrap_err();
    assert!(matches!(err, HarnessError::InvalidConfiguration { .. }));
}

#[test]
fn report_round_trips_through_json() {
    let report = run_suite(reps(1), catalog::all(), &["symbol-lookup"], &CancelToken::new()).unwrap();
    let json = report.to_json_pretty().unwrap();
    let back: paired_workload_bench::HarnessReport = serde_json::from_str(&json).unwrap();
    assert_eq!(back.digest, report.digest);
    assert_eq!(back.workloads[0].verdict(), Verdict::Pass);
    assert_eq!(back.workloads[0].expected, Some(Value::Int(6_200_000)));
}
