//! Integer folds over ranges: closure calls, captured constants, recursion.

use crate::value::Value;
use crate::workload::{Variant, Workload};
use crate::Style;

pub fn workloads() -> Vec<Workload> {
    vec![
        closure_arg_bind(),
        closure_call(),
        closure_capture(),
        fib_map_reduce(),
        map_filter_reduce(),
        mixed_pipeline(),
        recursive_tailish(),
        symbol_lookup(),
    ]
}

fn combine(a: i64, b: i64, c: i64, d: i64, e: i64) -> i64 {
    a + b + c + d + e
}

pub fn closure_arg_bind() -> Workload {
    const N: i64 = 80_000;
    Workload::new("closure-arg-bind")
        .describe("five-argument helper called from a fold")
        .param("n", N)
        .variant(Variant::styled(Style::Functional, N, |n| {
            Ok(Value::Int((0..n).fold(0, |acc, i| acc + combine(i, 1, 2, 3, 4))))
        }))
        .variant(Variant::styled(Style::Imperative, N, |n| {
            let mut total = 0;
            for i in 0..n {
                total += combine(i, 1, 2, 3, 4);
            }
            Ok(Value::Int(total))
        }))
        .expect(3_200_760_000_i64)
}

fn inc(x: i64) -> i64 {
    x + 1
}

pub fn closure_call() -> Workload {
    const N: i64 = 120_000;
    Workload::new("closure-call")
        .describe("single-argument helper called from a fold")
        .param("n", N)
        .variant(Variant::styled(Style::Functional, N, |n| {
            Ok(Value::Int((0..n).fold(0, |acc, i| acc + inc(i))))
        }))
        .variant(Variant::styled(Style::Imperative, N, |n| {
            let mut total = 0;
            for i in 0..n {
                total += inc(i);
            }
            Ok(Value::Int(total))
        }))
        .expect(7_200_060_000_i64)
}

pub fn closure_capture() -> Workload {
    const N: i64 = 2000;
    Workload::new("closure-capture")
        .describe("build n capturing adders, apply each to 1, sum")
        .param("n", N)
        .variant(Variant::styled(Style::Functional, N, |n| {
            let adders: Vec<Box<dyn Fn(i64) -> i64>> = (0..n)
                .map(|i| Box::new(move |x: i64| x + i) as Box<dyn Fn(i64) -> i64>)
                .collect();
            let applied: Vec<i64> = adders.iter().map(|f| f(1)).collect();
            Ok(Value::Int(applied.into_iter().fold(0, |acc, x| acc + x)))
        }))
        .variant(Variant::styled(Style::Imperative, N, |n| {
            let mut adders: Vec<Box<dyn Fn(i64) -> i64>> = Vec::with_capacity(n as usize);
            for i in 0..n {
                adders.push(Box::new(move |x: i64| x + i));
            }
            let mut total = 0;
            for f in &adders {
                total += f(1);
            }
            Ok(Value::Int(total))
        }))
        .expect(2_001_000_i64)
}

fn fib(n: i64) -> i64 {
    if n < 2 {
        return n;
    }
    fib(n - 1) + fib(n - 2)
}

/// No declared result; the functional variant acts as the oracle.
pub fn fib_map_reduce() -> Workload {
    const N: i64 = 30;
    Workload::new("fib-map-reduce")
        .describe("sum of naive recursive fib(i) for i < n")
        .param("n", N)
        .variant(Variant::styled(Style::Functional, N, |n| {
            Ok(Value::Int((0..n).map(fib).sum()))
        }))
        .variant(Variant::styled(Style::Imperative, N, |n| {
            let mut total = 0;
            for i in 0..n {
                total += fib(i);
            }
            Ok(Value::Int(total))
        }))
}

const SQUARE_LIMIT: i64 = 1_000_000_000;

/// No declared result; the functional variant acts as the oracle.
pub fn map_filter_reduce() -> Workload {
    const N: i64 = 50_000;
    Workload::new("map-filter-reduce")
        .describe("sum of squares below 10^9 for x < n")
        .param("n", N)
        .param("limit", SQUARE_LIMIT)
        .variant(Variant::styled(Style::Functional, N, |n| {
            Ok(Value::Int((0..n).map(|x| x * x).filter(|&s| s < SQUARE_LIMIT).sum()))
        }))
        .variant(Variant::styled(Style::Comprehension, N, |n| {
            let squares: Vec<i64> = (0..n).map(|x| x * x).collect();
            let kept: Vec<i64> = squares.into_iter().filter(|&s| s < SQUARE_LIMIT).collect();
            Ok(Value::Int(kept.iter().sum()))
        }))
        .variant(Variant::styled(Style::Imperative, N, |n| {
            let mut total = 0;
            for x in 0..n {
                let square = x * x;
                if square < SQUARE_LIMIT {
                    total += square;
                }
            }
            Ok(Value::Int(total))
        }))
}

pub fn mixed_pipeline() -> Workload {
    const N: i64 = 30_000;
    Workload::new("mixed-pipeline")
        .describe("map 3x+1, keep multiples of 5, add 7, sum")
        .param("n", N)
        .variant(Variant::styled(Style::Functional, N, |n| {
            let total = (0..n)
                .map(|x| x * 3 + 1)
                .filter(|x| x % 5 == 0)
                .map(|x| x + 7)
                .fold(0, |acc, x| acc + x);
            Ok(Value::Int(total))
        }))
        .variant(Variant::styled(Style::Imperative, N, |n| {
            let mut total = 0;
            for x in 0..n {
                let y = x * 3 + 1;
                if y % 5 == 0 {
                    total += y + 7;
                }
            }
            Ok(Value::Int(total))
        }))
        .expect(270_057_000_i64)
}

fn sum_down(k: i64, acc: i64) -> i64 {
    if k == 0 {
        return acc;
    }
    sum_down(k - 1, acc + k)
}

pub fn recursive_tailish() -> Workload {
    const N: i64 = 2500;
    Workload::new("recursive-tailish")
        .describe("accumulator-passing recursion n levels deep")
        .param("n", N)
        .variant(Variant::styled(Style::Functional, N, |n| Ok(Value::Int(sum_down(n, 0)))))
        .variant(Variant::styled(Style::Imperative, N, |n| {
            let (mut k, mut acc) = (n, 0);
            while k > 0 {
                acc += k;
                k -= 1;
            }
            Ok(Value::Int(acc))
        }))
        .expect(3_126_250_i64)
}

pub fn symbol_lookup() -> Workload {
    const N: i64 = 200_000;
    const X: i64 = 7;
    const Y: i64 = 11;
    const Z: i64 = 13;
    Workload::new("symbol-lookup")
        .describe("fold adding three captured bindings per step")
        .param("n", N)
        .variant(Variant::styled(Style::Functional, N, |n| {
            let (x, y, z) = (X, Y, Z);
            Ok(Value::Int((0..n).fold(0, |acc, _| acc + x + y + z)))
        }))
        .variant(Variant::styled(Style::Imperative, N, |n| {
            let mut total = 0;
            for _ in 0..n {
                total += X + Y + Z;
            }
            Ok(Value::Int(total))
        }))
        .expect(6_200_000_i64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fib_matches_known_values() {
        assert_eq!((0..10).map(fib).collect::<Vec<_>>(), [0, 1, 1, 2, 3, 5, 8, 13, 21, 34]);
    }

    #[test]
    fn inferred_oracles_have_stable_values() {
        for (w, expected) in [(fib_map_reduce(), 1_346_268), (map_filter_reduce(), 10_540_648_931_995)] {
            assert!(w.expected().is_none());
            for v in w.variants() {
                assert_eq!(v.execute().unwrap(), Value::Int(expected), "{}/{}", w.name(), v.label());
            }
        }
    }

    #[test]
    fn pipeline_keeps_every_fifth_mapped_value() {
        let w = mixed_pipeline();
        assert_eq!(w.expected(), Some(&Value::Int(270_057_000)));
        let small = (0..10).map(|x| x * 3 + 1).filter(|x| x % 5 == 0).map(|x| x + 7);
        assert_eq!(small.collect::<Vec<_>>(), [17, 32]);
    }

    #[test]
    fn sum_down_base_case() {
        assert_eq!(sum_down(0, 5), 5);
        assert_eq!(sum_down(4, 0), 10);
    }
}
