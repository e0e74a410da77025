//! String building and case folding.

use anyhow::ensure;

use crate::value::Value;
use crate::workload::{Variant, Workload};
use crate::Style;

const WORD: &str = "AbCdEfGhIj";
const UPPER: &str = "ABCDEFGHIJ";

pub fn workloads() -> Vec<Workload> {
    vec![string_accumulate(), string_transform()]
}

pub fn string_accumulate() -> Workload {
    const N: i64 = 6000;
    Workload::new("string-accumulate")
        .describe("append one character n times, report the length")
        .param("n", N)
        .variant(Variant::styled(Style::Functional, N, |n| {
            let text = (0..n).fold(String::new(), |acc, _| acc + "a");
            Ok(Value::from(text.len()))
        }))
        .variant(Variant::styled(Style::Imperative, N, |n| {
            let mut text = String::new();
            for _ in 0..n {
                text.push('a');
            }
            Ok(Value::from(text.len()))
        }))
        .expect(6000_i64)
}

pub fn string_transform() -> Workload {
    const N: i64 = 4000;
    Workload::new("string-transform")
        .describe("lower then upper n mixed-case words, count the matches")
        .param("n", N)
        .variant(Variant::styled(Style::Comprehension, N, |n| {
            let words = vec![WORD.to_string(); n as usize];
            let lowered: Vec<String> = words.iter().map(|w| w.to_lowercase()).collect();
            let uppered: Vec<String> = lowered.iter().map(|w| w.to_uppercase()).collect();
            ensure!(uppered.first().map(String::as_str) == Some(UPPER), "case round trip broke");
            Ok(Value::from(uppered.iter().filter(|w| *w == UPPER).count()))
        }))
        .variant(Variant::styled(Style::Functional, N, |n| {
            let count = std::iter::repeat(WORD)
                .take(n as usize)
                .map(str::to_lowercase)
                .map(|w| w.to_uppercase())
                .filter(|w| w == UPPER)
                .count();
            Ok(Value::from(count))
        }))
        .variant(Variant::styled(Style::Imperative, N, |n| {
            let mut count = 0_usize;
            for _ in 0..n {
                let lowered = WORD.to_lowercase();
                let uppered = lowered.to_uppercase();
                if uppered == UPPER {
                    count += 1;
                }
            }
            Ok(Value::from(count))
        }))
        .expect(4000_i64)
}
