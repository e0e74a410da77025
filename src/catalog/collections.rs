//! Workloads that build and merge vectors and maps.

use std::collections::HashMap;

use crate::value::Value;
use crate::workload::{Variant, Workload};
use crate::Style;

pub fn workloads() -> Vec<Workload> {
    vec![array_concat_reduce(), map_key_heavy(), map_union()]
}

pub fn array_concat_reduce() -> Workload {
    const N: i64 = 2000;
    Workload::new("array-concat-reduce")
        .describe("concatenate n two-element chunks by reduction, then sum")
        .param("n", N)
        .variant(Variant::styled(Style::Functional, N, |n| {
            let merged = (0..n)
                .map(|i| vec![i, i + 1])
                .fold(Vec::new(), |acc, chunk| [acc, chunk].concat());
            Ok(Value::Int(merged.into_iter().fold(0, |acc, x| acc + x)))
        }))
        .variant(Variant::styled(Style::Imperative, N, |n| {
            let mut merged = Vec::with_capacity(2 * n as usize);
            for i in 0..n {
                merged.push(i);
                merged.push(i + 1);
            }
            let mut total = 0;
            for x in merged {
                total += x;
            }
            Ok(Value::Int(total))
        }))
        .expect(4_000_000_i64)
}

pub fn map_key_heavy() -> Workload {
    const N: i64 = 2000;
    Workload::new("map-key-heavy")
        .describe("n two-key records, sum of both fields")
        .param("n", N)
        .variant(Variant::styled(Style::Functional, N, |n| {
            let rows: Vec<HashMap<&str, i64>> = (0..n)
                .map(|i| HashMap::from([("k", i), ("v", i * i)]))
                .collect();
            Ok(Value::Int(rows.iter().fold(0, |acc, m| acc + m["k"] + m["v"])))
        }))
        .variant(Variant::styled(Style::Imperative, N, |n| {
            let mut rows = Vec::with_capacity(n as usize);
            for i in 0..n {
                let mut row = HashMap::new();
                row.insert("k", i);
                row.insert("v", i * i);
                rows.push(row);
            }
            let mut total = 0;
            for row in &rows {
                total += row["k"] + row["v"];
            }
            Ok(Value::Int(total))
        }))
        .expect(2_666_666_000_i64)
}

/// Keys of a map-union row: one per-row key plus a key every row shares.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
enum RowKey {
    Index(i64),
    Shared,
}

pub fn map_union() -> Workload {
    const N: i64 = 2500;
    Workload::new("map-union")
        .describe("merge n maps with one distinct and one shared key, count keys")
        .param("n", N)
        .variant(Variant::styled(Style::Functional, N, |n| {
            let merged = (0..n)
                .map(|i| HashMap::from([(RowKey::Index(i), i), (RowKey::Shared, i)]))
                .fold(HashMap::<RowKey, i64>::new(), |acc, row| acc.into_iter().chain(row).collect());
            Ok(Value::from(merged.len()))
        }))
        .variant(Variant::styled(Style::Imperative, N, |n| {
            let mut merged = HashMap::new();
            for i in 0..n {
                merged.insert(RowKey::Index(i), i);
                merged.insert(RowKey::Shared, i);
            }
            Ok(Value::from(merged.len()))
        }))
        .expect(2501_i64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shared_key_keeps_last_value() {
        let merged: HashMap<_, _> = (0..3)
            .map(|i| HashMap::from([(RowKey::Index(i), i), (RowKey::Shared, i)]))
            .fold(HashMap::<RowKey, i64>::new(), |acc, row| acc.into_iter().chain(row).collect());
        assert_eq!(merged.len(), 4);
        assert_eq!(merged[&RowKey::Shared], 2);
    }
}
