//! Built-in paired workloads.
//!
//! Every workload has a `functional` variant (iterator adaptors, folds,
//! closures) and an `imperative` variant (loops over mutable state); a few
//! also carry a `comprehension` variant that materialises intermediate
//! collections. All bodies are pure and deterministic.

pub mod arithmetic;
pub mod collections;
pub mod text;

use crate::workload::Workload;

/// The full catalog in a stable order.
pub fn all() -> Vec<Workload> {
    let mut out = Vec::new();
    out.extend(collections::workloads());
    out.extend(arithmetic::workloads());
    out.extend(text::workloads());
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workload::StyleSet;
    use std::collections::HashSet;

    #[test]
    fn names_are_unique_and_workloads_valid() {
        let catalog = all();
        assert_eq!(catalog.len(), 13);
        let mut seen = HashSet::new();
        for w in &catalog {
            assert!(seen.insert(w.name().to_string()), "{} listed twice", w.name());
            w.validate(&StyleSet::default()).unwrap();
        }
    }

    #[test]
    fn every_variant_agrees_with_the_others() {
        for w in all() {
            let values: Vec<_> = w
                .variants()
                .iter()
                .map(|v| v.execute().unwrap_or_else(|e| panic!("{}/{}: {e}", w.name(), v.label())))
                .collect();
            if let Some(expected) = w.expected() {
                assert_eq!(&values[0], expected, "{}", w.name());
            }
            assert!(values.windows(2).all(|p| p[0] == p[1]), "{}: {values:?}", w.name());
        }
    }
}
