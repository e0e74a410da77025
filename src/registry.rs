use crate::error::{HarnessError, Result};
use crate::workload::{StyleSet, Workload};
use std::collections::HashMap;

/// Workloads in registration order, addressable by name.
#[derive(Debug, Default)]
pub struct WorkloadRegistry {
    styles: StyleSet,
    workloads: Vec<Workload>,
    by_name: HashMap<String, usize>,
}

impl WorkloadRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_styles(styles: StyleSet) -> Self {
        Self {
            styles,
            ..Self::default()
        }
    }

    pub fn styles(&self) -> &StyleSet {
        &self.styles
    }

    pub fn register(&mut self, workload: Workload) -> Result<()> {
        if self.by_name.contains_key(workload.name()) {
            return Err(HarnessError::DuplicateWorkload {
                name: workload.name().to_string(),
            });
        }
        workload.validate(&self.styles)?;

        self.by_name
            .insert(workload.name().to_string(), self.workloads.len());
        self.workloads.push(workload);
        Ok(())
    }

    /// Registration-order iterator. Cloning it (or calling `list` again)
    /// restarts the sequence.
    pub fn list(&self) -> std::slice::Iter<'_, Workload> {
        self.workloads.iter()
    }

    pub fn get(&self, name: &str) -> Result<&Workload> {
        self.by_name
            .get(name)
            .map(|&idx| &self.workloads[idx])
            .ok_or_else(|| HarnessError::NotFound {
                name: name.to_string(),
            })
    }

    /// The named subset, still in registration order. Every name must exist.
    pub fn select<S: AsRef<str>>(&self, names: &[S]) -> Result<Vec<&Workload>> {
        let mut wanted = vec![false; self.workloads.len()];
        for name in names {
            let idx = self
                .by_name
                .get(name.as_ref())
                .ok_or_else(|| HarnessError::NotFound {
                    name: name.as_ref().to_string(),
                })?;
            wanted[*idx] = true;
        }
        Ok(self
            .workloads
            .iter()
            .zip(wanted)
            .filter_map(|(w, keep)| keep.then_some(w))
            .collect())
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.workloads.iter().map(Workload::name)
    }

    pub fn len(&self) -> usize {
        self.workloads.len()
    }

    pub fn is_empty(&self) -> bool {
        self.workloads.is_empty()
    }
}
