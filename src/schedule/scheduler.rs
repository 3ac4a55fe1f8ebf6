use crate::foundation::error::CycleError;
use crate::manifest::model::PassDecl;
use smallvec::SmallVec;
use std::cmp::Reverse;
use std::collections::{BTreeMap, BinaryHeap};

/// Deterministic dependency-count scheduler over the passes of one manifest.
///
/// Pass `b` depends on pass `a` when one of `b`'s inputs names one of `a`'s outputs.
///
/// Determinism rule: when multiple passes are ready, the earliest declared pass is returned first.
pub struct PassScheduler {
    indeg: Vec<u32>,
    dependents: Vec<SmallVec<[usize; 4]>>,
    ready: BinaryHeap<Reverse<usize>>,
    remaining: usize,
}

impl PassScheduler {
    /// Build the dependency graph for `passes`.
    pub fn new(passes: &[PassDecl]) -> Self {
        let n = passes.len();
        let deps = dependencies(passes);

        let mut indeg = vec![0u32; n];
        let mut dependents = vec![SmallVec::<[usize; 4]>::new(); n];
        for (pi, pass_deps) in deps.iter().enumerate() {
            for &d in pass_deps {
                dependents[d].push(pi);
            }
            indeg[pi] = pass_deps.len() as u32;
        }

        let mut ready = BinaryHeap::new();
        for (i, &deg) in indeg.iter().enumerate() {
            if deg == 0 {
                ready.push(Reverse(i));
            }
        }

        Self {
            indeg,
            dependents,
            ready,
            remaining: n,
        }
    }

    /// Passes not yet marked done.
    pub fn remaining(&self) -> usize {
        self.remaining
    }

    /// Next ready pass index (declaration index), if any.
    pub fn pop_ready(&mut self) -> Option<usize> {
        let Reverse(i) = self.ready.pop()?;
        Some(i)
    }

    /// Mark a pass finished, releasing its dependents.
    pub fn mark_done(&mut self, done: usize) {
        self.remaining = self.remaining.saturating_sub(1);
        for &dep in &self.dependents[done] {
            let d = &mut self.indeg[dep];
            *d = d.saturating_sub(1);
            if *d == 0 {
                self.ready.push(Reverse(dep));
            }
        }
    }
}

/// Topologically order `passes`, returning declaration indices.
pub fn order_indices(passes: &[PassDecl]) -> Result<Vec<usize>, CycleError> {
    let mut sched = PassScheduler::new(passes);
    let mut out = Vec::with_capacity(passes.len());
    while let Some(next) = sched.pop_ready() {
        out.push(next);
        sched.mark_done(next);
    }
    if sched.remaining() == 0 {
        return Ok(out);
    }
    Err(CycleError {
        passes: cycle_members(passes, &out)
            .into_iter()
            .map(|i| passes[i].name.clone())
            .collect(),
    })
}

/// Topologically order `passes`.
///
/// Returns the passes themselves in execution order, or the passes on a dependency cycle.
pub fn order(passes: &[PassDecl]) -> Result<Vec<&PassDecl>, CycleError> {
    Ok(order_indices(passes)?
        .into_iter()
        .map(|i| &passes[i])
        .collect())
}

/// Per pass, the sorted, deduplicated indices of the passes it depends on.
fn dependencies(passes: &[PassDecl]) -> Vec<SmallVec<[usize; 4]>> {
    // First producer wins; duplicate producers are rejected by manifest validation.
    let mut producer = BTreeMap::<&str, usize>::new();
    for (i, p) in passes.iter().enumerate() {
        for out in &p.outputs {
            producer.entry(out.as_str()).or_insert(i);
        }
    }

    passes
        .iter()
        .map(|p| {
            let mut deps: SmallVec<[usize; 4]> = p
                .inputs
                .iter()
                .filter_map(|name| producer.get(name.as_str()).copied())
                .collect();
            deps.sort_unstable();
            deps.dedup();
            deps
        })
        .collect()
}

/// Narrow the unscheduled passes down to those on (or between) cycles by repeatedly dropping
/// passes with no unscheduled dependents.
fn cycle_members(passes: &[PassDecl], scheduled: &[usize]) -> Vec<usize> {
    let deps = dependencies(passes);
    let mut alive = vec![true; passes.len()];
    for &i in scheduled {
        alive[i] = false;
    }

    loop {
        let mut changed = false;
        for i in 0..passes.len() {
            if !alive[i] {
                continue;
            }
            let has_live_dependent = (0..passes.len()).any(|j| alive[j] && deps[j].contains(&i));
            if !has_live_dependent {
                alive[i] = false;
                changed = true;
            }
        }
        if !changed {
            break;
        }
    }

    (0..passes.len()).filter(|&i| alive[i]).collect()
}

#[cfg(test)]
#[path = "../../tests/unit/schedule/scheduler.rs"]
mod tests;
