//! Topological ordering of the event dependency graph.
//!
//! Kahn's algorithm over the predecessor relation, restricted to edges whose
//! endpoints both exist. The order is deterministic: ready events are
//! released in registration order, and the cyclic remainder (events whose
//! in-degree never reaches zero) is reported in registration order too.

use std::collections::HashMap;

use crate::types::EventId;

/// Result of ordering the event graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopoOrder {
    /// Events whose predecessor constraints were fully resolved, in a valid
    /// processing order.
    pub order: Vec<EventId>,
    /// Events caught in a dependency cycle, in registration order. Empty for
    /// an acyclic graph.
    pub cyclic: Vec<EventId>,
}

impl TopoOrder {
    /// `true` when every event was ordered without conflict.
    #[must_use]
    pub fn is_acyclic(&self) -> bool {
        self.cyclic.is_empty()
    }
}

/// Orders `ids` so that every event appears after its predecessors.
///
/// `predecessors` must map each id in `ids` to its deduplicated list of
/// predecessor ids, already filtered to ids present in `ids`. Events left
/// with unresolved predecessors after the pass form `cyclic`.
pub(crate) fn topological_order(
    ids: &[EventId],
    predecessors: &HashMap<EventId, Vec<EventId>>,
) -> TopoOrder {
    let mut indegree: HashMap<&EventId, usize> = ids.iter().map(|id| (id, 0)).collect();
    let mut dependents: HashMap<&EventId, Vec<&EventId>> = HashMap::new();

    for id in ids {
        if let Some(preds) = predecessors.get(id) {
            for pred in preds {
                *indegree.entry(id).or_default() += 1;
                dependents.entry(pred).or_default().push(id);
            }
        }
    }

    let mut ready: Vec<&EventId> = ids
        .iter()
        .filter(|id| indegree.get(id).copied().unwrap_or(0) == 0)
        .collect();
    let mut order = Vec::with_capacity(ids.len());
    let mut next = 0;

    while next < ready.len() {
        let id = ready[next];
        next += 1;
        order.push(id.clone());

        if let Some(deps) = dependents.get(id) {
            for &dep in deps {
                let degree = indegree
                    .get_mut(dep)
                    .expect("dependent id is always present in the degree map");
                *degree -= 1;
                if *degree == 0 {
                    ready.push(dep);
                }
            }
        }
    }

    let cyclic = if order.len() == ids.len() {
        Vec::new()
    } else {
        ids.iter()
            .filter(|id| indegree.get(id).is_some_and(|d| *d > 0))
            .cloned()
            .collect()
    };

    TopoOrder { order, cyclic }
}
