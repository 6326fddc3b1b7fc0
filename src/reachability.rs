//! Time-bounded single source shortest path search.

use std::{
    cmp::Ordering,
    collections::{hash_map::Entry, BTreeMap, BinaryHeap, HashMap},
};

use log::debug;
use petgraph::{graph::NodeIndex, visit::EdgeRef};

use crate::error::{Error, Result};
use crate::graph::{NodeId, RoadGraph};

#[derive(Copy, Clone, PartialEq)]
struct State {
    cost: f64,
    node: NodeIndex,
}

impl Eq for State {}

// Min-heap by cost, ties broken on node index so pops are deterministic
impl Ord for State {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .cost
            .total_cmp(&self.cost)
            .then_with(|| other.node.cmp(&self.node))
    }
}

impl PartialOrd for State {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Nodes reachable from a source within a time budget, each with its
/// minimal travel time in minutes.
#[derive(Debug, Clone, PartialEq)]
pub struct ReachableSet {
    source: NodeId,
    time_budget: f64,
    times: BTreeMap<NodeId, f64>,
}

impl ReachableSet {
    pub fn source(&self) -> NodeId {
        self.source
    }

    pub fn time_budget(&self) -> f64 {
        self.time_budget
    }

    pub fn len(&self) -> usize {
        self.times.len()
    }

    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.times.contains_key(&id)
    }

    pub fn time_to(&self, id: NodeId) -> Option<f64> {
        self.times.get(&id).copied()
    }

    /// Iterates `(node, minutes)` in ascending node id order.
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, f64)> + '_ {
        self.times.iter().map(|(&id, &time)| (id, time))
    }

    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.times.keys().copied()
    }

    /// Restricts the set to a smaller budget without searching again.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidQuery`] if `time_budget` is negative or larger than
    /// the budget this set was computed for.
    pub fn within(&self, time_budget: f64) -> Result<ReachableSet> {
        validate_budget(time_budget)?;
        if time_budget > self.time_budget {
            return Err(Error::InvalidQuery(format!(
                "budget {} exceeds the searched budget {}",
                time_budget, self.time_budget
            )));
        }

        Ok(ReachableSet {
            source: self.source,
            time_budget,
            times: self
                .times
                .iter()
                .filter(|(_, &time)| time <= time_budget)
                .map(|(&id, &time)| (id, time))
                .collect(),
        })
    }
}

/// Dijkstra's algorithm over `traversal_time`, cut off at `time_budget`.
///
/// A node belongs to the result iff its shortest travel time from
/// `source` is `<= time_budget`. Neighbors past the budget are never
/// queued, so the search only touches the reachable part of the graph.
///
/// # Errors
///
/// - [`Error::UnknownSourceNode`] if `source` isn't in `graph`
/// - [`Error::Unweighted`] if the graph was never reweighted
/// - [`Error::InvalidQuery`] for a negative or NaN budget
pub fn reachable_within(
    graph: &RoadGraph,
    source: NodeId,
    time_budget: f64,
) -> Result<ReachableSet> {
    validate_budget(time_budget)?;
    let start = graph
        .node_index(source)
        .ok_or(Error::UnknownSourceNode(source))?;
    if !graph.is_weighted() {
        return Err(Error::Unweighted);
    }

    let mut distances: HashMap<NodeIndex, f64> = HashMap::new();
    let mut heap = BinaryHeap::new();

    // Start node has distance 0
    heap.push(State {
        cost: 0.0,
        node: start,
    });
    distances.insert(start, 0.0);

    while let Some(State { cost, node }) = heap.pop() {
        // Skip if we've found a better path
        if let Some(&best) = distances.get(&node) {
            if cost > best {
                continue;
            }
        }

        for edge in graph.edges(node) {
            let next = edge.target();
            let next_cost = cost + edge.weight().traversal_time;
            if next_cost > time_budget {
                continue;
            }

            match distances.entry(next) {
                Entry::Vacant(entry) => {
                    entry.insert(next_cost);
                    heap.push(State {
                        cost: next_cost,
                        node: next,
                    });
                }
                Entry::Occupied(mut entry) => {
                    if next_cost < *entry.get() {
                        *entry.get_mut() = next_cost;
                        heap.push(State {
                            cost: next_cost,
                            node: next,
                        });
                    }
                }
            }
        }
    }

    let times = distances
        .into_iter()
        .map(|(index, time)| (graph.node(index).id, time))
        .collect::<BTreeMap<_, _>>();

    debug!(
        "Reached {} of {} nodes from {} within {} min",
        times.len(),
        graph.node_count(),
        source,
        time_budget
    );

    Ok(ReachableSet {
        source,
        time_budget,
        times,
    })
}

pub(crate) fn validate_budget(time_budget: f64) -> Result<()> {
    if time_budget.is_nan() || time_budget < 0.0 {
        return Err(Error::InvalidQuery(format!(
            "time budget must be non-negative, got {time_budget}"
        )));
    }
    Ok(())
}
