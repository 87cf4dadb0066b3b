//! # Search Module
//!
//! A generic best-first (A*) graph search. The engine is polymorphic over the
//! node type: anything implementing [`Graph`] with equality-comparable,
//! hashable nodes can be searched, so the same engine serves other planning
//! domains than the blocks world.
//!
//! The search is driven by three capabilities supplied by the caller:
//! - edge enumeration via [`Graph::outgoing_edges`],
//! - a fallible goal predicate (evaluation of a goal formula can itself
//!   error out, which aborts the search),
//! - a [`Heuristic`] estimate of remaining cost. With an admissible
//!   heuristic the returned path cost is optimal; [`ZeroHeuristic`]
//!   degenerates the engine into Dijkstra/uniform-cost search.
//!
//! Termination is guaranteed by an expansion bound: once `max_expansions`
//! nodes have been expanded without popping a goal, the search fails with
//! [`PlanError::SearchExhausted`]. The bound exists because some goal
//! formulas are unreachable and the engine must not run unboundedly.
//!
//! Tie-breaking between equal-`f` frontier entries uses the insertion
//! sequence number, so runs are deterministic and reproducible.

use std::cmp::{Ordering, Reverse};
use std::collections::{BinaryHeap, HashMap};
use std::hash::Hash;

use crate::{PlanError, Result};

/// A directed transition out of a node: destination, label, cost.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edge<N, L> {
    pub to: N,
    pub label: L,
    pub cost: u64,
}

/// An abstract search graph.
///
/// Node equality must be a value comparison over the node's full content,
/// never identity: generators are free to allocate fresh nodes for every
/// edge, and the engine deduplicates them through its best-cost table.
pub trait Graph {
    type Node: Clone + Eq + Hash;
    type Label: Clone;

    /// Enumerates every legal single-step transition out of `node`.
    fn outgoing_edges(&self, node: &Self::Node) -> Vec<Edge<Self::Node, Self::Label>>;
}

/// An estimate of remaining cost from a node to any goal node.
///
/// Must never overestimate the true remaining cost (admissibility) for the
/// engine to guarantee optimal-cost paths.
pub trait Heuristic<N> {
    fn estimate(&self, node: &N) -> u64;
}

/// The always-admissible constant-zero estimate (Dijkstra degeneration).
pub struct ZeroHeuristic;

impl<N> Heuristic<N> for ZeroHeuristic {
    fn estimate(&self, _node: &N) -> u64 {
        0
    }
}

/// A successful search: the node path from root to goal (inclusive) and the
/// accumulated edge cost. Failure is an error, never an empty path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchResult<N> {
    pub path: Vec<N>,
    pub cost: u64,
}

/// A frontier entry. Ordered by `f = g + h`, then by insertion sequence so
/// that equal-`f` pops are deterministic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct FrontierEntry {
    f: u64,
    g: u64,
    seq: u64,
    node: usize,
}

impl Ord for FrontierEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        self.f.cmp(&other.f).then(self.seq.cmp(&other.seq))
    }
}

impl PartialOrd for FrontierEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Runs an A* search over `graph` from `start`.
///
/// Returns the lowest-cost path to a node satisfying `is_goal`, or an error.
/// At most `max_expansions` nodes are expanded; the start node's goal check
/// does not count as an expansion, so a bound of zero still detects an
/// already-satisfied goal.
///
/// # Errors
///
/// - [`PlanError::SearchExhausted`] if the bound is reached or the frontier
///   empties before a goal node is popped.
/// - Any error produced by the goal predicate aborts the search unchanged.
///
/// # Examples
///
/// Searching a number line where each step increments or doubles:
///
/// ```
/// use blocksplan::{astar_search, Edge, Graph, ZeroHeuristic};
///
/// struct NumberLine;
///
/// impl Graph for NumberLine {
///     type Node = u64;
///     type Label = &'static str;
///
///     fn outgoing_edges(&self, n: &u64) -> Vec<Edge<u64, &'static str>> {
///         vec![
///             Edge { to: n + 1, label: "inc", cost: 1 },
///             Edge { to: n * 2, label: "dbl", cost: 1 },
///         ]
///     }
/// }
///
/// let result = astar_search(&NumberLine, 1, |n| Ok(*n == 10), &ZeroHeuristic, 1000).unwrap();
/// assert_eq!(result.cost, 4); // 1 -> 2 -> 4 -> 5 -> 10
/// assert_eq!(result.path.first(), Some(&1));
/// assert_eq!(result.path.last(), Some(&10));
/// ```
pub fn astar_search<G, F, H>(
    graph: &G,
    start: G::Node,
    mut is_goal: F,
    heuristic: &H,
    max_expansions: usize,
) -> Result<SearchResult<G::Node>>
where
    G: Graph,
    F: FnMut(&G::Node) -> Result<bool>,
    H: Heuristic<G::Node>,
{
    // Arena of every distinct node seen, with value-keyed lookup so that
    // structurally equal nodes share one slot regardless of allocation.
    let mut nodes: Vec<G::Node> = vec![start.clone()];
    let mut ids: HashMap<G::Node, usize> = HashMap::new();
    ids.insert(start.clone(), 0);
    let mut best_g: Vec<u64> = vec![0];
    let mut parent: Vec<Option<usize>> = vec![None];

    let mut frontier = BinaryHeap::new();
    let mut seq: u64 = 0;
    frontier.push(Reverse(FrontierEntry {
        f: heuristic.estimate(&start),
        g: 0,
        seq,
        node: 0,
    }));

    let mut expanded = 0usize;
    while let Some(Reverse(entry)) = frontier.pop() {
        // A better path to this node was recorded after this entry was
        // pushed; the entry is stale.
        if entry.g > best_g[entry.node] {
            continue;
        }
        let current = nodes[entry.node].clone();
        if is_goal(&current)? {
            let mut path = Vec::new();
            let mut cursor = Some(entry.node);
            while let Some(id) = cursor {
                path.push(nodes[id].clone());
                cursor = parent[id];
            }
            path.reverse();
            log::debug!(
                "goal found: cost {} after {} expansions, {} distinct states",
                entry.g,
                expanded,
                nodes.len()
            );
            return Ok(SearchResult {
                path,
                cost: entry.g,
            });
        }
        if expanded >= max_expansions {
            log::debug!("expansion bound {} reached", max_expansions);
            return Err(PlanError::SearchExhausted { expanded });
        }
        expanded += 1;

        for edge in graph.outgoing_edges(&current) {
            let tentative = entry.g + edge.cost;
            let succ = match ids.get(&edge.to) {
                Some(&id) => id,
                None => {
                    let id = nodes.len();
                    nodes.push(edge.to.clone());
                    ids.insert(edge.to, id);
                    best_g.push(u64::MAX);
                    parent.push(None);
                    id
                }
            };
            // Strict improvement required; equal-cost rediscoveries are not
            // re-pushed, which keeps the first-found predecessor and with it
            // deterministic path reconstruction.
            if tentative < best_g[succ] {
                best_g[succ] = tentative;
                parent[succ] = Some(entry.node);
                seq += 1;
                frontier.push(Reverse(FrontierEntry {
                    f: tentative + heuristic.estimate(&nodes[succ]),
                    g: tentative,
                    seq,
                    node: succ,
                }));
            }
        }
    }

    log::debug!("frontier emptied after {} expansions", expanded);
    Err(PlanError::SearchExhausted { expanded })
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A tiny fixed directed graph over `char` nodes for exercising the
    /// engine independently of the blocks world.
    struct TinyGraph {
        edges: Vec<(char, char, u64)>,
    }

    impl Graph for TinyGraph {
        type Node = char;
        type Label = ();

        fn outgoing_edges(&self, node: &char) -> Vec<Edge<char, ()>> {
            self.edges
                .iter()
                .filter(|(from, _, _)| from == node)
                .map(|&(_, to, cost)| Edge {
                    to,
                    label: (),
                    cost,
                })
                .collect()
        }
    }

    fn diamond() -> TinyGraph {
        // a -> b -> d is cheaper than a -> c -> d.
        TinyGraph {
            edges: vec![('a', 'b', 1), ('a', 'c', 1), ('b', 'd', 1), ('c', 'd', 5)],
        }
    }

    #[test]
    fn test_finds_cheapest_path() {
        let result =
            astar_search(&diamond(), 'a', |n| Ok(*n == 'd'), &ZeroHeuristic, 100).unwrap();
        assert_eq!(result.path, vec!['a', 'b', 'd']);
        assert_eq!(result.cost, 2);
    }

    #[test]
    fn test_start_satisfying_goal_is_zero_cost() {
        let result =
            astar_search(&diamond(), 'a', |n| Ok(*n == 'a'), &ZeroHeuristic, 100).unwrap();
        assert_eq!(result.path, vec!['a']);
        assert_eq!(result.cost, 0);
    }

    #[test]
    fn test_goal_detected_even_with_zero_bound() {
        let result = astar_search(&diamond(), 'a', |n| Ok(*n == 'a'), &ZeroHeuristic, 0).unwrap();
        assert_eq!(result.cost, 0);
    }

    #[test]
    fn test_unreachable_goal_exhausts_frontier() {
        let result = astar_search(&diamond(), 'a', |n| Ok(*n == 'z'), &ZeroHeuristic, 100);
        assert!(matches!(result, Err(PlanError::SearchExhausted { .. })));
    }

    #[test]
    fn test_expansion_bound_respected() {
        struct Infinite;
        impl Graph for Infinite {
            type Node = u64;
            type Label = ();
            fn outgoing_edges(&self, n: &u64) -> Vec<Edge<u64, ()>> {
                vec![Edge {
                    to: n + 1,
                    label: (),
                    cost: 1,
                }]
            }
        }
        let result = astar_search(&Infinite, 0, |_| Ok(false), &ZeroHeuristic, 7);
        assert!(matches!(
            result,
            Err(PlanError::SearchExhausted { expanded: 7 })
        ));
    }

    #[test]
    fn test_goal_predicate_error_aborts_search() {
        let result = astar_search(
            &diamond(),
            'a',
            |_| Err(PlanError::UnsupportedRelation("beside".to_string())),
            &ZeroHeuristic,
            100,
        );
        assert!(matches!(result, Err(PlanError::UnsupportedRelation(_))));
    }

    #[test]
    fn test_admissible_heuristic_preserves_optimal_cost() {
        struct ToD;
        impl Heuristic<char> for ToD {
            fn estimate(&self, node: &char) -> u64 {
                // Admissible remaining-cost estimate toward 'd'.
                match node {
                    'd' => 0,
                    _ => 1,
                }
            }
        }
        let result = astar_search(&diamond(), 'a', |n| Ok(*n == 'd'), &ToD, 100).unwrap();
        assert_eq!(result.cost, 2);
    }

    #[test]
    fn test_equal_cost_runs_are_reproducible() {
        // Two equal-cost routes; tie-breaking must pick the same one every run.
        let graph = TinyGraph {
            edges: vec![('a', 'b', 1), ('a', 'c', 1), ('b', 'd', 1), ('c', 'd', 1)],
        };
        let first =
            astar_search(&graph, 'a', |n| Ok(*n == 'd'), &ZeroHeuristic, 100).unwrap();
        for _ in 0..10 {
            let again =
                astar_search(&graph, 'a', |n| Ok(*n == 'd'), &ZeroHeuristic, 100).unwrap();
            assert_eq!(again.path, first.path);
        }
    }
}
