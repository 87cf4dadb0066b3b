//! # Blocks-World Action Graph
//!
//! The state-expansion rule for the blocks world. [`BlocksGraph`] implements
//! the generic [`Graph`] interface over [`WorldState`] nodes, enumerating the
//! legal single-step successors of a state together with the [`Action`] that
//! produces each. [`GoalDistance`] supplies an admissible remaining-cost
//! estimate derived from the goal formula.
//!
//! The four primitive actions and their preconditions:
//!
//! | action | token | legal iff | effect |
//! |--------|-------|-----------|--------|
//! | move left  | `l` | `arm > 0` | `arm - 1` |
//! | move right | `r` | `arm < stacks - 1` | `arm + 1` |
//! | pick up    | `p` | not holding, stack under arm non-empty | top of stack into hand |
//! | put down   | `d` | holding | held object onto stack under arm |
//!
//! Placement on drop is unconditional: physical stacking legality (a large
//! object on a small one, say) is the interpreter collaborator's concern and
//! is assumed to be encoded in the goal formula it emits.
//!
//! All edges cost 1: the blocks world is uniform-cost.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::goal::{DnfFormula, Literal, Relation};
use crate::search::{Edge, Graph, Heuristic};
use crate::world::WorldState;

/// One of the four primitive robot-arm actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    Left,
    Right,
    Pick,
    Drop,
}

impl Action {
    /// The single-character wire token for this action.
    pub fn token(self) -> &'static str {
        match self {
            Self::Left => "l",
            Self::Right => "r",
            Self::Pick => "p",
            Self::Drop => "d",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

/// The blocks-world action graph.
///
/// Every successor is a fresh clone of the source state; sibling successors
/// never alias each other's stack storage.
pub struct BlocksGraph;

impl Graph for BlocksGraph {
    type Node = WorldState;
    type Label = Action;

    fn outgoing_edges(&self, node: &WorldState) -> Vec<Edge<WorldState, Action>> {
        // At most three actions are legal at once: pick and drop exclude
        // each other.
        let mut edges = Vec::with_capacity(3);

        if node.arm > 0 {
            let mut next = node.clone();
            next.arm -= 1;
            edges.push(Edge {
                to: next,
                label: Action::Left,
                cost: 1,
            });
        }
        if node.arm + 1 < node.stacks.len() {
            let mut next = node.clone();
            next.arm += 1;
            edges.push(Edge {
                to: next,
                label: Action::Right,
                cost: 1,
            });
        }
        if let Some(held) = &node.holding {
            let mut next = node.clone();
            next.stacks[next.arm].push(held.clone());
            next.holding = None;
            edges.push(Edge {
                to: next,
                label: Action::Drop,
                cost: 1,
            });
        } else if !node.stacks[node.arm].is_empty() {
            let mut next = node.clone();
            if let Some(top) = next.stacks[next.arm].pop() {
                next.holding = Some(top);
                edges.push(Edge {
                    to: next,
                    label: Action::Pick,
                    cost: 1,
                });
            }
        }
        edges
    }
}

/// An admissible remaining-cost estimate for a DNF goal.
///
/// The estimate is the minimum over clauses of the clause's bound, and a
/// clause's bound is the maximum over its literals' bounds (every literal
/// must hold, so the largest single lower bound is still a lower bound for
/// the conjunction). Per-literal bounds only count actions that are provably
/// unavoidable:
///
/// - `holding(x)` unmet: arm travel to x's stack, two actions per object
///   stacked above x (each must at least be picked and dropped), plus the
///   pick of x itself.
/// - `ontop(x,y)` unmet: x must still be dropped (and picked first unless
///   already held), plus two actions per object stacked above x.
/// - a negated literal currently satisfied the wrong way: at least one
///   action must change the state.
///
/// Literals over identifiers absent from the state get a zero bound; the
/// goal is unreachable there and zero keeps the estimate admissible.
pub struct GoalDistance {
    formula: DnfFormula,
}

impl GoalDistance {
    pub fn new(formula: &DnfFormula) -> Self {
        Self {
            formula: formula.clone(),
        }
    }

    fn literal_bound(literal: &Literal, state: &WorldState) -> u64 {
        match literal.relation {
            Relation::Holding => {
                let Some(x) = literal.args.first() else {
                    return 0;
                };
                let held = state.holding.as_deref() == Some(x.as_str());
                if literal.polarity {
                    if held {
                        return 0;
                    }
                    match state.locate(x) {
                        Some((col, above)) => {
                            col.abs_diff(state.arm) as u64 + 2 * above as u64 + 1
                        }
                        None => 0,
                    }
                } else {
                    u64::from(held)
                }
            }
            Relation::OnTop | Relation::Inside => {
                let (Some(x), Some(y)) = (literal.args.first(), literal.args.get(1)) else {
                    return 0;
                };
                let adjacent = state.is_directly_on(x, y);
                if literal.polarity {
                    if adjacent {
                        return 0;
                    }
                    if state.holding.as_deref() == Some(x.as_str()) {
                        return 1;
                    }
                    match state.locate(x) {
                        Some((_, above)) => 2 + 2 * above as u64,
                        None => 0,
                    }
                } else {
                    u64::from(adjacent)
                }
            }
            // Unsupported relations never reach the heuristic: formula
            // validation rejects them before the search starts.
            _ => 0,
        }
    }
}

impl Heuristic<WorldState> for GoalDistance {
    fn estimate(&self, state: &WorldState) -> u64 {
        self.formula
            .clauses()
            .iter()
            .map(|clause| {
                clause
                    .iter()
                    .map(|literal| Self::literal_bound(literal, state))
                    .max()
                    .unwrap_or(0)
            })
            .min()
            .unwrap_or(0)
    }
}
