//! # Planner Module
//!
//! The top-level driver. The interpreter collaborator hands the planner an
//! ordered list of candidate [`Interpretation`]s (each a DNF goal formula
//! plus pass-through metadata) and the world collaborator hands it the
//! current [`WorldState`]; the planner answers with one [`PlannerResult`] per
//! interpretation for which a plan exists.
//!
//! For each interpretation the planner:
//! 1. validates the goal formula (unsupported relations fail here, before
//!    any search effort is spent),
//! 2. runs the A* engine over the blocks-world action graph, guided by the
//!    [`GoalDistance`] heuristic and capped by an expansion bound,
//! 3. relabels the returned state path with the actions that produced it.
//!
//! Failures are local to one interpretation. Only when every interpretation
//! fails does the call as a whole fail, and then with the first failure
//! encountered.
//!
//! ## Basic Usage
//!
//! ```
//! use blocksplan::{DnfFormula, Interpretation, Literal, Planner, Relation, WorldState};
//! use std::collections::HashMap;
//! use std::sync::Arc;
//!
//! // Two stacks, one block each, arm over the first.
//! let state = WorldState::new(
//!     vec![vec!["a".to_string()], vec!["b".to_string()]],
//!     0,
//!     None,
//!     Arc::new(HashMap::new()),
//! );
//!
//! // "put a on top of b"
//! let goal = DnfFormula::new(vec![vec![Literal::positive(Relation::OnTop, &["a", "b"])]]);
//!
//! let planner = Planner::new(state);
//! let results = planner
//!     .plan_all(&[Interpretation::new(goal, "put a on b")])
//!     .unwrap();
//!
//! // Pick a, move right, drop it.
//! assert_eq!(results[0].stringify(), "p, r, d");
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::blocks::{Action, BlocksGraph, GoalDistance};
use crate::goal::DnfFormula;
use crate::search::{astar_search, Graph};
use crate::world::WorldState;
use crate::{PlanError, Result};

/// The sentinel step returned when the initial state already satisfies the
/// goal. Callers can distinguish "no plan needed" from "no plan found".
pub const ALREADY_SATISFIED: &str = "That is already true!";

/// Default node-expansion bound for a single interpretation's search.
pub const DEFAULT_MAX_EXPANSIONS: usize = 10_000;

/// Delimiter used by [`PlannerResult::stringify`].
const STEP_DELIMITER: &str = ", ";

/// One candidate reading of the user's command: a goal formula plus whatever
/// metadata the interpreter wants passed through unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Interpretation {
    pub formula: DnfFormula,
    pub description: String,
}

impl Interpretation {
    pub fn new(formula: DnfFormula, description: &str) -> Self {
        Self {
            formula,
            description: description.to_string(),
        }
    }
}

/// One step of a plan: a primitive action token or a human-readable status
/// line such as the [`ALREADY_SATISFIED`] sentinel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PlanStep {
    Move(Action),
    Message(String),
}

impl fmt::Display for PlanStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Move(action) => f.write_str(action.token()),
            Self::Message(text) => f.write_str(text),
        }
    }
}

/// An interpretation augmented with the plan that achieves it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlannerResult {
    pub interpretation: Interpretation,
    pub plan: Vec<PlanStep>,
}

impl PlannerResult {
    /// Joins the plan's steps into a single display string.
    pub fn stringify(&self) -> String {
        self.plan
            .iter()
            .map(PlanStep::to_string)
            .collect::<Vec<_>>()
            .join(STEP_DELIMITER)
    }
}

/// The blocks-world planner: plans action sequences for a batch of candidate
/// goal interpretations against one world state.
pub struct Planner {
    state: WorldState,
    max_expansions: usize,
}

impl Planner {
    /// Creates a planner for the given world state with the default
    /// expansion bound.
    pub fn new(state: WorldState) -> Self {
        Self::with_max_expansions(state, DEFAULT_MAX_EXPANSIONS)
    }

    /// Creates a planner with an explicit per-interpretation expansion
    /// bound. The bound is the only cancellation mechanism: an unreachable
    /// goal fails with [`PlanError::SearchExhausted`] once it is hit.
    pub fn with_max_expansions(state: WorldState, max_expansions: usize) -> Self {
        Self {
            state,
            max_expansions,
        }
    }

    /// Plans every interpretation that admits a plan.
    ///
    /// Per-interpretation failures are logged and recorded but do not affect
    /// the others.
    ///
    /// # Errors
    ///
    /// - [`PlanError::MalformedState`] if the shared world state violates a
    ///   structural invariant (fatal to the whole batch, since every
    ///   interpretation plans against the same state).
    /// - [`PlanError::NoInterpretations`] on an empty input list.
    /// - Otherwise, errors only when no interpretation succeeds; the first
    ///   failure encountered is returned.
    pub fn plan_all(&self, interpretations: &[Interpretation]) -> Result<Vec<PlannerResult>> {
        self.state.validate()?;
        if interpretations.is_empty() {
            return Err(PlanError::NoInterpretations);
        }

        let mut results = Vec::new();
        let mut first_error: Option<PlanError> = None;
        for interpretation in interpretations {
            match self.plan_interpretation(&interpretation.formula) {
                Ok(plan) => {
                    log::info!(
                        "planned \"{}\" in {} step(s)",
                        interpretation.description,
                        plan.len()
                    );
                    results.push(PlannerResult {
                        interpretation: interpretation.clone(),
                        plan,
                    });
                }
                Err(err) => {
                    log::warn!(
                        "planning failed for \"{}\": {}",
                        interpretation.description,
                        err
                    );
                    first_error.get_or_insert(err);
                }
            }
        }

        match first_error {
            Some(err) if results.is_empty() => Err(err),
            _ => Ok(results),
        }
    }

    fn plan_interpretation(&self, formula: &DnfFormula) -> Result<Vec<PlanStep>> {
        formula.validate()?;
        let graph = BlocksGraph;
        let heuristic = GoalDistance::new(formula);
        log::debug!(
            "searching: {} clause(s), bound {}",
            formula.clauses().len(),
            self.max_expansions
        );
        let result = astar_search(
            &graph,
            self.state.clone(),
            |node| formula.satisfied_by(node),
            &heuristic,
            self.max_expansions,
        )?;
        extract_plan(&graph, &result.path)
    }
}

/// Relabels a state path with the actions that produced it.
///
/// For each consecutive pair, the edges out of the earlier state are
/// re-enumerated and the first edge whose destination equals the later state
/// supplies the label; first match wins, so ties are broken deterministically.
/// A zero-transition path yields the single [`ALREADY_SATISFIED`] sentinel,
/// never an empty plan.
///
/// # Errors
///
/// Returns [`PlanError::MalformedState`] if some consecutive pair is not
/// connected by any edge, which would mean the path did not come from this
/// graph.
pub fn extract_plan(graph: &BlocksGraph, path: &[WorldState]) -> Result<Vec<PlanStep>> {
    if path.len() <= 1 {
        return Ok(vec![PlanStep::Message(ALREADY_SATISFIED.to_string())]);
    }
    let mut plan = Vec::with_capacity(path.len() - 1);
    for pair in path.windows(2) {
        let action = graph
            .outgoing_edges(&pair[0])
            .into_iter()
            .find(|edge| edge.to == pair[1])
            .map(|edge| edge.label)
            .ok_or_else(|| {
                PlanError::MalformedState(format!(
                    "no action leads from \"{}\" to \"{}\"",
                    pair[0], pair[1]
                ))
            })?;
        plan.push(PlanStep::Move(action));
    }
    Ok(plan)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::goal::{Literal, Relation};
    use crate::world::ObjectSpec;
    use std::collections::HashMap;
    use std::sync::Arc;

    fn state(stacks: Vec<Vec<&str>>, arm: usize, holding: Option<&str>) -> WorldState {
        let objects: Arc<HashMap<String, ObjectSpec>> = Arc::new(HashMap::new());
        WorldState::new(
            stacks
                .into_iter()
                .map(|s| s.into_iter().map(String::from).collect())
                .collect(),
            arm,
            holding.map(String::from),
            objects,
        )
    }

    fn single(relation: Relation, args: &[&str]) -> DnfFormula {
        DnfFormula::new(vec![vec![Literal::positive(relation, args)]])
    }

    #[test]
    fn test_single_pick_plan() {
        let planner = Planner::new(state(vec![vec!["a"], vec!["b"]], 0, None));
        let results = planner
            .plan_all(&[Interpretation::new(
                single(Relation::Holding, &["a"]),
                "take a",
            )])
            .unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].plan, vec![PlanStep::Move(Action::Pick)]);
        assert_eq!(results[0].stringify(), "p");
    }

    #[test]
    fn test_already_satisfied_sentinel() {
        let planner = Planner::new(state(vec![vec![], vec!["b", "a"]], 0, None));
        let results = planner
            .plan_all(&[Interpretation::new(
                single(Relation::OnTop, &["a", "b"]),
                "a on b",
            )])
            .unwrap();
        assert_eq!(
            results[0].plan,
            vec![PlanStep::Message(ALREADY_SATISFIED.to_string())]
        );
    }

    #[test]
    fn test_failed_interpretation_is_dropped_not_fatal() {
        let planner = Planner::new(state(vec![vec!["a"], vec!["b"]], 0, None));
        let results = planner
            .plan_all(&[
                Interpretation::new(single(Relation::Beside, &["a", "b"]), "unsupported"),
                Interpretation::new(single(Relation::Holding, &["a"]), "take a"),
            ])
            .unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].interpretation.description, "take a");
    }

    #[test]
    fn test_all_failed_surfaces_first_error() {
        let planner = Planner::new(state(vec![vec!["a"], vec!["b"]], 0, None));
        let result = planner.plan_all(&[
            Interpretation::new(single(Relation::Beside, &["a", "b"]), "first"),
            Interpretation::new(DnfFormula::new(vec![]), "second"),
        ]);
        assert!(matches!(result, Err(PlanError::UnsupportedRelation(tag)) if tag == "beside"));
    }

    #[test]
    fn test_empty_batch_is_an_error() {
        let planner = Planner::new(state(vec![vec!["a"]], 0, None));
        assert!(matches!(
            planner.plan_all(&[]),
            Err(PlanError::NoInterpretations)
        ));
    }

    #[test]
    fn test_malformed_state_is_fatal() {
        let planner = Planner::new(state(vec![vec!["a"], vec!["a"]], 0, None));
        let result = planner.plan_all(&[Interpretation::new(
            single(Relation::Holding, &["a"]),
            "take a",
        )]);
        assert!(matches!(result, Err(PlanError::MalformedState(_))));
    }

    #[test]
    fn test_exhausted_bound_fails_that_interpretation() {
        // Unreachable goal: b can never end up on top of itself.
        let planner =
            Planner::with_max_expansions(state(vec![vec!["a"], vec!["b"]], 0, None), 50);
        let result = planner.plan_all(&[Interpretation::new(
            single(Relation::OnTop, &["b", "b"]),
            "impossible",
        )]);
        assert!(matches!(result, Err(PlanError::SearchExhausted { .. })));
    }

    #[test]
    fn test_extract_plan_relabels_path() {
        let start = state(vec![vec!["a"], vec!["b"]], 0, None);
        let picked = state(vec![vec![], vec!["b"]], 0, Some("a"));
        let moved = state(vec![vec![], vec!["b"]], 1, Some("a"));
        let plan = extract_plan(&BlocksGraph, &[start, picked, moved]).unwrap();
        assert_eq!(
            plan,
            vec![PlanStep::Move(Action::Pick), PlanStep::Move(Action::Right)]
        );
    }

    #[test]
    fn test_extract_plan_rejects_disconnected_path() {
        let start = state(vec![vec!["a"], vec!["b"]], 0, None);
        let teleported = state(vec![vec!["a"], vec!["b"]], 1, Some("a"));
        let result = extract_plan(&BlocksGraph, &[start, teleported]);
        assert!(matches!(result, Err(PlanError::MalformedState(_))));
    }
}
