mod blocks;
mod error;
mod goal;
mod planner;
mod search;
mod world;

pub use blocks::{Action, BlocksGraph, GoalDistance};
pub use error::{PlanError, Result};
pub use goal::{Clause, DnfFormula, Literal, Relation};
pub use planner::{
    extract_plan, Interpretation, PlanStep, Planner, PlannerResult, ALREADY_SATISFIED,
    DEFAULT_MAX_EXPANSIONS,
};
pub use search::{astar_search, Edge, Graph, Heuristic, SearchResult, ZeroHeuristic};
pub use world::{ObjectSpec, WorldState, FLOOR};
