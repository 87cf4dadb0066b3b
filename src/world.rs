//! # World State Module
//!
//! This module provides the [`WorldState`] structure, the unit of search for
//! the planner: a snapshot of the stacks of objects on the table, the position
//! of the robot arm, and the object (if any) currently grasped.
//!
//! States follow a copy-on-transition discipline: a state is never mutated
//! after construction. The action-graph generator produces each successor by
//! cloning the source state and editing the clone before publishing it, so
//! search bookkeeping (frontier, best-cost table, predecessor map) can retain
//! states freely. The object attribute table is shared read-only between all
//! states behind an [`Arc`] and is never deep-copied.
//!
//! ## Basic Usage
//!
//! ```
//! use blocksplan::{ObjectSpec, WorldState};
//! use std::collections::HashMap;
//! use std::sync::Arc;
//!
//! let mut objects = HashMap::new();
//! objects.insert("a".to_string(), ObjectSpec::new("brick", "large", "green"));
//! objects.insert("b".to_string(), ObjectSpec::new("table", "large", "red"));
//!
//! let state = WorldState::new(
//!     vec![vec!["a".to_string()], vec!["b".to_string()]],
//!     0,
//!     None,
//!     Arc::new(objects),
//! );
//!
//! assert!(state.validate().is_ok());
//! assert!(state.is_directly_on("a", blocksplan::FLOOR));
//! ```

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use crate::{PlanError, Result};

/// Placeholder identifier for the floor in `ontop` literals.
pub const FLOOR: &str = "floor";

/// Physical attributes of one object in the world.
///
/// The planner itself never inspects these; they are carried for the
/// interpreter collaborator, which evaluates stackability rules against them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectSpec {
    pub form: String,
    pub size: String,
    pub color: String,
}

impl ObjectSpec {
    pub fn new(form: &str, size: &str, color: &str) -> Self {
        Self {
            form: form.to_string(),
            size: size.to_string(),
            color: color.to_string(),
        }
    }
}

/// A snapshot of the blocks world: the search node type.
///
/// Equality and hashing cover `stacks`, `arm` and `holding` only — two
/// independently constructed states with the same structure compare equal,
/// which is what the search engine's best-cost table relies on. The shared
/// object table is excluded from the comparison.
#[derive(Debug, Clone)]
pub struct WorldState {
    /// Stacks of object identifiers; the top of a stack is its last element.
    pub stacks: Vec<Vec<String>>,
    /// Index of the stack currently under the arm.
    pub arm: usize,
    /// Identifier of the object currently grasped, if any.
    pub holding: Option<String>,
    /// Shared, read-only attribute table; cloned by reference, never copied.
    pub objects: Arc<HashMap<String, ObjectSpec>>,
}

impl WorldState {
    pub fn new(
        stacks: Vec<Vec<String>>,
        arm: usize,
        holding: Option<String>,
        objects: Arc<HashMap<String, ObjectSpec>>,
    ) -> Self {
        Self {
            stacks,
            arm,
            holding,
            objects,
        }
    }

    /// Checks the structural invariants of the state.
    ///
    /// # Errors
    ///
    /// Returns [`PlanError::MalformedState`] if the arm is out of range or if
    /// any object identifier appears more than once across the stacks and the
    /// held object.
    pub fn validate(&self) -> Result<()> {
        if self.arm >= self.stacks.len() {
            return Err(PlanError::MalformedState(format!(
                "arm at {} but only {} stacks",
                self.arm,
                self.stacks.len()
            )));
        }
        let mut seen = HashSet::new();
        for stack in &self.stacks {
            for id in stack {
                if !seen.insert(id.as_str()) {
                    return Err(PlanError::MalformedState(format!(
                        "object {id} appears more than once"
                    )));
                }
            }
        }
        if let Some(held) = &self.holding {
            if seen.contains(held.as_str()) {
                return Err(PlanError::MalformedState(format!(
                    "object {held} is both held and stacked"
                )));
            }
        }
        Ok(())
    }

    /// True iff `x` rests directly on `y` in some stack.
    ///
    /// `y` may be [`FLOOR`], in which case this checks that `x` is at the
    /// bottom of some stack. A held object rests on nothing.
    pub fn is_directly_on(&self, x: &str, y: &str) -> bool {
        for stack in &self.stacks {
            for (i, id) in stack.iter().enumerate() {
                if id == x {
                    return if i == 0 {
                        y == FLOOR
                    } else {
                        stack[i - 1] == y
                    };
                }
            }
        }
        false
    }

    /// Locates `x` among the stacks, returning its stack index and the number
    /// of objects stacked above it. `None` if `x` is held or absent.
    pub fn locate(&self, x: &str) -> Option<(usize, usize)> {
        for (col, stack) in self.stacks.iter().enumerate() {
            for (i, id) in stack.iter().enumerate() {
                if id == x {
                    return Some((col, stack.len() - 1 - i));
                }
            }
        }
        None
    }
}

impl PartialEq for WorldState {
    fn eq(&self, other: &Self) -> bool {
        self.stacks == other.stacks && self.arm == other.arm && self.holding == other.holding
    }
}

impl Eq for WorldState {}

impl Hash for WorldState {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.stacks.hash(state);
        self.arm.hash(state);
        self.holding.hash(state);
    }
}

impl fmt::Display for WorldState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, stack) in self.stacks.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "[{}]", stack.join(","))?;
        }
        write!(f, " arm={}", self.arm)?;
        match &self.holding {
            Some(held) => write!(f, " holding={held}"),
            None => write!(f, " holding=-"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> Arc<HashMap<String, ObjectSpec>> {
        let mut objects = HashMap::new();
        objects.insert("a".to_string(), ObjectSpec::new("brick", "small", "blue"));
        objects.insert("b".to_string(), ObjectSpec::new("brick", "large", "red"));
        Arc::new(objects)
    }

    fn state(stacks: Vec<Vec<&str>>, arm: usize, holding: Option<&str>) -> WorldState {
        WorldState::new(
            stacks
                .into_iter()
                .map(|s| s.into_iter().map(String::from).collect())
                .collect(),
            arm,
            holding.map(String::from),
            table(),
        )
    }

    #[test]
    fn test_validate_accepts_well_formed_state() {
        assert!(state(vec![vec!["a"], vec!["b"]], 0, None).validate().is_ok());
        assert!(state(vec![vec![], vec!["b"]], 1, Some("a")).validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_arm_out_of_range() {
        let result = state(vec![vec!["a"]], 1, None).validate();
        assert!(matches!(result, Err(PlanError::MalformedState(_))));
    }

    #[test]
    fn test_validate_rejects_duplicate_object() {
        let result = state(vec![vec!["a"], vec!["a"]], 0, None).validate();
        assert!(matches!(result, Err(PlanError::MalformedState(_))));
    }

    #[test]
    fn test_validate_rejects_held_and_stacked_object() {
        let result = state(vec![vec!["a"]], 0, Some("a")).validate();
        assert!(matches!(result, Err(PlanError::MalformedState(_))));
    }

    #[test]
    fn test_clone_shares_no_stack_storage() {
        let original = state(vec![vec!["a"], vec!["b"]], 0, None);
        let mut copy = original.clone();
        copy.stacks[0].pop();
        copy.arm = 1;
        copy.holding = Some("a".to_string());
        assert_eq!(original.stacks[0], vec!["a".to_string()]);
        assert_eq!(original.arm, 0);
        assert_eq!(original.holding, None);
        // The attribute table is shared, not duplicated.
        assert!(Arc::ptr_eq(&original.objects, &copy.objects));
    }

    #[test]
    fn test_equality_is_structural() {
        let left = state(vec![vec!["a"], vec!["b"]], 1, None);
        let right = state(vec![vec!["a"], vec!["b"]], 1, None);
        assert_eq!(left, right);
        let moved = state(vec![vec!["a"], vec!["b"]], 0, None);
        assert_ne!(left, moved);
    }

    #[test]
    fn test_is_directly_on() {
        let s = state(vec![vec!["b", "a"], vec![]], 0, None);
        assert!(s.is_directly_on("a", "b"));
        assert!(s.is_directly_on("b", FLOOR));
        assert!(!s.is_directly_on("b", "a"));
        assert!(!s.is_directly_on("a", FLOOR));
    }

    #[test]
    fn test_held_object_rests_on_nothing() {
        let s = state(vec![vec!["b"], vec![]], 0, Some("a"));
        assert!(!s.is_directly_on("a", "b"));
        assert!(!s.is_directly_on("a", FLOOR));
    }

    #[test]
    fn test_locate() {
        let s = state(vec![vec!["b", "a"], vec![]], 0, None);
        assert_eq!(s.locate("b"), Some((0, 1)));
        assert_eq!(s.locate("a"), Some((0, 0)));
        assert_eq!(s.locate("c"), None);
    }
}
