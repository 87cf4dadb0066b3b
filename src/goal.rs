//! # Goal Formula Module
//!
//! Goal descriptions arrive from the interpreter collaborator as formulas in
//! disjunctive normal form: a list of clauses, each clause a conjunction of
//! [`Literal`]s. A world state satisfies the formula iff it satisfies every
//! literal of at least one clause.
//!
//! Two relations have evaluation rules: `holding` and `ontop` (with `inside`
//! as a synonym for boxes). The rest of the interpreter's vocabulary
//! (`above`, `under`, `beside`, `left of`, `right of`) is declared but has no
//! evaluation rule; [`DnfFormula::validate`] rejects formulas containing them
//! up front rather than letting a clause fail silently mid-search. Tags
//! outside the vocabulary entirely are a configuration error at parse time.
//!
//! ## Basic Usage
//!
//! ```
//! use blocksplan::{DnfFormula, Literal, ObjectSpec, Relation, WorldState};
//! use std::collections::HashMap;
//! use std::sync::Arc;
//!
//! let objects: Arc<HashMap<String, ObjectSpec>> = Arc::new(HashMap::new());
//! let state = WorldState::new(
//!     vec![vec!["b".to_string(), "a".to_string()]],
//!     0,
//!     None,
//!     objects,
//! );
//!
//! // "a on top of b, and not holding a"
//! let goal = DnfFormula::new(vec![vec![
//!     Literal::positive(Relation::OnTop, &["a", "b"]),
//!     Literal::negative(Relation::Holding, &["a"]),
//! ]]);
//!
//! assert!(goal.satisfied_by(&state).unwrap());
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::world::WorldState;
use crate::{PlanError, Result};

/// A spatial or grasp relation from the interpreter's vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Relation {
    Holding,
    OnTop,
    Inside,
    Above,
    Under,
    Beside,
    #[serde(rename = "left of")]
    LeftOf,
    #[serde(rename = "right of")]
    RightOf,
}

impl Relation {
    /// Parses an interpreter relation tag.
    ///
    /// # Errors
    ///
    /// Returns [`PlanError::UnknownRelation`] for a tag outside the
    /// recognized vocabulary.
    pub fn parse(tag: &str) -> Result<Self> {
        match tag {
            "holding" => Ok(Self::Holding),
            "ontop" => Ok(Self::OnTop),
            "inside" => Ok(Self::Inside),
            "above" => Ok(Self::Above),
            "under" => Ok(Self::Under),
            "beside" => Ok(Self::Beside),
            "left of" => Ok(Self::LeftOf),
            "right of" => Ok(Self::RightOf),
            other => Err(PlanError::UnknownRelation(other.to_string())),
        }
    }

    /// The interpreter's string tag for this relation.
    pub fn tag(self) -> &'static str {
        match self {
            Self::Holding => "holding",
            Self::OnTop => "ontop",
            Self::Inside => "inside",
            Self::Above => "above",
            Self::Under => "under",
            Self::Beside => "beside",
            Self::LeftOf => "left of",
            Self::RightOf => "right of",
        }
    }

    /// Whether this relation has an evaluation rule.
    pub fn is_supported(self) -> bool {
        matches!(self, Self::Holding | Self::OnTop | Self::Inside)
    }

    /// Number of object arguments the relation takes.
    fn arity(self) -> usize {
        match self {
            Self::Holding => 1,
            _ => 2,
        }
    }
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// A single goal atom: a relation over object identifiers with a polarity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Literal {
    pub relation: Relation,
    pub args: Vec<String>,
    pub polarity: bool,
}

impl Literal {
    /// Builds a literal from an interpreter relation tag.
    ///
    /// # Errors
    ///
    /// Returns [`PlanError::UnknownRelation`] for an unrecognized tag.
    pub fn new(tag: &str, args: &[&str], polarity: bool) -> Result<Self> {
        Ok(Self {
            relation: Relation::parse(tag)?,
            args: args.iter().map(|a| a.to_string()).collect(),
            polarity,
        })
    }

    /// An asserted literal.
    pub fn positive(relation: Relation, args: &[&str]) -> Self {
        Self {
            relation,
            args: args.iter().map(|a| a.to_string()).collect(),
            polarity: true,
        }
    }

    /// A negated literal.
    pub fn negative(relation: Relation, args: &[&str]) -> Self {
        Self {
            relation,
            args: args.iter().map(|a| a.to_string()).collect(),
            polarity: false,
        }
    }

    fn validate(&self) -> Result<()> {
        if !self.relation.is_supported() {
            return Err(PlanError::UnsupportedRelation(
                self.relation.tag().to_string(),
            ));
        }
        if self.args.len() != self.relation.arity() {
            return Err(PlanError::MalformedLiteral(format!(
                "{} takes {} argument(s), got {}",
                self.relation,
                self.relation.arity(),
                self.args.len()
            )));
        }
        Ok(())
    }

    /// Evaluates the literal against a state. The polarity flag is honored
    /// for every supported relation: the literal holds iff the underlying
    /// relation check agrees with the polarity.
    pub fn satisfied_by(&self, state: &WorldState) -> Result<bool> {
        let truth = match self.relation {
            Relation::Holding => {
                let x = self.arg(0)?;
                state.holding.as_deref() == Some(x)
            }
            Relation::OnTop | Relation::Inside => {
                let x = self.arg(0)?;
                let y = self.arg(1)?;
                state.is_directly_on(x, y)
            }
            unsupported => {
                return Err(PlanError::UnsupportedRelation(
                    unsupported.tag().to_string(),
                ))
            }
        };
        Ok(truth == self.polarity)
    }

    fn arg(&self, index: usize) -> Result<&str> {
        self.args.get(index).map(String::as_str).ok_or_else(|| {
            PlanError::MalformedLiteral(format!(
                "{} is missing argument {}",
                self.relation, index
            ))
        })
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.polarity {
            write!(f, "not ")?;
        }
        write!(f, "{}({})", self.relation, self.args.join(","))
    }
}

/// A conjunction of literals.
pub type Clause = Vec<Literal>;

/// A goal formula in disjunctive normal form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DnfFormula {
    clauses: Vec<Clause>,
}

impl DnfFormula {
    pub fn new(clauses: Vec<Clause>) -> Self {
        Self { clauses }
    }

    /// Parses a formula from the interpreter's JSON wire format: a list of
    /// clauses, each a list of `{"relation", "args", "polarity"}` objects.
    ///
    /// # Errors
    ///
    /// Returns [`PlanError::Serialization`] on malformed JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn clauses(&self) -> &[Clause] {
        &self.clauses
    }

    /// Rejects formulas the evaluator cannot decide: empty formulas, empty
    /// clauses, unsupported relations and wrong-arity literals.
    ///
    /// Run before searching so that an undecidable goal fails the
    /// interpretation immediately instead of mid-expansion.
    pub fn validate(&self) -> Result<()> {
        if self.clauses.is_empty() {
            return Err(PlanError::EmptyFormula);
        }
        for clause in &self.clauses {
            if clause.is_empty() {
                return Err(PlanError::EmptyFormula);
            }
            for literal in clause {
                literal.validate()?;
            }
        }
        Ok(())
    }

    /// True iff some clause's literals are all satisfied by the state.
    ///
    /// A clause fails on its first unsatisfied literal; evaluation stops at
    /// the first satisfied clause.
    pub fn satisfied_by(&self, state: &WorldState) -> Result<bool> {
        'clauses: for clause in &self.clauses {
            for literal in clause {
                if !literal.satisfied_by(state)? {
                    continue 'clauses;
                }
            }
            return Ok(true);
        }
        Ok(false)
    }
}
