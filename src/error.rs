use thiserror::Error;

/// Error types for the blocks-world planner.
///
/// Failures are scoped to a single interpretation: the batch driver in
/// [`crate::Planner`] collects whichever interpretations plan successfully and
/// only surfaces an error when every interpretation fails, in which case the
/// first failure encountered is returned.
///
/// # Examples
///
/// ```
/// use blocksplan::PlanError;
///
/// let err = PlanError::UnsupportedRelation("beside".to_string());
/// assert_eq!(
///     format!("{}", err),
///     "Relation has no evaluation rule: beside"
/// );
/// ```
#[derive(Error, Debug)]
pub enum PlanError {
    /// A goal literal uses a relation that is part of the vocabulary but has
    /// no evaluation rule (`above`, `under`, `beside`, `left of`, `right of`).
    /// Rejected explicitly at formula validation, never passed through silently.
    #[error("Relation has no evaluation rule: {0}")]
    UnsupportedRelation(String),

    /// A relation tag outside the recognized vocabulary. This is a
    /// configuration error on the interpreter boundary.
    #[error("Unrecognized relation tag: {0}")]
    UnknownRelation(String),

    /// A literal with the wrong number of arguments for its relation.
    #[error("Malformed literal: {0}")]
    MalformedLiteral(String),

    /// A goal formula with no clauses, or a clause with no literals.
    #[error("Goal formula has no usable clauses")]
    EmptyFormula,

    /// The search hit its expansion bound (or emptied its frontier) before
    /// popping a goal state.
    #[error("Search exhausted after expanding {expanded} states")]
    SearchExhausted { expanded: usize },

    /// A world state violating a structural invariant: an object in two
    /// stacks, an object both held and stacked, or the arm out of range.
    #[error("Malformed world state: {0}")]
    MalformedState(String),

    /// The batch driver was handed an empty list of interpretations.
    #[error("No interpretations to plan for")]
    NoInterpretations,

    /// A wrapper around serde_json errors on the interpreter boundary.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type alias for planner operations.
pub type Result<T> = std::result::Result<T, PlanError>;
