//! Errors raised while building or evaluating fuzzy rule bases.

use thiserror::Error;

#[derive(Clone, Debug, Error, PartialEq)]
pub enum FuzzyError {
    #[error("expression: at least 1 premise expected")]
    EmptyExpression,

    #[error("{shape}: {reason}")]
    ParamOrder { shape: &'static str, reason: &'static str },

    #[error("input: cannot find data for variable `{variable}` (term `{term}`)")]
    MissingInput { variable: String, term: String },

    #[error("variable id cannot be empty")]
    EmptyVariableId,

    #[error("term id cannot be empty (variable `{0}`)")]
    EmptyTermId(String),

    #[error("variable id `{0}` already present")]
    DuplicateVariableId(String),

    #[error("term id `{term}` already present (variable `{variable}`)")]
    DuplicateTermId { variable: String, term: String },

    #[error("term `{term}` not found in variable `{variable}`")]
    UnknownTerm { variable: String, term: String },

    #[error("{term}: {source}")]
    InvalidTerm {
        term: String,
        #[source]
        source: Box<FuzzyError>,
    },

    #[error("universe: {0}")]
    InvalidUniverse(&'static str),

    #[error("output `{0}` detected twice")]
    DuplicateOutput(String),

    #[error("cycle detected in dependency graph")]
    CyclicDependency,

    #[error("rule, sizes should be the same (found: {found}, expected: {expected})")]
    RuleSizeMismatch { found: usize, expected: usize },

    #[error("'{statement}' statement, duplicated header `{header}`")]
    DuplicateHeader { statement: &'static str, header: String },
}

pub type Result<T> = std::result::Result<T, FuzzyError>;

#[test]
fn test_messages() {
    assert_eq!(
        FuzzyError::EmptyExpression.to_string(),
        "expression: at least 1 premise expected"
    );
    assert_eq!(
        FuzzyError::DuplicateOutput("g".into()).to_string(),
        "output `g` detected twice"
    );
    assert_eq!(
        FuzzyError::MissingInput {
            variable: "d".into(),
            term: "d1".into(),
        }
        .to_string(),
        "input: cannot find data for variable `d` (term `d1`)"
    );

    let nested = FuzzyError::InvalidTerm {
        term: "hot".into(),
        source: Box::new(FuzzyError::ParamOrder {
            shape: "tri",
            reason: "params shall be sorted",
        }),
    };

    assert_eq!(nested.to_string(), "hot: tri: params shall be sorted");
}
