use std::collections::{HashMap, HashSet};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use crate::error::{FuzzyError, Result};
use crate::expression::{Expression, Premise};
use crate::inputs::Inputs;
use crate::membership::{MembershipFunction, Shape};
use crate::universe::Universe;

struct VariableData {
    id: String,
    universe: Universe,
    terms: Vec<(String, MembershipFunction)>,
}

/// A named fuzzy variable: a universe plus a set of named terms.
///
/// `Variable` is a shared handle. Clones refer to the same variable, and
/// equality and hashing follow that identity rather than the id string, so
/// two variables built separately with the same id are distinct.
#[derive(Clone)]
pub struct Variable(Arc<VariableData>);

impl Variable {
    pub fn new<S: Into<String>>(
        id: impl Into<String>,
        universe: Universe,
        terms: impl IntoIterator<Item = (S, MembershipFunction)>,
    ) -> Result<Self> {
        let id = id.into();

        if id.is_empty() {
            return Err(FuzzyError::EmptyVariableId);
        }

        let terms: Vec<(String, MembershipFunction)> = terms.into_iter().map(|(name, f)| (name.into(), f)).collect();
        let mut names = HashSet::with_capacity(terms.len());

        for (name, _) in &terms {
            if name.is_empty() {
                return Err(FuzzyError::EmptyTermId(id));
            }
            if !names.insert(name.as_str()) {
                return Err(FuzzyError::DuplicateTermId {
                    variable: id,
                    term: name.clone(),
                });
            }
        }

        Ok(Variable(Arc::new(VariableData { id, universe, terms })))
    }

    /// Builds every parametric shape before creating the variable. A shape
    /// failing validation is reported with the name of its term.
    pub fn from_shapes<S: Into<String>>(
        id: impl Into<String>,
        universe: Universe,
        shapes: impl IntoIterator<Item = (S, Shape)>,
    ) -> Result<Self> {
        let terms = shapes
            .into_iter()
            .map(|(name, shape)| {
                let name = name.into();

                match shape.build() {
                    Ok(f) => Ok((name, f)),
                    Err(err) => Err(FuzzyError::InvalidTerm {
                        term: name,
                        source: Box::new(err),
                    }),
                }
            })
            .collect::<Result<Vec<_>>>()?;

        Self::new(id, universe, terms)
    }

    pub fn id(&self) -> &str {
        &self.0.id
    }

    pub fn universe(&self) -> &Universe {
        &self.0.universe
    }

    pub fn term(&self, name: &str) -> Option<Term> {
        self.0
            .terms
            .iter()
            .find(|(term, _)| term == name)
            .map(|(term, f)| Term::with_function(self.clone(), term.clone(), f.clone()))
    }

    /// Same as [`Variable::term`] but a missing name is an error, which
    /// reads better when writing rules: `temp.is("hot")?`.
    pub fn is(&self, name: &str) -> Result<Term> {
        self.term(name).ok_or_else(|| FuzzyError::UnknownTerm {
            variable: self.id().to_owned(),
            term: name.to_owned(),
        })
    }

    /// Terms in declaration order.
    pub fn terms(&self) -> impl Iterator<Item = Term> + '_ {
        self.0
            .terms
            .iter()
            .map(|(term, f)| Term::with_function(self.clone(), term.clone(), f.clone()))
    }
}

/// Fails when two distinct variables share the same id. The same variable
/// may appear any number of times.
pub(crate) fn check_unique_ids<'v>(vars: impl IntoIterator<Item = &'v Variable>) -> Result<()> {
    let mut seen: HashMap<&str, &Variable> = HashMap::new();

    for var in vars {
        match seen.get(var.id()) {
            Some(other) if *other != var => return Err(FuzzyError::DuplicateVariableId(var.id().to_owned())),
            Some(_) => {},
            None => {
                seen.insert(var.id(), var);
            },
        }
    }

    Ok(())
}

impl PartialEq for Variable {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for Variable {}

impl Hash for Variable {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::ptr::hash(Arc::as_ptr(&self.0), state)
    }
}

impl fmt::Debug for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Variable").field(&self.0.id).finish()
    }
}

/// A named fuzzy set belonging to a [`Variable`].
#[derive(Clone)]
pub struct Term {
    name: String,
    variable: Variable,
    function: MembershipFunction,
}

impl Term {
    pub(crate) fn with_function(variable: Variable, name: String, function: MembershipFunction) -> Self {
        Term {
            name,
            variable,
            function,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn variable(&self) -> &Variable {
        &self.variable
    }

    pub fn function(&self) -> &MembershipFunction {
        &self.function
    }

    /// Membership degree of the crisp value bound to the parent variable.
    pub fn evaluate(&self, inputs: &Inputs) -> Result<f64> {
        let x = inputs.find(self)?;

        Ok(self.function.call(x))
    }

    /// The complemented term, same name and same parent.
    pub fn not(&self) -> Self {
        Term::with_function(self.variable.clone(), self.name.clone(), self.function.complement())
    }

    pub fn and(self, premise: impl Into<Premise>) -> Expression {
        Premise::from(self).and(premise)
    }

    pub fn or(self, premise: impl Into<Premise>) -> Expression {
        Premise::from(self).or(premise)
    }
}

impl fmt::Debug for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Term({}.{})", self.variable.id(), self.name)
    }
}

#[cfg(test)]
fn temperature() -> Variable {
    Variable::from_shapes(
        "temperature",
        Universe::with_step(0., 40., 1.).unwrap(),
        [
            ("cold", Shape::StepDown { a: 10., b: 20. }),
            ("hot", Shape::StepUp { a: 20., b: 30. }),
        ],
    )
    .unwrap()
}

#[test]
fn test_variable_terms() {
    let temp = temperature();

    assert_eq!(temp.id(), "temperature");
    assert_eq!(temp.universe().len(), 41);
    assert_eq!(temp.terms().map(|t| t.name().to_owned()).collect::<Vec<_>>(), ["cold", "hot"]);
    assert!(temp.term("warm").is_none());
    assert_eq!(temp.is("hot").unwrap().variable(), &temp);
    assert_eq!(
        temp.is("warm").unwrap_err(),
        FuzzyError::UnknownTerm {
            variable: "temperature".into(),
            term: "warm".into(),
        }
    );
}

#[test]
fn test_variable_identity() {
    let a = temperature();
    let b = temperature();

    assert_eq!(a, a.clone());
    assert_ne!(a, b);
    assert_eq!(a.id(), b.id());

    let set: HashSet<Variable> = [a.clone(), a.clone(), b].into_iter().collect();

    assert_eq!(set.len(), 2);
    assert_eq!(format!("{a:?}"), "Variable(\"temperature\")");
}

#[test]
fn test_variable_errors() {
    let f = MembershipFunction::constant(1.);

    assert_eq!(
        Variable::new("", Universe::empty(), [("a", f.clone())]).unwrap_err(),
        FuzzyError::EmptyVariableId
    );
    assert_eq!(
        Variable::new("v", Universe::empty(), [("", f.clone())]).unwrap_err(),
        FuzzyError::EmptyTermId("v".into())
    );
    assert_eq!(
        Variable::new("v", Universe::empty(), [("a", f.clone()), ("a", f)]).unwrap_err(),
        FuzzyError::DuplicateTermId {
            variable: "v".into(),
            term: "a".into(),
        }
    );
    assert_eq!(
        Variable::from_shapes("v", Universe::empty(), [("a", Shape::Triangular { a: 3., b: 2., c: 1. })]).unwrap_err(),
        FuzzyError::InvalidTerm {
            term: "a".into(),
            source: Box::new(FuzzyError::ParamOrder {
                shape: "tri",
                reason: "params shall be sorted",
            }),
        }
    );
}

#[test]
fn test_check_unique_ids() {
    let a = temperature();
    let b = temperature();

    assert_eq!(check_unique_ids([&a, &a, &a]), Ok(()));
    assert_eq!(
        check_unique_ids([&a, &b]),
        Err(FuzzyError::DuplicateVariableId("temperature".into()))
    );
}

#[test]
fn test_term_evaluate() {
    let temp = temperature();
    let hot = temp.is("hot").unwrap();
    let mut inputs = Inputs::new();

    assert_eq!(
        hot.evaluate(&inputs).unwrap_err(),
        FuzzyError::MissingInput {
            variable: "temperature".into(),
            term: "hot".into(),
        }
    );

    inputs.add(&temp, 25.);

    assert_eq!(hot.evaluate(&inputs), Ok(0.5));
    assert_eq!(temp.is("cold").unwrap().evaluate(&inputs), Ok(0.));
    assert_eq!(temp.is("cold").unwrap().not().evaluate(&inputs), Ok(1.));
    assert_eq!(hot.not().name(), "hot");
}
