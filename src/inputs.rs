use std::collections::HashMap;

use crate::error::{FuzzyError, Result};
use crate::outputs::Outputs;
use crate::variable::{Term, Variable};

/// Crisp values bound to variables, keyed by variable identity.
#[derive(Clone, Debug, Default)]
pub struct Inputs(pub(crate) HashMap<Variable, f64>);

impl Inputs {
    pub fn new() -> Self {
        Inputs(HashMap::new())
    }

    pub fn add(&mut self, var: &Variable, val: f64) {
        self.0.insert(var.clone(), val);
    }

    pub fn get(&self, var: &Variable) -> Option<f64> {
        self.0.get(var).copied()
    }

    /// Binds every output value as an input, overriding existing entries.
    pub fn merge(&mut self, outputs: &Outputs) {
        self.0.extend(outputs.iter().map(|(var, val)| (var.clone(), val)));
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub(crate) fn find(&self, term: &Term) -> Result<f64> {
        self.get(term.variable()).ok_or_else(|| FuzzyError::MissingInput {
            variable: term.variable().id().to_owned(),
            term: term.name().to_owned(),
        })
    }
}

impl FromIterator<(Variable, f64)> for Inputs {
    fn from_iter<T: IntoIterator<Item = (Variable, f64)>>(iter: T) -> Self {
        Inputs(iter.into_iter().collect())
    }
}

impl Extend<(Variable, f64)> for Inputs {
    fn extend<T: IntoIterator<Item = (Variable, f64)>>(&mut self, iter: T) {
        self.0.extend(iter)
    }
}

#[test]
fn test_inputs_merge() {
    use crate::universe::Universe;

    let a = Variable::new::<&str>("a", Universe::empty(), []).unwrap();
    let b = Variable::new::<&str>("b", Universe::empty(), []).unwrap();
    let mut inputs: Inputs = [(a.clone(), 1.)].into_iter().collect();
    let outputs: Outputs = [(a.clone(), 3.), (b.clone(), 2.)].into_iter().collect();

    assert_eq!(inputs.get(&b), None);

    inputs.merge(&outputs);

    assert_eq!(inputs.len(), 2);
    assert_eq!(inputs.get(&a), Some(3.));
    assert_eq!(inputs.get(&b), Some(2.));
}
