use std::collections::HashMap;

use crate::variable::Variable;

/// Defuzzified crisp values, one per output variable.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Outputs(HashMap<Variable, f64>);

impl Outputs {
    pub fn new() -> Self {
        Outputs(HashMap::new())
    }

    pub fn get(&self, var: &Variable) -> Option<f64> {
        self.0.get(var).copied()
    }

    pub fn get_by_id(&self, id: &str) -> Option<f64> {
        self.0.iter().find(|(var, _)| var.id() == id).map(|(_, val)| *val)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Variable, f64)> + '_ {
        self.0.iter().map(|(var, val)| (var, *val))
    }

    pub fn variables(&self) -> impl Iterator<Item = &Variable> + '_ {
        self.0.keys()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn merge(&mut self, other: Outputs) {
        self.0.extend(other.0)
    }

    pub(crate) fn insert(&mut self, var: Variable, val: f64) {
        self.0.insert(var, val);
    }
}

impl FromIterator<(Variable, f64)> for Outputs {
    fn from_iter<T: IntoIterator<Item = (Variable, f64)>>(iter: T) -> Self {
        Outputs(iter.into_iter().collect())
    }
}

#[test]
fn test_outputs_lookup() {
    use crate::universe::Universe;

    let a = Variable::new::<&str>("a", Universe::empty(), []).unwrap();
    let b = Variable::new::<&str>("b", Universe::empty(), []).unwrap();
    let mut outputs = Outputs::new();

    outputs.insert(a.clone(), 0.5);

    assert_eq!(outputs.get(&a), Some(0.5));
    assert_eq!(outputs.get(&b), None);
    assert_eq!(outputs.get_by_id("a"), Some(0.5));
    assert_eq!(outputs.get_by_id("b"), None);

    outputs.merge([(b.clone(), 1.)].into_iter().collect());

    assert_eq!(outputs.len(), 2);
    assert_eq!(outputs.get(&b), Some(1.));
}
