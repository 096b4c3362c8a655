use tracing::trace;

use crate::membership::MembershipFunction;
use crate::ops::{Aggregation, Defuzzification};
use crate::outputs::Outputs;
use crate::variable::{Term, Variable};

/// Collects rule results, then aggregates and defuzzifies them per output
/// variable.
#[derive(Debug)]
pub struct Defuzzer {
    aggregation: Aggregation,
    defuzzification: Defuzzification,
    // Grouped by variable, in first seen order
    groups: Vec<(Variable, Vec<MembershipFunction>)>,
}

impl Defuzzer {
    pub fn new(aggregation: Aggregation, defuzzification: Defuzzification) -> Self {
        Defuzzer {
            aggregation,
            defuzzification,
            groups: Vec::new(),
        }
    }

    pub fn add(&mut self, results: impl IntoIterator<Item = Term>) {
        for term in results {
            let function = term.function().clone();

            match self.groups.iter_mut().find(|(var, _)| var == term.variable()) {
                Some((_, functions)) => functions.push(function),
                None => self.groups.push((term.variable().clone(), vec![function])),
            }
        }
    }

    pub fn defuzz(&self) -> Outputs {
        let mut outputs = Outputs::new();

        for (var, functions) in &self.groups {
            let Some((first, rest)) = functions.split_first() else {
                continue;
            };
            let aggregation = self.aggregation;
            let aggregated = rest
                .iter()
                .fold(first.clone(), |acc, f| acc.aggregate(f, move |a, b| aggregation.call(a, b)));
            let value = self.defuzzification.call(&aggregated, var.universe());

            trace!(variable = var.id(), terms = functions.len(), value, "defuzzified output");

            outputs.insert(var.clone(), value);
        }

        outputs
    }
}

#[test]
fn test_defuzzer_groups() {
    use approx::assert_abs_diff_eq;

    use crate::universe::Universe;

    let universe = Universe::with_step(0., 10., 0.5).unwrap();
    let speed = Variable::new(
        "speed",
        universe.clone(),
        [
            ("slow", MembershipFunction::triangular(0., 2., 4.).unwrap()),
            ("fast", MembershipFunction::triangular(6., 8., 10.).unwrap()),
        ],
    )
    .unwrap();
    let brake = Variable::new("brake", universe, [("soft", MembershipFunction::constant(1.))]).unwrap();

    let mut dfz = Defuzzer::new(Aggregation::Union, Defuzzification::Centroid);

    dfz.add([speed.is("slow").unwrap(), brake.is("soft").unwrap()]);
    dfz.add([speed.is("fast").unwrap()]);

    let outputs = dfz.defuzz();

    assert_eq!(outputs.len(), 2);
    assert_abs_diff_eq!(outputs.get(&speed).unwrap(), 5., epsilon = 1e-9);
    assert_abs_diff_eq!(outputs.get(&brake).unwrap(), 5., epsilon = 1e-9);

    let mut dfz = Defuzzer::new(Aggregation::Intersection, Defuzzification::Centroid);

    dfz.add([speed.is("slow").unwrap(), speed.is("fast").unwrap()]);

    assert_eq!(dfz.defuzz().get(&speed), Some(0.));
    assert!(Defuzzer::new(Aggregation::Union, Defuzzification::Centroid).defuzz().is_empty());
}
