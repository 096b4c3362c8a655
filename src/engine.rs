use rayon::prelude::*;
use tracing::{debug, instrument};

use crate::defuzzer::Defuzzer;
use crate::error::Result;
use crate::inputs::Inputs;
use crate::ops::{Aggregation, Defuzzification};
use crate::outputs::Outputs;
use crate::rules::Rule;
use crate::variable::{check_unique_ids, Term, Variable};

/// A rule base with its aggregation and defuzzification methods.
/// Immutable once built.
#[derive(Clone, Debug)]
pub struct Engine {
    rules: Vec<Rule>,
    aggregation: Aggregation,
    defuzzification: Defuzzification,
}

impl Engine {
    /// Fails if two distinct variables referenced by the rules share an id.
    pub fn new(rules: Vec<Rule>, aggregation: Aggregation, defuzzification: Defuzzification) -> Result<Self> {
        check_unique_ids(
            rules
                .iter()
                .flat_map(|rule| rule.inputs().into_iter().chain(rule.outputs()))
                .map(Term::variable),
        )?;

        debug!(rules = rules.len(), ?aggregation, ?defuzzification, "engine built");

        Ok(Engine {
            rules,
            aggregation,
            defuzzification,
        })
    }

    /// Fires every rule against the same inputs, then defuzzifies the results
    /// per output variable. The first rule error aborts the evaluation.
    #[instrument(skip_all, fields(rules = self.rules.len(), inputs = inputs.len()))]
    pub fn evaluate(&self, inputs: &Inputs) -> Result<Outputs> {
        let results = self
            .rules
            .par_iter()
            .map(|rule| rule.evaluate(inputs))
            .collect::<Result<Vec<Vec<Term>>>>()?;

        let mut dfz = Defuzzer::new(self.aggregation, self.defuzzification);

        for terms in results {
            dfz.add(terms);
        }

        let outputs = dfz.defuzz();

        debug!(outputs = outputs.len(), "engine evaluated");

        Ok(outputs)
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn aggregation(&self) -> Aggregation {
        self.aggregation
    }

    pub fn defuzzification(&self) -> Defuzzification {
        self.defuzzification
    }

    /// Antecedent terms of every rule, in rule order.
    pub fn inputs(&self) -> Vec<&Term> {
        self.rules.iter().flat_map(Rule::inputs).collect()
    }

    /// Consequent terms of every rule, in rule order.
    pub fn outputs(&self) -> Vec<&Term> {
        self.rules.iter().flat_map(Rule::outputs).collect()
    }

    pub fn input_variables(&self) -> Vec<Variable> {
        distinct(self.inputs())
    }

    pub fn output_variables(&self) -> Vec<Variable> {
        distinct(self.outputs())
    }
}

// Parent variables in first seen order
fn distinct(terms: Vec<&Term>) -> Vec<Variable> {
    let mut vars: Vec<Variable> = Vec::new();

    for term in terms {
        if !vars.contains(term.variable()) {
            vars.push(term.variable().clone());
        }
    }

    vars
}

#[cfg(test)]
pub(crate) mod fixtures {
    use crate::expression::Expression;
    use crate::membership::Shape;
    use crate::ops::{Aggregation, Connector, Defuzzification, Implication};
    use crate::rules::Rule;
    use crate::universe::Universe;
    use crate::variable::Variable;

    use super::Engine;

    pub(crate) const LEVELS: [&str; 5] = ["--", "-", "0", "+", "++"];

    // diff rows x dt columns
    pub(crate) const FORCE_TABLE: [[&str; 5]; 5] = [
        ["++", "++", "++", "+", "+"],
        ["++", "++", "+", "0", "0"],
        ["+", "+", "0", "-", "-"],
        ["0", "0", "-", "--", "--"],
        ["-", "-", "--", "--", "--"],
    ];

    fn levels(id: &str, universe: Universe, outer: f64, inner: f64, shared_foot: bool) -> Variable {
        // Outer feet of the `-` and `+` triangles
        let foot = if shared_foot { 2. * inner } else { outer };

        Variable::from_shapes(
            id,
            universe,
            [
                ("--", Shape::StepDown { a: -outer, b: -inner }),
                ("-", Shape::Triangular { a: -foot, b: -inner, c: 0. }),
                ("0", Shape::Triangular { a: -inner, b: 0., c: inner }),
                ("+", Shape::Triangular { a: 0., b: inner, c: foot }),
                ("++", Shape::StepUp { a: inner, b: outer }),
            ],
        )
        .unwrap()
    }

    /// The temperature controller: `diff/consigne` x `temp/dt` -> `force`.
    pub(crate) fn controller() -> (Engine, Variable, Variable, Variable) {
        let diff = levels("diff/consigne", Universe::with_step(-2., 2., 0.1).unwrap(), 2., 0.5, false);
        let dt = levels("temp/dt", Universe::with_step(-0.2, 0.2, 0.01).unwrap(), 0.2, 0.1, false);
        let force = levels("force", Universe::with_step(-4., 4., 0.05).unwrap(), 4., 1., true);

        let mut rules = Vec::with_capacity(25);

        for (i, row) in FORCE_TABLE.iter().enumerate() {
            for (j, then) in row.iter().enumerate() {
                let premise = Expression::new(
                    vec![diff.is(LEVELS[i]).unwrap().into(), dt.is(LEVELS[j]).unwrap().into()],
                    Some(Connector::ZadehAnd),
                );

                rules.push(Rule::new(premise, Implication::Prod, vec![force.is(then).unwrap()]));
            }
        }

        let engine = Engine::new(rules, Aggregation::Union, Defuzzification::Centroid).unwrap();

        (engine, diff, dt, force)
    }
}

#[test]
fn test_engine_minimal() {
    use approx::assert_abs_diff_eq;

    use crate::membership::Shape;
    use crate::ops::Implication;
    use crate::universe::Universe;

    let var = |id: &str, min: f64, p: [f64; 4]| {
        Variable::from_shapes(
            id,
            Universe::with_step(min, min + 3., 0.1).unwrap(),
            [
                (format!("{id}1"), Shape::Triangular { a: p[0], b: p[1], c: p[2] }),
                (format!("{id}2"), Shape::Triangular { a: p[1], b: p[2], c: p[3] }),
            ],
        )
        .unwrap()
    };
    let a = var("a", 1., [1., 2., 3., 4.]);
    let b = var("b", 2., [2., 3., 4., 5.]);
    let c = var("c", 11., [11., 12., 13., 14.]);

    let rules = vec![
        Rule::new(
            a.is("a1").unwrap().and(b.is("b1").unwrap()),
            Implication::Prod,
            vec![c.is("c1").unwrap()],
        ),
        Rule::new(
            a.is("a2").unwrap().and(b.is("b2").unwrap()),
            Implication::Prod,
            vec![c.is("c2").unwrap()],
        ),
    ];
    let engine = Engine::new(rules, Aggregation::Union, Defuzzification::Centroid).unwrap();
    let inputs: Inputs = [(a.clone(), 2.1), (b.clone(), 3.9)].into_iter().collect();
    let outputs = engine.evaluate(&inputs).unwrap();

    assert_eq!(outputs.len(), 1);
    assert_abs_diff_eq!(outputs.get(&c).unwrap(), 12.5, epsilon = 1e-9);
    assert_eq!(engine.input_variables(), [a, b]);
    assert_eq!(engine.output_variables(), [c]);
}

#[test]
fn test_engine_controller() {
    use approx::assert_abs_diff_eq;

    let (engine, diff, dt, force) = fixtures::controller();

    assert_eq!(engine.rules().len(), 25);
    assert_eq!(engine.inputs().len(), 50);
    assert_eq!(engine.output_variables(), [force.clone()]);

    let inputs: Inputs = [(diff.clone(), -1.), (dt.clone(), -0.1)].into_iter().collect();
    let outputs = engine.evaluate(&inputs).unwrap();

    assert_eq!(outputs.len(), 1);
    assert_abs_diff_eq!(outputs.get(&force).unwrap(), 3.016666666666666, epsilon = 1e-9);

    for (x_diff, x_dt, expected) in [
        (-0.1, 0.1, -0.8),
        (-1., 0.1, 0.3),
        (1., 0.1, -3.1),
        (1., -0.1, -0.3),
        (0., 0., 0.),
        (0., 2., -1.),
        (20., 0.1, -3.1),
    ] {
        let inputs: Inputs = [(diff.clone(), x_diff), (dt.clone(), x_dt)].into_iter().collect();
        let outputs = engine.evaluate(&inputs).unwrap();

        assert_abs_diff_eq!(outputs.get(&force).unwrap(), expected, epsilon = 0.1);
    }
}

#[test]
fn test_engine_errors() {
    use crate::error::FuzzyError;
    use crate::membership::MembershipFunction;
    use crate::ops::Implication;
    use crate::universe::Universe;

    let identity = || MembershipFunction::new(|x| x);
    let var = |id: &str| Variable::new(id, Universe::empty(), [(format!("{id}1"), identity())]).unwrap();
    let (a, b, c, d) = (var("a"), var("b"), var("c"), var("d"));
    let a1 = a.is("a1").unwrap();

    // a -> b, a -> c, c -> d
    let rules = vec![
        Rule::new(a1.clone(), Implication::Prod, vec![b.is("b1").unwrap()]),
        Rule::new(a1.clone(), Implication::Prod, vec![c.is("c1").unwrap()]),
        Rule::new(c.is("c1").unwrap(), Implication::Prod, vec![d.is("d1").unwrap()]),
    ];

    assert!(Engine::new(rules, Aggregation::Union, Defuzzification::Centroid).is_ok());

    // `c` and its twin share the same id
    let twin = var("c");
    let rules = vec![
        Rule::new(a1.clone(), Implication::Prod, vec![b.is("b1").unwrap()]),
        Rule::new(a1.clone(), Implication::Prod, vec![twin.is("c1").unwrap()]),
        Rule::new(c.is("c1").unwrap(), Implication::Prod, vec![d.is("d1").unwrap()]),
    ];

    assert_eq!(
        Engine::new(rules, Aggregation::Union, Defuzzification::Centroid).unwrap_err(),
        FuzzyError::DuplicateVariableId("c".into())
    );

    // Missing input aborts the whole evaluation
    let rules = vec![Rule::new(a1.clone().and(b.is("b1").unwrap()), Implication::Min, vec![c.is("c1").unwrap()])];
    let engine = Engine::new(rules, Aggregation::Union, Defuzzification::Centroid).unwrap();
    let inputs: Inputs = [(a.clone(), 1.)].into_iter().collect();

    assert_eq!(
        engine.evaluate(&inputs).unwrap_err(),
        FuzzyError::MissingInput {
            variable: "b".into(),
            term: "b1".into(),
        }
    );
}
