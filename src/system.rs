use std::collections::HashSet;

use tracing::{debug, instrument};

use crate::engine::Engine;
use crate::error::{FuzzyError, Result};
use crate::graph::DirectedGraph;
use crate::inputs::Inputs;
use crate::outputs::Outputs;
use crate::variable::{check_unique_ids, Variable};

/// Engines chained by the variables they share: the outputs of an engine
/// become inputs of the engines consuming them.
#[derive(Clone, Debug)]
pub struct System {
    // Execution order
    engines: Vec<Engine>,
}

impl System {
    /// Orders `engines` by data dependency.
    ///
    /// Fails when a variable is produced by two engines, when two distinct
    /// variables share an id, or when the dependencies form a cycle
    /// (including an engine consuming its own output).
    pub fn new(engines: Vec<Engine>) -> Result<Self> {
        let outputs: Vec<Vec<Variable>> = engines.iter().map(Engine::output_variables).collect();
        let inputs: Vec<Vec<Variable>> = engines.iter().map(Engine::input_variables).collect();

        let mut produced = HashSet::new();

        for var in outputs.iter().flatten() {
            if !produced.insert(var) {
                return Err(FuzzyError::DuplicateOutput(var.id().to_owned()));
            }
        }

        check_unique_ids(inputs.iter().chain(&outputs).flatten())?;

        let mut graph = DirectedGraph::new();
        let keys: Vec<_> = engines.into_iter().map(|engine| graph.add_node(engine)).collect();

        for (i, from) in outputs.iter().enumerate() {
            let to: Vec<_> = inputs
                .iter()
                .enumerate()
                .filter(|(_, to)| to.iter().any(|var| from.contains(var)))
                .map(|(j, _)| keys[j])
                .collect();

            graph.add_edge(keys[i], &to);
        }

        let engines = graph.into_sorted()?;

        debug!(engines = engines.len(), "system built");

        Ok(System { engines })
    }

    /// Evaluates every engine in dependency order. Each engine sees the
    /// caller inputs plus every output produced before it.
    #[instrument(skip_all, fields(engines = self.engines.len()))]
    pub fn evaluate(&self, inputs: &Inputs) -> Result<Outputs> {
        let mut inputs = inputs.clone();
        let mut outputs = Outputs::new();

        for (stage, engine) in self.engines.iter().enumerate() {
            let produced = engine.evaluate(&inputs)?;

            debug!(stage, outputs = produced.len(), "stage evaluated");

            inputs.merge(&produced);
            outputs.merge(produced);
        }

        Ok(outputs)
    }

    /// Engines in execution order.
    pub fn engines(&self) -> &[Engine] {
        &self.engines
    }
}

#[cfg(test)]
mod tests {
    use crate::expression::Expression;
    use crate::membership::MembershipFunction;
    use crate::ops::{Aggregation, Connector, Defuzzification, Implication};
    use crate::rules::Rule;
    use crate::universe::Universe;
    use crate::variable::Term;

    use super::*;

    fn init_tracing() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    }

    fn var(id: &str) -> Variable {
        let identity = MembershipFunction::new(|x| x);

        Variable::new(id, Universe::empty(), [(format!("{id}1"), identity)]).unwrap()
    }

    fn engine(rules: Vec<Rule>) -> Engine {
        Engine::new(rules, Aggregation::Union, Defuzzification::Centroid).unwrap()
    }

    fn both(a: &Variable, b: &Variable) -> Expression {
        Expression::new(
            vec![a.is(&format!("{}1", a.id())).unwrap().into(), b.is(&format!("{}1", b.id())).unwrap().into()],
            Some(Connector::ZadehAnd),
        )
    }

    fn first(var: &Variable) -> Term {
        var.terms().next().unwrap()
    }

    struct Fixture {
        vars: Vec<Variable>,
        engines: Vec<Engine>,
    }

    // a & b -> c, d -> e f, c & e -> g
    fn fixture() -> Fixture {
        let vars: Vec<Variable> = ["a", "b", "c", "d", "e", "f", "g"].into_iter().map(var).collect();
        let [a, b, c, d, e, f, g] = &vars[..] else {
            unreachable!()
        };

        let engines = vec![
            engine(vec![Rule::new(both(a, b), Implication::Min, vec![first(c)])]),
            engine(vec![Rule::new(first(d), Implication::Min, vec![first(e), first(f)])]),
            engine(vec![Rule::new(both(c, e), Implication::Min, vec![first(g)])]),
        ];

        Fixture { vars, engines }
    }

    #[test]
    fn test_system_evaluate() {
        init_tracing();

        let Fixture { vars, engines } = fixture();
        let system = System::new(engines).unwrap();
        let inputs: Inputs = [(vars[0].clone(), 1.), (vars[1].clone(), 1.), (vars[3].clone(), 1.)]
            .into_iter()
            .collect();
        let outputs = system.evaluate(&inputs).unwrap();

        let mut ids: Vec<&str> = outputs.variables().map(Variable::id).collect();
        ids.sort_unstable();

        assert_eq!(ids, ["c", "e", "f", "g"]);
        assert!(outputs.iter().all(|(_, val)| val == 0.));

        // `g` needs `c` and `e`: its engine runs last
        assert_eq!(system.engines()[2].output_variables(), [vars[6].clone()]);
    }

    #[test]
    fn test_system_order_independent() {
        let Fixture { vars, mut engines } = fixture();

        engines.reverse();

        let system = System::new(engines).unwrap();
        let inputs: Inputs = [(vars[0].clone(), 1.), (vars[1].clone(), 1.), (vars[3].clone(), 1.)]
            .into_iter()
            .collect();

        assert_eq!(system.evaluate(&inputs).unwrap().len(), 4);
        assert_eq!(system.engines()[2].output_variables(), [vars[6].clone()]);
    }

    #[test]
    fn test_system_missing_input() {
        let Fixture { vars, engines } = fixture();
        let system = System::new(engines).unwrap();
        let inputs: Inputs = [(vars[0].clone(), 1.), (vars[1].clone(), 1.)].into_iter().collect();
        let err = system.evaluate(&inputs).unwrap_err();

        assert_eq!(err.to_string(), "input: cannot find data for variable `d` (term `d1`)");
    }

    #[test]
    fn test_system_checks() {
        let Fixture { vars, engines } = fixture();
        let (d, e, f, g) = (&vars[3], &vars[4], &vars[5], &vars[6]);

        // d -> e f g
        let mut dup = engines.clone();
        dup[1] = engine(vec![Rule::new(first(d), Implication::Prod, vec![first(e), first(f), first(g)])]);

        assert_eq!(System::new(dup).unwrap_err(), FuzzyError::DuplicateOutput("g".into()));

        // d -> e a', with a' sharing the id of a
        let mut twin = engines.clone();
        twin[1] = engine(vec![Rule::new(first(d), Implication::Prod, vec![first(e), first(&var("a"))])]);

        assert_eq!(System::new(twin).unwrap_err(), FuzzyError::DuplicateVariableId("a".into()));

        // g -> e f
        let mut cycle = engines.clone();
        cycle[1] = engine(vec![Rule::new(first(g), Implication::Prod, vec![first(e), first(f)])]);

        assert_eq!(System::new(cycle).unwrap_err(), FuzzyError::CyclicDependency);

        // d -> d
        let looped = vec![engine(vec![Rule::new(first(d), Implication::Prod, vec![first(d)])])];

        assert_eq!(System::new(looped).unwrap_err(), FuzzyError::CyclicDependency);

        // Several rules of one engine may share an output
        let shared = vec![engine(vec![
            Rule::new(first(d), Implication::Prod, vec![first(e)]),
            Rule::new(first(f), Implication::Prod, vec![first(e)]),
        ])];

        assert!(System::new(shared).is_ok());
        assert!(System::new(engines).is_ok());
    }
}
