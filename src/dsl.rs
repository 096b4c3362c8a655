//! Fluent rule writing: `when(a).and(b).then(vec![c])`.

use crate::config::InferenceConfig;
use crate::engine::Engine;
use crate::error::Result;
use crate::expression::{Expression, Premise};
use crate::inputs::Inputs;
use crate::ops::{Connector, Implication, Operator};
use crate::rules::Rule;
use crate::variable::Term;

/// Builds standalone rules sharing the same connectors and implication.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Builder {
    operator: Operator,
    implication: Implication,
}

impl Builder {
    pub fn new(operator: Operator, implication: Implication) -> Self {
        Builder { operator, implication }
    }

    pub fn mamdani() -> Self {
        Self::new(Operator::Zadeh, Implication::Min)
    }

    pub fn sugeno() -> Self {
        Self::new(Operator::Zadeh, Implication::Prod)
    }

    pub fn when(self, premise: impl Into<Premise>) -> Statement {
        Statement {
            builder: self,
            expr: Expression::new(vec![premise.into()], None),
        }
    }
}

/// The antecedent of a rule being written with a [`Builder`].
#[derive(Clone, Debug)]
pub struct Statement {
    builder: Builder,
    expr: Expression,
}

impl Statement {
    fn connect(self, premise: impl Into<Premise>, connector: Connector) -> Self {
        Statement {
            builder: self.builder,
            expr: self.expr.connect(premise, connector),
        }
    }

    pub fn and(self, premise: impl Into<Premise>) -> Self {
        let connector = self.builder.operator.and();
        self.connect(premise, connector)
    }

    pub fn or(self, premise: impl Into<Premise>) -> Self {
        let connector = self.builder.operator.or();
        self.connect(premise, connector)
    }

    pub fn xor(self, premise: impl Into<Premise>) -> Self {
        let connector = self.builder.operator.xor();
        self.connect(premise, connector)
    }

    pub fn nand(self, premise: impl Into<Premise>) -> Self {
        let connector = self.builder.operator.nand();
        self.connect(premise, connector)
    }

    pub fn nor(self, premise: impl Into<Premise>) -> Self {
        let connector = self.builder.operator.nor();
        self.connect(premise, connector)
    }

    pub fn not(self) -> Self {
        Statement {
            builder: self.builder,
            expr: self.expr.not(),
        }
    }

    pub fn evaluate(&self, inputs: &Inputs) -> Result<f64> {
        self.expr.evaluate(inputs)
    }

    pub fn then(self, consequents: Vec<Term>) -> Rule {
        Rule::new(self.expr, self.builder.implication, consequents)
    }
}

impl From<Statement> for Premise {
    fn from(statement: Statement) -> Self {
        statement.expr.into()
    }
}

/// Accumulates rules, then turns into an [`Engine`].
#[derive(Clone, Debug, Default)]
pub struct FuzzyLogic {
    config: InferenceConfig,
    rules: Vec<Rule>,
}

impl FuzzyLogic {
    pub fn new(config: InferenceConfig) -> Self {
        FuzzyLogic {
            config,
            rules: Vec::new(),
        }
    }

    pub fn when(&mut self, premise: impl Into<Premise>) -> Clause<'_> {
        Clause {
            logic: self,
            expr: Expression::new(vec![premise.into()], None),
        }
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn engine(self) -> Result<Engine> {
        Engine::new(self.rules, self.config.aggregation, self.config.defuzzification)
    }
}

/// The antecedent of a rule being added to a [`FuzzyLogic`].
#[derive(Debug)]
pub struct Clause<'f> {
    logic: &'f mut FuzzyLogic,
    expr: Expression,
}

impl Clause<'_> {
    fn connect(self, premise: impl Into<Premise>, connector: Connector) -> Self {
        Clause {
            logic: self.logic,
            expr: self.expr.connect(premise, connector),
        }
    }

    pub fn and(self, premise: impl Into<Premise>) -> Self {
        let connector = self.logic.config.operator.and();
        self.connect(premise, connector)
    }

    pub fn or(self, premise: impl Into<Premise>) -> Self {
        let connector = self.logic.config.operator.or();
        self.connect(premise, connector)
    }

    pub fn xor(self, premise: impl Into<Premise>) -> Self {
        let connector = self.logic.config.operator.xor();
        self.connect(premise, connector)
    }

    pub fn nand(self, premise: impl Into<Premise>) -> Self {
        let connector = self.logic.config.operator.nand();
        self.connect(premise, connector)
    }

    pub fn nor(self, premise: impl Into<Premise>) -> Self {
        let connector = self.logic.config.operator.nor();
        self.connect(premise, connector)
    }

    pub fn not(self) -> Self {
        Clause {
            logic: self.logic,
            expr: self.expr.not(),
        }
    }

    pub fn evaluate(&self, inputs: &Inputs) -> Result<f64> {
        self.expr.evaluate(inputs)
    }

    /// Stores the rule in the parent [`FuzzyLogic`].
    pub fn then(self, consequents: impl IntoIterator<Item = Term>) {
        let rule = Rule::new(self.expr, self.logic.config.implication, consequents.into_iter().collect());

        self.logic.rules.push(rule);
    }
}

#[cfg(test)]
fn abc() -> [crate::variable::Variable; 3] {
    use crate::membership::Shape;
    use crate::universe::Universe;
    use crate::variable::Variable;

    ["a", "b", "c"].map(|id| {
        Variable::from_shapes(
            id,
            Universe::with_step(0., 10., 0.1).unwrap(),
            [
                ("low", Shape::StepDown { a: 2., b: 6. }),
                ("mid", Shape::Triangular { a: 2., b: 5., c: 8. }),
                ("high", Shape::StepUp { a: 4., b: 8. }),
            ],
        )
        .unwrap()
    })
}

#[test]
fn test_builder_matches_direct_rules() {
    use approx::assert_relative_eq;

    use crate::ops::{Aggregation, Defuzzification};

    let [a, b, c] = abc();
    let t = |var: &crate::variable::Variable, name: &str| var.is(name).unwrap();

    let bld = Builder::sugeno();
    let built = vec![
        bld.when(t(&a, "low")).and(t(&b, "high")).then(vec![t(&c, "high")]),
        bld.when(t(&a, "high")).or(t(&b, "mid")).not().then(vec![t(&c, "low")]),
    ];
    let direct = vec![
        Rule::new(
            Expression::new(vec![t(&a, "low").into(), t(&b, "high").into()], Some(Connector::ZadehAnd)),
            Implication::Prod,
            vec![t(&c, "high")],
        ),
        Rule::new(
            Expression::new(vec![t(&a, "high").into(), t(&b, "mid").into()], Some(Connector::ZadehOr)).not(),
            Implication::Prod,
            vec![t(&c, "low")],
        ),
    ];

    let built = Engine::new(built, Aggregation::Union, Defuzzification::Centroid).unwrap();
    let direct = Engine::new(direct, Aggregation::Union, Defuzzification::Centroid).unwrap();

    for (x, y) in [(1., 9.), (3., 5.), (5., 5.), (9., 1.)] {
        let inputs: Inputs = [(a.clone(), x), (b.clone(), y)].into_iter().collect();
        let lhs = built.evaluate(&inputs).unwrap().get(&c).unwrap();
        let rhs = direct.evaluate(&inputs).unwrap().get(&c).unwrap();

        assert_relative_eq!(lhs, rhs);
    }
}

#[test]
fn test_statement_nesting() {
    let [a, b, c] = abc();
    let bld = Builder::new(Operator::Hyperbolic, Implication::Min);
    let inputs: Inputs = [(a.clone(), 5.), (b.clone(), 5.), (c.clone(), 0.)].into_iter().collect();

    // mid(5) = 1, high(5) = 0.25, low(0) = 1
    let inner = bld.when(b.is("high").unwrap()).or(c.is("low").unwrap());
    let stmt = bld.when(a.is("mid").unwrap()).and(inner);

    assert_eq!(stmt.evaluate(&inputs), Ok(1.));

    let stmt = bld.when(a.is("mid").unwrap()).xor(b.is("high").unwrap());

    // 1 + 0.25 - 2 * 0.25
    assert_eq!(stmt.evaluate(&inputs), Ok(0.75));
    assert_eq!(stmt.not().evaluate(&inputs), Ok(0.25));
}

#[test]
fn test_fuzzy_logic_controller() {
    use approx::assert_abs_diff_eq;

    use crate::engine::fixtures::{controller, FORCE_TABLE, LEVELS};

    let (_, diff, dt, force) = controller();
    let mut logic = FuzzyLogic::new(InferenceConfig::sugeno());

    for (i, row) in FORCE_TABLE.iter().enumerate() {
        for (j, then) in row.iter().enumerate() {
            logic
                .when(diff.is(LEVELS[i]).unwrap())
                .and(dt.is(LEVELS[j]).unwrap())
                .then([force.is(then).unwrap()]);
        }
    }

    assert_eq!(logic.rules().len(), 25);

    let engine = logic.engine().unwrap();
    let inputs: Inputs = [(diff, -1.), (dt, -0.1)].into_iter().collect();

    assert_abs_diff_eq!(
        engine.evaluate(&inputs).unwrap().get(&force).unwrap(),
        3.016666666666666,
        epsilon = 1e-9
    );
}
