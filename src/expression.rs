use crate::error::{FuzzyError, Result};
use crate::inputs::Inputs;
use crate::ops::{Connector, Operator};
use crate::variable::Term;

/// Anything evaluable to a truth degree given crisp inputs.
#[derive(Clone, Debug)]
pub enum Premise {
    Term(Term),
    Expression(Box<Expression>),
}

impl Premise {
    pub fn evaluate(&self, inputs: &Inputs) -> Result<f64> {
        match self {
            Premise::Term(term) => term.evaluate(inputs),
            Premise::Expression(expr) => expr.evaluate(inputs),
        }
    }

    /// Leaf terms, depth first, left to right.
    pub fn terms(&self) -> Vec<&Term> {
        let mut terms = Vec::new();

        fn parse<'p>(premise: &'p Premise, out: &mut Vec<&'p Term>) {
            match premise {
                Premise::Term(term) => out.push(term),
                Premise::Expression(expr) => {
                    for premise in &expr.premises {
                        parse(premise, out);
                    }
                },
            }
        }

        parse(self, &mut terms);

        terms
    }

    pub fn connect(self, premise: impl Into<Premise>, connector: Connector) -> Expression {
        match self {
            Premise::Expression(expr) => expr.connect(premise, connector),
            Premise::Term(term) => Expression::from(term).connect(premise, connector),
        }
    }

    pub fn and(self, premise: impl Into<Premise>) -> Expression {
        self.connect(premise, Operator::Zadeh.and())
    }

    pub fn or(self, premise: impl Into<Premise>) -> Expression {
        self.connect(premise, Operator::Zadeh.or())
    }
}

impl From<Term> for Premise {
    fn from(term: Term) -> Self {
        Premise::Term(term)
    }
}

impl From<Expression> for Premise {
    fn from(expr: Expression) -> Self {
        Premise::Expression(Box::new(expr))
    }
}

/// Premises folded left to right with one connector, optionally negated.
///
/// E.g:
///  `a.and(b).and(c)` is a single node `min(min(a, b), c)`
///  `a.and(b).or(c)` nests: `max(min(a, b), c)`
#[derive(Clone, Debug)]
pub struct Expression {
    premises: Vec<Premise>,
    connector: Option<Connector>,
    negated: bool,
}

impl Expression {
    pub fn new(premises: Vec<Premise>, connector: Option<Connector>) -> Self {
        Expression {
            premises,
            connector,
            negated: false,
        }
    }

    pub fn premises(&self) -> &[Premise] {
        &self.premises
    }

    pub fn connector(&self) -> Option<Connector> {
        self.connector
    }

    pub fn is_negated(&self) -> bool {
        self.negated
    }

    /// Without a connector only the first premise counts.
    pub fn evaluate(&self, inputs: &Inputs) -> Result<f64> {
        let values = self
            .premises
            .iter()
            .map(|premise| premise.evaluate(inputs))
            .collect::<Result<Vec<f64>>>()?;

        let (&first, rest) = values.split_first().ok_or(FuzzyError::EmptyExpression)?;
        let y = match self.connector {
            Some(connector) => rest.iter().fold(first, |y, v| connector.call(y, *v)),
            None => first,
        };

        if self.negated {
            return Ok(1. - y);
        }

        Ok(y)
    }

    /// Links `premise` to this expression. Appends to the current premises
    /// when that keeps the left fold exact, nests otherwise.
    pub fn connect(mut self, premise: impl Into<Premise>, connector: Connector) -> Self {
        let premise = premise.into();

        if !self.negated && self.connector.map_or(true, |current| current == connector) {
            self.premises.push(premise);
            self.connector = Some(connector);

            return self;
        }

        Expression::new(vec![self.into(), premise], Some(connector))
    }

    /// Toggles negation of the whole expression.
    pub fn not(mut self) -> Self {
        self.negated = !self.negated;
        self
    }

    pub fn and(self, premise: impl Into<Premise>) -> Self {
        self.connect(premise, Operator::Zadeh.and())
    }

    pub fn or(self, premise: impl Into<Premise>) -> Self {
        self.connect(premise, Operator::Zadeh.or())
    }

    pub fn xor(self, premise: impl Into<Premise>) -> Self {
        self.connect(premise, Operator::Zadeh.xor())
    }

    pub fn nand(self, premise: impl Into<Premise>) -> Self {
        self.connect(premise, Operator::Zadeh.nand())
    }

    pub fn nor(self, premise: impl Into<Premise>) -> Self {
        self.connect(premise, Operator::Zadeh.nor())
    }
}

impl From<Term> for Expression {
    fn from(term: Term) -> Self {
        Expression::new(vec![term.into()], None)
    }
}

#[cfg(test)]
fn doubled(ids: &[&str]) -> (Vec<crate::variable::Variable>, Vec<Term>) {
    use crate::membership::MembershipFunction;
    use crate::universe::Universe;
    use crate::variable::Variable;

    let vars: Vec<Variable> = ids
        .iter()
        .map(|id| {
            let f = MembershipFunction::new(|x| 2. * x);

            Variable::new(*id, Universe::empty(), [(format!("{id}1"), f)]).unwrap()
        })
        .collect();
    let terms = vars.iter().map(|var| var.is(&format!("{}1", var.id())).unwrap()).collect();

    (vars, terms)
}

#[test]
fn test_expression_evaluate() {
    let (vars, terms) = doubled(&["a", "b", "c"]);
    let inputs: Inputs = vars.iter().cloned().zip([0.1, 0.2, 0.3]).collect();
    let t = |i: usize| Premise::from(terms[i].clone());

    let and = Expression::new(vec![t(0), t(1), t(2)], Some(Connector::ZadehAnd));
    assert_eq!(and.evaluate(&inputs), Ok(0.2));

    let or = Expression::new(vec![t(0), t(1), t(2)], Some(Connector::ZadehOr));
    assert_eq!(or.evaluate(&inputs), Ok(0.6));
    assert_eq!(or.not().evaluate(&inputs), Ok(0.4));

    // No connector: only the first premise counts
    let single = Expression::new(vec![t(1), t(2)], None);
    assert_eq!(single.evaluate(&inputs), Ok(0.4));

    assert_eq!(
        Expression::new(Vec::new(), Some(Connector::ZadehAnd)).evaluate(&inputs),
        Err(FuzzyError::EmptyExpression)
    );

    let partial: Inputs = vars.iter().take(2).cloned().zip([0.1, 0.2]).collect();
    assert_eq!(
        and.evaluate(&partial),
        Err(FuzzyError::MissingInput {
            variable: "c".into(),
            term: "c1".into(),
        })
    );
}

#[test]
fn test_expression_connect() {
    let (vars, terms) = doubled(&["a", "b", "c", "d", "e"]);
    let inputs: Inputs = vars.iter().cloned().zip([1., 2., 3., 4., 5.]).collect();
    let t = |i: usize| terms[i].clone();

    let exp = Expression::from(t(0)).connect(t(1), Connector::ZadehOr);
    assert_eq!(exp.evaluate(&inputs), Ok(4.));
    assert_eq!(exp.premises().len(), 2);

    let exp = Expression::new(vec![t(0).into(), t(1).into()], None).connect(t(2), Connector::ZadehOr);
    assert_eq!(exp.evaluate(&inputs), Ok(6.));
    assert_eq!(exp.premises().len(), 3);

    // 2 * min(max(min(max(1, 2), 3), 4), 5)
    let exp = Expression::from(t(0))
        .connect(t(1), Connector::ZadehOr)
        .connect(t(2), Connector::ZadehAnd)
        .connect(t(3), Connector::ZadehOr)
        .connect(t(4), Connector::ZadehAnd);
    assert_eq!(exp.evaluate(&inputs), Ok(8.));

    let exp = t(0).and(t(1)).and(t(2));
    assert_eq!(exp.premises().len(), 3);
    assert_eq!(exp.connector(), Some(Connector::ZadehAnd));

    // Negated expressions are never extended
    let exp = t(0).and(t(1)).not().and(t(2));
    assert_eq!(exp.premises().len(), 2);
    assert!(!exp.is_negated());
    assert_eq!(exp.premises()[0].terms().len(), 2);
}

#[test]
fn test_premise_terms() {
    let (_, terms) = doubled(&["a", "b", "c", "d"]);
    let t = |i: usize| terms[i].clone();

    let premise = Premise::from(t(0).and(t(1)).or(t(2).and(t(3))).not());
    let names: Vec<&str> = premise.terms().iter().map(|t| t.name()).collect();

    assert_eq!(names, ["a1", "b1", "c1", "d1"]);
    assert_eq!(Premise::from(t(2)).terms().len(), 1);
}
