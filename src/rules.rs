use crate::error::Result;
use crate::expression::Premise;
use crate::inputs::Inputs;
use crate::ops::Implication;
use crate::variable::Term;

/// `if antecedent then consequents`, linked by an implication operator.
#[derive(Clone, Debug)]
pub struct Rule {
    antecedent: Premise,
    implication: Implication,
    consequents: Vec<Term>,
}

impl Rule {
    pub fn new(antecedent: impl Into<Premise>, implication: Implication, consequents: Vec<Term>) -> Self {
        Rule {
            antecedent: antecedent.into(),
            implication,
            consequents,
        }
    }

    pub fn antecedent(&self) -> &Premise {
        &self.antecedent
    }

    pub fn implication(&self) -> Implication {
        self.implication
    }

    /// Fires the rule: every consequent is returned as a new term whose
    /// function is implied by the truth degree of the antecedent. The stored
    /// consequents are left untouched.
    pub fn evaluate(&self, inputs: &Inputs) -> Result<Vec<Term>> {
        let y = self.antecedent.evaluate(inputs)?;

        Ok(self
            .consequents
            .iter()
            .map(|term| {
                let function = self.implication.call(term.function(), y);

                Term::with_function(term.variable().clone(), term.name().to_owned(), function)
            })
            .collect())
    }

    /// Leaf terms of the antecedent, depth first.
    pub fn inputs(&self) -> Vec<&Term> {
        self.antecedent.terms()
    }

    pub fn outputs(&self) -> &[Term] {
        &self.consequents
    }
}

#[cfg(test)]
fn plus_one(ids: &[&str]) -> Vec<Term> {
    use crate::membership::MembershipFunction;
    use crate::universe::Universe;
    use crate::variable::Variable;

    ids.iter()
        .map(|id| {
            let f = MembershipFunction::new(|x| x + 1.);
            let name = format!("{id}1");
            let var = Variable::new(*id, Universe::empty(), [(name.clone(), f)]).unwrap();

            var.is(&name).unwrap()
        })
        .collect()
}

#[test]
fn test_rule_evaluate() {
    let terms = plus_one(&["a", "b", "c"]);
    let (a, b, c) = (terms[0].clone(), terms[1].clone(), terms[2].clone());
    let inputs: Inputs = [(a.variable().clone(), 0.), (b.variable().clone(), 4.)].into_iter().collect();

    // min(0 + 1, 4 + 1) = 1
    let rule = Rule::new(a.clone().and(b.clone()), Implication::Prod, vec![c.clone()]);
    let results = rule.evaluate(&inputs).unwrap();

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].name(), "c1");
    assert_eq!(results[0].variable(), c.variable());
    assert_eq!(results[0].function().call(2.), 3.);

    let rule = Rule::new(a.clone().and(b.clone()).not(), Implication::Prod, vec![c.clone()]);
    let results = rule.evaluate(&inputs).unwrap();

    assert_eq!(results[0].function().call(2.), 0.);
    // Stored consequents are untouched
    assert_eq!(rule.outputs()[0].function().call(2.), 3.);

    let rule = Rule::new(a.clone().or(c.clone()), Implication::Min, vec![b]);

    assert!(rule.evaluate(&inputs).is_err());
    assert_eq!(rule.inputs().iter().map(|t| t.name()).collect::<Vec<_>>(), ["a1", "c1"]);
}

#[test]
fn test_rule_without_consequents() {
    let terms = plus_one(&["a"]);
    let inputs: Inputs = [(terms[0].variable().clone(), 0.5)].into_iter().collect();
    let rule = Rule::new(terms[0].clone(), Implication::Min, Vec::new());

    assert!(rule.evaluate(&inputs).unwrap().is_empty());
}
