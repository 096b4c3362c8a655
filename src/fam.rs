use std::collections::HashSet;

use crate::config::InferenceConfig;
use crate::engine::Engine;
use crate::error::{FuzzyError, Result};
use crate::expression::Expression;
use crate::rules::Rule;
use crate::variable::Variable;

/// Fuzzy associative matrix: writes one `if a and b then c` rule per cell of
/// a table.
#[derive(Clone, Debug, Default)]
pub struct FuzzyAssociativeMatrix {
    config: InferenceConfig,
    rules: Vec<Rule>,
}

impl FuzzyAssociativeMatrix {
    pub fn new(config: InferenceConfig) -> Self {
        FuzzyAssociativeMatrix {
            config,
            rules: Vec::new(),
        }
    }

    pub fn associate<'m>(
        &'m mut self,
        if_var: &Variable,
        and_var: &Variable,
        then_var: &Variable,
    ) -> Association<'m> {
        Association {
            fam: self,
            if_var: if_var.clone(),
            and_var: and_var.clone(),
            then_var: then_var.clone(),
        }
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn engine(self) -> Result<Engine> {
        Engine::new(self.rules, self.config.aggregation, self.config.defuzzification)
    }
}

/// Three variables waiting for their table.
#[derive(Debug)]
pub struct Association<'m> {
    fam: &'m mut FuzzyAssociativeMatrix,
    if_var: Variable,
    and_var: Variable,
    then_var: Variable,
}

impl Association<'_> {
    /// `if_terms` are the column headers, each row starts with its `and`
    /// term followed by one `then` term per column. Empty cells produce no
    /// rule. Column and row headers must be unique.
    ///
    /// ```text
    ///          | a1 | a2
    ///     -----|----|----
    ///       b1 | c1 | c2
    ///       b2 | c3 |
    /// ```
    ///
    /// Nothing is added unless the whole table is valid.
    pub fn matrix<'t, R>(self, if_terms: &[&str], rows: impl IntoIterator<Item = (&'t str, R)>) -> Result<()>
    where
        R: AsRef<[&'t str]>,
    {
        let mut headers = HashSet::with_capacity(if_terms.len());

        for name in if_terms {
            if !headers.insert(*name) {
                return Err(FuzzyError::DuplicateHeader {
                    statement: "if",
                    header: (*name).to_owned(),
                });
            }
        }

        let columns = if_terms
            .iter()
            .map(|name| self.if_var.is(name))
            .collect::<Result<Vec<_>>>()?;
        let and = self.fam.config.operator.and();
        let mut rows_seen = HashSet::new();
        let mut rules = Vec::new();

        for (and_name, cells) in rows {
            let cells = cells.as_ref();

            if !rows_seen.insert(and_name) {
                return Err(FuzzyError::DuplicateHeader {
                    statement: "and",
                    header: and_name.to_owned(),
                });
            }

            if cells.len() != columns.len() {
                return Err(FuzzyError::RuleSizeMismatch {
                    found: cells.len(),
                    expected: columns.len(),
                });
            }

            let and_term = self.and_var.is(and_name)?;

            for (if_term, then_name) in columns.iter().zip(cells) {
                if then_name.is_empty() {
                    continue;
                }

                let premise = Expression::new(vec![if_term.clone().into(), and_term.clone().into()], Some(and));
                let then = self.then_var.is(then_name)?;

                rules.push(Rule::new(premise, self.fam.config.implication, vec![then]));
            }
        }

        self.fam.rules.extend(rules);

        Ok(())
    }
}

#[cfg(test)]
fn identities(id: &str, terms: &[&str]) -> Variable {
    use crate::membership::MembershipFunction;
    use crate::universe::Universe;

    Variable::new(
        id,
        Universe::empty(),
        terms.iter().map(|term| (*term, MembershipFunction::new(|x| x))),
    )
    .unwrap()
}

#[cfg(test)]
fn compact(rules: &[Rule]) -> Vec<String> {
    rules
        .iter()
        .map(|rule| {
            let inputs: Vec<&str> = rule.inputs().iter().map(|t| t.name()).collect();
            let outputs: Vec<&str> = rule.outputs().iter().map(|t| t.name()).collect();

            format!("{}=>{}", inputs.join("."), outputs.join("."))
        })
        .collect()
}

#[test]
fn test_fam_rules() {
    let a = identities("a", &["a1", "a2"]);
    let b = identities("b", &["b1", "b2", "b3"]);
    let c = identities("c", &["c1", "c2", "c3", "c4"]);

    let mut fam = FuzzyAssociativeMatrix::new(InferenceConfig::mamdani());

    fam.associate(&a, &b, &c)
        .matrix(&["a1", "a2"], [("b1", ["c1", "c2"]), ("b2", ["c3", "c4"]), ("b3", ["c3", "c2"])])
        .unwrap();

    assert_eq!(
        compact(fam.rules()),
        ["a1.b1=>c1", "a2.b1=>c2", "a1.b2=>c3", "a2.b2=>c4", "a1.b3=>c3", "a2.b3=>c2"]
    );

    let mut fam = FuzzyAssociativeMatrix::new(InferenceConfig::mamdani());

    fam.associate(&a, &b, &c)
        .matrix(&["a1", "a2"], [("b1", ["c1", "c2"]), ("b2", ["c3", ""]), ("b3", ["", "c2"])])
        .unwrap();

    assert_eq!(compact(fam.rules()), ["a1.b1=>c1", "a2.b1=>c2", "a1.b2=>c3", "a2.b3=>c2"]);
    assert!(fam.engine().is_ok());
}

#[test]
fn test_fam_errors() {
    let a = identities("a", &["a1", "a2"]);
    let b = identities("b", &["b1", "b2", "b3"]);
    let c = identities("c", &["c1", "c2", "c3", "c4"]);
    let mut fam = FuzzyAssociativeMatrix::new(InferenceConfig::mamdani());

    let err = fam
        .associate(&a, &b, &c)
        .matrix(&["a1", "a2"], [("b1", vec!["c1", "c2"]), ("b2", vec!["c3"])])
        .unwrap_err();

    assert_eq!(err.to_string(), "rule, sizes should be the same (found: 1, expected: 2)");

    let err = fam
        .associate(&a, &b, &c)
        .matrix(&["a1", "a1"], [("b1", ["c1", "c2"])])
        .unwrap_err();

    assert_eq!(
        err,
        FuzzyError::DuplicateHeader {
            statement: "if",
            header: "a1".into(),
        }
    );

    let err = fam
        .associate(&a, &b, &c)
        .matrix(&["a1", "a2"], [("b1", ["c1", "c2"]), ("b2", ["c3", "c4"]), ("b1", ["c2", "c1"])])
        .unwrap_err();

    assert_eq!(err.to_string(), "'and' statement, duplicated header `b1`");

    let err = fam
        .associate(&a, &b, &c)
        .matrix(&["a1", "a0"], [("b1", ["c1", "c2"])])
        .unwrap_err();

    assert_eq!(
        err,
        FuzzyError::UnknownTerm {
            variable: "a".into(),
            term: "a0".into(),
        }
    );

    let err = fam
        .associate(&a, &b, &c)
        .matrix(&["a1", "a2"], [("b1", ["c1", "c2"]), ("b4", ["c3", "c2"])])
        .unwrap_err();

    assert_eq!(err.to_string(), "term `b4` not found in variable `b`");

    let err = fam
        .associate(&a, &b, &c)
        .matrix(&["a1", "a2"], [("b1", ["c1", "c7"])])
        .unwrap_err();

    assert_eq!(err.to_string(), "term `c7` not found in variable `c`");

    // Failed tables leave no partial rules behind
    assert!(fam.rules().is_empty());
}

#[test]
fn test_fam_hit_points() {
    use approx::assert_abs_diff_eq;

    use crate::inputs::Inputs;
    use crate::membership::Shape;
    use crate::universe::Universe;

    let levels = |unit: &str| {
        let names = ["Very low", "Low", "Medium", "High", "Very high"].map(|level| format!("{level} {unit}"));
        let shapes = [
            Shape::StepDown { a: 0., b: 20. },
            Shape::Trapezoid { a: 0., b: 20., c: 40., d: 60. },
            Shape::Triangular { a: 50., b: 50., c: 60. },
            Shape::Trapezoid { a: 40., b: 60., c: 80., d: 100. },
            Shape::StepUp { a: 80., b: 100. },
        ];

        Variable::from_shapes(unit, Universe::with_count(0., 100., 1000).unwrap(), names.into_iter().zip(shapes))
            .unwrap()
    };
    let hp = levels("HP");
    let fp = levels("FP");
    let act = Variable::from_shapes(
        "Act",
        Universe::with_count(-10., 10., 100).unwrap(),
        [
            ("Retreat!", Shape::StepDown { a: -10., b: -5. }),
            ("Defend", Shape::Triangular { a: -10., b: -5., c: 5. }),
            ("Attack", Shape::Triangular { a: -5., b: 5., c: 10. }),
            ("Full attack!", Shape::StepUp { a: 5., b: 10. }),
        ],
    )
    .unwrap();

    let mut fam = FuzzyAssociativeMatrix::new(InferenceConfig::mamdani());

    fam.associate(&hp, &fp, &act)
        .matrix(
            &["Very low HP", "Low HP", "Medium HP", "High HP", "Very high HP"],
            [
                ("Very low FP", ["Retreat!", "Retreat!", "Defend", "Defend", "Defend"]),
                ("Low FP", ["Retreat!", "Defend", "Defend", "Attack", "Attack"]),
                ("Medium FP", ["Retreat!", "Defend", "Attack", "Attack", "Full attack!"]),
                ("High FP", ["Retreat!", "Defend", "Attack", "Attack", "Full attack!"]),
                ("Very high FP", ["Defend", "Attack", "Attack", "Full attack!", "Full attack!"]),
            ],
        )
        .unwrap();

    let engine = fam.engine().unwrap();
    let inputs: Inputs = [(hp, 75.), (fp, 30.)].into_iter().collect();
    let outputs = engine.evaluate(&inputs).unwrap();

    assert_abs_diff_eq!(outputs.get(&act).unwrap(), 3.3326461897890463, epsilon = 1e-9);
}
