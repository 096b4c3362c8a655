//! Plain data descriptions of inference methods and variables, loadable with
//! any serde format.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::membership::Shape;
use crate::ops::{Aggregation, Defuzzification, Implication, Operator};
use crate::universe::Universe;
use crate::variable::Variable;

/// How rules are connected, implied, aggregated and defuzzified.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InferenceConfig {
    pub operator: Operator,
    pub implication: Implication,
    pub aggregation: Aggregation,
    pub defuzzification: Defuzzification,
}

impl InferenceConfig {
    /// Zadeh logic, min implication, union and centroid.
    pub fn mamdani() -> Self {
        Self::default()
    }

    /// Same as [`InferenceConfig::mamdani`] with product implication.
    pub fn sugeno() -> Self {
        Self {
            implication: Implication::Prod,
            ..Self::default()
        }
    }
}

/// Sampling of a variable universe, either every `step` or `count` points.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum UniverseConfig {
    Step { min: f64, max: f64, step: f64 },
    Count { min: f64, max: f64, count: usize },
}

impl UniverseConfig {
    pub fn build(&self) -> Result<Universe> {
        match *self {
            Self::Step { min, max, step } => Universe::with_step(min, max, step),
            Self::Count { min, max, count } => Universe::with_count(min, max, count),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TermConfig {
    pub name: String,
    pub shape: Shape,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct VariableConfig {
    pub id: String,
    pub universe: UniverseConfig,
    #[serde(default)]
    pub terms: Vec<TermConfig>,
}

impl VariableConfig {
    pub fn build(&self) -> Result<Variable> {
        let terms = self.terms.iter().map(|term| (term.name.clone(), term.shape.clone()));

        Variable::from_shapes(self.id.clone(), self.universe.build()?, terms)
    }
}

#[test]
fn test_inference_config() {
    let config: InferenceConfig = serde_json::from_str("{}").unwrap();

    assert_eq!(config, InferenceConfig::mamdani());

    let config: InferenceConfig =
        serde_json::from_str(r#"{"operator": "hyperbolic", "defuzzification": "smallest_of_maxs"}"#).unwrap();

    assert_eq!(config.operator, Operator::Hyperbolic);
    assert_eq!(config.implication, Implication::Min);
    assert_eq!(config.defuzzification, Defuzzification::SmallestOfMaxs);

    let json = serde_json::to_string(&InferenceConfig::sugeno()).unwrap();

    assert_eq!(
        json,
        r#"{"operator":"zadeh","implication":"prod","aggregation":"union","defuzzification":"centroid"}"#
    );
}

#[test]
fn test_variable_config() {
    let config: VariableConfig = serde_json::from_str(
        r#"{
            "id": "temperature",
            "universe": {"min": 0, "max": 40, "step": 0.5},
            "terms": [
                {"name": "cold", "shape": {"type": "step_down", "a": 10, "b": 20}},
                {"name": "warm", "shape": {"type": "gauss", "sigma": 5, "c": 20}},
                {"name": "hot", "shape": {"type": "step_up", "a": 20, "b": 30}}
            ]
        }"#,
    )
    .unwrap();

    assert_eq!(config.universe, UniverseConfig::Step { min: 0., max: 40., step: 0.5 });

    let temp = config.build().unwrap();

    assert_eq!(temp.id(), "temperature");
    assert_eq!(temp.universe().len(), 81);
    assert_eq!(temp.terms().count(), 3);
    assert_eq!(temp.is("warm").unwrap().function().call(20.), 1.);

    let counted: UniverseConfig = serde_json::from_str(r#"{"min": -10, "max": 10, "count": 100}"#).unwrap();

    assert_eq!(counted.build().unwrap().len(), 100);
}

#[test]
fn test_variable_config_errors() {
    use crate::error::FuzzyError;

    let config = VariableConfig {
        id: "v".into(),
        universe: UniverseConfig::Step {
            min: 1.,
            max: 0.,
            step: 0.1,
        },
        terms: Vec::new(),
    };

    assert_eq!(config.build().unwrap_err(), FuzzyError::InvalidUniverse("min shall be <= max"));

    let config = VariableConfig {
        universe: UniverseConfig::Count {
            min: 0.,
            max: 1.,
            count: 10,
        },
        terms: vec![TermConfig {
            name: "flat".into(),
            shape: Shape::Gauss { sigma: 0., c: 0. },
        }],
        ..config
    };

    assert!(matches!(config.build(), Err(FuzzyError::InvalidTerm { term, .. }) if term == "flat"));
}
