//! Fuzzy logic inference.
//!
//! [`Variable`]s own named terms backed by [`MembershipFunction`]s. [`Rule`]s
//! connect terms with fuzzy operators, an [`Engine`] fires a rule base and
//! defuzzifies its results, and a [`System`] chains engines in the order
//! their variables depend on each other.
//!
//! ```
//! use fuzzy_inference::{FuzzyLogic, InferenceConfig, Inputs, Shape, Universe, Variable};
//!
//! let universe = Universe::with_step(0., 40., 0.5)?;
//! let temp = Variable::from_shapes(
//!     "temperature",
//!     universe.clone(),
//!     [("cold", Shape::StepDown { a: 10., b: 20. }), ("hot", Shape::StepUp { a: 20., b: 30. })],
//! )?;
//! let fan = Variable::from_shapes(
//!     "fan",
//!     universe,
//!     [("slow", Shape::StepDown { a: 10., b: 30. }), ("fast", Shape::StepUp { a: 10., b: 30. })],
//! )?;
//!
//! let mut logic = FuzzyLogic::new(InferenceConfig::mamdani());
//!
//! logic.when(temp.is("cold")?).then([fan.is("slow")?]);
//! logic.when(temp.is("hot")?).then([fan.is("fast")?]);
//!
//! let engine = logic.engine()?;
//! let outputs = engine.evaluate(&[(temp, 35.)].into_iter().collect::<Inputs>())?;
//!
//! assert!(outputs.get(&fan).is_some_and(|speed| speed > 20.));
//! # Ok::<(), fuzzy_inference::FuzzyError>(())
//! ```

mod config;
mod defuzzer;
mod dsl;
mod engine;
mod error;
mod expression;
mod fam;
mod graph;
mod inputs;
mod linspace;
mod math;
mod membership;
mod ops;
mod outputs;
mod rules;
mod system;
mod universe;
mod variable;

pub use config::{InferenceConfig, TermConfig, UniverseConfig, VariableConfig};
pub use defuzzer::Defuzzer;
pub use dsl::{Builder, Clause, FuzzyLogic, Statement};
pub use engine::Engine;
pub use error::{FuzzyError, Result};
pub use expression::{Expression, Premise};
pub use fam::{Association, FuzzyAssociativeMatrix};
pub use graph::{DirectedGraph, NodeKey};
pub use inputs::Inputs;
pub use membership::{MembershipFunction, Shape};
pub use ops::{Aggregation, Connector, Defuzzification, Implication, Operator};
pub use outputs::Outputs;
pub use rules::Rule;
pub use system::System;
pub use universe::Universe;
pub use variable::{Term, Variable};
