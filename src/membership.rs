use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{FuzzyError, Result};
use crate::math::interp;

type Func = dyn Fn(f64) -> f64 + Send + Sync;

/// A membership function `f: R -> [0, 1]`. The range is not enforced: scaled
/// or custom functions may leave it.
///
/// Functions are immutable and cheap to clone; every combinator returns a new
/// function wrapping its operands.
#[derive(Clone)]
pub struct MembershipFunction(Arc<Func>);

impl MembershipFunction {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(f64) -> f64 + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    pub fn constant(k: f64) -> Self {
        Self::new(move |_| k)
    }

    pub fn triangular(a: f64, b: f64, c: f64) -> Result<Self> {
        Shape::Triangular { a, b, c }.build()
    }

    pub fn trapezoid(a: f64, b: f64, c: f64, d: f64) -> Result<Self> {
        Shape::Trapezoid { a, b, c, d }.build()
    }

    pub fn step_up(a: f64, b: f64) -> Result<Self> {
        Shape::StepUp { a, b }.build()
    }

    pub fn step_down(a: f64, b: f64) -> Result<Self> {
        Shape::StepDown { a, b }.build()
    }

    pub fn gauss(sigma: f64, c: f64) -> Result<Self> {
        Shape::Gauss { sigma, c }.build()
    }

    pub fn gbell(a: f64, b: f64, c: f64) -> Result<Self> {
        Shape::GBell { a, b, c }.build()
    }

    pub fn sigmoid(a: f64, c: f64) -> Result<Self> {
        Shape::Sigmoid { a, c }.build()
    }

    pub fn points(points: impl Into<Vec<(f64, f64)>>) -> Result<Self> {
        Shape::Points {
            points: points.into(),
        }
        .build()
    }

    #[inline]
    pub fn call(&self, x: f64) -> f64 {
        (self.0)(x)
    }

    /// Combines both functions point by point with a custom reducer,
    /// e.g. `fs1.aggregate(&fs2, f64::max)`.
    pub fn aggregate<Op>(&self, other: &Self, op: Op) -> Self
    where
        Op: Fn(f64, f64) -> f64 + Send + Sync + 'static,
    {
        let (lhs, rhs) = (self.clone(), other.clone());

        Self::new(move |x| op(lhs.call(x), rhs.call(x)))
    }

    pub fn union(&self, other: &Self) -> Self {
        self.aggregate(other, f64::max)
    }

    pub fn intersection(&self, other: &Self) -> Self {
        self.aggregate(other, f64::min)
    }

    pub fn complement(&self) -> Self {
        let inner = self.clone();

        Self::new(move |x| 1. - inner.call(x))
    }

    /// Truncates the function at `k`.
    pub fn min(&self, k: f64) -> Self {
        let inner = self.clone();

        Self::new(move |x| f64::min(inner.call(x), k))
    }

    /// Scales the function by `k`.
    pub fn multiply(&self, k: f64) -> Self {
        let inner = self.clone();

        Self::new(move |x| inner.call(x) * k)
    }
}

impl fmt::Debug for MembershipFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("MembershipFunction(..)")
    }
}

/// Parametric membership function builders.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Shape {
    /// ▁/\▁ rising on `(a, b]`, falling on `[b, c)`
    Triangular { a: f64, b: f64, c: f64 },
    /// ▁/▔\▁ rising on `(a, b]`, plateau on `[b, c]`, falling on `[c, d)`
    Trapezoid { a: f64, b: f64, c: f64, d: f64 },
    /// ▁/▔
    StepUp { a: f64, b: f64 },
    /// ▔\▁
    StepDown { a: f64, b: f64 },
    /// `exp(-(x - c)² / 2σ²)`
    Gauss { sigma: f64, c: f64 },
    /// Generalized bell: `1 / (1 + |(x - c) / a|^2b)`
    #[serde(rename = "gbell")]
    GBell { a: f64, b: f64, c: f64 },
    /// Logistic curve centered on `c`; S-shaped when `a > 0`, Z-shaped when `a < 0`
    Sigmoid { a: f64, c: f64 },
    /// Piecewise-linear through `(x, y)` coordinates sorted by `x`
    Points { points: Vec<(f64, f64)> },
}

impl Shape {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Triangular { .. } => "tri",
            Self::Trapezoid { .. } => "trap",
            Self::StepUp { .. } => "step-up",
            Self::StepDown { .. } => "step-down",
            Self::Gauss { .. } => "gauss",
            Self::GBell { .. } => "gbell",
            Self::Sigmoid { .. } => "sigmoid",
            Self::Points { .. } => "points",
        }
    }

    pub fn validate(&self) -> Result<()> {
        let sorted = |params: &[f64]| {
            if params.windows(2).all(|w| w[0] <= w[1]) {
                Ok(())
            } else {
                Err(self.param_error("params shall be sorted"))
            }
        };

        match self {
            Self::Triangular { a, b, c } => sorted(&[*a, *b, *c]),
            Self::Trapezoid { a, b, c, d } => sorted(&[*a, *b, *c, *d]),
            Self::StepUp { a, b } | Self::StepDown { a, b } => sorted(&[*a, *b]),
            Self::Gauss { sigma: scale, .. } | Self::GBell { a: scale, .. } => {
                if !scale.is_finite() {
                    Err(self.param_error("first parameter must be finite"))
                } else if *scale == 0. {
                    Err(self.param_error("first parameter must be non zero"))
                } else {
                    Ok(())
                }
            },
            Self::Sigmoid { .. } => Ok(()),
            Self::Points { points } => {
                if points.is_empty() {
                    return Err(self.param_error("at least 1 point expected"));
                }

                sorted(&points.iter().map(|(x, _)| *x).collect::<Vec<_>>())
            },
        }
    }

    #[inline]
    pub fn call(&self, x: f64) -> f64 {
        match *self {
            Self::Triangular { a, b, c } => {
                if a < x && x <= b {
                    (x - a) / (b - a)
                } else if b <= x && x < c {
                    (c - x) / (c - b)
                } else {
                    0.
                }
            },
            Self::Trapezoid { a, b, c, d } => {
                if a < x && x <= b {
                    (x - a) / (b - a)
                } else if b <= x && x <= c {
                    1.
                } else if c <= x && x < d {
                    (d - x) / (d - c)
                } else {
                    0.
                }
            },
            Self::StepUp { a, b } => {
                if x >= b {
                    1.
                } else if a < x {
                    (x - a) / (b - a)
                } else {
                    0.
                }
            },
            Self::StepDown { a, b } => {
                if x <= a {
                    1.
                } else if x < b {
                    (b - x) / (b - a)
                } else {
                    0.
                }
            },
            Self::Gauss { sigma, c } => (-(x - c).powi(2) / (2. * sigma.powi(2))).exp(),
            Self::GBell { a, b, c } => 1. / (1. + ((x - c) / a).abs().powf(2. * b)),
            Self::Sigmoid { a, c } => 1. / (1. + (-a * (x - c)).exp()),
            Self::Points { ref points } => interp(x, points),
        }
    }

    /// Validates the parameters and turns the shape into a membership function.
    pub fn build(self) -> Result<MembershipFunction> {
        self.validate()?;

        Ok(MembershipFunction::new(move |x| self.call(x)))
    }

    fn param_error(&self, reason: &'static str) -> FuzzyError {
        FuzzyError::ParamOrder {
            shape: self.name(),
            reason,
        }
    }
}

#[test]
fn test_triangular() {
    let fs = MembershipFunction::triangular(1., 2., 4.).unwrap();

    assert_eq!(fs.call(0.), 0.);
    assert_eq!(fs.call(1.), 0.);
    assert_eq!(fs.call(1.5), 0.5);
    assert_eq!(fs.call(2.), 1.);
    assert_eq!(fs.call(3.), 0.5);
    assert_eq!(fs.call(4.), 0.);
    assert_eq!(fs.call(5.), 0.);

    // Degenerated left side
    let fs = MembershipFunction::triangular(50., 50., 60.).unwrap();

    assert_eq!(fs.call(50.), 1.);
    assert_eq!(fs.call(55.), 0.5);
}

#[test]
fn test_trapezoid() {
    let fs = MembershipFunction::trapezoid(0., 2., 4., 8.).unwrap();

    assert_eq!(fs.call(-1.), 0.);
    assert_eq!(fs.call(1.), 0.5);
    assert_eq!(fs.call(2.), 1.);
    assert_eq!(fs.call(3.), 1.);
    assert_eq!(fs.call(4.), 1.);
    assert_eq!(fs.call(6.), 0.5);
    assert_eq!(fs.call(8.), 0.);
}

#[test]
fn test_steps() {
    let up = MembershipFunction::step_up(1., 3.).unwrap();
    let down = MembershipFunction::step_down(1., 3.).unwrap();

    for (x, y) in [(0., 0.), (1., 0.), (2., 0.5), (3., 1.), (10., 1.)] {
        assert_eq!(up.call(x), y);
        assert_eq!(down.call(x), 1. - y);
    }
}

#[test]
fn test_curves() {
    use approx::assert_abs_diff_eq;

    let gauss = MembershipFunction::gauss(2., 5.).unwrap();

    assert_eq!(gauss.call(5.), 1.);
    assert_abs_diff_eq!(gauss.call(7.), (-0.5f64).exp(), epsilon = 1e-12);
    assert_abs_diff_eq!(gauss.call(3.), gauss.call(7.), epsilon = 1e-12);

    let gbell = MembershipFunction::gbell(2., 4., 6.).unwrap();

    assert_eq!(gbell.call(6.), 1.);
    assert_eq!(gbell.call(4.), 0.5);
    assert_eq!(gbell.call(8.), 0.5);

    let s = MembershipFunction::sigmoid(2., 4.).unwrap();
    let z = MembershipFunction::sigmoid(-2., 4.).unwrap();

    assert_eq!(s.call(4.), 0.5);
    assert!(s.call(0.) < 0.01 && s.call(8.) > 0.99);
    assert!(z.call(0.) > 0.99 && z.call(8.) < 0.01);
}

#[test]
fn test_points() {
    let fs = MembershipFunction::points([(175., 0.), (180., 0.2), (185., 0.7), (190., 1.)]).unwrap();

    assert_eq!(fs.call(150.), 0.);
    assert_eq!(fs.call(180.), 0.2);
    assert_eq!(fs.call(200.), 1.);
}

#[test]
fn test_builder_errors() {
    let unsorted = |shape: &'static str| FuzzyError::ParamOrder {
        shape,
        reason: "params shall be sorted",
    };
    let zero = |shape: &'static str| FuzzyError::ParamOrder {
        shape,
        reason: "first parameter must be non zero",
    };

    assert_eq!(MembershipFunction::triangular(3., 2., 4.).unwrap_err(), unsorted("tri"));
    assert_eq!(MembershipFunction::trapezoid(1., 2., 4., 3.).unwrap_err(), unsorted("trap"));
    assert_eq!(MembershipFunction::step_up(2., 1.).unwrap_err(), unsorted("step-up"));
    assert_eq!(MembershipFunction::step_down(2., 1.).unwrap_err(), unsorted("step-down"));
    assert_eq!(MembershipFunction::triangular(f64::NAN, 2., 4.).unwrap_err(), unsorted("tri"));
    assert_eq!(MembershipFunction::gauss(0., 1.).unwrap_err(), zero("gauss"));
    assert_eq!(MembershipFunction::gbell(0., 1., 1.).unwrap_err(), zero("gbell"));

    let infinite = |shape: &'static str| FuzzyError::ParamOrder {
        shape,
        reason: "first parameter must be finite",
    };

    assert_eq!(MembershipFunction::gauss(f64::NAN, 1.).unwrap_err(), infinite("gauss"));
    assert_eq!(MembershipFunction::gauss(f64::INFINITY, 1.).unwrap_err(), infinite("gauss"));
    assert_eq!(MembershipFunction::gbell(f64::NAN, 1., 1.).unwrap_err(), infinite("gbell"));
    assert_eq!(
        MembershipFunction::points([(2., 0.), (1., 1.)]).unwrap_err(),
        unsorted("points")
    );
    assert_eq!(
        MembershipFunction::points(Vec::new()).unwrap_err(),
        FuzzyError::ParamOrder {
            shape: "points",
            reason: "at least 1 point expected",
        }
    );
}

#[test]
fn test_combinators() {
    let fs = MembershipFunction::new(|x| x);

    assert_eq!(fs.min(0.3).call(0.5), 0.3);
    assert_eq!(fs.min(0.3).call(0.2), 0.2);
    assert_eq!(fs.multiply(0.5).call(0.5), 0.25);
    assert_eq!(fs.complement().call(0.25), 0.75);
    assert_eq!(fs.aggregate(&MembershipFunction::constant(2.), |a, b| a * b).call(0.25), 0.5);
}

#[test]
fn test_shape_serde() {
    let shape: Shape = serde_json::from_str(r#"{"type": "triangular", "a": 0, "b": 1, "c": 2}"#).unwrap();

    assert_eq!(shape, Shape::Triangular { a: 0., b: 1., c: 2. });

    let shape: Shape = serde_json::from_str(r#"{"type": "gbell", "a": 1, "b": 2, "c": 3}"#).unwrap();

    assert_eq!(shape, Shape::GBell { a: 1., b: 2., c: 3. });

    let shape: Shape = serde_json::from_str(r#"{"type": "points", "points": [[0, 1], [1, 0]]}"#).unwrap();

    assert_eq!(shape.build().unwrap().call(0.5), 0.5);
}

#[cfg(test)]
mod properties {
    use proptest::prelude::*;

    use super::MembershipFunction;

    fn shapes() -> impl Strategy<Value = MembershipFunction> {
        prop_oneof![
            (-50.0..50.0f64, 0.1..20.0f64, 0.1..20.0f64)
                .prop_map(|(a, l, r)| MembershipFunction::triangular(a, a + l, a + l + r).unwrap()),
            (-50.0..50.0f64, 0.1..20.0f64)
                .prop_map(|(c, sigma)| MembershipFunction::gauss(sigma, c).unwrap()),
            (-50.0..50.0f64, 0.1..20.0f64).prop_map(|(a, w)| MembershipFunction::step_up(a, a + w).unwrap()),
        ]
    }

    proptest! {
        #[test]
        fn triangular_vertices(a in -100.0..100.0f64, left in 0.1..50.0f64, right in 0.1..50.0f64) {
            let (b, c) = (a + left, a + left + right);
            let fs = MembershipFunction::triangular(a, b, c).unwrap();

            prop_assert_eq!(fs.call(a), 0.);
            prop_assert_eq!(fs.call(b), 1.);
            prop_assert_eq!(fs.call(c), 0.);
            prop_assert!((fs.call((a + b) / 2.) - 0.5).abs() < 1e-9);
            prop_assert!((fs.call((b + c) / 2.) - 0.5).abs() < 1e-9);
        }

        #[test]
        fn double_complement(fs in shapes(), x in -100.0..100.0f64) {
            let twice = fs.complement().complement();

            prop_assert!((twice.call(x) - fs.call(x)).abs() < 1e-12);
        }

        #[test]
        fn union_and_intersection(fs1 in shapes(), fs2 in shapes(), x in -100.0..100.0f64) {
            prop_assert_eq!(fs1.union(&fs2).call(x), f64::max(fs1.call(x), fs2.call(x)));
            prop_assert_eq!(fs1.intersection(&fs2).call(x), f64::min(fs1.call(x), fs2.call(x)));
        }
    }
}
