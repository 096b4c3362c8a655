use num::Float;
use serde::{Deserialize, Serialize};

use crate::membership::MembershipFunction;
use crate::universe::Universe;

/// Binary fuzzy logic operator combining the truth degrees of two premises.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Connector {
    /// `min(a, b)`
    ZadehAnd,
    /// `max(a, b)`
    ZadehOr,
    /// `a + b - 2 min(a, b)`
    ZadehXor,
    /// `1 - min(a, b)`
    ZadehNand,
    /// `1 - max(a, b)`
    ZadehNor,
    /// `a b`
    HyperbolicAnd,
    /// `a + b - a b`
    HyperbolicOr,
    /// `a + b - 2 a b`
    HyperbolicXor,
    /// `1 - a b`
    HyperbolicNand,
    /// `1 - a - b + a b`
    HyperbolicNor,
}

impl Connector {
    #[inline]
    pub fn call<F: Float>(self, a: F, b: F) -> F {
        let one = F::one();
        let two = one + one;

        match self {
            Self::ZadehAnd => F::min(a, b),
            Self::ZadehOr => F::max(a, b),
            Self::ZadehXor => a + b - two * F::min(a, b),
            Self::ZadehNand => one - F::min(a, b),
            Self::ZadehNor => one - F::max(a, b),
            Self::HyperbolicAnd => a * b,
            Self::HyperbolicOr => a + b - a * b,
            Self::HyperbolicXor => a + b - two * a * b,
            Self::HyperbolicNand => one - a * b,
            Self::HyperbolicNor => one - a - b + a * b,
        }
    }
}

/// A family of connectors sharing the same logic.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operator {
    #[default]
    Zadeh,
    /// Algebraic (product) logic
    Hyperbolic,
}

impl Operator {
    pub fn and(self) -> Connector {
        match self {
            Self::Zadeh => Connector::ZadehAnd,
            Self::Hyperbolic => Connector::HyperbolicAnd,
        }
    }

    pub fn or(self) -> Connector {
        match self {
            Self::Zadeh => Connector::ZadehOr,
            Self::Hyperbolic => Connector::HyperbolicOr,
        }
    }

    pub fn xor(self) -> Connector {
        match self {
            Self::Zadeh => Connector::ZadehXor,
            Self::Hyperbolic => Connector::HyperbolicXor,
        }
    }

    pub fn nand(self) -> Connector {
        match self {
            Self::Zadeh => Connector::ZadehNand,
            Self::Hyperbolic => Connector::HyperbolicNand,
        }
    }

    pub fn nor(self) -> Connector {
        match self {
            Self::Zadeh => Connector::ZadehNor,
            Self::Hyperbolic => Connector::HyperbolicNor,
        }
    }
}

/// Implication operator deriving a consequence from the truth degree of the
/// premise.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Implication {
    /// Mamdani truncation: `min(f(x), y)`
    #[default]
    Min,
    /// Product scaling: `f(x) * y`
    Prod,
}

impl Implication {
    pub fn call(self, consequence: &MembershipFunction, y: f64) -> MembershipFunction {
        match self {
            Self::Min => consequence.min(y),
            Self::Prod => consequence.multiply(y),
        }
    }
}

/// Method for aggregating the consequences of the fuzzy rules targeting the
/// same output.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Aggregation {
    #[default]
    Union,
    Intersection,
}

impl Aggregation {
    #[inline]
    pub fn call<F: Float>(self, a: F, b: F) -> F {
        match self {
            Self::Union => F::max(a, b),
            Self::Intersection => F::min(a, b),
        }
    }
}

/// Method for defuzzificating the resulting membership function.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Defuzzification {
    /// Center of gravity: `Σ f(x)·x / Σ f(x)`
    #[default]
    Centroid,
    /// Value splitting the area in two halves
    Bisector,
    /// Smallest value for which the membership function is maximum
    SmallestOfMaxs,
    /// Largest value for which the membership function is maximum
    LargestOfMaxs,
    /// Middle of the smallest and largest maximums
    MiddleOfMaxs,
}

impl Defuzzification {
    /// Reduces `membership` to a single crisp value sampled over `universe`.
    /// An empty universe always gives `0`.
    pub fn call(self, membership: &MembershipFunction, universe: &Universe) -> f64 {
        let xs = universe.values();
        let ys: Vec<f64> = xs.iter().map(|x| membership.call(*x)).collect();

        match self {
            Self::Centroid => centroid(xs, &ys),
            Self::Bisector => bisector(xs, &ys),
            Self::SmallestOfMaxs => maximums(xs, &ys).0,
            Self::LargestOfMaxs => maximums(xs, &ys).1,
            Self::MiddleOfMaxs => {
                let (smallest, largest) = maximums(xs, &ys);

                (smallest + largest) / 2.
            },
        }
    }
}

fn centroid(xs: &[f64], ys: &[f64]) -> f64 {
    let (num, den) = xs
        .iter()
        .zip(ys)
        .fold((0., 0.), |(num, den), (x, y)| (num + y * x, den + y));

    if den == 0. {
        return 0.;
    }

    num / den
}

// Sweeps from both ends, always growing the lighter side. On equal areas the
// side sitting on the larger sample moves first.
fn bisector(xs: &[f64], ys: &[f64]) -> f64 {
    if xs.is_empty() {
        return 0.;
    }

    let (mut i, mut j) = (0, xs.len() - 1);
    let (mut left, mut right) = (0., 0.);

    while i < j {
        let move_left = if left < right {
            true
        } else if left > right {
            false
        } else {
            ys[i] >= ys[j]
        };

        if move_left {
            left += ys[i];
            i += 1;
        } else {
            right += ys[j];
            j -= 1;
        }
    }

    xs[i]
}

// Smallest and largest x reaching the maximum, found in one simultaneous
// forward and backward scan.
// E.g:
//  x = [0 1 2 3 4 5 6 7 8 9]
//  y = [0 0 1 1 2 2 1 1 0 0]
//  smallest of max is x=4, largest of max is x=5
fn maximums(xs: &[f64], ys: &[f64]) -> (f64, f64) {
    let (mut x_smallest, mut y_smallest) = (0., 0.);
    let (mut x_largest, mut y_largest) = (0., 0.);
    let last = xs.len().saturating_sub(1);

    for (i, (x, y)) in xs.iter().zip(ys).enumerate() {
        if *y >= y_largest {
            x_largest = *x;
            y_largest = *y;
        }

        let (x2, y2) = (xs[last - i], ys[last - i]);

        if y2 >= y_smallest {
            x_smallest = x2;
            y_smallest = y2;
        }
    }

    (x_smallest, x_largest)
}

#[test]
fn test_connectors() {
    assert_eq!(Connector::ZadehAnd.call(0.3, 0.6), 0.3);
    assert_eq!(Connector::ZadehOr.call(0.3, 0.6), 0.6);
    assert_eq!(Connector::ZadehNand.call(0.25, 0.5), 0.75);
    assert_eq!(Connector::ZadehNor.call(0.25, 0.5), 0.5);
    assert_eq!(Connector::HyperbolicOr.call(0.5, 0.5), 0.75);
    assert_eq!(Connector::HyperbolicXor.call(0.5, 0.5), 0.5);
    assert_eq!(Connector::HyperbolicNand.call(0.5, 0.5), 0.75);
    assert_eq!(Connector::HyperbolicNor.call(0.5, 0.5), 0.25);

    for op in [Operator::Zadeh, Operator::Hyperbolic] {
        for connector in [op.and(), op.or(), op.xor(), op.nand(), op.nor()] {
            assert_eq!(connector.call(0f32, 0.), connector.call(0f64, 0.) as f32);
        }
    }
}

#[test]
fn test_implication() {
    let fs = MembershipFunction::new(|x| x);

    assert_eq!(Implication::Min.call(&fs, 0.4).call(0.8), 0.4);
    assert_eq!(Implication::Min.call(&fs, 0.4).call(0.2), 0.2);
    assert_eq!(Implication::Prod.call(&fs, 0.5).call(0.8), 0.4);
}

#[test]
fn test_centroid() {
    use approx::assert_abs_diff_eq;

    let universe = Universe::with_step(0., 50., 0.1).unwrap();
    let fs1 = MembershipFunction::trapezoid(10., 15., 25., 30.).unwrap();
    let fs2 = MembershipFunction::trapezoid(25., 30., 40., 45.).unwrap();

    let tri = MembershipFunction::triangular(10., 20., 30.).unwrap();
    assert_abs_diff_eq!(Defuzzification::Centroid.call(&tri, &universe), 20., epsilon = 0.01);

    let fs = fs1.min(0.5).intersection(&fs2);
    assert_abs_diff_eq!(Defuzzification::Centroid.call(&fs, &universe), 27.5, epsilon = 0.01);

    // https://www.mathworks.com/help/fuzzy/defuzzification-methods.html
    let universe = Universe::with_step(0., 20., 0.1).unwrap();
    let fs = MembershipFunction::trapezoid(0., 2., 8., 12.)
        .unwrap()
        .multiply(0.9)
        .union(&MembershipFunction::trapezoid(5., 7., 12., 14.).unwrap().multiply(0.5))
        .union(&MembershipFunction::trapezoid(12., 13., 18., 19.).unwrap().multiply(0.1));

    assert_abs_diff_eq!(Defuzzification::Centroid.call(&fs, &universe), 6.7719, epsilon = 0.01);

    let universe = Universe::with_step(-10., 10., 0.1).unwrap();
    let fs = MembershipFunction::trapezoid(-10., -8., -4., 7.).unwrap();

    assert_abs_diff_eq!(Defuzzification::Centroid.call(&fs, &universe), -3.2857, epsilon = 0.01);
}

#[test]
fn test_centroid_zero() {
    let universe = Universe::with_step(0., 10., 0.5).unwrap();

    assert_eq!(Defuzzification::Centroid.call(&MembershipFunction::constant(0.), &universe), 0.);
    assert_eq!(Defuzzification::Centroid.call(&MembershipFunction::constant(42.), &Universe::empty()), 0.);
}

#[test]
fn test_bisector() {
    use approx::assert_abs_diff_eq;

    let universe = Universe::with_step(0., 20., 0.1).unwrap();
    let scaled = MembershipFunction::trapezoid(0., 2., 8., 12.)
        .unwrap()
        .multiply(0.9)
        .union(&MembershipFunction::trapezoid(5., 7., 12., 14.).unwrap().multiply(0.5))
        .union(&MembershipFunction::trapezoid(12., 13., 18., 19.).unwrap().multiply(0.1));
    let truncated = MembershipFunction::trapezoid(0., 2., 8., 12.)
        .unwrap()
        .min(0.9)
        .union(&MembershipFunction::trapezoid(5., 7., 12., 14.).unwrap().min(0.5))
        .union(&MembershipFunction::trapezoid(12., 13., 18., 19.).unwrap().min(0.1));

    assert_abs_diff_eq!(Defuzzification::Bisector.call(&scaled, &universe), 6.3, epsilon = 0.01);
    assert_abs_diff_eq!(Defuzzification::Bisector.call(&truncated, &universe), 6.5, epsilon = 0.01);

    // Middle point of [0 ; 20]
    let constant = MembershipFunction::constant(0.42);
    assert_eq!(Defuzzification::Bisector.call(&constant, &universe), 10.);

    let left = MembershipFunction::step_down(0., 0.2).unwrap();
    assert_abs_diff_eq!(Defuzzification::Bisector.call(&left, &universe), 0.1, epsilon = 0.01);

    let right = MembershipFunction::step_up(19.8, 20.).unwrap();
    assert_abs_diff_eq!(Defuzzification::Bisector.call(&right, &universe), 19.9, epsilon = 0.01);

    assert_eq!(Defuzzification::Bisector.call(&constant, &Universe::empty()), 0.);
}

#[test]
fn test_maximums() {
    use approx::assert_abs_diff_eq;

    let universe = Universe::with_step(0., 5., 0.25).unwrap();
    let fs = MembershipFunction::triangular(1., 2., 3.)
        .unwrap()
        .union(&MembershipFunction::triangular(2., 3., 4.).unwrap());

    assert_eq!(Defuzzification::SmallestOfMaxs.call(&fs, &universe), 2.);
    assert_eq!(Defuzzification::MiddleOfMaxs.call(&fs, &universe), 2.5);
    assert_eq!(Defuzzification::LargestOfMaxs.call(&fs, &universe), 3.);

    let fs = MembershipFunction::trapezoid(1., 2., 3., 4.).unwrap();

    assert_eq!(Defuzzification::SmallestOfMaxs.call(&fs, &universe), 2.);
    assert_eq!(Defuzzification::MiddleOfMaxs.call(&fs, &universe), 2.5);
    assert_eq!(Defuzzification::LargestOfMaxs.call(&fs, &universe), 3.);

    let universe = Universe::with_step(0., 5., 0.1).unwrap();
    let fs = MembershipFunction::trapezoid(1., 2., 3., 4.).unwrap().min(0.6);

    assert_abs_diff_eq!(Defuzzification::SmallestOfMaxs.call(&fs, &universe), 1.6, epsilon = 1e-9);
    assert_abs_diff_eq!(Defuzzification::MiddleOfMaxs.call(&fs, &universe), 2.45, epsilon = 1e-9);
    assert_abs_diff_eq!(Defuzzification::LargestOfMaxs.call(&fs, &universe), 3.3, epsilon = 1e-9);
    assert_eq!(Defuzzification::MiddleOfMaxs.call(&fs, &Universe::empty()), 0.);
}

#[cfg(test)]
mod properties {
    use proptest::prelude::*;

    use super::{Connector, Operator};

    proptest! {
        #[test]
        fn closed_forms(a in 0.0..=1.0f64, b in 0.0..=1.0f64) {
            prop_assert_eq!(Connector::ZadehXor.call(a, b), a + b - 2. * f64::min(a, b));
            prop_assert_eq!(Connector::HyperbolicAnd.call(a, b), a * b);
            prop_assert_eq!(Operator::Zadeh.nand().call(a, b), 1. - Operator::Zadeh.and().call(a, b));
            prop_assert_eq!(Operator::Zadeh.nor().call(a, b), 1. - Operator::Zadeh.or().call(a, b));
        }

        #[test]
        fn stays_in_unit_interval(a in 0.0..=1.0f64, b in 0.0..=1.0f64) {
            for op in [Operator::Zadeh, Operator::Hyperbolic] {
                for connector in [op.and(), op.or(), op.xor(), op.nand(), op.nor()] {
                    let y = connector.call(a, b);

                    prop_assert!((-1e-12..=1. + 1e-12).contains(&y), "{connector:?}({a}, {b}) = {y}");
                }
            }
        }
    }
}
