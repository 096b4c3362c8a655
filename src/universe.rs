use std::sync::Arc;

use crate::error::{FuzzyError, Result};
use crate::linspace::Linspace;

// Upper bound on the samples of a universe
const MAX_SAMPLES: usize = 1 << 24;

/// The discretized domain of a variable. Only used to approximate integrals
/// while defuzzifying, so it is sampled once at construction.
#[derive(Clone, Debug, PartialEq)]
pub struct Universe {
    values: Arc<[f64]>,
}

impl Universe {
    /// Samples `[min, max]` every `step`, starting at `min`.
    pub fn with_step(min: f64, max: f64, step: f64) -> Result<Self> {
        if !(step > 0.) {
            return Err(FuzzyError::InvalidUniverse("step shall be > 0"));
        }
        check_bounds(min, max)?;

        let samples = Linspace::with_step(min, max, step)
            .filter(|samples| samples.len() <= MAX_SAMPLES)
            .ok_or(FuzzyError::InvalidUniverse("too many samples"))?;

        Ok(Self {
            values: samples.collect(),
        })
    }

    /// Samples `count` evenly spaced values over `[min, max]`, both included.
    pub fn with_count(min: f64, max: f64, count: usize) -> Result<Self> {
        if count < 2 {
            return Err(FuzzyError::InvalidUniverse("count shall be >= 2"));
        }
        if count > MAX_SAMPLES {
            return Err(FuzzyError::InvalidUniverse("too many samples"));
        }
        check_bounds(min, max)?;

        Ok(Self {
            values: Linspace::new(min, max, count).collect(),
        })
    }

    /// A universe without samples; variables that are never defuzzified
    /// don't need one.
    pub fn empty() -> Self {
        Self {
            values: Vec::new().into(),
        }
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl Default for Universe {
    fn default() -> Self {
        Self::empty()
    }
}

fn check_bounds(min: f64, max: f64) -> Result<()> {
    if !min.is_finite() || !max.is_finite() {
        return Err(FuzzyError::InvalidUniverse("bounds shall be finite"));
    }
    if min > max {
        return Err(FuzzyError::InvalidUniverse("min shall be <= max"));
    }

    Ok(())
}

#[test]
fn test_universe_with_step() {
    let universe = Universe::with_step(0., 1., 0.25).unwrap();

    assert_eq!(universe.values(), &[0.0, 0.25, 0.5, 0.75, 1.0]);

    let universe = Universe::with_step(0., 0.5, 0.1).unwrap();

    assert_eq!(universe.values(), &[0.0, 0.1, 0.2, 0.30000000000000004, 0.4, 0.5]);
    assert_eq!(Universe::with_step(2., 2., 0.1).unwrap().values(), &[2.]);
}

#[test]
fn test_universe_with_count() {
    let universe = Universe::with_count(-10., 10., 100).unwrap();

    assert_eq!(universe.len(), 100);
    assert_eq!(universe.values()[0], -10.);
    assert_eq!(universe.values()[99], 10.);
}

#[test]
fn test_universe_errors() {
    assert_eq!(
        Universe::with_step(0., 1., 0.),
        Err(FuzzyError::InvalidUniverse("step shall be > 0"))
    );
    assert_eq!(
        Universe::with_step(0., 1., f64::NAN),
        Err(FuzzyError::InvalidUniverse("step shall be > 0"))
    );
    assert_eq!(
        Universe::with_step(1., 0., 0.1),
        Err(FuzzyError::InvalidUniverse("min shall be <= max"))
    );
    assert_eq!(
        Universe::with_count(0., 1., 1),
        Err(FuzzyError::InvalidUniverse("count shall be >= 2"))
    );
    assert_eq!(
        Universe::with_count(0., f64::INFINITY, 10),
        Err(FuzzyError::InvalidUniverse("bounds shall be finite"))
    );
    assert!(Universe::empty().is_empty());
}

#[test]
fn test_universe_too_many_samples() {
    let too_many = Err(FuzzyError::InvalidUniverse("too many samples"));

    assert_eq!(Universe::with_step(0., 1., 1e-300), too_many);
    assert_eq!(Universe::with_step(-1e308, 1e308, 1.), too_many);
    assert_eq!(Universe::with_step(0., 1., 1e-9), too_many);
    assert_eq!(Universe::with_count(0., 1., usize::MAX), too_many);
    assert_eq!(Universe::with_count(0., 1., MAX_SAMPLES + 1), too_many);
    assert_eq!(Universe::with_step(0., 1., 1. / 1024.).unwrap().len(), 1025);
}
