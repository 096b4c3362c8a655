use num::Float;

/// `n` evenly spaced samples over `[min, max]`, endpoints included.
pub struct Linspace<F> {
    start: F,
    step: F,
    index: usize,
    len: usize,
}

impl<F: Float> Linspace<F> {
    pub fn new(min: F, max: F, n: usize) -> Self {
        let step = match F::from(n.saturating_sub(1)) {
            Some(num_steps) if n > 1 => (max - min) / num_steps,
            _ => F::zero(),
        };

        Linspace {
            start: min,
            step,
            index: 0,
            len: n,
        }
    }

    /// Samples `min + step * i` for as long as they stay within `max`.
    /// `None` when the sample count is not representable.
    pub fn with_step(min: F, max: F, step: F) -> Option<Self> {
        // Absorbs the representation error of quotients like 0.3 / 0.1
        let tolerance = F::from(1e-9).unwrap_or_else(F::epsilon);
        let len = ((max - min) / step + tolerance)
            .floor()
            .to_usize()?
            .checked_add(1)?;

        Some(Linspace {
            start: min,
            step,
            index: 0,
            len,
        })
    }
}

impl<F: Float> Iterator for Linspace<F> {
    type Item = F;

    #[inline]
    fn next(&mut self) -> Option<F> {
        if self.index >= self.len {
            return None;
        }

        let i = F::from(self.index)?;
        self.index += 1;

        Some(self.start + self.step * i)
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.len - self.index;
        (n, Some(n))
    }
}

impl<F: Float> ExactSizeIterator for Linspace<F> {}

#[test]
fn test_linspace_count() {
    let values: Vec<f64> = Linspace::new(0., 1., 5).collect();

    assert_eq!(values, vec![0., 0.25, 0.5, 0.75, 1.]);
    assert_eq!(Linspace::new(3., 3., 1).collect::<Vec<f64>>(), vec![3.]);
    assert_eq!(Linspace::<f64>::new(0., 1., 0).count(), 0);
}

#[test]
fn test_linspace_step() {
    let values: Vec<f64> = Linspace::with_step(0., 0.5, 0.1).unwrap().collect();

    assert_eq!(values, vec![0.0, 0.1, 0.2, 0.30000000000000004, 0.4, 0.5]);
    assert_eq!(Linspace::with_step(0., 0.3, 0.1).unwrap().count(), 4);
    assert_eq!(Linspace::with_step(0., 20., 0.1).unwrap().len(), 201);

    assert!(Linspace::with_step(0., 1., 1e-300).is_none());
    assert!(Linspace::with_step(-1e308, 1e308, 1.).is_none());
    assert!(Linspace::with_step(0., 1., f64::NAN).is_none());
}
