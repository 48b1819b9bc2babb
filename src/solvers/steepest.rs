use log::info;

use crate::convergence::is_converged;
use crate::error::ConfigError;
use crate::float::Float;
use crate::line_search::{StepSizeSearch, WolfeLineSearch};
use crate::linalg::{add_scaled, axpy, negate};
use crate::objective::Problem;
use crate::optimizer::{evaluate, Optimizer};

/// Steepest descent: step along the negative gradient.
///
/// The step length comes from the configured step-size search; pass a
/// [`FixedStep`](crate::line_search::FixedStep) for plain constant-rate
/// gradient descent.
#[derive(Debug)]
pub struct SteepestDescent<F> {
    line_search: Box<dyn StepSizeSearch<F>>,
    jacobian: Option<Vec<F>>,
}

impl<F: Float> SteepestDescent<F> {
    /// Create a steepest descent optimizer using `line_search` for step lengths.
    pub fn new(line_search: Box<dyn StepSizeSearch<F>>) -> Self {
        SteepestDescent {
            line_search,
            jacobian: None,
        }
    }
}

impl<F: Float> Default for SteepestDescent<F> {
    fn default() -> Self {
        Self::new(Box::new(WolfeLineSearch::steepest_descent()))
    }
}

impl<F: Float> Optimizer<F> for SteepestDescent<F> {
    fn next(&mut self, problem: &mut dyn Problem<F>, parameters: Vec<F>) -> (F, Vec<F>) {
        let (obj_value, jacobian) = evaluate(problem, &parameters);

        if is_converged(&jacobian) {
            info!("optimizer converged with small jacobian");
            self.jacobian = Some(jacobian);
            return (obj_value, parameters);
        }

        let direction = negate(&jacobian);
        let step_size =
            self.line_search
                .step_size(&parameters, obj_value, &jacobian, &direction, problem);
        self.jacobian = Some(jacobian);

        (obj_value, add_scaled(&parameters, step_size, &direction))
    }

    fn reset(&mut self) {
        self.jacobian = None;
        self.line_search.reset();
    }

    fn jacobian(&self) -> Option<&[F]> {
        self.jacobian.as_deref()
    }
}

/// Configuration for [`SteepestDescentMomentum`].
#[derive(Debug)]
pub struct MomentumConfig<F> {
    /// Step-size search along the negative gradient.
    pub line_search: Box<dyn StepSizeSearch<F>>,
    /// Fraction of the previous step added to each new step, in `[0, 1)` (default: 0.2).
    pub momentum_rate: F,
}

impl<F: Float> Default for MomentumConfig<F> {
    fn default() -> Self {
        MomentumConfig {
            line_search: Box::new(WolfeLineSearch::steepest_descent()),
            momentum_rate: F::lit(0.2),
        }
    }
}

/// Steepest descent with momentum.
///
/// Each iteration takes `step = α (-∇f)` with `α` from the line search, then
/// moves to `x + step + momentum_rate * previous_step`. Only `step` is
/// remembered, so momentum compounds through the recurrence alone.
///
/// The line search only sees the raw negative-gradient direction. The
/// momentum term is added afterwards, so the sufficient-decrease guarantee
/// holds for `x + step` but not necessarily for the returned point.
#[derive(Debug)]
pub struct SteepestDescentMomentum<F> {
    line_search: Box<dyn StepSizeSearch<F>>,
    momentum_rate: F,
    prev_step: Option<Vec<F>>,
    jacobian: Option<Vec<F>>,
}

impl<F: Float> SteepestDescentMomentum<F> {
    /// Create the optimizer, rejecting momentum rates outside `[0, 1)`.
    pub fn new(config: MomentumConfig<F>) -> Result<Self, ConfigError> {
        let rate = config.momentum_rate;
        if !(rate.is_finite() && rate >= F::zero() && rate < F::one()) {
            return Err(ConfigError::InvalidMomentumRate(rate.to_string()));
        }
        Ok(SteepestDescentMomentum {
            line_search: config.line_search,
            momentum_rate: rate,
            prev_step: None,
            jacobian: None,
        })
    }

    /// The momentum rate.
    pub fn momentum_rate(&self) -> F {
        self.momentum_rate
    }

    /// Step taken by the previous iteration, without its momentum term.
    pub fn previous_step(&self) -> Option<&[F]> {
        self.prev_step.as_deref()
    }
}

impl<F: Float> Default for SteepestDescentMomentum<F> {
    fn default() -> Self {
        let config = MomentumConfig::default();
        SteepestDescentMomentum {
            line_search: config.line_search,
            momentum_rate: config.momentum_rate,
            prev_step: None,
            jacobian: None,
        }
    }
}

impl<F: Float> Optimizer<F> for SteepestDescentMomentum<F> {
    fn next(&mut self, problem: &mut dyn Problem<F>, parameters: Vec<F>) -> (F, Vec<F>) {
        let (obj_value, jacobian) = evaluate(problem, &parameters);

        if is_converged(&jacobian) {
            info!("optimizer converged with small jacobian");
            self.jacobian = Some(jacobian);
            return (obj_value, parameters);
        }

        let direction = negate(&jacobian);
        let step_size =
            self.line_search
                .step_size(&parameters, obj_value, &jacobian, &direction, problem);
        let step: Vec<F> = direction.iter().map(|&d| step_size * d).collect();

        let mut next_parameters = add_scaled(&parameters, F::one(), &step);
        if let Some(prev_step) = &self.prev_step {
            axpy(self.momentum_rate, prev_step, &mut next_parameters);
        }
        self.prev_step = Some(step);
        self.jacobian = Some(jacobian);

        (obj_value, next_parameters)
    }

    fn reset(&mut self) {
        self.jacobian = None;
        self.prev_step = None;
        self.line_search.reset();
    }

    fn jacobian(&self) -> Option<&[F]> {
        self.jacobian.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::line_search::FixedStep;
    use crate::objective::FnProblem;

    fn fixed(step: f64) -> Box<dyn StepSizeSearch<f64>> {
        Box::new(FixedStep::new(step).unwrap())
    }

    /// f(x) = x, constant gradient [1.0].
    fn slope(x: &[f64]) -> (f64, Vec<f64>) {
        (x[0], vec![1.0])
    }

    #[test]
    fn steepest_steps_against_gradient() {
        let mut problem = FnProblem::new(|x: &[f64]| (x[0] * x[0], vec![2.0 * x[0]]));
        let mut opt = SteepestDescent::new(fixed(0.25));

        let (f, x) = opt.next(&mut problem, vec![2.0]);
        assert_eq!(f, 4.0);
        assert_eq!(x, vec![1.0]);
        assert_eq!(opt.jacobian(), Some(&[4.0][..]));
    }

    #[test]
    fn momentum_recurrence() {
        let mut problem = FnProblem::new(slope);
        let mut opt = SteepestDescentMomentum::new(MomentumConfig {
            line_search: fixed(1.0),
            momentum_rate: 0.2,
        })
        .unwrap();

        let (_, x1) = opt.next(&mut problem, vec![0.0]);
        assert_eq!(x1, vec![-1.0]);
        assert_eq!(opt.previous_step(), Some(&[-1.0][..]));

        let (_, x2) = opt.next(&mut problem, x1);
        assert!((x2[0] - -2.2).abs() < 1e-12, "x2 = {:?}", x2);
        // Stored step excludes the momentum contribution.
        assert_eq!(opt.previous_step(), Some(&[-1.0][..]));

        let (_, x3) = opt.next(&mut problem, x2);
        assert!((x3[0] - -3.4).abs() < 1e-12, "x3 = {:?}", x3);
    }

    #[test]
    fn momentum_reset_drops_previous_step() {
        let mut problem = FnProblem::new(slope);
        let mut opt = SteepestDescentMomentum::new(MomentumConfig {
            line_search: fixed(1.0),
            momentum_rate: 0.5,
        })
        .unwrap();

        let (_, x) = opt.next(&mut problem, vec![0.0]);
        opt.reset();
        assert!(opt.previous_step().is_none());
        assert!(opt.jacobian().is_none());

        let (_, x) = opt.next(&mut problem, x);
        assert_eq!(x, vec![-2.0]);
    }

    #[test]
    fn momentum_rate_validation() {
        for rate in [-0.1, 1.0, 2.0, f64::NAN, f64::INFINITY] {
            let config = MomentumConfig {
                line_search: fixed(1.0),
                momentum_rate: rate,
            };
            assert!(
                matches!(
                    SteepestDescentMomentum::new(config),
                    Err(ConfigError::InvalidMomentumRate(_))
                ),
                "rate {} accepted",
                rate
            );
        }
        let config = MomentumConfig {
            line_search: fixed(1.0),
            momentum_rate: 0.0,
        };
        assert!(SteepestDescentMomentum::new(config).is_ok());
    }

    #[test]
    fn default_momentum_rate() {
        let opt = SteepestDescentMomentum::<f64>::default();
        assert_eq!(opt.momentum_rate(), 0.2);
    }

    #[test]
    fn converged_returns_input_unchanged() {
        let mut problem = FnProblem::new(|x: &[f64]| (7.0, vec![0.0; x.len()]));
        let mut opt = SteepestDescentMomentum::<f64>::default();

        let (f, x) = opt.next(&mut problem, vec![1.0, 2.0]);
        assert_eq!(f, 7.0);
        assert_eq!(x, vec![1.0, 2.0]);
        assert!(opt.previous_step().is_none());
    }
}
