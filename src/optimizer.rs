use std::fmt;

use crate::float::Float;
use crate::objective::Problem;
use crate::solvers::bfgs::Bfgs;
use crate::solvers::lbfgs::Lbfgs;

/// Parameter count above which [`make_optimizer`] avoids the dense Hessian.
pub const LBFGS_PARAMETER_THRESHOLD: usize = 500;

/// Iterative optimizer for model parameters.
///
/// The caller owns the iteration loop: each [`next`](Optimizer::next) call
/// queries the oracle once, picks a search direction, asks the step-size
/// search for a step length, and returns improved parameters. Optimizers keep
/// whatever history their update rule needs between calls.
pub trait Optimizer<F: Float>: fmt::Debug {
    /// Perform one iteration from `parameters`.
    ///
    /// Returns `(f(parameters), next_parameters)`. The objective value is the
    /// one observed at the incoming parameters, not at the returned ones.
    ///
    /// When the gradient norm is below
    /// [`JACOBIAN_NORM_BREAK`](crate::convergence::JACOBIAN_NORM_BREAK), the
    /// incoming parameters are returned unchanged and no history is updated.
    fn next(&mut self, problem: &mut dyn Problem<F>, parameters: Vec<F>) -> (F, Vec<F>);

    /// Clear all iteration history, including the step-size search's.
    ///
    /// Configuration is kept. Safe to call before the first iteration.
    fn reset(&mut self);

    /// Gradient computed by the most recent `next` call.
    fn jacobian(&self) -> Option<&[F]>;
}

impl<F: Float, O: Optimizer<F> + ?Sized> Optimizer<F> for Box<O> {
    fn next(&mut self, problem: &mut dyn Problem<F>, parameters: Vec<F>) -> (F, Vec<F>) {
        (**self).next(problem, parameters)
    }

    fn reset(&mut self) {
        (**self).reset()
    }

    fn jacobian(&self) -> Option<&[F]> {
        (**self).jacobian()
    }
}

/// Query the oracle and check the gradient has one entry per parameter.
pub(crate) fn evaluate<F: Float>(problem: &mut dyn Problem<F>, parameters: &[F]) -> (F, Vec<F>) {
    let (obj_value, jacobian) = problem.obj_jac(parameters);
    assert_eq!(
        jacobian.len(),
        parameters.len(),
        "gradient length ({}) must equal parameter length ({})",
        jacobian.len(),
        parameters.len()
    );
    (obj_value, jacobian)
}

/// Return a new optimizer suited to `num_parameters` parameters.
///
/// Above [`LBFGS_PARAMETER_THRESHOLD`] the O(n²) dense inverse Hessian of
/// BFGS gets expensive, so L-BFGS is used instead.
pub fn make_optimizer<F: Float>(num_parameters: usize) -> Box<dyn Optimizer<F>> {
    if num_parameters > LBFGS_PARAMETER_THRESHOLD {
        Box::new(Lbfgs::default())
    } else {
        Box::new(Bfgs::default())
    }
}
