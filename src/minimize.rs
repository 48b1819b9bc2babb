use log::debug;

use crate::convergence::{is_converged, norm, ConvergenceParams};
use crate::float::Float;
use crate::linalg::sub;
use crate::objective::Problem;
use crate::optimizer::Optimizer;
use crate::result::{OptimResult, TerminationReason};

/// Forwards to a problem while counting oracle evaluations.
struct Counted<'a, P> {
    inner: &'a mut P,
    evals: usize,
}

impl<F: Float, P: Problem<F>> Problem<F> for Counted<'_, P> {
    fn obj_jac(&mut self, parameters: &[F]) -> (F, Vec<F>) {
        self.evals += 1;
        self.inner.obj_jac(parameters)
    }

    fn obj(&mut self, parameters: &[F]) -> F {
        self.evals += 1;
        self.inner.obj(parameters)
    }
}

fn all_finite<F: Float>(v: &[F]) -> bool {
    v.iter().all(|x| x.is_finite())
}

/// Run `optimizer` on `problem` from `x0` until a stopping rule fires.
///
/// The optimizer is reset first. Each iteration is one
/// [`Optimizer::next`] call; the loop stops when the optimizer signals
/// convergence by returning its input unchanged, or when a
/// [`ConvergenceParams`] tolerance or the iteration limit is reached.
/// Non-finite objective or gradient values end the run with
/// [`TerminationReason::NumericalError`].
pub fn minimize<F, O, P>(
    optimizer: &mut O,
    problem: &mut P,
    x0: &[F],
    params: &ConvergenceParams<F>,
) -> OptimResult<F>
where
    F: Float,
    O: Optimizer<F> + ?Sized,
    P: Problem<F>,
{
    optimizer.reset();
    let mut problem = Counted {
        inner: problem,
        evals: 0,
    };

    let mut x = x0.to_vec();
    let mut f_prev: Option<F> = None;

    for iter in 0..params.max_iter {
        let (value, x_next) = optimizer.next(&mut problem, x.clone());
        let gradient = optimizer.jacobian().map(<[F]>::to_vec).unwrap_or_default();
        let gradient_norm = norm(&gradient);

        let stop = |termination: TerminationReason, x: Vec<F>, evals: usize| OptimResult {
            x,
            value,
            gradient: gradient.clone(),
            gradient_norm,
            iterations: iter + 1,
            func_evals: evals,
            termination,
        };

        if !value.is_finite() || !all_finite(&gradient) {
            return stop(TerminationReason::NumericalError, x, problem.evals);
        }
        if is_converged(&gradient) || gradient_norm < params.grad_tol {
            return stop(TerminationReason::GradientNorm, x, problem.evals);
        }
        if x_next == x {
            debug!("optimizer returned its input unchanged at iteration {}", iter);
            return stop(TerminationReason::LineSearchFailed, x, problem.evals);
        }
        if !all_finite(&x_next) {
            return stop(TerminationReason::NumericalError, x, problem.evals);
        }

        let step_norm = norm(&sub(&x_next, &x));
        x = x_next;

        if step_norm < params.step_tol {
            return finish(&mut problem, x, iter + 1, TerminationReason::StepSize);
        }
        if let Some(f_prev) = f_prev {
            if params.func_tol > F::zero() && (f_prev - value).abs() < params.func_tol {
                return finish(&mut problem, x, iter + 1, TerminationReason::FunctionChange);
            }
        }
        f_prev = Some(value);
    }

    finish(&mut problem, x, params.max_iter, TerminationReason::MaxIterations)
}

/// Evaluate the final point and package the result.
fn finish<F: Float, P: Problem<F>>(
    problem: &mut Counted<'_, P>,
    x: Vec<F>,
    iterations: usize,
    termination: TerminationReason,
) -> OptimResult<F> {
    let (value, gradient) = problem.obj_jac(&x);
    let termination = if value.is_finite() && all_finite(&gradient) {
        termination
    } else {
        TerminationReason::NumericalError
    };
    OptimResult {
        gradient_norm: norm(&gradient),
        x,
        value,
        gradient,
        iterations,
        func_evals: problem.evals,
        termination,
    }
}
