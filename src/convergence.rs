use crate::float::Float;

/// Gradient norm below which an optimizer reports convergence.
///
/// When `||∇f|| < JACOBIAN_NORM_BREAK`, `Optimizer::next` returns the incoming
/// parameters unchanged instead of taking a step.
pub const JACOBIAN_NORM_BREAK: f64 = 1e-10;

/// Stopping rules for [`minimize`](crate::minimize::minimize).
///
/// These sit on top of the optimizers' own short-circuit at
/// [`JACOBIAN_NORM_BREAK`]; a `grad_tol` below that constant has no effect.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ConvergenceParams<F> {
    /// Upper bound on `Optimizer::next` calls.
    pub max_iter: usize,
    /// Stop once the gradient reported by the optimizer has an L2 norm below this.
    pub grad_tol: F,
    /// Stop once an iteration moves the parameters by less than this (L2).
    pub step_tol: F,
    /// Stop once consecutive objective values differ by less than this; `0` turns the rule off.
    pub func_tol: F,
}

impl<F: Float> ConvergenceParams<F> {
    fn with_tolerances(grad_tol: f64, step_tol: f64) -> Self {
        ConvergenceParams {
            max_iter: 100,
            grad_tol: F::lit(grad_tol),
            step_tol: F::lit(step_tol),
            func_tol: F::zero(),
        }
    }
}

/// 100 iterations, `grad_tol = 1e-10`, `step_tol = 1e-12`, no function-change rule.
impl Default for ConvergenceParams<f64> {
    fn default() -> Self {
        Self::with_tolerances(JACOBIAN_NORM_BREAK, 1e-12)
    }
}

/// 100 iterations, `grad_tol = 1e-5`, `step_tol = 1e-7`, no function-change rule.
impl Default for ConvergenceParams<f32> {
    fn default() -> Self {
        Self::with_tolerances(1e-5, 1e-7)
    }
}

/// Whether `jacobian` is small enough to stop iterating.
pub fn is_converged<F: Float>(jacobian: &[F]) -> bool {
    norm(jacobian) < F::lit(JACOBIAN_NORM_BREAK)
}

/// Euclidean length of `v`.
pub fn norm<F: Float>(v: &[F]) -> F {
    dot(v, v).sqrt()
}

/// `aᵀb`.
pub fn dot<F: Float>(a: &[F], b: &[F]) -> F {
    debug_assert_eq!(a.len(), b.len());
    a.iter()
        .zip(b.iter())
        .fold(F::zero(), |acc, (&ai, &bi)| acc + ai * bi)
}
