use std::fmt;

/// Stopping rule that ended a [`minimize`](crate::minimize::minimize) run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TerminationReason {
    /// The gradient fell under `grad_tol` or the optimizer's own break threshold.
    GradientNorm,
    /// An iteration moved the parameters by less than `step_tol`.
    StepSize,
    /// Two consecutive objective values agreed to within `func_tol`.
    FunctionChange,
    /// `max_iter` calls were made without another rule firing.
    MaxIterations,
    /// The optimizer handed back its input away from a stationary point, i.e. a zero step.
    LineSearchFailed,
    /// NaN or infinity showed up in the objective, the gradient, or the parameters.
    NumericalError,
}

impl TerminationReason {
    /// Whether the run stopped on a tolerance rather than on a limit or a failure.
    pub fn is_converged(self) -> bool {
        matches!(
            self,
            TerminationReason::GradientNorm
                | TerminationReason::StepSize
                | TerminationReason::FunctionChange
        )
    }
}

impl fmt::Display for TerminationReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            TerminationReason::GradientNorm => "gradient vanished",
            TerminationReason::StepSize => "parameters stopped moving",
            TerminationReason::FunctionChange => "objective stopped changing",
            TerminationReason::MaxIterations => "iteration limit hit",
            TerminationReason::LineSearchFailed => "no acceptable step along the search direction",
            TerminationReason::NumericalError => "non-finite value encountered",
        };
        f.write_str(text)
    }
}

/// Final state of a [`minimize`](crate::minimize::minimize) run.
///
/// `value`, `gradient` and `gradient_norm` all describe the oracle at `x`.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct OptimResult<F> {
    pub x: Vec<F>,
    pub value: F,
    pub gradient: Vec<F>,
    pub gradient_norm: F,
    /// `Optimizer::next` calls made.
    pub iterations: usize,
    /// Oracle queries, counting the ones made inside step-size searches.
    pub func_evals: usize,
    pub termination: TerminationReason,
}
