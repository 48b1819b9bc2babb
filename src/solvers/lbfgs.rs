use std::collections::VecDeque;

use log::{debug, info};

use crate::convergence::{dot, is_converged};
use crate::error::ConfigError;
use crate::float::Float;
use crate::line_search::{StepSizeSearch, WolfeLineSearch};
use crate::linalg::{add_scaled, axpy, sub};
use crate::objective::Problem;
use crate::optimizer::{evaluate, Optimizer};

/// Chooses `γ` for the initial inverse Hessian `H_0 = γ I` of the two-loop recursion.
///
/// Called with the most recent `(s, y)` pair.
pub type InitialScalarFn<F> = fn(&[F], &[F]) -> F;

/// `γ = 1`, regardless of the curvature pair.
pub fn one_scalar<F: Float>(_param_diff: &[F], _jac_diff: &[F]) -> F {
    F::one()
}

/// `γ = (sᵀy) / (yᵀy)`, the usual L-BFGS scaling.
pub fn gamma_scalar<F: Float>(param_diff: &[F], jac_diff: &[F]) -> F {
    dot(param_diff, jac_diff) / dot(jac_diff, jac_diff)
}

/// One stored curvature pair.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CurvaturePair<F> {
    /// Parameter difference `s = x_k - x_{k-1}`.
    pub s: Vec<F>,
    /// Gradient difference `y = ∇f_k - ∇f_{k-1}`.
    pub y: Vec<F>,
    /// `ρ = 1 / (yᵀs)`.
    pub rho: F,
}

/// Configuration for the L-BFGS optimizer.
#[derive(Debug)]
pub struct LbfgsConfig<F> {
    /// Step-size search; should satisfy the Wolfe conditions so `yᵀs > 0`
    /// (default: strong Wolfe with `c_1 = 1e-4`, `c_2 = 0.9`).
    pub line_search: Box<dyn StepSizeSearch<F>>,
    /// Number of recent `(s, y)` pairs to store (default: 5).
    pub memory: usize,
    /// Scaling of the initial inverse Hessian (default: [`gamma_scalar`]).
    pub initial_scalar: InitialScalarFn<F>,
}

impl<F: Float> Default for LbfgsConfig<F> {
    fn default() -> Self {
        LbfgsConfig {
            line_search: Box::new(WolfeLineSearch::quasi_newton()),
            memory: 5,
            initial_scalar: gamma_scalar,
        }
    }
}

/// Limited-memory quasi-Newton L-BFGS optimizer.
///
/// Keeps the `memory` most recent curvature pairs instead of a dense matrix
/// and computes `H ∇f` with the two-loop recursion in O(memory · n).
///
/// Pairs with `yᵀs == 0` are never stored, which is the same skip rule
/// [`Bfgs`](crate::solvers::bfgs::Bfgs) applies to its dense update.
#[derive(Debug)]
pub struct Lbfgs<F> {
    line_search: Box<dyn StepSizeSearch<F>>,
    memory: usize,
    initial_scalar: InitialScalarFn<F>,
    jacobian: Option<Vec<F>>,
    prev_params: Option<Vec<F>>,
    prev_jacobian: Option<Vec<F>>,
    // Most recent first
    history: VecDeque<CurvaturePair<F>>,
}

impl<F: Float> Lbfgs<F> {
    /// Create an L-BFGS optimizer, rejecting `memory == 0`.
    pub fn new(config: LbfgsConfig<F>) -> Result<Self, ConfigError> {
        if config.memory == 0 {
            return Err(ConfigError::InvalidMemory(config.memory));
        }
        Ok(Self::from_valid(config))
    }

    fn from_valid(config: LbfgsConfig<F>) -> Self {
        Lbfgs {
            line_search: config.line_search,
            memory: config.memory,
            initial_scalar: config.initial_scalar,
            jacobian: None,
            prev_params: None,
            prev_jacobian: None,
            history: VecDeque::with_capacity(config.memory + 1),
        }
    }

    /// Maximum number of stored curvature pairs.
    pub fn memory(&self) -> usize {
        self.memory
    }

    /// Stored curvature pairs, most recent first.
    pub fn history(&self) -> impl Iterator<Item = &CurvaturePair<F>> {
        self.history.iter()
    }

    /// Number of stored curvature pairs.
    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    /// Record the pair ending at `parameters`, evicting the oldest beyond `memory`.
    fn update_history(&mut self, parameters: &[F], jacobian: &[F]) {
        if let (Some(prev_params), Some(prev_jacobian)) = (&self.prev_params, &self.prev_jacobian) {
            let s = sub(parameters, prev_params);
            let y = sub(jacobian, prev_jacobian);
            let ys = dot(&y, &s);
            if ys == F::zero() {
                debug!("skipping L-BFGS pair with zero curvature (yᵀs = 0)");
            } else {
                self.history.push_front(CurvaturePair {
                    s,
                    y,
                    rho: F::one() / ys,
                });
                if self.history.len() > self.memory {
                    self.history.pop_back();
                }
            }
        }

        self.prev_params = Some(parameters.to_vec());
        self.prev_jacobian = Some(jacobian.to_vec());
    }

    /// Two-loop recursion: `-H ∇f` from the stored pairs.
    fn step_dir(&self, jacobian: &[F]) -> Vec<F> {
        // Backward pass, newest to oldest
        let mut q = jacobian.to_vec();
        let mut alphas = Vec::with_capacity(self.history.len());
        for pair in &self.history {
            let alpha = pair.rho * dot(&pair.s, &q);
            axpy(-alpha, &pair.y, &mut q);
            alphas.push(alpha);
        }

        // H_0 = γ I
        let gamma = match self.history.front() {
            Some(latest) => (self.initial_scalar)(&latest.s, &latest.y),
            None => F::one(),
        };
        for v in q.iter_mut() {
            *v = *v * gamma;
        }

        // Forward pass, oldest to newest
        for (pair, &alpha) in self.history.iter().zip(alphas.iter()).rev() {
            let beta = pair.rho * dot(&pair.y, &q);
            axpy(alpha - beta, &pair.s, &mut q);
        }

        for v in q.iter_mut() {
            *v = -*v;
        }
        q
    }
}

impl<F: Float> Default for Lbfgs<F> {
    fn default() -> Self {
        Self::from_valid(LbfgsConfig::default())
    }
}

impl<F: Float> Optimizer<F> for Lbfgs<F> {
    fn next(&mut self, problem: &mut dyn Problem<F>, parameters: Vec<F>) -> (F, Vec<F>) {
        let (obj_value, jacobian) = evaluate(problem, &parameters);

        if is_converged(&jacobian) {
            info!("optimizer converged with small jacobian");
            self.jacobian = Some(jacobian);
            return (obj_value, parameters);
        }

        self.update_history(&parameters, &jacobian);
        let direction = self.step_dir(&jacobian);

        let step_size =
            self.line_search
                .step_size(&parameters, obj_value, &jacobian, &direction, problem);
        self.jacobian = Some(jacobian);

        (obj_value, add_scaled(&parameters, step_size, &direction))
    }

    fn reset(&mut self) {
        self.jacobian = None;
        self.prev_params = None;
        self.prev_jacobian = None;
        self.history.clear();
        self.line_search.reset();
    }

    fn jacobian(&self) -> Option<&[F]> {
        self.jacobian.as_deref()
    }
}
