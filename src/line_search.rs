//! Step-size searches used by the optimizers.
//!
//! A [`StepSizeSearch`] maps `(x, f(x), ∇f(x), p, problem)` to a scalar step
//! length `α` along the search direction `p`. Quasi-Newton methods need `α`
//! to satisfy the Wolfe curvature condition so that `yᵀs > 0` holds for the
//! curvature pairs they collect; [`WolfeLineSearch`] provides that.

use std::fmt;

use log::{debug, warn};

use crate::convergence::dot;
use crate::error::ConfigError;
use crate::float::Float;
use crate::linalg::add_scaled;
use crate::objective::Problem;

/// Strategy choosing the step length along a search direction.
///
/// Implementations may keep state across iterations (e.g. an initial-step
/// heuristic remembering the previous step); `reset` returns them to their
/// freshly constructed state.
pub trait StepSizeSearch<F: Float>: fmt::Debug {
    /// Return the step length to take from `parameters` along `direction`.
    ///
    /// `obj_value` and `jacobian` are the objective and gradient at
    /// `parameters`. A return value of zero means no acceptable step was found.
    fn step_size(
        &mut self,
        parameters: &[F],
        obj_value: F,
        jacobian: &[F],
        direction: &[F],
        problem: &mut dyn Problem<F>,
    ) -> F;

    /// Forget all state carried between calls.
    fn reset(&mut self);
}

/// Heuristic for the first trial step of a line search.
pub trait InitialStep<F: Float>: fmt::Debug {
    /// First trial step for the search along `direction`.
    ///
    /// Returns `1.0` when there is no previous iteration to learn from.
    fn initial_step(&mut self, jacobian: &[F], direction: &[F]) -> F;

    /// Record the step the line search finally accepted.
    fn update(&mut self, step_size: F);

    /// Forget all previous steps.
    fn reset(&mut self);
}

// ============================================================
// Initial step heuristics
// ============================================================

/// Start from the previous accepted step, grown by a constant factor.
///
/// Suits quasi-Newton methods, whose natural step length is close to 1 and
/// changes slowly between iterations.
#[derive(Debug, Clone)]
pub struct IncrPrevStep<F> {
    incr_rate: F,
    upper_bound: Option<F>,
    prev_step: Option<F>,
}

impl<F: Float> IncrPrevStep<F> {
    /// Create the heuristic with growth factor `incr_rate` and an optional cap.
    pub fn new(incr_rate: F, upper_bound: Option<F>) -> Result<Self, ConfigError> {
        if !(incr_rate.is_finite() && incr_rate > F::zero()) {
            return Err(ConfigError::InvalidIncrRate(incr_rate.to_string()));
        }
        if let Some(ub) = upper_bound {
            if !(ub.is_finite() && ub > F::zero()) {
                return Err(ConfigError::InvalidStepSize(ub.to_string()));
            }
        }
        Ok(IncrPrevStep {
            incr_rate,
            upper_bound,
            prev_step: None,
        })
    }

    fn clamp(&self, step: F) -> F {
        match self.upper_bound {
            Some(ub) => step.min(ub),
            None => step,
        }
    }
}

impl<F: Float> Default for IncrPrevStep<F> {
    fn default() -> Self {
        IncrPrevStep {
            incr_rate: F::lit(1.05),
            upper_bound: None,
            prev_step: None,
        }
    }
}

impl<F: Float> InitialStep<F> for IncrPrevStep<F> {
    fn initial_step(&mut self, _jacobian: &[F], _direction: &[F]) -> F {
        match self.prev_step {
            Some(prev) if prev > F::zero() => self.clamp(prev * self.incr_rate),
            _ => self.clamp(F::one()),
        }
    }

    fn update(&mut self, step_size: F) {
        self.prev_step = Some(step_size);
    }

    fn reset(&mut self) {
        self.prev_step = None;
    }
}

/// First-order-change heuristic.
///
/// Assumes the first-order change along the search direction stays the same
/// between iterations: `α₀ = α_{k-1} (∇f_{k-1}ᵀ p_{k-1}) / (∇f_kᵀ p_k)`.
/// Suits steepest descent, whose directions are badly scaled.
#[derive(Debug, Clone, Default)]
pub struct FOChangeInitialStep<F> {
    prev_step: Option<F>,
    prev_jac_dot_dir: Option<F>,
}

impl<F: Float> FOChangeInitialStep<F> {
    /// Create the heuristic with no history.
    pub fn new() -> Self {
        FOChangeInitialStep {
            prev_step: None,
            prev_jac_dot_dir: None,
        }
    }
}

impl<F: Float> InitialStep<F> for FOChangeInitialStep<F> {
    fn initial_step(&mut self, jacobian: &[F], direction: &[F]) -> F {
        let jac_dot_dir = dot(jacobian, direction);
        let step = match (self.prev_step, self.prev_jac_dot_dir) {
            (Some(prev_step), Some(prev_jac_dot_dir)) => {
                let step = prev_step * prev_jac_dot_dir / jac_dot_dir;
                if step.is_finite() && step > F::zero() {
                    step
                } else {
                    debug!("first-order-change initial step {} unusable, using 1", step);
                    F::one()
                }
            }
            _ => F::one(),
        };
        self.prev_jac_dot_dir = Some(jac_dot_dir);
        step
    }

    fn update(&mut self, step_size: F) {
        self.prev_step = Some(step_size);
    }

    fn reset(&mut self) {
        self.prev_step = None;
        self.prev_jac_dot_dir = None;
    }
}

// ============================================================
// Strong Wolfe line search
// ============================================================

/// Parameters for the strong Wolfe line search.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WolfeParams<F> {
    /// Sufficient decrease parameter (default: 1e-4).
    pub c_1: F,
    /// Curvature parameter (default: 0.9).
    pub c_2: F,
    /// Largest step the bracketing phase may try (default: 1e10).
    pub max_step_size: F,
    /// Maximum bracketing iterations (default: 20).
    pub max_iterations: usize,
    /// Maximum zoom iterations once a bracket is found (default: 20).
    pub max_zoom_iterations: usize,
}

impl<F: Float> Default for WolfeParams<F> {
    fn default() -> Self {
        WolfeParams {
            c_1: F::lit(1e-4),
            c_2: F::lit(0.9),
            max_step_size: F::lit(1e10),
            max_iterations: 20,
            max_zoom_iterations: 20,
        }
    }
}

impl<F: Float> WolfeParams<F> {
    fn validate(&self) -> Result<(), ConfigError> {
        let zero = F::zero();
        let one = F::one();
        if !(zero < self.c_1 && self.c_1 < self.c_2 && self.c_2 < one) {
            return Err(ConfigError::InvalidLineSearch(format!(
                "need 0 < c_1 < c_2 < 1, got c_1 = {}, c_2 = {}",
                self.c_1, self.c_2
            )));
        }
        if !(self.max_step_size > zero) {
            return Err(ConfigError::InvalidLineSearch(format!(
                "max_step_size must be positive, got {}",
                self.max_step_size
            )));
        }
        if self.max_iterations == 0 || self.max_zoom_iterations == 0 {
            return Err(ConfigError::InvalidLineSearch(
                "iteration limits must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// One evaluated point along the search ray.
#[derive(Debug, Clone, Copy)]
struct Trial<F> {
    alpha: F,
    phi: F,
    dphi: F,
}

/// Line search returning a step that satisfies the strong Wolfe conditions.
///
/// ```text
/// f(x + α p) <= f(x) + c_1 α ∇f(x)ᵀ p
/// |∇f(x + α p)ᵀ p| <= c_2 |∇f(x)ᵀ p|
/// ```
///
/// Brackets an acceptable interval by expanding the step, then zooms in with
/// safeguarded cubic interpolation (Nocedal & Wright, Algorithms 3.5 and 3.6).
#[derive(Debug)]
pub struct WolfeLineSearch<F> {
    params: WolfeParams<F>,
    initial_step: Box<dyn InitialStep<F>>,
}

impl<F: Float> WolfeLineSearch<F> {
    /// Create a line search, validating `params`.
    pub fn new(
        params: WolfeParams<F>,
        initial_step: Box<dyn InitialStep<F>>,
    ) -> Result<Self, ConfigError> {
        params.validate()?;
        Ok(WolfeLineSearch {
            params,
            initial_step,
        })
    }

    /// `c_1 = 1e-4`, `c_2 = 0.9`, starting from the incremented previous step.
    pub fn quasi_newton() -> Self {
        WolfeLineSearch {
            params: WolfeParams::default(),
            initial_step: Box::new(IncrPrevStep::default()),
        }
    }

    /// `c_1 = 1e-4`, `c_2 = 0.1`, starting from the first-order-change estimate.
    pub fn steepest_descent() -> Self {
        WolfeLineSearch {
            params: WolfeParams {
                c_2: F::lit(0.1),
                ..WolfeParams::default()
            },
            initial_step: Box::new(FOChangeInitialStep::new()),
        }
    }

    /// The line search parameters.
    pub fn params(&self) -> &WolfeParams<F> {
        &self.params
    }

    fn trial(
        &self,
        problem: &mut dyn Problem<F>,
        parameters: &[F],
        direction: &[F],
        alpha: F,
    ) -> Trial<F> {
        let (phi, jacobian) = problem.obj_jac(&add_scaled(parameters, alpha, direction));
        Trial {
            alpha,
            phi,
            dphi: dot(&jacobian, direction),
        }
    }

    fn search(
        &self,
        parameters: &[F],
        direction: &[F],
        problem: &mut dyn Problem<F>,
        start: Trial<F>,
        first_alpha: F,
    ) -> F {
        let c_1 = self.params.c_1;
        let c_2 = self.params.c_2;
        let mut prev = start;
        let mut alpha = first_alpha;

        for i in 0..self.params.max_iterations {
            let t = self.trial(problem, parameters, direction, alpha);

            if !t.phi.is_finite()
                || t.phi > start.phi + c_1 * alpha * start.dphi
                || (i > 0 && t.phi >= prev.phi)
            {
                return self.zoom(parameters, direction, problem, start, prev, t);
            }
            if t.dphi.abs() <= -c_2 * start.dphi {
                return alpha;
            }
            if t.dphi >= F::zero() {
                return self.zoom(parameters, direction, problem, start, t, prev);
            }

            if alpha >= self.params.max_step_size {
                warn!(
                    "line search reached the maximum step {} without satisfying the curvature condition",
                    alpha
                );
                return alpha;
            }
            prev = t;
            alpha = (alpha + alpha).min(self.params.max_step_size);
        }

        warn!(
            "line search exhausted {} bracketing iterations, using step {}",
            self.params.max_iterations, prev.alpha
        );
        prev.alpha
    }

    /// Shrink the bracket between `lo` (lowest sufficient-decrease point) and `hi`.
    fn zoom(
        &self,
        parameters: &[F],
        direction: &[F],
        problem: &mut dyn Problem<F>,
        start: Trial<F>,
        mut lo: Trial<F>,
        mut hi: Trial<F>,
    ) -> F {
        let c_1 = self.params.c_1;
        let c_2 = self.params.c_2;

        for _ in 0..self.params.max_zoom_iterations {
            let alpha = interpolate(lo, hi);
            let t = self.trial(problem, parameters, direction, alpha);

            if !t.phi.is_finite() || t.phi > start.phi + c_1 * alpha * start.dphi || t.phi >= lo.phi
            {
                hi = t;
            } else {
                if t.dphi.abs() <= -c_2 * start.dphi {
                    return alpha;
                }
                if t.dphi * (hi.alpha - lo.alpha) >= F::zero() {
                    hi = lo;
                }
                lo = t;
            }
        }

        warn!(
            "line search zoom exhausted {} iterations, using step {}",
            self.params.max_zoom_iterations, lo.alpha
        );
        lo.alpha
    }
}

impl<F: Float> Default for WolfeLineSearch<F> {
    fn default() -> Self {
        Self::quasi_newton()
    }
}

/// Safeguarded cubic interpolation between two bracket ends.
///
/// Falls back to bisection when the cubic minimizer is not finite or lands
/// within 10% of either end of the interval.
fn interpolate<F: Float>(lo: Trial<F>, hi: Trial<F>) -> F {
    let two = F::lit(2.0);
    let three = F::lit(3.0);
    let midpoint = (lo.alpha + hi.alpha) / two;

    let (a, b) = if lo.alpha < hi.alpha { (lo, hi) } else { (hi, lo) };
    let width = b.alpha - a.alpha;
    if !(width > F::zero()) || !a.phi.is_finite() || !b.phi.is_finite() {
        return midpoint;
    }

    let d1 = a.dphi + b.dphi - three * (a.phi - b.phi) / (a.alpha - b.alpha);
    let disc = d1 * d1 - a.dphi * b.dphi;
    if disc < F::zero() {
        return midpoint;
    }
    let d2 = disc.sqrt();
    let cubic = b.alpha - width * (b.dphi + d2 - d1) / (b.dphi - a.dphi + two * d2);

    let margin = F::lit(0.1) * width;
    if cubic.is_finite() && cubic > a.alpha + margin && cubic < b.alpha - margin {
        cubic
    } else {
        midpoint
    }
}

impl<F: Float> StepSizeSearch<F> for WolfeLineSearch<F> {
    fn step_size(
        &mut self,
        parameters: &[F],
        obj_value: F,
        jacobian: &[F],
        direction: &[F],
        problem: &mut dyn Problem<F>,
    ) -> F {
        let dphi0 = dot(jacobian, direction);
        if !(dphi0 < F::zero()) {
            warn!("search direction is not a descent direction (gᵀp = {})", dphi0);
            return F::zero();
        }

        let mut first_alpha = self.initial_step.initial_step(jacobian, direction);
        if !(first_alpha.is_finite() && first_alpha > F::zero()) {
            first_alpha = F::one();
        }
        first_alpha = first_alpha.min(self.params.max_step_size);

        let start = Trial {
            alpha: F::zero(),
            phi: obj_value,
            dphi: dphi0,
        };
        let step = self.search(parameters, direction, problem, start, first_alpha);
        self.initial_step.update(step);
        step
    }

    fn reset(&mut self) {
        self.initial_step.reset();
    }
}

// ============================================================
// Backtracking Armijo line search
// ============================================================

/// Constants of the backtracking search.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ArmijoParams<F> {
    /// Fraction of the predicted decrease `α ∇fᵀp` a step must achieve.
    pub c_1: F,
    /// Factor applied to a rejected step.
    pub shrink: F,
    /// Step tried first on every call.
    pub initial_step: F,
    /// Give up (and return 0) once the step drops below this.
    pub min_step: F,
}

impl<F: Float> ArmijoParams<F> {
    fn with_min_step(min_step: f64) -> Self {
        ArmijoParams {
            c_1: F::lit(1e-4),
            shrink: F::lit(0.5),
            initial_step: F::one(),
            min_step: F::lit(min_step),
        }
    }
}

/// `c_1 = 1e-4`, halving from 1 down to `1e-16`.
impl Default for ArmijoParams<f64> {
    fn default() -> Self {
        Self::with_min_step(1e-16)
    }
}

/// `c_1 = 1e-4`, halving from 1 down to `1e-8`.
impl Default for ArmijoParams<f32> {
    fn default() -> Self {
        Self::with_min_step(1e-8)
    }
}

/// Step-halving search that only asks for sufficient decrease.
///
/// Tries `initial_step, initial_step·shrink, …` until
/// `f(x + α p) <= f(x) + c_1 α ∇fᵀp`. Only objective values are queried.
/// No curvature condition is checked, so the `(s, y)` pairs it produces for
/// BFGS and L-BFGS may have `yᵀs <= 0` on non-convex problems.
#[derive(Debug, Clone)]
pub struct BacktrackingLineSearch<F> {
    params: ArmijoParams<F>,
}

impl<F: Float> BacktrackingLineSearch<F> {
    /// Create a backtracking search, validating `params`.
    pub fn new(params: ArmijoParams<F>) -> Result<Self, ConfigError> {
        let zero = F::zero();
        let one = F::one();
        let open_unit = |v: F| zero < v && v < one;
        if !open_unit(params.c_1) || !open_unit(params.shrink) {
            return Err(ConfigError::InvalidLineSearch(format!(
                "c_1 and shrink must lie in (0, 1), got c_1 = {}, shrink = {}",
                params.c_1, params.shrink
            )));
        }
        if !(params.initial_step.is_finite() && params.initial_step > zero) {
            return Err(ConfigError::InvalidStepSize(params.initial_step.to_string()));
        }
        Ok(BacktrackingLineSearch { params })
    }

    /// The search constants.
    pub fn params(&self) -> &ArmijoParams<F> {
        &self.params
    }
}

impl Default for BacktrackingLineSearch<f64> {
    fn default() -> Self {
        BacktrackingLineSearch {
            params: ArmijoParams::default(),
        }
    }
}

impl Default for BacktrackingLineSearch<f32> {
    fn default() -> Self {
        BacktrackingLineSearch {
            params: ArmijoParams::default(),
        }
    }
}

impl<F: Float> StepSizeSearch<F> for BacktrackingLineSearch<F> {
    fn step_size(
        &mut self,
        parameters: &[F],
        obj_value: F,
        jacobian: &[F],
        direction: &[F],
        problem: &mut dyn Problem<F>,
    ) -> F {
        let slope = dot(jacobian, direction);
        if !(slope < F::zero()) {
            warn!("search direction is not a descent direction (gᵀp = {})", slope);
            return F::zero();
        }

        let ArmijoParams {
            c_1,
            shrink,
            initial_step,
            min_step,
        } = self.params;
        let mut alpha = initial_step;
        while alpha >= min_step {
            let trial_value = problem.obj(&add_scaled(parameters, alpha, direction));
            if trial_value <= obj_value + c_1 * alpha * slope {
                return alpha;
            }
            alpha = alpha * shrink;
        }

        warn!("backtracking shrank the step below {} without sufficient decrease", min_step);
        F::zero()
    }

    fn reset(&mut self) {}
}

// ============================================================
// Constant step
// ============================================================

/// Always returns the same step, without consulting the oracle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedStep<F>(F);

impl<F: Float> FixedStep<F> {
    /// Create a constant step; `step` must be finite and positive.
    pub fn new(step: F) -> Result<Self, ConfigError> {
        if !(step.is_finite() && step > F::zero()) {
            return Err(ConfigError::InvalidStepSize(step.to_string()));
        }
        Ok(FixedStep(step))
    }

    /// The constant step.
    pub fn step(&self) -> F {
        self.0
    }
}

impl<F: Float> StepSizeSearch<F> for FixedStep<F> {
    fn step_size(
        &mut self,
        _parameters: &[F],
        _obj_value: F,
        _jacobian: &[F],
        _direction: &[F],
        _problem: &mut dyn Problem<F>,
    ) -> F {
        self.0
    }

    fn reset(&mut self) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::objective::FnProblem;

    /// f(x) = 0.5 * (x0^2 + x1^2)
    fn quadratic(x: &[f64]) -> (f64, Vec<f64>) {
        (0.5 * (x[0] * x[0] + x[1] * x[1]), vec![x[0], x[1]])
    }

    /// f(x) = 0.5 * (100 x0^2 + x1^2)
    fn stretched(x: &[f64]) -> (f64, Vec<f64>) {
        (
            0.5 * (100.0 * x[0] * x[0] + x[1] * x[1]),
            vec![100.0 * x[0], x[1]],
        )
    }

    fn steepest(problem: &mut dyn Problem<f64>, x: &[f64]) -> (f64, Vec<f64>, Vec<f64>) {
        let (f, g) = problem.obj_jac(x);
        let d = g.iter().map(|&gi| -gi).collect();
        (f, g, d)
    }

    #[allow(clippy::too_many_arguments)]
    fn assert_strong_wolfe(
        problem: &mut dyn Problem<f64>,
        x: &[f64],
        f: f64,
        g: &[f64],
        d: &[f64],
        alpha: f64,
        c_1: f64,
        c_2: f64,
    ) {
        let (f_new, g_new) = problem.obj_jac(&add_scaled(x, alpha, d));
        let dphi0 = dot(g, d);
        assert!(
            f_new <= f + c_1 * alpha * dphi0,
            "sufficient decrease violated at alpha = {}",
            alpha
        );
        assert!(
            dot(&g_new, d).abs() <= c_2 * dphi0.abs(),
            "curvature condition violated at alpha = {}",
            alpha
        );
    }

    #[test]
    fn wolfe_accepts_unit_step_on_quadratic() {
        let mut problem = FnProblem::new(quadratic);
        let x = vec![2.0, 3.0];
        let (f, g, d) = steepest(&mut problem, &x);

        let mut ls = WolfeLineSearch::quasi_newton();
        let alpha = ls.step_size(&x, f, &g, &d, &mut problem);
        assert!((alpha - 1.0).abs() < 1e-12, "alpha = {}", alpha);
    }

    #[test]
    fn wolfe_zooms_on_overshoot() {
        let mut problem = FnProblem::new(stretched);
        let x = vec![1.0, 1.0];
        let (f, g, d) = steepest(&mut problem, &x);

        let mut ls = WolfeLineSearch::steepest_descent();
        let alpha = ls.step_size(&x, f, &g, &d, &mut problem);
        assert!(alpha > 0.0 && alpha < 1.0, "alpha = {}", alpha);
        assert_strong_wolfe(&mut problem, &x, f, &g, &d, alpha, 1e-4, 0.1);
    }

    #[test]
    fn wolfe_expands_short_initial_step() {
        let mut problem = FnProblem::new(quadratic);
        let x = vec![2.0, 3.0];
        let (f, g, d) = steepest(&mut problem, &x);

        let mut ls = WolfeLineSearch::new(
            WolfeParams {
                c_2: 0.1,
                ..WolfeParams::default()
            },
            Box::new(IncrPrevStep::new(1.05, Some(0.01)).unwrap()),
        )
        .unwrap();
        let alpha = ls.step_size(&x, f, &g, &d, &mut problem);
        assert!(alpha > 0.01, "alpha = {}", alpha);
        assert_strong_wolfe(&mut problem, &x, f, &g, &d, alpha, 1e-4, 0.1);
    }

    #[test]
    fn wolfe_rejects_ascent_direction() {
        let mut problem = FnProblem::new(quadratic);
        let x = vec![2.0, 3.0];
        let (f, g) = problem.obj_jac(&x);

        let mut ls = WolfeLineSearch::quasi_newton();
        assert_eq!(ls.step_size(&x, f, &g, &g, &mut problem), 0.0);
    }

    #[test]
    fn wolfe_validates_constants() {
        let bad = WolfeParams {
            c_1: 0.5,
            c_2: 0.1,
            ..WolfeParams::<f64>::default()
        };
        let err = WolfeLineSearch::new(bad, Box::new(IncrPrevStep::default())).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidLineSearch(_)));

        let zero_iters = WolfeParams {
            max_iterations: 0,
            ..WolfeParams::<f64>::default()
        };
        assert!(WolfeLineSearch::new(zero_iters, Box::new(FOChangeInitialStep::new())).is_err());
    }

    #[test]
    fn incr_prev_step_grows_and_caps() {
        let mut init = IncrPrevStep::new(2.0, Some(3.0)).unwrap();
        assert_eq!(init.initial_step(&[1.0], &[-1.0]), 1.0);
        init.update(1.0);
        assert_eq!(init.initial_step(&[1.0], &[-1.0]), 2.0);
        init.update(2.0);
        assert_eq!(init.initial_step(&[1.0], &[-1.0]), 3.0);
        init.update(0.0);
        assert_eq!(init.initial_step(&[1.0], &[-1.0]), 1.0);
        init.update(2.0);
        init.reset();
        assert_eq!(init.initial_step(&[1.0], &[-1.0]), 1.0);
        assert!(IncrPrevStep::new(-1.0, None).is_err());
    }

    #[test]
    fn fo_change_scales_by_directional_derivative_ratio() {
        let mut init = FOChangeInitialStep::new();
        // gᵀp = -4
        assert_eq!(init.initial_step(&[2.0], &[-2.0]), 1.0);
        init.update(0.5);
        // gᵀp = -1: 0.5 * (-4) / (-1) = 2
        assert_eq!(init.initial_step(&[1.0], &[-1.0]), 2.0);
        init.reset();
        assert_eq!(init.initial_step(&[1.0], &[-1.0]), 1.0);
    }

    #[test]
    fn armijo_full_step_on_quadratic() {
        let mut problem = FnProblem::new(quadratic);
        let x = vec![2.0, 3.0];
        let (f, g, d) = steepest(&mut problem, &x);

        let mut ls = BacktrackingLineSearch::default();
        let alpha = ls.step_size(&x, f, &g, &d, &mut problem);
        // For a quadratic, steepest descent with alpha=1 satisfies Armijo with c=1e-4
        assert!((alpha - 1.0).abs() < 1e-12, "alpha = {}", alpha);
    }

    #[test]
    fn armijo_backtracks_on_stretched_quadratic() {
        let mut problem = FnProblem::new(stretched);
        let x = vec![1.0, 1.0];
        let (f, g, d) = steepest(&mut problem, &x);

        let mut ls = BacktrackingLineSearch::default();
        let alpha = ls.step_size(&x, f, &g, &d, &mut problem);
        assert!(alpha > 0.0 && alpha < 1.0);
        assert!(problem.obj(&add_scaled(&x, alpha, &d)) < f);
    }

    #[test]
    fn armijo_non_descent_returns_zero() {
        let mut problem = FnProblem::new(quadratic);
        let x = vec![2.0, 3.0];
        let (f, g) = problem.obj_jac(&x);

        let mut ls = BacktrackingLineSearch::default();
        assert_eq!(ls.step_size(&x, f, &g, &g, &mut problem), 0.0);
    }

    #[test]
    fn armijo_validates_params() {
        let params = ArmijoParams {
            shrink: 1.5,
            ..ArmijoParams::<f64>::default()
        };
        assert!(BacktrackingLineSearch::new(params).is_err());
    }

    #[test]
    fn armijo_defaults_depend_on_precision() {
        let double = BacktrackingLineSearch::<f64>::default();
        let single = BacktrackingLineSearch::<f32>::default();
        assert_eq!(double.params().min_step, 1e-16);
        assert_eq!(single.params().min_step, 1e-8);
        assert_eq!(single.params().shrink, 0.5);
        assert_eq!(double.params().initial_step, 1.0);
    }

    #[test]
    fn fixed_step_ignores_problem() {
        let mut problem = FnProblem::new(quadratic);
        let mut ls = FixedStep::new(0.25).unwrap();
        assert_eq!(ls.step_size(&[1.0, 1.0], 1.0, &[1.0, 1.0], &[-1.0, -1.0], &mut problem), 0.25);
        assert_eq!(problem.evals(), 0);
        assert!(FixedStep::new(0.0).is_err());
        assert!(FixedStep::new(f64::NAN).is_err());
    }
}
