use log::{debug, info};

use crate::convergence::{dot, is_converged};
use crate::float::Float;
use crate::line_search::{StepSizeSearch, WolfeLineSearch};
use crate::linalg::{add_scaled, bfgs_update, identity, mat_vec, negate, scaled_identity, sub, Matrix};
use crate::objective::Problem;
use crate::optimizer::{evaluate, Optimizer};

/// Builds the inverse Hessian fed to the first BFGS update.
///
/// Called with `(parameters, prev_parameters, jacobian, prev_jacobian)` on the
/// second iteration, when the first curvature pair becomes available.
pub type InitialHessianFn<F> = fn(&[F], &[F], &[F], &[F]) -> Matrix<F>;

/// Identity matrix, regardless of the curvature pair.
pub fn identity_hessian<F: Float>(
    parameters: &[F],
    _prev_parameters: &[F],
    _jacobian: &[F],
    _prev_jacobian: &[F],
) -> Matrix<F> {
    identity(parameters.len())
}

/// Identity scaled by `γ = (sᵀy) / (yᵀy)` from the first curvature pair.
///
/// `s = parameters - prev_parameters`, `y = jacobian - prev_jacobian`.
/// Falls back to the identity when `yᵀy == 0`.
pub fn scaled_identity_hessian<F: Float>(
    parameters: &[F],
    prev_parameters: &[F],
    jacobian: &[F],
    prev_jacobian: &[F],
) -> Matrix<F> {
    let s = sub(parameters, prev_parameters);
    let y = sub(jacobian, prev_jacobian);
    let yy = dot(&y, &y);
    if yy == F::zero() {
        return identity(parameters.len());
    }
    scaled_identity(parameters.len(), dot(&s, &y) / yy)
}

/// Configuration for the BFGS optimizer.
#[derive(Debug)]
pub struct BfgsConfig<F> {
    /// Step-size search; should satisfy the Wolfe conditions so `yᵀs > 0`
    /// (default: strong Wolfe with `c_1 = 1e-4`, `c_2 = 0.9`).
    pub line_search: Box<dyn StepSizeSearch<F>>,
    /// Inverse Hessian used for the first update (default: [`identity_hessian`]).
    ///
    /// [`scaled_identity_hessian`] is the textbook recommendation, but the
    /// unscaled identity tends to work better on network training problems.
    pub initial_hessian: InitialHessianFn<F>,
}

impl<F: Float> Default for BfgsConfig<F> {
    fn default() -> Self {
        BfgsConfig {
            line_search: Box::new(WolfeLineSearch::quasi_newton()),
            initial_hessian: identity_hessian,
        }
    }
}

/// Quasi-Newton BFGS optimizer with a dense inverse-Hessian approximation.
///
/// Each iteration updates `H` with the latest curvature pair
/// `s = x_k - x_{k-1}`, `y = ∇f_k - ∇f_{k-1}` and steps along `-H ∇f_k`:
///
/// ```text
/// H_{k+1} = (I - ρ s yᵀ) H_k (I - ρ y sᵀ) + ρ s sᵀ,   ρ = 1 / (yᵀ s)
/// ```
///
/// The first iteration uses `H = I` without storing it; the second feeds the
/// configured initial Hessian into the update; later iterations update the
/// stored matrix. A pair with `yᵀs == 0` is skipped and `H` reused.
///
/// Memory and time per iteration are O(n²); prefer
/// [`Lbfgs`](crate::solvers::lbfgs::Lbfgs) for large parameter vectors.
#[derive(Debug)]
pub struct Bfgs<F> {
    line_search: Box<dyn StepSizeSearch<F>>,
    initial_hessian: InitialHessianFn<F>,
    jacobian: Option<Vec<F>>,
    prev_params: Option<Vec<F>>,
    prev_jacobian: Option<Vec<F>>,
    prev_inv_hessian: Option<Matrix<F>>,
}

impl<F: Float> Bfgs<F> {
    /// Create a BFGS optimizer.
    pub fn new(config: BfgsConfig<F>) -> Self {
        Bfgs {
            line_search: config.line_search,
            initial_hessian: config.initial_hessian,
            jacobian: None,
            prev_params: None,
            prev_jacobian: None,
            prev_inv_hessian: None,
        }
    }

    /// Inverse Hessian approximation stored by the latest update.
    ///
    /// `None` until the second iteration.
    pub fn inverse_hessian(&self) -> Option<&Matrix<F>> {
        self.prev_inv_hessian.as_ref()
    }

    /// Fold the curvature pair ending at `parameters` into the stored inverse Hessian.
    fn update_inv_hessian(&mut self, parameters: &[F], jacobian: &[F]) {
        if let (Some(prev_params), Some(prev_jacobian)) = (&self.prev_params, &self.prev_jacobian) {
            let h_k = match self.prev_inv_hessian.take() {
                Some(h) => h,
                None => (self.initial_hessian)(parameters, prev_params, jacobian, prev_jacobian),
            };
            let s = sub(parameters, prev_params);
            let y = sub(jacobian, prev_jacobian);

            let h_kp1 = match bfgs_update(&h_k, &s, &y) {
                Some(h) => h,
                None => {
                    // No change in parameters or jacobian along s: nothing to learn.
                    debug!("skipping BFGS update with zero curvature (yᵀs = 0)");
                    h_k
                }
            };
            self.prev_inv_hessian = Some(h_kp1);
        }

        self.prev_params = Some(parameters.to_vec());
        self.prev_jacobian = Some(jacobian.to_vec());
    }
}

impl<F: Float> Default for Bfgs<F> {
    fn default() -> Self {
        Self::new(BfgsConfig::default())
    }
}

impl<F: Float> Optimizer<F> for Bfgs<F> {
    fn next(&mut self, problem: &mut dyn Problem<F>, parameters: Vec<F>) -> (F, Vec<F>) {
        let (obj_value, jacobian) = evaluate(problem, &parameters);

        if is_converged(&jacobian) {
            info!("optimizer converged with small jacobian");
            self.jacobian = Some(jacobian);
            return (obj_value, parameters);
        }

        self.update_inv_hessian(&parameters, &jacobian);

        // First iteration: H = I, so the direction is exactly -∇f.
        let direction = match &self.prev_inv_hessian {
            Some(h) => negate(&mat_vec(h, &jacobian)),
            None => negate(&jacobian),
        };

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
        self.prev_inv_hessian = None;
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

    /// Returns scripted gradients in order, objective 0.
    struct Scripted {
        gradients: Vec<Vec<f64>>,
        calls: usize,
    }

    impl Problem<f64> for Scripted {
        fn obj_jac(&mut self, _parameters: &[f64]) -> (f64, Vec<f64>) {
            let g = self.gradients[self.calls].clone();
            self.calls += 1;
            (0.0, g)
        }
    }

    fn unit_step() -> BfgsConfig<f64> {
        BfgsConfig {
            line_search: Box::new(FixedStep::new(1.0).unwrap()),
            initial_hessian: identity_hessian,
        }
    }

    #[test]
    fn first_iteration_is_steepest_descent() {
        let mut problem = Scripted {
            gradients: vec![vec![0.3, -1.7, 2.5]],
            calls: 0,
        };
        let mut opt = Bfgs::new(unit_step());
        let (_, x) = opt.next(&mut problem, vec![1.0, 2.0, 3.0]);

        assert_eq!(x, vec![1.0 - 0.3, 2.0 + 1.7, 3.0 - 2.5]);
        assert!(opt.inverse_hessian().is_none());
    }

    #[test]
    fn second_iteration_updates_from_initial_hessian() {
        let mut problem = Scripted {
            gradients: vec![vec![1.0, 0.0], vec![0.5, 0.0]],
            calls: 0,
        };
        let mut opt = Bfgs::new(unit_step());

        let (_, x1) = opt.next(&mut problem, vec![0.0, 0.0]);
        assert_eq!(x1, vec![-1.0, 0.0]);

        // s = [-1, 0], y = [-0.5, 0]: inverse curvature 2 along the first axis.
        let (_, x2) = opt.next(&mut problem, x1);
        let h = opt.inverse_hessian().unwrap();
        assert!((h[0][0] - 2.0).abs() < 1e-15);
        assert!((h[1][1] - 1.0).abs() < 1e-15);
        assert_eq!(h[0][1], 0.0);
        assert!((x2[0] - -2.0).abs() < 1e-15);
    }

    #[test]
    fn zero_curvature_keeps_previous_inverse_hessian() {
        let mut problem = Scripted {
            gradients: vec![vec![1.0, 0.0], vec![0.5, 0.0], vec![0.5, 3.0]],
            calls: 0,
        };
        let mut opt = Bfgs::new(unit_step());

        let (_, x1) = opt.next(&mut problem, vec![0.0, 0.0]);
        let (_, x2) = opt.next(&mut problem, x1);
        let before = opt.inverse_hessian().unwrap().clone();

        // s = [-1, 0], y = [0, 3]: yᵀs = 0.
        opt.next(&mut problem, x2);
        assert_eq!(opt.inverse_hessian().unwrap(), &before);
    }

    #[test]
    fn zero_curvature_on_first_pair_stores_initial_hessian() {
        let gradients = vec![vec![1.0, 0.0], vec![1.0, 3.0]];
        let mut problem = Scripted {
            gradients: gradients.clone(),
            calls: 0,
        };
        let mut opt = Bfgs::new(BfgsConfig {
            line_search: Box::new(FixedStep::new(1.0).unwrap()),
            initial_hessian: scaled_identity_hessian,
        });

        let x0 = vec![0.0, 0.0];
        let (_, x1) = opt.next(&mut problem, x0.clone());
        // s = [-1, 0], y = [0, 3]: yᵀs = 0, so the heuristic's matrix is kept as is.
        opt.next(&mut problem, x1.clone());

        let expected = scaled_identity_hessian(&x1, &x0, &gradients[1], &gradients[0]);
        assert_eq!(opt.inverse_hessian(), Some(&expected));

        let mut problem = Scripted {
            gradients,
            calls: 0,
        };
        let mut opt = Bfgs::new(unit_step());
        let (_, x1) = opt.next(&mut problem, vec![0.0, 0.0]);
        opt.next(&mut problem, x1);
        assert_eq!(opt.inverse_hessian(), Some(&identity(2)));
    }

    #[test]
    fn scaled_identity_uses_first_pair() {
        let h = scaled_identity_hessian(&[1.0, 1.0], &[0.0, 0.0], &[2.0, 2.0], &[0.0, 0.0]);
        // sᵀy = 4, yᵀy = 8
        assert_eq!(h, vec![vec![0.5, 0.0], vec![0.0, 0.5]]);

        let h = scaled_identity_hessian(&[1.0], &[0.0], &[2.0], &[2.0]);
        assert_eq!(h, vec![vec![1.0]]);
    }

    #[test]
    fn minimizes_quadratic() {
        // f(x) = 0.5 xᵀ A x with A = [[3, 1], [1, 2]]
        let mut problem = FnProblem::new(|x: &[f64]| {
            let g = vec![3.0 * x[0] + x[1], x[0] + 2.0 * x[1]];
            (0.5 * (x[0] * g[0] + x[1] * g[1]), g)
        });
        let mut opt = Bfgs::<f64>::default();
        let mut x = vec![4.0, -3.0];
        for _ in 0..20 {
            x = opt.next(&mut problem, x).1;
        }
        assert!(x[0].abs() < 1e-8 && x[1].abs() < 1e-8, "x = {:?}", x);
    }

    #[test]
    fn reset_forgets_curvature() {
        let mut problem = Scripted {
            gradients: vec![vec![1.0, 0.0], vec![0.5, 0.0], vec![1.0, 0.0]],
            calls: 0,
        };
        let mut opt = Bfgs::new(unit_step());
        let (_, x1) = opt.next(&mut problem, vec![0.0, 0.0]);
        opt.next(&mut problem, x1);
        assert!(opt.inverse_hessian().is_some());

        opt.reset();
        assert!(opt.inverse_hessian().is_none());
        assert!(opt.jacobian().is_none());

        // Back to H = I.
        let (_, x) = opt.next(&mut problem, vec![0.0, 0.0]);
        assert_eq!(x, vec![-1.0, 0.0]);
        assert!(opt.inverse_hessian().is_none());
    }
}
