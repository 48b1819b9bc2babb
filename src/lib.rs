pub mod convergence;
pub mod error;
pub mod float;
pub mod line_search;
pub mod linalg;
pub mod minimize;
pub mod objective;
pub mod optimizer;
pub mod result;
pub mod solvers;

pub use convergence::{ConvergenceParams, JACOBIAN_NORM_BREAK};
pub use error::ConfigError;
pub use float::Float;
pub use line_search::{
    ArmijoParams, BacktrackingLineSearch, FOChangeInitialStep, FixedStep, IncrPrevStep,
    InitialStep, StepSizeSearch, WolfeLineSearch, WolfeParams,
};
pub use linalg::Matrix;
pub use minimize::minimize;
pub use objective::{CachedProblem, FnProblem, Problem};
pub use optimizer::{make_optimizer, Optimizer, LBFGS_PARAMETER_THRESHOLD};
pub use result::{OptimResult, TerminationReason};
pub use solvers::bfgs::{identity_hessian, scaled_identity_hessian, Bfgs, BfgsConfig, InitialHessianFn};
pub use solvers::lbfgs::{gamma_scalar, one_scalar, CurvaturePair, InitialScalarFn, Lbfgs, LbfgsConfig};
pub use solvers::steepest::{MomentumConfig, SteepestDescent, SteepestDescentMomentum};
