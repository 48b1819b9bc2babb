/// Invalid optimizer or step-size configuration, reported at construction.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    /// Momentum rate outside `[0, 1)` or not finite.
    #[error("momentum rate must be finite and in [0, 1), got {0}")]
    InvalidMomentumRate(String),
    /// L-BFGS history size of zero.
    #[error("L-BFGS memory must be at least 1, got {0}")]
    InvalidMemory(usize),
    /// Line search constants violate `0 < c_1 < c_2 < 1` or a limit is zero.
    #[error("invalid line search parameters: {0}")]
    InvalidLineSearch(String),
    /// A fixed or initial step that is not finite and positive.
    #[error("step size must be finite and positive, got {0}")]
    InvalidStepSize(String),
    /// An initial-step growth rate that is not finite and positive.
    #[error("step increment rate must be finite and positive, got {0}")]
    InvalidIncrRate(String),
}
