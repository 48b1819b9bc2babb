pub mod bfgs;
pub mod lbfgs;
pub mod steepest;
