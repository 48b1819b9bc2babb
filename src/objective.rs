use crate::float::Float;

/// Objective/gradient oracle queried by the optimizers.
///
/// Implementors return the objective value and its gradient (the jacobian of
/// a scalar objective) for a parameter vector. Methods take `&mut self` to
/// allow caching, evaluation counting, and internal buffers, but results must
/// be deterministic for a given input.
pub trait Problem<F: Float> {
    /// Evaluate the objective and its gradient at `parameters`.
    ///
    /// Returns `(f(x), ∇f(x))`; the gradient has the same length as `parameters`.
    fn obj_jac(&mut self, parameters: &[F]) -> (F, Vec<F>);

    /// Evaluate only the objective at `parameters`.
    ///
    /// Defaults to `obj_jac(parameters).0`. Override when the value alone is
    /// cheaper to compute.
    fn obj(&mut self, parameters: &[F]) -> F {
        self.obj_jac(parameters).0
    }
}

impl<F: Float, P: Problem<F> + ?Sized> Problem<F> for &mut P {
    fn obj_jac(&mut self, parameters: &[F]) -> (F, Vec<F>) {
        (**self).obj_jac(parameters)
    }

    fn obj(&mut self, parameters: &[F]) -> F {
        (**self).obj(parameters)
    }
}

/// Adapter wrapping a closure `x -> (f(x), ∇f(x))` as a [`Problem`].
pub struct FnProblem<Func> {
    func: Func,
    evals: usize,
}

impl<Func> FnProblem<Func> {
    /// Create a new `FnProblem` from an objective/gradient closure.
    pub fn new(func: Func) -> Self {
        FnProblem { func, evals: 0 }
    }

    /// Number of oracle evaluations performed so far.
    pub fn evals(&self) -> usize {
        self.evals
    }
}

impl<F, Func> Problem<F> for FnProblem<Func>
where
    F: Float,
    Func: FnMut(&[F]) -> (F, Vec<F>),
{
    fn obj_jac(&mut self, parameters: &[F]) -> (F, Vec<F>) {
        self.evals += 1;
        (self.func)(parameters)
    }
}

/// Remembers the last evaluated point so repeated queries are free.
///
/// Optimizers evaluate the oracle at the start of every iteration, at the
/// point the previous line search just accepted. Wrapping the problem in a
/// `CachedProblem` answers that query from the line search's last evaluation.
/// Only bit-identical parameter vectors hit the cache.
pub struct CachedProblem<P, F> {
    inner: P,
    last: Option<(Vec<F>, F, Vec<F>)>,
    hits: usize,
}

impl<P, F: Float> CachedProblem<P, F> {
    /// Wrap `inner` with an empty cache.
    pub fn new(inner: P) -> Self {
        CachedProblem {
            inner,
            last: None,
            hits: 0,
        }
    }

    /// Number of queries answered from the cache.
    pub fn hits(&self) -> usize {
        self.hits
    }

    /// Drop the cached point.
    pub fn clear(&mut self) {
        self.last = None;
    }

    /// Borrow the wrapped problem.
    pub fn inner(&self) -> &P {
        &self.inner
    }

    /// Unwrap into the inner problem.
    pub fn into_inner(self) -> P {
        self.inner
    }
}

impl<P: Problem<F>, F: Float> Problem<F> for CachedProblem<P, F> {
    fn obj_jac(&mut self, parameters: &[F]) -> (F, Vec<F>) {
        if let Some((x, value, jacobian)) = &self.last {
            if x.as_slice() == parameters {
                self.hits += 1;
                return (*value, jacobian.clone());
            }
        }

        let (value, jacobian) = self.inner.obj_jac(parameters);
        self.last = Some((parameters.to_vec(), value, jacobian.clone()));
        (value, jacobian)
    }

    fn obj(&mut self, parameters: &[F]) -> F {
        if let Some((x, value, _)) = &self.last {
            if x.as_slice() == parameters {
                self.hits += 1;
                return *value;
            }
        }
        // Value-only queries don't populate the cache: there is no gradient to store.
        self.inner.obj(parameters)
    }
}
