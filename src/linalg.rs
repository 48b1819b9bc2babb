use crate::convergence::dot;
use crate::float::Float;

/// Dense square matrix stored as rows: `m[row][col]`.
pub type Matrix<F> = Vec<Vec<F>>;

/// The `n x n` identity matrix.
pub fn identity<F: Float>(n: usize) -> Matrix<F> {
    scaled_identity(n, F::one())
}

/// The `n x n` diagonal matrix `gamma * I`.
pub fn scaled_identity<F: Float>(n: usize, gamma: F) -> Matrix<F> {
    let mut m = vec![vec![F::zero(); n]; n];
    for (i, row) in m.iter_mut().enumerate() {
        row[i] = gamma;
    }
    m
}

/// Matrix-vector product `a * v`.
pub fn mat_vec<F: Float>(a: &[Vec<F>], v: &[F]) -> Vec<F> {
    a.iter().map(|row| dot(row, v)).collect()
}

/// Elementwise `a - b`.
pub fn sub<F: Float>(a: &[F], b: &[F]) -> Vec<F> {
    debug_assert_eq!(a.len(), b.len());
    a.iter().zip(b.iter()).map(|(&ai, &bi)| ai - bi).collect()
}

/// `x + alpha * d` as a new vector.
pub fn add_scaled<F: Float>(x: &[F], alpha: F, d: &[F]) -> Vec<F> {
    debug_assert_eq!(x.len(), d.len());
    x.iter().zip(d.iter()).map(|(&xi, &di)| xi + alpha * di).collect()
}

/// In-place `y += alpha * x`.
pub fn axpy<F: Float>(alpha: F, x: &[F], y: &mut [F]) {
    debug_assert_eq!(x.len(), y.len());
    for (yi, &xi) in y.iter_mut().zip(x.iter()) {
        *yi = *yi + alpha * xi;
    }
}

/// Elementwise negation.
pub fn negate<F: Float>(v: &[F]) -> Vec<F> {
    v.iter().map(|&vi| -vi).collect()
}

/// Apply the BFGS inverse-Hessian update.
///
/// ```text
/// H_{k+1} = (I - ρ s yᵀ) H_k (I - ρ y sᵀ) + ρ s sᵀ,   ρ = 1 / (yᵀ s)
/// ```
///
/// `s` is the parameter difference and `y` the gradient difference between
/// two consecutive iterations. Returns `None` when `yᵀ s == 0`: the pair
/// carries no curvature information and the caller should keep `h`.
///
/// Computed in O(n²) without forming `I - ρ s yᵀ`; `h` need not be symmetric.
// Explicit indexing keeps the rank-one terms readable against the formula above
#[allow(clippy::needless_range_loop)]
pub fn bfgs_update<F: Float>(h: &[Vec<F>], s: &[F], y: &[F]) -> Option<Matrix<F>> {
    let n = s.len();
    debug_assert_eq!(y.len(), n);
    debug_assert_eq!(h.len(), n);

    let ys = dot(y, s);
    if ys == F::zero() {
        return None;
    }
    let rho = F::one() / ys;

    // w = yᵀ H
    let mut w = vec![F::zero(); n];
    for i in 0..n {
        for j in 0..n {
            w[j] = w[j] + y[i] * h[i][j];
        }
    }

    // M = (I - ρ s yᵀ) H = H - ρ s wᵀ
    let mut m: Matrix<F> = h.to_vec();
    for i in 0..n {
        let rs = rho * s[i];
        for j in 0..n {
            m[i][j] = m[i][j] - rs * w[j];
        }
    }

    // M (I - ρ y sᵀ) + ρ s sᵀ = M - ρ (M y) sᵀ + ρ s sᵀ
    let my = mat_vec(&m, y);
    for i in 0..n {
        let coeff = rho * (s[i] - my[i]);
        for j in 0..n {
            m[i][j] = m[i][j] + coeff * s[j];
        }
    }

    Some(m)
}
