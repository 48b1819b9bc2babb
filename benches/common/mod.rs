#![allow(dead_code)]

// ─── Rosenbrock ────────────────────────────────────────────────────────────
// f(x) = Σ[(1 - x_i)² + 100·(x_{i+1} - x_i²)²]
// Curved valley, the standard quasi-Newton workload.

pub fn rosenbrock(x: &[f64]) -> (f64, Vec<f64>) {
    let n = x.len();
    let mut f = 0.0;
    let mut g = vec![0.0; n];
    for i in 0..n - 1 {
        let t1 = 1.0 - x[i];
        let t2 = x[i + 1] - x[i] * x[i];
        f += t1 * t1 + 100.0 * t2 * t2;
        g[i] += -2.0 * t1 - 400.0 * x[i] * t2;
        g[i + 1] += 200.0 * t2;
    }
    (f, g)
}

// ─── Ill-conditioned quadratic ─────────────────────────────────────────────
// f(x) = ½ Σ (i+1)·x_i², condition number n.

pub fn diagonal_quadratic(x: &[f64]) -> (f64, Vec<f64>) {
    let g: Vec<f64> = x
        .iter()
        .enumerate()
        .map(|(i, &xi)| (i + 1) as f64 * xi)
        .collect();
    let f = 0.5 * x.iter().zip(&g).map(|(a, b)| a * b).sum::<f64>();
    (f, g)
}

// ─── Input generators ──────────────────────────────────────────────────────

pub fn make_input(n: usize) -> Vec<f64> {
    (0..n).map(|i| 0.5 + 0.01 * i as f64).collect()
}

pub fn rosenbrock_start(n: usize) -> Vec<f64> {
    (0..n).map(|i| if i % 2 == 0 { -1.2 } else { 1.0 }).collect()
}
