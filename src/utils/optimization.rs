//! Derivative-free minimisation for model parameter estimation.

/// Result of Nelder-Mead optimization.
#[derive(Debug, Clone)]
pub struct NelderMeadResult {
    /// The optimal point found.
    pub optimal_point: Vec<f64>,
    /// The objective function value at the optimal point.
    pub optimal_value: f64,
    /// Number of iterations performed.
    pub iterations: usize,
    /// Whether the algorithm converged.
    pub converged: bool,
}

/// Configuration for Nelder-Mead optimization.
#[derive(Debug, Clone)]
pub struct NelderMeadConfig {
    /// Maximum number of iterations.
    pub max_iter: usize,
    /// Convergence tolerance on both objective spread and simplex size.
    pub tolerance: f64,
    /// Reflection coefficient (default: 1.0).
    pub alpha: f64,
    /// Expansion coefficient (default: 2.0).
    pub gamma: f64,
    /// Contraction coefficient (default: 0.5).
    pub rho: f64,
    /// Shrinkage coefficient (default: 0.5).
    pub sigma: f64,
    /// Initial simplex step, relative to each coordinate's magnitude (default: 0.05).
    pub initial_step: f64,
}

impl Default for NelderMeadConfig {
    fn default() -> Self {
        Self {
            max_iter: 1000,
            tolerance: 1e-8,
            alpha: 1.0,
            gamma: 2.0,
            rho: 0.5,
            sigma: 0.5,
            initial_step: 0.05,
        }
    }
}

#[derive(Debug, Clone)]
struct Vertex {
    point: Vec<f64>,
    value: f64,
}

/// Simplex state: vertices kept sorted best-first after each step.
struct Simplex<'a, F> {
    vertices: Vec<Vertex>,
    objective: F,
    bounds: Option<&'a [(f64, f64)]>,
}

impl<'a, F> Simplex<'a, F>
where
    F: Fn(&[f64]) -> f64,
{
    fn new(objective: F, initial: &[f64], bounds: Option<&'a [(f64, f64)]>, step: f64) -> Self {
        let mut simplex = Self {
            vertices: Vec::with_capacity(initial.len() + 1),
            objective,
            bounds,
        };
        let origin = simplex.evaluate(initial.to_vec());
        simplex.vertices.push(origin);
        for i in 0..initial.len() {
            let mut point = initial.to_vec();
            point[i] += if initial[i].abs() > 1e-10 {
                step * initial[i].abs()
            } else {
                step
            };
            let vertex = simplex.evaluate(point);
            simplex.vertices.push(vertex);
        }
        simplex.sort();
        simplex
    }

    /// Clamp into bounds and evaluate; non-finite objective values become `f64::MAX`.
    fn evaluate(&self, mut point: Vec<f64>) -> Vertex {
        if let Some(bounds) = self.bounds {
            for (x, &(lo, hi)) in point.iter_mut().zip(bounds) {
                *x = x.clamp(lo, hi);
            }
        }
        let value = (self.objective)(&point);
        Vertex {
            point,
            value: if value.is_finite() { value } else { f64::MAX },
        }
    }

    fn sort(&mut self) {
        self.vertices.sort_by(|a, b| a.value.total_cmp(&b.value));
    }

    fn best(&self) -> &Vertex {
        &self.vertices[0]
    }

    fn worst(&self) -> &Vertex {
        &self.vertices[self.vertices.len() - 1]
    }

    fn second_worst(&self) -> &Vertex {
        &self.vertices[self.vertices.len() - 2]
    }

    /// Centroid of every vertex except the worst.
    fn centroid(&self) -> Vec<f64> {
        let kept = &self.vertices[..self.vertices.len() - 1];
        let mut centroid = vec![0.0; kept[0].point.len()];
        for vertex in kept {
            for (c, x) in centroid.iter_mut().zip(&vertex.point) {
                *c += x;
            }
        }
        let count = kept.len() as f64;
        centroid.iter_mut().for_each(|c| *c /= count);
        centroid
    }

    fn has_converged(&self, tolerance: f64) -> bool {
        if self.worst().value - self.best().value < tolerance {
            return true;
        }
        let best = &self.best().point;
        self.vertices
            .iter()
            .all(|v| distance(&v.point, best) < tolerance)
    }

    fn replace_worst(&mut self, vertex: Vertex) {
        let last = self.vertices.len() - 1;
        self.vertices[last] = vertex;
        self.sort();
    }

    fn shrink(&mut self, sigma: f64) {
        let best = self.best().point.clone();
        for i in 1..self.vertices.len() {
            let point = towards(&best, &self.vertices[i].point, sigma);
            self.vertices[i] = self.evaluate(point);
        }
        self.sort();
    }

    /// One Nelder-Mead iteration.
    fn step(&mut self, config: &NelderMeadConfig) {
        let centroid = self.centroid();
        let reflected = self.evaluate(towards(&centroid, &self.worst().point, -config.alpha));

        if reflected.value < self.best().value {
            let expanded = self.evaluate(towards(&centroid, &reflected.point, config.gamma));
            let winner = if expanded.value < reflected.value {
                expanded
            } else {
                reflected
            };
            self.replace_worst(winner);
            return;
        }

        if reflected.value < self.second_worst().value {
            self.replace_worst(reflected);
            return;
        }

        let contracted = if reflected.value < self.worst().value {
            let outside = self.evaluate(towards(&centroid, &reflected.point, config.rho));
            (outside.value <= reflected.value).then_some(outside)
        } else {
            let inside = self.evaluate(towards(&centroid, &self.worst().point, config.rho));
            (inside.value < self.worst().value).then_some(inside)
        };

        match contracted {
            Some(vertex) => self.replace_worst(vertex),
            None => self.shrink(config.sigma),
        }
    }
}

/// `from + t * (to - from)`.
fn towards(from: &[f64], to: &[f64], t: f64) -> Vec<f64> {
    from.iter().zip(to).map(|(a, b)| a + t * (b - a)).collect()
}

fn distance(a: &[f64], b: &[f64]) -> f64 {
    a.iter()
        .zip(b)
        .map(|(x, y)| (x - y).powi(2))
        .sum::<f64>()
        .sqrt()
}

/// Perform Nelder-Mead simplex optimization.
///
/// `bounds` clamps every trial point per coordinate. Trial points where the
/// objective is NaN or infinite are ranked as worst possible, so regions where
/// a model recursion explodes are avoided rather than aborting the search.
///
/// # Example
/// ```
/// use demand_forecast::utils::optimization::{nelder_mead, NelderMeadConfig};
///
/// // Minimize (x-2)^2 + (y-3)^2
/// let result = nelder_mead(
///     |x| (x[0] - 2.0).powi(2) + (x[1] - 3.0).powi(2),
///     &[0.0, 0.0],
///     None,
///     NelderMeadConfig::default(),
/// );
///
/// assert!(result.converged);
/// assert!((result.optimal_point[0] - 2.0).abs() < 0.01);
/// assert!((result.optimal_point[1] - 3.0).abs() < 0.01);
/// ```
pub fn nelder_mead<F>(
    objective: F,
    initial: &[f64],
    bounds: Option<&[(f64, f64)]>,
    config: NelderMeadConfig,
) -> NelderMeadResult
where
    F: Fn(&[f64]) -> f64,
{
    if initial.is_empty() {
        return NelderMeadResult {
            optimal_point: vec![],
            optimal_value: f64::NAN,
            iterations: 0,
            converged: false,
        };
    }

    let mut simplex = Simplex::new(objective, initial, bounds, config.initial_step);
    let mut iterations = 0;
    let mut converged = false;

    while iterations < config.max_iter {
        if simplex.has_converged(config.tolerance) {
            converged = true;
            break;
        }
        iterations += 1;
        simplex.step(&config);
    }

    let best = simplex.best().clone();
    NelderMeadResult {
        optimal_point: best.point,
        optimal_value: best.value,
        iterations,
        converged,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn quadratic_2d() {
        let result = nelder_mead(
            |x| (x[0] - 2.0).powi(2) + (x[1] - 3.0).powi(2),
            &[0.0, 0.0],
            None,
            NelderMeadConfig::default(),
        );

        assert!(result.converged);
        assert_relative_eq!(result.optimal_point[0], 2.0, epsilon = 1e-3);
        assert_relative_eq!(result.optimal_point[1], 3.0, epsilon = 1e-3);
        assert_relative_eq!(result.optimal_value, 0.0, epsilon = 1e-6);
    }

    #[test]
    fn rosenbrock() {
        let config = NelderMeadConfig {
            max_iter: 5000,
            tolerance: 1e-12,
            ..Default::default()
        };
        let result = nelder_mead(
            |x| (1.0 - x[0]).powi(2) + 100.0 * (x[1] - x[0].powi(2)).powi(2),
            &[-1.2, 1.0],
            None,
            config,
        );

        assert_relative_eq!(result.optimal_point[0], 1.0, epsilon = 1e-2);
        assert_relative_eq!(result.optimal_point[1], 1.0, epsilon = 1e-2);
    }

    #[test]
    fn bounded_minimum_sits_on_boundary() {
        let result = nelder_mead(
            |x| (x[0] - 5.0).powi(2),
            &[1.0],
            Some(&[(0.0, 3.0)]),
            NelderMeadConfig::default(),
        );
        assert_relative_eq!(result.optimal_point[0], 3.0, epsilon = 1e-4);
    }

    #[test]
    fn non_finite_region_is_avoided() {
        // Objective explodes for x > 1, true minimum at 0.5
        let result = nelder_mead(
            |x| if x[0] > 1.0 { f64::NAN } else { (x[0] - 0.5).powi(2) },
            &[0.9],
            None,
            NelderMeadConfig::default(),
        );
        assert!(result.optimal_value.is_finite());
        assert_relative_eq!(result.optimal_point[0], 0.5, epsilon = 1e-3);
    }

    #[test]
    fn large_scale_intercept() {
        // Demand-level intercept with a small AR-like coefficient
        let result = nelder_mead(
            |x| (x[0] - 250.0).powi(2) + 50.0 * (x[1] - 0.3).powi(2),
            &[200.0, 0.1],
            None,
            NelderMeadConfig {
                max_iter: 2000,
                ..Default::default()
            },
        );
        assert_relative_eq!(result.optimal_point[0], 250.0, epsilon = 1e-2);
        assert_relative_eq!(result.optimal_point[1], 0.3, epsilon = 1e-2);
    }

    #[test]
    fn iteration_cap_is_respected() {
        let config = NelderMeadConfig {
            max_iter: 3,
            ..Default::default()
        };
        let result = nelder_mead(|x| x[0].powi(2) + x[1].powi(2), &[5.0, 5.0], None, config);
        assert_eq!(result.iterations, 3);
        assert!(!result.converged);
    }

    #[test]
    fn empty_initial() {
        let result = nelder_mead(|_| 0.0, &[], None, NelderMeadConfig::default());
        assert!(!result.converged);
        assert!(result.optimal_value.is_nan());
    }

    #[test]
    fn already_optimal() {
        let result = nelder_mead(
            |x| (x[0] - 2.0).powi(2),
            &[2.0],
            None,
            NelderMeadConfig::default(),
        );
        assert!(result.converged);
        assert_relative_eq!(result.optimal_point[0], 2.0, epsilon = 1e-4);
    }
}
