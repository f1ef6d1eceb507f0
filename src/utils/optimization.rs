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
    /// Convergence tolerance, relative to the best objective value.
    pub tolerance: f64,
    /// Reflection coefficient (default: 1.0).
    pub alpha: f64,
    /// Expansion coefficient (default: 2.0).
    pub gamma: f64,
    /// Contraction coefficient (default: 0.5).
    pub rho: f64,
    /// Shrinkage coefficient (default: 0.5).
    pub sigma: f64,
    /// Initial simplex step; relative for non-zero starting coordinates.
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

/// Simplex vertices together with their objective values.
struct Simplex<'a> {
    vertices: Vec<Vec<f64>>,
    values: Vec<f64>,
    bounds: Option<&'a [(f64, f64)]>,
}

impl<'a> Simplex<'a> {
    fn around<F>(initial: &[f64], step: f64, bounds: Option<&'a [(f64, f64)]>, objective: &F) -> Self
    where
        F: Fn(&[f64]) -> f64,
    {
        let mut vertices = Vec::with_capacity(initial.len() + 1);
        vertices.push(clamp_to(initial.to_vec(), bounds));
        for i in 0..initial.len() {
            let mut vertex = initial.to_vec();
            vertex[i] += if initial[i].abs() > 1e-10 {
                step * initial[i].abs()
            } else {
                step
            };
            vertices.push(clamp_to(vertex, bounds));
        }
        let values = vertices.iter().map(|v| objective(v)).collect();
        Self {
            vertices,
            values,
            bounds,
        }
    }

    /// Vertex indices sorted from best to worst.
    fn ranking(&self) -> Vec<usize> {
        let mut order: Vec<usize> = (0..self.values.len()).collect();
        order.sort_by(|&a, &b| self.values[a].total_cmp(&self.values[b]));
        order
    }

    /// Centroid of every vertex except `excluded`.
    fn centroid(&self, excluded: usize) -> Vec<f64> {
        let dim = self.vertices[0].len();
        let mut centroid = vec![0.0; dim];
        for (_, vertex) in self.vertices.iter().enumerate().filter(|(i, _)| *i != excluded) {
            for (c, x) in centroid.iter_mut().zip(vertex) {
                *c += x;
            }
        }
        let count = (self.vertices.len() - 1) as f64;
        centroid.iter_mut().for_each(|c| *c /= count);
        centroid
    }

    fn diameter(&self, centre: &[f64]) -> f64 {
        self.vertices
            .iter()
            .map(|v| distance(v, centre))
            .fold(0.0, f64::max)
    }

    fn replace(&mut self, index: usize, vertex: Vec<f64>, value: f64) {
        self.vertices[index] = vertex;
        self.values[index] = value;
    }

    /// Evaluate the point `origin + t * (target - origin)`, clamped.
    fn probe<F>(&self, origin: &[f64], target: &[f64], t: f64, objective: &F) -> (Vec<f64>, f64)
    where
        F: Fn(&[f64]) -> f64,
    {
        let point = clamp_to(
            origin
                .iter()
                .zip(target)
                .map(|(o, x)| o + t * (x - o))
                .collect(),
            self.bounds,
        );
        let value = objective(&point);
        (point, value)
    }

    fn shrink_towards<F>(&mut self, best: usize, sigma: f64, objective: &F)
    where
        F: Fn(&[f64]) -> f64,
    {
        let anchor = self.vertices[best].clone();
        for i in 0..self.vertices.len() {
            if i == best {
                continue;
            }
            let (point, value) = self.probe(&anchor, &self.vertices[i], sigma, objective);
            self.replace(i, point, value);
        }
    }
}

/// Perform Nelder-Mead simplex optimization.
///
/// # Arguments
/// * `objective` - The objective function to minimize
/// * `initial` - Initial guess for the optimal point
/// * `bounds` - Optional bounds for each dimension as (min, max) pairs
/// * `config` - Configuration parameters
///
/// # Example
/// ```
/// use climate_forecast::utils::optimization::{nelder_mead, NelderMeadConfig};
///
/// // Minimize (x-2)^2 + (y-3)^2
/// let result = nelder_mead(
///     |x| (x[0] - 2.0).powi(2) + (x[1] - 3.0).powi(2),
///     &[0.0, 0.0],
///     None,
///     NelderMeadConfig::default(),
/// );
///
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

    let mut simplex = Simplex::around(initial, config.initial_step, bounds, &objective);
    let mut iterations = 0;
    let mut converged = false;

    while iterations < config.max_iter {
        iterations += 1;

        let ranking = simplex.ranking();
        let best = ranking[0];
        let worst = ranking[ranking.len() - 1];
        let second_worst = ranking[ranking.len() - 2];
        let best_value = simplex.values[best];
        let worst_value = simplex.values[worst];

        let spread = worst_value - best_value;
        if spread.is_finite() && spread <= config.tolerance * (1.0 + best_value.abs()) {
            converged = true;
            break;
        }

        let centroid = simplex.centroid(worst);
        if simplex.diameter(&centroid) < config.tolerance {
            converged = true;
            break;
        }

        let worst_vertex = simplex.vertices[worst].clone();
        let (reflected, reflected_value) =
            simplex.probe(&centroid, &worst_vertex, -config.alpha, &objective);

        if reflected_value < best_value {
            let (expanded, expanded_value) =
                simplex.probe(&centroid, &reflected, config.gamma, &objective);
            if expanded_value < reflected_value {
                simplex.replace(worst, expanded, expanded_value);
            } else {
                simplex.replace(worst, reflected, reflected_value);
            }
            continue;
        }

        if reflected_value < simplex.values[second_worst] {
            simplex.replace(worst, reflected, reflected_value);
            continue;
        }

        // Contract towards whichever of reflected/worst is better.
        let (contracted, contracted_value) = if reflected_value < worst_value {
            simplex.probe(&centroid, &reflected, config.rho, &objective)
        } else {
            simplex.probe(&centroid, &worst_vertex, config.rho, &objective)
        };

        if contracted_value < reflected_value.min(worst_value) {
            simplex.replace(worst, contracted, contracted_value);
            continue;
        }

        simplex.shrink_towards(best, config.sigma, &objective);
    }

    let best = simplex.ranking()[0];
    NelderMeadResult {
        optimal_point: simplex.vertices[best].clone(),
        optimal_value: simplex.values[best],
        iterations,
        converged,
    }
}

fn clamp_to(mut point: Vec<f64>, bounds: Option<&[(f64, f64)]>) -> Vec<f64> {
    if let Some(bounds) = bounds {
        for (x, &(lo, hi)) in point.iter_mut().zip(bounds) {
            *x = x.clamp(lo, hi);
        }
    }
    point
}

fn distance(a: &[f64], b: &[f64]) -> f64 {
    a.iter()
        .zip(b)
        .map(|(x, y)| (x - y).powi(2))
        .sum::<f64>()
        .sqrt()
}
