use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, instrument};

/// Result of running the least-squares solver.
#[derive(Debug, Clone)]
pub struct SolverResult {
    pub converged: bool,
    pub iterations: usize,
    /// Sum of squared residuals at `params`.
    pub final_residual: f64,
    pub params: Vec<f64>,
}

#[derive(Debug, Clone, Error)]
pub enum SolverError {
    #[error("No parameters to solve for")]
    EmptyParameters,
    #[error("Residuals are not finite at the initial guess")]
    NonFiniteResidual,
    #[error("Solver did not converge after {max_iterations} iterations (residual: {residual})")]
    DidNotConverge {
        max_iterations: usize,
        residual: f64,
        /// Best parameters reached before giving up.
        best: Vec<f64>,
    },
}

/// Configuration for the Levenberg-Marquardt solver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    pub max_iterations: usize,
    pub tolerance: f64,
    pub lambda_initial: f64,
    pub lambda_factor: f64,
    /// Relative step for the forward-difference Jacobian.
    pub finite_difference_step: f64,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            max_iterations: 200,
            tolerance: 1e-12,
            lambda_initial: 1e-3,
            lambda_factor: 10.0,
            finite_difference_step: 1e-7,
        }
    }
}

/// Attempts per outer iteration before the damping gives up on finding a descent step.
const MAX_DAMPING_ATTEMPTS: usize = 24;

/// Minimize `sum(residuals(p)^2)` starting from `initial` with Levenberg-Marquardt.
///
/// The Jacobian is approximated by forward differences. When no damped step
/// reduces the cost the current parameters are reported as converged (a
/// stationary point). Hitting `max_iterations` returns
/// [`SolverError::DidNotConverge`] carrying the best parameters seen.
#[instrument(skip(residuals, config), fields(n = initial.len()))]
pub fn least_squares<F>(
    residuals: F,
    initial: &[f64],
    config: &SolverConfig,
) -> Result<SolverResult, SolverError>
where
    F: Fn(&[f64]) -> Vec<f64>,
{
    let n = initial.len();
    if n == 0 {
        return Err(SolverError::EmptyParameters);
    }

    let mut params = initial.to_vec();
    let mut r = residuals(&params);
    if r.iter().any(|v| !v.is_finite()) {
        return Err(SolverError::NonFiniteResidual);
    }
    let mut cost = sum_of_squares(&r);

    if r.is_empty() || cost < config.tolerance {
        return Ok(SolverResult {
            converged: true,
            iterations: 0,
            final_residual: cost,
            params,
        });
    }

    let mut lambda = config.lambda_initial;

    for iteration in 0..config.max_iterations {
        let jac = forward_jacobian(&residuals, &params, &r, config.finite_difference_step);
        let rv = DVector::from_column_slice(&r);
        let jtj = jac.transpose() * &jac;
        let neg_gradient = -(jac.transpose() * &rv);

        if neg_gradient.amax() < config.tolerance {
            debug!(iteration, cost, "gradient vanished");
            return Ok(SolverResult {
                converged: true,
                iterations: iteration,
                final_residual: cost,
                params,
            });
        }

        let mut improved = false;
        for _ in 0..MAX_DAMPING_ATTEMPTS {
            let mut damped = jtj.clone();
            for i in 0..n {
                damped[(i, i)] += lambda * (jtj[(i, i)] + 1.0);
            }

            let Some(step) = solve_normal_equations(damped, &neg_gradient) else {
                lambda *= config.lambda_factor;
                continue;
            };

            let candidate: Vec<f64> = params.iter().zip(step.iter()).map(|(p, s)| p + s).collect();
            let r_new = residuals(&candidate);
            let cost_new = sum_of_squares(&r_new);

            if cost_new.is_finite() && cost_new < cost {
                let reduction = (cost - cost_new) / cost;
                let param_norm = params.iter().map(|p| p * p).sum::<f64>().sqrt();
                let small_step = step.norm() <= config.tolerance * (param_norm + config.tolerance);

                params = candidate;
                r = r_new;
                cost = cost_new;
                lambda = (lambda / config.lambda_factor).max(1e-12);
                improved = true;

                if cost < config.tolerance || reduction < config.tolerance || small_step {
                    return Ok(SolverResult {
                        converged: true,
                        iterations: iteration + 1,
                        final_residual: cost,
                        params,
                    });
                }
                break;
            }
            lambda *= config.lambda_factor;
        }

        if !improved {
            debug!(iteration, cost, lambda, "no descent step found");
            return Ok(SolverResult {
                converged: true,
                iterations: iteration,
                final_residual: cost,
                params,
            });
        }
    }

    Err(SolverError::DidNotConverge {
        max_iterations: config.max_iterations,
        residual: cost,
        best: params,
    })
}

fn sum_of_squares(r: &[f64]) -> f64 {
    r.iter().map(|v| v * v).sum()
}

fn forward_jacobian<F>(residuals: &F, params: &[f64], r0: &[f64], rel_step: f64) -> DMatrix<f64>
where
    F: Fn(&[f64]) -> Vec<f64>,
{
    let m = r0.len();
    let n = params.len();
    let mut jac = DMatrix::zeros(m, n);
    let mut probe = params.to_vec();

    for j in 0..n {
        let orig = probe[j];
        let h = rel_step * orig.abs().max(1.0);
        probe[j] = orig + h;
        let r_plus = residuals(&probe);
        probe[j] = orig;
        for i in 0..m {
            jac[(i, j)] = (r_plus[i] - r0[i]) / h;
        }
    }
    jac
}

fn solve_normal_equations(a: DMatrix<f64>, b: &DVector<f64>) -> Option<DVector<f64>> {
    let step = match a.clone().cholesky() {
        Some(chol) => chol.solve(b),
        None => a.lu().solve(b)?,
    };
    step.iter().all(|v| v.is_finite()).then_some(step)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_fits_straight_line_data() {
        let xs = [0.0, 1.0, 2.0, 3.0, 4.0];
        let ys = [1.0, 3.0, 5.0, 7.0, 9.0];
        let result = least_squares(
            |p| xs.iter().zip(ys.iter()).map(|(x, y)| p[0] * x + p[1] - y).collect(),
            &[0.0, 0.0],
            &SolverConfig::default(),
        )
        .unwrap();
        assert!(result.converged);
        assert_relative_eq!(result.params[0], 2.0, epsilon = 1e-6);
        assert_relative_eq!(result.params[1], 1.0, epsilon = 1e-6);
    }

    #[test]
    fn test_rosenbrock_minimum() {
        let config = SolverConfig {
            max_iterations: 500,
            ..SolverConfig::default()
        };
        let result = least_squares(
            |p| vec![10.0 * (p[1] - p[0] * p[0]), 1.0 - p[0]],
            &[-1.2, 1.0],
            &config,
        )
        .unwrap();
        assert_relative_eq!(result.params[0], 1.0, epsilon = 1e-4);
        assert_relative_eq!(result.params[1], 1.0, epsilon = 1e-4);
    }

    #[test]
    fn test_already_satisfied_returns_initial_exactly() {
        let initial = [0.25, -3.0, 7.5];
        let result = least_squares(|_| vec![0.0, 0.0], &initial, &SolverConfig::default()).unwrap();
        assert!(result.converged);
        assert_eq!(result.iterations, 0);
        assert_eq!(result.params, initial.to_vec());
    }

    #[test]
    fn test_empty_parameters_rejected() {
        let err = least_squares(|_| vec![1.0], &[], &SolverConfig::default()).unwrap_err();
        assert!(matches!(err, SolverError::EmptyParameters));
    }

    #[test]
    fn test_non_finite_initial_residual_rejected() {
        let err = least_squares(|_| vec![f64::NAN], &[1.0], &SolverConfig::default()).unwrap_err();
        assert!(matches!(err, SolverError::NonFiniteResidual));
    }

    #[test]
    fn test_iteration_cap_reports_best_params() {
        let config = SolverConfig {
            max_iterations: 1,
            ..SolverConfig::default()
        };
        match least_squares(|p| vec![10.0 * (p[1] - p[0] * p[0]), 1.0 - p[0]], &[-1.2, 1.0], &config) {
            Err(SolverError::DidNotConverge { best, max_iterations, .. }) => {
                assert_eq!(max_iterations, 1);
                assert_eq!(best.len(), 2);
                assert!(best.iter().all(|v| v.is_finite()));
            }
            Ok(result) => assert!(result.converged),
            Err(other) => panic!("unexpected error: {other}"),
        }
    }
}
