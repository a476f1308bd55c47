//! Local axis estimation: a least-squares line through a node and its neighbours.

use tracing::debug;

use section_kernel::{Line3d, Point3d, Vec3};
use section_solver::{least_squares, SolverConfig, SolverError};

/// Fit a direction through `points`, anchored at the first point.
///
/// Returns `None` when fewer than two points are available. Otherwise the
/// result is never `None`: an invalid fit falls back to `last - first`.
/// The vector is not normalized.
pub fn fit_normal(points: &[Point3d], config: &SolverConfig) -> Option<Vec3> {
    let (&first, &last) = match points {
        [first, .., last] => (first, last),
        _ => return None,
    };
    let guess = last - first;

    let residuals = |params: &[f64]| -> Vec<f64> {
        let [x, y, z] = params else {
            return vec![f64::NAN; points.len()];
        };
        let line = Line3d::new(first, Vec3::new(*x, *y, *z));
        points.iter().map(|p| line.distance_to_point(p)).collect()
    };

    let fitted = match least_squares(residuals, &guess.to_array(), config) {
        Ok(result) => direction_from(&result.params),
        Err(SolverError::DidNotConverge { best, residual, .. }) => {
            debug!(residual, "normal fit hit the iteration cap, using best estimate");
            direction_from(&best)
        }
        Err(err) => {
            debug!(%err, "normal fit failed");
            None
        }
    };

    Some(resolve_direction(fitted, first, last))
}

/// Accept `fitted` if it is finite and non-zero, else the raw chord `last - first`.
pub fn resolve_direction(fitted: Option<Vec3>, first: Point3d, last: Point3d) -> Vec3 {
    match fitted {
        Some(d) if d.is_finite() && !d.is_zero() => d,
        _ => last - first,
    }
}

fn direction_from(params: &[f64]) -> Option<Vec3> {
    match params {
        [x, y, z] => Some(Vec3::new(*x, *y, *z)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn unit(v: Vec3) -> Vec3 {
        v.normalized().unwrap()
    }

    #[test]
    fn test_single_point_has_no_normal() {
        let config = SolverConfig::default();
        assert!(fit_normal(&[Point3d::new(1.0, 2.0, 3.0)], &config).is_none());
        assert!(fit_normal(&[], &config).is_none());
    }

    #[test]
    fn test_two_points_give_chord_exactly() {
        let a = Point3d::new(5.0, 5.0, 0.0);
        let b = Point3d::new(5.0, 5.0, 1.0);
        let n = fit_normal(&[a, b], &SolverConfig::default()).unwrap();
        assert_eq!(n, Vec3::new(0.0, 0.0, 1.0));
    }

    #[test]
    fn test_collinear_points_keep_axis() {
        let pts = [
            Point3d::new(0.0, 0.0, 1.0),
            Point3d::new(0.0, 0.0, 0.0),
            Point3d::new(0.0, 0.0, 2.0),
        ];
        let n = unit(fit_normal(&pts, &SolverConfig::default()).unwrap());
        assert_relative_eq!(n.z.abs(), 1.0, epsilon = 1e-9);
    }

    #[test]
    fn test_bent_chain_is_between_arms() {
        // Node at the origin, parent straight below, child off to the side.
        let pts = [
            Point3d::new(0.0, 0.0, 0.0),
            Point3d::new(0.0, 0.0, -1.0),
            Point3d::new(1.0, 0.0, 1.0),
        ];
        let n = unit(fit_normal(&pts, &SolverConfig::default()).unwrap());
        assert!(n.is_finite());
        assert!(n.z.abs() > 0.5);
        assert!(n.x.abs() > 1e-3);
    }

    #[test]
    fn test_coincident_points_fall_back_to_zero_chord() {
        let p = Point3d::new(2.0, 2.0, 2.0);
        let n = fit_normal(&[p, p], &SolverConfig::default()).unwrap();
        assert!(n.is_zero());
    }

    #[test]
    fn test_resolve_direction_rejects_invalid() {
        let a = Point3d::new(0.0, 0.0, 0.0);
        let b = Point3d::new(1.0, 2.0, 3.0);
        let chord = Vec3::new(1.0, 2.0, 3.0);
        assert_eq!(resolve_direction(None, a, b), chord);
        assert_eq!(resolve_direction(Some(Vec3::ZERO), a, b), chord);
        assert_eq!(resolve_direction(Some(Vec3::new(f64::NAN, 0.0, 1.0)), a, b), chord);
        assert_eq!(resolve_direction(Some(Vec3::new(0.0, 0.0, 7.0)), a, b), Vec3::new(0.0, 0.0, 7.0));
    }
}
