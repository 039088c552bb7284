// Radial basis function interpolant with a degree-1 polynomial tail.

use nalgebra::{DMatrix, DVector};
use serde::Deserialize;

use super::Interpolator;
use crate::error::{MapError, Result};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Kernel {
    /// `r² ln r`
    #[default]
    ThinPlateSpline,
    /// `-r`
    Linear,
    /// `r³`
    Cubic,
    /// `-r⁵`
    Quintic,
    /// `exp(-r²)`
    Gaussian,
    /// `-sqrt(1 + r²)`
    Multiquadric,
    /// `1 / sqrt(1 + r²)`
    InverseMultiquadric,
}

impl Kernel {
    fn eval(self, r: f64) -> f64 {
        match self {
            Kernel::ThinPlateSpline => {
                if r == 0.0 {
                    0.0
                } else {
                    r * r * r.ln()
                }
            }
            Kernel::Linear => -r,
            Kernel::Cubic => r * r * r,
            Kernel::Quintic => -r.powi(5),
            Kernel::Gaussian => (-r * r).exp(),
            Kernel::Multiquadric => -(1.0 + r * r).sqrt(),
            Kernel::InverseMultiquadric => 1.0 / (1.0 + r * r).sqrt(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct RbfOptions {
    pub kernel: Kernel,
    /// Shape parameter; radii are scaled by it before the kernel is applied.
    pub epsilon: f64,
    /// Added to the kernel matrix diagonal. 0 interpolates exactly.
    pub smoothing: f64,
}

impl Default for RbfOptions {
    fn default() -> Self {
        Self {
            kernel: Kernel::ThinPlateSpline,
            epsilon: 1.0,
            smoothing: 0.0,
        }
    }
}

/// Fitted interpolant over scattered `(lon, lat)` samples.
#[derive(Debug, Clone)]
pub struct RbfInterpolator {
    centers: Vec<[f64; 2]>,
    weights: Vec<f64>,
    poly: [f64; 3],
    shift: [f64; 2],
    scale: [f64; 2],
    options: RbfOptions,
}

impl RbfInterpolator {
    pub fn fit(points: &[[f64; 2]], values: &[f64], options: &RbfOptions) -> Result<Self> {
        if points.len() != values.len() {
            return Err(MapError::config(format!(
                "{} sample points but {} values",
                points.len(),
                values.len()
            )));
        }
        let n = points.len();
        if n < 3 {
            return Err(MapError::Interpolation(format!(
                "radial basis fit needs at least 3 samples, got {n}"
            )));
        }

        if let Some([a, b]) = duplicate_pair(points) {
            return Err(MapError::Interpolation(format!(
                "radial basis system is singular: samples {a} and {b} share position ({}, {})",
                points[a][0], points[a][1]
            )));
        }

        // Polynomial coordinates are centred and scaled to [-1, 1].
        let mut shift = [0.0; 2];
        let mut scale = [1.0; 2];
        for d in 0..2 {
            let lo = points.iter().map(|p| p[d]).fold(f64::INFINITY, f64::min);
            let hi = points.iter().map(|p| p[d]).fold(f64::NEG_INFINITY, f64::max);
            shift[d] = (lo + hi) / 2.0;
            let half = (hi - lo) / 2.0;
            if half > 0.0 {
                scale[d] = half;
            }
        }

        let m = n + 3;
        let eps = options.epsilon;
        let poly_row = |p: [f64; 2]| {
            [
                1.0,
                (p[0] - shift[0]) / scale[0],
                (p[1] - shift[1]) / scale[1],
            ]
        };
        let a = DMatrix::from_fn(m, m, |i, j| match (i < n, j < n) {
            (true, true) => {
                let r = dist(points[i], points[j]) * eps;
                let k = options.kernel.eval(r);
                if i == j { k + options.smoothing } else { k }
            }
            (true, false) => poly_row(points[i])[j - n],
            (false, true) => poly_row(points[j])[i - n],
            (false, false) => 0.0,
        });
        let mut rhs = DVector::zeros(m);
        for (i, &v) in values.iter().enumerate() {
            rhs[i] = v;
        }

        let sol = a.clone().lu().solve(&rhs).ok_or_else(|| {
            MapError::Interpolation(
                "radial basis system is singular (duplicate or collinear samples?)".into(),
            )
        })?;
        if sol.iter().any(|v| !v.is_finite()) {
            return Err(MapError::Interpolation(
                "radial basis system produced non-finite coefficients".into(),
            ));
        }
        // LU can return a solution for a numerically singular matrix.
        let residual = (&a * &sol - &rhs).norm() / rhs.norm().max(1.0);
        if residual > RESIDUAL_TOLERANCE {
            return Err(MapError::Interpolation(format!(
                "radial basis system is ill-conditioned (relative residual {residual:.3e})"
            )));
        }

        Ok(Self {
            centers: points.to_vec(),
            weights: sol.rows(0, n).iter().copied().collect(),
            poly: [sol[n], sol[n + 1], sol[n + 2]],
            shift,
            scale,
            options: *options,
        })
    }
}

const RESIDUAL_TOLERANCE: f64 = 1e-6;

/// First two indices with identical coordinates, if any.
fn duplicate_pair(points: &[[f64; 2]]) -> Option<[usize; 2]> {
    let mut order: Vec<usize> = (0..points.len()).collect();
    order.sort_by(|&a, &b| {
        points[a][0]
            .total_cmp(&points[b][0])
            .then(points[a][1].total_cmp(&points[b][1]))
            .then(a.cmp(&b))
    });
    order
        .windows(2)
        .find(|w| points[w[0]] == points[w[1]])
        .map(|w| [w[0], w[1]])
}

fn dist(a: [f64; 2], b: [f64; 2]) -> f64 {
    (a[0] - b[0]).hypot(a[1] - b[1])
}

impl Interpolator for RbfInterpolator {
    fn eval(&self, lon: f64, lat: f64) -> f64 {
        let p = [lon, lat];
        let radial: f64 = self
            .centers
            .iter()
            .zip(&self.weights)
            .map(|(&c, &w)| w * self.options.kernel.eval(dist(p, c) * self.options.epsilon))
            .sum();
        let xs = (lon - self.shift[0]) / self.scale[0];
        let ys = (lat - self.shift[1]) / self.scale[1];
        radial + self.poly[0] + self.poly[1] * xs + self.poly[2] * ys
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scattered() -> Vec<[f64; 2]> {
        (0..25)
            .map(|k| {
                let k = k as f64;
                [
                    -170.0 + (k * 73.0) % 340.0,
                    -80.0 + (k * 37.0) % 160.0,
                ]
            })
            .collect()
    }

    #[test]
    fn test_interpolates_samples_exactly() {
        let pts = scattered();
        let vals: Vec<f64> = pts.iter().map(|p| (p[0] / 50.0).sin() + p[1] / 90.0).collect();
        let rbf = RbfInterpolator::fit(&pts, &vals, &RbfOptions::default()).unwrap();
        for (p, v) in pts.iter().zip(&vals) {
            let got = rbf.eval(p[0], p[1]);
            assert!((got - v).abs() < 1e-6, "at {p:?}: {got} vs {v}");
        }
    }

    #[test]
    fn test_reproduces_linear_field() {
        let pts = scattered();
        let f = |p: [f64; 2]| 2.0 * p[0] - 0.5 * p[1] + 7.0;
        let vals: Vec<f64> = pts.iter().map(|&p| f(p)).collect();
        let rbf = RbfInterpolator::fit(&pts, &vals, &RbfOptions::default()).unwrap();
        for q in [[0.0, 0.0], [95.0, -33.0], [-120.0, 61.0]] {
            let got = rbf.eval(q[0], q[1]);
            assert!((got - f(q)).abs() < 1e-5, "at {q:?}: {got} vs {}", f(q));
        }
    }

    #[test]
    fn test_duplicate_samples_are_singular() {
        let pts = vec![[0.0, 0.0], [0.0, 0.0], [10.0, 0.0], [0.0, 10.0]];
        let err = RbfInterpolator::fit(&pts, &[1.0, 2.0, 3.0, 4.0], &RbfOptions::default())
            .unwrap_err();
        assert!(matches!(err, MapError::Interpolation(_)), "got {err:?}");
    }

    #[test]
    fn test_duplicate_among_many_samples_is_rejected() {
        let mut pts = scattered();
        let mut vals: Vec<f64> = pts.iter().map(|p| p[0] + p[1]).collect();
        pts.push(pts[7]);
        vals.push(vals[7] + 1.0);
        let err = RbfInterpolator::fit(&pts, &vals, &RbfOptions::default()).unwrap_err();
        assert!(matches!(err, MapError::Interpolation(_)), "got {err:?}");
        assert_eq!(duplicate_pair(&pts), Some([7, 25]));
    }

    #[test]
    fn test_collinear_samples_are_rejected() {
        // The degree-1 tail cannot be fitted when every sample has the same latitude.
        let pts: Vec<[f64; 2]> = (0..6).map(|k| [k as f64 * 10.0, 0.0]).collect();
        let vals = [1.0, 2.0, 0.5, 3.0, 2.5, 1.0];
        let err = RbfInterpolator::fit(&pts, &vals, &RbfOptions::default()).unwrap_err();
        assert!(matches!(err, MapError::Interpolation(_)), "got {err:?}");
    }

    #[test]
    fn test_too_few_samples() {
        let err = RbfInterpolator::fit(&[[0.0, 0.0], [1.0, 1.0]], &[1.0, 2.0], &RbfOptions::default())
            .unwrap_err();
        assert!(matches!(err, MapError::Interpolation(_)));
    }

    #[test]
    fn test_gaussian_kernel_fits() {
        let pts = scattered();
        let vals: Vec<f64> = pts.iter().map(|p| p[1]).collect();
        let opts = RbfOptions {
            kernel: Kernel::Gaussian,
            epsilon: 0.02,
            smoothing: 0.0,
        };
        let rbf = RbfInterpolator::fit(&pts, &vals, &opts).unwrap();
        let got = rbf.eval(pts[3][0], pts[3][1]);
        assert!((got - vals[3]).abs() < 1e-4, "{got} vs {}", vals[3]);
    }
}
