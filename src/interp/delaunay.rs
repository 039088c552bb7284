// Planar Delaunay triangulation (Bowyer-Watson) and linear interpolation
// over it.

use super::Interpolator;

#[derive(Clone, Copy, Debug)]
struct Tri {
    v: [usize; 3],
    cx: f64,
    cy: f64,
    r2: f64,
}

impl Tri {
    fn new(v: [usize; 3], pts: &[[f64; 2]]) -> Self {
        let [a, b, c] = v.map(|i| pts[i]);
        let d = 2.0 * (a[0] * (b[1] - c[1]) + b[0] * (c[1] - a[1]) + c[0] * (a[1] - b[1]));
        if d.abs() < f64::EPSILON {
            // Collinear: always replaced by the next insertion that sees it.
            return Self {
                v,
                cx: 0.0,
                cy: 0.0,
                r2: f64::INFINITY,
            };
        }
        let a2 = a[0] * a[0] + a[1] * a[1];
        let b2 = b[0] * b[0] + b[1] * b[1];
        let c2 = c[0] * c[0] + c[1] * c[1];
        let cx = (a2 * (b[1] - c[1]) + b2 * (c[1] - a[1]) + c2 * (a[1] - b[1])) / d;
        let cy = (a2 * (c[0] - b[0]) + b2 * (a[0] - c[0]) + c2 * (b[0] - a[0])) / d;
        let r2 = (a[0] - cx).powi(2) + (a[1] - cy).powi(2);
        Self { v, cx, cy, r2 }
    }

    fn circumcircle_contains(&self, p: [f64; 2]) -> bool {
        let d2 = (p[0] - self.cx).powi(2) + (p[1] - self.cy).powi(2);
        d2 < self.r2 * (1.0 - 1e-12)
    }
}

/// Delaunay triangulation of a point set. Exact duplicates are dropped.
#[derive(Debug, Clone)]
pub struct Triangulation {
    points: Vec<[f64; 2]>,
    /// Index into the caller's point list for each kept point.
    origin: Vec<usize>,
    triangles: Vec<[usize; 3]>,
}

impl Triangulation {
    pub fn new(input: &[[f64; 2]]) -> Self {
        let mut order: Vec<usize> = (0..input.len())
            .filter(|&i| input[i][0].is_finite() && input[i][1].is_finite())
            .collect();
        order.sort_by(|&a, &b| {
            input[a][0]
                .total_cmp(&input[b][0])
                .then(input[a][1].total_cmp(&input[b][1]))
                .then(a.cmp(&b))
        });
        order.dedup_by(|a, b| input[*a] == input[*b]);
        let points: Vec<[f64; 2]> = order.iter().map(|&i| input[i]).collect();
        let triangles = if points.len() < 3 {
            Vec::new()
        } else {
            bowyer_watson(&points)
        };
        Self {
            points,
            origin: order,
            triangles,
        }
    }

    pub fn points(&self) -> &[[f64; 2]] {
        &self.points
    }

    /// Position in the caller's list of each kept point.
    pub fn source_indices(&self) -> &[usize] {
        &self.origin
    }

    /// Triangles as indices into [`Triangulation::points`], counter-clockwise.
    pub fn triangles(&self) -> &[[usize; 3]] {
        &self.triangles
    }

    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }
}

fn bowyer_watson(points: &[[f64; 2]]) -> Vec<[usize; 3]> {
    let n = points.len();
    let (mut xmin, mut ymin) = (f64::INFINITY, f64::INFINITY);
    let (mut xmax, mut ymax) = (f64::NEG_INFINITY, f64::NEG_INFINITY);
    for p in points {
        xmin = xmin.min(p[0]);
        xmax = xmax.max(p[0]);
        ymin = ymin.min(p[1]);
        ymax = ymax.max(p[1]);
    }
    let span = (xmax - xmin).max(ymax - ymin).max(1.0);
    let (mx, my) = ((xmin + xmax) / 2.0, (ymin + ymax) / 2.0);

    // Super triangle vertices live at n, n+1, n+2.
    let mut pts = points.to_vec();
    pts.push([mx - 20.0 * span, my - span]);
    pts.push([mx, my + 20.0 * span]);
    pts.push([mx + 20.0 * span, my - span]);

    let mut tris = vec![Tri::new([n, n + 1, n + 2], &pts)];
    let mut edges: Vec<[usize; 2]> = Vec::new();

    for i in 0..n {
        let p = pts[i];
        edges.clear();
        tris.retain(|t| {
            if t.circumcircle_contains(p) {
                for k in 0..3 {
                    edges.push([t.v[k], t.v[(k + 1) % 3]]);
                }
                false
            } else {
                true
            }
        });
        // Cavity boundary: edges that belong to exactly one removed triangle.
        for e in 0..edges.len() {
            let [a, b] = edges[e];
            let shared = edges
                .iter()
                .enumerate()
                .any(|(f, &[c, d])| f != e && ((a == c && b == d) || (a == d && b == c)));
            if !shared {
                tris.push(Tri::new([a, b, i], &pts));
            }
        }
    }

    tris.into_iter()
        .filter(|t| t.v.iter().all(|&v| v < n))
        .filter_map(|t| {
            let [a, b, c] = t.v;
            let area = orient(pts[a], pts[b], pts[c]);
            if area > 0.0 {
                Some([a, b, c])
            } else if area < 0.0 {
                Some([a, c, b])
            } else {
                None
            }
        })
        .collect()
}

fn orient(a: [f64; 2], b: [f64; 2], c: [f64; 2]) -> f64 {
    (b[0] - a[0]) * (c[1] - a[1]) - (b[1] - a[1]) * (c[0] - a[0])
}

const BUCKETS: usize = 32;

/// Piecewise-linear interpolant over a Delaunay triangulation.
///
/// Queries outside the convex hull give NaN.
#[derive(Debug, Clone)]
pub struct LinearInterpolator {
    tri: Triangulation,
    values: Vec<f64>,
    origin: [f64; 2],
    cell: [f64; 2],
    buckets: Vec<Vec<usize>>,
}

impl LinearInterpolator {
    pub fn new(points: &[[f64; 2]], values: &[f64]) -> Self {
        let tri = Triangulation::new(points);
        let values: Vec<f64> = tri.origin.iter().map(|&i| values[i]).collect();

        let (mut xmin, mut ymin) = (f64::INFINITY, f64::INFINITY);
        let (mut xmax, mut ymax) = (f64::NEG_INFINITY, f64::NEG_INFINITY);
        for p in tri.points() {
            xmin = xmin.min(p[0]);
            xmax = xmax.max(p[0]);
            ymin = ymin.min(p[1]);
            ymax = ymax.max(p[1]);
        }
        let cell = [
            ((xmax - xmin) / BUCKETS as f64).max(f64::MIN_POSITIVE),
            ((ymax - ymin) / BUCKETS as f64).max(f64::MIN_POSITIVE),
        ];
        let origin = [xmin, ymin];

        let mut buckets = vec![Vec::new(); BUCKETS * BUCKETS];
        if !tri.is_empty() {
            for (ti, t) in tri.triangles().iter().enumerate() {
                let [a, b, c] = t.map(|v| tri.points()[v]);
                let i0 = bucket_index(a[0].min(b[0]).min(c[0]), origin[0], cell[0]);
                let i1 = bucket_index(a[0].max(b[0]).max(c[0]), origin[0], cell[0]);
                let j0 = bucket_index(a[1].min(b[1]).min(c[1]), origin[1], cell[1]);
                let j1 = bucket_index(a[1].max(b[1]).max(c[1]), origin[1], cell[1]);
                for j in j0..=j1 {
                    for i in i0..=i1 {
                        buckets[j * BUCKETS + i].push(ti);
                    }
                }
            }
        }

        Self {
            tri,
            values,
            origin,
            cell,
            buckets,
        }
    }

    pub fn triangulation(&self) -> &Triangulation {
        &self.tri
    }
}

fn bucket_index(v: f64, origin: f64, cell: f64) -> usize {
    (((v - origin) / cell).floor().max(0.0) as usize).min(BUCKETS - 1)
}

impl Interpolator for LinearInterpolator {
    fn eval(&self, x: f64, y: f64) -> f64 {
        if self.tri.is_empty() || !x.is_finite() || !y.is_finite() {
            return f64::NAN;
        }
        let fx = (x - self.origin[0]) / self.cell[0];
        let fy = (y - self.origin[1]) / self.cell[1];
        let tol = 1e-9;
        if fx < -tol || fy < -tol || fx > BUCKETS as f64 + tol || fy > BUCKETS as f64 + tol {
            return f64::NAN;
        }
        let i = bucket_index(x, self.origin[0], self.cell[0]);
        let j = bucket_index(y, self.origin[1], self.cell[1]);
        let p = [x, y];
        let pts = self.tri.points();
        for &ti in &self.buckets[j * BUCKETS + i] {
            let [ia, ib, ic] = self.tri.triangles()[ti];
            let (a, b, c) = (pts[ia], pts[ib], pts[ic]);
            let area = orient(a, b, c);
            let wa = orient(b, c, p) / area;
            let wb = orient(c, a, p) / area;
            let wc = 1.0 - wa - wb;
            if wa >= -tol && wb >= -tol && wc >= -tol {
                return wa * self.values[ia] + wb * self.values[ib] + wc * self.values[ic];
            }
        }
        f64::NAN
    }
}
