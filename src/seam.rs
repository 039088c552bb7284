// Antimeridian repair for projected mesh faces.

use serde::Deserialize;

/// How a vertex is recognised as lying on the +180° seam.
///
/// In YAML: `matching: exact` or `matching: !tolerance 1.0`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeamMatch {
    /// Longitude must equal +180 exactly.
    #[default]
    Exact,
    /// Longitude within `eps` degrees of +180.
    Tolerance(f64),
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct SeamCorrector {
    /// Edge length in degrees above which a face is a seam candidate.
    pub threshold: f64,
    pub matching: SeamMatch,
}

/// Default edge threshold in degrees. Seam-crossing faces span close to 360°
/// of longitude, polar fan faces about 180°.
pub const DEFAULT_THRESHOLD: f64 = 300.0;

impl Default for SeamCorrector {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            matching: SeamMatch::Exact,
        }
    }
}

impl SeamCorrector {
    pub fn new(threshold: f64, matching: SeamMatch) -> Self {
        Self {
            threshold,
            matching,
        }
    }

    /// True when any edge of the face is longer than the threshold.
    pub fn is_candidate(&self, face: &[[f64; 2]; 3]) -> bool {
        (0..3).any(|k| {
            let a = face[k];
            let b = face[(k + 1) % 3];
            (b[0] - a[0]).hypot(b[1] - a[1]) > self.threshold
        })
    }

    fn on_seam(&self, lon: f64) -> bool {
        match self.matching {
            SeamMatch::Exact => lon == 180.0,
            SeamMatch::Tolerance(eps) => (lon - 180.0).abs() <= eps,
        }
    }

    /// Return the face with its seam vertices moved to -180°.
    ///
    /// Only candidates with one or two seam vertices change. Latitudes are
    /// never touched. In `Exact` mode the only edit is the sign of a +180
    /// longitude; a long-edged face with no vertex exactly on the seam comes
    /// back unchanged.
    pub fn correct(&self, face: [[f64; 2]; 3]) -> [[f64; 2]; 3] {
        if !self.is_candidate(&face) {
            return face;
        }
        let on_seam = face.map(|p| self.on_seam(p[0]));
        let count = on_seam.iter().filter(|&&s| s).count();
        if count == 0 || count == 3 {
            return face;
        }
        let mut out = face;
        for (p, seam) in out.iter_mut().zip(on_seam) {
            if seam {
                p[0] = -180.0;
            }
        }
        out
    }
}

/// Longest edge of a projected face, in degrees.
pub fn longest_edge(face: &[[f64; 2]; 3]) -> f64 {
    (0..3)
        .map(|k| {
            let a = face[k];
            let b = face[(k + 1) % 3];
            (b[0] - a[0]).hypot(b[1] - a[1])
        })
        .fold(0.0, f64::max)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_vertex_is_remapped() {
        let seam = SeamCorrector::new(10.0, SeamMatch::Exact);
        let out = seam.correct([[180.0, 5.0], [-175.0, 6.0], [-178.0, 2.0]]);
        assert_eq!(out, [[-180.0, 5.0], [-175.0, 6.0], [-178.0, 2.0]]);
        assert!(longest_edge(&out) < 10.0);
    }

    #[test]
    fn test_two_seam_vertices_are_remapped() {
        let seam = SeamCorrector::new(10.0, SeamMatch::Exact);
        let out = seam.correct([[180.0, 5.0], [180.0, 1.0], [-178.0, 2.0]]);
        assert_eq!(out[0][0], -180.0);
        assert_eq!(out[1][0], -180.0);
        assert_eq!(out[2], [-178.0, 2.0]);
    }

    #[test]
    fn test_near_seam_face_unchanged_in_exact_mode() {
        let seam = SeamCorrector::new(10.0, SeamMatch::Exact);
        let face = [[179.0, 0.0], [-179.0, 1.0], [179.0, 2.0]];
        assert!(seam.is_candidate(&face));
        assert_eq!(seam.correct(face), face);
    }

    #[test]
    fn test_tolerance_mode_puts_face_on_one_side() {
        let seam = SeamCorrector::new(10.0, SeamMatch::Tolerance(1.0));
        let out = seam.correct([[179.0, 0.0], [-179.0, 1.0], [179.0, 2.0]]);
        assert!(
            out.iter().all(|p| p[0] < 0.0),
            "all vertices should be west of the seam: {out:?}"
        );
        assert!(longest_edge(&out) <= 2.0, "edge too long: {out:?}");
        assert_eq!(out.map(|p| p[1]), [0.0, 1.0, 2.0]);
    }

    #[test]
    fn test_short_faces_untouched() {
        let seam = SeamCorrector::new(10.0, SeamMatch::Tolerance(5.0));
        let face = [[178.0, 0.0], [180.0, 1.0], [176.0, 2.0]];
        assert_eq!(seam.correct(face), face);
    }

    #[test]
    fn test_default_threshold() {
        let seam = SeamCorrector::default();
        assert_eq!(seam.threshold, 300.0);
        assert_eq!(seam.matching, SeamMatch::Exact);
    }

    #[test]
    fn test_default_leaves_polar_fan_face_alone() {
        // North pole projected at lon 0 joined to a ring vertex on +180.
        let face = [[0.0, 90.0], [180.0, 75.0], [150.0, 75.0]];
        assert!(longest_edge(&face) > 180.0);
        let seam = SeamCorrector::default();
        assert!(!seam.is_candidate(&face));
        assert_eq!(seam.correct(face), face);

        // A face that really wraps is still repaired.
        let wrapping = [[180.0, 10.0], [-170.0, 10.0], [-170.0, 20.0]];
        assert_eq!(seam.correct(wrapping)[0], [-180.0, 10.0]);
    }
}
