// Cartesian <-> spherical conversion and the read-only shape model.

use serde::Deserialize;

use crate::error::{MapError, Result};

/// Degrees per radian.
pub const DPR: f64 = 180.0 / std::f64::consts::PI;
/// Radians per degree.
pub const RPD: f64 = std::f64::consts::PI / 180.0;

/// Convert a Cartesian point to `(longitude, latitude, radius)` in radians.
///
/// `longitude = atan2(y, x)`, `latitude = atan2(z, hypot(x, y))`.
/// A point on the polar axis (`x = y = 0`) gets longitude 0 because
/// `atan2(0, 0) = 0`; the origin maps to `(0, 0, 0)`.
pub fn cartesian_to_spherical(x: f64, y: f64, z: f64) -> (f64, f64, f64) {
    let hxy = x.hypot(y);
    let radius = hxy.hypot(z);
    let lat = z.atan2(hxy);
    let lon = y.atan2(x);
    (lon, lat, radius)
}

/// Inverse of [`cartesian_to_spherical`]; angles in radians.
pub fn spherical_to_cartesian(lon: f64, lat: f64, radius: f64) -> [f64; 3] {
    let rcos_lat = radius * lat.cos();
    [rcos_lat * lon.cos(), rcos_lat * lon.sin(), radius * lat.sin()]
}

/// Geographic position of a vertex or face centroid, angles in degrees.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SphericalSample {
    /// Longitude in [-180, 180].
    pub lon: f64,
    /// Latitude in [-90, 90].
    pub lat: f64,
    pub radius: f64,
}

impl SphericalSample {
    pub fn from_cartesian(p: [f64; 3]) -> Self {
        let (lon, lat, radius) = cartesian_to_spherical(p[0], p[1], p[2]);
        Self {
            lon: lon * DPR,
            lat: lat * DPR,
            radius,
        }
    }

    pub fn lonlat(&self) -> [f64; 2] {
        [self.lon, self.lat]
    }
}

/// Unit of the angle columns of an externally produced face table.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AngleUnit {
    #[default]
    Radians,
    Degrees,
}

impl AngleUnit {
    /// Factor converting a value in this unit to degrees.
    pub fn to_degrees(self) -> f64 {
        match self {
            AngleUnit::Radians => DPR,
            AngleUnit::Degrees => 1.0,
        }
    }
}

/// Which mesh entity a scalar field is aligned with.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldLocation {
    #[default]
    Faces,
    Vertices,
}

/// Triangulated shape model. Every face index is a valid vertex index.
#[derive(Clone, Debug, PartialEq)]
pub struct Mesh {
    vertices: Vec<[f64; 3]>,
    faces: Vec<[usize; 3]>,
}

impl Mesh {
    pub fn new(vertices: Vec<[f64; 3]>, faces: Vec<[usize; 3]>) -> Result<Self> {
        let nv = vertices.len();
        if let Some((fi, face)) = faces
            .iter()
            .enumerate()
            .find(|(_, f)| f.iter().any(|&i| i >= nv))
        {
            return Err(MapError::Mesh(format!(
                "face {fi} references vertex {:?} but the mesh has {nv} vertices",
                face
            )));
        }
        Ok(Self { vertices, faces })
    }

    pub fn vertices(&self) -> &[[f64; 3]] {
        &self.vertices
    }

    pub fn faces(&self) -> &[[usize; 3]] {
        &self.faces
    }

    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    pub fn face_centroids(&self) -> Vec<[f64; 3]> {
        self.faces
            .iter()
            .map(|f| {
                let [a, b, c] = f.map(|i| self.vertices[i]);
                [
                    (a[0] + b[0] + c[0]) / 3.0,
                    (a[1] + b[1] + c[1]) / 3.0,
                    (a[2] + b[2] + c[2]) / 3.0,
                ]
            })
            .collect()
    }

    pub fn face_samples(&self) -> Vec<SphericalSample> {
        self.face_centroids()
            .into_iter()
            .map(SphericalSample::from_cartesian)
            .collect()
    }

    pub fn vertex_samples(&self) -> Vec<SphericalSample> {
        self.vertices
            .iter()
            .copied()
            .map(SphericalSample::from_cartesian)
            .collect()
    }

    /// Projected `(lon, lat)` corners of face `i` in degrees, in winding order.
    pub fn face_lonlat(&self, i: usize) -> [[f64; 2]; 3] {
        self.faces[i].map(|v| SphericalSample::from_cartesian(self.vertices[v]).lonlat())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(1.0, 0.0, 0.0)]
    #[case(0.3, -2.0, 1.5)]
    #[case(-4.0, 0.5, -3.0)]
    #[case(-1.0, -1.0, 0.01)]
    #[case(0.0, 2.0, -7.0)]
    fn test_round_trip(#[case] x: f64, #[case] y: f64, #[case] z: f64) {
        let (lon, lat, r) = cartesian_to_spherical(x, y, z);
        let p = spherical_to_cartesian(lon, lat, r);
        assert!((p[0] - x).abs() < 1e-12, "x: {} vs {}", p[0], x);
        assert!((p[1] - y).abs() < 1e-12, "y: {} vs {}", p[1], y);
        assert!((p[2] - z).abs() < 1e-12, "z: {} vs {}", p[2], z);
    }

    #[test]
    fn test_polar_axis_longitude_is_zero() {
        let (lon, lat, r) = cartesian_to_spherical(0.0, 0.0, 2.0);
        assert_eq!(lon, 0.0);
        assert!((lat - std::f64::consts::FRAC_PI_2).abs() < 1e-15);
        assert_eq!(r, 2.0);
    }

    #[test]
    fn test_sample_degrees() {
        let s = SphericalSample::from_cartesian([-1.0, 0.0, 0.0]);
        assert!((s.lon - 180.0).abs() < 1e-12);
        assert!(s.lat.abs() < 1e-12);
        let s = SphericalSample::from_cartesian([0.0, -1.0, 1.0]);
        assert!((s.lon + 90.0).abs() < 1e-12);
        assert!((s.lat - 45.0).abs() < 1e-12);
    }

    #[test]
    fn test_mesh_rejects_bad_index() {
        let err = Mesh::new(vec![[0.0; 3]; 3], vec![[0, 1, 3]]).unwrap_err();
        assert!(matches!(err, MapError::Mesh(_)));
    }

    #[test]
    fn test_face_centroid_samples() {
        let mesh = Mesh::new(
            vec![[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]],
            vec![[0, 1, 2]],
        )
        .unwrap();
        let s = mesh.face_samples();
        assert_eq!(s.len(), 1);
        assert!((s[0].lon - 45.0).abs() < 1e-12);
        assert!(s[0].lat > 0.0);
        let corners = mesh.face_lonlat(0);
        assert!((corners[1][0] - 90.0).abs() < 1e-12);
        assert!((corners[2][1] - 90.0).abs() < 1e-12);
    }
}
