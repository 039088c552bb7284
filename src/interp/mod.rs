pub mod delaunay;
pub mod rbf;

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;
use tracing::debug;

use crate::error::{MapError, Result};
use crate::geometry::{FieldLocation, Mesh, SphericalSample};
use crate::seam::SeamCorrector;

pub use delaunay::{LinearInterpolator, Triangulation};
pub use rbf::{Kernel, RbfInterpolator, RbfOptions};

/// Scalar function of `(lon, lat)` in degrees, built from scattered samples.
pub trait Interpolator {
    fn eval(&self, lon: f64, lat: f64) -> f64;
}

/// How a gridded surface is painted.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GridRender {
    /// Filled contour bands.
    #[default]
    Contour,
    /// Flat-shaded cells.
    Pcolor,
    /// Nearest-node raster.
    Image,
}

impl FromStr for GridRender {
    type Err = MapError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "contour" => Ok(GridRender::Contour),
            "pcolor" => Ok(GridRender::Pcolor),
            "image" => Ok(GridRender::Image),
            other => Err(MapError::config(format!(
                "unknown grid-data mode '{other}' (expected contour, pcolor or image)"
            ))),
        }
    }
}

/// Interpolation strategy, tagged by `method` in configuration files.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(tag = "method", rename_all = "kebab-case")]
pub enum Strategy {
    Rbf,
    TriangulatedLinear,
    /// Filled contours drawn on the Delaunay triangles of the samples.
    Tricontour,
    GridData {
        #[serde(default)]
        mode: GridRender,
    },
    #[default]
    MeshDirect,
}

impl Strategy {
    /// Build from a method name and an optional grid-data sub-mode.
    pub fn from_name(method: &str, mode: Option<&str>) -> Result<Self> {
        let strategy = match method {
            "rbf" => Strategy::Rbf,
            "triangulated-linear" => Strategy::TriangulatedLinear,
            "tricontour" => Strategy::Tricontour,
            "grid-data" => Strategy::GridData {
                mode: mode.map(str::parse::<GridRender>).transpose()?.unwrap_or_default(),
            },
            "mesh-direct" => Strategy::MeshDirect,
            other => {
                return Err(MapError::config(format!(
                    "unknown strategy '{other}' (expected rbf, triangulated-linear, tricontour, grid-data or mesh-direct)"
                )));
            }
        };
        if mode.is_some() && !matches!(strategy, Strategy::GridData { .. }) {
            return Err(MapError::config(format!(
                "strategy '{method}' takes no render mode"
            )));
        }
        Ok(strategy)
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Strategy::Rbf => write!(f, "rbf"),
            Strategy::TriangulatedLinear => write!(f, "triangulated-linear"),
            Strategy::Tricontour => write!(f, "tricontour"),
            Strategy::GridData { mode } => write!(f, "grid-data ({mode:?})"),
            Strategy::MeshDirect => write!(f, "mesh-direct"),
        }
    }
}

/// Node counts of the regular lon/lat evaluation grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LonLatGrid {
    pub nx: usize,
    pub ny: usize,
}

impl Default for LonLatGrid {
    fn default() -> Self {
        Self { nx: 30, ny: 30 }
    }
}

impl LonLatGrid {
    /// Longitude of column `i`, spanning -180..180 inclusive.
    pub fn lon(&self, i: usize) -> f64 {
        -180.0 + 360.0 * i as f64 / (self.nx - 1) as f64
    }

    /// Latitude of row `j`, spanning -90..90 inclusive.
    pub fn lat(&self, j: usize) -> f64 {
        -90.0 + 180.0 * j as f64 / (self.ny - 1) as f64
    }

    pub fn dlon(&self) -> f64 {
        360.0 / (self.nx - 1) as f64
    }

    pub fn dlat(&self) -> f64 {
        180.0 / (self.ny - 1) as f64
    }

    /// Evaluate an interpolant at every node, row-major with row 0 at -90°.
    pub fn sample(&self, interp: &dyn Interpolator) -> Vec<f64> {
        let mut values = Vec::with_capacity(self.nx * self.ny);
        for j in 0..self.ny {
            let lat = self.lat(j);
            for i in 0..self.nx {
                values.push(interp.eval(self.lon(i), lat));
            }
        }
        values
    }
}

/// Scalar field plus the positions it is sampled at.
#[derive(Debug, Clone)]
pub struct FieldInput<'a> {
    pub mesh: Option<&'a Mesh>,
    pub samples: Vec<SphericalSample>,
    pub values: &'a [f64],
    pub location: FieldLocation,
}

impl<'a> FieldInput<'a> {
    pub fn from_mesh(mesh: &'a Mesh, values: &'a [f64], location: FieldLocation) -> Result<Self> {
        let (samples, what) = match location {
            FieldLocation::Faces => (mesh.face_samples(), "faces"),
            FieldLocation::Vertices => (mesh.vertex_samples(), "vertices"),
        };
        if samples.len() != values.len() {
            return Err(MapError::config(format!(
                "field has {} values but the mesh has {} {what}",
                values.len(),
                samples.len()
            )));
        }
        Ok(Self {
            mesh: Some(mesh),
            samples,
            values,
            location,
        })
    }

    /// Scattered samples without a mesh; mesh-direct is unavailable.
    pub fn from_samples(samples: Vec<SphericalSample>, values: &'a [f64]) -> Result<Self> {
        if samples.len() != values.len() {
            return Err(MapError::config(format!(
                "field has {} values but {} sample positions",
                values.len(),
                samples.len()
            )));
        }
        Ok(Self {
            mesh: None,
            samples,
            values,
            location: FieldLocation::Faces,
        })
    }

    pub fn points(&self) -> Vec<[f64; 2]> {
        self.samples.iter().map(SphericalSample::lonlat).collect()
    }
}

/// One projected, seam-corrected face and its value.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FacePatch {
    pub corners: [[f64; 2]; 3],
    pub value: f64,
}

/// What the renderer paints inside the map axes.
#[derive(Debug, Clone)]
pub enum Surface {
    Gridded {
        grid: LonLatGrid,
        /// Row-major, row 0 at -90°. NaN marks empty cells.
        values: Vec<f64>,
        render: GridRender,
    },
    Faces {
        patches: Vec<FacePatch>,
        /// Faces whose longitudes the seam corrector changed.
        corrected: usize,
    },
    /// Samples joined into triangles, contoured without resampling.
    Triangulated {
        mesh: Triangulation,
        /// One value per `mesh.points()` entry.
        values: Vec<f64>,
    },
}

/// Options shared by the gridding strategies.
#[derive(Debug, Clone, Copy, Default)]
pub struct FieldOptions {
    pub grid: LonLatGrid,
    pub rbf: RbfOptions,
    pub seam: SeamCorrector,
}

pub fn render_field(input: &FieldInput, strategy: Strategy, options: &FieldOptions) -> Result<Surface> {
    if options.grid.nx < 2 || options.grid.ny < 2 {
        return Err(MapError::config(format!(
            "grid needs at least 2x2 nodes, got {}x{}",
            options.grid.nx, options.grid.ny
        )));
    }
    debug!(%strategy, samples = input.samples.len(), "building map surface");
    let gridded = |values: Vec<f64>, render| Surface::Gridded {
        grid: options.grid,
        values,
        render,
    };
    match strategy {
        Strategy::Rbf => {
            let rbf = RbfInterpolator::fit(&input.points(), input.values, &options.rbf)?;
            Ok(gridded(options.grid.sample(&rbf), GridRender::Contour))
        }
        Strategy::TriangulatedLinear => {
            let lin = LinearInterpolator::new(&input.points(), input.values);
            Ok(gridded(options.grid.sample(&lin), GridRender::Contour))
        }
        Strategy::Tricontour => {
            let mesh = Triangulation::new(&input.points());
            if mesh.is_empty() {
                return Err(MapError::Interpolation(format!(
                    "tricontour needs 3 distinct non-collinear samples, got {}",
                    mesh.points().len()
                )));
            }
            let values = mesh.source_indices().iter().map(|&i| input.values[i]).collect();
            Ok(Surface::Triangulated { mesh, values })
        }
        Strategy::GridData { mode } => {
            let lin = LinearInterpolator::new(&input.points(), input.values);
            Ok(gridded(options.grid.sample(&lin), mode))
        }
        Strategy::MeshDirect => mesh_patches(input, &options.seam),
    }
}

fn mesh_patches(input: &FieldInput, seam: &SeamCorrector) -> Result<Surface> {
    let mesh = input
        .mesh
        .ok_or_else(|| MapError::config("mesh-direct needs a mesh, not bare samples"))?;
    let mut corrected = 0;
    let patches = (0..mesh.face_count())
        .map(|i| {
            let face = mesh.face_lonlat(i);
            let corners = seam.correct(face);
            if corners != face {
                corrected += 1;
            }
            let value = match input.location {
                FieldLocation::Faces => input.values[i],
                FieldLocation::Vertices => {
                    mesh.faces()[i].iter().map(|&v| input.values[v]).sum::<f64>() / 3.0
                }
            };
            FacePatch { corners, value }
        })
        .collect();
    debug!(corrected, "seam correction applied");
    Ok(Surface::Faces { patches, corrected })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seam::SeamMatch;

    /// Octahedron: six vertices on the axes, eight faces.
    fn octahedron() -> Mesh {
        Mesh::new(
            vec![
                [1.0, 0.0, 0.0],
                [0.0, 1.0, 0.0],
                [-1.0, 0.0, 0.0],
                [0.0, -1.0, 0.0],
                [0.0, 0.0, 1.0],
                [0.0, 0.0, -1.0],
            ],
            vec![
                [0, 1, 4],
                [1, 2, 4],
                [2, 3, 4],
                [3, 0, 4],
                [1, 0, 5],
                [2, 1, 5],
                [3, 2, 5],
                [0, 3, 5],
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_strategy_from_name() {
        assert_eq!(Strategy::from_name("rbf", None).unwrap(), Strategy::Rbf);
        assert_eq!(
            Strategy::from_name("grid-data", Some("pcolor")).unwrap(),
            Strategy::GridData {
                mode: GridRender::Pcolor
            }
        );
        assert_eq!(
            Strategy::from_name("grid-data", None).unwrap(),
            Strategy::GridData {
                mode: GridRender::Contour
            }
        );
        assert!(matches!(
            Strategy::from_name("grid-data", Some("unknown")),
            Err(MapError::Config(_))
        ));
        assert!(matches!(
            Strategy::from_name("kriging", None),
            Err(MapError::Config(_))
        ));
        assert!(Strategy::from_name("rbf", Some("image")).is_err());
        assert_eq!(Strategy::from_name("tricontour", None).unwrap(), Strategy::Tricontour);
        assert!(Strategy::from_name("tricontour", Some("pcolor")).is_err());
    }

    #[test]
    fn test_strategy_deserialize() {
        let s: Strategy = serde_yaml::from_str("method: triangulated-linear").unwrap();
        assert_eq!(s, Strategy::TriangulatedLinear);
        let s: Strategy = serde_yaml::from_str("method: grid-data\nmode: image").unwrap();
        assert_eq!(
            s,
            Strategy::GridData {
                mode: GridRender::Image
            }
        );
        assert!(serde_yaml::from_str::<Strategy>("method: grid-data\nmode: unknown").is_err());
        let s: Strategy = serde_yaml::from_str("method: tricontour").unwrap();
        assert_eq!(s, Strategy::Tricontour);
    }

    #[test]
    fn test_grid_spans_full_map() {
        let grid = LonLatGrid::default();
        assert_eq!(grid.lon(0), -180.0);
        assert_eq!(grid.lon(29), 180.0);
        assert_eq!(grid.lat(0), -90.0);
        assert_eq!(grid.lat(29), 90.0);
    }

    #[test]
    fn test_field_length_mismatch() {
        let mesh = octahedron();
        let values = [1.0; 5];
        let err = FieldInput::from_mesh(&mesh, &values, FieldLocation::Faces).unwrap_err();
        assert!(matches!(err, MapError::Config(_)));
    }

    #[test]
    fn test_mesh_direct_corrects_seam_faces() {
        let mesh = octahedron();
        let values: Vec<f64> = (0..8).map(|v| v as f64).collect();
        let input = FieldInput::from_mesh(&mesh, &values, FieldLocation::Faces).unwrap();
        let opts = FieldOptions {
            seam: SeamCorrector::new(90.0, SeamMatch::Exact),
            ..Default::default()
        };
        let Surface::Faces { patches, corrected } =
            render_field(&input, Strategy::MeshDirect, &opts).unwrap()
        else {
            panic!("mesh-direct should produce face patches");
        };
        assert_eq!(patches.len(), 8);
        assert_eq!(patches[2].value, 2.0);
        // Faces touching (-1, 0, 0) sit at +180 and border the -90 meridian.
        assert!(corrected >= 2, "expected seam faces to be corrected, got {corrected}");
        for p in &patches {
            assert!(p.corners.iter().all(|c| c[1].abs() <= 90.0));
        }
    }

    #[test]
    fn test_mesh_direct_needs_mesh() {
        let samples = vec![
            SphericalSample {
                lon: 0.0,
                lat: 0.0,
                radius: 1.0
            };
            3
        ];
        let values = [1.0, 2.0, 3.0];
        let input = FieldInput::from_samples(samples, &values).unwrap();
        let err = render_field(&input, Strategy::MeshDirect, &FieldOptions::default()).unwrap_err();
        assert!(matches!(err, MapError::Config(_)));
    }

    #[test]
    fn test_vertex_values_average_per_face() {
        let mesh = octahedron();
        let values = [0.0, 3.0, 0.0, 0.0, 6.0, 0.0];
        let input = FieldInput::from_mesh(&mesh, &values, FieldLocation::Vertices).unwrap();
        let Surface::Faces { patches, .. } =
            render_field(&input, Strategy::MeshDirect, &FieldOptions::default()).unwrap()
        else {
            panic!("expected faces");
        };
        assert_eq!(patches[0].value, 3.0);
    }

    #[test]
    fn test_linear_strategy_leaves_outside_hull_nan() {
        let mesh = octahedron();
        let values: Vec<f64> = (0..8).map(|v| v as f64 * 10.0).collect();
        let input = FieldInput::from_mesh(&mesh, &values, FieldLocation::Faces).unwrap();
        let Surface::Gridded { values, render, .. } = render_field(
            &input,
            Strategy::TriangulatedLinear,
            &FieldOptions::default(),
        )
        .unwrap() else {
            panic!("expected a grid");
        };
        assert_eq!(render, GridRender::Contour);
        assert_eq!(values.len(), 900);
        // Centroids sit at |lat| ~ 35°; the poles are outside their hull.
        assert!(values[0].is_nan(), "south-west corner should be empty");
        assert!(values.iter().any(|v| v.is_finite()));
    }

    #[test]
    fn test_tricontour_keeps_sample_values() {
        let mesh = octahedron();
        let values: Vec<f64> = (0..8).map(|v| v as f64 * 10.0).collect();
        let input = FieldInput::from_mesh(&mesh, &values, FieldLocation::Faces).unwrap();
        let Surface::Triangulated { mesh: tri, values: kept } =
            render_field(&input, Strategy::Tricontour, &FieldOptions::default()).unwrap()
        else {
            panic!("tricontour should keep the triangulation");
        };
        assert!(!tri.is_empty());
        assert_eq!(kept.len(), tri.points().len());
        let samples = input.points();
        for (p, v) in tri.points().iter().zip(&kept) {
            let i = samples.iter().position(|s| s == p).unwrap();
            assert_eq!(*v, values[i], "value at {p:?} moved");
        }
    }

    #[test]
    fn test_tricontour_needs_three_points() {
        let samples = vec![
            SphericalSample {
                lon: 10.0,
                lat: 0.0,
                radius: 1.0
            },
            SphericalSample {
                lon: 20.0,
                lat: 0.0,
                radius: 1.0
            },
        ];
        let values = [1.0, 2.0];
        let input = FieldInput::from_samples(samples, &values).unwrap();
        let err = render_field(&input, Strategy::Tricontour, &FieldOptions::default()).unwrap_err();
        assert!(matches!(err, MapError::Interpolation(_)), "got {err:?}");
    }
}
