use std::path::Path;

use rstest::rstest;
use shapemap::config::MapConfig;
use shapemap::geometry::{FieldLocation, Mesh, SphericalSample, spherical_to_cartesian};
use shapemap::interp::FieldInput;
use shapemap::pipeline::render_map_with;
use shapemap::series::Series;
use shapemap::style::Style;
use shapemap::{MapError, table};

/// UV sphere with `nlon` x `nlat` quads split into triangles, poles capped.
/// The first meridian sits on +180 so faces closing the ring cross the seam.
fn uv_sphere(nlon: usize, nlat: usize) -> Mesh {
    let mut vertices = vec![[0.0, 0.0, 1.0]];
    for j in 1..nlat {
        let lat = 90.0 - 180.0 * j as f64 / nlat as f64;
        for i in 0..nlon {
            let lon = 180.0 - 360.0 * i as f64 / nlon as f64;
            vertices.push(spherical_to_cartesian(lon.to_radians(), lat.to_radians(), 1.0));
        }
    }
    vertices.push([0.0, 0.0, -1.0]);
    let south = vertices.len() - 1;
    let ring = |j: usize, i: usize| 1 + (j - 1) * nlon + i % nlon;

    let mut faces = Vec::new();
    for i in 0..nlon {
        faces.push([0, ring(1, i), ring(1, i + 1)]);
        faces.push([south, ring(nlat - 1, i + 1), ring(nlat - 1, i)]);
    }
    for j in 1..nlat - 1 {
        for i in 0..nlon {
            let (a, b) = (ring(j, i), ring(j, i + 1));
            let (c, d) = (ring(j + 1, i), ring(j + 1, i + 1));
            faces.push([a, c, b]);
            faces.push([b, c, d]);
        }
    }
    Mesh::new(vertices, faces).unwrap()
}

/// Smooth field: warm equator, cold poles, plus a longitude wave.
fn field(samples: &[SphericalSample]) -> Vec<f64> {
    samples
        .iter()
        .map(|s| 100.0 + 250.0 * s.lat.to_radians().cos() + 20.0 * (2.0 * s.lon.to_radians()).sin())
        .collect()
}

fn config(dir: &Path, yaml: &str) -> MapConfig {
    let mut cfg = MapConfig::from_yaml_str(yaml).unwrap();
    cfg.figure.width = 480;
    cfg.figure.height = 300;
    cfg.output.dir = dir.to_path_buf();
    cfg
}

#[rstest]
#[case::mesh_direct("strategy: { method: mesh-direct }\n")]
#[case::rbf("strategy: { method: rbf }\ngrid: { nx: 24, ny: 12 }\n")]
#[case::triangulated("strategy: { method: triangulated-linear }\n")]
#[case::tricontour("strategy: { method: tricontour }\ncontour_step: 50.0\n")]
#[case::grid_pcolor("strategy: { method: grid-data, mode: pcolor }\n")]
#[case::grid_image("strategy: { method: grid-data, mode: image }\ncolorbar: { orientation: vertical, show_limits: true }\n")]
fn test_same_input_gives_identical_png(#[case] yaml: &str) {
    let mesh = uv_sphere(24, 12);
    let values = field(&mesh.face_samples());
    let input = FieldInput::from_mesh(&mesh, &values, FieldLocation::Faces).unwrap();
    let dir = tempfile::tempdir().unwrap();
    let style = Style::default();

    let mut bytes = Vec::new();
    for name in ["a", "b"] {
        let mut cfg = config(dir.path(), yaml);
        cfg.normalization = shapemap::normalize::NormalizationSpec::linear(0.0, 400.0);
        cfg.output.name = Some(name.into());
        cfg.output.save = true;
        let outcome = render_map_with(&input, &cfg, &style).unwrap();
        assert!(!outcome.data_derived_bounds);
        let path = outcome.image_path.expect("image should be saved");
        bytes.push(std::fs::read(path).unwrap());
    }
    assert!(bytes[0].starts_with(&[0x89, b'P', b'N', b'G']));
    assert_eq!(bytes[0], bytes[1], "renders of the same input must be byte-identical");
}

#[test]
fn test_unknown_grid_mode_writes_nothing() {
    let yaml = "strategy:\n  method: grid-data\n  mode: unknown\noutput:\n  name: bad\n  save: true\n";
    let err = MapConfig::from_yaml_str(yaml).unwrap_err();
    assert!(matches!(err, MapError::Config(_)), "got {err:?}");
    // Nothing was rendered, so nothing exists under the default output dir.
    assert!(!Path::new("out/bad.png").exists());
}

#[test]
fn test_unknown_mode_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("map.yaml");
    std::fs::write(&path, "strategy:\n  method: grid-data\n  mode: unknown\n").unwrap();
    assert!(matches!(MapConfig::load(&path), Err(MapError::Config(_))));
}

#[test]
fn test_too_fine_contour_step_writes_nothing() {
    let mesh = uv_sphere(12, 6);
    let values = field(&mesh.face_samples());
    let input = FieldInput::from_mesh(&mesh, &values, FieldLocation::Faces).unwrap();
    let dir = tempfile::tempdir().unwrap();
    let mut cfg = config(dir.path(), "strategy: { method: tricontour }\ncontour_step: 0.1\n");
    cfg.normalization = shapemap::normalize::NormalizationSpec::linear(0.0, 400.0);
    cfg.output.name = Some("fine".into());
    cfg.output.save = true;
    cfg.output.write_table = true;
    let err = render_map_with(&input, &cfg, &Style::default()).unwrap_err();
    assert!(matches!(err, MapError::Config(_)), "got {err:?}");
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0, "no image or table");
}

#[test]
fn test_table_two_series_with_z() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tables/out.txt");
    let make = |k: f64| {
        let x: Vec<f64> = (0..10).map(|i| i as f64).collect();
        let y = x.iter().map(|v| v * k).collect();
        let z = x.iter().map(|v| v + k).collect();
        Series::new(x, y).with_z(z)
    };
    table::write_table(&[make(1.0), make(2.0)], None, &path).unwrap();
    let text = std::fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines[0], "x0,y0,z0,x1,y1,z1");
    assert_eq!(lines.len(), 11, "header plus 10 rows");
}

#[test]
fn test_data_derived_bounds_reported() {
    let mesh = uv_sphere(12, 6);
    let values = field(&mesh.face_samples());
    let input = FieldInput::from_mesh(&mesh, &values, FieldLocation::Faces).unwrap();
    let dir = tempfile::tempdir().unwrap();
    let cfg = config(dir.path(), "normalization: { kind: linear }\n");
    let outcome = render_map_with(&input, &cfg, &Style::default()).unwrap();
    assert!(outcome.data_derived_bounds, "no explicit bounds means data-derived");
}

#[test]
fn test_vertex_field_on_mesh() {
    let mesh = uv_sphere(12, 6);
    let values = field(&mesh.vertex_samples());
    let input = FieldInput::from_mesh(&mesh, &values, FieldLocation::Vertices).unwrap();
    let dir = tempfile::tempdir().unwrap();
    let mut cfg = config(dir.path(), "strategy: { method: rbf }\n");
    cfg.output.name = Some("v".into());
    cfg.output.write_table = true;
    let outcome = render_map_with(&input, &cfg, &Style::default()).unwrap();
    let text = std::fs::read_to_string(outcome.table_path.unwrap()).unwrap();
    assert_eq!(text.lines().count(), mesh.vertices().len() + 1);
}

#[test]
fn test_seam_faces_are_corrected() {
    let mesh = uv_sphere(24, 12);
    let values = field(&mesh.face_samples());
    let input = FieldInput::from_mesh(&mesh, &values, FieldLocation::Faces).unwrap();
    let dir = tempfile::tempdir().unwrap();
    let cfg = config(dir.path(), "seam:\n  threshold: 90.0\n  matching: !tolerance 1.0\n");
    let outcome = render_map_with(&input, &cfg, &Style::default()).unwrap();
    assert!(outcome.seam_corrections > 0, "faces spanning the antimeridian should be remapped");
}
