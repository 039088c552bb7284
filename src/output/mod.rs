//! Finished-figure outputs: PNG files and on-screen display.

pub mod iterm2;
#[cfg(feature = "window")]
pub mod window;

use std::io::Write;
use std::path::Path;

use tracing::{debug, info};

use crate::error::{MapError, Result};
use crate::renderer::canvas::Canvas;
use crate::style::Style;

/// Encode a canvas as an RGBA PNG carrying the style's resolution.
pub fn encode_png(canvas: &Canvas, style: &Style) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    {
        let mut encoder = png::Encoder::new(&mut buf, canvas.width() as u32, canvas.height() as u32);
        encoder.set_color(png::ColorType::Rgba);
        encoder.set_depth(png::BitDepth::Eight);
        let ppm = style.pixels_per_metre();
        encoder.set_pixel_dims(Some(png::PixelDimensions {
            xppu: ppm,
            yppu: ppm,
            unit: png::Unit::Meter,
        }));
        let mut writer = encoder
            .write_header()
            .map_err(|e| MapError::Encode(e.to_string()))?;
        writer
            .write_image_data(canvas.pixels())
            .map_err(|e| MapError::Encode(e.to_string()))?;
        writer.finish().map_err(|e| MapError::Encode(e.to_string()))?;
    }
    Ok(buf)
}

/// Encode, then create the parent directory and write the file. Nothing is
/// written if encoding fails.
pub fn save_png(canvas: &Canvas, path: &Path, style: &Style) -> Result<()> {
    let bytes = encode_png(canvas, style)?;
    write_together(&[(path, bytes.as_slice())])?;
    info!(path = %path.display(), bytes = bytes.len(), dpi = style.dpi, "saved figure");
    Ok(())
}

/// Write several files so that either all of them land or none do.
///
/// Each file is staged in a temporary file beside its target, creating
/// directories as needed, and renamed into place only once every file is
/// staged. If a rename fails, targets already placed are removed.
pub fn write_together(files: &[(&Path, &[u8])]) -> Result<()> {
    let mut staged = Vec::with_capacity(files.len());
    for &(path, bytes) in files {
        let dir = path
            .parent()
            .filter(|d| !d.as_os_str().is_empty())
            .unwrap_or(Path::new("."));
        std::fs::create_dir_all(dir).map_err(|e| MapError::io(dir, e))?;
        let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(|e| MapError::io(dir, e))?;
        tmp.write_all(bytes)
            .and_then(|()| tmp.flush())
            .map_err(|e| MapError::io(path, e))?;
        staged.push((tmp, path));
    }

    // Unplaced temporaries are deleted when dropped.
    let mut placed: Vec<&Path> = Vec::with_capacity(staged.len());
    for (tmp, path) in staged {
        if let Err(e) = tmp.persist(path) {
            for done in placed {
                if let Err(rm) = std::fs::remove_file(done) {
                    debug!(path = %done.display(), error = %rm, "could not remove partial output");
                }
            }
            return Err(MapError::io(path, e.error));
        }
        placed.push(path);
    }
    Ok(())
}

/// Where `show` puts the figure.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Backend {
    /// Inline image on stdout.
    Iterm2,
    /// Native window, closed with Escape.
    Window,
}

impl Backend {
    /// iTerm2 when running inside it, otherwise a window if compiled in.
    pub fn detect(term_program: Option<&str>) -> Option<Backend> {
        if term_program == Some("iTerm.app") {
            return Some(Backend::Iterm2);
        }
        if cfg!(feature = "window") {
            Some(Backend::Window)
        } else {
            None
        }
    }
}

/// Display a finished figure, blocking until it has been shown.
pub fn show(canvas: &Canvas, title: &str, style: &Style) -> Result<()> {
    let term = std::env::var("TERM_PROGRAM").ok();
    match Backend::detect(term.as_deref()) {
        Some(Backend::Iterm2) => iterm2::show(canvas, style),
        #[cfg(feature = "window")]
        Some(Backend::Window) => window::show(canvas, title),
        _ => {
            let _ = title;
            Err(MapError::Display(
                "no display backend: not in iTerm2 and built without the `window` feature".into(),
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode(bytes: &[u8]) -> (png::OutputInfo, Vec<u8>, Option<png::PixelDimensions>) {
        let decoder = png::Decoder::new(std::io::Cursor::new(bytes));
        let mut reader = decoder.read_info().expect("PNG should be decodable");
        let dims = reader.info().pixel_dims;
        let mut buf = vec![0u8; reader.output_buffer_size()];
        let info = reader.next_frame(&mut buf).expect("PNG frame should be readable");
        (info, buf, dims)
    }

    #[test]
    fn test_encode_png_round_trips_pixels_and_dpi() {
        let style = Style::default();
        let mut canvas = Canvas::new(8, 4, [10, 20, 30]);
        canvas.set(3, 2, [200, 100, 50]);
        let bytes = encode_png(&canvas, &style).unwrap();
        let (info, buf, dims) = decode(&bytes);
        assert_eq!((info.width, info.height), (8, 4));
        assert_eq!(&buf[..info.buffer_size()], canvas.pixels());
        let dims = dims.expect("pHYs chunk should be present");
        assert_eq!(dims.xppu, 11811, "300 dpi in pixels per metre");
        assert_eq!(dims.unit, png::Unit::Meter);
    }

    #[test]
    fn test_encode_png_is_deterministic() {
        let style = Style::default();
        let canvas = Canvas::new(16, 16, [1, 2, 3]);
        assert_eq!(encode_png(&canvas, &style).unwrap(), encode_png(&canvas, &style).unwrap());
    }

    #[test]
    fn test_save_png_creates_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/maps/t.png");
        save_png(&Canvas::new(4, 4, [0, 0, 0]), &path, &Style::default()).unwrap();
        assert!(path.exists(), "file should be written under a new directory");
    }

    #[test]
    fn test_save_png_reports_path_on_failure() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("file");
        std::fs::write(&blocker, b"x").unwrap();
        let err = save_png(&Canvas::new(2, 2, [0, 0, 0]), &blocker.join("t.png"), &Style::default()).unwrap_err();
        assert!(matches!(err, MapError::Io { .. }), "got {err:?}");
    }

    #[test]
    fn test_write_together_places_every_file() {
        let dir = tempfile::tempdir().unwrap();
        let png = dir.path().join("maps/t.png");
        let txt = dir.path().join("maps/t.txt");
        write_together(&[(png.as_path(), b"image".as_slice()), (txt.as_path(), b"table".as_slice())]).unwrap();
        assert_eq!(std::fs::read(&png).unwrap(), b"image");
        assert_eq!(std::fs::read(&txt).unwrap(), b"table");
        let leftovers = std::fs::read_dir(dir.path().join("maps")).unwrap().count();
        assert_eq!(leftovers, 2, "no staging files should remain");
    }

    #[test]
    fn test_write_together_is_all_or_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let png = dir.path().join("t.png");
        // A directory where the table should go makes the second rename fail.
        let txt = dir.path().join("t.txt");
        std::fs::create_dir(&txt).unwrap();
        let err = write_together(&[(png.as_path(), b"image".as_slice()), (txt.as_path(), b"table".as_slice())]).unwrap_err();
        assert!(matches!(err, MapError::Io { .. }), "got {err:?}");
        assert!(!png.exists(), "image must not be left behind");
        let names: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(names, [std::ffi::OsString::from("t.txt")], "only the blocking directory remains");
    }

    #[test]
    fn test_backend_detection() {
        assert_eq!(Backend::detect(Some("iTerm.app")), Some(Backend::Iterm2));
        let fallback = Backend::detect(Some("Apple_Terminal"));
        if cfg!(feature = "window") {
            assert_eq!(fallback, Some(Backend::Window));
        } else {
            assert_eq!(fallback, None);
        }
    }
}
