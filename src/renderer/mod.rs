pub mod axes;
pub mod canvas;
pub mod chart;
pub mod color;
pub mod colorbar;
pub mod font;
pub mod raster;

use axes::{AxisDecor, AxisScale, AxisTransform, Frame, Locator};
use canvas::{Canvas, PixelRect};
use color::Palette;
use colorbar::{Colorbar, Orientation};
use raster::Shading;

use crate::config::MapConfig;
use crate::error::{MapError, Result};
use crate::interp::{GridRender, Surface};
use crate::normalize::Normalizer;
use crate::style::Style;

pub use chart::draw_chart;

/// Default map tick spacing in degrees.
pub const MAP_TICK_DEGREES: f64 = 30.0;

/// Pixel layout of a map figure.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MapLayout {
    pub frame: Frame,
    pub colorbar: PixelRect,
}

/// Longitude and latitude axes of a map.
#[derive(Clone, Debug, PartialEq)]
pub struct MapAxes {
    pub x: AxisTransform,
    pub y: AxisTransform,
    pub x_decor: AxisDecor,
    pub y_decor: AxisDecor,
}

pub fn map_axes(cfg: &MapConfig) -> MapAxes {
    let [x0, x1] = cfg.x_axis.limits.unwrap_or([-180.0, 180.0]);
    let [y0, y1] = cfg.y_axis.limits.unwrap_or([-90.0, 90.0]);
    let xt = AxisTransform::new(x0, x1, AxisScale::Linear);
    let yt = AxisTransform::new(y0, y1, AxisScale::Linear);
    let xd = AxisDecor::new(
        &xt,
        Locator::Multiple(cfg.x_axis.tick_interval.unwrap_or(MAP_TICK_DEGREES)),
        cfg.x_axis.label.as_deref(),
    );
    let yd = AxisDecor::new(
        &yt,
        Locator::Multiple(cfg.y_axis.tick_interval.unwrap_or(MAP_TICK_DEGREES)),
        cfg.y_axis.label.as_deref(),
    );
    MapAxes {
        x: xt,
        y: yt,
        x_decor: xd,
        y_decor: yd,
    }
}

/// Place the map axes with equal data aspect and the colorbar panel beside
/// or below them.
pub fn layout(cfg: &MapConfig, colorbar: &Colorbar, lonlat: &MapAxes, style: &Style) -> Result<MapLayout> {
    let (xt, yt) = (lonlat.x, lonlat.y);
    let (xd, yd) = (&lonlat.x_decor, &lonlat.y_decor);
    let (fw, fh) = (cfg.figure.width as i64, cfg.figure.height as i64);
    let size = style.text_size();
    let pad = style.padding as i64;
    let half_label = xd.labels.last().map_or(0, |l| size.width(l) as i64 / 2);
    let thickness = colorbar.thickness(cfg.figure.width, cfg.figure.height) as i64;
    let (before, after) = colorbar.margins(style);
    let panel = before as i64 + thickness + after as i64 + pad;
    let x_gutter = axes::bottom_gutter(xd, style) as i64;

    let left = pad + axes::left_gutter(yd, style) as i64;
    let top = pad + size.ch as i64 / 2;
    let mut right = pad + half_label;
    let mut bottom = pad + x_gutter;
    match colorbar.orientation {
        Orientation::Horizontal => bottom += panel,
        Orientation::Vertical => right += panel,
    }
    let avail = PixelRect::new(left, top, fw - left - right, fh - top - bottom);
    if avail.w < 10 || avail.h < 10 {
        return Err(MapError::config(format!(
            "figure {}x{} is too small for the map decorations",
            cfg.figure.width, cfg.figure.height
        )));
    }

    let aspect = (xt.hi - xt.lo) / (yt.hi - yt.lo);
    let mut w = avail.w as f64;
    let mut h = w / aspect;
    if h > avail.h as f64 {
        h = avail.h as f64;
        w = h * aspect;
    }
    let (w, h) = (w.round() as i64, h.round() as i64);
    let rect = PixelRect::new(avail.x + (avail.w - w) / 2, avail.y + (avail.h - h) / 2, w, h);

    let bar = match colorbar.orientation {
        Orientation::Horizontal => {
            let bw = fw / 2;
            PixelRect::new((fw - bw) / 2, rect.bottom() + x_gutter + pad + before as i64, bw, thickness)
        }
        Orientation::Vertical => {
            PixelRect::new(rect.right() + half_label + pad + before as i64, rect.y, thickness, rect.h)
        }
    };
    Ok(MapLayout {
        frame: Frame { rect, x: xt, y: yt },
        colorbar: bar,
    })
}

/// Draw the full map figure: surface, optional grid, axes and colorbar.
pub fn draw_map(surface: &Surface, normalizer: &Normalizer, cfg: &MapConfig, style: &Style) -> Result<Canvas> {
    let levels = match surface {
        Surface::Gridded {
            values,
            render: GridRender::Contour,
            ..
        }
        | Surface::Triangulated { values, .. } => Some(raster::contour_levels(cfg.contour_step, normalizer, values)?),
        _ => None,
    };
    let shading = Shading {
        normalizer,
        palette: Palette::new(cfg.colormap, cfg.reverse_colormap),
        levels: levels.as_deref(),
    };
    let colorbar = Colorbar {
        shading,
        orientation: cfg.colorbar.orientation,
        label: cfg.colorbar.label.as_deref(),
        tick_interval: cfg.colorbar.tick_interval,
        show_limits: cfg.colorbar.show_limits,
    };
    let lonlat = map_axes(cfg);
    let MapLayout { frame, colorbar: bar } = layout(cfg, &colorbar, &lonlat, style)?;
    let (xd, yd) = (&lonlat.x_decor, &lonlat.y_decor);

    let mut canvas = Canvas::new(cfg.figure.width, cfg.figure.height, style.background);
    let edges = (cfg.mesh_edges && matches!(surface, Surface::Faces { .. })).then_some(style.foreground);
    raster::paint_surface(&mut canvas, &frame, surface, &shading, edges);
    if cfg.grid_lines {
        axes::draw_grid(&mut canvas, &frame, xd, yd, style);
    }
    axes::draw_frame(&mut canvas, &frame, xd, yd, style);
    colorbar.draw(&mut canvas, bar, style);
    Ok(canvas)
}
