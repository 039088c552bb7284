// Native window display via minifb.

use minifb::{Key, Window, WindowOptions};

use crate::error::{MapError, Result};
use crate::renderer::canvas::Canvas;

const TARGET_FPS: usize = 30;

/// Convert RGBA &[u8] buffer to 0RGB &[u32] buffer for minifb.
pub fn rgba_to_argb(rgba: &[u8], out: &mut [u32]) {
    for (i, pixel) in rgba.chunks_exact(4).enumerate() {
        out[i] = (pixel[0] as u32) << 16 | (pixel[1] as u32) << 8 | pixel[2] as u32;
    }
}

/// Show the canvas until the window is closed or Escape is pressed.
pub fn show(canvas: &Canvas, title: &str) -> Result<()> {
    let (w, h) = (canvas.width(), canvas.height());
    let mut framebuf = vec![0u32; w * h];
    rgba_to_argb(canvas.pixels(), &mut framebuf);

    let mut window = Window::new(title, w, h, WindowOptions::default())
        .map_err(|e| MapError::Display(format!("creating window: {e}")))?;
    window.set_target_fps(TARGET_FPS);

    while window.is_open() && !window.is_key_down(Key::Escape) {
        window
            .update_with_buffer(&framebuf, w, h)
            .map_err(|e| MapError::Display(format!("updating window: {e}")))?;
    }
    Ok(())
}
