//! iTerm2 inline image protocol: a finished figure printed to stdout as a
//! base64 PNG wrapped in an OSC 1337 escape sequence.

use std::io::Write;

use base64::Engine;

use super::encode_png;
use crate::error::{MapError, Result};
use crate::renderer::canvas::Canvas;
use crate::style::Style;

/// Build the escape sequence for an encoded PNG.
///
/// `disp_w`/`disp_h` are the display dimensions the terminal scales the
/// image to.
pub fn escape_sequence(png: &[u8], disp_w: usize, disp_h: usize) -> Vec<u8> {
    let b64 = base64::engine::general_purpose::STANDARD.encode(png);
    format!(
        "\x1b]1337;File=inline=1;size={};width={}px;height={}px;preserveAspectRatio=0:{}\x07",
        png.len(),
        disp_w,
        disp_h,
        b64,
    )
    .into_bytes()
}

/// Print the canvas inline at its own size.
pub fn show(canvas: &Canvas, style: &Style) -> Result<()> {
    let png = encode_png(canvas, style)?;
    let seq = escape_sequence(&png, canvas.width(), canvas.height());
    let mut out = std::io::stdout().lock();
    out.write_all(&seq)
        .and_then(|_| out.write_all(b"\n"))
        .and_then(|_| out.flush())
        .map_err(|e| MapError::Display(format!("writing inline image: {e}")))
}
