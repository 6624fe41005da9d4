//! Rendering published snapshots for humans: PGM images and terminal previews.

use std::io::{self, Write};

use physarum_kernel::FieldSnapshot;

/// Ramp from empty to saturated, used by [`ascii_preview`].
const RAMP: &[u8] = b" .:-=+*#%@";

/// Map a cell in `[0, cap]` to `0..=255`.
fn to_gray(value: f64, cap: f64) -> u8 {
    let t = if cap > 0.0 { value / cap } else { 0.0 };
    (t.clamp(0.0, 1.0) * 255.0).round() as u8
}

/// Write `snapshot` as a binary (P5) 8-bit PGM, row 0 first.
pub fn write_pgm<W: Write>(snapshot: &FieldSnapshot, cap: f64, mut out: W) -> io::Result<()> {
    tracing::debug!(
        tick = snapshot.tick,
        width = snapshot.width,
        height = snapshot.height,
        "writing pgm"
    );
    write!(out, "P5\n{} {}\n255\n", snapshot.width, snapshot.height)?;
    let pixels: Vec<u8> = snapshot.cells().iter().map(|&v| to_gray(v, cap)).collect();
    out.write_all(&pixels)?;
    out.flush()
}

/// Downsample `snapshot` to at most `columns` characters per line.
///
/// Each character averages a block of cells; rows use twice the block height
/// to offset the aspect ratio of terminal glyphs.
pub fn ascii_preview(snapshot: &FieldSnapshot, cap: f64, columns: usize) -> String {
    if snapshot.is_empty() || columns == 0 {
        return String::new();
    }
    let block_w = snapshot.width.div_ceil(columns).max(1);
    let block_h = block_w * 2;
    let mut text = String::new();

    for by in (0..snapshot.height).step_by(block_h) {
        for bx in (0..snapshot.width).step_by(block_w) {
            let (mut sum, mut n) = (0.0, 0usize);
            for y in by..(by + block_h).min(snapshot.height) {
                for x in bx..(bx + block_w).min(snapshot.width) {
                    sum += snapshot.get(x, y);
                    n += 1;
                }
            }
            let level = if cap > 0.0 { sum / n as f64 / cap } else { 0.0 };
            let idx = (level.clamp(0.0, 1.0) * (RAMP.len() - 1) as f64).round() as usize;
            text.push(RAMP[idx] as char);
        }
        text.push('\n');
    }
    text
}
