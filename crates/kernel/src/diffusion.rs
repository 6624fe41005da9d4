use rayon::prelude::*;

use crate::field::TrailField;

/// Blur `field` with a toroidal 3x3 mean, blend toward the blur by `weight`,
/// subtract `decay_rate` and floor at zero. Writes every cell of `out`.
///
/// Rows are processed in parallel; each output cell reads only `field`.
pub fn diffuse_and_decay(field: &TrailField, weight: f64, decay_rate: f64, out: &mut TrailField) {
    debug_assert_eq!(field.grid(), out.grid());
    let width = field.width();

    out.cells_mut()
        .par_chunks_mut(width)
        .enumerate()
        .for_each(|(y, row)| {
            for (x, cell) in row.iter_mut().enumerate() {
                let (xi, yi) = (x as i64, y as i64);
                let mut blurred = 0.0;
                for dy in -1..=1 {
                    for dx in -1..=1 {
                        blurred += field.wrapped(xi + dx, yi + dy);
                    }
                }
                blurred /= 9.0;

                let own = field.get(x, y);
                let diffused = own + (blurred - own) * weight;
                *cell = (diffused - decay_rate).max(0.0);
            }
        });
}
