use rayon::prelude::*;

/// Merge the deposit layer over the decayed background into `out`.
///
/// A deposit above `cap` resolves to `cap`; every other cell takes the
/// decayed value, clamped into `[0, cap]`.
pub fn composite(deposit: &[f64], decayed: &[f64], cap: f64, out: &mut [f64]) {
    debug_assert_eq!(deposit.len(), out.len());
    debug_assert_eq!(decayed.len(), out.len());

    out.par_iter_mut()
        .zip(deposit.par_iter().zip(decayed.par_iter()))
        .for_each(|(cell, (&mark, &background))| {
            *cell = if mark > cap {
                cap
            } else {
                background.clamp(0.0, cap)
            };
        });
}
