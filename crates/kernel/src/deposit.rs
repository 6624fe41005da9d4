use physarum_common::{Agent, GridSize};
use rayon::prelude::*;

/// Mark every cell holding an agent with `sentinel` and every other cell with 0.
///
/// Target cells are resolved in parallel, then written in one pass. Several
/// agents sharing a cell write the same value, so order does not matter.
pub fn rasterize(agents: &[Agent], grid: GridSize, sentinel: f64, layer: &mut [f64]) {
    debug_assert_eq!(layer.len(), grid.cell_count());
    layer.fill(0.0);

    let targets: Vec<usize> = agents
        .par_iter()
        .filter_map(|a| grid.cell_index(a.position))
        .collect();
    for idx in targets {
        layer[idx] = sentinel;
    }
}
