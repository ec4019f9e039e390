use super::schema::Grid;

// ---------------------------------------------------------------------------
// Masking: hide values before display
// ---------------------------------------------------------------------------

/// Masked cells are stored as NaN and drawn with the colormap's "bad" color.
pub const MASKED: f64 = f64::NAN;

/// Mask every cell of `values` whose quality flag is raised (`flag > 0`).
///
/// `values` and every grid in `flags` must share the same shape; a cell is
/// hidden when any of the flags marks it.
pub fn mask_flagged(values: &Grid, flags: &[&Grid]) -> Grid {
    Grid::from_fn(values.rows(), values.cols(), |r, c| {
        if flags.iter().any(|f| f.get(r, c) > 0.0) {
            MASKED
        } else {
            values.get(r, c)
        }
    })
}

/// Mask non-positive samples, which cannot be placed on a log axis.
pub fn mask_non_positive(values: &[f64]) -> Vec<f64> {
    values
        .iter()
        .map(|&v| if v > 0.0 { v } else { MASKED })
        .collect()
}
