//! `Series` — a column of possibly-undefined real values.
//!
//! Indicator warm-up periods are modeled as `None`, never as a NaN
//! sentinel: every numeric operator over a `Series` lifts through the
//! option instead of hand-checking `is_nan()`.

/// A column of row-aligned, possibly-undefined real values.
pub type Series = Vec<Option<f64>>;

/// Element-wise subtraction, `None` if either input is `None`.
pub fn sub(a: &Series, b: &Series) -> Series {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| x.zip(*y).map(|(x, y)| x - y))
        .collect()
}

/// Element-wise absolute difference.
pub fn abs_diff(a: &Series, b: &Series) -> Series {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| x.zip(*y).map(|(x, y)| (x - y).abs()))
        .collect()
}
