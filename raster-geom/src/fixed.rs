//! Q24.8 fixed-point helpers used by the edge rasterizer and resolve kernel.
//!
//! Sub-pixel vertical coverage is tracked with 8 fractional bits: one whole
//! unit of winding ("one full scanline crossed") is `COV_ONE`.

/// Number of fractional bits in the fixed-point cover/area representation.
pub const COV_SHIFT: i32 = 8;

/// One full unit of signed coverage, i.e. `1 << COV_SHIFT`.
pub const COV_ONE: i32 = 1 << COV_SHIFT;

/// Converts a fractional value in `[0, 1]` to its Q24.8 fixed-point form,
/// rounding to the nearest integer rather than truncating so that symmetric
/// sub-pixel samples do not bias winding accumulation.
#[inline]
pub fn to_fixed(value: f64) -> i32 {
  (value * COV_ONE as f64).round() as i32
}

/// Converts coverage accumulated in Q24.8 back to an 8-bit alpha value,
/// clamped to `[0, 255]`. Matches the resolve kernel's `(cov * 255) >> 8`
/// approximation rather than a division by 255.
#[inline]
pub fn fixed_to_alpha(signed_coverage: i32) -> u8 {
  let magnitude = signed_coverage.unsigned_abs().min(COV_ONE as u32);
  ((magnitude * 255) >> COV_SHIFT) as u8
}

/// Folds a signed coverage magnitude through the even-odd winding rule:
/// values wrap modulo `2 * COV_ONE` and fold back down around `COV_ONE`.
#[inline]
pub fn fold_even_odd(magnitude: u32) -> u32 {
  let period = (2 * COV_ONE) as u32;
  let wrapped = magnitude % period;
  if wrapped > COV_ONE as u32 {
    period - wrapped
  } else {
    wrapped
  }
}
