use crate::config::FillRule;
use raster_geom::{Argb, blend_source_over, fixed_to_alpha, fold_even_odd};

/// Finds the inclusive `[first, last]` column range touched by a row's
/// active-cell mask, or `None` if the row has no active cells.
pub(crate) fn active_column_range(mask_row: &[u32], width: u32) -> Option<(u32, u32)> {
  let first_word = mask_row.iter().position(|&w| w != 0)?;
  let last_word = mask_row.iter().rposition(|&w| w != 0)?;
  let first_bit = mask_row[first_word].trailing_zeros();
  let last_bit = 31 - mask_row[last_word].leading_zeros();
  let first = first_word as u32 * 32 + first_bit;
  let last = ((last_word as u32 * 32 + last_bit) as u32).min(width - 1);
  Some((first, last))
}

/// Resolves one tile's rows in place: converts accumulated cover/area cells
/// into per-pixel alpha and blends `color` into the framebuffer under
/// `fill_rule`, using the active-cell mask to skip whitespace-only rows and
/// to find where each row's sweep can safely start and stop.
///
/// On return, every cover/area cell and mask bit this call touched is
/// zeroed, matching the contract that no cell state survives a resolve.
pub fn resolve_tile_scalar(
  width: u32,
  height: u32,
  covers: &mut [i32],
  areas: &mut [i32],
  active_mask: &mut [u32],
  framebuffer: &mut [u32],
  color: Argb,
  fill_rule: FillRule,
) {
  let words_per_row = width.div_ceil(32) as usize;
  let width = width as usize;

  for row in 0..height as usize {
    let mask_row = &mut active_mask[row * words_per_row..(row + 1) * words_per_row];
    let Some((x_first, x_last)) = active_column_range(mask_row, width as u32) else {
      continue;
    };
    mask_row.fill(0);

    let row_offset = row * width;
    let mut cell_acc: i32 = 0;
    let mut x = x_first as usize;
    loop {
      let idx = row_offset + x;
      let cv = covers[idx];
      let ar = areas[idx];
      covers[idx] = 0;
      areas[idx] = 0;

      cell_acc += cv - ar;
      let coverage = cell_acc;
      cell_acc += ar;

      let mut magnitude = coverage.unsigned_abs();
      if fill_rule == FillRule::EvenOdd {
        magnitude = fold_even_odd(magnitude);
      }
      let alpha = fixed_to_alpha(magnitude as i32);

      if alpha > 1 {
        let bg = Argb(framebuffer[idx]);
        framebuffer[idx] = blend_source_over(color, bg, alpha).0;
      }

      if x as u32 > x_last && cell_acc == 0 {
        break;
      }
      if x + 1 >= width {
        break;
      }
      x += 1;
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn words_per_row(width: u32) -> usize {
    width.div_ceil(32) as usize
  }

  #[test]
  fn fully_clear_row_is_skipped_and_framebuffer_untouched() {
    let width = 4u32;
    let height = 1u32;
    let mut covers = vec![0i32; (width * height) as usize];
    let mut areas = vec![0i32; (width * height) as usize];
    let mut mask = vec![0u32; words_per_row(width) * height as usize];
    let mut fb = vec![Argb::WHITE.0; (width * height) as usize];
    resolve_tile_scalar(width, height, &mut covers, &mut areas, &mut mask, &mut fb, Argb::from_channels(0xFF, 255, 0, 0), FillRule::NonZero);
    assert!(fb.iter().all(|&p| p == Argb::WHITE.0));
  }

  #[test]
  fn full_column_coverage_blends_opaque_source_color() {
    let width = 3u32;
    let height = 1u32;
    let mut covers = vec![0i32; 3];
    let mut areas = vec![0i32; 3];
    covers[1] = raster_geom::COV_ONE;
    let mut mask = vec![0u32; words_per_row(width)];
    mask[0] = 1 << 1;
    let mut fb = vec![Argb::WHITE.0; 3];
    let red = Argb::from_channels(0xFF, 255, 0, 0);
    resolve_tile_scalar(width, height, &mut covers, &mut areas, &mut mask, &mut fb, red, FillRule::NonZero);
    assert_eq!(Argb(fb[0]), Argb::WHITE);
    assert_ne!(Argb(fb[1]), Argb::WHITE);
    assert_eq!(covers[1], 0);
    assert_eq!(mask[0], 0);
  }
}
