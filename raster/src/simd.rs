use crate::config::FillRule;
use raster_geom::{Argb, COV_ONE};
use wide::{i32x4, CmpGt, CmpLt};

/// Four-lane variant of [`crate::resolve::resolve_tile_scalar`].
///
/// The horizontal cover/area sweep is an inherent dependency chain (each
/// pixel's coverage depends on every cell to its left in the row) and stays
/// serial here exactly as in the scalar kernel. What gets vectorized is the
/// per-pixel math once four consecutive coverage values are known: the
/// absolute value, the even-odd fold, the coverage-to-alpha shift, and the
/// source-over blend of four pixels at once. Every one of those steps uses
/// the same integer shifts and truncations as the scalar kernel, so the two
/// kernels must produce the same framebuffer bit pattern.
pub fn resolve_tile_simd(
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
  let width_usize = width as usize;

  let mut coverage_row: Vec<i32> = Vec::with_capacity(width_usize);

  for row in 0..height as usize {
    let mask_row = &mut active_mask[row * words_per_row..(row + 1) * words_per_row];
    let Some((x_first, x_last)) = super::resolve::active_column_range(mask_row, width) else {
      continue;
    };
    mask_row.fill(0);

    let row_offset = row * width_usize;

    // Serial dependency chain: compute every pixel's signed coverage from
    // x_first up to wherever the residual accumulator returns to zero.
    coverage_row.clear();
    let mut cell_acc: i32 = 0;
    let mut x = x_first as usize;
    loop {
      let idx = row_offset + x;
      let cv = covers[idx];
      let ar = areas[idx];
      covers[idx] = 0;
      areas[idx] = 0;

      cell_acc += cv - ar;
      coverage_row.push(cell_acc);
      cell_acc += ar;

      if x as u32 > x_last && cell_acc == 0 {
        break;
      }
      if x + 1 >= width_usize {
        break;
      }
      x += 1;
    }

    // Lane-parallel pass over the coverage values just computed.
    let src_r = i32x4::splat(color.r() as i32);
    let src_g = i32x4::splat(color.g() as i32);
    let src_b = i32x4::splat(color.b() as i32);
    let src_a = i32x4::splat(color.a() as i32);

    let mut lane = 0usize;
    while lane < coverage_row.len() {
      let remaining = coverage_row.len() - lane;
      if remaining >= 4 {
        let base_x = x_first as usize + lane;
        let cov = i32x4::new([
          coverage_row[lane],
          coverage_row[lane + 1],
          coverage_row[lane + 2],
          coverage_row[lane + 3],
        ]);
        let alpha = coverage_lane_to_alpha(cov, fill_rule);
        let alpha_arr: [i32; 4] = alpha.into();
        for lane_i in 0..4 {
          let px = base_x + lane_i;
          let idx = row_offset + px;
          let a = alpha_arr[lane_i];
          if a > 1 {
            let bg = Argb(framebuffer[idx]);
            let final_a = (src_a.to_array()[0] * a) >> 8;
            let blend = |s: i32, b: i32| -> u8 { (b + (((s - b) * final_a) >> 8)) as u8 };
            let out = Argb::from_channels(0xFF, blend(src_r.to_array()[0], bg.r() as i32), blend(src_g.to_array()[0], bg.g() as i32), blend(src_b.to_array()[0], bg.b() as i32));
            framebuffer[idx] = out.0;
          }
        }
        lane += 4;
      } else {
        let base_x = x_first as usize + lane;
        for lane_i in 0..remaining {
          let px = base_x + lane_i;
          let idx = row_offset + px;
          let coverage = coverage_row[lane + lane_i];
          let mut magnitude = coverage.unsigned_abs();
          if fill_rule == FillRule::EvenOdd {
            magnitude = raster_geom::fold_even_odd(magnitude);
          }
          let alpha = raster_geom::fixed_to_alpha(magnitude as i32);
          if alpha > 1 {
            let bg = Argb(framebuffer[idx]);
            framebuffer[idx] = raster_geom::blend_source_over(color, bg, alpha).0;
          }
        }
        lane += remaining;
      }
    }
  }
}

/// Vectorized `coverage -> alpha` mapping, matching
/// [`raster_geom::fixed_to_alpha`] and the optional even-odd fold applied
/// lane-by-lane.
fn coverage_lane_to_alpha(coverage: i32x4, fill_rule: FillRule) -> i32x4 {
  let zero = i32x4::splat(0);
  let is_neg = coverage.cmp_lt(zero);
  let negated = zero - coverage;
  let mut magnitude = is_neg.blend(negated, coverage);

  if fill_rule == FillRule::EvenOdd {
    // 2 * COV_ONE is a power of two, so the modulo fold is a bitwise mask.
    let period_mask = i32x4::splat(2 * COV_ONE - 1);
    let period = i32x4::splat(2 * COV_ONE);
    let cov_one = i32x4::splat(COV_ONE);
    let wrapped = magnitude & period_mask;
    let over_half = wrapped.cmp_gt(cov_one);
    magnitude = over_half.blend(period - wrapped, wrapped);
  }

  let cov_one = i32x4::splat(COV_ONE);
  let clamped = magnitude.cmp_gt(cov_one).blend(cov_one, magnitude);
  (clamped * i32x4::splat(255)) >> 8
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::resolve::resolve_tile_scalar;

  fn words_per_row(width: u32) -> usize {
    width.div_ceil(32) as usize
  }

  #[test]
  fn simd_and_scalar_agree_on_a_simple_span() {
    let width = 8u32;
    let height = 1u32;
    let color = Argb::from_channels(0xFF, 10, 200, 30);

    let mut covers_a = vec![0i32; 8];
    let mut areas_a = vec![0i32; 8];
    covers_a[2] = 100;
    covers_a[5] = -40;
    areas_a[2] = 10;
    areas_a[6] = 5;
    let mut mask_a = vec![0u32; words_per_row(width)];
    mask_a[0] = (1 << 2) | (1 << 5) | (1 << 6);
    let mut fb_a = vec![Argb::WHITE.0; 8];

    let mut covers_b = covers_a.clone();
    let mut areas_b = areas_a.clone();
    let mut mask_b = mask_a.clone();
    let mut fb_b = fb_a.clone();

    resolve_tile_scalar(width, height, &mut covers_a, &mut areas_a, &mut mask_a, &mut fb_a, color, FillRule::NonZero);
    resolve_tile_simd(width, height, &mut covers_b, &mut areas_b, &mut mask_b, &mut fb_b, color, FillRule::NonZero);

    assert_eq!(fb_a, fb_b);
    assert_eq!(covers_a, covers_b);
    assert_eq!(mask_a, mask_b);
  }
}
