use crate::tile::TileGrid;
use raster_geom::to_fixed;

/// Traces one oriented line segment into the tile grid's cover/area cells.
///
/// Endpoints outside the image are clipped to its vertical extent; a
/// segment entirely above or below the image contributes nothing. Winding
/// direction is preserved by swapping endpoints (and negating the
/// contributed sign) whenever the segment runs from a higher scanline to a
/// lower one, matching the convention that `cover` is the signed winding a
/// segment contributes while sweeping downward.
pub fn trace_edge(grid: &mut TileGrid, x0: f64, y0: f64, x1: f64, y1: f64) {
  if !(x0.is_finite() && y0.is_finite() && x1.is_finite() && y1.is_finite()) {
    return;
  }
  if y0 == y1 {
    return;
  }

  let (mut ax0, mut ay0, ax1, mut ay1, dir) = if y0 > y1 { (x1, y1, x0, y0, -1) } else { (x0, y0, x1, y1, 1) };

  let height = grid.height as f64;
  if ay1 <= 0.0 || ay0 >= height {
    return;
  }

  let dxdy = (ax1 - ax0) / (ay1 - ay0);
  if ay0 < 0.0 {
    ax0 += dxdy * (0.0 - ay0);
    ay0 = 0.0;
  }
  if ay1 > height {
    ay1 = height;
  }
  if ay0 >= ay1 {
    return;
  }

  let x_at = |y: f64| ax0 + (y - ay0) * dxdy;

  let y_start = ay0.floor() as i64;
  let y_stop = if ay1.fract() == 0.0 { ay1 as i64 } else { ay1.floor() as i64 + 1 };

  for y in y_start..y_stop {
    let row_top = y as f64;
    let row_bottom = row_top + 1.0;
    let seg_y0 = ay0.max(row_top);
    let seg_y1 = ay1.min(row_bottom);
    if seg_y1 <= seg_y0 {
      continue;
    }
    let y0_local = seg_y0 - row_top;
    let y1_local = seg_y1 - row_top;
    let seg_x0 = x_at(seg_y0);
    let seg_x1 = x_at(seg_y1);
    distribute_segment(grid, y as u32, seg_x0, y0_local, seg_x1, y1_local, dir);
  }
}

/// Distributes one within-scanline segment's winding contribution across
/// the pixel columns it crosses, preserving total winding exactly by
/// forcing the last column's share to be whatever remains uncounted
/// rather than recomputing it from scratch.
fn distribute_segment(grid: &mut TileGrid, row: u32, x0: f64, y0_local: f64, x1: f64, y1_local: f64, dir: i32) {
  let y0f = to_fixed(y0_local);
  let y1f = to_fixed(y1_local);
  let total_dist_y = (y1f - y0f) * dir;
  if total_dist_y == 0 {
    return;
  }

  let width = grid.width as i32;
  if width <= 0 {
    return;
  }
  let ix0 = (x0.floor() as i32).clamp(0, width - 1);
  let ix1 = (x1.floor() as i32).clamp(0, width - 1);

  if ix0 == ix1 {
    let xm = (x0 + x1) * 0.5;
    let area = area_delta(total_dist_y, xm, ix0);
    grid.add_cell(ix0 as u32, row, total_dist_y, area);
    return;
  }

  let step: i32 = if ix1 > ix0 { 1 } else { -1 };
  let dxdy_local = (x1 - x0) / (y1_local - y0_local);

  let mut consumed = 0i32;
  let mut cur_x = x0;
  let mut cur_y_local = y0_local;
  let mut ix = ix0;

  loop {
    if ix == ix1 {
      let dist_local = total_dist_y - consumed;
      let xm = (cur_x + x1) * 0.5;
      let area = area_delta(dist_local, xm, ix);
      grid.add_cell(ix as u32, row, dist_local, area);
      break;
    }

    let border_x = if step > 0 { (ix + 1) as f64 } else { ix as f64 };
    let y_at_border = if dxdy_local != 0.0 {
      cur_y_local + (border_x - cur_x) / dxdy_local
    } else {
      y1_local
    };
    let lo = y0_local.min(y1_local);
    let hi = y0_local.max(y1_local);
    let y_at_border = y_at_border.clamp(lo, hi);

    let yf_border = to_fixed(y_at_border);
    let yf_cur = to_fixed(cur_y_local);
    let dist_local = (yf_border - yf_cur) * dir;
    let xm = (cur_x + border_x) * 0.5;
    let area = area_delta(dist_local, xm, ix);
    grid.add_cell(ix as u32, row, dist_local, area);

    consumed += dist_local;
    cur_x = border_x;
    cur_y_local = y_at_border;
    ix += step;
  }
}

#[inline]
fn area_delta(dist_y: i32, x_midpoint: f64, column: i32) -> i32 {
  let x_fraction = to_fixed(x_midpoint - column as f64) as i64;
  ((dist_y as i64 * x_fraction) >> 8) as i32
}
