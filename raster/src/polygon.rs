use crate::edge::trace_edge;
use crate::tile::TileGrid;

/// Splits a flat vertex buffer into per-contour point ranges.
///
/// An absent or malformed `contour_counts` (any entry `<= 0`, or a sum
/// that does not equal the point count) falls back to treating the whole
/// buffer as a single contour, matching the rasterizer's silently-recovered
/// error policy.
fn contour_ranges(point_count: usize, contour_counts: Option<&[usize]>) -> Vec<(usize, usize)> {
  if let Some(counts) = contour_counts {
    if !counts.is_empty() && counts.iter().all(|&k| k >= 3) && counts.iter().sum::<usize>() == point_count {
      let mut ranges = Vec::with_capacity(counts.len());
      let mut start = 0;
      for &k in counts {
        ranges.push((start, start + k));
        start += k;
      }
      return ranges;
    }
  }
  vec![(0, point_count)]
}

/// Signed double-area of a contour via the shoelace formula. Positive for
/// a clockwise-in-screen-space (y-down) contour winding.
fn signed_double_area(points: &[(f64, f64)]) -> f64 {
  let n = points.len();
  let mut sum = 0.0;
  for i in 0..n {
    let (x0, y0) = points[i];
    let (x1, y1) = points[(i + 1) % n];
    sum += x0 * y1 - x1 * y0;
  }
  sum
}

/// Accumulates a polygon's edges into the tile grid.
///
/// `vertices` is a flat `[x0, y0, x1, y1, ...]` buffer. Each sub-contour
/// resolved from `contour_counts` has its winding normalized by signed
/// area before its edges are traced, so that two identical overlapping
/// contours filled under the non-zero rule do not cancel each other out —
/// without this, reversing a contour's vertex order would flip the sign
/// every edge contributes and an overlap would wind back toward zero
/// instead of doubling.
///
/// Silently does nothing if `vertices` has fewer than 6 values (3 points).
pub fn accumulate_polygon(grid: &mut TileGrid, vertices: &[f64], contour_counts: Option<&[usize]>) {
  if vertices.len() < 6 || vertices.len() % 2 != 0 {
    return;
  }
  let points: Vec<(f64, f64)> = vertices.chunks_exact(2).map(|c| (c[0], c[1])).collect();

  for (start, end) in contour_ranges(points.len(), contour_counts) {
    let contour = &points[start..end];
    if contour.len() < 3 {
      continue;
    }
    let reverse = signed_double_area(contour) > 0.0;
    let ordered: Vec<(f64, f64)> = if reverse {
      contour.iter().rev().copied().collect()
    } else {
      contour.to_vec()
    };
    let n = ordered.len();
    for i in 0..n {
      let a = ordered[i];
      let b = ordered[(i + 1) % n];
      trace_edge(grid, a.0, a.1, b.0, b.1);
    }
  }
}
