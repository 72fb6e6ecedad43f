use crate::config::{FillRule, RasterizerConfig};
use crate::pool::{ResolveJob, WorkerPool};
use crate::polygon::accumulate_polygon;
use crate::resolve::resolve_tile_scalar;
use crate::simd::resolve_tile_simd;
use crate::tile::{Tile, TileGrid};
use raster_geom::{Argb, RasterError};

/// Accumulates polygons into per-tile cover/area cells and resolves them
/// into an anti-aliased ARGB framebuffer on demand.
///
/// `add_polygon` is synchronous and only ever touches the calling thread;
/// `flush` is the sole operation that may hand work to the worker pool, and
/// blocks until every dirty tile has been resolved.
#[derive(Debug)]
pub struct Rasterizer {
  grid: TileGrid,
  config: RasterizerConfig,
  fill_rule: FillRule,
  background: Argb,
  pool: Option<WorkerPool>,
  disposed: bool,
}

impl Rasterizer {
  pub fn new(width: u32, height: u32, config: RasterizerConfig) -> Result<Self, RasterError> {
    if width == 0 || height == 0 {
      return Err(RasterError::InvalidDimensions { width, height });
    }
    let background = Argb::WHITE;
    let grid = TileGrid::new(width, height, config.tile_height, background);
    Ok(Rasterizer {
      grid,
      config,
      fill_rule: FillRule::NonZero,
      background,
      pool: None,
      disposed: false,
    })
  }

  pub fn width(&self) -> u32 {
    self.grid.width
  }

  pub fn height(&self) -> u32 {
    self.grid.height
  }

  pub fn set_fill_rule(&mut self, rule: FillRule) {
    self.fill_rule = rule;
  }

  pub fn fill_rule(&self) -> FillRule {
    self.fill_rule
  }

  /// Fills every tile with `background` and drops all pending accumulation
  /// state, matching the contract that clear is an immediate, synchronous
  /// reset rather than a deferred one.
  pub fn clear(&mut self, background: Argb) -> Result<(), RasterError> {
    self.check_disposed()?;
    self.background = background;
    self.grid.clear(background);
    Ok(())
  }

  /// Accumulates one polygon's edges. Silently does nothing on a
  /// malformed vertex buffer; see [`accumulate_polygon`].
  pub fn add_polygon(&mut self, vertices: &[f64], contour_counts: Option<&[usize]>) -> Result<(), RasterError> {
    self.check_disposed()?;
    accumulate_polygon(&mut self.grid, vertices, contour_counts);
    Ok(())
  }

  /// Convenience wrapper equivalent to `add_polygon` followed by `flush`
  /// when `flush_now` is set. `winding`, when given, applies only to this
  /// call: the rasterizer's own fill rule is restored before returning.
  pub fn draw_polygon(&mut self, vertices: &[f64], color: Argb, flush_now: bool, contour_counts: Option<&[usize]>, winding: Option<FillRule>) -> Result<(), RasterError> {
    let previous_fill_rule = self.fill_rule;
    if let Some(rule) = winding {
      self.fill_rule = rule;
    }

    let added = self.add_polygon(vertices, contour_counts);
    let result = added.and_then(|()| if flush_now { self.flush(color) } else { Ok(()) });

    self.fill_rule = previous_fill_rule;
    result
  }

  /// Resolves every dirty tile, blending `color` into the framebuffer.
  /// Completes only once every dirty tile has been resolved; afterwards
  /// every tile's cover/area cells and active mask are zero.
  pub fn flush(&mut self, color: Argb) -> Result<(), RasterError> {
    self.check_disposed()?;
    let dirty_indices = self.grid.dirty_tile_indices();
    if dirty_indices.is_empty() {
      return Ok(());
    }

    let dirty_height: u32 = dirty_indices.iter().map(|&i| self.grid.tiles[i].height).sum();
    let use_pool = self.config.use_isolates && dirty_indices.len() >= 2 && dirty_height >= self.config.min_parallel_dirty_height;

    if use_pool {
      if self.pool.is_none() {
        let worker_count = self.config.resolved_worker_count(self.grid.tiles.len());
        self.pool = WorkerPool::new(worker_count);
      }
      if self.pool.is_some() {
        return self.flush_parallel(&dirty_indices, color);
      }
    }

    self.flush_serial(&dirty_indices, color);
    Ok(())
  }

  fn flush_serial(&mut self, dirty_indices: &[usize], color: Argb) {
    for &idx in dirty_indices {
      let tile = &mut self.grid.tiles[idx];
      if self.config.use_simd {
        resolve_tile_simd(tile.width, tile.height, &mut tile.covers, &mut tile.areas, &mut tile.active_mask, &mut tile.framebuffer, color, self.fill_rule);
      } else {
        resolve_tile_scalar(tile.width, tile.height, &mut tile.covers, &mut tile.areas, &mut tile.active_mask, &mut tile.framebuffer, color, self.fill_rule);
      }
      tile.dirty = false;
    }
    self.grid.clear_dirty_range();
  }

  fn flush_parallel(&mut self, dirty_indices: &[usize], color: Argb) -> Result<(), RasterError> {
    let pool = self.pool.as_ref().expect("flush_parallel called without a worker pool");

    let mut jobs = Vec::with_capacity(dirty_indices.len());
    for &idx in dirty_indices {
      let tile = &mut self.grid.tiles[idx];
      jobs.push(ResolveJob {
        tile_index: idx,
        width: tile.width,
        height: tile.height,
        covers: std::mem::take(&mut tile.covers),
        areas: std::mem::take(&mut tile.areas),
        active_mask: std::mem::take(&mut tile.active_mask),
        framebuffer: std::mem::take(&mut tile.framebuffer),
        color,
        fill_rule: self.fill_rule,
        use_simd: self.config.use_simd,
      });
    }

    let results = pool.resolve_all(jobs);
    let mut first_error = None;

    for result in results {
      match result {
        Ok(r) => {
          let tile = &mut self.grid.tiles[r.tile_index];
          tile.covers = r.covers;
          tile.areas = r.areas;
          tile.active_mask = r.active_mask;
          tile.framebuffer = r.framebuffer;
          tile.dirty = false;
        }
        Err(err) => {
          if let RasterError::WorkerFailure { tile_index, .. } = &err {
            self.reset_tile_after_failure(*tile_index);
          }
          if first_error.is_none() {
            first_error = Some(err);
          }
        }
      }
    }

    self.grid.clear_dirty_range();
    match first_error {
      Some(err) => Err(err),
      None => Ok(()),
    }
  }

  /// A worker's buffers are dropped mid-panic and cannot be recovered, so
  /// the failed tile is reallocated to its original dimensions with a
  /// background-filled framebuffer — a well-formed but indeterminate
  /// result, as the error contract allows.
  fn reset_tile_after_failure(&mut self, tile_index: usize) {
    let tile = &mut self.grid.tiles[tile_index];
    let cell_count = (tile.width * tile.height) as usize;
    let mask_words = (Tile::words_per_row(tile.width) * tile.height) as usize;
    tile.covers = vec![0; cell_count];
    tile.areas = vec![0; cell_count];
    tile.active_mask = vec![0; mask_words];
    tile.framebuffer = vec![self.background.0; cell_count];
    tile.dirty = false;
  }

  pub fn pixel(&self, x: u32, y: u32) -> Argb {
    self.grid.pixel(x, y)
  }

  pub fn dirty_bounds(&self) -> Option<(u32, u32)> {
    self.grid.dirty_bounds()
  }

  /// Composes every tile's framebuffer slice into one row-major buffer.
  pub fn buffer(&self) -> Vec<u32> {
    self.grid.compose()
  }

  /// Shuts down the worker pool, if one was created. Idempotent only up
  /// to the first call; subsequent calls return `AlreadyDisposed`.
  pub fn dispose(&mut self) -> Result<(), RasterError> {
    self.check_disposed()?;
    self.pool = None;
    self.disposed = true;
    Ok(())
  }

  fn check_disposed(&self) -> Result<(), RasterError> {
    if self.disposed {
      Err(RasterError::AlreadyDisposed)
    } else {
      Ok(())
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn zero_dimensions_are_rejected() {
    let err = Rasterizer::new(0, 4, RasterizerConfig::default()).unwrap_err();
    assert_eq!(err, RasterError::InvalidDimensions { width: 0, height: 4 });
  }

  #[test]
  fn methods_after_dispose_return_already_disposed() {
    let mut r = Rasterizer::new(4, 4, RasterizerConfig::default()).unwrap();
    r.dispose().unwrap();
    assert_eq!(r.add_polygon(&[0.0, 0.0, 1.0, 0.0, 1.0, 1.0], None).unwrap_err(), RasterError::AlreadyDisposed);
    assert_eq!(r.dispose().unwrap_err(), RasterError::AlreadyDisposed);
  }

  #[test]
  fn flush_with_no_pending_polygons_is_a_no_op() {
    let mut r = Rasterizer::new(4, 4, RasterizerConfig::default()).unwrap();
    let before = r.buffer();
    r.flush(Argb::from_channels(0xFF, 255, 0, 0)).unwrap();
    assert_eq!(r.buffer(), before);
  }

  #[test]
  fn flush_zeros_every_tile_cover_area_and_mask() {
    let mut r = Rasterizer::new(16, 16, RasterizerConfig::default().with_tile_height(4)).unwrap();
    r.add_polygon(&[2.0, 2.0, 14.0, 2.0, 8.0, 14.0], None).unwrap();
    r.flush(Argb::from_channels(0xFF, 255, 0, 0)).unwrap();
    assert_eq!(r.dirty_bounds(), None);
  }
}
