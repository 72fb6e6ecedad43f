use raster_geom::Argb;

/// A horizontal strip of the target image, owning its own cover/area
/// accumulation buffers, a sparse per-row active-cell bitmask, and its
/// slice of the composited framebuffer.
///
/// Buffers are structure-of-arrays (`covers` and `areas` kept separate
/// rather than interleaved) so the resolve kernel's lane-parallel variant
/// can load four cover values and four area values as two contiguous
/// vectors.
#[derive(Debug)]
pub struct Tile {
  pub start_y: u32,
  pub height: u32,
  pub width: u32,
  pub covers: Vec<i32>,
  pub areas: Vec<i32>,
  pub active_mask: Vec<u32>,
  pub framebuffer: Vec<u32>,
  pub dirty: bool,
}

impl Tile {
  pub fn words_per_row(width: u32) -> u32 {
    width.div_ceil(32)
  }

  pub fn new(start_y: u32, height: u32, width: u32, background: Argb) -> Self {
    let cell_count = (width * height) as usize;
    let mask_words = (Self::words_per_row(width) * height) as usize;
    Tile {
      start_y,
      height,
      width,
      covers: vec![0; cell_count],
      areas: vec![0; cell_count],
      active_mask: vec![0; mask_words],
      framebuffer: vec![background.0; cell_count],
      dirty: false,
    }
  }

  #[inline]
  fn cell_index(&self, local_x: u32, local_y: u32) -> usize {
    (local_y * self.width + local_x) as usize
  }

  #[inline]
  fn mask_bit_index(&self, local_x: u32, local_y: u32) -> (usize, u32) {
    let words = Self::words_per_row(self.width);
    let word = (local_y * words + local_x / 32) as usize;
    (word, local_x % 32)
  }

  /// Accumulates a signed cover/area delta into one cell and marks it
  /// active. `local_y` is relative to the tile's own `start_y`.
  pub fn add_cell(&mut self, local_x: u32, local_y: u32, cover_delta: i32, area_delta: i32) {
    let idx = self.cell_index(local_x, local_y);
    self.covers[idx] += cover_delta;
    self.areas[idx] += area_delta;
    let (word, bit) = self.mask_bit_index(local_x, local_y);
    self.active_mask[word] |= 1 << bit;
    self.dirty = true;
  }

  /// Resets this tile to a fresh background, zeroing all accumulation
  /// state and clearing the dirty flag.
  pub fn clear(&mut self, background: Argb) {
    self.framebuffer.fill(background.0);
    self.covers.fill(0);
    self.areas.fill(0);
    self.active_mask.fill(0);
    self.dirty = false;
  }

  pub fn pixel(&self, local_x: u32, local_y: u32) -> Argb {
    Argb(self.framebuffer[self.cell_index(local_x, local_y)])
  }
}

/// Partitions a `width x height` image into fixed-height horizontal
/// strips (the last strip may be shorter) and tracks which strips have
/// pending, unresolved edge contributions.
#[derive(Debug)]
pub struct TileGrid {
  pub width: u32,
  pub height: u32,
  pub tile_height: u32,
  pub tiles: Vec<Tile>,
  dirty_min_y: Option<u32>,
  dirty_max_y: Option<u32>,
}

impl TileGrid {
  pub fn new(width: u32, height: u32, tile_height: u32, background: Argb) -> Self {
    let tile_height = tile_height.clamp(1, height.max(1));
    let mut tiles = Vec::new();
    let mut y = 0;
    while y < height {
      let h = tile_height.min(height - y);
      tiles.push(Tile::new(y, h, width, background));
      y += h;
    }
    TileGrid {
      width,
      height,
      tile_height,
      tiles,
      dirty_min_y: None,
      dirty_max_y: None,
    }
  }

  #[inline]
  pub fn tile_index_for_y(&self, y: u32) -> usize {
    let idx = (y / self.tile_height) as usize;
    idx.min(self.tiles.len() - 1)
  }

  /// Accumulates a cover/area delta at global pixel `(x, y)` and extends
  /// the dirty y-range to include `y`.
  pub fn add_cell(&mut self, x: u32, y: u32, cover_delta: i32, area_delta: i32) {
    let tile_idx = self.tile_index_for_y(y);
    let tile = &mut self.tiles[tile_idx];
    let local_y = y - tile.start_y;
    tile.add_cell(x, local_y, cover_delta, area_delta);
    self.dirty_min_y = Some(self.dirty_min_y.map_or(y, |m| m.min(y)));
    self.dirty_max_y = Some(self.dirty_max_y.map_or(y, |m| m.max(y)));
  }

  pub fn dirty_bounds(&self) -> Option<(u32, u32)> {
    match (self.dirty_min_y, self.dirty_max_y) {
      (Some(lo), Some(hi)) => Some((lo, hi)),
      _ => None,
    }
  }

  pub fn dirty_tile_indices(&self) -> Vec<usize> {
    self
      .tiles
      .iter()
      .enumerate()
      .filter(|(_, t)| t.dirty)
      .map(|(i, _)| i)
      .collect()
  }

  pub fn clear_dirty_range(&mut self) {
    self.dirty_min_y = None;
    self.dirty_max_y = None;
  }

  pub fn clear(&mut self, background: Argb) {
    for tile in &mut self.tiles {
      tile.clear(background);
    }
    self.clear_dirty_range();
  }

  pub fn pixel(&self, x: u32, y: u32) -> Argb {
    let tile_idx = self.tile_index_for_y(y);
    let tile = &self.tiles[tile_idx];
    tile.pixel(x, y - tile.start_y)
  }

  /// Composes every tile's framebuffer slice into one row-major buffer.
  pub fn compose(&self) -> Vec<u32> {
    let mut out = vec![0u32; (self.width * self.height) as usize];
    for tile in &self.tiles {
      let start = (tile.start_y * self.width) as usize;
      let end = start + tile.framebuffer.len();
      out[start..end].copy_from_slice(&tile.framebuffer);
    }
    out
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn tile_heights_sum_to_image_height_with_short_last_tile() {
    let grid = TileGrid::new(8, 10, 4, Argb::WHITE);
    let heights: Vec<u32> = grid.tiles.iter().map(|t| t.height).collect();
    assert_eq!(heights, vec![4, 4, 2]);
    assert_eq!(heights.iter().sum::<u32>(), 10);
  }

  #[test]
  fn add_cell_marks_owning_tile_dirty_and_extends_range() {
    let mut grid = TileGrid::new(8, 10, 4, Argb::WHITE);
    grid.add_cell(3, 5, 100, 10);
    assert!(grid.tiles[1].dirty);
    assert!(!grid.tiles[0].dirty);
    assert_eq!(grid.dirty_bounds(), Some((5, 5)));
  }

  #[test]
  fn clear_resets_dirty_state_and_cell_buffers() {
    let mut grid = TileGrid::new(4, 4, 4, Argb::WHITE);
    grid.add_cell(1, 1, 50, 5);
    grid.clear(Argb::WHITE);
    assert_eq!(grid.dirty_bounds(), None);
    assert!(grid.tiles.iter().all(|t| !t.dirty));
    assert!(grid.tiles[0].covers.iter().all(|&c| c == 0));
  }
}
