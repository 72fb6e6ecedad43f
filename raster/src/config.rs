/// Winding rule applied to a pixel's signed coverage prefix when deciding
/// how opaque it should be.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum FillRule {
  /// Non-zero winding number is considered "inside".
  #[default]
  NonZero,
  /// Odd winding number is considered "inside"; folds modulo two full
  /// winding units.
  EvenOdd,
}

/// Tunable knobs for a [`crate::Rasterizer`], set once at construction.
///
/// Every field has a default matching the behavior a caller gets from
/// `RasterizerConfig::default()`, mirroring the teacher's `with_*`
/// builder style for option structs.
#[derive(Clone, Copy, Debug)]
pub struct RasterizerConfig {
  /// Height in pixels of each horizontal tile strip.
  pub tile_height: u32,
  /// Whether the lane-parallel resolve kernel may be used.
  pub use_simd: bool,
  /// Whether dirty tiles may be resolved across the worker pool.
  pub use_isolates: bool,
  /// Worker count for the pool; `<= 0` means `max(1, available_parallelism - 1)`.
  pub worker_count: i32,
  /// Minimum dirty-region height, in pixels, before parallel resolve is used.
  pub min_parallel_dirty_height: u32,
}

impl Default for RasterizerConfig {
  fn default() -> Self {
    RasterizerConfig {
      tile_height: 64,
      use_simd: true,
      use_isolates: true,
      worker_count: 0,
      min_parallel_dirty_height: 256,
    }
  }
}

impl RasterizerConfig {
  pub fn with_tile_height(mut self, tile_height: u32) -> Self {
    self.tile_height = tile_height;
    self
  }

  pub fn with_simd(mut self, use_simd: bool) -> Self {
    self.use_simd = use_simd;
    self
  }

  pub fn with_isolates(mut self, use_isolates: bool) -> Self {
    self.use_isolates = use_isolates;
    self
  }

  pub fn with_worker_count(mut self, worker_count: i32) -> Self {
    self.worker_count = worker_count;
    self
  }

  pub fn with_min_parallel_dirty_height(mut self, min_parallel_dirty_height: u32) -> Self {
    self.min_parallel_dirty_height = min_parallel_dirty_height;
    self
  }

  pub(crate) fn resolved_worker_count(&self, tiles: usize) -> usize {
    let host = std::thread::available_parallelism().map(|n| n.get()).unwrap_or(1);
    let host_cap = (host.saturating_sub(1)).max(1);
    let base = if self.worker_count > 0 {
      (self.worker_count as usize).min(host_cap)
    } else {
      host_cap
    };
    base.min(tiles).max(1)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn default_matches_documented_values() {
    let cfg = RasterizerConfig::default();
    assert_eq!(cfg.tile_height, 64);
    assert!(cfg.use_simd);
    assert!(cfg.use_isolates);
    assert_eq!(cfg.min_parallel_dirty_height, 256);
  }

  #[test]
  fn builder_methods_chain() {
    let cfg = RasterizerConfig::default().with_tile_height(32).with_simd(false);
    assert_eq!(cfg.tile_height, 32);
    assert!(!cfg.use_simd);
  }
}
