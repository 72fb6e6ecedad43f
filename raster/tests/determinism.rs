use raster::{Argb, Rasterizer, RasterizerConfig};

fn regular_polygon(cx: f64, cy: f64, radius: f64, sides: usize, rotation: f64) -> Vec<f64> {
  let mut verts = Vec::with_capacity(sides * 2);
  for i in 0..sides {
    let angle = rotation + (i as f64) * std::f64::consts::TAU / sides as f64;
    verts.push(cx + radius * angle.cos());
    verts.push(cy + radius * angle.sin());
  }
  verts
}

fn star(cx: f64, cy: f64, r_outer: f64, r_inner: f64, points: usize) -> Vec<f64> {
  let mut verts = Vec::with_capacity(points * 4);
  for i in 0..points * 2 {
    let radius = if i % 2 == 0 { r_outer } else { r_inner };
    let angle = (i as f64) * std::f64::consts::PI / points as f64 - std::f64::consts::FRAC_PI_2;
    verts.push(cx + radius * angle.cos());
    verts.push(cy + radius * angle.sin());
  }
  verts
}

/// Renders the same compound scene under every combination of SIMD and
/// pooled resolve, and asserts the resulting framebuffers are identical.
/// This is the core guarantee the worker pool and SIMD kernel both exist
/// to preserve: parallelism and vectorization are pure optimizations over
/// an otherwise deterministic pixel result.
fn render_compound_scene(use_simd: bool, use_isolates: bool) -> Vec<u32> {
  let config = RasterizerConfig::default()
    .with_tile_height(32)
    .with_simd(use_simd)
    .with_isolates(use_isolates)
    .with_min_parallel_dirty_height(1);
  let mut r = Rasterizer::new(512, 512, config).unwrap();

  let triangle = regular_polygon(256.0, 256.0, 100.0, 3, 0.0);
  let square = regular_polygon(128.0, 128.0, 80.0, 4, std::f64::consts::FRAC_PI_4);
  let star5 = star(384.0, 384.0, 100.0, 40.0, 5);
  let hexagon = regular_polygon(256.0, 400.0, 80.0, 6, 0.0);
  let thin_line = [24.0, 492.0, 488.0, 486.0, 488.0, 487.8, 24.0, 493.8];

  r.add_polygon(&triangle, None).unwrap();
  r.add_polygon(&square, None).unwrap();
  r.add_polygon(&star5, None).unwrap();
  r.add_polygon(&hexagon, None).unwrap();
  r.add_polygon(&thin_line, None).unwrap();
  r.flush(Argb::from_channels(0xFF, 0x20, 0x60, 0xA0)).unwrap();

  r.buffer()
}

#[test]
fn compound_scene_is_deterministic_across_simd_and_pool_combinations() {
  let baseline = render_compound_scene(false, false);
  for use_simd in [false, true] {
    for use_isolates in [false, true] {
      let rendered = render_compound_scene(use_simd, use_isolates);
      assert_eq!(rendered, baseline, "mismatch at use_simd={use_simd}, use_isolates={use_isolates}");
    }
  }
}

#[test]
fn alpha_channel_never_exceeds_full_opacity() {
  let config = RasterizerConfig::default().with_tile_height(16);
  let mut r = Rasterizer::new(64, 64, config).unwrap();
  let triangle = regular_polygon(32.0, 32.0, 28.0, 3, 0.3);
  r.draw_polygon(&triangle, Argb::from_channels(0xFF, 10, 20, 30), true, None, None).unwrap();
  for pixel in r.buffer() {
    assert_eq!(Argb(pixel).a(), 0xFF);
  }
}
