//! Renders a small multi-shape scene and writes it out as a binary PPM.
//!
//! PNG encoding is out of scope for the rasterizer itself, so this demo
//! uses the simplest format that needs no extra dependency: PPM (P6).

use raster::{Argb, FillRule, Rasterizer, RasterizerConfig};
use std::io::Write;

fn write_ppm(path: &str, width: u32, height: u32, pixels: &[u32]) -> std::io::Result<()> {
  let mut file = std::fs::File::create(path)?;
  write!(file, "P6\n{width} {height}\n255\n")?;
  let mut rgb = Vec::with_capacity(pixels.len() * 3);
  for &p in pixels {
    let c = Argb(p);
    rgb.push(c.r());
    rgb.push(c.g());
    rgb.push(c.b());
  }
  file.write_all(&rgb)
}

fn main() -> std::io::Result<()> {
  let mut r = Rasterizer::new(256, 256, RasterizerConfig::default().with_tile_height(32)).expect("valid dimensions");

  r.add_polygon(&[32.0, 32.0, 224.0, 32.0, 128.0, 224.0], None).unwrap();
  r.flush(Argb::from_channels(0xFF, 0xE0, 0x40, 0x40)).unwrap();

  r.set_fill_rule(FillRule::EvenOdd);
  let ring = [
    40.0, 140.0, 216.0, 140.0, 216.0, 216.0, 40.0, 216.0, 80.0, 160.0, 176.0, 160.0, 176.0, 196.0, 80.0, 196.0,
  ];
  r.add_polygon(&ring, Some(&[4, 4])).unwrap();
  r.flush(Argb::from_channels(0xFF, 0x30, 0x80, 0xE0)).unwrap();

  let out_path = "raster-demo-basic.ppm";
  write_ppm(out_path, r.width(), r.height(), &r.buffer())?;
  println!("wrote {out_path}");

  r.dispose().unwrap();
  Ok(())
}
