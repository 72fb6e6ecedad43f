//! Analytic coverage rasterizer with tiled, deferred, parallel resolve.
//!
//! Polygons are accumulated into per-tile cover/area cells by
//! [`Rasterizer::add_polygon`]; [`Rasterizer::flush`] converts whatever
//! tiles that left dirty into alpha and blends a solid color into the
//! framebuffer, dispatching the work to a persistent thread pool when the
//! dirty region is large enough to be worth it.

mod config;
mod edge;
mod pool;
mod polygon;
mod rasterizer;
mod resolve;
mod simd;
mod tile;

pub use config::{FillRule, RasterizerConfig};
pub use rasterizer::Rasterizer;
pub use raster_geom::{Argb, RasterError};
