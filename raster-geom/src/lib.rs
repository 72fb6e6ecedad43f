//! Dependency-free value types shared by the rasterizer: packed colors,
//! the Q24.8 fixed-point helpers behind cover/area accumulation, and the
//! error enum the public façade returns.

mod color;
mod error;
mod fixed;

pub use color::{Argb, blend_source_over};
pub use error::RasterError;
pub use fixed::{COV_ONE, COV_SHIFT, fixed_to_alpha, fold_even_odd, to_fixed};
