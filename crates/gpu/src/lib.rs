pub mod geometry;
pub mod renderer;

pub use geometry::*;
pub use renderer::*;
