pub mod camera;
pub mod config;
pub mod light;
pub mod mesh;
pub mod stage;
pub mod transition;

pub use camera::*;
pub use config::*;
pub use light::*;
pub use mesh::*;
pub use stage::*;
pub use transition::*;
