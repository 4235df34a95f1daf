pub mod frame;
pub mod frame_loop;
pub mod journal;

pub use frame::*;
pub use frame_loop::*;
pub use journal::*;
