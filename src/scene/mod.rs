//! What a renderer needs to draw one frame: screen mapping and line vertices.

pub mod frame;
pub mod vertex;
pub mod viewport;

pub use frame::FrameScene;
pub use vertex::{as_bytes, LineVertex};
pub use viewport::Viewport;
