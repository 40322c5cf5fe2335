//! WebGPU map rendering
//!
//! `scene` turns game state into triangles in screen pixels, `view` maps
//! between screen and geography (including click picking), and `pipeline`
//! owns the GPU side.

pub mod pipeline;
pub mod scene;
pub mod shapes;
pub mod vertex;
pub mod view;

pub use pipeline::RenderState;
pub use scene::{SceneOptions, build};
pub use vertex::Vertex;
pub use view::MapView;
